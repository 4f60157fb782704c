//! Member signup through invitation links, and approval of pending members.

use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::invitation::{ApprovalMode, InvitationType};
use crate::models::{invitation_usage, member};
use crate::services::invitations::{
    email_domain_allowed, normalize_email, InvalidReason, InvitationService, TokenStatus,
};
use crate::services::security::hash_password;
use crate::services::settings::signups_enabled;
use crate::store::{MemberStore, NewMember, SettingStore};

/// Account details submitted with a join link
#[derive(Debug, Clone)]
pub struct Applicant {
    pub email: String,
    pub full_name: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct SignupOutcome {
    pub member: member::Model,
    pub usage: invitation_usage::Model,
    pub chapter_name: String,
}

#[derive(Clone)]
pub struct MembershipService {
    invitations: InvitationService,
    members: Arc<dyn MemberStore>,
    settings: Arc<dyn SettingStore>,
}

impl MembershipService {
    pub fn new(
        invitations: InvitationService,
        members: Arc<dyn MemberStore>,
        settings: Arc<dyn SettingStore>,
    ) -> Self {
        Self {
            invitations,
            members,
            settings,
        }
    }

    /// Create a member account from a join link and consume one invitation use.
    ///
    /// `expected` restricts the invitation type (alumni links pass `Alumni`).
    /// The account is removed again when the invitation cannot be redeemed.
    pub async fn signup(
        &self,
        token: &str,
        expected: Option<InvitationType>,
        applicant: Applicant,
    ) -> Result<SignupOutcome> {
        if !signups_enabled(self.settings.as_ref()).await {
            return Err(AppError::Forbidden(
                "Signups are currently disabled".to_string(),
            ));
        }

        let status = match expected {
            Some(kind) => self.invitations.validate_for(token, kind).await?,
            None => self.invitations.validate(token).await?,
        };
        let (invitation, chapter_name) = match status {
            TokenStatus::Valid {
                invitation,
                chapter_name,
            } => (invitation, chapter_name),
            TokenStatus::Invalid(reason) => return Err(reason.into()),
        };

        let email = normalize_email(&applicant.email);
        if !email_domain_allowed(&invitation, &email) {
            return Err(InvalidReason::DomainNotAllowed.into());
        }

        if self.members.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let status = match invitation.approval() {
            ApprovalMode::Auto => member::STATUS_ACTIVE,
            ApprovalMode::Pending => member::STATUS_PENDING,
        };

        let member = self
            .members
            .create(NewMember {
                chapter_id: invitation.chapter_id,
                email: email.clone(),
                full_name: applicant.full_name.trim().to_string(),
                hashed_password: hash_password(&applicant.password)?,
                member_type: invitation.kind(),
                status,
                invitation_id: Some(invitation.id),
            })
            .await?;

        let usage = match self.invitations.redeem(token, &email, Some(member.id)).await {
            Ok(usage) => usage,
            Err(e) => {
                if let Err(cleanup) = self.members.delete(member.id).await {
                    tracing::error!(
                        member_id = member.id,
                        "Failed to remove member after rejected redemption: {}",
                        cleanup
                    );
                }
                return Err(e);
            }
        };

        tracing::info!(
            member_id = member.id,
            chapter_id = member.chapter_id,
            status = %member.status,
            "Member signed up"
        );

        Ok(SignupOutcome {
            member,
            usage,
            chapter_name,
        })
    }

    pub async fn list_pending(&self, chapter_id: i64) -> Result<Vec<member::Model>> {
        self.members.list_pending(chapter_id).await
    }

    pub async fn approve(&self, chapter_id: i64, member_id: i64) -> Result<member::Model> {
        let member = self
            .members
            .approve(chapter_id, member_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;
        tracing::info!(member_id, chapter_id, "Member approved");
        Ok(member)
    }
}
