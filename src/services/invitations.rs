//! Invitation validation and redemption.
//!
//! [`evaluate`] is the single definition of "redeemable"; the SQL guard in
//! `store::database` is its row-level mirror and the two must stay in sync.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::invitation::{self, ApprovalMode, InvitationType};
use crate::models::invitation_usage;
use crate::services::security::generate_invitation_token;
use crate::store::{InvitationStore, NewInvitation, RedeemAttempt};

/// Why a token cannot be used. Checks run in declaration order; the first
/// failing one is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InvalidReason {
    NotFound,
    Deactivated,
    Expired,
    UsageLimitReached,
    AlreadyUsed,
    WrongType,
    DomainNotAllowed,
}

impl InvalidReason {
    /// Text shown verbatim by the join page
    pub fn message(&self) -> &'static str {
        match self {
            InvalidReason::NotFound => "Invitation not found",
            InvalidReason::Deactivated => "This invitation has been deactivated",
            InvalidReason::Expired => "This invitation has expired",
            InvalidReason::UsageLimitReached => "This invitation has reached its usage limit",
            InvalidReason::AlreadyUsed => "This invitation has already been used",
            InvalidReason::WrongType => "This invitation is not valid for alumni signup",
            InvalidReason::DomainNotAllowed => "Email domain is not allowed for this invitation",
        }
    }
}

impl From<InvalidReason> for AppError {
    fn from(reason: InvalidReason) -> Self {
        AppError::InvalidInvitation(reason)
    }
}

/// Validity predicates for an existing invitation row, evaluated at `now`.
pub fn evaluate(
    invitation: &invitation::Model,
    now: DateTime<Utc>,
) -> std::result::Result<(), InvalidReason> {
    if !invitation.is_active {
        return Err(InvalidReason::Deactivated);
    }
    if let Some(expires_at) = invitation.expires_at {
        if now >= expires_at {
            return Err(InvalidReason::Expired);
        }
    }
    if let Some(max_uses) = invitation.max_uses {
        if invitation.usage_count >= max_uses {
            return Err(InvalidReason::UsageLimitReached);
        }
    }
    if invitation.single_use && invitation.usage_count > 0 {
        return Err(InvalidReason::AlreadyUsed);
    }
    Ok(())
}

/// Domain part of an email address, lowercased
fn email_domain(email: &str) -> Option<String> {
    let (_, domain) = email.trim().rsplit_once('@')?;
    if domain.is_empty() {
        return None;
    }
    Some(domain.to_lowercase())
}

/// Whether `email` satisfies the invitation's domain allowlist (if any)
pub fn email_domain_allowed(invitation: &invitation::Model, email: &str) -> bool {
    let Some(allowed) = invitation.email_domains() else {
        return true;
    };
    match email_domain(email) {
        Some(domain) => allowed.iter().any(|d| d.eq_ignore_ascii_case(&domain)),
        None => false,
    }
}

/// Trim, lowercase, strip a leading `@`, drop empties and duplicates
pub fn normalize_domains(domains: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::new();
    for raw in domains {
        let domain = raw.trim().trim_start_matches('@').to_lowercase();
        if !domain.is_empty() && !normalized.contains(&domain) {
            normalized.push(domain);
        }
    }
    normalized
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Outcome of checking a join token
#[derive(Debug, Clone)]
pub enum TokenStatus {
    Valid {
        invitation: invitation::Model,
        chapter_name: String,
    },
    Invalid(InvalidReason),
}

/// Administrator choices when creating an invitation
#[derive(Debug, Clone)]
pub struct InvitationOptions {
    pub allowed_email_domains: Vec<String>,
    pub approval_mode: ApprovalMode,
    pub single_use: bool,
    pub max_uses: Option<i32>,
    pub expires_at: Option<DateTime<Utc>>,
    pub invitation_type: InvitationType,
}

impl Default for InvitationOptions {
    fn default() -> Self {
        Self {
            allowed_email_domains: Vec::new(),
            approval_mode: ApprovalMode::Auto,
            single_use: false,
            max_uses: None,
            expires_at: None,
            invitation_type: InvitationType::ActiveMember,
        }
    }
}

#[derive(Clone)]
pub struct InvitationService {
    store: Arc<dyn InvitationStore>,
}

impl InvitationService {
    pub fn new(store: Arc<dyn InvitationStore>) -> Self {
        Self { store }
    }

    /// Check a token without side effects.
    ///
    /// Lookup failures fail closed as `NotFound`. Only a failure to resolve the
    /// chapter name of an otherwise valid invitation is returned as an error.
    pub async fn validate(&self, token: &str) -> Result<TokenStatus> {
        let found = match self.store.find_by_token(token).await {
            Ok(found) => found,
            Err(e) => {
                tracing::error!("Invitation lookup failed: {}", e);
                None
            }
        };

        let Some(invitation) = found else {
            return Ok(TokenStatus::Invalid(InvalidReason::NotFound));
        };

        if let Err(reason) = evaluate(&invitation, Utc::now()) {
            tracing::debug!(invitation_id = invitation.id, ?reason, "Invitation rejected");
            return Ok(TokenStatus::Invalid(reason));
        }

        let chapter_name = self
            .store
            .chapter_name(invitation.chapter_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "Chapter {} missing for invitation {}",
                    invitation.chapter_id, invitation.id
                ))
            })?;

        Ok(TokenStatus::Valid {
            invitation,
            chapter_name,
        })
    }

    /// Like [`validate`](Self::validate), but a valid invitation of another
    /// type is reported as `WrongType`.
    pub async fn validate_for(&self, token: &str, expected: InvitationType) -> Result<TokenStatus> {
        match self.validate(token).await? {
            TokenStatus::Valid { invitation, .. } if invitation.kind() != expected => {
                Ok(TokenStatus::Invalid(InvalidReason::WrongType))
            }
            status => Ok(status),
        }
    }

    /// Consume one use of the invitation behind `token`.
    ///
    /// Validity is checked again here, and the store's conditional increment
    /// decides races between concurrent redemptions.
    pub async fn redeem(
        &self,
        token: &str,
        email: &str,
        user_id: Option<i64>,
    ) -> Result<invitation_usage::Model> {
        let invitation = self
            .store
            .find_by_token(token)
            .await?
            .ok_or(InvalidReason::NotFound)?;

        let now = Utc::now();
        evaluate(&invitation, now)?;

        let email = normalize_email(email);
        match self.store.redeem(invitation.id, &email, user_id, now).await? {
            RedeemAttempt::Redeemed(usage) => {
                tracing::info!(
                    invitation_id = invitation.id,
                    usage_id = usage.id,
                    "Invitation redeemed"
                );
                Ok(usage)
            }
            RedeemAttempt::Rejected(current) => {
                let reason = current
                    .as_ref()
                    .map(|inv| evaluate(inv, now))
                    .unwrap_or(Err(InvalidReason::NotFound))
                    .err()
                    .unwrap_or(InvalidReason::UsageLimitReached);
                tracing::info!(
                    invitation_id = invitation.id,
                    ?reason,
                    "Invitation redemption lost a race"
                );
                Err(reason.into())
            }
        }
    }

    /// Create an invitation for `chapter_id` with a fresh token
    pub async fn create(
        &self,
        chapter_id: i64,
        created_by: i64,
        options: InvitationOptions,
    ) -> Result<invitation::Model> {
        if self.store.chapter_name(chapter_id).await?.is_none() {
            return Err(AppError::NotFound("Chapter not found".to_string()));
        }

        let domains = normalize_domains(&options.allowed_email_domains);
        let max_uses = match (options.single_use, options.max_uses) {
            (true, None) => Some(1),
            (_, max) => max,
        };

        let created = self
            .store
            .create(NewInvitation {
                token: generate_invitation_token(),
                chapter_id,
                created_by,
                allowed_email_domains: (!domains.is_empty()).then_some(domains),
                approval_mode: options.approval_mode,
                single_use: options.single_use,
                expires_at: options.expires_at,
                max_uses,
                invitation_type: options.invitation_type,
            })
            .await?;

        tracing::info!(
            invitation_id = created.id,
            chapter_id,
            created_by,
            "Invitation created"
        );
        Ok(created)
    }

    pub async fn list(&self, chapter_id: i64) -> Result<Vec<invitation::Model>> {
        self.store.list_for_chapter(chapter_id).await
    }

    /// Usage history of one of the chapter's invitations
    pub async fn usage(
        &self,
        chapter_id: i64,
        invitation_id: i64,
    ) -> Result<Vec<invitation_usage::Model>> {
        self.store
            .find_in_chapter(chapter_id, invitation_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Invitation not found".to_string()))?;
        self.store.usage(invitation_id).await
    }

    /// Stop an invitation from accepting further signups. Repeating it is harmless.
    pub async fn deactivate(
        &self,
        chapter_id: i64,
        invitation_id: i64,
    ) -> Result<invitation::Model> {
        let invitation = self
            .store
            .deactivate(chapter_id, invitation_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Invitation not found".to_string()))?;
        tracing::info!(invitation_id, chapter_id, "Invitation deactivated");
        Ok(invitation)
    }
}
