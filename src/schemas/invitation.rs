use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::invitation::{self, ApprovalMode, InvitationType};
use crate::models::invitation_usage;
use crate::services::invitations::InvitationOptions;

#[derive(Debug, Clone, Default, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateInvitationRequest {
    /// Restrict signups to these email domains. Empty means any domain.
    #[serde(default)]
    #[validate(length(max = 50))]
    pub allowed_email_domains: Vec<String>,
    #[serde(default)]
    pub approval_mode: Option<ApprovalMode>,
    #[serde(default)]
    pub single_use: bool,
    #[validate(range(min = 1))]
    pub max_uses: Option<i32>,
    /// 0 means the invitation never expires; omitted uses the server default
    #[validate(range(min = 0, max = 365))]
    pub expires_in_days: Option<i64>,
    #[serde(default)]
    pub invitation_type: Option<InvitationType>,
}

impl CreateInvitationRequest {
    pub fn into_options(self, default_expiry_days: i64, now: DateTime<Utc>) -> InvitationOptions {
        let days = self.expires_in_days.unwrap_or(default_expiry_days);
        InvitationOptions {
            allowed_email_domains: self.allowed_email_domains,
            approval_mode: self.approval_mode.unwrap_or(ApprovalMode::Auto),
            single_use: self.single_use,
            max_uses: self.max_uses,
            expires_at: (days > 0).then(|| now + Duration::days(days)),
            invitation_type: self.invitation_type.unwrap_or(InvitationType::ActiveMember),
        }
    }
}

/// Administrator view of an invitation, token included
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct InvitationResponse {
    pub id: i64,
    pub token: String,
    pub chapter_id: i64,
    pub created_by: i64,
    pub allowed_email_domains: Option<Vec<String>>,
    pub approval_mode: ApprovalMode,
    pub single_use: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub usage_count: i32,
    pub max_uses: Option<i32>,
    pub is_active: bool,
    pub invitation_type: InvitationType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<invitation::Model> for InvitationResponse {
    fn from(inv: invitation::Model) -> Self {
        Self {
            allowed_email_domains: inv.email_domains(),
            approval_mode: inv.approval(),
            invitation_type: inv.kind(),
            id: inv.id,
            token: inv.token,
            chapter_id: inv.chapter_id,
            created_by: inv.created_by,
            single_use: inv.single_use,
            expires_at: inv.expires_at,
            usage_count: inv.usage_count,
            max_uses: inv.max_uses,
            is_active: inv.is_active,
            created_at: inv.created_at,
            updated_at: inv.updated_at,
        }
    }
}

/// What an anonymous visitor of a join link gets to see
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct JoinInvitation {
    pub id: i64,
    pub chapter_id: i64,
    pub chapter_name: String,
    pub invitation_type: InvitationType,
    pub approval_mode: ApprovalMode,
    pub expires_at: Option<DateTime<Utc>>,
    pub allowed_email_domains: Option<Vec<String>>,
}

impl JoinInvitation {
    pub fn new(inv: &invitation::Model, chapter_name: String) -> Self {
        Self {
            id: inv.id,
            chapter_id: inv.chapter_id,
            chapter_name,
            invitation_type: inv.kind(),
            approval_mode: inv.approval(),
            expires_at: inv.expires_at,
            allowed_email_domains: inv.email_domains(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct JoinValidationResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invitation: Option<JoinInvitation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct UsageResponse {
    pub id: i64,
    pub invitation_id: i64,
    pub email: String,
    pub user_id: Option<i64>,
    pub used_at: DateTime<Utc>,
}

impl From<invitation_usage::Model> for UsageResponse {
    fn from(usage: invitation_usage::Model) -> Self {
        Self {
            id: usage.id,
            invitation_id: usage.invitation_id,
            email: usage.email,
            user_id: usage.user_id,
            used_at: usage.used_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_defaults_and_never() {
        let now = Utc::now();

        let options = CreateInvitationRequest::default().into_options(7, now);
        assert_eq!(options.expires_at, Some(now + Duration::days(7)));
        assert_eq!(options.approval_mode, ApprovalMode::Auto);
        assert_eq!(options.invitation_type, InvitationType::ActiveMember);

        let never = CreateInvitationRequest {
            expires_in_days: Some(0),
            ..Default::default()
        }
        .into_options(7, now);
        assert_eq!(never.expires_at, None);
    }

    #[test]
    fn test_request_validation_bounds() {
        let too_long = CreateInvitationRequest {
            expires_in_days: Some(366),
            ..Default::default()
        };
        assert!(too_long.validate().is_err());

        let zero_uses = CreateInvitationRequest {
            max_uses: Some(0),
            ..Default::default()
        };
        assert!(zero_uses.validate().is_err());

        let parsed: CreateInvitationRequest = serde_json::from_str(
            r#"{"approval_mode":"pending","invitation_type":"alumni","max_uses":5}"#,
        )
        .unwrap();
        assert!(parsed.validate().is_ok());
        assert_eq!(parsed.approval_mode, Some(ApprovalMode::Pending));
        assert_eq!(parsed.invitation_type, Some(InvitationType::Alumni));
    }
}
