use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::member;
use crate::services::membership::{Applicant, SignupOutcome};

use super::invitation::UsageResponse;

#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
pub struct SignupRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    #[validate(length(min = 8))]
    pub password: String,
}

impl From<SignupRequest> for Applicant {
    fn from(req: SignupRequest) -> Self {
        Self {
            email: req.email,
            full_name: req.full_name,
            password: req.password,
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct MemberResponse {
    pub id: i64,
    pub chapter_id: i64,
    pub email: String,
    pub full_name: String,
    pub member_type: String,
    pub status: String,
    pub invitation_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<member::Model> for MemberResponse {
    fn from(m: member::Model) -> Self {
        Self {
            id: m.id,
            chapter_id: m.chapter_id,
            email: m.email,
            full_name: m.full_name,
            member_type: m.member_type,
            status: m.status,
            invitation_id: m.invitation_id,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct SignupResponse {
    pub member: MemberResponse,
    pub chapter_name: String,
    pub usage: UsageResponse,
}

impl From<SignupOutcome> for SignupResponse {
    fn from(outcome: SignupOutcome) -> Self {
        Self {
            member: outcome.member.into(),
            chapter_name: outcome.chapter_name,
            usage: outcome.usage.into(),
        }
    }
}
