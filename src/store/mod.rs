//! Data access behind traits so handlers never hold a concrete client.
//!
//! [`DatabaseStore`] is the production implementation over sea-orm;
//! [`MemoryStore`] keeps everything in process and backs unit tests.

pub mod database;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::invitation::{ApprovalMode, InvitationType};
use crate::models::{invitation, invitation_usage, member, system_setting};

pub use database::DatabaseStore;
pub use memory::MemoryStore;

/// Fields of an invitation row chosen at creation time
#[derive(Debug, Clone)]
pub struct NewInvitation {
    pub token: String,
    pub chapter_id: i64,
    pub created_by: i64,
    pub allowed_email_domains: Option<Vec<String>>,
    pub approval_mode: ApprovalMode,
    pub single_use: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_uses: Option<i32>,
    pub invitation_type: InvitationType,
}

impl NewInvitation {
    /// Allowlist as stored in the row: JSON array text, or NULL for no restriction.
    pub(crate) fn encoded_domains(&self) -> Result<Option<String>> {
        match &self.allowed_email_domains {
            Some(domains) if !domains.is_empty() => Ok(Some(serde_json::to_string(domains)?)),
            _ => Ok(None),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewMember {
    pub chapter_id: i64,
    pub email: String,
    pub full_name: String,
    pub hashed_password: String,
    pub member_type: InvitationType,
    pub status: &'static str,
    pub invitation_id: Option<i64>,
}

/// Result of the guarded counter increment
#[derive(Debug, Clone)]
pub enum RedeemAttempt {
    /// Counter incremented and usage row written
    Redeemed(invitation_usage::Model),
    /// Guard did not match; carries the row as it is now (if it still exists)
    Rejected(Option<invitation::Model>),
}

#[async_trait]
pub trait InvitationStore: Send + Sync {
    async fn find_by_token(&self, token: &str) -> Result<Option<invitation::Model>>;

    async fn find_in_chapter(
        &self,
        chapter_id: i64,
        invitation_id: i64,
    ) -> Result<Option<invitation::Model>>;

    async fn chapter_name(&self, chapter_id: i64) -> Result<Option<String>>;

    async fn create(&self, invitation: NewInvitation) -> Result<invitation::Model>;

    /// Newest first
    async fn list_for_chapter(&self, chapter_id: i64) -> Result<Vec<invitation::Model>>;

    async fn deactivate(
        &self,
        chapter_id: i64,
        invitation_id: i64,
    ) -> Result<Option<invitation::Model>>;

    /// Increment the usage counter only while the invitation is still
    /// redeemable at `now`, and record the usage row in the same unit of work.
    async fn redeem(
        &self,
        invitation_id: i64,
        email: &str,
        user_id: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<RedeemAttempt>;

    /// Newest first
    async fn usage(&self, invitation_id: i64) -> Result<Vec<invitation_usage::Model>>;
}

#[async_trait]
pub trait MemberStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<member::Model>>;

    async fn create(&self, member: NewMember) -> Result<member::Model>;

    async fn delete(&self, member_id: i64) -> Result<()>;

    async fn list_pending(&self, chapter_id: i64) -> Result<Vec<member::Model>>;

    async fn approve(&self, chapter_id: i64, member_id: i64) -> Result<Option<member::Model>>;
}

#[async_trait]
pub trait SettingStore: Send + Sync {
    async fn get_setting(&self, key: &str) -> Result<Option<String>>;

    async fn list_settings(&self) -> Result<Vec<system_setting::Model>>;

    async fn put_setting(
        &self,
        key: &str,
        value: &str,
        description: Option<String>,
    ) -> Result<system_setting::Model>;
}
