use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::error::{AppError, Result};
use crate::models::{invitation, invitation_usage, member, system_setting};
use crate::services::invitations::evaluate;

use super::{
    InvitationStore, MemberStore, NewInvitation, NewMember, RedeemAttempt, SettingStore,
};

#[derive(Default)]
struct Inner {
    next_id: i64,
    chapters: BTreeMap<i64, String>,
    invitations: BTreeMap<i64, invitation::Model>,
    usage: Vec<invitation_usage::Model>,
    members: BTreeMap<i64, member::Model>,
    settings: BTreeMap<String, system_setting::Model>,
}

impl Inner {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-process store. Every operation runs under one lock, which makes the
/// check-and-increment in `redeem` atomic the same way the SQL guard is.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chapters are provisioned outside this service; tests seed them here.
    pub fn add_chapter(&self, name: &str) -> i64 {
        let mut inner = self.inner.lock();
        let id = inner.allocate_id();
        inner.chapters.insert(id, name.to_string());
        id
    }

    /// Replace a stored invitation wholesale (tests use it to age or exhaust rows).
    pub fn overwrite_invitation(&self, model: invitation::Model) {
        self.inner.lock().invitations.insert(model.id, model);
    }
}

#[async_trait]
impl InvitationStore for MemoryStore {
    async fn find_by_token(&self, token: &str) -> Result<Option<invitation::Model>> {
        let inner = self.inner.lock();
        Ok(inner
            .invitations
            .values()
            .find(|inv| inv.token == token)
            .cloned())
    }

    async fn find_in_chapter(
        &self,
        chapter_id: i64,
        invitation_id: i64,
    ) -> Result<Option<invitation::Model>> {
        let inner = self.inner.lock();
        Ok(inner
            .invitations
            .get(&invitation_id)
            .filter(|inv| inv.chapter_id == chapter_id)
            .cloned())
    }

    async fn chapter_name(&self, chapter_id: i64) -> Result<Option<String>> {
        Ok(self.inner.lock().chapters.get(&chapter_id).cloned())
    }

    async fn create(&self, new: NewInvitation) -> Result<invitation::Model> {
        let domains = new.encoded_domains()?;
        let mut inner = self.inner.lock();

        if inner.invitations.values().any(|inv| inv.token == new.token) {
            return Err(AppError::Conflict(
                "Invitation token already exists".to_string(),
            ));
        }
        if !inner.chapters.contains_key(&new.chapter_id) {
            return Err(AppError::Internal(format!(
                "Foreign key violation: chapter {} does not exist",
                new.chapter_id
            )));
        }

        let now = Utc::now();
        let model = invitation::Model {
            id: inner.allocate_id(),
            token: new.token,
            chapter_id: new.chapter_id,
            created_by: new.created_by,
            allowed_email_domains: domains,
            approval_mode: new.approval_mode.to_string(),
            single_use: new.single_use,
            expires_at: new.expires_at,
            usage_count: 0,
            max_uses: new.max_uses,
            is_active: true,
            invitation_type: new.invitation_type.to_string(),
            created_at: now,
            updated_at: now,
        };
        inner.invitations.insert(model.id, model.clone());
        Ok(model)
    }

    async fn list_for_chapter(&self, chapter_id: i64) -> Result<Vec<invitation::Model>> {
        let inner = self.inner.lock();
        let mut found: Vec<_> = inner
            .invitations
            .values()
            .filter(|inv| inv.chapter_id == chapter_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(found)
    }

    async fn deactivate(
        &self,
        chapter_id: i64,
        invitation_id: i64,
    ) -> Result<Option<invitation::Model>> {
        let mut inner = self.inner.lock();
        let Some(inv) = inner
            .invitations
            .get_mut(&invitation_id)
            .filter(|inv| inv.chapter_id == chapter_id)
        else {
            return Ok(None);
        };

        inv.is_active = false;
        inv.updated_at = Utc::now();
        Ok(Some(inv.clone()))
    }

    async fn redeem(
        &self,
        invitation_id: i64,
        email: &str,
        user_id: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<RedeemAttempt> {
        let mut inner = self.inner.lock();
        let usage_id = inner.allocate_id();

        let Some(inv) = inner.invitations.get_mut(&invitation_id) else {
            return Ok(RedeemAttempt::Rejected(None));
        };
        if evaluate(inv, now).is_err() {
            return Ok(RedeemAttempt::Rejected(Some(inv.clone())));
        }

        inv.usage_count += 1;
        inv.updated_at = now;

        let usage = invitation_usage::Model {
            id: usage_id,
            invitation_id,
            email: email.to_string(),
            user_id,
            used_at: now,
        };
        inner.usage.push(usage.clone());
        Ok(RedeemAttempt::Redeemed(usage))
    }

    async fn usage(&self, invitation_id: i64) -> Result<Vec<invitation_usage::Model>> {
        let inner = self.inner.lock();
        let mut rows: Vec<_> = inner
            .usage
            .iter()
            .filter(|u| u.invitation_id == invitation_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.used_at.cmp(&a.used_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }
}

#[async_trait]
impl MemberStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<member::Model>> {
        let inner = self.inner.lock();
        Ok(inner.members.values().find(|m| m.email == email).cloned())
    }

    async fn create(&self, new: NewMember) -> Result<member::Model> {
        let mut inner = self.inner.lock();
        if inner.members.values().any(|m| m.email == new.email) {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let now = Utc::now();
        let model = member::Model {
            id: inner.allocate_id(),
            chapter_id: new.chapter_id,
            email: new.email,
            full_name: new.full_name,
            hashed_password: new.hashed_password,
            member_type: new.member_type.to_string(),
            status: new.status.to_string(),
            invitation_id: new.invitation_id,
            created_at: now,
            updated_at: now,
        };
        inner.members.insert(model.id, model.clone());
        Ok(model)
    }

    async fn delete(&self, member_id: i64) -> Result<()> {
        self.inner.lock().members.remove(&member_id);
        Ok(())
    }

    async fn list_pending(&self, chapter_id: i64) -> Result<Vec<member::Model>> {
        let inner = self.inner.lock();
        Ok(inner
            .members
            .values()
            .filter(|m| m.chapter_id == chapter_id && m.status == member::STATUS_PENDING)
            .cloned()
            .collect())
    }

    async fn approve(&self, chapter_id: i64, member_id: i64) -> Result<Option<member::Model>> {
        let mut inner = self.inner.lock();
        let Some(found) = inner
            .members
            .get_mut(&member_id)
            .filter(|m| m.chapter_id == chapter_id)
        else {
            return Ok(None);
        };

        found.status = member::STATUS_ACTIVE.to_string();
        found.updated_at = Utc::now();
        Ok(Some(found.clone()))
    }
}

#[async_trait]
impl SettingStore for MemoryStore {
    async fn get_setting(&self, key: &str) -> Result<Option<String>> {
        Ok(self.inner.lock().settings.get(key).map(|s| s.value.clone()))
    }

    async fn list_settings(&self) -> Result<Vec<system_setting::Model>> {
        Ok(self.inner.lock().settings.values().cloned().collect())
    }

    async fn put_setting(
        &self,
        key: &str,
        value: &str,
        description: Option<String>,
    ) -> Result<system_setting::Model> {
        let mut inner = self.inner.lock();
        let now = Utc::now();
        let entry = inner
            .settings
            .entry(key.to_string())
            .or_insert_with(|| system_setting::Model {
                key: key.to_string(),
                value: value.to_string(),
                description,
                updated_at: now,
            });
        entry.value = value.to_string();
        entry.updated_at = now;
        Ok(entry.clone())
    }
}
