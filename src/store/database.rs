use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, SqlErr, TransactionTrait,
};

use crate::db::DbConn;
use crate::error::{AppError, Result};
use crate::models::prelude::*;
use crate::models::{invitation, invitation_usage, member, system_setting};

use super::{
    InvitationStore, MemberStore, NewInvitation, NewMember, RedeemAttempt, SettingStore,
};

/// sea-orm backed store (Postgres in production, SQLite in tests)
#[derive(Clone)]
pub struct DatabaseStore {
    db: DbConn,
}

impl DatabaseStore {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

/// Row-level form of the validity predicates, evaluated by the database
/// inside the UPDATE so concurrent redemptions cannot both pass it.
fn redeemable_at(now: DateTime<Utc>) -> Condition {
    Condition::all()
        .add(invitation::Column::IsActive.eq(true))
        .add(
            Condition::any()
                .add(invitation::Column::ExpiresAt.is_null())
                .add(invitation::Column::ExpiresAt.gt(now)),
        )
        .add(
            Condition::any()
                .add(invitation::Column::MaxUses.is_null())
                .add(
                    Expr::col(invitation::Column::UsageCount)
                        .lt(Expr::col(invitation::Column::MaxUses)),
                ),
        )
        .add(
            Condition::any()
                .add(invitation::Column::SingleUse.eq(false))
                .add(invitation::Column::UsageCount.eq(0)),
        )
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[async_trait]
impl InvitationStore for DatabaseStore {
    async fn find_by_token(&self, token: &str) -> Result<Option<invitation::Model>> {
        Ok(Invitation::find()
            .filter(invitation::Column::Token.eq(token))
            .one(&self.db)
            .await?)
    }

    async fn find_in_chapter(
        &self,
        chapter_id: i64,
        invitation_id: i64,
    ) -> Result<Option<invitation::Model>> {
        Ok(Invitation::find_by_id(invitation_id)
            .filter(invitation::Column::ChapterId.eq(chapter_id))
            .one(&self.db)
            .await?)
    }

    async fn chapter_name(&self, chapter_id: i64) -> Result<Option<String>> {
        Ok(Chapter::find_by_id(chapter_id)
            .one(&self.db)
            .await?
            .map(|c| c.name))
    }

    async fn create(&self, new: NewInvitation) -> Result<invitation::Model> {
        let now = Utc::now();
        let domains = new.encoded_domains()?;

        let model = invitation::ActiveModel {
            token: Set(new.token),
            chapter_id: Set(new.chapter_id),
            created_by: Set(new.created_by),
            allowed_email_domains: Set(domains),
            approval_mode: Set(new.approval_mode.to_string()),
            single_use: Set(new.single_use),
            expires_at: Set(new.expires_at),
            usage_count: Set(0),
            max_uses: Set(new.max_uses),
            is_active: Set(true),
            invitation_type: Set(new.invitation_type.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        model.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Invitation token already exists".to_string())
            } else {
                e.into()
            }
        })
    }

    async fn list_for_chapter(&self, chapter_id: i64) -> Result<Vec<invitation::Model>> {
        Ok(Invitation::find()
            .filter(invitation::Column::ChapterId.eq(chapter_id))
            .order_by_desc(invitation::Column::CreatedAt)
            .order_by_desc(invitation::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn deactivate(
        &self,
        chapter_id: i64,
        invitation_id: i64,
    ) -> Result<Option<invitation::Model>> {
        let Some(existing) = self.find_in_chapter(chapter_id, invitation_id).await? else {
            return Ok(None);
        };

        let mut active: invitation::ActiveModel = existing.into();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now());
        Ok(Some(active.update(&self.db).await?))
    }

    async fn redeem(
        &self,
        invitation_id: i64,
        email: &str,
        user_id: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<RedeemAttempt> {
        let txn = self.db.begin().await?;

        let updated = Invitation::update_many()
            .col_expr(
                invitation::Column::UsageCount,
                Expr::col(invitation::Column::UsageCount).add(1),
            )
            .col_expr(invitation::Column::UpdatedAt, Expr::value(now))
            .filter(invitation::Column::Id.eq(invitation_id))
            .filter(redeemable_at(now))
            .exec(&txn)
            .await?;

        if updated.rows_affected == 0 {
            let current = Invitation::find_by_id(invitation_id).one(&txn).await?;
            txn.rollback().await?;
            return Ok(RedeemAttempt::Rejected(current));
        }

        let usage = invitation_usage::ActiveModel {
            invitation_id: Set(invitation_id),
            email: Set(email.to_string()),
            user_id: Set(user_id),
            used_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(RedeemAttempt::Redeemed(usage))
    }

    async fn usage(&self, invitation_id: i64) -> Result<Vec<invitation_usage::Model>> {
        Ok(InvitationUsage::find()
            .filter(invitation_usage::Column::InvitationId.eq(invitation_id))
            .order_by_desc(invitation_usage::Column::UsedAt)
            .order_by_desc(invitation_usage::Column::Id)
            .all(&self.db)
            .await?)
    }
}

#[async_trait]
impl MemberStore for DatabaseStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<member::Model>> {
        Ok(Member::find()
            .filter(member::Column::Email.eq(email))
            .one(&self.db)
            .await?)
    }

    async fn create(&self, new: NewMember) -> Result<member::Model> {
        let now = Utc::now();
        let model = member::ActiveModel {
            chapter_id: Set(new.chapter_id),
            email: Set(new.email),
            full_name: Set(new.full_name),
            hashed_password: Set(new.hashed_password),
            member_type: Set(new.member_type.to_string()),
            status: Set(new.status.to_string()),
            invitation_id: Set(new.invitation_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        model.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Email already registered".to_string())
            } else {
                e.into()
            }
        })
    }

    async fn delete(&self, member_id: i64) -> Result<()> {
        Member::delete_by_id(member_id).exec(&self.db).await?;
        Ok(())
    }

    async fn list_pending(&self, chapter_id: i64) -> Result<Vec<member::Model>> {
        Ok(Member::find()
            .filter(member::Column::ChapterId.eq(chapter_id))
            .filter(member::Column::Status.eq(member::STATUS_PENDING))
            .order_by_asc(member::Column::CreatedAt)
            .order_by_asc(member::Column::Id)
            .all(&self.db)
            .await?)
    }

    async fn approve(&self, chapter_id: i64, member_id: i64) -> Result<Option<member::Model>> {
        let Some(existing) = Member::find_by_id(member_id)
            .filter(member::Column::ChapterId.eq(chapter_id))
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let mut active: member::ActiveModel = existing.into();
        active.status = Set(member::STATUS_ACTIVE.to_string());
        active.updated_at = Set(Utc::now());
        Ok(Some(active.update(&self.db).await?))
    }
}

#[async_trait]
impl SettingStore for DatabaseStore {
    async fn get_setting(&self, key: &str) -> Result<Option<String>> {
        Ok(SystemSetting::find_by_id(key.to_string())
            .one(&self.db)
            .await?
            .map(|s| s.value))
    }

    async fn list_settings(&self) -> Result<Vec<system_setting::Model>> {
        Ok(SystemSetting::find()
            .order_by_asc(system_setting::Column::Key)
            .all(&self.db)
            .await?)
    }

    async fn put_setting(
        &self,
        key: &str,
        value: &str,
        description: Option<String>,
    ) -> Result<system_setting::Model> {
        let now = Utc::now();
        let existing = SystemSetting::find_by_id(key.to_string())
            .one(&self.db)
            .await?;

        let saved = match existing {
            Some(setting) => {
                let mut active: system_setting::ActiveModel = setting.into();
                active.value = Set(value.to_string());
                active.updated_at = Set(now);
                active.update(&self.db).await?
            }
            None => {
                system_setting::ActiveModel {
                    key: Set(key.to_string()),
                    value: Set(value.to_string()),
                    description: Set(description),
                    updated_at: Set(now),
                }
                .insert(&self.db)
                .await?
            }
        };

        Ok(saved)
    }
}
