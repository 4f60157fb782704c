//! Migration: Create invitation_usage table

use sea_orm_migration::prelude::*;

use super::m20260301_000002_create_members::Members;
use super::m20260301_000003_create_invitations::Invitations;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(InvitationUsage::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InvitationUsage::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(InvitationUsage::InvitationId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(InvitationUsage::Email).string().not_null())
                    .col(ColumnDef::new(InvitationUsage::UserId).big_integer().null())
                    .col(
                        ColumnDef::new(InvitationUsage::UsedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(InvitationUsage::Table, InvitationUsage::InvitationId)
                            .to(Invitations::Table, Invitations::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(InvitationUsage::Table, InvitationUsage::UserId)
                            .to(Members::Table, Members::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_invitation_usage_invitation_id")
                    .table(InvitationUsage::Table)
                    .col(InvitationUsage::InvitationId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(InvitationUsage::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum InvitationUsage {
    #[iden = "invitation_usage"]
    Table,
    Id,
    #[iden = "invitation_id"]
    InvitationId,
    Email,
    #[iden = "user_id"]
    UserId,
    #[iden = "used_at"]
    UsedAt,
}
