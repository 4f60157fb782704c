//! Migration: Create invitations table

use sea_orm_migration::prelude::*;

use super::m20260301_000001_create_chapters::Chapters;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Invitations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Invitations::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Invitations::Token)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Invitations::ChapterId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Invitations::CreatedBy)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Invitations::AllowedEmailDomains).text().null())
                    .col(
                        ColumnDef::new(Invitations::ApprovalMode)
                            .string()
                            .not_null()
                            .default("auto"),
                    )
                    .col(
                        ColumnDef::new(Invitations::SingleUse)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Invitations::ExpiresAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Invitations::UsageCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Invitations::MaxUses).integer().null())
                    .col(
                        ColumnDef::new(Invitations::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Invitations::InvitationType)
                            .string()
                            .not_null()
                            .default("active_member"),
                    )
                    .col(
                        ColumnDef::new(Invitations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Invitations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Invitations::Table, Invitations::ChapterId)
                            .to(Chapters::Table, Chapters::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_invitations_token")
                    .table(Invitations::Table)
                    .col(Invitations::Token)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_invitations_chapter_id")
                    .table(Invitations::Table)
                    .col(Invitations::ChapterId)
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
                    .table(Invitations::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
pub enum Invitations {
    Table,
    Id,
    Token,
    #[iden = "chapter_id"]
    ChapterId,
    #[iden = "created_by"]
    CreatedBy,
    #[iden = "allowed_email_domains"]
    AllowedEmailDomains,
    #[iden = "approval_mode"]
    ApprovalMode,
    #[iden = "single_use"]
    SingleUse,
    #[iden = "expires_at"]
    ExpiresAt,
    #[iden = "usage_count"]
    UsageCount,
    #[iden = "max_uses"]
    MaxUses,
    #[iden = "is_active"]
    IsActive,
    #[iden = "invitation_type"]
    InvitationType,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "updated_at"]
    UpdatedAt,
}
