//! Migration: Create members table

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
                    .table(Members::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Members::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Members::ChapterId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Members::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Members::FullName).string().not_null())
                    .col(ColumnDef::new(Members::HashedPassword).string().not_null())
                    .col(
                        ColumnDef::new(Members::MemberType)
                            .string()
                            .not_null()
                            .default("active_member"),
                    )
                    .col(
                        ColumnDef::new(Members::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Members::InvitationId).big_integer().null())
                    .col(
                        ColumnDef::new(Members::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Members::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Members::Table, Members::ChapterId)
                            .to(Chapters::Table, Chapters::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_members_chapter_status")
                    .table(Members::Table)
                    .col(Members::ChapterId)
                    .col(Members::Status)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Members::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Members {
    Table,
    Id,
    #[iden = "chapter_id"]
    ChapterId,
    Email,
    #[iden = "full_name"]
    FullName,
    #[iden = "hashed_password"]
    HashedPassword,
    #[iden = "member_type"]
    MemberType,
    Status,
    #[iden = "invitation_id"]
    InvitationId,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "updated_at"]
    UpdatedAt,
}
