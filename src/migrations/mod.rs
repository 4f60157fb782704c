pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_chapters;
mod m20260301_000002_create_members;
mod m20260301_000003_create_invitations;
mod m20260301_000004_create_invitation_usage;
mod m20260301_000005_create_system_settings;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_chapters::Migration),
            Box::new(m20260301_000002_create_members::Migration),
            Box::new(m20260301_000003_create_invitations::Migration),
            Box::new(m20260301_000004_create_invitation_usage::Migration),
            Box::new(m20260301_000005_create_system_settings::Migration),
        ]
    }
}
