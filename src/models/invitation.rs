use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invitations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub token: String,
    pub chapter_id: i64,
    pub created_by: i64,
    /// JSON array of lowercase domains; `None` means any domain
    pub allowed_email_domains: Option<String>,
    pub approval_mode: String,
    pub single_use: bool,
    pub expires_at: Option<DateTimeUtc>,
    pub usage_count: i32,
    pub max_uses: Option<i32>,
    pub is_active: bool,
    pub invitation_type: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::chapter::Entity",
        from = "Column::ChapterId",
        to = "super::chapter::Column::Id"
    )]
    Chapter,
    #[sea_orm(has_many = "super::invitation_usage::Entity")]
    Usage,
}

impl Related<super::chapter::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Chapter.def()
    }
}

impl Related<super::invitation_usage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Usage.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn approval(&self) -> ApprovalMode {
        ApprovalMode::parse(&self.approval_mode)
    }

    pub fn kind(&self) -> InvitationType {
        InvitationType::parse(&self.invitation_type)
    }

    /// Decoded domain allowlist, `None` meaning any domain.
    /// An unparseable column restricts to nothing.
    pub fn email_domains(&self) -> Option<Vec<String>> {
        let raw = self.allowed_email_domains.as_deref()?;
        match serde_json::from_str::<Vec<String>>(raw) {
            Ok(domains) if domains.is_empty() => None,
            Ok(domains) => Some(domains),
            Err(e) => {
                tracing::warn!(invitation_id = self.id, "Malformed email domain allowlist: {}", e);
                Some(Vec::new())
            }
        }
    }
}

/// Whether members joining through an invitation need administrator approval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalMode {
    Auto,
    Pending,
}

impl ApprovalMode {
    /// Unknown values are treated as `Pending` so a bad row never skips approval.
    pub fn parse(value: &str) -> Self {
        match value {
            "auto" => ApprovalMode::Auto,
            _ => ApprovalMode::Pending,
        }
    }
}

impl std::fmt::Display for ApprovalMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApprovalMode::Auto => write!(f, "auto"),
            ApprovalMode::Pending => write!(f, "pending"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InvitationType {
    ActiveMember,
    Alumni,
}

impl InvitationType {
    pub fn parse(value: &str) -> Self {
        match value {
            "alumni" => InvitationType::Alumni,
            _ => InvitationType::ActiveMember,
        }
    }
}

impl std::fmt::Display for InvitationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvitationType::ActiveMember => write!(f, "active_member"),
            InvitationType::Alumni => write!(f, "alumni"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_round_trip_through_column_text() {
        for mode in [ApprovalMode::Auto, ApprovalMode::Pending] {
            assert_eq!(ApprovalMode::parse(&mode.to_string()), mode);
        }
        for kind in [InvitationType::ActiveMember, InvitationType::Alumni] {
            assert_eq!(InvitationType::parse(&kind.to_string()), kind);
        }
    }

    #[test]
    fn test_unknown_approval_mode_requires_approval() {
        assert_eq!(ApprovalMode::parse("AUTO"), ApprovalMode::Pending);
        assert_eq!(ApprovalMode::parse(""), ApprovalMode::Pending);
    }
}
