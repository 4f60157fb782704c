use std::env;

/// Defaults applied when an administrator creates an invitation.
#[derive(Debug, Clone)]
pub struct InvitationConfig {
    /// Expiry applied when the request omits `expires_in_days`. 0 means never.
    pub default_expiry_days: i64,
}

impl Default for InvitationConfig {
    fn default() -> Self {
        Self {
            default_expiry_days: 7,
        }
    }
}

impl InvitationConfig {
    pub fn from_env() -> Self {
        Self {
            default_expiry_days: env::var("CHAPTERHUB_INVITE_EXPIRY_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|days: &i64| (0..=365).contains(days))
                .unwrap_or(Self::default().default_expiry_days),
        }
    }
}
