use std::env;

use anyhow::anyhow;

const JWT_SECRET_VAR: &str = "CHAPTERHUB_JWT_SECRET";
const JWT_ISSUER_VAR: &str = "CHAPTERHUB_JWT_ISSUER";

/// Bearer token verification settings.
///
/// Tokens are issued by the identity provider; this service only verifies them.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Expected `iss` claim. `None` disables the issuer check.
    pub jwt_issuer: Option<String>,
}

impl AuthConfig {
    /// Read the verification settings from the environment.
    ///
    /// There is no fallback secret: startup fails when it is missing or blank.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`AuthConfig::from_env`] with an explicit variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let jwt_secret = lookup(JWT_SECRET_VAR)
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| anyhow!("{} must be set to a non-empty value", JWT_SECRET_VAR))?;

        Ok(Self {
            jwt_secret,
            jwt_issuer: lookup(JWT_ISSUER_VAR).filter(|s| !s.trim().is_empty()),
        })
    }

    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: secret.into(),
            jwt_issuer: None,
        }
    }
}
