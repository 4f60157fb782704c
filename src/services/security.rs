use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::config::auth::AuthConfig;
use crate::error::Result;

/// Random bytes behind each invitation token (hex encoded, so 64 characters)
pub const INVITATION_TOKEN_BYTES: usize = 32;

// Access token lifetime used when the caller does not pick one (in seconds)
const ACCESS_TOKEN_EXPIRE: i64 = 3600;

/// Role carried in bearer tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Member,
    Admin,
    SuperAdmin,
}

/// JWT token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user identifier)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter_id: Option<i64>,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

/// Generate a cryptographically secure random string (hex)
pub fn generate_random_string(length: usize) -> String {
    let mut bytes = vec![0u8; length];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// New opaque invitation token. Callers must not parse it.
pub fn generate_invitation_token() -> String {
    generate_random_string(INVITATION_TOKEN_BYTES)
}

/// Hash a password using bcrypt
pub fn hash_password(password: &str) -> Result<String> {
    Ok(bcrypt::hash(password, bcrypt::DEFAULT_COST)?)
}

/// Create an HS256 access token.
///
/// Production tokens come from the identity provider; this mirrors its format
/// for local tooling and tests.
pub fn create_access_token(
    auth: &AuthConfig,
    user_id: i64,
    chapter_id: Option<i64>,
    role: Role,
    expires_in: Option<i64>,
) -> Result<String> {
    let now = Utc::now();
    let exp = now + Duration::seconds(expires_in.unwrap_or(ACCESS_TOKEN_EXPIRE));

    let claims = Claims {
        sub: user_id.to_string(),
        chapter_id,
        role,
        iss: auth.jwt_issuer.clone(),
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    let key = EncodingKey::from_secret(auth.jwt_secret.as_bytes());
    encode(&Header::new(Algorithm::HS256), &claims, &key).map_err(|e| e.into())
}

/// Decode and validate a bearer token
pub fn decode_token(auth: &AuthConfig, token: &str) -> Result<Claims> {
    let key = DecodingKey::from_secret(auth.jwt_secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.validate_aud = false;
    validation.leeway = 0;
    if let Some(issuer) = &auth.jwt_issuer {
        validation.set_issuer(&[issuer.as_str()]);
    }

    let token_data = decode::<Claims>(token, &key, &validation)?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn auth() -> AuthConfig {
        AuthConfig::with_secret("unit-test-secret")
    }

    #[test]
    fn test_invitation_token_shape() {
        let token = generate_invitation_token();
        assert_eq!(token.len(), INVITATION_TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_invitation_tokens_do_not_repeat() {
        let tokens: HashSet<String> = (0..1000).map(|_| generate_invitation_token()).collect();
        assert_eq!(tokens.len(), 1000);
    }

    #[test]
    fn test_password_hash_verifies() {
        let hash = hash_password("correct horse").unwrap();
        assert_ne!(hash, "correct horse");
        assert!(bcrypt::verify("correct horse", &hash).unwrap());
        assert!(!bcrypt::verify("battery staple", &hash).unwrap());
    }

    #[test]
    fn test_access_token_round_trip() {
        let token = create_access_token(&auth(), 7, Some(3), Role::Admin, None).unwrap();
        let claims = decode_token(&auth(), &token).unwrap();

        assert_eq!(claims.sub, "7");
        assert_eq!(claims.chapter_id, Some(3));
        assert_eq!(claims.role, Role::Admin);
    }

    #[test]
    fn test_decode_rejects_other_secret() {
        let token = create_access_token(&auth(), 7, None, Role::Member, None).unwrap();
        let other = AuthConfig::with_secret("different-secret");
        assert!(decode_token(&other, &token).is_err());
    }

    #[test]
    fn test_decode_rejects_expired_token() {
        let token = create_access_token(&auth(), 7, None, Role::Member, Some(-60)).unwrap();
        assert!(decode_token(&auth(), &token).is_err());
    }

    #[test]
    fn test_decode_enforces_issuer_when_configured() {
        let mut issuer_auth = auth();
        issuer_auth.jwt_issuer = Some("https://id.chapterhub.test".to_string());

        let without_issuer = create_access_token(&auth(), 7, None, Role::Member, None).unwrap();
        assert!(decode_token(&issuer_auth, &without_issuer).is_err());

        let with_issuer =
            create_access_token(&issuer_auth, 7, None, Role::Member, None).unwrap();
        assert!(decode_token(&issuer_auth, &with_issuer).is_ok());
    }
}
