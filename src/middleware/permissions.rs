//! Authorization extractors and chapter scoping
//!
//! Usage in handlers:
//! ```ignore
//! async fn list_invitations(
//!     Authenticated(user): Authenticated,
//!     Path(chapter_id): Path<i64>,
//! ) -> Result<Json<Vec<InvitationResponse>>> {
//!     user.ensure_chapter_admin(chapter_id)?;
//!     // ...
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::{AppError, Result};
use crate::middleware::AuthenticatedUser;
use crate::services::security::Role;

impl AuthenticatedUser {
    pub fn is_super_admin(&self) -> bool {
        self.role == Role::SuperAdmin
    }

    /// Administrators manage only their own chapter; super admins manage all.
    pub fn ensure_chapter_admin(&self, chapter_id: i64) -> Result<()> {
        match self.role {
            Role::SuperAdmin => Ok(()),
            Role::Admin if self.chapter_id == Some(chapter_id) => Ok(()),
            _ => Err(AppError::Forbidden(
                "Chapter admin access required".to_string(),
            )),
        }
    }
}

fn authenticated_user(parts: &Parts) -> Result<AuthenticatedUser> {
    parts
        .extensions
        .get::<AuthenticatedUser>()
        .cloned()
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
}

/// Extractor for any authenticated caller
#[derive(Debug, Clone)]
pub struct Authenticated(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        Ok(Authenticated(authenticated_user(parts)?))
    }
}

/// Extractor that only admits platform-wide administrators
#[derive(Debug, Clone)]
pub struct SuperAdmin(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for SuperAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        let user = authenticated_user(parts)?;
        if !user.is_super_admin() {
            return Err(AppError::Forbidden("Super admin access required".to_string()));
        }
        Ok(SuperAdmin(user))
    }
}
