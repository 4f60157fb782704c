//! Authentication middleware for administrator API routes
//!
//! Requires a valid Bearer token issued by the identity provider.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::services::security::{decode_token, Role};
use crate::state::AppState;

/// Authenticated caller stored in request extensions
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: i64,
    pub chapter_id: Option<i64>,
    pub role: Role,
}

/// Auth middleware that validates Bearer tokens
///
/// Returns 401 Unauthorized if token is missing or invalid.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = match extract_bearer_token(&req) {
        Some(t) => t,
        None => {
            return unauthorized_response("Missing or invalid Authorization header");
        }
    };

    let user = match authenticate(&state, &token) {
        Ok(u) => u,
        Err(msg) => {
            return unauthorized_response(msg);
        }
    };

    req.extensions_mut().insert(user);

    next.run(req).await
}

/// Extract Bearer token from Authorization header
fn extract_bearer_token(req: &Request) -> Option<String> {
    let auth_header = req.headers().get(AUTHORIZATION)?;
    let auth_str = auth_header.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

fn authenticate(state: &AppState, token: &str) -> Result<AuthenticatedUser, &'static str> {
    let claims = decode_token(&state.auth, token).map_err(|e| {
        tracing::debug!("Rejected bearer token: {}", e);
        "Invalid or expired token"
    })?;

    let user_id: i64 = claims.sub.parse().map_err(|_| "Invalid token subject")?;

    Ok(AuthenticatedUser {
        user_id,
        chapter_id: claims.chapter_id,
        role: claims.role,
    })
}

/// Create a 401 Unauthorized JSON response
fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "detail": message
        })),
    )
        .into_response()
}
