pub mod invitations;
pub mod join;
pub mod members;
pub mod settings;

use axum::{middleware as axum_middleware, routing::get, Json, Router};
use utoipa::OpenApi;

use crate::middleware::require_auth;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(title = "ChapterHub API"),
    paths(
        join::validate_join,
        join::validate_alumni_join,
        join::join_signup,
        join::alumni_signup,
        invitations::create_invitation,
        invitations::list_invitations,
        invitations::get_invitation_usage,
        invitations::deactivate_invitation,
        members::list_pending,
        members::approve_member,
        settings::list_settings,
        settings::update_setting,
    ),
    tags(
        (name = "Join", description = "Public invitation links"),
        (name = "Invitations", description = "Chapter invitation administration"),
        (name = "Members", description = "Member approval"),
        (name = "Settings", description = "System settings")
    )
)]
pub struct ApiDoc;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/api/health", get(health_check))
        .route("/api/openapi.json", get(openapi_json))
        .merge(join::join_routes(state.clone()));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .nest("/api", api_routes(state.clone()))
        .layer(axum_middleware::from_fn_with_state(state, require_auth));

    public_routes.merge(protected_routes)
}

/// API routes under /api/* (protected by auth middleware)
fn api_routes(state: AppState) -> Router {
    Router::new()
        .merge(invitations::invitations_routes(state.clone()))
        .merge(members::members_routes(state.clone()))
        .nest("/settings", settings::settings_routes(state))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
