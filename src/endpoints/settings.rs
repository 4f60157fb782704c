use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};

use crate::error::Result;
use crate::middleware::SuperAdmin;
use crate::schemas::{SettingResponse, SettingUpdate};
use crate::services::settings;
use crate::state::AppState;

/// Create settings routes
pub fn settings_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_settings))
        .route("/{key}", put(update_setting))
        .with_state(state)
}

/// List all system settings, defaults included
#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "Settings",
    responses(
        (status = 200, body = Vec<SettingResponse>)
    )
)]
pub async fn list_settings(
    State(state): State<AppState>,
    _auth: SuperAdmin,
) -> Result<Json<Vec<SettingResponse>>> {
    let settings = settings::list_settings(state.settings.as_ref()).await?;
    Ok(Json(settings.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    put,
    path = "/api/settings/{key}",
    tag = "Settings",
    params(("key" = String, Path, description = "Setting key")),
    request_body = SettingUpdate,
    responses(
        (status = 200, body = SettingResponse),
        (status = 400, description = "Invalid value"),
        (status = 404, description = "Unknown setting")
    )
)]
pub async fn update_setting(
    State(state): State<AppState>,
    SuperAdmin(user): SuperAdmin,
    Path(key): Path<String>,
    Json(request): Json<SettingUpdate>,
) -> Result<Json<SettingResponse>> {
    let updated = settings::update_setting(state.settings.as_ref(), &key, &request.value).await?;
    tracing::info!(user_id = user.user_id, key = %key, "Setting changed");
    Ok(Json(updated.into()))
}
