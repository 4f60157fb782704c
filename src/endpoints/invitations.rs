//! Chapter invitation administration

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use validator::Validate;

use crate::error::Result;
use crate::middleware::Authenticated;
use crate::schemas::{CreateInvitationRequest, InvitationResponse, UsageResponse};
use crate::state::AppState;

/// Create invitation routes (mounted under /api)
pub fn invitations_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/chapters/{chapter_id}/invitations",
            get(list_invitations).post(create_invitation),
        )
        .route(
            "/chapters/{chapter_id}/invitations/{invitation_id}/usage",
            get(get_invitation_usage),
        )
        .route(
            "/chapters/{chapter_id}/invitations/{invitation_id}/deactivate",
            post(deactivate_invitation),
        )
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/chapters/{chapter_id}/invitations",
    tag = "Invitations",
    params(("chapter_id" = i64, Path, description = "Chapter ID")),
    request_body = CreateInvitationRequest,
    responses(
        (status = 201, body = InvitationResponse),
        (status = 403, description = "Not an administrator of this chapter"),
        (status = 404, description = "Chapter not found")
    )
)]
pub async fn create_invitation(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(chapter_id): Path<i64>,
    Json(request): Json<CreateInvitationRequest>,
) -> Result<(StatusCode, Json<InvitationResponse>)> {
    user.ensure_chapter_admin(chapter_id)?;
    request.validate()?;

    let options = request.into_options(state.invitation_defaults.default_expiry_days, Utc::now());
    let created = state
        .invitation_service()
        .create(chapter_id, user.user_id, options)
        .await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// List a chapter's invitations, newest first
#[utoipa::path(
    get,
    path = "/api/chapters/{chapter_id}/invitations",
    tag = "Invitations",
    params(("chapter_id" = i64, Path, description = "Chapter ID")),
    responses(
        (status = 200, body = Vec<InvitationResponse>)
    )
)]
pub async fn list_invitations(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(chapter_id): Path<i64>,
) -> Result<Json<Vec<InvitationResponse>>> {
    user.ensure_chapter_admin(chapter_id)?;

    let invitations = state.invitation_service().list(chapter_id).await?;
    Ok(Json(invitations.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/chapters/{chapter_id}/invitations/{invitation_id}/usage",
    tag = "Invitations",
    params(
        ("chapter_id" = i64, Path, description = "Chapter ID"),
        ("invitation_id" = i64, Path, description = "Invitation ID")
    ),
    responses(
        (status = 200, body = Vec<UsageResponse>),
        (status = 404, description = "Invitation not found")
    )
)]
pub async fn get_invitation_usage(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path((chapter_id, invitation_id)): Path<(i64, i64)>,
) -> Result<Json<Vec<UsageResponse>>> {
    user.ensure_chapter_admin(chapter_id)?;

    let usage = state
        .invitation_service()
        .usage(chapter_id, invitation_id)
        .await?;
    Ok(Json(usage.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/chapters/{chapter_id}/invitations/{invitation_id}/deactivate",
    tag = "Invitations",
    params(
        ("chapter_id" = i64, Path, description = "Chapter ID"),
        ("invitation_id" = i64, Path, description = "Invitation ID")
    ),
    responses(
        (status = 200, body = InvitationResponse),
        (status = 404, description = "Invitation not found")
    )
)]
pub async fn deactivate_invitation(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path((chapter_id, invitation_id)): Path<(i64, i64)>,
) -> Result<Json<InvitationResponse>> {
    user.ensure_chapter_admin(chapter_id)?;

    let invitation = state
        .invitation_service()
        .deactivate(chapter_id, invitation_id)
        .await?;
    Ok(Json(invitation.into()))
}
