use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};

use crate::error::Result;
use crate::middleware::Authenticated;
use crate::schemas::MemberResponse;
use crate::state::AppState;

/// Create member routes (mounted under /api)
pub fn members_routes(state: AppState) -> Router {
    Router::new()
        .route("/chapters/{chapter_id}/members/pending", get(list_pending))
        .route(
            "/chapters/{chapter_id}/members/{member_id}/approve",
            post(approve_member),
        )
        .with_state(state)
}

/// Members waiting for administrator approval
#[utoipa::path(
    get,
    path = "/api/chapters/{chapter_id}/members/pending",
    tag = "Members",
    params(("chapter_id" = i64, Path, description = "Chapter ID")),
    responses(
        (status = 200, body = Vec<MemberResponse>)
    )
)]
pub async fn list_pending(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path(chapter_id): Path<i64>,
) -> Result<Json<Vec<MemberResponse>>> {
    user.ensure_chapter_admin(chapter_id)?;

    let members = state.membership_service().list_pending(chapter_id).await?;
    Ok(Json(members.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/chapters/{chapter_id}/members/{member_id}/approve",
    tag = "Members",
    params(
        ("chapter_id" = i64, Path, description = "Chapter ID"),
        ("member_id" = i64, Path, description = "Member ID")
    ),
    responses(
        (status = 200, body = MemberResponse),
        (status = 404, description = "Member not found")
    )
)]
pub async fn approve_member(
    State(state): State<AppState>,
    Authenticated(user): Authenticated,
    Path((chapter_id, member_id)): Path<(i64, i64)>,
) -> Result<Json<MemberResponse>> {
    user.ensure_chapter_admin(chapter_id)?;

    let member = state
        .membership_service()
        .approve(chapter_id, member_id)
        .await?;
    Ok(Json(member.into()))
}
