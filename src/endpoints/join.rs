//! Public join links: token validation and member signup

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use validator::Validate;

use crate::error::Result;
use crate::models::invitation::InvitationType;
use crate::schemas::{JoinInvitation, JoinValidationResponse, SignupRequest, SignupResponse};
use crate::services::TokenStatus;
use crate::state::AppState;

/// Create join routes (no authentication)
pub fn join_routes(state: AppState) -> Router {
    Router::new()
        .route("/join/{token}", get(validate_join).post(join_signup))
        .route(
            "/alumni-join/{token}",
            get(validate_alumni_join).post(alumni_signup),
        )
        .with_state(state)
}

fn join_response(status: TokenStatus) -> Result<Json<JoinValidationResponse>> {
    match status {
        TokenStatus::Valid {
            invitation,
            chapter_name,
        } => Ok(Json(JoinValidationResponse {
            valid: true,
            invitation: Some(JoinInvitation::new(&invitation, chapter_name)),
            error: None,
        })),
        TokenStatus::Invalid(reason) => Err(reason.into()),
    }
}

/// Check a join link before showing the signup form
#[utoipa::path(
    get,
    path = "/join/{token}",
    tag = "Join",
    params(("token" = String, Path, description = "Invitation token")),
    responses(
        (status = 200, body = JoinValidationResponse),
        (status = 400, body = JoinValidationResponse, description = "Invalid invitation")
    )
)]
pub async fn validate_join(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<JoinValidationResponse>> {
    join_response(state.invitation_service().validate(&token).await?)
}

/// Check an alumni join link; member invitations are rejected
#[utoipa::path(
    get,
    path = "/alumni-join/{token}",
    tag = "Join",
    params(("token" = String, Path, description = "Invitation token")),
    responses(
        (status = 200, body = JoinValidationResponse),
        (status = 400, body = JoinValidationResponse, description = "Invalid invitation")
    )
)]
pub async fn validate_alumni_join(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<JoinValidationResponse>> {
    join_response(
        state
            .invitation_service()
            .validate_for(&token, InvitationType::Alumni)
            .await?,
    )
}

async fn signup(
    state: AppState,
    token: String,
    expected: Option<InvitationType>,
    request: SignupRequest,
) -> Result<(StatusCode, Json<SignupResponse>)> {
    request.validate()?;

    let outcome = state
        .membership_service()
        .signup(&token, expected, request.into())
        .await?;

    Ok((StatusCode::CREATED, Json(outcome.into())))
}

/// Create a member account through a join link
#[utoipa::path(
    post,
    path = "/join/{token}",
    tag = "Join",
    params(("token" = String, Path, description = "Invitation token")),
    request_body = SignupRequest,
    responses(
        (status = 201, body = SignupResponse),
        (status = 400, body = JoinValidationResponse, description = "Invalid invitation"),
        (status = 403, description = "Signups disabled"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn join_signup(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>)> {
    signup(state, token, None, request).await
}

/// Create an alumni account through an alumni join link
#[utoipa::path(
    post,
    path = "/alumni-join/{token}",
    tag = "Join",
    params(("token" = String, Path, description = "Invitation token")),
    request_body = SignupRequest,
    responses(
        (status = 201, body = SignupResponse),
        (status = 400, body = JoinValidationResponse, description = "Invalid invitation"),
        (status = 403, description = "Signups disabled"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn alumni_signup(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>)> {
    signup(state, token, Some(InvitationType::Alumni), request).await
}
