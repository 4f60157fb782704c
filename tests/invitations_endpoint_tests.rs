//! Chapter invitation administration endpoint tests
//!
//! Covers:
//! - POST /api/chapters/{chapter_id}/invitations
//! - GET /api/chapters/{chapter_id}/invitations
//! - GET /api/chapters/{chapter_id}/invitations/{id}/usage
//! - POST /api/chapters/{chapter_id}/invitations/{id}/deactivate

use axum::http::StatusCode;
use chrono::{DateTime, Duration, Utc};
use serde_json::json;

mod common;
use common::*;

fn invitations_uri(chapter_id: i64) -> String {
    format!("/api/chapters/{}/invitations", chapter_id)
}

// ============================================================================
// Authentication and authorization
// ============================================================================

#[tokio::test]
async fn test_requires_bearer_token() {
    let db = create_test_db().await;
    let chapter_id = seed_chapter(&db, "Alpha Chapter").await;
    let app = build_app(db);

    let (status, body) = get(&app, &invitations_uri(chapter_id), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["detail"].is_string());

    let (status, _) = get(&app, &invitations_uri(chapter_id), Some("garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rejects_token_signed_with_other_secret() {
    let db = create_test_db().await;
    let chapter_id = seed_chapter(&db, "Alpha Chapter").await;
    let app = build_app(db);

    let foreign = chapterhub::services::create_access_token(
        &chapterhub::config::auth::AuthConfig::with_secret("someone-else"),
        100,
        Some(chapter_id),
        chapterhub::services::Role::Admin,
        None,
    )
    .unwrap();

    let (status, _) = get(&app, &invitations_uri(chapter_id), Some(&foreign)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_other_chapter_admin_forbidden() {
    let db = create_test_db().await;
    let chapter_id = seed_chapter(&db, "Alpha Chapter").await;
    let other = seed_chapter(&db, "Beta Chapter").await;
    let app = build_app(db);

    let (status, _) = get(&app, &invitations_uri(chapter_id), Some(&admin_token(other))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = post_json(
        &app,
        &invitations_uri(chapter_id),
        Some(&admin_token(other)),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_plain_member_forbidden() {
    let db = create_test_db().await;
    let chapter_id = seed_chapter(&db, "Alpha Chapter").await;
    let app = build_app(db);

    let (status, _) = get(&app, &invitations_uri(chapter_id), Some(&member_token(chapter_id))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn test_create_with_defaults() {
    let db = create_test_db().await;
    let chapter_id = seed_chapter(&db, "Alpha Chapter").await;
    let app = build_app(db);

    let before = Utc::now();
    let (status, body) = post_json(
        &app,
        &invitations_uri(chapter_id),
        Some(&admin_token(chapter_id)),
        json!({}),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["chapter_id"], chapter_id);
    assert_eq!(body["created_by"], 100);
    assert_eq!(body["approval_mode"], "auto");
    assert_eq!(body["invitation_type"], "active_member");
    assert_eq!(body["single_use"], false);
    assert_eq!(body["usage_count"], 0);
    assert_eq!(body["is_active"], true);
    assert!(body["max_uses"].is_null());
    assert!(body["allowed_email_domains"].is_null());

    let token = body["token"].as_str().unwrap();
    assert_eq!(token.len(), 64);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));

    let expires_at: DateTime<Utc> = body["expires_at"].as_str().unwrap().parse().unwrap();
    assert!(expires_at > before + Duration::days(6));
    assert!(expires_at <= Utc::now() + Duration::days(7));

    // The new token validates straight away
    let (status, join) = get(&app, &format!("/join/{}", token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(join["invitation"]["chapter_name"], "Alpha Chapter");
}

#[tokio::test]
async fn test_create_with_options() {
    let db = create_test_db().await;
    let chapter_id = seed_chapter(&db, "Alpha Chapter").await;
    let app = build_app(db);

    let (status, body) = post_json(
        &app,
        &invitations_uri(chapter_id),
        Some(&admin_token(chapter_id)),
        json!({
            "allowed_email_domains": [" @University.EDU ", "", "university.edu", "alumni.org"],
            "approval_mode": "pending",
            "single_use": true,
            "expires_in_days": 0,
            "invitation_type": "alumni"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["allowed_email_domains"], json!(["university.edu", "alumni.org"]));
    assert_eq!(body["approval_mode"], "pending");
    assert_eq!(body["invitation_type"], "alumni");
    assert_eq!(body["single_use"], true);
    assert_eq!(body["max_uses"], 1);
    assert!(body["expires_at"].is_null());
}

#[tokio::test]
async fn test_create_rejects_out_of_range_values() {
    let db = create_test_db().await;
    let chapter_id = seed_chapter(&db, "Alpha Chapter").await;
    let app = build_app(db);
    let token = admin_token(chapter_id);

    let (status, _) = post_json(
        &app,
        &invitations_uri(chapter_id),
        Some(&token),
        json!({"expires_in_days": 400}),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = post_json(
        &app,
        &invitations_uri(chapter_id),
        Some(&token),
        json!({"max_uses": 0}),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_create_for_missing_chapter() {
    let db = create_test_db().await;
    let app = build_app(db);

    let (status, body) = post_json(
        &app,
        &invitations_uri(4242),
        Some(&super_admin_token()),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Chapter not found");
}

// ============================================================================
// List, usage, deactivate
// ============================================================================

#[tokio::test]
async fn test_list_is_scoped_and_newest_first() {
    let db = create_test_db().await;
    let chapter_id = seed_chapter(&db, "Alpha Chapter").await;
    let other = seed_chapter(&db, "Beta Chapter").await;
    let first = insert_invitation(&db, chapter_id, "tok-first", |_| {}).await;
    let second = insert_invitation(&db, chapter_id, "tok-second", |_| {}).await;
    insert_invitation(&db, other, "tok-elsewhere", |_| {}).await;
    let app = build_app(db);

    let (status, body) = get(&app, &invitations_uri(chapter_id), Some(&admin_token(chapter_id))).await;

    assert_eq!(status, StatusCode::OK);
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["id"], second.id);
    assert_eq!(list[1]["id"], first.id);
}

#[tokio::test]
async fn test_usage_lists_redemptions() {
    let db = create_test_db().await;
    let chapter_id = seed_chapter(&db, "Alpha Chapter").await;
    let inv = insert_invitation(&db, chapter_id, "tok-used", |_| {}).await;
    let state = build_app_state(db);
    let svc = state.invitation_service();
    svc.redeem("tok-used", "one@example.org", None).await.unwrap();
    svc.redeem("tok-used", "two@example.org", None).await.unwrap();
    let app = chapterhub::endpoints::create_router(state);

    let (status, body) = get(
        &app,
        &format!("{}/{}/usage", invitations_uri(chapter_id), inv.id),
        Some(&admin_token(chapter_id)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["email"], "two@example.org");
    assert_eq!(rows[1]["email"], "one@example.org");
}

#[tokio::test]
async fn test_usage_of_other_chapters_invitation_not_found() {
    let db = create_test_db().await;
    let chapter_id = seed_chapter(&db, "Alpha Chapter").await;
    let other = seed_chapter(&db, "Beta Chapter").await;
    let inv = insert_invitation(&db, other, "tok-beta", |_| {}).await;
    let app = build_app(db);

    let (status, _) = get(
        &app,
        &format!("{}/{}/usage", invitations_uri(chapter_id), inv.id),
        Some(&admin_token(chapter_id)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deactivate_is_idempotent() {
    let db = create_test_db().await;
    let chapter_id = seed_chapter(&db, "Alpha Chapter").await;
    let inv = insert_invitation(&db, chapter_id, "tok-stop", |_| {}).await;
    let app = build_app(db);
    let token = admin_token(chapter_id);
    let uri = format!("{}/{}/deactivate", invitations_uri(chapter_id), inv.id);

    for _ in 0..2 {
        let (status, body) = post_json(&app, &uri, Some(&token), json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["is_active"], false);
    }

    let (status, body) = get(&app, "/join/tok-stop", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "This invitation has been deactivated");
}

#[tokio::test]
async fn test_deactivate_unknown_invitation() {
    let db = create_test_db().await;
    let chapter_id = seed_chapter(&db, "Alpha Chapter").await;
    let app = build_app(db);

    let (status, _) = post_json(
        &app,
        &format!("{}/999/deactivate", invitations_uri(chapter_id)),
        Some(&admin_token(chapter_id)),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
