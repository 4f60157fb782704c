//! Test helpers and utilities for integration testing.
//!
//! This module provides common utilities for setting up test environments,
//! creating seed data, and driving the router.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use sea_orm::{
    ActiveModelTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr,
    EntityTrait, Set,
};
use sea_orm_migration::MigratorTrait;
use tower::util::ServiceExt;

use chapterhub::config::auth::AuthConfig;
use chapterhub::config::invitations::InvitationConfig;
use chapterhub::endpoints::create_router;
use chapterhub::error::{AppError, Result};
use chapterhub::migrations::Migrator;
use chapterhub::models::{chapter, invitation, invitation_usage, system_setting};
use chapterhub::services::{create_access_token, Role};
use chapterhub::state::AppState;
use chapterhub::store::{DatabaseStore, InvitationStore, NewInvitation, RedeemAttempt, SettingStore};

pub const TEST_JWT_SECRET: &str = "integration-test-secret";

/// Create an in-memory SQLite database for testing.
///
/// The pool is pinned to one connection: every new SQLite connection to
/// `:memory:` would otherwise open its own empty database.
pub async fn create_test_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(opts)
        .await
        .expect("Failed to create test database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run test migrations");

    db
}

/// Postgres database from `DATABASE_URL` with every table dropped, or `None`
/// when no Postgres URL is configured. Migrations are left to the caller.
pub async fn connect_postgres(max_connections: u32) -> Option<DatabaseConnection> {
    let url = std::env::var("DATABASE_URL").ok()?;
    if !url.starts_with("postgres") {
        return None;
    }

    let mut opts = ConnectOptions::new(url);
    opts.max_connections(max_connections).sqlx_logging(false);
    let db = Database::connect(opts)
        .await
        .expect("Failed to connect to PostgreSQL test database");

    for table in [
        "invitation_usage",
        "invitations",
        "members",
        "system_settings",
        "chapters",
        "seaql_migrations",
    ] {
        db.execute_unprepared(&format!("DROP TABLE IF EXISTS \"{}\" CASCADE", table))
            .await
            .expect("Failed to reset PostgreSQL test database");
    }

    Some(db)
}

/// Insert a chapter row and return its id
pub async fn seed_chapter(db: &DatabaseConnection, name: &str) -> i64 {
    chapter::ActiveModel {
        name: Set(name.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed chapter")
    .id
}

pub fn test_auth() -> AuthConfig {
    AuthConfig::with_secret(TEST_JWT_SECRET)
}

/// State over a database, using the test JWT secret
pub fn build_app_state(db: DatabaseConnection) -> AppState {
    AppState::from_database(db, test_auth(), InvitationConfig::default())
}

pub fn build_app(db: DatabaseConnection) -> Router {
    create_router(build_app_state(db))
}

pub fn admin_token(chapter_id: i64) -> String {
    create_access_token(&test_auth(), 100, Some(chapter_id), Role::Admin, None)
        .expect("Failed to create admin token")
}

pub fn super_admin_token() -> String {
    create_access_token(&test_auth(), 1, None, Role::SuperAdmin, None)
        .expect("Failed to create super admin token")
}

pub fn member_token(chapter_id: i64) -> String {
    create_access_token(&test_auth(), 200, Some(chapter_id), Role::Member, None)
        .expect("Failed to create member token")
}

/// Insert an invitation directly through the store
pub async fn insert_invitation(
    db: &DatabaseConnection,
    chapter_id: i64,
    token: &str,
    customize: impl FnOnce(&mut NewInvitation),
) -> invitation::Model {
    let mut new = NewInvitation {
        token: token.to_string(),
        chapter_id,
        created_by: 100,
        allowed_email_domains: None,
        approval_mode: invitation::ApprovalMode::Auto,
        single_use: false,
        expires_at: None,
        max_uses: None,
        invitation_type: invitation::InvitationType::ActiveMember,
    };
    customize(&mut new);

    DatabaseStore::new(db.clone())
        .create(new)
        .await
        .expect("Failed to insert invitation")
}

pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, serde_json::Value) {
    send(app, "GET", uri, token, None).await
}

pub async fn post_json(
    app: &Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, "POST", uri, token, Some(body)).await
}

pub async fn put_json(
    app: &Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, "PUT", uri, token, Some(body)).await
}

/// Send one request through the router and parse the JSON body (Null when empty or not JSON)
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Store whose every operation fails, standing in for an unreachable database
pub struct FailingStore;

fn unavailable() -> AppError {
    AppError::Database(DbErr::Custom("connection refused".to_string()))
}

#[async_trait]
impl InvitationStore for FailingStore {
    async fn find_by_token(&self, _token: &str) -> Result<Option<invitation::Model>> {
        Err(unavailable())
    }

    async fn find_in_chapter(&self, _: i64, _: i64) -> Result<Option<invitation::Model>> {
        Err(unavailable())
    }

    async fn chapter_name(&self, _chapter_id: i64) -> Result<Option<String>> {
        Err(unavailable())
    }

    async fn create(&self, _invitation: NewInvitation) -> Result<invitation::Model> {
        Err(unavailable())
    }

    async fn list_for_chapter(&self, _chapter_id: i64) -> Result<Vec<invitation::Model>> {
        Err(unavailable())
    }

    async fn deactivate(&self, _: i64, _: i64) -> Result<Option<invitation::Model>> {
        Err(unavailable())
    }

    async fn redeem(
        &self,
        _invitation_id: i64,
        _email: &str,
        _user_id: Option<i64>,
        _now: DateTime<Utc>,
    ) -> Result<RedeemAttempt> {
        Err(unavailable())
    }

    async fn usage(&self, _invitation_id: i64) -> Result<Vec<invitation_usage::Model>> {
        Err(unavailable())
    }
}

#[async_trait]
impl SettingStore for FailingStore {
    async fn get_setting(&self, _key: &str) -> Result<Option<String>> {
        Err(unavailable())
    }

    async fn list_settings(&self) -> Result<Vec<system_setting::Model>> {
        Err(unavailable())
    }

    async fn put_setting(
        &self,
        _key: &str,
        _value: &str,
        _description: Option<String>,
    ) -> Result<system_setting::Model> {
        Err(unavailable())
    }
}

/// Wraps the database store but rejects every redemption attempt, as if
/// another request always consumed the last use first.
pub struct RaceLosingStore {
    db: DatabaseConnection,
    inner: DatabaseStore,
}

impl RaceLosingStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            inner: DatabaseStore::new(db.clone()),
            db,
        }
    }
}

#[async_trait]
impl InvitationStore for RaceLosingStore {
    async fn find_by_token(&self, token: &str) -> Result<Option<invitation::Model>> {
        self.inner.find_by_token(token).await
    }

    async fn find_in_chapter(
        &self,
        chapter_id: i64,
        invitation_id: i64,
    ) -> Result<Option<invitation::Model>> {
        self.inner.find_in_chapter(chapter_id, invitation_id).await
    }

    async fn chapter_name(&self, chapter_id: i64) -> Result<Option<String>> {
        self.inner.chapter_name(chapter_id).await
    }

    async fn create(&self, invitation: NewInvitation) -> Result<invitation::Model> {
        InvitationStore::create(&self.inner, invitation).await
    }

    async fn list_for_chapter(&self, chapter_id: i64) -> Result<Vec<invitation::Model>> {
        self.inner.list_for_chapter(chapter_id).await
    }

    async fn deactivate(
        &self,
        chapter_id: i64,
        invitation_id: i64,
    ) -> Result<Option<invitation::Model>> {
        self.inner.deactivate(chapter_id, invitation_id).await
    }

    async fn redeem(
        &self,
        invitation_id: i64,
        _email: &str,
        _user_id: Option<i64>,
        _now: DateTime<Utc>,
    ) -> Result<RedeemAttempt> {
        let mut current = invitation::Entity::find_by_id(invitation_id)
            .one(&self.db)
            .await?;
        if let Some(inv) = current.as_mut() {
            inv.single_use = true;
            inv.usage_count = 1;
        }
        Ok(RedeemAttempt::Rejected(current))
    }

    async fn usage(&self, invitation_id: i64) -> Result<Vec<invitation_usage::Model>> {
        self.inner.usage(invitation_id).await
    }
}

/// Build state from explicit stores (tests that inject failures)
pub fn state_with_stores(
    db: DatabaseConnection,
    invitations: Arc<dyn InvitationStore>,
    settings: Arc<dyn SettingStore>,
) -> AppState {
    let store = Arc::new(DatabaseStore::new(db));
    AppState::new(
        invitations,
        store,
        settings,
        test_auth(),
        InvitationConfig::default(),
    )
}
