//! Application bootstrapper
//!
//! Handles all initialization and setup for the ChapterHub backend.

use std::net::SocketAddr;

use axum::http::HeaderValue;
use axum::Router;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::auth::AuthConfig;
use crate::config::{LogFormat, CONFIG};
use crate::db;
use crate::endpoints;
use crate::state::AppState;

/// Bootstrap and run the application
pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!("Starting ChapterHub backend v{}", CONFIG.version);

    let auth = AuthConfig::from_env().inspect_err(|e| {
        tracing::error!("Refusing to start: {}", e);
    })?;

    let state = init_state(auth).await?;
    let app = create_app(state);

    serve(app).await
}

/// Initialize tracing/logging
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("chapterhub={}", CONFIG.log_level).into());

    match CONFIG.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_ansi(false))
            .init(),
    }
}

/// Connect to the database (runs migrations) and build the shared state
async fn init_state(auth: AuthConfig) -> anyhow::Result<AppState> {
    let conn = db::connect().await?;
    tracing::info!("Database connection established");

    Ok(AppState::from_database(
        conn,
        auth,
        CONFIG.invitations.clone(),
    ))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    endpoints::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&CONFIG.server.allowed_origins))
}

/// Start the HTTP server
async fn serve(app: Router) -> anyhow::Result<()> {
    let ip: std::net::IpAddr = CONFIG.server.host.parse()?;
    let addr = SocketAddr::from((ip, CONFIG.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
