pub mod auth;
pub mod database;
pub mod invitations;
pub mod server;

use once_cell::sync::Lazy;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub server: server::ServerConfig,
    pub database: database::DatabaseConfig,
    pub invitations: invitations::InvitationConfig,

    pub version: String,

    // Logging
    pub log_level: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server: server::ServerConfig::from_env(),
            database: database::DatabaseConfig::from_env(),
            invitations: invitations::InvitationConfig::from_env(),

            version: env!("CARGO_PKG_VERSION").to_string(),

            log_level: env::var("CHAPTERHUB_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_format: LogFormat::parse(
                &env::var("CHAPTERHUB_LOG_FORMAT").unwrap_or_default(),
            ),
        }
    }
}

/// Process-wide configuration. Only the binary entry point reads this;
/// request handlers get their settings through `AppState`.
pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);
