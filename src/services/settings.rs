//! System settings with built-in defaults.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;

use crate::error::{AppError, Result};
use crate::store::SettingStore;

pub const SIGNUPS_ENABLED: &str = "signups_enabled";

/// Known settings: key -> (default value, description)
static DEFAULT_SETTINGS: Lazy<BTreeMap<&'static str, (&'static str, &'static str)>> =
    Lazy::new(|| {
        let mut m = BTreeMap::new();
        m.insert(
            SIGNUPS_ENABLED,
            ("true", "Allow new members to sign up through invitation links"),
        );
        m
    });

#[derive(Debug, Clone)]
pub struct SettingValue {
    pub key: String,
    pub value: String,
    pub description: Option<String>,
}

/// Whether invitation signups are open.
///
/// Fails open: when the flag cannot be read, signups stay enabled. Join links
/// are already gated by the invitation checks, so a settings outage should not
/// lock every prospective member out.
pub async fn signups_enabled(store: &dyn SettingStore) -> bool {
    match store.get_setting(SIGNUPS_ENABLED).await {
        Ok(Some(value)) => parse_bool(&value).unwrap_or(true),
        Ok(None) => true,
        Err(e) => {
            tracing::warn!("Could not read {}, assuming enabled: {}", SIGNUPS_ENABLED, e);
            true
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Every known setting, stored value if present, otherwise the default
pub async fn list_settings(store: &dyn SettingStore) -> Result<Vec<SettingValue>> {
    let stored: BTreeMap<String, _> = store
        .list_settings()
        .await?
        .into_iter()
        .map(|s| (s.key.clone(), s))
        .collect();

    Ok(DEFAULT_SETTINGS
        .iter()
        .map(|(key, (default_value, description))| match stored.get(*key) {
            Some(row) => SettingValue {
                key: key.to_string(),
                value: row.value.clone(),
                description: row
                    .description
                    .clone()
                    .or_else(|| Some(description.to_string())),
            },
            None => SettingValue {
                key: key.to_string(),
                value: default_value.to_string(),
                description: Some(description.to_string()),
            },
        })
        .collect())
}

pub async fn update_setting(
    store: &dyn SettingStore,
    key: &str,
    value: &str,
) -> Result<SettingValue> {
    let (_, description) = DEFAULT_SETTINGS
        .get(key)
        .ok_or_else(|| AppError::NotFound(format!("Unknown setting: {}", key)))?;

    let normalized = match parse_bool(value) {
        Some(flag) => flag.to_string(),
        None => {
            return Err(AppError::BadRequest(format!(
                "Setting {} expects true or false",
                key
            )))
        }
    };

    let saved = store
        .put_setting(key, &normalized, Some(description.to_string()))
        .await?;
    tracing::info!(key, value = %saved.value, "System setting updated");

    Ok(SettingValue {
        key: saved.key,
        value: saved.value,
        description: saved.description,
    })
}
