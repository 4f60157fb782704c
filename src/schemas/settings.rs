use serde::{Deserialize, Serialize};

use crate::services::settings::SettingValue;

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SettingResponse {
    pub key: String,
    pub value: String,
    pub description: Option<String>,
}

impl From<SettingValue> for SettingResponse {
    fn from(setting: SettingValue) -> Self {
        Self {
            key: setting.key,
            value: setting.value,
            description: setting.description,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SettingUpdate {
    pub value: String,
}
