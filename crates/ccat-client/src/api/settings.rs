//! Settings API.

use serde::de::IgnoredAny;

use crate::client::ApiRequest;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::types::{
    CreateSetting, GetSettingsParams, Setting, SettingEnvelope, SettingsResponse, UpdateSetting,
};

/// Settings API client.
#[derive(Debug, Clone)]
pub struct SettingsApi {
    config: ClientConfig,
}

impl SettingsApi {
    pub(crate) fn new(config: &ClientConfig) -> Self {
        Self {
            config: config.scoped("settings"),
        }
    }

    /// Base URL of this resource.
    pub fn base_url(&self) -> &str {
        self.config.base_url()
    }

    /// List settings, optionally filtered by name.
    pub async fn list(&self, params: GetSettingsParams) -> Result<SettingsResponse> {
        self.config
            .execute(ApiRequest::get("").query(&params)?)
            .await
    }

    /// Get a setting by ID.
    pub async fn get(&self, setting_id: &str) -> Result<Setting> {
        let envelope: SettingEnvelope = self
            .config
            .execute(ApiRequest::get("").segment(setting_id))
            .await?;
        Ok(envelope.into())
    }

    /// Create a new setting.
    pub async fn create(&self, request: CreateSetting) -> Result<Setting> {
        let envelope: SettingEnvelope = self
            .config
            .execute(ApiRequest::post("").json(&request)?)
            .await?;
        Ok(envelope.into())
    }

    /// Update an existing setting.
    pub async fn update(&self, setting_id: &str, request: UpdateSetting) -> Result<Setting> {
        let envelope: SettingEnvelope = self
            .config
            .execute(ApiRequest::put("").segment(setting_id).json(&request)?)
            .await?;
        Ok(envelope.into())
    }

    /// Delete a setting.
    pub async fn delete(&self, setting_id: &str) -> Result<()> {
        let _: IgnoredAny = self
            .config
            .execute(ApiRequest::delete("").segment(setting_id))
            .await?;
        Ok(())
    }
}
