//! Plugins API.

use crate::client::ApiRequest;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::types::{
    DeletePluginResponse, InstalledPlugin, JsonMap, ListPluginsParams, PluginSetting,
    PluginsResponse, RegistryUpload, SchemaSettingsResponse, TogglePluginResponse,
    UploadPluginResponse,
};
use crate::upload::{FILE_FIELD, UploadFile};

/// Plugins API client.
#[derive(Debug, Clone)]
pub struct PluginsApi {
    config: ClientConfig,
}

impl PluginsApi {
    pub(crate) fn new(config: &ClientConfig) -> Self {
        Self {
            config: config.scoped("plugins"),
        }
    }

    /// Base URL of this resource.
    pub fn base_url(&self) -> &str {
        self.config.base_url()
    }

    /// List installed and registry plugins.
    pub async fn list(&self, params: ListPluginsParams) -> Result<PluginsResponse> {
        self.config
            .execute(ApiRequest::get("").query(&params)?)
            .await
    }

    /// Install a plugin from a zip archive.
    pub async fn upload(&self, archive: Option<UploadFile>) -> Result<UploadPluginResponse> {
        self.config
            .execute_upload(ApiRequest::post("upload"), FILE_FIELD, archive, Vec::new())
            .await
    }

    /// Install a plugin from the registry.
    pub async fn upload_from_registry(
        &self,
        url: impl Into<String>,
    ) -> Result<UploadPluginResponse> {
        let request = RegistryUpload { url: url.into() };
        self.config
            .execute(ApiRequest::post("upload/registry").json(&request)?)
            .await
    }

    /// Enable or disable a plugin.
    pub async fn toggle(&self, plugin_id: &str) -> Result<TogglePluginResponse> {
        self.config
            .execute(ApiRequest::post("toggle").segment(plugin_id))
            .await
    }

    /// Get the settings of every plugin.
    pub async fn settings(&self) -> Result<SchemaSettingsResponse> {
        self.config.execute(ApiRequest::get("settings")).await
    }

    /// Get the settings of one plugin.
    pub async fn get_settings(&self, plugin_id: &str) -> Result<PluginSetting> {
        self.config
            .execute(ApiRequest::get("settings").segment(plugin_id))
            .await
    }

    /// Replace the settings of one plugin.
    pub async fn upsert_settings(&self, plugin_id: &str, value: JsonMap) -> Result<PluginSetting> {
        self.config
            .execute(ApiRequest::put("settings").segment(plugin_id).json(&value)?)
            .await
    }

    /// Get the details of an installed plugin.
    pub async fn detail(&self, plugin_id: &str) -> Result<InstalledPlugin> {
        self.config.execute(ApiRequest::get("").segment(plugin_id)).await
    }

    /// Uninstall a plugin.
    pub async fn delete(&self, plugin_id: &str) -> Result<DeletePluginResponse> {
        self.config.execute(ApiRequest::delete("").segment(plugin_id)).await
    }
}
