//! Embedder API.

use crate::client::ApiRequest;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::types::{EmbedderSetting, JsonMap, SchemaSettingsResponse};

/// Embedder API client.
#[derive(Debug, Clone)]
pub struct EmbedderApi {
    config: ClientConfig,
}

impl EmbedderApi {
    pub(crate) fn new(config: &ClientConfig) -> Self {
        Self {
            config: config.scoped("embedder"),
        }
    }

    /// Base URL of this resource.
    pub fn base_url(&self) -> &str {
        self.config.base_url()
    }

    /// List the settings of every available embedder.
    pub async fn list_settings(&self) -> Result<SchemaSettingsResponse> {
        self.config.execute(ApiRequest::get("settings")).await
    }

    /// Get the settings of one embedder.
    pub async fn get_setting(&self, embedder_name: &str) -> Result<EmbedderSetting> {
        self.config
            .execute(ApiRequest::get("settings").segment(embedder_name))
            .await
    }

    /// Replace the settings of an embedder (and select it).
    ///
    /// Changing the embedder makes the server re-create its vector
    /// collections.
    pub async fn upsert_setting(
        &self,
        embedder_name: &str,
        value: JsonMap,
    ) -> Result<EmbedderSetting> {
        self.config
            .execute(ApiRequest::put("settings").segment(embedder_name).json(&value)?)
            .await
    }
}
