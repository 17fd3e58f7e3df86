//! LLM API.

use crate::client::ApiRequest;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::types::{JsonMap, LlmSetting, SchemaSettingsResponse};

/// LLM API client.
#[derive(Debug, Clone)]
pub struct LlmApi {
    config: ClientConfig,
}

impl LlmApi {
    pub(crate) fn new(config: &ClientConfig) -> Self {
        Self {
            config: config.scoped("llm"),
        }
    }

    /// Base URL of this resource.
    pub fn base_url(&self) -> &str {
        self.config.base_url()
    }

    /// List the settings of every available language model.
    pub async fn list_settings(&self) -> Result<SchemaSettingsResponse> {
        self.config.execute(ApiRequest::get("settings")).await
    }

    /// Get the settings of one language model.
    pub async fn get_setting(&self, language_model_name: &str) -> Result<LlmSetting> {
        self.config
            .execute(ApiRequest::get("settings").segment(language_model_name))
            .await
    }

    /// Replace the settings of a language model (and select it).
    pub async fn upsert_setting(
        &self,
        language_model_name: &str,
        value: JsonMap,
    ) -> Result<LlmSetting> {
        self.config
            .execute(ApiRequest::put("settings").segment(language_model_name).json(&value)?)
            .await
    }
}
