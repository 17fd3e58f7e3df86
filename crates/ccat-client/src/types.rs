//! Request and response types for the Cheshire Cat API.
//!
//! These types mirror the server's API contract. Records are decoded as-is;
//! fields the server may omit or send as `null` fall back to their defaults.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::upload::UploadFile;

/// JSON object used for free-form setting values.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Unix timestamps arrive as integer or fractional seconds.
mod unix_seconds {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(value.timestamp())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let seconds = f64::deserialize(deserializer)?;
        let whole = seconds.trunc() as i64;
        let nanos = ((seconds - seconds.trunc()) * 1e9).round() as u32;
        DateTime::from_timestamp(whole, nanos.min(999_999_999))
            .ok_or_else(|| D::Error::custom(format!("timestamp out of range: {}", seconds)))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Status
// ─────────────────────────────────────────────────────────────────────────────

/// Response of the root endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Status message.
    #[serde(default)]
    pub status: String,
    /// Server version, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Settings
// ─────────────────────────────────────────────────────────────────────────────

/// Query parameters for listing settings.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GetSettingsParams {
    /// Only return settings whose name contains this text.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub search: String,
}

impl GetSettingsParams {
    /// Search for settings by name.
    pub fn search(text: impl Into<String>) -> Self {
        Self {
            search: text.into(),
        }
    }
}

/// A stored setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    /// Server-assigned identifier.
    pub setting_id: String,
    /// Setting name.
    pub name: String,
    /// Arbitrary JSON value.
    #[serde(default)]
    pub value: serde_json::Value,
    /// Setting category.
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    /// Last update time.
    #[serde(with = "unix_seconds")]
    pub updated_at: DateTime<Utc>,
}

/// A setting as returned by single-setting endpoints, either bare or
/// wrapped in `{"setting": ...}`.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum SettingEnvelope {
    Wrapped { setting: Setting },
    Bare(Setting),
}

impl From<SettingEnvelope> for Setting {
    fn from(envelope: SettingEnvelope) -> Self {
        match envelope {
            SettingEnvelope::Wrapped { setting } | SettingEnvelope::Bare(setting) => setting,
        }
    }
}

/// Response for list settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsResponse {
    /// Matching settings.
    #[serde(default)]
    pub settings: Vec<Setting>,
}

/// Request to create a setting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSetting {
    /// Setting name.
    pub name: String,
    /// Setting value.
    pub value: serde_json::Value,
    /// Category; the server picks a default when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Request to update a setting. Only the given fields change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSetting {
    /// New name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    /// New category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Schema-backed settings (LLM, embedder, plugins)
// ─────────────────────────────────────────────────────────────────────────────

/// One property of a setting's JSON schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaProperty {
    /// Property title.
    #[serde(default)]
    pub title: String,
    /// JSON type of the property.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Default value, if the schema declares one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

/// JSON schema describing a configurable component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingSchema {
    pub description: String,
    pub human_readable_name: String,
    pub link: String,
    pub properties: HashMap<String, SchemaProperty>,
    pub required: Vec<String>,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Set on LLM schemas.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_model_name: Option<String>,
    /// Set on embedder schemas.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_embedder_name: Option<String>,
}

/// A named, schema-described setting value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaSetting {
    /// Component name (model class, embedder class or plugin id).
    pub name: String,
    /// Current value.
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: JsonMap,
    /// Schema of the value. Absent for plugins without settings.
    #[serde(default)]
    pub schema: Option<SettingSchema>,
}

/// Configuration of a language model.
pub type LlmSetting = SchemaSetting;

/// Configuration of an embedder.
pub type EmbedderSetting = SchemaSetting;

/// Settings of a plugin.
pub type PluginSetting = SchemaSetting;

/// Response for list LLM, embedder or plugin settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaSettingsResponse {
    /// All settings.
    #[serde(default)]
    pub settings: Vec<SchemaSetting>,
    /// Name of the currently selected configuration, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_configuration: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Plugins
// ─────────────────────────────────────────────────────────────────────────────

/// Query parameters for listing plugins.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListPluginsParams {
    /// Free-text filter applied to installed and registry plugins.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub query: String,
}

/// Descriptive fields shared by installed and registry plugins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginManifest {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub author_url: Option<String>,
    #[serde(default)]
    pub plugin_url: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub thumb: Option<String>,
}

/// A hook registered by a plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginHook {
    pub name: String,
    #[serde(default)]
    pub priority: i64,
}

/// A tool provided by a plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginTool {
    pub name: String,
}

/// A plugin installed on the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstalledPlugin {
    #[serde(flatten)]
    pub manifest: PluginManifest,
    /// Plugin id (directory name).
    pub id: String,
    /// Whether the plugin is enabled.
    #[serde(default)]
    pub active: bool,
    /// Version available in the registry, if newer.
    #[serde(default)]
    pub upgrade: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hooks: Vec<PluginHook>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tools: Vec<PluginTool>,
}

/// A plugin available in the public registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryPlugin {
    #[serde(flatten)]
    pub manifest: PluginManifest,
    /// Download URL.
    #[serde(default)]
    pub url: String,
}

/// Filters echoed back by the plugin listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginFilters {
    #[serde(default)]
    pub query: Option<String>,
}

/// Response for list plugins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginsResponse {
    #[serde(default)]
    pub filters: PluginFilters,
    #[serde(default)]
    pub installed: Vec<InstalledPlugin>,
    #[serde(default)]
    pub registry: Vec<RegistryPlugin>,
}

/// Response for plugin uploads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadPluginResponse {
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub info: String,
}

/// Request to install a plugin from the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryUpload {
    /// Plugin URL as listed in the registry.
    pub url: String,
}

/// Response for toggling a plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TogglePluginResponse {
    #[serde(default)]
    pub info: String,
}

/// Response for deleting a plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletePluginResponse {
    /// Id of the deleted plugin.
    pub deleted: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory
// ─────────────────────────────────────────────────────────────────────────────

/// Metadata attached to a stored memory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryMetadata {
    #[serde(default)]
    pub source: String,
    /// Unix time the memory was stored.
    #[serde(default)]
    pub when: f64,
    /// Any other metadata fields.
    #[serde(flatten)]
    pub extra: JsonMap,
}

/// A recalled memory point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub page_content: String,
    #[serde(default)]
    pub metadata: MemoryMetadata,
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Similarity to the recall query.
    #[serde(default)]
    pub score: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vector: Vec<f64>,
}

/// The query a recall was performed with.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecallQuery {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub vector: Vec<f64>,
}

/// Recalled memories per collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecalledCollections {
    #[serde(default)]
    pub episodic: Vec<Memory>,
    #[serde(default)]
    pub declarative: Vec<Memory>,
    #[serde(default)]
    pub procedural: Vec<Memory>,
}

/// Recall results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecallVectors {
    /// Embedder used for the query.
    #[serde(default)]
    pub embedder: String,
    #[serde(default)]
    pub collections: RecalledCollections,
}

/// Response for memory recall.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecallResponse {
    pub query: RecallQuery,
    pub vectors: RecallVectors,
}

/// A vector memory collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryCollection {
    /// Collection name.
    pub name: String,
    /// Number of vectors stored.
    #[serde(default)]
    pub vectors_count: u64,
}

/// Response for list collections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionsResponse {
    #[serde(default)]
    pub collections: Vec<MemoryCollection>,
}

/// Per-collection flags reporting which collections were wiped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WipeCollectionsResponse {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub episodic: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub declarative: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub procedural: bool,
}

/// Response for wiping a single memory point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WipePointResponse {
    /// Id of the deleted point.
    pub deleted: String,
}

/// Why the assistant answered the way it did.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageWhy {
    #[serde(default)]
    pub input: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub intermediate_steps: Vec<serde_json::Value>,
    /// Memories that informed the answer, per collection.
    #[serde(default)]
    pub memory: serde_json::Value,
}

/// One message of the conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// Speaker (`Human` or `AI`).
    pub who: String,
    pub message: String,
    #[serde(default)]
    pub why: Option<MessageWhy>,
    /// Unix time of the message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<f64>,
}

/// Response for conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationHistoryResponse {
    #[serde(default)]
    pub history: Vec<ConversationMessage>,
}

/// Response for wiping the conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WipeConversationResponse {
    #[serde(default)]
    pub deleted: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Rabbit hole
// ─────────────────────────────────────────────────────────────────────────────

/// A document to ingest, with optional chunking parameters.
#[derive(Debug, Default)]
pub struct UploadDocument {
    pub file: Option<UploadFile>,
    pub chunk_size: Option<u32>,
    pub chunk_overlap: Option<u32>,
}

impl UploadDocument {
    /// Ingest a file with the server's default chunking.
    pub fn new(file: UploadFile) -> Self {
        Self {
            file: Some(file),
            ..Default::default()
        }
    }

    /// Set the chunk size and overlap.
    pub fn chunking(mut self, chunk_size: u32, chunk_overlap: u32) -> Self {
        self.chunk_size = Some(chunk_size);
        self.chunk_overlap = Some(chunk_overlap);
        self
    }
}

/// Request to ingest a web page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadUrl {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_overlap: Option<u32>,
}

/// Response for document and URL ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default)]
    pub info: String,
}

/// Response for memory file ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadMemoryResponse {
    #[serde(default)]
    pub file: String,
}

/// MIME types the rabbit hole accepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllowedMimeTypes {
    #[serde(default)]
    pub allowed: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_setting_envelope_accepts_both_shapes() {
        let bare = json!({
            "setting_id": "abc",
            "name": "mode",
            "value": {"fast": true},
            "category": "general",
            "updated_at": 1700000000
        });
        let wrapped = json!({"setting": bare.clone()});

        let from_bare: Setting = serde_json::from_value::<SettingEnvelope>(bare)
            .unwrap()
            .into();
        let from_wrapped: Setting = serde_json::from_value::<SettingEnvelope>(wrapped)
            .unwrap()
            .into();

        assert_eq!(from_bare, from_wrapped);
        assert_eq!(from_bare.updated_at.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_setting_fractional_timestamp() {
        let setting: Setting = serde_json::from_value(json!({
            "setting_id": "abc",
            "name": "mode",
            "value": 1,
            "category": null,
            "updated_at": 1700000000.5
        }))
        .unwrap();

        assert_eq!(setting.updated_at.timestamp(), 1_700_000_000);
        assert_eq!(setting.updated_at.timestamp_subsec_millis(), 500);
        assert_eq!(setting.category, "");
    }

    #[test]
    fn test_schema_setting_without_schema() {
        let setting: PluginSetting = serde_json::from_value(json!({
            "name": "core_plugin",
            "value": null,
            "schema": null
        }))
        .unwrap();

        assert!(setting.value.is_empty());
        assert!(setting.schema.is_none());
    }

    #[test]
    fn test_llm_schema_fields() {
        let setting: LlmSetting = serde_json::from_value(json!({
            "name": "LLMOpenAIConfig",
            "value": {"model_name": "gpt-4o"},
            "schema": {
                "description": "OpenAI",
                "humanReadableName": "OpenAI",
                "link": "https://platform.openai.com",
                "properties": {
                    "openai_api_key": {"title": "Openai Api Key", "type": "string"},
                    "temperature": {"title": "Temperature", "type": "number", "default": 0.7}
                },
                "required": ["openai_api_key"],
                "title": "LLMOpenAIConfig",
                "type": "object",
                "languageModelName": "gpt-4o"
            }
        }))
        .unwrap();

        let schema = setting.schema.unwrap();
        assert_eq!(schema.human_readable_name, "OpenAI");
        assert_eq!(schema.language_model_name.as_deref(), Some("gpt-4o"));
        assert_eq!(schema.properties["temperature"].default, Some(json!(0.7)));
    }

    #[test]
    fn test_installed_plugin_flattens_manifest() {
        let plugin: InstalledPlugin = serde_json::from_value(json!({
            "id": "core_plugin",
            "name": "Core CCat",
            "version": "0.0.1",
            "description": null,
            "active": true,
            "upgrade": null,
            "hooks": [{"name": "before_cat_reads_message", "priority": 0}],
            "tools": [{"name": "get_the_time"}]
        }))
        .unwrap();

        assert_eq!(plugin.manifest.name, "Core CCat");
        assert_eq!(plugin.manifest.version.as_deref(), Some("0.0.1"));
        assert!(plugin.active);
        assert_eq!(plugin.tools[0].name, "get_the_time");
    }

    #[test]
    fn test_wipe_flags_skip_false() {
        let response = WipeCollectionsResponse {
            episodic: true,
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&response).unwrap(), json!({"episodic": true}));
    }
}
