//! Common test utilities for integration tests.

#![allow(dead_code)]

use ccat_client::{CatClient, config};
use serde_json::{Value, json};
use wiremock::MockServer;

/// Start a mock Cheshire Cat and a client pointed at it.
pub async fn setup() -> (MockServer, CatClient) {
    let server = MockServer::start().await;
    let client = CatClient::new([config::with_base_url(server.uri())]);
    (server, client)
}

/// A setting record as the server returns it.
pub fn setting_json(id: &str, name: &str, value: Value, category: &str) -> Value {
    json!({
        "setting_id": id,
        "name": name,
        "value": value,
        "category": category,
        "updated_at": 1_712_000_000
    })
}

/// A schema-backed setting record (LLM, embedder or plugin).
pub fn schema_setting_json(name: &str, value: Value) -> Value {
    json!({
        "name": name,
        "value": value,
        "schema": {
            "description": "Configuration for a test component",
            "humanReadableName": name,
            "link": "",
            "properties": {
                "api_key": {"title": "Api Key", "type": "string"}
            },
            "required": ["api_key"],
            "title": name,
            "type": "object"
        }
    })
}
