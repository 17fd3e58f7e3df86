//! Memory API.

use crate::client::ApiRequest;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::types::{
    CollectionsResponse, ConversationHistoryResponse, JsonMap, RecallResponse,
    WipeCollectionsResponse, WipeConversationResponse, WipePointResponse,
};

/// Memory API client.
#[derive(Debug, Clone)]
pub struct MemoryApi {
    config: ClientConfig,
}

impl MemoryApi {
    pub(crate) fn new(config: &ClientConfig) -> Self {
        Self {
            config: config.scoped("memory"),
        }
    }

    /// Base URL of this resource.
    pub fn base_url(&self) -> &str {
        self.config.base_url()
    }

    /// Recall the `k` memories most similar to `text` from each collection.
    pub async fn recall(&self, text: &str, k: u32) -> Result<RecallResponse> {
        let request = ApiRequest::get("recall")
            .query_pair("text", text)
            .query_pair("k", k);
        self.config.execute(request).await
    }

    /// List the vector collections.
    pub async fn collections(&self) -> Result<CollectionsResponse> {
        self.config.execute(ApiRequest::get("collections")).await
    }

    /// Wipe every collection.
    pub async fn wipe_collections(&self) -> Result<WipeCollectionsResponse> {
        self.config.execute(ApiRequest::delete("collections")).await
    }

    /// Wipe one collection.
    pub async fn wipe_collection(&self, collection_id: &str) -> Result<WipeCollectionsResponse> {
        self.config
            .execute(ApiRequest::delete("collections").segment(collection_id))
            .await
    }

    /// Delete a single memory point.
    pub async fn wipe_point(
        &self,
        collection_id: &str,
        memory_id: &str,
    ) -> Result<WipePointResponse> {
        self.config
            .execute(
                ApiRequest::delete("collections")
                    .segment(collection_id)
                    .segment("points")
                    .segment(memory_id),
            )
            .await
    }

    /// Delete every point of a collection whose metadata matches.
    pub async fn wipe_points_by_metadata(
        &self,
        collection_id: &str,
        metadata: &JsonMap,
    ) -> Result<WipeCollectionsResponse> {
        self.config
            .execute(
                ApiRequest::delete("collections")
                    .segment(collection_id)
                    .segment("points")
                    .json(metadata)?,
            )
            .await
    }

    /// Get the conversation history of the configured user.
    pub async fn conversation_history(&self) -> Result<ConversationHistoryResponse> {
        self.config
            .execute(ApiRequest::get("conversation_history"))
            .await
    }

    /// Wipe the conversation history of the configured user.
    pub async fn wipe_conversation_history(&self) -> Result<WipeConversationResponse> {
        self.config
            .execute(ApiRequest::delete("conversation_history"))
            .await
    }
}
