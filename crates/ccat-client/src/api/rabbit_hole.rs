//! Rabbit hole (document ingestion) API.

use crate::client::ApiRequest;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::types::{
    AllowedMimeTypes, IngestionResponse, UploadDocument, UploadMemoryResponse, UploadUrl,
};
use crate::upload::{FILE_FIELD, UploadFile};

/// Rabbit hole API client.
#[derive(Debug, Clone)]
pub struct RabbitHoleApi {
    config: ClientConfig,
}

impl RabbitHoleApi {
    pub(crate) fn new(config: &ClientConfig) -> Self {
        Self {
            config: config.scoped("rabbit_hole"),
        }
    }

    /// Base URL of this resource.
    pub fn base_url(&self) -> &str {
        self.config.base_url()
    }

    /// Ingest a document into declarative memory.
    pub async fn upload(&self, document: UploadDocument) -> Result<IngestionResponse> {
        let mut fields = Vec::new();
        if let Some(chunk_size) = document.chunk_size {
            fields.push(("chunk_size".to_string(), chunk_size.to_string()));
        }
        if let Some(chunk_overlap) = document.chunk_overlap {
            fields.push(("chunk_overlap".to_string(), chunk_overlap.to_string()));
        }

        self.config
            .execute_upload(ApiRequest::post("upload"), FILE_FIELD, document.file, fields)
            .await
    }

    /// Ingest the content of a web page.
    pub async fn upload_url(&self, request: UploadUrl) -> Result<IngestionResponse> {
        self.config
            .execute(ApiRequest::post("upload").json(&request)?)
            .await
    }

    /// Import a memory export file.
    pub async fn upload_memory(&self, file: Option<UploadFile>) -> Result<UploadMemoryResponse> {
        self.config
            .execute_upload(ApiRequest::post("memory"), FILE_FIELD, file, Vec::new())
            .await
    }

    /// List the MIME types accepted for ingestion.
    pub async fn allowed_mime_types(&self) -> Result<AllowedMimeTypes> {
        self.config
            .execute(ApiRequest::get("allowed-mimetypes"))
            .await
    }
}
