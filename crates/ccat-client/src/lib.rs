//! HTTP client SDK for the Cheshire Cat AI assistant.
//!
//! This crate provides a typed client for the Cheshire Cat REST API.
//!
//! # Example
//!
//! ```no_run
//! use ccat_client::{CatClient, GetSettingsParams, Result, config};
//!
//! # async fn example() -> Result<()> {
//! // Create a client
//! let client = CatClient::new([
//!     config::with_base_url("http://localhost:1865"),
//!     config::with_auth_key("meow"),
//! ]);
//!
//! // Check that the cat is awake
//! client.status().await?;
//!
//! // Search settings
//! let found = client
//!     .settings()
//!     .list(GetSettingsParams::search("example"))
//!     .await?;
//! println!("{} settings", found.settings.len());
//!
//! // Switch the language model
//! let mut value = serde_json::Map::new();
//! value.insert("together_api_key".into(), "x".into());
//! client.llm().upsert_setting("together", value).await?;
//!
//! // Recall memories
//! let recalled = client.memory().recall("the white rabbit", 5).await?;
//! println!("{:?}", recalled.vectors.collections.episodic);
//! # Ok(())
//! # }
//! ```
//!
//! # API Coverage
//!
//! - **Status**: Root health check
//! - **Settings**: List, get, create, update, delete settings
//! - **LLM**: List, get and upsert language model settings
//! - **Embedder**: List, get and upsert embedder settings
//! - **Plugins**: List, install (upload or registry), toggle, settings, detail, delete
//! - **Memory**: Recall, collections, point deletion, conversation history
//! - **Rabbit hole**: Document, URL and memory ingestion, allowed MIME types
//!
//! # Errors
//!
//! Failed calls return [`Error`]. Server-reported failures are classified
//! by body shape: a list of field errors ([`Error::Validation`]), a single
//! message ([`Error::Api`]), or anything else on a non-2xx status
//! ([`Error::Unknown`]).

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod types;
pub mod upload;

pub use client::{CatClient, ClientBuilder};
pub use config::{ClientConfig, ClientOption, Codec};
pub use error::{ApiFieldError, Error, Result};
pub use types::*;
pub use upload::UploadFile;
