//! API endpoint implementations.
//!
//! Each sub-client owns a copy of the shared configuration whose base URL
//! carries the resource segment (`/settings`, `/llm`, ...).

mod embedder;
mod llm;
mod memory;
mod plugins;
mod rabbit_hole;
mod settings;

pub use embedder::EmbedderApi;
pub use llm::LlmApi;
pub use memory::MemoryApi;
pub use plugins::PluginsApi;
pub use rabbit_hole::RabbitHoleApi;
pub use settings::SettingsApi;
