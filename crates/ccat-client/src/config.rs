//! Client configuration built from ordered options.
//!
//! A [`ClientConfig`] starts from a fixed baseline and is modified by a
//! sequence of [`ClientOption`]s applied left to right. Later options win
//! for the same field, and every option falls back to the baseline value
//! when given an empty input:
//!
//! ```
//! use ccat_client::config::{self, ClientConfig, DEFAULT_BASE_URL};
//!
//! let config = ClientConfig::with_options([
//!     config::with_base_url("https://cat.example.com"),
//!     config::with_auth_key("meow"),
//!     config::with_base_url(""),
//! ]);
//!
//! assert_eq!(config.base_url(), DEFAULT_BASE_URL);
//! assert_eq!(config.auth_key(), Some("meow"));
//! ```
//!
//! Nothing is validated here. A malformed URL or header value surfaces as
//! an error on the first request.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::error::{BoxError, Error, Result};

/// Base URL of a locally running Cheshire Cat.
pub const DEFAULT_BASE_URL: &str = "http://localhost:1865";

/// User agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = "ccat-api";

/// User id sent when none is configured.
pub const DEFAULT_USER_ID: &str = "user";

/// Environment variable overriding the base URL.
pub const ENV_BASE_URL: &str = "CCAT_BASE_URL";

/// Environment variable overriding the user agent.
pub const ENV_USER_AGENT: &str = "CCAT_USER_AGENT";

/// Environment variable overriding the user id.
pub const ENV_USER_ID: &str = "CCAT_USER_ID";

/// Environment variable holding the auth key.
pub const ENV_AUTH_KEY: &str = "CCAT_AUTH_KEY";

/// Encodes a request payload to bytes.
pub type MarshalFn =
    Arc<dyn Fn(&serde_json::Value) -> std::result::Result<Vec<u8>, BoxError> + Send + Sync>;

/// Decodes a response body from bytes.
pub type UnmarshalFn =
    Arc<dyn Fn(&[u8]) -> std::result::Result<serde_json::Value, BoxError> + Send + Sync>;

fn json_marshal() -> MarshalFn {
    Arc::new(|value: &serde_json::Value| {
        serde_json::to_vec(value).map_err(BoxError::from)
    })
}

fn json_unmarshal() -> UnmarshalFn {
    Arc::new(|bytes: &[u8]| serde_json::from_slice(bytes).map_err(BoxError::from))
}

/// Pair of encode/decode functions used for request and response bodies.
///
/// Typed values pass through `serde_json::Value` on both sides, so a custom
/// codec only has to deal with the wire format.
#[derive(Clone)]
pub struct Codec {
    marshal: MarshalFn,
    unmarshal: UnmarshalFn,
}

impl Codec {
    /// The default `serde_json` codec.
    pub fn json() -> Self {
        Self {
            marshal: json_marshal(),
            unmarshal: json_unmarshal(),
        }
    }

    /// Encode a request payload.
    pub(crate) fn encode_value(&self, value: &serde_json::Value) -> Result<Vec<u8>> {
        (self.marshal)(value).map_err(Error::Encode)
    }

    /// Decode raw body bytes. An empty (or all-whitespace) body is `null`.
    pub fn decode_value(&self, bytes: &[u8]) -> Result<serde_json::Value> {
        if bytes.trim_ascii().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        (self.unmarshal)(bytes).map_err(Error::Decode)
    }

    /// Convert a decoded body into the expected response type.
    pub fn decode<T: DeserializeOwned>(&self, value: serde_json::Value) -> Result<T> {
        serde_json::from_value(value).map_err(|e| Error::Decode(Box::new(e)))
    }
}

impl Default for Codec {
    fn default() -> Self {
        Self::json()
    }
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec").finish_non_exhaustive()
    }
}

/// Transport settings shared by the root client and every sub-client.
#[derive(Clone)]
pub struct ClientConfig {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: String,
    pub(crate) user_agent: String,
    pub(crate) user_id: String,
    pub(crate) auth_key: Option<String>,
    pub(crate) codec: Codec,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            user_id: DEFAULT_USER_ID.to_string(),
            auth_key: None,
            codec: Codec::json(),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .field("user_id", &self.user_id)
            .field("auth_key", &self.auth_key.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl ClientConfig {
    /// Build a configuration from the baseline and the given options.
    pub fn with_options<I>(options: I) -> Self
    where
        I: IntoIterator<Item = ClientOption>,
    {
        let mut config = Self::default();
        config.apply(options);
        config
    }

    /// Apply options in order.
    pub fn apply<I>(&mut self, options: I)
    where
        I: IntoIterator<Item = ClientOption>,
    {
        for option in options {
            option.apply(self);
        }
    }

    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// User agent header value.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// User id header value.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Auth key, if one is configured.
    pub fn auth_key(&self) -> Option<&str> {
        self.auth_key.as_deref()
    }

    /// Body codec.
    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    /// Copy of this configuration with `segment` appended to the base URL.
    pub(crate) fn scoped(&self, segment: &str) -> Self {
        let mut config = self.clone();
        config.base_url = format!("{}/{}", self.base_url, segment.trim_matches('/'));
        config
    }
}

/// A deferred mutation of a [`ClientConfig`].
pub struct ClientOption(Box<dyn FnOnce(&mut ClientConfig) + Send>);

impl ClientOption {
    /// Wrap an arbitrary configuration mutation.
    pub fn new(f: impl FnOnce(&mut ClientConfig) + Send + 'static) -> Self {
        Self(Box::new(f))
    }

    /// Apply this option to a configuration.
    pub fn apply(self, config: &mut ClientConfig) {
        (self.0)(config)
    }
}

impl fmt::Debug for ClientOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ClientOption")
    }
}

/// Replace the whole configuration.
pub fn with_config(new_config: ClientConfig) -> ClientOption {
    ClientOption::new(move |config| *config = new_config)
}

/// Use a specific HTTP client. `None` restores the default client.
pub fn with_http_client(http: Option<reqwest::Client>) -> ClientOption {
    ClientOption::new(move |config| config.http = http.unwrap_or_default())
}

/// Set the base URL. An empty URL (or `/`) restores [`DEFAULT_BASE_URL`].
pub fn with_base_url(base_url: impl Into<String>) -> ClientOption {
    let base_url = base_url.into();
    ClientOption::new(move |config| {
        let trimmed = base_url.trim().trim_end_matches('/');
        config.base_url = if trimmed.is_empty() {
            DEFAULT_BASE_URL.to_string()
        } else {
            trimmed.to_string()
        };
    })
}

/// Set the user agent. An empty value restores [`DEFAULT_USER_AGENT`].
pub fn with_user_agent(user_agent: impl Into<String>) -> ClientOption {
    let user_agent = user_agent.into();
    ClientOption::new(move |config| {
        config.user_agent = if user_agent.is_empty() {
            DEFAULT_USER_AGENT.to_string()
        } else {
            user_agent
        };
    })
}

/// Set the user id. An empty value restores [`DEFAULT_USER_ID`].
pub fn with_user_id(user_id: impl Into<String>) -> ClientOption {
    let user_id = user_id.into();
    ClientOption::new(move |config| {
        config.user_id = if user_id.is_empty() {
            DEFAULT_USER_ID.to_string()
        } else {
            user_id
        };
    })
}

/// Set the auth key sent as the `Authorization` header. An empty key
/// disables the header.
pub fn with_auth_key(auth_key: impl Into<String>) -> ClientOption {
    let auth_key = auth_key.into();
    ClientOption::new(move |config| {
        config.auth_key = Some(auth_key).filter(|key| !key.is_empty());
    })
}

/// Set the payload encoder. `None` restores the JSON encoder.
pub fn with_marshal_fn(marshal: Option<MarshalFn>) -> ClientOption {
    ClientOption::new(move |config| {
        config.codec.marshal = marshal.unwrap_or_else(json_marshal);
    })
}

/// Set the response decoder. `None` restores the JSON decoder.
pub fn with_unmarshal_fn(unmarshal: Option<UnmarshalFn>) -> ClientOption {
    ClientOption::new(move |config| {
        config.codec.unmarshal = unmarshal.unwrap_or_else(json_unmarshal);
    })
}

/// Options derived from the `CCAT_*` environment variables.
pub fn env_options() -> Vec<ClientOption> {
    env_options_from(|key| std::env::var(key).ok())
}

/// Options derived from a variable lookup. Unset variables contribute
/// nothing.
pub fn env_options_from<F>(mut lookup: F) -> Vec<ClientOption>
where
    F: FnMut(&str) -> Option<String>,
{
    let mut options = Vec::new();

    if let Some(base_url) = lookup(ENV_BASE_URL) {
        options.push(with_base_url(base_url));
    }
    if let Some(user_agent) = lookup(ENV_USER_AGENT) {
        options.push(with_user_agent(user_agent));
    }
    if let Some(user_id) = lookup(ENV_USER_ID) {
        options.push(with_user_id(user_id));
    }
    if let Some(auth_key) = lookup(ENV_AUTH_KEY) {
        options.push(with_auth_key(auth_key));
    }

    options
}
