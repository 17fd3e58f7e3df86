//! Main client implementation and the shared request pipeline.

use reqwest::header::{
    ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT,
};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::api::{EmbedderApi, LlmApi, MemoryApi, PluginsApi, RabbitHoleApi, SettingsApi};
use crate::config::{self, ClientConfig, ClientOption, MarshalFn, UnmarshalFn};
use crate::error::{self, Error, Result};
use crate::types::StatusResponse;

/// Header carrying the configured user id.
const USER_ID: HeaderName = HeaderName::from_static("user_id");

const APPLICATION_JSON: &str = "application/json";

/// Cheshire Cat API client.
///
/// Provides typed access to the Cheshire Cat REST endpoints through
/// resource sub-clients.
///
/// # Example
///
/// ```no_run
/// use ccat_client::{CatClient, config};
///
/// # async fn example() -> ccat_client::Result<()> {
/// let client = CatClient::new([
///     config::with_base_url("http://localhost:1865"),
///     config::with_auth_key("meow"),
/// ]);
///
/// client.status().await?;
/// let settings = client.settings().list(Default::default()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct CatClient {
    config: ClientConfig,
}

impl CatClient {
    /// Create a client from the default configuration and the given options.
    pub fn new<I>(options: I) -> Self
    where
        I: IntoIterator<Item = ClientOption>,
    {
        Self {
            config: ClientConfig::with_options(options),
        }
    }

    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client configured from the `CCAT_*` environment variables.
    pub fn from_env() -> Self {
        Self::new(config::env_options())
    }

    /// Get the shared configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        self.config.base_url()
    }

    /// Check that the Cheshire Cat is up.
    pub async fn status(&self) -> Result<StatusResponse> {
        self.config.execute(ApiRequest::get("")).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the settings API.
    pub fn settings(&self) -> SettingsApi {
        SettingsApi::new(&self.config)
    }

    /// Access the LLM API.
    pub fn llm(&self) -> LlmApi {
        LlmApi::new(&self.config)
    }

    /// Access the embedder API.
    pub fn embedder(&self) -> EmbedderApi {
        EmbedderApi::new(&self.config)
    }

    /// Access the plugins API.
    pub fn plugins(&self) -> PluginsApi {
        PluginsApi::new(&self.config)
    }

    /// Access the memory API.
    pub fn memory(&self) -> MemoryApi {
        MemoryApi::new(&self.config)
    }

    /// Access the rabbit hole (document ingestion) API.
    pub fn rabbit_hole(&self) -> RabbitHoleApi {
        RabbitHoleApi::new(&self.config)
    }
}

impl Default for CatClient {
    fn default() -> Self {
        Self::new(std::iter::empty())
    }
}

/// Builder for creating a [`CatClient`].
///
/// Every setter records a [`ClientOption`]; options are applied in the
/// order the setters were called.
#[derive(Debug, Default)]
pub struct ClientBuilder {
    options: Vec<ClientOption>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an arbitrary option.
    pub fn option(mut self, option: ClientOption) -> Self {
        self.options.push(option);
        self
    }

    /// Set the base URL for the server.
    pub fn base_url(self, url: impl Into<String>) -> Self {
        self.option(config::with_base_url(url))
    }

    /// Set the auth key.
    pub fn auth_key(self, key: impl Into<String>) -> Self {
        self.option(config::with_auth_key(key))
    }

    /// Set a custom user agent.
    pub fn user_agent(self, agent: impl Into<String>) -> Self {
        self.option(config::with_user_agent(agent))
    }

    /// Set the user id.
    pub fn user_id(self, user_id: impl Into<String>) -> Self {
        self.option(config::with_user_id(user_id))
    }

    /// Use a preconfigured HTTP client.
    pub fn http_client(self, http: reqwest::Client) -> Self {
        self.option(config::with_http_client(Some(http)))
    }

    /// Set the payload encoder.
    pub fn marshal_fn(self, marshal: MarshalFn) -> Self {
        self.option(config::with_marshal_fn(Some(marshal)))
    }

    /// Set the response decoder.
    pub fn unmarshal_fn(self, unmarshal: UnmarshalFn) -> Self {
        self.option(config::with_unmarshal_fn(Some(unmarshal)))
    }

    /// Build the client.
    pub fn build(self) -> CatClient {
        CatClient::new(self.options)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Request pipeline
// ─────────────────────────────────────────────────────────────────────────────

/// A single API call, relative to a sub-client's base URL.
#[derive(Debug)]
pub(crate) struct ApiRequest {
    pub(crate) method: Method,
    pub(crate) path: Vec<String>,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) payload: Option<serde_json::Value>,
}

impl ApiRequest {
    /// `path` is a fixed relative path such as `"upload/registry"`.
    pub(crate) fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path
                .split('/')
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
            query: Vec::new(),
            payload: None,
        }
    }

    pub(crate) fn get(path: &str) -> Self {
        Self::new(Method::GET, path)
    }

    pub(crate) fn post(path: &str) -> Self {
        Self::new(Method::POST, path)
    }

    pub(crate) fn put(path: &str) -> Self {
        Self::new(Method::PUT, path)
    }

    pub(crate) fn delete(path: &str) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append one path segment, typically a caller-supplied id. It is
    /// percent-encoded as a whole, so `/`, `?` and `#` stay inside it.
    pub(crate) fn segment(mut self, value: impl Into<String>) -> Self {
        self.path.push(value.into());
        self
    }

    /// Add a single query pair.
    pub(crate) fn query_pair(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Add the fields of a flat struct as query pairs. `null` fields are
    /// skipped.
    pub(crate) fn query<Q: Serialize + ?Sized>(mut self, params: &Q) -> Result<Self> {
        let value = serde_json::to_value(params).map_err(|e| Error::Encode(Box::new(e)))?;
        let serde_json::Value::Object(fields) = value else {
            return Err(Error::Encode("query parameters must be a struct or map".into()));
        };

        for (key, value) in fields {
            let value = match value {
                serde_json::Value::Null => continue,
                serde_json::Value::String(s) => s,
                serde_json::Value::Bool(_) | serde_json::Value::Number(_) => value.to_string(),
                _ => {
                    return Err(Error::Encode(
                        format!("query parameter '{}' is not a scalar", key).into(),
                    ));
                }
            };
            self.query.push((key, value));
        }

        Ok(self)
    }

    /// Attach a JSON payload.
    pub(crate) fn json<P: Serialize + ?Sized>(mut self, payload: &P) -> Result<Self> {
        self.payload =
            Some(serde_json::to_value(payload).map_err(|e| Error::Encode(Box::new(e)))?);
        Ok(self)
    }
}

impl ClientConfig {
    /// Build the full URL for relative path segments and a query.
    ///
    /// Each segment is percent-encoded on its own. Empty and dot segments
    /// are rejected. Query pairs are appended only when there is at least
    /// one.
    pub(crate) fn url(&self, path: &[String], query: &[(String, String)]) -> Result<Url> {
        if let Some(segment) = path
            .iter()
            .find(|segment| matches!(segment.as_str(), "" | "." | ".."))
        {
            return Err(Error::InvalidPathSegment(segment.clone()));
        }

        let mut url = Url::parse(&self.base_url)?;
        if !path.is_empty() {
            url.path_segments_mut()
                .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithoutBase))?
                .pop_if_empty()
                .extend(path);
        }

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        Ok(url)
    }

    /// Headers sent with every request. `content_type` is omitted for
    /// multipart bodies, whose boundary is set by the form.
    pub(crate) fn headers(&self, content_type: Option<&'static str>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));
        if let Some(content_type) = content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        }

        headers.insert(USER_AGENT, header_value("User-Agent", &self.user_agent)?);
        headers.insert(USER_ID, header_value("user_id", &self.user_id)?);

        if let Some(key) = &self.auth_key {
            let mut value = header_value("Authorization", key)?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    /// Perform a JSON request and decode the response.
    pub(crate) async fn execute<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R> {
        let url = self.url(&request.path, &request.query)?;

        let mut builder = self
            .http
            .request(request.method.clone(), url.clone())
            .headers(self.headers(Some(APPLICATION_JSON))?);

        if let Some(payload) = &request.payload {
            builder = builder.body(self.codec.encode_value(payload)?);
        }

        self.send(builder, &request.method, &url).await
    }

    /// Send a prepared request, drain the body, and classify the outcome.
    pub(crate) async fn send<R: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
        method: &Method,
        url: &Url,
    ) -> Result<R> {
        tracing::debug!(%method, %url, "sending request");

        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        tracing::debug!(
            %method,
            %url,
            status = status.as_u16(),
            len = body.len(),
            "received response"
        );

        self.read_response(status, &body)
    }

    /// Turn a status and a fully read body into a typed result or an error.
    ///
    /// Known error envelopes fail the call whatever the status; any other
    /// non-2xx body becomes [`Error::Unknown`].
    pub(crate) fn read_response<R: DeserializeOwned>(
        &self,
        status: StatusCode,
        body: &[u8],
    ) -> Result<R> {
        let decoded = self.codec.decode_value(body);

        let failure = decoded
            .as_ref()
            .ok()
            .and_then(|value| error::classify(status, value))
            .or_else(|| (!status.is_success()).then(|| error::unknown(status, body)));

        if let Some(err) = failure {
            tracing::warn!(status = status.as_u16(), error = %err, "API call failed");
            return Err(err);
        }

        self.codec.decode(decoded?)
    }
}

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| Error::InvalidHeader {
        name,
        reason: e.to_string(),
    })
}
