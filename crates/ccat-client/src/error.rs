//! Client error types and error envelope classification.

use std::fmt;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Boxed error produced by pluggable encode/decode functions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP transport failed (DNS, connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured base URL (plus path) is not a valid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A path parameter is empty or a dot segment and would address a
    /// different endpoint.
    #[error("Invalid path parameter: {0:?}")]
    InvalidPathSegment(String),

    /// A configured value cannot be sent as an HTTP header.
    #[error("Invalid {name} header: {reason}")]
    InvalidHeader {
        /// Header name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The request payload could not be encoded.
    #[error("Failed to encode request: {0}")]
    Encode(#[source] BoxError),

    /// The response body could not be decoded into the expected type.
    #[error("Failed to decode response: {0}")]
    Decode(#[source] BoxError),

    /// Server reported a list of structured field errors.
    #[error("API error ({status}):\n{}", render_field_errors(errors))]
    Validation {
        /// HTTP status code.
        status: u16,
        /// Field errors as reported by the server.
        errors: Vec<ApiFieldError>,
    },

    /// Server reported a single error message.
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from server.
        message: String,
    },

    /// Server failed with a body matching no known error envelope.
    #[error("unknown error: {status} - {body}")]
    Unknown {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// An upload was attempted without a file.
    #[error("upload failed: missing file")]
    MissingFile,

    /// Reading a local upload source failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// HTTP status code associated with this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Validation { status, .. }
            | Error::Api { status, .. }
            | Error::Unknown { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if the server classified the call as failed.
    pub fn is_api_error(&self) -> bool {
        matches!(
            self,
            Error::Validation { .. } | Error::Api { .. } | Error::Unknown { .. }
        )
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::InvalidHeader { name: "Authorization", .. })
            || matches!(self.status(), Some(401 | 403))
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        matches!(self.status(), Some(status) if status >= 500)
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A single structured field error, as produced by request validation on
/// the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiFieldError {
    /// Error type identifier.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Location of the offending field (path segments or indices).
    #[serde(default)]
    pub loc: Vec<serde_json::Value>,
    /// Human-readable message.
    pub msg: String,
    /// The offending input.
    #[serde(default)]
    pub input: serde_json::Value,
    /// Reference URL describing the error.
    #[serde(default)]
    pub url: String,
}

impl fmt::Display for ApiFieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = self
            .loc
            .iter()
            .map(|segment| match segment {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ");

        writeln!(f, "type: {}", self.kind)?;
        writeln!(f, "location: {}", location)?;
        write!(f, "message: {}", self.msg)?;
        if !self.input.is_null() {
            write!(f, "\ninput: {}", self.input)?;
        }
        write!(f, "\nurl: {}", self.url)
    }
}

fn render_field_errors(errors: &[ApiFieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// `{"error": [{...}, ...]}`
#[derive(Deserialize)]
struct FieldErrorsEnvelope {
    error: Vec<ApiFieldError>,
}

/// `{"error": "..."}`
#[derive(Deserialize)]
struct MessageEnvelope {
    error: String,
}

/// Match a decoded body against the known error envelopes.
///
/// The structured list is tried before the flat message; the first shape
/// that parses wins.
pub(crate) fn classify(status: StatusCode, body: &serde_json::Value) -> Option<Error> {
    let status = status.as_u16();

    if let Ok(envelope) = FieldErrorsEnvelope::deserialize(body) {
        return Some(Error::Validation {
            status,
            errors: envelope.error,
        });
    }

    if let Ok(envelope) = MessageEnvelope::deserialize(body) {
        return Some(Error::Api {
            status,
            message: envelope.error,
        });
    }

    None
}

/// Build the fallback error for a failed response whose body matched no
/// known envelope.
pub(crate) fn unknown(status: StatusCode, body: &[u8]) -> Error {
    Error::Unknown {
        status: status.as_u16(),
        body: String::from_utf8_lossy(body).into_owned(),
    }
}
