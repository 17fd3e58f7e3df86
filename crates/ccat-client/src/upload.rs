//! Multipart file uploads.

use std::fmt;
use std::path::Path;

use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

use crate::client::ApiRequest;
use crate::config::ClientConfig;
use crate::error::{Error, Result};

/// Form field carrying the uploaded file.
pub(crate) const FILE_FIELD: &str = "file";

enum Source {
    Bytes(Vec<u8>),
    Stream {
        body: reqwest::Body,
        length: Option<u64>,
    },
}

/// A file to be sent as the file part of a multipart upload.
///
/// The content is streamed from its source while the request is sent.
pub struct UploadFile {
    file_name: String,
    mime_type: Option<String>,
    source: Source,
}

impl UploadFile {
    /// Upload from an in-memory buffer.
    pub fn from_bytes(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: None,
            source: Source::Bytes(bytes.into()),
        }
    }

    /// Upload from any async reader. The length is unknown, so the request
    /// body is sent chunked.
    pub fn from_reader<R>(file_name: impl Into<String>, reader: R) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        Self {
            file_name: file_name.into(),
            mime_type: None,
            source: Source::Stream {
                body: reqwest::Body::wrap_stream(ReaderStream::new(reader)),
                length: None,
            },
        }
    }

    /// Upload a file from disk. The part is named after the file.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = tokio::fs::File::open(path).await?;
        let length = file.metadata().await?.len();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            file_name,
            mime_type: None,
            source: Source::Stream {
                body: reqwest::Body::wrap_stream(ReaderStream::new(file)),
                length: Some(length),
            },
        })
    }

    /// Set the content type of the file part.
    ///
    /// The Cheshire Cat checks uploads against its allowed MIME types, so
    /// this usually matters for document ingestion.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// File name sent with the part.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    fn into_part(self) -> Result<Part> {
        let part = match self.source {
            Source::Bytes(bytes) => Part::bytes(bytes),
            Source::Stream {
                body,
                length: Some(length),
            } => Part::stream_with_length(body, length),
            Source::Stream { body, length: None } => Part::stream(body),
        }
        .file_name(self.file_name);

        match self.mime_type {
            Some(mime_type) => part.mime_str(&mime_type).map_err(|e| Error::InvalidHeader {
                name: "Content-Type",
                reason: e.to_string(),
            }),
            None => Ok(part),
        }
    }
}

impl fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match &self.source {
            Source::Bytes(bytes) => format!("{} bytes", bytes.len()),
            Source::Stream {
                length: Some(length),
                ..
            } => format!("stream of {} bytes", length),
            Source::Stream { length: None, .. } => "stream".to_string(),
        };

        f.debug_struct("UploadFile")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("source", &source)
            .finish()
    }
}

impl ClientConfig {
    /// Perform a multipart request with one file part and optional text
    /// fields, then decode the response like [`ClientConfig::execute`].
    ///
    /// Fails with [`Error::MissingFile`] before touching the network when
    /// `file` is `None`.
    pub(crate) async fn execute_upload<R: DeserializeOwned>(
        &self,
        request: ApiRequest,
        field_name: &str,
        file: Option<UploadFile>,
        extra_fields: Vec<(String, String)>,
    ) -> Result<R> {
        let file = file.ok_or(Error::MissingFile)?;
        let url = self.url(&request.path, &request.query)?;

        let mut form = Form::new().part(field_name.to_string(), file.into_part()?);
        for (name, value) in extra_fields {
            form = form.text(name, value);
        }

        let builder = self
            .http
            .request(request.method.clone(), url.clone())
            .headers(self.headers(None)?)
            .multipart(form);

        self.send(builder, &request.method, &url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_fails_before_request() {
        // Nothing listens here; reaching the network would yield an HTTP error.
        let config = ClientConfig::with_options([crate::config::with_base_url(
            "http://127.0.0.1:9",
        )]);

        let result: Result<serde_json::Value> = config
            .execute_upload(ApiRequest::post("upload"), FILE_FIELD, None, Vec::new())
            .await;

        assert!(matches!(result, Err(Error::MissingFile)));
    }

    #[test]
    fn test_invalid_mime_type() {
        let file = UploadFile::from_bytes("a.txt", "hello").with_mime_type("not a mime");
        let err = file.into_part().unwrap_err();
        assert!(matches!(err, Error::InvalidHeader { name: "Content-Type", .. }));
    }

    /// A reader that is `Send` but not `Sync`.
    struct UnsyncReader {
        inner: std::io::Cursor<Vec<u8>>,
        _not_sync: std::marker::PhantomData<std::cell::Cell<()>>,
    }

    impl AsyncRead for UnsyncReader {
        fn poll_read(
            mut self: std::pin::Pin<&mut Self>,
            cx: &mut std::task::Context<'_>,
            buf: &mut tokio::io::ReadBuf<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::pin::Pin::new(&mut self.inner).poll_read(cx, buf)
        }
    }

    #[test]
    fn test_from_reader_accepts_unsync_reader() {
        let reader = UnsyncReader {
            inner: std::io::Cursor::new(b"chunked".to_vec()),
            _not_sync: std::marker::PhantomData,
        };

        let file = UploadFile::from_reader("notes.txt", reader);
        assert_eq!(file.file_name(), "notes.txt");
        assert!(format!("{:?}", file).contains("\"stream\""));
        assert!(file.into_part().is_ok());
    }

    #[test]
    fn test_debug_output() {
        let file = UploadFile::from_bytes("notes.txt", "hello");
        let debug = format!("{:?}", file);
        assert!(debug.contains("notes.txt"));
        assert!(debug.contains("5 bytes"));
    }

    #[tokio::test]
    async fn test_open_uses_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plugin.zip");
        tokio::fs::write(&path, b"PK\x03\x04").await.unwrap();

        let file = UploadFile::open(&path).await.unwrap();
        assert_eq!(file.file_name(), "plugin.zip");
        assert!(format!("{:?}", file).contains("stream of 4 bytes"));
    }

    #[tokio::test]
    async fn test_open_missing_path() {
        let err = UploadFile::open("/definitely/not/here.pdf").await.unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
