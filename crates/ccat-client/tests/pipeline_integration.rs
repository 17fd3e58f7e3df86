//! Request pipeline integration tests.
//!
//! These tests verify headers, error classification and codecs against a
//! mock server.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use ccat_client::config::{self, MarshalFn, UnmarshalFn};
use ccat_client::error::BoxError;
use ccat_client::{CatClient, Error};
use serde_json::json;
use wiremock::matchers::{any, body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_status() -> Result<()> {
    let (server, client) = common::setup().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "We're all mad here, dear!"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let status = client.status().await?;
    assert_eq!(status.status, "We're all mad here, dear!");

    Ok(())
}

#[tokio::test]
async fn test_default_headers() -> Result<()> {
    let (server, client) = common::setup().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("accept", "application/json"))
        .and(header("content-type", "application/json"))
        .and(header("user-agent", "ccat-api"))
        .and(header("user_id", "user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    client.status().await?;

    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));

    Ok(())
}

#[tokio::test]
async fn test_configured_headers() -> Result<()> {
    let (server, _) = common::setup().await;
    let client = CatClient::builder()
        .base_url(server.uri())
        .auth_key("meow")
        .user_agent("cheshire-rust")
        .user_id("alice")
        .build();

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("authorization", "meow"))
        .and(header("user-agent", "cheshire-rust"))
        .and(header("user_id", "alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    client.status().await?;

    Ok(())
}

#[tokio::test]
async fn test_structured_errors_on_client_error() -> Result<()> {
    let (server, client) = common::setup().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "error": [
                {"type": "missing", "loc": ["body", "name"], "msg": "Field required", "input": {}, "url": "https://errors.pydantic.dev"},
                {"type": "int_parsing", "loc": ["query", "k"], "msg": "Input should be a valid integer", "input": "x", "url": "https://errors.pydantic.dev"}
            ]
        })))
        .mount(&server)
        .await;

    match client.status().await {
        Err(Error::Validation { status, errors }) => {
            assert_eq!(status, 422);
            assert_eq!(errors.len(), 2);
            assert_eq!(errors[1].msg, "Input should be a valid integer");
            assert_eq!(errors[1].input, json!("x"));
        }
        other => panic!("expected validation error, got {:?}", other),
    }

    Ok(())
}

#[tokio::test]
async fn test_flat_error_message() -> Result<()> {
    let (server, client) = common::setup().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"error": "Invalid Credentials"})),
        )
        .mount(&server)
        .await;

    let err = client.status().await.unwrap_err();
    assert!(matches!(&err, Error::Api { status: 403, message } if message == "Invalid Credentials"));
    assert!(err.is_auth_error());
    assert_eq!(err.to_string(), "Invalid Credentials");

    Ok(())
}

#[tokio::test]
async fn test_error_envelope_on_success_status() -> Result<()> {
    let (server, client) = common::setup().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "Cat is sleeping"})))
        .mount(&server)
        .await;

    let err = client.status().await.unwrap_err();
    assert!(matches!(err, Error::Api { status: 200, .. }));

    Ok(())
}

#[tokio::test]
async fn test_unknown_error_keeps_raw_body() -> Result<()> {
    let (server, client) = common::setup().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream connect error"))
        .mount(&server)
        .await;

    match client.status().await {
        Err(Error::Unknown { status, body }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "upstream connect error");
        }
        other => panic!("expected unknown error, got {:?}", other),
    }

    Ok(())
}

#[tokio::test]
async fn test_unknown_error_for_unrecognized_json() -> Result<()> {
    let (server, client) = common::setup().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not Found"})))
        .mount(&server)
        .await;

    let err = client.status().await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), r#"unknown error: 404 - {"detail":"Not Found"}"#);

    Ok(())
}

#[tokio::test]
async fn test_undecodable_success_body() -> Result<()> {
    let (server, client) = common::setup().await;

    Mock::given(method("GET"))
        .and(path("/memory/collections"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>hello</html>"))
        .mount(&server)
        .await;

    let err = client.memory().collections().await.unwrap_err();
    assert!(matches!(err, Error::Decode(_)));

    Ok(())
}

#[tokio::test]
async fn test_transport_error() -> Result<()> {
    let client = CatClient::new([config::with_base_url("http://127.0.0.1:1")]);

    let err = client.status().await.unwrap_err();
    assert!(matches!(err, Error::Http(_)));
    assert!(!err.is_api_error());

    Ok(())
}

#[tokio::test]
async fn test_malformed_base_url() -> Result<()> {
    let client = CatClient::new([config::with_base_url("cheshire cat")]);

    let err = client.settings().list(Default::default()).await.unwrap_err();
    assert!(matches!(err, Error::InvalidUrl(_)));

    Ok(())
}

#[tokio::test]
async fn test_invalid_auth_key_fails_before_request() -> Result<()> {
    let (server, _) = common::setup().await;
    let client = CatClient::new([
        config::with_base_url(server.uri()),
        config::with_auth_key("line\nbreak"),
    ]);

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client.status().await.unwrap_err();
    assert!(err.is_auth_error());

    Ok(())
}

#[tokio::test]
async fn test_custom_codec() -> Result<()> {
    let (server, _) = common::setup().await;
    let decoded = Arc::new(AtomicUsize::new(0));

    let marshal: MarshalFn = Arc::new(
        |value: &serde_json::Value| -> std::result::Result<Vec<u8>, BoxError> {
            Ok(serde_json::to_vec(&json!({"wrapped": value}))?)
        },
    );
    let counter = decoded.clone();
    let unmarshal: UnmarshalFn = Arc::new(
        move |bytes: &[u8]| -> std::result::Result<serde_json::Value, BoxError> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(serde_json::from_slice(bytes)?)
        },
    );

    let client = CatClient::new([
        config::with_base_url(server.uri()),
        config::with_marshal_fn(Some(marshal)),
        config::with_unmarshal_fn(Some(unmarshal)),
    ]);

    Mock::given(method("POST"))
        .and(path("/plugins/upload/registry"))
        .and(body_json(json!({"wrapped": {"url": "https://github.com/cheshire-cat-ai/plugin"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "file_name": "plugin.zip",
            "content_type": "application/zip",
            "info": "Plugin is being installed asynchronously"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client
        .plugins()
        .upload_from_registry("https://github.com/cheshire-cat-ai/plugin")
        .await?;
    assert_eq!(response.file_name, "plugin.zip");
    assert_eq!(decoded.load(Ordering::SeqCst), 1);

    Ok(())
}
