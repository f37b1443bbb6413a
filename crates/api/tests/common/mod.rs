//! Shared helpers for API integration tests.
//!
//! Tests build the app through the same [`finsight_api::router`] path as
//! the production binary, so the full middleware stack is exercised.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use finsight_api::config::ServerConfig;
use finsight_api::router::build_app_router;
use finsight_api::state::AppState;

/// Server configuration for tests: defaults everywhere, plus a unique
/// temporary upload directory so parallel tests never collide.
pub fn test_config() -> ServerConfig {
    let upload_dir = std::env::temp_dir()
        .join(format!("finsight-test-{}", Uuid::new_v4()))
        .to_string_lossy()
        .into_owned();

    ServerConfig {
        host: "127.0.0.1".into(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".into()],
        request_timeout_secs: 30,
        upload_dir,
        queue_ttl_secs: 3600,
    }
}

/// Build the full application router over the given pool.
pub fn test_app(pool: PgPool) -> Router {
    test_app_with_config(pool, test_config())
}

/// Build the router with an explicit config, for tests that need to
/// inspect the upload directory afterwards.
pub fn test_app_with_config(pool: PgPool, config: ServerConfig) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

/// Send a GET request to the app.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request"),
    )
    .await
    .expect("response")
}

/// Collect a response body into JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("valid JSON body")
}

// ---------------------------------------------------------------------------
// Multipart submission helpers
// ---------------------------------------------------------------------------

const BOUNDARY: &str = "finsight-test-boundary";

/// Hand-rolled `multipart/form-data` body builder. Good enough for tests;
/// no escaping of field names or filenames.
#[derive(Default)]
pub struct MultipartBody {
    buf: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.buf.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, bytes: &[u8]) -> Self {
        self.buf.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
                 filename=\"{filename}\"\r\nContent-Type: application/pdf\r\n\r\n"
            )
            .as_bytes(),
        );
        self.buf.extend_from_slice(bytes);
        self.buf.extend_from_slice(b"\r\n");
        self
    }

    pub fn into_request(mut self, uri: &str) -> Request<Body> {
        self.buf
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(self.buf))
            .expect("request")
    }
}

/// Submit a well-formed PDF upload and return the response.
pub async fn submit_pdf(app: Router, filename: &str, query: Option<&str>) -> Response<Body> {
    let mut body = MultipartBody::new().file("file", filename, b"%PDF-1.4 test document");
    if let Some(q) = query {
        body = body.text("query", q);
    }
    app.oneshot(body.into_request("/analyze"))
        .await
        .expect("response")
}
