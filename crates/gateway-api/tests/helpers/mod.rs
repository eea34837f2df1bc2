//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use axum::Router;
use axum::body::Body;
use bytes::Bytes;
use http::{HeaderMap, Request, StatusCode, header};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use gateway_api::{AppState, build_router};
use gateway_converter::{ConversionService, ResolvedTool, ToolStatus};
use gateway_core::config::AppConfig;

/// Fake conversion tool shared with the converter's unit tests.
const FAKE_PANDOC: &str = include_str!("../../../gateway-converter/fixtures/fake-pandoc.sh");

pub const BOUNDARY: &str = "pandoc-gateway-test-boundary";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for inspecting the converter
    pub state: AppState,
    /// Temp root used by the converter
    pub temp: TempDir,
    _tool_dir: TempDir,
}

impl TestApp {
    /// App backed by the fake tool with default settings
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// App backed by the fake tool, with config tweaks applied
    pub fn with_config(configure: impl FnOnce(&mut AppConfig)) -> Self {
        let tool_dir = tempfile::tempdir().expect("tool dir");
        let program = tool_dir.path().join("pandoc");
        std::fs::write(&program, FAKE_PANDOC).expect("write fake tool");
        std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o755))
            .expect("chmod fake tool");

        let status = ToolStatus::Ready(ResolvedTool {
            program: program.to_string_lossy().into_owned(),
            version: "pandoc 3.1.9".to_string(),
        });
        Self::build(status, tool_dir, configure)
    }

    /// App whose tool could not be located at startup
    pub fn unavailable() -> Self {
        let tool_dir = tempfile::tempdir().expect("tool dir");
        let status = ToolStatus::Unavailable {
            reason: "none of [\"pandoc\"] answered --version".to_string(),
        };
        Self::build(status, tool_dir, |_| {})
    }

    fn build(
        status: ToolStatus,
        tool_dir: TempDir,
        configure: impl FnOnce(&mut AppConfig),
    ) -> Self {
        let temp = tempfile::tempdir().expect("temp root");
        let mut config = AppConfig::default();
        config.converter.temp_root = Some(temp.path().to_path_buf());
        configure(&mut config);

        let converter = ConversionService::new(status, &config.converter).expect("converter");
        let state = AppState::new(config, converter);

        Self {
            router: build_router(state.clone()),
            state,
            temp,
            _tool_dir: tool_dir,
        }
    }

    /// Send a request and collect the raw response
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        (status, headers, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request");
        let (status, _, body) = self.send(request).await;
        (status, parse_json(&body))
    }

    pub async fn post_json(&self, uri: &str, body: &Value) -> (StatusCode, Value) {
        self.post_raw_json(uri, body.to_string()).await
    }

    pub async fn post_raw_json(&self, uri: &str, body: impl Into<String>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.into()))
            .expect("request");
        let (status, _, body) = self.send(request).await;
        (status, parse_json(&body))
    }

    pub async fn post_form(&self, form: Vec<u8>) -> (StatusCode, HeaderMap, Bytes) {
        let request = Request::builder()
            .method("POST")
            .uri("/convert")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(form))
            .expect("request");
        self.send(request).await
    }

    pub async fn rpc(&self, envelope: &Value) -> Value {
        let (status, body) = self.post_json("/rpc", envelope).await;
        assert_eq!(status, StatusCode::OK, "JSON-RPC always answers 200");
        body
    }

    /// Files left in the converter's temp root
    pub fn temp_entries(&self) -> usize {
        count_entries(self.temp.path())
    }
}

pub fn parse_json(body: &[u8]) -> Value {
    serde_json::from_slice(body).expect("JSON body")
}

fn count_entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).expect("read temp root").count()
}

/// Hand-built multipart body
#[derive(Default)]
pub struct FormBuilder {
    body: Vec<u8>,
}

impl FormBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}
