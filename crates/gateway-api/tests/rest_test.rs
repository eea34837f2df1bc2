#![cfg(unix)]

mod helpers;

use http::{StatusCode, header};
use serde_json::json;

use gateway_converter::codec::{decode_base64, encode_base64};
use helpers::{FormBuilder, TestApp, parse_json};

#[tokio::test]
async fn test_form_content_html_to_plain() {
    let app = TestApp::new();
    let form = FormBuilder::new()
        .text("from", "html")
        .text("to", "plain")
        .text("content", "<p>Hello</p>")
        .finish();

    let (status, headers, body) = app.post_form(form).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
        Some("application/octet-stream")
    );
    assert_eq!(
        headers
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok()),
        Some("attachment; filename=\"output.txt\"")
    );
    assert_eq!(String::from_utf8_lossy(&body).trim(), "Hello");
    assert_eq!(app.temp_entries(), 0);
}

#[tokio::test]
async fn test_form_base64_content_is_decoded() {
    let app = TestApp::new();
    let form = FormBuilder::new()
        .text("from", "html")
        .text("to", "plain")
        .text("content", &encode_base64(b"<b>Bold</b>"))
        .finish();

    let (status, _, body) = app.post_form(form).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8_lossy(&body).trim(), "Bold");
}

#[tokio::test]
async fn test_form_file_upload_wins() {
    let app = TestApp::new();
    let form = FormBuilder::new()
        .text("from", "markdown")
        .text("to", "docx")
        .text("content", "from the text field")
        .file("file", "report.md", b"# From the upload")
        .text("standalone", "true")
        .text("filters", "citeproc, ")
        .text("metadata", r#"{"title": "Report"}"#)
        .finish();

    let (status, headers, body) = app.post_form(form).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], b"# From the upload");
    assert_eq!(
        headers
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok()),
        Some("attachment; filename=\"output.docx\"")
    );
}

#[tokio::test]
async fn test_form_requires_file_or_content() {
    let app = TestApp::new();
    let form = FormBuilder::new()
        .text("from", "html")
        .text("to", "plain")
        .text("content", "")
        .finish();

    let (status, _, body) = app.post_form(form).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        parse_json(&body)["message"],
        "Either 'file' or 'content' must be provided"
    );
    assert_eq!(app.temp_entries(), 0);
}

#[tokio::test]
async fn test_form_malformed_json_field() {
    let app = TestApp::new();
    let form = FormBuilder::new()
        .text("from", "markdown")
        .text("to", "html")
        .text("content", "# Hi")
        .text("extra_args", "[\"--toc\"")
        .finish();

    let (status, _, body) = app.post_form(form).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(parse_json(&body)["message"], "Invalid JSON in 'extra_args' parameter");
}

#[tokio::test]
async fn test_form_tool_failure_surfaces_stderr() {
    let app = TestApp::new();
    let form = FormBuilder::new()
        .text("from", "markdown")
        .text("to", "nope")
        .text("content", "# Hi")
        .finish();

    let (status, _, body) = app.post_form(form).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let body = parse_json(&body);
    assert_eq!(body["error"], "CONVERSION_FAILED");
    assert!(
        body["message"]
            .as_str()
            .unwrap_or_default()
            .contains("Unknown output format nope")
    );
    assert_eq!(app.temp_entries(), 0);
}

#[tokio::test]
async fn test_form_not_multipart_is_rejected() {
    let app = TestApp::new();
    let (status, _) = app.post_raw_json("/convert", "{}").await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_json_success() {
    let app = TestApp::new();
    let (status, body) = app
        .post_json(
            "/convert/json",
            &json!({"from": "html", "to": "plain", "content": encode_base64(b"<p>Hello</p>")}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["from"], "html");
    assert_eq!(body["to"], "plain");
    assert_eq!(body["filename"], "output.txt");
    assert_eq!(body["message"], "Conversion successful");

    let content = decode_base64(body["content"].as_str().unwrap_or_default()).expect("base64");
    assert_eq!(String::from_utf8_lossy(&content).trim(), "Hello");
}

#[tokio::test]
async fn test_json_raw_text_fallback() {
    let app = TestApp::new();
    let (status, body) = app
        .post_json(
            "/convert/json",
            &json!({"from_format": "html", "to_format": "plain", "content": "<i>raw</i>"}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let content = decode_base64(body["content"].as_str().unwrap_or_default()).expect("base64");
    assert_eq!(String::from_utf8_lossy(&content).trim(), "raw");
}

#[tokio::test]
async fn test_json_missing_content() {
    let app = TestApp::new();
    let (status, body) = app
        .post_json("/convert/json", &json!({"from": "html", "to": "plain"}))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "'content' field is required");
}

#[tokio::test]
async fn test_json_empty_format_creates_no_files() {
    let app = TestApp::new();
    let (status, body) = app
        .post_json(
            "/convert/json",
            &json!({"from": "", "to": "plain", "content": encode_base64(b"x")}),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Invalid input format: ''");
    assert_eq!(body["to"], "plain");
    assert_eq!(app.temp_entries(), 0);
}

#[tokio::test]
async fn test_json_unparsable_body() {
    let app = TestApp::new();
    let (status, body) = app.post_raw_json("/convert/json", "{\"from\": ").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body.get("from").is_none());
}

#[tokio::test]
async fn test_json_unavailable_tool() {
    let app = TestApp::unavailable();
    let (status, body) = app
        .post_json(
            "/convert/json",
            &json!({"from": "markdown", "to": "html", "content": encode_base64(b"# Hi")}),
        )
        .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
    assert_eq!(app.temp_entries(), 0);
}

#[tokio::test]
async fn test_json_timeout() {
    let app = TestApp::with_config(|c| c.converter.timeout_seconds = 1);
    let (status, body) = app
        .post_json(
            "/convert/json",
            &json!({"from": "markdown", "to": "slow", "content": encode_base64(b"# Hi")}),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap_or_default().contains("timed out"));
    assert_eq!(app.state.converter.live_resources(), 0);
    assert_eq!(app.temp_entries(), 0);
}
