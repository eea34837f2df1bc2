//! Response bodies for the REST endpoints.

use serde::{Deserialize, Serialize};

/// Body of `POST /convert/json`, for success and failure alike.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    /// Converted document, base64 encoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConvertResponse {
    pub fn ok(from: String, to: String, content: String, filename: String) -> Self {
        Self {
            success: true,
            from: Some(from),
            to: Some(to),
            content: Some(content),
            filename: Some(filename),
            message: Some("Conversion successful".to_string()),
            error: None,
        }
    }

    pub fn failed(from: Option<String>, to: Option<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            from,
            to,
            content: None,
            filename: None,
            message: None,
            error: Some(error.into()),
        }
    }
}

/// `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `GET /`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfoResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    /// Version line cached at startup; `None` when no tool was found.
    pub tool_version: Option<String>,
    pub uptime_seconds: u64,
}

/// `GET /formats`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormatsResponse {
    pub input: Vec<String>,
    pub output: Vec<String>,
}
