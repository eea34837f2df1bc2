//! Data models for the conversion pipeline.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A document metadata value.
///
/// A JSON string deserializes to [`MetadataValue::Text`]; anything else
/// (numbers, booleans, arrays, objects, null) to
/// [`MetadataValue::Structured`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    /// Emitted verbatim.
    Text(String),
    /// Emitted as compact JSON.
    Structured(serde_json::Value),
}

impl MetadataValue {
    /// Render the value as it appears after `key=` on the command line.
    pub fn render(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            // Display for Value is the compact serializer
            Self::Structured(value) => value.to_string(),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<serde_json::Value> for MetadataValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(text) => Self::Text(text),
            other => Self::Structured(other),
        }
    }
}

/// The canonical, protocol-agnostic conversion request.
///
/// Maps are `BTreeMap` so the generated command line is the same on
/// every call for the same request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversionRequest {
    /// Input format identifier (e.g. `markdown`).
    pub from_format: String,
    /// Output format identifier (e.g. `docx`).
    pub to_format: String,
    /// Raw input document.
    pub content: Bytes,
    /// Produce a standalone document.
    pub standalone: bool,
    /// Template file path or name.
    pub template: Option<String>,
    /// Template variables.
    pub variables: BTreeMap<String, String>,
    /// Filters, applied in order.
    pub filters: Vec<String>,
    /// Document metadata.
    pub metadata: BTreeMap<String, MetadataValue>,
    /// Raw tool arguments, appended after every structured option.
    pub extra_args: Vec<String>,
}

impl ConversionRequest {
    /// Create a request with only formats and content set.
    pub fn new(
        from_format: impl Into<String>,
        to_format: impl Into<String>,
        content: impl Into<Bytes>,
    ) -> Self {
        Self {
            from_format: from_format.into(),
            to_format: to_format.into(),
            content: content.into(),
            ..Default::default()
        }
    }
}

/// The conversion tool resolved at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTool {
    /// The candidate name or path that answered the version probe.
    pub program: String,
    /// First line of the tool's `--version` output.
    pub version: String,
}

/// Whether the service has a usable tool.
#[derive(Debug, Clone)]
pub enum ToolStatus {
    /// A tool was located and verified.
    Ready(ResolvedTool),
    /// No candidate answered; conversions fast-fail.
    Unavailable {
        /// Why the locator gave up.
        reason: String,
    },
}

impl ToolStatus {
    /// The resolved tool, if any.
    pub fn tool(&self) -> Option<&ResolvedTool> {
        match self {
            Self::Ready(tool) => Some(tool),
            Self::Unavailable { .. } => None,
        }
    }
}

/// Formats reported by the tool itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedFormats {
    /// Readable formats.
    pub input: Vec<String>,
    /// Writable formats.
    pub output: Vec<String>,
}
