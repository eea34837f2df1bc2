//! Request parameters shared by the adapters, and their mapping to a
//! [`ConversionRequest`].

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use gateway_converter::codec;
use gateway_converter::{ConversionError, ConversionRequest, MetadataValue};

use crate::error::ApiError;

/// How the `content` string of a JSON request is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentPolicy {
    /// Base64, or the raw text when it is not valid base64.
    Lenient,
    /// Base64 only.
    Strict,
}

impl ContentPolicy {
    fn decode(self, content: &str) -> Result<Vec<u8>, ConversionError> {
        match self {
            Self::Lenient => Ok(codec::decode_base64_or_text(content)),
            Self::Strict => codec::decode_base64(content),
        }
    }

    fn missing_content_message(self) -> &'static str {
        match self {
            Self::Lenient => "'content' field is required",
            Self::Strict => "Missing required parameter: content",
        }
    }
}

/// Conversion parameters as sent by JSON clients.
///
/// Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConvertParams {
    #[serde(alias = "from_format")]
    pub from: String,
    #[serde(alias = "to_format")]
    pub to: String,
    /// Document body, base64 encoded.
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub standalone: bool,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
    #[serde(default)]
    pub filters: Vec<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, MetadataValue>,
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl ConvertParams {
    /// Decode the content and build the canonical request.
    pub fn into_request(self, policy: ContentPolicy) -> Result<ConversionRequest, ConversionError> {
        let content = self
            .content
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ConversionError::invalid_params(policy.missing_content_message()))?;
        let content = policy.decode(&content)?;

        Ok(ConversionRequest {
            from_format: self.from,
            to_format: self.to,
            content: Bytes::from(content),
            standalone: self.standalone,
            template: self.template.filter(|t| !t.is_empty()),
            variables: self.variables,
            filters: self.filters,
            metadata: self.metadata,
            extra_args: self.extra_args,
        })
    }
}

/// Fields collected from a multipart form, before interpretation.
#[derive(Debug, Default)]
pub struct ConvertForm {
    pub from: Option<String>,
    pub to: Option<String>,
    pub file: Option<Bytes>,
    pub content: Option<String>,
    pub standalone: Option<String>,
    pub template: Option<String>,
    pub variables: Option<String>,
    pub filters: Option<String>,
    pub metadata: Option<String>,
    pub extra_args: Option<String>,
}

impl ConvertForm {
    /// Record a text field. Unknown names are ignored; empty values are
    /// treated as absent.
    pub fn set_text(&mut self, name: &str, value: String) {
        let slot = match name {
            "from" | "from_format" => &mut self.from,
            "to" | "to_format" => &mut self.to,
            "content" => &mut self.content,
            "standalone" => &mut self.standalone,
            "template" => &mut self.template,
            "variables" => &mut self.variables,
            "filters" => &mut self.filters,
            "metadata" => &mut self.metadata,
            "extra_args" => &mut self.extra_args,
            other => {
                tracing::debug!(field = %other, "Ignoring unknown form field");
                return;
            }
        };
        if !value.is_empty() {
            *slot = Some(value);
        }
    }

    /// Interpret the collected fields. The uploaded file wins over
    /// `content` when both are present.
    pub fn into_request(self) -> Result<ConversionRequest, ApiError> {
        let from_format = self
            .from
            .ok_or_else(|| ApiError::validation("Missing required field 'from'"))?;
        let to_format = self
            .to
            .ok_or_else(|| ApiError::validation("Missing required field 'to'"))?;

        let content = match (self.file, self.content) {
            (Some(file), _) => file,
            (None, Some(text)) => Bytes::from(codec::decode_base64_or_text(&text)),
            (None, None) => {
                return Err(ApiError::validation(
                    "Either 'file' or 'content' must be provided",
                ));
            }
        };

        let standalone = match self.standalone.as_deref() {
            Some(raw) => parse_flag(raw).ok_or_else(|| {
                ApiError::validation("Invalid boolean in 'standalone' parameter")
            })?,
            None => false,
        };

        Ok(ConversionRequest {
            from_format,
            to_format,
            content,
            standalone,
            template: self.template,
            variables: parse_json_field("variables", self.variables.as_deref())?,
            filters: self.filters.as_deref().map(split_filters).unwrap_or_default(),
            metadata: parse_json_field("metadata", self.metadata.as_deref())?,
            extra_args: parse_json_field("extra_args", self.extra_args.as_deref())?,
        })
    }
}

/// Parse a form boolean such as `true`, `0` or `Yes`.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Comma-separated filter list, trimmed, empties dropped.
pub fn split_filters(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_json_field<T>(name: &str, raw: Option<&str>) -> Result<T, ApiError>
where
    T: DeserializeOwned + Default,
{
    match raw {
        Some(raw) => serde_json::from_str(raw).map_err(|e| {
            tracing::debug!(field = %name, error = %e, "Malformed JSON form field");
            ApiError::validation(format!("Invalid JSON in '{name}' parameter"))
        }),
        None => Ok(T::default()),
    }
}
