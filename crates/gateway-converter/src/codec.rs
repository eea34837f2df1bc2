//! Base64 content encoding used on the JSON wire formats.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::ConversionError;

/// Encode bytes as standard, padded base64.
pub fn encode_base64(content: &[u8]) -> String {
    STANDARD.encode(content)
}

/// Decode standard base64, ignoring surrounding whitespace.
pub fn decode_base64(content: &str) -> Result<Vec<u8>, ConversionError> {
    STANDARD
        .decode(content.trim())
        .map_err(|e| ConversionError::invalid_params(format!("Invalid base64 content: {e}")))
}

/// Decode base64, falling back to the UTF-8 bytes of the text.
///
/// Used by the REST adapters only; JSON-RPC insists on base64.
pub fn decode_base64_or_text(content: &str) -> Vec<u8> {
    match decode_base64(content) {
        Ok(bytes) => bytes,
        Err(_) => {
            tracing::debug!(len = content.len(), "Content is not base64, using raw text");
            content.as_bytes().to_vec()
        }
    }
}
