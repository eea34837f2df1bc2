//! Format identifier checks and the format → file extension table.
//!
//! Validation is shallow. A well-formed but unknown identifier passes
//! here and is rejected later by the tool's exit code.

use crate::error::{ConversionError, FormatRole};

/// Minimum length (in characters) of a format identifier.
pub const MIN_FORMAT_LEN: usize = 2;

/// Reject empty or too-short format identifiers.
pub fn validate_format(role: FormatRole, format: &str) -> Result<(), ConversionError> {
    if format.chars().count() < MIN_FORMAT_LEN {
        return Err(ConversionError::InvalidFormat {
            role,
            format: format.to_string(),
        });
    }
    Ok(())
}

/// Validate both sides of a conversion.
pub fn validate_pair(from_format: &str, to_format: &str) -> Result<(), ConversionError> {
    validate_format(FormatRole::Input, from_format)?;
    validate_format(FormatRole::Output, to_format)
}

/// File extension (with leading dot) for a format identifier.
///
/// Known keys match case-insensitively; anything else becomes
/// `.<format>` as given.
pub fn extension_for(format: &str) -> String {
    let known = match format.to_lowercase().as_str() {
        "html" => Some(".html"),
        "markdown" | "md" => Some(".md"),
        "docx" => Some(".docx"),
        "pdf" => Some(".pdf"),
        "latex" | "tex" => Some(".tex"),
        "rtf" => Some(".rtf"),
        "odt" => Some(".odt"),
        "epub" => Some(".epub"),
        "txt" | "plain" => Some(".txt"),
        _ => None,
    };

    match known {
        Some(ext) => ext.to_string(),
        None => format!(".{format}"),
    }
}

/// Download filename for a converted document, e.g. `output.docx`.
pub fn output_filename(to_format: &str) -> String {
    format!("output{}", extension_for(to_format))
}
