//! Error taxonomy for the conversion pipeline.
//!
//! Every failure of a conversion is one of the variants of
//! [`ConversionError`]. Protocol adapters pattern-match on it to pick
//! an HTTP status or a JSON-RPC error code; [`ConversionError::kind`]
//! gives the coarse [`ErrorKind`] used by `AppError`.

use std::fmt;
use std::time::Duration;

use gateway_core::error::{AppError, ErrorKind};
use thiserror::Error;

/// Which side of the conversion a format identifier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatRole {
    /// The `from` format.
    Input,
    /// The `to` format.
    Output,
}

impl fmt::Display for FormatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => write!(f, "input"),
            Self::Output => write!(f, "output"),
        }
    }
}

/// Closed set of conversion failures.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// A format identifier failed shallow validation.
    #[error("Invalid {role} format: '{format}'")]
    InvalidFormat {
        /// Input or output side.
        role: FormatRole,
        /// The rejected identifier.
        format: String,
    },

    /// The request was malformed (bad base64/JSON, missing field).
    #[error("{0}")]
    InvalidParams(String),

    /// The conversion tool could not be located or started.
    #[error("Conversion tool unavailable: {0}")]
    ToolUnavailable(String),

    /// The tool did not finish within the time budget.
    #[error("Conversion timed out after {timeout_seconds}s")]
    ExecutionTimeout {
        /// The budget that was exceeded.
        timeout_seconds: u64,
    },

    /// The tool exited non-zero or did not produce its output.
    #[error("{message}")]
    ExecutionFailure {
        /// Short description of what went wrong.
        message: String,
        /// Exit code, when the process exited normally.
        exit_code: Option<i32>,
        /// Captured standard error of the tool.
        stderr: Option<String>,
    },

    /// Anything unanticipated.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConversionError {
    /// Shorthand for an `InvalidParams` error.
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams(message.into())
    }

    /// Shorthand for an `Internal` error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Timeout error for `budget`, rounded up to whole seconds.
    pub fn timed_out(budget: Duration) -> Self {
        let mut timeout_seconds = budget.as_secs();
        if budget.subsec_nanos() > 0 {
            timeout_seconds += 1;
        }
        Self::ExecutionTimeout { timeout_seconds }
    }

    /// Coarse error kind for the application boundary.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidFormat { .. } | Self::InvalidParams(_) => ErrorKind::Validation,
            Self::ToolUnavailable(_) => ErrorKind::ServiceUnavailable,
            Self::ExecutionTimeout { .. } | Self::ExecutionFailure { .. } => ErrorKind::Conversion,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether the caller is at fault.
    pub fn is_client_error(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    /// Diagnostic text from the tool, if any.
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            Self::ExecutionFailure { stderr, .. } => {
                stderr.as_deref().filter(|s| !s.trim().is_empty())
            }
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConversionError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(format!("I/O error: {err}"))
    }
}

impl From<tokio::task::JoinError> for ConversionError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(format!("Conversion task failed: {err}"))
    }
}

impl From<ConversionError> for AppError {
    fn from(err: ConversionError) -> Self {
        let message = match &err {
            ConversionError::ExecutionFailure {
                stderr: Some(stderr),
                ..
            } if !stderr.trim().is_empty() => format!("Conversion failed: {err}: {}", stderr.trim()),
            ConversionError::ExecutionFailure { .. } | ConversionError::ExecutionTimeout { .. } => {
                format!("Conversion failed: {err}")
            }
            _ => err.to_string(),
        };
        AppError::new(err.kind(), message)
    }
}
