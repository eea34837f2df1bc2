//! Maps `AppError` and `ConversionError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use gateway_converter::ConversionError;
use gateway_core::error::{AppError, ErrorKind};

/// Message shown to clients in place of internal error details.
pub const INTERNAL_MESSAGE: &str = "Internal server error";

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

/// Error returned by handlers.
#[derive(Debug)]
pub enum ApiError {
    /// An application error, mapped by its kind.
    App(AppError),
    /// An extractor rejection that keeps its own status (e.g. 413).
    Rejected { status: StatusCode, message: String },
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::App(AppError::validation(message))
    }

    /// The client-visible message.
    pub fn message(&self) -> String {
        match self {
            Self::App(err) => public_message(err),
            Self::Rejected { message, .. } => message.clone(),
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<ConversionError> for ApiError {
    fn from(err: ConversionError) -> Self {
        Self::App(err.into())
    }
}

/// HTTP status and error code for an error kind.
pub fn status_for(kind: ErrorKind) -> (StatusCode, &'static str) {
    match kind {
        ErrorKind::Validation => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        ErrorKind::ServiceUnavailable => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
        ErrorKind::Conversion => (StatusCode::INTERNAL_SERVER_ERROR, "CONVERSION_FAILED"),
        ErrorKind::Configuration | ErrorKind::Internal => {
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        }
    }
}

/// The message a client may see for `err`.
pub fn public_message(err: &AppError) -> String {
    match err.kind {
        ErrorKind::Configuration | ErrorKind::Internal => INTERNAL_MESSAGE.to_string(),
        _ => err.message.clone(),
    }
}

/// Log `err` at error level when its detail is hidden from the client.
pub fn report_internal(err: &AppError) {
    if matches!(err.kind, ErrorKind::Configuration | ErrorKind::Internal) {
        tracing::error!(kind = %err.kind, error = %err.message, "Internal server error");
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            Self::App(err) => {
                report_internal(err);
                status_for(err.kind)
            }
            Self::Rejected { status, .. } => (*status, "BAD_REQUEST"),
        };

        let body = ApiErrorResponse {
            error: error_code.to_string(),
            message: self.message(),
        };

        (status, Json(body)).into_response()
    }
}
