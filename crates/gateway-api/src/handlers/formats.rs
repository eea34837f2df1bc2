//! Supported format listing.

use axum::Json;
use axum::extract::State;

use gateway_converter::ConversionError;

use crate::dto::response::FormatsResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /formats
///
/// A failing listing yields empty lists; only a missing tool is an error.
pub async fn list_formats(State(state): State<AppState>) -> Result<Json<FormatsResponse>, ApiError> {
    match state.converter.list_formats().await {
        Ok(formats) => Ok(Json(FormatsResponse {
            input: formats.input,
            output: formats.output,
        })),
        Err(e @ ConversionError::ToolUnavailable(_)) => Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, "Format listing failed, returning empty lists");
            Ok(Json(FormatsResponse::default()))
        }
    }
}
