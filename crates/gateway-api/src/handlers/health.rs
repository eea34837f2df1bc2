//! Health check handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::dto::response::HealthResponse;
use crate::state::AppState;

/// GET /health
///
/// Healthy only when the resolved tool still answers `--version`.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.converter.tool_version().await {
        Ok(version) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy".to_string(),
                tool_version: Some(version),
                error: None,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy".to_string(),
                    tool_version: None,
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}
