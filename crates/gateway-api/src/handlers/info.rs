//! Service information handler.

use axum::Json;
use axum::extract::State;

use crate::dto::response::InfoResponse;
use crate::state::AppState;

/// GET /
pub async fn info(State(state): State<AppState>) -> Json<InfoResponse> {
    Json(InfoResponse {
        name: "pandoc-gateway".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        description: "Document conversion over REST and JSON-RPC, backed by pandoc".to_string(),
        tool_version: state
            .converter
            .tool_status()
            .tool()
            .map(|tool| tool.version.clone()),
        uptime_seconds: state.uptime_seconds(),
    })
}
