//! Route definitions for the gateway HTTP API.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::{compression::build_compression_layer, cors::build_cors_layer, logging};
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_body = state.config.server.max_body_bytes;
    let cors = build_cors_layer(&state.config.server.cors);

    Router::new()
        .merge(service_routes())
        .merge(conversion_routes())
        .layer(DefaultBodyLimit::max(max_body))
        .layer(build_compression_layer())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(logging::request_logging))
        .with_state(state)
}

/// Info, health, and format discovery
fn service_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::info::info))
        .route("/health", get(handlers::health::health))
        .route("/formats", get(handlers::formats::list_formats))
}

/// The three conversion adapters
fn conversion_routes() -> Router<AppState> {
    Router::new()
        .route("/convert", post(handlers::convert::convert_form))
        .route("/convert/json", post(handlers::convert_json::convert_json))
        .route("/rpc", post(handlers::rpc::rpc))
}
