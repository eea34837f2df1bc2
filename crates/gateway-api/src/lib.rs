//! # gateway-api
//!
//! HTTP layer for the Pandoc gateway built on Axum.
//!
//! Three protocol adapters share one conversion pipeline: a multipart
//! form endpoint, a JSON endpoint with base64 payloads and a JSON-RPC 2.0
//! endpoint. Health, format listing, CORS, compression and request
//! logging sit around them.

pub mod app;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::run_server;
pub use router::build_router;
pub use error::ApiError;
pub use state::AppState;
