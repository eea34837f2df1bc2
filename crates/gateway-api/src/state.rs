//! Application state shared across all handlers.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use gateway_converter::ConversionService;
use gateway_core::config::AppConfig;

/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Conversion pipeline shared by all adapters
    pub converter: Arc<ConversionService>,
    /// Time the state was built
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: AppConfig, converter: ConversionService) -> Self {
        Self {
            config: Arc::new(config),
            converter: Arc::new(converter),
            started_at: Utc::now(),
        }
    }

    /// Whole seconds since startup.
    pub fn uptime_seconds(&self) -> u64 {
        (Utc::now() - self.started_at).num_seconds().max(0) as u64
    }
}
