//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files and the
//! environment via the `config` crate. Each sub-module represents a
//! logical configuration section. Every field has a default, so the
//! gateway starts without any file present.

pub mod app;
pub mod converter;
pub mod logging;

use serde::{Deserialize, Serialize};
use validator::Validate;

pub use self::app::{CorsConfig, ServerConfig};
pub use self::converter::ConverterConfig;
pub use self::logging::LoggingConfig;

use crate::error::AppError;

/// Environment variable prefix, e.g. `PANDOC_GATEWAY__SERVER__PORT=9000`.
pub const ENV_PREFIX: &str = "PANDOC_GATEWAY";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings.
    #[validate(nested)]
    pub server: ServerConfig,
    /// External conversion tool settings.
    #[validate(nested)]
    pub converter: ConverterConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration.
    ///
    /// Merges, later sources winning: `config/default.toml` (optional),
    /// the file at `path` when given, and environment variables prefixed
    /// with `PANDOC_GATEWAY__`.
    pub fn load(path: Option<&str>) -> Result<Self, AppError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false));

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }
}
