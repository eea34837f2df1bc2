//! # gateway-core
//!
//! Core crate for the Pandoc gateway. Contains configuration schemas
//! and the unified error system shared by the converter and the HTTP layer.
//!
//! This crate has **no** internal dependencies on other gateway crates.

pub mod config;
pub mod error;
pub mod result;

pub use error::AppError;
pub use result::AppResult;
