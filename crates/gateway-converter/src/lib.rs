//! # gateway-converter
//!
//! Runs document conversions through an external, pre-installed
//! conversion tool (pandoc).
//!
//! A conversion flows through [`formats`] validation, [`filesystem`]
//! temp resources, the [`command`] builder and the [`executor`], all
//! orchestrated by [`ConversionService`]. The tool itself is located
//! once at startup by [`ToolLocator`] and never re-resolved.

pub mod codec;
pub mod command;
pub mod error;
pub mod executor;
pub mod filesystem;
pub mod formats;
pub mod locator;
pub mod models;
pub mod processor;

#[cfg(all(test, unix))]
pub(crate) mod testing;

pub use command::CommandBuilder;
pub use error::{ConversionError, FormatRole};
pub use executor::ConversionExecutor;
pub use filesystem::{TempResource, TempResourceManager};
pub use locator::ToolLocator;
pub use models::{ConversionRequest, MetadataValue, ResolvedTool, SupportedFormats, ToolStatus};
pub use processor::ConversionService;
