//! Configuration for the external conversion tool.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Configuration for locating and running the conversion tool.
///
/// If `tool_path` is set it is probed first; the `candidates` list is
/// probed afterwards, in order.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ConverterConfig {
    /// Explicit path to the tool executable.
    pub tool_path: Option<String>,

    /// Executable names or paths probed in order at startup.
    pub candidates: Vec<String>,

    /// Timeout in seconds for `--version` and format-listing queries.
    #[validate(range(min = 1, max = 60))]
    pub probe_timeout_seconds: u64,

    /// Timeout in seconds for a single conversion.
    #[validate(range(min = 1, max = 3600))]
    pub timeout_seconds: u64,

    /// Number of conversions allowed to run at the same time.
    #[validate(range(min = 1, max = 256))]
    pub max_concurrent_conversions: usize,

    /// Directory for temporary input/output files.
    pub temp_root: Option<PathBuf>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            tool_path: None,
            candidates: default_candidates(),
            probe_timeout_seconds: 5,
            timeout_seconds: 300,
            max_concurrent_conversions: 8,
            temp_root: None,
        }
    }
}

fn default_candidates() -> Vec<String> {
    vec![
        "pandoc".to_string(),
        "/usr/bin/pandoc".to_string(),
        "/usr/local/bin/pandoc".to_string(),
    ]
}

impl ConverterConfig {
    /// Candidates in probe order, explicit `tool_path` first.
    pub fn probe_order(&self) -> Vec<String> {
        let mut order = Vec::with_capacity(self.candidates.len() + 1);
        if let Some(path) = self.tool_path.as_deref().filter(|p| !p.trim().is_empty()) {
            order.push(path.to_string());
        }
        for candidate in &self.candidates {
            if !order.contains(candidate) {
                order.push(candidate.clone());
            }
        }
        order
    }

    /// Resolve the effective temp root directory.
    pub fn effective_temp_root(&self) -> PathBuf {
        self.temp_root.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Conversion timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Probe timeout as a `Duration`.
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_seconds)
    }
}
