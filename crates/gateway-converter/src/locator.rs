//! Startup discovery of the conversion tool.

use std::process::Stdio;
use std::time::Duration;

use gateway_core::config::ConverterConfig;
use tokio::process::Command;

use crate::error::ConversionError;
use crate::models::{ResolvedTool, SupportedFormats};

/// Probes candidate executables with `--version` and keeps the first
/// that answers.
#[derive(Debug, Clone)]
pub struct ToolLocator {
    candidates: Vec<String>,
    probe_timeout: Duration,
}

impl ToolLocator {
    pub fn new(candidates: Vec<String>, probe_timeout: Duration) -> Self {
        Self {
            candidates,
            probe_timeout,
        }
    }

    /// Locator for the configured probe order.
    pub fn from_config(config: &ConverterConfig) -> Self {
        Self::new(config.probe_order(), config.probe_timeout())
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Probe every candidate in order; the first to exit 0 wins.
    pub async fn locate(&self) -> Result<ResolvedTool, ConversionError> {
        for candidate in &self.candidates {
            match Self::query_version(candidate, self.probe_timeout).await {
                Ok(version) => {
                    tracing::info!(program = %candidate, version = %version, "Conversion tool located");
                    return Ok(ResolvedTool {
                        program: candidate.clone(),
                        version,
                    });
                }
                Err(e) => {
                    tracing::debug!(program = %candidate, error = %e, "Candidate rejected");
                }
            }
        }

        Err(ConversionError::ToolUnavailable(format!(
            "none of {:?} answered --version",
            self.candidates
        )))
    }

    /// First line of `<program> --version`.
    pub async fn query_version(program: &str, timeout: Duration) -> Result<String, ConversionError> {
        let stdout = run_query(program, "--version", timeout).await?;
        Ok(stdout.lines().next().unwrap_or_default().trim().to_string())
    }

    /// Input and output formats reported by the tool.
    pub async fn list_formats(
        program: &str,
        timeout: Duration,
    ) -> Result<SupportedFormats, ConversionError> {
        let (input, output) = tokio::try_join!(
            run_query(program, "--list-input-formats", timeout),
            run_query(program, "--list-output-formats", timeout),
        )?;

        Ok(SupportedFormats {
            input: parse_lines(&input),
            output: parse_lines(&output),
        })
    }
}

async fn run_query(program: &str, flag: &str, timeout: Duration) -> Result<String, ConversionError> {
    let mut cmd = Command::new(program);
    cmd.arg(flag)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return Err(ConversionError::ToolUnavailable(format!(
                "cannot run '{program} {flag}': {e}"
            )));
        }
        Err(_) => {
            return Err(ConversionError::timed_out(timeout));
        }
    };

    if !output.status.success() {
        return Err(ConversionError::ExecutionFailure {
            message: format!("'{program} {flag}' exited with {}", output.status),
            exit_code: output.status.code(),
            stderr: Some(String::from_utf8_lossy(&output.stderr).into_owned()),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn parse_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
