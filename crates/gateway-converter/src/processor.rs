//! Conversion service: validation, concurrency ceiling, temp resources
//! and tool execution for a single conversion call.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use gateway_core::config::ConverterConfig;
use tokio::sync::Semaphore;
use tracing::{Instrument, debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::command::CommandBuilder;
use crate::error::ConversionError;
use crate::executor::ConversionExecutor;
use crate::filesystem::TempResourceManager;
use crate::formats;
use crate::locator::ToolLocator;
use crate::models::{ConversionRequest, SupportedFormats, ToolStatus};

/// Protocol-agnostic entry point shared by every adapter.
#[derive(Debug, Clone)]
pub struct ConversionService {
    /// Tool resolved once at startup.
    status: ToolStatus,
    /// Temp files for each call.
    resources: TempResourceManager,
    executor: ConversionExecutor,
    /// Caps the number of tool processes running at once.
    limiter: Arc<Semaphore>,
    timeout: Duration,
    probe_timeout: Duration,
}

impl ConversionService {
    /// Create a service around an already resolved tool status.
    pub fn new(status: ToolStatus, config: &ConverterConfig) -> Result<Self, ConversionError> {
        Ok(Self {
            status,
            resources: TempResourceManager::new(config.effective_temp_root())?,
            executor: ConversionExecutor::new(),
            limiter: Arc::new(Semaphore::new(config.max_concurrent_conversions)),
            timeout: config.timeout(),
            probe_timeout: config.probe_timeout(),
        })
    }

    /// Locate the tool, then create the service.
    ///
    /// A missing tool does not fail startup; the service comes up
    /// unavailable instead.
    pub async fn discover(config: &ConverterConfig) -> Result<Self, ConversionError> {
        let status = match ToolLocator::from_config(config).locate().await {
            Ok(tool) => ToolStatus::Ready(tool),
            Err(e) => {
                error!(error = %e, "No conversion tool found, conversions will be refused");
                ToolStatus::Unavailable {
                    reason: e.to_string(),
                }
            }
        };
        Self::new(status, config)
    }

    /// Convert one document and return the tool's output bytes.
    #[instrument(
        skip(self, request),
        fields(
            conversion_id,
            from = %request.from_format,
            to = %request.to_format,
            input_bytes = request.content.len(),
        )
    )]
    pub async fn convert(&self, request: ConversionRequest) -> Result<Vec<u8>, ConversionError> {
        let conversion_id = Uuid::now_v7();
        tracing::Span::current().record("conversion_id", tracing::field::display(conversion_id));

        formats::validate_pair(&request.from_format, &request.to_format)?;

        let program = match &self.status {
            ToolStatus::Ready(tool) => tool.program.clone(),
            ToolStatus::Unavailable { reason } => {
                return Err(ConversionError::ToolUnavailable(reason.clone()));
            }
        };

        let permit = Arc::clone(&self.limiter)
            .acquire_owned()
            .await
            .map_err(|_| ConversionError::internal("Conversion limiter closed"))?;
        debug!("Conversion permit acquired");

        let resources = self.resources.clone();
        let executor = self.executor;
        let timeout = self.timeout;

        // Detached from the caller: a dropped request does not cancel the tool
        let task = tokio::spawn(
            async move {
                let _permit = permit;
                run_pipeline(&program, request, &resources, executor, timeout).await
            }
            .in_current_span(),
        );

        let result = task.await?;
        match &result {
            Ok(output) => info!(output_bytes = output.len(), "Conversion succeeded"),
            Err(e) if e.is_client_error() => debug!(error = %e, "Conversion rejected"),
            Err(e) => warn!(error = %e, "Conversion failed"),
        }
        result
    }

    /// Version line of the resolved tool, queried fresh.
    pub async fn tool_version(&self) -> Result<String, ConversionError> {
        let program = self.program()?;
        ToolLocator::query_version(program, self.probe_timeout).await
    }

    /// Formats the resolved tool reports.
    pub async fn list_formats(&self) -> Result<SupportedFormats, ConversionError> {
        let program = self.program()?;
        ToolLocator::list_formats(program, self.probe_timeout).await
    }

    pub fn tool_status(&self) -> &ToolStatus {
        &self.status
    }

    /// Per-conversion time budget.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Temp resources currently held by in-flight conversions.
    pub fn live_resources(&self) -> usize {
        self.resources.live()
    }

    fn program(&self) -> Result<&str, ConversionError> {
        match &self.status {
            ToolStatus::Ready(tool) => Ok(&tool.program),
            ToolStatus::Unavailable { reason } => Err(ConversionError::ToolUnavailable(reason.clone())),
        }
    }
}

async fn run_pipeline(
    program: &str,
    mut request: ConversionRequest,
    resources: &TempResourceManager,
    executor: ConversionExecutor,
    timeout: Duration,
) -> Result<Vec<u8>, ConversionError> {
    let content = std::mem::take(&mut request.content);

    let input = resources
        .acquire(content, &formats::extension_for(&request.from_format))
        .await?;
    let output = resources
        .acquire(Bytes::new(), &formats::extension_for(&request.to_format))
        .await?;

    let argv = CommandBuilder::build(program, input.path(), output.path(), &request);
    let result = executor.execute(&argv, output.path(), timeout).await;

    input.release();
    output.release();

    result
}
