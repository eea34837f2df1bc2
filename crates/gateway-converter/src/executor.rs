//! Bounded execution of the conversion tool.

use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

use crate::error::ConversionError;

/// Maximum number of characters of stderr kept as diagnostics.
pub const MAX_DIAGNOSTIC_CHARS: usize = 4000;

/// Runs one tool invocation under a deadline and collects its output file.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConversionExecutor;

impl ConversionExecutor {
    /// Create an executor.
    pub fn new() -> Self {
        Self
    }

    /// Run `argv` and return the bytes the tool wrote to `output_path`.
    ///
    /// The budget covers the tool's exit and the closing of both pipes.
    /// On timeout the tool's whole process group is killed and the tool is
    /// reaped before returning.
    pub async fn execute(
        &self,
        argv: &[String],
        output_path: &Path,
        timeout: Duration,
    ) -> Result<Vec<u8>, ConversionError> {
        let Some((program, args)) = argv.split_first() else {
            return Err(ConversionError::internal("Empty command line"));
        };

        let start = Instant::now();
        tracing::info!(argv = ?argv, "Spawning conversion tool");

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Own group, so helpers the tool starts can be killed with it
        #[cfg(unix)]
        command.process_group(0);

        let mut child = command.spawn().map_err(|e| spawn_error(program, e))?;
        // Captured now: the id is gone once the child is reaped
        let group = child.id();

        let mut stdout = child.stdout.take().map(drain);
        let mut stderr = child.stderr.take().map(drain);

        let finished = tokio::time::timeout(timeout, async {
            let status = child.wait().await?;
            let (stdout, stderr) = tokio::join!(collect(stdout.as_mut()), collect(stderr.as_mut()));
            Ok::<_, std::io::Error>((status, stdout, stderr))
        })
        .await;

        let (status, stdout, stderr) = match finished {
            Ok(result) => result?,
            Err(_) => {
                terminate(program, group, &mut child).await;
                abort(stdout);
                abort(stderr);
                tracing::warn!(
                    program = %program,
                    timeout_ms = timeout.as_millis() as u64,
                    "Conversion timed out, tool killed"
                );
                return Err(ConversionError::timed_out(timeout));
            }
        };

        let stderr = truncate_diagnostics(&stderr);
        let duration_ms = start.elapsed().as_millis() as u64;

        if !status.success() {
            tracing::error!(
                program = %program,
                exit_code = ?status.code(),
                duration_ms,
                stderr = %stderr.chars().take(500).collect::<String>(),
                "Conversion tool failed"
            );
            return Err(ConversionError::ExecutionFailure {
                message: failure_message(status),
                exit_code: status.code(),
                stderr: Some(stderr),
            });
        }

        if !stdout.is_empty() {
            tracing::trace!(bytes = stdout.len(), "Tool wrote to stdout");
        }

        let output = tokio::fs::read(output_path).await.map_err(|e| {
            tracing::error!(
                path = %output_path.display(),
                error = %e,
                "Tool succeeded but output was not produced"
            );
            ConversionError::ExecutionFailure {
                message: format!("Output not produced: {e}"),
                exit_code: status.code(),
                stderr: Some(stderr.clone()),
            }
        })?;

        tracing::info!(
            program = %program,
            duration_ms,
            output_bytes = output.len(),
            "Conversion tool finished"
        );

        Ok(output)
    }
}

fn spawn_error(program: &str, err: std::io::Error) -> ConversionError {
    match err.kind() {
        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
            ConversionError::ToolUnavailable(format!("cannot start '{program}': {err}"))
        }
        _ => ConversionError::internal(format!("Failed to start '{program}': {err}")),
    }
}

fn failure_message(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("Tool exited with code {code}"),
        None => "Tool terminated by signal".to_string(),
    }
}

/// Kill the tool's process group, then kill and reap the tool itself.
async fn terminate(program: &str, group: Option<u32>, child: &mut Child) {
    kill_group(program, group);
    // Fails harmlessly when the tool already exited and only descendants held the pipes
    if let Err(e) = child.kill().await {
        tracing::debug!(program = %program, error = %e, "Tool already exited before kill");
    }
}

#[cfg(unix)]
fn kill_group(program: &str, group: Option<u32>) {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let Some(pgid) = group.and_then(|id| i32::try_from(id).ok()) else {
        return;
    };
    match killpg(Pid::from_raw(pgid), Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(e) => {
            tracing::warn!(program = %program, pgid, error = %e, "Failed to kill tool process group");
        }
    }
}

#[cfg(not(unix))]
fn kill_group(_program: &str, _group: Option<u32>) {}

/// Read a pipe to the end on its own task so the child never blocks on it.
fn drain<R>(mut pipe: R) -> JoinHandle<Vec<u8>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Err(e) = pipe.read_to_end(&mut buf).await {
            tracing::debug!(error = %e, "Pipe read ended early");
        }
        buf
    })
}

async fn collect(handle: Option<&mut JoinHandle<Vec<u8>>>) -> String {
    match handle {
        Some(handle) => match handle.await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(_) => String::new(),
        },
        None => String::new(),
    }
}

fn abort(handle: Option<JoinHandle<Vec<u8>>>) {
    if let Some(handle) = handle {
        handle.abort();
    }
}

/// Keep at most [`MAX_DIAGNOSTIC_CHARS`] characters.
pub fn truncate_diagnostics(text: &str) -> String {
    text.chars().take(MAX_DIAGNOSTIC_CHARS).collect()
}
