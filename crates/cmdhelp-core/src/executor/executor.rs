//! Core process executor implementation

use super::log_sink::write_log;
use super::types::ExecutionOutput;
use crate::error::{HelperError, HelperResult};
use crate::validation::{validate_log_path, validate_script_path};
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// How the wait on the child ended
enum WaitOutcome {
    Finished {
        status: std::io::Result<ExitStatus>,
        stdout: std::io::Result<Vec<u8>>,
        stderr: std::io::Result<Vec<u8>>,
    },
    TimedOut(Duration),
    Cancelled,
}

/// Runs staged scripts through an interpreter
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    interpreter: Vec<String>,
    timeout: Option<Duration>,
    cancel_token: CancellationToken,
}

impl ProcessExecutor {
    /// Executor that runs scripts as `<interpreter...> <script>`
    pub fn new(interpreter: Vec<String>) -> Self {
        Self {
            interpreter,
            timeout: None,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Bound the run time of each script
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use an externally owned cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel_token = token;
        self
    }

    /// Token that cancels the running script when triggered
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Execute a script and wait for it to finish.
    ///
    /// The script path and log path are validated before anything is
    /// launched. When a log path is given, stdout followed by stderr is
    /// written there (appended if `append_to_log_file`, replaced otherwise).
    /// A non-zero exit status is reported in the output, not as an error.
    #[instrument(skip(self), fields(script = %script_path.display()))]
    pub async fn execute(
        &self,
        script_path: &Path,
        log_file_path: Option<&Path>,
        append_to_log_file: bool,
    ) -> HelperResult<ExecutionOutput> {
        validate_script_path(script_path)?;
        let log_file_path = validate_log_path(log_file_path)?;

        let (program, args) = self
            .interpreter
            .split_first()
            .ok_or_else(|| HelperError::config("Interpreter must name a program"))?;

        let start = Instant::now();

        let mut cmd = Command::new(program);
        cmd.args(args)
            .arg(script_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        configure_platform(&mut cmd);

        let mut child = cmd.spawn().map_err(|e| {
            HelperError::io_with_source(format!("Failed to launch '{}'", program), script_path, e)
        })?;
        // Kept for the group kill; the id is gone once the child is reaped
        let pid = child.id();
        debug!(pid = ?pid, program = %program, "script launched");

        let outcome = self.wait(&mut child).await;

        let (status, stdout, stderr) = match outcome {
            WaitOutcome::Finished {
                status,
                stdout,
                stderr,
            } => {
                let status = status.map_err(|e| {
                    HelperError::io_with_source("Failed to wait for script", script_path, e)
                })?;
                let stdout = stdout.map_err(|e| read_error("stdout", e))?;
                let stderr = stderr.map_err(|e| read_error("stderr", e))?;
                (status, stdout, stderr)
            }
            WaitOutcome::TimedOut(limit) => {
                terminate(&mut child, pid).await;
                warn!(timeout = ?limit, "script timed out and was killed");
                return Err(HelperError::Timeout(limit));
            }
            WaitOutcome::Cancelled => {
                terminate(&mut child, pid).await;
                warn!("script cancelled and was killed");
                return Err(HelperError::Cancelled);
            }
        };

        let duration = start.elapsed();

        if let Some(path) = &log_file_path {
            write_log(path, &stdout, &stderr, append_to_log_file).await?;
            debug!(log = %path.display(), append = append_to_log_file, "captured output written");
        }

        let exit_code = status.code();
        if status.success() {
            info!(duration_ms = duration.as_millis() as u64, "script finished");
        } else {
            warn!(exit_code = ?exit_code, duration_ms = duration.as_millis() as u64, "script exited unsuccessfully");
        }

        Ok(ExecutionOutput {
            stdout,
            stderr,
            exit_code,
            duration,
            log_file: log_file_path,
        })
    }

    /// Wait for the child to exit and both pipes to close, under the
    /// deadline and the cancellation token.
    ///
    /// Anything the script left running in the background keeps the pipes
    /// open, so reaching EOF is part of the bounded wait.
    async fn wait(&self, child: &mut Child) -> WaitOutcome {
        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();

        // Both pipes are drained while waiting so neither can fill up and stall the child
        let completion = async {
            let (status, stdout, stderr) = tokio::join!(
                child.wait(),
                read_to_end(stdout_pipe),
                read_to_end(stderr_pipe)
            );
            WaitOutcome::Finished {
                status,
                stdout,
                stderr,
            }
        };

        let timeout = self.timeout;
        let deadline = async move {
            match timeout {
                Some(limit) => {
                    tokio::time::sleep(limit).await;
                    limit
                }
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            outcome = completion => outcome,
            limit = deadline => WaitOutcome::TimedOut(limit),
            _ = self.cancel_token.cancelled() => WaitOutcome::Cancelled,
        }
    }
}

/// Read a pipe to the end
async fn read_to_end<R: AsyncRead + Unpin>(reader: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    if let Some(mut reader) = reader {
        reader.read_to_end(&mut buffer).await?;
    }
    Ok(buffer)
}

fn read_error(stream: &str, e: std::io::Error) -> HelperError {
    HelperError::Io {
        message: format!("Failed to read script {}: {}", stream, e),
        path: None,
        source: Some(e),
    }
}

#[cfg(unix)]
fn configure_platform(cmd: &mut Command) {
    // Own process group, so a kill reaches everything the script started
    cmd.process_group(0);
}

#[cfg(windows)]
fn configure_platform(cmd: &mut Command) {
    cmd.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(any(unix, windows)))]
fn configure_platform(_cmd: &mut Command) {}

/// Kill the child and everything in its process group
///
/// The group outlives its leader, so background jobs are reached even after
/// the script itself has exited.
async fn terminate(child: &mut Child, pid: Option<u32>) {
    #[cfg(unix)]
    if let Some(pid) = pid {
        use nix::sys::signal::{Signal, killpg};
        use nix::unistd::Pid;

        if let Err(e) = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
            debug!("Failed to SIGKILL process group {}: {}", pid, e);
        }
    }
    #[cfg(not(unix))]
    let _ = pid;

    if let Err(e) = child.kill().await {
        debug!("Failed to kill script process: {}", e);
    }
}
