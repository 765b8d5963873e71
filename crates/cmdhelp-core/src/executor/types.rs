//! Types for script execution

use std::borrow::Cow;
use std::path::PathBuf;
use std::time::Duration;

/// Output captured from a finished script
#[derive(Debug, Clone, Default)]
pub struct ExecutionOutput {
    /// Standard output, verbatim
    pub stdout: Vec<u8>,

    /// Standard error, verbatim
    pub stderr: Vec<u8>,

    /// Exit code (None if the process was ended by a signal)
    pub exit_code: Option<i32>,

    /// Wall-clock execution time
    pub duration: Duration,

    /// Log file the output was written to, if any
    pub log_file: Option<PathBuf>,
}

impl ExecutionOutput {
    /// Whether the script exited with status zero
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Standard output as text
    pub fn stdout_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }

    /// Standard error as text
    pub fn stderr_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stderr)
    }

    /// Standard output followed by standard error, as written to the log
    pub fn combined(&self) -> Vec<u8> {
        let mut combined = Vec::with_capacity(self.stdout.len() + self.stderr.len());
        combined.extend_from_slice(&self.stdout);
        combined.extend_from_slice(&self.stderr);
        combined
    }
}
