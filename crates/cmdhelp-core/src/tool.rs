//! Tool descriptor capability
//!
//! A [`CommandLineTool`] is the parsed configuration the helper runs: it owns
//! its argument grammar, and once parsed it exposes the assembled command
//! text, the target log path and the append flag. The helper treats it as
//! read-only after [`CommandLineTool::parse_arguments`] succeeds.

use std::path::Path;

/// Capability consumed by [`Helper`](crate::Helper).
pub trait CommandLineTool: Send {
    /// Short name used in log output
    fn name(&self) -> &str;

    /// Populate the descriptor from raw arguments.
    ///
    /// Returns `false` when the arguments do not satisfy the tool's grammar;
    /// the helper turns that into an argument error carrying [`usage`](Self::usage).
    fn parse_arguments(&mut self, args: &[String]) -> bool;

    /// Command text to stage, or `None` if nothing has been parsed yet
    fn commands(&self) -> Option<String>;

    /// Log file requested by the caller, if any
    fn log_file_path(&self) -> Option<&Path>;

    /// Whether captured output is appended to the log instead of replacing it
    fn append_to_log_file(&self) -> bool {
        false
    }

    /// Human-readable usage text
    fn usage(&self) -> String;
}
