//! Pre-flight checks shared by setup and execution
//!
//! These run before anything is staged or launched, so a rejected request
//! never leaves a half-written script or a half-run process behind.

use crate::error::{HelperError, HelperResult};
use std::path::{Path, PathBuf};

/// Split a log path into the directory that must exist and its file name.
///
/// A path ending in a separator names a directory, so its file name is empty.
/// A bare file name lives in the current working directory.
fn split_log_path(path: &Path) -> (PathBuf, Option<&std::ffi::OsStr>) {
    let text = path.as_os_str().to_string_lossy();
    if text.ends_with(std::path::is_separator) {
        return (path.to_path_buf(), None);
    }

    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    (directory, path.file_name())
}

/// Validate an optional log path.
///
/// Returns `Ok(None)` when no log was requested (absent or empty path), the
/// path itself when it names a file in an existing directory, and an
/// argument error naming the failed check otherwise.
pub fn validate_log_path(path: Option<&Path>) -> HelperResult<Option<PathBuf>> {
    let Some(path) = path.filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(None);
    };

    let (directory, file_name) = split_log_path(path);
    if !directory.is_dir() {
        return Err(HelperError::argument(format!(
            "Invalid directory: {}",
            directory.display()
        )));
    }

    match file_name {
        Some(name) if !name.is_empty() => Ok(Some(path.to_path_buf())),
        _ => Err(HelperError::argument("Missing log file name.")),
    }
}

/// Ensure a script path references an existing file.
pub fn validate_script_path(path: &Path) -> HelperResult<()> {
    if path.as_os_str().is_empty() {
        return Err(HelperError::argument("File path cannot be null or empty."));
    }
    if !path.is_file() {
        return Err(HelperError::argument(format!(
            "Invalid file path: {}",
            path.display()
        )));
    }
    Ok(())
}
