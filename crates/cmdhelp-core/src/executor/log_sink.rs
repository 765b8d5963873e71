//! Log file persistence for captured output

use crate::error::{HelperError, HelperResult};
use std::path::Path;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// Write stdout then stderr to `path`, replacing existing content unless
/// `append` is set.
pub async fn write_log(path: &Path, stdout: &[u8], stderr: &[u8], append: bool) -> HelperResult<()> {
    let mut options = OpenOptions::new();
    options.create(true);
    if append {
        options.append(true);
    } else {
        options.write(true).truncate(true);
    }

    let mut file = options
        .open(path)
        .await
        .map_err(|e| HelperError::io_with_source("Failed to open log file", path, e))?;

    file.write_all(stdout)
        .await
        .map_err(|e| HelperError::io_with_source("Failed to write log file", path, e))?;
    file.write_all(stderr)
        .await
        .map_err(|e| HelperError::io_with_source("Failed to write log file", path, e))?;
    file.flush()
        .await
        .map_err(|e| HelperError::io_with_source("Failed to flush log file", path, e))?;

    Ok(())
}
