//! Script staging and cleanup
//!
//! Command text is written verbatim into isolated storage, so the staged
//! artifact is exactly what will run.

use crate::error::{HelperError, HelperResult};
use crate::storage::{IsolatedStorage, script_file_name};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A script written to isolated storage and awaiting execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedScript {
    file_name: String,
    path: PathBuf,
    size: usize,
}

impl StagedScript {
    /// Generated file name inside the storage area
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Absolute path of the staged file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the staged command text in bytes
    pub fn size(&self) -> usize {
        self.size
    }
}

/// Writes command text into isolated storage and removes it afterwards
#[derive(Debug, Clone)]
pub struct ScriptStager {
    storage: IsolatedStorage,
    extension: String,
}

impl ScriptStager {
    pub fn new(storage: IsolatedStorage, extension: impl Into<String>) -> Self {
        Self {
            storage,
            extension: extension.into(),
        }
    }

    /// Storage area scripts are staged into
    pub fn storage(&self) -> &IsolatedStorage {
        &self.storage
    }

    /// Extension given to staged scripts
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Stage command text under a freshly generated name.
    pub fn stage(&self, commands: Option<&str>) -> HelperResult<StagedScript> {
        let commands = match commands {
            Some(text) if !text.is_empty() => text,
            _ => return Err(HelperError::argument("No commands found to stage.")),
        };

        let file_name = script_file_name(&self.extension);
        let path = self.storage.write_file(&file_name, commands.as_bytes())?;
        debug!(script = %path.display(), "staged commands");

        Ok(StagedScript {
            file_name,
            path,
            size: commands.len(),
        })
    }

    /// Remove a staged script. Never fails; a missing file is a no-op.
    ///
    /// Returns whether a file was actually removed.
    pub fn remove(&self, script: &StagedScript) -> bool {
        match self.storage.delete_file(script.file_name()) {
            Ok(removed) => removed,
            Err(e) => {
                warn!(script = %script.path().display(), error = %e, "failed to remove staged script");
                false
            }
        }
    }
}
