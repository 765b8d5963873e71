//! Isolated per-user, per-application storage
//!
//! The storage area is a private directory under the user's local data
//! directory, named after the application identity. It is opened around each
//! operation; nothing holds it open between calls.

mod naming;

pub use naming::{SCRIPT_PREFIX, script_file_name};

use crate::config::HelperConfig;
use crate::error::{HelperError, HelperResult};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Subdirectory of the application area that holds staged scripts
const STAGING_DIR: &str = "staging";

/// Handle on an isolated storage area
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsolatedStorage {
    root: PathBuf,
}

impl IsolatedStorage {
    /// Storage rooted at an explicit directory
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Per-user storage for an application
    /// (`<data_local_dir>/<application_id>/staging`)
    pub fn user_store_for_application(application_id: &str) -> HelperResult<Self> {
        if application_id.is_empty()
            || application_id.contains(['/', '\\'])
            || application_id == "."
            || application_id == ".."
        {
            return Err(HelperError::config(format!(
                "Invalid application id '{}'",
                application_id
            )));
        }

        let base = dirs::data_local_dir().ok_or_else(|| {
            HelperError::config("Could not determine the local data directory for this user")
        })?;
        Ok(Self::at(base.join(application_id).join(STAGING_DIR)))
    }

    /// Storage selected by configuration
    pub fn from_config(config: &HelperConfig) -> HelperResult<Self> {
        match &config.storage_root {
            Some(root) => Ok(Self::at(root)),
            None => Self::user_store_for_application(&config.application_id),
        }
    }

    /// Absolute root directory of the storage area
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a file in the storage area
    pub fn path_of(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }

    /// Whether a file exists in the storage area
    pub fn file_exists(&self, file_name: &str) -> bool {
        self.path_of(file_name).is_file()
    }

    /// Create (or replace) a file with the given contents, owner-only.
    pub fn write_file(&self, file_name: &str, contents: &[u8]) -> HelperResult<PathBuf> {
        self.ensure_root()?;

        let path = self.path_of(file_name);
        let mut file = open_private(&path)
            .map_err(|e| HelperError::io_with_source("Failed to create staged file", &path, e))?;
        file.write_all(contents)
            .and_then(|_| file.flush())
            .map_err(|e| HelperError::io_with_source("Failed to write staged file", &path, e))?;

        debug!(path = %path.display(), bytes = contents.len(), "wrote file to isolated storage");
        Ok(path)
    }

    /// Delete a file. Returns whether a file was removed.
    pub fn delete_file(&self, file_name: &str) -> HelperResult<bool> {
        let path = self.path_of(file_name);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "deleted file from isolated storage");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(HelperError::io_with_source(
                "Failed to delete staged file",
                &path,
                e,
            )),
        }
    }

    fn ensure_root(&self) -> HelperResult<()> {
        if self.root.is_dir() {
            return Ok(());
        }
        create_private_dir(&self.root).map_err(|e| {
            HelperError::io_with_source("Failed to create isolated storage", &self.root, e)
        })
    }
}

#[cfg(unix)]
fn create_private_dir(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(0o700).create(path)
}

#[cfg(not(unix))]
fn create_private_dir(path: &Path) -> std::io::Result<()> {
    fs::create_dir_all(path)
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_root_is_exposed() {
        let temp_dir = TempDir::new().unwrap();
        let storage = IsolatedStorage::at(temp_dir.path());
        assert_eq!(storage.root(), temp_dir.path());
        assert_eq!(storage.path_of("x.sh"), temp_dir.path().join("x.sh"));
    }

    #[test]
    fn test_user_store_is_scoped_to_application() {
        if dirs::data_local_dir().is_none() {
            return;
        }
        let storage = IsolatedStorage::user_store_for_application("acl-runner").unwrap();
        assert!(storage.root().ends_with(Path::new("acl-runner").join("staging")));
    }

    #[test]
    fn test_invalid_application_ids() {
        for id in ["", ".", "..", "a/b", "a\\b"] {
            assert!(
                IsolatedStorage::user_store_for_application(id).is_err(),
                "'{id}' should be rejected"
            );
        }
    }

    #[test]
    fn test_from_config_prefers_storage_root() {
        let config = HelperConfig {
            storage_root: Some(PathBuf::from("/srv/cmdhelp")),
            ..HelperConfig::default()
        };
        let storage = IsolatedStorage::from_config(&config).unwrap();
        assert_eq!(storage.root(), Path::new("/srv/cmdhelp"));
    }

    #[test]
    fn test_write_creates_root_and_delete_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let storage = IsolatedStorage::at(temp_dir.path().join("nested").join("staging"));

        let path = storage.write_file("run_1.sh", b"echo one\n").unwrap();
        assert!(storage.file_exists("run_1.sh"));
        assert_eq!(fs::read(&path).unwrap(), b"echo one\n");

        assert!(storage.delete_file("run_1.sh").unwrap());
        assert!(!storage.delete_file("run_1.sh").unwrap());
        assert!(!storage.file_exists("run_1.sh"));
    }

    #[cfg(unix)]
    #[test]
    fn test_storage_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let storage = IsolatedStorage::at(temp_dir.path().join("staging"));
        let path = storage.write_file("run_2.sh", b"true\n").unwrap();

        let dir_mode = fs::metadata(storage.root()).unwrap().permissions().mode();
        let file_mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(dir_mode & 0o777, 0o700);
        assert_eq!(file_mode & 0o777, 0o600);
    }
}
