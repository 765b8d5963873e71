//! Helper configuration
//!
//! Configuration is layered: built-in defaults, then an optional file
//! (TOML, YAML or JSON by extension), then `CMDHELP_*` environment variables.

mod env_loader;
mod file_loader;

pub use env_loader::{ENV_PREFIX, apply_env_overrides, apply_overrides_from};
pub use file_loader::load_from_file;

use crate::error::HelperResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default application identity used to scope isolated storage
pub const DEFAULT_APPLICATION_ID: &str = "cmdhelp";

/// Configuration for a [`Helper`](crate::Helper)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HelperConfig {
    /// Application identity; isolated storage is scoped to it
    pub application_id: String,

    /// Overrides the per-user data directory as the storage root
    pub storage_root: Option<PathBuf>,

    /// Extension given to staged scripts (without the dot)
    pub script_extension: String,

    /// Interpreter argv; the staged script path is appended as the last argument
    pub interpreter: Vec<String>,

    /// Upper bound on script run time (unbounded if not set)
    #[serde(with = "humantime_serde")]
    pub timeout: Option<Duration>,

    /// Group the invoking identity must belong to, if any
    pub required_group: Option<String>,

    /// Logging settings for the binary
    pub logging: LoggingConfig,
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            application_id: DEFAULT_APPLICATION_ID.to_string(),
            storage_root: None,
            script_extension: default_script_extension().to_string(),
            interpreter: default_interpreter(),
            timeout: None,
            required_group: None,
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (pretty, compact, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[cfg(unix)]
fn default_script_extension() -> &'static str {
    "sh"
}

#[cfg(not(unix))]
fn default_script_extension() -> &'static str {
    "cmd"
}

#[cfg(unix)]
fn default_interpreter() -> Vec<String> {
    vec!["sh".to_string()]
}

#[cfg(not(unix))]
fn default_interpreter() -> Vec<String> {
    vec!["cmd".to_string(), "/C".to_string()]
}

/// Load configuration from an optional file, then apply environment overrides.
///
/// A missing file yields the defaults.
pub fn load_config(path: Option<&Path>) -> HelperResult<HelperConfig> {
    let mut config = match path {
        Some(path) => load_from_file(path)?,
        None => HelperConfig::default(),
    };
    apply_env_overrides(&mut config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HelperConfig::default();
        assert_eq!(config.application_id, "cmdhelp");
        assert!(config.storage_root.is_none());
        assert!(config.timeout.is_none());
        assert!(!config.interpreter.is_empty());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: HelperConfig = toml::from_str("application_id = \"acl-runner\"").unwrap();
        assert_eq!(config.application_id, "acl-runner");
        assert_eq!(config.interpreter, default_interpreter());
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_timeout_uses_humantime() {
        let config: HelperConfig = toml::from_str("timeout = \"1m 30s\"").unwrap();
        assert_eq!(config.timeout, Some(Duration::from_secs(90)));
    }
}
