//! File-based configuration loading

use super::HelperConfig;
use crate::error::{HelperError, HelperResult};
use std::fs;
use std::path::Path;

/// On-disk configuration format, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Toml,
    Yaml,
    /// Anything not recognised as TOML or YAML
    Json,
}

impl ConfigFormat {
    fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::Toml,
            Some("yaml") | Some("yml") => Self::Yaml,
            _ => Self::Json,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Toml => "TOML",
            Self::Yaml => "YAML",
            Self::Json => "JSON",
        }
    }

    fn parse(self, content: &str) -> Result<HelperConfig, String> {
        match self {
            Self::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            Self::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
            Self::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        }
    }
}

/// Load configuration from a TOML, YAML or JSON file.
///
/// A file that does not exist yields the defaults.
pub fn load_from_file(path: &Path) -> HelperResult<HelperConfig> {
    if !path.exists() {
        return Ok(HelperConfig::default());
    }

    let content = fs::read_to_string(path).map_err(|e| {
        HelperError::config_with_context(
            format!("Cannot read {}: {}", path.display(), e),
            "Loading configuration file",
        )
    })?;

    let format = ConfigFormat::for_path(path);
    format.parse(&content).map_err(|reason| {
        HelperError::config_with_context(
            format!("Invalid {} in {}: {}", format.name(), path.display(), reason),
            "Loading configuration file",
        )
    })
}
