//! Environment variable overrides
//!
//! Recognised variables (all prefixed with `CMDHELP_`): `APP_ID`,
//! `STORAGE_ROOT`, `TIMEOUT`, `REQUIRED_GROUP`, `INTERPRETER`,
//! `LOG_LEVEL`, `LOG_FORMAT`.

use super::HelperConfig;
use crate::error::{HelperError, HelperResult};
use humantime_serde::re::humantime;
use std::env;
use std::path::PathBuf;

/// Prefix shared by every recognised environment variable
pub const ENV_PREFIX: &str = "CMDHELP_";

/// Apply overrides from the process environment
pub fn apply_env_overrides(config: &mut HelperConfig) -> HelperResult<()> {
    apply_overrides_from(config, |key| env::var(key).ok())
}

/// Apply overrides read through `lookup`, which receives full variable names.
pub fn apply_overrides_from<F>(config: &mut HelperConfig, lookup: F) -> HelperResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}")).filter(|v| !v.is_empty());

    if let Some(app_id) = var("APP_ID") {
        config.application_id = app_id;
    }

    if let Some(root) = var("STORAGE_ROOT") {
        config.storage_root = Some(PathBuf::from(root));
    }

    if let Some(timeout) = var("TIMEOUT") {
        let duration = humantime::parse_duration(&timeout).map_err(|e| {
            HelperError::config_with_context(
                format!("Invalid {ENV_PREFIX}TIMEOUT value '{}': {}", timeout, e),
                "Reading environment overrides",
            )
        })?;
        config.timeout = Some(duration);
    }

    if let Some(group) = var("REQUIRED_GROUP") {
        config.required_group = Some(group);
    }

    if let Some(interpreter) = var("INTERPRETER") {
        let argv = shell_words::split(&interpreter).map_err(|e| {
            HelperError::config_with_context(
                format!("Invalid {ENV_PREFIX}INTERPRETER value '{}': {}", interpreter, e),
                "Reading environment overrides",
            )
        })?;
        if argv.is_empty() {
            return Err(HelperError::config(format!(
                "{ENV_PREFIX}INTERPRETER must name a program"
            )));
        }
        config.interpreter = argv;
    }

    if let Some(level) = var("LOG_LEVEL") {
        config.logging.level = level;
    }

    if let Some(format) = var("LOG_FORMAT") {
        config.logging.format = format;
    }

    Ok(())
}
