//! cmdhelp command-line front end
//!
//! Parses permissions-listing arguments, stages the resulting command as a
//! transient script in per-user storage, runs it and removes it again.
//!
//! ```bash
//! cmdhelp --app=/usr/bin/getfacl --path=/srv --log=acl.log
//! ```
//!
//! Configuration is read from `$CMDHELP_CONFIG` (default `cmdhelp.toml`) and
//! `CMDHELP_*` environment variables.

mod acl;
mod logging;

use acl::AclTool;
use anyhow::Context;
use cmdhelp_core::{ExecutionOutput, Helper, HelperError, load_config};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::warn;

/// Environment variable naming the configuration file
const CONFIG_ENV: &str = "CMDHELP_CONFIG";

/// Configuration file used when `CMDHELP_CONFIG` is unset
const DEFAULT_CONFIG_FILE: &str = "cmdhelp.toml";

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<ExitCode> {
    let config_path = std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let config = load_config(Some(&config_path))
        .with_context(|| format!("failed to load {}", config_path.display()))?;

    logging::init(&config.logging)?;

    let mut helper = Helper::with_tool(&config, AclTool::default())?;

    // Ctrl+C kills the running script; cleanup still happens in do_work
    let token = helper.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling script");
            token.cancel();
        }
    });

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = helper.setup(&args) {
        return Ok(report(&e));
    }

    match helper.do_work().await {
        Ok(output) => {
            if output.log_file.is_none() {
                echo(&output)?;
            }
            Ok(exit_code(&output))
        }
        Err(e) => Ok(report(&e)),
    }
}

/// Forward captured output when no log file took it
fn echo(output: &ExecutionOutput) -> anyhow::Result<()> {
    std::io::stdout()
        .write_all(&output.stdout)
        .context("failed to write script output")?;
    std::io::stderr()
        .write_all(&output.stderr)
        .context("failed to write script errors")?;
    Ok(())
}

fn exit_code(output: &ExecutionOutput) -> ExitCode {
    match output.exit_code {
        Some(0) => ExitCode::SUCCESS,
        Some(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        None => ExitCode::FAILURE,
    }
}

fn report(error: &HelperError) -> ExitCode {
    let message = error.to_string();
    eprintln!("{message}");
    if let Some(usage) = error.usage_text().filter(|u| !message.contains(u)) {
        eprintln!("\n{usage}");
    }
    warn!(code = error.error_code(), "run failed");

    match error {
        HelperError::Usage { .. } | HelperError::Argument { .. } => ExitCode::from(2),
        _ => ExitCode::FAILURE,
    }
}
