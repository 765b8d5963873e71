//! The orchestrator
//!
//! [`Helper`] sequences the two phases of a run:
//!
//! 1. **Setup**: parse arguments through the bound tool, validate the log
//!    path, pass the security gate.
//! 2. **DoWork**: stage the tool's commands, execute the staged script,
//!    clean it up.
//!
//! Cleanup runs whether execution succeeds or fails, and again when the
//! helper is dropped, so a staged script never outlives its helper.

use crate::config::HelperConfig;
use crate::error::{HelperError, HelperResult};
use crate::executor::{ExecutionOutput, ProcessExecutor};
use crate::security::SecurityGate;
use crate::staging::{ScriptStager, StagedScript};
use crate::storage::IsolatedStorage;
use crate::tool::CommandLineTool;
use crate::validation::validate_log_path;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Lifecycle state of a [`Helper`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelperState {
    /// No successful setup yet
    Uninitialized,
    /// Setup succeeded; ready to do work
    Configured,
    /// Work completed; terminal
    Executed,
}

/// Stages, runs and cleans up the commands of a bound tool
pub struct Helper {
    tool: Option<Box<dyn CommandLineTool>>,
    gate: SecurityGate,
    stager: ScriptStager,
    executor: ProcessExecutor,
    staged: Option<StagedScript>,
    state: HelperState,
}

impl Helper {
    /// Helper with no tool bound, configured from `config`
    pub fn new(config: &HelperConfig) -> HelperResult<Self> {
        let storage = IsolatedStorage::from_config(config)?;
        Ok(Self {
            tool: None,
            gate: SecurityGate::for_group(config.required_group.as_deref()),
            stager: ScriptStager::new(storage, config.script_extension.clone()),
            executor: ProcessExecutor::new(config.interpreter.clone())
                .with_timeout(config.timeout),
            staged: None,
            state: HelperState::Uninitialized,
        })
    }

    /// Helper with `tool` bound
    pub fn with_tool(
        config: &HelperConfig,
        tool: impl CommandLineTool + 'static,
    ) -> HelperResult<Self> {
        let mut helper = Self::new(config)?;
        helper.bind_tool(tool);
        Ok(helper)
    }

    /// Replace the security gate
    pub fn with_security_gate(mut self, gate: SecurityGate) -> Self {
        self.gate = gate;
        self
    }

    /// Replace the storage area scripts are staged into
    pub fn with_storage(mut self, storage: IsolatedStorage) -> Self {
        self.stager = ScriptStager::new(storage, self.stager.extension().to_string());
        self
    }

    /// Drive cancellation from an external token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.executor = self.executor.clone().with_cancellation(token);
        self
    }

    /// Bind a tool, discarding any previous one and resetting the lifecycle
    pub fn bind_tool(&mut self, tool: impl CommandLineTool + 'static) {
        self.cleanup();
        self.tool = Some(Box::new(tool));
        self.state = HelperState::Uninitialized;
    }

    /// The bound tool
    pub fn tool(&self) -> Option<&dyn CommandLineTool> {
        self.tool.as_deref()
    }

    pub fn state(&self) -> HelperState {
        self.state
    }

    /// Storage area scripts are staged into
    pub fn storage(&self) -> &IsolatedStorage {
        self.stager.storage()
    }

    /// Script currently staged, if any
    pub fn staged_script(&self) -> Option<&StagedScript> {
        self.staged.as_ref()
    }

    /// Token that cancels a running script
    pub fn cancellation_token(&self) -> CancellationToken {
        self.executor.cancellation_token()
    }

    /// Parse and validate arguments, then check security.
    pub fn setup(&mut self, args: &[String]) -> HelperResult<()> {
        if self.state == HelperState::Executed {
            return Err(HelperError::usage(
                "This helper has already executed its work. Bind a tool again to reuse it.",
            ));
        }

        let tool = self.tool.as_mut().ok_or_else(|| {
            HelperError::usage(
                "Attempt to parse arguments prior to binding a tool. \
                 Bind a tool before calling setup.",
            )
        })?;

        if !tool.parse_arguments(args) {
            return Err(HelperError::argument_with_usage(
                format!("Invalid arguments for {}.\n\n{}", tool.name(), tool.usage()),
                tool.usage(),
            ));
        }

        validate_log_path(tool.log_file_path()).map_err(|e| match e {
            HelperError::Argument { message, .. } => {
                HelperError::argument_with_usage(message, tool.usage())
            }
            other => other,
        })?;

        let identity = self.gate.check()?;

        info!(tool = tool.name(), user = %identity.name, "helper configured");
        self.state = HelperState::Configured;
        Ok(())
    }

    /// Stage the tool's commands, run them, and clean up.
    pub async fn do_work(&mut self) -> HelperResult<ExecutionOutput> {
        let script_path = self.stage()?.path().to_path_buf();
        let (log_file_path, append) = match self.tool.as_deref() {
            Some(tool) => (
                tool.log_file_path().map(|p| p.to_path_buf()),
                tool.append_to_log_file(),
            ),
            None => (None, false),
        };

        let result = self
            .executor
            .execute(&script_path, log_file_path.as_deref(), append)
            .await;

        self.cleanup();

        let output = result?;
        self.state = HelperState::Executed;
        Ok(output)
    }

    /// Stage the tool's commands, replacing any script this helper staged before.
    pub fn stage(&mut self) -> HelperResult<&StagedScript> {
        self.require_configured()?;

        let tool = self
            .tool
            .as_deref()
            .ok_or_else(|| HelperError::usage("No tool bound"))?;
        let commands = tool.commands();

        self.cleanup();
        let script = self.stager.stage(commands.as_deref())?;
        info!(script = %script.path().display(), bytes = script.size(), "commands staged");
        Ok(self.staged.insert(script))
    }

    /// Remove the staged script, if any. Never fails.
    pub fn cleanup(&mut self) {
        if let Some(script) = self.staged.take() {
            if self.stager.remove(&script) {
                debug!(script = %script.path().display(), "staged script removed");
            } else if script.path().exists() {
                warn!(script = %script.path().display(), "staged script left behind");
            }
        }
    }

    fn require_configured(&self) -> HelperResult<()> {
        match self.state {
            HelperState::Configured => Ok(()),
            HelperState::Uninitialized => Err(HelperError::usage(
                "Attempt to do work before a successful setup. Call setup first.",
            )),
            HelperState::Executed => Err(HelperError::usage(
                "This helper has already executed its work.",
            )),
        }
    }
}

impl Drop for Helper {
    fn drop(&mut self) {
        self.cleanup();
    }
}

impl std::fmt::Debug for Helper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Helper")
            .field("tool", &self.tool.as_ref().map(|t| t.name().to_string()))
            .field("state", &self.state)
            .field("storage", self.stager.storage())
            .field("staged", &self.staged)
            .finish()
    }
}
