//! cmdhelp core library
//!
//! Stages the commands of a [`CommandLineTool`] as a transient script in
//! isolated per-user storage, runs it as a child process, optionally logs
//! its output, and removes the script again. Arguments are validated and
//! the invoking identity is checked before anything is written or run.
//!
//! ```no_run
//! # async fn run(tool: impl cmdhelp_core::CommandLineTool + 'static) -> cmdhelp_core::HelperResult<()> {
//! use cmdhelp_core::{Helper, HelperConfig};
//!
//! let config = HelperConfig::default();
//! let mut helper = Helper::with_tool(&config, tool)?;
//! helper.setup(&["--app=/usr/bin/getfacl".to_string(), "--path=/srv".to_string()])?;
//! let output = helper.do_work().await?;
//! println!("{}", output.stdout_lossy());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod helper;
pub mod security;
pub mod staging;
pub mod storage;
pub mod tool;
pub mod validation;

// Re-export commonly used types
pub use config::{HelperConfig, LoggingConfig, load_config};
pub use error::{HelperError, HelperResult};
pub use executor::{ExecutionOutput, ProcessExecutor};
pub use helper::{Helper, HelperState};
pub use security::{AuthorizationPolicy, Identity, IdentitySource, SecurityGate};
pub use staging::{ScriptStager, StagedScript};
pub use storage::IsolatedStorage;
pub use tool::CommandLineTool;
