//! Core error type for cmdhelp

use std::time::Duration;
use thiserror::Error;

/// Result type alias for cmdhelp operations
pub type HelperResult<T> = Result<T, HelperError>;

/// Main error type for cmdhelp
#[derive(Error, Debug)]
pub enum HelperError {
    /// Programmer misuse: no tool bound, or an operation called in the wrong state
    #[error("Usage error: {message}")]
    Usage { message: String },

    /// Malformed paths, empty command text, missing script file, unparsable arguments
    #[error("{message}")]
    Argument {
        message: String,
        /// Usage text of the bound tool, when the failure came from argument parsing
        usage: Option<String>,
    },

    /// The invoking identity is unauthenticated or not authorized
    #[error("Security error: {message}")]
    Security {
        message: String,
        identity: Option<String>,
    },

    /// Staging, spawning or log-writing failure
    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<String>,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Configuration file or environment could not be parsed
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        context: Option<String>,
    },

    /// The script exceeded its configured time bound and was killed
    #[error("Script execution timeout after {0:?}")]
    Timeout(Duration),

    /// The script was cancelled through its cancellation token
    #[error("Script execution was cancelled")]
    Cancelled,
}

impl HelperError {
    /// Stable identifier for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Usage { .. } => "CMDHELP_USAGE",
            Self::Argument { .. } => "CMDHELP_ARGUMENT",
            Self::Security { .. } => "CMDHELP_SECURITY",
            Self::Io { .. } => "CMDHELP_IO",
            Self::Config { .. } => "CMDHELP_CONFIG",
            Self::Timeout(_) => "CMDHELP_TIMEOUT",
            Self::Cancelled => "CMDHELP_CANCELLED",
        }
    }

    /// Usage text attached to an argument error, if any
    pub fn usage_text(&self) -> Option<&str> {
        match self {
            Self::Argument { usage, .. } => usage.as_deref(),
            _ => None,
        }
    }
}
