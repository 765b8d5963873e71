//! Constructor methods for HelperError

use super::types::HelperError;
use std::path::Path;

impl HelperError {
    /// Create a new usage error
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    /// Create a new argument error
    pub fn argument(message: impl Into<String>) -> Self {
        Self::Argument {
            message: message.into(),
            usage: None,
        }
    }

    /// Create an argument error that carries the tool's usage text
    pub fn argument_with_usage(message: impl Into<String>, usage: impl Into<String>) -> Self {
        Self::Argument {
            message: message.into(),
            usage: Some(usage.into()),
        }
    }

    /// Create a new security error
    pub fn security(message: impl Into<String>) -> Self {
        Self::Security {
            message: message.into(),
            identity: None,
        }
    }

    /// Create a security error naming the rejected identity
    pub fn security_for(message: impl Into<String>, identity: impl Into<String>) -> Self {
        Self::Security {
            message: message.into(),
            identity: Some(identity.into()),
        }
    }

    /// Create a new IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            path: None,
            source: None,
        }
    }

    /// Create an IO error for a path, keeping the underlying error
    pub fn io_with_source(
        message: impl Into<String>,
        path: impl AsRef<Path>,
        source: std::io::Error,
    ) -> Self {
        let path = path.as_ref().display().to_string();
        Self::Io {
            message: format!("{}: {} ({})", message.into(), source, path),
            path: Some(path),
            source: Some(source),
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: None,
        }
    }

    /// Create a configuration error with context
    pub fn config_with_context(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: Some(context.into()),
        }
    }
}
