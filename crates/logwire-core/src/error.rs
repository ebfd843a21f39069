//! Error types for plugin-facing operations.

use thiserror::Error;

/// Result type for plugin factories, delegates and argument accessors.
pub type PluginResult<T> = Result<T, PluginError>;

/// Errors raised by plugin code or by typed argument access.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PluginError {
    /// A plugin factory or delegate failed.
    #[error("Plugin failure: {message}")]
    Failed {
        /// Description of the failure.
        message: String,
    },

    /// A bound argument the plugin expected is absent.
    #[error("Missing argument '{name}'")]
    MissingArgument {
        /// Parameter name.
        name: String,
    },

    /// A bound argument has an unexpected value kind.
    #[error("Argument '{name}' is not {expected}")]
    ArgumentType {
        /// Parameter name.
        name: String,
        /// Expected kind, e.g. "a string".
        expected: String,
    },

    /// A string is not an absolute URI.
    #[error("Invalid URI '{value}': {reason}")]
    InvalidUri {
        /// The rejected text.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl PluginError {
    /// Creates a generic plugin failure.
    pub fn failed(message: impl Into<String>) -> Self {
        PluginError::Failed {
            message: message.into(),
        }
    }
}

/// A string that names no [`crate::LogLevel`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{value}' is not a valid log level")]
pub struct LevelParseError {
    /// The rejected text.
    pub value: String,
}
