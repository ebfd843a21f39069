//! Configuration error types.

use thiserror::Error;

/// Configuration operation result type.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration source could not be read.
    #[error("Configuration source '{source_name}' could not be read: {message}")]
    SourceUnavailable {
        /// Name of the failing source.
        source_name: String,
        /// Underlying failure.
        message: String,
    },

    /// A configuration source was read but its content is malformed.
    #[error("Failed to parse configuration source '{source_name}': {message}")]
    Parse {
        /// Name of the failing source.
        source_name: String,
        /// Parser message.
        message: String,
    },

    /// A node carries a scalar value and child entries at the same time.
    ///
    /// This happens when merged sources disagree on the shape of a key,
    /// e.g. one file sets `"MinimumLevel": "Debug"` and another sets
    /// `"MinimumLevel": { "Default": "Debug" }`.
    #[error("Configuration node '{path}' has both a scalar value and child entries; the merged sources disagree on its shape")]
    AmbiguousShape {
        /// Path of the offending node.
        path: String,
    },
}

impl ConfigError {
    /// Creates a parse error for the given source.
    pub fn parse(source_name: impl Into<String>, message: impl std::fmt::Display) -> Self {
        ConfigError::Parse {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    /// Creates an unavailable-source error for the given source.
    pub fn unavailable(source_name: impl Into<String>, message: impl std::fmt::Display) -> Self {
        ConfigError::SourceUnavailable {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }
}
