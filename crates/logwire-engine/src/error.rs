//! Resolution error types.

use thiserror::Error;

use logwire_config::ConfigError;
use logwire_core::{PipelineError, PluginError};

/// Resolution result type.
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Errors that abort pipeline construction.
///
/// Every variant names the configuration path and/or the name involved so
/// the message points at the offending entry.
#[derive(Debug, Error)]
pub enum ResolveError {
    // ===== Configuration shape =====
    /// A structured directive has no scalar `Name` entry.
    #[error("Directive at '{path}' has child entries but no scalar 'Name'")]
    MissingName {
        /// Path of the directive node.
        path: String,
    },

    /// A node carries a scalar value and child entries at the same time.
    #[error("Configuration node '{path}' has both a scalar value and child entries")]
    AmbiguousShape {
        /// Path of the offending node.
        path: String,
    },

    /// A directive's `Args` entry is a scalar instead of a section.
    #[error("'Args' at '{path}' must be a section of named arguments, not a scalar")]
    ScalarArguments {
        /// Path of the `Args` node.
        path: String,
    },

    /// An abstract type was configured as a section without a `$type`
    /// discriminator.
    #[error("Cannot construct abstract type '{type_name}' at '{path}': add a \"$type\" entry naming a concrete type")]
    AmbiguousType {
        /// Abstract type name.
        type_name: String,
        /// Path of the section.
        path: String,
    },

    // ===== Switches =====
    /// A `$name` reference names no declared level switch.
    #[error("No level switch named '{name}' is declared (referenced at '{path}'); declare it as \"LevelSwitches\":{{\"{name}\":...}}")]
    UndeclaredLevelSwitch {
        /// Referenced switch name.
        name: String,
        /// Path of the referencing node.
        path: String,
    },

    /// A `$name` reference names no declared filter switch.
    #[error("No filter switch named '{name}' is declared (referenced at '{path}'); declare it as \"FilterSwitches\":{{\"{name}\":...}}")]
    UndeclaredFilterSwitch {
        /// Referenced switch name.
        name: String,
        /// Path of the referencing node.
        path: String,
    },

    /// A switch declaration uses a malformed name.
    #[error("'{name}' at '{path}' is not a valid switch name; names start with a letter, contain only letters and digits and may carry a '$' prefix, e.g. \"{section}\":{{\"$mySwitch\":...}}")]
    InvalidSwitchName {
        /// Rejected name.
        name: String,
        /// Declaring section (`LevelSwitches` or `FilterSwitches`).
        section: &'static str,
        /// Path of the declaration.
        path: String,
    },

    /// A level section holds something that is not a level.
    #[error("'{value}' at '{path}' is not a valid log level")]
    InvalidLevel {
        /// Rejected text.
        value: String,
        /// Path of the node.
        path: String,
    },

    /// A filter switch declaration holds an expression the host rejects.
    #[error("Filter expression '{expression}' at '{path}' is invalid: {reason}")]
    InvalidFilterExpression {
        /// Rejected expression.
        expression: String,
        /// Path of the declaration.
        path: String,
        /// Validator message.
        reason: String,
    },

    // ===== Lookups =====
    /// A type name does not resolve through the plugin catalog.
    #[error("Type '{type_name}' referenced at '{path}' was not found")]
    TypeLoad {
        /// Unresolved type name.
        type_name: String,
        /// Path of the referencing node.
        path: String,
    },

    /// A `Type::Member` accessor names no public static member.
    #[error("Type '{type_name}' has no public static member '{member}' (referenced at '{path}')")]
    MemberNotFound {
        /// Owning type.
        type_name: String,
        /// Member name.
        member: String,
        /// Path of the referencing node.
        path: String,
    },

    /// A type named by a scalar has no constructor invocable without
    /// arguments.
    #[error("Type '{type_name}' referenced at '{path}' has no constructor that can be called without arguments")]
    NoDefaultConstructor {
        /// Type name.
        type_name: String,
        /// Path of the referencing node.
        path: String,
    },

    /// No public constructor matches the supplied fields.
    #[error("No constructor of '{type_name}' accepts the fields [{fields}] supplied at '{path}'")]
    NoMatchingConstructor {
        /// Type name.
        type_name: String,
        /// Comma-separated supplied field names.
        fields: String,
        /// Path of the section.
        path: String,
    },

    /// A resolved type or member value cannot stand in for the target type.
    #[error("'{type_name}' at '{path}' cannot be used as '{expected}'")]
    IncompatibleType {
        /// Resolved type name.
        type_name: String,
        /// Expected type name.
        expected: String,
        /// Path of the node.
        path: String,
    },

    /// A callback parameter accepts a payload the engine cannot build.
    #[error("Callback parameter of type '{callback}' at '{path}' is not supported")]
    UnsupportedCallbackType {
        /// Payload type name.
        callback: String,
        /// Path of the section.
        path: String,
    },

    /// A scalar names no member of the target enumeration.
    #[error("'{value}' at '{path}' is not a member of '{type_name}'")]
    InvalidEnumValue {
        /// Enumeration name.
        type_name: String,
        /// Rejected text.
        value: String,
        /// Path of the node.
        path: String,
    },

    /// A scalar cannot be converted to the target type.
    #[error("Cannot convert '{value}' at '{path}' to {target}: {reason}")]
    Conversion {
        /// Source text.
        value: String,
        /// Target type display name.
        target: String,
        /// Path of the node.
        path: String,
        /// Why the conversion failed.
        reason: String,
    },

    // ===== Packages and injection =====
    /// A `Using` entry names an unregistered package.
    #[error("Package '{name}' listed in 'Using' is not registered")]
    PackageNotFound {
        /// Package name.
        name: String,
    },

    /// A `Using` entry is blank.
    #[error("'Using' entry at '{path}' is empty; list package names only")]
    EmptyPackageName {
        /// Path of the entry.
        path: String,
    },

    /// A method needs the application configuration but the reader was
    /// built over a bare section.
    #[error("Parameter '{parameter}' of the method at '{path}' needs the application configuration, which is unavailable when reading a bare section")]
    MissingAppConfiguration {
        /// Parameter name.
        parameter: String,
        /// Path of the directive.
        path: String,
    },

    /// The reader builder lacks a required component.
    #[error("Configuration reader is missing {0}")]
    MissingComponent(&'static str),

    // ===== Wrapped =====
    /// Configuration layer failure.
    #[error(transparent)]
    Config(ConfigError),

    /// A plugin factory, property or delegate failed.
    #[error("Plugin failure at '{path}': {source}")]
    Plugin {
        /// Path of the node being converted.
        path: String,
        /// Plugin error.
        #[source]
        source: PluginError,
    },

    /// The pipeline builder rejected a resolved call.
    #[error("Pipeline builder rejected '{method}': {source}")]
    Pipeline {
        /// Method name.
        method: String,
        /// Builder error.
        #[source]
        source: PipelineError,
    },
}

impl From<ConfigError> for ResolveError {
    fn from(error: ConfigError) -> Self {
        match error {
            ConfigError::AmbiguousShape { path } => ResolveError::AmbiguousShape { path },
            other => ResolveError::Config(other),
        }
    }
}

impl ResolveError {
    /// Creates a conversion error.
    pub fn conversion(
        value: impl Into<String>,
        target: impl std::fmt::Display,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ResolveError::Conversion {
            value: value.into(),
            target: target.to_string(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Wraps a plugin failure.
    pub fn plugin(path: impl Into<String>, source: PluginError) -> Self {
        ResolveError::Plugin {
            path: path.into(),
            source,
        }
    }
}
