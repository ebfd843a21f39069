//! Logwire Configuration Layer
//!
//! This crate provides the hierarchical configuration tree that drives
//! Logwire's pipeline binding. Several sources are merged into one tree of
//! [`ConfigNode`]s, each node carrying either a scalar string or an ordered
//! set of keyed children.
//!
//! # Features
//!
//! - **Sources**: JSON, TOML, mutable in-memory pairs and environment variables
//! - **Merging**: later sources override earlier scalars; keys are
//!   case-insensitive; child order follows first appearance
//! - **Shape checking**: a node that is both scalar and structured after
//!   merging is reported as [`ConfigError::AmbiguousShape`]
//! - **Live reload**: [`ConfigurationRoot::reload`] re-reads the sources and
//!   notifies per-path subscribers
//! - **Variable expansion**: `%NAME%` references in scalar values
//!
//! # Example
//!
//! ```rust
//! use logwire_config::{ConfigurationRoot, MemorySource, NodeShape};
//!
//! let overrides = MemorySource::new("overrides");
//! let root = ConfigurationRoot::builder()
//!     .add_json_str(r#"{ "Logging": { "WriteTo": [ "Console" ] } }"#)
//!     .add_memory(overrides.clone())
//!     .build()
//!     .unwrap();
//!
//! let write_to = root.section("Logging").child("WriteTo");
//! assert_eq!(write_to.children()[0].shape().unwrap(), NodeShape::Scalar("Console".into()));
//!
//! overrides.set("Logging:WriteTo:0", "Debug");
//! root.reload().unwrap();
//! assert_eq!(root.node("Logging:WriteTo:0").value(), Some("Debug"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod expand;
mod node;
mod root;
mod source;
mod tree;

pub use error::{ConfigError, ConfigResult};
pub use expand::{expand_environment_variables, expand_with};
pub use node::{ConfigNode, NodeShape};
pub use root::{ChangeCallback, ConfigurationBuilder, ConfigurationRoot, SubscriptionId};
pub use source::{
    ConfigEntry, ConfigurationSource, EnvironmentSource, JsonSource, MemorySource, TomlSource,
    ENVIRONMENT_DELIMITER, KEY_DELIMITER,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{ConfigError, ConfigResult};
    pub use crate::node::{ConfigNode, NodeShape};
    pub use crate::root::{ConfigurationBuilder, ConfigurationRoot};
    pub use crate::source::{ConfigurationSource, MemorySource};
}
