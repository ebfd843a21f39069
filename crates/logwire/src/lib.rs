//! # Logwire
//!
//! Configuration-driven logging pipeline binder.
//!
//! This crate is a thin facade that re-exports the public API of:
//!
//! - [`config`]: layered configuration sources, node views and change
//!   notification
//! - [`model`]: levels, switches, type descriptors, values and the plugin
//!   catalog
//! - [`engine`]: directive extraction, overload selection, value coercion
//!   and the configuration reader
//!
//! # Quick Start
//!
//! ```rust
//! use logwire::prelude::*;
//!
//! let catalog = PluginCatalog::new().with_package(
//!     Package::new("Sample.Console").method(
//!         CandidateMethod::new("Console", Capability::Sink)
//!             .optional("outputTemplate", TypeRef::String, Value::from("{Message}")),
//!     ),
//! );
//! let root = ConfigurationRoot::from_json_str(
//!     r#"{ "Logging": { "MinimumLevel": "Warning", "WriteTo": [ "Console" ] } }"#,
//! )
//! .unwrap();
//!
//! let plan = ConfigurationReader::builder()
//!     .with_catalog(catalog)
//!     .with_configuration(root)
//!     .build()
//!     .unwrap()
//!     .plan()
//!     .unwrap();
//! assert_eq!(plan.steps().len(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub use logwire_config as config;
pub use logwire_core as model;
pub use logwire_engine as engine;

pub use logwire_config::{ConfigError, ConfigNode, ConfigurationBuilder, ConfigurationRoot};
pub use logwire_core::{LogLevel, PipelineBuilder, PluginCatalog};
pub use logwire_engine::{ConfigurationReader, ReaderOptions, ResolveError, ResolveResult};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use logwire_config::prelude::*;
    pub use logwire_core::prelude::*;
    pub use logwire_engine::prelude::*;
}
