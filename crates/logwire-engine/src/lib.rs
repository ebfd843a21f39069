//! Logwire Resolution Engine
//!
//! This crate turns a logging configuration section into an ordered list of
//! resolved extension-method calls against a plugin catalog.
//!
//! # Features
//!
//! - **Directive extraction**: simplified (`"Console"`) and expanded
//!   (`{ "Name": ..., "Args": {...} }`) entries, in source order
//! - **Overload selection**: eligibility by supplied argument names, ranking
//!   by bound parameters, then string-typed parameters
//! - **Value coercion**: primitives, enumerations, switch references, static
//!   member accessors, nested callbacks, arrays, containers and object
//!   construction with `$type` discriminators
//! - **Switch registry**: named level and filter switches wired to
//!   configuration reloads
//! - **All-or-nothing application**: [`ConfigurationReader::plan`] resolves
//!   everything before [`ResolutionPlan::apply`] touches the pipeline
//! - **Diagnostics**: skipped directives and failed reloads are reported to a
//!   [`DiagnosticSink`]
//!
//! # Example
//!
//! ```rust
//! use logwire_config::ConfigurationRoot;
//! use logwire_core::prelude::*;
//! use logwire_engine::prelude::*;
//!
//! let catalog = PluginCatalog::new().with_package(
//!     Package::new("Sample.File").method(
//!         CandidateMethod::new("File", Capability::Sink).param("path", TypeRef::String),
//!     ),
//! );
//! let root = ConfigurationRoot::from_json_str(
//!     r#"{ "Logging": { "MinimumLevel": "Debug", "WriteTo": [ { "Name": "File", "Args": { "path": "app.log" } } ] } }"#,
//! )
//! .unwrap();
//!
//! let reader = ConfigurationReader::builder()
//!     .with_catalog(catalog)
//!     .with_configuration(root)
//!     .build()
//!     .unwrap();
//! let plan = reader.plan().unwrap();
//! assert_eq!(plan.steps().len(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod builder;
mod callback;
pub mod coercion;
pub mod context;
pub mod diagnostics;
pub mod directive;
pub mod error;
pub mod options;
pub mod reader;
pub mod resolver;
pub mod scalar;

pub use builder::{package_selection, ConfigurationReaderBuilder, USING_SECTION};
pub use coercion::{convert, implicit_value, TYPE_DISCRIMINATOR};
pub use context::{
    normalize_switch_name, ResolutionContext, FILTER_SWITCHES_SECTION, LEVEL_SWITCHES_SECTION,
};
pub use diagnostics::{Diagnostic, DiagnosticSink, MemoryDiagnostics, TracingDiagnostics};
pub use directive::{extract_directives, Directive, ARGS_KEY, NAME_KEY};
pub use error::{ResolveError, ResolveResult};
pub use options::{
    FilterSwitchHook, FilterValidator, LevelSwitchHook, ReaderOptions, DEFAULT_SECTION_NAME,
};
pub use reader::{
    ConfigurationReader, PipelineStep, ResolutionPlan, MINIMUM_LEVEL_SECTION, PROPERTIES_SECTION,
};
pub use resolver::{bind_call, is_eligible, overloads, select};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::diagnostics::{Diagnostic, DiagnosticSink, MemoryDiagnostics};
    pub use crate::error::{ResolveError, ResolveResult};
    pub use crate::options::ReaderOptions;
    pub use crate::reader::{ConfigurationReader, PipelineStep, ResolutionPlan};
}
