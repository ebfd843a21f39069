//! Logwire Core Types
//!
//! This crate provides the domain model shared by the Logwire engine and by
//! plugins that register extension points with it.
//!
//! # Features
//!
//! - **Levels**: [`LogLevel`] with strict member parsing and lenient section parsing
//! - **Switches**: [`LevelSwitch`] and [`FilterSwitch`], lock-free shared cells
//!   that outlive the resolution pass
//! - **Type descriptors**: [`TypeRef`] for parameter targets, [`TypeSpec`] for
//!   constructible types with constructors and static members
//! - **Values**: [`Value`], the converted form of a configuration node
//! - **Catalog**: [`CandidateSource`] and the in-memory [`PluginCatalog`]
//! - **Pipeline contract**: [`PipelineBuilder`] and [`ResolvedCall`]
//!
//! # Example
//!
//! ```rust
//! use logwire_core::prelude::*;
//!
//! let catalog = PluginCatalog::new().with_package(
//!     Package::new("Sample.File").method(
//!         CandidateMethod::new("File", Capability::Sink)
//!             .param("path", TypeRef::String)
//!             .optional("minimumLevel", TypeRef::Level, Value::Level(LogLevel::Verbose)),
//!     ),
//! );
//!
//! let sinks = catalog.candidates(Capability::Sink, &PackageSelection::All, false);
//! assert_eq!(sinks[0].signature(), "File(path: string, minimumLevel: LogLevel)");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod format;
pub mod level;
pub mod method;
pub mod pipeline;
pub mod switch;
pub mod type_spec;
pub mod types;
pub mod value;

pub use catalog::{CandidateSource, Package, PackageSelection, PluginCatalog, CORE_PACKAGE};
pub use error::{LevelParseError, PluginError, PluginResult};
pub use format::FormatProvider;
pub use level::LogLevel;
pub use method::{CandidateMethod, Capability, ParameterSpec, Visibility};
pub use pipeline::{PipelineBuilder, PipelineError, ResolvedCall};
pub use switch::{FilterSwitch, LevelSwitch};
pub use type_spec::{
    ConstructorSpec, MemberBody, ObjectFactory, PropertyGetter, StaticMember, TypeKind, TypeSpec,
};
pub use types::{CallbackKind, ContainerSpec, DelegateSignature, EnumSpec, Insertion, TypeRef};
pub use value::{
    BoundArguments, CallbackFn, CallbackValue, DelegateFn, DelegateValue, EnumValue, ObjectValue,
    Uri, Value,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::catalog::{CandidateSource, Package, PackageSelection, PluginCatalog};
    pub use crate::error::{PluginError, PluginResult};
    pub use crate::level::LogLevel;
    pub use crate::method::{CandidateMethod, Capability};
    pub use crate::pipeline::{PipelineBuilder, ResolvedCall};
    pub use crate::switch::{FilterSwitch, LevelSwitch};
    pub use crate::type_spec::{ConstructorSpec, StaticMember, TypeSpec};
    pub use crate::types::TypeRef;
    pub use crate::value::{BoundArguments, Value};
}
