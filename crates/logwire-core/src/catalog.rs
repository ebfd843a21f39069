//! Plugin catalog: the registry of candidate methods and types.
//!
//! Plugins register themselves as [`Package`]s holding extension methods
//! and constructible types. The engine consumes the catalog only through
//! the [`CandidateSource`] trait, so hosts can back it with anything that
//! reports the same shapes.
//!
//! # Ordering
//!
//! Registration order is significant: candidates are reported package by
//! package in the order packages were registered, and within a package in
//! the order methods were added. The method resolver breaks ties by this
//! order.

use std::sync::Arc;

use tracing::debug;

use crate::method::{CandidateMethod, Capability, Visibility};
use crate::type_spec::TypeSpec;

/// Name of the package that is always searched, even under `Using`.
pub const CORE_PACKAGE: &str = "core";

// =============================================================================
// PACKAGES
// =============================================================================

/// A named group of extension methods and types.
#[derive(Debug, Clone)]
pub struct Package {
    /// Package name, compared case-insensitively.
    pub name: String,
    /// Whether the package is searched when no `Using` list is configured.
    pub auto_discover: bool,
    /// Extension methods in registration order.
    pub methods: Vec<Arc<CandidateMethod>>,
    /// Types in registration order.
    pub types: Vec<Arc<TypeSpec>>,
}

impl Package {
    /// Creates an empty, auto-discoverable package.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            auto_discover: true,
            methods: Vec::new(),
            types: Vec::new(),
        }
    }

    /// Creates the core package.
    pub fn core() -> Self {
        Self::new(CORE_PACKAGE)
    }

    /// Builder method to require an explicit `Using` entry.
    pub fn explicit_only(mut self) -> Self {
        self.auto_discover = false;
        self
    }

    /// Builder method to add an extension method.
    pub fn method(mut self, mut method: CandidateMethod) -> Self {
        method.package = self.name.clone();
        self.methods.push(Arc::new(method));
        self
    }

    /// Builder method to add a type.
    pub fn type_spec(mut self, mut spec: TypeSpec) -> Self {
        spec.package = self.name.clone();
        self.types.push(Arc::new(spec));
        self
    }

    /// Whether this package answers to `name`.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name.trim())
    }

    /// Whether this is the core package.
    pub fn is_core(&self) -> bool {
        self.is_named(CORE_PACKAGE)
    }
}

/// Which packages a resolution pass searches for candidate methods.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PackageSelection {
    /// Every auto-discoverable package.
    #[default]
    All,
    /// The core package plus the named packages.
    Named(Vec<String>),
}

impl PackageSelection {
    /// Whether `package` is part of the selection.
    pub fn includes(&self, package: &Package) -> bool {
        match self {
            PackageSelection::All => package.auto_discover || package.is_core(),
            PackageSelection::Named(names) => {
                package.is_core() || names.iter().any(|n| package.is_named(n))
            }
        }
    }
}

// =============================================================================
// CANDIDATE SOURCE
// =============================================================================

/// Supplies candidate methods and resolves type names.
pub trait CandidateSource: Send + Sync {
    /// Candidates for `capability` from the selected packages, in
    /// registration order. Internal methods are included only when
    /// `allow_internal` is set.
    fn candidates(
        &self,
        capability: Capability,
        selection: &PackageSelection,
        allow_internal: bool,
    ) -> Vec<Arc<CandidateMethod>>;

    /// Resolves a type name of the form `Full.Type.Name[, Package[, ...]]`.
    ///
    /// Internal types are visible only when `allow_internal` is set.
    fn resolve_type(&self, name: &str, allow_internal: bool) -> Option<Arc<TypeSpec>>;

    /// Whether a package with this name is registered.
    fn has_package(&self, name: &str) -> bool;
}

// =============================================================================
// IN-MEMORY CATALOG
// =============================================================================

/// An in-memory [`CandidateSource`] populated by explicit registration.
#[derive(Debug, Clone, Default)]
pub struct PluginCatalog {
    packages: Vec<Package>,
}

impl PluginCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to register a package.
    pub fn with_package(mut self, package: Package) -> Self {
        self.register(package);
        self
    }

    /// Registers a package. A package with the same name is merged into the
    /// existing registration, keeping its position.
    pub fn register(&mut self, package: Package) {
        debug!(
            package = %package.name,
            methods = package.methods.len(),
            types = package.types.len(),
            "registering plugin package"
        );
        match self.packages.iter_mut().find(|p| p.is_named(&package.name)) {
            Some(existing) => {
                existing.methods.extend(package.methods);
                existing.types.extend(package.types);
                existing.auto_discover &= package.auto_discover;
            }
            None => self.packages.push(package),
        }
    }

    /// Registered packages in order.
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    fn visible(visibility: Visibility, allow_internal: bool) -> bool {
        visibility == Visibility::Public || allow_internal
    }
}

impl CandidateSource for PluginCatalog {
    fn candidates(
        &self,
        capability: Capability,
        selection: &PackageSelection,
        allow_internal: bool,
    ) -> Vec<Arc<CandidateMethod>> {
        self.packages
            .iter()
            .filter(|p| selection.includes(p))
            .flat_map(|p| p.methods.iter())
            .filter(|m| m.capability == capability && Self::visible(m.visibility, allow_internal))
            .cloned()
            .collect()
    }

    fn resolve_type(&self, name: &str, allow_internal: bool) -> Option<Arc<TypeSpec>> {
        let mut parts = name.split(',').map(str::trim);
        let type_name = parts.next().filter(|t| !t.is_empty())?;
        let package = parts.next().filter(|p| !p.is_empty());

        self.packages
            .iter()
            .filter(|p| package.map_or(true, |name| p.is_named(name)))
            .flat_map(|p| p.types.iter())
            .find(|t| t.full_name == type_name && Self::visible(t.visibility, allow_internal))
            .cloned()
    }

    fn has_package(&self, name: &str) -> bool {
        self.packages.iter().any(|p| p.is_named(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeRef;

    fn catalog() -> PluginCatalog {
        PluginCatalog::new()
            .with_package(
                Package::core()
                    .method(CandidateMethod::new("Console", Capability::Sink))
                    .method(CandidateMethod::new("Secret", Capability::Sink).internal()),
            )
            .with_package(
                Package::new("Sample.File")
                    .method(CandidateMethod::new("File", Capability::Sink).param("path", TypeRef::String))
                    .type_spec(TypeSpec::concrete("Sample.File.Formatter")),
            )
            .with_package(
                Package::new("Sample.Hidden")
                    .explicit_only()
                    .method(CandidateMethod::new("Hidden", Capability::Sink))
                    .type_spec(TypeSpec::concrete("Sample.Hidden.Internal").internal()),
            )
    }

    fn names(methods: &[Arc<CandidateMethod>]) -> Vec<&str> {
        methods.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn test_candidates_in_registration_order() {
        let all = catalog().candidates(Capability::Sink, &PackageSelection::All, false);
        assert_eq!(names(&all), vec!["Console", "File"]);
        assert_eq!(all[1].package, "Sample.File");
    }

    #[test]
    fn test_internal_toggle() {
        let all = catalog().candidates(Capability::Sink, &PackageSelection::All, true);
        assert_eq!(names(&all), vec!["Console", "Secret", "File"]);
    }

    #[test]
    fn test_named_selection_keeps_core() {
        let selection = PackageSelection::Named(vec!["sample.hidden".to_string()]);
        let found = catalog().candidates(Capability::Sink, &selection, false);
        assert_eq!(names(&found), vec!["Console", "Hidden"]);
    }

    #[test]
    fn test_resolve_type_with_package_qualifier() {
        let catalog = catalog();
        assert!(catalog.resolve_type("Sample.File.Formatter", false).is_some());
        assert!(catalog
            .resolve_type("Sample.File.Formatter, sample.file", false)
            .is_some());
        assert!(catalog
            .resolve_type("Sample.File.Formatter, Other", false)
            .is_none());
        assert!(catalog.resolve_type("Sample.Hidden.Internal", false).is_none());
        assert!(catalog.resolve_type("Sample.Hidden.Internal", true).is_some());
        assert!(catalog.resolve_type("", false).is_none());
    }

    #[test]
    fn test_register_merges_same_name() {
        let mut catalog = catalog();
        catalog.register(Package::new("SAMPLE.FILE").method(CandidateMethod::new("Rolling", Capability::Sink)));
        assert_eq!(catalog.packages().len(), 3);
        assert!(catalog.has_package("sample.file"));
        let all = catalog.candidates(Capability::Sink, &PackageSelection::All, false);
        assert_eq!(names(&all), vec!["Console", "File", "Rolling"]);
    }
}
