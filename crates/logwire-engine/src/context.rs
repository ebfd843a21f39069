//! Resolution context and switch registry.
//!
//! One context is created per top-level read and shared by `Arc` with every
//! nested callback, so a switch declared once is visible in every scope
//! created from the same pass.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

use logwire_config::ConfigurationRoot;
use logwire_core::{
    CandidateMethod, CandidateSource, Capability, FilterSwitch, FormatProvider, LevelSwitch,
    PackageSelection, TypeSpec,
};

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::{ResolveError, ResolveResult};
use crate::options::ReaderOptions;

/// Section declaring named level switches.
pub const LEVEL_SWITCHES_SECTION: &str = "LevelSwitches";

/// Section declaring named filter switches.
pub const FILTER_SWITCHES_SECTION: &str = "FilterSwitches";

static SWITCH_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\$?[A-Za-z][A-Za-z0-9]*$").expect("switch-name pattern is valid")
});

/// Canonical `$name` form of a switch name or reference.
pub fn normalize_switch_name(name: &str) -> String {
    let name = name.trim();
    if name.starts_with('$') {
        name.to_string()
    } else {
        format!("${name}")
    }
}

/// State shared by one resolution pass and its nested scopes.
pub struct ResolutionContext {
    catalog: Arc<dyn CandidateSource>,
    selection: PackageSelection,
    options: ReaderOptions,
    app_configuration: Option<ConfigurationRoot>,
    level_switches: DashMap<String, LevelSwitch>,
    filter_switches: DashMap<String, FilterSwitch>,
}

impl ResolutionContext {
    /// Creates a context over `catalog` searching every auto-discoverable
    /// package.
    pub fn new(catalog: Arc<dyn CandidateSource>, options: ReaderOptions) -> Self {
        Self {
            catalog,
            selection: PackageSelection::All,
            options,
            app_configuration: None,
            level_switches: DashMap::new(),
            filter_switches: DashMap::new(),
        }
    }

    /// Builder method to restrict candidate discovery.
    pub fn with_selection(mut self, selection: PackageSelection) -> Self {
        self.selection = selection;
        self
    }

    /// Builder method to make the full configuration injectable.
    pub fn with_app_configuration(mut self, root: ConfigurationRoot) -> Self {
        self.app_configuration = Some(root);
        self
    }

    /// Reader options.
    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// Format provider for scalar conversions.
    pub fn format_provider(&self) -> &FormatProvider {
        &self.options.format_provider
    }

    /// Diagnostics sink.
    pub fn diagnostics(&self) -> &Arc<dyn DiagnosticSink> {
        self.options.diagnostics()
    }

    /// Full configuration, when the reader was built over a root.
    pub fn app_configuration(&self) -> Option<&ConfigurationRoot> {
        self.app_configuration.as_ref()
    }

    /// Package selection in effect.
    pub fn selection(&self) -> &PackageSelection {
        &self.selection
    }

    /// Candidate methods for `capability`.
    pub fn candidates(&self, capability: Capability) -> Vec<Arc<CandidateMethod>> {
        self.catalog
            .candidates(capability, &self.selection, self.options.allow_internal_methods)
    }

    /// Resolves a type name, failing with [`ResolveError::TypeLoad`].
    pub fn resolve_type(&self, name: &str, path: &str) -> ResolveResult<Arc<TypeSpec>> {
        self.catalog
            .resolve_type(name.trim(), self.options.allow_internal_types)
            .ok_or_else(|| ResolveError::TypeLoad {
                type_name: name.trim().to_string(),
                path: path.to_string(),
            })
    }

    // ===== Level switches =====

    /// Registers a level switch under `name`, returning the canonical name.
    ///
    /// A repeated name replaces the earlier switch and is reported as
    /// [`Diagnostic::SwitchRedeclared`].
    pub fn declare_level_switch(
        &self,
        name: &str,
        switch: LevelSwitch,
        path: &str,
    ) -> ResolveResult<String> {
        let key = validated_name(name, LEVEL_SWITCHES_SECTION, path)?;
        info!(switch = %key, level = %switch.minimum_level(), "declared level switch");
        if self.level_switches.insert(key.clone(), switch).is_some() {
            self.report_redeclared(&key, path);
        }
        Ok(key)
    }

    /// Looks up a declared level switch by `$name` reference.
    pub fn level_switch(&self, reference: &str, path: &str) -> ResolveResult<LevelSwitch> {
        let key = normalize_switch_name(reference);
        self.level_switches
            .get(&key)
            .map(|entry| entry.value().clone())
            .ok_or(ResolveError::UndeclaredLevelSwitch {
                name: key,
                path: path.to_string(),
            })
    }

    /// Names of declared level switches, sorted.
    pub fn level_switch_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.level_switches.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    // ===== Filter switches =====

    /// Registers a filter switch under `name`, returning the canonical name.
    pub fn declare_filter_switch(
        &self,
        name: &str,
        switch: FilterSwitch,
        path: &str,
    ) -> ResolveResult<String> {
        let key = validated_name(name, FILTER_SWITCHES_SECTION, path)?;
        info!(switch = %key, "declared filter switch");
        if self.filter_switches.insert(key.clone(), switch).is_some() {
            self.report_redeclared(&key, path);
        }
        Ok(key)
    }

    /// Looks up a declared filter switch by `$name` reference.
    pub fn filter_switch(&self, reference: &str, path: &str) -> ResolveResult<FilterSwitch> {
        let key = normalize_switch_name(reference);
        self.filter_switches
            .get(&key)
            .map(|entry| entry.value().clone())
            .ok_or(ResolveError::UndeclaredFilterSwitch {
                name: key,
                path: path.to_string(),
            })
    }

    /// Names of declared filter switches, sorted.
    pub fn filter_switch_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.filter_switches.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    fn report_redeclared(&self, name: &str, path: &str) {
        self.diagnostics().report(Diagnostic::SwitchRedeclared {
            name: name.to_string(),
            path: path.to_string(),
        });
    }
}

fn validated_name(name: &str, section: &'static str, path: &str) -> ResolveResult<String> {
    if SWITCH_NAME.is_match(name.trim()) {
        Ok(normalize_switch_name(name))
    } else {
        Err(ResolveError::InvalidSwitchName {
            name: name.to_string(),
            section,
            path: path.to_string(),
        })
    }
}

impl fmt::Debug for ResolutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolutionContext")
            .field("selection", &self.selection)
            .field("options", &self.options)
            .field("app_configuration", &self.app_configuration.is_some())
            .field("level_switches", &self.level_switch_names())
            .field("filter_switches", &self.filter_switch_names())
            .finish_non_exhaustive()
    }
}
