//! Reader options.

use std::fmt;
use std::sync::Arc;

use logwire_core::{FilterSwitch, FormatProvider, LevelSwitch};

use crate::diagnostics::{DiagnosticSink, TracingDiagnostics};

/// Default configuration section read by the reader.
pub const DEFAULT_SECTION_NAME: &str = "Logging";

/// Hook called with each declared level switch.
pub type LevelSwitchHook = Arc<dyn Fn(&str, &LevelSwitch) + Send + Sync>;

/// Hook called with each declared filter switch.
pub type FilterSwitchHook = Arc<dyn Fn(&str, &FilterSwitch) + Send + Sync>;

/// Validates a filter expression, returning the rejection reason.
pub type FilterValidator = Arc<dyn Fn(&str) -> Result<(), String> + Send + Sync>;

/// Options controlling a configuration read.
#[derive(Clone)]
pub struct ReaderOptions {
    /// Section holding the logging configuration.
    pub section_name: String,
    /// Number formatting applied to scalar conversions.
    pub format_provider: FormatProvider,
    /// Whether internal extension methods are eligible.
    pub allow_internal_methods: bool,
    /// Whether internal types can be resolved and constructed.
    pub allow_internal_types: bool,
    diagnostics: Arc<dyn DiagnosticSink>,
    on_level_switch_created: Option<LevelSwitchHook>,
    on_filter_switch_created: Option<FilterSwitchHook>,
    filter_validator: Option<FilterValidator>,
}

impl ReaderOptions {
    /// Default options: `Logging` section, invariant formatting, public
    /// candidates only, diagnostics to `tracing`.
    pub fn new() -> Self {
        Self {
            section_name: DEFAULT_SECTION_NAME.to_string(),
            format_provider: FormatProvider::invariant(),
            allow_internal_methods: false,
            allow_internal_types: false,
            diagnostics: Arc::new(TracingDiagnostics),
            on_level_switch_created: None,
            on_filter_switch_created: None,
            filter_validator: None,
        }
    }

    /// Set the configuration section name.
    pub fn with_section_name(mut self, name: impl Into<String>) -> Self {
        self.section_name = name.into();
        self
    }

    /// Set the format provider.
    pub fn with_format_provider(mut self, provider: FormatProvider) -> Self {
        self.format_provider = provider;
        self
    }

    /// Allow or forbid internal extension methods.
    pub fn with_internal_methods(mut self, allow: bool) -> Self {
        self.allow_internal_methods = allow;
        self
    }

    /// Allow or forbid internal types.
    pub fn with_internal_types(mut self, allow: bool) -> Self {
        self.allow_internal_types = allow;
        self
    }

    /// Set the diagnostics sink.
    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = sink;
        self
    }

    /// Set the hook called with each declared level switch.
    pub fn on_level_switch_created<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str, &LevelSwitch) + Send + Sync + 'static,
    {
        self.on_level_switch_created = Some(Arc::new(hook));
        self
    }

    /// Set the hook called with each declared filter switch.
    pub fn on_filter_switch_created<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str, &FilterSwitch) + Send + Sync + 'static,
    {
        self.on_filter_switch_created = Some(Arc::new(hook));
        self
    }

    /// Set the filter-expression validator used for declarations and reloads.
    pub fn with_filter_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&str) -> Result<(), String> + Send + Sync + 'static,
    {
        self.filter_validator = Some(Arc::new(validator));
        self
    }

    /// The diagnostics sink.
    pub fn diagnostics(&self) -> &Arc<dyn DiagnosticSink> {
        &self.diagnostics
    }

    /// The level switch hook, if set.
    pub fn level_switch_hook(&self) -> Option<&LevelSwitchHook> {
        self.on_level_switch_created.as_ref()
    }

    /// The filter switch hook, if set.
    pub fn filter_switch_hook(&self) -> Option<&FilterSwitchHook> {
        self.on_filter_switch_created.as_ref()
    }

    /// The filter validator, if set.
    pub fn filter_validator(&self) -> Option<&FilterValidator> {
        self.filter_validator.as_ref()
    }

    /// Runs the validator on `expression`; accepts everything when none is set.
    pub fn validate_filter(&self, expression: &str) -> Result<(), String> {
        match &self.filter_validator {
            Some(validate) => validate(expression),
            None => Ok(()),
        }
    }
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ReaderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderOptions")
            .field("section_name", &self.section_name)
            .field("format_provider", &self.format_provider)
            .field("allow_internal_methods", &self.allow_internal_methods)
            .field("allow_internal_types", &self.allow_internal_types)
            .field("on_level_switch_created", &self.on_level_switch_created.is_some())
            .field("on_filter_switch_created", &self.on_filter_switch_created.is_some())
            .field("filter_validator", &self.filter_validator.is_some())
            .finish_non_exhaustive()
    }
}
