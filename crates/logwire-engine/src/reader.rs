//! Configuration reader.
//!
//! Reading happens in two steps. [`ConfigurationReader::plan`] walks the
//! section phases in a fixed order and resolves everything into a
//! [`ResolutionPlan`]; any error aborts before the pipeline is touched.
//! [`ResolutionPlan::apply`] then replays the steps against a
//! [`PipelineBuilder`] and subscribes the switches to configuration reloads.
//!
//! Phase order: `LevelSwitches`, `FilterSwitches`, `MinimumLevel`, `Enrich`,
//! `Properties`, `Filter`, `Destructure`, `WriteTo`, `AuditTo`.

use std::sync::Arc;

use tracing::{debug, info};

use logwire_config::{expand_environment_variables, ConfigNode, NodeShape, SubscriptionId};
use logwire_core::{
    Capability, FilterSwitch, LevelSwitch, LogLevel, PipelineBuilder, ResolvedCall,
};

use crate::builder::ConfigurationReaderBuilder;
use crate::context::{ResolutionContext, FILTER_SWITCHES_SECTION, LEVEL_SWITCHES_SECTION};
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::directive::{extract_directives, section_entries};
use crate::error::{ResolveError, ResolveResult};
use crate::options::FilterValidator;
use crate::resolver::{bind_call, overloads, select};

/// Section holding the default minimum level and per-source overrides.
pub const MINIMUM_LEVEL_SECTION: &str = "MinimumLevel";

/// Section of fixed event properties.
pub const PROPERTIES_SECTION: &str = "Properties";

const DEFAULT_KEY: &str = "Default";
const CONTROLLED_BY_KEY: &str = "ControlledBy";
const OVERRIDE_KEY: &str = "Override";

/// Directive sections after `Enrich`/`Properties`, in application order.
const TRAILING_SECTIONS: [Capability; 4] = [
    Capability::Filter,
    Capability::Destructure,
    Capability::Sink,
    Capability::AuditSink,
];

// =============================================================================
// PLAN
// =============================================================================

/// One resolved operation against the pipeline builder.
#[derive(Debug, Clone)]
pub enum PipelineStep {
    /// Minimum level controlled by a switch.
    MinimumLevel {
        /// Controlling switch.
        switch: LevelSwitch,
    },
    /// Minimum level for events from one source.
    LevelOverride {
        /// Source prefix, e.g. `Microsoft`.
        source: String,
        /// Controlling switch.
        switch: LevelSwitch,
    },
    /// Fixed property attached to every event.
    Property {
        /// Property name.
        name: String,
        /// Expanded property value.
        value: String,
    },
    /// A resolved extension-method invocation.
    Call {
        /// Selected method and converted arguments.
        call: ResolvedCall,
        /// Path of the directive.
        path: String,
    },
}

impl PipelineStep {
    /// Applies the step to `builder`.
    pub fn apply(&self, builder: &mut dyn PipelineBuilder) -> ResolveResult<()> {
        match self {
            PipelineStep::MinimumLevel { switch } => builder.set_minimum_level(switch),
            PipelineStep::LevelOverride { source, switch } => {
                builder.override_minimum_level(source, switch)
            }
            PipelineStep::Property { name, value } => builder.enrich_with_property(name, value),
            PipelineStep::Call { call, .. } => {
                builder
                    .apply(call)
                    .map_err(|source| ResolveError::Pipeline {
                        method: call.method.signature(),
                        source,
                    })?
            }
        }
        Ok(())
    }
}

/// A switch waiting to be subscribed to its configuration node.
#[derive(Debug, Clone)]
enum SwitchWatch {
    Level {
        label: String,
        switch: LevelSwitch,
        node: ConfigNode,
        declared: bool,
    },
    Filter {
        label: String,
        switch: FilterSwitch,
        node: ConfigNode,
    },
}

/// A fully resolved configuration, not yet applied.
#[derive(Debug)]
pub struct ResolutionPlan {
    context: Arc<ResolutionContext>,
    steps: Vec<PipelineStep>,
    watches: Vec<SwitchWatch>,
}

impl ResolutionPlan {
    fn new(context: Arc<ResolutionContext>) -> Self {
        Self {
            context,
            steps: Vec::new(),
            watches: Vec::new(),
        }
    }

    /// Steps in application order.
    pub fn steps(&self) -> &[PipelineStep] {
        &self.steps
    }

    /// Number of switches that will be subscribed to reloads.
    pub fn watch_count(&self) -> usize {
        self.watches.len()
    }

    /// Applies every step, then notifies the switch hooks and subscribes
    /// each switch to its configuration node.
    ///
    /// Returns the subscriptions, which stay live until unsubscribed or
    /// until the configuration root is dropped.
    pub fn apply(self, builder: &mut dyn PipelineBuilder) -> ResolveResult<Vec<SubscriptionId>> {
        for step in &self.steps {
            step.apply(builder)?;
        }

        let options = self.context.options();
        let diagnostics = self.context.diagnostics().clone();
        let mut subscriptions = Vec::with_capacity(self.watches.len());
        for watch in self.watches {
            let id = match watch {
                SwitchWatch::Level {
                    label,
                    switch,
                    node,
                    declared,
                } => {
                    if declared {
                        if let Some(hook) = options.level_switch_hook() {
                            hook(label.as_str(), &switch);
                        }
                    }
                    node.on_change(level_reload(label, switch, diagnostics.clone()))
                }
                SwitchWatch::Filter {
                    label,
                    switch,
                    node,
                } => {
                    if let Some(hook) = options.filter_switch_hook() {
                        hook(label.as_str(), &switch);
                    }
                    let validator = options.filter_validator().cloned();
                    node.on_change(filter_reload(label, switch, validator, diagnostics.clone()))
                }
            };
            subscriptions.push(id);
        }

        debug!(
            steps = self.steps.len(),
            subscriptions = subscriptions.len(),
            "applied configuration"
        );
        Ok(subscriptions)
    }
}

// Reload callbacks must not capture a node or root.

fn level_reload(
    label: String,
    switch: LevelSwitch,
    diagnostics: Arc<dyn DiagnosticSink>,
) -> impl Fn(&ConfigNode) + Send + Sync + 'static {
    move |current: &ConfigNode| {
        let text = current.value().unwrap_or_default();
        match text.parse::<LogLevel>() {
            Ok(level) => {
                if level != switch.minimum_level() {
                    info!(switch = %label, level = %level, "level switch updated");
                    switch.set_minimum_level(level);
                }
            }
            Err(e) => diagnostics.report(Diagnostic::ReloadFailure {
                switch: label.clone(),
                path: current.path(),
                value: text.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

fn filter_reload(
    label: String,
    switch: FilterSwitch,
    validator: Option<FilterValidator>,
    diagnostics: Arc<dyn DiagnosticSink>,
) -> impl Fn(&ConfigNode) + Send + Sync + 'static {
    move |current: &ConfigNode| {
        let Some(text) = current.value() else {
            diagnostics.report(Diagnostic::ReloadFailure {
                switch: label.clone(),
                path: current.path(),
                value: String::new(),
                reason: "the entry was removed".to_string(),
            });
            return;
        };
        let expression = text.trim();
        if let (false, Some(validate)) = (expression.is_empty(), &validator) {
            if let Err(reason) = validate(expression) {
                diagnostics.report(Diagnostic::ReloadFailure {
                    switch: label.clone(),
                    path: current.path(),
                    value: text.to_string(),
                    reason,
                });
                return;
            }
        }
        info!(switch = %label, expression = %expression, "filter switch updated");
        switch.set_expression(Some(expression));
    }
}

// =============================================================================
// READER
// =============================================================================

/// Reads one logging section into a pipeline.
#[derive(Debug, Clone)]
pub struct ConfigurationReader {
    section: ConfigNode,
    context: Arc<ResolutionContext>,
}

impl ConfigurationReader {
    /// Starts building a reader.
    pub fn builder() -> ConfigurationReaderBuilder {
        ConfigurationReaderBuilder::new()
    }

    pub(crate) fn new(section: ConfigNode, context: Arc<ResolutionContext>) -> Self {
        Self { section, context }
    }

    /// A reader for a sub-logger section sharing `context`.
    pub(crate) fn nested(section: ConfigNode, context: Arc<ResolutionContext>) -> Self {
        Self::new(section, context)
    }

    /// The section being read.
    pub fn section(&self) -> &ConfigNode {
        &self.section
    }

    /// The shared resolution context.
    pub fn context(&self) -> &Arc<ResolutionContext> {
        &self.context
    }

    /// Resolves every phase into a plan without touching a pipeline.
    pub fn plan(&self) -> ResolveResult<ResolutionPlan> {
        let mut plan = ResolutionPlan::new(self.context.clone());

        self.declare_level_switches(&mut plan)?;
        self.declare_filter_switches(&mut plan)?;
        self.plan_minimum_level(&mut plan)?;
        self.plan_directives(Capability::Enrich, &mut plan)?;
        self.plan_properties(&mut plan)?;
        for capability in TRAILING_SECTIONS {
            self.plan_directives(capability, &mut plan)?;
        }

        debug!(
            section = %self.section.path(),
            steps = plan.steps.len(),
            "planned configuration"
        );
        Ok(plan)
    }

    /// Plans and applies in one go, returning the reload subscriptions
    /// registered on the root.
    pub fn configure(&self, builder: &mut dyn PipelineBuilder) -> ResolveResult<Vec<SubscriptionId>> {
        self.plan()?.apply(builder)
    }

    // ===== Switch declarations =====

    fn declare_level_switches(&self, plan: &mut ResolutionPlan) -> ResolveResult<()> {
        for declaration in section_entries(&self.section.child(LEVEL_SWITCHES_SECTION))? {
            let path = declaration.path();
            let text = level_text(&declaration)?;
            let switch = if text.is_empty() {
                LevelSwitch::default()
            } else {
                LevelSwitch::new(parse_level(&text, &path)?)
            };
            let label = self
                .context
                .declare_level_switch(declaration.key(), switch.clone(), &path)?;
            plan.watches.push(SwitchWatch::Level {
                label,
                switch,
                node: declaration,
                declared: true,
            });
        }
        Ok(())
    }

    fn declare_filter_switches(&self, plan: &mut ResolutionPlan) -> ResolveResult<()> {
        let options = self.context.options();
        for declaration in section_entries(&self.section.child(FILTER_SWITCHES_SECTION))? {
            let path = declaration.path();
            let expression = match declaration.shape()? {
                NodeShape::Scalar(text) => text.trim().to_string(),
                NodeShape::Structured => {
                    return Err(ResolveError::InvalidFilterExpression {
                        expression: String::new(),
                        path,
                        reason: "expected a scalar expression".to_string(),
                    })
                }
            };
            if !expression.is_empty() {
                options.validate_filter(&expression).map_err(|reason| {
                    ResolveError::InvalidFilterExpression {
                        expression: expression.clone(),
                        path: path.clone(),
                        reason,
                    }
                })?;
            }
            let switch = FilterSwitch::new(Some(&expression));
            let label = self
                .context
                .declare_filter_switch(declaration.key(), switch.clone(), &path)?;
            plan.watches.push(SwitchWatch::Filter {
                label,
                switch,
                node: declaration,
            });
        }
        Ok(())
    }

    // ===== Minimum level =====

    fn plan_minimum_level(&self, plan: &mut ResolutionPlan) -> ResolveResult<()> {
        let node = self.section.child(MINIMUM_LEVEL_SECTION);
        if !node.exists() {
            return Ok(());
        }

        if let NodeShape::Scalar(_) = node.shape()? {
            if let Some(switch) = self.level_target(&node, "minimum level", plan)? {
                plan.steps.push(PipelineStep::MinimumLevel { switch });
            }
            return Ok(());
        }

        let default = node.child(DEFAULT_KEY);
        if default.exists() {
            if let Some(switch) = self.level_target(&default, "minimum level", plan)? {
                plan.steps.push(PipelineStep::MinimumLevel { switch });
            }
        }

        let controlled_by = node.child(CONTROLLED_BY_KEY);
        if controlled_by.exists() {
            let reference = level_text(&controlled_by)?;
            if !reference.is_empty() {
                let switch = self
                    .context
                    .level_switch(&reference, &controlled_by.path())?;
                plan.steps.push(PipelineStep::MinimumLevel { switch });
            }
        }

        for entry in section_entries(&node.child(OVERRIDE_KEY))? {
            let source = entry.key().to_string();
            let label = format!("override '{source}'");
            if let Some(switch) = self.level_target(&entry, &label, plan)? {
                plan.steps.push(PipelineStep::LevelOverride { source, switch });
            }
        }
        Ok(())
    }

    /// Switch for a level entry: a `$name` reference reuses a declared
    /// switch, a literal level creates a fresh one watched for reloads, and
    /// a blank entry yields nothing.
    fn level_target(
        &self,
        node: &ConfigNode,
        label: &str,
        plan: &mut ResolutionPlan,
    ) -> ResolveResult<Option<LevelSwitch>> {
        let text = level_text(node)?;
        if text.is_empty() {
            return Ok(None);
        }
        if text.starts_with('$') {
            return self.context.level_switch(&text, &node.path()).map(Some);
        }

        let switch = LevelSwitch::new(parse_level(&text, &node.path())?);
        plan.watches.push(SwitchWatch::Level {
            label: label.to_string(),
            switch: switch.clone(),
            node: node.clone(),
            declared: false,
        });
        Ok(Some(switch))
    }

    // ===== Properties and directives =====

    fn plan_properties(&self, plan: &mut ResolutionPlan) -> ResolveResult<()> {
        for property in section_entries(&self.section.child(PROPERTIES_SECTION))? {
            match property.shape()? {
                NodeShape::Scalar(value) => plan.steps.push(PipelineStep::Property {
                    name: property.key().to_string(),
                    value: expand_environment_variables(&value).into_owned(),
                }),
                NodeShape::Structured => {
                    return Err(ResolveError::conversion(
                        "",
                        "string",
                        property.path(),
                        "property values must be scalars",
                    ))
                }
            }
        }
        Ok(())
    }

    fn plan_directives(&self, capability: Capability, plan: &mut ResolutionPlan) -> ResolveResult<()> {
        let section = self.section.child(capability.section_name());
        let steps = resolve_directive_section(&section, capability, &self.context)?;
        plan.steps.extend(steps);
        Ok(())
    }
}

/// Resolves every directive of `section` against `capability` candidates.
///
/// Directives matching no eligible candidate are skipped and reported as
/// [`Diagnostic::UnmatchedDirective`].
pub(crate) fn resolve_directive_section(
    section: &ConfigNode,
    capability: Capability,
    context: &Arc<ResolutionContext>,
) -> ResolveResult<Vec<PipelineStep>> {
    if !section.exists() {
        return Ok(Vec::new());
    }
    let directives = extract_directives(section)?;
    if directives.is_empty() {
        return Ok(Vec::new());
    }

    let candidates = context.candidates(capability);
    let mut steps = Vec::with_capacity(directives.len());
    for directive in &directives {
        let supplied = directive.argument_names();
        match select(&candidates, &directive.name, capability, &supplied) {
            Some(method) => steps.push(PipelineStep::Call {
                call: bind_call(directive, method, context)?,
                path: directive.path.clone(),
            }),
            None => context.diagnostics().report(Diagnostic::UnmatchedDirective {
                section: capability.section_name().to_string(),
                name: directive.name.clone(),
                path: directive.path.clone(),
                supplied: supplied.iter().map(|s| s.to_string()).collect(),
                candidates: overloads(&candidates, &directive.name),
            }),
        }
    }
    Ok(steps)
}

fn level_text(node: &ConfigNode) -> ResolveResult<String> {
    match node.shape()? {
        NodeShape::Scalar(text) => Ok(text.trim().to_string()),
        NodeShape::Structured => Err(ResolveError::InvalidLevel {
            value: "(section)".to_string(),
            path: node.path(),
        }),
    }
}

fn parse_level(text: &str, path: &str) -> ResolveResult<LogLevel> {
    text.parse().map_err(|_| ResolveError::InvalidLevel {
        value: text.to_string(),
        path: path.to_string(),
    })
}
