//! Contract toward the logging pipeline that consumes resolved calls.

use std::sync::Arc;

use crate::method::{CandidateMethod, Capability};
use crate::switch::LevelSwitch;
use crate::value::BoundArguments;

/// Error type returned by pipeline builders.
pub type PipelineError = Box<dyn std::error::Error + Send + Sync>;

/// A selected candidate together with its converted arguments.
#[derive(Debug, Clone)]
pub struct ResolvedCall {
    /// The selected candidate.
    pub method: Arc<CandidateMethod>,
    /// Every parameter bound in declaration order: supplied, injected or
    /// defaulted.
    pub arguments: BoundArguments,
}

impl ResolvedCall {
    /// Method name.
    pub fn name(&self) -> &str {
        &self.method.name
    }

    /// Receiver capability.
    pub fn capability(&self) -> Capability {
        self.method.capability
    }

    /// Package the method was registered by.
    pub fn package(&self) -> &str {
        &self.method.package
    }
}

/// Receiver of a resolved configuration.
///
/// Steps arrive in configuration order. A builder that owns sub-loggers
/// creates a fresh builder and passes it to
/// [`crate::CallbackValue::invoke`].
pub trait PipelineBuilder {
    /// Makes `switch` control the pipeline's minimum level.
    fn set_minimum_level(&mut self, switch: &LevelSwitch);

    /// Makes `switch` control the minimum level of events from `source`.
    fn override_minimum_level(&mut self, source: &str, switch: &LevelSwitch);

    /// Attaches a fixed property to every event.
    fn enrich_with_property(&mut self, name: &str, value: &str);

    /// Invokes a resolved extension method.
    fn apply(&mut self, call: &ResolvedCall) -> Result<(), PipelineError>;
}
