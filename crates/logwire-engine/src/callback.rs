//! Nested configuration callbacks.
//!
//! A callback parameter receives a section describing a sub-pipeline. The
//! section is resolved lazily, when the plugin invokes the callback against
//! the builder it owns, using the same resolution context as the enclosing
//! read. Invoking a sub-logger callback again releases the reload
//! subscriptions of its previous invocation.

use std::sync::Arc;

use parking_lot::Mutex;

use logwire_config::{ConfigNode, SubscriptionId};
use logwire_core::{CallbackFn, CallbackKind, CallbackValue, PipelineBuilder, PipelineError};

use crate::context::ResolutionContext;
use crate::error::{ResolveError, ResolveResult};
use crate::reader::{resolve_directive_section, ConfigurationReader};

/// Builds the callback for a section bound to a `kind` parameter.
pub(crate) fn callback_value(
    kind: &CallbackKind,
    node: &ConfigNode,
    context: &Arc<ResolutionContext>,
) -> ResolveResult<CallbackValue> {
    let path = node.path();

    let apply: CallbackFn = match (kind, kind.capability()) {
        (CallbackKind::LoggerConfiguration, _) => {
            let reader = ConfigurationReader::nested(node.clone(), context.clone());
            let previous: Mutex<Vec<SubscriptionId>> = Mutex::new(Vec::new());
            Arc::new(move |builder: &mut dyn PipelineBuilder| -> Result<(), PipelineError> {
                let subscriptions = reader.configure(builder)?;
                // Only the latest invocation keeps its reload subscriptions.
                let root = reader.section().root();
                let stale = std::mem::replace(&mut *previous.lock(), subscriptions);
                for id in stale {
                    root.unsubscribe(id);
                }
                Ok(())
            })
        }
        (_, Some(capability)) => {
            let node = node.clone();
            let context = context.clone();
            Arc::new(move |builder: &mut dyn PipelineBuilder| -> Result<(), PipelineError> {
                for step in resolve_directive_section(&node, capability, &context)? {
                    step.apply(builder)?;
                }
                Ok(())
            })
        }
        (kind, None) => {
            return Err(ResolveError::UnsupportedCallbackType {
                callback: kind.to_string(),
                path,
            })
        }
    };

    Ok(CallbackValue::new(kind.clone(), path, apply))
}
