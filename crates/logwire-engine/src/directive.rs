//! Directive extraction.
//!
//! A directive section is a list (or a map keyed by merge keys) whose
//! entries are either a bare method name or a `{ "Name": ..., "Args": {...} }`
//! section. Entries are never deduplicated: two `File` entries are two
//! invocations.

use logwire_config::{ConfigNode, NodeShape};

use crate::error::{ResolveError, ResolveResult};

/// Key of the method name inside an expanded directive.
pub const NAME_KEY: &str = "Name";

/// Key of the argument section inside an expanded directive.
pub const ARGS_KEY: &str = "Args";

/// One method-call request.
#[derive(Debug, Clone)]
pub struct Directive {
    /// Method name.
    pub name: String,
    /// Path of the directive entry.
    pub path: String,
    /// Arguments in source order, keyed by parameter name as written.
    pub arguments: Vec<(String, ConfigNode)>,
}

impl Directive {
    /// Argument names in source order.
    pub fn argument_names(&self) -> Vec<&str> {
        self.arguments.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Argument node by exact parameter name.
    pub fn argument(&self, name: &str) -> Option<&ConfigNode> {
        self.arguments
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, node)| node)
    }
}

/// Extracts directives from every child of `section`, in source order.
///
/// A missing section yields no directives. A section holding both a scalar
/// and child entries is rejected with `AmbiguousShape`.
pub fn extract_directives(section: &ConfigNode) -> ResolveResult<Vec<Directive>> {
    section_entries(section)?
        .iter()
        .map(extract_directive)
        .collect()
}

/// Children of a list or map section, after checking its shape.
pub(crate) fn section_entries(section: &ConfigNode) -> ResolveResult<Vec<ConfigNode>> {
    section.shape()?;
    Ok(section.children())
}

fn extract_directive(entry: &ConfigNode) -> ResolveResult<Directive> {
    let path = entry.path();
    match entry.shape()? {
        NodeShape::Scalar(name) => Ok(Directive {
            name: name.trim().to_string(),
            path,
            arguments: Vec::new(),
        }),
        NodeShape::Structured => {
            let name = match entry.child(NAME_KEY).shape()? {
                NodeShape::Scalar(name) if !name.trim().is_empty() => name.trim().to_string(),
                _ => return Err(ResolveError::MissingName { path }),
            };

            let args = entry.child(ARGS_KEY);
            let arguments = if !args.exists() {
                Vec::new()
            } else {
                match args.shape()? {
                    NodeShape::Scalar(_) => {
                        return Err(ResolveError::ScalarArguments { path: args.path() })
                    }
                    NodeShape::Structured => args
                        .children()
                        .into_iter()
                        .map(|arg| (arg.key().to_string(), arg))
                        .collect(),
                }
            };

            Ok(Directive {
                name,
                path,
                arguments,
            })
        }
    }
}
