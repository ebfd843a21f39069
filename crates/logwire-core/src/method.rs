//! Candidate methods and their parameters.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::TypeRef;
use crate::value::Value;

/// Extension point a candidate method configures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// Event sinks (`WriteTo`).
    Sink,
    /// Audit sinks (`AuditTo`).
    AuditSink,
    /// Event filters (`Filter`).
    Filter,
    /// Enrichers (`Enrich`).
    Enrich,
    /// Destructuring policies (`Destructure`).
    Destructure,
}

impl Capability {
    /// Configuration section holding directives for this capability.
    pub fn section_name(&self) -> &'static str {
        match self {
            Capability::Sink => "WriteTo",
            Capability::AuditSink => "AuditTo",
            Capability::Filter => "Filter",
            Capability::Enrich => "Enrich",
            Capability::Destructure => "Destructure",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Sink => "sink",
            Capability::AuditSink => "audit sink",
            Capability::Filter => "filter",
            Capability::Enrich => "enricher",
            Capability::Destructure => "destructuring policy",
        };
        write!(f, "{name}")
    }
}

/// Visibility of a method, type, constructor or member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Visibility {
    /// Always eligible.
    #[default]
    Public,
    /// Eligible only when the reader allows internal candidates.
    Internal,
}

/// A declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    /// Parameter name, matched case-sensitively against supplied arguments.
    pub name: String,
    /// Target type.
    pub type_ref: TypeRef,
    /// Default value, if the parameter is optional.
    pub default: Option<Value>,
}

impl ParameterSpec {
    /// A parameter that must be supplied.
    pub fn required(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
            default: None,
        }
    }

    /// A parameter with a default value.
    pub fn optional(name: impl Into<String>, type_ref: TypeRef, default: Value) -> Self {
        Self {
            name: name.into(),
            type_ref,
            default: Some(default),
        }
    }

    /// Whether the parameter has a default.
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Whether the parameter may be left out: it has a default or is
    /// injected.
    pub fn can_omit(&self) -> bool {
        self.has_default() || self.type_ref.is_implicit()
    }
}

/// A discoverable extension method.
///
/// The receiver (the capability's configuration object) is implicit and not
/// listed among the parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateMethod {
    /// Method name, matched case-sensitively against directive names.
    pub name: String,
    /// Receiver capability.
    pub capability: Capability,
    /// Parameters in declaration order.
    pub parameters: Vec<ParameterSpec>,
    /// Method visibility.
    pub visibility: Visibility,
    /// Registering package, filled in by [`crate::Package`].
    pub package: String,
}

impl CandidateMethod {
    /// Creates a public method with no parameters.
    pub fn new(name: impl Into<String>, capability: Capability) -> Self {
        Self {
            name: name.into(),
            capability,
            parameters: Vec::new(),
            visibility: Visibility::Public,
            package: String::new(),
        }
    }

    /// Builder method to add a required parameter.
    pub fn param(mut self, name: impl Into<String>, type_ref: TypeRef) -> Self {
        self.parameters.push(ParameterSpec::required(name, type_ref));
        self
    }

    /// Builder method to add a parameter with a default.
    pub fn optional(mut self, name: impl Into<String>, type_ref: TypeRef, default: Value) -> Self {
        self.parameters
            .push(ParameterSpec::optional(name, type_ref, default));
        self
    }

    /// Builder method to mark the method internal.
    pub fn internal(mut self) -> Self {
        self.visibility = Visibility::Internal;
        self
    }

    /// Parameter by exact name.
    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// `Name(type name, ...)` for diagnostics.
    pub fn signature(&self) -> String {
        let params: Vec<String> = self
            .parameters
            .iter()
            .map(|p| format!("{}: {}", p.name, p.type_ref))
            .collect();
        format!("{}({})", self.name, params.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_signature() {
        let method = CandidateMethod::new("File", Capability::Sink)
            .param("path", TypeRef::String)
            .optional("shared", TypeRef::Bool, Value::Bool(false));

        assert_eq!(method.signature(), "File(path: string, shared: bool)");
        assert!(!method.parameter("path").unwrap().has_default());
        assert!(method.parameter("shared").unwrap().has_default());
        assert!(method.parameter("Path").is_none());
        assert_eq!(method.visibility, Visibility::Public);
    }

    #[test]
    fn test_section_names() {
        assert_eq!(Capability::Sink.section_name(), "WriteTo");
        assert_eq!(Capability::AuditSink.section_name(), "AuditTo");
        assert_eq!(Capability::Enrich.to_string(), "enricher");
    }
}
