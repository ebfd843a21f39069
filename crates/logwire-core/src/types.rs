//! Runtime type descriptors.
//!
//! Plugins describe their parameters with [`TypeRef`]s; the coercion engine
//! dispatches on them to turn configuration nodes into [`crate::Value`]s.

use std::fmt;
use std::sync::Arc;

use crate::method::Capability;

// =============================================================================
// TYPE REFERENCE
// =============================================================================

/// Target type of a parameter, constructor argument or container element.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    /// Plain string.
    String,
    /// Boolean (`true`/`false`, case-insensitive).
    Bool,
    /// Single character.
    Char,
    /// Signed 64-bit integer.
    Int,
    /// Unsigned 64-bit integer.
    UInt,
    /// 64-bit float.
    Float,
    /// Exact decimal.
    Decimal,
    /// Date and time without offset.
    DateTime,
    /// Time span.
    Duration,
    /// Absolute URI.
    Uri,
    /// Reference to a registered type, by name.
    TypeReference,
    /// The [`crate::LogLevel`] enumeration.
    Level,
    /// A plugin-defined enumeration.
    Enum(Arc<EnumSpec>),
    /// Optional value; an empty scalar converts to null.
    Nullable(Box<TypeRef>),
    /// Handle to a declared [`crate::LevelSwitch`].
    LevelSwitch,
    /// Handle to a declared [`crate::FilterSwitch`].
    FilterSwitch,
    /// Fixed-length array.
    Array(Box<TypeRef>),
    /// Constructible container.
    Container(Arc<ContainerSpec>),
    /// Registered object type, concrete or abstract, by full name.
    Object(String),
    /// Nested configuration callback.
    Callback(CallbackKind),
    /// Function reference bound from a static method.
    Delegate(Arc<DelegateSignature>),
    /// The configuration node itself, unconverted.
    Node,
    /// The full application configuration, injected when not supplied.
    AppConfiguration,
    /// The reader's [`crate::FormatProvider`], injected when not supplied.
    FormatProvider,
}

impl TypeRef {
    /// Shorthand for an array of `element`.
    pub fn array(element: TypeRef) -> Self {
        TypeRef::Array(Box::new(element))
    }

    /// Shorthand for an optional `inner`.
    pub fn nullable(inner: TypeRef) -> Self {
        TypeRef::Nullable(Box::new(inner))
    }

    /// Shorthand for a registered object type.
    pub fn object(full_name: impl Into<String>) -> Self {
        TypeRef::Object(full_name.into())
    }

    /// Whether this is the plain string type.
    pub fn is_string(&self) -> bool {
        matches!(self, TypeRef::String)
    }

    /// Whether the parameter can be bound without configuration input.
    pub fn is_implicit(&self) -> bool {
        matches!(self, TypeRef::AppConfiguration | TypeRef::FormatProvider)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::String => write!(f, "string"),
            TypeRef::Bool => write!(f, "bool"),
            TypeRef::Char => write!(f, "char"),
            TypeRef::Int => write!(f, "int"),
            TypeRef::UInt => write!(f, "uint"),
            TypeRef::Float => write!(f, "float"),
            TypeRef::Decimal => write!(f, "decimal"),
            TypeRef::DateTime => write!(f, "datetime"),
            TypeRef::Duration => write!(f, "duration"),
            TypeRef::Uri => write!(f, "uri"),
            TypeRef::TypeReference => write!(f, "type"),
            TypeRef::Level => write!(f, "LogLevel"),
            TypeRef::Enum(spec) => write!(f, "{}", spec.name),
            TypeRef::Nullable(inner) => write!(f, "{inner}?"),
            TypeRef::LevelSwitch => write!(f, "LevelSwitch"),
            TypeRef::FilterSwitch => write!(f, "FilterSwitch"),
            TypeRef::Array(element) => write!(f, "{element}[]"),
            TypeRef::Container(spec) => write!(f, "{}", spec.name),
            TypeRef::Object(name) => write!(f, "{name}"),
            TypeRef::Callback(kind) => write!(f, "Callback<{kind}>"),
            TypeRef::Delegate(signature) => write!(f, "{signature}"),
            TypeRef::Node => write!(f, "ConfigNode"),
            TypeRef::AppConfiguration => write!(f, "AppConfiguration"),
            TypeRef::FormatProvider => write!(f, "FormatProvider"),
        }
    }
}

// =============================================================================
// ENUMERATIONS
// =============================================================================

/// A plugin enumeration. Member ordinals follow declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumSpec {
    /// Type name, for diagnostics.
    pub name: String,
    /// Member names in ordinal order.
    pub members: Vec<String>,
}

impl EnumSpec {
    /// Creates an enumeration descriptor.
    pub fn new<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses an exact member name or a decimal ordinal.
    pub fn parse(&self, text: &str) -> Option<(usize, &str)> {
        let text = text.trim();
        if let Some(index) = self.members.iter().position(|m| m == text) {
            return Some((index, self.members[index].as_str()));
        }
        let ordinal = text.parse::<usize>().ok()?;
        self.members.get(ordinal).map(|m| (ordinal, m.as_str()))
    }
}

// =============================================================================
// CONTAINERS
// =============================================================================

/// How a container accepts items once constructed empty.
#[derive(Debug, Clone, PartialEq)]
pub enum Insertion {
    /// Ordered single-element insertion.
    Element(TypeRef),
    /// Key/value insertion.
    KeyValue {
        /// Key type.
        key: TypeRef,
        /// Value type.
        value: TypeRef,
    },
    /// No insertion operation is known; the container stays empty.
    Unsupported,
}

/// A constructible container type.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerSpec {
    /// Type name, e.g. `List<string>` or `IDictionary<string,int>`.
    pub name: String,
    /// Insertion capability.
    pub insertion: Insertion,
}

impl ContainerSpec {
    /// A list of `element`.
    pub fn list(name: impl Into<String>, element: TypeRef) -> Self {
        Self {
            name: name.into(),
            insertion: Insertion::Element(element),
        }
    }

    /// A dictionary from `key` to `value`.
    pub fn dictionary(name: impl Into<String>, key: TypeRef, value: TypeRef) -> Self {
        Self {
            name: name.into(),
            insertion: Insertion::KeyValue { key, value },
        }
    }

    /// A container with no known insertion operation.
    pub fn opaque(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            insertion: Insertion::Unsupported,
        }
    }
}

// =============================================================================
// CALLBACKS AND DELEGATES
// =============================================================================

/// Payload of a nested configuration callback.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CallbackKind {
    /// Configures a whole sub-logger.
    LoggerConfiguration,
    /// Configures a list of sinks.
    SinkConfiguration,
    /// Configures a list of enrichers.
    EnrichmentConfiguration,
    /// Configures a list of audit sinks.
    AuditSinkConfiguration,
    /// Anything else; rejected by the coercion engine.
    Other(String),
}

impl CallbackKind {
    /// Capability whose directives the callback applies, if it is a list callback.
    pub fn capability(&self) -> Option<Capability> {
        match self {
            CallbackKind::SinkConfiguration => Some(Capability::Sink),
            CallbackKind::EnrichmentConfiguration => Some(Capability::Enrich),
            CallbackKind::AuditSinkConfiguration => Some(Capability::AuditSink),
            CallbackKind::LoggerConfiguration | CallbackKind::Other(_) => None,
        }
    }
}

impl fmt::Display for CallbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallbackKind::LoggerConfiguration => write!(f, "LoggerConfiguration"),
            CallbackKind::SinkConfiguration => write!(f, "SinkConfiguration"),
            CallbackKind::EnrichmentConfiguration => write!(f, "EnrichmentConfiguration"),
            CallbackKind::AuditSinkConfiguration => write!(f, "AuditSinkConfiguration"),
            CallbackKind::Other(name) => write!(f, "{name}"),
        }
    }
}

/// Signature of a delegate parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct DelegateSignature {
    /// Parameter types in order.
    pub parameters: Vec<TypeRef>,
    /// Return type, `None` for actions.
    pub returns: Option<TypeRef>,
}

impl DelegateSignature {
    /// A function from `parameters` to `returns`.
    pub fn function(parameters: Vec<TypeRef>, returns: TypeRef) -> Self {
        Self {
            parameters,
            returns: Some(returns),
        }
    }

    /// An action over `parameters`.
    pub fn action(parameters: Vec<TypeRef>) -> Self {
        Self {
            parameters,
            returns: None,
        }
    }
}

impl fmt::Display for DelegateSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.parameters.iter().map(ToString::to_string).collect();
        match &self.returns {
            Some(ret) => write!(f, "fn({}) -> {ret}", params.join(", ")),
            None => write!(f, "fn({})", params.join(", ")),
        }
    }
}
