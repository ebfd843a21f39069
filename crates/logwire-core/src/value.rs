//! Converted argument values.

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use logwire_config::ConfigNode;

use crate::error::{PluginError, PluginResult};
use crate::format::FormatProvider;
use crate::level::LogLevel;
use crate::pipeline::{PipelineBuilder, PipelineError};
use crate::switch::{FilterSwitch, LevelSwitch};
use crate::types::{CallbackKind, DelegateSignature};

// =============================================================================
// VALUE
// =============================================================================

/// A configuration node converted to a concrete argument.
#[derive(Debug, Clone)]
pub enum Value {
    /// Absent optional value.
    Null,
    /// String.
    String(String),
    /// Boolean.
    Bool(bool),
    /// Character.
    Char(char),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    UInt(u64),
    /// Float.
    Float(f64),
    /// Exact decimal.
    Decimal(Decimal),
    /// Date and time.
    DateTime(NaiveDateTime),
    /// Time span.
    Duration(Duration),
    /// Absolute URI.
    Uri(Uri),
    /// Log level.
    Level(LogLevel),
    /// Plugin enumeration member.
    Enum(EnumValue),
    /// Resolved type reference (full type name).
    Type(String),
    /// Shared level switch.
    LevelSwitch(LevelSwitch),
    /// Shared filter switch.
    FilterSwitch(FilterSwitch),
    /// Fixed-length array.
    Array(Vec<Value>),
    /// Element container, in insertion order.
    Sequence {
        /// Container type name.
        container: String,
        /// Items.
        items: Vec<Value>,
    },
    /// Key/value container, in insertion order.
    Map {
        /// Container type name.
        container: String,
        /// Entries.
        entries: Vec<(Value, Value)>,
    },
    /// Constructed or static object.
    Object(ObjectValue),
    /// Nested configuration callback.
    Callback(CallbackValue),
    /// Bound static function.
    Delegate(DelegateValue),
    /// Raw configuration node (also used for injected app configuration).
    Node(ConfigNode),
    /// Injected format provider.
    FormatProvider(FormatProvider),
}

impl Value {
    /// Whether this is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// String content.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean content.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer content, widening unsigned values that fit.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::UInt(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    /// Unsigned content.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::UInt(u) => Some(*u),
            Value::Int(i) => u64::try_from(*i).ok(),
            _ => None,
        }
    }

    /// Float content.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Level content.
    pub fn as_level(&self) -> Option<LogLevel> {
        match self {
            Value::Level(l) => Some(*l),
            _ => None,
        }
    }

    /// Duration content.
    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Value::Duration(d) => Some(*d),
            _ => None,
        }
    }

    /// Level switch content.
    pub fn as_level_switch(&self) -> Option<&LevelSwitch> {
        match self {
            Value::LevelSwitch(s) => Some(s),
            _ => None,
        }
    }

    /// Filter switch content.
    pub fn as_filter_switch(&self) -> Option<&FilterSwitch> {
        match self {
            Value::FilterSwitch(s) => Some(s),
            _ => None,
        }
    }

    /// Items of an array or sequence container.
    pub fn as_items(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) | Value::Sequence { items, .. } => Some(items),
            _ => None,
        }
    }

    /// Entries of a map container.
    pub fn as_entries(&self) -> Option<&[(Value, Value)]> {
        match self {
            Value::Map { entries, .. } => Some(entries),
            _ => None,
        }
    }

    /// Object content.
    pub fn as_object(&self) -> Option<&ObjectValue> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Downcasts an object value to `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_object().and_then(ObjectValue::downcast_ref)
    }

    /// Callback content.
    pub fn as_callback(&self) -> Option<&CallbackValue> {
        match self {
            Value::Callback(c) => Some(c),
            _ => None,
        }
    }

    /// Delegate content.
    pub fn as_delegate(&self) -> Option<&DelegateValue> {
        match self {
            Value::Delegate(d) => Some(d),
            _ => None,
        }
    }

    /// Node content.
    pub fn as_node(&self) -> Option<&ConfigNode> {
        match self {
            Value::Node(n) => Some(n),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    /// Data variants compare structurally; shared handles (switches,
    /// objects, callbacks, delegates, nodes) compare by identity or path.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::UInt(a), Value::UInt(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Duration(a), Value::Duration(b)) => a == b,
            (Value::Uri(a), Value::Uri(b)) => a == b,
            (Value::Level(a), Value::Level(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Type(a), Value::Type(b)) => a == b,
            (Value::LevelSwitch(a), Value::LevelSwitch(b)) => a.same_cell(b),
            (Value::FilterSwitch(a), Value::FilterSwitch(b)) => a.same_cell(b),
            (Value::Array(a), Value::Array(b)) => a == b,
            (
                Value::Sequence { container: ca, items: a },
                Value::Sequence { container: cb, items: b },
            ) => ca == cb && a == b,
            (
                Value::Map { container: ca, entries: a },
                Value::Map { container: cb, entries: b },
            ) => ca == cb && a == b,
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(&a.instance, &b.instance),
            (Value::Callback(a), Value::Callback(b)) => a.kind == b.kind && a.path == b.path,
            (Value::Delegate(a), Value::Delegate(b)) => Arc::ptr_eq(&a.function, &b.function),
            (Value::Node(a), Value::Node(b)) => a.path() == b.path(),
            (Value::FormatProvider(a), Value::FormatProvider(b)) => a == b,
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<LogLevel> for Value {
    fn from(l: LogLevel) -> Self {
        Value::Level(l)
    }
}

// =============================================================================
// SUPPORTING VALUE TYPES
// =============================================================================

/// Member of a plugin enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    /// Enumeration name.
    pub type_name: String,
    /// Member name.
    pub member: String,
    /// Member ordinal.
    pub ordinal: usize,
}

/// An absolute URI (`scheme:rest`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Uri {
    text: String,
    scheme_len: usize,
}

impl Uri {
    /// Parses an absolute URI.
    pub fn parse(text: &str) -> PluginResult<Self> {
        let text = text.trim();
        let invalid = |reason: &str| PluginError::InvalidUri {
            value: text.to_string(),
            reason: reason.to_string(),
        };

        let colon = text.find(':').ok_or_else(|| invalid("missing scheme"))?;
        let scheme = &text[..colon];
        let mut chars = scheme.chars();
        if !chars.next().is_some_and(|c| c.is_ascii_alphabetic()) {
            return Err(invalid("scheme must start with a letter"));
        }
        if !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
            return Err(invalid("scheme contains invalid characters"));
        }
        if text.len() == colon + 1 {
            return Err(invalid("nothing follows the scheme"));
        }
        if text.chars().any(char::is_whitespace) {
            return Err(invalid("contains whitespace"));
        }

        Ok(Self {
            text: text.to_string(),
            scheme_len: colon,
        })
    }

    /// Scheme, e.g. `https`.
    pub fn scheme(&self) -> &str {
        &self.text[..self.scheme_len]
    }

    /// Full text.
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A type-erased object instance.
#[derive(Clone)]
pub struct ObjectValue {
    /// Full name of the registered type.
    pub type_name: String,
    /// The instance.
    pub instance: Arc<dyn Any + Send + Sync>,
}

impl ObjectValue {
    /// Wraps an instance.
    pub fn new<T: Any + Send + Sync>(type_name: impl Into<String>, instance: T) -> Self {
        Self {
            type_name: type_name.into(),
            instance: Arc::new(instance),
        }
    }

    /// Downcasts to `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.instance.downcast_ref::<T>()
    }
}

impl fmt::Debug for ObjectValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectValue")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Function applying a nested configuration to a builder.
pub type CallbackFn =
    Arc<dyn Fn(&mut dyn PipelineBuilder) -> Result<(), PipelineError> + Send + Sync>;

/// A deferred nested configuration.
///
/// Nothing is resolved until the pipeline builder invokes it.
#[derive(Clone)]
pub struct CallbackValue {
    /// What the callback configures.
    pub kind: CallbackKind,
    /// Path of the configuration node it was bound from.
    pub path: String,
    apply: CallbackFn,
}

impl CallbackValue {
    /// Creates a callback.
    pub fn new(kind: CallbackKind, path: impl Into<String>, apply: CallbackFn) -> Self {
        Self {
            kind,
            path: path.into(),
            apply,
        }
    }

    /// Resolves the nested configuration and applies it to `builder`.
    pub fn invoke(&self, builder: &mut dyn PipelineBuilder) -> Result<(), PipelineError> {
        (self.apply)(builder)
    }
}

impl fmt::Debug for CallbackValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackValue")
            .field("kind", &self.kind)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Function behind a delegate.
pub type DelegateFn = Arc<dyn Fn(&[Value]) -> PluginResult<Value> + Send + Sync>;

/// A reference to a static function.
#[derive(Clone)]
pub struct DelegateValue {
    /// `Type::Member` the delegate was bound from.
    pub name: String,
    /// Signature of the bound function.
    pub signature: Arc<DelegateSignature>,
    function: DelegateFn,
}

impl DelegateValue {
    /// Creates a delegate.
    pub fn new(name: impl Into<String>, signature: Arc<DelegateSignature>, function: DelegateFn) -> Self {
        Self {
            name: name.into(),
            signature,
            function,
        }
    }

    /// Calls the function.
    pub fn call(&self, arguments: &[Value]) -> PluginResult<Value> {
        (self.function)(arguments)
    }
}

impl fmt::Debug for DelegateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelegateValue")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// BOUND ARGUMENTS
// =============================================================================

/// Arguments bound to a method or constructor, in parameter order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArguments {
    entries: Vec<(String, Value)>,
}

impl BoundArguments {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an argument.
    pub fn push(&mut self, name: impl Into<String>, value: Value) {
        self.entries.push((name.into(), value));
    }

    /// Builder-style [`BoundArguments::push`].
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.push(name, value);
        self
    }

    /// Argument by parameter name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Argument by name, or [`PluginError::MissingArgument`].
    pub fn require(&self, name: &str) -> PluginResult<&Value> {
        self.get(name).ok_or_else(|| PluginError::MissingArgument {
            name: name.to_string(),
        })
    }

    /// String argument by name.
    pub fn str(&self, name: &str) -> PluginResult<&str> {
        self.require(name)?
            .as_str()
            .ok_or_else(|| PluginError::ArgumentType {
                name: name.to_string(),
                expected: "a string".to_string(),
            })
    }

    /// Optional string argument: missing and null both yield `None`.
    pub fn opt_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Level argument by name.
    pub fn level(&self, name: &str) -> PluginResult<LogLevel> {
        self.require(name)?
            .as_level()
            .ok_or_else(|| PluginError::ArgumentType {
                name: name.to_string(),
                expected: "a log level".to_string(),
            })
    }

    /// Parameter names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of bound arguments.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
