//! Registered object types: constructors and static members.
//!
//! These stand in for reflection. A plugin registers each type it wants to
//! be constructible from configuration, listing constructors in a stable
//! order (ties between equally good constructors go to the first declared)
//! and the static members reachable through `Type::Member` accessors.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::PluginResult;
use crate::method::{ParameterSpec, Visibility};
use crate::types::{DelegateSignature, TypeRef};
use crate::value::{BoundArguments, DelegateFn, DelegateValue, ObjectValue, Value};

/// Factory turning bound constructor arguments into an instance.
pub type ObjectFactory =
    Arc<dyn Fn(&BoundArguments) -> PluginResult<Arc<dyn Any + Send + Sync>> + Send + Sync>;

/// Getter behind a static property.
pub type PropertyGetter = Arc<dyn Fn() -> Value + Send + Sync>;

// =============================================================================
// CONSTRUCTORS
// =============================================================================

/// A constructor of a registered type.
#[derive(Clone)]
pub struct ConstructorSpec {
    /// Parameters in declaration order.
    pub parameters: Vec<ParameterSpec>,
    /// Constructor visibility; only public constructors are considered.
    pub visibility: Visibility,
    factory: ObjectFactory,
}

impl ConstructorSpec {
    /// Creates a public constructor from a typed factory.
    pub fn new<T, F>(factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&BoundArguments) -> PluginResult<T> + Send + Sync + 'static,
    {
        Self {
            parameters: Vec::new(),
            visibility: Visibility::Public,
            factory: Arc::new(move |args| {
                factory(args).map(|instance| Arc::new(instance) as Arc<dyn Any + Send + Sync>)
            }),
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

    /// Builder method to hide the constructor from configuration.
    pub fn internal(mut self) -> Self {
        self.visibility = Visibility::Internal;
        self
    }

    /// Whether the constructor can run with no explicit arguments: every
    /// parameter has a default or is injected.
    pub fn is_default_invocable(&self) -> bool {
        self.parameters.iter().all(ParameterSpec::can_omit)
    }

    /// Runs the factory.
    pub fn construct(&self, type_name: &str, arguments: &BoundArguments) -> PluginResult<ObjectValue> {
        Ok(ObjectValue {
            type_name: type_name.to_string(),
            instance: (self.factory)(arguments)?,
        })
    }
}

impl fmt::Debug for ConstructorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorSpec")
            .field("parameters", &self.parameters)
            .field("visibility", &self.visibility)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// STATIC MEMBERS
// =============================================================================

/// What a member is and how to read it.
#[derive(Clone)]
pub enum MemberBody {
    /// A property computed on access.
    Property(PropertyGetter),
    /// A field holding a fixed value.
    Field(Value),
    /// A method that can be bound as a delegate.
    Method {
        /// Method signature, used to pick among overloads.
        signature: Arc<DelegateSignature>,
        /// The function.
        function: DelegateFn,
    },
}

/// A member reachable through a `Type::Member` accessor.
#[derive(Clone)]
pub struct StaticMember {
    /// Member name.
    pub name: String,
    /// Member visibility.
    pub visibility: Visibility,
    /// Whether the member is static. Instance members are never reachable.
    pub is_static: bool,
    /// Member body.
    pub body: MemberBody,
}

impl StaticMember {
    /// A public static property.
    pub fn property<F>(name: impl Into<String>, getter: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Self::with_body(name, MemberBody::Property(Arc::new(getter)))
    }

    /// A public static field.
    pub fn field(name: impl Into<String>, value: Value) -> Self {
        Self::with_body(name, MemberBody::Field(value))
    }

    /// A public static method.
    pub fn method<F>(name: impl Into<String>, signature: DelegateSignature, function: F) -> Self
    where
        F: Fn(&[Value]) -> PluginResult<Value> + Send + Sync + 'static,
    {
        Self::with_body(
            name,
            MemberBody::Method {
                signature: Arc::new(signature),
                function: Arc::new(function),
            },
        )
    }

    fn with_body(name: impl Into<String>, body: MemberBody) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            is_static: true,
            body,
        }
    }

    /// Builder method to make the member non-public.
    pub fn non_public(mut self) -> Self {
        self.visibility = Visibility::Internal;
        self
    }

    /// Builder method to make the member an instance member.
    pub fn instance(mut self) -> Self {
        self.is_static = false;
        self
    }

    /// Whether an accessor may reach this member.
    pub fn is_accessible(&self) -> bool {
        self.is_static && self.visibility == Visibility::Public
    }

    /// Binds a method member as a delegate named `owner::member`.
    pub fn bind(&self, owner: &str) -> Option<DelegateValue> {
        match &self.body {
            MemberBody::Method {
                signature,
                function,
            } => Some(DelegateValue::new(
                format!("{owner}::{}", self.name),
                signature.clone(),
                function.clone(),
            )),
            _ => None,
        }
    }
}

impl fmt::Debug for StaticMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.body {
            MemberBody::Property(_) => "property",
            MemberBody::Field(_) => "field",
            MemberBody::Method { .. } => "method",
        };
        f.debug_struct("StaticMember")
            .field("name", &self.name)
            .field("kind", &kind)
            .field("visibility", &self.visibility)
            .field("is_static", &self.is_static)
            .finish()
    }
}

// =============================================================================
// TYPES
// =============================================================================

/// Whether a type can be instantiated directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// Instantiable.
    Concrete,
    /// Interface or abstract base; needs a concrete implementation.
    Abstract,
}

/// A registered type.
#[derive(Debug, Clone)]
pub struct TypeSpec {
    /// Full name, e.g. `Sample.Themes.AnsiTheme` or `Sample.Outer+Inner`.
    pub full_name: String,
    /// Registering package, filled in by [`crate::Package`].
    pub package: String,
    /// Concrete or abstract.
    pub kind: TypeKind,
    /// Type visibility.
    pub visibility: Visibility,
    /// Full names of the abstract types this type can stand in for.
    pub implements: Vec<String>,
    /// Constructors in declaration order.
    pub constructors: Vec<ConstructorSpec>,
    /// Static members.
    pub members: Vec<StaticMember>,
}

impl TypeSpec {
    /// A concrete type.
    pub fn concrete(full_name: impl Into<String>) -> Self {
        Self::with_kind(full_name, TypeKind::Concrete)
    }

    /// An abstract type or interface.
    pub fn abstract_type(full_name: impl Into<String>) -> Self {
        Self::with_kind(full_name, TypeKind::Abstract)
    }

    fn with_kind(full_name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            full_name: full_name.into(),
            package: String::new(),
            kind,
            visibility: Visibility::Public,
            implements: Vec::new(),
            constructors: Vec::new(),
            members: Vec::new(),
        }
    }

    /// Builder method to declare an implemented abstract type.
    pub fn implements(mut self, full_name: impl Into<String>) -> Self {
        self.implements.push(full_name.into());
        self
    }

    /// Builder method to add a constructor.
    pub fn constructor(mut self, constructor: ConstructorSpec) -> Self {
        self.constructors.push(constructor);
        self
    }

    /// Builder method to add a static member.
    pub fn member(mut self, member: StaticMember) -> Self {
        self.members.push(member);
        self
    }

    /// Builder method to mark the type internal.
    pub fn internal(mut self) -> Self {
        self.visibility = Visibility::Internal;
        self
    }

    /// Whether the type is abstract.
    pub fn is_abstract(&self) -> bool {
        self.kind == TypeKind::Abstract
    }

    /// Whether a value of this type can be used where `target` is expected.
    pub fn is_assignable_to(&self, target: &str) -> bool {
        self.full_name == target || self.implements.iter().any(|i| i == target)
    }

    /// Public constructors in declaration order.
    pub fn public_constructors(&self) -> impl Iterator<Item = &ConstructorSpec> {
        self.constructors
            .iter()
            .filter(|c| c.visibility == Visibility::Public)
    }

    /// Members named `name` that an accessor may reach.
    pub fn accessible_members<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a StaticMember> {
        self.members
            .iter()
            .filter(move |m| m.name == name && m.is_accessible())
    }
}
