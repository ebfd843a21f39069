//! Value coercion.
//!
//! [`convert`] turns a configuration node into a [`Value`] of the requested
//! [`TypeRef`]. Dispatch is on the node's shape first and on the target
//! second.
//!
//! Scalars, in order:
//!
//! 1. switch handles are looked up by `$name`
//! 2. an empty value for a nullable target is null
//! 3. enumerations parse by exact member name or ordinal
//! 4. URIs, durations and type references use their dedicated parsers
//! 5. `Type::Member` accessors resolve to a static property, field or method
//! 6. a value for an abstract object target names a type to construct
//! 7. everything else goes through the primitive conversions
//!
//! Sections become the node itself, nested callbacks, arrays, containers or
//! constructed objects.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

use logwire_config::{expand_environment_variables, ConfigNode, NodeShape};
use logwire_core::{
    BoundArguments, ConstructorSpec, ContainerSpec, Insertion, MemberBody, ParameterSpec, TypeRef,
    TypeSpec, Value,
};

use crate::callback::callback_value;
use crate::context::ResolutionContext;
use crate::error::{ResolveError, ResolveResult};
use crate::scalar::{convert_primitive, parse_enum_member, parse_level_member};

/// Key naming the concrete type inside an object section.
pub const TYPE_DISCRIMINATOR: &str = "$type";

static MEMBER_ACCESSOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<type>[^:]+)::(?P<member>[A-Za-z][A-Za-z0-9]*)(?P<qualifiers>[^:]*)$")
        .expect("member accessor pattern is valid")
});

/// Converts `node` to `target`.
pub fn convert(
    node: &ConfigNode,
    target: &TypeRef,
    context: &Arc<ResolutionContext>,
) -> ResolveResult<Value> {
    if target.is_implicit() {
        return implicit_value(target, node.key(), &node.path(), context);
    }
    match node.shape()? {
        NodeShape::Scalar(raw) => {
            let text = expand_environment_variables(&raw);
            convert_scalar(node, &text, target, context)
        }
        NodeShape::Structured => convert_structured(node, target, context),
    }
}

/// Value injected for an implicit parameter that was not supplied.
pub fn implicit_value(
    target: &TypeRef,
    parameter: &str,
    path: &str,
    context: &ResolutionContext,
) -> ResolveResult<Value> {
    match target {
        TypeRef::AppConfiguration => context
            .app_configuration()
            .map(|root| Value::Node(root.root_node()))
            .ok_or_else(|| ResolveError::MissingAppConfiguration {
                parameter: parameter.to_string(),
                path: path.to_string(),
            }),
        TypeRef::FormatProvider => Ok(Value::FormatProvider(context.format_provider().clone())),
        other => Err(ResolveError::conversion(
            "",
            other,
            path,
            "the type cannot be injected",
        )),
    }
}

// =============================================================================
// SCALARS
// =============================================================================

fn convert_scalar(
    node: &ConfigNode,
    text: &str,
    target: &TypeRef,
    context: &Arc<ResolutionContext>,
) -> ResolveResult<Value> {
    let path = node.path();
    match target {
        TypeRef::LevelSwitch => return context.level_switch(text, &path).map(Value::LevelSwitch),
        TypeRef::FilterSwitch => return context.filter_switch(text, &path).map(Value::FilterSwitch),
        TypeRef::Nullable(inner) => {
            if text.is_empty() {
                return Ok(Value::Null);
            }
            return convert_scalar(node, text, inner, context);
        }
        TypeRef::Node => return Ok(Value::Node(node.clone())),
        TypeRef::Level => {
            return parse_level_member(text).ok_or_else(|| ResolveError::InvalidEnumValue {
                type_name: "LogLevel".to_string(),
                value: text.to_string(),
                path,
            })
        }
        TypeRef::Enum(spec) => {
            return parse_enum_member(text, target).ok_or_else(|| ResolveError::InvalidEnumValue {
                type_name: spec.name.clone(),
                value: text.to_string(),
                path,
            })
        }
        TypeRef::Uri | TypeRef::Duration => return primitive(text, target, &path, context),
        TypeRef::TypeReference => {
            return context
                .resolve_type(text, &path)
                .map(|spec| Value::Type(spec.full_name.clone()))
        }
        _ => {}
    }

    let trimmed = text.trim();
    if !trimmed.is_empty() {
        if let Some(captures) = MEMBER_ACCESSOR.captures(trimmed) {
            return static_member(&captures, target, &path, context);
        }
        if let TypeRef::Object(declared) = target {
            let declared = context.resolve_type(declared, &path)?;
            if declared.is_abstract() {
                return construct_by_name(trimmed, &declared, &path, context);
            }
        }
    }

    primitive(text, target, &path, context)
}

fn primitive(
    text: &str,
    target: &TypeRef,
    path: &str,
    context: &ResolutionContext,
) -> ResolveResult<Value> {
    match convert_primitive(text, target, context.format_provider()) {
        Some(result) => result.map_err(|reason| ResolveError::conversion(text, target, path, reason)),
        None => {
            let reason = match target {
                TypeRef::Delegate(_) => "expected a 'Type::Member' method reference",
                TypeRef::Array(_) | TypeRef::Container(_) => "expected a section of items",
                TypeRef::Callback(_) => "expected a section of directives",
                _ => "a scalar cannot be converted to this type",
            };
            Err(ResolveError::conversion(text, target, path, reason))
        }
    }
}

/// Resolves `Type::Member[, qualifiers]`.
fn static_member(
    captures: &Captures<'_>,
    target: &TypeRef,
    path: &str,
    context: &ResolutionContext,
) -> ResolveResult<Value> {
    let type_name = format!("{}{}", &captures["type"], &captures["qualifiers"]);
    let member = &captures["member"];
    let spec = context.resolve_type(&type_name, path)?;
    let not_found = || ResolveError::MemberNotFound {
        type_name: spec.full_name.clone(),
        member: member.to_string(),
        path: path.to_string(),
    };

    if let TypeRef::Delegate(signature) = target {
        let methods: Vec<_> = spec
            .accessible_members(member)
            .filter(|m| matches!(m.body, MemberBody::Method { .. }))
            .collect();
        let chosen = if methods.len() > 1 {
            methods.into_iter().find(|m| {
                matches!(&m.body, MemberBody::Method { signature: s, .. } if **s == **signature)
            })
        } else {
            methods.into_iter().next()
        };
        return chosen
            .and_then(|m| m.bind(&spec.full_name))
            .map(Value::Delegate)
            .ok_or_else(not_found);
    }

    let value = spec
        .accessible_members(member)
        .find_map(|m| match &m.body {
            MemberBody::Property(getter) => Some(getter()),
            _ => None,
        })
        .or_else(|| {
            spec.accessible_members(member).find_map(|m| match &m.body {
                MemberBody::Field(value) => Some(value.clone()),
                _ => None,
            })
        })
        .ok_or_else(not_found)?;

    ensure_assignable(&value, target, path, context)?;
    Ok(value)
}

/// Rejects object values whose type cannot stand in for an object target.
fn ensure_assignable(
    value: &Value,
    target: &TypeRef,
    path: &str,
    context: &ResolutionContext,
) -> ResolveResult<()> {
    let expected = match target {
        TypeRef::Object(expected) => expected,
        TypeRef::Nullable(inner) => return ensure_assignable(value, inner, path, context),
        _ => return Ok(()),
    };
    let Value::Object(object) = value else {
        return Ok(());
    };
    if &object.type_name == expected {
        return Ok(());
    }
    let compatible = context
        .resolve_type(&object.type_name, path)
        .map(|spec| spec.is_assignable_to(expected))
        .unwrap_or(false);
    if compatible {
        Ok(())
    } else {
        Err(ResolveError::IncompatibleType {
            type_name: object.type_name.clone(),
            expected: expected.clone(),
            path: path.to_string(),
        })
    }
}

/// Constructs the type named by a scalar through a constructor that needs
/// no explicit arguments.
fn construct_by_name(
    type_name: &str,
    declared: &TypeSpec,
    path: &str,
    context: &ResolutionContext,
) -> ResolveResult<Value> {
    let spec = context.resolve_type(type_name, path)?;
    if !spec.is_assignable_to(&declared.full_name) {
        return Err(ResolveError::IncompatibleType {
            type_name: spec.full_name.clone(),
            expected: declared.full_name.clone(),
            path: path.to_string(),
        });
    }

    let constructor = spec
        .public_constructors()
        .find(|c| c.is_default_invocable())
        .ok_or_else(|| ResolveError::NoDefaultConstructor {
            type_name: spec.full_name.clone(),
            path: path.to_string(),
        })?;

    let mut arguments = BoundArguments::new();
    for parameter in &constructor.parameters {
        arguments.push(parameter.name.clone(), omitted_value(parameter, path, context)?);
    }
    constructor
        .construct(&spec.full_name, &arguments)
        .map(Value::Object)
        .map_err(|e| ResolveError::plugin(path, e))
}

fn omitted_value(
    parameter: &ParameterSpec,
    path: &str,
    context: &ResolutionContext,
) -> ResolveResult<Value> {
    if parameter.type_ref.is_implicit() {
        implicit_value(&parameter.type_ref, &parameter.name, path, context)
    } else {
        Ok(parameter.default.clone().unwrap_or(Value::Null))
    }
}

// =============================================================================
// SECTIONS
// =============================================================================

fn convert_structured(
    node: &ConfigNode,
    target: &TypeRef,
    context: &Arc<ResolutionContext>,
) -> ResolveResult<Value> {
    match target {
        TypeRef::Node => Ok(Value::Node(node.clone())),
        TypeRef::Nullable(inner) => convert_structured(node, inner, context),
        TypeRef::Callback(kind) => callback_value(kind, node, context).map(Value::Callback),
        TypeRef::Array(element) => node
            .children()
            .iter()
            .map(|child| convert(child, element, context))
            .collect::<ResolveResult<Vec<_>>>()
            .map(Value::Array),
        TypeRef::Container(spec) => convert_container(node, spec, context),
        TypeRef::Object(declared) => construct_object(node, declared, context),
        other => Err(ResolveError::conversion(
            "",
            other,
            node.path(),
            "expected a scalar value, found a section",
        )),
    }
}

fn convert_container(
    node: &ConfigNode,
    spec: &ContainerSpec,
    context: &Arc<ResolutionContext>,
) -> ResolveResult<Value> {
    let children = node.children();
    match &spec.insertion {
        Insertion::Element(element) => {
            let items = children
                .iter()
                .map(|child| convert(child, element, context))
                .collect::<ResolveResult<Vec<_>>>()?;
            Ok(Value::Sequence {
                container: spec.name.clone(),
                items,
            })
        }
        Insertion::KeyValue { key, value } => {
            let mut entries = Vec::with_capacity(children.len());
            for child in &children {
                let key = if key.is_string() {
                    Value::String(child.key().to_string())
                } else {
                    convert_scalar(child, child.key(), key, context)?
                };
                entries.push((key, convert(child, value, context)?));
            }
            Ok(Value::Map {
                container: spec.name.clone(),
                entries,
            })
        }
        Insertion::Unsupported => {
            debug!(
                container = %spec.name,
                path = %node.path(),
                "container has no insertion operation; left empty"
            );
            Ok(Value::Sequence {
                container: spec.name.clone(),
                items: Vec::new(),
            })
        }
    }
}

/// Constructs an object from a section, honoring a `$type` discriminator.
fn construct_object(
    node: &ConfigNode,
    declared: &str,
    context: &Arc<ResolutionContext>,
) -> ResolveResult<Value> {
    let path = node.path();
    let discriminator = node.child(TYPE_DISCRIMINATOR);

    let spec = if discriminator.exists() {
        let name = match discriminator.shape()? {
            NodeShape::Scalar(name) => expand_environment_variables(&name).trim().to_string(),
            NodeShape::Structured => {
                return Err(ResolveError::conversion(
                    "",
                    "type name",
                    discriminator.path(),
                    "expected a scalar type name",
                ))
            }
        };
        let spec = context.resolve_type(&name, &discriminator.path())?;
        if !spec.is_assignable_to(declared) {
            return Err(ResolveError::IncompatibleType {
                type_name: spec.full_name.clone(),
                expected: declared.to_string(),
                path,
            });
        }
        spec
    } else {
        let spec = context.resolve_type(declared, &path)?;
        if spec.is_abstract() {
            return Err(ResolveError::AmbiguousType {
                type_name: declared.to_string(),
                path,
            });
        }
        spec
    };

    let fields: Vec<ConfigNode> = node
        .children()
        .into_iter()
        .filter(|field| !field.key().eq_ignore_ascii_case(TYPE_DISCRIMINATOR))
        .collect();

    let (constructor, matched) = select_constructor(&spec, &fields).ok_or_else(|| {
        ResolveError::NoMatchingConstructor {
            type_name: spec.full_name.clone(),
            fields: fields
                .iter()
                .map(|f| f.key().to_string())
                .collect::<Vec<_>>()
                .join(", "),
            path: path.clone(),
        }
    })?;

    let mut arguments = BoundArguments::new();
    for (parameter, field) in constructor.parameters.iter().zip(matched) {
        let value = match field {
            Some(field) => convert(field, &parameter.type_ref, context)?,
            None => omitted_value(parameter, &path, context)?,
        };
        arguments.push(parameter.name.clone(), value);
    }

    debug!(type_name = %spec.full_name, path = %path, "constructing object");
    constructor
        .construct(&spec.full_name, &arguments)
        .map(Value::Object)
        .map_err(|e| ResolveError::plugin(path, e))
}

/// Picks the public constructor binding the most fields, then the most
/// string-typed fields, then the first declared. Field names match
/// parameter names case-insensitively.
fn select_constructor<'a>(
    spec: &'a TypeSpec,
    fields: &'a [ConfigNode],
) -> Option<(&'a ConstructorSpec, Vec<Option<&'a ConfigNode>>)> {
    let mut best: Option<(&ConstructorSpec, Vec<Option<&ConfigNode>>, (usize, usize))> = None;

    'constructors: for constructor in spec.public_constructors() {
        let mut matched = Vec::with_capacity(constructor.parameters.len());
        let mut rank = (0, 0);
        for parameter in &constructor.parameters {
            let field = fields
                .iter()
                .find(|f| f.key().eq_ignore_ascii_case(&parameter.name));
            match field {
                Some(_) => {
                    rank.0 += 1;
                    rank.1 += usize::from(parameter.type_ref.is_string());
                }
                None if parameter.can_omit() => {}
                None => continue 'constructors,
            }
            matched.push(field);
        }
        if best.as_ref().map_or(true, |(_, _, top)| rank > *top) {
            best = Some((constructor, matched, rank));
        }
    }

    best.map(|(constructor, matched, _)| (constructor, matched))
}
