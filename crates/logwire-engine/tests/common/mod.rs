//! Shared fixtures: a recording pipeline builder and a sample plugin catalog.

#![allow(dead_code)]

use std::sync::Arc;

use logwire_core::prelude::*;
use logwire_core::{
    CallbackKind, ContainerSpec, DelegateSignature, EnumSpec, PipelineError, StaticMember,
};

// =============================================================================
// RECORDING BUILDER
// =============================================================================

/// Records everything applied to it. Callback arguments are invoked against
/// a fresh nested builder, as a pipeline owning sub-loggers would.
#[derive(Debug, Default)]
pub struct RecordingBuilder {
    pub minimum_levels: Vec<LevelSwitch>,
    pub overrides: Vec<(String, LevelSwitch)>,
    pub properties: Vec<(String, String)>,
    pub calls: Vec<ResolvedCall>,
    pub nested: Vec<RecordingBuilder>,
}

impl RecordingBuilder {
    pub fn call_names(&self) -> Vec<String> {
        self.calls.iter().map(|c| c.name().to_string()).collect()
    }

    pub fn call(&self, name: &str) -> &ResolvedCall {
        self.calls
            .iter()
            .find(|c| c.name() == name)
            .unwrap_or_else(|| panic!("no call named {name}"))
    }

    pub fn is_empty(&self) -> bool {
        self.minimum_levels.is_empty()
            && self.overrides.is_empty()
            && self.properties.is_empty()
            && self.calls.is_empty()
    }
}

impl PipelineBuilder for RecordingBuilder {
    fn set_minimum_level(&mut self, switch: &LevelSwitch) {
        self.minimum_levels.push(switch.clone());
    }

    fn override_minimum_level(&mut self, source: &str, switch: &LevelSwitch) {
        self.overrides.push((source.to_string(), switch.clone()));
    }

    fn enrich_with_property(&mut self, name: &str, value: &str) {
        self.properties.push((name.to_string(), value.to_string()));
    }

    fn apply(&mut self, call: &ResolvedCall) -> Result<(), PipelineError> {
        if call.name() == "Reject" {
            return Err("sink rejected its arguments".into());
        }
        for (_, value) in call.arguments.iter() {
            if let Value::Callback(callback) = value {
                let mut nested = RecordingBuilder::default();
                callback.invoke(&mut nested)?;
                self.nested.push(nested);
            }
        }
        self.calls.push(call.clone());
        Ok(())
    }
}

// =============================================================================
// SAMPLE CATALOG
// =============================================================================

#[derive(Debug, PartialEq)]
pub struct ConsoleTheme {
    pub name: String,
    pub accent: String,
}

pub fn rolling_interval() -> TypeRef {
    TypeRef::Enum(Arc::new(EnumSpec::new(
        "RollingInterval",
        ["Infinite", "Year", "Month", "Day", "Hour", "Minute"],
    )))
}

fn theme(name: &str) -> Value {
    Value::Object(logwire_core::ObjectValue::new(
        "Sample.ConsoleTheme",
        ConsoleTheme {
            name: name.to_string(),
            accent: "none".to_string(),
        },
    ))
}

fn console_package() -> Package {
    Package::new("Sample.Console")
        .method(
            CandidateMethod::new("Console", Capability::Sink)
                .optional("outputTemplate", TypeRef::String, Value::from("{Message}"))
                .optional(
                    "restrictedToMinimumLevel",
                    TypeRef::Level,
                    Value::Level(LogLevel::Verbose),
                )
                .optional("theme", TypeRef::object("Sample.ITheme"), Value::Null)
                .optional("levelSwitch", TypeRef::LevelSwitch, Value::Null),
        )
        .type_spec(TypeSpec::abstract_type("Sample.ITheme"))
        .type_spec(
            TypeSpec::concrete("Sample.ConsoleTheme")
                .implements("Sample.ITheme")
                .constructor(
                    ConstructorSpec::new(|args| {
                        Ok(ConsoleTheme {
                            name: args.opt_str("name").unwrap_or("custom").to_string(),
                            accent: args.str("accent")?.to_string(),
                        })
                    })
                    .optional("name", TypeRef::String, Value::Null)
                    .param("accent", TypeRef::String),
                )
                .constructor(ConstructorSpec::new(|_| {
                    Ok(ConsoleTheme {
                        name: "default".to_string(),
                        accent: "none".to_string(),
                    })
                })),
        )
        .type_spec(
            TypeSpec::concrete("Sample.AnsiTheme")
                .member(StaticMember::property("Code", || theme("code")))
                .member(StaticMember::field("Literate", theme("literate")))
                .member(StaticMember::property("Hidden", || theme("hidden")).non_public())
                .member(StaticMember::property("Current", || theme("current")).instance()),
        )
}

fn file_package() -> Package {
    Package::new("Sample.File")
        .method(
            CandidateMethod::new("File", Capability::Sink)
                .param("path", TypeRef::String)
                .optional("rollingInterval", rolling_interval(), Value::Null)
                .optional("fileSizeLimitBytes", TypeRef::nullable(TypeRef::Int), Value::Null)
                .optional("flushToDiskInterval", TypeRef::nullable(TypeRef::Duration), Value::Null)
                .param("formatProvider", TypeRef::FormatProvider),
        )
        .method(CandidateMethod::new("File", Capability::AuditSink).param("path", TypeRef::String))
}

fn network_package() -> Package {
    Package::new("Sample.Network")
        .method(CandidateMethod::new("Seq", Capability::Sink).param("serverUrl", TypeRef::Uri))
        .method(CandidateMethod::new("Seq", Capability::Sink).param("serverUrl", TypeRef::String))
        .method(
            CandidateMethod::new("Http", Capability::Sink)
                .param("requestUri", TypeRef::Uri)
                .optional("period", TypeRef::Duration, Value::Null),
        )
}

fn wrapper_package() -> Package {
    Package::new("Sample.Wrappers")
        .method(
            CandidateMethod::new("Logger", Capability::Sink)
                .param("configureLogger", TypeRef::Callback(CallbackKind::LoggerConfiguration)),
        )
        .method(
            CandidateMethod::new("Async", Capability::Sink)
                .param("configure", TypeRef::Callback(CallbackKind::SinkConfiguration)),
        )
        .method(
            CandidateMethod::new("Conditional", Capability::Sink).param(
                "configure",
                TypeRef::Callback(CallbackKind::Other("ConditionalConfiguration".into())),
            ),
        )
}

fn custom_package() -> Package {
    let upper = DelegateSignature::function(vec![TypeRef::String], TypeRef::String);
    Package::new("Sample.Custom")
        .method(
            CandidateMethod::new("Custom", Capability::Sink)
                .param("configuration", TypeRef::AppConfiguration)
                .optional("levels", TypeRef::array(TypeRef::nullable(TypeRef::Level)), Value::Null)
                .optional(
                    "tags",
                    TypeRef::Container(Arc::new(ContainerSpec::dictionary(
                        "IDictionary<string,int>",
                        TypeRef::String,
                        TypeRef::Int,
                    ))),
                    Value::Null,
                )
                .optional(
                    "names",
                    TypeRef::Container(Arc::new(ContainerSpec::list("List<string>", TypeRef::String))),
                    Value::Null,
                ),
        )
        .method(
            CandidateMethod::new("Mapped", Capability::Sink)
                .param("selector", TypeRef::Delegate(Arc::new(upper.clone()))),
        )
        .method(CandidateMethod::new("Reject", Capability::Sink))
        .method(CandidateMethod::new("SelfLog", Capability::Sink).internal())
        .type_spec(
            TypeSpec::concrete("Sample.Mappers")
                .member(StaticMember::method("Upper", upper.clone(), |args| {
                    let text = args.first().and_then(Value::as_str).unwrap_or_default();
                    Ok(Value::from(text.to_uppercase()))
                }))
                .member(StaticMember::method(
                    "Convert",
                    DelegateSignature::function(vec![TypeRef::Int], TypeRef::Int),
                    |_| Ok(Value::Int(0)),
                ))
                .member(StaticMember::method("Convert", upper, |_| Ok(Value::from("text")))),
        )
}

fn explicit_package() -> Package {
    Package::new("Sample.Explicit")
        .explicit_only()
        .method(CandidateMethod::new("Hidden", Capability::Sink))
}

fn core_package() -> Package {
    Package::core()
        .method(
            CandidateMethod::new("WithProperty", Capability::Enrich)
                .param("name", TypeRef::String)
                .param("value", TypeRef::String),
        )
        .method(CandidateMethod::new("FromLogContext", Capability::Enrich))
        .method(
            CandidateMethod::new("ControlledBy", Capability::Filter)
                .param("switch", TypeRef::FilterSwitch),
        )
        .method(
            CandidateMethod::new("ByExcluding", Capability::Filter)
                .param("expression", TypeRef::String),
        )
        .method(
            CandidateMethod::new("ToMaximumDepth", Capability::Destructure)
                .param("maximumDestructuringDepth", TypeRef::Int),
        )
        .method(
            CandidateMethod::new("Themed", Capability::Sink)
                .param("theme", TypeRef::object("Sample.ITheme")),
        )
}

/// A catalog with sinks, enrichers, filters and types spread over several
/// packages.
pub fn sample_catalog() -> PluginCatalog {
    PluginCatalog::new()
        .with_package(core_package())
        .with_package(console_package())
        .with_package(file_package())
        .with_package(network_package())
        .with_package(wrapper_package())
        .with_package(custom_package())
        .with_package(explicit_package())
}
