//! Integration tests for logwire-engine.
//!
//! These tests read realistic logging sections end to end against the
//! sample catalog and a recording pipeline builder.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{sample_catalog, ConsoleTheme, RecordingBuilder};
use logwire_config::{ConfigNode, ConfigurationRoot, MemorySource};
use logwire_core::prelude::*;
use logwire_core::FormatProvider;
use logwire_engine::prelude::*;
use parking_lot::Mutex;

// =============================================================================
// TEST FIXTURES
// =============================================================================

fn root(json: &str) -> ConfigurationRoot {
    ConfigurationRoot::from_json_str(json).unwrap()
}

fn reader(root: ConfigurationRoot, options: ReaderOptions) -> ConfigurationReader {
    ConfigurationReader::builder()
        .with_catalog(sample_catalog())
        .with_configuration(root)
        .with_options(options)
        .build()
        .unwrap()
}

fn try_configure(json: &str) -> ResolveResult<(RecordingBuilder, Arc<MemoryDiagnostics>)> {
    let diagnostics = MemoryDiagnostics::new();
    let options = ReaderOptions::new().with_diagnostics(diagnostics.clone());
    let mut builder = RecordingBuilder::default();
    reader(root(json), options).configure(&mut builder)?;
    Ok((builder, diagnostics))
}

fn configure(json: &str) -> (RecordingBuilder, Arc<MemoryDiagnostics>) {
    try_configure(json).unwrap()
}

fn theme_of(call: &ResolvedCall) -> &ConsoleTheme {
    call.arguments
        .get("theme")
        .and_then(|v| v.downcast_ref::<ConsoleTheme>())
        .expect("theme argument holds a ConsoleTheme")
}

// =============================================================================
// DIRECTIVES AND OVERLOADS
// =============================================================================

#[test]
fn test_console_defaults_are_bound() {
    let (builder, diagnostics) = configure(r#"{ "Logging": { "WriteTo": [ "Console" ] } }"#);

    assert_eq!(builder.call_names(), vec!["Console"]);
    let call = builder.call("Console");
    assert_eq!(
        call.arguments.names().collect::<Vec<_>>(),
        vec!["outputTemplate", "restrictedToMinimumLevel", "theme", "levelSwitch"]
    );
    assert_eq!(call.arguments.get("outputTemplate"), Some(&Value::from("{Message}")));
    assert_eq!(call.arguments.level("restrictedToMinimumLevel").unwrap(), LogLevel::Verbose);
    assert!(call.arguments.get("theme").unwrap().is_null());
    assert!(diagnostics.is_empty());
}

#[test]
fn test_duplicate_directives_are_independent_calls() {
    let (builder, _) = configure(
        r#"{ "Logging": { "WriteTo": [
            { "Name": "File", "Args": { "path": "a.log" } },
            { "Name": "File", "Args": {
                "path": "b.log",
                "rollingInterval": "Day",
                "fileSizeLimitBytes": 1048576,
                "flushToDiskInterval": "00:00:05"
            } }
        ] } }"#,
    );

    assert_eq!(builder.call_names(), vec!["File", "File"]);
    let first = &builder.calls[0].arguments;
    let second = &builder.calls[1].arguments;
    assert_eq!(first.str("path").unwrap(), "a.log");
    assert!(first.get("rollingInterval").unwrap().is_null());
    assert_eq!(second.str("path").unwrap(), "b.log");

    match second.get("rollingInterval") {
        Some(Value::Enum(member)) => {
            assert_eq!(member.member, "Day");
            assert_eq!(member.ordinal, 3);
        }
        other => panic!("unexpected rollingInterval {other:?}"),
    }
    assert_eq!(second.get("fileSizeLimitBytes"), Some(&Value::Int(1_048_576)));
    assert_eq!(
        second.get("flushToDiskInterval").and_then(Value::as_duration),
        Some(Duration::from_secs(5))
    );
    assert_eq!(
        second.get("formatProvider"),
        Some(&Value::FormatProvider(FormatProvider::invariant()))
    );
}

#[test]
fn test_string_overload_preferred() {
    let (builder, _) = configure(
        r#"{ "Logging": { "WriteTo": [ { "Name": "Seq", "Args": { "serverUrl": "http://localhost:5341" } } ] } }"#,
    );
    let call = builder.call("Seq");
    assert_eq!(call.method.parameters[0].type_ref, TypeRef::String);
    assert_eq!(call.arguments.str("serverUrl").unwrap(), "http://localhost:5341");
}

#[test]
fn test_uri_and_duration_arguments() {
    let (builder, _) = configure(
        r#"{ "Logging": { "WriteTo": [ { "Name": "Http", "Args": { "requestUri": "https://logs.example.com/ingest", "period": "00:00:02" } } ] } }"#,
    );
    let call = builder.call("Http");
    match call.arguments.get("requestUri") {
        Some(Value::Uri(uri)) => assert_eq!(uri.scheme(), "https"),
        other => panic!("unexpected requestUri {other:?}"),
    }
    assert_eq!(
        call.arguments.get("period").and_then(Value::as_duration),
        Some(Duration::from_secs(2))
    );

    let err = try_configure(
        r#"{ "Logging": { "WriteTo": [ { "Name": "Http", "Args": { "requestUri": "not a uri" } } ] } }"#,
    )
    .unwrap_err();
    assert!(matches!(err, ResolveError::Conversion { ref path, .. } if path == "Logging:WriteTo:0:Args:requestUri"));
}

#[test]
fn test_unmatched_directive_is_skipped_and_reported() {
    let (builder, diagnostics) = configure(
        r#"{ "Logging": { "WriteTo": [ { "Name": "File", "Args": { "filename": "x.log" } }, "Nonexistent", "Console" ] } }"#,
    );

    assert_eq!(builder.call_names(), vec!["Console"]);
    let records = diagnostics.records();
    assert_eq!(records.len(), 2);
    match &records[0] {
        Diagnostic::UnmatchedDirective {
            section,
            name,
            path,
            supplied,
            candidates,
        } => {
            assert_eq!(section, "WriteTo");
            assert_eq!(name, "File");
            assert_eq!(path, "Logging:WriteTo:0");
            assert_eq!(supplied, &vec!["filename".to_string()]);
            assert_eq!(candidates.len(), 1);
            assert!(candidates[0].starts_with("File(path: string"));
        }
        other => panic!("unexpected diagnostic {other:?}"),
    }
    assert!(matches!(
        &records[1],
        Diagnostic::UnmatchedDirective { name, candidates, .. } if name == "Nonexistent" && candidates.is_empty()
    ));
}

#[test]
fn test_argument_names_are_case_sensitive() {
    let (builder, diagnostics) = configure(
        r#"{ "Logging": { "WriteTo": [ { "Name": "File", "Args": { "Path": "x.log" } } ] } }"#,
    );
    assert!(builder.calls.is_empty());
    assert_eq!(diagnostics.len(), 1);
}

// =============================================================================
// VALUE COERCION
// =============================================================================

#[test]
fn test_arrays_containers_and_injected_configuration() {
    let (builder, _) = configure(
        r#"{ "Logging": { "WriteTo": [ { "Name": "Custom", "Args": {
            "levels": [ "Information", 3, null ],
            "tags": { "a": 1, "b": 2 },
            "names": [ "x", "y" ]
        } } ] } }"#,
    );
    let call = builder.call("Custom");

    assert_eq!(
        call.arguments.get("levels"),
        Some(&Value::Array(vec![
            Value::Level(LogLevel::Information),
            Value::Level(LogLevel::Warning),
            Value::Null,
        ]))
    );
    assert_eq!(
        call.arguments.get("tags").and_then(Value::as_entries).unwrap(),
        &[
            (Value::from("a"), Value::Int(1)),
            (Value::from("b"), Value::Int(2)),
        ]
    );
    assert_eq!(
        call.arguments.get("names").and_then(Value::as_items).unwrap(),
        &[Value::from("x"), Value::from("y")]
    );

    let configuration = call
        .arguments
        .get("configuration")
        .and_then(Value::as_node)
        .unwrap();
    assert_eq!(configuration.path(), "");
    assert!(configuration.child("Logging").exists());
}

#[test]
fn test_app_configuration_unavailable_for_bare_section() {
    let section = ConfigNode::from_json(r#"{ "Logging": { "WriteTo": [ "Custom" ] } }"#)
        .unwrap()
        .child("Logging");
    let reader = ConfigurationReader::builder()
        .with_catalog(sample_catalog())
        .with_section(section)
        .build()
        .unwrap();

    let err = reader.plan().unwrap_err();
    assert!(matches!(
        err,
        ResolveError::MissingAppConfiguration { ref parameter, .. } if parameter == "configuration"
    ));
}

#[test]
fn test_static_member_accessors() {
    let (builder, _) = configure(
        r#"{ "Logging": { "WriteTo": [
            { "Name": "Console", "Args": { "theme": "Sample.AnsiTheme::Code, Sample.Console" } },
            { "Name": "Console", "Args": { "theme": "Sample.AnsiTheme::Literate" } },
            { "Name": "Mapped", "Args": { "selector": "Sample.Mappers::Upper" } }
        ] } }"#,
    );

    assert_eq!(theme_of(&builder.calls[0]).name, "code");
    assert_eq!(theme_of(&builder.calls[1]).name, "literate");

    let selector = builder
        .call("Mapped")
        .arguments
        .get("selector")
        .and_then(Value::as_delegate)
        .unwrap();
    assert_eq!(selector.name, "Sample.Mappers::Upper");
    assert_eq!(selector.call(&[Value::from("abc")]).unwrap(), Value::from("ABC"));

    let err = try_configure(
        r#"{ "Logging": { "WriteTo": [ { "Name": "Console", "Args": { "theme": "Sample.AnsiTheme::Hidden" } } ] } }"#,
    )
    .unwrap_err();
    assert!(matches!(err, ResolveError::MemberNotFound { ref member, .. } if member == "Hidden"));
}

#[test]
fn test_delegate_overload_chosen_by_signature() {
    let (builder, _) = configure(
        r#"{ "Logging": { "WriteTo": [ { "Name": "Mapped", "Args": { "selector": "Sample.Mappers::Convert" } } ] } }"#,
    );

    let selector = builder
        .call("Mapped")
        .arguments
        .get("selector")
        .and_then(Value::as_delegate)
        .unwrap();
    assert_eq!(selector.name, "Sample.Mappers::Convert");
    assert_eq!(selector.signature.returns, Some(TypeRef::String));
    assert_eq!(selector.call(&[Value::from("abc")]).unwrap(), Value::from("text"));
}

#[test]
fn test_instance_member_is_not_accessible() {
    let err = try_configure(
        r#"{ "Logging": { "WriteTo": [ { "Name": "Console", "Args": { "theme": "Sample.AnsiTheme::Current" } } ] } }"#,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ResolveError::MemberNotFound { ref type_name, ref member, .. }
            if type_name == "Sample.AnsiTheme" && member == "Current"
    ));
}

#[test]
fn test_object_construction() {
    let (builder, _) = configure(
        r#"{ "Logging": { "WriteTo": [
            { "Name": "Console", "Args": { "theme": { "$type": "Sample.ConsoleTheme", "accent": "blue", "name": "ocean" } } },
            { "Name": "Console", "Args": { "theme": "Sample.ConsoleTheme, Sample.Console" } }
        ] } }"#,
    );

    assert_eq!(
        theme_of(&builder.calls[0]),
        &ConsoleTheme {
            name: "ocean".into(),
            accent: "blue".into()
        }
    );
    assert_eq!(theme_of(&builder.calls[1]).name, "default");
}

#[test]
fn test_object_construction_errors() {
    let err = try_configure(
        r#"{ "Logging": { "WriteTo": [ { "Name": "Themed", "Args": { "theme": { "accent": "blue" } } } ] } }"#,
    )
    .unwrap_err();
    assert!(matches!(err, ResolveError::AmbiguousType { ref type_name, .. } if type_name == "Sample.ITheme"));

    let err = try_configure(
        r#"{ "Logging": { "WriteTo": [ { "Name": "Themed", "Args": { "theme": { "$type": "Sample.AnsiTheme" } } } ] } }"#,
    )
    .unwrap_err();
    assert!(matches!(err, ResolveError::IncompatibleType { .. }));

    let err = try_configure(
        r#"{ "Logging": { "WriteTo": [ { "Name": "Themed", "Args": { "theme": { "$type": "Sample.Missing" } } } ] } }"#,
    )
    .unwrap_err();
    assert!(matches!(err, ResolveError::TypeLoad { ref path, .. } if path == "Logging:WriteTo:0:Args:theme:$type"));
}

#[test]
fn test_all_or_nothing_application() {
    let diagnostics = MemoryDiagnostics::new();
    let reader = reader(
        root(
            r#"{ "Logging": {
                "MinimumLevel": "Debug",
                "WriteTo": [ "Console", { "Name": "File", "Args": { "path": "a.log", "fileSizeLimitBytes": "lots" } } ]
            } }"#,
        ),
        ReaderOptions::new().with_diagnostics(diagnostics),
    );

    let mut builder = RecordingBuilder::default();
    let err = reader.configure(&mut builder).unwrap_err();
    assert!(matches!(
        err,
        ResolveError::Conversion { ref path, .. } if path == "Logging:WriteTo:1:Args:fileSizeLimitBytes"
    ));
    assert!(builder.is_empty());
}

#[test]
fn test_pipeline_failure_is_wrapped() {
    let err = try_configure(r#"{ "Logging": { "WriteTo": [ "Reject" ] } }"#).unwrap_err();
    assert!(matches!(err, ResolveError::Pipeline { ref method, .. } if method == "Reject()"));
    assert!(err.to_string().contains("Reject()"));
}

// =============================================================================
// SWITCHES
// =============================================================================

#[test]
fn test_undeclared_level_switch_names_the_fix() {
    let err = try_configure(
        r#"{ "Logging": { "WriteTo": [ { "Name": "Console", "Args": { "levelSwitch": "$mySwitch" } } ] } }"#,
    )
    .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("$mySwitch"));
    assert!(message.contains(r#""LevelSwitches":{"$mySwitch":...}"#));
}

#[test]
fn test_level_switch_shared_between_scopes() {
    let (builder, _) = configure(
        r#"{ "Logging": {
            "LevelSwitches": { "$controlled": "Warning" },
            "MinimumLevel": { "ControlledBy": "$controlled" },
            "WriteTo": [ { "Name": "Console", "Args": { "levelSwitch": "controlled" } } ]
        } }"#,
    );

    let minimum = &builder.minimum_levels[0];
    assert_eq!(minimum.minimum_level(), LogLevel::Warning);
    let console = builder
        .call("Console")
        .arguments
        .get("levelSwitch")
        .and_then(Value::as_level_switch)
        .unwrap();
    assert!(console.same_cell(minimum));
}

#[test]
fn test_invalid_switch_declarations() {
    let err = try_configure(r#"{ "Logging": { "LevelSwitches": { "bad-name": "Debug" } } }"#).unwrap_err();
    assert!(matches!(err, ResolveError::InvalidSwitchName { ref name, .. } if name == "bad-name"));

    let err = try_configure(r#"{ "Logging": { "LevelSwitches": { "$ok": "Loud" } } }"#).unwrap_err();
    assert!(matches!(err, ResolveError::InvalidLevel { ref value, .. } if value == "Loud"));
}

#[test]
fn test_level_switches_follow_reloads() {
    let memory = MemorySource::with_entries(
        "overrides",
        [
            ("Logging:LevelSwitches:$app", "Information"),
            ("Logging:MinimumLevel:ControlledBy", "$app"),
            ("Logging:MinimumLevel:Override:Microsoft", "Warning"),
        ],
    );
    let root = ConfigurationRoot::builder()
        .add_memory(memory.clone())
        .build()
        .unwrap();
    let diagnostics = MemoryDiagnostics::new();
    let reader = reader(
        root.clone(),
        ReaderOptions::new().with_diagnostics(diagnostics.clone()),
    );

    let mut builder = RecordingBuilder::default();
    let subscriptions = reader.plan().unwrap().apply(&mut builder).unwrap();
    assert_eq!(subscriptions.len(), 2);
    assert_eq!(root.subscription_count(), 2);

    let app = builder.minimum_levels[0].clone();
    let (source, microsoft) = builder.overrides[0].clone();
    assert_eq!(source, "Microsoft");
    assert_eq!(app.minimum_level(), LogLevel::Information);
    assert_eq!(microsoft.minimum_level(), LogLevel::Warning);

    memory.set("Logging:LevelSwitches:$app", "Debug");
    memory.set("Logging:MinimumLevel:Override:Microsoft", "error");
    root.reload().unwrap();
    assert_eq!(app.minimum_level(), LogLevel::Debug);
    assert_eq!(microsoft.minimum_level(), LogLevel::Error);
    assert!(diagnostics.is_empty());

    memory.set("Logging:LevelSwitches:$app", "Loud");
    root.reload().unwrap();
    assert_eq!(app.minimum_level(), LogLevel::Debug);
    assert_eq!(
        diagnostics.take(),
        vec![Diagnostic::ReloadFailure {
            switch: "$app".into(),
            path: "Logging:LevelSwitches:$app".into(),
            value: "Loud".into(),
            reason: "'Loud' is not a valid log level".into(),
        }]
    );

    for id in subscriptions {
        assert!(root.unsubscribe(id));
    }
    memory.set("Logging:LevelSwitches:$app", "Fatal");
    root.reload().unwrap();
    assert_eq!(app.minimum_level(), LogLevel::Debug);
}

#[test]
fn test_filter_switches_validate_and_reload() {
    let memory = MemorySource::with_entries(
        "filters",
        [
            ("Logging:FilterSwitches:$filter", "Level = 'Error'"),
            ("Logging:Filter:0:Name", "ControlledBy"),
            ("Logging:Filter:0:Args:switch", "$filter"),
        ],
    );
    let root = ConfigurationRoot::builder()
        .add_memory(memory.clone())
        .build()
        .unwrap();

    let created = Arc::new(Mutex::new(Vec::new()));
    let diagnostics = MemoryDiagnostics::new();
    let options = ReaderOptions::new()
        .with_diagnostics(diagnostics.clone())
        .with_filter_validator(|expression: &str| {
            if expression.contains("drop") {
                Err("unsupported operator".to_string())
            } else {
                Ok(())
            }
        })
        .on_filter_switch_created({
            let created = created.clone();
            move |name: &str, _: &FilterSwitch| created.lock().push(name.to_string())
        });

    let mut builder = RecordingBuilder::default();
    reader(root.clone(), options).configure(&mut builder).unwrap();
    assert_eq!(*created.lock(), vec!["$filter".to_string()]);

    let switch = builder
        .call("ControlledBy")
        .arguments
        .get("switch")
        .and_then(Value::as_filter_switch)
        .unwrap()
        .clone();
    assert_eq!(switch.expression().as_deref().map(String::as_str), Some("Level = 'Error'"));

    memory.set("Logging:FilterSwitches:$filter", "Level = 'Fatal'");
    root.reload().unwrap();
    assert_eq!(switch.expression().as_deref().map(String::as_str), Some("Level = 'Fatal'"));

    memory.set("Logging:FilterSwitches:$filter", "drop everything");
    root.reload().unwrap();
    assert_eq!(switch.expression().as_deref().map(String::as_str), Some("Level = 'Fatal'"));
    assert!(matches!(
        diagnostics.records().as_slice(),
        [Diagnostic::ReloadFailure { reason, .. }] if reason == "unsupported operator"
    ));
}

#[test]
fn test_invalid_filter_declaration_is_fatal() {
    let options = ReaderOptions::new().with_filter_validator(|_: &str| Err("parse error".to_string()));
    let err = reader(
        root(r#"{ "Logging": { "FilterSwitches": { "$f": "Level = " } } }"#),
        options,
    )
    .plan()
    .unwrap_err();
    assert!(matches!(err, ResolveError::InvalidFilterExpression { ref reason, .. } if reason == "parse error"));
}

#[test]
fn test_level_switch_hook_sees_declarations_only() {
    let created = Arc::new(Mutex::new(Vec::new()));
    let options = ReaderOptions::new().on_level_switch_created({
        let created = created.clone();
        move |name: &str, switch: &LevelSwitch| {
            created.lock().push((name.to_string(), switch.minimum_level()))
        }
    });

    let mut builder = RecordingBuilder::default();
    reader(
        root(
            r#"{ "Logging": {
                "LevelSwitches": { "$a": "Debug", "b": "" },
                "MinimumLevel": { "Default": "Error" }
            } }"#,
        ),
        options,
    )
    .configure(&mut builder)
    .unwrap();

    assert_eq!(
        *created.lock(),
        vec![
            ("$a".to_string(), LogLevel::Debug),
            ("$b".to_string(), LogLevel::Information),
        ]
    );
    assert_eq!(builder.minimum_levels[0].minimum_level(), LogLevel::Error);
}

// =============================================================================
// SECTIONS, PACKAGES AND NESTING
// =============================================================================

#[test]
fn test_enrichers_properties_and_trailing_sections() {
    let (builder, _) = configure(
        r#"{ "Logging": {
            "AuditTo": [ { "Name": "File", "Args": { "path": "audit.log" } } ],
            "Destructure": [ { "Name": "ToMaximumDepth", "Args": { "maximumDestructuringDepth": 4 } } ],
            "Filter": [ { "Name": "ByExcluding", "Args": { "expression": "Level = 'Verbose'" } } ],
            "WriteTo": [ "Console" ],
            "Properties": { "App": "demo", "Host": "%LOGWIRE_TEST_UNSET_VARIABLE%" },
            "Enrich": [ "FromLogContext", { "Name": "WithProperty", "Args": { "name": "Region", "value": "eu" } } ]
        } }"#,
    );

    assert_eq!(
        builder.call_names(),
        vec!["FromLogContext", "WithProperty", "ByExcluding", "ToMaximumDepth", "Console", "File"]
    );
    assert_eq!(
        builder.calls.iter().map(|c| c.capability()).collect::<Vec<_>>(),
        vec![
            Capability::Enrich,
            Capability::Enrich,
            Capability::Filter,
            Capability::Destructure,
            Capability::Sink,
            Capability::AuditSink,
        ]
    );
    assert_eq!(
        builder.properties,
        vec![
            ("App".to_string(), "demo".to_string()),
            ("Host".to_string(), "%LOGWIRE_TEST_UNSET_VARIABLE%".to_string()),
        ]
    );
}

#[test]
fn test_using_restricts_packages() {
    let (builder, diagnostics) = configure(
        r#"{ "Logging": {
            "Using": [ "Sample.File" ],
            "Enrich": [ "FromLogContext" ],
            "WriteTo": [ "Console", { "Name": "File", "Args": { "path": "a.log" } } ]
        } }"#,
    );
    assert_eq!(builder.call_names(), vec!["FromLogContext", "File"]);
    assert!(matches!(
        diagnostics.records().as_slice(),
        [Diagnostic::UnmatchedDirective { name, .. }] if name == "Console"
    ));

    let (builder, _) = configure(r#"{ "Logging": { "WriteTo": [ "Hidden" ] } }"#);
    assert!(builder.calls.is_empty());
    let (builder, _) =
        configure(r#"{ "Logging": { "Using": [ "Sample.Explicit" ], "WriteTo": [ "Hidden" ] } }"#);
    assert_eq!(builder.call_names(), vec!["Hidden"]);

    let err = ConfigurationReader::builder()
        .with_catalog(sample_catalog())
        .with_configuration(root(r#"{ "Logging": { "Using": [ "Sample.Nowhere" ] } }"#))
        .build()
        .unwrap_err();
    assert!(matches!(err, ResolveError::PackageNotFound { ref name } if name == "Sample.Nowhere"));
}

#[test]
fn test_internal_methods_need_opt_in() {
    let json = r#"{ "Logging": { "WriteTo": [ "SelfLog" ] } }"#;
    let (builder, _) = configure(json);
    assert!(builder.calls.is_empty());

    let mut builder = RecordingBuilder::default();
    reader(root(json), ReaderOptions::new().with_internal_methods(true))
        .configure(&mut builder)
        .unwrap();
    assert_eq!(builder.call_names(), vec!["SelfLog"]);
}

#[test]
fn test_sub_logger_callback_runs_every_phase() {
    let (builder, _) = configure(
        r#"{ "Logging": {
            "LevelSwitches": { "$shared": "Fatal" },
            "WriteTo": [ { "Name": "Logger", "Args": { "configureLogger": {
                "MinimumLevel": { "ControlledBy": "$shared" },
                "Properties": { "Scope": "sub" },
                "WriteTo": [ "Console" ]
            } } } ]
        } }"#,
    );

    assert_eq!(builder.call_names(), vec!["Logger"]);
    let nested = &builder.nested[0];
    assert_eq!(nested.call_names(), vec!["Console"]);
    assert_eq!(nested.minimum_levels[0].minimum_level(), LogLevel::Fatal);
    assert_eq!(nested.properties, vec![("Scope".to_string(), "sub".to_string())]);

    match builder.call("Logger").arguments.get("configureLogger") {
        Some(Value::Callback(callback)) => {
            assert_eq!(callback.path, "Logging:WriteTo:0:Args:configureLogger")
        }
        other => panic!("unexpected configureLogger {other:?}"),
    }
}

#[test]
fn test_repeated_sub_logger_invocation_replaces_subscriptions() {
    let config = root(
        r#"{ "Logging": { "WriteTo": [ { "Name": "Logger", "Args": { "configureLogger": {
            "MinimumLevel": { "Default": "Debug", "Override": { "App": "Error" } },
            "WriteTo": [ "Console" ]
        } } } ] } }"#,
    );
    let mut builder = RecordingBuilder::default();
    let subscriptions = reader(config.clone(), ReaderOptions::new())
        .configure(&mut builder)
        .unwrap();
    assert!(subscriptions.is_empty());
    assert_eq!(config.subscription_count(), 2);

    let callback = builder
        .call("Logger")
        .arguments
        .get("configureLogger")
        .and_then(Value::as_callback)
        .unwrap();
    for _ in 0..3 {
        let mut nested = RecordingBuilder::default();
        callback.invoke(&mut nested).unwrap();
        assert_eq!(nested.call_names(), vec!["Console"]);
        assert_eq!(config.subscription_count(), 2);
    }
}

#[test]
fn test_sink_list_callback() {
    let (builder, _) = configure(
        r#"{ "Logging": { "WriteTo": [ { "Name": "Async", "Args": { "configure": [
            "Console",
            { "Name": "File", "Args": { "path": "inner.log" } }
        ] } } ] } }"#,
    );
    assert_eq!(builder.nested[0].call_names(), vec!["Console", "File"]);
}

#[test]
fn test_unknown_callback_kind_is_rejected() {
    let err = try_configure(
        r#"{ "Logging": { "WriteTo": [ { "Name": "Conditional", "Args": { "configure": { "WriteTo": [ "Console" ] } } } ] } }"#,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ResolveError::UnsupportedCallbackType { ref callback, .. } if callback == "ConditionalConfiguration"
    ));
}

// =============================================================================
// CONFIGURATION SOURCES
// =============================================================================

#[test]
fn test_file_backed_json_and_custom_section_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("appsettings.json");
    std::fs::write(
        &path,
        r#"{ "Serilog": { "MinimumLevel": "Warning", "WriteTo": [ "Console" ] } }"#,
    )
    .unwrap();

    let root = ConfigurationRoot::builder().add_json_file(&path).build().unwrap();
    let mut builder = RecordingBuilder::default();
    reader(root, ReaderOptions::new().with_section_name("Serilog"))
        .configure(&mut builder)
        .unwrap();

    assert_eq!(builder.minimum_levels[0].minimum_level(), LogLevel::Warning);
    assert_eq!(builder.call_names(), vec!["Console"]);
}

#[test]
fn test_toml_source_and_merge_keys() {
    let extra = MemorySource::with_entries(
        "extra",
        [("Logging:WriteTo:Audit:Name", "File"), ("Logging:WriteTo:Audit:Args:path", "m.log")],
    );
    let root = ConfigurationRoot::builder()
        .add_toml_str(
            r#"
            [Logging]
            MinimumLevel = "Debug"

            [Logging.WriteTo.Main]
            Name = "Console"
            "#,
        )
        .add_memory(extra)
        .build()
        .unwrap();

    let mut builder = RecordingBuilder::default();
    reader(root, ReaderOptions::new()).configure(&mut builder).unwrap();
    assert_eq!(builder.call_names(), vec!["Console", "File"]);
    assert_eq!(builder.call("File").arguments.str("path").unwrap(), "m.log");
}

#[test]
fn test_scalar_and_list_merged_from_two_sources_is_rejected() {
    let merged = |first: &str, second: &str| {
        ConfigurationRoot::builder()
            .add_json_str(first)
            .add_json_str(second)
            .build()
            .unwrap()
    };
    let plan = |root: ConfigurationRoot| {
        reader(root, ReaderOptions::new().with_diagnostics(MemoryDiagnostics::new())).plan()
    };

    let err = plan(merged(
        r#"{ "Logging": { "WriteTo": "Console" } }"#,
        r#"{ "Logging": { "WriteTo": [ "Console" ] } }"#,
    ))
    .unwrap_err();
    assert!(matches!(err, ResolveError::AmbiguousShape { ref path } if path == "Logging:WriteTo"));

    for section in ["LevelSwitches", "FilterSwitches", "Properties"] {
        let err = plan(merged(
            &format!(r#"{{ "Logging": {{ "{section}": "x" }} }}"#),
            &format!(r#"{{ "Logging": {{ "{section}": {{ "$a": "Debug" }} }} }}"#),
        ))
        .unwrap_err();
        assert!(
            matches!(err, ResolveError::AmbiguousShape { ref path } if path == &format!("Logging:{section}")),
            "{section}: {err:?}"
        );
    }

    let err = plan(merged(
        r#"{ "Logging": { "MinimumLevel": { "Override": "Debug" } } }"#,
        r#"{ "Logging": { "MinimumLevel": { "Override": { "App": "Debug" } } } }"#,
    ))
    .unwrap_err();
    assert!(matches!(
        err,
        ResolveError::AmbiguousShape { ref path } if path == "Logging:MinimumLevel:Override"
    ));
}

#[test]
fn test_structural_errors() {
    let err = try_configure(r#"{ "Logging": { "WriteTo": [ { "Args": { "path": "a.log" } } ] } }"#).unwrap_err();
    assert!(matches!(err, ResolveError::MissingName { ref path } if path == "Logging:WriteTo:0"));

    let memory = MemorySource::with_entries(
        "conflict",
        [("Logging:WriteTo:0", "Console"), ("Logging:WriteTo:0:Name", "File")],
    );
    let root = ConfigurationRoot::builder().add_memory(memory).build().unwrap();
    let err = reader(root, ReaderOptions::new()).plan().unwrap_err();
    assert!(matches!(err, ResolveError::AmbiguousShape { ref path } if path == "Logging:WriteTo:0"));
}
