//! Configuration sources.
//!
//! A source produces a flat list of [`ConfigEntry`] values keyed by
//! colon-separated paths. Structured documents (JSON, TOML) are flattened so
//! that objects become keyed children and arrays become children keyed by
//! their index.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{ConfigError, ConfigResult};

/// Separator between the segments of a key path.
pub const KEY_DELIMITER: &str = ":";

/// Separator that environment variables use in place of [`KEY_DELIMITER`].
pub const ENVIRONMENT_DELIMITER: &str = "__";

// =============================================================================
// ENTRY AND SOURCE TRAIT
// =============================================================================

/// One flattened configuration entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    /// Colon-separated key path, e.g. `Logging:WriteTo:0:Name`.
    pub path: String,
    /// Scalar value; `None` marks an empty structured section.
    pub value: Option<String>,
}

impl ConfigEntry {
    /// Creates a scalar entry.
    pub fn scalar(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            value: Some(value.into()),
        }
    }

    /// Creates an entry for an empty section.
    pub fn section(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            value: None,
        }
    }
}

/// A provider of configuration entries.
///
/// Sources are re-read on every [`crate::ConfigurationRoot::reload`].
pub trait ConfigurationSource: Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Loads all entries in source order.
    fn load(&self) -> ConfigResult<Vec<ConfigEntry>>;
}

#[derive(Debug, Clone)]
enum Origin {
    Inline(String),
    File(PathBuf),
}

impl Origin {
    fn read(&self, source_name: &str) -> ConfigResult<String> {
        match self {
            Origin::Inline(text) => Ok(text.clone()),
            Origin::File(path) => std::fs::read_to_string(path)
                .map_err(|e| ConfigError::unavailable(source_name, e)),
        }
    }
}

fn join(prefix: &[String]) -> String {
    prefix.join(KEY_DELIMITER)
}

// =============================================================================
// JSON
// =============================================================================

/// JSON document source.
#[derive(Debug, Clone)]
pub struct JsonSource {
    name: String,
    origin: Origin,
}

impl JsonSource {
    /// Creates a source over an in-memory JSON document.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            name: "json:inline".to_string(),
            origin: Origin::Inline(text.into()),
        }
    }

    /// Creates a source that reads a JSON file on every load.
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        Self {
            name: format!("json:{}", path.display()),
            origin: Origin::File(path),
        }
    }

    /// Overrides the diagnostic name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl ConfigurationSource for JsonSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> ConfigResult<Vec<ConfigEntry>> {
        let text = self.origin.read(&self.name)?;
        let document: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| ConfigError::parse(&self.name, e))?;
        if !document.is_object() {
            return Err(ConfigError::parse(
                &self.name,
                "top-level JSON value must be an object",
            ));
        }

        let mut entries = Vec::new();
        flatten_json(&mut Vec::new(), &document, &mut entries);
        Ok(entries)
    }
}

fn flatten_json(prefix: &mut Vec<String>, value: &serde_json::Value, out: &mut Vec<ConfigEntry>) {
    use serde_json::Value;

    match value {
        Value::Object(map) => {
            if map.is_empty() {
                if !prefix.is_empty() {
                    out.push(ConfigEntry::section(join(prefix)));
                }
                return;
            }
            for (key, child) in map {
                prefix.push(key.clone());
                flatten_json(prefix, child, out);
                prefix.pop();
            }
        }
        Value::Array(items) => {
            if items.is_empty() {
                out.push(ConfigEntry::section(join(prefix)));
                return;
            }
            for (index, child) in items.iter().enumerate() {
                prefix.push(index.to_string());
                flatten_json(prefix, child, out);
                prefix.pop();
            }
        }
        Value::Null => out.push(ConfigEntry::scalar(join(prefix), "")),
        Value::Bool(b) => out.push(ConfigEntry::scalar(join(prefix), b.to_string())),
        Value::Number(n) => out.push(ConfigEntry::scalar(join(prefix), n.to_string())),
        Value::String(s) => out.push(ConfigEntry::scalar(join(prefix), s.clone())),
    }
}

// =============================================================================
// TOML
// =============================================================================

/// TOML document source.
#[derive(Debug, Clone)]
pub struct TomlSource {
    name: String,
    origin: Origin,
}

impl TomlSource {
    /// Creates a source over an in-memory TOML document.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            name: "toml:inline".to_string(),
            origin: Origin::Inline(text.into()),
        }
    }

    /// Creates a source that reads a TOML file on every load.
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        Self {
            name: format!("toml:{}", path.display()),
            origin: Origin::File(path),
        }
    }
}

impl ConfigurationSource for TomlSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> ConfigResult<Vec<ConfigEntry>> {
        let text = self.origin.read(&self.name)?;
        let table: toml::Table = toml::from_str(&text).map_err(|e| ConfigError::parse(&self.name, e))?;

        let mut entries = Vec::new();
        let mut prefix = Vec::new();
        for (key, value) in &table {
            prefix.push(key.clone());
            flatten_toml(&mut prefix, value, &mut entries);
            prefix.pop();
        }
        Ok(entries)
    }
}

fn flatten_toml(prefix: &mut Vec<String>, value: &toml::Value, out: &mut Vec<ConfigEntry>) {
    use toml::Value;

    match value {
        Value::Table(table) => {
            if table.is_empty() {
                out.push(ConfigEntry::section(join(prefix)));
                return;
            }
            for (key, child) in table {
                prefix.push(key.clone());
                flatten_toml(prefix, child, out);
                prefix.pop();
            }
        }
        Value::Array(items) => {
            if items.is_empty() {
                out.push(ConfigEntry::section(join(prefix)));
                return;
            }
            for (index, child) in items.iter().enumerate() {
                prefix.push(index.to_string());
                flatten_toml(prefix, child, out);
                prefix.pop();
            }
        }
        Value::String(s) => out.push(ConfigEntry::scalar(join(prefix), s.clone())),
        Value::Integer(i) => out.push(ConfigEntry::scalar(join(prefix), i.to_string())),
        Value::Float(f) => out.push(ConfigEntry::scalar(join(prefix), f.to_string())),
        Value::Boolean(b) => out.push(ConfigEntry::scalar(join(prefix), b.to_string())),
        Value::Datetime(dt) => out.push(ConfigEntry::scalar(join(prefix), dt.to_string())),
    }
}

// =============================================================================
// IN-MEMORY
// =============================================================================

/// Mutable in-memory key/value source.
///
/// Clones share the same data, so a clone kept by the host can update values
/// that the next [`crate::ConfigurationRoot::reload`] will pick up.
#[derive(Debug, Clone)]
pub struct MemorySource {
    name: String,
    data: Arc<RwLock<Vec<(String, String)>>>,
}

impl MemorySource {
    /// Creates an empty source.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Creates a source pre-populated with `path = value` pairs.
    pub fn with_entries<K, V>(name: impl Into<String>, entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let source = Self::new(name);
        for (key, value) in entries {
            source.set(key, value);
        }
        source
    }

    /// Sets or replaces a value. Keys compare case-insensitively.
    pub fn set(&self, path: impl Into<String>, value: impl Into<String>) {
        let path = path.into();
        let value = value.into();
        let mut data = self.data.write();
        match data.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&path)) {
            Some(existing) => existing.1 = value,
            None => data.push((path, value)),
        }
    }

    /// Removes a value, returning whether it existed.
    pub fn remove(&self, path: &str) -> bool {
        let mut data = self.data.write();
        let before = data.len();
        data.retain(|(k, _)| !k.eq_ignore_ascii_case(path));
        data.len() != before
    }
}

impl ConfigurationSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> ConfigResult<Vec<ConfigEntry>> {
        Ok(self
            .data
            .read()
            .iter()
            .map(|(k, v)| ConfigEntry::scalar(k.clone(), v.clone()))
            .collect())
    }
}

// =============================================================================
// ENVIRONMENT
// =============================================================================

/// Process environment source.
///
/// `Logging__MinimumLevel__Default=Debug` maps to `Logging:MinimumLevel:Default`.
/// With a prefix, only variables starting with it (case-insensitively) are
/// read and the prefix is stripped.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentSource {
    prefix: Option<String>,
}

impl EnvironmentSource {
    /// Reads every environment variable.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads only variables starting with `prefix`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    fn map_variable(&self, key: &str) -> Option<String> {
        let stripped = match &self.prefix {
            Some(prefix) => {
                let head = key.get(..prefix.len())?;
                if !head.eq_ignore_ascii_case(prefix) {
                    return None;
                }
                &key[prefix.len()..]
            }
            None => key,
        };
        if stripped.is_empty() {
            return None;
        }
        Some(stripped.replace(ENVIRONMENT_DELIMITER, KEY_DELIMITER))
    }
}

impl ConfigurationSource for EnvironmentSource {
    fn name(&self) -> &str {
        "environment"
    }

    fn load(&self) -> ConfigResult<Vec<ConfigEntry>> {
        let mut entries: Vec<ConfigEntry> = std::env::vars()
            .filter_map(|(key, value)| {
                self.map_variable(&key)
                    .map(|path| ConfigEntry::scalar(path, value))
            })
            .collect();
        // Process environment has no meaningful order.
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }
}
