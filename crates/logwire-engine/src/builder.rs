//! Configuration reader builder.

use std::sync::Arc;

use tracing::debug;

use logwire_config::{ConfigNode, ConfigurationRoot, NodeShape};
use logwire_core::{CandidateSource, PackageSelection};

use crate::context::ResolutionContext;
use crate::error::{ResolveError, ResolveResult};
use crate::options::ReaderOptions;
use crate::reader::ConfigurationReader;

/// Section listing the packages to search.
pub const USING_SECTION: &str = "Using";

/// Builder for [`ConfigurationReader`].
///
/// A catalog and either a configuration root or a bare section are
/// required. Reading from a root makes the whole configuration injectable
/// into `AppConfiguration` parameters; reading a bare section does not.
pub struct ConfigurationReaderBuilder {
    catalog: Option<Arc<dyn CandidateSource>>,
    root: Option<ConfigurationRoot>,
    section: Option<ConfigNode>,
    options: ReaderOptions,
}

impl ConfigurationReaderBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            catalog: None,
            root: None,
            section: None,
            options: ReaderOptions::default(),
        }
    }

    /// Set the candidate catalog.
    pub fn with_catalog(mut self, catalog: impl CandidateSource + 'static) -> Self {
        self.catalog = Some(Arc::new(catalog));
        self
    }

    /// Set a shared candidate catalog.
    pub fn with_shared_catalog(mut self, catalog: Arc<dyn CandidateSource>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Read the section named by the options from `root`.
    pub fn with_configuration(mut self, root: ConfigurationRoot) -> Self {
        self.root = Some(root);
        self
    }

    /// Read `section` directly.
    ///
    /// Combined with [`Self::with_configuration`], the root is still used
    /// for `AppConfiguration` injection.
    pub fn with_section(mut self, section: ConfigNode) -> Self {
        self.section = Some(section);
        self
    }

    /// Set the reader options.
    pub fn with_options(mut self, options: ReaderOptions) -> Self {
        self.options = options;
        self
    }

    /// Build the reader.
    ///
    /// The `Using` list is validated here, before any other section is
    /// read.
    pub fn build(self) -> ResolveResult<ConfigurationReader> {
        let catalog = self
            .catalog
            .ok_or(ResolveError::MissingComponent("a plugin catalog"))?;

        let (section, root) = match (self.section, self.root) {
            (Some(section), root) => (section, root),
            (None, Some(root)) => (root.section(&self.options.section_name), Some(root)),
            (None, None) => {
                return Err(ResolveError::MissingComponent(
                    "a configuration root or section",
                ))
            }
        };

        let selection = package_selection(&section, catalog.as_ref())?;
        debug!(section = %section.path(), selection = ?selection, "building configuration reader");

        let mut context = ResolutionContext::new(catalog, self.options).with_selection(selection);
        if let Some(root) = root {
            context = context.with_app_configuration(root);
        }
        Ok(ConfigurationReader::new(section, Arc::new(context)))
    }
}

impl Default for ConfigurationReaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses the `Using` list of `section`.
///
/// An absent or empty list searches every auto-discoverable package.
pub fn package_selection(
    section: &ConfigNode,
    catalog: &dyn CandidateSource,
) -> ResolveResult<PackageSelection> {
    let using = section.child(USING_SECTION);
    if !using.exists() {
        return Ok(PackageSelection::All);
    }

    let entries = match using.shape()? {
        NodeShape::Scalar(name) => vec![(name, using.path())],
        NodeShape::Structured => {
            let mut entries = Vec::new();
            for entry in using.children() {
                match entry.shape()? {
                    NodeShape::Scalar(name) => entries.push((name, entry.path())),
                    NodeShape::Structured => {
                        return Err(ResolveError::EmptyPackageName { path: entry.path() })
                    }
                }
            }
            entries
        }
    };
    if entries.is_empty() {
        return Ok(PackageSelection::All);
    }

    let mut names = Vec::with_capacity(entries.len());
    for (name, path) in entries {
        let name = name.trim();
        if name.is_empty() {
            return Err(ResolveError::EmptyPackageName { path });
        }
        if !catalog.has_package(name) {
            return Err(ResolveError::PackageNotFound {
                name: name.to_string(),
            });
        }
        names.push(name.to_string());
    }
    Ok(PackageSelection::Named(names))
}

#[cfg(test)]
mod tests {
    use super::*;
    use logwire_core::{Package, PluginCatalog};

    fn catalog() -> PluginCatalog {
        PluginCatalog::new()
            .with_package(Package::new("Sample.Console"))
            .with_package(Package::new("Sample.File").explicit_only())
    }

    fn using(json: &str) -> ResolveResult<PackageSelection> {
        let section = ConfigNode::from_json(json).unwrap().child("Logging");
        package_selection(&section, &catalog())
    }

    #[test]
    fn test_using_lists() {
        assert_eq!(using(r#"{ "Logging": {} }"#).unwrap(), PackageSelection::All);
        assert_eq!(using(r#"{ "Logging": { "Using": [] } }"#).unwrap(), PackageSelection::All);
        assert_eq!(
            using(r#"{ "Logging": { "Using": [ "sample.file" ] } }"#).unwrap(),
            PackageSelection::Named(vec!["sample.file".into()])
        );
        assert_eq!(
            using(r#"{ "Logging": { "Using": "Sample.Console" } }"#).unwrap(),
            PackageSelection::Named(vec!["Sample.Console".into()])
        );
    }

    #[test]
    fn test_using_errors() {
        assert!(matches!(
            using(r#"{ "Logging": { "Using": [ "Sample.Missing" ] } }"#),
            Err(ResolveError::PackageNotFound { ref name }) if name == "Sample.Missing"
        ));
        assert!(matches!(
            using(r#"{ "Logging": { "Using": [ "Sample.Console", " " ] } }"#),
            Err(ResolveError::EmptyPackageName { ref path }) if path == "Logging:Using:1"
        ));
    }

    #[test]
    fn test_build_requires_components() {
        let err = ConfigurationReader::builder().build().unwrap_err();
        assert!(matches!(err, ResolveError::MissingComponent("a plugin catalog")));

        let err = ConfigurationReader::builder()
            .with_catalog(catalog())
            .build()
            .unwrap_err();
        assert!(matches!(err, ResolveError::MissingComponent(_)));
    }

    #[test]
    fn test_build_from_root_reads_named_section() {
        let root = ConfigurationRoot::from_json_str(r#"{ "Custom": { "MinimumLevel": "Debug" } }"#).unwrap();
        let reader = ConfigurationReader::builder()
            .with_catalog(catalog())
            .with_configuration(root)
            .with_options(ReaderOptions::new().with_section_name("Custom"))
            .build()
            .unwrap();
        assert_eq!(reader.section().path(), "Custom");
        assert!(reader.context().app_configuration().is_some());
    }
}
