//! Configuration root and builder.
//!
//! The root owns the ordered list of sources, the current merged snapshot and
//! the change subscriptions. Reloading re-reads every source, swaps the
//! snapshot and then notifies subscribers outside of any lock.

use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::error::ConfigResult;
use crate::node::ConfigNode;
use crate::source::{
    ConfigurationSource, EnvironmentSource, JsonSource, MemorySource, TomlSource, KEY_DELIMITER,
};
use crate::tree::TreeNode;

/// Callback fired with the re-resolved node after a reload.
pub type ChangeCallback = Arc<dyn Fn(&ConfigNode) + Send + Sync>;

/// Identifier returned by [`ConfigurationRoot::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    segments: Vec<String>,
    callback: ChangeCallback,
}

// =============================================================================
// BUILDER
// =============================================================================

/// Collects sources in priority order; later sources win.
#[derive(Default)]
pub struct ConfigurationBuilder {
    sources: Vec<Arc<dyn ConfigurationSource>>,
}

impl ConfigurationBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an arbitrary source.
    pub fn add_source(mut self, source: impl ConfigurationSource + 'static) -> Self {
        self.sources.push(Arc::new(source));
        self
    }

    /// Adds an inline JSON document.
    pub fn add_json_str(self, text: impl Into<String>) -> Self {
        self.add_source(JsonSource::from_text(text))
    }

    /// Adds a JSON file.
    pub fn add_json_file(self, path: impl AsRef<Path>) -> Self {
        self.add_source(JsonSource::from_file(path))
    }

    /// Adds an inline TOML document.
    pub fn add_toml_str(self, text: impl Into<String>) -> Self {
        self.add_source(TomlSource::from_text(text))
    }

    /// Adds a TOML file.
    pub fn add_toml_file(self, path: impl AsRef<Path>) -> Self {
        self.add_source(TomlSource::from_file(path))
    }

    /// Adds an in-memory source. Keep a clone to mutate it later.
    pub fn add_memory(self, source: MemorySource) -> Self {
        self.add_source(source)
    }

    /// Adds environment variables filtered by `prefix`.
    pub fn add_environment(self, prefix: impl Into<String>) -> Self {
        self.add_source(EnvironmentSource::with_prefix(prefix))
    }

    /// Loads every source and builds the root.
    pub fn build(self) -> ConfigResult<ConfigurationRoot> {
        let tree = load_tree(&self.sources)?;
        Ok(ConfigurationRoot {
            inner: Arc::new(RootInner {
                sources: self.sources,
                tree: RwLock::new(Arc::new(tree)),
                subscriptions: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
            }),
        })
    }
}

fn load_tree(sources: &[Arc<dyn ConfigurationSource>]) -> ConfigResult<TreeNode> {
    let mut entries = Vec::new();
    for source in sources {
        let loaded = source.load()?;
        debug!(source = source.name(), entries = loaded.len(), "loaded configuration source");
        entries.extend(loaded);
    }
    Ok(TreeNode::from_entries(&entries))
}

// =============================================================================
// ROOT
// =============================================================================

struct RootInner {
    sources: Vec<Arc<dyn ConfigurationSource>>,
    tree: RwLock<Arc<TreeNode>>,
    subscriptions: Mutex<Vec<Subscription>>,
    next_id: AtomicU64,
}

/// Merged configuration with live reload.
///
/// Cloning is cheap and shares the same sources, snapshot and subscriptions.
/// Subscriptions are released when the last clone is dropped.
#[derive(Clone)]
pub struct ConfigurationRoot {
    inner: Arc<RootInner>,
}

impl ConfigurationRoot {
    /// Starts a builder.
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::new()
    }

    /// Builds a root over a single inline JSON document.
    pub fn from_json_str(text: impl Into<String>) -> ConfigResult<Self> {
        ConfigurationBuilder::new().add_json_str(text).build()
    }

    pub(crate) fn snapshot(&self) -> Arc<TreeNode> {
        self.inner.tree.read().clone()
    }

    /// Returns the unnamed top-level node.
    pub fn root_node(&self) -> ConfigNode {
        ConfigNode::new(self.clone(), self.snapshot(), Vec::new())
    }

    /// Returns the node at a colon-separated path. The node may not exist.
    pub fn node(&self, path: &str) -> ConfigNode {
        ConfigNode::new(self.clone(), self.snapshot(), split_path(path))
    }

    /// Alias of [`ConfigurationRoot::node`] for top-level sections.
    pub fn section(&self, key: &str) -> ConfigNode {
        self.node(key)
    }

    /// Names of the sources, in priority order.
    pub fn source_names(&self) -> Vec<String> {
        self.inner
            .sources
            .iter()
            .map(|s| s.name().to_string())
            .collect()
    }

    /// Re-reads every source, swaps the snapshot and fires change callbacks.
    ///
    /// On failure the previous snapshot stays in place and no callback fires.
    pub fn reload(&self) -> ConfigResult<()> {
        let tree = load_tree(&self.inner.sources)?;
        *self.inner.tree.write() = Arc::new(tree);
        self.notify();
        Ok(())
    }

    fn notify(&self) {
        let pending: Vec<(Vec<String>, ChangeCallback)> = self
            .inner
            .subscriptions
            .lock()
            .iter()
            .map(|s| (s.segments.clone(), s.callback.clone()))
            .collect();
        debug!(subscribers = pending.len(), "configuration reloaded");

        let tree = self.snapshot();
        for (segments, callback) in pending {
            let node = ConfigNode::new(self.clone(), tree.clone(), segments);
            callback(&node);
        }
    }

    /// Registers a callback for the node at `path`, fired after every reload.
    ///
    /// The callback must not capture a clone of this root, otherwise the root
    /// keeps itself alive.
    pub fn subscribe<F>(&self, path: &str, callback: F) -> SubscriptionId
    where
        F: Fn(&ConfigNode) + Send + Sync + 'static,
    {
        self.subscribe_segments(split_path(path), Arc::new(callback))
    }

    pub(crate) fn subscribe_segments(
        &self,
        segments: Vec<String>,
        callback: ChangeCallback,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.inner.subscriptions.lock().push(Subscription {
            id,
            segments,
            callback,
        });
        id
    }

    /// Removes a subscription. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.inner.subscriptions.lock();
        let before = subscriptions.len();
        subscriptions.retain(|s| s.id != id);
        subscriptions.len() != before
    }

    /// Number of live subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.inner.subscriptions.lock().len()
    }
}

impl fmt::Debug for ConfigurationRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigurationRoot")
            .field("sources", &self.source_names())
            .field("subscriptions", &self.subscription_count())
            .finish()
    }
}

pub(crate) fn split_path(path: &str) -> Vec<String> {
    if path.is_empty() {
        return Vec::new();
    }
    path.split(KEY_DELIMITER).map(str::to_string).collect()
}
