//! Snapshot view over one node of the configuration tree.

use std::fmt;
use std::sync::Arc;

use crate::error::{ConfigError, ConfigResult};
use crate::root::{split_path, ConfigurationRoot, SubscriptionId};
use crate::source::KEY_DELIMITER;
use crate::tree::TreeNode;

/// Shape of a node once all sources are merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeShape {
    /// A leaf carrying a scalar string.
    Scalar(String),
    /// A section with (possibly zero) keyed children.
    Structured,
}

/// A named node of the configuration tree.
///
/// A node reads from the snapshot that was current when it was obtained, so
/// one resolution pass sees a consistent tree even if a reload happens
/// concurrently. Use [`ConfigNode::current`] to re-resolve against the latest
/// snapshot.
#[derive(Clone)]
pub struct ConfigNode {
    root: ConfigurationRoot,
    tree: Arc<TreeNode>,
    segments: Vec<String>,
}

impl ConfigNode {
    pub(crate) fn new(root: ConfigurationRoot, tree: Arc<TreeNode>, segments: Vec<String>) -> Self {
        Self {
            root,
            tree,
            segments,
        }
    }

    /// Parses an inline JSON document and returns its top-level node.
    pub fn from_json(text: &str) -> ConfigResult<Self> {
        Ok(ConfigurationRoot::from_json_str(text)?.root_node())
    }

    fn locate(&self) -> Option<&TreeNode> {
        self.tree.descend(&self.segments)
    }

    /// Last path segment, in the casing of the first source that declared it.
    pub fn key(&self) -> &str {
        match self.locate() {
            Some(node) if !self.segments.is_empty() => &node.key,
            _ => self.segments.last().map_or("", String::as_str),
        }
    }

    /// Full colon-separated path, used in diagnostics.
    pub fn path(&self) -> String {
        self.segments.join(KEY_DELIMITER)
    }

    /// Scalar value, if any.
    pub fn value(&self) -> Option<&str> {
        self.locate().and_then(|n| n.value.as_deref())
    }

    /// Whether the node is present in the merged tree.
    pub fn exists(&self) -> bool {
        self.locate().is_some()
    }

    /// Whether the node has at least one child.
    pub fn has_children(&self) -> bool {
        self.locate().is_some_and(|n| !n.children.is_empty())
    }

    /// Children in source order.
    pub fn children(&self) -> Vec<ConfigNode> {
        let Some(node) = self.locate() else {
            return Vec::new();
        };
        node.children
            .iter()
            .map(|child| {
                let mut segments = self.segments.clone();
                segments.push(child.key.clone());
                ConfigNode::new(self.root.clone(), self.tree.clone(), segments)
            })
            .collect()
    }

    /// Child by key (case-insensitive). Always succeeds; check
    /// [`ConfigNode::exists`] to see whether it is present.
    pub fn child(&self, key: &str) -> ConfigNode {
        let mut segments = self.segments.clone();
        segments.extend(split_path(key));
        ConfigNode::new(self.root.clone(), self.tree.clone(), segments)
    }

    /// Resolves the node's shape, rejecting nodes that are both scalar and
    /// structured.
    pub fn shape(&self) -> ConfigResult<NodeShape> {
        match self.locate() {
            Some(TreeNode {
                value: Some(value),
                children,
                ..
            }) => {
                if children.is_empty() {
                    Ok(NodeShape::Scalar(value.clone()))
                } else {
                    Err(ConfigError::AmbiguousShape { path: self.path() })
                }
            }
            _ => Ok(NodeShape::Structured),
        }
    }

    /// The same path resolved against the latest snapshot.
    pub fn current(&self) -> ConfigNode {
        ConfigNode::new(self.root.clone(), self.root.snapshot(), self.segments.clone())
    }

    /// The configuration root this node belongs to.
    pub fn root(&self) -> &ConfigurationRoot {
        &self.root
    }

    /// Subscribes to reloads of the owning root. The callback receives this
    /// path re-resolved against the new snapshot.
    pub fn on_change<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&ConfigNode) + Send + Sync + 'static,
    {
        self.root
            .subscribe_segments(self.segments.clone(), Arc::new(callback))
    }
}

impl fmt::Debug for ConfigNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigNode")
            .field("path", &self.path())
            .field("value", &self.value())
            .field("children", &self.locate().map_or(0, |n| n.children.len()))
            .finish()
    }
}
