//! Merged configuration tree.
//!
//! Sources contribute flat `key:path = value` entries which are folded into a
//! single tree. Keys compare ASCII case-insensitively and children keep the
//! order in which their key was first seen.

use crate::source::{ConfigEntry, KEY_DELIMITER};

/// A node of the merged tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct TreeNode {
    pub(crate) key: String,
    pub(crate) value: Option<String>,
    pub(crate) children: Vec<TreeNode>,
}

impl TreeNode {
    /// Creates an empty, unnamed root.
    pub(crate) fn root() -> Self {
        Self::default()
    }

    fn named(key: &str) -> Self {
        Self {
            key: key.to_string(),
            value: None,
            children: Vec::new(),
        }
    }

    /// Finds a direct child by key.
    pub(crate) fn child(&self, key: &str) -> Option<&TreeNode> {
        self.children
            .iter()
            .find(|c| c.key.eq_ignore_ascii_case(key))
    }

    fn child_or_insert(&mut self, key: &str) -> &mut TreeNode {
        let index = match self
            .children
            .iter()
            .position(|c| c.key.eq_ignore_ascii_case(key))
        {
            Some(index) => index,
            None => {
                self.children.push(TreeNode::named(key));
                self.children.len() - 1
            }
        };
        &mut self.children[index]
    }

    /// Walks down the tree following `segments`.
    pub(crate) fn descend<S: AsRef<str>>(&self, segments: &[S]) -> Option<&TreeNode> {
        segments
            .iter()
            .try_fold(self, |node, segment| node.child(segment.as_ref()))
    }

    /// Merges one entry into the tree. A later scalar overrides an earlier one;
    /// an entry without a value only makes sure the section exists.
    pub(crate) fn merge(&mut self, entry: &ConfigEntry) {
        let mut node = self;
        for segment in entry.path.split(KEY_DELIMITER) {
            node = node.child_or_insert(segment);
        }
        if let Some(value) = &entry.value {
            node.value = Some(value.clone());
        }
    }

    /// Builds a tree from entries in source order.
    pub(crate) fn from_entries<'a>(entries: impl IntoIterator<Item = &'a ConfigEntry>) -> Self {
        let mut root = TreeNode::root();
        for entry in entries {
            if !entry.path.is_empty() {
                root.merge(entry);
            }
        }
        root
    }
}
