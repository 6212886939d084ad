//! Internal node implementation for the prefix tree.
//!
//! This module contains the `TrieNode` structure that forms the backbone of
//! the prefix tree. Every node exclusively owns its children, so the tree is
//! a plain ownership hierarchy with no sharing or back-references. All the
//! algorithms here consume one byte of the key per level of recursion.
//!
//! Key length validation is done once by [`PrefixTree`] before any node is
//! visited, so the recursive functions in this module are infallible.
//!
//! [`PrefixTree`]: crate::PrefixTree

use std::collections::HashMap;

/// A single node of the prefix tree.
///
/// The keys stored in the subtree rooted at a node are the empty key (if the
/// node is terminal) plus, for every child, each of the child's keys with the
/// edge byte in front.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrieNode {
    /// Child nodes indexed by the byte on the edge leading to them
    pub(crate) children: HashMap<u8, TrieNode>,

    /// Whether a complete key ends at this node
    pub(crate) terminal: bool,
}

impl TrieNode {
    /// Creates a new empty, non-terminal node
    pub fn new() -> Self {
        TrieNode {
            children: HashMap::new(),
            terminal: false,
        }
    }

    /// Returns whether a key ends at this node
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Returns the child reached through `byte`, if any
    pub fn child(&self, byte: u8) -> Option<&TrieNode> {
        self.children.get(&byte)
    }

    /// Returns an iterator over the `(edge byte, child)` pairs of this node.
    /// Order is unspecified.
    pub fn children(&self) -> impl Iterator<Item = (u8, &TrieNode)> {
        self.children.iter().map(|(byte, child)| (*byte, child))
    }

    /// Returns whether this node has no children and is not terminal.
    ///
    /// Such a node contributes nothing to the tree and is pruned by `remove`.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && !self.terminal
    }

    /// Marks `key` as present below this node, allocating missing nodes
    /// along the way. Returns whether the tree changed.
    pub(crate) fn add(&mut self, key: &[u8]) -> bool {
        match key.split_first() {
            None => {
                let changed = !self.terminal;
                self.terminal = true;
                changed
            }
            Some((first, rest)) => self.children.entry(*first).or_default().add(rest),
        }
    }

    /// Unmarks `key` below this node. Children whose subtree becomes empty
    /// are detached on the way back up. Returns whether the tree changed.
    pub(crate) fn remove(&mut self, key: &[u8]) -> bool {
        let (first, rest) = match key.split_first() {
            Some(split) => split,
            None => {
                let changed = self.terminal;
                self.terminal = false;
                return changed;
            }
        };

        let child = match self.children.get_mut(first) {
            Some(child) => child,
            None => return false,
        };

        let changed = child.remove(rest);
        if changed && child.is_empty() {
            self.children.remove(first);
        }
        changed
    }

    /// Returns whether `key` is stored below this node
    pub(crate) fn has(&self, key: &[u8]) -> bool {
        match key.split_first() {
            None => self.terminal,
            Some((first, rest)) => match self.children.get(first) {
                Some(child) => child.has(rest),
                None => false,
            },
        }
    }

    /// Returns the node reached by following `path` from this node
    pub(crate) fn descend(&self, path: &[u8]) -> Option<&TrieNode> {
        match path.split_first() {
            None => Some(self),
            Some((first, rest)) => self.children.get(first)?.descend(rest),
        }
    }

    /// Returns every suffix `s` such that `prefix + s` is stored below this
    /// node.
    pub(crate) fn completions(&self, prefix: &[u8]) -> Vec<Vec<u8>> {
        match self.descend(prefix) {
            Some(node) => node.keys(),
            None => Vec::new(),
        }
    }

    /// Returns every stored key below this node that starts with `prefix`.
    ///
    /// Each level of the recursion puts the byte it consumed back in front of
    /// the keys returned by the level below.
    pub(crate) fn matches(&self, prefix: &[u8]) -> Vec<Vec<u8>> {
        let (first, rest) = match prefix.split_first() {
            Some(split) => split,
            None => return self.keys(),
        };

        match self.children.get(first) {
            Some(child) => child
                .matches(rest)
                .into_iter()
                .map(|key| prepend(*first, key))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Returns the number of keys stored in this subtree
    pub fn subtree_size(&self) -> usize {
        let mut count = if self.terminal { 1 } else { 0 };

        for child in self.children.values() {
            count += child.subtree_size();
        }

        count
    }

    /// Returns every key stored in this subtree, relative to this node
    pub(crate) fn keys(&self) -> Vec<Vec<u8>> {
        let mut keys = Vec::new();
        if self.terminal {
            keys.push(Vec::new());
        }

        for (byte, child) in &self.children {
            keys.extend(child.keys().into_iter().map(|key| prepend(*byte, key)));
        }

        keys
    }

    /// Clears the terminal flag and drops every child subtree
    pub(crate) fn reset(&mut self) {
        self.terminal = false;
        self.children.clear();
    }
}

fn prepend(byte: u8, rest: Vec<u8>) -> Vec<u8> {
    let mut key = Vec::with_capacity(rest.len() + 1);
    key.push(byte);
    key.extend_from_slice(&rest);
    key
}
