//! Prefix view into a prefix tree.
//!
//! This module provides the `PrefixView` type, a borrowed window onto the
//! subtree below a key prefix. Unlike [`PrefixTree::completions`], which
//! collects everything up front, a view can be iterated lazily.

use std::collections::VecDeque;
use std::fmt;

use crate::node::TrieNode;
use crate::PrefixTree;

/// A lightweight view into the subtree below a key prefix.
///
/// # Examples
///
/// ```
/// use prefix_trie::PrefixTree;
///
/// let mut tree = PrefixTree::new();
/// tree.add("hello").unwrap();
/// tree.add("help").unwrap();
/// tree.add("world").unwrap();
///
/// let view = tree.view("hel").unwrap();
/// assert!(view.contains_key("hello"));
/// assert!(!view.contains_key("world"));
///
/// let keys: Vec<Vec<u8>> = view.iter().collect();
/// assert_eq!(keys, vec![b"hello".to_vec(), b"help".to_vec()]);
/// ```
#[derive(Clone)]
pub struct PrefixView<'a> {
    /// The source tree for this view
    tree: &'a PrefixTree,

    /// The key prefix defining this view
    prefix: Vec<u8>,

    /// The node at the end of the prefix, if the prefix exists
    subtrie_node: Option<&'a TrieNode>,
}

/// An iterator over the keys of a PrefixView.
///
/// Performs a depth-first traversal, visiting children in ascending byte
/// order, so keys come out in lexicographic order. Each yielded key includes
/// the view's prefix.
pub struct PrefixViewIter<'a> {
    /// Nodes still to visit, with the full key leading to each
    stack: VecDeque<(&'a TrieNode, Vec<u8>)>,
}

impl<'a> PrefixView<'a> {
    /// Creates a new view. The prefix must already be length checked.
    pub(crate) fn new(tree: &'a PrefixTree, prefix: &[u8]) -> Self {
        PrefixView {
            tree,
            prefix: prefix.to_vec(),
            subtrie_node: tree.root.descend(prefix),
        }
    }

    /// Returns the key prefix for this view.
    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    /// Returns the underlying tree.
    pub fn tree(&self) -> &'a PrefixTree {
        self.tree
    }

    /// Returns whether any node exists at the prefix.
    ///
    /// Because empty nodes are pruned, this is true exactly when at least one
    /// stored key starts with the prefix.
    pub fn exists(&self) -> bool {
        self.subtrie_node.is_some()
    }

    /// Returns the number of keys in this view.
    pub fn len(&self) -> usize {
        self.subtrie_node.map_or(0, TrieNode::subtree_size)
    }

    /// Returns whether this view contains no keys.
    pub fn is_empty(&self) -> bool {
        self.subtrie_node.map_or(true, TrieNode::is_empty)
    }

    /// Checks if the view contains a full key.
    ///
    /// Only returns true if the key starts with the prefix and is stored.
    pub fn contains_key<K: AsRef<[u8]>>(&self, key: K) -> bool {
        let key = key.as_ref();
        match (key.strip_prefix(self.prefix.as_slice()), self.subtrie_node) {
            (Some(rest), Some(node)) => node.has(rest),
            _ => false,
        }
    }

    /// Returns the suffixes completing the prefix, in unspecified order.
    pub fn completions(&self) -> Vec<Vec<u8>> {
        self.subtrie_node.map_or_else(Vec::new, TrieNode::keys)
    }

    /// Returns an iterator over the full keys in this view, in lexicographic
    /// order.
    pub fn iter(&self) -> PrefixViewIter<'a> {
        let mut stack = VecDeque::new();
        if let Some(node) = self.subtrie_node {
            stack.push_back((node, self.prefix.clone()));
        }
        PrefixViewIter { stack }
    }
}

impl<'a> Iterator for PrefixViewIter<'a> {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((node, path)) = self.stack.pop_back() {
            // Push children in descending byte order so the smallest pops first
            let mut children: Vec<(u8, &'a TrieNode)> = node.children().collect();
            children.sort_unstable_by(|a, b| b.0.cmp(&a.0));

            for (byte, child) in children {
                let mut child_path = path.clone();
                child_path.push(byte);
                self.stack.push_back((child, child_path));
            }

            if node.is_terminal() {
                return Some(path);
            }
        }
        None
    }
}

impl<'a> IntoIterator for &PrefixView<'a> {
    type Item = Vec<u8>;
    type IntoIter = PrefixViewIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Two views are equal when their subtrees hold the same suffixes, whatever
/// their prefixes are.
impl PartialEq for PrefixView<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self.subtrie_node, other.subtrie_node) {
            (Some(a), Some(b)) => std::ptr::eq(a, b) || a == b,
            (None, None) => true,
            _ => false,
        }
    }
}

impl Eq for PrefixView<'_> {}

impl fmt::Debug for PrefixView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrefixView")
            .field("prefix", &String::from_utf8_lossy(&self.prefix))
            .field("len", &self.len())
            .finish()
    }
}
