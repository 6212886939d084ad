//! The main prefix tree implementation.
//!
//! This module contains the `PrefixTree` type, which provides the primary API
//! for working with the tree. It validates every key once and then hands the
//! raw bytes to the recursive algorithms on [`TrieNode`].

use log::{debug, trace};

use crate::node::TrieNode;
use crate::prefix_view::PrefixView;
use crate::util::check_key;
use crate::Error;

/// A mutable prefix tree over byte keys.
///
/// The tree has no internal synchronization. Callers that share one tree
/// between tasks must serialize access themselves, which is what
/// [`Server`](crate::Server) does with a single mutex.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixTree {
    /// The root node of the tree
    pub(crate) root: TrieNode,
}

impl PrefixTree {
    /// Creates a new, empty tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use prefix_trie::PrefixTree;
    ///
    /// let tree = PrefixTree::new();
    /// assert!(tree.is_empty());
    /// assert_eq!(tree.size(), 0);
    /// ```
    pub fn new() -> Self {
        PrefixTree {
            root: TrieNode::new(),
        }
    }

    /// Returns the root node
    pub fn root(&self) -> &TrieNode {
        &self.root
    }

    /// Inserts a key, returning whether the tree changed.
    ///
    /// Adding a key that is already present returns `Ok(false)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use prefix_trie::PrefixTree;
    ///
    /// let mut tree = PrefixTree::new();
    /// assert_eq!(tree.add("hello"), Ok(true));
    /// assert_eq!(tree.add("hello"), Ok(false));
    /// ```
    pub fn add<K: AsRef<[u8]>>(&mut self, key: K) -> Result<bool, Error> {
        let key = check_key(key.as_ref())?;
        let changed = self.root.add(key);
        if changed {
            trace!("added key of {} bytes", key.len());
        }
        Ok(changed)
    }

    /// Removes a key, returning whether the tree changed.
    ///
    /// Removing a key that is not present is not an error and returns
    /// `Ok(false)`. Nodes left without keys below them are freed.
    ///
    /// # Examples
    ///
    /// ```
    /// use prefix_trie::PrefixTree;
    ///
    /// let mut tree = PrefixTree::new();
    /// tree.add("hello").unwrap();
    ///
    /// assert_eq!(tree.remove("hello"), Ok(true));
    /// assert_eq!(tree.remove("hello"), Ok(false));
    /// assert!(tree.is_empty());
    /// ```
    pub fn remove<K: AsRef<[u8]>>(&mut self, key: K) -> Result<bool, Error> {
        let key = check_key(key.as_ref())?;
        let changed = self.root.remove(key);
        if changed {
            trace!("removed key of {} bytes", key.len());
        }
        Ok(changed)
    }

    /// Returns whether the key is stored in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use prefix_trie::PrefixTree;
    ///
    /// let mut tree = PrefixTree::new();
    /// tree.add("hello").unwrap();
    ///
    /// assert_eq!(tree.has("hello"), Ok(true));
    /// assert_eq!(tree.has("hell"), Ok(false));
    /// ```
    pub fn has<K: AsRef<[u8]>>(&self, key: K) -> Result<bool, Error> {
        let key = check_key(key.as_ref())?;
        Ok(self.root.has(key))
    }

    /// Returns every suffix that completes `prefix` to a stored key.
    ///
    /// If `prefix` itself is stored, the empty suffix is included. An
    /// unmatched prefix yields an empty vector. Order is unspecified.
    ///
    /// # Examples
    ///
    /// ```
    /// use prefix_trie::PrefixTree;
    ///
    /// let mut tree = PrefixTree::new();
    /// tree.add("bar").unwrap();
    ///
    /// assert_eq!(tree.completions("ba"), Ok(vec![b"r".to_vec()]));
    /// assert_eq!(tree.completions("xy"), Ok(vec![]));
    /// ```
    pub fn completions<K: AsRef<[u8]>>(&self, prefix: K) -> Result<Vec<Vec<u8>>, Error> {
        let prefix = check_key(prefix.as_ref())?;
        Ok(self.root.completions(prefix))
    }

    /// Returns every stored key that starts with `prefix`, prefix included.
    ///
    /// # Examples
    ///
    /// ```
    /// use prefix_trie::PrefixTree;
    ///
    /// let mut tree = PrefixTree::new();
    /// tree.add("bar").unwrap();
    ///
    /// assert_eq!(tree.matches("ba"), Ok(vec![b"bar".to_vec()]));
    /// ```
    pub fn matches<K: AsRef<[u8]>>(&self, prefix: K) -> Result<Vec<Vec<u8>>, Error> {
        let prefix = check_key(prefix.as_ref())?;
        Ok(self.root.matches(prefix))
    }

    /// Returns the number of keys in the tree.
    ///
    /// This walks the whole tree on every call.
    pub fn size(&self) -> usize {
        self.root.subtree_size()
    }

    /// Returns every key in the tree, in unspecified order.
    pub fn keys(&self) -> Vec<Vec<u8>> {
        self.root.keys()
    }

    /// Removes every key from the tree. Always returns `true`.
    pub fn reset(&mut self) -> bool {
        self.root.reset();
        debug!("tree reset");
        true
    }

    /// Returns `true` if the tree contains no keys.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Creates a borrowed view of the subtree below `prefix`.
    ///
    /// # Examples
    ///
    /// ```
    /// use prefix_trie::PrefixTree;
    ///
    /// let mut tree = PrefixTree::new();
    /// tree.add("hello").unwrap();
    /// tree.add("help").unwrap();
    ///
    /// let view = tree.view("hel").unwrap();
    /// assert!(view.exists());
    /// assert_eq!(view.len(), 2);
    /// ```
    pub fn view<K: AsRef<[u8]>>(&self, prefix: K) -> Result<PrefixView<'_>, Error> {
        let prefix = check_key(prefix.as_ref())?;
        Ok(PrefixView::new(self, prefix))
    }
}

impl<K: AsRef<[u8]>> Extend<K> for PrefixTree {
    /// Adds every key from the iterator, skipping keys that are too long.
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            if let Err(err) = self.add(key) {
                debug!("skipping key: {}", err);
            }
        }
    }
}

impl<K: AsRef<[u8]>> FromIterator<K> for PrefixTree {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = PrefixTree::new();
        tree.extend(iter);
        tree
    }
}
