//! # Prefix Trie
//!
//! A byte-keyed prefix tree with completion lookup, plus a small TCP service
//! that fronts one shared tree.
//!
//! Keys are arbitrary byte sequences (anything implementing `AsRef<[u8]>`)
//! shorter than [`MAX_KEY_LENGTH`] bytes. Each level of the tree consumes one
//! byte, and every node owns its children outright.
//!
//! ## Features
//!
//! - **Mutable API**: `add`, `remove` and `reset` report whether the tree changed
//! - **Completion lookup**: find every stored continuation of a prefix
//! - **Prefix Views**: borrow the subtree below a prefix and iterate it lazily
//! - **Service**: a framed TCP protocol with a matching async client
//!
//! ## Example
//!
//! ```rust
//! use prefix_trie::PrefixTree;
//!
//! let mut tree = PrefixTree::new();
//! assert_eq!(tree.add("foo"), Ok(true));
//! assert_eq!(tree.add("fo"), Ok(true));
//! assert_eq!(tree.add("bar"), Ok(true));
//!
//! assert_eq!(tree.size(), 3);
//! assert_eq!(tree.has("fo"), Ok(true));
//!
//! let mut completions = tree.completions("fo").unwrap();
//! completions.sort();
//! assert_eq!(completions, vec![b"".to_vec(), b"o".to_vec()]);
//! ```

pub mod client;
pub mod codec;
pub mod config;
mod display;
pub mod node;
mod prefix_view;
pub mod protocol;
pub mod script;
pub mod server;
mod trie;
mod util;

// Re-export public types
pub use crate::client::{Client, ClientError};
pub use crate::config::{Config, ConfigError};
pub use crate::node::TrieNode;
pub use crate::prefix_view::{PrefixView, PrefixViewIter};
pub use crate::server::Server;
pub use crate::trie::PrefixTree;
pub use crate::util::MAX_KEY_LENGTH;

/// Errors that can occur in trie operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Key or prefix is `MAX_KEY_LENGTH` bytes or longer
    KeyTooLong {
        /// Length of the rejected input, in bytes
        len: usize,
    },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::KeyTooLong { len } => write!(
                f,
                "key is too long ({} bytes, must be under {})",
                len, MAX_KEY_LENGTH
            ),
        }
    }
}

impl std::error::Error for Error {}
