//! Messages exchanged between [`Client`] and [`Server`].
//!
//! Each [`Request`] is answered by the [`Response`] variant of the same name,
//! or by [`Response::Error`] when the tree rejects the request or the reply
//! would not fit in a frame.
//!
//! [`Client`]: crate::Client
//! [`Server`]: crate::Server

use serde::{Deserialize, Serialize};

/// Client sends Request to Server
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub enum Request {
    /// Add a key to the tree
    Insert(Vec<u8>),

    /// Remove a key from the tree
    Delete(Vec<u8>),

    /// Check whether a key is stored
    Exists(Vec<u8>),

    /// List every stored key starting with the given prefix
    Complete(Vec<u8>),

    /// List every stored key
    Keys,

    /// Count the stored keys
    Size,

    /// Remove every key
    Reset,
}

/// Server sends Response to Client
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub enum Response {
    /// Whether the insert changed the tree
    Insert(bool),

    /// Whether the delete changed the tree
    Delete(bool),

    /// Whether the key is stored
    Exists(bool),

    /// Full keys starting with the requested prefix, in no particular order
    Complete(Vec<Vec<u8>>),

    /// All stored keys, in no particular order
    Keys(Vec<Vec<u8>>),

    /// Number of stored keys
    Size(u64),

    /// Whether the reset succeeded
    Reset(bool),

    /// The request was rejected. The connection stays usable
    Error(String),
}
