//! Ordering key for the remote collection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The totally-ordered key that sequences and pages the remote collection.
///
/// Keys compare lexicographically, the way push-style generated ids sort.
/// Numeric sequences must therefore be zero-padded to keep their order.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key(String);

impl Key {
    /// Create a key from anything string-like.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Build a zero-padded key for sequence number `n`.
    ///
    /// `Key::sequence(2) < Key::sequence(10)` holds, unlike plain decimal strings.
    pub fn sequence(n: u64) -> Self {
        Self(format!("{:012}", n))
    }

    /// Get the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the key is the empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Key {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for Key {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self.0)
    }
}
