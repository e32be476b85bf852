//! Entry - one item of the remote collection as observed locally.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::{EntryError, Key};

/// An ordering key plus an opaque value payload.
///
/// Entries are immutable once held. The value is never interpreted by the
/// window; only the key takes part in ordering and de-duplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Ordering key.
    pub key: Key,
    /// Opaque payload.
    pub value: serde_json::Value,
}

impl Entry {
    /// Create a new entry.
    pub fn new(key: impl Into<Key>, value: serde_json::Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    /// Create an entry with a null payload (handy when only ordering matters).
    pub fn bare(key: impl Into<Key>) -> Self {
        Self::new(key, serde_json::Value::Null)
    }
}

/// Decode a JSON array of `{"key": .., "value": ..}` objects.
///
/// Entries are returned in input order. Empty and repeated keys are rejected.
pub fn entries_from_json(json: &str) -> Result<Vec<Entry>, EntryError> {
    let entries: Vec<Entry> = serde_json::from_str(json).map_err(EntryError::Json)?;

    let mut seen = BTreeSet::new();
    for (position, entry) in entries.iter().enumerate() {
        if entry.key.is_empty() {
            return Err(EntryError::EmptyKey { position });
        }
        if !seen.insert(&entry.key) {
            return Err(EntryError::DuplicateKey {
                key: entry.key.to_string(),
            });
        }
    }

    Ok(entries)
}
