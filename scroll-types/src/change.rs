//! Changes delivered by a standing subscription.

use serde::{Deserialize, Serialize};

use crate::{Entry, Key};

/// A change observed on the remote collection.
///
/// Only [`ChangeEvent::Added`] grows the window. The other kinds describe
/// in-place updates, removals and reorders, which the window does not track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeEvent {
    /// An entry became known at or after the subscription anchor.
    Added(Entry),
    /// The value of an existing entry changed.
    Changed(Entry),
    /// An entry was removed.
    Removed {
        /// Key of the removed entry.
        key: Key,
    },
    /// An entry moved to a different position.
    Moved(Entry),
}

impl ChangeEvent {
    /// The key this change refers to.
    pub fn key(&self) -> &Key {
        match self {
            ChangeEvent::Added(entry) | ChangeEvent::Changed(entry) | ChangeEvent::Moved(entry) => {
                &entry.key
            }
            ChangeEvent::Removed { key } => key,
        }
    }

    /// Short name of the change kind, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ChangeEvent::Added(_) => "added",
            ChangeEvent::Changed(_) => "changed",
            ChangeEvent::Removed { .. } => "removed",
            ChangeEvent::Moved(_) => "moved",
        }
    }
}
