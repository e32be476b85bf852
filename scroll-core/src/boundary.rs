//! Paging and subscription boundaries.
//!
//! Ordered stores page by "count from an edge" plus an inclusive bound, not
//! by offset. Both edges of the window are therefore re-requested inclusively
//! and the entry already held at that edge is recognised by key equality:
//! - [`PageRequest`] asks for one extra entry at or before the oldest key
//! - [`Anchor`] subscribes from the newest key, which is re-delivered once
//!
//! The key to discard travels inside a [`Boundary`] captured when the request
//! is built, so a result is always judged against the edge it was asked for.

use scroll_types::Key;

use crate::Window;

/// The edge key a response may re-deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Boundary {
    /// The window was empty; nothing can be re-delivered.
    Open,
    /// Entries with this key are already held.
    Inclusive(Key),
}

impl Boundary {
    /// The bounding key, if any.
    pub fn key(&self) -> Option<&Key> {
        match self {
            Boundary::Open => None,
            Boundary::Inclusive(key) => Some(key),
        }
    }

    /// Whether `key` is the re-delivered boundary entry.
    pub fn is_echo(&self, key: &Key) -> bool {
        self.key() == Some(key)
    }
}

/// A backward page request against the current window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// How many older entries the caller asked for.
    pub count: usize,
    /// How many entries to read from the store (count, plus one for the boundary).
    pub limit: usize,
    /// Upper bound of the read and the key to drop from its result.
    pub boundary: Boundary,
}

impl PageRequest {
    /// Build the request for `count` entries older than everything in `window`.
    pub fn older_than(window: &Window, count: usize) -> Self {
        match window.oldest_key() {
            None => Self {
                count,
                limit: count,
                boundary: Boundary::Open,
            },
            Some(oldest) => Self {
                count,
                limit: count.saturating_add(1),
                boundary: Boundary::Inclusive(oldest.clone()),
            },
        }
    }

    /// Inclusive upper bound for the range read.
    pub fn upper_bound(&self) -> Option<&Key> {
        self.boundary.key()
    }
}

/// Where the live subscription listens from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    boundary: Boundary,
}

impl Anchor {
    /// Anchor at the live edge of `window`: its newest key, or everything if empty.
    pub fn for_window(window: &Window) -> Self {
        let boundary = match window.newest_key() {
            None => Boundary::Open,
            Some(newest) => Boundary::Inclusive(newest.clone()),
        };
        Self { boundary }
    }

    /// Inclusive lower bound for the subscription.
    pub fn lower_bound(&self) -> Option<&Key> {
        self.boundary.key()
    }

    /// Whether `key` is the anchor entry the subscription re-sends on install.
    pub fn is_echo(&self, key: &Key) -> bool {
        self.boundary.is_echo(key)
    }
}
