//! Remote store abstraction for backscroll.
//!
//! This module provides the seam the window is built against: an ordered
//! remote collection that can answer ranged reads and stream additions.
//! Nothing here prescribes a wire format or a backend.
//!
//! # Design
//!
//! The store trait is async and subscription-oriented:
//! - `range_query()` returns the last `limit` entries up to an inclusive bound
//! - `subscribe_additions()` installs a standing subscription from a lower bound
//! - `cancel()` tears a subscription down
//!
//! # Example
//!
//! ```ignore
//! let store = MemoryStore::new();
//! store.insert(Entry::bare("k1"));
//! let page = store.range_query(RangeQuery::last(10)).await?;
//! let mut subscription = store.subscribe_additions(Some(Key::from("k1"))).await?;
//! let first = subscription.events.recv().await;
//! ```

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use scroll_core::PageRequest;
use scroll_types::{ChangeEvent, Entry, Key};
use std::fmt;
use thiserror::Error;
use tokio::sync::mpsc;

/// Remote store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A ranged read failed.
    #[error("range query failed: {0}")]
    QueryFailed(String),

    /// Installing a subscription failed.
    #[error("subscribe failed: {0}")]
    SubscribeFailed(String),

    /// An installed subscription reported an error.
    #[error("subscription stream failed: {0}")]
    StreamFailed(String),

    /// An installed subscription ended without being cancelled.
    #[error("subscription stream closed")]
    StreamClosed,

    /// The subscription id is not (or no longer) installed.
    #[error("unknown subscription: {0}")]
    UnknownSubscription(SubscriptionId),
}

/// A ranged read, ascending by key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeQuery {
    /// Return at most this many entries, counted from the upper end.
    pub limit: usize,
    /// Inclusive upper bound; `None` reads up to the newest entry.
    pub upper_bound: Option<Key>,
}

impl RangeQuery {
    /// The newest `limit` entries.
    pub fn last(limit: usize) -> Self {
        Self {
            limit,
            upper_bound: None,
        }
    }

    /// The newest `limit` entries with key <= `upper_bound`.
    pub fn last_up_to(limit: usize, upper_bound: Key) -> Self {
        Self {
            limit,
            upper_bound: Some(upper_bound),
        }
    }
}

impl From<&PageRequest> for RangeQuery {
    fn from(request: &PageRequest) -> Self {
        Self {
            limit: request.limit,
            upper_bound: request.upper_bound().cloned(),
        }
    }
}

/// Identifier of an installed subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Create an id from its numeric value.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the numeric value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Item type carried by a subscription stream.
pub type ChangeResult = Result<ChangeEvent, StoreError>;

/// An installed standing subscription.
///
/// `events` first yields every existing entry at or after the lower bound
/// (including the bound itself), then every later change. The stream ends
/// when the subscription is cancelled.
#[derive(Debug)]
pub struct Subscription {
    /// Handle used to cancel the subscription.
    pub id: SubscriptionId,
    /// Delivered changes.
    pub events: mpsc::UnboundedReceiver<ChangeResult>,
}

/// Ordered remote collection consumed by the window.
///
/// Implementations must deliver additions ascending by key.
#[async_trait]
pub trait RemoteStore: Send + Sync + 'static {
    /// Read the last `query.limit` entries with key <= `query.upper_bound`,
    /// ascending.
    async fn range_query(&self, query: RangeQuery) -> Result<Vec<Entry>, StoreError>;

    /// Install a standing subscription delivering entries with key >=
    /// `lower_bound` (everything when `None`).
    async fn subscribe_additions(
        &self,
        lower_bound: Option<Key>,
    ) -> Result<Subscription, StoreError>;

    /// Tear down a subscription. Its stream ends.
    async fn cancel(&self, id: SubscriptionId) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use scroll_core::Window;

    #[test]
    fn range_query_from_first_page_request() {
        let request = PageRequest::older_than(&Window::new(), 30);
        assert_eq!(RangeQuery::from(&request), RangeQuery::last(30));
    }

    #[test]
    fn range_query_from_later_page_request() {
        let mut window = Window::new();
        window.append(Entry::bare("k08"));
        let request = PageRequest::older_than(&window, 3);

        assert_eq!(
            RangeQuery::from(&request),
            RangeQuery::last_up_to(4, Key::from("k08"))
        );
    }

    #[test]
    fn subscription_id_display() {
        assert_eq!(SubscriptionId::new(7).to_string(), "sub-7");
        assert_eq!(SubscriptionId::new(7).value(), 7);
    }

    #[test]
    fn store_error_display() {
        let err = StoreError::QueryFailed("timeout".into());
        assert_eq!(err.to_string(), "range query failed: timeout");

        let err = StoreError::UnknownSubscription(SubscriptionId::new(3));
        assert_eq!(err.to_string(), "unknown subscription: sub-3");

        assert_eq!(StoreError::StreamClosed.to_string(), "subscription stream closed");
    }
}
