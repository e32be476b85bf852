//! In-memory remote store.
//!
//! Backs the demo binary and the tests. Allows writing entries, injecting
//! failures, holding range reads back and inspecting what the window asked for.

use super::{ChangeResult, RangeQuery, RemoteStore, StoreError, Subscription, SubscriptionId};
use async_trait::async_trait;
use scroll_types::{ChangeEvent, Entry, Key};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, watch};

/// In-memory ordered store.
///
/// Clones share state, so a test can keep one handle while the window owns
/// another.
#[derive(Debug)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryStoreInner>>,
    gate: Arc<watch::Sender<bool>>,
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    entries: BTreeMap<Key, serde_json::Value>,
    subscriptions: HashMap<SubscriptionId, Listener>,
    next_subscription: u64,
    queries: Vec<RangeQuery>,
    subscribe_calls: usize,
    cancel_calls: usize,
    fail_next_query: Option<String>,
    fail_next_subscribe: Option<String>,
}

#[derive(Debug)]
struct Listener {
    lower_bound: Option<Key>,
    sender: mpsc::UnboundedSender<ChangeResult>,
}

impl Listener {
    fn covers(&self, key: &Key) -> bool {
        self.lower_bound.as_ref().map_or(true, |bound| key >= bound)
    }
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        let (gate, _) = watch::channel(false);
        Self {
            inner: Arc::new(Mutex::new(MemoryStoreInner::default())),
            gate: Arc::new(gate),
        }
    }

    /// Create a store holding `entries`.
    pub fn with_entries(entries: impl IntoIterator<Item = Entry>) -> Self {
        let store = Self::new();
        {
            let mut inner = store.inner.lock().unwrap();
            for entry in entries {
                inner.entries.insert(entry.key, entry.value);
            }
        }
        store
    }

    /// Add an entry and deliver it to every subscription covering its key.
    ///
    /// Writing an existing key replaces its value and is delivered as
    /// [`ChangeEvent::Changed`] instead.
    pub fn insert(&self, entry: Entry) {
        let mut inner = self.inner.lock().unwrap();
        let previous = inner.entries.insert(entry.key.clone(), entry.value.clone());
        let event = match previous {
            Some(_) => ChangeEvent::Changed(entry),
            None => ChangeEvent::Added(entry),
        };
        inner.broadcast(event);
    }

    /// Remove an entry, delivering [`ChangeEvent::Removed`] if it existed.
    pub fn remove(&self, key: &Key) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if inner.entries.remove(key).is_none() {
            return false;
        }
        inner.broadcast(ChangeEvent::Removed { key: key.clone() });
        true
    }

    /// Deliver an arbitrary change to every subscription covering its key,
    /// without touching stored entries.
    pub fn emit(&self, event: ChangeEvent) {
        let inner = self.inner.lock().unwrap();
        inner.broadcast(event);
    }

    /// Deliver a stream error to every active subscription.
    pub fn fail_subscriptions(&self, error: &str) {
        let inner = self.inner.lock().unwrap();
        for listener in inner.subscriptions.values() {
            let _ = listener
                .sender
                .send(Err(StoreError::StreamFailed(error.to_string())));
        }
    }

    /// Cause the next range_query() to fail with the given error.
    pub fn fail_next_query(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_query = Some(error.to_string());
    }

    /// Cause the next subscribe_additions() to fail with the given error.
    pub fn fail_next_subscribe(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_subscribe = Some(error.to_string());
    }

    /// Hold every range_query() until [`MemoryStore::resume_queries`].
    pub fn pause_queries(&self) {
        self.gate.send_replace(true);
    }

    /// Release held range reads.
    pub fn resume_queries(&self) {
        self.gate.send_replace(false);
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All range reads received so far.
    pub fn queries(&self) -> Vec<RangeQuery> {
        self.inner.lock().unwrap().queries.clone()
    }

    /// Number of subscriptions currently installed.
    pub fn active_subscriptions(&self) -> usize {
        self.inner.lock().unwrap().subscriptions.len()
    }

    /// Lower bounds of the installed subscriptions, ordered by install time.
    pub fn subscription_bounds(&self) -> Vec<Option<Key>> {
        let inner = self.inner.lock().unwrap();
        let mut installed: Vec<_> = inner.subscriptions.iter().collect();
        installed.sort_by_key(|(id, _)| **id);
        installed
            .into_iter()
            .map(|(_, listener)| listener.lower_bound.clone())
            .collect()
    }

    /// Number of subscribe_additions() calls so far.
    pub fn subscribe_calls(&self) -> usize {
        self.inner.lock().unwrap().subscribe_calls
    }

    /// Number of cancel() calls so far.
    pub fn cancel_calls(&self) -> usize {
        self.inner.lock().unwrap().cancel_calls
    }
}

impl MemoryStoreInner {
    fn broadcast(&self, event: ChangeEvent) {
        for listener in self.subscriptions.values() {
            if listener.covers(event.key()) {
                let _ = listener.sender.send(Ok(event.clone()));
            }
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MemoryStore {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            gate: Arc::clone(&self.gate),
        }
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn range_query(&self, query: RangeQuery) -> Result<Vec<Entry>, StoreError> {
        let mut gate = self.gate.subscribe();
        let _ = gate.wait_for(|paused| !*paused).await.map(|_| ());

        let mut inner = self.inner.lock().unwrap();
        inner.queries.push(query.clone());

        // Check for forced failure
        if let Some(error) = inner.fail_next_query.take() {
            return Err(StoreError::QueryFailed(error));
        }

        let mut page: Vec<Entry> = inner
            .entries
            .iter()
            .rev()
            .filter(|(key, _)| query.upper_bound.as_ref().map_or(true, |bound| *key <= bound))
            .take(query.limit)
            .map(|(key, value)| Entry::new(key.clone(), value.clone()))
            .collect();
        page.reverse();
        Ok(page)
    }

    async fn subscribe_additions(
        &self,
        lower_bound: Option<Key>,
    ) -> Result<Subscription, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.subscribe_calls += 1;

        // Check for forced failure
        if let Some(error) = inner.fail_next_subscribe.take() {
            return Err(StoreError::SubscribeFailed(error));
        }

        inner.next_subscription += 1;
        let id = SubscriptionId::new(inner.next_subscription);
        let (sender, events) = mpsc::unbounded_channel();
        let listener = Listener {
            lower_bound,
            sender,
        };

        // Existing entries at or after the bound are delivered first
        for (key, value) in &inner.entries {
            if listener.covers(key) {
                let entry = Entry::new(key.clone(), value.clone());
                let _ = listener.sender.send(Ok(ChangeEvent::Added(entry)));
            }
        }

        inner.subscriptions.insert(id, listener);
        Ok(Subscription { id, events })
    }

    async fn cancel(&self, id: SubscriptionId) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.cancel_calls += 1;
        inner
            .subscriptions
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::UnknownSubscription(id))
    }
}
