//! WindowStore - the main interface for backscroll.
//!
//! This module provides [`WindowStore`], a bounded, ordered, in-memory mirror
//! of an unbounded key-ordered remote collection. It pages backward into
//! history on demand and follows new entries at the live edge.
//!
//! # Architecture
//!
//! WindowStore uses the pure window and load state machine from scroll-core
//! and interprets their actions to perform actual I/O via the RemoteStore trait.
//!
//! ```text
//! View ──load_older──▶ WindowStore ──range_query──────────▶ RemoteStore
//!   ▲                      │    ▲                               │
//!   └── WindowListener ◀───┘    └──── subscription events ◀─────┘
//!                          ↓
//!             scroll-core (window + state machine)
//! ```
//!
//! Every mutation of the window, the load state and the subscription handle
//! happens under one async mutex. Re-anchoring (teardown, recompute, install)
//! runs entirely inside that critical section, so at most one subscription
//! is live at any time.
//!
//! # Example
//!
//! ```ignore
//! use scroll_client::{MemoryStore, WindowConfig, WindowEvent, WindowStore};
//!
//! let (window, mut listener) = WindowStore::new(MemoryStore::new(), WindowConfig::default());
//! window.load_older(30).await?;
//!
//! while let Some(event) = listener.recv().await {
//!     match event {
//!         WindowEvent::OlderLoaded(loaded) => { /* insert at 0 */ }
//!         WindowEvent::NewerLoaded(loaded) => { /* insert at loaded.original_count */ }
//!         WindowEvent::Failed(error) => { /* surface */ }
//!     }
//! }
//! ```

use scroll_core::{
    Action, Anchor, Append, LoadEvent, LoadState, PageRequest, Rejection, ViewState, Window,
};
use scroll_types::{ChangeEvent, Entry, Key};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};

use crate::config::{UnhandledChanges, WindowConfig};
use crate::remote::{RangeQuery, RemoteStore, StoreError, Subscription, SubscriptionId};

/// Window errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    /// A backward range read failed.
    #[error("range query failed: {0}")]
    RangeQueryFailed(#[source] StoreError),

    /// Installing or running the live subscription failed.
    #[error("subscription failed: {0}")]
    SubscriptionFailed(#[source] StoreError),

    /// Positional read outside `[0, count)`.
    #[error("index {index} out of range for window of {count} entries")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Entries held at the time of the read.
        count: usize,
    },

    /// `load_older(0)`.
    #[error("load count must be at least 1")]
    InvalidCount,

    /// A backward load is already in flight.
    #[error("a backward load is already in flight")]
    LoadInProgress,

    /// The window was disposed.
    #[error("window disposed")]
    Disposed,

    /// The subscription delivered a change kind the window cannot apply.
    #[error("unsupported {kind} change for key {key}")]
    UnsupportedChange {
        /// Change kind (`changed`, `removed`, `moved`).
        kind: &'static str,
        /// Key the change refers to.
        key: Key,
    },
}

/// An insertion report: `inserted_count` entries were added at position
/// `0` (older) or `original_count` (newer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Loaded {
    /// Window size before the insert.
    pub original_count: usize,
    /// Entries actually inserted.
    pub inserted_count: usize,
}

/// A notification from any of the listener channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowEvent {
    /// Older entries were spliced at the front.
    OlderLoaded(Loaded),
    /// One newer entry was appended at the tail.
    NewerLoaded(Loaded),
    /// A remote operation failed.
    Failed(WindowError),
}

/// Receiving side of the window notifications, one channel per kind.
///
/// The channels are unbounded: notifications are kept until received, so a
/// listener that stops draining (or is kept around unread) grows without
/// limit. Drop the listener when its notifications are no longer wanted;
/// sends to a dropped listener are discarded.
#[derive(Debug)]
pub struct WindowListener {
    /// Older entries loaded.
    pub older: mpsc::UnboundedReceiver<Loaded>,
    /// Newer entries loaded.
    pub newer: mpsc::UnboundedReceiver<Loaded>,
    /// Remote failures.
    pub failed: mpsc::UnboundedReceiver<WindowError>,
}

impl WindowListener {
    /// Wait for the next notification of any kind.
    ///
    /// Older loads are preferred over newer ones, newer over failures, when
    /// several are ready. Returns `None` once the window is gone.
    pub async fn recv(&mut self) -> Option<WindowEvent> {
        tokio::select! {
            biased;
            Some(loaded) = self.older.recv() => Some(WindowEvent::OlderLoaded(loaded)),
            Some(loaded) = self.newer.recv() => Some(WindowEvent::NewerLoaded(loaded)),
            Some(error) = self.failed.recv() => Some(WindowEvent::Failed(error)),
            else => None,
        }
    }

    /// Take a ready notification without waiting.
    pub fn try_recv(&mut self) -> Option<WindowEvent> {
        if let Ok(loaded) = self.older.try_recv() {
            return Some(WindowEvent::OlderLoaded(loaded));
        }
        if let Ok(loaded) = self.newer.try_recv() {
            return Some(WindowEvent::NewerLoaded(loaded));
        }
        self.failed.try_recv().ok().map(WindowEvent::Failed)
    }
}

#[derive(Debug)]
struct Notifier {
    older: mpsc::UnboundedSender<Loaded>,
    newer: mpsc::UnboundedSender<Loaded>,
    failed: mpsc::UnboundedSender<WindowError>,
}

impl Notifier {
    fn older(&self, loaded: Loaded) {
        let _ = self.older.send(loaded);
    }

    fn newer(&self, loaded: Loaded) {
        let _ = self.newer.send(loaded);
    }

    fn failed(&self, error: WindowError) {
        let _ = self.failed.send(error);
    }
}

/// The installed live subscription.
#[derive(Debug)]
struct Follower {
    id: SubscriptionId,
    anchor: Anchor,
}

#[derive(Debug, Default)]
struct State {
    window: Window,
    load: LoadState,
    follower: Option<Follower>,
    /// Bumped on every teardown; deliveries from older generations are dropped.
    generation: u64,
    exhausted: bool,
}

impl State {
    fn apply(&mut self, event: LoadEvent) -> Vec<Action> {
        let (next, actions) = std::mem::take(&mut self.load).on_event(event);
        self.load = next;
        actions
    }
}

struct Inner<S> {
    remote: S,
    config: WindowConfig,
    state: Mutex<State>,
    notify: Notifier,
}

/// The window store.
///
/// Manages the ordered window, backward loads and the live subscription.
/// Must be used from within a tokio runtime; call [`WindowStore::dispose`]
/// to cancel the live subscription when done.
pub struct WindowStore<S: RemoteStore> {
    inner: Arc<Inner<S>>,
}

impl<S: RemoteStore> WindowStore<S> {
    /// Create an empty window over `remote` plus its listener.
    ///
    /// Nothing is read or subscribed until the first [`WindowStore::load_older`].
    pub fn new(remote: S, config: WindowConfig) -> (Self, WindowListener) {
        let (older_tx, older) = mpsc::unbounded_channel();
        let (newer_tx, newer) = mpsc::unbounded_channel();
        let (failed_tx, failed) = mpsc::unbounded_channel();

        let inner = Inner {
            remote,
            config,
            state: Mutex::new(State::default()),
            notify: Notifier {
                older: older_tx,
                newer: newer_tx,
                failed: failed_tx,
            },
        };
        let listener = WindowListener {
            older,
            newer,
            failed,
        };
        (
            Self {
                inner: Arc::new(inner),
            },
            listener,
        )
    }

    /// Number of held entries.
    pub async fn count(&self) -> usize {
        self.inner.state.lock().await.window.len()
    }

    /// Entry at `index`: 0 is the oldest held, `count() - 1` the newest.
    pub async fn get(&self, index: usize) -> Result<Entry, WindowError> {
        let state = self.inner.state.lock().await;
        state
            .window
            .get(index)
            .cloned()
            .ok_or(WindowError::IndexOutOfRange {
                index,
                count: state.window.len(),
            })
    }

    /// Snapshot of every held entry, oldest first.
    pub async fn entries(&self) -> Vec<Entry> {
        let state = self.inner.state.lock().await;
        state.window.iter().cloned().collect()
    }

    /// Check if a backward load is in flight.
    pub async fn is_loading(&self) -> bool {
        self.inner.state.lock().await.load.is_loading()
    }

    /// Whether older history may still exist.
    ///
    /// Turns false once a backward load returns fewer entries than requested.
    pub async fn has_more_history(&self) -> bool {
        !self.inner.state.lock().await.exhausted
    }

    /// Anchor of the installed live subscription, if any.
    pub async fn anchor(&self) -> Option<Anchor> {
        let state = self.inner.state.lock().await;
        state.follower.as_ref().map(|follower| follower.anchor.clone())
    }

    /// Check if the window was disposed.
    pub async fn is_disposed(&self) -> bool {
        self.inner.state.lock().await.load.is_disposed()
    }

    /// The configuration this window runs with.
    pub fn config(&self) -> &WindowConfig {
        &self.inner.config
    }

    /// Get a reference to the underlying remote store (for testing).
    pub fn remote(&self) -> &S {
        &self.inner.remote
    }

    /// Request `count` entries older than everything held.
    ///
    /// Returns once the read is issued; the result arrives on
    /// [`WindowListener::older`] (or [`WindowListener::failed`]). The first
    /// load into an empty window also starts the live follower.
    ///
    /// # Errors
    ///
    /// [`WindowError::InvalidCount`] for `count == 0`,
    /// [`WindowError::LoadInProgress`] while another load is in flight,
    /// [`WindowError::Disposed`] after [`WindowStore::dispose`].
    pub async fn load_older(&self, count: usize) -> Result<(), WindowError> {
        if count == 0 {
            return Err(WindowError::InvalidCount);
        }

        let request = {
            let mut state = self.inner.state.lock().await;
            let request = PageRequest::older_than(&state.window, count);
            match state
                .apply(LoadEvent::LoadRequested { request })
                .into_iter()
                .next()
            {
                Some(Action::IssueRangeQuery(request)) => request,
                Some(Action::Reject(Rejection::Disposed)) => return Err(WindowError::Disposed),
                _ => return Err(WindowError::LoadInProgress),
            }
        };

        tracing::debug!(
            count,
            limit = request.limit,
            boundary = ?request.boundary,
            "issuing backward range query"
        );
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.complete_load(request).await });
        Ok(())
    }

    /// Load older history if the view position calls for it.
    ///
    /// `first_visible` is the index of the first entry on screen. Returns
    /// whether a load was issued; an in-flight load is not an error here.
    pub async fn prefetch(&self, first_visible: usize) -> Result<bool, WindowError> {
        let view = {
            let state = self.inner.state.lock().await;
            if state.load.is_disposed() {
                return Err(WindowError::Disposed);
            }
            ViewState {
                held: state.window.len(),
                first_visible,
                loading: state.load.is_loading(),
                exhausted: state.exhausted,
            }
        };

        let Some(count) = self.inner.config.paging.policy().decide(view) else {
            return Ok(false);
        };
        match self.load_older(count).await {
            Ok(()) => Ok(true),
            Err(WindowError::LoadInProgress) => Ok(false),
            Err(error) => Err(error),
        }
    }

    /// Tear down the live subscription and install a fresh one at the tail.
    ///
    /// Happens automatically after every window change; call it to resume
    /// following after a [`WindowError::SubscriptionFailed`].
    pub async fn reanchor(&self) -> Result<(), WindowError> {
        let mut state = self.inner.state.lock().await;
        if state.load.is_disposed() {
            return Err(WindowError::Disposed);
        }
        self.inner
            .reanchor(&mut state)
            .await
            .map_err(WindowError::SubscriptionFailed)
    }

    /// Release every entry and cancel the live subscription.
    ///
    /// Idempotent. Loads still in flight complete silently.
    pub async fn dispose(&self) {
        let mut state = self.inner.state.lock().await;
        if !state
            .apply(LoadEvent::DisposeRequested)
            .contains(&Action::TearDown)
        {
            return;
        }

        state.window.clear();
        state.generation += 1;
        if let Some(follower) = state.follower.take() {
            self.inner.teardown(follower).await;
        }
        tracing::info!("window disposed");
    }
}

impl<S: RemoteStore> Inner<S> {
    async fn complete_load(self: Arc<Self>, request: PageRequest) {
        let result = self.remote.range_query(RangeQuery::from(&request)).await;
        let mut state = self.state.lock().await;

        match result {
            Ok(page) => {
                let mut page = Some(page);
                let mut loaded = None;
                let mut failure = None;
                for action in state.apply(LoadEvent::PageArrived) {
                    match action {
                        Action::SplicePage { request } => {
                            let original_count = state.window.len();
                            let spliced = state
                                .window
                                .splice_front(page.take().unwrap_or_default(), &request.boundary);
                            // Entries dropped as overlapping still came from the remote
                            state.exhausted =
                                spliced.inserted + spliced.overlapping < request.count;

                            tracing::debug!(
                                original_count,
                                inserted = spliced.inserted,
                                echoed = spliced.echoed,
                                overlapping = spliced.overlapping,
                                exhausted = state.exhausted,
                                "older page spliced"
                            );
                            loaded = Some(Loaded {
                                original_count,
                                inserted_count: spliced.inserted,
                            });
                        }
                        Action::Reanchor => {
                            if let Err(error) = self.reanchor(&mut state).await {
                                tracing::warn!(%error, "failed to install live subscription");
                                failure = Some(error);
                            }
                        }
                        _ => {}
                    }
                }

                // Listeners observe the window already re-anchored
                if let Some(loaded) = loaded {
                    self.notify.older(loaded);
                }
                if let Some(error) = failure {
                    self.notify.failed(WindowError::SubscriptionFailed(error));
                }
            }
            Err(error) => {
                for action in state.apply(LoadEvent::QueryFailed) {
                    if action == Action::ReportFailure {
                        tracing::warn!(%error, "backward range query failed");
                        self.notify
                            .failed(WindowError::RangeQueryFailed(error.clone()));
                    }
                }
            }
        }
    }

    /// Re-anchoring protocol: teardown, recompute the anchor, install.
    async fn reanchor(self: &Arc<Self>, state: &mut State) -> Result<(), StoreError> {
        if let Some(follower) = state.follower.take() {
            self.teardown(follower).await;
        }
        state.generation += 1;

        let anchor = Anchor::for_window(&state.window);
        let subscription = self
            .remote
            .subscribe_additions(anchor.lower_bound().cloned())
            .await?;

        tracing::debug!(
            subscription = %subscription.id,
            lower_bound = ?anchor.lower_bound(),
            "live follower anchored"
        );
        state.follower = Some(Follower {
            id: subscription.id,
            anchor,
        });
        self.spawn_follower(subscription, state.generation);
        Ok(())
    }

    async fn teardown(&self, follower: Follower) {
        if let Err(error) = self.remote.cancel(follower.id).await {
            tracing::warn!(subscription = %follower.id, %error, "failed to cancel live subscription");
        }
    }

    fn spawn_follower(self: &Arc<Self>, subscription: Subscription, generation: u64) {
        let inner = Arc::clone(self);
        tokio::spawn(async move { inner.follow(subscription, generation).await });
    }

    /// Drive one installed subscription until it is replaced, fails or closes.
    async fn follow(self: Arc<Self>, mut subscription: Subscription, generation: u64) {
        while let Some(delivery) = subscription.events.recv().await {
            let mut state = self.state.lock().await;
            if state.generation != generation || state.load.is_disposed() {
                return;
            }

            match delivery {
                Ok(ChangeEvent::Added(entry)) => {
                    let echo = state
                        .follower
                        .as_ref()
                        .map_or(false, |follower| follower.anchor.is_echo(&entry.key));
                    if echo {
                        tracing::trace!(key = %entry.key, "anchor echo suppressed");
                        continue;
                    }

                    let original_count = state.window.len();
                    let key = entry.key.clone();
                    match state.window.append(entry) {
                        Append::Echo => {
                            tracing::debug!(%key, "duplicate of the live edge dropped");
                        }
                        Append::OutOfOrder => {
                            tracing::warn!(%key, "dropping addition older than the live edge");
                        }
                        Append::Appended => {
                            tracing::debug!(%key, count = original_count + 1, "live entry appended");
                            let reanchored = self.reanchor(&mut state).await;
                            self.notify.newer(Loaded {
                                original_count,
                                inserted_count: 1,
                            });
                            if let Err(error) = reanchored {
                                tracing::warn!(%error, "failed to install live subscription");
                                self.notify.failed(WindowError::SubscriptionFailed(error));
                            }
                            // Superseded by the subscription installed above
                            return;
                        }
                    }
                }
                Ok(change) => match self.config.follower.unhandled_changes {
                    UnhandledChanges::Ignore => {
                        tracing::debug!(
                            kind = change.kind(),
                            key = %change.key(),
                            "ignoring unhandled change"
                        );
                    }
                    UnhandledChanges::Fail => {
                        self.notify.failed(WindowError::UnsupportedChange {
                            kind: change.kind(),
                            key: change.key().clone(),
                        });
                    }
                },
                Err(error) => {
                    tracing::warn!(%error, "live subscription failed");
                    if let Some(follower) = state.follower.take() {
                        self.teardown(follower).await;
                    }
                    state.generation += 1;
                    self.notify.failed(WindowError::SubscriptionFailed(error));
                    return;
                }
            }
        }

        // The stream ended without a teardown of ours
        let mut state = self.state.lock().await;
        if state.generation != generation || state.load.is_disposed() {
            return;
        }
        tracing::warn!("live subscription closed by the remote");
        state.follower = None;
        state.generation += 1;
        self.notify
            .failed(WindowError::SubscriptionFailed(StoreError::StreamClosed));
    }
}
