//! # scroll-client
//!
//! Client library for backscroll: a bounded, ordered window over an
//! unbounded key-ordered remote collection.
//!
//! This is the main library that views use to page through history.
//!
//! ## Features
//!
//! - **Backward Loading**: over-fetch by one and drop the boundary key
//! - **Live Follow**: one standing subscription anchored at the newest key
//! - **Store Abstraction**: pluggable remote store (in-memory provided)
//! - **Pure State Machine**: Uses scroll-core for side-effect-free logic
//!
//! ## Example
//!
//! ```ignore
//! use scroll_client::{MemoryStore, WindowConfig, WindowStore};
//!
//! let (window, mut listener) = WindowStore::new(MemoryStore::new(), WindowConfig::default());
//!
//! // Load the newest 30 entries, then follow the live edge
//! window.load_older(30).await?;
//! let event = listener.recv().await;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod remote;
pub mod store;

pub use config::{ConfigError, FollowerConfig, PagingConfig, UnhandledChanges, WindowConfig};
pub use remote::{
    ChangeResult, MemoryStore, RangeQuery, RemoteStore, StoreError, Subscription, SubscriptionId,
};
pub use store::{Loaded, WindowError, WindowEvent, WindowListener, WindowStore};
