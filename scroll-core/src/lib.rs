//! # scroll-core
//!
//! Pure logic for backscroll (no I/O, instant tests).
//!
//! This crate implements the window, paging arithmetic and load state machine
//! without any network or runtime dependency, enabling fast unit tests.
//!
//! ## Design Philosophy
//!
//! All modules in this crate are **pure** - they take input and produce output
//! without side effects. This enables:
//! - Instant unit tests (no mocks, no async)
//! - Deterministic behavior (same input → same output)
//! - Easy reasoning about boundary de-duplication
//!
//! The actual I/O (range queries, subscriptions) is performed by
//! `scroll-client`, which interprets the actions produced here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod boundary;
pub mod prefetch;
pub mod state;
pub mod window;

pub use boundary::{Anchor, Boundary, PageRequest};
pub use prefetch::{PrefetchPolicy, ViewState};
pub use state::{Action, LoadEvent, LoadState, Rejection};
pub use window::{Append, Spliced, Window};
