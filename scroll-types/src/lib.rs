//! # scroll-types
//!
//! Entry and key types for the backscroll ordered window mirror.
//!
//! This crate provides the foundational types used across all backscroll crates:
//! - [`Key`] - The ordering key of the remote collection
//! - [`Entry`] - One item of the remote collection as held locally
//! - [`ChangeEvent`] - A change delivered by a standing subscription
//! - [`EntryError`] - Error types for decoding entries from external input

#![warn(missing_docs)]
#![warn(clippy::all)]

mod change;
mod entry;
mod error;
mod key;

pub use change::ChangeEvent;
pub use entry::{entries_from_json, Entry};
pub use error::EntryError;
pub use key::Key;
