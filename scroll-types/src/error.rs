//! Error types for decoding entries.

use thiserror::Error;

/// Errors that can occur when decoding entries from external input.
#[derive(Debug, Error)]
pub enum EntryError {
    /// JSON decoding failed
    #[error("invalid entry json: {0}")]
    Json(#[source] serde_json::Error),

    /// An entry carried an empty key
    #[error("entry {position} has an empty key")]
    EmptyKey {
        /// Position of the offending entry in the input.
        position: usize,
    },

    /// The same key appeared twice
    #[error("duplicate key: {key}")]
    DuplicateKey {
        /// The repeated key.
        key: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = EntryError::EmptyKey { position: 3 };
        assert_eq!(err.to_string(), "entry 3 has an empty key");

        let err = EntryError::DuplicateKey { key: "k1".into() };
        assert_eq!(err.to_string(), "duplicate key: k1");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EntryError>();
    }
}
