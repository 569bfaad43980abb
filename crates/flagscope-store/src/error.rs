//! Error types for flagscope-store

use thiserror::Error;

/// Errors surfaced by the record store.
///
/// Decode failure of a stored value payload is deliberately NOT listed
/// here: a payload that is not valid JSON is logged and passed through as
/// raw text instead of failing the read.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backend unreachable or connection setup failed
    #[error("store connection failed: {0}")]
    Connection(String),

    /// Query or write rejected by the backend (includes unique-constraint
    /// violations from concurrent inserts of the same pair)
    #[error("store backend error: {0}")]
    Backend(String),

    /// Name or scope rejected at the write boundary
    #[error("invalid {field}: {reason}")]
    InvalidKey {
        field: &'static str,
        reason: String,
    },
}

impl From<surrealdb::Error> for StorageError {
    fn from(err: surrealdb::Error) -> Self {
        StorageError::Backend(err.to_string())
    }
}
