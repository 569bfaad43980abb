//! Storage trait for feature flag records
//!
//! The trait is async and backend-agnostic: resolution logic upstream
//! only ever sees `find_exact` / `upsert` / `delete` / `list_by_scope`.
//! An in-memory implementation is provided in the `memory` module, a
//! SurrealDB-backed one in `surreal_store`.

use async_trait::async_trait;

use crate::error::StorageError;
use crate::record::FeatureRecord;

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StorageError>;

/// Durable store of `(name, scope) -> {enabled, value}` records.
///
/// Guarantees:
/// - `(name, scope)` pairs are unique; `upsert` replaces in place.
/// - Value payloads are opaque JSON text; the store never interprets them.
/// - `list_by_scope` matches the scope exactly (no fallback) and returns
///   records ordered by name ascending.
/// - `created_at` is kept from the first write of a pair; `modified_at`
///   is refreshed on every write.
#[async_trait]
pub trait FeatureStore: Send + Sync {
    /// Look up the record stored at exactly `(name, scope)`.
    ///
    /// `Ok(None)` means genuinely absent; storage failures are errors,
    /// never `None`.
    async fn find_exact(&self, name: &str, scope: &str) -> StoreResult<Option<FeatureRecord>>;

    /// Create or replace the record at `(name, scope)`.
    ///
    /// Rejects empty or over-long names and scopes with
    /// [`StorageError::InvalidKey`].
    async fn upsert(
        &self,
        name: &str,
        scope: &str,
        enabled: bool,
        value: Option<String>,
    ) -> StoreResult<()>;

    /// Delete the record at `(name, scope)`, returning how many records
    /// were removed (0 or 1). Absent pairs are a no-op, not an error.
    async fn delete(&self, name: &str, scope: &str) -> StoreResult<u64>;

    /// All records whose scope equals `scope` exactly, name ascending.
    async fn list_by_scope(&self, scope: &str) -> StoreResult<Vec<FeatureRecord>>;
}
