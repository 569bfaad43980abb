//! Scope-fallback resolution over a [`FeatureStore`]
//!
//! The resolver owns the two-level lookup at the heart of flag
//! evaluation: the exact scope record wins, otherwise the `"global"`
//! record, otherwise the hardcoded miss (`false` / caller default).
//! Strictly two levels; scope strings have no hierarchy.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use flagscope_store::{encode_value, FeatureRecord, FeatureStore, StoreResult, GLOBAL_SCOPE};

/// Stateless resolution and mutation layer over a record store.
///
/// Cheap to clone; all clones share the same store handle. Storage
/// failures on read paths propagate to the caller, they are never
/// collapsed into "feature off".
#[derive(Clone)]
pub struct Resolver {
    store: Arc<dyn FeatureStore>,
}

impl Resolver {
    pub fn new(store: Arc<dyn FeatureStore>) -> Self {
        Self { store }
    }

    /// Whether `name` is enabled for `scope`.
    ///
    /// An exact-scope record decides regardless of its value payload; a
    /// disabled exact record shadows an enabled global one. With no
    /// record in either scope the answer is `false`.
    pub async fn is_enabled(&self, name: &str, scope: &str) -> StoreResult<bool> {
        if scope != GLOBAL_SCOPE {
            if let Some(record) = self.store.find_exact(name, scope).await? {
                return Ok(record.enabled);
            }
        }

        Ok(self
            .store
            .find_exact(name, GLOBAL_SCOPE)
            .await?
            .map(|record| record.enabled)
            .unwrap_or(false))
    }

    /// The value stored for `name` in `scope`, with the same two-level
    /// fallback as [`is_enabled`](Self::is_enabled).
    ///
    /// A record found without a value substitutes `default` directly; it
    /// does not fall through to the next level.
    pub async fn get_value(&self, name: &str, scope: &str, default: Value) -> StoreResult<Value> {
        if scope != GLOBAL_SCOPE {
            if let Some(record) = self.store.find_exact(name, scope).await? {
                return Ok(record.value.unwrap_or(default));
            }
        }

        match self.store.find_exact(name, GLOBAL_SCOPE).await? {
            Some(record) => Ok(record.value.unwrap_or(default)),
            None => Ok(default),
        }
    }

    /// Enable `name` for `scope`, storing `value` alongside the flag
    /// (replacing any previous value).
    pub async fn enable(&self, name: &str, scope: &str, value: Option<Value>) -> StoreResult<()> {
        self.store
            .upsert(name, scope, true, encode_value(value.as_ref()))
            .await
    }

    /// Disable `name` for `scope`. Clears the stored value.
    pub async fn disable(&self, name: &str, scope: &str) -> StoreResult<()> {
        self.store.upsert(name, scope, false, None).await
    }

    /// Remove the `(name, scope)` record entirely, returning how many
    /// records were deleted. Fallback to `"global"` applies again
    /// afterwards.
    pub async fn remove(&self, name: &str, scope: &str) -> StoreResult<u64> {
        self.store.delete(name, scope).await
    }

    /// All records stored for exactly `scope`, name ascending.
    pub async fn list_by_scope(&self, scope: &str) -> StoreResult<Vec<FeatureRecord>> {
        self.store.list_by_scope(scope).await
    }

    /// Copy every record from scope `from` into scope `to`.
    ///
    /// Existing target records are skipped unless `overwrite`. Returns
    /// the number of records actually written. The copy is per-record;
    /// a concurrent writer can interleave (no cross-record atomicity).
    pub async fn copy_scope(&self, from: &str, to: &str, overwrite: bool) -> StoreResult<u64> {
        let records = self.store.list_by_scope(from).await?;
        let mut copied = 0u64;

        for record in records {
            if !overwrite && self.store.find_exact(&record.name, to).await?.is_some() {
                continue;
            }

            self.store
                .upsert(
                    &record.name,
                    to,
                    record.enabled,
                    encode_value(record.value.as_ref()),
                )
                .await?;
            copied += 1;
        }

        debug!(from, to, copied, "copied scope records");
        Ok(copied)
    }
}
