//! In-memory feature store
//!
//! Satisfies the full [`FeatureStore`] contract without external
//! dependencies. Rows hold the same encoded payloads a database backend
//! would, so the value codec is exercised identically to production.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::record::{decode_value, validate_key, FeatureRecord};
use crate::store_trait::{FeatureStore, StoreResult};

#[derive(Debug)]
struct Row {
    enabled: bool,
    raw_value: Option<String>,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
}

impl Row {
    fn to_record(&self, name: &str, scope: &str) -> FeatureRecord {
        FeatureRecord {
            name: name.to_string(),
            scope: scope.to_string(),
            enabled: self.enabled,
            value: decode_value(self.raw_value.as_deref()),
            created_at: self.created_at,
            modified_at: self.modified_at,
        }
    }
}

/// In-memory store backed by a `Mutex<HashMap<(name, scope), Row>>`.
#[derive(Debug, Default)]
pub struct MemoryFeatureStore {
    rows: Mutex<HashMap<(String, String), Row>>,
}

impl MemoryFeatureStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FeatureStore for MemoryFeatureStore {
    async fn find_exact(&self, name: &str, scope: &str) -> StoreResult<Option<FeatureRecord>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .get(&(name.to_string(), scope.to_string()))
            .map(|row| row.to_record(name, scope)))
    }

    async fn upsert(
        &self,
        name: &str,
        scope: &str,
        enabled: bool,
        value: Option<String>,
    ) -> StoreResult<()> {
        validate_key(name, scope)?;
        let now = Utc::now();
        let mut rows = self.rows.lock().unwrap();
        match rows.entry((name.to_string(), scope.to_string())) {
            Entry::Occupied(mut slot) => {
                let row = slot.get_mut();
                row.enabled = enabled;
                row.raw_value = value;
                row.modified_at = now;
            }
            Entry::Vacant(slot) => {
                slot.insert(Row {
                    enabled,
                    raw_value: value,
                    created_at: now,
                    modified_at: now,
                });
            }
        }
        Ok(())
    }

    async fn delete(&self, name: &str, scope: &str) -> StoreResult<u64> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows
            .remove(&(name.to_string(), scope.to_string()))
            .map_or(0, |_| 1))
    }

    async fn list_by_scope(&self, scope: &str) -> StoreResult<Vec<FeatureRecord>> {
        let rows = self.rows.lock().unwrap();
        let mut records: Vec<FeatureRecord> = rows
            .iter()
            .filter(|((_, row_scope), _)| row_scope == scope)
            .map(|((name, row_scope), row)| row.to_record(name, row_scope))
            .collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(records)
    }
}
