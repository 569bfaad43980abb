//! SurrealDB schema migrations and initialization
//!
//! This module provides initialization functions to set up the feature
//! flag table with proper constraints and indexes.

use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::{debug, info};

use crate::error::StorageError;
use crate::store_trait::StoreResult;

/// Initialize all flagscope tables in SurrealDB
///
/// This should be called once on first connection to set up the schema.
/// Safe to call multiple times (idempotent).
pub async fn init_schema(db: &Surreal<Any>) -> StoreResult<()> {
    info!("Initializing flagscope SurrealDB schema");

    init_features_table(db).await?;

    info!("flagscope schema initialization complete");
    Ok(())
}

/// Initialize `features` table with constraints and indexes
///
/// Schema:
/// ```text
/// TABLE features {
///   name:         STRING (max 100 chars, part of unique pair)
///   scope:        STRING (max 100 chars, part of unique pair)
///   enabled:      BOOL
///   value:        STRING? (opaque JSON payload, absent when no override)
///   created_at:   DATETIME
///   modified_at:  DATETIME
/// }
/// ```
///
/// Constraints:
/// - `(name, scope)` is unique (at most one record per flag per scope)
/// - key length limits enforced at the application layer before writes
async fn init_features_table(db: &Surreal<Any>) -> StoreResult<()> {
    debug!("Initializing features table");

    let sql = r#"
        DEFINE TABLE features SCHEMALESS
            PERMISSIONS
                FOR create FULL
                FOR select FULL
                FOR update FULL
                FOR delete FULL;

        -- One record per (name, scope) pair
        DEFINE INDEX idx_name_scope ON TABLE features COLUMNS name, scope UNIQUE;

        -- Index scope for per-scope listing and copy
        DEFINE INDEX idx_scope ON TABLE features COLUMNS scope;
    "#;

    db.query(sql)
        .await
        .map_err(|e| StorageError::Backend(e.to_string()))?;
    info!("✓ features table initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    // Note: Full integration tests for migrations run against an in-memory
    // SurrealDB instance in flagscope-store/tests/
}
