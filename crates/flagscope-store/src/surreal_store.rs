//! SurrealDB-backed FeatureStore implementation
//!
//! Uses `schema::FeatureRow` for persistence, converting to
//! `FeatureRecord` at the read boundary.

use async_trait::async_trait;
use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::error::StorageError;
use crate::migrations;
use crate::record::{decode_value, validate_key, FeatureRecord};
use crate::schema::FeatureRow;
use crate::store_trait::{FeatureStore, StoreResult};

/// SurrealDB-backed implementation of [`FeatureStore`].
pub struct SurrealFeatureStore {
    db: Surreal<Any>,
}

impl SurrealFeatureStore {
    /// Create an in-memory instance for testing.
    ///
    /// Connects to `mem://`, selects `flagscope/main`, and runs `init_schema`.
    pub async fn in_memory() -> StoreResult<Self> {
        let db = surrealdb::engine::any::connect("mem://")
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        db.use_ns("flagscope")
            .use_db("main")
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        migrations::init_schema(&db).await?;

        info!("SurrealFeatureStore connected (in-memory)");
        Ok(Self { db })
    }

    /// Create from environment variables.
    ///
    /// If SURREALDB_ENDPOINT is set, connects to that deployment using
    /// [`StoreConfig::from_env`]. If SURREALDB_URL is set, connects to that
    /// URL directly. Otherwise, falls back to local persistence under
    /// `.flagscope/db`.
    pub async fn from_env() -> StoreResult<Self> {
        use surrealdb::opt::auth::{Database, Root};

        if let Ok(config) = StoreConfig::from_env() {
            let db = surrealdb::engine::any::connect(&config.endpoint)
                .await
                .map_err(|e| StorageError::Connection(e.to_string()))?;

            if config.is_root {
                db.signin(Root {
                    username: &config.username,
                    password: &config.password,
                })
                .await
                .map_err(|e| StorageError::Connection(format!("Root auth failed: {e}")))?;
            } else {
                db.signin(Database {
                    namespace: &config.namespace,
                    database: &config.database,
                    username: &config.username,
                    password: &config.password,
                })
                .await
                .map_err(|e| StorageError::Connection(format!("DB auth failed: {e}")))?;
            }

            db.use_ns(&config.namespace)
                .use_db(&config.database)
                .await
                .map_err(|e| StorageError::Connection(e.to_string()))?;

            migrations::init_schema(&db).await?;
            info!("SurrealFeatureStore connected ({})", config.endpoint);
            return Ok(Self { db });
        }

        if let Ok(url) = std::env::var("SURREALDB_URL") {
            let db = surrealdb::engine::any::connect(&url)
                .await
                .map_err(|e| StorageError::Connection(e.to_string()))?;

            db.use_ns("flagscope")
                .use_db("main")
                .await
                .map_err(|e| StorageError::Connection(e.to_string()))?;

            migrations::init_schema(&db).await?;
            info!("SurrealFeatureStore connected ({})", url);
            return Ok(Self { db });
        }

        // Default to local persistence in .flagscope/db
        let path = ".flagscope/db";
        std::fs::create_dir_all(path).map_err(|e| {
            StorageError::Connection(format!(
                "Failed to create database directory {}: {}",
                path, e
            ))
        })?;
        let url = format!("surrealkv://{}", path);
        info!(
            "No cloud config or SURREALDB_URL found, using local persistence: {}",
            url
        );

        let db = surrealdb::engine::any::connect(&url)
            .await
            .map_err(|e| StorageError::Connection(format!("Failed to connect to {}: {}", url, e)))?;

        db.use_ns("flagscope")
            .use_db("main")
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        migrations::init_schema(&db).await?;
        Ok(Self { db })
    }

    // -- private helpers -----------------------------------------------------

    /// Fetch a row by (name, scope), or None if the pair has no record.
    async fn fetch_row(&self, name: &str, scope: &str) -> StoreResult<Option<FeatureRow>> {
        let name_owned = name.to_string();
        let scope_owned = scope.to_string();
        let mut res = self
            .db
            .query("SELECT * FROM features WHERE name = $name AND scope = $scope")
            .bind(("name", name_owned))
            .bind(("scope", scope_owned))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let rows: Vec<FeatureRow> = res
            .take(0)
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(rows.into_iter().next())
    }

    /// Convert a `schema::FeatureRow` (DB row) into a `FeatureRecord`,
    /// decoding the JSON payload at this boundary.
    fn row_to_record(row: FeatureRow) -> FeatureRecord {
        let value = decode_value(row.value.as_deref());
        FeatureRecord {
            name: row.name,
            scope: row.scope,
            enabled: row.enabled,
            value,
            created_at: row.created_at,
            modified_at: row.modified_at,
        }
    }
}

#[async_trait]
impl FeatureStore for SurrealFeatureStore {
    async fn find_exact(&self, name: &str, scope: &str) -> StoreResult<Option<FeatureRecord>> {
        let row = self.fetch_row(name, scope).await?;
        Ok(row.map(Self::row_to_record))
    }

    async fn upsert(
        &self,
        name: &str,
        scope: &str,
        enabled: bool,
        value: Option<String>,
    ) -> StoreResult<()> {
        validate_key(name, scope)?;

        debug!(name, scope, enabled, "upserting flag record");

        match self.fetch_row(name, scope).await? {
            Some(existing) => {
                let updated = existing.updated(enabled, value);
                let name_owned = name.to_string();
                let scope_owned = scope.to_string();

                self.db
                    .query("UPDATE features CONTENT $row WHERE name = $name AND scope = $scope")
                    .bind(("row", updated))
                    .bind(("name", name_owned))
                    .bind(("scope", scope_owned))
                    .await
                    .map_err(|e| StorageError::Backend(e.to_string()))?;
            }
            None => {
                let row = FeatureRow::new(name, scope, enabled, value);

                let _created: Option<FeatureRow> = self
                    .db
                    .create("features")
                    .content(row)
                    .await
                    .map_err(|e| StorageError::Backend(e.to_string()))?;
            }
        }

        Ok(())
    }

    async fn delete(&self, name: &str, scope: &str) -> StoreResult<u64> {
        let name_owned = name.to_string();
        let scope_owned = scope.to_string();

        let mut res = self
            .db
            .query("DELETE features WHERE name = $name AND scope = $scope RETURN BEFORE")
            .bind(("name", name_owned))
            .bind(("scope", scope_owned))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let deleted: Vec<FeatureRow> = res
            .take(0)
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(deleted.len() as u64)
    }

    async fn list_by_scope(&self, scope: &str) -> StoreResult<Vec<FeatureRecord>> {
        let scope_owned = scope.to_string();

        let mut res = self
            .db
            .query("SELECT * FROM features WHERE scope = $scope ORDER BY name ASC")
            .bind(("scope", scope_owned))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let rows: Vec<FeatureRow> = res
            .take(0)
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(rows.into_iter().map(Self::row_to_record).collect())
    }
}
