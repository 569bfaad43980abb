//! Flagscope-Store: Persistence Layer for Feature Flags
//!
//! This crate provides the record store for flagscope. It handles all I/O
//! with SurrealDB and owns the JSON value codec applied at the storage
//! boundary.
//!
//! ## Key Components
//!
//! - `FeatureStore`: The storage trait the evaluation layer depends on
//! - `FeatureRecord`: A decoded flag record as seen by callers
//! - `MemoryFeatureStore`: In-memory implementation for tests
//! - `SurrealFeatureStore`: SurrealDB-backed implementation

mod config;
mod error;
pub mod memory;
pub mod migrations;
mod record;
mod schema;
mod store_trait;
mod surreal_store;

pub use config::StoreConfig;
pub use error::StorageError;
pub use memory::MemoryFeatureStore;
pub use record::{decode_value, encode_value, FeatureRecord, GLOBAL_SCOPE, MAX_KEY_LEN};
pub use schema::FeatureRow;
pub use store_trait::{FeatureStore, StoreResult};
pub use surreal_store::SurrealFeatureStore;
