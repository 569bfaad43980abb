//! Flagscope Core Library
//!
//! Scope-aware feature flag evaluation on top of a pluggable record
//! store. Flags are keyed by `(name, scope)`; checks resolve the exact
//! scope first and fall back to `"global"`, with runtime-computed
//! definitions taking precedence over anything persisted.
//!
//! ## Key Components
//!
//! - [`Features`]: the scoped evaluator, the primary API
//! - [`Resolver`]: two-level scope-fallback resolution and mutations
//! - [`DefinitionRegistry`]: computed (programmatic) flag definitions
//! - [`FeatureView`]: read-only projection for presentation layers

pub mod evaluator;
pub mod registry;
pub mod resolver;
pub mod telemetry;
pub mod view;

pub use evaluator::Features;
pub use registry::{DefinitionRegistry, Predicate};
pub use resolver::Resolver;
pub use telemetry::init_tracing;
pub use view::FeatureView;

pub use flagscope_store::{
    FeatureRecord, FeatureStore, MemoryFeatureStore, StorageError, StoreResult,
    SurrealFeatureStore, GLOBAL_SCOPE,
};

/// Flagscope version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
