//! Read-only projection of the evaluator
//!
//! Presentation layers (templates, request handlers that should not flip
//! flags) get a [`FeatureView`] instead of the full [`Features`] API.
//! Pure delegation, no logic of its own and no mutation surface.

use std::sync::Arc;

use serde_json::Value;

use flagscope_store::StoreResult;

use crate::evaluator::Features;

/// Check-only handle over a shared [`Features`] instance.
#[derive(Clone)]
pub struct FeatureView {
    features: Arc<Features>,
}

impl FeatureView {
    pub fn new(features: Arc<Features>) -> Self {
        Self { features }
    }

    /// The scope this view evaluates against.
    pub fn scope(&self) -> &str {
        self.features.scope()
    }

    /// A view over the same store and registry, bound to `scope`.
    pub fn for_scope(&self, scope: impl Into<String>) -> FeatureView {
        FeatureView {
            features: Arc::new(self.features.for_scope(scope)),
        }
    }

    pub async fn is_enabled(&self, name: &str) -> StoreResult<bool> {
        self.features.is_enabled(name).await
    }

    pub async fn is_disabled(&self, name: &str) -> StoreResult<bool> {
        self.features.is_disabled(name).await
    }

    pub async fn is_enabled_any(&self, names: &[&str]) -> StoreResult<bool> {
        self.features.is_enabled_any(names).await
    }

    pub async fn is_enabled_all(&self, names: &[&str]) -> StoreResult<bool> {
        self.features.is_enabled_all(names).await
    }

    pub async fn get_value(&self, name: &str, default: Value) -> StoreResult<Value> {
        self.features.get_value(name, default).await
    }

    pub async fn when<T, F>(&self, name: &str, on_enabled: F) -> StoreResult<Option<T>>
    where
        F: FnOnce(&str) -> T,
    {
        self.features.when(name, on_enabled).await
    }
}
