//! Scoped feature evaluation
//!
//! [`Features`] is the primary API for checking and managing flags. An
//! instance is bound to one scope (`"global"` at construction) and keeps
//! a private enabled/disabled cache so repeated checks within a request
//! hit storage once.
//!
//! Precedence per check:
//!   1. Computed definition in the registry (re-evaluated every call)
//!   2. This instance's cache
//!   3. Storage, via scope-fallback resolution (then cached)
//!
//! ```ignore
//! let features = Features::new(store, registry);
//! if features.is_enabled("dark_mode").await? { /* ... */ }
//! if features.for_scope("beta").is_enabled("new_checkout").await? { /* ... */ }
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use flagscope_store::{FeatureRecord, FeatureStore, StoreResult, GLOBAL_SCOPE};

use crate::registry::DefinitionRegistry;
use crate::resolver::Resolver;

/// Scope-bound feature evaluator.
///
/// Shareable across tasks behind `&self`; the cache lock is never held
/// across an await. Each instance caches independently: a scope-bound
/// instance from [`for_scope`](Self::for_scope) starts empty and the
/// original is untouched.
pub struct Features {
    resolver: Resolver,
    registry: Arc<DefinitionRegistry>,
    scope: String,
    cache: Mutex<HashMap<String, bool>>,
}

impl Features {
    /// Build an evaluator bound to the `"global"` scope.
    pub fn new(store: Arc<dyn FeatureStore>, registry: Arc<DefinitionRegistry>) -> Self {
        Self {
            resolver: Resolver::new(store),
            registry,
            scope: GLOBAL_SCOPE.to_string(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// A new evaluator bound to `scope`, sharing this instance's store
    /// and registry. Starts with an empty cache.
    pub fn for_scope(&self, scope: impl Into<String>) -> Features {
        Features {
            resolver: self.resolver.clone(),
            registry: Arc::clone(&self.registry),
            scope: scope.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// The scope this instance evaluates against.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    // ========== Checking Features ==========

    /// Whether `name` is enabled for the bound scope.
    ///
    /// A computed definition takes precedence over storage and is never
    /// cached. Storage answers are cached per instance until a mutation
    /// of the same name goes through this instance.
    pub async fn is_enabled(&self, name: &str) -> StoreResult<bool> {
        if let Some(predicate) = self.registry.lookup(name) {
            return Ok(predicate(&self.scope));
        }

        if let Some(cached) = self.cache.lock().unwrap().get(name).copied() {
            return Ok(cached);
        }

        let enabled = self.resolver.is_enabled(name, &self.scope).await?;
        self.cache.lock().unwrap().insert(name.to_string(), enabled);
        Ok(enabled)
    }

    /// Negation of [`is_enabled`](Self::is_enabled).
    pub async fn is_disabled(&self, name: &str) -> StoreResult<bool> {
        Ok(!self.is_enabled(name).await?)
    }

    /// True when at least one of `names` is enabled. Short-circuits on
    /// the first hit; an empty list is `false`.
    pub async fn is_enabled_any(&self, names: &[&str]) -> StoreResult<bool> {
        for name in names {
            if self.is_enabled(name).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// True only when every one of `names` is enabled. Short-circuits on
    /// the first miss; an empty list is `true`.
    pub async fn is_enabled_all(&self, names: &[&str]) -> StoreResult<bool> {
        for name in names {
            if !self.is_enabled(name).await? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// The value stored for `name`, falling back to `"global"` and then
    /// to `default`. Values are read straight from storage: never
    /// cached, not subject to computed definitions.
    pub async fn get_value(&self, name: &str, default: Value) -> StoreResult<Value> {
        self.resolver.get_value(name, &self.scope, default).await
    }

    /// Run `on_enabled` only when `name` is enabled, handing it the
    /// bound scope. Disabled means `None`.
    pub async fn when<T, F>(&self, name: &str, on_enabled: F) -> StoreResult<Option<T>>
    where
        F: FnOnce(&str) -> T,
    {
        if self.is_enabled(name).await? {
            Ok(Some(on_enabled(&self.scope)))
        } else {
            Ok(None)
        }
    }

    /// Like [`when`](Self::when), with a branch for the disabled case.
    pub async fn when_or<T, F, G>(
        &self,
        name: &str,
        on_enabled: F,
        on_disabled: G,
    ) -> StoreResult<T>
    where
        F: FnOnce(&str) -> T,
        G: FnOnce(&str) -> T,
    {
        if self.is_enabled(name).await? {
            Ok(on_enabled(&self.scope))
        } else {
            Ok(on_disabled(&self.scope))
        }
    }

    // ========== Managing Features ==========

    /// Enable `name` for the bound scope, optionally storing a value.
    pub async fn enable(&self, name: &str, value: Option<Value>) -> StoreResult<()> {
        self.resolver.enable(name, &self.scope, value).await?;
        self.invalidate(name);
        Ok(())
    }

    /// Disable `name` for the bound scope.
    pub async fn disable(&self, name: &str) -> StoreResult<()> {
        self.resolver.disable(name, &self.scope).await?;
        self.invalidate(name);
        Ok(())
    }

    /// Remove the record for `name` in the bound scope; the `"global"`
    /// record acts as the fallback again.
    pub async fn remove(&self, name: &str) -> StoreResult<u64> {
        let removed = self.resolver.remove(name, &self.scope).await?;
        self.invalidate(name);
        Ok(removed)
    }

    /// Copy every record from the bound scope into `to_scope`. Returns
    /// the number of records written.
    pub async fn copy_to(&self, to_scope: &str, overwrite: bool) -> StoreResult<u64> {
        self.resolver.copy_scope(&self.scope, to_scope, overwrite).await
    }

    /// All records stored for the bound scope, name ascending.
    pub async fn list_all(&self) -> StoreResult<Vec<FeatureRecord>> {
        self.resolver.list_by_scope(&self.scope).await
    }

    fn invalidate(&self, name: &str) {
        self.cache.lock().unwrap().remove(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flagscope_store::MemoryFeatureStore;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn features() -> (Arc<MemoryFeatureStore>, Arc<DefinitionRegistry>, Features) {
        let store = Arc::new(MemoryFeatureStore::new());
        let registry = Arc::new(DefinitionRegistry::new());
        let features = Features::new(store.clone(), Arc::clone(&registry));
        (store, registry, features)
    }

    #[tokio::test]
    async fn binds_global_scope_by_default() {
        let (_, _, features) = features();
        assert_eq!(features.scope(), GLOBAL_SCOPE);
        assert_eq!(features.for_scope("beta").scope(), "beta");
    }

    #[tokio::test]
    async fn for_scope_leaves_original_untouched() {
        let (_, _, features) = features();
        features.enable("dark_mode", None).await.unwrap();

        let beta = features.for_scope("beta");
        beta.disable("dark_mode").await.unwrap();

        assert_eq!(features.scope(), GLOBAL_SCOPE);
        assert!(features.is_enabled("dark_mode").await.unwrap());
        assert!(!beta.is_enabled("dark_mode").await.unwrap());
    }

    #[tokio::test]
    async fn unknown_feature_is_disabled() {
        let (_, _, features) = features();
        assert!(!features.is_enabled("never_written").await.unwrap());
        assert!(features.is_disabled("never_written").await.unwrap());
    }

    #[tokio::test]
    async fn computed_definition_wins_over_storage() {
        let (_, registry, features) = features();
        features.enable("kill_switch", None).await.unwrap();
        registry.define("kill_switch", |_| false);

        assert!(!features.is_enabled("kill_switch").await.unwrap());
    }

    #[tokio::test]
    async fn computed_definition_receives_bound_scope() {
        let (_, registry, features) = features();
        registry.define("beta_only", |scope| scope == "beta");

        assert!(!features.is_enabled("beta_only").await.unwrap());
        assert!(features.for_scope("beta").is_enabled("beta_only").await.unwrap());
    }

    #[tokio::test]
    async fn computed_definition_is_never_cached() {
        let (_, registry, features) = features();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        registry.define("live", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });

        features.is_enabled("live").await.unwrap();
        features.is_enabled("live").await.unwrap();
        features.is_enabled("live").await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn undefine_falls_back_to_storage() {
        let (_, registry, features) = features();
        features.enable("dark_mode", None).await.unwrap();
        registry.define("dark_mode", |_| false);
        assert!(!features.is_enabled("dark_mode").await.unwrap());

        registry.undefine("dark_mode");
        assert!(features.is_enabled("dark_mode").await.unwrap());
    }

    #[tokio::test]
    async fn storage_answer_is_cached_per_instance() {
        let (store, _, features) = features();
        features.enable("dark_mode", None).await.unwrap();
        assert!(features.is_enabled("dark_mode").await.unwrap());

        // Mutate storage behind the evaluator's back.
        store.upsert("dark_mode", GLOBAL_SCOPE, false, None).await.unwrap();

        // Cached answer survives; a fresh instance sees the new state.
        assert!(features.is_enabled("dark_mode").await.unwrap());
        assert!(!features.for_scope(GLOBAL_SCOPE).is_enabled("dark_mode").await.unwrap());
    }

    #[tokio::test]
    async fn mutation_invalidates_cached_name() {
        let (_, _, features) = features();
        features.enable("dark_mode", None).await.unwrap();
        assert!(features.is_enabled("dark_mode").await.unwrap());

        features.disable("dark_mode").await.unwrap();
        assert!(!features.is_enabled("dark_mode").await.unwrap());

        features.enable("dark_mode", None).await.unwrap();
        assert!(features.is_enabled("dark_mode").await.unwrap());
    }

    #[tokio::test]
    async fn remove_invalidates_and_restores_fallback() {
        let (_, _, features) = features();
        features.enable("dark_mode", None).await.unwrap();

        let beta = features.for_scope("beta");
        beta.disable("dark_mode").await.unwrap();
        assert!(!beta.is_enabled("dark_mode").await.unwrap());

        let removed = beta.remove("dark_mode").await.unwrap();
        assert_eq!(removed, 1);
        assert!(beta.is_enabled("dark_mode").await.unwrap());
    }

    #[tokio::test]
    async fn any_and_all_vacuous_cases() {
        let (_, _, features) = features();
        assert!(!features.is_enabled_any(&[]).await.unwrap());
        assert!(features.is_enabled_all(&[]).await.unwrap());
    }

    #[tokio::test]
    async fn any_and_all_combinations() {
        let (_, _, features) = features();
        features.enable("a", None).await.unwrap();
        features.disable("b").await.unwrap();

        assert!(features.is_enabled_any(&["b", "a"]).await.unwrap());
        assert!(!features.is_enabled_any(&["b", "missing"]).await.unwrap());
        assert!(features.is_enabled_all(&["a"]).await.unwrap());
        assert!(!features.is_enabled_all(&["a", "b"]).await.unwrap());
    }

    #[tokio::test]
    async fn get_value_with_default() {
        let (_, _, features) = features();
        features
            .enable("rate_limit", Some(json!({"per_minute": 60})))
            .await
            .unwrap();

        let value = features.get_value("rate_limit", json!(null)).await.unwrap();
        assert_eq!(value, json!({"per_minute": 60}));

        let missing = features.get_value("missing", json!(42)).await.unwrap();
        assert_eq!(missing, json!(42));
    }

    #[tokio::test]
    async fn when_runs_only_when_enabled() {
        let (_, _, features) = features();
        features.enable("greeting", None).await.unwrap();

        let ran = features
            .when("greeting", |scope| format!("hello from {scope}"))
            .await
            .unwrap();
        assert_eq!(ran, Some("hello from global".to_string()));

        let skipped = features.when("missing", |_| "never").await.unwrap();
        assert_eq!(skipped, None);
    }

    #[tokio::test]
    async fn when_or_dispatches_both_branches() {
        let (_, _, features) = features();
        features.enable("new_ui", None).await.unwrap();

        let on = features
            .when_or("new_ui", |_| "new", |_| "old")
            .await
            .unwrap();
        assert_eq!(on, "new");

        let off = features
            .when_or("legacy_ui", |_| "new", |_| "old")
            .await
            .unwrap();
        assert_eq!(off, "old");
    }

    #[tokio::test]
    async fn copy_to_copies_bound_scope() {
        let (_, _, features) = features();
        features.enable("a", None).await.unwrap();
        features.enable("b", Some(json!(1))).await.unwrap();

        let copied = features.copy_to("staging", false).await.unwrap();
        assert_eq!(copied, 2);

        let staging = features.for_scope("staging");
        assert!(staging.is_enabled("a").await.unwrap());
        assert_eq!(staging.get_value("b", json!(null)).await.unwrap(), json!(1));
    }

    #[tokio::test]
    async fn list_all_is_scope_exact_and_ordered() {
        let (_, _, features) = features();
        features.enable("zeta", None).await.unwrap();
        features.enable("alpha", None).await.unwrap();
        features.for_scope("beta").enable("other", None).await.unwrap();

        let records = features.list_all().await.unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }
}
