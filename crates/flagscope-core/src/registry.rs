//! Registry of computed feature definitions
//!
//! A computed definition is a predicate evaluated at runtime instead of
//! reading storage. Definitions take precedence over persisted records
//! and are never cached, so time- or load-dependent predicates stay live.
//!
//! The registry is an explicitly constructed object shared via `Arc`,
//! never process-global state. Tests get isolation for free by building
//! their own registry.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// A computed feature predicate. Receives the active scope string.
pub type Predicate = dyn Fn(&str) -> bool + Send + Sync;

/// Shared map of feature name to computed predicate.
///
/// Registration and removal are atomic per name; readers never observe a
/// partially applied update. Predicates are invoked outside the lock.
#[derive(Default)]
pub struct DefinitionRegistry {
    definitions: RwLock<HashMap<String, Arc<Predicate>>>,
}

impl DefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a computed definition for `name`, replacing any previous
    /// definition of the same name (last registration wins).
    ///
    /// Example:
    /// ```
    /// use flagscope_core::DefinitionRegistry;
    ///
    /// let registry = DefinitionRegistry::new();
    /// registry.define("beta_only", |scope| scope == "beta");
    /// ```
    pub fn define<F>(&self, name: impl Into<String>, predicate: F)
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        let mut definitions = self.definitions.write().unwrap();
        definitions.insert(name.into(), Arc::new(predicate));
    }

    /// Remove the definition for `name`. Evaluation falls back to
    /// storage afterwards. No-op if `name` was never defined.
    pub fn undefine(&self, name: &str) {
        let mut definitions = self.definitions.write().unwrap();
        definitions.remove(name);
    }

    /// Drop every definition. Useful between tests.
    pub fn clear(&self) {
        let mut definitions = self.definitions.write().unwrap();
        definitions.clear();
    }

    /// Look up the predicate for `name`, if one is defined.
    ///
    /// Returns a clone of the `Arc` so the caller can invoke the
    /// predicate after the registry lock is released.
    pub fn lookup(&self, name: &str) -> Option<Arc<Predicate>> {
        let definitions = self.definitions.read().unwrap();
        definitions.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.definitions.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.read().unwrap().is_empty()
    }
}
