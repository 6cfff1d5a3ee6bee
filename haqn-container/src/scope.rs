//! Scope manager: named per-operation instance caches.
//!
//! A scope is identified by a caller-supplied string such as a request id.
//! It exists between `begin` and `end`; scoped bindings resolved under its
//! id are built once and cached until the scope ends.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::cache::InstanceCache;
use crate::key::DependencyKey;

#[derive(Debug, Default)]
pub(crate) struct ScopeManager {
    scopes: DashMap<String, Arc<InstanceCache>>,
}

impl ScopeManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts scope `id` with an empty cache.
    ///
    /// Beginning an id that is already active discards its instances.
    /// Returns `true` in that case.
    pub fn begin(&self, id: &str) -> bool {
        let reset = self.scopes.insert(id.to_owned(), Arc::new(InstanceCache::new())).is_some();
        debug!(scope = id, reset, "Scope begun");
        reset
    }

    /// Ends scope `id`, dropping its cache. Returns `false` if it was not active.
    pub fn end(&self, id: &str) -> bool {
        let ended = self.scopes.remove(id);
        if let Some((_, cache)) = &ended {
            debug!(scope = id, instances = cache.len(), "Scope ended");
        }
        ended.is_some()
    }

    /// Cache of scope `id`. The returned handle stays usable after the
    /// scope ends but is no longer reachable through the manager.
    pub fn get(&self, id: &str) -> Option<Arc<InstanceCache>> {
        self.scopes.get(id).map(|cache| Arc::clone(cache.value()))
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.scopes.contains_key(id)
    }

    /// Active scope ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.scopes.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Drops the cached instance of `key` in every scope.
    pub fn evict(&self, key: &DependencyKey) {
        for entry in self.scopes.iter() {
            entry.value().evict(key);
        }
    }

    /// Empties every scope cache, keeping the scopes active.
    pub fn clear_instances(&self) {
        for entry in self.scopes.iter() {
            entry.value().clear();
        }
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }
}
