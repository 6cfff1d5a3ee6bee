//! Construct-once instance slots.
//!
//! Both the singleton cache of a container and the cache of every scope
//! are an [`InstanceCache`]: a concurrent map from key to a slot holding a
//! [`OnceCell`]. The map lock is only held long enough to fetch the slot;
//! construction runs inside the slot's own cell, so building one key never
//! blocks lookups of another.
//!
//! A thread about to block on a slot another thread is filling first
//! checks whether that thread is, directly or through others, blocked on
//! a slot this thread is filling. Such a wait could never end, so it fails
//! with [`HaqnError::CircularDependency`] instead.

use std::sync::Arc;
use std::thread::{self, ThreadId};

use dashmap::DashMap;
use once_cell::sync::{Lazy, OnceCell};
use parking_lot::Mutex;
use tracing::warn;

use crate::error::{CircularDependencyError, HaqnError, Result};
use crate::instance::Instance;
use crate::key::DependencyKey;
use crate::resolution::ResolutionPath;

#[derive(Debug)]
struct Slot {
    key: DependencyKey,
    cell: OnceCell<Instance>,
    /// Thread running the factory for this slot, if any.
    builder: Mutex<Option<ThreadId>>,
}

impl Slot {
    fn new(key: DependencyKey) -> Self {
        Self {
            key,
            cell: OnceCell::new(),
            builder: Mutex::new(None),
        }
    }
}

/// The slot each blocked thread waits on, across all caches.
static WAITING: Lazy<DashMap<ThreadId, Arc<Slot>>> = Lazy::new(DashMap::new);

#[derive(Debug, Default)]
pub(crate) struct InstanceCache {
    slots: DashMap<DependencyKey, Arc<Slot>>,
}

impl InstanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached instance for `key`, if one was built.
    pub fn get(&self, key: &DependencyKey) -> Option<Instance> {
        self.slots.get(key).and_then(|slot| slot.value().cell.get().cloned())
    }

    /// Returns the cached instance or builds it with `build`.
    ///
    /// Callers racing on an empty slot block until the first one finishes;
    /// `build` runs at most once per successful construction. A failed build
    /// leaves the slot empty so a later call can retry.
    ///
    /// `path` is the caller's resolution path, reported in the chain when
    /// waiting would deadlock.
    pub fn get_or_build(
        &self,
        key: &DependencyKey,
        path: Option<&ResolutionPath<'_>>,
        build: impl FnOnce() -> Result<Instance>,
    ) -> Result<Instance> {
        let slot = self.slot(key);
        if let Some(instance) = slot.cell.get() {
            return Ok(instance.clone());
        }

        let me = thread::current().id();
        let _waiting = Waiting::register(me, &slot);
        if let Some(keys) = wait_cycle(&slot, me) {
            let mut chain = path.map(|frame| frame.keys()).unwrap_or_default();
            chain.extend(keys);
            warn!(cycle = ?chain, "Construction would wait on itself across threads");
            return Err(HaqnError::CircularDependency(CircularDependencyError { chain }));
        }

        slot.cell
            .get_or_try_init(|| {
                WAITING.remove(&me);
                let _building = Building::start(&slot, me);
                build()
            })
            .cloned()
    }

    /// Drops the cached instance for `key`.
    pub fn evict(&self, key: &DependencyKey) -> bool {
        self.slots.remove(key).is_some()
    }

    pub fn clear(&self) {
        self.slots.clear();
    }

    /// Number of constructed instances.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.value().cell.get().is_some()).count()
    }

    fn slot(&self, key: &DependencyKey) -> Arc<Slot> {
        if let Some(slot) = self.slots.get(key) {
            return Arc::clone(slot.value());
        }
        Arc::clone(self.slots.entry(*key).or_insert_with(|| Arc::new(Slot::new(*key))).value())
    }
}

/// Follows builder → slot it waits on → that slot's builder, starting at
/// `slot`. Returns the keys passed if the walk comes back to `me`.
fn wait_cycle(slot: &Arc<Slot>, me: ThreadId) -> Option<Vec<DependencyKey>> {
    let mut keys = Vec::new();
    let mut current = Arc::clone(slot);
    for _ in 0..=WAITING.len() {
        if current.cell.get().is_some() {
            return None;
        }
        let builder = (*current.builder.lock())?;
        keys.push(current.key);
        if builder == me {
            return Some(keys);
        }
        current = WAITING.get(&builder).map(|entry| Arc::clone(entry.value()))?;
    }
    None
}

struct Waiting(ThreadId);

impl Waiting {
    fn register(me: ThreadId, slot: &Arc<Slot>) -> Self {
        WAITING.insert(me, Arc::clone(slot));
        Self(me)
    }
}

impl Drop for Waiting {
    fn drop(&mut self) {
        WAITING.remove(&self.0);
    }
}

struct Building<'a>(&'a Slot);

impl<'a> Building<'a> {
    fn start(slot: &'a Slot, me: ThreadId) -> Self {
        *slot.builder.lock() = Some(me);
        Self(slot)
    }
}

impl Drop for Building<'_> {
    fn drop(&mut self) {
        *self.0.builder.lock() = None;
    }
}
