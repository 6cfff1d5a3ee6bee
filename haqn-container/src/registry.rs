//! Binding registry: one table of bindings and implementations per container.
//!
//! Bindings are kept in registration order. That order is what makes the
//! implementation search deterministic: when several bindings implement an
//! interface, the one registered first wins.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::binding::{Binding, Implementation};
use crate::error::{AlreadyRegisteredError, HaqnError, Result};
use crate::instance::Instance;
use crate::key::DependencyKey;

/// Type-erased factory.
///
/// Receives the [`Resolver`] of the resolution it runs in, so everything it
/// resolves shares the caller's scope and cycle path.
pub type FactoryFn = Arc<dyn Fn(&dyn Resolver) -> Result<Instance> + Send + Sync>;

/// What factories use to resolve their own dependencies.
///
/// Implemented by the container's per-resolution bridge; a `&dyn Resolver`
/// is only valid for the duration of one factory call.
pub trait Resolver: Send + Sync {
    /// Resolves `key` as part of the current resolution.
    fn resolve_key(&self, key: &DependencyKey) -> Result<Instance>;

    /// Scope the current resolution runs in.
    fn scope_id(&self) -> Option<&str>;
}

impl dyn Resolver + '_ {
    /// Resolves `T` in pointer shape.
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        let key = DependencyKey::of::<T>();
        self.resolve_key(&key)?.expect::<T>(&key)
    }

    /// Resolves the binding of `T` registered under `name`.
    pub fn resolve_named<T: ?Sized + Send + Sync + 'static>(&self, name: &'static str) -> Result<Arc<T>> {
        let key = DependencyKey::named::<T>(name);
        self.resolve_key(&key)?.expect::<T>(&key)
    }

    /// Resolves `T` in value shape, cloning it out of the shared pointer.
    pub fn resolve_owned<T: Clone + Send + Sync + 'static>(&self) -> Result<T> {
        self.resolve::<T>().map(|shared| T::clone(&shared))
    }
}

#[derive(Debug, Default)]
pub(crate) struct Registry {
    bindings: IndexMap<DependencyKey, Arc<Binding>>,
    implementations: Vec<Arc<Implementation>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `binding`, returning the binding it replaced.
    ///
    /// # Errors
    /// - [`HaqnError::InvalidFactorySignature`] if the recipe cannot produce
    ///   the bound type
    /// - [`HaqnError::AlreadyRegistered`] if `strict` is set and the key is
    ///   already bound
    pub fn register(&mut self, binding: Binding, strict: bool) -> Result<Option<Arc<Binding>>> {
        binding.check_signature()?;
        let key = *binding.key();

        if strict && self.bindings.contains_key(&key) {
            return Err(HaqnError::AlreadyRegistered(AlreadyRegisteredError { key }));
        }

        debug!(key = %key, lifetime = %binding.lifetime(), "Registered binding");
        let previous = self.bindings.insert(key, Arc::new(binding));
        if previous.is_some() {
            debug!(key = %key, "Replaced earlier binding");
        }
        Ok(previous)
    }

    /// Adds an implementation declaration. Declaring the same pair twice
    /// replaces the earlier declaration in place.
    pub fn implement(&mut self, implementation: Implementation) {
        debug!(
            interface = %implementation.interface(),
            concrete = %implementation.concrete(),
            "Registered implementation"
        );
        let existing = self.implementations.iter().position(|known| {
            known.interface() == implementation.interface() && known.concrete() == implementation.concrete()
        });
        let interface = *implementation.interface();
        match existing {
            Some(index) => self.implementations[index] = Arc::new(implementation),
            None => {
                self.implementations.push(Arc::new(implementation));
                let candidates = self.implementations_of(&interface);
                if candidates.len() > 1 {
                    warn!(
                        interface = %interface,
                        first = %candidates[0].concrete(),
                        candidates = candidates.len(),
                        "Several implementations declared, non-strict resolution uses the first"
                    );
                }
            }
        }
    }

    /// Direct binding for `key`.
    pub fn get(&self, key: &DependencyKey) -> Option<Arc<Binding>> {
        self.bindings.get(key).cloned()
    }

    /// Implementations of the interface `key`, in registration order.
    pub fn implementations_of(&self, key: &DependencyKey) -> Vec<Arc<Implementation>> {
        let found: Vec<_> = self
            .implementations
            .iter()
            .filter(|implementation| implementation.interface() == key)
            .cloned()
            .collect();
        trace!(interface = %key, candidates = found.len(), "Implementation search");
        found
    }

    /// Removes the binding for `key` and every implementation touching it.
    pub fn remove(&mut self, key: &DependencyKey) -> Option<Arc<Binding>> {
        self.implementations
            .retain(|implementation| implementation.concrete() != key && implementation.interface() != key);
        let removed = self.bindings.shift_remove(key);
        if removed.is_some() {
            debug!(key = %key, "Removed binding");
        }
        removed
    }

    pub fn clear(&mut self) {
        debug!(bindings = self.bindings.len(), "Clearing registry");
        self.bindings.clear();
        self.implementations.clear();
    }

    pub fn bindings(&self) -> impl Iterator<Item = &Arc<Binding>> {
        self.bindings.values()
    }

    pub fn implementations(&self) -> &[Arc<Implementation>] {
        &self.implementations
    }

    /// Type names of everything resolvable here, for suggestions.
    pub fn type_names(&self) -> Vec<&'static str> {
        self.bindings
            .keys()
            .map(|key| key.type_name())
            .chain(self.implementations.iter().map(|i| i.interface().type_name()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
