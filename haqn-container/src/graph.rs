//! Build-time validation of declared dependencies.
//!
//! Factories declare their parameters, so the dependency graph is known
//! before anything is resolved. [`GraphValidator`] walks it once and
//! reports:
//! - cycles, which would otherwise only surface on first resolution
//! - singletons that capture scoped instances, which would outlive their scope
//!
//! Missing dependencies are not reported: they may be bound later, found
//! through a parent container, or be optional.

use std::collections::{HashMap, HashSet};

use tracing::{debug, instrument, trace, warn};

use crate::error::{CircularDependencyError, HaqnError, ScopeMismatchError};
use crate::key::DependencyKey;
use crate::lifetime::Lifetime;

/// What validation needs to know about one binding.
#[derive(Debug, Clone)]
pub(crate) struct DependencyInfo {
    pub key: DependencyKey,
    pub dependencies: Vec<DependencyKey>,
    pub lifetime: Lifetime,
}

/// Depth-first walk over the declared graph.
pub(crate) struct GraphValidator {
    nodes: HashMap<DependencyKey, DependencyInfo>,
    /// Interface → concrete, for interfaces reached through implementations.
    implementations: HashMap<DependencyKey, DependencyKey>,
    visiting: HashSet<DependencyKey>,
    validated: HashSet<DependencyKey>,
    path: Vec<DependencyKey>,
}

impl GraphValidator {
    pub fn new(
        nodes: impl IntoIterator<Item = DependencyInfo>,
        implementations: impl IntoIterator<Item = (DependencyKey, DependencyKey)>,
    ) -> Self {
        let mut by_interface = HashMap::new();
        for (interface, concrete) in implementations {
            // First declaration wins, as during resolution.
            by_interface.entry(interface).or_insert(concrete);
        }
        Self {
            nodes: nodes.into_iter().map(|info| (info.key, info)).collect(),
            implementations: by_interface,
            visiting: HashSet::new(),
            validated: HashSet::new(),
            path: Vec::new(),
        }
    }

    /// Validates every node.
    ///
    /// # Errors
    /// - [`HaqnError::CircularDependency`] with the cycle's chain
    /// - [`HaqnError::ScopeMismatch`] for a singleton depending on a scoped binding
    #[instrument(skip(self), name = "graph_validation", fields(nodes = self.nodes.len()))]
    pub fn validate(&mut self) -> Result<(), HaqnError> {
        let mut keys: Vec<DependencyKey> = self.nodes.keys().copied().collect();
        keys.sort_by_key(|key| key.type_name());

        for key in &keys {
            self.visit(key)?;
        }
        for key in &keys {
            if let Some(info) = self.nodes.get(key) {
                self.check_captures(info)?;
            }
        }

        debug!("Dependency graph is valid");
        Ok(())
    }

    fn visit(&mut self, key: &DependencyKey) -> Result<(), HaqnError> {
        if self.validated.contains(key) {
            return Ok(());
        }

        if self.visiting.contains(key) {
            let start = self.path.iter().position(|k| k == key).unwrap_or(0);
            let mut chain = self.path[start..].to_vec();
            chain.push(*key);
            warn!(cycle = ?chain, "Circular dependency in declared graph");
            return Err(HaqnError::CircularDependency(CircularDependencyError { chain }));
        }

        let Some(info) = self.node(key).cloned() else {
            trace!(key = %key, "Dependency not bound here, skipping");
            return Ok(());
        };

        self.visiting.insert(*key);
        self.path.push(*key);

        for dependency in &info.dependencies {
            self.visit(dependency)?;
        }

        self.path.pop();
        self.visiting.remove(key);
        self.validated.insert(*key);
        Ok(())
    }

    /// The node for `key`, following an implementation if `key` is an
    /// interface without its own binding.
    fn node(&self, key: &DependencyKey) -> Option<&DependencyInfo> {
        self.nodes.get(key).or_else(|| {
            self.implementations
                .get(key)
                .and_then(|concrete| self.nodes.get(concrete))
        })
    }

    /// A singleton must not hold on to a scoped instance, whether it asks
    /// for one directly or through transients built for it. Other cached
    /// bindings are checked as consumers of their own.
    fn check_captures(&self, consumer: &DependencyInfo) -> Result<(), HaqnError> {
        if consumer.lifetime != Lifetime::Singleton {
            return Ok(());
        }

        let mut seen = HashSet::new();
        let mut pending: Vec<&DependencyKey> = consumer.dependencies.iter().collect();
        while let Some(key) = pending.pop() {
            if !seen.insert(*key) {
                continue;
            }
            let Some(dependency) = self.node(key) else {
                continue;
            };
            if dependency.lifetime.requires_scope() {
                warn!(
                    consumer = %consumer.key,
                    dependency = %dependency.key,
                    "Singleton captures a scoped dependency"
                );
                return Err(HaqnError::ScopeMismatch(ScopeMismatchError {
                    dependency: dependency.key,
                    dependency_lifetime: dependency.lifetime,
                    consumer: consumer.key,
                    consumer_lifetime: consumer.lifetime,
                }));
            }
            if !dependency.lifetime.is_cached() {
                pending.extend(&dependency.dependencies);
            }
        }
        Ok(())
    }
}
