//! # The Container
//!
//! Resolves types to instances and manages their lifetimes.
//!
//! # Architecture
//! ```text
//! ContainerBuilder ──build()──> Container ──create_child()──> Container
//!                                   │                         (delegates misses
//!                              begin_scope(id)                  to its parent)
//!                                   │
//!                                   ▼
//!                            ScopedContainer
//! ```
//!
//! Resolution of a key:
//! 1. direct binding in this container
//! 2. otherwise the first registered implementation of the key
//! 3. otherwise the same search in the parent container
//!
//! then the binding's lifetime decides whether a cached instance is reused
//! (singleton cache, scope cache) or a new one is built.
//!
//! # Examples
//! ```rust
//! use haqn_container::prelude::*;
//! use std::sync::Arc;
//!
//! trait Logger: Send + Sync {
//!     fn log(&self, msg: &str);
//! }
//!
//! struct ConsoleLogger;
//! impl Logger for ConsoleLogger {
//!     fn log(&self, msg: &str) { println!("{msg}"); }
//! }
//!
//! struct UserService {
//!     logger: Arc<dyn Logger>,
//! }
//!
//! let container = Container::builder()
//!     .singleton::<ConsoleLogger, _>(|| Ok(ConsoleLogger))
//!     .implements::<ConsoleLogger, dyn Logger>(|logger| logger as Arc<dyn Logger>)
//!     .transient::<UserService, _>(|logger: Arc<dyn Logger>| Ok(UserService { logger }))
//!     .build()
//!     .expect("Failed to build container");
//!
//! let service = container.resolve::<UserService>().expect("Failed to resolve");
//! service.logger.log("ready");
//! ```

use std::fmt;
use std::sync::Arc;

use haqn_support::rendering::suggest_similar;
use parking_lot::RwLock;
use tracing::{debug, info, instrument, trace, warn};

use crate::binding::{Binding, Implementation, Recipe};
use crate::cache::InstanceCache;
use crate::config::ContainerConfig;
use crate::error::{
    AmbiguousImplementationError, BindingNotFoundError, HaqnError, Result, ScopeNotActiveError,
};
use crate::factory::Factory;
use crate::graph::{DependencyInfo, GraphValidator};
use crate::injectable::Injectable;
use crate::instance::Instance;
use crate::key::DependencyKey;
use crate::lifetime::Lifetime;
use crate::provider::{Provider, ProviderRegistry, submitted_providers};
use crate::registry::{FactoryFn, Registry, Resolver};
use crate::resolution::ResolutionPath;
use crate::scope::ScopeManager;

// ============================================================
// ContainerBuilder
// ============================================================

/// Collects bindings for a new [`Container`].
///
/// Registrations are applied in order when [`build`](ContainerBuilder::build)
/// runs, so the configuration may be set at any point of the chain.
///
/// ```rust,ignore
/// let container = Container::builder()
///     .strict(true)
///     .instance(Config::load())
///     .singleton::<Database, _>(|config: Arc<Config>| Database::connect(&config.url))
///     .scoped::<UnitOfWork, _>(|db: Arc<Database>| Ok(UnitOfWork::begin(db)))
///     .build()?;
/// ```
pub struct ContainerBuilder {
    bindings: Vec<Binding>,
    implementations: Vec<Implementation>,
    config: ContainerConfig,
}

impl ContainerBuilder {
    fn new() -> Self {
        Self {
            bindings: Vec::new(),
            implementations: Vec::new(),
            config: ContainerConfig::default(),
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    /// Rejects duplicate bindings and ambiguous implementations.
    pub fn strict(mut self, strict: bool) -> Self {
        self.config.strict = strict;
        self
    }

    /// Skips graph validation in [`build`](ContainerBuilder::build).
    pub fn validate_on_build(mut self, validate: bool) -> Self {
        self.config.validate_on_build = validate;
        self
    }

    pub fn bind(mut self, binding: Binding) -> Self {
        self.bindings.push(binding);
        self
    }

    /// A ready value, shared by every resolution.
    pub fn instance<T: Send + Sync + 'static>(self, value: T) -> Self {
        self.bind(Binding::instance(value))
    }

    /// A ready shared pointer, e.g. `Arc<dyn Trait>`.
    pub fn shared<T: ?Sized + Send + Sync + 'static>(self, value: Arc<T>) -> Self {
        self.bind(Binding::shared(value))
    }

    /// Built once, on first resolution.
    pub fn singleton<T, Args>(self, factory: impl Factory<T, Args>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.bind(Binding::singleton(factory))
    }

    /// Built once per scope.
    pub fn scoped<T, Args>(self, factory: impl Factory<T, Args>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.bind(Binding::scoped(factory))
    }

    /// Built on every resolution.
    pub fn transient<T, Args>(self, factory: impl Factory<T, Args>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.bind(Binding::transient(factory))
    }

    /// Binds a type deriving [`Injectable`].
    pub fn injectable<T: Injectable>(self) -> Self {
        self.bind(Binding::injectable::<T>())
    }

    /// Declares that `C` implements the interface `I`.
    pub fn implements<C, I>(mut self, upcast: impl Fn(Arc<C>) -> Arc<I> + Send + Sync + 'static) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
        I: ?Sized + Send + Sync + 'static,
    {
        self.implementations.push(Implementation::new(upcast));
        self
    }

    /// Lets a [`Provider`] add its registrations.
    pub fn add_provider(mut self, provider: &dyn Provider) -> Self {
        debug!(provider = provider.name(), "Adding provider");
        provider.register(&mut self);
        self
    }

    /// Adds every provider submitted with `inventory::submit!`.
    pub fn with_submitted_providers(mut self) -> Self {
        for entry in submitted_providers() {
            debug!(provider = entry.name(), "Adding submitted provider");
            entry.register(&mut self);
        }
        self
    }

    /// Registers everything and, unless disabled, validates the graph.
    ///
    /// # Errors
    /// - [`HaqnError::InvalidFactorySignature`] / [`HaqnError::AlreadyRegistered`]
    ///   from registration
    /// - [`HaqnError::CircularDependency`] / [`HaqnError::ScopeMismatch`]
    ///   from validation
    #[instrument(skip(self), name = "container_build")]
    pub fn build(self) -> Result<Container> {
        info!(
            bindings = self.bindings.len(),
            implementations = self.implementations.len(),
            "Building container"
        );

        let mut registry = Registry::new();
        for binding in self.bindings {
            registry.register(binding, self.config.strict)?;
        }
        for implementation in self.implementations {
            registry.implement(implementation);
        }

        let container = Container::from_parts(registry, self.config, None);
        if self.config.validate_on_build {
            container.validate()?;
        }

        info!("Container built");
        Ok(container)
    }
}

impl ProviderRegistry for ContainerBuilder {
    fn bind(&mut self, binding: Binding) {
        self.bindings.push(binding);
    }

    fn implement(&mut self, implementation: Implementation) {
        self.implementations.push(implementation);
    }
}

impl fmt::Debug for ContainerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerBuilder")
            .field("bindings", &self.bindings.len())
            .field("implementations", &self.implementations.len())
            .field("config", &self.config)
            .finish()
    }
}

// ═══════════════════════════════════════════
// Container
// ═══════════════════════════════════════════

struct Inner {
    registry: RwLock<Registry>,
    singletons: InstanceCache,
    scopes: ScopeManager,
    parent: Option<Container>,
    config: ContainerConfig,
}

/// Thread-safe service container.
///
/// Cloning is cheap and every clone refers to the same bindings, caches and
/// scopes, so a container is passed around explicitly rather than kept in a
/// global.
#[derive(Clone)]
pub struct Container {
    inner: Arc<Inner>,
}

/// Where a lookup found something to build.
enum Target<'c> {
    Binding {
        owner: &'c Container,
        binding: Arc<Binding>,
    },
    Implementation(Arc<Implementation>),
}

impl Container {
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    /// Empty container with the default configuration.
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    pub fn with_config(config: ContainerConfig) -> Self {
        Self::from_parts(Registry::new(), config, None)
    }

    fn from_parts(registry: Registry, config: ContainerConfig, parent: Option<Container>) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry: RwLock::new(registry),
                singletons: InstanceCache::new(),
                scopes: ScopeManager::new(),
                parent,
                config,
            }),
        }
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.inner.config
    }

    // ── Registration ──

    /// Registers a binding at runtime.
    ///
    /// Replacing a binding drops its cached singleton and scoped instances.
    pub fn bind(&self, binding: Binding) -> Result<()> {
        let key = *binding.key();
        let replaced = self.inner.registry.write().register(binding, self.inner.config.strict)?;
        if replaced.is_some() {
            self.evict(&key);
        }
        Ok(())
    }

    /// Declares that `C` implements the interface `I` at runtime.
    pub fn implement(&self, implementation: Implementation) {
        self.inner.registry.write().implement(implementation);
    }

    /// Removes the binding of `T`. Meant for test isolation.
    pub fn unbind<T: ?Sized + 'static>(&self) -> bool {
        self.unbind_key(&DependencyKey::of::<T>())
    }

    pub fn unbind_key(&self, key: &DependencyKey) -> bool {
        let removed = self.inner.registry.write().remove(key).is_some();
        self.evict(key);
        removed
    }

    /// Removes every binding and cached instance. Active scopes stay active.
    pub fn clear(&self) {
        self.inner.registry.write().clear();
        self.inner.singletons.clear();
        self.inner.scopes.clear_instances();
    }

    fn evict(&self, key: &DependencyKey) {
        self.inner.singletons.evict(key);
        self.inner.scopes.evict(key);
    }

    /// Number of bindings in this container, parents excluded.
    pub fn len(&self) -> usize {
        self.inner.registry.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.registry.read().is_empty()
    }

    /// Whether `key` has a binding or implementation here or in a parent.
    pub fn contains_key(&self, key: &DependencyKey) -> bool {
        self.lookup(key, None).is_ok()
    }

    // ── Resolution ──

    /// Resolves `T` as a shared pointer.
    ///
    /// ```rust,ignore
    /// let db: Arc<Database> = container.resolve::<Database>()?;
    /// let logger: Arc<dyn Logger> = container.resolve::<dyn Logger>()?;
    /// ```
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        self.resolve_typed(DependencyKey::of::<T>(), None)
    }

    /// Resolves `T` as an owned value cloned out of the shared instance.
    pub fn resolve_owned<T: Clone + Send + Sync + 'static>(&self) -> Result<T> {
        self.resolve::<T>().map(|shared| T::clone(&shared))
    }

    /// Resolves the binding of `T` registered under `name`.
    pub fn resolve_named<T: ?Sized + Send + Sync + 'static>(&self, name: &'static str) -> Result<Arc<T>> {
        self.resolve_typed(DependencyKey::named::<T>(name), None)
    }

    /// Resolves `T` inside scope `scope_id`.
    pub fn resolve_in<T: ?Sized + Send + Sync + 'static>(&self, scope_id: &str) -> Result<Arc<T>> {
        self.resolve_typed(DependencyKey::of::<T>(), Some(scope_id))
    }

    /// Type-erased resolution.
    pub fn resolve_key(&self, key: &DependencyKey, scope_id: Option<&str>) -> Result<Instance> {
        self.resolve_with_path(key, scope_id, None)
    }

    /// Resolves `T` on tokio's blocking pool.
    ///
    /// For async callers whose factories may block (opening connections,
    /// reading files) and must not stall a runtime worker.
    #[cfg(feature = "async")]
    pub async fn resolve_async<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        let container = self.clone();
        tokio::task::spawn_blocking(move || container.resolve::<T>())
            .await
            .map_err(|err| HaqnError::TaskFailed(err.to_string()))?
    }

    /// [`resolve_in`](Container::resolve_in) on tokio's blocking pool.
    #[cfg(feature = "async")]
    pub async fn resolve_in_async<T: ?Sized + Send + Sync + 'static>(&self, scope_id: &str) -> Result<Arc<T>> {
        let container = self.clone();
        let scope_id = scope_id.to_owned();
        tokio::task::spawn_blocking(move || container.resolve_in::<T>(&scope_id))
            .await
            .map_err(|err| HaqnError::TaskFailed(err.to_string()))?
    }

    fn resolve_typed<T: ?Sized + Send + Sync + 'static>(
        &self,
        key: DependencyKey,
        scope_id: Option<&str>,
    ) -> Result<Arc<T>> {
        self.resolve_with_path(&key, scope_id, None)?.expect::<T>(&key)
    }

    fn resolve_with_path(
        &self,
        key: &DependencyKey,
        scope_id: Option<&str>,
        path: Option<&ResolutionPath<'_>>,
    ) -> Result<Instance> {
        trace!(key = %key, scope = scope_id, depth = path.map_or(0, |p| p.depth()), "Resolving");

        match self.lookup(key, path)? {
            Target::Binding { owner, binding } => self.instantiate(owner, &binding, scope_id, path),
            Target::Implementation(implementation) => {
                trace!(interface = %key, concrete = %implementation.concrete(), "Using implementation");
                let concrete = self.resolve_with_path(implementation.concrete(), scope_id, path)?;
                implementation.apply(&concrete)
            }
        }
    }

    /// Finds what to build for `key`, walking up the parent chain.
    fn lookup(&self, key: &DependencyKey, path: Option<&ResolutionPath<'_>>) -> Result<Target<'_>> {
        let mut current = Some(self);

        while let Some(container) = current {
            let candidates = {
                let registry = container.inner.registry.read();
                if let Some(binding) = registry.get(key) {
                    return Ok(Target::Binding { owner: container, binding });
                }
                registry.implementations_of(key)
            };

            if let Some(first) = candidates.first() {
                if candidates.len() > 1 && self.inner.config.strict {
                    return Err(HaqnError::AmbiguousImplementation(AmbiguousImplementationError {
                        interface: *key,
                        candidates: candidates.iter().map(|c| *c.concrete()).collect(),
                    }));
                }
                return Ok(Target::Implementation(Arc::clone(first)));
            }

            current = container.inner.parent.as_ref();
        }

        Err(self.not_found(key, path))
    }

    fn not_found(&self, key: &DependencyKey, path: Option<&ResolutionPath<'_>>) -> HaqnError {
        let mut known = Vec::new();
        let mut current = Some(self);
        while let Some(container) = current {
            known.extend(container.inner.registry.read().type_names());
            current = container.inner.parent.as_ref();
        }
        known.sort_unstable();
        known.dedup();

        debug!(key = %key, "No binding found");
        HaqnError::BindingNotFound(BindingNotFoundError {
            requested: *key,
            required_by: path.map(|frame| *frame.key()),
            suggestions: suggest_similar(key.type_name(), &known, 3),
        })
    }

    /// Applies the binding's lifetime: reuse a cached instance or build one.
    fn instantiate(
        &self,
        owner: &Container,
        binding: &Binding,
        scope_id: Option<&str>,
        path: Option<&ResolutionPath<'_>>,
    ) -> Result<Instance> {
        let factory = match binding.recipe() {
            Recipe::Instance(instance) => return Ok(instance.clone()),
            Recipe::Factory(factory) => factory,
        };
        let key = binding.key();

        match binding.lifetime() {
            Lifetime::Singleton => {
                let cache = &owner.inner.singletons;
                if let Some(hit) = cache.get(key) {
                    return Ok(hit);
                }
                guard_cycle(key, path)?;
                // dependencies come from the owning container, never from the resolving child
                cache.get_or_build(key, path, || owner.construct(key, factory, scope_id, path))
            }
            Lifetime::Scoped => {
                let Some(id) = scope_id else {
                    return Err(scope_not_active(key, None));
                };
                let cache = self.scope_cache(id).ok_or_else(|| scope_not_active(key, Some(id)))?;
                if let Some(hit) = cache.get(key) {
                    return Ok(hit);
                }
                guard_cycle(key, path)?;
                cache.get_or_build(key, path, || self.construct(key, factory, scope_id, path))
            }
            Lifetime::Transient => {
                guard_cycle(key, path)?;
                self.construct(key, factory, scope_id, path)
            }
        }
    }

    /// Runs a factory with `key` pushed onto the resolution path.
    fn construct(
        &self,
        key: &DependencyKey,
        factory: &FactoryFn,
        scope_id: Option<&str>,
        path: Option<&ResolutionPath<'_>>,
    ) -> Result<Instance> {
        let frame = ResolutionPath::push(path, key);
        let resolver = ContainerResolver {
            container: self,
            scope_id,
            path: &frame,
        };
        debug!(key = %key, scope = scope_id, "Constructing");
        factory(&resolver)
    }

    // ── Scopes ──

    /// Starts scope `id` and returns a handle resolving inside it.
    ///
    /// Beginning an active id resets its cache.
    pub fn begin_scope(&self, id: &str) -> ScopedContainer<'_> {
        self.inner.scopes.begin(id);
        ScopedContainer {
            container: self,
            id: id.to_owned(),
        }
    }

    /// Ends scope `id` and drops its instances. Returns `false` if it was
    /// not active in this container.
    pub fn end_scope(&self, id: &str) -> bool {
        self.inner.scopes.end(id)
    }

    /// Handle for an already active scope, here or in a parent.
    pub fn scope(&self, id: &str) -> Option<ScopedContainer<'_>> {
        self.is_scope_active(id).then(|| ScopedContainer {
            container: self,
            id: id.to_owned(),
        })
    }

    pub fn is_scope_active(&self, id: &str) -> bool {
        self.inner.scopes.is_active(id)
            || self.inner.parent.as_ref().is_some_and(|parent| parent.is_scope_active(id))
    }

    /// Ids of the scopes active in this container, sorted.
    pub fn active_scopes(&self) -> Vec<String> {
        self.inner.scopes.ids()
    }

    fn scope_cache(&self, id: &str) -> Option<Arc<InstanceCache>> {
        let mut current = Some(self);
        while let Some(container) = current {
            if let Some(cache) = container.inner.scopes.get(id) {
                return Some(cache);
            }
            current = container.inner.parent.as_ref();
        }
        None
    }

    // ── Hierarchy & validation ──

    /// A container whose misses are looked up in `self`.
    ///
    /// The child has its own bindings, singletons and scopes. Singletons
    /// found in the parent stay cached in the parent.
    pub fn create_child(&self) -> Container {
        debug!("Creating child container");
        Self::from_parts(Registry::new(), self.inner.config, Some(self.clone()))
    }

    pub fn parent(&self) -> Option<&Container> {
        self.inner.parent.as_ref()
    }

    /// Checks this container's declared graph for cycles and singletons
    /// capturing scoped bindings.
    #[instrument(skip(self), name = "container_validate")]
    pub fn validate(&self) -> Result<()> {
        let (nodes, implementations) = {
            let registry = self.inner.registry.read();
            let nodes: Vec<DependencyInfo> = registry
                .bindings()
                .map(|binding| DependencyInfo {
                    key: *binding.key(),
                    dependencies: binding.dependencies().to_vec(),
                    lifetime: binding.lifetime(),
                })
                .collect();
            let implementations: Vec<(DependencyKey, DependencyKey)> = registry
                .implementations()
                .iter()
                .map(|implementation| (*implementation.interface(), *implementation.concrete()))
                .collect();
            (nodes, implementations)
        };

        GraphValidator::new(nodes, implementations).validate()
    }
}

fn guard_cycle(key: &DependencyKey, path: Option<&ResolutionPath<'_>>) -> Result<()> {
    match path.and_then(|frame| frame.cycle_with(key)) {
        Some(cycle) => {
            warn!(key = %key, chain = ?cycle.chain, "Circular dependency detected");
            Err(HaqnError::CircularDependency(cycle))
        }
        None => Ok(()),
    }
}

fn scope_not_active(key: &DependencyKey, scope_id: Option<&str>) -> HaqnError {
    HaqnError::ScopeNotActive(ScopeNotActiveError {
        key: *key,
        scope_id: scope_id.map(str::to_owned),
    })
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("registered", &self.len())
            .field("scopes", &self.inner.scopes.len())
            .field("child", &self.inner.parent.is_some())
            .finish()
    }
}

// ═══════════════════════════════════════════
// ScopedContainer
// ═══════════════════════════════════════════

/// Resolves inside one scope of a container.
///
/// The handle does not own the scope: dropping it keeps the scope alive
/// until [`end`](ScopedContainer::end) or [`Container::end_scope`].
pub struct ScopedContainer<'a> {
    container: &'a Container,
    id: String,
}

impl ScopedContainer<'_> {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        self.container.resolve_in::<T>(&self.id)
    }

    pub fn resolve_owned<T: Clone + Send + Sync + 'static>(&self) -> Result<T> {
        self.resolve::<T>().map(|shared| T::clone(&shared))
    }

    pub fn resolve_named<T: ?Sized + Send + Sync + 'static>(&self, name: &'static str) -> Result<Arc<T>> {
        self.container
            .resolve_typed(DependencyKey::named::<T>(name), Some(&self.id))
    }

    pub fn resolve_key(&self, key: &DependencyKey) -> Result<Instance> {
        self.container.resolve_key(key, Some(&self.id))
    }

    pub fn is_active(&self) -> bool {
        self.container.is_scope_active(&self.id)
    }

    /// Ends the scope, dropping its instances.
    pub fn end(self) -> bool {
        self.container.end_scope(&self.id)
    }
}

impl fmt::Debug for ScopedContainer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedContainer").field("id", &self.id).finish()
    }
}

// ═══════════════════════════════════════════
// ContainerResolver (internal bridge)
// ═══════════════════════════════════════════

/// Resolver handed to one factory call. Carries the caller's scope and the
/// resolution path so nested resolutions see both.
struct ContainerResolver<'a> {
    container: &'a Container,
    scope_id: Option<&'a str>,
    path: &'a ResolutionPath<'a>,
}

impl Resolver for ContainerResolver<'_> {
    fn resolve_key(&self, key: &DependencyKey) -> Result<Instance> {
        self.container.resolve_with_path(key, self.scope_id, Some(self.path))
    }

    fn scope_id(&self) -> Option<&str> {
        self.scope_id
    }
}

// ═══════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════

pub mod prelude {
    pub use super::{Container, ContainerBuilder, ScopedContainer};
    pub use crate::binding::{Binding, Implementation, RawFactory};
    pub use crate::config::ContainerConfig;
    pub use crate::error::{BoxError, HaqnError, Result};
    pub use crate::factory::Factory;
    pub use crate::injectable::{FromResolver, Injectable};
    pub use crate::instance::Instance;
    pub use crate::key::DependencyKey;
    pub use crate::lifetime::Lifetime;
    pub use crate::provider::{Provider, ProviderEntry, ProviderRegistry};
    pub use crate::registry::Resolver;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::RawFactory;
    use crate::error::BoxError;
    use crate::injectable::FromResolver;
    use std::sync::Barrier;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    trait Logger: Send + Sync {
        fn name(&self) -> &'static str;
    }

    struct ConsoleLogger;
    impl Logger for ConsoleLogger {
        fn name(&self) -> &'static str {
            "console"
        }
    }

    struct FileLogger;
    impl Logger for FileLogger {
        fn name(&self) -> &'static str {
            "file"
        }
    }

    #[derive(Debug, Clone)]
    struct Config {
        url: &'static str,
    }

    #[derive(Debug)]
    struct Database {
        url: &'static str,
    }

    #[derive(Debug)]
    struct Repository {
        db: Arc<Database>,
    }

    #[derive(Debug)]
    struct RequestId(usize);

    struct Handler {
        request: Arc<RequestId>,
    }

    #[derive(Debug)]
    struct Ping;
    #[derive(Debug)]
    struct Pong;

    fn counting<T: Send + Sync + 'static>(
        counter: &Arc<AtomicUsize>,
        make: fn(usize) -> T,
    ) -> impl Fn() -> std::result::Result<T, BoxError> + Send + Sync + 'static {
        let counter = Arc::clone(counter);
        move || Ok(make(counter.fetch_add(1, Ordering::SeqCst)))
    }

    #[test]
    fn resolve_instance() {
        let container = Container::builder()
            .instance(Config { url: "postgres://localhost" })
            .build()
            .unwrap();

        let config = container.resolve::<Config>().unwrap();
        assert_eq!(config.url, "postgres://localhost");

        let owned: Config = container.resolve_owned().unwrap();
        assert_eq!(owned.url, "postgres://localhost");
    }

    #[test]
    fn factory_receives_dependencies() {
        let container = Container::builder()
            .instance(Config { url: "sqlite::memory:" })
            .singleton::<Database, _>(|config: Arc<Config>| Ok(Database { url: config.url }))
            .transient::<Repository, _>(|db: Arc<Database>| Ok(Repository { db }))
            .build()
            .unwrap();

        let repo = container.resolve::<Repository>().unwrap();
        assert_eq!(repo.db.url, "sqlite::memory:");
    }

    #[test]
    fn singleton_is_built_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        let container = Container::builder()
            .singleton::<RequestId, _>(counting(&counter, RequestId))
            .build()
            .unwrap();

        let first = container.resolve::<RequestId>().unwrap();
        let second = container.resolve::<RequestId>().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn transient_is_built_every_time() {
        let counter = Arc::new(AtomicUsize::new(0));
        let container = Container::builder()
            .transient::<RequestId, _>(counting(&counter, RequestId))
            .build()
            .unwrap();

        let first = container.resolve::<RequestId>().unwrap();
        let second = container.resolve::<RequestId>().unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!((first.0, second.0), (0, 1));
    }

    #[test]
    fn factory_shapes_are_normalized() {
        let container = Container::builder()
            .singleton::<Database, _>(|| Ok(Arc::new(Database { url: "shared" })))
            .singleton::<dyn Logger, _>(|| Ok(Box::new(FileLogger) as Box<dyn Logger>))
            .build()
            .unwrap();

        assert_eq!(container.resolve::<Database>().unwrap().url, "shared");
        assert_eq!(container.resolve::<dyn Logger>().unwrap().name(), "file");
    }

    #[test]
    fn scoped_requires_active_scope() {
        let container = Container::builder()
            .scoped::<RequestId, _>(|| Ok(RequestId(0)))
            .build()
            .unwrap();

        let err = container.resolve::<RequestId>().unwrap_err();
        assert!(matches!(&err, HaqnError::ScopeNotActive(e) if e.scope_id.is_none()));

        let err = container.resolve_in::<RequestId>("missing").unwrap_err();
        assert!(matches!(&err, HaqnError::ScopeNotActive(e) if e.scope_id.as_deref() == Some("missing")));
    }

    #[test]
    fn scopes_are_isolated() {
        let counter = Arc::new(AtomicUsize::new(0));
        let container = Container::builder()
            .scoped::<RequestId, _>(counting(&counter, RequestId))
            .build()
            .unwrap();

        let a = container.begin_scope("a");
        let b = container.begin_scope("b");

        let a1 = a.resolve::<RequestId>().unwrap();
        let a2 = a.resolve::<RequestId>().unwrap();
        let b1 = b.resolve::<RequestId>().unwrap();

        assert!(Arc::ptr_eq(&a1, &a2));
        assert!(!Arc::ptr_eq(&a1, &b1));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn ended_scope_rejects_resolution() {
        let container = Container::builder()
            .scoped::<RequestId, _>(|| Ok(RequestId(1)))
            .build()
            .unwrap();

        let scope = container.begin_scope("req");
        scope.resolve::<RequestId>().unwrap();
        assert!(scope.end());

        assert!(!container.is_scope_active("req"));
        assert!(container.scope("req").is_none());
        assert!(matches!(
            container.resolve_in::<RequestId>("req"),
            Err(HaqnError::ScopeNotActive(_))
        ));
        assert!(!container.end_scope("req"));
    }

    #[test]
    fn beginning_a_scope_again_resets_it() {
        let counter = Arc::new(AtomicUsize::new(0));
        let container = Container::builder()
            .scoped::<RequestId, _>(counting(&counter, RequestId))
            .build()
            .unwrap();

        let before = container.begin_scope("req").resolve::<RequestId>().unwrap();
        let after = container.begin_scope("req").resolve::<RequestId>().unwrap();

        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(container.active_scopes(), vec!["req".to_string()]);
    }

    #[test]
    fn transient_sees_caller_scope() {
        let counter = Arc::new(AtomicUsize::new(0));
        let container = Container::builder()
            .scoped::<RequestId, _>(counting(&counter, RequestId))
            .transient::<Handler, _>(|request: Arc<RequestId>| Ok(Handler { request }))
            .build()
            .unwrap();

        let scope = container.begin_scope("req");
        let first = scope.resolve::<Handler>().unwrap();
        let second = scope.resolve::<Handler>().unwrap();

        assert!(Arc::ptr_eq(&first.request, &second.request));
    }

    #[test]
    fn detects_two_step_cycle() {
        let container = Container::builder()
            .validate_on_build(false)
            .transient::<Ping, _>(|_pong: Arc<Pong>| Ok(Ping))
            .transient::<Pong, _>(|_ping: Arc<Ping>| Ok(Pong))
            .build()
            .unwrap();

        match container.resolve::<Ping>() {
            Err(HaqnError::CircularDependency(err)) => {
                let chain: Vec<_> = err.chain.iter().map(|key| key.short_name()).collect();
                assert_eq!(chain, ["Ping", "Pong", "Ping"]);
            }
            other => panic!("expected a cycle, got {other:?}"),
        }
    }

    #[test]
    fn detects_singleton_cycle_without_deadlock() {
        let container = Container::builder()
            .validate_on_build(false)
            .singleton::<Ping, _>(|_pong: Arc<Pong>| Ok(Ping))
            .singleton::<Pong, _>(|_ping: Arc<Ping>| Ok(Pong))
            .build()
            .unwrap();

        assert!(matches!(container.resolve::<Pong>(), Err(HaqnError::CircularDependency(_))));
        // the failed construction leaves the slot empty, so it fails the same way again
        assert!(matches!(container.resolve::<Pong>(), Err(HaqnError::CircularDependency(_))));
    }

    #[test]
    fn crossed_singletons_on_two_threads_fail_instead_of_hanging() {
        fn waits_then_resolves<T, Other>(value: fn() -> T) -> Binding
        where
            T: Send + Sync + 'static,
            Other: Send + Sync + 'static,
        {
            // undeclared dependency, so build-time validation cannot see the cycle
            let factory = RawFactory::new(DependencyKey::of::<T>(), move |resolver: &dyn Resolver| {
                thread::sleep(Duration::from_millis(150));
                resolver.resolve::<Other>()?;
                Ok(Instance::from_value(value()))
            });
            Binding::raw(DependencyKey::of::<T>(), Lifetime::Singleton, factory)
        }

        let container = Container::builder()
            .bind(waits_then_resolves::<Ping, Pong>(|| Ping))
            .bind(waits_then_resolves::<Pong, Ping>(|| Pong))
            .build()
            .unwrap();

        let start = Arc::new(Barrier::new(2));
        let (tx, rx) = std::sync::mpsc::channel();
        for first in ["ping", "pong"] {
            let (container, start, tx) = (container.clone(), Arc::clone(&start), tx.clone());
            thread::spawn(move || {
                start.wait();
                let failed_with_cycle = match first {
                    "ping" => matches!(container.resolve::<Ping>(), Err(HaqnError::CircularDependency(_))),
                    _ => matches!(container.resolve::<Pong>(), Err(HaqnError::CircularDependency(_))),
                };
                let _ = tx.send(failed_with_cycle);
            });
        }

        for _ in 0..2 {
            let failed_with_cycle = rx
                .recv_timeout(Duration::from_secs(10))
                .expect("resolution deadlocked");
            assert!(failed_with_cycle);
        }
    }

    #[test]
    fn detects_self_cycle() {
        let container = Container::builder()
            .validate_on_build(false)
            .transient::<Ping, _>(|_ping: Arc<Ping>| Ok(Ping))
            .build()
            .unwrap();

        match container.resolve::<Ping>() {
            Err(HaqnError::CircularDependency(err)) => assert_eq!(err.chain.len(), 2),
            other => panic!("expected a cycle, got {other:?}"),
        }
    }

    #[test]
    fn build_rejects_cycles() {
        let result = Container::builder()
            .transient::<Ping, _>(|_pong: Arc<Pong>| Ok(Ping))
            .transient::<Pong, _>(|_ping: Arc<Ping>| Ok(Pong))
            .build();

        assert!(matches!(result, Err(HaqnError::CircularDependency(_))));
    }

    #[test]
    fn build_rejects_singleton_capturing_scoped() {
        let result = Container::builder()
            .scoped::<RequestId, _>(|| Ok(RequestId(0)))
            .singleton::<Handler, _>(|request: Arc<RequestId>| Ok(Handler { request }))
            .build();

        assert!(matches!(result, Err(HaqnError::ScopeMismatch(_))));
    }

    #[test]
    fn build_rejects_singleton_capturing_scoped_through_transient() {
        struct Audit {
            _request: Arc<RequestId>,
        }
        struct Reporter {
            _audit: Arc<Audit>,
        }

        let result = Container::builder()
            .scoped::<RequestId, _>(|| Ok(RequestId(0)))
            .transient::<Audit, _>(|request: Arc<RequestId>| Ok(Audit { _request: request }))
            .singleton::<Reporter, _>(|audit: Arc<Audit>| Ok(Reporter { _audit: audit }))
            .build();

        match result.err() {
            Some(HaqnError::ScopeMismatch(mismatch)) => {
                assert_eq!(mismatch.consumer, DependencyKey::of::<Reporter>());
                assert_eq!(mismatch.dependency, DependencyKey::of::<RequestId>());
            }
            other => panic!("expected ScopeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn missing_binding_suggests_named_bindings_once() {
        let parent = Container::builder()
            .bind(Binding::instance(Database { url: "primary" }).named("primary"))
            .build()
            .unwrap();
        let child = parent.create_child();
        child
            .bind(Binding::instance(Database { url: "replica" }).named("replica"))
            .unwrap();

        match child.resolve::<Database>() {
            Err(HaqnError::BindingNotFound(err)) => {
                assert_eq!(err.suggestions, vec![std::any::type_name::<Database>()]);
            }
            other => panic!("expected BindingNotFound, got {other:?}"),
        }
    }

    #[test]
    fn missing_binding() {
        let container = Container::new();

        match container.resolve::<Database>() {
            Err(HaqnError::BindingNotFound(err)) => {
                assert_eq!(err.requested, DependencyKey::of::<Database>());
                assert!(err.required_by.is_none());
            }
            other => panic!("expected BindingNotFound, got {other:?}"),
        }
    }

    #[test]
    fn missing_dependency_names_its_consumer() {
        let container = Container::builder()
            .transient::<Repository, _>(|db: Arc<Database>| Ok(Repository { db }))
            .build()
            .unwrap();

        match container.resolve::<Repository>() {
            Err(HaqnError::BindingNotFound(err)) => {
                assert_eq!(err.requested, DependencyKey::of::<Database>());
                assert_eq!(err.required_by, Some(DependencyKey::of::<Repository>()));
            }
            other => panic!("expected BindingNotFound, got {other:?}"),
        }
    }

    #[test]
    fn factory_errors_are_wrapped() {
        let container = Container::builder()
            .singleton::<Database, _>(|| Err::<Database, _>(BoxError::from("connection refused")))
            .build()
            .unwrap();

        match container.resolve::<Database>() {
            Err(HaqnError::FactoryConstruction { key, source }) => {
                assert_eq!(key, DependencyKey::of::<Database>());
                assert_eq!(source.to_string(), "connection refused");
            }
            other => panic!("expected FactoryConstruction, got {other:?}"),
        }
    }

    #[test]
    fn failed_singleton_is_retried() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let container = Container::builder()
            .singleton::<Database, _>({
                let attempts = Arc::clone(&attempts);
                move || {
                    if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(BoxError::from("not yet"))
                    } else {
                        Ok(Database { url: "retried" })
                    }
                }
            })
            .build()
            .unwrap();

        assert!(container.resolve::<Database>().is_err());
        assert_eq!(container.resolve::<Database>().unwrap().url, "retried");
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn implementation_search_resolves_interface() {
        let container = Container::builder()
            .singleton::<ConsoleLogger, _>(|| Ok(ConsoleLogger))
            .implements::<ConsoleLogger, dyn Logger>(|logger| logger as Arc<dyn Logger>)
            .build()
            .unwrap();

        let logger = container.resolve::<dyn Logger>().unwrap();
        assert_eq!(logger.name(), "console");
        assert!(container.contains_key(&DependencyKey::of::<dyn Logger>()));
    }

    #[test]
    fn first_registered_implementation_wins() {
        let container = Container::builder()
            .singleton::<ConsoleLogger, _>(|| Ok(ConsoleLogger))
            .singleton::<FileLogger, _>(|| Ok(FileLogger))
            .implements::<ConsoleLogger, dyn Logger>(|logger| logger as Arc<dyn Logger>)
            .implements::<FileLogger, dyn Logger>(|logger| logger as Arc<dyn Logger>)
            .build()
            .unwrap();

        assert_eq!(container.resolve::<dyn Logger>().unwrap().name(), "console");
    }

    #[test]
    fn ambiguity_is_reported_once_at_registration() {
        use tracing::{Event, Level, Subscriber};
        use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

        struct CountWarnings(Arc<AtomicUsize>);
        impl<S: Subscriber> Layer<S> for CountWarnings {
            fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
                if *event.metadata().level() == Level::WARN {
                    self.0.fetch_add(1, Ordering::SeqCst);
                }
            }
        }

        let warnings = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(CountWarnings(Arc::clone(&warnings)));
        tracing::subscriber::with_default(subscriber, || {
            let container = Container::builder()
                .singleton::<ConsoleLogger, _>(|| Ok(ConsoleLogger))
                .singleton::<FileLogger, _>(|| Ok(FileLogger))
                .implements::<ConsoleLogger, dyn Logger>(|logger| logger as Arc<dyn Logger>)
                .implements::<FileLogger, dyn Logger>(|logger| logger as Arc<dyn Logger>)
                .build()
                .unwrap();
            assert_eq!(warnings.load(Ordering::SeqCst), 1);

            for _ in 0..5 {
                assert_eq!(container.resolve::<dyn Logger>().unwrap().name(), "console");
            }
        });
        assert_eq!(warnings.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn strict_mode_rejects_ambiguous_implementations() {
        let container = Container::builder()
            .strict(true)
            .singleton::<ConsoleLogger, _>(|| Ok(ConsoleLogger))
            .singleton::<FileLogger, _>(|| Ok(FileLogger))
            .implements::<ConsoleLogger, dyn Logger>(|logger| logger as Arc<dyn Logger>)
            .implements::<FileLogger, dyn Logger>(|logger| logger as Arc<dyn Logger>)
            .build()
            .unwrap();

        match container.resolve::<dyn Logger>() {
            Err(HaqnError::AmbiguousImplementation(err)) => assert_eq!(err.candidates.len(), 2),
            other => panic!("expected AmbiguousImplementation, got {:?}", other.err()),
        }
    }

    #[test]
    fn direct_binding_beats_implementation() {
        let container = Container::builder()
            .singleton::<ConsoleLogger, _>(|| Ok(ConsoleLogger))
            .implements::<ConsoleLogger, dyn Logger>(|logger| logger as Arc<dyn Logger>)
            .shared::<dyn Logger>(Arc::new(FileLogger))
            .build()
            .unwrap();

        assert_eq!(container.resolve::<dyn Logger>().unwrap().name(), "file");
    }

    #[test]
    fn implementation_shares_the_concrete_singleton() {
        let container = Container::builder()
            .singleton::<ConsoleLogger, _>(|| Ok(ConsoleLogger))
            .implements::<ConsoleLogger, dyn Logger>(|logger| logger as Arc<dyn Logger>)
            .build()
            .unwrap();

        let concrete = container.resolve::<ConsoleLogger>().unwrap();
        let interface = container.resolve::<dyn Logger>().unwrap();
        assert!(std::ptr::addr_eq(Arc::as_ptr(&concrete), Arc::as_ptr(&interface)));
    }

    #[test]
    fn named_bindings() {
        let container = Container::builder()
            .bind(Binding::instance(Config { url: "primary" }).named("primary"))
            .bind(Binding::instance(Config { url: "replica" }).named("replica"))
            .build()
            .unwrap();

        assert_eq!(container.resolve_named::<Config>("primary").unwrap().url, "primary");
        assert_eq!(container.resolve_named::<Config>("replica").unwrap().url, "replica");
        assert!(container.resolve::<Config>().is_err());
    }

    #[test]
    fn duplicates_replace_by_default() {
        let container = Container::builder()
            .instance(Config { url: "first" })
            .instance(Config { url: "second" })
            .build()
            .unwrap();

        assert_eq!(container.len(), 1);
        assert_eq!(container.resolve::<Config>().unwrap().url, "second");
    }

    #[test]
    fn strict_mode_rejects_duplicates() {
        let result = Container::builder()
            .strict(true)
            .instance(Config { url: "first" })
            .instance(Config { url: "second" })
            .build();

        assert!(matches!(result, Err(HaqnError::AlreadyRegistered(_))));
    }

    #[test]
    fn rebinding_evicts_cached_singleton() {
        let container = Container::builder()
            .singleton::<Database, _>(|| Ok(Database { url: "old" }))
            .build()
            .unwrap();
        assert_eq!(container.resolve::<Database>().unwrap().url, "old");

        container
            .bind(Binding::singleton::<Database, _>(|| Ok(Database { url: "new" })))
            .unwrap();
        assert_eq!(container.resolve::<Database>().unwrap().url, "new");
    }

    #[test]
    fn invalid_raw_factory_is_rejected() {
        let container = Container::new();
        let factory = RawFactory::new(DependencyKey::of::<Config>(), |_resolver: &dyn Resolver| {
            Ok(Instance::from_value(Config { url: "wrong" }))
        });

        let result = container.bind(Binding::raw(DependencyKey::of::<Database>(), Lifetime::Transient, factory));
        assert!(matches!(result, Err(HaqnError::InvalidFactorySignature(_))));
        assert!(container.is_empty());
    }

    #[test]
    fn raw_factory_resolves() {
        let container = Container::new();
        container.bind(Binding::instance(Config { url: "raw" })).unwrap();
        let factory = RawFactory::new(DependencyKey::of::<Database>(), |resolver: &dyn Resolver| {
            let config = resolver.resolve::<Config>()?;
            Ok(Instance::from_value(Database { url: config.url }))
        })
        .depends_on(DependencyKey::of::<Config>());
        container
            .bind(Binding::raw(DependencyKey::of::<Database>(), Lifetime::Singleton, factory))
            .unwrap();

        assert_eq!(container.resolve::<Database>().unwrap().url, "raw");
        container.validate().unwrap();
    }

    #[test]
    fn unbind_and_clear() {
        let container = Container::builder()
            .instance(Config { url: "x" })
            .singleton::<Database, _>(|| Ok(Database { url: "y" }))
            .build()
            .unwrap();

        assert!(container.unbind::<Config>());
        assert!(!container.unbind::<Config>());
        assert!(container.resolve::<Config>().is_err());

        container.clear();
        assert!(container.is_empty());
        assert!(container.resolve::<Database>().is_err());
    }

    #[test]
    fn child_delegates_to_parent() {
        let parent = Container::builder()
            .singleton::<Database, _>(|| Ok(Database { url: "parent" }))
            .instance(Config { url: "parent" })
            .build()
            .unwrap();

        let child = parent.create_child();
        child.bind(Binding::instance(Config { url: "child" })).unwrap();

        assert_eq!(child.resolve::<Config>().unwrap().url, "child");
        assert_eq!(parent.resolve::<Config>().unwrap().url, "parent");
        assert!(Arc::ptr_eq(
            &child.resolve::<Database>().unwrap(),
            &parent.resolve::<Database>().unwrap()
        ));
        assert!(child.parent().is_some());
    }

    #[test]
    fn parent_singleton_ignores_child_overrides() {
        let parent = Container::builder()
            .instance(Config { url: "parent" })
            .singleton::<Database, _>(|config: Arc<Config>| Ok(Database { url: config.url }))
            .build()
            .unwrap();

        let child = parent.create_child();
        child.bind(Binding::instance(Config { url: "child" })).unwrap();

        assert_eq!(child.resolve::<Database>().unwrap().url, "parent");
        assert_eq!(parent.resolve::<Database>().unwrap().url, "parent");
        assert_eq!(child.resolve::<Config>().unwrap().url, "child");
    }

    #[test]
    fn child_sees_parent_scopes() {
        let parent = Container::builder()
            .scoped::<RequestId, _>(|| Ok(RequestId(9)))
            .build()
            .unwrap();
        let child = parent.create_child();

        let scope = parent.begin_scope("req");
        let from_parent = scope.resolve::<RequestId>().unwrap();
        let from_child = child.resolve_in::<RequestId>("req").unwrap();

        assert!(Arc::ptr_eq(&from_parent, &from_child));
        assert!(child.active_scopes().is_empty());
    }

    #[test]
    fn injectable_with_optional_dependency() {
        struct Audit;

        struct Checkout {
            db: Arc<Database>,
            audit: Option<Arc<Audit>>,
        }

        impl Injectable for Checkout {
            fn lifetime() -> Lifetime {
                Lifetime::Scoped
            }

            fn dependencies() -> Vec<DependencyKey> {
                vec![DependencyKey::of::<Database>()]
            }

            fn inject(resolver: &dyn Resolver) -> Result<Self> {
                Ok(Self {
                    db: FromResolver::from_resolver(resolver)?,
                    audit: FromResolver::from_resolver(resolver)?,
                })
            }
        }

        let container = Container::builder()
            .singleton::<Database, _>(|| Ok(Database { url: "db" }))
            .injectable::<Checkout>()
            .build()
            .unwrap();

        let scope = container.begin_scope("order-1");
        let checkout = scope.resolve::<Checkout>().unwrap();
        assert_eq!(checkout.db.url, "db");
        assert!(checkout.audit.is_none());
        assert!(Arc::ptr_eq(&checkout, &scope.resolve::<Checkout>().unwrap()));
    }

    #[test]
    fn providers_register_bindings() {
        struct StorageProvider;

        impl Provider for StorageProvider {
            fn register(&self, registry: &mut dyn ProviderRegistry) {
                registry.bind(Binding::instance(Config { url: "provided" }));
                registry.bind(Binding::singleton::<Database, _>(|config: Arc<Config>| {
                    Ok(Database { url: config.url })
                }));
            }
        }

        let container = Container::builder().add_provider(&StorageProvider).build().unwrap();
        assert_eq!(container.resolve::<Database>().unwrap().url, "provided");
    }

    fn register_ping(registry: &mut dyn ProviderRegistry) {
        registry.bind(Binding::transient::<Ping, _>(|| Ok(Ping)));
    }

    inventory::submit! {
        crate::provider::ProviderEntry::new("container-tests", register_ping)
    }

    #[test]
    fn submitted_providers_are_applied() {
        let container = Container::builder().with_submitted_providers().build().unwrap();
        assert!(container.resolve::<Ping>().is_ok());
    }

    #[test]
    fn concurrent_first_access_builds_singleton_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        let container = Container::builder()
            .singleton::<RequestId, _>({
                let counter = Arc::clone(&counter);
                move || {
                    thread::sleep(Duration::from_millis(10));
                    Ok(RequestId(counter.fetch_add(1, Ordering::SeqCst)))
                }
            })
            .build()
            .unwrap();

        let barrier = Arc::new(Barrier::new(100));
        let handles: Vec<_> = (0..100)
            .map(|_| {
                let container = container.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    container.resolve::<RequestId>().unwrap()
                })
            })
            .collect();

        let instances: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(instances.iter().all(|i| Arc::ptr_eq(i, &instances[0])));
    }

    #[test]
    fn concurrent_resolutions_do_not_report_cycles() {
        let container = Container::builder()
            .singleton::<Database, _>(|| {
                thread::sleep(Duration::from_millis(5));
                Ok(Database { url: "db" })
            })
            .transient::<Repository, _>(|db: Arc<Database>| Ok(Repository { db }))
            .build()
            .unwrap();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let container = container.clone();
                thread::spawn(move || container.resolve::<Repository>().map(|repo| repo.db.url))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), "db");
        }
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn resolve_on_blocking_pool() {
        let container = Container::builder()
            .singleton::<Database, _>(|| Ok(Database { url: "async" }))
            .scoped::<RequestId, _>(|| Ok(RequestId(3)))
            .build()
            .unwrap();

        assert_eq!(container.resolve_async::<Database>().await.unwrap().url, "async");

        container.begin_scope("task");
        assert_eq!(container.resolve_in_async::<RequestId>("task").await.unwrap().0, 3);
    }

    #[test]
    fn debug_output() {
        let container = Container::builder().instance(Config { url: "x" }).build().unwrap();
        let rendered = format!("{container:?}");
        assert!(rendered.contains("registered: 1"));
    }
}
