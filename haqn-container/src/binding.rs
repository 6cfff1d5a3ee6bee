//! Bindings: what the container knows how to build.
//!
//! A [`Binding`] ties one [`DependencyKey`] to a recipe (a ready instance
//! or a factory) and a [`Lifetime`]. An [`Implementation`] declares that a
//! concrete binding can stand in for an interface (`dyn Trait`) that has no
//! binding of its own.

use std::fmt;
use std::sync::Arc;

use crate::error::{HaqnError, InvalidFactorySignatureError, Result};
use crate::factory::Factory;
use crate::injectable::Injectable;
use crate::instance::Instance;
use crate::key::DependencyKey;
use crate::lifetime::Lifetime;
use crate::registry::{FactoryFn, Resolver};

#[derive(Clone)]
pub(crate) enum Recipe {
    Instance(Instance),
    Factory(FactoryFn),
}

/// Recipe and lifetime for one key.
///
/// ```rust
/// use haqn_container::binding::Binding;
/// use haqn_container::lifetime::Lifetime;
/// use std::sync::Arc;
///
/// struct Clock;
/// struct Scheduler { clock: Arc<Clock> }
///
/// let clock = Binding::instance(Clock);
/// let scheduler = Binding::transient::<Scheduler, _>(|clock: Arc<Clock>| Ok(Scheduler { clock }));
///
/// assert_eq!(clock.lifetime(), Lifetime::Singleton);
/// assert_eq!(scheduler.dependencies().len(), 1);
/// ```
#[derive(Clone)]
pub struct Binding {
    key: DependencyKey,
    lifetime: Lifetime,
    recipe: Recipe,
    dependencies: Vec<DependencyKey>,
    produces: DependencyKey,
}

impl Binding {
    /// A ready value, shared by every resolution.
    pub fn instance<T: Send + Sync + 'static>(value: T) -> Self {
        Self::shared(Arc::new(value))
    }

    /// A ready shared pointer, e.g. an `Arc<dyn Trait>`.
    pub fn shared<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self {
            key: DependencyKey::of::<T>(),
            lifetime: Lifetime::Singleton,
            recipe: Recipe::Instance(Instance::new(value)),
            dependencies: Vec::new(),
            produces: DependencyKey::of::<T>(),
        }
    }

    /// A factory with the given lifetime.
    pub fn factory<T, Args, F>(lifetime: Lifetime, factory: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Factory<T, Args>,
    {
        let dependencies = F::dependencies();
        let erased: FactoryFn = Arc::new(move |resolver: &dyn Resolver| factory.build(resolver).map(Instance::new));
        Self {
            key: DependencyKey::of::<T>(),
            lifetime,
            recipe: Recipe::Factory(erased),
            dependencies,
            produces: DependencyKey::of::<T>(),
        }
    }

    /// Built once per container.
    pub fn singleton<T, Args>(factory: impl Factory<T, Args>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Self::factory(Lifetime::Singleton, factory)
    }

    /// Built once per scope.
    pub fn scoped<T, Args>(factory: impl Factory<T, Args>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Self::factory(Lifetime::Scoped, factory)
    }

    /// Built on every resolution.
    pub fn transient<T, Args>(factory: impl Factory<T, Args>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Self::factory(Lifetime::Transient, factory)
    }

    /// Binding for a type deriving [`Injectable`], with the lifetime it declares.
    pub fn injectable<T: Injectable>() -> Self {
        let erased: FactoryFn = Arc::new(|resolver: &dyn Resolver| T::inject(resolver).map(Instance::from_value));
        Self {
            key: DependencyKey::of::<T>(),
            lifetime: T::lifetime(),
            recipe: Recipe::Factory(erased),
            dependencies: T::dependencies(),
            produces: DependencyKey::of::<T>(),
        }
    }

    /// A dynamically keyed factory.
    ///
    /// The registry rejects it with
    /// [`InvalidFactorySignature`](HaqnError::InvalidFactorySignature) when
    /// the factory does not produce the type of `key`.
    pub fn raw(key: DependencyKey, lifetime: Lifetime, factory: RawFactory) -> Self {
        Self {
            key,
            lifetime,
            recipe: Recipe::Factory(factory.factory),
            dependencies: factory.dependencies,
            produces: factory.produces,
        }
    }

    /// Moves the binding under a named key.
    pub fn named(mut self, name: &'static str) -> Self {
        self.key = self.key.with_name(name);
        self
    }

    /// Overrides the lifetime.
    pub fn with_lifetime(mut self, lifetime: Lifetime) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn key(&self) -> &DependencyKey {
        &self.key
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    /// Keys the factory asks for; empty for ready instances.
    pub fn dependencies(&self) -> &[DependencyKey] {
        &self.dependencies
    }

    /// Key of the type the recipe produces.
    pub fn produces(&self) -> &DependencyKey {
        &self.produces
    }

    pub fn is_instance(&self) -> bool {
        matches!(self.recipe, Recipe::Instance(_))
    }

    pub(crate) fn recipe(&self) -> &Recipe {
        &self.recipe
    }

    /// Rejects recipes that cannot produce the bound type.
    pub(crate) fn check_signature(&self) -> Result<()> {
        let produced = match &self.recipe {
            Recipe::Instance(instance) => instance.key(),
            Recipe::Factory(_) => &self.produces,
        };
        if produced.same_type(&self.key) {
            return Ok(());
        }
        Err(HaqnError::InvalidFactorySignature(InvalidFactorySignatureError {
            key: self.key,
            produces: *produced,
        }))
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("key", &self.key)
            .field("lifetime", &self.lifetime)
            .field("instance", &self.is_instance())
            .field("dependencies", &self.dependencies)
            .finish()
    }
}

/// Type-erased factory for [`Binding::raw`].
pub struct RawFactory {
    produces: DependencyKey,
    dependencies: Vec<DependencyKey>,
    factory: FactoryFn,
}

impl RawFactory {
    /// `produces` is the key of the type `factory` returns instances of.
    pub fn new(
        produces: DependencyKey,
        factory: impl Fn(&dyn Resolver) -> Result<Instance> + Send + Sync + 'static,
    ) -> Self {
        Self {
            produces,
            dependencies: Vec::new(),
            factory: Arc::new(factory),
        }
    }

    /// Declares a dependency for build-time validation.
    pub fn depends_on(mut self, key: DependencyKey) -> Self {
        self.dependencies.push(key);
        self
    }
}

type Upcast = Arc<dyn Fn(&Instance) -> Option<Instance> + Send + Sync>;

/// Declares that the binding of `C` implements the interface `I`.
///
/// When `I` has no binding of its own, resolving it resolves `C` (with
/// `C`'s lifetime) and converts the result with `upcast`:
///
/// ```rust
/// use haqn_container::binding::Implementation;
/// use std::sync::Arc;
///
/// trait Logger: Send + Sync {}
/// struct ConsoleLogger;
/// impl Logger for ConsoleLogger {}
///
/// let logger = Implementation::new::<ConsoleLogger, dyn Logger>(|c| c as Arc<dyn Logger>);
/// assert!(logger.concrete().type_name().ends_with("ConsoleLogger"));
/// ```
#[derive(Clone)]
pub struct Implementation {
    interface: DependencyKey,
    concrete: DependencyKey,
    upcast: Upcast,
}

impl Implementation {
    pub fn new<C, I>(upcast: impl Fn(Arc<C>) -> Arc<I> + Send + Sync + 'static) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
        I: ?Sized + Send + Sync + 'static,
    {
        Self {
            interface: DependencyKey::of::<I>(),
            concrete: DependencyKey::of::<C>(),
            upcast: Arc::new(move |instance: &Instance| instance.downcast::<C>().map(|c| Instance::new(upcast(c)))),
        }
    }

    pub fn interface(&self) -> &DependencyKey {
        &self.interface
    }

    pub fn concrete(&self) -> &DependencyKey {
        &self.concrete
    }

    /// Converts an instance of the concrete type into the interface.
    pub(crate) fn apply(&self, concrete: &Instance) -> Result<Instance> {
        (self.upcast)(concrete).ok_or(HaqnError::TypeMismatch {
            key: self.concrete,
            found: concrete.key().type_name(),
        })
    }
}

impl fmt::Debug for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Implementation")
            .field("interface", &self.interface)
            .field("concrete", &self.concrete)
            .finish()
    }
}
