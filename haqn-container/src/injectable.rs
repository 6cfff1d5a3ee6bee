//! Types that know how to build themselves from the container.
//!
//! Usually derived:
//!
//! ```rust,ignore
//! #[derive(Injectable)]
//! #[injectable(lifetime = "scoped")]
//! struct CheckoutService {
//!     payments: Arc<dyn PaymentGateway>,
//!     audit: Option<Arc<AuditLog>>,
//!     #[inject(default)]
//!     attempts: u32,
//! }
//! ```

use std::sync::Arc;

use crate::error::{HaqnError, Result};
use crate::key::DependencyKey;
use crate::lifetime::Lifetime;
use crate::registry::Resolver;

/// A type the container can construct field by field.
pub trait Injectable: Sized + Send + Sync + 'static {
    /// Lifetime used by [`Binding::injectable`](crate::binding::Binding::injectable).
    fn lifetime() -> Lifetime {
        Lifetime::Transient
    }

    /// Required dependencies, for build-time validation.
    fn dependencies() -> Vec<DependencyKey>;

    /// Builds the value, resolving dependencies through `resolver`.
    fn inject(resolver: &dyn Resolver) -> Result<Self>;
}

/// A field type that can be filled from a [`Resolver`].
pub trait FromResolver: Sized {
    /// Key this field requires, `None` if it is optional.
    fn dependency() -> Option<DependencyKey>;

    fn from_resolver(resolver: &dyn Resolver) -> Result<Self>;
}

impl<T: ?Sized + Send + Sync + 'static> FromResolver for Arc<T> {
    fn dependency() -> Option<DependencyKey> {
        Some(DependencyKey::of::<T>())
    }

    fn from_resolver(resolver: &dyn Resolver) -> Result<Self> {
        resolver.resolve::<T>()
    }
}

/// Optional dependency: a missing binding for `T` gives `None`; every other
/// failure still propagates.
impl<T: ?Sized + Send + Sync + 'static> FromResolver for Option<Arc<T>> {
    fn dependency() -> Option<DependencyKey> {
        None
    }

    fn from_resolver(resolver: &dyn Resolver) -> Result<Self> {
        match resolver.resolve::<T>() {
            Ok(value) => Ok(Some(value)),
            Err(HaqnError::BindingNotFound(err)) if err.requested == DependencyKey::of::<T>() => Ok(None),
            Err(err) => Err(err),
        }
    }
}
