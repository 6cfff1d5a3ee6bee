//! Typed factories with injected parameters.
//!
//! Any `Fn(Arc<A1>, .., Arc<An>) -> Result<R, BoxError>` with up to eight
//! parameters is a [`Factory`] for `T` whenever `R: Into<Arc<T>>`. Each
//! parameter type is a dependency that gets resolved before the call, so a
//! factory declares what it needs simply by its signature:
//!
//! ```rust
//! use haqn_container::prelude::*;
//! use std::sync::Arc;
//!
//! struct Config { url: String }
//! struct Database { url: String }
//!
//! let container = Container::builder()
//!     .instance(Config { url: "postgres://localhost".into() })
//!     .singleton::<Database, _>(|config: Arc<Config>| {
//!         Ok(Database { url: config.url.clone() })
//!     })
//!     .build()
//!     .expect("container builds");
//!
//! let db = container.resolve::<Database>().expect("database resolves");
//! assert_eq!(db.url, "postgres://localhost");
//! ```
//!
//! Returning `T` auto-addresses the value into an `Arc<T>`; returning an
//! `Arc<T>` or `Box<T>` is kept as is. Trait objects are built by returning
//! `Arc<dyn Trait>`.

use std::sync::Arc;

use crate::error::{BoxError, HaqnError, Result};
use crate::key::DependencyKey;
use crate::registry::Resolver;

/// A callable that builds a `T` from resolved dependencies.
///
/// `Args` is the tuple of parameter pointers, `(Arc<A1>, .., Arc<An>)`; it
/// only exists to keep the implementations for different arities apart and
/// is always inferred. Holding `Arc`s keeps the tuple sized when a parameter
/// is a trait object.
pub trait Factory<T: ?Sized, Args>: Send + Sync + 'static {
    /// Keys of the parameters, in call order.
    fn dependencies() -> Vec<DependencyKey>;

    /// Resolves the parameters through `resolver` and calls the factory.
    ///
    /// Parameter resolution errors pass through untouched; an error returned
    /// by the factory itself becomes [`HaqnError::FactoryConstruction`].
    fn build(&self, resolver: &dyn Resolver) -> Result<Arc<T>>;
}

macro_rules! impl_factory {
    ($($arg:ident),*) => {
        impl<F, T, R, $($arg,)*> Factory<T, ($(Arc<$arg>,)*)> for F
        where
            F: Fn($(Arc<$arg>),*) -> std::result::Result<R, BoxError> + Send + Sync + 'static,
            T: ?Sized + Send + Sync + 'static,
            R: Into<Arc<T>>,
            $($arg: ?Sized + Send + Sync + 'static,)*
        {
            fn dependencies() -> Vec<DependencyKey> {
                vec![$(DependencyKey::of::<$arg>()),*]
            }

            #[allow(non_snake_case, unused_variables)]
            fn build(&self, resolver: &dyn Resolver) -> Result<Arc<T>> {
                $(let $arg = resolver.resolve::<$arg>()?;)*
                (self)($($arg),*)
                    .map(Into::into)
                    .map_err(|source| HaqnError::FactoryConstruction {
                        key: DependencyKey::of::<T>(),
                        source,
                    })
            }
        }
    };
}

impl_factory!();
impl_factory!(A1);
impl_factory!(A1, A2);
impl_factory!(A1, A2, A3);
impl_factory!(A1, A2, A3, A4);
impl_factory!(A1, A2, A3, A4, A5);
impl_factory!(A1, A2, A3, A4, A5, A6);
impl_factory!(A1, A2, A3, A4, A5, A6, A7);
impl_factory!(A1, A2, A3, A4, A5, A6, A7, A8);
