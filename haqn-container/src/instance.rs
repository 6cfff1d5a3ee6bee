//! Type-erased instances.
//!
//! Every binding is stored as an `Arc<T>` behind an [`Instance`]. That is
//! what lets one binding serve both shapes a caller may ask for: the shared
//! pointer (`Arc<T>`) or an owned value cloned out of it.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::{HaqnError, Result};
use crate::key::DependencyKey;

/// A constructed instance with its type erased.
///
/// Cloning an `Instance` clones a pointer, never the value: every clone
/// refers to the same allocation.
#[derive(Clone)]
pub struct Instance {
    key: DependencyKey,
    value: Arc<dyn Any + Send + Sync>,
}

impl Instance {
    /// Wraps a shared value of type `T`.
    ///
    /// `T` may be unsized, so `Arc<dyn Logger>` is stored as an instance of
    /// `dyn Logger`.
    pub fn new<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self {
            key: DependencyKey::of::<T>(),
            value: Arc::new(value),
        }
    }

    /// Wraps an owned value.
    pub fn from_value<T: Send + Sync + 'static>(value: T) -> Self {
        Self::new(Arc::new(value))
    }

    /// Key of the type this instance holds.
    pub fn key(&self) -> &DependencyKey {
        &self.key
    }

    /// Whether this instance holds a `T`.
    pub fn is<T: ?Sized + Send + Sync + 'static>(&self) -> bool {
        self.value.is::<Arc<T>>()
    }

    /// Shared pointer to the value, if it is a `T`.
    pub fn downcast<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.value.downcast_ref::<Arc<T>>().cloned()
    }

    /// Like [`downcast`](Self::downcast) but reports a mismatch as an error
    /// against `key`.
    pub(crate) fn expect<T: ?Sized + Send + Sync + 'static>(&self, key: &DependencyKey) -> Result<Arc<T>> {
        self.downcast::<T>().ok_or(HaqnError::TypeMismatch {
            key: *key,
            found: self.key.type_name(),
        })
    }

    /// `true` if both instances point to the same value.
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance").field("type", &self.key.type_name()).finish()
    }
}
