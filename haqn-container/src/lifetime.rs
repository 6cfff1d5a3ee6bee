//! Instance lifetimes.
//!
//! A [`Lifetime`] decides how long a constructed instance is reused:
//! - [`Lifetime::Singleton`]: one instance per container
//! - [`Lifetime::Scoped`]: one instance per named scope (e.g. a request)
//! - [`Lifetime::Transient`]: a new instance on every resolution
//!
//! # Ordering
//! Lifetimes order by how long the instance lives:
//! `Singleton > Scoped > Transient`.

use std::fmt;

/// How long a resolved instance lives.
///
/// ```
/// use haqn_container::lifetime::Lifetime;
///
/// assert!(Lifetime::Singleton > Lifetime::Scoped);
/// assert!(Lifetime::Scoped > Lifetime::Transient);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// Built on first resolution, reused until the container is dropped.
    ///
    /// Concurrent first resolutions construct the instance exactly once.
    Singleton,

    /// Built on first resolution inside a scope, dropped when the scope ends.
    ///
    /// Resolving a scoped binding without an active scope is an error.
    Scoped,

    /// Built on every resolution. The container keeps no reference.
    Transient,
}

impl Lifetime {
    /// `true` for lifetimes whose instances are cached.
    #[inline]
    pub fn is_cached(&self) -> bool {
        matches!(self, Lifetime::Singleton | Lifetime::Scoped)
    }

    /// `true` if resolution needs an active scope.
    #[inline]
    pub fn requires_scope(&self) -> bool {
        matches!(self, Lifetime::Scoped)
    }

    #[inline]
    fn rank(&self) -> u8 {
        match self {
            Lifetime::Singleton => 2,
            Lifetime::Scoped => 1,
            Lifetime::Transient => 0,
        }
    }
}

impl PartialOrd for Lifetime {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Lifetime {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Lifetime::Singleton => "Singleton",
            Lifetime::Scoped => "Scoped",
            Lifetime::Transient => "Transient",
        })
    }
}
