//! Error types for container operations.
//!
//! Every resolution failure names the type it failed on, so a caller such
//! as an HTTP handler can turn it into a 500 response that says *what* was
//! missing or cyclic instead of crashing.

use std::fmt;

use haqn_support::rendering::{render_chain, render_list, shorten_type_name};

use crate::key::DependencyKey;
use crate::lifetime::Lifetime;

/// Boxed error returned by user factories.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for all container operations.
#[derive(Debug, thiserror::Error)]
pub enum HaqnError {
    /// No binding, implementation or parent binding for the requested type.
    #[error("{}", .0)]
    BindingNotFound(BindingNotFoundError),

    /// A factory was rejected at registration time.
    #[error("{}", .0)]
    InvalidFactorySignature(InvalidFactorySignatureError),

    /// A factory (transitively) depends on the type it builds.
    #[error("{}", .0)]
    CircularDependency(CircularDependencyError),

    /// A scoped binding was resolved outside of an active scope.
    #[error("{}", .0)]
    ScopeNotActive(ScopeNotActiveError),

    /// A factory returned an error.
    #[error("Failed to construct {key}: {source}")]
    FactoryConstruction {
        key: DependencyKey,
        #[source]
        source: BoxError,
    },

    /// A longer-lived binding captures a scoped one.
    #[error("{}", .0)]
    ScopeMismatch(ScopeMismatchError),

    /// Second binding for a key while strict registration is on.
    #[error("{}", .0)]
    AlreadyRegistered(AlreadyRegisteredError),

    /// Several implementations match an interface while strict registration is on.
    #[error("{}", .0)]
    AmbiguousImplementation(AmbiguousImplementationError),

    /// A stored instance does not hold the type its key promised.
    #[error("Type mismatch for {key}: stored instance is {found}")]
    TypeMismatch {
        key: DependencyKey,
        found: &'static str,
    },

    /// The blocking task running an async resolution did not complete.
    #[cfg(feature = "async")]
    #[error("Resolution task failed: {0}")]
    TaskFailed(String),
}

impl HaqnError {
    /// The type the failure is about, when there is one.
    pub fn key(&self) -> Option<&DependencyKey> {
        match self {
            HaqnError::BindingNotFound(e) => Some(&e.requested),
            HaqnError::InvalidFactorySignature(e) => Some(&e.key),
            HaqnError::CircularDependency(e) => e.chain.first(),
            HaqnError::ScopeNotActive(e) => Some(&e.key),
            HaqnError::FactoryConstruction { key, .. } => Some(key),
            HaqnError::ScopeMismatch(e) => Some(&e.consumer),
            HaqnError::AlreadyRegistered(e) => Some(&e.key),
            HaqnError::AmbiguousImplementation(e) => Some(&e.interface),
            HaqnError::TypeMismatch { key, .. } => Some(key),
            #[cfg(feature = "async")]
            HaqnError::TaskFailed(_) => None,
        }
    }

    /// `true` if the error was raised while resolving, not while registering.
    pub fn is_resolution_error(&self) -> bool {
        !matches!(
            self,
            HaqnError::InvalidFactorySignature(_) | HaqnError::AlreadyRegistered(_)
        )
    }
}

/// Nothing can produce the requested type.
#[derive(Debug)]
pub struct BindingNotFoundError {
    pub requested: DependencyKey,
    /// Binding whose factory asked for the missing type, if any.
    pub required_by: Option<DependencyKey>,
    /// Registered types with similar names.
    pub suggestions: Vec<&'static str>,
}

impl fmt::Display for BindingNotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "No binding found for {}", self.requested)?;

        if let Some(parent) = self.required_by {
            write!(f, "\n  Required by: {parent}")?;
        }

        if !self.suggestions.is_empty() {
            write!(f, "\n  Did you mean one of:\n{}", render_list(&self.suggestions))?;
        }

        write!(
            f,
            "\n  Hint: bind {} or declare an implementation of it",
            shorten_type_name(self.requested.type_name())
        )
    }
}

/// A factory does not produce the type it is bound under.
#[derive(Debug)]
pub struct InvalidFactorySignatureError {
    pub key: DependencyKey,
    /// What the factory actually produces.
    pub produces: DependencyKey,
}

impl fmt::Display for InvalidFactorySignatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid factory for {}: it produces {}",
            self.key, self.produces
        )?;
        write!(
            f,
            "\n  Hint: a factory must return the bound type, an Arc of it or a Box of it"
        )
    }
}

/// A dependency cycle, with the chain that closes it.
#[derive(Debug)]
pub struct CircularDependencyError {
    /// Example: `[A, B, A]`.
    pub chain: Vec<DependencyKey>,
}

impl fmt::Display for CircularDependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Circular dependency detected:\n  {}",
            render_chain(self.chain.iter().map(|k| k.type_name()))
        )?;
        write!(
            f,
            "\n  Hint: break the cycle by moving the shared part into its own binding"
        )
    }
}

/// Scoped resolution without a usable scope.
#[derive(Debug)]
pub struct ScopeNotActiveError {
    pub key: DependencyKey,
    /// The scope id that was asked for, `None` if resolution had no scope.
    pub scope_id: Option<String>,
}

impl fmt::Display for ScopeNotActiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope_id {
            Some(id) => write!(f, "Scope {id:?} is not active; cannot resolve scoped {}", self.key)?,
            None => write!(f, "No scope given; cannot resolve scoped {}", self.key)?,
        }
        write!(f, "\n  Hint: call begin_scope() and resolve through the returned scope")
    }
}

/// A binding captures a dependency that dies before it does.
#[derive(Debug)]
pub struct ScopeMismatchError {
    pub dependency: DependencyKey,
    pub dependency_lifetime: Lifetime,
    pub consumer: DependencyKey,
    pub consumer_lifetime: Lifetime,
}

impl fmt::Display for ScopeMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Scope mismatch: {} ({}) depends on {} ({})",
            self.consumer, self.consumer_lifetime, self.dependency, self.dependency_lifetime,
        )?;
        write!(
            f,
            "\n  A {} instance would keep a {} instance alive after its scope ends",
            self.consumer_lifetime, self.dependency_lifetime,
        )
    }
}

/// Duplicate registration in strict mode.
#[derive(Debug)]
pub struct AlreadyRegisteredError {
    pub key: DependencyKey,
}

impl fmt::Display for AlreadyRegisteredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Binding already registered: {}", self.key)?;
        write!(
            f,
            "\n  Hint: unbind it first, or turn off strict registration to replace bindings"
        )
    }
}

/// More than one implementation fits an interface in strict mode.
#[derive(Debug)]
pub struct AmbiguousImplementationError {
    pub interface: DependencyKey,
    /// Candidates in registration order.
    pub candidates: Vec<DependencyKey>,
}

impl fmt::Display for AmbiguousImplementationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ambiguous implementation for {}:\n{}",
            self.interface,
            render_list(self.candidates.iter().map(|k| k.type_name()))
        )?;
        write!(f, "\n  Hint: bind the interface directly to pick one")
    }
}

/// Convenient Result type for container operations.
pub type Result<T> = std::result::Result<T, HaqnError>;
