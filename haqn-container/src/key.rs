//! Type identities used as registry keys.
//!
//! A [`DependencyKey`] is what the container looks bindings up by: the
//! [`TypeId`] of the requested type plus an optional static name. The
//! human-readable type name rides along for diagnostics only and never
//! takes part in comparisons.

use std::any::{TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};

use haqn_support::rendering::shorten_type_name;

/// Identity of a bindable type.
///
/// Any `'static` type can be a key, including trait objects, so
/// `DependencyKey::of::<dyn Logger>()` is the key of the `Logger`
/// interface.
///
/// # Examples
/// ```
/// use haqn_container::key::DependencyKey;
///
/// let key = DependencyKey::of::<String>();
/// assert_eq!(key.type_name(), "alloc::string::String");
/// assert_eq!(key.name(), None);
///
/// let primary = DependencyKey::named::<String>("primary");
/// assert_ne!(primary, key);
/// assert!(primary.same_type(&key));
/// ```
#[derive(Clone, Copy)]
pub struct DependencyKey {
    type_id: TypeId,
    type_name: &'static str,
    name: Option<&'static str>,
}

impl DependencyKey {
    /// Key of type `T`.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            name: None,
        }
    }

    /// Key of type `T` under a binding name.
    ///
    /// Named keys let several bindings of one type coexist.
    #[inline]
    pub fn named<T: ?Sized + 'static>(name: &'static str) -> Self {
        Self::of::<T>().with_name(name)
    }

    /// Same type, different binding name.
    #[inline]
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Fully qualified type name.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Type name without module paths, for log lines.
    pub fn short_name(&self) -> String {
        shorten_type_name(self.type_name)
    }

    #[inline]
    pub fn name(&self) -> Option<&'static str> {
        self.name
    }

    /// Whether both keys denote the same type, ignoring binding names.
    #[inline]
    pub fn same_type(&self, other: &DependencyKey) -> bool {
        self.type_id == other.type_id
    }
}

impl PartialEq for DependencyKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.name == other.name
    }
}

impl Eq for DependencyKey {}

impl Hash for DependencyKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
        self.name.hash(state);
    }
}

impl fmt::Debug for DependencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name {
            Some(name) => write!(f, "DependencyKey({}, name={name:?})", self.type_name),
            None => write!(f, "DependencyKey({})", self.type_name),
        }
    }
}

impl fmt::Display for DependencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name {
            Some(name) => write!(f, "{} (name={name:?})", self.type_name),
            None => f.write_str(self.type_name),
        }
    }
}
