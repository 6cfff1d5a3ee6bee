//! Providers: modules of related registrations.
//!
//! A [`Provider`] groups the bindings of one concern (storage, mail,
//! auth, ...) so application startup reads as a list of modules instead of
//! one long registration block:
//!
//! ```rust,ignore
//! let container = Container::builder()
//!     .add_provider(&StorageProvider)
//!     .add_provider(&MailProvider)
//!     .build()?;
//! ```
//!
//! Providers can also register themselves at link time through
//! [`inventory`]: submit a [`ProviderEntry`] and call
//! [`ContainerBuilder::with_submitted_providers`](crate::container::ContainerBuilder::with_submitted_providers).
//!
//! ```rust,ignore
//! fn storage(registry: &mut dyn ProviderRegistry) {
//!     registry.bind(Binding::instance(DiskStore::default()));
//! }
//!
//! haqn_container::inventory::submit! {
//!     ProviderEntry::new("storage", storage)
//! }
//! ```

use crate::binding::{Binding, Implementation};

/// A module that registers related bindings.
pub trait Provider: Send + Sync {
    /// Registers everything this provider offers.
    fn register(&self, registry: &mut dyn ProviderRegistry);

    /// Name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Registration surface handed to providers.
///
/// A narrow view of [`ContainerBuilder`](crate::container::ContainerBuilder)
/// so providers can be tested against a fake registry.
pub trait ProviderRegistry {
    fn bind(&mut self, binding: Binding);

    fn implement(&mut self, implementation: Implementation);
}

/// Provider registered at link time with `inventory::submit!`.
pub struct ProviderEntry {
    name: &'static str,
    register: fn(&mut dyn ProviderRegistry),
}

impl ProviderEntry {
    pub const fn new(name: &'static str, register: fn(&mut dyn ProviderRegistry)) -> Self {
        Self { name, register }
    }
}

impl Provider for ProviderEntry {
    fn register(&self, registry: &mut dyn ProviderRegistry) {
        (self.register)(registry);
    }

    fn name(&self) -> &str {
        self.name
    }
}

inventory::collect!(ProviderEntry);

/// Every [`ProviderEntry`] submitted anywhere in the final binary.
///
/// Link order decides the iteration order, so submitted providers should
/// not bind the same keys.
pub fn submitted_providers() -> impl Iterator<Item = &'static ProviderEntry> {
    inventory::iter::<ProviderEntry>.into_iter()
}
