//! Container configuration.

use serde::Deserialize;

/// Behaviour switches for a container.
///
/// Deserializable so it can live inside an application's own config file;
/// missing fields take their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Reject duplicate bindings and ambiguous implementation searches
    /// instead of replacing / picking the first one.
    pub strict: bool,
    /// Run [`Container::validate`](crate::container::Container::validate)
    /// when the builder finishes.
    pub validate_on_build: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            strict: false,
            validate_on_build: true,
        }
    }
}

impl ContainerConfig {
    /// Defaults with strict registration turned on.
    pub fn strict() -> Self {
        Self { strict: true, ..Self::default() }
    }
}
