//! Core container implementation for Haqn DI.

pub mod binding;
mod cache;
pub mod config;
pub mod container;
pub mod error;
pub mod factory;
mod graph;
pub mod injectable;
pub mod instance;
pub mod key;
pub mod lifetime;
pub mod provider;
pub mod registry;
pub mod resolution;
mod scope;

pub use binding::{Binding, Implementation, RawFactory};
pub use config::ContainerConfig;
pub use container::{Container, ContainerBuilder, ScopedContainer, prelude};
pub use error::{BoxError, HaqnError, Result};
pub use injectable::{FromResolver, Injectable};
pub use key::DependencyKey;
pub use lifetime::Lifetime;
pub use provider::{Provider, ProviderEntry, ProviderRegistry, submitted_providers};
pub use registry::Resolver;

pub use inventory;
