//! # Haqn — Dependency Injection Container for Rust
//!
//! A service container that resolves types (including `dyn Trait`
//! interfaces) to instances, with transient, singleton and scoped lifetimes,
//! named per-operation scopes, child containers and cycle detection.
//!
//! ```rust
//! use haqn::prelude::*;
//! use std::sync::Arc;
//!
//! struct Config { url: &'static str }
//! struct Database { url: &'static str }
//!
//! let container = Container::builder()
//!     .instance(Config { url: "postgres://localhost/app" })
//!     .singleton::<Database, _>(|config: Arc<Config>| Ok(Database { url: config.url }))
//!     .build()
//!     .expect("container builds");
//!
//! let db = container.resolve::<Database>().expect("database resolves");
//! assert_eq!(db.url, "postgres://localhost/app");
//! ```

pub use haqn_container::*;
pub use haqn_derive::*;
pub use haqn_support::*;
