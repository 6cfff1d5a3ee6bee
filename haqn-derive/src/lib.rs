//! Derive macros for Haqn DI.
//!
//! Re-exported by `haqn`; depend on that crate instead of this one.

pub use haqn_macros::Injectable;
