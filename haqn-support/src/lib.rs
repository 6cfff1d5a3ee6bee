//! # Haqn Support
//!
//! Diagnostic helpers shared between the haqn crates.
//!
//! This crate provides:
//! - Rendering of resolution chains and type names for error messages
//! - "Did you mean?" suggestions for missing bindings

pub mod rendering;
