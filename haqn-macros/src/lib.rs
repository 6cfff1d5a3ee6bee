//! Proc-macros for Haqn DI.

use proc_macro::TokenStream;
use syn::parse_macro_input;

mod injectable;

/// Implements `Injectable` for a struct by resolving each field.
///
/// - `Arc<T>` fields are required dependencies
/// - `Option<Arc<T>>` fields are optional (`None` when `T` is not bound)
/// - `#[inject(default)]` fields are filled with `Default::default()`
///
/// The lifetime defaults to transient and is chosen with
/// `#[injectable(lifetime = "singleton" | "scoped" | "transient")]`.
///
/// # Example
/// ```ignore
/// use haqn::Injectable;
/// use std::sync::Arc;
///
/// #[derive(Injectable)]
/// #[injectable(lifetime = "scoped")]
/// struct OrderService {
///     repo: Arc<OrderRepository>,
///     logger: Arc<dyn Logger>,
///     metrics: Option<Arc<Metrics>>,
///     #[inject(default)]
///     retries: u32,
/// }
/// ```
///
/// # Errors
/// Fails to compile on enums, tuple structs and unknown lifetimes.
#[proc_macro_derive(Injectable, attributes(injectable, inject))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as syn::DeriveInput);
    injectable::expand_injectable(&input)
        .unwrap_or_else(darling::Error::write_errors)
        .into()
}
