//! Procedural macros for Trellis.
//!
//! This crate is re-exported by `trellis`; depend on that instead.

use proc_macro::TokenStream;

mod bindable;

/// Derives `Bindable` and `FromValue` for a struct with named fields.
///
/// Every field becomes a property addressed by its name, converted from the
/// incoming value with `FromValue`, and is also reachable as a one-argument
/// `set_<name>` method (so linking actions can hand child objects to it).
///
/// Field attributes:
///
/// | Attribute | Effect |
/// |-----------|--------|
/// | `#[bind(rename = "name")]` | address the field as `name` |
/// | `#[bind(skip)]` | not addressable |
/// | `#[bind(adder = "add_item")]` | `add_item(x)` pushes `x` into this `Vec` field |
///
/// ```rust,ignore
/// #[derive(Debug, Default, Bindable)]
/// struct Config {
///     #[bind(rename = "log-level")]
///     log_level: String,
///     #[bind(adder = "add_service")]
///     services: Vec<Service>,
/// }
/// ```
#[proc_macro_derive(Bindable, attributes(bind))]
pub fn derive_bindable(input: TokenStream) -> TokenStream {
    bindable::derive_bindable_impl(input)
}
