//! Derive macro for fieldwire's field injection.
//!
//! This crate provides `#[derive(Injectable)]`, which generates the field
//! walk the injector performs at runtime:
//! - `#[inject]` marks a field for injection (its type must be `Option<T>`)
//! - `#[inject(parent)]` embeds an ancestor whose fields are scanned too
//! - `#[injectable(decorates = field)]` names the wrapped payload of a decorator
//!
//! Generated code references `::fieldwire` by default. Override the path with
//! `#[injectable(crate = "path::to::fieldwire")]`.

use proc_macro::TokenStream;

mod attrs;
mod injectable;

/// Derive macro for objects whose marked fields are wired by the injector.
///
/// Generates `Injectable` (the field walk, decorator payload and upcast) and
/// `Scan` (so the struct can be descended into when held by another target).
///
/// # Requirements
///
/// - Struct with named fields, `Send + 'static`
/// - Each `#[inject]` field is `Option<T>` with `T: Scan + Send + 'static`
/// - An `#[inject(parent)]` field is itself `Injectable`; at most one per struct
///
/// # Example
///
/// ```ignore
/// use fieldwire::Injectable;
///
/// #[derive(Injectable)]
/// struct Base {
///     #[inject]
///     locator: Option<Arc<dyn Locator>>,
/// }
///
/// #[derive(Injectable)]
/// #[injectable(decorates = inner)]
/// struct Caching {
///     #[inject(parent)]
///     base: Base,
///     #[inject]
///     cache: Option<Arc<Cache>>,
///     inner: Box<dyn Processor>,
/// }
///
/// // Generated (abridged):
/// // impl Injectable for Caching {
/// //     fn fields(&mut self) -> Vec<FieldDescriptor<'_>> {
/// //         let mut fields = Vec::with_capacity(2);
/// //         fields.push(FieldDescriptor::marked("Caching", "cache", &mut self.cache));
/// //         fields.push(FieldDescriptor::unmarked::<Box<dyn Processor>>("Caching", "inner"));
/// //         fields.extend(Injectable::fields(&mut self.base));
/// //         fields
/// //     }
/// //     fn decorated(&mut self) -> Option<Target<'_>> {
/// //         Scan::target(&mut self.inner)
/// //     }
/// //     ...
/// // }
/// ```
#[proc_macro_derive(Injectable, attributes(inject, injectable))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    injectable::derive_injectable_impl(input)
}
