//! Paths used by generated code.
//!
//! Everything is spelled out from the crate root so the generated code does
//! not depend on what the caller has imported.

use proc_macro2::TokenStream;
use quote::quote;

/// Get the correct access path to the `og_reflect` crate.
///
/// A crate may depend on `og_reflect` directly or only through `og_core`,
/// so the caller's `Cargo.toml` is scanned. The cost is noticeable (file
/// access and a lock), so the path is computed once per derive and passed down.
pub(crate) fn og_reflect() -> syn::Path {
    og_macro_utils::Manifest::shared(|manifest| manifest.get_crate_path("og_reflect"))
}

#[inline(always)]
pub(crate) fn option_() -> TokenStream {
    quote! { ::core::option::Option }
}

#[inline(always)]
pub(crate) fn box_() -> TokenStream {
    quote! { ::std::boxed::Box }
}

#[inline(always)]
pub(crate) fn default_() -> TokenStream {
    quote! { ::core::default::Default }
}

#[inline(always)]
pub(crate) fn clone_() -> TokenStream {
    quote! { ::core::clone::Clone }
}

#[inline(always)]
pub(crate) fn reflect_(og_reflect: &syn::Path) -> TokenStream {
    quote! { #og_reflect::Reflect }
}

#[inline(always)]
pub(crate) fn from_reflect_(og_reflect: &syn::Path) -> TokenStream {
    quote! { #og_reflect::FromReflect }
}

#[inline(always)]
pub(crate) fn info_(og_reflect: &syn::Path) -> TokenStream {
    quote! { #og_reflect::info }
}

#[inline(always)]
pub(crate) fn ops_(og_reflect: &syn::Path) -> TokenStream {
    quote! { #og_reflect::ops }
}

#[inline(always)]
pub(crate) fn registry_(og_reflect: &syn::Path) -> TokenStream {
    quote! { #og_reflect::registry }
}

#[inline(always)]
pub(crate) fn non_generic_type_info_cell_(og_reflect: &syn::Path) -> TokenStream {
    quote! { #og_reflect::impls::NonGenericTypeInfoCell }
}

#[inline(always)]
pub(crate) fn custom_attributes_(og_reflect: &syn::Path) -> TokenStream {
    quote! { #og_reflect::info::CustomAttributes }
}
