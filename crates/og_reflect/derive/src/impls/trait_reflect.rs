use proc_macro2::{Ident, TokenStream};
use quote::{quote, quote_spanned};

use crate::derive_data::ReflectMeta;

/// Generate implementation code for `Reflect` trait.
///
/// `kind` is the `ReflectKind`/`ReflectRef` variant, such as `Struct`.
pub(crate) fn impl_trait_reflect(meta: &ReflectMeta, kind: Ident) -> TokenStream {
    let og_reflect = meta.og_reflect();
    let reflect_ = crate::path::reflect_(og_reflect);
    let info_ = crate::path::info_(og_reflect);
    let ops_ = crate::path::ops_(og_reflect);
    let box_ = crate::path::box_();
    let ident = meta.ident();

    let reflect_clone_tokens = get_reflect_clone_impl(meta);

    quote! {
        impl #reflect_ for #ident {
            #[inline]
            fn reflect_kind(&self) -> #info_::ReflectKind {
                #info_::ReflectKind::#kind
            }

            #[inline]
            fn reflect_ref(&self) -> #ops_::ReflectRef<'_> {
                #ops_::ReflectRef::#kind(self)
            }

            fn reflect_clone(&self) -> #box_<dyn #reflect_> {
                #reflect_clone_tokens
            }
        }
    }
}

/// Body of `reflect_clone`.
///
/// Uses `Clone` when available; otherwise rebuilds the value through
/// `FromReflect`, falling back to the dynamic representation.
fn get_reflect_clone_impl(meta: &ReflectMeta) -> TokenStream {
    let og_reflect = meta.og_reflect();
    let reflect_ = crate::path::reflect_(og_reflect);
    let from_reflect_ = crate::path::from_reflect_(og_reflect);
    let option_ = crate::path::option_();
    let box_ = crate::path::box_();

    match meta.attrs().avail_traits.clone {
        Some(span) => {
            let clone_ = crate::path::clone_();
            quote_spanned! { span =>
                #box_::new(<Self as #clone_>::clone(self))
            }
        }
        None => quote! {
            match <Self as #from_reflect_>::from_reflect(self) {
                #option_::Some(value) => #box_::new(value),
                #option_::None => #reflect_::to_dynamic(self),
            }
        },
    }
}
