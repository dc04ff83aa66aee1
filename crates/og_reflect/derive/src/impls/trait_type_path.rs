use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::ReflectMeta;

/// Generate implementation code for `TypePath` trait.
pub(crate) fn impl_trait_type_path(meta: &ReflectMeta) -> TokenStream {
    let info_ = crate::path::info_(meta.og_reflect());
    let ident = meta.ident();
    let type_path = meta.type_path_tokens();
    let type_name = meta.type_name_tokens();

    quote! {
        impl #info_::TypePath for #ident {
            #[inline]
            fn type_path() -> &'static str {
                #type_path
            }

            #[inline]
            fn type_name() -> &'static str {
                #type_name
            }
        }
    }
}
