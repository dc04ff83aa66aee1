use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::ReflectMeta;

/// Generate implementation code for `Typed` trait.
///
/// `info_tokens` is an expression of type `TypeInfo`, evaluated once.
pub(crate) fn impl_trait_typed(meta: &ReflectMeta, info_tokens: TokenStream) -> TokenStream {
    let og_reflect = meta.og_reflect();
    let info_ = crate::path::info_(og_reflect);
    let cell_ = crate::path::non_generic_type_info_cell_(og_reflect);
    let ident = meta.ident();

    quote! {
        impl #info_::Typed for #ident {
            fn type_info() -> &'static #info_::TypeInfo {
                static CELL: #cell_ = #cell_::new();
                CELL.get_or_init(|| #info_tokens)
            }
        }
    }
}
