use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::Ident;

use super::{impl_trait_get_type_meta, impl_trait_reflect};
use super::{impl_trait_type_path, impl_trait_typed};

use crate::derive_data::ReflectMeta;

/// Implement full reflect for `#[reflect(opaque, clone)]` types.
pub(crate) fn impl_opaque(meta: &ReflectMeta) -> TokenStream {
    let og_reflect = meta.og_reflect();
    let info_ = crate::path::info_(og_reflect);
    let reflect_ = crate::path::reflect_(og_reflect);
    let from_reflect_ = crate::path::from_reflect_(og_reflect);
    let option_ = crate::path::option_();
    let clone_ = crate::path::clone_();
    let ident = meta.ident();

    let custom_attributes = meta.attrs().custom_attributes.get_expression_with(og_reflect);
    let info_tokens = quote! {
        #info_::TypeInfo::Opaque(#info_::OpaqueInfo::new::<Self>() #custom_attributes)
    };

    let type_path_trait_tokens = impl_trait_type_path(meta);
    let typed_trait_tokens = impl_trait_typed(meta, info_tokens);
    let reflect_trait_tokens = impl_trait_reflect(meta, Ident::new("Opaque", Span::call_site()));
    let get_type_meta_tokens = impl_trait_get_type_meta(meta, TokenStream::new());

    quote! {
        #type_path_trait_tokens

        #typed_trait_tokens

        #reflect_trait_tokens

        #get_type_meta_tokens

        impl #from_reflect_ for #ident {
            #[inline]
            fn from_reflect(reflect: &dyn #reflect_) -> #option_<Self> {
                reflect.downcast_ref::<Self>().map(<Self as #clone_>::clone)
            }
        }
    }
}
