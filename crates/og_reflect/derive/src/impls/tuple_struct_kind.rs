use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::Ident;

use super::{get_registry_dependencies, impl_trait_get_type_meta, impl_trait_reflect};
use super::{impl_trait_type_path, impl_trait_typed};

use crate::derive_data::ReflectStruct;

/// Implement full reflect for tuple struct type.
///
/// Tuple structs are reflected as tuples.
pub(crate) fn impl_tuple_struct(info: &ReflectStruct) -> TokenStream {
    let meta = info.meta();

    let type_path_trait_tokens = impl_trait_type_path(meta);
    let typed_trait_tokens = impl_trait_typed(meta, get_tuple_info_tokens(info));
    let tuple_trait_tokens = impl_trait_tuple(info);
    let reflect_trait_tokens = impl_trait_reflect(meta, Ident::new("Tuple", Span::call_site()));
    let get_type_meta_tokens = impl_trait_get_type_meta(meta, get_registry_dependencies(info));
    let from_reflect_tokens = impl_tuple_struct_from_reflect(info);

    quote! {
        #type_path_trait_tokens

        #typed_trait_tokens

        #tuple_trait_tokens

        #reflect_trait_tokens

        #get_type_meta_tokens

        #from_reflect_tokens
    }
}

fn get_tuple_info_tokens(info: &ReflectStruct) -> TokenStream {
    let meta = info.meta();
    let og_reflect = meta.og_reflect();
    let info_ = crate::path::info_(og_reflect);

    let fields = info.active_fields().map(|field| {
        let ty = field.ty;
        let index = field.reflection_index.unwrap_or_default();
        let custom_attributes = field.attrs.custom_attributes.get_expression_with(og_reflect);
        quote! {
            #info_::UnnamedField::new::<#ty>(#index) #custom_attributes
        }
    });
    let custom_attributes = meta.attrs().custom_attributes.get_expression_with(og_reflect);

    quote! {
        #info_::TypeInfo::Tuple(
            #info_::TupleInfo::new::<Self>(&[
                #(#fields,)*
            ])
            #custom_attributes
        )
    }
}

fn impl_trait_tuple(info: &ReflectStruct) -> TokenStream {
    let meta = info.meta();
    let og_reflect = meta.og_reflect();
    let ops_ = crate::path::ops_(og_reflect);
    let reflect_ = crate::path::reflect_(og_reflect);
    let option_ = crate::path::option_();

    let members = info.active_fields().map(|field| &field.member);
    let field_indices = info.active_fields().filter_map(|field| field.reflection_index);
    let field_count = info.active_fields().count();
    let ident = meta.ident();

    quote! {
        impl #ops_::Tuple for #ident {
            fn field(&self, index: usize) -> #option_<&dyn #reflect_> {
                match index {
                    #(#field_indices => #option_::Some(#reflect_::as_reflect(&self.#members)),)*
                    _ => #option_::None,
                }
            }

            #[inline]
            fn field_len(&self) -> usize {
                #field_count
            }
        }
    }
}

fn impl_tuple_struct_from_reflect(info: &ReflectStruct) -> TokenStream {
    let meta = info.meta();
    let og_reflect = meta.og_reflect();
    let ops_ = crate::path::ops_(og_reflect);
    let reflect_ = crate::path::reflect_(og_reflect);
    let from_reflect_ = crate::path::from_reflect_(og_reflect);
    let option_ = crate::path::option_();
    let default_ = crate::path::default_();
    let ident = meta.ident();

    let field_count = info.active_fields().count();
    let initializers = info.fields().iter().map(|field| {
        let ty = field.ty;
        match field.reflection_index {
            Some(index) => quote! {
                <#ty as #from_reflect_>::from_reflect(#ops_::Tuple::field(__value, #index)?)?
            },
            None => quote! { <#ty as #default_>::default() },
        }
    });

    quote! {
        impl #from_reflect_ for #ident {
            fn from_reflect(reflect: &dyn #reflect_) -> #option_<Self> {
                let #ops_::ReflectRef::Tuple(__value) = #reflect_::reflect_ref(reflect) else {
                    return #option_::None;
                };
                if #ops_::Tuple::field_len(__value) != #field_count {
                    return #option_::None;
                }
                #option_::Some(Self(
                    #(#initializers,)*
                ))
            }
        }
    }
}
