use proc_macro2::{Span, TokenStream};
use quote::{quote, quote_spanned};
use syn::Ident;

use crate::derive_data::{ReflectMeta, ReflectStruct};

/// Generate implementation code for `GetTypeMeta` trait.
///
/// `register_deps_tokens` is usually related to the type of field.
pub(crate) fn impl_trait_get_type_meta(
    meta: &ReflectMeta,
    register_deps_tokens: TokenStream,
) -> TokenStream {
    let registry_ = crate::path::registry_(meta.og_reflect());

    let outer_ = Ident::new("__outer", Span::call_site());

    let mut trait_counter = 1usize;

    let insert_default = match meta.attrs().avail_traits.default {
        Some(span) => {
            trait_counter += 1;
            quote_spanned! { span =>
                #registry_::TypeMeta::insert_trait::<#registry_::TypeTraitDefault>(&mut #outer_, #registry_::FromType::<Self>::from_type());
            }
        }
        None => TokenStream::new(),
    };

    let insert_serde = match meta.attrs().avail_traits.serde {
        Some(span) => {
            trait_counter += 2;
            quote_spanned! { span =>
                #registry_::TypeMeta::insert_trait::<#registry_::TypeTraitSerialize>(&mut #outer_, #registry_::FromType::<Self>::from_type());
                #registry_::TypeMeta::insert_trait::<#registry_::TypeTraitDeserialize>(&mut #outer_, #registry_::FromType::<Self>::from_type());
            }
        }
        None => TokenStream::new(),
    };

    let ident = meta.ident();

    quote! {
        impl #registry_::GetTypeMeta for #ident {
            fn get_type_meta() -> #registry_::TypeMeta {
                let mut #outer_ = #registry_::TypeMeta::with_capacity::<Self>(#trait_counter);
                #registry_::TypeMeta::insert_trait::<#registry_::TypeTraitFromReflect>(&mut #outer_, #registry_::FromType::<Self>::from_type());
                #insert_default
                #insert_serde
                #outer_
            }

            #register_deps_tokens
        }
    }
}

/// `register_dependencies` registering every reflected field type.
pub(crate) fn get_registry_dependencies(info: &ReflectStruct) -> TokenStream {
    let registry_ = crate::path::registry_(info.meta().og_reflect());
    let field_types = info.active_fields().map(|field| field.ty);

    if info.active_fields().next().is_none() {
        return TokenStream::new();
    }

    quote! {
        fn register_dependencies(registry: &mut #registry_::TypeRegistry) {
            #(registry.register::<#field_types>();)*
        }
    }
}
