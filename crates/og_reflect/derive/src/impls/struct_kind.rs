use proc_macro2::{Span, TokenStream};
use quote::{ToTokens, quote};
use syn::Ident;

use super::{get_registry_dependencies, impl_trait_get_type_meta, impl_trait_reflect};
use super::{impl_trait_type_path, impl_trait_typed};

use crate::derive_data::{FieldDefault, ReflectStruct, StructField};

/// Implement full reflect for struct type, unit structs included.
pub(crate) fn impl_struct(info: &ReflectStruct) -> TokenStream {
    let meta = info.meta();

    let type_path_trait_tokens = impl_trait_type_path(meta);
    let typed_trait_tokens = impl_trait_typed(meta, get_struct_info_tokens(info));
    let struct_trait_tokens = impl_trait_struct(info);
    let reflect_trait_tokens = impl_trait_reflect(meta, Ident::new("Struct", Span::call_site()));
    let get_type_meta_tokens = impl_trait_get_type_meta(meta, get_registry_dependencies(info));
    let from_reflect_tokens = impl_struct_from_reflect(info);

    quote! {
        #type_path_trait_tokens

        #typed_trait_tokens

        #struct_trait_tokens

        #reflect_trait_tokens

        #get_type_meta_tokens

        #from_reflect_tokens
    }
}

/// `TypeInfo::Struct(StructInfo::new::<Self>(&[...]))`.
fn get_struct_info_tokens(info: &ReflectStruct) -> TokenStream {
    let meta = info.meta();
    let og_reflect = meta.og_reflect();
    let info_ = crate::path::info_(og_reflect);
    let reflect_ = crate::path::reflect_(og_reflect);
    let box_ = crate::path::box_();
    let default_ = crate::path::default_();

    let fields = info.active_fields().map(|field| {
        let name = field.name();
        let ty = field.ty;
        let with_default = match &field.attrs.default {
            FieldDefault::None => TokenStream::new(),
            FieldDefault::Default => quote! {
                .with_default(|| -> #box_<dyn #reflect_> { #box_::new(<#ty as #default_>::default()) })
            },
            FieldDefault::Func(func) => quote! {
                .with_default(|| -> #box_<dyn #reflect_> { #box_::new(#func()) })
            },
        };
        let custom_attributes = field.attrs.custom_attributes.get_expression_with(og_reflect);
        quote! {
            #info_::NamedField::new::<#ty>(#name)
                #with_default
                #custom_attributes
        }
    });

    let with_default = match meta.attrs().avail_traits.default {
        Some(_) => quote! {
            .with_default(|| -> #box_<dyn #reflect_> { #box_::new(<Self as #default_>::default()) })
        },
        None => TokenStream::new(),
    };
    let custom_attributes = meta.attrs().custom_attributes.get_expression_with(og_reflect);

    quote! {
        #info_::TypeInfo::Struct(
            #info_::StructInfo::new::<Self>(&[
                #(#fields,)*
            ])
            #with_default
            #custom_attributes
        )
    }
}

/// Generate `Struct` trait implementation tokens.
fn impl_trait_struct(info: &ReflectStruct) -> TokenStream {
    let meta = info.meta();
    let og_reflect = meta.og_reflect();
    let ops_ = crate::path::ops_(og_reflect);
    let reflect_ = crate::path::reflect_(og_reflect);
    let option_ = crate::path::option_();

    let field_names = info.active_fields().map(StructField::name).collect::<Vec<_>>();
    let members = info
        .active_fields()
        .map(|field| field.member.to_token_stream())
        .collect::<Vec<_>>();
    let field_indices = 0..field_names.len();
    let field_count = field_names.len();
    let ident = meta.ident();

    quote! {
        impl #ops_::Struct for #ident {
            fn field(&self, name: &str) -> #option_<&dyn #reflect_> {
                match name {
                    #(#field_names => #option_::Some(#reflect_::as_reflect(&self.#members)),)*
                    _ => #option_::None,
                }
            }

            fn field_at(&self, index: usize) -> #option_<&dyn #reflect_> {
                match index {
                    #(#field_indices => #option_::Some(#reflect_::as_reflect(&self.#members)),)*
                    _ => #option_::None,
                }
            }

            fn name_at(&self, index: usize) -> #option_<&str> {
                const NAMES: &[&str] = &[#(#field_names),*];
                NAMES.get(index).copied()
            }

            #[inline]
            fn field_len(&self) -> usize {
                #field_count
            }
        }
    }
}

/// Generate `FromReflect` for structs.
///
/// With a type-level `default` the value starts as `Self::default()` and
/// present fields overwrite it. Otherwise every field is either present,
/// filled from its declared default, or rebuilt from an empty optional
/// (which only succeeds for `Option`-like types).
fn impl_struct_from_reflect(info: &ReflectStruct) -> TokenStream {
    let meta = info.meta();
    let og_reflect = meta.og_reflect();
    let ops_ = crate::path::ops_(og_reflect);
    let reflect_ = crate::path::reflect_(og_reflect);
    let from_reflect_ = crate::path::from_reflect_(og_reflect);
    let option_ = crate::path::option_();
    let default_ = crate::path::default_();
    let ident = meta.ident();

    let body = if meta.attrs().avail_traits.default.is_some() {
        let assignments = info.active_fields().map(|field| {
            let name = field.name();
            let member = &field.member;
            let ty = field.ty;
            quote! {
                if let #option_::Some(__field) = #ops_::Struct::field(__value, #name) {
                    __this.#member = <#ty as #from_reflect_>::from_reflect(__field)?;
                }
            }
        });
        quote! {
            let mut __this = <Self as #default_>::default();
            #(#assignments)*
            #option_::Some(__this)
        }
    } else {
        let initializers = info.fields().iter().map(|field| {
            let member = &field.member;
            let ty = field.ty;
            if field.attrs.ignore {
                return quote! { #member: <#ty as #default_>::default() };
            }
            let name = field.name();
            let missing = match &field.attrs.default {
                FieldDefault::None => quote! {
                    <#ty as #from_reflect_>::from_reflect(&#ops_::DynamicOptional::none())?
                },
                FieldDefault::Default => quote! { <#ty as #default_>::default() },
                FieldDefault::Func(func) => quote! { #func() },
            };
            quote! {
                #member: match #ops_::Struct::field(__value, #name) {
                    #option_::Some(__field) => <#ty as #from_reflect_>::from_reflect(__field)?,
                    #option_::None => #missing,
                }
            }
        });
        quote! {
            #option_::Some(Self {
                #(#initializers,)*
            })
        }
    };

    quote! {
        impl #from_reflect_ for #ident {
            #[allow(unused_variables)]
            fn from_reflect(reflect: &dyn #reflect_) -> #option_<Self> {
                let #ops_::ReflectRef::Struct(__value) = #reflect_::reflect_ref(reflect) else {
                    return #option_::None;
                };
                #body
            }
        }
    }
}
