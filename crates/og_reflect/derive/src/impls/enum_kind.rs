use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::Ident;

use super::{impl_trait_get_type_meta, impl_trait_reflect};
use super::{impl_trait_type_path, impl_trait_typed};

use crate::derive_data::ReflectEnum;

/// Implement full reflect for field-less enums.
pub(crate) fn impl_enum(info: &ReflectEnum) -> TokenStream {
    let meta = info.meta();

    let type_path_trait_tokens = impl_trait_type_path(meta);
    let typed_trait_tokens = impl_trait_typed(meta, get_enum_info_tokens(info));
    let enum_trait_tokens = impl_trait_enum(info);
    let reflect_trait_tokens = impl_trait_reflect(meta, Ident::new("Enum", Span::call_site()));
    let get_type_meta_tokens = impl_trait_get_type_meta(meta, TokenStream::new());
    let from_reflect_tokens = impl_enum_from_reflect(info);

    quote! {
        #type_path_trait_tokens

        #typed_trait_tokens

        #enum_trait_tokens

        #reflect_trait_tokens

        #get_type_meta_tokens

        #from_reflect_tokens
    }
}

fn get_enum_info_tokens(info: &ReflectEnum) -> TokenStream {
    let meta = info.meta();
    let og_reflect = meta.og_reflect();
    let info_ = crate::path::info_(og_reflect);

    let variants = info.variants().iter().map(|variant| {
        let ident = variant.ident;
        let name = ident.to_string();
        let custom_attributes = variant.attrs.custom_attributes.get_expression_with(og_reflect);
        quote! {
            #info_::VariantInfo::new(#name, Self::#ident as i64) #custom_attributes
        }
    });
    let custom_attributes = meta.attrs().custom_attributes.get_expression_with(og_reflect);

    quote! {
        #info_::TypeInfo::Enum(
            #info_::EnumInfo::new::<Self>(&[
                #(#variants,)*
            ])
            #custom_attributes
        )
    }
}

fn impl_trait_enum(info: &ReflectEnum) -> TokenStream {
    let meta = info.meta();
    let ops_ = crate::path::ops_(meta.og_reflect());

    let idents = info.variants().iter().map(|v| v.ident).collect::<Vec<_>>();
    let names = idents.iter().map(ToString::to_string).collect::<Vec<_>>();
    let indices = 0..idents.len();
    let ident = meta.ident();

    quote! {
        impl #ops_::Enum for #ident {
            fn variant_name(&self) -> &str {
                match *self {
                    #(Self::#idents => #names,)*
                }
            }

            fn variant_index(&self) -> usize {
                match *self {
                    #(Self::#idents => #indices,)*
                }
            }

            fn discriminant(&self) -> i64 {
                match *self {
                    #(Self::#idents => Self::#idents as i64,)*
                }
            }
        }
    }
}

/// Accepts another enum view with a matching variant name, a string naming
/// the variant, or an integer equal to a discriminant.
fn impl_enum_from_reflect(info: &ReflectEnum) -> TokenStream {
    let meta = info.meta();
    let og_reflect = meta.og_reflect();
    let ops_ = crate::path::ops_(og_reflect);
    let reflect_ = crate::path::reflect_(og_reflect);
    let from_reflect_ = crate::path::from_reflect_(og_reflect);
    let option_ = crate::path::option_();

    let idents = info.variants().iter().map(|v| v.ident).collect::<Vec<_>>();
    let names = idents.iter().map(ToString::to_string).collect::<Vec<_>>();
    let ident = meta.ident();

    quote! {
        impl #from_reflect_ for #ident {
            fn from_reflect(reflect: &dyn #reflect_) -> #option_<Self> {
                fn from_name(name: &str) -> #option_<#ident> {
                    match name {
                        #(#names => #option_::Some(#ident::#idents),)*
                        _ => #option_::None,
                    }
                }

                match #reflect_::reflect_ref(reflect) {
                    #ops_::ReflectRef::Enum(value) => from_name(#ops_::Enum::variant_name(value)),
                    #ops_::ReflectRef::Scalar(value) => match #ops_::Scalar::as_scalar(value) {
                        #ops_::ScalarRef::Str(name) => from_name(name),
                        scalar => {
                            let discriminant = scalar.as_i128()?;
                            [#((#ident::#idents as i128, #ident::#idents)),*]
                                .into_iter()
                                .find_map(|(d, variant)| (d == discriminant).then_some(variant))
                        }
                    },
                    _ => #option_::None,
                }
            }
        }
    }
}
