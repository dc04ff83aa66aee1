use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{Data, DeriveInput, Fields, Ident, Member, Type};

use super::{FieldAttributes, TypeAttributes, VariantAttributes};

// -----------------------------------------------------------------------------
// ReflectMeta

/// Type-level information shared by every kind.
pub(crate) struct ReflectMeta<'a> {
    attrs: TypeAttributes,
    ident: &'a Ident,
    og_reflect: syn::Path,
}

impl<'a> ReflectMeta<'a> {
    pub fn new(attrs: TypeAttributes, ident: &'a Ident) -> Self {
        Self {
            attrs,
            ident,
            og_reflect: crate::path::og_reflect(),
        }
    }

    #[inline]
    pub fn attrs(&self) -> &TypeAttributes {
        &self.attrs
    }

    #[inline]
    pub fn ident(&self) -> &Ident {
        self.ident
    }

    #[inline]
    pub fn og_reflect(&self) -> &syn::Path {
        &self.og_reflect
    }

    /// Expression of the full type path, a `&'static str` constant.
    pub fn type_path_tokens(&self) -> TokenStream {
        match &self.attrs.type_path {
            Some(lit) => quote! { #lit },
            None => {
                let ident = self.ident.to_string();
                quote! { ::core::concat!(::core::module_path!(), "::", #ident) }
            }
        }
    }

    /// Literal of the short type name.
    pub fn type_name_tokens(&self) -> TokenStream {
        let name = match &self.attrs.type_path {
            Some(lit) => {
                let path = lit.value();
                path.rsplit("::").next().unwrap_or_default().to_owned()
            }
            None => self.ident.to_string(),
        };
        quote! { #name }
    }
}

// -----------------------------------------------------------------------------
// Fields

/// A field of a struct or tuple struct.
pub(crate) struct StructField<'a> {
    pub member: Member,
    pub ty: &'a Type,
    pub attrs: FieldAttributes,
    /// Position among the non-ignored fields, `None` when ignored.
    pub reflection_index: Option<usize>,
}

impl StructField<'_> {
    /// The reflected name of a named field.
    pub fn name(&self) -> String {
        match &self.member {
            Member::Named(ident) => ident.to_string(),
            Member::Unnamed(index) => index.index.to_string(),
        }
    }
}

/// A struct, tuple struct or unit struct.
pub(crate) struct ReflectStruct<'a> {
    meta: ReflectMeta<'a>,
    fields: Vec<StructField<'a>>,
}

impl<'a> ReflectStruct<'a> {
    #[inline]
    pub fn meta(&self) -> &ReflectMeta<'a> {
        &self.meta
    }

    #[inline]
    pub fn fields(&self) -> &[StructField<'a>] {
        &self.fields
    }

    /// The fields visible to reflection.
    pub fn active_fields(&self) -> impl Iterator<Item = &StructField<'a>> {
        self.fields.iter().filter(|field| !field.attrs.ignore)
    }
}

// -----------------------------------------------------------------------------
// Enum

pub(crate) struct EnumVariant<'a> {
    pub ident: &'a Ident,
    pub attrs: VariantAttributes,
}

/// A field-less enum.
pub(crate) struct ReflectEnum<'a> {
    meta: ReflectMeta<'a>,
    variants: Vec<EnumVariant<'a>>,
}

impl<'a> ReflectEnum<'a> {
    #[inline]
    pub fn meta(&self) -> &ReflectMeta<'a> {
        &self.meta
    }

    #[inline]
    pub fn variants(&self) -> &[EnumVariant<'a>] {
        &self.variants
    }
}

// -----------------------------------------------------------------------------
// ReflectDerive

pub(crate) enum ReflectDerive<'a> {
    Struct(ReflectStruct<'a>),
    TupleStruct(ReflectStruct<'a>),
    UnitStruct(ReflectStruct<'a>),
    Enum(ReflectEnum<'a>),
    Opaque(ReflectMeta<'a>),
}

impl<'a> ReflectDerive<'a> {
    pub fn from_input(input: &'a DeriveInput) -> syn::Result<Self> {
        if !input.generics.params.is_empty() {
            return Err(syn::Error::new_spanned(
                &input.generics,
                "`Reflect` cannot be derived for generic types",
            ));
        }

        let attrs = TypeAttributes::parse_attrs(&input.attrs)?;

        if let Some(span) = attrs.opaque {
            if attrs.avail_traits.clone.is_none() {
                return Err(syn::Error::new(
                    span,
                    "opaque types must be `Clone`, add `#[reflect(opaque, clone)]`",
                ));
            }
            return Ok(Self::Opaque(ReflectMeta::new(attrs, &input.ident)));
        }

        let meta = ReflectMeta::new(attrs, &input.ident);

        match &input.data {
            Data::Struct(data) => {
                let fields = collect_fields(&data.fields)?;
                let info = ReflectStruct { meta, fields };
                Ok(match data.fields {
                    Fields::Named(_) => Self::Struct(info),
                    Fields::Unnamed(_) => Self::TupleStruct(info),
                    Fields::Unit => Self::UnitStruct(info),
                })
            }
            Data::Enum(data) => {
                if data.variants.is_empty() {
                    return Err(syn::Error::new_spanned(
                        &input.ident,
                        "`Reflect` cannot be derived for empty enums",
                    ));
                }
                let variants = data
                    .variants
                    .iter()
                    .map(|variant| {
                        if !matches!(variant.fields, Fields::Unit) {
                            return Err(syn::Error::new_spanned(
                                &variant.fields,
                                "`Reflect` can only be derived for field-less enums",
                            ));
                        }
                        Ok(EnumVariant {
                            ident: &variant.ident,
                            attrs: VariantAttributes::parse_attrs(&variant.attrs)?,
                        })
                    })
                    .collect::<syn::Result<Vec<_>>>()?;
                Ok(Self::Enum(ReflectEnum { meta, variants }))
            }
            Data::Union(_) => Err(syn::Error::new(
                Span::call_site(),
                "`Reflect` cannot be derived for unions, use `#[reflect(opaque, clone)]`",
            )),
        }
    }
}

fn collect_fields(fields: &Fields) -> syn::Result<Vec<StructField<'_>>> {
    let mut reflection_index = 0usize;
    fields
        .iter()
        .enumerate()
        .map(|(declaration_index, field)| {
            let attrs = FieldAttributes::parse_attrs(&field.attrs)?;
            let member = match &field.ident {
                Some(ident) => Member::Named(ident.clone()),
                None => Member::Unnamed(declaration_index.into()),
            };
            let index = if attrs.ignore {
                None
            } else {
                reflection_index += 1;
                Some(reflection_index - 1)
            };
            Ok(StructField {
                member,
                ty: &field.ty,
                attrs,
                reflection_index: index,
            })
        })
        .collect()
}
