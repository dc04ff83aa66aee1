//! Parsing of `#[reflect(...)]` attributes.

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::parse::ParseStream;
use syn::{Attribute, Expr, Ident, LitStr, Path, Token};

use crate::REFLECT_ATTRIBUTE_NAME;

// -----------------------------------------------------------------------------
// CustomAttributes

/// A container for custom attribute expressions.
///
/// This corresponds to `og_reflect::info::CustomAttributes`.
#[derive(Default)]
pub(crate) struct CustomAttributes {
    attributes: Vec<Expr>,
}

impl CustomAttributes {
    /// Parse `@` attribute.
    ///
    /// Examples:
    /// - `#[reflect(@Foo)]`
    /// - `#[reflect(@JsonName("x"))]`
    fn parse_inner_stream(&mut self, input: ParseStream) -> syn::Result<()> {
        input.parse::<Token![@]>()?;
        self.attributes.push(input.parse()?);
        Ok(())
    }

    /// Returns `.with_custom_attributes(...)`, or nothing if empty.
    pub fn get_expression_with(&self, og_reflect: &Path) -> TokenStream {
        if self.attributes.is_empty() {
            return TokenStream::new();
        }

        let capacity = self.attributes.len();
        let custom_attributes_ = crate::path::custom_attributes_(og_reflect);
        let with_attributes = self.attributes.iter().map(|value| {
            quote! {
                .with_attribute(#value)
            }
        });

        quote! {
            .with_custom_attributes(
                #custom_attributes_::with_capacity(#capacity)
                    #(#with_attributes)*
            )
        }
    }
}

// -----------------------------------------------------------------------------
// Shared parsing loop

/// Runs `parse_one` over every comma separated item of every
/// `#[reflect(...)]` attribute in `attrs`.
fn parse_reflect_attrs(
    attrs: &[Attribute],
    mut parse_one: impl FnMut(ParseStream) -> syn::Result<()>,
) -> syn::Result<()> {
    for attr in attrs {
        if !attr.path().is_ident(REFLECT_ATTRIBUTE_NAME) {
            continue;
        }
        attr.parse_args_with(|input: ParseStream| {
            while !input.is_empty() {
                parse_one(input)?;
                if input.is_empty() {
                    break;
                }
                input.parse::<Token![,]>()?;
            }
            Ok(())
        })?;
    }
    Ok(())
}

// -----------------------------------------------------------------------------
// TypeAttributes

/// A struct used to record whether the specified trait is available.
#[derive(Default)]
pub(crate) struct TraitAvailableFlags {
    pub default: Option<Span>,
    pub clone: Option<Span>,
    pub serde: Option<Span>,
}

/// Type-level `#[reflect(...)]` content.
#[derive(Default)]
pub(crate) struct TypeAttributes {
    pub type_path: Option<LitStr>,
    pub opaque: Option<Span>,
    pub avail_traits: TraitAvailableFlags,
    pub custom_attributes: CustomAttributes,
}

impl TypeAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        parse_reflect_attrs(attrs, |input| {
            if input.peek(Token![@]) {
                return this.custom_attributes.parse_inner_stream(input);
            }

            let ident: Ident = input.parse()?;
            let span = ident.span();
            match ident.to_string().as_str() {
                "type_path" => {
                    input.parse::<Token![=]>()?;
                    let lit: LitStr = input.parse()?;
                    if !lit.value().contains("::") {
                        return Err(syn::Error::new(
                            lit.span(),
                            "`type_path` must be a full path, such as `my_crate::foo::Bar`",
                        ));
                    }
                    this.type_path = Some(lit);
                }
                "opaque" => this.opaque = Some(span),
                "default" => this.avail_traits.default = Some(span),
                "clone" => this.avail_traits.clone = Some(span),
                "serde" => this.avail_traits.serde = Some(span),
                other => {
                    return Err(syn::Error::new(
                        span,
                        format!(
                            "unknown type attribute `{other}`, expected one of \
                             `type_path`, `opaque`, `default`, `clone`, `serde` or `@expr`"
                        ),
                    ));
                }
            }
            Ok(())
        })?;
        Ok(this)
    }
}

// -----------------------------------------------------------------------------
// FieldAttributes

/// How an absent field is filled.
pub(crate) enum FieldDefault {
    /// Not declared: only `Option`-like fields may be absent.
    None,
    /// `#[reflect(default)]`
    Default,
    /// `#[reflect(default = path)]`
    Func(Path),
}

/// Field-level `#[reflect(...)]` content.
pub(crate) struct FieldAttributes {
    pub ignore: bool,
    pub default: FieldDefault,
    pub custom_attributes: CustomAttributes,
}

impl FieldAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self {
            ignore: false,
            default: FieldDefault::None,
            custom_attributes: CustomAttributes::default(),
        };
        parse_reflect_attrs(attrs, |input| {
            if input.peek(Token![@]) {
                return this.custom_attributes.parse_inner_stream(input);
            }

            let ident: Ident = input.parse()?;
            match ident.to_string().as_str() {
                "ignore" => this.ignore = true,
                "default" => {
                    this.default = if input.peek(Token![=]) {
                        input.parse::<Token![=]>()?;
                        FieldDefault::Func(input.parse()?)
                    } else {
                        FieldDefault::Default
                    };
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!(
                            "unknown field attribute `{other}`, expected one of \
                             `ignore`, `default`, `default = path` or `@expr`"
                        ),
                    ));
                }
            }
            Ok(())
        })?;
        Ok(this)
    }
}

// -----------------------------------------------------------------------------
// VariantAttributes

/// Variant-level `#[reflect(...)]` content, only custom attributes.
pub(crate) struct VariantAttributes {
    pub custom_attributes: CustomAttributes,
}

impl VariantAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut custom_attributes = CustomAttributes::default();
        parse_reflect_attrs(attrs, |input| {
            if input.peek(Token![@]) {
                custom_attributes.parse_inner_stream(input)
            } else {
                Err(input.error("variants only accept custom attributes: `@expr`"))
            }
        })?;
        Ok(Self { custom_attributes })
    }
}
