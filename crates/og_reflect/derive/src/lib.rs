//! See the [`Reflect`] derive macro.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

static REFLECT_ATTRIBUTE_NAME: &str = "reflect";

// -----------------------------------------------------------------------------
// Modules

mod derive_data;
mod impls;
mod path;

// -----------------------------------------------------------------------------
// Macros

/// # Full Reflection Derive
///
/// `#[derive(Reflect)]` implements `TypePath`, `Typed`, `Reflect`,
/// `GetTypeMeta` and `FromReflect`, plus the shape trait matching the
/// item:
///
/// - named structs and unit structs: `Struct`
/// - tuple structs: `Tuple`
/// - field-less enums: `Enum`
/// - `#[reflect(opaque)]` types: nothing, they are inspected as a whole
///
/// Generic types are not supported.
///
/// ## Type Path
///
/// The default type path is `module_path!()` followed by the ident.
/// Override it with `#[reflect(type_path = "my_crate::foo::Bar")]`;
/// the type name is the last segment.
///
/// ## Available Traits
///
/// ```rust, ignore
/// #[derive(Reflect, Default, Clone)]
/// #[reflect(default, clone)]
/// struct A { /* ... */ }
/// ```
///
/// - `default`: the type implements `Default`. Registers `TypeTraitDefault`,
///   and decoders start from the default value, so any field may be absent.
/// - `clone`: the type implements `Clone`, used by `reflect_clone`.
///   Required for opaque types.
/// - `serde`: the type implements `serde::Serialize` and `serde::Deserialize`.
///   Registers `TypeTraitSerialize` and `TypeTraitDeserialize`; encoders
///   then hand the value to serde instead of walking its fields.
///
/// ## Opaque
///
/// `#[reflect(opaque, clone)]` hides the fields. The value is reflected as
/// an indivisible whole.
///
/// ## Fields
///
/// - `#[reflect(ignore)]`: the field is invisible to reflection. It is
///   filled with `Default::default()` when rebuilding the value.
/// - `#[reflect(default)]`: the field may be absent; uses `Default::default()`.
/// - `#[reflect(default = path::to::fn)]`: the field may be absent; uses `fn()`.
///
/// Fields of type `Option<T>` may always be absent.
///
/// ## Custom Attributes
///
/// `#[reflect(@Expr)]` stores any reflected value in the type info. It can
/// be applied at the type, field and variant levels. Attributes are stored
/// by type, so a later attribute replaces an earlier one of the same type.
///
/// ```rust, ignore
/// #[derive(Reflect)]
/// #[reflect(@JsonName("point"))]
/// struct Point {
///     #[reflect(@JsonName("X"))]
///     x: f64,
///     #[reflect(@JsonIgnore)]
///     cache: Option<f64>,
/// }
/// ```
#[proc_macro_derive(Reflect, attributes(reflect))]
pub fn derive_full_reflect(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    impls::match_reflect_impls(ast)
}
