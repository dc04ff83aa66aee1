//! Static type information.
//!
//! Every reflected type has one leaked [`TypeInfo`], reachable through
//! [`Typed::type_info`]. Field, item and variant descriptors hold function
//! pointers to the infos of their own types, so recursive types resolve lazily.

// -----------------------------------------------------------------------------
// Modules

mod attributes;
mod enum_info;
mod field_info;
mod list_info;
mod map_info;
mod opaque_info;
mod optional_info;
mod scalar_info;
mod struct_info;
mod tuple_info;
mod type_info;
mod type_path;
mod typed;

// -----------------------------------------------------------------------------
// Exports

pub use attributes::CustomAttributes;
pub use enum_info::{EnumInfo, VariantInfo};
pub use field_info::{NamedField, UnnamedField};
pub use list_info::ListInfo;
pub use map_info::MapInfo;
pub use opaque_info::{AnyInfo, OpaqueInfo};
pub use optional_info::OptionalInfo;
pub use scalar_info::{ScalarInfo, ScalarKind};
pub use struct_info::StructInfo;
pub use tuple_info::TupleInfo;
pub use type_info::{ReflectKind, ReflectKindError, TypeInfo};
pub use type_path::{DynamicTypePath, Type, TypePath};
pub use typed::{DynamicTyped, Typed};

pub(crate) use attributes::{impl_custom_attributes_fn, impl_with_custom_attributes};
pub(crate) use type_path::impl_type_fn;
