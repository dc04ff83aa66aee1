//! Provide some tools for parsing token stream.

// -----------------------------------------------------------------------------
// Modules

mod attributes;
mod reflect_derive;

// -----------------------------------------------------------------------------
// Internal API

pub(crate) use attributes::{FieldAttributes, FieldDefault, TypeAttributes, VariantAttributes};
pub(crate) use reflect_derive::{ReflectDerive, ReflectEnum, ReflectMeta, ReflectStruct, StructField};
