// -----------------------------------------------------------------------------
// Modules

mod match_reflect;

mod enum_kind;
mod opaque_kind;
mod struct_kind;
mod tuple_struct_kind;

mod trait_get_type_meta;
mod trait_reflect;
mod trait_type_path;
mod trait_typed;

// -----------------------------------------------------------------------------
// Internal API

pub(crate) use match_reflect::match_reflect_impls;

use enum_kind::impl_enum;
use opaque_kind::impl_opaque;
use struct_kind::impl_struct;
use trait_get_type_meta::{get_registry_dependencies, impl_trait_get_type_meta};
use trait_reflect::impl_trait_reflect;
use trait_type_path::impl_trait_type_path;
use trait_typed::impl_trait_typed;
use tuple_struct_kind::impl_tuple_struct;
