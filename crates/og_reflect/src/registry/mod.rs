//! Type registry for type-driven lookups.
//!
//! ## Menu
//!
//! - [`TypeTrait`]: a capability supported by a type.
//! - [`FromType`]: creates a `TypeTrait` from a type.
//! - [`TypeMeta`]: a [`TypeInfo`] together with a [`TypeTrait`] table.
//! - [`GetTypeMeta`]: creates a `TypeMeta` from a type.
//! - [`TypeRegistry`]: the container of `TypeMeta`s, indexed by id, full path
//!   and short name.
//! - [`TypeCatalog`]: name resolution over a registry.
//! - TypeTraits:
//!     - [`TypeTraitDefault`]: [`Default`] for reflected types.
//!     - [`TypeTraitFromReflect`]: [`FromReflect`] behind a type id.
//!     - [`TypeTraitSerialize`]: a type that serializes itself through serde.
//!     - [`TypeTraitDeserialize`]: a type that deserializes itself through serde.
//!
//! [`FromReflect`]: crate::FromReflect
//! [`TypeInfo`]: crate::info::TypeInfo

// -----------------------------------------------------------------------------
// Modules

mod catalog;
mod from_type;
mod traits;
mod type_meta;
mod type_registry;
mod type_trait;

// -----------------------------------------------------------------------------
// Exports

pub use catalog::TypeCatalog;
pub use from_type::FromType;
pub use traits::{TypeTraitDefault, TypeTraitFromReflect};
pub use traits::{TypeTraitDeserialize, TypeTraitSerialize};
pub use type_meta::{GetTypeMeta, TypeMeta};
pub use type_registry::TypeRegistry;
pub use type_trait::TypeTrait;

// -----------------------------------------------------------------------------
// Auxiliary macro

/// Implements [`GetTypeMeta`] for a non-generic type with the listed type traits.
macro_rules! impl_get_type_meta {
    ($ty:ty => $($type_trait:ident),* $(,)?) => {
        impl $crate::registry::GetTypeMeta for $ty {
            fn get_type_meta() -> $crate::registry::TypeMeta {
                #[allow(unused_mut)]
                let mut meta = $crate::registry::TypeMeta::of::<Self>();
                $(
                    meta.insert_trait::<$crate::registry::$type_trait>(
                        $crate::registry::FromType::<Self>::from_type(),
                    );
                )*
                meta
            }
        }
    };
}

pub(crate) use impl_get_type_meta;
