use std::sync::Arc;

use crate::info::{CustomAttributes, Type, TypePath};
use crate::info::{impl_custom_attributes_fn, impl_type_fn, impl_with_custom_attributes};

// -----------------------------------------------------------------------------
// OpaqueInfo

/// A container for compile-time info of a type whose content is hidden.
#[derive(Clone, Debug)]
pub struct OpaqueInfo {
    ty: Type,
    custom_attributes: Option<Arc<CustomAttributes>>,
}

impl OpaqueInfo {
    impl_type_fn!(ty);
    impl_custom_attributes_fn!(custom_attributes);
    impl_with_custom_attributes!(custom_attributes);

    /// Create a new [`OpaqueInfo`].
    #[inline]
    pub fn new<T: TypePath + ?Sized>() -> Self {
        Self {
            ty: Type::of::<T>(),
            custom_attributes: None,
        }
    }
}

// -----------------------------------------------------------------------------
// AnyInfo

/// A container for compile-time info of a type that holds values of any shape.
///
/// [`Value`](crate::Value) and the dynamic containers have this info:
/// decoders pick the concrete shape from the input.
#[derive(Clone, Debug)]
pub struct AnyInfo {
    ty: Type,
}

impl AnyInfo {
    impl_type_fn!(ty);

    /// Create a new [`AnyInfo`].
    #[inline]
    pub fn new<T: TypePath>() -> Self {
        Self { ty: Type::of::<T>() }
    }
}
