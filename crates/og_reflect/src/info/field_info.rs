use core::any::{Any, TypeId};
use std::sync::Arc;

use crate::Reflect;
use crate::info::{CustomAttributes, TypeInfo, Typed};
use crate::info::{impl_custom_attributes_fn, impl_with_custom_attributes};

// -----------------------------------------------------------------------------
// NamedField

/// The named field of a reflected struct.
#[derive(Clone, Debug)]
pub struct NamedField {
    ty_id: TypeId,
    name: &'static str,
    // `TypeInfo` is created on first access; using a function pointer delays it.
    type_info: fn() -> &'static TypeInfo,
    default: Option<fn() -> Box<dyn Reflect>>,
    // Use `Option` to reduce unnecessary heap requests (when empty content).
    custom_attributes: Option<Arc<CustomAttributes>>,
}

impl NamedField {
    impl_custom_attributes_fn!(custom_attributes);
    impl_with_custom_attributes!(custom_attributes);

    /// Create a new [`NamedField`].
    #[inline]
    pub const fn new<T: Typed>(name: &'static str) -> Self {
        Self {
            name,
            type_info: T::type_info,
            ty_id: TypeId::of::<T>(),
            default: None,
            custom_attributes: None,
        }
    }

    /// Attaches the constructor of this field's default value.
    ///
    /// Decoders apply it before reading, so the field may be absent.
    #[inline]
    pub fn with_default(self, default: fn() -> Box<dyn Reflect>) -> Self {
        Self {
            default: Some(default),
            ..self
        }
    }

    #[inline]
    pub const fn ty_id(&self) -> TypeId {
        self.ty_id
    }

    #[inline]
    pub fn type_is<T: Any>(&self) -> bool {
        self.ty_id == TypeId::of::<T>()
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn type_info(&self) -> &'static TypeInfo {
        (self.type_info)()
    }

    /// Returns `true` if the field declares a default value.
    #[inline]
    pub const fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Builds the declared default value.
    #[inline]
    pub fn default_value(&self) -> Option<Box<dyn Reflect>> {
        self.default.map(|f| f())
    }
}

// -----------------------------------------------------------------------------
// UnnamedField

/// The positional field of a reflected tuple or tuple struct.
#[derive(Clone, Debug)]
pub struct UnnamedField {
    ty_id: TypeId,
    index: usize,
    type_info: fn() -> &'static TypeInfo,
    custom_attributes: Option<Arc<CustomAttributes>>,
}

impl UnnamedField {
    impl_custom_attributes_fn!(custom_attributes);
    impl_with_custom_attributes!(custom_attributes);

    /// Create a new [`UnnamedField`].
    #[inline]
    pub const fn new<T: Typed>(index: usize) -> Self {
        Self {
            index,
            type_info: T::type_info,
            ty_id: TypeId::of::<T>(),
            custom_attributes: None,
        }
    }

    #[inline]
    pub const fn ty_id(&self) -> TypeId {
        self.ty_id
    }

    #[inline]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn type_info(&self) -> &'static TypeInfo {
        (self.type_info)()
    }
}
