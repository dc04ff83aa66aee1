use std::sync::Arc;

use crate::info::{CustomAttributes, Type, TypePath};
use crate::info::{impl_custom_attributes_fn, impl_type_fn, impl_with_custom_attributes};

// -----------------------------------------------------------------------------
// VariantInfo

/// A unit variant of a reflected enum.
#[derive(Clone, Debug)]
pub struct VariantInfo {
    name: &'static str,
    discriminant: i64,
    custom_attributes: Option<Arc<CustomAttributes>>,
}

impl VariantInfo {
    impl_custom_attributes_fn!(custom_attributes);
    impl_with_custom_attributes!(custom_attributes);

    /// Create a new [`VariantInfo`].
    #[inline]
    pub const fn new(name: &'static str, discriminant: i64) -> Self {
        Self {
            name,
            discriminant,
            custom_attributes: None,
        }
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub const fn discriminant(&self) -> i64 {
        self.discriminant
    }
}

// -----------------------------------------------------------------------------
// EnumInfo

/// A container for compile-time enum info.
///
/// Only field-less enums are reflected; each variant carries its discriminant.
#[derive(Clone, Debug)]
pub struct EnumInfo {
    ty: Type,
    variants: Box<[VariantInfo]>,
    custom_attributes: Option<Arc<CustomAttributes>>,
}

impl EnumInfo {
    impl_type_fn!(ty);
    impl_custom_attributes_fn!(custom_attributes);
    impl_with_custom_attributes!(custom_attributes);

    /// Create a new [`EnumInfo`], variants in declaration order.
    pub fn new<T: TypePath>(variants: &[VariantInfo]) -> Self {
        Self {
            ty: Type::of::<T>(),
            variants: variants.into(),
            custom_attributes: None,
        }
    }

    pub fn variant(&self, name: &str) -> Option<&VariantInfo> {
        self.variants.iter().find(|v| v.name == name)
    }

    #[inline]
    pub fn variant_at(&self, index: usize) -> Option<&VariantInfo> {
        self.variants.get(index)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.variants.iter().position(|v| v.name == name)
    }

    /// Returns the index of the variant with the given discriminant.
    pub fn index_of_discriminant(&self, discriminant: i64) -> Option<usize> {
        self.variants
            .iter()
            .position(|v| v.discriminant == discriminant)
    }

    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &VariantInfo> {
        self.variants.iter()
    }

    #[inline]
    pub fn variant_len(&self) -> usize {
        self.variants.len()
    }
}
