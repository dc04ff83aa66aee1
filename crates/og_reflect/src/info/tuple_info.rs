use std::sync::Arc;

use crate::info::{CustomAttributes, Type, TypePath, UnnamedField};
use crate::info::{impl_custom_attributes_fn, impl_type_fn, impl_with_custom_attributes};

/// A container for compile-time tuple and tuple struct info.
#[derive(Clone, Debug)]
pub struct TupleInfo {
    ty: Type,
    fields: Box<[UnnamedField]>,
    custom_attributes: Option<Arc<CustomAttributes>>,
}

impl TupleInfo {
    impl_type_fn!(ty);
    impl_custom_attributes_fn!(custom_attributes);
    impl_with_custom_attributes!(custom_attributes);

    /// Create a new [`TupleInfo`].
    pub fn new<T: TypePath>(fields: &[UnnamedField]) -> Self {
        Self {
            ty: Type::of::<T>(),
            fields: fields.into(),
            custom_attributes: None,
        }
    }

    #[inline]
    pub fn field_at(&self, index: usize) -> Option<&UnnamedField> {
        self.fields.get(index)
    }

    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &UnnamedField> {
        self.fields.iter()
    }

    #[inline]
    pub fn field_len(&self) -> usize {
        self.fields.len()
    }
}
