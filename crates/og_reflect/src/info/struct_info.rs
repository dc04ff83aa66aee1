use std::sync::Arc;

use og_utils::hash::HashMap;

use crate::Reflect;
use crate::info::{CustomAttributes, NamedField, Type, TypePath};
use crate::info::{impl_custom_attributes_fn, impl_type_fn, impl_with_custom_attributes};

/// A container for compile-time named struct info.
///
/// Unit structs are structs without fields.
#[derive(Clone, Debug)]
pub struct StructInfo {
    ty: Type,
    fields: Box<[NamedField]>,
    field_indices: HashMap<&'static str, usize>,
    default: Option<fn() -> Box<dyn Reflect>>,
    // Use `Option` to reduce unnecessary heap requests (when empty content).
    custom_attributes: Option<Arc<CustomAttributes>>,
}

impl StructInfo {
    impl_type_fn!(ty);
    impl_custom_attributes_fn!(custom_attributes);
    impl_with_custom_attributes!(custom_attributes);

    /// Create a new [`StructInfo`], fields in declaration order.
    pub fn new<T: TypePath>(fields: &[NamedField]) -> Self {
        let field_indices = fields
            .iter()
            .enumerate()
            .map(|(index, field)| (field.name(), index))
            .collect();

        Self {
            ty: Type::of::<T>(),
            fields: fields.into(),
            field_indices,
            default: None,
            custom_attributes: None,
        }
    }

    /// Attaches the constructor of the type-level default value.
    pub fn with_default(self, default: fn() -> Box<dyn Reflect>) -> Self {
        Self {
            default: Some(default),
            ..self
        }
    }

    /// Builds the type-level default value, if the type declares one.
    #[inline]
    pub fn default_value(&self) -> Option<Box<dyn Reflect>> {
        self.default.map(|f| f())
    }

    pub fn field(&self, name: &str) -> Option<&NamedField> {
        self.fields.get(*self.field_indices.get(name)?)
    }

    #[inline]
    pub fn field_at(&self, index: usize) -> Option<&NamedField> {
        self.fields.get(index)
    }

    #[inline]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.field_indices.get(name).copied()
    }

    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &NamedField> {
        self.fields.iter()
    }

    #[inline]
    pub fn field_len(&self) -> usize {
        self.fields.len()
    }
}
