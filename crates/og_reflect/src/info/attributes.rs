use core::any::TypeId;
use core::fmt;

use og_utils::TypeIdMap;

use crate::Reflect;

// -----------------------------------------------------------------------------
// CustomAttributes

/// A container for custom attributes attached to types, fields and variants.
///
/// Attributes are written as `#[reflect(@expr)]` in the derive and stored by
/// the type of `expr`, at most one value per type.
///
/// ```
/// use og_reflect::{derive::Reflect, info::Typed};
///
/// #[derive(Reflect, Clone, PartialEq, Debug)]
/// #[reflect(opaque, clone)]
/// struct Tooltip(&'static str);
///
/// #[derive(Reflect)]
/// struct Slider {
///     #[reflect(@Tooltip("How far"))]
///     value: f32,
/// }
///
/// let info = Slider::type_info().as_struct().unwrap();
/// let field = info.field("value").unwrap();
/// assert_eq!(field.get_attribute::<Tooltip>(), Some(&Tooltip("How far")));
/// ```
#[derive(Default)]
pub struct CustomAttributes {
    attributes: TypeIdMap<Box<dyn Reflect>>,
}

impl CustomAttributes {
    pub(crate) const EMPTY: &'static Self = &Self::new();

    /// Creates an empty container.
    #[inline]
    pub const fn new() -> Self {
        Self {
            attributes: TypeIdMap::new(),
        }
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            attributes: TypeIdMap::with_capacity(capacity),
        }
    }

    /// Adds an attribute, replacing the previous one of the same type.
    #[inline]
    pub fn with_attribute<T: Reflect>(mut self, value: T) -> Self {
        self.attributes.insert(TypeId::of::<T>(), Box::new(value));
        self
    }

    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&TypeId, &dyn Reflect)> {
        self.attributes.iter().map(|(key, val)| (key, &**val))
    }

    #[inline]
    pub fn contains<T: Reflect>(&self) -> bool {
        self.attributes.contains(&TypeId::of::<T>())
    }

    #[inline]
    pub fn get<T: Reflect>(&self) -> Option<&T> {
        self.get_by_id(TypeId::of::<T>())
            .and_then(<dyn Reflect>::downcast_ref)
    }

    #[inline]
    pub fn get_by_id(&self, id: TypeId) -> Option<&dyn Reflect> {
        self.attributes.get(&id).map(core::ops::Deref::deref)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl fmt::Debug for CustomAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.attributes.values()).finish()
    }
}

// -----------------------------------------------------------------------------
// Auxiliary macro

macro_rules! impl_custom_attributes_fn {
    ($field:ident) => {
        /// Returns the custom attributes.
        #[inline]
        pub fn custom_attributes(&self) -> &$crate::info::CustomAttributes {
            match &self.$field {
                Some(ptr) => &**ptr,
                None => $crate::info::CustomAttributes::EMPTY,
            }
        }

        /// Returns the attribute of type `T`, if present.
        pub fn get_attribute<T: $crate::Reflect>(&self) -> Option<&T> {
            self.custom_attributes().get::<T>()
        }

        /// Returns `true` if an attribute of type `T` is present.
        pub fn has_attribute<T: $crate::Reflect>(&self) -> bool {
            self.custom_attributes().contains::<T>()
        }
    };
}

macro_rules! impl_with_custom_attributes {
    ($field:ident) => {
        /// Replaces the custom attributes.
        pub fn with_custom_attributes(self, attributes: $crate::info::CustomAttributes) -> Self {
            if attributes.is_empty() {
                Self {
                    $field: None,
                    ..self
                }
            } else {
                Self {
                    $field: Some(::std::sync::Arc::new(attributes)),
                    ..self
                }
            }
        }
    };
}

pub(crate) use impl_custom_attributes_fn;
pub(crate) use impl_with_custom_attributes;
