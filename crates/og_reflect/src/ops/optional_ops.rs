use crate::impls::NonGenericTypeInfoCell;
use crate::info::{AnyInfo, ReflectKind, TypeInfo, TypePath, Typed};
use crate::ops::ReflectRef;
use crate::{FromReflect, Reflect};

// -----------------------------------------------------------------------------
// Optional

/// A value that may be absent.
///
/// Implemented by `Option<T>`, `OnceLock<T>` and an empty [`Value`].
/// Encoders write an absent value as `null`.
///
/// [`Value`]: crate::Value
pub trait Optional: Reflect {
    /// Returns the contained value, if any.
    fn value(&self) -> Option<&dyn Reflect>;

    #[inline]
    fn is_none(&self) -> bool {
        self.value().is_none()
    }

    /// Creates a new [`DynamicOptional`] from this value.
    fn to_dynamic_optional(&self) -> DynamicOptional {
        let mut dynamic = DynamicOptional::new(self.value().map(Reflect::to_dynamic));
        // A `Value` is optional only when empty; it is not an `Optional` type.
        if let Some(info) = self.represented_type_info()
            && info.kind() == ReflectKind::Optional
        {
            dynamic.set_represented_type(Some(info));
        }
        dynamic
    }
}

// -----------------------------------------------------------------------------
// DynamicOptional

/// An optional value defined at runtime.
#[derive(Default)]
pub struct DynamicOptional {
    info: Option<&'static TypeInfo>,
    value: Option<Box<dyn Reflect>>,
}

impl DynamicOptional {
    #[inline]
    pub fn new(value: Option<Box<dyn Reflect>>) -> Self {
        Self { info: None, value }
    }

    #[inline]
    pub fn none() -> Self {
        Self::default()
    }

    /// Sets the type to be represented by this `DynamicOptional`.
    ///
    /// # Panics
    ///
    /// Panics if the given info is not an optional.
    pub fn set_represented_type(&mut self, info: Option<&'static TypeInfo>) {
        if let Some(info) = info {
            assert!(
                info.kind() == ReflectKind::Optional,
                "`DynamicOptional` cannot represent `{}` of kind {}",
                info.type_path(),
                info.kind(),
            );
        }
        self.info = info;
    }

    /// Consumes the optional, returning the contained value.
    #[inline]
    pub fn into_value(self) -> Option<Box<dyn Reflect>> {
        self.value
    }
}

impl Optional for DynamicOptional {
    #[inline]
    fn value(&self) -> Option<&dyn Reflect> {
        self.value.as_deref()
    }
}

impl Reflect for DynamicOptional {
    crate::reflection::impl_reflect_cast_fn!(Optional);

    #[inline]
    fn is_dynamic(&self) -> bool {
        true
    }

    #[inline]
    fn represented_type_info(&self) -> Option<&'static TypeInfo> {
        self.info
    }

    #[inline]
    fn reflect_clone(&self) -> Box<dyn Reflect> {
        Box::new(self.to_dynamic_optional())
    }
}

impl FromReflect for DynamicOptional {
    fn from_reflect(reflect: &dyn Reflect) -> Option<Self> {
        match reflect.reflect_ref() {
            ReflectRef::Optional(value) => Some(value.to_dynamic_optional()),
            _ => Some(Self::new(Some(reflect.to_dynamic()))),
        }
    }
}

impl TypePath for DynamicOptional {
    #[inline]
    fn type_path() -> &'static str {
        "og_reflect::ops::DynamicOptional"
    }

    #[inline]
    fn type_name() -> &'static str {
        "DynamicOptional"
    }
}

impl Typed for DynamicOptional {
    fn type_info() -> &'static TypeInfo {
        static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
        CELL.get_or_init(|| TypeInfo::Any(AnyInfo::new::<Self>()))
    }
}

impl core::fmt::Debug for DynamicOptional {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.reflect_debug(f)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{DynamicOptional, Optional};
    use crate::{FromReflect, Reflect};

    #[test]
    fn option_through_dynamic() {
        let some = Some(5_u32);
        let dynamic = some.to_dynamic_optional();
        assert!(!dynamic.is_none());
        assert_eq!(<Option<u32>>::from_reflect(&dynamic), Some(Some(5)));

        let none = DynamicOptional::none();
        assert_eq!(<Option<u32>>::from_reflect(&none), Some(None));
        assert_eq!(None::<u32>.reflect_partial_eq(&none), Some(true));
    }
}
