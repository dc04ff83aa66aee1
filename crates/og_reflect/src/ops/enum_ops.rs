use std::borrow::Cow;

use crate::impls::NonGenericTypeInfoCell;
use crate::info::{AnyInfo, ReflectKind, TypeInfo, TypePath, Typed};
use crate::ops::ReflectRef;
use crate::{FromReflect, Reflect};

// -----------------------------------------------------------------------------
// Enum

/// A trait used to power enum-like operations via reflection.
///
/// Only field-less enums are reflected: a value is fully described by
/// its variant.
pub trait Enum: Reflect {
    /// Returns the name of the current variant.
    fn variant_name(&self) -> &str;

    /// Returns the declaration index of the current variant.
    fn variant_index(&self) -> usize;

    /// Returns the discriminant of the current variant.
    fn discriminant(&self) -> i64;

    /// Creates a new [`DynamicEnum`] from this enum.
    fn to_dynamic_enum(&self) -> DynamicEnum {
        let mut dynamic = DynamicEnum::new(
            self.variant_name().to_owned(),
            self.variant_index(),
            self.discriminant(),
        );
        dynamic.set_represented_type(self.represented_type_info());
        dynamic
    }
}

// -----------------------------------------------------------------------------
// DynamicEnum

/// An enum value defined at runtime.
#[derive(Debug, Clone)]
pub struct DynamicEnum {
    info: Option<&'static TypeInfo>,
    name: Cow<'static, str>,
    index: usize,
    discriminant: i64,
}

impl DynamicEnum {
    #[inline]
    pub fn new(name: impl Into<Cow<'static, str>>, index: usize, discriminant: i64) -> Self {
        Self {
            info: None,
            name: name.into(),
            index,
            discriminant,
        }
    }

    /// Sets the type to be represented by this `DynamicEnum`.
    ///
    /// # Panics
    ///
    /// Panics if the given info is not an enum.
    pub fn set_represented_type(&mut self, info: Option<&'static TypeInfo>) {
        if let Some(info) = info {
            assert!(
                info.kind() == ReflectKind::Enum,
                "`DynamicEnum` cannot represent `{}` of kind {}",
                info.type_path(),
                info.kind(),
            );
        }
        self.info = info;
    }
}

impl Enum for DynamicEnum {
    #[inline]
    fn variant_name(&self) -> &str {
        &self.name
    }

    #[inline]
    fn variant_index(&self) -> usize {
        self.index
    }

    #[inline]
    fn discriminant(&self) -> i64 {
        self.discriminant
    }
}

impl Reflect for DynamicEnum {
    crate::reflection::impl_reflect_cast_fn!(Enum);

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
        Box::new(self.clone())
    }
}

impl FromReflect for DynamicEnum {
    fn from_reflect(reflect: &dyn Reflect) -> Option<Self> {
        match reflect.reflect_ref() {
            ReflectRef::Enum(value) => Some(value.to_dynamic_enum()),
            _ => None,
        }
    }
}

impl TypePath for DynamicEnum {
    #[inline]
    fn type_path() -> &'static str {
        "og_reflect::ops::DynamicEnum"
    }

    #[inline]
    fn type_name() -> &'static str {
        "DynamicEnum"
    }
}

impl Typed for DynamicEnum {
    fn type_info() -> &'static TypeInfo {
        static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
        CELL.get_or_init(|| TypeInfo::Any(AnyInfo::new::<Self>()))
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::Enum;
    use crate::{FromReflect, Reflect, derive::Reflect};

    #[derive(Reflect, Debug, PartialEq, Clone, Copy)]
    #[reflect(clone)]
    enum Level {
        Low = 1,
        High = 10,
    }

    #[test]
    fn dynamic_enum_round_trip() {
        let dynamic = Level::High.to_dynamic_enum();
        assert_eq!(dynamic.variant_name(), "High");
        assert_eq!(dynamic.variant_index(), 1);
        assert_eq!(dynamic.discriminant(), 10);
        assert!(dynamic.is_dynamic());

        assert_eq!(Level::from_reflect(&dynamic), Some(Level::High));
        assert_eq!(Level::Low.reflect_partial_eq(&dynamic), Some(false));
    }
}
