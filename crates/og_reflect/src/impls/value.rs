use core::fmt;

use crate::impls::NonGenericTypeInfoCell;
use crate::impls::scalars::scalar_from_reflect;
use crate::info::{AnyInfo, ScalarInfo, ScalarKind, TypeInfo, TypePath, Typed};
use crate::ops::{FromScalar, Optional, ReflectRef, Scalar, ScalarError, ScalarRef, ScalarValue};
use crate::{FromReflect, Reflect};

// -----------------------------------------------------------------------------
// Value

/// A reflected value of any type, or nothing.
///
/// `Value` is the "any" target of decoders: they fill it with whatever the
/// input holds, scalars as concrete values and containers as `Dynamic*`
/// values. Its shape view is the one of the held value; an empty `Value`
/// is an absent [`Optional`].
///
/// ```
/// use og_reflect::{Reflect, Value};
/// use og_reflect::info::ReflectKind;
///
/// let value = Value::new(12_u8);
/// assert_eq!(value.reflect_kind(), ReflectKind::Scalar);
/// assert_eq!(value.downcast_ref::<u8>(), Some(&12));
///
/// assert_eq!(Value::empty().reflect_kind(), ReflectKind::Optional);
/// ```
#[derive(Default)]
pub struct Value(Option<Box<dyn Reflect>>);

impl Value {
    #[inline]
    pub fn new<T: Reflect>(value: T) -> Self {
        Self(Some(Box::new(value)))
    }

    #[inline]
    pub fn from_boxed(value: Box<dyn Reflect>) -> Self {
        Self(Some(value))
    }

    #[inline]
    pub const fn empty() -> Self {
        Self(None)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// Returns the held value.
    #[inline]
    pub fn get(&self) -> Option<&dyn Reflect> {
        self.0.as_deref()
    }

    /// Returns the held value downcast to `T`.
    #[inline]
    pub fn downcast_ref<T: Reflect>(&self) -> Option<&T> {
        self.get()?.downcast_ref::<T>()
    }

    #[inline]
    pub fn into_inner(self) -> Option<Box<dyn Reflect>> {
        self.0
    }
}

impl From<Box<dyn Reflect>> for Value {
    #[inline]
    fn from(value: Box<dyn Reflect>) -> Self {
        Self(Some(value))
    }
}

impl Clone for Value {
    fn clone(&self) -> Self {
        Self(self.0.as_ref().map(|value| value.reflect_clone()))
    }
}

impl Optional for Value {
    #[inline]
    fn value(&self) -> Option<&dyn Reflect> {
        self.get()
    }
}

impl Reflect for Value {
    #[inline]
    fn is_dynamic(&self) -> bool {
        self.0.as_ref().is_some_and(|value| value.is_dynamic())
    }

    #[inline]
    fn represented_type_info(&self) -> Option<&'static TypeInfo> {
        match &self.0 {
            Some(value) => value.represented_type_info(),
            None => Some(Self::type_info()),
        }
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        match &self.0 {
            Some(value) => value.reflect_ref(),
            None => ReflectRef::Optional(self),
        }
    }

    #[inline]
    fn reflect_clone(&self) -> Box<dyn Reflect> {
        Box::new(self.clone())
    }
}

impl FromReflect for Value {
    fn from_reflect(reflect: &dyn Reflect) -> Option<Self> {
        if let Some(value) = reflect.downcast_ref::<Value>() {
            return Some(value.clone());
        }
        match reflect.reflect_ref() {
            ReflectRef::Optional(optional) if optional.is_none() => Some(Self::empty()),
            _ => Some(Self::from_boxed(reflect.reflect_clone())),
        }
    }
}

impl TypePath for Value {
    #[inline]
    fn type_path() -> &'static str {
        "og_reflect::Value"
    }

    #[inline]
    fn type_name() -> &'static str {
        "Value"
    }
}

impl Typed for Value {
    fn type_info() -> &'static TypeInfo {
        static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
        CELL.get_or_init(|| TypeInfo::Any(AnyInfo::new::<Self>()))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(value) => value.reflect_debug(f),
            None => f.write_str("Value(None)"),
        }
    }
}

crate::registry::impl_get_type_meta!(Value => TypeTraitFromReflect, TypeTraitDefault);

// -----------------------------------------------------------------------------
// TypeHandle

/// A reflected reference to a type.
///
/// Encoders write a handle as its full type path; decoders resolve the path
/// through a type registry.
#[derive(Clone, Copy)]
pub struct TypeHandle(pub &'static TypeInfo);

impl TypeHandle {
    #[inline]
    pub fn of<T: Typed>() -> Self {
        Self(T::type_info())
    }

    #[inline]
    pub const fn info(&self) -> &'static TypeInfo {
        self.0
    }
}

impl PartialEq for TypeHandle {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.0.type_id() == other.0.type_id()
    }
}

impl Eq for TypeHandle {}

impl fmt::Debug for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHandle({})", self.0.type_path())
    }
}

impl Scalar for TypeHandle {
    #[inline]
    fn as_scalar(&self) -> ScalarRef<'_> {
        ScalarRef::Type(self.0)
    }
}

impl FromScalar for TypeHandle {
    fn from_scalar(value: ScalarValue) -> Result<Self, ScalarError> {
        match value {
            ScalarValue::Type(info) => Ok(Self(info)),
            other => Err(other.error("og_reflect::TypeHandle")),
        }
    }
}

impl Reflect for TypeHandle {
    crate::reflection::impl_reflect_cast_fn!(Scalar);

    #[inline]
    fn reflect_clone(&self) -> Box<dyn Reflect> {
        Box::new(*self)
    }
}

impl FromReflect for TypeHandle {
    #[inline]
    fn from_reflect(reflect: &dyn Reflect) -> Option<Self> {
        scalar_from_reflect(reflect)
    }
}

impl TypePath for TypeHandle {
    #[inline]
    fn type_path() -> &'static str {
        "og_reflect::TypeHandle"
    }

    #[inline]
    fn type_name() -> &'static str {
        "TypeHandle"
    }
}

impl Typed for TypeHandle {
    fn type_info() -> &'static TypeInfo {
        static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
        CELL.get_or_init(|| TypeInfo::Scalar(ScalarInfo::new::<Self>(ScalarKind::Type)))
    }
}

crate::registry::impl_get_type_meta!(TypeHandle => TypeTraitFromReflect);

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{TypeHandle, Value};
    use crate::info::ReflectKind;
    use crate::ops::DynamicStruct;
    use crate::{FromReflect, Reflect};

    #[test]
    fn value_wraps_anything() {
        let mut record = DynamicStruct::new();
        record.insert("k", 1_u8);
        let value = Value::new(record);
        assert_eq!(value.reflect_kind(), ReflectKind::Struct);
        assert!(value.is_dynamic());

        let copy = Value::from_reflect(&value).unwrap();
        assert_eq!(copy.reflect_partial_eq(&value), Some(true));

        let empty = Value::from_reflect(&None::<u8>).unwrap();
        assert!(empty.is_empty());
        assert_eq!(format!("{empty:?}"), "Value(None)");
    }

    #[test]
    fn type_handles_compare_by_type() {
        let handle = TypeHandle::of::<u32>();
        assert_eq!(handle, TypeHandle::of::<u32>());
        assert_ne!(handle, TypeHandle::of::<i32>());
        assert_eq!(format!("{:?}", handle.as_reflect()), "u32");
        assert_eq!(TypeHandle::from_reflect(&handle), Some(handle));
    }
}
