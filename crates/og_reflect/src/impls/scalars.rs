use chrono::{DateTime, FixedOffset, Utc};

use crate::impls::NonGenericTypeInfoCell;
use crate::info::{ScalarInfo, ScalarKind, TypeInfo, TypePath, Typed};
use crate::ops::{FromScalar, ReflectRef, Scalar, ScalarError, ScalarRef, ScalarValue};
use crate::{FromReflect, Reflect};

/// A function use for implementing [`FromReflect`] for scalar types.
///
/// Accepts the exact type, or any scalar that converts through [`FromScalar`].
#[inline(never)]
pub(crate) fn scalar_from_reflect<T: FromScalar + Clone + 'static>(reflect: &dyn Reflect) -> Option<T> {
    if let Some(value) = reflect.downcast_ref::<T>() {
        return Some(value.clone());
    }
    match reflect.reflect_ref() {
        ReflectRef::Scalar(scalar) => T::from_scalar(scalar.as_scalar().to_value()).ok(),
        _ => None,
    }
}

macro_rules! impl_scalar_common {
    ($ty:ty, $path:expr, $name:expr, $kind:ident) => {
        impl TypePath for $ty {
            #[inline]
            fn type_path() -> &'static str {
                $path
            }

            #[inline]
            fn type_name() -> &'static str {
                $name
            }
        }

        impl Typed for $ty {
            fn type_info() -> &'static TypeInfo {
                static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
                CELL.get_or_init(|| TypeInfo::Scalar(ScalarInfo::new::<Self>(ScalarKind::$kind)))
            }
        }

        impl Reflect for $ty {
            crate::reflection::impl_reflect_cast_fn!(Scalar);

            #[inline]
            fn reflect_clone(&self) -> Box<dyn Reflect> {
                Box::new(self.clone())
            }
        }

        impl FromReflect for $ty {
            #[inline]
            fn from_reflect(reflect: &dyn Reflect) -> Option<Self> {
                scalar_from_reflect(reflect)
            }
        }

        crate::registry::impl_get_type_meta!($ty => TypeTraitFromReflect, TypeTraitDefault);
    };
}

// -----------------------------------------------------------------------------
// Numbers

macro_rules! impl_integer {
    ($($ty:ident => $kind:ident, $variant:ident, $wide:ty;)*) => {$(
        impl_scalar_common!($ty, stringify!($ty), stringify!($ty), $kind);

        impl Scalar for $ty {
            #[inline]
            fn as_scalar(&self) -> ScalarRef<'_> {
                ScalarRef::$variant(*self as $wide)
            }
        }

        impl FromScalar for $ty {
            fn from_scalar(value: ScalarValue) -> Result<Self, ScalarError> {
                value
                    .to_integer()
                    .and_then(|v| <$ty>::try_from(v).ok())
                    .ok_or_else(|| value.error(stringify!($ty)))
            }
        }
    )*};
}

impl_integer! {
    i8 => I8, Int, i64;
    i16 => I16, Int, i64;
    i32 => I32, Int, i64;
    i64 => I64, Int, i64;
    isize => Isize, Int, i64;
    u8 => U8, UInt, u64;
    u16 => U16, UInt, u64;
    u32 => U32, UInt, u64;
    u64 => U64, UInt, u64;
    usize => Usize, UInt, u64;
}

macro_rules! impl_float {
    ($($ty:ident => $kind:ident;)*) => {$(
        impl_scalar_common!($ty, stringify!($ty), stringify!($ty), $kind);

        impl Scalar for $ty {
            #[inline]
            fn as_scalar(&self) -> ScalarRef<'_> {
                ScalarRef::$kind(*self)
            }
        }

        impl FromScalar for $ty {
            fn from_scalar(value: ScalarValue) -> Result<Self, ScalarError> {
                match value.to_float() {
                    Some(v) => Ok(v as $ty),
                    None => Err(value.error(stringify!($ty))),
                }
            }
        }
    )*};
}

impl_float! {
    f32 => F32;
    f64 => F64;
}

// -----------------------------------------------------------------------------
// bool & char

impl_scalar_common!(bool, "bool", "bool", Bool);

impl Scalar for bool {
    #[inline]
    fn as_scalar(&self) -> ScalarRef<'_> {
        ScalarRef::Bool(*self)
    }
}

impl FromScalar for bool {
    fn from_scalar(value: ScalarValue) -> Result<Self, ScalarError> {
        match &value {
            ScalarValue::Bool(v) => Ok(*v),
            ScalarValue::Str(s) if s.eq_ignore_ascii_case("true") => Ok(true),
            ScalarValue::Str(s) if s.eq_ignore_ascii_case("false") => Ok(false),
            _ => Err(value.error("bool")),
        }
    }
}

impl_scalar_common!(char, "char", "char", Char);

impl Scalar for char {
    #[inline]
    fn as_scalar(&self) -> ScalarRef<'_> {
        ScalarRef::Char(*self)
    }
}

impl FromScalar for char {
    fn from_scalar(value: ScalarValue) -> Result<Self, ScalarError> {
        match &value {
            ScalarValue::Char(c) => Ok(*c),
            ScalarValue::Str(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(value.error("char")),
                }
            }
            _ => Err(value.error("char")),
        }
    }
}

// -----------------------------------------------------------------------------
// String

impl_scalar_common!(String, "std::string::String", "String", String);

impl Scalar for String {
    #[inline]
    fn as_scalar(&self) -> ScalarRef<'_> {
        ScalarRef::Str(self.as_str())
    }
}

impl FromScalar for String {
    fn from_scalar(value: ScalarValue) -> Result<Self, ScalarError> {
        match value {
            ScalarValue::Str(s) => Ok(s),
            ScalarValue::Type(_) => Err(value.error("std::string::String")),
            other => Ok(other.as_ref().to_string()),
        }
    }
}

// -----------------------------------------------------------------------------
// chrono

impl_scalar_common!(
    DateTime<FixedOffset>,
    "chrono::DateTime<chrono::FixedOffset>",
    "DateTime<FixedOffset>",
    DateTime
);

impl Scalar for DateTime<FixedOffset> {
    #[inline]
    fn as_scalar(&self) -> ScalarRef<'_> {
        ScalarRef::DateTime(*self)
    }
}

impl FromScalar for DateTime<FixedOffset> {
    fn from_scalar(value: ScalarValue) -> Result<Self, ScalarError> {
        match &value {
            ScalarValue::DateTime(v) => Ok(*v),
            ScalarValue::Str(s) => DateTime::parse_from_rfc3339(s.trim())
                .map_err(|_| value.error("chrono::DateTime<chrono::FixedOffset>")),
            _ => Err(value.error("chrono::DateTime<chrono::FixedOffset>")),
        }
    }
}

impl_scalar_common!(
    DateTime<Utc>,
    "chrono::DateTime<chrono::Utc>",
    "DateTime<Utc>",
    DateTime
);

impl Scalar for DateTime<Utc> {
    #[inline]
    fn as_scalar(&self) -> ScalarRef<'_> {
        ScalarRef::DateTime(self.fixed_offset())
    }
}

impl FromScalar for DateTime<Utc> {
    fn from_scalar(value: ScalarValue) -> Result<Self, ScalarError> {
        DateTime::<FixedOffset>::from_scalar(value)
            .map(|v| v.with_timezone(&Utc))
            .map_err(|err| ScalarError {
                target: "chrono::DateTime<chrono::Utc>",
                ..err
            })
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use chrono::{DateTime, FixedOffset, Utc};

    use crate::FromReflect;
    use crate::ops::{FromScalar, ScalarValue};

    #[test]
    fn integers_are_range_checked() {
        assert_eq!(u8::from_scalar(ScalarValue::Int(255)), Ok(255));
        let err = u8::from_scalar(ScalarValue::Int(256)).unwrap_err();
        assert_eq!(err.value, "256");
        assert_eq!(err.target, "u8");
        assert!(u32::from_scalar(ScalarValue::Int(-1)).is_err());
        assert_eq!(i16::from_scalar(ScalarValue::F64(-7.0)), Ok(-7));
    }

    #[test]
    fn scalars_convert_through_reflection() {
        assert_eq!(u16::from_reflect(&42_i64), Some(42));
        assert_eq!(f32::from_reflect(&3_u8), Some(3.0));
        assert_eq!(String::from_reflect(&7_i32).as_deref(), Some("7"));
        assert_eq!(char::from_reflect(&String::from("x")), Some('x'));
        assert_eq!(bool::from_reflect(&String::from("TRUE")), Some(true));
        assert_eq!(u8::from_reflect(&String::from("many")), None);
    }

    #[test]
    fn dates_convert_between_offsets() {
        let text = String::from("2024-02-29T12:30:00+02:00");
        let fixed = DateTime::<FixedOffset>::from_reflect(&text).unwrap();
        let utc = DateTime::<Utc>::from_reflect(&fixed).unwrap();
        assert_eq!(utc.to_rfc3339(), "2024-02-29T10:30:00+00:00");
    }
}
