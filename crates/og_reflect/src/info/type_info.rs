use core::{error, fmt};

use crate::info::{AnyInfo, CustomAttributes, EnumInfo, ListInfo, MapInfo};
use crate::info::{OpaqueInfo, OptionalInfo, ScalarInfo, StructInfo, TupleInfo, Type};

// -----------------------------------------------------------------------------
// ReflectKind

/// An enumeration of the "kinds" of a reflected type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReflectKind {
    Struct,
    Tuple,
    List,
    Map,
    Enum,
    Optional,
    Scalar,
    Any,
    Opaque,
}

impl fmt::Display for ReflectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Struct => f.pad("Struct"),
            Self::Tuple => f.pad("Tuple"),
            Self::List => f.pad("List"),
            Self::Map => f.pad("Map"),
            Self::Enum => f.pad("Enum"),
            Self::Optional => f.pad("Optional"),
            Self::Scalar => f.pad("Scalar"),
            Self::Any => f.pad("Any"),
            Self::Opaque => f.pad("Opaque"),
        }
    }
}

/// Caused when a type was expected to be of a certain kind, but was not.
#[derive(Debug)]
pub struct ReflectKindError {
    pub expected: ReflectKind,
    pub received: ReflectKind,
}

impl fmt::Display for ReflectKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "reflect kind mismatch: expected {}, received {}",
            self.expected, self.received
        )
    }
}

impl error::Error for ReflectKindError {}

// -----------------------------------------------------------------------------
// TypeInfo

/// Compile-time type information for the various reflected types.
///
/// Get it through [`Typed::type_info`] or, from a value,
/// [`DynamicTyped::reflect_type_info`].
///
/// [`Typed::type_info`]: crate::info::Typed::type_info
/// [`DynamicTyped::reflect_type_info`]: crate::info::DynamicTyped::reflect_type_info
#[derive(Debug, Clone)]
pub enum TypeInfo {
    Struct(StructInfo),
    Tuple(TupleInfo),
    List(ListInfo),
    Map(MapInfo),
    Enum(EnumInfo),
    Optional(OptionalInfo),
    Scalar(ScalarInfo),
    Any(AnyInfo),
    Opaque(OpaqueInfo),
}

// Helper macro that implements type-safe accessor methods like `as_struct`.
macro_rules! impl_cast_method {
    ($name:ident : $kind:ident => $info:ident) => {
        #[doc = concat!("Returns the [`", stringify!($info), "`] if this is `", stringify!($kind), "`.")]
        pub const fn $name(&self) -> Result<&$info, ReflectKindError> {
            match self {
                Self::$kind(info) => Ok(info),
                _ => Err(ReflectKindError {
                    expected: ReflectKind::$kind,
                    received: self.kind(),
                }),
            }
        }
    };
}

impl TypeInfo {
    impl_cast_method!(as_struct: Struct => StructInfo);
    impl_cast_method!(as_tuple: Tuple => TupleInfo);
    impl_cast_method!(as_list: List => ListInfo);
    impl_cast_method!(as_map: Map => MapInfo);
    impl_cast_method!(as_enum: Enum => EnumInfo);
    impl_cast_method!(as_optional: Optional => OptionalInfo);
    impl_cast_method!(as_scalar: Scalar => ScalarInfo);
    impl_cast_method!(as_opaque: Opaque => OpaqueInfo);

    /// Returns the underlying [`Type`].
    pub const fn ty(&self) -> &Type {
        match self {
            Self::Struct(info) => info.ty(),
            Self::Tuple(info) => info.ty(),
            Self::List(info) => info.ty(),
            Self::Map(info) => info.ty(),
            Self::Enum(info) => info.ty(),
            Self::Optional(info) => info.ty(),
            Self::Scalar(info) => info.ty(),
            Self::Any(info) => info.ty(),
            Self::Opaque(info) => info.ty(),
        }
    }

    /// Returns the `TypeId`.
    #[inline]
    pub const fn type_id(&self) -> core::any::TypeId {
        self.ty().id()
    }

    /// Check if the given type matches this one.
    #[inline]
    pub fn type_is<T: core::any::Any>(&self) -> bool {
        self.ty().is::<T>()
    }

    #[inline]
    pub fn type_path(&self) -> &'static str {
        self.ty().path()
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.ty().name()
    }

    /// Returns the kind of this type.
    pub const fn kind(&self) -> ReflectKind {
        match self {
            Self::Struct(_) => ReflectKind::Struct,
            Self::Tuple(_) => ReflectKind::Tuple,
            Self::List(_) => ReflectKind::List,
            Self::Map(_) => ReflectKind::Map,
            Self::Enum(_) => ReflectKind::Enum,
            Self::Optional(_) => ReflectKind::Optional,
            Self::Scalar(_) => ReflectKind::Scalar,
            Self::Any(_) => ReflectKind::Any,
            Self::Opaque(_) => ReflectKind::Opaque,
        }
    }

    /// Returns the type-level custom attributes.
    pub fn custom_attributes(&self) -> &CustomAttributes {
        match self {
            Self::Struct(info) => info.custom_attributes(),
            Self::Tuple(info) => info.custom_attributes(),
            Self::Enum(info) => info.custom_attributes(),
            Self::Opaque(info) => info.custom_attributes(),
            _ => CustomAttributes::EMPTY,
        }
    }

    /// Returns the type-level attribute of type `T`, if present.
    pub fn get_attribute<T: crate::Reflect>(&self) -> Option<&T> {
        self.custom_attributes().get::<T>()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::info::{ReflectKind, ScalarKind, Typed};

    #[test]
    fn kinds_of_builtin_types() {
        assert_eq!(i32::type_info().kind(), ReflectKind::Scalar);
        assert_eq!(<Vec<i32>>::type_info().kind(), ReflectKind::List);
        assert_eq!(<Option<i32>>::type_info().kind(), ReflectKind::Optional);
        assert_eq!(<(u8, u8)>::type_info().kind(), ReflectKind::Tuple);
        assert_eq!(crate::Value::type_info().kind(), ReflectKind::Any);

        let scalar = f32::type_info().as_scalar().unwrap();
        assert_eq!(scalar.kind(), ScalarKind::F32);

        let err = i32::type_info().as_struct().unwrap_err();
        assert_eq!(err.received, ReflectKind::Scalar);
    }

    #[test]
    fn arrays_have_capacity() {
        let info = <[u16; 3]>::type_info().as_list().unwrap();
        assert_eq!(info.capacity(), Some(3));
        assert!(info.item_info().type_is::<u16>());
        assert_eq!(<Vec<u16>>::type_info().as_list().unwrap().capacity(), None);
    }
}
