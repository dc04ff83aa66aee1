use core::fmt;

use crate::Reflect;
use crate::info::{Type, TypePath, impl_type_fn};
use crate::ops::{FromScalar, ScalarError, ScalarValue};

// -----------------------------------------------------------------------------
// ScalarKind

/// The primitive category of a scalar type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    Char,
    String,
    DateTime,
    Type,
}

impl ScalarKind {
    /// Integers, signed or not.
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Self::I8
                | Self::I16
                | Self::I32
                | Self::I64
                | Self::Isize
                | Self::U8
                | Self::U16
                | Self::U32
                | Self::U64
                | Self::Usize
        )
    }

    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            Self::I8 | Self::I16 | Self::I32 | Self::I64 | Self::Isize | Self::F32 | Self::F64
        )
    }

    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    pub const fn is_numeric(self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// Width in bits, for numeric kinds.
    pub const fn bits(self) -> u32 {
        match self {
            Self::I8 | Self::U8 => 8,
            Self::I16 | Self::U16 => 16,
            Self::I32 | Self::U32 | Self::F32 => 32,
            Self::I64 | Self::U64 | Self::F64 | Self::Isize | Self::Usize => 64,
            _ => 0,
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// -----------------------------------------------------------------------------
// ScalarInfo

/// A container for compile-time scalar info.
///
/// Besides the kind, it knows how to build a value of the type from a
/// [`ScalarValue`], which is how decoders create concrete scalars.
#[derive(Clone, Debug)]
pub struct ScalarInfo {
    ty: Type,
    kind: ScalarKind,
    from_scalar: fn(ScalarValue) -> Result<Box<dyn Reflect>, ScalarError>,
}

impl ScalarInfo {
    impl_type_fn!(ty);

    /// Create a new [`ScalarInfo`].
    #[inline]
    pub fn new<T: FromScalar + Reflect + TypePath>(kind: ScalarKind) -> Self {
        Self {
            ty: Type::of::<T>(),
            kind,
            from_scalar: |value| T::from_scalar(value).map(Reflect::into_boxed_reflect),
        }
    }

    #[inline]
    pub const fn kind(&self) -> ScalarKind {
        self.kind
    }

    /// Converts a scalar value into a value of this type.
    #[inline]
    pub fn from_scalar(&self, value: ScalarValue) -> Result<Box<dyn Reflect>, ScalarError> {
        (self.from_scalar)(value)
    }
}
