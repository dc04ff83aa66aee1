use crate::Reflect;
use crate::info::ReflectKind;
use crate::ops::{Enum, List, Map, Optional, Scalar, Struct, Tuple};

/// An immutable enumeration of "kinds" of a reflected value.
///
/// Each variant contains a trait object with methods specific to a kind.
/// Obtained through [`Reflect::reflect_ref`].
#[derive(Clone, Copy)]
pub enum ReflectRef<'a> {
    Struct(&'a dyn Struct),
    Tuple(&'a dyn Tuple),
    List(&'a dyn List),
    Map(&'a dyn Map),
    Enum(&'a dyn Enum),
    Optional(&'a dyn Optional),
    Scalar(&'a dyn Scalar),
    Opaque(&'a dyn Reflect),
}

impl<'a> ReflectRef<'a> {
    /// Returns the kind of this value.
    pub fn kind(&self) -> ReflectKind {
        match self {
            Self::Struct(_) => ReflectKind::Struct,
            Self::Tuple(_) => ReflectKind::Tuple,
            Self::List(_) => ReflectKind::List,
            Self::Map(_) => ReflectKind::Map,
            Self::Enum(_) => ReflectKind::Enum,
            Self::Optional(_) => ReflectKind::Optional,
            Self::Scalar(_) => ReflectKind::Scalar,
            Self::Opaque(_) => ReflectKind::Opaque,
        }
    }

    /// Returns the viewed value as a whole.
    ///
    /// For `Arc<T>` and other transparent wrappers this is the pointee.
    pub fn as_reflect(&self) -> &'a dyn Reflect {
        match *self {
            Self::Struct(v) => v,
            Self::Tuple(v) => v,
            Self::List(v) => v,
            Self::Map(v) => v,
            Self::Enum(v) => v,
            Self::Optional(v) => v,
            Self::Scalar(v) => v,
            Self::Opaque(v) => v,
        }
    }
}
