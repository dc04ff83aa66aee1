use core::any::{Any, TypeId};
use core::fmt;

use crate::impls::NonGenericTypeInfoCell;
use crate::info::{DynamicTypePath, DynamicTyped, TypePath, Typed};
use crate::info::{OpaqueInfo, ReflectKind, TypeInfo};
use crate::ops::ReflectRef;

// -----------------------------------------------------------------------------
// Reflect

/// The foundational trait for runtime reflection.
///
/// A `Reflect` value can be inspected through [`reflect_ref`], which exposes
/// one of the shape traits ([`Struct`], [`Tuple`], [`List`], [`Map`], [`Enum`],
/// [`Optional`], [`Scalar`]) or marks the value as opaque. Encoders walk values
/// through this view alone, so no schema registration is needed.
///
/// Use [the derive macro] rather than implementing it by hand.
///
/// ## Type Identification
///
/// [`Any::type_id`] on `Box<dyn Reflect>` returns the id of the box.
/// Use [`Reflect::ty_id`] instead:
///
/// ```rust
/// # use og_reflect::Reflect;
/// # use core::any::{Any, TypeId};
/// let x: Box<dyn Reflect> = Box::new(32_i32).into_reflect();
///
/// assert!(x.type_id() != TypeId::of::<i32>());
/// assert!(x.ty_id() == TypeId::of::<i32>());
/// ```
///
/// ## Dynamic Types
///
/// Dynamic values ([`DynamicStruct`], [`DynamicList`], ...) have the `Any` type
/// info of their own. [`represented_type_info`] returns the type they stand for.
///
/// ## Smart pointers
///
/// `Arc<T>` and `Box<T>` are transparent: their [`reflect_ref`] is the one of
/// the pointee, and their type info is `T`'s. Two `Arc`s to the same value
/// therefore expose the same address, which is what cycle detection keys on.
///
/// [`reflect_ref`]: Reflect::reflect_ref
/// [`represented_type_info`]: Reflect::represented_type_info
/// [the derive macro]: crate::derive::Reflect
/// [`Struct`]: crate::ops::Struct
/// [`Tuple`]: crate::ops::Tuple
/// [`List`]: crate::ops::List
/// [`Map`]: crate::ops::Map
/// [`Enum`]: crate::ops::Enum
/// [`Optional`]: crate::ops::Optional
/// [`Scalar`]: crate::ops::Scalar
/// [`DynamicStruct`]: crate::ops::DynamicStruct
/// [`DynamicList`]: crate::ops::DynamicList
pub trait Reflect: DynamicTypePath + DynamicTyped + Send + Sync + Any {
    /// Casts this type to a fully-reflected value.
    #[inline(always)]
    fn as_reflect(&self) -> &dyn Reflect
    where
        Self: Sized,
    {
        self
    }

    /// Casts this type to a boxed, fully-reflected value.
    #[inline(always)]
    fn into_reflect(self: Box<Self>) -> Box<dyn Reflect>
    where
        Self: Sized,
    {
        self
    }

    /// Boxes this value as a fully-reflected value.
    #[inline(always)]
    fn into_boxed_reflect(self) -> Box<dyn Reflect>
    where
        Self: Sized,
    {
        Box::new(self)
    }

    /// Returns the [`TypeId`] of the underlying type.
    #[inline]
    fn ty_id(&self) -> TypeId {
        TypeId::of::<Self>()
    }

    /// Indicates whether or not this type is a _dynamic_ data type.
    #[inline]
    fn is_dynamic(&self) -> bool {
        false
    }

    /// Returns the [`TypeInfo`] of the type **represented** by this value.
    ///
    /// Equal to [`reflect_type_info`](DynamicTyped::reflect_type_info) for
    /// concrete types. Dynamic types return the type they stand for, or
    /// `None` if they are free-form.
    #[inline]
    fn represented_type_info(&self) -> Option<&'static TypeInfo> {
        Some(self.reflect_type_info())
    }

    /// Returns the shape kind of this value.
    #[inline]
    fn reflect_kind(&self) -> ReflectKind {
        self.reflect_ref().kind()
    }

    /// Returns an immutable shape view of this value.
    fn reflect_ref(&self) -> ReflectRef<'_>;

    /// Clones the value.
    ///
    /// Scalars and `#[reflect(clone)]` types produce a concrete copy.
    /// Other composite types produce a concrete copy when `FromReflect`
    /// can rebuild them, and their dynamic representation otherwise.
    fn reflect_clone(&self) -> Box<dyn Reflect>;

    /// Converts the value to its dynamic representation.
    ///
    /// Scalars and opaque values are cloned as they are.
    fn to_dynamic(&self) -> Box<dyn Reflect> {
        match self.reflect_ref() {
            ReflectRef::Struct(val) => Box::new(val.to_dynamic_struct()),
            ReflectRef::Tuple(val) => Box::new(val.to_dynamic_tuple()),
            ReflectRef::List(val) => Box::new(val.to_dynamic_list()),
            ReflectRef::Map(val) => Box::new(val.to_dynamic_map()),
            ReflectRef::Enum(val) => Box::new(val.to_dynamic_enum()),
            ReflectRef::Optional(val) => Box::new(val.to_dynamic_optional()),
            ReflectRef::Scalar(val) => val.reflect_clone(),
            ReflectRef::Opaque(val) => val.reflect_clone(),
        }
    }

    /// Structural equality.
    ///
    /// Returns `None` when the values cannot be compared (opaque values).
    #[inline]
    fn reflect_partial_eq(&self, other: &dyn Reflect) -> Option<bool> {
        crate::impls::reflect_partial_eq(self.reflect_ref(), other.reflect_ref())
    }

    /// Debug formatter for the value.
    fn reflect_debug(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let type_name = self
            .represented_type_info()
            .map_or(self.reflect_type_name(), TypeInfo::type_name);
        crate::impls::reflect_debug(self.reflect_ref(), type_name, f)
    }
}

impl dyn Reflect {
    /// Returns `true` if the underlying value is of type `T`.
    #[inline(always)]
    pub fn is<T: Any>(&self) -> bool {
        self.ty_id() == TypeId::of::<T>()
    }

    /// Returns `true` if the underlying value represents a value of type `T`.
    #[inline]
    pub fn represents<T: Typed>(&self) -> bool {
        match self.represented_type_info() {
            Some(t) => t.type_id() == T::type_info().type_id(),
            None => false,
        }
    }

    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        <dyn Any>::downcast_ref(self)
    }

    #[inline]
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        <dyn Any>::downcast_mut(self)
    }

    /// Downcasts the value to type `T`, unboxing and consuming the trait object.
    ///
    /// If the underlying value is not of type `T`, returns `Err(self)`.
    pub fn downcast<T: Any>(self: Box<dyn Reflect>) -> Result<Box<T>, Box<dyn Reflect>> {
        if self.is::<T>() {
            let any: Box<dyn Any> = self;
            Ok(any
                .downcast::<T>()
                .unwrap_or_else(|_| unreachable!("type is already checked")))
        } else {
            Err(self)
        }
    }

    /// Downcasts the value to type `T`, unboxing and consuming the trait object.
    #[inline]
    pub fn take<T: Any>(self: Box<dyn Reflect>) -> Result<T, Box<dyn Reflect>> {
        self.downcast::<T>().map(|value| *value)
    }
}

impl fmt::Debug for dyn Reflect {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.reflect_debug(f)
    }
}

impl TypePath for dyn Reflect {
    #[inline]
    fn type_path() -> &'static str {
        "dyn og_reflect::Reflect"
    }

    #[inline]
    fn type_name() -> &'static str {
        "dyn Reflect"
    }
}

impl Typed for dyn Reflect {
    fn type_info() -> &'static TypeInfo {
        static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
        CELL.get_or_init(|| TypeInfo::Opaque(OpaqueInfo::new::<Self>()))
    }
}

// -----------------------------------------------------------------------------
// Auxiliary macro

macro_rules! impl_reflect_cast_fn {
    ($kind:ident) => {
        #[inline]
        fn reflect_kind(&self) -> $crate::info::ReflectKind {
            $crate::info::ReflectKind::$kind
        }

        #[inline]
        fn reflect_ref(&self) -> $crate::ops::ReflectRef<'_> {
            $crate::ops::ReflectRef::$kind(self)
        }
    };
}

pub(crate) use impl_reflect_cast_fn;

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::Reflect;
    use crate::info::ReflectKind;
    use core::any::TypeId;

    #[test]
    fn downcast_and_take() {
        let boxed: Box<dyn Reflect> = Box::new(7_u16);
        assert!(boxed.is::<u16>());
        assert_eq!(boxed.ty_id(), TypeId::of::<u16>());
        assert_eq!(boxed.reflect_kind(), ReflectKind::Scalar);

        let boxed = boxed.downcast::<i32>().unwrap_err();
        assert_eq!(boxed.take::<u16>().unwrap(), 7);
    }

    #[test]
    fn clone_and_compare() {
        let a = vec![1_i32, 2, 3];
        let b = a.reflect_clone();
        assert_eq!(a.reflect_partial_eq(&*b), Some(true));
        assert_eq!(a.reflect_partial_eq(&vec![1_i32, 2]), Some(false));
        assert_eq!(format!("{:?}", b), "[1, 2, 3]");
    }
}
