//! Containers for static storage of type information.
//!
//! - [`NonGenericTypeInfoCell`]: one [`TypeInfo`] behind a [`OnceLock`].
//! - [`GenericTypeInfoCell`] and [`GenericTypePathCell`]: a `static CELL`
//!   inside a generic function is shared by every instantiation, so these
//!   key their content by [`TypeId`] behind a [`RwLock`].

use core::any::{Any, TypeId};
use std::sync::{OnceLock, PoisonError, RwLock};

use og_utils::TypeIdMap;

use crate::info::TypeInfo;

mod sealed {
    use super::TypeInfo;

    pub trait TypedProperty: Send + Sync + 'static {}

    impl TypedProperty for String {}
    impl TypedProperty for TypeInfo {}
}

use sealed::TypedProperty;

// -----------------------------------------------------------------------------
// NonGenericTypeCell

/// Container for static storage of non-generic type information.
pub struct NonGenericTypeCell<T: TypedProperty>(OnceLock<T>);

/// Storage of a non-generic [`TypeInfo`].
///
/// ```
/// use og_reflect::impls::NonGenericTypeInfoCell;
/// use og_reflect::info::{NamedField, StructInfo, TypeInfo, TypePath, Typed};
///
/// struct Pair {
///     a: u32,
/// }
///
/// impl TypePath for Pair {
///     fn type_path() -> &'static str {
///         "demo::Pair"
///     }
///     fn type_name() -> &'static str {
///         "Pair"
///     }
/// }
///
/// impl Typed for Pair {
///     fn type_info() -> &'static TypeInfo {
///         static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
///         CELL.get_or_init(|| {
///             TypeInfo::Struct(StructInfo::new::<Self>(&[NamedField::new::<u32>("a")]))
///         })
///     }
/// }
///
/// let info = Pair::type_info().as_struct().unwrap();
/// assert_eq!(info.field("a").unwrap().type_info().type_path(), "u32");
/// ```
pub type NonGenericTypeInfoCell = NonGenericTypeCell<TypeInfo>;

impl<T: TypedProperty> NonGenericTypeCell<T> {
    #[inline]
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    /// Returns the stored value, initializing it with `f` on first access.
    #[inline]
    pub fn get_or_init<F>(&self, f: F) -> &T
    where
        F: FnOnce() -> T,
    {
        self.0.get_or_init(f)
    }
}

impl<T: TypedProperty> Default for NonGenericTypeCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

// -----------------------------------------------------------------------------
// GenericTypeCell

/// Container for static storage of type information with generics.
pub struct GenericTypeCell<T: TypedProperty>(RwLock<TypeIdMap<&'static T>>);

/// Storage of the [`TypeInfo`] of every instantiation of a generic type.
pub type GenericTypeInfoCell = GenericTypeCell<TypeInfo>;

/// Storage of the type paths of every instantiation of a generic type.
///
/// ```
/// use og_reflect::impls::{self, GenericTypePathCell};
/// use og_reflect::info::TypePath;
///
/// struct Wrapper<T>(T);
///
/// impl<T: TypePath> TypePath for Wrapper<T> {
///     fn type_path() -> &'static str {
///         static CELL: GenericTypePathCell = GenericTypePathCell::new();
///         CELL.get_or_insert::<Self>(|| impls::concat(&["demo::Wrapper<", T::type_path(), ">"]))
///     }
///     fn type_name() -> &'static str {
///         static CELL: GenericTypePathCell = GenericTypePathCell::new();
///         CELL.get_or_insert::<Self>(|| impls::concat(&["Wrapper<", T::type_name(), ">"]))
///     }
/// }
///
/// assert_eq!(<Wrapper<String>>::type_path(), "demo::Wrapper<std::string::String>");
/// assert_eq!(<Wrapper<u8>>::type_name(), "Wrapper<u8>");
/// ```
pub type GenericTypePathCell = GenericTypeCell<String>;

impl<T: TypedProperty> GenericTypeCell<T> {
    #[inline]
    pub const fn new() -> Self {
        Self(RwLock::new(TypeIdMap::new()))
    }

    /// Returns the value stored for `G`, generating it with `f` if absent.
    #[inline(always)]
    pub fn get_or_insert<G: Any + ?Sized>(&self, f: impl FnOnce() -> T) -> &T {
        self.get_or_insert_by_type_id(TypeId::of::<G>(), f)
    }

    // Separate to reduce code compilation times
    #[inline(never)]
    fn get_or_insert_by_type_id(&self, type_id: TypeId, f: impl FnOnce() -> T) -> &T {
        match self.get_by_type_id(type_id) {
            Some(info) => info,
            None => self.insert_by_type_id(type_id, f()),
        }
    }

    #[inline(never)]
    fn get_by_type_id(&self, type_id: TypeId) -> Option<&T> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
            .copied()
    }

    #[inline(never)]
    fn insert_by_type_id(&self, type_id: TypeId, value: T) -> &T {
        let leaked: &'static T = *self
            .0
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_or_insert(type_id, || Box::leak(Box::new(value)));
        leaked
    }
}

impl<T: TypedProperty> Default for GenericTypeCell<T> {
    fn default() -> Self {
        Self::new()
    }
}
