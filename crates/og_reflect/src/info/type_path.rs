use core::any::{Any, TypeId};
use core::fmt;

// -----------------------------------------------------------------------------
// TypePath

/// A static accessor to type paths and names.
///
/// - `type_path`: the fully qualified path, `my_crate::foo::Bar<u32>`.
/// - `type_name`: the short path, `Bar<u32>`.
///
/// The full path is what encoders write as a type tag and what the
/// [`TypeRegistry`] resolves by. The short name resolves too while
/// it stays unambiguous.
///
/// [`TypeRegistry`]: crate::registry::TypeRegistry
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `TypePath` so cannot provide static type path information",
    note = "consider annotating `{Self}` with `#[derive(Reflect)]`"
)]
pub trait TypePath: 'static {
    /// Returns the fully qualified path of the underlying type.
    fn type_path() -> &'static str;

    /// Returns a short, pretty-print enabled path to the type.
    fn type_name() -> &'static str;
}

// -----------------------------------------------------------------------------
// DynamicTypePath

/// Dynamic dispatch for [`TypePath`], automatically implemented.
pub trait DynamicTypePath {
    /// See [`TypePath::type_path`].
    fn reflect_type_path(&self) -> &'static str;

    /// See [`TypePath::type_name`].
    fn reflect_type_name(&self) -> &'static str;
}

impl<T: TypePath> DynamicTypePath for T {
    #[inline]
    fn reflect_type_path(&self) -> &'static str {
        Self::type_path()
    }

    #[inline]
    fn reflect_type_name(&self) -> &'static str {
        Self::type_name()
    }
}

// -----------------------------------------------------------------------------
// Type

/// The base representation of a Rust type: its [`TypeId`] and paths.
///
/// Two `Type`s compare by id only.
#[derive(Copy, Clone)]
pub struct Type {
    type_path: fn() -> &'static str,
    type_name: fn() -> &'static str,
    type_id: TypeId,
}

impl Type {
    /// Creates a new [`Type`] from a type that implements [`TypePath`].
    #[inline]
    pub const fn of<T: TypePath + ?Sized>() -> Self {
        Self {
            type_path: T::type_path,
            type_name: T::type_name,
            type_id: TypeId::of::<T>(),
        }
    }

    #[inline(always)]
    pub const fn id(&self) -> TypeId {
        self.type_id
    }

    #[inline(always)]
    pub fn is<T: Any>(&self) -> bool {
        TypeId::of::<T>() == self.type_id
    }

    #[inline]
    pub fn path(&self) -> &'static str {
        (self.type_path)()
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        (self.type_name)()
    }
}

impl PartialEq for Type {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for Type {}

impl core::hash::Hash for Type {
    #[inline]
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

// -----------------------------------------------------------------------------
// Auxiliary macro

macro_rules! impl_type_fn {
    ($field:ident) => {
        /// Returns the underlying `Type`.
        #[inline(always)]
        pub const fn ty(&self) -> &$crate::info::Type {
            &self.$field
        }

        /// Returns the `TypeId`.
        #[inline]
        pub const fn type_id(&self) -> ::core::any::TypeId {
            self.$field.id()
        }

        /// Check if the given type matches this one.
        #[inline]
        pub fn type_is<T: ::core::any::Any>(&self) -> bool {
            self.$field.is::<T>()
        }

        /// Returns the type path.
        #[inline]
        pub fn type_path(&self) -> &'static str {
            self.$field.path()
        }

        /// Returns the type name.
        #[inline]
        pub fn type_name(&self) -> &'static str {
            self.$field.name()
        }
    };
}

pub(crate) use impl_type_fn;

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{Type, TypePath};

    #[test]
    fn generic_paths() {
        assert_eq!(<Vec<u8>>::type_path(), "std::vec::Vec<u8>");
        assert_eq!(<Vec<u8>>::type_name(), "Vec<u8>");
        assert_eq!(<(i32, String)>::type_path(), "(i32, std::string::String)");
        assert_eq!(<Option<bool>>::type_name(), "Option<bool>");
    }

    #[test]
    fn type_eq_by_id() {
        let a = Type::of::<u32>();
        let b = Type::of::<u32>();
        assert_eq!(a, b);
        assert!(a.is::<u32>());
        assert_eq!(a.path(), "u32");
        assert_ne!(a, Type::of::<i32>());
    }
}
