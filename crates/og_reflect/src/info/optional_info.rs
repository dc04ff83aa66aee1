use crate::info::{Type, TypeInfo, TypePath, Typed, impl_type_fn};

/// A container for compile-time info of a value that may be absent.
///
/// `Option<T>` is optional; `OnceLock<T>` is optional and *deferred*: an empty
/// lock is a value that has not been realized yet rather than an explicit null.
#[derive(Clone, Debug)]
pub struct OptionalInfo {
    ty: Type,
    inner_info: fn() -> &'static TypeInfo,
    deferred: bool,
}

impl OptionalInfo {
    impl_type_fn!(ty);

    /// Create a new [`OptionalInfo`].
    #[inline]
    pub fn new<T: TypePath, Inner: Typed>() -> Self {
        Self {
            ty: Type::of::<T>(),
            inner_info: Inner::type_info,
            deferred: false,
        }
    }

    /// Create a new deferred [`OptionalInfo`].
    #[inline]
    pub fn deferred<T: TypePath, Inner: Typed>() -> Self {
        Self {
            deferred: true,
            ..Self::new::<T, Inner>()
        }
    }

    #[inline]
    pub fn inner_info(&self) -> &'static TypeInfo {
        (self.inner_info)()
    }

    #[inline]
    pub fn is_deferred(&self) -> bool {
        self.deferred
    }
}
