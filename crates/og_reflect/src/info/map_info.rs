use crate::info::{Type, TypeInfo, TypePath, Typed, impl_type_fn};

/// A container for compile-time map info: `HashMap<K, V>`, `BTreeMap<K, V>`.
#[derive(Clone, Debug)]
pub struct MapInfo {
    ty: Type,
    key_info: fn() -> &'static TypeInfo,
    value_info: fn() -> &'static TypeInfo,
}

impl MapInfo {
    impl_type_fn!(ty);

    /// Create a new [`MapInfo`].
    #[inline]
    pub fn new<T: TypePath, K: Typed, V: Typed>() -> Self {
        Self {
            ty: Type::of::<T>(),
            key_info: K::type_info,
            value_info: V::type_info,
        }
    }

    #[inline]
    pub fn key_info(&self) -> &'static TypeInfo {
        (self.key_info)()
    }

    #[inline]
    pub fn value_info(&self) -> &'static TypeInfo {
        (self.value_info)()
    }
}
