use core::any::TypeId;

use crate::info::{Type, TypeInfo, TypePath, Typed, impl_type_fn};

/// A container for compile-time list info: `Vec<T>`, `VecDeque<T>`, `[T; N]`.
#[derive(Clone, Debug)]
pub struct ListInfo {
    ty: Type,
    item_ty_id: TypeId,
    item_info: fn() -> &'static TypeInfo,
    capacity: Option<usize>,
}

impl ListInfo {
    impl_type_fn!(ty);

    /// Create a new [`ListInfo`] of a growable list.
    #[inline]
    pub fn new<T: TypePath, Item: Typed>() -> Self {
        Self {
            ty: Type::of::<T>(),
            item_ty_id: TypeId::of::<Item>(),
            item_info: Item::type_info,
            capacity: None,
        }
    }

    /// Create a new [`ListInfo`] of a fixed-size array.
    #[inline]
    pub fn array<T: TypePath, Item: Typed>(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::new::<T, Item>()
        }
    }

    #[inline]
    pub fn item_ty_id(&self) -> TypeId {
        self.item_ty_id
    }

    #[inline]
    pub fn item_info(&self) -> &'static TypeInfo {
        (self.item_info)()
    }

    /// The fixed length, for arrays.
    #[inline]
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }
}
