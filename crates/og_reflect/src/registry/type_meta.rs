use core::any::TypeId;
use core::ops::{Deref, DerefMut};

use og_utils::TypeIdMap;

use crate::Reflect;
use crate::info::{CustomAttributes, Type, TypeInfo, Typed};
use crate::registry::{TypeRegistry, TypeTrait};

// -----------------------------------------------------------------------------
// TypeMeta

/// Runtime storage for a type: its [`TypeInfo`] and a [`TypeTrait`] table.
///
/// ```
/// use og_reflect::registry::{FromType, TypeMeta, TypeTraitDefault};
///
/// let mut meta = TypeMeta::of::<u8>();
/// meta.insert_trait::<TypeTraitDefault>(FromType::<u8>::from_type());
///
/// let default = meta.get_trait::<TypeTraitDefault>().unwrap().default();
/// assert_eq!(default.downcast_ref::<u8>(), Some(&0));
/// ```
pub struct TypeMeta {
    ty: Type,
    type_info: &'static TypeInfo,
    trait_table: TypeIdMap<Box<dyn TypeTrait>>,
}

impl TypeMeta {
    #[inline]
    pub fn of<T: Typed>() -> Self {
        Self::with_capacity::<T>(0)
    }

    #[inline]
    pub fn with_capacity<T: Typed>(capacity: usize) -> Self {
        let type_info = T::type_info();
        Self {
            ty: *type_info.ty(),
            type_info,
            trait_table: TypeIdMap::with_capacity(capacity),
        }
    }

    crate::info::impl_type_fn!(ty);

    #[inline(always)]
    pub const fn type_info(&self) -> &'static TypeInfo {
        self.type_info
    }

    #[inline]
    pub fn custom_attributes(&self) -> &'static CustomAttributes {
        self.type_info.custom_attributes()
    }

    pub fn get_attribute<T: Reflect>(&self) -> Option<&'static T> {
        self.custom_attributes().get::<T>()
    }

    /// Inserts a type trait, replacing any previous one of the same type.
    #[inline(always)]
    pub fn insert_trait<T: TypeTrait>(&mut self, data: T) {
        self.insert_trait_by_id(TypeId::of::<T>(), Box::new(data));
    }

    #[inline(never)]
    fn insert_trait_by_id(&mut self, id: TypeId, val: Box<dyn TypeTrait>) {
        self.trait_table.insert(id, val);
    }

    #[inline]
    pub fn get_trait<T: TypeTrait>(&self) -> Option<&T> {
        self.get_trait_by_id(TypeId::of::<T>())
            .and_then(<dyn TypeTrait>::downcast_ref)
    }

    pub fn get_trait_by_id(&self, type_id: TypeId) -> Option<&dyn TypeTrait> {
        self.trait_table.get(&type_id).map(Deref::deref)
    }

    #[inline]
    pub fn get_trait_mut<T: TypeTrait>(&mut self) -> Option<&mut T> {
        self.trait_table
            .get_mut(&TypeId::of::<T>())
            .map(DerefMut::deref_mut)
            .and_then(<dyn TypeTrait>::downcast_mut)
    }

    #[inline]
    pub fn has_trait<T: TypeTrait>(&self) -> bool {
        self.trait_table.contains(&TypeId::of::<T>())
    }

    #[inline]
    pub fn trait_len(&self) -> usize {
        self.trait_table.len()
    }
}

impl Clone for TypeMeta {
    fn clone(&self) -> Self {
        let mut trait_table = TypeIdMap::with_capacity(self.trait_len());
        for (id, type_trait) in self.trait_table.iter() {
            trait_table.insert(*id, (**type_trait).clone_type_trait());
        }

        Self {
            ty: self.ty,
            type_info: self.type_info,
            trait_table,
        }
    }
}

impl core::fmt::Debug for TypeMeta {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TypeMeta")
            .field("type_path", &self.type_path())
            .field("trait_len", &self.trait_len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// GetTypeMeta

/// A type that can produce its own [`TypeMeta`].
///
/// Implemented by the derive macro.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `GetTypeMeta` so cannot provide type registration information",
    note = "consider annotating `{Self}` with `#[derive(Reflect)]`"
)]
pub trait GetTypeMeta: Typed {
    fn get_type_meta() -> TypeMeta;

    /// Registers the types this type depends on, such as field types.
    fn register_dependencies(_registry: &mut TypeRegistry) {}
}
