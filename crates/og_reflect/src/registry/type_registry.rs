use core::any::TypeId;

use chrono::{DateTime, FixedOffset, Utc};
use og_utils::TypeIdMap;
use og_utils::hash::{HashMap, HashSet};

use crate::info::{TypeInfo, Typed};
use crate::ops::{DynamicList, DynamicMap, DynamicStruct};
use crate::registry::{FromType, GetTypeMeta, TypeMeta, TypeTrait};
use crate::{TypeHandle, Value};

// -----------------------------------------------------------------------------
// TypeRegistry

/// A registry of reflected types.
///
/// Types are indexed by [`TypeId`], by full type path and by short type
/// name. A short name shared by two registered types is ambiguous and no
/// longer resolves.
///
/// Registration is keyed by the id of the registered [`TypeInfo`], so
/// transparent wrappers such as `Arc<T>` register `T`.
///
/// ```
/// use og_reflect::registry::TypeRegistry;
///
/// let registry = TypeRegistry::new();
/// let meta = registry.get_with_type_path("std::string::String").unwrap();
/// assert_eq!(meta.type_name(), "String");
/// assert!(registry.get_with_type_name("String").is_some());
/// ```
pub struct TypeRegistry {
    type_meta_table: TypeIdMap<TypeMeta>,
    type_path_to_id: HashMap<&'static str, TypeId>,
    type_name_to_id: HashMap<&'static str, TypeId>,
    ambiguous_names: HashSet<&'static str>,
}

impl Default for TypeRegistry {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Creates a registry with no types.
    #[inline]
    pub fn empty() -> Self {
        Self {
            type_meta_table: TypeIdMap::new(),
            type_path_to_id: HashMap::default(),
            type_name_to_id: HashMap::default(),
            ambiguous_names: HashSet::default(),
        }
    }

    /// Creates a registry holding the scalar types, [`Value`],
    /// [`TypeHandle`] and the dynamic containers.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register::<()>();
        registry.register::<bool>();
        registry.register::<char>();
        registry.register::<u8>();
        registry.register::<u16>();
        registry.register::<u32>();
        registry.register::<u64>();
        registry.register::<usize>();
        registry.register::<i8>();
        registry.register::<i16>();
        registry.register::<i32>();
        registry.register::<i64>();
        registry.register::<isize>();
        registry.register::<f32>();
        registry.register::<f64>();
        registry.register::<String>();
        registry.register::<DateTime<FixedOffset>>();
        registry.register::<DateTime<Utc>>();
        registry.register::<Value>();
        registry.register::<TypeHandle>();
        registry.register::<DynamicStruct>();
        registry.register::<DynamicList>();
        registry.register::<DynamicMap>();
        registry
    }

    // The type must **not** already exist.
    fn add_new_type_indices(
        type_meta: &TypeMeta,
        type_path_to_id: &mut HashMap<&'static str, TypeId>,
        type_name_to_id: &mut HashMap<&'static str, TypeId>,
        ambiguous_names: &mut HashSet<&'static str>,
    ) {
        let ty = type_meta.ty();
        let type_name = ty.name();

        if !ambiguous_names.contains(type_name) {
            if type_name_to_id.contains_key(type_name) {
                type_name_to_id.remove(type_name);
                ambiguous_names.insert(type_name);
            } else {
                type_name_to_id.insert(type_name, ty.id());
            }
        }

        type_path_to_id.insert(ty.path(), ty.id());
    }

    // Returns `false` if the type was already registered.
    fn register_internal(
        &mut self,
        type_id: TypeId,
        get_type_meta: impl FnOnce() -> TypeMeta,
    ) -> bool {
        self.type_meta_table.try_insert(type_id, || {
            let meta = get_type_meta();
            Self::add_new_type_indices(
                &meta,
                &mut self.type_path_to_id,
                &mut self.type_name_to_id,
                &mut self.ambiguous_names,
            );
            log::debug!("registered type `{}`", meta.type_path());
            meta
        })
    }

    /// Registers `T` and, the first time, its dependencies.
    pub fn register<T: GetTypeMeta>(&mut self) {
        if self.register_internal(T::type_info().type_id(), T::get_type_meta) {
            T::register_dependencies(self);
        }
    }

    /// Inserts a type meta, replacing the existing one of the same type.
    pub fn insert_type_meta(&mut self, type_meta: TypeMeta) {
        if !self.type_meta_table.contains(&type_meta.type_id()) {
            Self::add_new_type_indices(
                &type_meta,
                &mut self.type_path_to_id,
                &mut self.type_name_to_id,
                &mut self.ambiguous_names,
            );
        }
        self.type_meta_table.insert(type_meta.type_id(), type_meta);
    }

    /// Adds a type trait to a registered type.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not registered.
    pub fn register_type_trait<T: Typed, D: TypeTrait + FromType<T>>(&mut self) {
        match self.type_meta_table.get_mut(&T::type_info().type_id()) {
            Some(type_meta) => type_meta.insert_trait(D::from_type()),
            None => panic!(
                "called `TypeRegistry::register_type_trait`, but the type `{}` of type trait `{}` is not registered",
                T::type_path(),
                core::any::type_name::<D>(),
            ),
        }
    }

    #[inline]
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.type_meta_table.contains(&type_id)
    }

    #[inline]
    pub fn get(&self, type_id: TypeId) -> Option<&TypeMeta> {
        self.type_meta_table.get(&type_id)
    }

    pub fn get_with_type_path(&self, type_path: &str) -> Option<&TypeMeta> {
        match self.type_path_to_id.get(type_path) {
            Some(id) => self.get(*id),
            None => None,
        }
    }

    /// Returns the type with the given short name, unless it is ambiguous.
    pub fn get_with_type_name(&self, type_name: &str) -> Option<&TypeMeta> {
        match self.type_name_to_id.get(type_name) {
            Some(id) => self.get(*id),
            None => None,
        }
    }

    #[inline]
    pub fn is_ambiguous(&self, type_name: &str) -> bool {
        self.ambiguous_names.contains(type_name)
    }

    pub fn get_type_trait<T: TypeTrait>(&self, type_id: TypeId) -> Option<&T> {
        match self.get(type_id) {
            Some(type_meta) => type_meta.get_trait::<T>(),
            None => None,
        }
    }

    #[inline]
    pub fn get_type_info(&self, type_id: TypeId) -> Option<&'static TypeInfo> {
        self.get(type_id).map(TypeMeta::type_info)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.type_meta_table.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.type_meta_table.is_empty()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &TypeMeta> {
        self.type_meta_table.values()
    }

    pub fn iter_with_trait<T: TypeTrait>(&self) -> impl Iterator<Item = (&TypeMeta, &T)> {
        self.type_meta_table
            .values()
            .filter_map(|item| item.get_trait::<T>().map(|t| (item, t)))
    }
}

impl core::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.type_path_to_id.keys()).finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::TypeRegistry;
    use crate::derive::Reflect;
    use crate::info::Typed;
    use crate::registry::{TypeTraitDefault, TypeTraitFromReflect};

    mod a {
        #[derive(crate::derive::Reflect)]
        pub struct Item(pub u8);
    }

    mod b {
        #[derive(crate::derive::Reflect)]
        pub struct Item(pub u8);
    }

    #[derive(Reflect, Default)]
    #[reflect(default)]
    struct Inventory {
        items: Vec<Arc<a::Item>>,
        tags: Option<String>,
    }

    #[test]
    fn dependencies_are_registered() {
        let mut registry = TypeRegistry::empty();
        registry.register::<Inventory>();

        assert!(registry.contains(<a::Item as Typed>::type_info().type_id()));
        assert!(registry.contains(<Vec<Arc<a::Item>>>::type_info().type_id()));
        assert!(registry.contains(<Option<String>>::type_info().type_id()));

        let meta = registry.get_with_type_name("Inventory").unwrap();
        assert!(meta.get_trait::<TypeTraitDefault>().is_some());
        assert!(meta.get_trait::<TypeTraitFromReflect>().is_some());
    }

    #[test]
    fn short_names_become_ambiguous() {
        let mut registry = TypeRegistry::new();
        registry.register::<a::Item>();
        assert!(registry.get_with_type_name("Item").is_some());

        registry.register::<b::Item>();
        assert!(registry.is_ambiguous("Item"));
        assert!(registry.get_with_type_name("Item").is_none());
        assert!(
            registry
                .get_with_type_path(<b::Item as crate::info::TypePath>::type_path())
                .is_some()
        );
    }
}
