use core::hash::{BuildHasher, Hash};
use std::collections::{BTreeMap, HashMap};

use crate::impls::{GenericTypeInfoCell, GenericTypePathCell, concat};
use crate::info::{MapInfo, TypeInfo, TypePath, Typed};
use crate::ops::{Map, ReflectRef};
use crate::registry::{FromType, GetTypeMeta, TypeMeta, TypeRegistry};
use crate::registry::{TypeTraitDefault, TypeTraitFromReflect};
use crate::{FromReflect, Reflect};

/// A function use for implementing [`FromReflect`] for maps.
fn collect_entries<K: FromReflect, V: FromReflect, C: FromIterator<(K, V)>>(
    reflect: &dyn Reflect,
) -> Option<C> {
    let ReflectRef::Map(map) = reflect.reflect_ref() else {
        return None;
    };
    map.iter()
        .map(|(k, v)| Some((K::from_reflect(k)?, V::from_reflect(v)?)))
        .collect()
}

macro_rules! impl_map_type_path {
    ($path:literal, $name:literal) => {
        fn type_path() -> &'static str {
            static CELL: GenericTypePathCell = GenericTypePathCell::new();
            CELL.get_or_insert::<Self>(|| {
                concat(&[$path, "<", K::type_path(), ", ", V::type_path(), ">"])
            })
        }

        fn type_name() -> &'static str {
            static CELL: GenericTypePathCell = GenericTypePathCell::new();
            CELL.get_or_insert::<Self>(|| {
                concat(&[$name, "<", K::type_name(), ", ", V::type_name(), ">"])
            })
        }
    };
}

// -----------------------------------------------------------------------------
// HashMap

impl<K: TypePath, V: TypePath, S: 'static> TypePath for HashMap<K, V, S> {
    impl_map_type_path!("std::collections::HashMap", "HashMap");
}

impl<K: Typed, V: Typed, S: 'static> Typed for HashMap<K, V, S> {
    fn type_info() -> &'static TypeInfo {
        static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
        CELL.get_or_insert::<Self>(|| TypeInfo::Map(MapInfo::new::<Self, K, V>()))
    }
}

impl<K, V, S> Map for HashMap<K, V, S>
where
    K: FromReflect + Eq + Hash,
    V: FromReflect,
    S: BuildHasher + Default + Send + Sync + 'static,
{
    #[inline]
    fn len(&self) -> usize {
        HashMap::len(self)
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (&dyn Reflect, &dyn Reflect)> + '_> {
        Box::new(HashMap::iter(self).map(|(k, v)| (k.as_reflect(), v.as_reflect())))
    }

    fn get(&self, key: &dyn Reflect) -> Option<&dyn Reflect> {
        let key = K::from_reflect(key)?;
        HashMap::get(self, &key).map(Reflect::as_reflect)
    }
}

impl<K, V, S> Reflect for HashMap<K, V, S>
where
    K: FromReflect + Eq + Hash,
    V: FromReflect,
    S: BuildHasher + Default + Send + Sync + 'static,
{
    crate::reflection::impl_reflect_cast_fn!(Map);

    fn reflect_clone(&self) -> Box<dyn Reflect> {
        match Self::from_reflect(self) {
            Some(value) => Box::new(value),
            None => self.to_dynamic(),
        }
    }
}

impl<K, V, S> FromReflect for HashMap<K, V, S>
where
    K: FromReflect + Eq + Hash,
    V: FromReflect,
    S: BuildHasher + Default + Send + Sync + 'static,
{
    fn from_reflect(reflect: &dyn Reflect) -> Option<Self> {
        collect_entries(reflect)
    }
}

impl<K, V, S> GetTypeMeta for HashMap<K, V, S>
where
    K: FromReflect + Eq + Hash + GetTypeMeta,
    V: FromReflect + GetTypeMeta,
    S: BuildHasher + Default + Send + Sync + 'static,
{
    fn get_type_meta() -> TypeMeta {
        let mut meta = TypeMeta::with_capacity::<Self>(2);
        meta.insert_trait::<TypeTraitFromReflect>(FromType::<Self>::from_type());
        meta.insert_trait::<TypeTraitDefault>(FromType::<Self>::from_type());
        meta
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<K>();
        registry.register::<V>();
    }
}

// -----------------------------------------------------------------------------
// BTreeMap

impl<K: TypePath, V: TypePath> TypePath for BTreeMap<K, V> {
    impl_map_type_path!("std::collections::BTreeMap", "BTreeMap");
}

impl<K: Typed, V: Typed> Typed for BTreeMap<K, V> {
    fn type_info() -> &'static TypeInfo {
        static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
        CELL.get_or_insert::<Self>(|| TypeInfo::Map(MapInfo::new::<Self, K, V>()))
    }
}

impl<K: FromReflect + Ord, V: FromReflect> Map for BTreeMap<K, V> {
    #[inline]
    fn len(&self) -> usize {
        BTreeMap::len(self)
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (&dyn Reflect, &dyn Reflect)> + '_> {
        Box::new(BTreeMap::iter(self).map(|(k, v)| (k.as_reflect(), v.as_reflect())))
    }

    fn get(&self, key: &dyn Reflect) -> Option<&dyn Reflect> {
        let key = K::from_reflect(key)?;
        BTreeMap::get(self, &key).map(Reflect::as_reflect)
    }
}

impl<K: FromReflect + Ord, V: FromReflect> Reflect for BTreeMap<K, V> {
    crate::reflection::impl_reflect_cast_fn!(Map);

    fn reflect_clone(&self) -> Box<dyn Reflect> {
        match Self::from_reflect(self) {
            Some(value) => Box::new(value),
            None => self.to_dynamic(),
        }
    }
}

impl<K: FromReflect + Ord, V: FromReflect> FromReflect for BTreeMap<K, V> {
    fn from_reflect(reflect: &dyn Reflect) -> Option<Self> {
        collect_entries(reflect)
    }
}

impl<K, V> GetTypeMeta for BTreeMap<K, V>
where
    K: FromReflect + Ord + GetTypeMeta,
    V: FromReflect + GetTypeMeta,
{
    fn get_type_meta() -> TypeMeta {
        let mut meta = TypeMeta::with_capacity::<Self>(2);
        meta.insert_trait::<TypeTraitFromReflect>(FromType::<Self>::from_type());
        meta.insert_trait::<TypeTraitDefault>(FromType::<Self>::from_type());
        meta
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<K>();
        registry.register::<V>();
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};

    use crate::info::TypePath;
    use crate::ops::Map;
    use crate::{FromReflect, Reflect};

    #[test]
    fn map_paths() {
        assert_eq!(
            <HashMap<String, u8>>::type_path(),
            "std::collections::HashMap<std::string::String, u8>"
        );
        assert_eq!(<BTreeMap<i32, bool>>::type_name(), "BTreeMap<i32, bool>");
    }

    #[test]
    fn maps_convert_into_each_other() {
        let mut source = HashMap::new();
        source.insert(String::from("x"), 1_i32);
        source.insert(String::from("y"), 2_i32);

        let sorted = BTreeMap::<String, i64>::from_reflect(&source).unwrap();
        let keys: Vec<_> = sorted.keys().map(String::as_str).collect();
        assert_eq!(keys, ["x", "y"]);

        let value = Map::get(&source, &String::from("y")).unwrap();
        assert_eq!(value.downcast_ref::<i32>(), Some(&2));
        assert_eq!(source.reflect_partial_eq(&sorted), Some(true));
    }
}
