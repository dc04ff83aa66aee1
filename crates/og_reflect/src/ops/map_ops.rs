use crate::impls::NonGenericTypeInfoCell;
use crate::info::{AnyInfo, ReflectKind, TypeInfo, TypePath, Typed};
use crate::ops::ReflectRef;
use crate::{FromReflect, Reflect};

// -----------------------------------------------------------------------------
// Map

/// A trait used to power map-like operations via reflection.
///
/// Implemented by `HashMap<K, V>` and `BTreeMap<K, V>`. Iteration order is
/// the one of the underlying map.
pub trait Map: Reflect {
    /// Returns the number of entries.
    fn len(&self) -> usize;

    /// Returns `true` if the map is empty.
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an iterator over the `(key, value)` entries.
    fn iter(&self) -> Box<dyn Iterator<Item = (&dyn Reflect, &dyn Reflect)> + '_>;

    /// Returns the value for a structurally equal key.
    fn get(&self, key: &dyn Reflect) -> Option<&dyn Reflect> {
        self.iter()
            .find(|(k, _)| k.reflect_partial_eq(key) == Some(true))
            .map(|(_, v)| v)
    }

    /// Creates a new [`DynamicMap`] from this map.
    fn to_dynamic_map(&self) -> DynamicMap {
        let mut dynamic = DynamicMap::with_capacity(self.len());
        dynamic.set_represented_type(self.represented_type_info());
        for (key, value) in self.iter() {
            dynamic.insert_boxed(key.to_dynamic(), value.to_dynamic());
        }
        dynamic
    }
}

// -----------------------------------------------------------------------------
// DynamicMap

/// A map whose entries are defined at runtime.
///
/// Entries keep insertion order. Keys are compared with
/// [`Reflect::reflect_partial_eq`], so lookups are linear.
#[derive(Default)]
pub struct DynamicMap {
    info: Option<&'static TypeInfo>,
    entries: Vec<(Box<dyn Reflect>, Box<dyn Reflect>)>,
}

impl DynamicMap {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            info: None,
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Sets the type to be represented by this `DynamicMap`.
    ///
    /// # Panics
    ///
    /// Panics if the given info is not a map.
    pub fn set_represented_type(&mut self, info: Option<&'static TypeInfo>) {
        if let Some(info) = info {
            assert!(
                info.kind() == ReflectKind::Map,
                "`DynamicMap` cannot represent `{}` of kind {}",
                info.type_path(),
                info.kind(),
            );
        }
        self.info = info;
    }

    /// Inserts an entry, replacing the value of a structurally equal key.
    pub fn insert_boxed(&mut self, key: Box<dyn Reflect>, value: Box<dyn Reflect>) {
        let existing = self
            .entries
            .iter()
            .position(|(k, _)| k.reflect_partial_eq(key.as_ref()) == Some(true));
        match existing {
            Some(index) => self.entries[index].1 = value,
            None => self.entries.push((key, value)),
        }
    }

    #[inline]
    pub fn insert<K: Reflect, V: Reflect>(&mut self, key: K, value: V) {
        self.insert_boxed(Box::new(key), Box::new(value));
    }
}

impl Map for DynamicMap {
    #[inline]
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (&dyn Reflect, &dyn Reflect)> + '_> {
        Box::new(self.entries.iter().map(|(k, v)| (&**k, &**v)))
    }
}

impl Reflect for DynamicMap {
    crate::reflection::impl_reflect_cast_fn!(Map);

    #[inline]
    fn is_dynamic(&self) -> bool {
        true
    }

    #[inline]
    fn represented_type_info(&self) -> Option<&'static TypeInfo> {
        self.info
    }

    #[inline]
    fn reflect_clone(&self) -> Box<dyn Reflect> {
        Box::new(self.to_dynamic_map())
    }
}

impl FromReflect for DynamicMap {
    fn from_reflect(reflect: &dyn Reflect) -> Option<Self> {
        match reflect.reflect_ref() {
            ReflectRef::Map(value) => Some(value.to_dynamic_map()),
            _ => None,
        }
    }
}

impl TypePath for DynamicMap {
    #[inline]
    fn type_path() -> &'static str {
        "og_reflect::ops::DynamicMap"
    }

    #[inline]
    fn type_name() -> &'static str {
        "DynamicMap"
    }
}

impl Typed for DynamicMap {
    fn type_info() -> &'static TypeInfo {
        static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
        CELL.get_or_init(|| TypeInfo::Any(AnyInfo::new::<Self>()))
    }
}

impl core::fmt::Debug for DynamicMap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.reflect_debug(f)
    }
}

crate::registry::impl_get_type_meta!(DynamicMap => TypeTraitFromReflect, TypeTraitDefault);

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{DynamicMap, Map};
    use crate::FromReflect;

    #[test]
    fn equal_keys_replace() {
        let mut map = DynamicMap::new();
        map.insert(String::from("a"), 1_u8);
        map.insert(String::from("b"), 2_u8);
        map.insert(String::from("a"), 3_u8);
        assert_eq!(map.len(), 2);

        let value = map.get(&String::from("a")).unwrap();
        assert_eq!(value.downcast_ref::<u8>(), Some(&3));

        let concrete = BTreeMap::<String, u8>::from_reflect(&map).unwrap();
        assert_eq!(concrete.get("a"), Some(&3));
        assert_eq!(concrete.get("b"), Some(&2));
    }
}
