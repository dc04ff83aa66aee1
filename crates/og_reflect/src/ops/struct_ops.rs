use std::borrow::Cow;

use og_utils::hash::HashMap;

use crate::impls::NonGenericTypeInfoCell;
use crate::info::{AnyInfo, ReflectKind, TypeInfo, TypePath, Typed};
use crate::ops::ReflectRef;
use crate::{FromReflect, Reflect};

// -----------------------------------------------------------------------------
// Struct

/// A trait used to power struct-like operations via reflection.
///
/// Fields are ordered; the order is declaration order for derived types
/// and insertion order for [`DynamicStruct`].
pub trait Struct: Reflect {
    /// Returns a reference to the value of the field named `name`.
    fn field(&self, name: &str) -> Option<&dyn Reflect>;

    /// Returns a reference to the value of the field with index `index`.
    fn field_at(&self, index: usize) -> Option<&dyn Reflect>;

    /// Returns the name of the field with index `index`.
    fn name_at(&self, index: usize) -> Option<&str>;

    /// Returns the number of fields in the struct.
    fn field_len(&self) -> usize;

    /// Creates a new [`DynamicStruct`] from this struct.
    fn to_dynamic_struct(&self) -> DynamicStruct {
        let mut dynamic = DynamicStruct::with_capacity(self.field_len());
        dynamic.set_represented_type(self.represented_type_info());
        for index in 0..self.field_len() {
            if let (Some(name), Some(value)) = (self.name_at(index), self.field_at(index)) {
                dynamic.insert_boxed(name.to_owned(), value.to_dynamic());
            }
        }
        dynamic
    }
}

impl dyn Struct {
    /// Returns an iterator over `(name, value)` pairs, in field order.
    pub fn iter_fields(&self) -> impl Iterator<Item = (&str, &dyn Reflect)> {
        (0..self.field_len())
            .filter_map(move |index| Some((self.name_at(index)?, self.field_at(index)?)))
    }
}

// -----------------------------------------------------------------------------
// DynamicStruct

/// A struct whose fields are defined at runtime.
///
/// Without a represented type this is a free-form record: an ordered,
/// string-keyed map. Decoders produce records for objects whose target
/// type is unknown.
///
/// ```
/// use og_reflect::ops::{DynamicStruct, Struct};
///
/// let mut record = DynamicStruct::new();
/// record.insert("name", String::from("Ada"));
/// record.insert("age", 36_u32);
/// record.insert("name", String::from("Grace"));
///
/// assert_eq!(record.field_len(), 2);
/// assert_eq!(record.name_at(0), Some("name"));
/// assert_eq!(record.get::<String>("name").map(String::as_str), Some("Grace"));
/// ```
#[derive(Default)]
pub struct DynamicStruct {
    info: Option<&'static TypeInfo>,
    names: Vec<Cow<'static, str>>,
    fields: Vec<Box<dyn Reflect>>,
    indices: HashMap<Cow<'static, str>, usize>,
}

impl DynamicStruct {
    /// Creates an empty record.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            info: None,
            names: Vec::with_capacity(capacity),
            fields: Vec::with_capacity(capacity),
            indices: HashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Sets the type to be represented by this `DynamicStruct`.
    ///
    /// # Panics
    ///
    /// Panics if the given info is not a struct.
    pub fn set_represented_type(&mut self, info: Option<&'static TypeInfo>) {
        if let Some(info) = info {
            assert!(
                info.kind() == ReflectKind::Struct,
                "`DynamicStruct` cannot represent `{}` of kind {}",
                info.type_path(),
                info.kind(),
            );
        }
        self.info = info;
    }

    /// Inserts a field, replacing the value of an existing field of the same name.
    ///
    /// A replaced field keeps its position.
    pub fn insert_boxed(&mut self, name: impl Into<Cow<'static, str>>, value: Box<dyn Reflect>) {
        let name = name.into();
        match self.indices.get(&name) {
            Some(&index) => self.fields[index] = value,
            None => {
                self.indices.insert(name.clone(), self.fields.len());
                self.names.push(name);
                self.fields.push(value);
            }
        }
    }

    /// Inserts a field, see [`DynamicStruct::insert_boxed`].
    #[inline]
    pub fn insert<T: Reflect>(&mut self, name: impl Into<Cow<'static, str>>, value: T) {
        self.insert_boxed(name, Box::new(value));
    }

    /// Returns the field named `name` downcast to `T`.
    pub fn get<T: Reflect>(&self, name: &str) -> Option<&T> {
        self.field(name)?.downcast_ref::<T>()
    }

    /// Returns `true` if a field named `name` exists.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.indices.contains_key(name)
    }

    /// Returns an iterator over `(name, value)` pairs, in insertion order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &dyn Reflect)> {
        self.names
            .iter()
            .zip(self.fields.iter())
            .map(|(name, value)| (name.as_ref(), &**value))
    }

    fn clone_dynamic(&self) -> Self {
        Self {
            info: self.info,
            names: self.names.clone(),
            fields: self.fields.iter().map(|value| value.to_dynamic()).collect(),
            indices: self.indices.clone(),
        }
    }
}

impl Struct for DynamicStruct {
    fn field(&self, name: &str) -> Option<&dyn Reflect> {
        let index = *self.indices.get(name)?;
        self.fields.get(index).map(|value| &**value)
    }

    fn field_at(&self, index: usize) -> Option<&dyn Reflect> {
        self.fields.get(index).map(|value| &**value)
    }

    fn name_at(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(|name| name.as_ref())
    }

    #[inline]
    fn field_len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    fn to_dynamic_struct(&self) -> DynamicStruct {
        self.clone_dynamic()
    }
}

impl Reflect for DynamicStruct {
    crate::reflection::impl_reflect_cast_fn!(Struct);

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
        Box::new(self.clone_dynamic())
    }
}

impl FromReflect for DynamicStruct {
    fn from_reflect(reflect: &dyn Reflect) -> Option<Self> {
        match reflect.reflect_ref() {
            ReflectRef::Struct(value) => Some(value.to_dynamic_struct()),
            _ => None,
        }
    }
}

impl TypePath for DynamicStruct {
    #[inline]
    fn type_path() -> &'static str {
        "og_reflect::ops::DynamicStruct"
    }

    #[inline]
    fn type_name() -> &'static str {
        "DynamicStruct"
    }
}

impl Typed for DynamicStruct {
    fn type_info() -> &'static TypeInfo {
        static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
        CELL.get_or_init(|| TypeInfo::Any(AnyInfo::new::<Self>()))
    }
}

impl core::fmt::Debug for DynamicStruct {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.reflect_debug(f)
    }
}

crate::registry::impl_get_type_meta!(DynamicStruct => TypeTraitFromReflect, TypeTraitDefault);

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::DynamicStruct;
    use crate::ops::{ReflectRef, Struct};
    use crate::{Reflect, derive::Reflect};

    #[derive(Reflect, Debug, PartialEq)]
    struct Player {
        name: String,
        level: u8,
    }

    #[test]
    fn record_keeps_insertion_order() {
        let mut record = DynamicStruct::new();
        record.insert("b", 1_i32);
        record.insert("a", 2_i32);
        record.insert("b", 3_i32);

        let names: Vec<_> = record.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["b", "a"]);
        assert_eq!(record.get::<i32>("b"), Some(&3));
        assert!(record.represented_type_info().is_none());
        assert!(record.is_dynamic());
    }

    #[test]
    fn concrete_to_dynamic_and_back() {
        let player = Player {
            name: "Zed".into(),
            level: 4,
        };
        let dynamic = player.to_dynamic_struct();
        assert!(dynamic.represented_type_info().unwrap().type_is::<Player>());
        assert_eq!(dynamic.name_at(1), Some("level"));

        let back = <Player as crate::FromReflect>::from_reflect(&dynamic).unwrap();
        assert_eq!(back, player);

        let ReflectRef::Struct(view) = player.reflect_ref() else {
            panic!("expected a struct");
        };
        let pairs: Vec<_> = view.iter_fields().map(|(name, _)| name).collect();
        assert_eq!(pairs, ["name", "level"]);
    }

    #[test]
    #[should_panic]
    fn represented_type_must_be_a_struct() {
        let mut record = DynamicStruct::new();
        record.set_represented_type(Some(<u8 as crate::info::Typed>::type_info()));
    }
}
