use crate::impls::NonGenericTypeInfoCell;
use crate::info::{AnyInfo, ReflectKind, TypeInfo, TypePath, Typed};
use crate::ops::ReflectRef;
use crate::{FromReflect, Reflect};

// -----------------------------------------------------------------------------
// List

/// A trait used to power list-like operations via reflection.
///
/// Implemented by `Vec<T>`, `VecDeque<T>` and `[T; N]`.
pub trait List: Reflect {
    /// Returns a reference to the element at `index`.
    fn get(&self, index: usize) -> Option<&dyn Reflect>;

    /// Returns the number of elements in the list.
    fn len(&self) -> usize;

    /// Returns `true` if the list is empty.
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Creates a new [`DynamicList`] from this list.
    fn to_dynamic_list(&self) -> DynamicList {
        let mut dynamic = DynamicList::with_capacity(self.len());
        dynamic.set_represented_type(self.represented_type_info());
        for index in 0..self.len() {
            if let Some(value) = self.get(index) {
                dynamic.push_boxed(value.to_dynamic());
            }
        }
        dynamic
    }
}

impl dyn List {
    /// Returns an iterator over the elements, in order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Reflect> {
        (0..self.len()).filter_map(move |index| self.get(index))
    }
}

// -----------------------------------------------------------------------------
// DynamicList

/// A list whose elements are defined at runtime.
///
/// Without a represented type this is an untyped sequence.
#[derive(Default)]
pub struct DynamicList {
    info: Option<&'static TypeInfo>,
    items: Vec<Box<dyn Reflect>>,
}

impl DynamicList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            info: None,
            items: Vec::with_capacity(capacity),
        }
    }

    /// Sets the type to be represented by this `DynamicList`.
    ///
    /// # Panics
    ///
    /// Panics if the given info is not a list.
    pub fn set_represented_type(&mut self, info: Option<&'static TypeInfo>) {
        if let Some(info) = info {
            assert!(
                info.kind() == ReflectKind::List,
                "`DynamicList` cannot represent `{}` of kind {}",
                info.type_path(),
                info.kind(),
            );
        }
        self.info = info;
    }

    #[inline]
    pub fn push_boxed(&mut self, value: Box<dyn Reflect>) {
        self.items.push(value);
    }

    #[inline]
    pub fn push<T: Reflect>(&mut self, value: T) {
        self.items.push(Box::new(value));
    }

    /// Consumes the list, returning its elements.
    #[inline]
    pub fn into_items(self) -> Vec<Box<dyn Reflect>> {
        self.items
    }
}

impl List for DynamicList {
    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        self.items.get(index).map(|value| &**value)
    }

    #[inline]
    fn len(&self) -> usize {
        self.items.len()
    }
}

impl Reflect for DynamicList {
    crate::reflection::impl_reflect_cast_fn!(List);

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
        Box::new(self.to_dynamic_list())
    }
}

impl FromReflect for DynamicList {
    fn from_reflect(reflect: &dyn Reflect) -> Option<Self> {
        match reflect.reflect_ref() {
            ReflectRef::List(value) => Some(value.to_dynamic_list()),
            _ => None,
        }
    }
}

impl TypePath for DynamicList {
    #[inline]
    fn type_path() -> &'static str {
        "og_reflect::ops::DynamicList"
    }

    #[inline]
    fn type_name() -> &'static str {
        "DynamicList"
    }
}

impl Typed for DynamicList {
    fn type_info() -> &'static TypeInfo {
        static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
        CELL.get_or_init(|| TypeInfo::Any(AnyInfo::new::<Self>()))
    }
}

impl core::fmt::Debug for DynamicList {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.reflect_debug(f)
    }
}

crate::registry::impl_get_type_meta!(DynamicList => TypeTraitFromReflect, TypeTraitDefault);

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{DynamicList, List};
    use crate::FromReflect;

    #[test]
    fn dynamic_list_into_vec() {
        let mut list = DynamicList::new();
        list.push(1_i64);
        list.push(2_i64);
        assert_eq!(list.len(), 2);

        let items: Vec<i64> = Vec::from_reflect(&list).unwrap();
        assert_eq!(items, [1, 2]);

        let fixed: [i64; 2] = <[i64; 2]>::from_reflect(&list).unwrap();
        assert_eq!(fixed, [1, 2]);
        assert!(<[i64; 3]>::from_reflect(&list).is_none());
    }
}
