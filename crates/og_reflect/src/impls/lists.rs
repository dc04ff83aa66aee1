use std::collections::VecDeque;

use crate::impls::{GenericTypeInfoCell, GenericTypePathCell, concat};
use crate::info::{ListInfo, TypeInfo, TypePath, Typed};
use crate::ops::{List, ReflectRef};
use crate::registry::{FromType, GetTypeMeta, TypeMeta, TypeRegistry};
use crate::registry::{TypeTraitDefault, TypeTraitFromReflect};
use crate::{FromReflect, Reflect};

macro_rules! impl_growable_list {
    ($ty:ident, $path:literal, $name:literal) => {
        impl<T: TypePath> TypePath for $ty<T> {
            fn type_path() -> &'static str {
                static CELL: GenericTypePathCell = GenericTypePathCell::new();
                CELL.get_or_insert::<Self>(|| concat(&[$path, "<", T::type_path(), ">"]))
            }

            fn type_name() -> &'static str {
                static CELL: GenericTypePathCell = GenericTypePathCell::new();
                CELL.get_or_insert::<Self>(|| concat(&[$name, "<", T::type_name(), ">"]))
            }
        }

        impl<T: Typed> Typed for $ty<T> {
            fn type_info() -> &'static TypeInfo {
                static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
                CELL.get_or_insert::<Self>(|| TypeInfo::List(ListInfo::new::<Self, T>()))
            }
        }

        impl<T: FromReflect> List for $ty<T> {
            #[inline]
            fn get(&self, index: usize) -> Option<&dyn Reflect> {
                if index < <$ty<T>>::len(self) {
                    Some(self[index].as_reflect())
                } else {
                    None
                }
            }

            #[inline]
            fn len(&self) -> usize {
                <$ty<T>>::len(self)
            }
        }

        impl<T: FromReflect> Reflect for $ty<T> {
            crate::reflection::impl_reflect_cast_fn!(List);

            fn reflect_clone(&self) -> Box<dyn Reflect> {
                match Self::from_reflect(self) {
                    Some(value) => Box::new(value),
                    None => self.to_dynamic(),
                }
            }
        }

        impl<T: FromReflect> FromReflect for $ty<T> {
            fn from_reflect(reflect: &dyn Reflect) -> Option<Self> {
                match reflect.reflect_ref() {
                    ReflectRef::List(list) => list.iter().map(T::from_reflect).collect(),
                    _ => None,
                }
            }
        }

        impl<T: FromReflect + GetTypeMeta> GetTypeMeta for $ty<T> {
            fn get_type_meta() -> TypeMeta {
                let mut meta = TypeMeta::with_capacity::<Self>(2);
                meta.insert_trait::<TypeTraitFromReflect>(FromType::<Self>::from_type());
                meta.insert_trait::<TypeTraitDefault>(FromType::<Self>::from_type());
                meta
            }

            fn register_dependencies(registry: &mut TypeRegistry) {
                registry.register::<T>();
            }
        }
    };
}

impl_growable_list!(Vec, "std::vec::Vec", "Vec");
impl_growable_list!(VecDeque, "std::collections::VecDeque", "VecDeque");

// -----------------------------------------------------------------------------
// Arrays

impl<T: TypePath, const N: usize> TypePath for [T; N] {
    fn type_path() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| concat(&["[", T::type_path(), "; ", &N.to_string(), "]"]))
    }

    fn type_name() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| concat(&["[", T::type_name(), "; ", &N.to_string(), "]"]))
    }
}

impl<T: Typed, const N: usize> Typed for [T; N] {
    fn type_info() -> &'static TypeInfo {
        static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
        CELL.get_or_insert::<Self>(|| TypeInfo::List(ListInfo::array::<Self, T>(N)))
    }
}

impl<T: FromReflect, const N: usize> List for [T; N] {
    #[inline]
    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        self.as_slice().get(index).map(Reflect::as_reflect)
    }

    #[inline]
    fn len(&self) -> usize {
        N
    }
}

impl<T: FromReflect, const N: usize> Reflect for [T; N] {
    crate::reflection::impl_reflect_cast_fn!(List);

    fn reflect_clone(&self) -> Box<dyn Reflect> {
        match Self::from_reflect(self) {
            Some(value) => Box::new(value),
            None => self.to_dynamic(),
        }
    }
}

impl<T: FromReflect, const N: usize> FromReflect for [T; N] {
    /// Reads the items into a growable list first; the length must be `N`.
    fn from_reflect(reflect: &dyn Reflect) -> Option<Self> {
        let items: Vec<T> = Vec::from_reflect(reflect)?;
        items.try_into().ok()
    }
}

impl<T: FromReflect + GetTypeMeta, const N: usize> GetTypeMeta for [T; N] {
    fn get_type_meta() -> TypeMeta {
        let mut meta = TypeMeta::with_capacity::<Self>(1);
        meta.insert_trait::<TypeTraitFromReflect>(FromType::<Self>::from_type());
        meta
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<T>();
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use crate::info::TypePath;
    use crate::ops::{DynamicList, List};
    use crate::{FromReflect, Reflect};

    #[test]
    fn list_paths() {
        assert_eq!(<VecDeque<u8>>::type_path(), "std::collections::VecDeque<u8>");
        assert_eq!(<[bool; 4]>::type_name(), "[bool; 4]");
    }

    #[test]
    fn list_views_and_rebuild() {
        let queue: VecDeque<u32> = [4, 5, 6].into();
        assert_eq!(List::len(&queue), 3);
        assert_eq!(List::get(&queue, 2).unwrap().downcast_ref::<u32>(), Some(&6));

        let mut dynamic = DynamicList::new();
        dynamic.push(4_i64);
        dynamic.push(5_i64);
        dynamic.push(6_i64);
        assert_eq!(<VecDeque<u32>>::from_reflect(&dynamic), Some(queue.clone()));
        assert_eq!(queue.reflect_partial_eq(&dynamic), Some(true));

        dynamic.push(String::from("seven"));
        assert!(<Vec<u32>>::from_reflect(&dynamic).is_none());
    }
}
