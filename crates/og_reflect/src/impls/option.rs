use std::sync::OnceLock;

use crate::impls::{GenericTypeInfoCell, GenericTypePathCell, concat};
use crate::info::{OptionalInfo, TypeInfo, TypePath, Typed};
use crate::ops::{Optional, ReflectRef};
use crate::registry::{FromType, GetTypeMeta, TypeMeta, TypeRegistry};
use crate::registry::{TypeTraitDefault, TypeTraitFromReflect};
use crate::{FromReflect, Reflect};

/// A function use for implementing [`FromReflect`] for optional types.
///
/// An absent value maps to `None`; any other value must convert to `T`.
fn optional_from_reflect<T: FromReflect>(reflect: &dyn Reflect) -> Option<Option<T>> {
    match reflect.reflect_ref() {
        ReflectRef::Optional(optional) => match optional.value() {
            Some(value) => T::from_reflect(value).map(Some),
            None => Some(None),
        },
        _ => T::from_reflect(reflect).map(Some),
    }
}

macro_rules! impl_optional {
    ($ty:ident, $path:literal, $name:literal, $info:ident, $get:expr, $from:expr) => {
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
                CELL.get_or_insert::<Self>(|| TypeInfo::Optional(OptionalInfo::$info::<Self, T>()))
            }
        }

        impl<T: FromReflect> Optional for $ty<T> {
            #[inline]
            fn value(&self) -> Option<&dyn Reflect> {
                let get: fn(&Self) -> Option<&T> = $get;
                get(self).map(Reflect::as_reflect)
            }
        }

        impl<T: FromReflect> Reflect for $ty<T> {
            crate::reflection::impl_reflect_cast_fn!(Optional);

            fn reflect_clone(&self) -> Box<dyn Reflect> {
                match Self::from_reflect(self) {
                    Some(value) => Box::new(value),
                    None => self.to_dynamic(),
                }
            }
        }

        impl<T: FromReflect> FromReflect for $ty<T> {
            fn from_reflect(reflect: &dyn Reflect) -> Option<Self> {
                let from: fn(Option<T>) -> Self = $from;
                optional_from_reflect::<T>(reflect).map(from)
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

impl_optional!(
    Option,
    "std::option::Option",
    "Option",
    new,
    Option::as_ref,
    |value| value
);

// An unset `OnceLock` is a deferred value that was never realized.
impl_optional!(
    OnceLock,
    "std::sync::OnceLock",
    "OnceLock",
    deferred,
    OnceLock::get,
    |value| match value {
        Some(value) => OnceLock::from(value),
        None => OnceLock::new(),
    }
);

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::sync::OnceLock;

    use crate::info::Typed;
    use crate::ops::{DynamicOptional, Optional};
    use crate::{FromReflect, Reflect};

    #[test]
    fn once_lock_is_deferred() {
        let info = <OnceLock<u8>>::type_info().as_optional().unwrap();
        assert!(info.is_deferred());
        assert!(!<Option<u8>>::type_info().as_optional().unwrap().is_deferred());

        let lock = OnceLock::new();
        assert!(Optional::is_none(&lock));
        let _ = lock.set(3_u8);
        assert_eq!(Optional::value(&lock).unwrap().downcast_ref::<u8>(), Some(&3));
    }

    #[test]
    fn optional_from_plain_or_absent() {
        assert_eq!(<Option<i32>>::from_reflect(&9_i32), Some(Some(9)));
        assert_eq!(<Option<i32>>::from_reflect(&DynamicOptional::none()), Some(None));

        let lock = <OnceLock<String>>::from_reflect(&Some(String::from("v"))).unwrap();
        assert_eq!(lock.get().map(String::as_str), Some("v"));
        assert_eq!(Some(1_u8).reflect_partial_eq(&None::<u8>), Some(false));
    }
}
