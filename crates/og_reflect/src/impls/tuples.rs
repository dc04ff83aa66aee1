use crate::impls::{GenericTypeInfoCell, GenericTypePathCell, NonGenericTypeInfoCell};
use crate::info::{TupleInfo, TypeInfo, TypePath, Typed, UnnamedField};
use crate::ops::{ReflectRef, Tuple};
use crate::registry::{FromType, GetTypeMeta, TypeMeta, TypeRegistry};
use crate::registry::TypeTraitFromReflect;
use crate::{FromReflect, Reflect};

fn tuple_path(parts: &[&str]) -> String {
    match parts {
        [one] => crate::impls::concat(&["(", one, ",)"]),
        _ => format!("({})", parts.join(", ")),
    }
}

macro_rules! impl_tuple {
    ($len:literal => $($T:ident : $index:tt),+) => {
        impl<$($T: TypePath),+> TypePath for ($($T,)+) {
            fn type_path() -> &'static str {
                static CELL: GenericTypePathCell = GenericTypePathCell::new();
                CELL.get_or_insert::<Self>(|| tuple_path(&[$($T::type_path()),+]))
            }

            fn type_name() -> &'static str {
                static CELL: GenericTypePathCell = GenericTypePathCell::new();
                CELL.get_or_insert::<Self>(|| tuple_path(&[$($T::type_name()),+]))
            }
        }

        impl<$($T: Typed),+> Typed for ($($T,)+) {
            fn type_info() -> &'static TypeInfo {
                static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
                CELL.get_or_insert::<Self>(|| {
                    TypeInfo::Tuple(TupleInfo::new::<Self>(&[$(UnnamedField::new::<$T>($index)),+]))
                })
            }
        }

        impl<$($T: FromReflect),+> Tuple for ($($T,)+) {
            fn field(&self, index: usize) -> Option<&dyn Reflect> {
                match index {
                    $($index => Some(self.$index.as_reflect()),)+
                    _ => None,
                }
            }

            #[inline]
            fn field_len(&self) -> usize {
                $len
            }
        }

        impl<$($T: FromReflect),+> Reflect for ($($T,)+) {
            crate::reflection::impl_reflect_cast_fn!(Tuple);

            fn reflect_clone(&self) -> Box<dyn Reflect> {
                match Self::from_reflect(self) {
                    Some(value) => Box::new(value),
                    None => self.to_dynamic(),
                }
            }
        }

        impl<$($T: FromReflect),+> FromReflect for ($($T,)+) {
            fn from_reflect(reflect: &dyn Reflect) -> Option<Self> {
                let ReflectRef::Tuple(tuple) = reflect.reflect_ref() else {
                    return None;
                };
                if tuple.field_len() != $len {
                    return None;
                }
                Some(($($T::from_reflect(tuple.field($index)?)?,)+))
            }
        }

        impl<$($T: FromReflect + GetTypeMeta),+> GetTypeMeta for ($($T,)+) {
            fn get_type_meta() -> TypeMeta {
                let mut meta = TypeMeta::with_capacity::<Self>(1);
                meta.insert_trait::<TypeTraitFromReflect>(FromType::<Self>::from_type());
                meta
            }

            fn register_dependencies(registry: &mut TypeRegistry) {
                $(registry.register::<$T>();)+
            }
        }
    };
}

impl_tuple!(1 => A: 0);
impl_tuple!(2 => A: 0, B: 1);
impl_tuple!(3 => A: 0, B: 1, C: 2);
impl_tuple!(4 => A: 0, B: 1, C: 2, D: 3);
impl_tuple!(5 => A: 0, B: 1, C: 2, D: 3, E: 4);
impl_tuple!(6 => A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);

// -----------------------------------------------------------------------------
// Unit

impl TypePath for () {
    #[inline]
    fn type_path() -> &'static str {
        "()"
    }

    #[inline]
    fn type_name() -> &'static str {
        "()"
    }
}

impl Typed for () {
    fn type_info() -> &'static TypeInfo {
        static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
        CELL.get_or_init(|| TypeInfo::Tuple(TupleInfo::new::<Self>(&[])))
    }
}

impl Tuple for () {
    #[inline]
    fn field(&self, _index: usize) -> Option<&dyn Reflect> {
        None
    }

    #[inline]
    fn field_len(&self) -> usize {
        0
    }
}

impl Reflect for () {
    crate::reflection::impl_reflect_cast_fn!(Tuple);

    #[inline]
    fn reflect_clone(&self) -> Box<dyn Reflect> {
        Box::new(())
    }
}

impl FromReflect for () {
    fn from_reflect(reflect: &dyn Reflect) -> Option<Self> {
        match reflect.reflect_ref() {
            ReflectRef::Tuple(tuple) if tuple.field_len() == 0 => Some(()),
            _ => None,
        }
    }
}

crate::registry::impl_get_type_meta!(() => TypeTraitFromReflect, TypeTraitDefault);

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::info::TypePath;
    use crate::ops::{DynamicTuple, Tuple};
    use crate::{FromReflect, Reflect};

    #[test]
    fn tuple_paths() {
        assert_eq!(<(u8,)>::type_path(), "(u8,)");
        assert_eq!(<(u8, bool, char)>::type_name(), "(u8, bool, char)");
    }

    #[test]
    fn tuple_from_dynamic() {
        let mut dynamic = DynamicTuple::default();
        dynamic.push(1_i64);
        dynamic.push(String::from("one"));

        let pair = <(u16, String)>::from_reflect(&dynamic).unwrap();
        assert_eq!(pair, (1, String::from("one")));
        assert_eq!(pair.field_len(), 2);
        assert!(<(u16, String, bool)>::from_reflect(&dynamic).is_none());
        assert_eq!(format!("{:?}", pair.as_reflect()), "(1, \"one\")");
    }
}
