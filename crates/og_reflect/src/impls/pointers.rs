//! `Arc<T>` and `Box<T>` are transparent: type info, paths and shape views
//! are the pointee's. Only [`Reflect::ty_id`] still names the pointer type,
//! so a shared `Arc` can be recovered by downcasting.

use std::sync::Arc;

use crate::info::{TypeInfo, TypePath, Typed};
use crate::ops::ReflectRef;
use crate::registry::{GetTypeMeta, TypeMeta, TypeRegistry};
use crate::{FromReflect, Reflect};

macro_rules! impl_transparent_path {
    ($ty:ident) => {
        impl<T: TypePath> TypePath for $ty<T> {
            #[inline]
            fn type_path() -> &'static str {
                T::type_path()
            }

            #[inline]
            fn type_name() -> &'static str {
                T::type_name()
            }
        }

        impl<T: Typed> Typed for $ty<T> {
            #[inline]
            fn type_info() -> &'static TypeInfo {
                T::type_info()
            }
        }

        impl<T: GetTypeMeta> GetTypeMeta for $ty<T> {
            #[inline]
            fn get_type_meta() -> TypeMeta {
                T::get_type_meta()
            }

            #[inline]
            fn register_dependencies(registry: &mut TypeRegistry) {
                T::register_dependencies(registry);
            }
        }
    };
}

impl_transparent_path!(Arc);
impl_transparent_path!(Box);

// -----------------------------------------------------------------------------
// Arc

impl<T: Reflect + Typed> Reflect for Arc<T> {
    #[inline]
    fn is_dynamic(&self) -> bool {
        (**self).is_dynamic()
    }

    #[inline]
    fn represented_type_info(&self) -> Option<&'static TypeInfo> {
        (**self).represented_type_info()
    }

    #[inline]
    fn reflect_ref(&self) -> ReflectRef<'_> {
        (**self).reflect_ref()
    }

    /// Clones the pointer, not the pointee.
    #[inline]
    fn reflect_clone(&self) -> Box<dyn Reflect> {
        Box::new(Arc::clone(self))
    }
}

impl<T: FromReflect> FromReflect for Arc<T> {
    /// Shares an existing `Arc<T>`, or wraps a value rebuilt as `T`.
    fn from_reflect(reflect: &dyn Reflect) -> Option<Self> {
        match reflect.downcast_ref::<Arc<T>>() {
            Some(shared) => Some(Arc::clone(shared)),
            None => T::from_reflect(reflect).map(Arc::new),
        }
    }
}

// -----------------------------------------------------------------------------
// Box

impl<T: Reflect + Typed> Reflect for Box<T> {
    #[inline]
    fn is_dynamic(&self) -> bool {
        (**self).is_dynamic()
    }

    #[inline]
    fn represented_type_info(&self) -> Option<&'static TypeInfo> {
        (**self).represented_type_info()
    }

    #[inline]
    fn reflect_ref(&self) -> ReflectRef<'_> {
        (**self).reflect_ref()
    }

    #[inline]
    fn reflect_clone(&self) -> Box<dyn Reflect> {
        (**self).reflect_clone()
    }
}

impl<T: FromReflect> FromReflect for Box<T> {
    fn from_reflect(reflect: &dyn Reflect) -> Option<Self> {
        T::from_reflect(reflect).map(Box::new)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::info::{TypePath, Typed};
    use crate::{FromReflect, Reflect};

    #[test]
    fn arc_is_transparent() {
        assert_eq!(<Arc<u8>>::type_path(), "u8");
        assert!(<Box<String>>::type_info().type_is::<String>());

        let shared = Arc::new(vec![1_u8, 2]);
        let view = shared.reflect_ref().as_reflect();
        assert!(core::ptr::addr_eq(view, Arc::as_ptr(&shared)));
        assert_eq!(shared.reflect_partial_eq(&vec![1_u8, 2]), Some(true));
    }

    #[test]
    fn arc_from_reflect_keeps_sharing() {
        let shared = Arc::new(String::from("node"));
        let cloned = shared.reflect_clone();
        let again = <Arc<String>>::from_reflect(&*cloned).unwrap();
        assert!(Arc::ptr_eq(&shared, &again));

        let fresh = <Arc<String>>::from_reflect(&String::from("node")).unwrap();
        assert!(!Arc::ptr_eq(&shared, &fresh));
    }
}
