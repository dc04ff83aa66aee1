use core::any::Any;

/// A capability of a type, stored in its [`TypeMeta`].
///
/// Implemented for every `Clone + Send + Sync` type.
///
/// [`TypeMeta`]: crate::registry::TypeMeta
pub trait TypeTrait: Any + Send + Sync {
    /// Clones the type trait into a new box.
    fn clone_type_trait(&self) -> Box<dyn TypeTrait>;
}

impl<T: Clone + Any + Send + Sync> TypeTrait for T {
    #[inline]
    fn clone_type_trait(&self) -> Box<dyn TypeTrait> {
        Box::new(self.clone())
    }
}

impl dyn TypeTrait {
    #[inline]
    pub fn is<T: TypeTrait>(&self) -> bool {
        <dyn Any>::is::<T>(self)
    }

    #[inline]
    pub fn downcast_ref<T: TypeTrait>(&self) -> Option<&T> {
        <dyn Any>::downcast_ref(self)
    }

    #[inline]
    pub fn downcast_mut<T: TypeTrait>(&mut self) -> Option<&mut T> {
        <dyn Any>::downcast_mut(self)
    }
}

impl core::fmt::Debug for dyn TypeTrait {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("TypeTrait")
    }
}
