use crate::info::Typed;
use crate::registry::FromType;
use crate::{FromReflect, Reflect};

/// [`FromReflect`] for a type known only by its type id.
#[derive(Clone)]
pub struct TypeTraitFromReflect {
    func: fn(&dyn Reflect) -> Option<Box<dyn Reflect>>,
}

impl TypeTraitFromReflect {
    /// Rebuilds a concrete value of the registered type.
    #[inline(always)]
    pub fn from_reflect(&self, value: &dyn Reflect) -> Option<Box<dyn Reflect>> {
        (self.func)(value)
    }
}

impl<T: Typed + FromReflect> FromType<T> for TypeTraitFromReflect {
    fn from_type() -> Self {
        Self {
            func: |value| T::from_reflect(value).map(Reflect::into_boxed_reflect),
        }
    }
}
