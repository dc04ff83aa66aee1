use crate::Reflect;
use crate::info::Typed;
use crate::registry::FromType;

/// Creates the default value of a type behind its type id.
///
/// Decoders use it to pre-populate plain objects declared with
/// `#[reflect(default)]`.
#[derive(Clone)]
pub struct TypeTraitDefault {
    func: fn() -> Box<dyn Reflect>,
}

impl TypeTraitDefault {
    #[inline(always)]
    pub fn default(&self) -> Box<dyn Reflect> {
        (self.func)()
    }
}

impl<T: Default + Typed + Reflect> FromType<T> for TypeTraitDefault {
    fn from_type() -> Self {
        Self {
            func: || Box::<T>::default(),
        }
    }
}
