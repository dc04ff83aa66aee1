use serde_core::{Serialize, Serializer};

use crate::Reflect;
use crate::info::Typed;
use crate::registry::FromType;

/// Marks a type that serializes itself through `serde`.
///
/// Registered by `#[reflect(serde)]`; encoders inline the serde output
/// instead of walking the reflected shape.
#[derive(Clone)]
pub struct TypeTraitSerialize {
    func: fn(value: &dyn Reflect) -> Option<&dyn erased_serde::Serialize>,
}

impl<T: erased_serde::Serialize + Typed + Reflect> FromType<T> for TypeTraitSerialize {
    fn from_type() -> Self {
        Self {
            func: |value| {
                value
                    .downcast_ref::<T>()
                    .map(|value| value as &dyn erased_serde::Serialize)
            },
        }
    }
}

impl TypeTraitSerialize {
    /// Returns the value as a serde serializable, or `None` if it is not of
    /// the registered type.
    #[inline]
    pub fn as_serialize<'a>(&self, value: &'a dyn Reflect) -> Option<&'a dyn erased_serde::Serialize> {
        (self.func)(value)
    }

    /// Serializes the value.
    ///
    /// Returns `None` if the value is not of the registered type.
    pub fn serialize<S: Serializer>(
        &self,
        value: &dyn Reflect,
        serializer: S,
    ) -> Option<Result<S::Ok, S::Error>> {
        self.as_serialize(value)
            .map(|value| value.serialize(serializer))
    }
}
