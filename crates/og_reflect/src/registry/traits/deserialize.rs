use serde_core::{Deserialize, Deserializer};

use crate::Reflect;
use crate::info::Typed;
use crate::registry::FromType;

/// Marks a type that deserializes itself through `serde`.
#[derive(Clone)]
pub struct TypeTraitDeserialize {
    func: fn(
        deserializer: &mut dyn erased_serde::Deserializer,
    ) -> Result<Box<dyn Reflect>, erased_serde::Error>,
}

impl TypeTraitDeserialize {
    #[inline(always)]
    pub fn deserialize<'de, D: Deserializer<'de>>(
        &self,
        deserializer: D,
    ) -> Result<Box<dyn Reflect>, D::Error> {
        let mut erased = <dyn erased_serde::Deserializer>::erase(deserializer);
        (self.func)(&mut erased).map_err(<D::Error as serde_core::de::Error>::custom)
    }
}

impl<T: for<'a> Deserialize<'a> + Typed + Reflect> FromType<T> for TypeTraitDeserialize {
    fn from_type() -> Self {
        Self {
            func: |deserializer| Ok(Box::new(erased_serde::deserialize::<T>(deserializer)?)),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use crate::registry::{FromType, TypeTraitDeserialize, TypeTraitSerialize};
    use crate::{Reflect, derive::Reflect};

    #[derive(Reflect, Serialize, Deserialize, Debug, PartialEq, Clone)]
    #[reflect(serde, clone)]
    struct Span {
        start: u32,
        end: u32,
    }

    #[test]
    fn serde_round_trip_through_type_traits() {
        let ser: TypeTraitSerialize = FromType::<Span>::from_type();
        let de: TypeTraitDeserialize = FromType::<Span>::from_type();

        let value = Span { start: 1, end: 4 };
        let json = serde_json::to_string(ser.as_serialize(&value).unwrap()).unwrap();
        assert_eq!(json, r#"{"start":1,"end":4}"#);
        assert!(ser.as_serialize(&5_u8).is_none());

        let mut deserializer = serde_json::Deserializer::from_str(&json);
        let back = de.deserialize(&mut deserializer).unwrap();
        assert_eq!(back.downcast_ref::<Span>(), Some(&value));
    }
}
