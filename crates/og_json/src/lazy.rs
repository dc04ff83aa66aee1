//! Detection of deferred values that were never realized.

use og_reflect::Reflect;
use og_reflect::ops::ReflectRef;

/// Decides whether a property holds a deferred value that is not loaded yet.
///
/// Such properties are left out of the encoded object entirely, unlike a
/// `null`, which states that the value is absent.
pub trait LazyValueOracle: Send + Sync + 'static {
    fn is_unrealized(&self, value: &dyn Reflect) -> bool;
}

/// Treats an unset deferred optional, such as an empty `OnceLock`, as
/// unrealized.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeferredOracle;

impl LazyValueOracle for DeferredOracle {
    fn is_unrealized(&self, value: &dyn Reflect) -> bool {
        let ReflectRef::Optional(optional) = value.reflect_ref() else {
            return false;
        };
        optional.is_none()
            && value
                .represented_type_info()
                .and_then(|info| info.as_optional().ok())
                .is_some_and(|info| info.is_deferred())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::sync::OnceLock;

    use super::{DeferredOracle, LazyValueOracle};

    #[test]
    fn only_unset_locks_are_unrealized() {
        let oracle = DeferredOracle;
        assert!(oracle.is_unrealized(&OnceLock::<u8>::new()));
        assert!(!oracle.is_unrealized(&OnceLock::from(1_u8)));
        assert!(!oracle.is_unrealized(&None::<u8>));
        assert!(!oracle.is_unrealized(&3_u8));
    }
}
