//! Per-call encoder and decoder state.

use core::any::TypeId;
use std::sync::Arc;

use og_reflect::info::TypeInfo;

use crate::config::JsonConfig;
use crate::converter::Converter;
use crate::error::{JsonError, Result};
use crate::metadata::{PropertyCache, TypeProperties};

// -----------------------------------------------------------------------------
// PropertySlot

/// The format and converter of the property being encoded or decoded.
///
/// Formatters read the slot; it applies to the value directly under the
/// property, not to values nested inside it.
#[derive(Clone, Default)]
pub struct PropertySlot {
    pub format: Option<&'static str>,
    pub converter: Option<Arc<dyn Converter>>,
}

impl PropertySlot {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.format.is_none() && self.converter.is_none()
    }
}

// -----------------------------------------------------------------------------
// SerializeContext

/// State of one top-level encode call.
pub struct SerializeContext {
    config: Arc<JsonConfig>,
    cache: &'static PropertyCache,
    stack: Vec<(usize, TypeId)>,
    slot: PropertySlot,
}

impl SerializeContext {
    pub fn new(config: Arc<JsonConfig>) -> Self {
        Self {
            config,
            cache: PropertyCache::global(),
            stack: Vec::new(),
            slot: PropertySlot::default(),
        }
    }

    #[inline]
    pub fn config(&self) -> &JsonConfig {
        &self.config
    }

    #[inline]
    pub fn properties(&self, info: &'static TypeInfo) -> Arc<TypeProperties> {
        self.cache.get(info, &self.config)
    }

    /// Number of composite values being encoded.
    #[inline]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Runs `f` with `identity` on the identity stack.
    ///
    /// Fails with [`JsonError::Cycle`] if the identity is already being
    /// encoded. The identity is popped on every exit path of `f`.
    pub fn try_serialize<R>(
        &mut self,
        identity: (usize, TypeId),
        type_path: &'static str,
        f: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R> {
        if self.stack.contains(&identity) {
            return Err(JsonError::Cycle { type_path });
        }
        self.stack.push(identity);
        let result = f(self);
        self.stack.pop();
        result
    }

    /// Runs `f` with `slot` as the current property, restoring the previous
    /// one afterwards.
    pub fn with_property<R>(
        &mut self,
        slot: PropertySlot,
        f: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R> {
        let previous = core::mem::replace(&mut self.slot, slot);
        let result = f(self);
        self.slot = previous;
        result
    }

    #[inline]
    pub fn format(&self) -> Option<&'static str> {
        self.slot.format
    }

    /// Takes the converter of the current property, so that it applies to
    /// the property value only.
    #[inline]
    pub fn take_converter(&mut self) -> Option<Arc<dyn Converter>> {
        self.slot.converter.take()
    }
}

// -----------------------------------------------------------------------------
// DeserializeContext

/// State of one top-level decode call.
pub struct DeserializeContext {
    config: Arc<JsonConfig>,
    cache: &'static PropertyCache,
    slot: PropertySlot,
}

impl DeserializeContext {
    pub fn new(config: Arc<JsonConfig>) -> Self {
        Self {
            config,
            cache: PropertyCache::global(),
            slot: PropertySlot::default(),
        }
    }

    #[inline]
    pub fn config(&self) -> &JsonConfig {
        &self.config
    }

    #[inline]
    pub fn properties(&self, info: &'static TypeInfo) -> Arc<TypeProperties> {
        self.cache.get(info, &self.config)
    }

    /// Runs `f` with `slot` as the current property, restoring the previous
    /// one afterwards.
    pub fn with_property<R>(
        &mut self,
        slot: PropertySlot,
        f: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R> {
        let previous = core::mem::replace(&mut self.slot, slot);
        let result = f(self);
        self.slot = previous;
        result
    }

    #[inline]
    pub fn format(&self) -> Option<&'static str> {
        self.slot.format
    }

    #[inline]
    pub fn take_converter(&mut self) -> Option<Arc<dyn Converter>> {
        self.slot.converter.take()
    }

    /// Clears the slot for values nested below the current property.
    #[inline]
    pub fn take_slot(&mut self) -> PropertySlot {
        core::mem::take(&mut self.slot)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use core::any::TypeId;

    use super::{PropertySlot, SerializeContext};
    use crate::config::JsonConfig;
    use crate::error::JsonError;

    #[test]
    fn identity_stack_is_scoped() {
        let mut ctx = SerializeContext::new(JsonConfig::builder().build());
        let id = (0x10, TypeId::of::<u8>());

        let nested = ctx.try_serialize(id, "u8", |ctx| {
            assert_eq!(ctx.depth(), 1);
            ctx.try_serialize(id, "u8", |_| Ok(()))
        });
        assert!(matches!(nested, Err(JsonError::Cycle { type_path: "u8" })));
        assert_eq!(ctx.depth(), 0);

        let failed: Result<(), _> =
            ctx.try_serialize(id, "u8", |_| Err(JsonError::conversion("x", "u8")));
        assert!(failed.is_err());
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn property_slot_is_restored() {
        let mut ctx = SerializeContext::new(JsonConfig::builder().build());
        let slot = PropertySlot {
            format: Some("F1"),
            converter: None,
        };
        ctx.with_property(slot, |ctx| {
            assert_eq!(ctx.format(), Some("F1"));
            ctx.with_property(PropertySlot::default(), |ctx| {
                assert_eq!(ctx.format(), None);
                Ok(())
            })?;
            assert_eq!(ctx.format(), Some("F1"));
            Ok(())
        })
        .unwrap();
        assert_eq!(ctx.format(), None);
    }
}
