//! Custom attributes read by the encoder and decoder.
//!
//! Attach them with `#[reflect(@...)]`:
//!
//! ```
//! use og_json::{JsonFormat, JsonIgnore, JsonName, JsonSerializer};
//! use og_reflect::derive::Reflect;
//!
//! #[derive(Reflect)]
//! struct Invoice {
//!     #[reflect(@JsonName("no"))]
//!     number: u32,
//!     #[reflect(@JsonFormat("F2"))]
//!     total: f64,
//!     #[reflect(@JsonIgnore)]
//!     internal: u8,
//! }
//!
//! let invoice = Invoice { number: 7, total: 12.5, internal: 0 };
//! let json = JsonSerializer::default().serialize(&invoice).unwrap();
//! assert_eq!(json, r#"{"no":7,"total":"12.50"}"#);
//! ```

use std::sync::Arc;

use og_reflect::Reflect;
use og_reflect::derive::Reflect;

use crate::converter::Converter;

/// Renames a field or an enum variant on the wire.
#[derive(Reflect, Debug, Clone, Copy)]
#[reflect(opaque, clone, type_path = "og_json::JsonName")]
pub struct JsonName(pub &'static str);

/// Format string of a number or date property.
///
/// Numbers take `F<n>`, `N<n>`, `D<n>`, `X`, `x` or `E<n>`; enums take `G`
/// (name) or `D` (ordinal); dates take a strftime pattern.
#[derive(Reflect, Debug, Clone, Copy)]
#[reflect(opaque, clone, type_path = "og_json::JsonFormat")]
pub struct JsonFormat(pub &'static str);

/// Leaves a field out of the encoded object.
#[derive(Reflect, Debug, Clone, Copy)]
#[reflect(opaque, clone, type_path = "og_json::JsonIgnore")]
pub struct JsonIgnore;

/// Skips a field when the predicate holds for its value.
///
/// ```
/// use og_json::{JsonSerializer, JsonSkipIf};
/// use og_reflect::derive::Reflect;
///
/// fn is_zero(value: &dyn og_reflect::Reflect) -> bool {
///     value.downcast_ref::<u32>() == Some(&0)
/// }
///
/// #[derive(Reflect)]
/// struct Counter {
///     #[reflect(@JsonSkipIf(is_zero))]
///     hits: u32,
/// }
///
/// let json = JsonSerializer::default().serialize(&Counter { hits: 0 }).unwrap();
/// assert_eq!(json, "{}");
/// ```
#[derive(Reflect, Clone, Copy)]
#[reflect(opaque, clone, type_path = "og_json::JsonSkipIf")]
pub struct JsonSkipIf(pub fn(&dyn Reflect) -> bool);

impl JsonSkipIf {
    #[inline]
    pub fn should_skip(&self, value: &dyn Reflect) -> bool {
        (self.0)(value)
    }
}

/// Binds a converter to a type or to a single field.
///
/// A field converter wins over a type converter, which wins over the
/// converters of the configuration.
#[derive(Reflect, Clone)]
#[reflect(opaque, clone, type_path = "og_json::JsonConverter")]
pub struct JsonConverter(pub Arc<dyn Converter>);

impl JsonConverter {
    #[inline]
    pub fn new(converter: impl Converter) -> Self {
        Self(Arc::new(converter))
    }

    #[inline]
    pub fn converter(&self) -> &Arc<dyn Converter> {
        &self.0
    }
}
