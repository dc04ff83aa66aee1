#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Modules

mod attributes;
mod config;
mod context;
mod converter;
mod de;
mod error;
mod format;
mod lazy;
mod metadata;
mod raw;
mod ser;
mod table;

pub mod reader;
pub mod writer;

// -----------------------------------------------------------------------------
// Top-level exports

pub use attributes::{JsonConverter, JsonFormat, JsonIgnore, JsonName, JsonSkipIf};
pub use config::{DateMode, EnumMode, JsonConfig, JsonConfigBuilder, NamingPolicy};
pub use context::{DeserializeContext, PropertySlot, SerializeContext};
pub use converter::{Converter, ConverterRegistry, DisplayConverter, FnConverter};
pub use de::JsonDeserializer;
pub use error::{JsonError, Result};
pub use lazy::{DeferredOracle, LazyValueOracle};
pub use metadata::{PropertyCache, PropertyMetadata, TypeProperties, variant_wire_name};
pub use raw::RawJson;
pub use ser::JsonSerializer;
pub use table::{DataSet, DataTable};
