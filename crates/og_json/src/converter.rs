//! Type-scoped read/write interceptors.

use core::any::TypeId;
use core::fmt::Display;
use core::marker::PhantomData;
use core::str::FromStr;
use std::sync::Arc;

use og_reflect::info::{TypeInfo, Typed};
use og_reflect::{FromReflect, Reflect};

use crate::error::{JsonError, Result};
use crate::reader::TokenReader;
use crate::writer::quote;

// -----------------------------------------------------------------------------
// Converter

/// Replaces the default encoding of the types it claims.
///
/// `write` returns the complete JSON text of the value, which is inlined as
/// is. `read` receives the raw JSON text of the value, as captured by
/// [`TokenReader::read_raw`], including surrounding quotes and `null`.
pub trait Converter: Send + Sync + 'static {
    /// Returns `true` if this converter handles values of the given type.
    fn can_convert(&self, info: &TypeInfo) -> bool;

    fn can_read(&self) -> bool {
        true
    }

    fn can_write(&self) -> bool {
        true
    }

    fn write(&self, value: &dyn Reflect) -> Result<String>;

    fn read(&self, raw: &str, info: &'static TypeInfo) -> Result<Box<dyn Reflect>>;
}

// -----------------------------------------------------------------------------
// ConverterRegistry

/// An ordered list of converters; the first match wins.
#[derive(Clone, Default)]
pub struct ConverterRegistry {
    converters: Vec<Arc<dyn Converter>>,
}

impl ConverterRegistry {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a converter.
    pub fn push(&mut self, converter: Arc<dyn Converter>) {
        if !converter.can_read() && !converter.can_write() {
            log::warn!("registered a converter that can neither read nor write");
        }
        self.converters.push(converter);
    }

    /// The first converter that claims `info` and can write.
    pub fn find_writer(&self, info: &TypeInfo) -> Option<&Arc<dyn Converter>> {
        self.converters
            .iter()
            .find(|converter| converter.can_write() && converter.can_convert(info))
    }

    /// The first converter that claims `info` and can read.
    pub fn find_reader(&self, info: &TypeInfo) -> Option<&Arc<dyn Converter>> {
        self.converters
            .iter()
            .find(|converter| converter.can_read() && converter.can_convert(info))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.converters.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}

impl core::fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("len", &self.converters.len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// FnConverter

type Predicate = Box<dyn Fn(&TypeInfo) -> bool + Send + Sync>;
type WriteFn = Box<dyn Fn(&dyn Reflect) -> Result<String> + Send + Sync>;
type ReadFn = Box<dyn Fn(&str, &'static TypeInfo) -> Result<Box<dyn Reflect>> + Send + Sync>;

/// A converter assembled from closures.
///
/// Without a writer it only reads, and the other way round.
///
/// ```
/// use og_json::{FnConverter, JsonConfig, JsonSerializer};
///
/// let config = JsonConfig::builder()
///     .converter(FnConverter::for_type::<bool>().with_writer(|value| {
///         let yes = value.downcast_ref::<bool>().copied().unwrap_or_default();
///         Ok(if yes { "\"yes\"" } else { "\"no\"" }.to_owned())
///     }))
///     .build();
/// let json = JsonSerializer::new(config).serialize(&vec![true, false]).unwrap();
/// assert_eq!(json, r#"["yes","no"]"#);
/// ```
pub struct FnConverter {
    predicate: Predicate,
    writer: Option<WriteFn>,
    reader: Option<ReadFn>,
}

impl FnConverter {
    /// A converter claiming the types matched by `predicate`.
    pub fn new(predicate: impl Fn(&TypeInfo) -> bool + Send + Sync + 'static) -> Self {
        Self {
            predicate: Box::new(predicate),
            writer: None,
            reader: None,
        }
    }

    /// A converter claiming exactly `T`.
    pub fn for_type<T: Typed>() -> Self {
        let id = T::type_info().type_id();
        Self::new(move |info| info.type_id() == id)
    }

    pub fn with_writer(
        mut self,
        writer: impl Fn(&dyn Reflect) -> Result<String> + Send + Sync + 'static,
    ) -> Self {
        self.writer = Some(Box::new(writer));
        self
    }

    pub fn with_reader(
        mut self,
        reader: impl Fn(&str, &'static TypeInfo) -> Result<Box<dyn Reflect>> + Send + Sync + 'static,
    ) -> Self {
        self.reader = Some(Box::new(reader));
        self
    }
}

impl Converter for FnConverter {
    #[inline]
    fn can_convert(&self, info: &TypeInfo) -> bool {
        (self.predicate)(info)
    }

    #[inline]
    fn can_read(&self) -> bool {
        self.reader.is_some()
    }

    #[inline]
    fn can_write(&self) -> bool {
        self.writer.is_some()
    }

    fn write(&self, value: &dyn Reflect) -> Result<String> {
        match &self.writer {
            Some(writer) => writer(value),
            None => Err(JsonError::converter(value.reflect_type_path(), "converter cannot write")),
        }
    }

    fn read(&self, raw: &str, info: &'static TypeInfo) -> Result<Box<dyn Reflect>> {
        match &self.reader {
            Some(reader) => reader(raw, info),
            None => Err(JsonError::converter(info.type_path(), "converter cannot read")),
        }
    }
}

// -----------------------------------------------------------------------------
// DisplayConverter

/// Encodes `T` as a string through `Display`, and decodes it through `FromStr`.
pub struct DisplayConverter<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> DisplayConverter<T> {
    #[inline]
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for DisplayConverter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Converter for DisplayConverter<T>
where
    T: Display + FromStr + FromReflect,
    T::Err: Display,
{
    #[inline]
    fn can_convert(&self, info: &TypeInfo) -> bool {
        info.type_id() == TypeId::of::<T>()
    }

    fn write(&self, value: &dyn Reflect) -> Result<String> {
        match value.downcast_ref::<T>() {
            Some(value) => Ok(quote(&value.to_string())),
            None => match T::from_reflect(value) {
                Some(value) => Ok(quote(&value.to_string())),
                None => Err(JsonError::converter(T::type_path(), "value is not of the converted type")),
            },
        }
    }

    fn read(&self, raw: &str, _info: &'static TypeInfo) -> Result<Box<dyn Reflect>> {
        let text = TokenReader::from_text(raw).read_string()?;
        text.parse::<T>()
            .map(Reflect::into_boxed_reflect)
            .map_err(|err| JsonError::converter(T::type_path(), err))
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use og_reflect::info::Typed;

    use super::{Converter, ConverterRegistry, DisplayConverter, FnConverter};

    #[test]
    fn first_matching_direction_wins() {
        let mut registry = ConverterRegistry::new();
        registry.push(Arc::new(
            FnConverter::for_type::<u32>().with_reader(|_, _| Ok(Box::new(1_u32))),
        ));
        registry.push(Arc::new(DisplayConverter::<u32>::new()));

        let info = u32::type_info();
        let writer = registry.find_writer(info).unwrap();
        assert_eq!(writer.write(&7_u32).unwrap(), r#""7""#);

        let reader = registry.find_reader(info).unwrap();
        let value = reader.read(r#""9""#, info).unwrap();
        assert_eq!(value.downcast_ref::<u32>(), Some(&1));

        assert!(registry.find_writer(i32::type_info()).is_none());
    }

    #[test]
    fn display_converter_round_trip() {
        let converter = DisplayConverter::<u16>::new();
        let info = u16::type_info();
        let raw = converter.write(&8080_u16).unwrap();
        assert_eq!(raw, r#""8080""#);
        let back = converter.read(&raw, info).unwrap();
        assert_eq!(back.downcast_ref::<u16>(), Some(&8080));
        assert!(converter.read(r#""nope""#, info).is_err());
    }
}
