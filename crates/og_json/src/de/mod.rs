//! The object graph decoder.

use std::io;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use og_reflect::info::{EnumInfo, ListInfo, MapInfo, NamedField, ScalarInfo, ScalarKind, TupleInfo};
use og_reflect::info::{TypeInfo, Typed};
use og_reflect::ops::{DynamicEnum, DynamicList, DynamicMap, DynamicOptional, DynamicStruct};
use og_reflect::ops::{DynamicTuple, List, ReflectRef, ScalarValue, Struct};
use og_reflect::registry::{TypeCatalog, TypeTraitDefault, TypeTraitDeserialize, TypeTraitFromReflect};
use og_reflect::{FromReflect, Reflect, Value};

use crate::config::JsonConfig;
use crate::context::{DeserializeContext, PropertySlot};
use crate::converter::Converter;
use crate::error::{JsonError, Result};
use crate::format::{is_epoch_date, is_hex_format, number_from_literal, parse_date, parse_number};
use crate::metadata::variant_wire_name;
use crate::raw::RawJson;
use crate::reader::{CharSource, IoSource, TokenReader};
use crate::table::{DataSet, DataTable};

// -----------------------------------------------------------------------------
// JsonDeserializer

/// Decodes JSON into reflected values.
///
/// Decoding builds concrete scalars and `Dynamic*` containers tagged with
/// the target type; [`FromReflect`] then materializes the target.
///
/// ```
/// use og_json::JsonDeserializer;
/// use og_reflect::derive::Reflect;
///
/// #[derive(Reflect, Debug, PartialEq)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// let point: Point = JsonDeserializer::default()
///     .from_str(r#"{"y": -2, "x": 1, "z": 0}"#)
///     .unwrap();
/// assert_eq!(point, Point { x: 1, y: -2 });
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonDeserializer {
    config: Arc<JsonConfig>,
}

impl JsonDeserializer {
    #[inline]
    pub fn new(config: Arc<JsonConfig>) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &Arc<JsonConfig> {
        &self.config
    }

    /// Decodes a `T` from a string.
    pub fn from_str<T: FromReflect>(&self, text: &str) -> Result<T> {
        let mut reader = TokenReader::from_text(text);
        let value = self.read_value(&mut reader, T::type_info())?;
        reader.finish()?;
        materialize(value)
    }

    /// Decodes a `T` from an I/O stream.
    pub fn from_reader<T: FromReflect, R: io::Read>(&self, input: R) -> Result<T> {
        let mut reader = TokenReader::new(IoSource::new(input));
        let value = self.read_value(&mut reader, T::type_info())?;
        reader.finish()?;
        materialize(value)
    }

    /// Decodes a value of the type described by `info`.
    pub fn deserialize(&self, text: &str, info: &'static TypeInfo) -> Result<Box<dyn Reflect>> {
        let mut reader = TokenReader::from_text(text);
        let value = self.read_value(&mut reader, info)?;
        reader.finish()?;
        Ok(value)
    }

    /// Decodes a value whose shape is taken from the input.
    pub fn deserialize_any(&self, text: &str) -> Result<Value> {
        self.deserialize(text, Value::type_info()).map(into_value)
    }

    /// Decodes the next value of an existing reader.
    pub fn read_value<S: CharSource>(
        &self,
        reader: &mut TokenReader<S>,
        info: &'static TypeInfo,
    ) -> Result<Box<dyn Reflect>> {
        let mut ctx = DeserializeContext::new(Arc::clone(&self.config));
        decode_value(&mut ctx, reader, info)
    }
}

fn materialize<T: FromReflect>(value: Box<dyn Reflect>) -> Result<T> {
    T::take_from_reflect(value)
        .map_err(|value| JsonError::conversion(format!("{value:?}"), T::type_info().type_path()))
}

fn into_value(value: Box<dyn Reflect>) -> Value {
    match value.take::<Value>() {
        Ok(value) => value,
        Err(value) => Value::from_boxed(value),
    }
}

fn missing(info: &TypeInfo, member: &str) -> JsonError {
    JsonError::conversion("<missing>", format!("{}.{member}", info.type_path()))
}

fn resolve_type(ctx: &DeserializeContext, name: &str) -> Result<&'static TypeInfo> {
    ctx.config()
        .registry()
        .and_then(|registry| registry.resolve(name))
        .ok_or_else(|| JsonError::TypeResolution {
            name: name.to_owned(),
        })
}

// -----------------------------------------------------------------------------
// Dispatch

/// The converter for a value: the property's, then the type's, then the
/// first registered one.
fn select_reader(ctx: &mut DeserializeContext, info: &'static TypeInfo) -> Option<Arc<dyn Converter>> {
    let slot = ctx.take_converter();
    if let Some(converter) = slot.filter(|converter| converter.can_read()) {
        return Some(converter);
    }
    if let Some(converter) = ctx.properties(info).converter()
        && converter.can_read()
    {
        return Some(Arc::clone(converter));
    }
    ctx.config().converters().find_reader(info).cloned()
}

/// The value of a `null` token for `info`.
fn null_value(info: &'static TypeInfo) -> Result<Box<dyn Reflect>> {
    match info {
        TypeInfo::Optional(_) => {
            let mut none = DynamicOptional::none();
            none.set_represented_type(Some(info));
            Ok(Box::new(none))
        }
        TypeInfo::List(_) => {
            let mut list = DynamicList::new();
            list.set_represented_type(Some(info));
            Ok(Box::new(list))
        }
        TypeInfo::Map(_) => {
            let mut map = DynamicMap::new();
            map.set_represented_type(Some(info));
            Ok(Box::new(map))
        }
        TypeInfo::Any(_) => Ok(Box::new(Value::empty())),
        _ => Err(JsonError::Nullability {
            type_path: info.type_path(),
        }),
    }
}

fn decode_value<S: CharSource>(
    ctx: &mut DeserializeContext,
    r: &mut TokenReader<S>,
    info: &'static TypeInfo,
) -> Result<Box<dyn Reflect>> {
    if r.is_null()? {
        ctx.take_converter();
        return null_value(info);
    }

    // Present optionals hold their content; the property slot passes through.
    if let TypeInfo::Optional(optional) = info {
        let inner = decode_value(ctx, r, optional.inner_info())?;
        let mut value = DynamicOptional::new(Some(inner));
        value.set_represented_type(Some(info));
        return Ok(Box::new(value));
    }

    if let Some(converter) = select_reader(ctx, info) {
        log::trace!("converter selected for `{}`", info.type_path());
        let raw = r.read_raw()?;
        return converter.read(&raw, info);
    }

    if info.type_is::<RawJson>() {
        return Ok(Box::new(RawJson::new(r.read_raw()?)));
    }
    let serde = ctx
        .config()
        .registry()
        .and_then(|registry| registry.get_type_trait::<TypeTraitDeserialize>(info.type_id()))
        .cloned();
    if let Some(serde) = serde {
        let raw = r.read_raw()?;
        let mut deserializer = serde_json::Deserializer::from_str(&raw);
        return serde
            .deserialize(&mut deserializer)
            .map_err(|err| JsonError::converter(info.type_path(), err));
    }
    if info.type_is::<DataTable>() {
        ctx.take_slot();
        return decode_table(ctx, r, String::new()).map(|table| Box::new(table) as Box<dyn Reflect>);
    }
    if info.type_is::<DataSet>() {
        ctx.take_slot();
        return decode_data_set(ctx, r);
    }

    match info {
        TypeInfo::Scalar(scalar) => decode_scalar(ctx, r, info, scalar),
        TypeInfo::Enum(variants) => decode_enum(r, info, variants),
        TypeInfo::Struct(_) => {
            ctx.take_slot();
            decode_struct(ctx, r, info)
        }
        TypeInfo::Tuple(fields) => {
            ctx.take_slot();
            decode_tuple(ctx, r, info, fields)
        }
        TypeInfo::List(items) => {
            ctx.take_slot();
            decode_list(ctx, r, info, items)
        }
        TypeInfo::Map(entries) => {
            ctx.take_slot();
            decode_map(ctx, r, info, entries)
        }
        TypeInfo::Any(_) => {
            ctx.take_slot();
            decode_any(ctx, r)
        }
        TypeInfo::Opaque(_) | TypeInfo::Optional(_) => Err(JsonError::converter(
            info.type_path(),
            "opaque type has no converter",
        )),
    }
}

// -----------------------------------------------------------------------------
// Leaves

fn char_value(text: String) -> ScalarValue {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => ScalarValue::Char(c),
        _ => ScalarValue::Str(text),
    }
}

fn decode_scalar<S: CharSource>(
    ctx: &mut DeserializeContext,
    r: &mut TokenReader<S>,
    info: &'static TypeInfo,
    scalar: &ScalarInfo,
) -> Result<Box<dyn Reflect>> {
    let quoted = r.peek_token()? == Some('"');
    let value = match scalar.kind() {
        ScalarKind::Bool if quoted => ScalarValue::Str(r.read_string()?),
        ScalarKind::Bool => ScalarValue::Bool(r.read_bool()?),
        ScalarKind::Char => char_value(r.read_string()?),
        ScalarKind::String if quoted => ScalarValue::Str(r.read_string()?),
        ScalarKind::String => ScalarValue::Str(r.read_number_like()?),
        ScalarKind::DateTime => {
            let text = if quoted {
                r.read_string()?
            } else {
                r.read_number_like()?
            };
            let offset = ctx.config().short_date_offset();
            ScalarValue::DateTime(parse_date(&text, ctx.format(), offset)?)
        }
        ScalarKind::Type => {
            let name = r.read_string()?;
            log::trace!("resolving type tag `{name}`");
            ScalarValue::Type(resolve_type(ctx, &name)?)
        }
        _ if quoted => {
            let format = ctx.format();
            match parse_number(&r.read_string()?, format)? {
                ScalarValue::UInt(bits)
                    if is_hex_format(format) && scalar.kind().is_integer() && scalar.kind().is_signed() =>
                {
                    ScalarValue::Int(bits as i64)
                }
                value => value,
            }
        }
        _ => {
            let text = r.read_number_like()?;
            match number_from_literal(&text) {
                Some(value) => value,
                None => return Err(JsonError::conversion(text, info.type_path())),
            }
        }
    };
    Ok(scalar.from_scalar(value)?)
}

fn variant_at(info: &'static TypeInfo, variants: &EnumInfo, index: usize) -> Result<Box<dyn Reflect>> {
    let variant = variants
        .variant_at(index)
        .ok_or_else(|| JsonError::conversion(index.to_string(), info.type_path()))?;
    let mut value = DynamicEnum::new(variant.name(), index, variant.discriminant());
    value.set_represented_type(Some(info));
    Ok(Box::new(value))
}

/// An enum from a variant name, a rename, or a quoted discriminant.
fn enum_from_text(info: &'static TypeInfo, variants: &EnumInfo, text: &str) -> Result<Box<dyn Reflect>> {
    let index = variants
        .iter()
        .position(|variant| variant_wire_name(variant) == text || variant.name() == text)
        .or_else(|| {
            let discriminant = text.trim().parse::<i64>().ok()?;
            variants.index_of_discriminant(discriminant)
        })
        .ok_or_else(|| JsonError::conversion(text, info.type_path()))?;
    variant_at(info, variants, index)
}

fn decode_enum<S: CharSource>(
    r: &mut TokenReader<S>,
    info: &'static TypeInfo,
    variants: &EnumInfo,
) -> Result<Box<dyn Reflect>> {
    if r.peek_token()? == Some('"') {
        let text = r.read_string()?;
        return enum_from_text(info, variants, &text);
    }
    let text = r.read_number_like()?;
    let index = text
        .parse::<i64>()
        .ok()
        .and_then(|discriminant| variants.index_of_discriminant(discriminant))
        .ok_or_else(|| JsonError::conversion(&text, info.type_path()))?;
    variant_at(info, variants, index)
}

// -----------------------------------------------------------------------------
// Composites

fn decode_struct<S: CharSource>(
    ctx: &mut DeserializeContext,
    r: &mut TokenReader<S>,
    info: &'static TypeInfo,
) -> Result<Box<dyn Reflect>> {
    let struct_info = info.as_struct().map_err(|_| JsonError::conversion("object", info.type_path()))?;
    let properties = ctx.properties(info);

    // Declared defaults first, so that the input overrides them.
    let mut record = match struct_info.default_value() {
        Some(default) => match default.reflect_ref() {
            ReflectRef::Struct(value) => value.to_dynamic_struct(),
            _ => DynamicStruct::with_capacity(struct_info.field_len()),
        },
        None => DynamicStruct::with_capacity(struct_info.field_len()),
    };
    for field in struct_info.iter() {
        if !record.contains(field.name())
            && let Some(default) = field.default_value()
        {
            record.insert_boxed(field.name(), default);
        }
    }

    r.loop_read_object(|r, key| {
        let Some(property) = properties.get(&key) else {
            if key != "$type" {
                log::debug!("skipping unknown key `{key}` of `{}`", info.type_path());
            }
            return r.skip_value();
        };
        let slot = PropertySlot {
            format: property.format(),
            converter: property.converter().cloned(),
        };
        let value = ctx.with_property(slot, |ctx| decode_value(ctx, r, property.type_info()))?;
        record.insert_boxed(property.name(), value);
        Ok(())
    })?;

    for field in struct_info.iter() {
        if record.contains(field.name()) {
            continue;
        }
        let absent = field.type_info();
        let value = if properties.iter().any(|property| property.name() == field.name()) {
            match absent {
                TypeInfo::Optional(_) | TypeInfo::Any(_) => null_value(absent)?,
                _ => return Err(missing(info, field.name())),
            }
        } else {
            unwritten_value(ctx, info, field)?
        };
        record.insert_boxed(field.name(), value);
    }

    record.set_represented_type(Some(info));
    Ok(Box::new(record))
}

/// The value of a field left out of the properties, which is never written:
/// the registered default of its type, or the empty value of its kind.
fn unwritten_value(
    ctx: &DeserializeContext,
    info: &'static TypeInfo,
    field: &NamedField,
) -> Result<Box<dyn Reflect>> {
    let ty = field.type_info();
    let registered = ctx
        .config()
        .registry()
        .and_then(|registry| registry.get_type_trait::<TypeTraitDefault>(ty.type_id()))
        .map(TypeTraitDefault::default);
    if let Some(value) = registered {
        return Ok(value);
    }
    match ty {
        TypeInfo::Scalar(scalar) => match zero_scalar(scalar.kind()) {
            Some(zero) => Ok(scalar.from_scalar(zero)?),
            None => Err(missing(info, field.name())),
        },
        TypeInfo::Struct(fields) => fields.default_value().ok_or_else(|| missing(info, field.name())),
        TypeInfo::Optional(_) | TypeInfo::List(_) | TypeInfo::Map(_) | TypeInfo::Any(_) => null_value(ty),
        _ => Err(missing(info, field.name())),
    }
}

fn zero_scalar(kind: ScalarKind) -> Option<ScalarValue> {
    Some(match kind {
        ScalarKind::Bool => ScalarValue::Bool(false),
        ScalarKind::I8 | ScalarKind::I16 | ScalarKind::I32 | ScalarKind::I64 | ScalarKind::Isize => {
            ScalarValue::Int(0)
        }
        ScalarKind::U8 | ScalarKind::U16 | ScalarKind::U32 | ScalarKind::U64 | ScalarKind::Usize => {
            ScalarValue::UInt(0)
        }
        ScalarKind::F32 => ScalarValue::F32(0.0),
        ScalarKind::F64 => ScalarValue::F64(0.0),
        ScalarKind::Char => ScalarValue::Char('\0'),
        ScalarKind::String => ScalarValue::Str(String::new()),
        ScalarKind::DateTime | ScalarKind::Type => return None,
    })
}

/// Tuples and tuple structs, from `Item1..ItemN` keys or a positional array.
fn decode_tuple<S: CharSource>(
    ctx: &mut DeserializeContext,
    r: &mut TokenReader<S>,
    info: &'static TypeInfo,
    fields: &TupleInfo,
) -> Result<Box<dyn Reflect>> {
    let len = fields.field_len();
    let mut values: Vec<Option<Box<dyn Reflect>>> = (0..len).map(|_| None).collect();

    if r.peek_token()? == Some('[') {
        let mut index = 0;
        r.loop_read_array(|r| {
            let Some(field) = fields.field_at(index) else {
                return Err(r.error(format!("expected {len} items for `{}`", info.type_path())));
            };
            values[index] = Some(decode_value(ctx, r, field.type_info())?);
            index += 1;
            Ok(())
        })?;
    } else {
        r.loop_read_object(|r, key| {
            let position = key
                .strip_prefix("Item")
                .and_then(|n| n.parse::<usize>().ok())
                .and_then(|n| n.checked_sub(1));
            match position.and_then(|index| Some((index, fields.field_at(index)?))) {
                Some((index, field)) => {
                    values[index] = Some(decode_value(ctx, r, field.type_info())?);
                    Ok(())
                }
                None => {
                    log::debug!("skipping unknown key `{key}` of `{}`", info.type_path());
                    r.skip_value()
                }
            }
        })?;
    }

    let mut tuple = DynamicTuple::default();
    for (index, value) in values.into_iter().enumerate() {
        match value {
            Some(value) => tuple.push_boxed(value),
            None => return Err(missing(info, &format!("Item{}", index + 1))),
        }
    }
    tuple.set_represented_type(Some(info));
    Ok(Box::new(tuple))
}

fn decode_list<S: CharSource>(
    ctx: &mut DeserializeContext,
    r: &mut TokenReader<S>,
    info: &'static TypeInfo,
    items: &ListInfo,
) -> Result<Box<dyn Reflect>> {
    let item_info = items.item_info();
    let mut list = DynamicList::new();

    if item_info.type_is::<u8>() && r.peek_token()? == Some('"') {
        let text = r.read_string()?;
        let bytes = STANDARD
            .decode(text.as_bytes())
            .map_err(|_| JsonError::conversion(&text, "base64 bytes"))?;
        for byte in bytes {
            list.push(byte);
        }
    } else {
        r.loop_read_array(|r| {
            list.push_boxed(decode_value(ctx, r, item_info)?);
            Ok(())
        })?;
    }

    if let Some(capacity) = items.capacity()
        && list.len() != capacity
    {
        return Err(JsonError::conversion(
            format!("{} items", list.len()),
            info.type_path(),
        ));
    }
    list.set_represented_type(Some(info));
    Ok(Box::new(list))
}

/// A map key from its object-key text.
fn decode_key(ctx: &DeserializeContext, text: &str, info: &'static TypeInfo) -> Result<Box<dyn Reflect>> {
    match info {
        TypeInfo::Scalar(scalar) => {
            let kind = scalar.kind();
            let value = if kind.is_integer() || kind.is_float() {
                parse_number(text, None)?
            } else {
                match kind {
                    ScalarKind::Char => char_value(text.to_owned()),
                    ScalarKind::DateTime => {
                        let offset = ctx.config().short_date_offset();
                        ScalarValue::DateTime(parse_date(text, None, offset)?)
                    }
                    ScalarKind::Type => ScalarValue::Type(resolve_type(ctx, text)?),
                    _ => ScalarValue::Str(text.to_owned()),
                }
            };
            Ok(scalar.from_scalar(value)?)
        }
        TypeInfo::Enum(variants) => enum_from_text(info, variants, text),
        _ => Err(JsonError::conversion(text, info.type_path())),
    }
}

fn decode_map<S: CharSource>(
    ctx: &mut DeserializeContext,
    r: &mut TokenReader<S>,
    info: &'static TypeInfo,
    entries: &MapInfo,
) -> Result<Box<dyn Reflect>> {
    let mut map = DynamicMap::new();
    r.loop_read_object(|r, key| {
        let key = decode_key(ctx, &key, entries.key_info())?;
        let value = decode_value(ctx, r, entries.value_info())?;
        map.insert_boxed(key, value);
        Ok(())
    })?;
    map.set_represented_type(Some(info));
    Ok(Box::new(map))
}

// -----------------------------------------------------------------------------
// Untyped values

/// A value whose shape comes from the next token.
fn decode_any<S: CharSource>(
    ctx: &mut DeserializeContext,
    r: &mut TokenReader<S>,
) -> Result<Box<dyn Reflect>> {
    match r.peek_token()? {
        Some('{') => decode_record(ctx, r),
        Some('[') => {
            let mut list = DynamicList::new();
            r.loop_read_array(|r| {
                list.push_boxed(decode_value(ctx, r, Value::type_info())?);
                Ok(())
            })?;
            Ok(Box::new(list))
        }
        Some('"') => {
            let text = r.read_string()?;
            if is_epoch_date(&text) {
                let offset = ctx.config().short_date_offset();
                return Ok(Box::new(parse_date(&text, None, offset)?));
            }
            Ok(Box::new(text))
        }
        Some('t' | 'f') => Ok(Box::new(r.read_bool()?)),
        _ => {
            let text = r.read_number_like()?;
            match number_from_literal(&text) {
                Some(ScalarValue::Int(value)) => Ok(Box::new(value)),
                Some(value) => match value.to_float() {
                    Some(value) => Ok(Box::new(value)),
                    None => Err(JsonError::conversion(text, "number")),
                },
                None => Err(JsonError::conversion(text, "number")),
            }
        }
    }
}

/// An object of unknown type: the tagged type when it starts with `$type`
/// and a registry is configured, a `DynamicStruct` otherwise.
fn decode_record<S: CharSource>(
    ctx: &mut DeserializeContext,
    r: &mut TokenReader<S>,
) -> Result<Box<dyn Reflect>> {
    if ctx.config().registry().is_none() {
        return read_record(ctx, r);
    }

    let raw = r.read_raw()?;
    let Some(info) = tagged_type(ctx, &raw)? else {
        return read_record(ctx, &mut TokenReader::from_text(&raw));
    };
    log::trace!("decoding tagged object as `{}`", info.type_path());
    let value = decode_value(ctx, &mut TokenReader::from_text(&raw), info)?;

    // Concrete when the type can be rebuilt, dynamic otherwise.
    let concrete = ctx
        .config()
        .registry()
        .and_then(|registry| registry.get_type_trait::<TypeTraitFromReflect>(info.type_id()))
        .and_then(|from_reflect| from_reflect.from_reflect(value.as_ref()));
    Ok(concrete.unwrap_or(value))
}

fn tagged_type(ctx: &DeserializeContext, raw: &str) -> Result<Option<&'static TypeInfo>> {
    let mut probe = TokenReader::from_text(raw);
    probe.assert_and_consume('{')?;
    if probe.peek_token()? != Some('"') || probe.read_key()? != "$type" {
        return Ok(None);
    }
    let name = probe.read_string()?;
    resolve_type(ctx, &name).map(Some)
}

fn read_record<S: CharSource>(
    ctx: &mut DeserializeContext,
    r: &mut TokenReader<S>,
) -> Result<Box<dyn Reflect>> {
    let mut record = DynamicStruct::new();
    r.loop_read_object(|r, key| {
        let value = decode_value(ctx, r, Value::type_info())?;
        record.insert_boxed(key, value);
        Ok(())
    })?;
    Ok(Box::new(record))
}

fn decode_table<S: CharSource>(
    ctx: &mut DeserializeContext,
    r: &mut TokenReader<S>,
    name: String,
) -> Result<DataTable> {
    let mut table = DataTable::new(name, Vec::<String>::new());
    r.loop_read_array(|r| {
        let mut cells = Vec::new();
        r.loop_read_object(|r, column| {
            let index = match table.column_index(&column) {
                Some(index) => index,
                None => table.push_column(column),
            };
            cells.push((index, into_value(decode_value(ctx, r, Value::type_info())?)));
            Ok(())
        })?;
        let mut row: Vec<Value> = table.columns().iter().map(|_| Value::empty()).collect();
        for (index, cell) in cells {
            row[index] = cell;
        }
        table.push_row(row);
        Ok(())
    })?;
    Ok(table)
}

fn decode_data_set<S: CharSource>(
    ctx: &mut DeserializeContext,
    r: &mut TokenReader<S>,
) -> Result<Box<dyn Reflect>> {
    let mut set = DataSet::new();
    r.loop_read_object(|r, name| {
        set.push(decode_table(ctx, r, name)?);
        Ok(())
    })?;
    Ok(Box::new(set))
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};
    use std::sync::{Arc, OnceLock};

    use chrono::{DateTime, FixedOffset, TimeZone};
    use og_reflect::derive::Reflect;
    use og_reflect::info::Typed;
    use og_reflect::ops::{DynamicStruct, Struct};
    use og_reflect::registry::TypeRegistry;
    use og_reflect::{FromReflect, TypeHandle, Value};
    use serde::{Deserialize, Serialize};

    use super::JsonDeserializer;
    use crate::attributes::{JsonConverter, JsonFormat, JsonIgnore, JsonName};
    use crate::config::{DateMode, EnumMode, JsonConfig};
    use crate::converter::FnConverter;
    use crate::error::JsonError;
    use crate::raw::RawJson;
    use crate::ser::JsonSerializer;
    use crate::table::DataTable;

    #[derive(Reflect, Debug, PartialEq)]
    struct Person {
        name: String,
        age: u32,
        tags: Vec<String>,
        nick_name: Option<String>,
    }

    fn ada() -> Person {
        Person {
            name: String::from("Ada"),
            age: 36,
            tags: vec![String::from("math")],
            nick_name: Some(String::from("Countess")),
        }
    }

    #[derive(Reflect, Debug, PartialEq, Eq, Hash, Clone, Copy)]
    enum Color {
        Red = 1,
        #[reflect(@JsonName("verde"))]
        Green = 5,
    }

    #[derive(Reflect, Debug, PartialEq)]
    struct Settings {
        title: String,
        #[reflect(default = default_retries)]
        retries: u8,
        #[reflect(default)]
        verbose: bool,
    }

    fn default_retries() -> u8 {
        3
    }

    #[derive(Reflect, Debug, PartialEq, Default)]
    #[reflect(default)]
    struct Limits {
        low: i32,
        high: i32,
    }

    #[derive(Reflect, Debug, PartialEq)]
    struct Pair(u8, String);

    #[derive(Reflect, Debug, PartialEq)]
    struct Invoice {
        #[reflect(@JsonFormat("N2"))]
        total: f64,
        #[reflect(@JsonFormat("X"))]
        code: u32,
    }

    #[derive(Reflect)]
    struct Node {
        name: String,
        next: OnceLock<Arc<Node>>,
    }

    #[derive(Reflect, Serialize, Deserialize, Debug, PartialEq, Clone)]
    #[reflect(serde, clone)]
    struct Span {
        start: u32,
        end: u32,
    }

    #[derive(Reflect, Debug, PartialEq)]
    struct Marked {
        span: Span,
    }

    #[derive(Reflect, Debug, PartialEq, Clone)]
    #[reflect(clone)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[derive(Reflect, Debug, PartialEq)]
    struct Celsius(f64);

    #[derive(Reflect, Debug, PartialEq)]
    struct Reading {
        #[reflect(@JsonConverter::new(FnConverter::for_type::<Celsius>().with_reader(|raw, _| {
            Ok(Box::new(Celsius(if raw == "\"hot\"" { 100.0 } else { 0.0 })))
        })))]
        temperature: Celsius,
    }

    #[derive(Reflect, Debug, PartialEq)]
    struct Account {
        name: String,
        #[reflect(@JsonIgnore)]
        password: String,
        #[reflect(@JsonIgnore)]
        sessions: Vec<u64>,
        logins: u32,
    }

    #[derive(Reflect, Debug, PartialEq)]
    struct Delta {
        #[reflect(@JsonFormat("X"))]
        change: i32,
        #[reflect(@JsonFormat("x"))]
        wide: i64,
    }

    fn round_trip<T: FromReflect>(config: Arc<JsonConfig>, value: &T) -> T {
        let json = JsonSerializer::new(Arc::clone(&config)).serialize(value).unwrap();
        JsonDeserializer::new(config).from_str(&json).unwrap()
    }

    #[test]
    fn plain_objects_round_trip() {
        let config = Arc::new(JsonConfig::default());
        assert_eq!(round_trip(Arc::clone(&config), &ada()), ada());

        let mut person = ada();
        person.nick_name = None;
        let config = JsonConfig::builder().omit_nulls(true).build();
        assert_eq!(round_trip(config, &person), person);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let json = r#"{
            "extra": {"a": [1, {"b": "}"}]},
            "name": "Ada",
            "age": 36,
            "tags": null,
            "more": null
        }"#;
        let person: Person = JsonDeserializer::default().from_str(json).unwrap();
        assert_eq!(person.name, "Ada");
        assert!(person.tags.is_empty());
        assert_eq!(person.nick_name, None);
    }

    #[test]
    fn missing_and_null_fields() {
        let de = JsonDeserializer::default();
        let err = de.from_str::<Person>(r#"{"name":"Ada"}"#).unwrap_err();
        match err {
            JsonError::Conversion { target, .. } => assert!(target.ends_with("Person.age")),
            other => panic!("unexpected error: {other}"),
        }

        let err = de.from_str::<Person>(r#"{"name":"Ada","age":null}"#).unwrap_err();
        assert!(matches!(err, JsonError::Nullability { type_path: "u32" }));
    }

    #[test]
    fn defaults_apply_first() {
        let de = JsonDeserializer::default();
        let settings: Settings = de.from_str(r#"{"title":"t","verbose":true}"#).unwrap();
        assert_eq!(settings.retries, 3);
        assert!(settings.verbose);

        let settings: Settings = de.from_str(r#"{"title":"t","retries":9}"#).unwrap();
        assert_eq!((settings.retries, settings.verbose), (9, false));

        let limits: Limits = de.from_str(r#"{"high":10}"#).unwrap();
        assert_eq!(limits, Limits { low: 0, high: 10 });
    }

    #[test]
    fn enums_by_name_rename_or_number() {
        let de = JsonDeserializer::default();
        assert_eq!(de.from_str::<Color>("5").unwrap(), Color::Green);
        assert_eq!(de.from_str::<Color>(r#""Red""#).unwrap(), Color::Red);
        assert_eq!(de.from_str::<Color>(r#""verde""#).unwrap(), Color::Green);
        assert!(matches!(
            de.from_str::<Color>("2").unwrap_err(),
            JsonError::Conversion { .. }
        ));

        let config = JsonConfig::builder().enum_mode(EnumMode::Name).build();
        let colors = vec![Color::Red, Color::Green];
        assert_eq!(round_trip(config, &colors), colors);
    }

    #[test]
    fn dates_in_every_mode() {
        let date = FixedOffset::west_opt(5 * 3600)
            .unwrap()
            .with_ymd_and_hms(2023, 12, 31, 23, 59, 1)
            .unwrap();
        for mode in [DateMode::Short, DateMode::Iso, DateMode::Epoch] {
            let config = JsonConfig::builder()
                .date_mode(mode)
                .short_date_offset(*date.offset())
                .build();
            let back: DateTime<FixedOffset> = round_trip(config, &date);
            assert_eq!(back, date, "{mode:?}");
        }
    }

    #[test]
    fn sequences_and_maps() {
        let config = Arc::new(JsonConfig::default());
        let bytes = vec![0_u8, 200, 17];
        assert_eq!(round_trip(Arc::clone(&config), &bytes), bytes);

        let array = [1_u16, 2, 3];
        assert_eq!(round_trip(Arc::clone(&config), &array), array);
        let err = JsonDeserializer::default().from_str::<[u16; 3]>("[1,2]").unwrap_err();
        assert!(matches!(err, JsonError::Conversion { .. }));

        let map = BTreeMap::from([(3_u64, String::from("c")), (1, String::from("a"))]);
        assert_eq!(round_trip(Arc::clone(&config), &map), map);

        let by_color = HashMap::from([(Color::Green, 2_i8)]);
        let back: HashMap<Color, i8> = JsonDeserializer::default()
            .from_str(r#"{"verde": 2}"#)
            .unwrap();
        assert_eq!(back, by_color);
    }

    #[test]
    fn tuples_from_keys_or_arrays() {
        let de = JsonDeserializer::default();
        let pair: Pair = de.from_str(r#"{"Item2":"x","Item1":1}"#).unwrap();
        assert_eq!(pair, Pair(1, String::from("x")));
        let pair: Pair = de.from_str(r#"[1, "x"]"#).unwrap();
        assert_eq!(pair, Pair(1, String::from("x")));

        let tuple = (7_i64, String::from("y"), true);
        assert_eq!(round_trip(Arc::new(JsonConfig::default()), &tuple), tuple);
    }

    #[test]
    fn formatted_numbers_read_back() {
        let invoice = Invoice {
            total: 1234.5,
            code: 255,
        };
        let json = JsonSerializer::default().serialize(&invoice).unwrap();
        assert_eq!(json, r#"{"total":"1,234.50","code":"FF"}"#);
        assert_eq!(JsonDeserializer::default().from_str::<Invoice>(&json).unwrap(), invoice);
    }

    #[test]
    fn negative_hexadecimal_numbers() {
        let delta = Delta {
            change: -1,
            wide: i64::MIN,
        };
        let json = JsonSerializer::default().serialize(&delta).unwrap();
        assert_eq!(json, r#"{"change":"FFFFFFFFFFFFFFFF","wide":"8000000000000000"}"#);
        assert_eq!(JsonDeserializer::default().from_str::<Delta>(&json).unwrap(), delta);

        let positive: Delta = JsonDeserializer::default()
            .from_str(r#"{"change":"ff","wide":"10"}"#)
            .unwrap();
        assert_eq!((positive.change, positive.wide), (255, 16));
    }

    #[test]
    fn unwritten_fields_take_empty_values() {
        let account = Account {
            name: String::from("ada"),
            password: String::from("secret"),
            sessions: vec![7],
            logins: 4,
        };
        let json = JsonSerializer::default().serialize(&account).unwrap();
        assert_eq!(json, r#"{"name":"ada","logins":4}"#);
        let back: Account = JsonDeserializer::default().from_str(&json).unwrap();
        assert_eq!(
            back,
            Account {
                name: String::from("ada"),
                password: String::new(),
                sessions: Vec::new(),
                logins: 4,
            }
        );

        let config = JsonConfig::builder().exclude(["logins"]).build();
        let json = JsonSerializer::new(Arc::clone(&config)).serialize(&account).unwrap();
        assert_eq!(json, r#"{"name":"ada"}"#);
        let back: Account = JsonDeserializer::new(config).from_str(&json).unwrap();
        assert_eq!((back.name.as_str(), back.logins), ("ada", 0));

        let config = JsonConfig::builder().include_only(["logins"]).build();
        let back: Account = JsonDeserializer::new(config)
            .from_str(r#"{"name":"x","logins":2}"#)
            .unwrap();
        assert_eq!((back.name.as_str(), back.logins), ("", 2));

        // Written properties stay required.
        let err = JsonDeserializer::default()
            .from_str::<Account>(r#"{"name":"ada"}"#)
            .unwrap_err();
        assert!(matches!(err, JsonError::Conversion { target, .. } if target.ends_with("Account.logins")));
    }

    #[test]
    fn untyped_values() {
        let value = JsonDeserializer::default()
            .deserialize_any(r#"{"a":1,"b":[true,"x",null,2.5],"c":"\/Date(0)\/"}"#)
            .unwrap();
        let record = value.downcast_ref::<DynamicStruct>().unwrap();
        assert_eq!(record.get::<i64>("a"), Some(&1));
        assert!(record.get::<DateTime<FixedOffset>>("c").is_some());

        let items = Vec::<Value>::from_reflect(record.field("b").unwrap()).unwrap();
        assert_eq!(items[0].downcast_ref::<bool>(), Some(&true));
        assert_eq!(items[1].downcast_ref::<String>().map(String::as_str), Some("x"));
        assert!(items[2].is_empty());
        assert_eq!(items[3].downcast_ref::<f64>(), Some(&2.5));

        let text = JsonSerializer::default().serialize(&value).unwrap();
        assert_eq!(text, r#"{"a":1,"b":[true,"x",null,2.5],"c":"1970-01-01T00:00:00.000+00:00"}"#);
    }

    #[test]
    fn tagged_objects_become_concrete() {
        let mut registry = TypeRegistry::new();
        registry.register::<Point>();
        let config = JsonConfig::builder()
            .registry(Arc::new(registry))
            .emit_type_tags(true)
            .build();

        let point = Point { x: 3, y: 4 };
        let json = JsonSerializer::new(Arc::clone(&config)).serialize(&point).unwrap();
        let value = JsonDeserializer::new(Arc::clone(&config)).deserialize_any(&json).unwrap();
        assert_eq!(value.downcast_ref::<Point>(), Some(&point));

        let handle: TypeHandle = JsonDeserializer::new(config).from_str(r#""Point""#).unwrap();
        assert_eq!(handle, TypeHandle::of::<Point>());

        let err = JsonDeserializer::default().from_str::<TypeHandle>(r#""Point""#).unwrap_err();
        assert!(matches!(err, JsonError::TypeResolution { .. }));
    }

    #[test]
    fn deferred_links() {
        let json = r#"{"name":"a","next":{"name":"b","next":null}}"#;
        let node: Node = JsonDeserializer::default().from_str(json).unwrap();
        let next = node.next.get().unwrap();
        assert_eq!(next.name, "b");
        assert!(next.next.get().is_none());
    }

    #[test]
    fn self_decoding_values() {
        let mut registry = TypeRegistry::new();
        registry.register::<Marked>();
        let config = JsonConfig::builder().registry(Arc::new(registry)).build();
        let marked = Marked {
            span: Span { start: 2, end: 9 },
        };
        assert_eq!(round_trip(config, &marked), marked);

        let raw: Vec<RawJson> = JsonDeserializer::default()
            .from_str(r#"[{"a": [1, "]"]}, 2]"#)
            .unwrap();
        assert_eq!(raw[0].as_str(), r#"{"a": [1, "]"]}"#);
        assert_eq!(raw[1].as_str(), "2");
    }

    #[test]
    fn converters_read_raw_values() {
        let reading: Reading = JsonDeserializer::default()
            .from_str(r#"{"temperature":"hot"}"#)
            .unwrap();
        assert_eq!(reading.temperature, Celsius(100.0));
    }

    #[test]
    fn tables_round_trip() {
        let mut table = DataTable::new("", ["name", "age"]);
        table.push_row([Value::new(String::from("Ada")), Value::new(36_i64)]);
        table.push_row([Value::new(String::from("Alan"))]);

        let json = JsonSerializer::default().serialize(&table).unwrap();
        let back: DataTable = JsonDeserializer::default().from_str(&json).unwrap();
        assert_eq!(back.columns(), ["name", "age"]);
        assert_eq!(back.get(0, "age").unwrap().downcast_ref::<i64>(), Some(&36));
        assert!(back.get(1, "age").is_none());
    }

    #[test]
    fn streams_and_grammar_errors() {
        let input = br#"{"name":"Ada","age":36,"tags":[],"nick_name":null}"#;
        let person: Person = JsonDeserializer::default().from_reader(&input[..]).unwrap();
        assert_eq!(person.age, 36);

        let err = JsonDeserializer::default()
            .from_str::<Person>("{\n  \"name\": \"Ada\",\n  \"age\" 36}")
            .unwrap_err();
        assert!(matches!(err, JsonError::Grammar { line: 3, .. }));

        let err = JsonDeserializer::default().from_str::<u8>("1 2").unwrap_err();
        assert!(matches!(err, JsonError::Grammar { .. }));
    }

    #[test]
    fn reflect_values_are_boxed_by_type() {
        let value = JsonDeserializer::default()
            .deserialize("[1, 2]", <Vec<u8>>::type_info())
            .unwrap();
        assert_eq!(<Vec<u8>>::from_reflect(value.as_ref()), Some(vec![1, 2]));
    }
}
