//! The object graph encoder.

use core::fmt::Write;
use std::io;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use og_reflect::Reflect;
use og_reflect::info::TypeInfo;
use og_reflect::ops::{Enum, List, Map, ReflectRef, ScalarRef, Struct, Tuple};
use og_reflect::registry::TypeTraitSerialize;

use crate::config::{EnumMode, JsonConfig};
use crate::context::{PropertySlot, SerializeContext};
use crate::converter::Converter;
use crate::error::{JsonError, Result};
use crate::format::{DateText, format_date, format_number, number_literal};
use crate::metadata::variant_wire_name;
use crate::raw::RawJson;
use crate::table::{DataSet, DataTable};
use crate::writer::{IoAdapter, TokenWriter};

// -----------------------------------------------------------------------------
// JsonSerializer

/// Encodes reflected values as JSON.
///
/// ```
/// use og_json::JsonSerializer;
/// use og_reflect::derive::Reflect;
///
/// #[derive(Reflect)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// let json = JsonSerializer::default().serialize(&Point { x: 1, y: -2 }).unwrap();
/// assert_eq!(json, r#"{"x":1,"y":-2}"#);
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonSerializer {
    config: Arc<JsonConfig>,
}

impl JsonSerializer {
    #[inline]
    pub fn new(config: Arc<JsonConfig>) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &Arc<JsonConfig> {
        &self.config
    }

    /// Encodes `value` into a string.
    pub fn serialize(&self, value: &dyn Reflect) -> Result<String> {
        let mut writer = TokenWriter::with_indent(String::new(), self.config.indent_width());
        self.write_value(&mut writer, value)?;
        writer.finish()
    }

    /// Encodes `value` into an I/O stream and returns the stream.
    pub fn to_writer<W: io::Write>(&self, value: &dyn Reflect, out: W) -> Result<W> {
        let mut writer = TokenWriter::with_indent(IoAdapter::new(out), self.config.indent_width());
        match self.write_value(&mut writer, value) {
            Ok(()) => {
                let mut out = writer.finish()?.into_inner();
                out.flush()?;
                Ok(out)
            }
            Err(JsonError::Fmt(err)) => {
                let mut adapter = writer.into_inner();
                Err(adapter.take_error().map_or(JsonError::Fmt(err), JsonError::Io))
            }
            Err(err) => Err(err),
        }
    }

    /// Encodes `value` as the next value of an existing writer.
    pub fn write_value<W: Write>(&self, writer: &mut TokenWriter<W>, value: &dyn Reflect) -> Result<()> {
        let mut ctx = SerializeContext::new(Arc::clone(&self.config));
        encode_value(&mut ctx, writer, value)
    }
}

// -----------------------------------------------------------------------------
// Dispatch

fn type_path_of(value: &dyn Reflect) -> &'static str {
    value
        .represented_type_info()
        .map_or_else(|| value.reflect_type_info().type_path(), TypeInfo::type_path)
}

fn is_null(value: &dyn Reflect) -> bool {
    matches!(value.reflect_ref(), ReflectRef::Optional(optional) if optional.is_none())
}

/// The converter for a value: the property's, then the type's, then the
/// first registered one.
fn select_writer(
    ctx: &mut SerializeContext,
    info: Option<&'static TypeInfo>,
) -> Option<Arc<dyn Converter>> {
    let slot = ctx.take_converter();
    if let Some(converter) = slot.filter(|converter| converter.can_write()) {
        return Some(converter);
    }
    let info = info?;
    if let Some(converter) = ctx.properties(info).converter()
        && converter.can_write()
    {
        return Some(Arc::clone(converter));
    }
    ctx.config().converters().find_writer(info).cloned()
}

/// Serde output of a type registered with `TypeTraitSerialize`.
fn serde_text(ctx: &SerializeContext, target: &dyn Reflect, info: &TypeInfo) -> Option<Result<String>> {
    let serialize = ctx
        .config()
        .registry()?
        .get_type_trait::<TypeTraitSerialize>(info.type_id())?
        .as_serialize(target)?;
    Some(serde_json::to_string(serialize).map_err(|err| JsonError::converter(info.type_path(), err)))
}

fn encode_value<W: Write>(
    ctx: &mut SerializeContext,
    w: &mut TokenWriter<W>,
    value: &dyn Reflect,
) -> Result<()> {
    let view = value.reflect_ref();

    // Absent values, and the content of present ones.
    if let ReflectRef::Optional(optional) = view {
        return match optional.value() {
            Some(inner) => encode_value(ctx, w, inner),
            None => {
                ctx.take_converter();
                w.write_null()
            }
        };
    }

    let target = view.as_reflect();
    let info = value.represented_type_info();

    if let Some(converter) = select_writer(ctx, info) {
        log::trace!("converter selected for `{}`", type_path_of(value));
        let raw = converter.write(target)?;
        return w.write_value(&raw);
    }

    if let Some(raw) = target.downcast_ref::<RawJson>() {
        return w.write_value(raw.as_str());
    }
    if let Some(info) = info
        && let Some(text) = serde_text(ctx, target, info)
    {
        return w.write_value(&text?);
    }
    if let Some(table) = target.downcast_ref::<DataTable>() {
        return encode_table(ctx, w, table);
    }
    if let Some(set) = target.downcast_ref::<DataSet>() {
        return encode_data_set(ctx, w, set);
    }

    match view {
        ReflectRef::Scalar(scalar) => encode_scalar(ctx, w, scalar.as_scalar()),
        ReflectRef::Enum(value) => encode_enum(ctx, w, value),
        ReflectRef::Struct(value) => composite(ctx, w, target, |ctx, w| encode_struct(ctx, w, value)),
        ReflectRef::Tuple(value) => composite(ctx, w, target, |ctx, w| encode_tuple(ctx, w, value)),
        ReflectRef::List(value) => composite(ctx, w, target, |ctx, w| encode_list(ctx, w, value)),
        ReflectRef::Map(value) => composite(ctx, w, target, |ctx, w| encode_map(ctx, w, value)),
        ReflectRef::Opaque(_) => Err(JsonError::converter(
            type_path_of(value),
            "opaque type has no converter",
        )),
        ReflectRef::Optional(_) => unreachable!("optionals are handled above"),
    }
}

/// Encodes a composite value with its identity on the stack.
fn composite<W: Write>(
    ctx: &mut SerializeContext,
    w: &mut TokenWriter<W>,
    target: &dyn Reflect,
    f: impl FnOnce(&mut SerializeContext, &mut TokenWriter<W>) -> Result<()>,
) -> Result<()> {
    let address = core::ptr::from_ref(target).cast::<()>() as usize;
    let identity = (address, target.ty_id());
    ctx.try_serialize(identity, type_path_of(target), |ctx| {
        ctx.with_property(PropertySlot::default(), |ctx| f(ctx, w))
    })
}

// -----------------------------------------------------------------------------
// Leaves

fn encode_scalar<W: Write>(
    ctx: &mut SerializeContext,
    w: &mut TokenWriter<W>,
    scalar: ScalarRef<'_>,
) -> Result<()> {
    match scalar {
        ScalarRef::Bool(v) => w.write_value(if v { "true" } else { "false" }),
        ScalarRef::Int(_) | ScalarRef::UInt(_) | ScalarRef::F32(_) | ScalarRef::F64(_) => {
            match ctx.format() {
                Some(format) => w.write_string(&format_number(scalar, format)?),
                None => w.write_value(&number_literal(scalar)),
            }
        }
        ScalarRef::Char(c) => w.write_string(c.encode_utf8(&mut [0; 4])),
        ScalarRef::Str(text) => w.write_string(text),
        ScalarRef::DateTime(date) => {
            match format_date(&date, ctx.config().date_mode(), ctx.format())? {
                DateText::Quoted(text) => w.write_string(&text),
                DateText::Raw(raw) => w.write_value(&raw),
            }
        }
        ScalarRef::Type(info) => {
            if ctx.config().emit_type_tags() {
                w.write_string(info.type_path())
            } else {
                w.write_null()
            }
        }
    }
}

fn encode_enum<W: Write>(
    ctx: &mut SerializeContext,
    w: &mut TokenWriter<W>,
    value: &dyn Enum,
) -> Result<()> {
    let by_name = match ctx.format() {
        Some("G" | "g") => true,
        Some("D" | "d") => false,
        _ => ctx.config().enum_mode() == EnumMode::Name,
    };
    if !by_name {
        return w.write_value(&value.discriminant().to_string());
    }
    let variant = value
        .represented_type_info()
        .and_then(|info| info.as_enum().ok())
        .and_then(|info| info.variant(value.variant_name()));
    match variant {
        Some(variant) => w.write_string(variant_wire_name(variant)),
        None => w.write_string(value.variant_name()),
    }
}

// -----------------------------------------------------------------------------
// Composites

fn encode_struct<W: Write>(
    ctx: &mut SerializeContext,
    w: &mut TokenWriter<W>,
    value: &dyn Struct,
) -> Result<()> {
    let Some(info) = value
        .represented_type_info()
        .filter(|info| info.as_struct().is_ok())
    else {
        return encode_record(ctx, w, value);
    };

    let properties = ctx.properties(info);
    let dynamic = value.is_dynamic();
    let omit_nulls = ctx.config().omit_nulls();

    w.write_start_object()?;
    if ctx.config().emit_type_tags() {
        w.write_key("$type")?;
        w.write_string(info.type_path())?;
    }
    for property in properties.iter() {
        let field = if dynamic {
            value.field(property.name())
        } else {
            value.field_at(property.index())
        };
        let Some(field) = field else {
            continue;
        };
        if ctx.config().lazy_oracle().is_unrealized(field)
            || (omit_nulls && is_null(field))
            || property.should_skip(field)
        {
            continue;
        }
        w.write_key(property.wire_name())?;
        let slot = PropertySlot {
            format: property.format(),
            converter: property.converter().cloned(),
        };
        ctx.with_property(slot, |ctx| encode_value(ctx, w, field))?;
    }
    w.write_end_object()
}

/// A struct without type information, such as a free-standing `DynamicStruct`.
fn encode_record<W: Write>(
    ctx: &mut SerializeContext,
    w: &mut TokenWriter<W>,
    value: &dyn Struct,
) -> Result<()> {
    let omit_nulls = ctx.config().omit_nulls();
    w.write_start_object()?;
    for index in 0..value.field_len() {
        let (Some(name), Some(field)) = (value.name_at(index), value.field_at(index)) else {
            continue;
        };
        if omit_nulls && is_null(field) {
            continue;
        }
        w.write_key(name)?;
        encode_value(ctx, w, field)?;
    }
    w.write_end_object()
}

fn encode_tuple<W: Write>(
    ctx: &mut SerializeContext,
    w: &mut TokenWriter<W>,
    value: &dyn Tuple,
) -> Result<()> {
    w.write_start_object()?;
    for index in 0..value.field_len() {
        if let Some(field) = value.field(index) {
            w.write_key(&format!("Item{}", index + 1))?;
            encode_value(ctx, w, field)?;
        }
    }
    w.write_end_object()
}

fn byte_items(value: &dyn List) -> Option<Vec<u8>> {
    let item_info = value.represented_type_info()?.as_list().ok()?.item_info();
    if !item_info.type_is::<u8>() {
        return None;
    }
    (0..value.len())
        .map(|index| value.get(index)?.downcast_ref::<u8>().copied())
        .collect()
}

fn encode_list<W: Write>(
    ctx: &mut SerializeContext,
    w: &mut TokenWriter<W>,
    value: &dyn List,
) -> Result<()> {
    if let Some(bytes) = byte_items(value) {
        return w.write_string(&STANDARD.encode(bytes));
    }
    w.write_start_array()?;
    for item in value.iter() {
        encode_value(ctx, w, item)?;
    }
    w.write_end_array()
}

/// The text of a map key.
pub(crate) fn key_text(key: &dyn Reflect) -> Result<String> {
    match key.reflect_ref() {
        ReflectRef::Scalar(scalar) => Ok(scalar.as_scalar().to_string()),
        ReflectRef::Enum(value) => Ok(value
            .represented_type_info()
            .and_then(|info| info.as_enum().ok())
            .and_then(|info| info.variant(value.variant_name()))
            .map_or_else(|| value.variant_name().to_owned(), |v| variant_wire_name(v).to_owned())),
        _ => Err(JsonError::conversion(
            format!("{key:?}"),
            "map key of string, number, boolean, date or enum",
        )),
    }
}

fn encode_map<W: Write>(
    ctx: &mut SerializeContext,
    w: &mut TokenWriter<W>,
    value: &dyn Map,
) -> Result<()> {
    let omit_nulls = ctx.config().omit_nulls();
    w.write_start_object()?;
    for (key, item) in value.iter() {
        if omit_nulls && is_null(item) {
            continue;
        }
        w.write_key(&key_text(key)?)?;
        encode_value(ctx, w, item)?;
    }
    w.write_end_object()
}

fn encode_table<W: Write>(
    ctx: &mut SerializeContext,
    w: &mut TokenWriter<W>,
    table: &DataTable,
) -> Result<()> {
    let omit_nulls = ctx.config().omit_nulls();
    w.write_start_array()?;
    for row in table.rows() {
        w.write_start_object()?;
        for (column, cell) in table.columns().iter().zip(row) {
            if omit_nulls && cell.is_empty() {
                continue;
            }
            w.write_key(column)?;
            encode_value(ctx, w, cell)?;
        }
        w.write_end_object()?;
    }
    w.write_end_array()
}

fn encode_data_set<W: Write>(
    ctx: &mut SerializeContext,
    w: &mut TokenWriter<W>,
    set: &DataSet,
) -> Result<()> {
    w.write_start_object()?;
    for table in set.tables() {
        w.write_key(table.name())?;
        encode_table(ctx, w, table)?;
    }
    w.write_end_object()
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::{Arc, OnceLock};

    use chrono::{FixedOffset, TimeZone};
    use og_reflect::derive::Reflect;
    use og_reflect::ops::DynamicStruct;
    use og_reflect::registry::TypeRegistry;
    use og_reflect::{TypeHandle, Value};
    use serde::{Deserialize, Serialize};

    use super::JsonSerializer;
    use crate::attributes::{JsonConverter, JsonFormat};
    use crate::config::{DateMode, EnumMode, JsonConfig, NamingPolicy};
    use crate::converter::FnConverter;
    use crate::error::JsonError;
    use crate::raw::RawJson;

    #[derive(Reflect)]
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
            nick_name: None,
        }
    }

    #[derive(Reflect, Clone, Copy)]
    enum Color {
        Red = 1,
        Green = 5,
    }

    #[derive(Reflect)]
    struct Paint {
        color: Color,
        #[reflect(@JsonFormat("G"))]
        named: Color,
    }

    #[derive(Reflect)]
    struct Node {
        name: String,
        next: OnceLock<Arc<Node>>,
    }

    #[derive(Reflect, Serialize, Deserialize, Clone)]
    #[reflect(serde, clone)]
    struct Span {
        start: u32,
        end: u32,
    }

    #[derive(Reflect)]
    struct Marked {
        span: Span,
    }

    #[derive(Reflect)]
    #[reflect(@JsonConverter::new(FnConverter::for_type::<Celsius>().with_writer(|_| Ok("\"type\"".to_owned()))))]
    struct Celsius(f64);

    #[derive(Reflect)]
    struct Reading {
        plain: Celsius,
        #[reflect(@JsonConverter::new(FnConverter::for_type::<Celsius>().with_writer(|_| Ok("\"field\"".to_owned()))))]
        custom: Celsius,
        count: u8,
    }

    #[test]
    fn plain_objects() {
        let json = JsonSerializer::default().serialize(&ada()).unwrap();
        assert_eq!(json, r#"{"name":"Ada","age":36,"tags":["math"],"nick_name":null}"#);

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["age"], 36);
    }

    #[test]
    fn null_omission_and_naming() {
        let config = JsonConfig::builder()
            .omit_nulls(true)
            .naming(NamingPolicy::CamelCase)
            .build();
        let json = JsonSerializer::new(config).serialize(&ada()).unwrap();
        assert_eq!(json, r#"{"name":"Ada","age":36,"tags":["math"]}"#);

        let mut person = ada();
        person.nick_name = Some(String::from("Countess"));
        let config = JsonConfig::builder().naming(NamingPolicy::CamelCase).build();
        let json = JsonSerializer::new(config).serialize(&person).unwrap();
        assert!(json.ends_with(r#""nickName":"Countess"}"#));
    }

    #[test]
    fn indentation() {
        let config = JsonConfig::builder().indent_width(2).build();
        let json = JsonSerializer::new(config)
            .serialize(&vec![vec![1_u32], vec![]])
            .unwrap();
        assert_eq!(json, "[\n  [\n    1\n  ],\n  []\n]");
    }

    #[test]
    fn enums() {
        let paint = Paint {
            color: Color::Green,
            named: Color::Red,
        };
        let json = JsonSerializer::default().serialize(&paint).unwrap();
        assert_eq!(json, r#"{"color":5,"named":"Red"}"#);

        let config = JsonConfig::builder().enum_mode(EnumMode::Name).build();
        let json = JsonSerializer::new(config).serialize(&paint).unwrap();
        assert_eq!(json, r#"{"color":"Green","named":"Red"}"#);
    }

    #[test]
    fn bytes_tuples_and_maps() {
        let serializer = JsonSerializer::default();
        assert_eq!(serializer.serialize(&vec![1_u8, 2, 3]).unwrap(), r#""AQID""#);
        assert_eq!(
            serializer.serialize(&(1_i32, String::from("a"))).unwrap(),
            r#"{"Item1":1,"Item2":"a"}"#
        );

        let map = BTreeMap::from([(2_u32, true), (10_u32, false)]);
        assert_eq!(serializer.serialize(&map).unwrap(), r#"{"2":true,"10":false}"#);
    }

    #[test]
    fn dynamic_records_keep_insertion_order() {
        let mut record = DynamicStruct::new();
        record.insert("z", 1_i64);
        record.insert("a", String::from("x"));
        record.insert("none", Value::empty());

        let json = JsonSerializer::default().serialize(&record).unwrap();
        assert_eq!(json, r#"{"z":1,"a":"x","none":null}"#);
    }

    #[test]
    fn cycles_fail_fast() {
        let node = Arc::new(Node {
            name: String::from("loop"),
            next: OnceLock::new(),
        });
        assert!(node.next.set(Arc::clone(&node)).is_ok());

        let err = JsonSerializer::default().serialize(&*node).unwrap_err();
        assert!(matches!(err, JsonError::Cycle { .. }));

        // Shared but acyclic nodes are fine.
        let leaf = Arc::new(Node {
            name: String::from("leaf"),
            next: OnceLock::new(),
        });
        let pair = vec![Arc::clone(&leaf), leaf];
        let json = JsonSerializer::default().serialize(&pair).unwrap();
        assert_eq!(json, r#"[{"name":"leaf"},{"name":"leaf"}]"#);
    }

    #[test]
    fn type_tags() {
        let config = JsonConfig::builder().emit_type_tags(true).build();
        let json = JsonSerializer::new(config).serialize(&Span { start: 1, end: 2 }).unwrap();
        assert!(json.starts_with(r#"{"$type":""#));

        let handle = TypeHandle::of::<u32>();
        assert_eq!(JsonSerializer::default().serialize(&handle).unwrap(), "null");
        let config = JsonConfig::builder().emit_type_tags(true).build();
        assert_eq!(JsonSerializer::new(config).serialize(&handle).unwrap(), r#""u32""#);
    }

    #[test]
    fn date_modes() {
        let date = FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 9, 14, 5, 7)
            .unwrap();
        let encode = |mode| {
            let config = JsonConfig::builder().date_mode(mode).build();
            JsonSerializer::new(config).serialize(&date).unwrap()
        };
        assert_eq!(encode(DateMode::Iso), r#""2024-03-09T14:05:07.000+02:00""#);
        assert_eq!(encode(DateMode::Short), r#""2024-03-09 14:05:07""#);
        assert_eq!(encode(DateMode::Epoch), r#""\/Date(1709985907000+0200)\/""#);
    }

    #[test]
    fn converter_precedence() {
        let reading = Reading {
            plain: Celsius(1.0),
            custom: Celsius(2.0),
            count: 3,
        };
        let config = JsonConfig::builder()
            .converter(FnConverter::for_type::<u8>().with_writer(|_| Ok("\"registry\"".to_owned())))
            .build();
        let json = JsonSerializer::new(config).serialize(&reading).unwrap();
        assert_eq!(json, r#"{"plain":"type","custom":"field","count":"registry"}"#);
    }

    #[test]
    fn self_serializing_values() {
        let mut registry = TypeRegistry::new();
        registry.register::<Marked>();
        let config = JsonConfig::builder().registry(Arc::new(registry)).build();
        let marked = Marked {
            span: Span { start: 3, end: 8 },
        };
        let json = JsonSerializer::new(config).serialize(&marked).unwrap();
        assert_eq!(json, r#"{"span":{"start":3,"end":8}}"#);

        let raw = vec![RawJson::new(r#"{"pre":[1]}"#), RawJson::new("2")];
        assert_eq!(
            JsonSerializer::default().serialize(&raw).unwrap(),
            r#"[{"pre":[1]},2]"#
        );
    }

    #[test]
    fn opaque_values_need_a_converter() {
        #[derive(Reflect, Clone)]
        #[reflect(opaque, clone)]
        struct Handle(u64);

        let err = JsonSerializer::default().serialize(&Handle(1)).unwrap_err();
        assert!(matches!(err, JsonError::Converter { .. }));
    }

    #[test]
    fn non_finite_floats_are_quoted() {
        let json = JsonSerializer::default()
            .serialize(&vec![f64::NAN, f64::NEG_INFINITY, 0.5])
            .unwrap();
        assert_eq!(json, r#"["NaN","-Infinity",0.5]"#);
    }

    #[test]
    fn encoding_is_idempotent_and_streams() {
        let serializer = JsonSerializer::default();
        let first = serializer.serialize(&ada()).unwrap();
        assert_eq!(first, serializer.serialize(&ada()).unwrap());

        let bytes = serializer.to_writer(&ada(), Vec::new()).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), first);
    }
}
