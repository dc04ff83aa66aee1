use core::fmt;

use crate::Reflect;
use crate::ops::{ReflectRef, ScalarRef};

/// An efficient string concatenation function.
///
/// This is usually used for the implementation of `TypePath`.
///
/// ```
/// use og_reflect::impls;
///
/// let s = impls::concat(&["module", "::", "name", "<", "T", ">"]);
/// assert_eq!(s, "module::name<T>");
/// assert_eq!(s.capacity(), 15);
/// ```
#[inline(never)]
pub fn concat(arr: &[&str]) -> String {
    let len = arr.iter().map(|item| item.len()).sum();
    let mut res = String::with_capacity(len);
    for &item in arr {
        res.push_str(item);
    }
    res
}

/// Structural equality of two reflected values.
///
/// # Rules
///
/// 1. Values of different kinds are unequal.
/// 2. Containers compare their length, then every element.
///    Structs compare by field name, maps by structurally equal keys.
/// 3. Enums compare by variant name, scalars by [`ScalarRef`] equality.
/// 4. Opaque values cannot be compared and return `None`.
#[inline(never)]
pub fn reflect_partial_eq(x: ReflectRef<'_>, y: ReflectRef<'_>) -> Option<bool> {
    fn eq(a: &dyn Reflect, b: &dyn Reflect) -> bool {
        a.reflect_partial_eq(b) == Some(true)
    }

    let result = match (x, y) {
        (ReflectRef::Struct(x), ReflectRef::Struct(y)) => {
            x.field_len() == y.field_len()
                && x.iter_fields()
                    .all(|(name, a)| y.field(name).is_some_and(|b| eq(a, b)))
        }
        (ReflectRef::Tuple(x), ReflectRef::Tuple(y)) => {
            x.field_len() == y.field_len()
                && x.iter_fields().zip(y.iter_fields()).all(|(a, b)| eq(a, b))
        }
        (ReflectRef::List(x), ReflectRef::List(y)) => {
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(a, b)| eq(a, b))
        }
        (ReflectRef::Map(x), ReflectRef::Map(y)) => {
            x.len() == y.len() && x.iter().all(|(k, a)| y.get(k).is_some_and(|b| eq(a, b)))
        }
        (ReflectRef::Enum(x), ReflectRef::Enum(y)) => x.variant_name() == y.variant_name(),
        (ReflectRef::Optional(x), ReflectRef::Optional(y)) => match (x.value(), y.value()) {
            (None, None) => true,
            (Some(a), Some(b)) => eq(a, b),
            _ => false,
        },
        (ReflectRef::Scalar(x), ReflectRef::Scalar(y)) => x.as_scalar() == y.as_scalar(),
        (ReflectRef::Opaque(_), _) | (_, ReflectRef::Opaque(_)) => return None,
        _ => false,
    };
    Some(result)
}

/// Debug formatting of a reflected value.
///
/// Lists, maps and tuples use the standard debug builders; structs and
/// tuple structs are prefixed with `type_name`.
#[inline(never)]
pub fn reflect_debug(
    value: ReflectRef<'_>,
    type_name: &str,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    match value {
        ReflectRef::Struct(value) => {
            let mut debug = f.debug_struct(type_name);
            for (name, field) in value.iter_fields() {
                debug.field(name, &field as &dyn fmt::Debug);
            }
            debug.finish()
        }
        ReflectRef::Tuple(value) => {
            let name = if type_name.starts_with('(') {
                ""
            } else {
                type_name
            };
            let mut debug = f.debug_tuple(name);
            for field in value.iter_fields() {
                debug.field(&field as &dyn fmt::Debug);
            }
            debug.finish()
        }
        ReflectRef::List(value) => {
            let mut debug = f.debug_list();
            for item in value.iter() {
                debug.entry(&item as &dyn fmt::Debug);
            }
            debug.finish()
        }
        ReflectRef::Map(value) => {
            let mut debug = f.debug_map();
            for (key, item) in value.iter() {
                debug.entry(&key as &dyn fmt::Debug, &item as &dyn fmt::Debug);
            }
            debug.finish()
        }
        ReflectRef::Enum(value) => f.write_str(value.variant_name()),
        ReflectRef::Optional(value) => match value.value() {
            Some(inner) => f.debug_tuple("Some").field(&inner as &dyn fmt::Debug).finish(),
            None => f.write_str("None"),
        },
        ReflectRef::Scalar(value) => match value.as_scalar() {
            ScalarRef::Str(s) => fmt::Debug::fmt(s, f),
            ScalarRef::Char(c) => fmt::Debug::fmt(&c, f),
            ScalarRef::F32(v) => fmt::Debug::fmt(&v, f),
            ScalarRef::F64(v) => fmt::Debug::fmt(&v, f),
            other => fmt::Display::fmt(&other, f),
        },
        ReflectRef::Opaque(_) => write!(f, "{type_name}(..)"),
    }
}
