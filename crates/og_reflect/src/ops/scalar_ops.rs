use core::{error, fmt};

use chrono::{DateTime, FixedOffset};

use crate::Reflect;
use crate::info::TypeInfo;

// -----------------------------------------------------------------------------
// ScalarRef

/// A borrowed view of a scalar value.
///
/// Integers are widened to `i64`/`u64`; `u64` is only used for values that
/// do not fit `i64` or come from unsigned types.
#[derive(Debug, Clone, Copy)]
pub enum ScalarRef<'a> {
    Bool(bool),
    Int(i64),
    UInt(u64),
    F32(f32),
    F64(f64),
    Char(char),
    Str(&'a str),
    DateTime(DateTime<FixedOffset>),
    Type(&'static TypeInfo),
}

impl ScalarRef<'_> {
    /// Converts the view into an owned [`ScalarValue`].
    pub fn to_value(&self) -> ScalarValue {
        match *self {
            Self::Bool(v) => ScalarValue::Bool(v),
            Self::Int(v) => ScalarValue::Int(v),
            Self::UInt(v) => ScalarValue::UInt(v),
            Self::F32(v) => ScalarValue::F32(v),
            Self::F64(v) => ScalarValue::F64(v),
            Self::Char(v) => ScalarValue::Char(v),
            Self::Str(v) => ScalarValue::Str(v.to_owned()),
            Self::DateTime(v) => ScalarValue::DateTime(v),
            Self::Type(v) => ScalarValue::Type(v),
        }
    }

    /// Returns the value as `f64` if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Int(v) => Some(v as f64),
            Self::UInt(v) => Some(v as f64),
            Self::F32(v) => Some(v as f64),
            Self::F64(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the value as `i128` if it is an integer.
    pub fn as_i128(&self) -> Option<i128> {
        match *self {
            Self::Int(v) => Some(v as i128),
            Self::UInt(v) => Some(v as i128),
            _ => None,
        }
    }
}

impl PartialEq for ScalarRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        use ScalarRef::*;
        match (*self, *other) {
            (Bool(a), Bool(b)) => a == b,
            (Char(a), Char(b)) => a == b,
            (Str(a), Str(b)) => a == b,
            (DateTime(a), DateTime(b)) => a == b,
            (Type(a), Type(b)) => a.type_id() == b.type_id(),
            (Int(_) | UInt(_), Int(_) | UInt(_)) => self.as_i128() == other.as_i128(),
            (F32(a), F32(b)) => a == b,
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl fmt::Display for ScalarRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => fmt::Display::fmt(v, f),
            Self::Int(v) => fmt::Display::fmt(v, f),
            Self::UInt(v) => fmt::Display::fmt(v, f),
            Self::F32(v) => fmt::Display::fmt(v, f),
            Self::F64(v) => fmt::Display::fmt(v, f),
            Self::Char(v) => fmt::Display::fmt(v, f),
            Self::Str(v) => f.write_str(v),
            Self::DateTime(v) => f.write_str(&v.to_rfc3339()),
            Self::Type(v) => f.write_str(v.type_path()),
        }
    }
}

// -----------------------------------------------------------------------------
// ScalarValue

/// An owned scalar value, the input of [`FromScalar`].
#[derive(Debug, Clone)]
pub enum ScalarValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    F32(f32),
    F64(f64),
    Char(char),
    Str(String),
    DateTime(DateTime<FixedOffset>),
    Type(&'static TypeInfo),
}

impl ScalarValue {
    #[inline]
    pub fn as_ref(&self) -> ScalarRef<'_> {
        match self {
            Self::Bool(v) => ScalarRef::Bool(*v),
            Self::Int(v) => ScalarRef::Int(*v),
            Self::UInt(v) => ScalarRef::UInt(*v),
            Self::F32(v) => ScalarRef::F32(*v),
            Self::F64(v) => ScalarRef::F64(*v),
            Self::Char(v) => ScalarRef::Char(*v),
            Self::Str(v) => ScalarRef::Str(v),
            Self::DateTime(v) => ScalarRef::DateTime(*v),
            Self::Type(v) => ScalarRef::Type(v),
        }
    }

    /// Creates the error for a failed conversion of this value into `target`.
    #[inline]
    pub fn error(&self, target: &'static str) -> ScalarError {
        ScalarError {
            value: self.as_ref().to_string(),
            target,
        }
    }

    /// Interprets the value as an integer.
    ///
    /// Integral floats and numeric strings are accepted.
    pub fn to_integer(&self) -> Option<i128> {
        match self {
            Self::Int(v) => Some(*v as i128),
            Self::UInt(v) => Some(*v as i128),
            Self::F32(v) => integral(*v as f64),
            Self::F64(v) => integral(*v),
            Self::Str(s) => {
                let s = s.trim();
                s.parse::<i128>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(integral))
            }
            _ => None,
        }
    }

    /// Interprets the value as a float.
    ///
    /// Strings are parsed, including `NaN` and `Infinity`.
    pub fn to_float(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::UInt(v) => Some(*v as f64),
            Self::F32(v) => Some(*v as f64),
            Self::F64(v) => Some(*v),
            Self::Str(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }
}

fn integral(v: f64) -> Option<i128> {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1.7e38 {
        Some(v as i128)
    } else {
        None
    }
}

// -----------------------------------------------------------------------------
// Scalar

/// A reflected value with a primitive representation.
pub trait Scalar: Reflect {
    /// Returns a borrowed view of the value.
    fn as_scalar(&self) -> ScalarRef<'_>;
}

/// Construction of a scalar type from any compatible [`ScalarValue`].
///
/// Decoders read text into the closest scalar representation and leave
/// the final narrowing to the target type.
pub trait FromScalar: Sized {
    fn from_scalar(value: ScalarValue) -> Result<Self, ScalarError>;
}

// -----------------------------------------------------------------------------
// ScalarError

/// A scalar value that does not fit the target type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarError {
    /// The textual form of the offending value.
    pub value: String,
    /// Path of the target type.
    pub target: &'static str,
}

impl fmt::Display for ScalarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot convert `{}` to `{}`", self.value, self.target)
    }
}

impl error::Error for ScalarError {}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{ScalarRef, ScalarValue};

    #[test]
    fn numeric_views_compare_across_widths() {
        assert_eq!(ScalarRef::Int(3), ScalarRef::UInt(3));
        assert_eq!(ScalarRef::Int(3), ScalarRef::F64(3.0));
        assert_ne!(ScalarRef::Int(-1), ScalarRef::UInt(u64::MAX));
        assert_ne!(ScalarRef::Str("1"), ScalarRef::Int(1));
    }

    #[test]
    fn integer_interpretation() {
        assert_eq!(ScalarValue::F64(4.0).to_integer(), Some(4));
        assert_eq!(ScalarValue::F64(4.5).to_integer(), None);
        assert_eq!(ScalarValue::Str(" 12 ".into()).to_integer(), Some(12));
        assert_eq!(ScalarValue::Str("1e3".into()).to_integer(), Some(1000));
        assert_eq!(ScalarValue::Bool(true).to_integer(), None);
    }

    #[test]
    fn float_interpretation() {
        assert!(ScalarValue::Str("NaN".into()).to_float().unwrap().is_nan());
        assert_eq!(
            ScalarValue::Str("-Infinity".into()).to_float(),
            Some(f64::NEG_INFINITY)
        );
        assert_eq!(ScalarValue::UInt(7).to_float(), Some(7.0));
    }
}
