//! Text forms of numbers and dates.

use core::fmt::Write;

use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, TimeZone};
use og_reflect::ops::{ScalarRef, ScalarValue};

use crate::config::DateMode;
use crate::error::{JsonError, Result};

const SHORT_DATE: &str = "%Y-%m-%d %H:%M:%S";

// -----------------------------------------------------------------------------
// Numbers

/// Returns the JSON literal of a float, or the quoted name of a non-finite one.
pub fn float_literal(value: f64) -> String {
    if value.is_nan() {
        "\"NaN\"".to_owned()
    } else if value.is_infinite() {
        if value > 0.0 { "\"Infinity\"" } else { "\"-Infinity\"" }.to_owned()
    } else {
        format!("{value:?}")
    }
}

fn f32_literal(value: f32) -> String {
    if value.is_finite() {
        format!("{value:?}")
    } else {
        float_literal(value as f64)
    }
}

/// Returns the JSON literal of a numeric scalar.
pub fn number_literal(scalar: ScalarRef<'_>) -> String {
    match scalar {
        ScalarRef::F32(v) => f32_literal(v),
        ScalarRef::F64(v) => float_literal(v),
        other => other.to_string(),
    }
}

/// Splits `F2` into `('F', Some(2))`.
fn split_format(format: &str) -> Result<(char, Option<usize>)> {
    let mut chars = format.chars();
    let letter = chars.next().ok_or_else(|| JsonError::conversion(format, "number format"))?;
    let digits = chars.as_str();
    if digits.is_empty() {
        return Ok((letter, None));
    }
    digits
        .parse::<usize>()
        .map(|precision| (letter, Some(precision)))
        .map_err(|_| JsonError::conversion(format, "number format"))
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, c) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// `1.5e3` becomes `1.500000E+003`.
fn exponent(value: f64, precision: usize, upper: bool) -> String {
    let text = format!("{value:.precision$e}");
    let (mantissa, exp) = text.split_once('e').unwrap_or((&text, "0"));
    let (sign, exp) = match exp.strip_prefix('-') {
        Some(exp) => ('-', exp),
        None => ('+', exp),
    };
    let e = if upper { 'E' } else { 'e' };
    format!("{mantissa}{e}{sign}{exp:0>3}")
}

/// Formats a numeric scalar with a format string; the result is unquoted.
///
/// | Format | Meaning | `1234.5` |
/// |---|---|---|
/// | `F<n>` | fixed, `n` decimals (2) | `1234.50` |
/// | `N<n>` | grouped, `n` decimals (2) | `1,234.50` |
/// | `D<n>` | integer, zero-padded to `n` digits | |
/// | `X<n>`, `x<n>` | integer, hexadecimal | |
/// | `E<n>`, `e<n>` | exponent, `n` decimals (6) | `1.234500E+003` |
pub fn format_number(scalar: ScalarRef<'_>, format: &str) -> Result<String> {
    let (letter, precision) = split_format(format)?;
    let integer = scalar.as_i128();
    let float = scalar
        .as_f64()
        .ok_or_else(|| JsonError::conversion(scalar.to_string(), "number"))?;
    let not_integer = || JsonError::conversion(scalar.to_string(), format!("integer format `{format}`"));

    Ok(match letter {
        'F' | 'f' => {
            let precision = precision.unwrap_or(2);
            format!("{float:.precision$}")
        }
        'N' | 'n' => {
            let precision = precision.unwrap_or(2);
            let fixed = format!("{:.precision$}", float.abs());
            let (whole, fraction) = match fixed.split_once('.') {
                Some((whole, fraction)) => (whole, Some(fraction)),
                None => (fixed.as_str(), None),
            };
            let mut out = String::new();
            if float < 0.0 {
                out.push('-');
            }
            out.push_str(&group_thousands(whole));
            if let Some(fraction) = fraction {
                out.push('.');
                out.push_str(fraction);
            }
            out
        }
        'D' | 'd' => {
            let value = integer.ok_or_else(not_integer)?;
            let width = precision.unwrap_or(0);
            let sign = if value < 0 { "-" } else { "" };
            format!("{sign}{:0>width$}", value.unsigned_abs())
        }
        'X' | 'x' => {
            let value = integer.ok_or_else(not_integer)?;
            let width = precision.unwrap_or(0);
            // Negative values print as 64-bit two's complement.
            let bits = value as i64 as u64;
            let bits = if value > i64::MAX as i128 { value as u64 } else { bits };
            if letter == 'X' {
                format!("{bits:0>width$X}")
            } else {
                format!("{bits:0>width$x}")
            }
        }
        'E' | 'e' => exponent(float, precision.unwrap_or(6), letter == 'E'),
        _ => return Err(JsonError::conversion(format, "number format")),
    })
}

/// Whether `format` writes integers as hexadecimal.
///
/// Hexadecimal text is the 64-bit two's complement of the value, so signed
/// targets read it back as `bits as i64`.
#[inline]
pub fn is_hex_format(format: Option<&str>) -> bool {
    matches!(format.and_then(|format| format.chars().next()), Some('X' | 'x'))
}

/// Reads back text written by [`format_number`], or a quoted plain number.
pub fn parse_number(text: &str, format: Option<&str>) -> Result<ScalarValue> {
    let text = text.trim();
    if let Some(letter @ ('X' | 'x')) = format.and_then(|format| format.chars().next()) {
        return u64::from_str_radix(text, 16)
            .map(ScalarValue::UInt)
            .map_err(|_| JsonError::conversion(text, format!("hexadecimal `{letter}`")));
    }
    let cleaned: String = text.chars().filter(|&c| c != ',').collect();
    number_from_literal(&cleaned).ok_or_else(|| JsonError::conversion(text, "number"))
}

/// Parses a JSON number literal into the narrowest fitting scalar.
pub fn number_from_literal(text: &str) -> Option<ScalarValue> {
    if let Ok(v) = text.parse::<i64>() {
        return Some(ScalarValue::Int(v));
    }
    if let Ok(v) = text.parse::<u64>() {
        return Some(ScalarValue::UInt(v));
    }
    text.parse::<f64>().ok().map(ScalarValue::F64)
}

// -----------------------------------------------------------------------------
// Dates

/// The encoded form of a date: quoted text, or a complete raw token.
#[derive(Debug, PartialEq, Eq)]
pub enum DateText {
    Quoted(String),
    Raw(String),
}

fn epoch_offset(date: &DateTime<FixedOffset>) -> String {
    let seconds = date.offset().local_minus_utc();
    let sign = if seconds < 0 { '-' } else { '+' };
    let minutes = seconds.unsigned_abs() / 60;
    format!("{sign}{:02}{:02}", minutes / 60, minutes % 60)
}

/// Formats a date under a mode, or under a strftime pattern when given.
pub fn format_date(
    date: &DateTime<FixedOffset>,
    mode: DateMode,
    pattern: Option<&str>,
) -> Result<DateText> {
    if let Some(pattern) = pattern {
        let mut out = String::new();
        write!(out, "{}", date.format(pattern))
            .map_err(|_| JsonError::conversion(pattern, "date format"))?;
        return Ok(DateText::Quoted(out));
    }
    Ok(match mode {
        DateMode::Short => DateText::Quoted(date.format(SHORT_DATE).to_string()),
        DateMode::Iso => DateText::Quoted(date.to_rfc3339_opts(SecondsFormat::Millis, false)),
        DateMode::Epoch => DateText::Raw(format!(
            "\"\\/Date({}{})\\/\"",
            date.timestamp_millis(),
            epoch_offset(date)
        )),
    })
}

/// Returns `true` for the decoded form of an `Epoch` date, `/Date(..)/`.
pub fn is_epoch_date(text: &str) -> bool {
    text.starts_with("/Date(") && text.ends_with(")/")
}

fn parse_epoch(text: &str) -> Option<DateTime<FixedOffset>> {
    let inner = text.strip_prefix("/Date(")?.strip_suffix(")/")?;
    let split = inner
        .char_indices()
        .skip(1)
        .find(|&(_, c)| c == '+' || c == '-')
        .map_or(inner.len(), |(index, _)| index);
    let (millis, offset) = inner.split_at(split);
    let millis = millis.parse::<i64>().ok()?;

    let offset = if offset.is_empty() {
        FixedOffset::east_opt(0)?
    } else {
        let sign = if offset.starts_with('-') { -1 } else { 1 };
        let digits = &offset[1..];
        if digits.len() != 4 {
            return None;
        }
        let hours = digits[..2].parse::<i32>().ok()?;
        let minutes = digits[2..].parse::<i32>().ok()?;
        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))?
    };
    Some(DateTime::from_timestamp_millis(millis)?.with_timezone(&offset))
}

fn parse_local(text: &str, pattern: &str, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    let naive = NaiveDateTime::parse_from_str(text, pattern).ok()?;
    offset.from_local_datetime(&naive).single()
}

/// Reads a date in any of the encoded forms.
///
/// The property pattern is tried first, then the epoch form, RFC 3339, the
/// short form in `short_offset`, and finally integer milliseconds.
pub fn parse_date(
    text: &str,
    pattern: Option<&str>,
    short_offset: FixedOffset,
) -> Result<DateTime<FixedOffset>> {
    let text = text.trim();
    let parsed = pattern
        .and_then(|pattern| {
            DateTime::parse_from_str(text, pattern)
                .ok()
                .or_else(|| parse_local(text, pattern, short_offset))
        })
        .or_else(|| parse_epoch(text))
        .or_else(|| DateTime::parse_from_rfc3339(text).ok())
        .or_else(|| parse_local(text, SHORT_DATE, short_offset))
        .or_else(|| {
            let millis = text.parse::<i64>().ok()?;
            Some(DateTime::from_timestamp_millis(millis)?.fixed_offset())
        });
    parsed.ok_or_else(|| JsonError::conversion(text, "chrono::DateTime<chrono::FixedOffset>"))
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use chrono::{DateTime, FixedOffset, TimeZone};
    use og_reflect::ops::{ScalarRef, ScalarValue};

    use super::{DateText, float_literal, format_date, format_number, is_hex_format, parse_date, parse_number};
    use crate::config::DateMode;

    fn sample_date() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 9, 14, 5, 7)
            .unwrap()
    }

    #[test]
    fn number_formats() {
        let v = ScalarRef::F64(1234.5);
        assert_eq!(format_number(v, "F2").unwrap(), "1234.50");
        assert_eq!(format_number(v, "F").unwrap(), "1234.50");
        assert_eq!(format_number(v, "N1").unwrap(), "1,234.5");
        assert_eq!(format_number(ScalarRef::F64(-1234567.0), "N0").unwrap(), "-1,234,567");
        assert_eq!(format_number(v, "E2").unwrap(), "1.23E+003");
        assert_eq!(format_number(ScalarRef::F64(0.0015), "e1").unwrap(), "1.5e-003");
        assert_eq!(format_number(ScalarRef::Int(42), "D5").unwrap(), "00042");
        assert_eq!(format_number(ScalarRef::Int(-42), "D4").unwrap(), "-0042");
        assert_eq!(format_number(ScalarRef::UInt(255), "X").unwrap(), "FF");
        assert_eq!(format_number(ScalarRef::Int(255), "x4").unwrap(), "00ff");
        assert_eq!(format_number(ScalarRef::Int(-1), "X").unwrap(), "FFFFFFFFFFFFFFFF");
        assert!(format_number(v, "D2").is_err());
        assert!(format_number(v, "Q").is_err());
    }

    #[test]
    fn numbers_read_back() {
        assert!(matches!(parse_number("1,234.50", Some("N2")), Ok(ScalarValue::F64(v)) if v == 1234.5));
        assert!(matches!(parse_number("00042", Some("D5")), Ok(ScalarValue::Int(42))));
        assert!(matches!(parse_number("FF", Some("X")), Ok(ScalarValue::UInt(255))));
        assert!(matches!(
            parse_number("FFFFFFFFFFFFFFFF", Some("X")),
            Ok(ScalarValue::UInt(u64::MAX))
        ));
        assert!(is_hex_format(Some("x8")));
        assert!(!is_hex_format(Some("N2")) && !is_hex_format(None));
        assert!(matches!(parse_number("1.23E+003", Some("E2")), Ok(ScalarValue::F64(v)) if v == 1230.0));
        assert!(matches!(parse_number("Infinity", None), Ok(ScalarValue::F64(v)) if v.is_infinite()));
        assert!(parse_number("abc", None).is_err());
    }

    #[test]
    fn non_finite_floats_are_quoted() {
        assert_eq!(float_literal(f64::NAN), "\"NaN\"");
        assert_eq!(float_literal(f64::NEG_INFINITY), "\"-Infinity\"");
        assert_eq!(float_literal(2.0), "2.0");
    }

    #[test]
    fn date_modes() {
        let date = sample_date();
        assert_eq!(
            format_date(&date, DateMode::Short, None).unwrap(),
            DateText::Quoted("2024-03-09 14:05:07".to_owned())
        );
        assert_eq!(
            format_date(&date, DateMode::Iso, None).unwrap(),
            DateText::Quoted("2024-03-09T14:05:07.000+02:00".to_owned())
        );
        assert_eq!(
            format_date(&date, DateMode::Epoch, None).unwrap(),
            DateText::Raw(r#""\/Date(1709985907000+0200)\/""#.to_owned())
        );
        assert_eq!(
            format_date(&date, DateMode::Iso, Some("%d.%m.%Y")).unwrap(),
            DateText::Quoted("09.03.2024".to_owned())
        );
    }

    #[test]
    fn dates_read_back() {
        let date = sample_date();
        let offset = *date.offset();
        assert_eq!(parse_date("/Date(1709985907000+0200)/", None, offset).unwrap(), date);
        assert_eq!(parse_date("2024-03-09T14:05:07.000+02:00", None, offset).unwrap(), date);
        assert_eq!(parse_date("2024-03-09 14:05:07", None, offset).unwrap(), date);
        assert_eq!(parse_date("09.03.2024 14:05:07", Some("%d.%m.%Y %H:%M:%S"), offset).unwrap(), date);

        let epoch = parse_date("/Date(-1000)/", None, offset).unwrap();
        assert_eq!(epoch.timestamp_millis(), -1000);
        assert!(parse_date("yesterday", None, offset).is_err());
    }
}
