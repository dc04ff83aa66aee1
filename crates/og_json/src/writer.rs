//! An incremental JSON emitter.

use core::fmt::{self, Write};
use std::io;

use crate::error::{JsonError, Result};

/// The last token written, which decides the separator before the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LastToken {
    Nothing,
    Value,
    Comma,
    End,
    Start,
    Key,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Structure {
    Object,
    Array,
}

// -----------------------------------------------------------------------------
// TokenWriter

/// Writes JSON tokens into a [`fmt::Write`] sink.
///
/// Commas are inserted before any member that follows a value or the end of
/// a structure, so callers never write them explicitly. [`write_comma`]
/// exists for symmetry and is idempotent.
///
/// ```
/// use og_json::writer::TokenWriter;
///
/// let mut writer = TokenWriter::new(String::new());
/// writer.write_start_object().unwrap();
/// writer.write_key("a").unwrap();
/// writer.write_value("1").unwrap();
/// writer.write_comma().unwrap();
/// writer.write_comma().unwrap();
/// writer.write_key("b").unwrap();
/// writer.write_start_array().unwrap();
/// writer.write_end_array().unwrap();
/// writer.write_end_object().unwrap();
/// assert_eq!(writer.finish().unwrap(), r#"{"a":1,"b":[]}"#);
/// ```
///
/// [`write_comma`]: TokenWriter::write_comma
pub struct TokenWriter<W> {
    out: W,
    indent_width: usize,
    last: LastToken,
    stack: Vec<Structure>,
}

impl<W: Write> TokenWriter<W> {
    /// Creates a compact writer.
    #[inline]
    pub fn new(out: W) -> Self {
        Self::with_indent(out, 0)
    }

    /// Creates a writer that breaks lines and indents by `indent_width`
    /// spaces per level; `0` is compact.
    #[inline]
    pub fn with_indent(out: W, indent_width: usize) -> Self {
        Self {
            out,
            indent_width,
            last: LastToken::Nothing,
            stack: Vec::new(),
        }
    }

    #[inline]
    pub fn indent_width(&self) -> usize {
        self.indent_width
    }

    /// Current nesting depth.
    #[inline]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn misuse(message: &str) -> JsonError {
        JsonError::Grammar {
            line: 0,
            column: 0,
            message: format!("writer misuse: {message}"),
        }
    }

    fn newline(&mut self) -> Result<()> {
        if self.indent_width > 0 {
            self.out.write_char('\n')?;
            for _ in 0..self.stack.len() * self.indent_width {
                self.out.write_char(' ')?;
            }
        }
        Ok(())
    }

    /// Separator and layout before a value, a key, or a structure start.
    fn before_member(&mut self) -> Result<()> {
        match self.last {
            LastToken::Key => return Ok(()),
            LastToken::Value | LastToken::End | LastToken::Comma => self.out.write_char(',')?,
            LastToken::Nothing | LastToken::Start => {}
        }
        if !self.stack.is_empty() {
            self.newline()?;
        }
        Ok(())
    }

    /// Requests a separator after a completed member; otherwise does nothing.
    ///
    /// The comma is emitted with the next member, so a structure end right
    /// after it leaves no trailing comma.
    pub fn write_comma(&mut self) -> Result<()> {
        if matches!(self.last, LastToken::Value | LastToken::End) {
            self.last = LastToken::Comma;
        }
        Ok(())
    }

    /// Writes a raw token, such as a number literal, verbatim.
    pub fn write_value(&mut self, raw: &str) -> Result<()> {
        self.before_member()?;
        self.out.write_str(raw)?;
        self.last = LastToken::Value;
        Ok(())
    }

    #[inline]
    pub fn write_null(&mut self) -> Result<()> {
        self.write_value("null")
    }

    /// Writes an escaped, quoted string.
    pub fn write_string(&mut self, text: &str) -> Result<()> {
        self.before_member()?;
        write_escaped(&mut self.out, text)?;
        self.last = LastToken::Value;
        Ok(())
    }

    /// Writes an object key and its `:`.
    pub fn write_key(&mut self, name: &str) -> Result<()> {
        if self.stack.last() != Some(&Structure::Object) || self.last == LastToken::Key {
            return Err(Self::misuse("key outside of an object member position"));
        }
        self.before_member()?;
        write_escaped(&mut self.out, name)?;
        self.out.write_char(':')?;
        if self.indent_width > 0 {
            self.out.write_char(' ')?;
        }
        self.last = LastToken::Key;
        Ok(())
    }

    fn write_start(&mut self, structure: Structure) -> Result<()> {
        self.before_member()?;
        self.out.write_char(match structure {
            Structure::Object => '{',
            Structure::Array => '[',
        })?;
        self.stack.push(structure);
        self.last = LastToken::Start;
        Ok(())
    }

    fn write_end(&mut self, structure: Structure) -> Result<()> {
        match self.stack.last() {
            Some(top) if *top == structure => {}
            _ => return Err(Self::misuse("unbalanced end of structure")),
        }
        if self.last == LastToken::Key {
            return Err(Self::misuse("object ended after a key"));
        }
        self.stack.pop();
        if self.last != LastToken::Start {
            self.newline()?;
        }
        self.out.write_char(match structure {
            Structure::Object => '}',
            Structure::Array => ']',
        })?;
        self.last = LastToken::End;
        Ok(())
    }

    #[inline]
    pub fn write_start_object(&mut self) -> Result<()> {
        self.write_start(Structure::Object)
    }

    #[inline]
    pub fn write_end_object(&mut self) -> Result<()> {
        self.write_end(Structure::Object)
    }

    #[inline]
    pub fn write_start_array(&mut self) -> Result<()> {
        self.write_start(Structure::Array)
    }

    #[inline]
    pub fn write_end_array(&mut self) -> Result<()> {
        self.write_end(Structure::Array)
    }

    /// Returns the sink, failing if a structure is still open.
    pub fn finish(self) -> Result<W> {
        if self.stack.is_empty() {
            Ok(self.out)
        } else {
            Err(Self::misuse("structure left open"))
        }
    }

    /// Returns the sink.
    #[inline]
    pub fn get_ref(&self) -> &W {
        &self.out
    }

    /// Returns the sink without checking that the output is complete.
    #[inline]
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Writes `text` as a JSON string literal.
pub fn write_escaped(out: &mut impl Write, text: &str) -> fmt::Result {
    out.write_char('"')?;
    let mut start = 0;
    for (index, c) in text.char_indices() {
        let escape = match c {
            '"' => "\\\"",
            '\\' => "\\\\",
            '\n' => "\\n",
            '\r' => "\\r",
            '\t' => "\\t",
            '\u{8}' => "\\b",
            '\u{c}' => "\\f",
            c if c.is_control() => "",
            _ => continue,
        };
        out.write_str(&text[start..index])?;
        if escape.is_empty() {
            write!(out, "\\u{:04x}", c as u32)?;
        } else {
            out.write_str(escape)?;
        }
        start = index + c.len_utf8();
    }
    out.write_str(&text[start..])?;
    out.write_char('"')
}

/// Quotes `text` as a JSON string literal.
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    // Writing into a `String` cannot fail.
    let _ = write_escaped(&mut out, text);
    out
}

// -----------------------------------------------------------------------------
// IoAdapter

/// Adapts a [`io::Write`] into a [`fmt::Write`], keeping the I/O error.
pub struct IoAdapter<W: io::Write> {
    inner: W,
    error: Option<io::Error>,
}

impl<W: io::Write> IoAdapter<W> {
    #[inline]
    pub fn new(inner: W) -> Self {
        Self { inner, error: None }
    }

    /// Takes the I/O error that caused the last `fmt::Error`, if any.
    #[inline]
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    #[inline]
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: io::Write> Write for IoAdapter<W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.inner.write_all(s.as_bytes()).map_err(|err| {
            self.error = Some(err);
            fmt::Error
        })
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{TokenWriter, quote};

    #[test]
    fn escapes_control_characters() {
        assert_eq!(quote("a\"b\\\n\u{1}\u{7f}é"), r#""a\"b\\\n\u0001\u007fé""#);
    }

    #[test]
    fn nested_empty_and_indented() {
        let mut writer = TokenWriter::with_indent(String::new(), 2);
        writer.write_start_object().unwrap();
        writer.write_key("list").unwrap();
        writer.write_start_array().unwrap();
        writer.write_value("1").unwrap();
        writer.write_start_object().unwrap();
        writer.write_end_object().unwrap();
        writer.write_end_array().unwrap();
        writer.write_key("s").unwrap();
        writer.write_string("x").unwrap();
        writer.write_end_object().unwrap();
        let text = writer.finish().unwrap();
        assert_eq!(text, "{\n  \"list\": [\n    1,\n    {}\n  ],\n  \"s\": \"x\"\n}");
        serde_json::from_str::<serde_json::Value>(&text).unwrap();
    }

    #[test]
    fn unbalanced_calls_are_errors() {
        let mut writer = TokenWriter::new(String::new());
        writer.write_start_array().unwrap();
        assert!(writer.write_end_object().is_err());
        assert!(writer.write_key("k").is_err());
        assert!(writer.finish().is_err());

        let mut writer = TokenWriter::new(String::new());
        assert!(writer.write_end_array().is_err());
    }

    #[test]
    fn comma_is_never_leading() {
        let mut writer = TokenWriter::new(String::new());
        writer.write_start_array().unwrap();
        writer.write_comma().unwrap();
        writer.write_null().unwrap();
        writer.write_comma().unwrap();
        writer.write_end_array().unwrap();
        assert_eq!(writer.finish().unwrap(), "[null]");
    }
}
