//! A character-level JSON pull parser.

mod source;

pub use source::{CharSource, IoSource, StrSource};

use crate::error::{JsonError, Result};

// -----------------------------------------------------------------------------
// TokenReader

/// A pull parser over a [`CharSource`] with one character of lookahead.
///
/// The reader knows the JSON grammar but not the shape of the values; the
/// decoder drives it token by token. There is no backtracking: once a token
/// is consumed it is gone, use [`TokenReader::read_raw`] to keep a value for
/// later.
///
/// ```
/// use og_json::reader::{StrSource, TokenReader};
///
/// let mut reader = TokenReader::new(StrSource::new(r#"{"a": [1, 2], "b": null}"#));
/// let mut seen = Vec::new();
/// reader
///     .loop_read_object(|reader, key| {
///         seen.push((key, reader.read_raw()?));
///         Ok(())
///     })
///     .unwrap();
/// assert_eq!(seen[0], ("a".to_owned(), "[1, 2]".to_owned()));
/// assert_eq!(seen[1], ("b".to_owned(), "null".to_owned()));
/// ```
pub struct TokenReader<S> {
    source: S,
    peeked: Option<char>,
    line: usize,
    column: usize,
}

impl<'a> TokenReader<StrSource<'a>> {
    /// Creates a reader over a string.
    #[inline]
    pub fn from_text(text: &'a str) -> Self {
        Self::new(StrSource::new(text))
    }
}

impl<S: CharSource> TokenReader<S> {
    #[inline]
    pub fn new(source: S) -> Self {
        Self {
            source,
            peeked: None,
            line: 1,
            column: 0,
        }
    }

    /// Returns the `(line, column)` of the last consumed character.
    #[inline]
    pub fn position(&self) -> (usize, usize) {
        (self.line, self.column)
    }

    /// Creates a grammar error at the current position.
    pub fn error(&self, message: impl Into<String>) -> JsonError {
        JsonError::Grammar {
            line: self.line,
            column: self.column,
            message: message.into(),
        }
    }

    fn peek_char(&mut self) -> Result<Option<char>> {
        if self.peeked.is_none() {
            self.peeked = self.source.next_char()?;
        }
        Ok(self.peeked)
    }

    fn next_char(&mut self) -> Result<Option<char>> {
        let c = match self.peeked.take() {
            Some(c) => Some(c),
            None => self.source.next_char()?,
        };
        match c {
            Some('\n') => {
                self.line += 1;
                self.column = 0;
            }
            Some(_) => self.column += 1,
            None => {}
        }
        Ok(c)
    }

    fn expect_char(&mut self) -> Result<char> {
        match self.next_char()? {
            Some(c) => Ok(c),
            None => Err(self.error("unexpected end of input")),
        }
    }

    /// Skips whitespace.
    pub fn skip_whitespace(&mut self) -> Result<()> {
        while let Some(c) = self.peek_char()? {
            if !c.is_ascii_whitespace() {
                break;
            }
            self.next_char()?;
        }
        Ok(())
    }

    /// Returns the next non-whitespace character without consuming it.
    pub fn peek_token(&mut self) -> Result<Option<char>> {
        self.skip_whitespace()?;
        self.peek_char()
    }

    /// Consumes `expected` after optional whitespace.
    pub fn assert_and_consume(&mut self, expected: char) -> Result<()> {
        self.skip_whitespace()?;
        match self.next_char()? {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(self.error(format!("expected `{expected}`, found `{c}`"))),
            None => Err(self.error(format!("expected `{expected}`, found end of input"))),
        }
    }

    fn consume_literal(&mut self, literal: &str) -> Result<()> {
        for expected in literal.chars() {
            let c = self.expect_char()?;
            if c != expected {
                return Err(self.error(format!("invalid literal, expected `{literal}`")));
            }
        }
        Ok(())
    }

    /// Consumes `null` if it is the next token.
    pub fn is_null(&mut self) -> Result<bool> {
        if self.peek_token()? == Some('n') {
            self.consume_literal("null")?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Reads `true` or `false`.
    pub fn read_bool(&mut self) -> Result<bool> {
        match self.peek_token()? {
            Some('t') => self.consume_literal("true").map(|()| true),
            Some('f') => self.consume_literal("false").map(|()| false),
            _ => Err(self.error("expected a boolean")),
        }
    }

    /// Reads a quoted string, decoding escapes.
    pub fn read_string(&mut self) -> Result<String> {
        self.assert_and_consume('"')?;
        let mut text = String::new();
        loop {
            match self.expect_char()? {
                '"' => return Ok(text),
                '\\' => {
                    let decoded = self.read_escape()?;
                    text.push(decoded);
                }
                c => text.push(c),
            }
        }
    }

    fn read_escape(&mut self) -> Result<char> {
        Ok(match self.expect_char()? {
            '"' => '"',
            '\\' => '\\',
            '/' => '/',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'u' => {
                let high = self.read_hex4()?;
                match high {
                    0xD800..=0xDBFF => {
                        self.consume_literal("\\u")?;
                        let low = self.read_hex4()?;
                        if !(0xDC00..=0xDFFF).contains(&low) {
                            return Err(self.error("invalid low surrogate"));
                        }
                        let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                        char::from_u32(code).ok_or_else(|| self.error("invalid surrogate pair"))?
                    }
                    0xDC00..=0xDFFF => return Err(self.error("unpaired low surrogate")),
                    _ => char::from_u32(high).ok_or_else(|| self.error("invalid unicode escape"))?,
                }
            }
            c => return Err(self.error(format!("invalid escape `\\{c}`"))),
        })
    }

    fn read_hex4(&mut self) -> Result<u32> {
        let mut code = 0;
        for _ in 0..4 {
            let c = self.expect_char()?;
            let digit = c
                .to_digit(16)
                .ok_or_else(|| self.error(format!("invalid hex digit `{c}`")))?;
            code = code * 16 + digit;
        }
        Ok(code)
    }

    /// Reads a string followed by `:`.
    pub fn read_key(&mut self) -> Result<String> {
        let key = self.read_string()?;
        self.assert_and_consume(':')?;
        Ok(key)
    }

    /// Reads a bare token (number, `true`, `false`, `null`) as written.
    pub fn read_number_like(&mut self) -> Result<String> {
        self.skip_whitespace()?;
        let mut text = String::new();
        while let Some(c) = self.peek_char()? {
            if c.is_ascii_whitespace() || matches!(c, ',' | ']' | '}' | ':' | '[' | '{' | '"') {
                break;
            }
            text.push(c);
            self.next_char()?;
        }
        if text.is_empty() {
            return Err(match self.peek_char()? {
                Some(c) => self.error(format!("unexpected `{c}`")),
                None => self.error("unexpected end of input"),
            });
        }
        Ok(text)
    }

    /// Captures the next value exactly as written.
    ///
    /// Objects and arrays are captured up to their balanced end; brackets
    /// inside strings are not counted. A closer that does not match its
    /// opener is a grammar error.
    pub fn read_raw(&mut self) -> Result<String> {
        match self.peek_token()? {
            Some('{' | '[') => {
                let mut raw = String::new();
                let mut closers = Vec::new();
                loop {
                    let c = self.expect_char()?;
                    raw.push(c);
                    match c {
                        '{' => closers.push('}'),
                        '[' => closers.push(']'),
                        '}' | ']' => {
                            if closers.pop() != Some(c) {
                                return Err(self.error(format!("unexpected `{c}`")));
                            }
                            if closers.is_empty() {
                                return Ok(raw);
                            }
                        }
                        '"' => self.capture_string_body(&mut raw)?,
                        _ => {}
                    }
                }
            }
            Some('"') => {
                let mut raw = String::from(self.expect_char()?);
                self.capture_string_body(&mut raw)?;
                Ok(raw)
            }
            _ => self.read_number_like(),
        }
    }

    /// Copies a string body, escapes included, after its opening quote.
    fn capture_string_body(&mut self, raw: &mut String) -> Result<()> {
        loop {
            let c = self.expect_char()?;
            raw.push(c);
            match c {
                '"' => return Ok(()),
                '\\' => raw.push(self.expect_char()?),
                _ => {}
            }
        }
    }

    /// Consumes and discards one value.
    #[inline]
    pub fn skip_value(&mut self) -> Result<()> {
        self.read_raw().map(drop)
    }

    /// Calls `visitor` once per element of an array.
    ///
    /// A `null` array visits nothing.
    pub fn loop_read_array(
        &mut self,
        mut visitor: impl FnMut(&mut Self) -> Result<()>,
    ) -> Result<()> {
        if self.is_null()? {
            return Ok(());
        }
        self.assert_and_consume('[')?;
        if self.peek_token()? == Some(']') {
            self.next_char()?;
            return Ok(());
        }
        loop {
            visitor(self)?;
            match self.peek_token()? {
                Some(',') => {
                    self.next_char()?;
                }
                Some(']') => {
                    self.next_char()?;
                    return Ok(());
                }
                Some(c) => return Err(self.error(format!("expected `,` or `]`, found `{c}`"))),
                None => return Err(self.error("unterminated array")),
            }
        }
    }

    /// Calls `visitor` once per member of an object, with the decoded key.
    ///
    /// The visitor must consume the member value. A `null` object visits
    /// nothing.
    pub fn loop_read_object(
        &mut self,
        mut visitor: impl FnMut(&mut Self, String) -> Result<()>,
    ) -> Result<()> {
        if self.is_null()? {
            return Ok(());
        }
        self.assert_and_consume('{')?;
        if self.peek_token()? == Some('}') {
            self.next_char()?;
            return Ok(());
        }
        loop {
            let key = self.read_key()?;
            visitor(self, key)?;
            match self.peek_token()? {
                Some(',') => {
                    self.next_char()?;
                }
                Some('}') => {
                    self.next_char()?;
                    return Ok(());
                }
                Some(c) => return Err(self.error(format!("expected `,` or `}}`, found `{c}`"))),
                None => return Err(self.error("unterminated object")),
            }
        }
    }

    /// Checks that only whitespace remains.
    pub fn finish(&mut self) -> Result<()> {
        match self.peek_token()? {
            None => Ok(()),
            Some(c) => Err(self.error(format!("trailing characters after value, found `{c}`"))),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::TokenReader;
    use crate::error::JsonError;

    #[test]
    fn decodes_escapes() {
        let mut reader = TokenReader::from_text(r#" "a\"b\\c\/d\n\té😀" "#);
        assert_eq!(reader.read_string().unwrap(), "a\"b\\c/d\n\t\u{e9}\u{1f600}");
        reader.finish().unwrap();
    }

    #[test]
    fn raw_capture_respects_strings() {
        let mut reader = TokenReader::from_text(r#"{"k": "}]{", "n": [1, {"x": "\"}"}]} , 3"#);
        assert_eq!(reader.read_raw().unwrap(), r#"{"k": "}]{", "n": [1, {"x": "\"}"}]}"#);
        reader.assert_and_consume(',').unwrap();
        assert_eq!(reader.read_raw().unwrap(), "3");
    }

    #[test]
    fn mismatched_closers_are_rejected() {
        let mut reader = TokenReader::from_text(r#"{"a":[1}"#);
        assert!(matches!(reader.read_raw(), Err(JsonError::Grammar { .. })));

        let mut reader = TokenReader::from_text("[{]}");
        assert!(matches!(reader.skip_value(), Err(JsonError::Grammar { .. })));

        let mut reader = TokenReader::from_text(r#"[{"a":"]}"}]"#);
        reader.skip_value().unwrap();
        reader.finish().unwrap();
    }

    #[test]
    fn arrays_and_null() {
        let mut items = Vec::new();
        let mut reader = TokenReader::from_text("[ 1 ,2, 3 ]");
        reader
            .loop_read_array(|r| {
                items.push(r.read_number_like()?);
                Ok(())
            })
            .unwrap();
        assert_eq!(items, ["1", "2", "3"]);

        let mut reader = TokenReader::from_text("null");
        reader.loop_read_array(|_| panic!("visited")).unwrap();

        let mut reader = TokenReader::from_text("[]");
        reader.loop_read_array(|_| panic!("visited")).unwrap();
    }

    #[test]
    fn grammar_errors_carry_position() {
        let mut reader = TokenReader::from_text("[1,\n  2 3]");
        let err = reader
            .loop_read_array(|r| r.read_number_like().map(drop))
            .unwrap_err();
        match err {
            JsonError::Grammar { line, column, .. } => assert_eq!((line, column), (2, 4)),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn literals() {
        let mut reader = TokenReader::from_text(" true false nul");
        assert!(reader.read_bool().unwrap());
        assert!(!reader.read_bool().unwrap());
        assert!(reader.is_null().is_err());
    }
}
