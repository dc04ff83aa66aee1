use std::io::{self, BufReader, Bytes, ErrorKind, Read};
use std::str::Chars;

use crate::error::Result;

/// A forward-only source of characters.
pub trait CharSource {
    /// Returns the next character, or `None` at the end of input.
    fn next_char(&mut self) -> Result<Option<char>>;
}

// -----------------------------------------------------------------------------
// StrSource

/// Characters of an in-memory string.
pub struct StrSource<'a> {
    chars: Chars<'a>,
}

impl<'a> StrSource<'a> {
    #[inline]
    pub fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars(),
        }
    }
}

impl CharSource for StrSource<'_> {
    #[inline]
    fn next_char(&mut self) -> Result<Option<char>> {
        Ok(self.chars.next())
    }
}

// -----------------------------------------------------------------------------
// IoSource

/// Characters decoded incrementally from a byte stream holding UTF-8.
pub struct IoSource<R: Read> {
    bytes: Bytes<BufReader<R>>,
}

impl<R: Read> IoSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            bytes: BufReader::new(reader).bytes(),
        }
    }

    fn next_byte(&mut self) -> Result<Option<u8>> {
        Ok(self.bytes.next().transpose()?)
    }
}

fn invalid_utf8() -> io::Error {
    io::Error::new(ErrorKind::InvalidData, "stream did not contain valid UTF-8")
}

impl<R: Read> CharSource for IoSource<R> {
    fn next_char(&mut self) -> Result<Option<char>> {
        let Some(first) = self.next_byte()? else {
            return Ok(None);
        };

        let width = match first {
            0x00..=0x7F => return Ok(Some(char::from(first))),
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => return Err(invalid_utf8().into()),
        };

        let mut buf = [first, 0, 0, 0];
        for slot in &mut buf[1..width] {
            *slot = self.next_byte()?.ok_or_else(invalid_utf8)?;
        }

        let text = core::str::from_utf8(&buf[..width]).map_err(|_| invalid_utf8())?;
        Ok(text.chars().next())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{CharSource, IoSource};

    #[test]
    fn decodes_multibyte_characters() {
        let text = "a\u{e9}\u{4e2d}\u{1f600}";
        let mut source = IoSource::new(text.as_bytes());
        let mut decoded = String::new();
        while let Some(c) = source.next_char().unwrap() {
            decoded.push(c);
        }
        assert_eq!(decoded, text);
    }

    #[test]
    fn rejects_truncated_sequence() {
        let mut source = IoSource::new(&[0xE4_u8, 0xB8][..]);
        assert!(source.next_char().is_err());
    }
}
