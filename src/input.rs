//! Character-level input sources feeding the line-ending normalization layer.

use std::io::{self, BufRead, BufReader, Read};
use std::str::Chars;

/// Something that can hand out characters one at a time.
///
/// `Ok(None)` marks the end of input. Implementations are closed by dropping them.
pub trait CharSource {
    fn next_char(&mut self) -> io::Result<Option<char>>;
}

impl<'a> CharSource for Chars<'a> {
    fn next_char(&mut self) -> io::Result<Option<char>> {
        Ok(self.next())
    }
}

impl<S: CharSource + ?Sized> CharSource for &mut S {
    fn next_char(&mut self) -> io::Result<Option<char>> {
        (**self).next_char()
    }
}

impl<S: CharSource + ?Sized> CharSource for Box<S> {
    fn next_char(&mut self) -> io::Result<Option<char>> {
        (**self).next_char()
    }
}

/// Streaming UTF-8 decoder over a byte reader.
///
/// Bytes are pulled through a `BufReader` one scalar value at a time, so no more than the
/// reader's buffer is ever held in memory.
pub struct Utf8Chars<R> {
    reader: BufReader<R>,
    offset: u64,
}

impl<R: Read> Utf8Chars<R> {
    pub fn new(reader: R) -> Utf8Chars<R> {
        Utf8Chars {
            reader: BufReader::new(reader),
            offset: 0,
        }
    }

    /// Number of bytes consumed from the underlying reader so far.
    pub fn byte_offset(&self) -> u64 {
        self.offset
    }

    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }

    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let byte = loop {
            match self.reader.fill_buf() {
                Ok(buf) => break buf.first().copied(),
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        };
        if byte.is_some() {
            self.reader.consume(1);
            self.offset += 1;
        }
        Ok(byte)
    }
}

impl<R: Read> CharSource for Utf8Chars<R> {
    fn next_char(&mut self) -> io::Result<Option<char>> {
        let start = self.offset;
        let mut buf = [0u8; 4];
        buf[0] = match self.next_byte()? {
            Some(byte) => byte,
            None => return Ok(None),
        };
        let width = sequence_width(buf[0]).ok_or_else(|| invalid_utf8(start))?;
        for slot in buf.iter_mut().take(width).skip(1) {
            *slot = self.next_byte()?.ok_or_else(|| invalid_utf8(start))?;
        }
        let decoded =
            simdutf8::basic::from_utf8(&buf[..width]).map_err(|_| invalid_utf8(start))?;
        Ok(decoded.chars().next())
    }
}

// width of a UTF-8 sequence from its leading byte; `None` for bytes that cannot start one
fn sequence_width(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7F => Some(1),
        0xC2..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF4 => Some(4),
        _ => None,
    }
}

fn invalid_utf8(offset: u64) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("invalid UTF-8 sequence at byte offset {}", offset),
    )
}
