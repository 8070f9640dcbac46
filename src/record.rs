//! The field/record state machine. Everything here works through a borrowed `CharStream`
//! and keeps no state between calls.

use crate::dialect::Dialect;
use crate::error::*;
use crate::source::CharStream;

/// A parsed record: its fields in input order. Never empty.
pub type Record = Vec<String>;

/// Read one record, leaving the stream positioned on its terminator (or at end of input).
///
/// An empty line, and an empty input, yield a record with a single empty field.
pub fn read_record<C: CharStream>(src: &mut C, dialect: &Dialect) -> Result<Record> {
    let mut record = Record::new();
    loop {
        record.push(read_field(src, dialect)?);
        if src.peek() != Some(dialect.separator) {
            return Ok(record);
        }
        src.read()?;
    }
}

/// Read one field, leaving the stream positioned on the following separator, terminator or
/// end of input.
pub fn read_field<C: CharStream>(src: &mut C, dialect: &Dialect) -> Result<String> {
    if src.peek() == Some(dialect.quote) {
        read_quoted_field(src, dialect)
    } else {
        read_plain_field(src, dialect)
    }
}

fn read_quoted_field<C: CharStream>(src: &mut C, dialect: &Dialect) -> Result<String> {
    // opening quote
    src.read()?;
    let mut field = String::new();
    while let Some(c) = src.read()? {
        if c == dialect.quote {
            let next = src.peek();
            if next == Some(dialect.quote) {
                src.read()?;
            } else if dialect.ends_field(next) {
                return Ok(field);
            } else {
                let position = src.position();
                return Err(FormatError::new(FormatErrorKind::UnescapedQuote, position).into());
            }
        }
        field.push(c);
    }
    Err(FormatError::new(FormatErrorKind::UnterminatedQuote, src.position()).into())
}

fn read_plain_field<C: CharStream>(src: &mut C, dialect: &Dialect) -> Result<String> {
    let mut field = String::new();
    while !dialect.ends_field(src.peek()) {
        match src.read()? {
            Some(c) if c == dialect.quote => {
                let position = src.position();
                return Err(FormatError::new(FormatErrorKind::QuoteInPlainField, position).into());
            }
            Some(c) => field.push(c),
            None => break,
        }
    }
    Ok(field)
}
