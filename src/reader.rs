use std::fs::File;
use std::io::Read;
use std::iter::FusedIterator;
use std::path::Path;
use std::str::Chars;

use hashbrown::HashSet;
use tracing::{debug, trace};

use crate::dialect::Dialect;
use crate::error::*;
use crate::input::{CharSource, Utf8Chars};
use crate::record::{self, Record};
use crate::source::{CharStream, LineEndings, Position, Source};

/// Builds a [`CsvReader`] with a given configuration.
///
/// By default the first record is a header of distinct names, every data record must have as
/// many fields as the first one, fields are separated by `,` and quoted with `"`, and CR, LF
/// and CR+LF are all read as a line break.
#[derive(Debug, Clone)]
pub struct ReaderBuilder {
    dialect: Dialect,
    has_header: bool,
    fix_field_count: bool,
    field_count: Option<usize>,
    distinct_header_names: bool,
    normalize_line_endings: bool,
}

impl Default for ReaderBuilder {
    fn default() -> ReaderBuilder {
        ReaderBuilder {
            dialect: Dialect::default(),
            has_header: true,
            fix_field_count: true,
            field_count: None,
            distinct_header_names: true,
            normalize_line_endings: true,
        }
    }
}

impl ReaderBuilder {
    /// Create a new builder with the default configuration.
    pub fn new() -> ReaderBuilder {
        ReaderBuilder::default()
    }
    /// Treat the first record as a header.
    pub fn has_header(&mut self, yes: bool) -> &mut ReaderBuilder {
        self.has_header = yes;
        self
    }
    /// Require every data record to have the same number of fields as the first data record.
    pub fn fix_field_count(&mut self, yes: bool) -> &mut ReaderBuilder {
        self.fix_field_count = yes;
        self
    }
    /// Require every data record to have exactly `count` fields. Implies `fix_field_count`.
    pub fn field_count(&mut self, count: usize) -> &mut ReaderBuilder {
        self.fix_field_count = true;
        self.field_count = Some(count);
        self
    }
    /// Reject headers containing the same name twice. Ignored without a header.
    pub fn distinct_header_names(&mut self, yes: bool) -> &mut ReaderBuilder {
        self.distinct_header_names = yes;
        self
    }
    /// Specify the field separator.
    pub fn separator(&mut self, separator: char) -> &mut ReaderBuilder {
        self.dialect.separator = separator;
        self
    }
    /// Specify the quote character.
    pub fn quote(&mut self, quote: char) -> &mut ReaderBuilder {
        self.dialect.quote = quote;
        self
    }
    /// Specify the canonical terminator line endings are converted to.
    pub fn terminator(&mut self, terminator: char) -> &mut ReaderBuilder {
        self.dialect.terminator = terminator;
        self
    }
    /// Convert CR, LF and CR+LF to the terminator. When disabled only the terminator itself
    /// ends a record.
    pub fn normalize_line_endings(&mut self, yes: bool) -> &mut ReaderBuilder {
        self.normalize_line_endings = yes;
        self
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<CsvReader<Utf8Chars<File>>> {
        self.from_reader(File::open(path)?)
    }
    /// Read UTF-8 encoded CSV from a byte reader.
    pub fn from_reader<R: Read>(&self, rdr: R) -> Result<CsvReader<Utf8Chars<R>>> {
        self.from_source(Utf8Chars::new(rdr))
    }
    pub fn from_text<'a>(&self, text: &'a str) -> Result<CsvReader<Chars<'a>>> {
        self.from_source(text.chars())
    }
    /// Start reading from any character source. The header, if expected, is read here.
    pub fn from_source<S: CharSource>(&self, input: S) -> Result<CsvReader<S>> {
        self.dialect.validate(self.normalize_line_endings)?;
        let source = Source::new(input, self.dialect.terminator, self.normalize_line_endings)?;
        let field_count = match (self.fix_field_count, self.field_count) {
            (false, _) => FieldCount::Flexible,
            (true, Some(count)) => FieldCount::Fixed(count),
            (true, None) => FieldCount::FromFirstRecord,
        };
        let mut reader = CsvReader {
            source,
            dialect: self.dialect,
            header: None,
            field_count,
            state: if self.has_header { State::AwaitingHeader } else { State::Ready },
        };
        if self.has_header {
            reader.read_header(self.distinct_header_names)?;
        }
        Ok(reader)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitingHeader,
    Ready,
    Exhausted,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldCount {
    Flexible,
    FromFirstRecord,
    Fixed(usize),
}

/// A streaming RFC 4180 reader over a character source.
///
/// Records are read one at a time with [`next_record`](CsvReader::next_record), or through
/// the iterators returned by [`records`](CsvReader::records) and `into_iter`. After any error
/// the reader refuses further reads.
pub struct CsvReader<S> {
    source: Source<S>,
    dialect: Dialect,
    header: Option<Record>,
    field_count: FieldCount,
    state: State,
}

impl<'a> CsvReader<Chars<'a>> {
    /// Read `text` with the default configuration.
    pub fn from_text(text: &'a str) -> Result<CsvReader<Chars<'a>>> {
        ReaderBuilder::new().from_text(text)
    }
}

impl<R: Read> CsvReader<Utf8Chars<R>> {
    /// Read UTF-8 bytes from `rdr` with the default configuration.
    pub fn from_reader(rdr: R) -> Result<CsvReader<Utf8Chars<R>>> {
        ReaderBuilder::new().from_reader(rdr)
    }
}

impl<S: CharSource> CsvReader<S> {
    /// The header record, if one was expected.
    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }
    /// The number of fields every record must have, once fixed.
    pub fn field_count(&self) -> Option<usize> {
        match self.field_count {
            FieldCount::Fixed(count) => Some(count),
            FieldCount::Flexible | FieldCount::FromFirstRecord => None,
        }
    }
    /// The current line of the input, starting at 1.
    pub fn line(&self) -> usize {
        self.source.position().line
    }
    pub fn position(&self) -> Position {
        self.source.position()
    }
    /// Raw line-ending conventions seen so far.
    pub fn line_endings(&self) -> LineEndings {
        self.source.line_endings()
    }
    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    pub fn has_next_record(&self) -> bool {
        matches!(self.state, State::AwaitingHeader | State::Ready)
    }

    /// Read the next data record.
    ///
    /// Returns [`CsvError::Exhausted`] once every record has been read and
    /// [`CsvError::Poisoned`] after an earlier failure.
    pub fn next_record(&mut self) -> Result<Record> {
        match self.state {
            State::Exhausted => return Err(CsvError::Exhausted),
            State::Failed => return Err(CsvError::Poisoned),
            State::AwaitingHeader | State::Ready => {}
        }
        let result = self.read_data_record();
        if let Err(ref err) = result {
            debug!(%err, line = self.line(), "record read failed, reader is unusable");
            self.state = State::Failed;
        }
        result
    }

    /// Iterate over the remaining records, borrowing the reader.
    pub fn records(&mut self) -> Records<'_, S> {
        Records { reader: self }
    }

    /// Close the reader, handing back the underlying input.
    pub fn into_inner(self) -> S {
        self.source.into_inner()
    }

    fn read_header(&mut self, distinct_names: bool) -> Result<()> {
        let (header, _) = self.read_raw_record()?;
        debug!(fields = header.len(), "read header record");
        if distinct_names {
            let distinct = {
                let mut names = HashSet::with_capacity(header.len());
                header.iter().all(|name| names.insert(name.as_str()))
            };
            if !distinct {
                return Err(
                    FormatError::at_line(FormatErrorKind::DuplicateHeader(header), 1).into());
            }
        }
        if self.state == State::Exhausted {
            return Err(FormatError::at_line(FormatErrorKind::HeaderOnly, self.line()).into());
        }
        self.header = Some(header);
        Ok(())
    }

    fn read_data_record(&mut self) -> Result<Record> {
        let (record, line) = self.read_raw_record()?;
        match self.field_count {
            FieldCount::Flexible => {}
            FieldCount::FromFirstRecord => {
                debug!(field_count = record.len(), "fixed field count from first data record");
                self.field_count = FieldCount::Fixed(record.len());
            }
            FieldCount::Fixed(expected) if expected != record.len() => {
                let kind = FormatErrorKind::FieldCount { expected, found: record.len() };
                return Err(FormatError::at_line(kind, line).into());
            }
            FieldCount::Fixed(_) => {}
        }
        Ok(record)
    }

    // Reads a record and steps over its terminator. Also returns the line the record ended on.
    fn read_raw_record(&mut self) -> Result<(Record, usize)> {
        let record = record::read_record(&mut self.source, &self.dialect)?;
        let line = self.line();
        if self.source.peek() == Some(self.dialect.terminator) {
            self.source.read()?;
        }
        self.state = if self.source.has_next() { State::Ready } else { State::Exhausted };
        trace!(line, fields = record.len(), "read record");
        Ok((record, line))
    }
}

/// Borrowing iterator over a reader's remaining records.
///
/// Yields an error at most once, then ends.
pub struct Records<'r, S> {
    reader: &'r mut CsvReader<S>,
}

impl<'r, S: CharSource> Iterator for Records<'r, S> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Result<Record>> {
        if !self.reader.has_next_record() {
            return None;
        }
        Some(self.reader.next_record())
    }
}

impl<'r, S: CharSource> FusedIterator for Records<'r, S> {}

/// Owning iterator over a reader's remaining records.
pub struct IntoRecords<S> {
    reader: CsvReader<S>,
}

impl<S: CharSource> Iterator for IntoRecords<S> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Result<Record>> {
        self.reader.records().next()
    }
}

impl<S: CharSource> FusedIterator for IntoRecords<S> {}

impl<S: CharSource> IntoIterator for CsvReader<S> {
    type Item = Result<Record>;
    type IntoIter = IntoRecords<S>;

    fn into_iter(self) -> IntoRecords<S> {
        IntoRecords { reader: self }
    }
}

impl<'r, S: CharSource> IntoIterator for &'r mut CsvReader<S> {
    type Item = Result<Record>;
    type IntoIter = Records<'r, S>;

    fn into_iter(self) -> Records<'r, S> {
        self.records()
    }
}
