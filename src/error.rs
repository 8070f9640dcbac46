use std::fmt;
use std::io;

use thiserror::Error;

use crate::source::Position;

/// An error that occurs while reading CSV data.
#[derive(Debug, Error)]
pub enum CsvError {
    /// An I/O error from the underlying input, passed through unchanged.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// The input violates the RFC 4180 grammar or the reader's record constraints.
    #[error("CSV format error: {0}")]
    Format(#[from] FormatError),
    /// The reader was configured with an unusable set of structural characters.
    #[error("invalid dialect: {0}")]
    Dialect(String),
    /// `next_record` was called after the last record had been returned.
    #[error("no more records to read")]
    Exhausted,
    /// `next_record` was called after an earlier read failed.
    #[error("reader is unusable after an earlier error")]
    Poisoned,
}

pub type Result<T> = ::std::result::Result<T, CsvError>;

/// The kinds of syntax and consistency violations a reader can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatErrorKind {
    #[error("quote character found in non-quoted field")]
    QuoteInPlainField,
    #[error("quote character in quoted field not escaped by doubling")]
    UnescapedQuote,
    #[error("quote character missing to close quoted field")]
    UnterminatedQuote,
    #[error("records contain different numbers of fields (expected {expected}, found {found})")]
    FieldCount { expected: usize, found: usize },
    #[error("duplicated field names: {0:?}")]
    DuplicateHeader(Vec<String>),
    #[error("no record found except for header")]
    HeaderOnly,
}

/// A format violation together with where in the input it was detected.
///
/// A column of `0` means the position is only known at line granularity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct FormatError {
    kind: FormatErrorKind,
    position: Position,
}

impl FormatError {
    pub(crate) fn new(kind: FormatErrorKind, position: Position) -> FormatError {
        FormatError { kind, position }
    }
    pub(crate) fn at_line(kind: FormatErrorKind, line: usize) -> FormatError {
        FormatError::new(kind, Position { line, column: 0 })
    }

    pub fn kind(&self) -> &FormatErrorKind {
        &self.kind
    }
    pub fn position(&self) -> Position {
        self.position
    }
    pub fn line(&self) -> usize {
        self.position.line
    }
    pub fn column(&self) -> usize {
        self.position.column
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if self.position.line > 0 {
            write!(f, " (input line: {}", self.position.line)?;
            if self.position.column > 0 {
                write!(f, ", column: {}", self.position.column)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

impl CsvError {
    /// The format violation behind this error, if it is one.
    pub fn as_format(&self) -> Option<&FormatError> {
        match *self {
            CsvError::Format(ref err) => Some(err),
            _ => None,
        }
    }
}
