//! A streaming RFC 4180 CSV reader.
//!
//! Input is consumed one character at a time with a single character of lookahead. CR, LF
//! and CR+LF line endings are collapsed into one terminator before parsing, so files from any
//! platform read the same.
//!
//! ```
//! use qsv_rfc4180::ReaderBuilder;
//!
//! let mut reader = ReaderBuilder::new()
//!     .from_text("name,quote\r\nada,\"say \"\"hi\"\"\"\r\n")
//!     .unwrap();
//! assert_eq!(reader.header(), Some(&["name".to_string(), "quote".to_string()][..]));
//! for record in reader.records() {
//!     assert_eq!(record.unwrap(), vec!["ada", "say \"hi\""]);
//! }
//! ```

pub mod error;
pub use error::{CsvError, FormatError, FormatErrorKind, Result};

pub mod input;
pub use input::{CharSource, Utf8Chars};

pub mod source;
pub use source::{CharStream, LineEndings, NormalizingSource, Position, RawSource, Source};

pub mod dialect;
pub use dialect::Dialect;

pub mod record;
pub use record::Record;

mod reader;
pub use reader::{CsvReader, IntoRecords, ReaderBuilder, Records};
