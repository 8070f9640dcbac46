use std::fmt;

use crate::error::*;
use crate::source::{CR, LF};

/// The structural characters of a CSV dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    /// Field separator (`,` by default).
    pub separator: char,
    /// Quote character opening and closing an escaped field (`"` by default).
    pub quote: char,
    /// Canonical record terminator every line ending is converted to (`\n` by default).
    pub terminator: char,
}

impl Default for Dialect {
    fn default() -> Dialect {
        Dialect {
            separator: ',',
            quote: '"',
            terminator: LF,
        }
    }
}

impl Dialect {
    /// Check that the structural characters can be told apart. With line-ending normalization
    /// enabled, CR and LF are reserved for line breaks.
    pub fn validate(&self, normalize_line_endings: bool) -> Result<()> {
        if self.separator == self.quote
            || self.separator == self.terminator
            || self.quote == self.terminator
        {
            return Err(CsvError::Dialect(format!(
                "separator, quote and terminator must be distinct: {:?}",
                self
            )));
        }
        if normalize_line_endings {
            for (name, c) in [("separator", self.separator), ("quote", self.quote)] {
                if c == CR || c == LF {
                    return Err(CsvError::Dialect(format!(
                        "{} cannot be a line break when line endings are normalized",
                        name
                    )));
                }
            }
        }
        Ok(())
    }

    #[inline]
    pub(crate) fn ends_record(&self, c: Option<char>) -> bool {
        c.map_or(true, |c| c == self.terminator)
    }

    #[inline]
    pub(crate) fn ends_field(&self, c: Option<char>) -> bool {
        c == Some(self.separator) || self.ends_record(c)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Dialect:")?;
        writeln!(f, "\tSeparator: {:?}", self.separator)?;
        writeln!(f, "\tQuote character: {:?}", self.quote)?;
        write!(f, "\tTerminator: {:?}", self.terminator)
    }
}
