//! Single-character lookahead over a `CharSource`, with position tracking and optional
//! collapsing of CR, LF and CR+LF into one canonical terminator.

use std::fmt;
use std::io;

use bitflags::bitflags;

use crate::input::CharSource;

pub const CR: char = '\r';
pub const LF: char = '\n';

/// A line/column position in the canonical character stream.
///
/// Lines start at 1. The column counts the characters read on the current line and is `0`
/// right after a terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    fn start() -> Position {
        Position { line: 1, column: 0 }
    }

    fn advance(&mut self, c: char, terminator: char) {
        if c == terminator {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
    }
}

impl Default for Position {
    fn default() -> Position {
        Position::start()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

bitflags! {
    /// Raw line-ending conventions seen by a [`NormalizingSource`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LineEndings: u8 {
        const CR    = 0b001;
        const LF    = 0b010;
        const CRLF  = 0b100;
    }
}

impl fmt::Display for LineEndings {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        let names: Vec<&str> = [
            (LineEndings::CRLF, "CRLF"),
            (LineEndings::LF, "LF"),
            (LineEndings::CR, "CR"),
        ]
        .iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|&(_, name)| name)
        .collect();
        write!(f, "{}", names.join(", "))
    }
}

/// Character stream with exactly one character of lookahead.
pub trait CharStream {
    /// Consume and return the next character, or `None` at end of input. Once `None` has been
    /// returned the underlying input is not consulted again.
    fn read(&mut self) -> io::Result<Option<char>>;
    /// The character the next `read` will return, without consuming it.
    fn peek(&self) -> Option<char>;
    fn has_next(&self) -> bool {
        self.peek().is_some()
    }
    fn position(&self) -> Position;
}

/// Lookahead over the input as-is. Only the configured terminator counts as a line break.
pub struct RawSource<S> {
    input: S,
    next: Option<char>,
    terminator: char,
    position: Position,
}

impl<S: CharSource> RawSource<S> {
    /// Wrap `input`, reading its first character immediately.
    pub fn new(mut input: S, terminator: char) -> io::Result<RawSource<S>> {
        let next = input.next_char()?;
        Ok(RawSource {
            input,
            next,
            terminator,
            position: Position::start(),
        })
    }

    pub fn into_inner(self) -> S {
        self.input
    }
}

impl<S: CharSource> CharStream for RawSource<S> {
    fn read(&mut self) -> io::Result<Option<char>> {
        let current = match self.next {
            Some(c) => c,
            None => return Ok(None),
        };
        self.next = self.input.next_char()?;
        self.position.advance(current, self.terminator);
        Ok(Some(current))
    }

    fn peek(&self) -> Option<char> {
        self.next
    }

    fn position(&self) -> Position {
        self.position
    }
}

/// Lookahead over the input with every CR, LF and CR+LF turned into a single terminator.
///
/// The lookahead slot holds the *unconverted* next character; `peek` reports a pending CR or
/// LF as the terminator so callers never observe a raw line ending.
pub struct NormalizingSource<S> {
    input: S,
    next: Option<char>,
    terminator: char,
    position: Position,
    seen: LineEndings,
}

impl<S: CharSource> NormalizingSource<S> {
    /// Wrap `input`, reading its first character immediately.
    pub fn new(mut input: S, terminator: char) -> io::Result<NormalizingSource<S>> {
        let next = input.next_char()?;
        Ok(NormalizingSource {
            input,
            next,
            terminator,
            position: Position::start(),
            seen: LineEndings::empty(),
        })
    }

    /// The raw line-ending conventions collapsed so far.
    pub fn line_endings(&self) -> LineEndings {
        self.seen
    }

    pub fn into_inner(self) -> S {
        self.input
    }
}

impl<S: CharSource> CharStream for NormalizingSource<S> {
    fn read(&mut self) -> io::Result<Option<char>> {
        let mut current = match self.next {
            Some(c) => c,
            None => return Ok(None),
        };
        self.next = self.input.next_char()?;
        match current {
            CR => {
                current = self.terminator;
                if self.next == Some(LF) {
                    self.next = self.input.next_char()?;
                    self.seen |= LineEndings::CRLF;
                } else {
                    self.seen |= LineEndings::CR;
                }
            }
            LF => {
                current = self.terminator;
                self.seen |= LineEndings::LF;
            }
            _ => {}
        }
        self.position.advance(current, self.terminator);
        Ok(Some(current))
    }

    fn peek(&self) -> Option<char> {
        match self.next {
            Some(CR) | Some(LF) => Some(self.terminator),
            other => other,
        }
    }

    fn position(&self) -> Position {
        self.position
    }
}

/// The canonical source a reader owns: one of the two lookahead variants.
pub enum Source<S> {
    Raw(RawSource<S>),
    Normalizing(NormalizingSource<S>),
}

impl<S: CharSource> Source<S> {
    pub fn new(input: S, terminator: char, normalize: bool) -> io::Result<Source<S>> {
        Ok(if normalize {
            Source::Normalizing(NormalizingSource::new(input, terminator)?)
        } else {
            Source::Raw(RawSource::new(input, terminator)?)
        })
    }

    /// Raw line endings collapsed so far; always empty for a raw source.
    pub fn line_endings(&self) -> LineEndings {
        match *self {
            Source::Raw(_) => LineEndings::empty(),
            Source::Normalizing(ref src) => src.line_endings(),
        }
    }

    pub fn into_inner(self) -> S {
        match self {
            Source::Raw(src) => src.into_inner(),
            Source::Normalizing(src) => src.into_inner(),
        }
    }
}

impl<S: CharSource> CharStream for Source<S> {
    fn read(&mut self) -> io::Result<Option<char>> {
        match *self {
            Source::Raw(ref mut src) => src.read(),
            Source::Normalizing(ref mut src) => src.read(),
        }
    }

    fn peek(&self) -> Option<char> {
        match *self {
            Source::Raw(ref src) => src.peek(),
            Source::Normalizing(ref src) => src.peek(),
        }
    }

    fn position(&self) -> Position {
        match *self {
            Source::Raw(ref src) => src.position(),
            Source::Normalizing(ref src) => src.position(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::Chars;

    use super::*;

    fn drain<C: CharStream>(src: &mut C) -> String {
        let mut out = String::new();
        while let Some(c) = src.read().unwrap() {
            out.push(c);
        }
        out
    }

    #[test]
    fn collapses_all_line_endings() {
        let mut src = NormalizingSource::new("a\rb\nc\r\nd\r\r\n".chars(), LF).unwrap();
        assert_eq!(drain(&mut src), "a\nb\nc\nd\n\n");
        assert_eq!(src.position().line, 6);
        assert_eq!(src.line_endings(), LineEndings::all());
    }

    #[test]
    fn peek_reports_pending_cr_as_terminator() {
        let mut src = NormalizingSource::new("x\r\ny".chars(), LF).unwrap();
        assert_eq!(src.read().unwrap(), Some('x'));
        assert_eq!(src.peek(), Some(LF));
        assert_eq!(src.peek(), Some(LF));
        assert_eq!(src.position(), Position { line: 1, column: 1 });
        assert_eq!(src.read().unwrap(), Some(LF));
        assert_eq!(src.position(), Position { line: 2, column: 0 });
        assert_eq!(src.read().unwrap(), Some('y'));
        assert!(!src.has_next());
    }

    #[test]
    fn translates_to_custom_terminator() {
        let mut src = NormalizingSource::new("a\nb\r\nc".chars(), '\u{1e}').unwrap();
        assert_eq!(src.peek(), Some('a'));
        assert_eq!(drain(&mut src), "a\u{1e}b\u{1e}c");
        assert_eq!(src.position(), Position { line: 3, column: 1 });
    }

    #[test]
    fn raw_source_leaves_cr_alone() {
        let mut src = RawSource::new("a\r\nb".chars(), LF).unwrap();
        assert_eq!(drain(&mut src), "a\r\nb");
        assert_eq!(src.position(), Position { line: 2, column: 1 });
    }

    #[test]
    fn read_is_idempotent_at_end() {
        let mut src = Source::new("".chars(), LF, true).unwrap();
        assert!(!src.has_next());
        assert_eq!(src.read().unwrap(), None);
        assert_eq!(src.read().unwrap(), None);
        assert_eq!(src.position(), Position::default());
    }

    struct CountingSource<'a> {
        chars: Chars<'a>,
        calls_after_end: usize,
    }

    impl<'a> CharSource for CountingSource<'a> {
        fn next_char(&mut self) -> io::Result<Option<char>> {
            let next = self.chars.next();
            if next.is_none() {
                self.calls_after_end += 1;
            }
            Ok(next)
        }
    }

    #[test]
    fn input_is_not_consulted_past_end() {
        let input = CountingSource { chars: "a".chars(), calls_after_end: 0 };
        let mut src = NormalizingSource::new(input, LF).unwrap();
        assert_eq!(src.read().unwrap(), Some('a'));
        for _ in 0..4 {
            assert_eq!(src.read().unwrap(), None);
        }
        assert_eq!(src.into_inner().calls_after_end, 1);

        let input = CountingSource { chars: "".chars(), calls_after_end: 0 };
        let mut src = RawSource::new(input, LF).unwrap();
        for _ in 0..3 {
            assert_eq!(src.read().unwrap(), None);
        }
        assert_eq!(src.into_inner().calls_after_end, 1);
    }

    #[test]
    fn line_endings_display() {
        assert_eq!(LineEndings::empty().to_string(), "none");
        assert_eq!((LineEndings::CR | LineEndings::CRLF).to_string(), "CRLF, CR");
    }
}
