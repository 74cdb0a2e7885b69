//! Spans, source positions and error types shared by the lexer and parser.

use std::fmt;

use thiserror::Error;

/// Compact byte-span used across the crate.
///
/// Positions are `u32` for compactness, limiting inputs to 4GiB; spans past
/// that are clamped rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32, // exclusive
}

impl Span {
    #[inline]
    pub const fn new(start: usize, end: usize) -> Self {
        let s = if start > u32::MAX as usize {
            u32::MAX
        } else {
            start as u32
        };
        let e = if end > u32::MAX as usize {
            u32::MAX
        } else {
            end as u32
        };
        Self { start: s, end: e }
    }

    /// Zero-width span, used for synthesized tokens (inserted semicolons).
    #[inline]
    pub const fn empty_at(pos: usize) -> Self {
        Self::new(pos, pos)
    }

    #[inline]
    pub const fn from_range(range: std::ops::Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }

    #[inline]
    pub const fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Resolved source position: byte offset plus 1-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub offset: u32,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Offset → (line, column) mapping for one source file.
///
/// Built once per parse; columns are byte-based, which matches how the
/// original toolchain reports positions for ASCII-dominant sources.
#[derive(Debug)]
pub struct LineIndex {
    line_starts: Vec<u32>,
    len: u32,
}

impl LineIndex {
    pub fn new(src: &str) -> Self {
        let mut line_starts = vec![0u32];
        for (i, b) in src.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push((i + 1) as u32);
            }
        }
        Self {
            line_starts,
            len: src.len() as u32,
        }
    }

    /// 1-based line containing `offset`.
    pub fn line(&self, offset: u32) -> u32 {
        let offset = offset.min(self.len);
        match self.line_starts.binary_search(&offset) {
            Ok(i) => i as u32 + 1,
            Err(i) => i as u32, // i >= 1 because line_starts[0] == 0
        }
    }

    pub fn position(&self, offset: u32) -> Position {
        let offset = offset.min(self.len);
        let line = self.line(offset);
        let line_start = self.line_starts[(line - 1) as usize];
        Position {
            offset,
            line,
            column: offset - line_start + 1,
        }
    }

    /// End-of-file offset; out-of-range positions clamp here (`safePos`).
    pub fn eof(&self) -> u32 {
        self.len
    }
}

/// Structural lexical error classes detected while scanning.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Default)]
pub enum LexErrorKind {
    #[default]
    #[error("invalid token")]
    InvalidToken,
    #[error("invalid numeric literal")]
    InvalidNumber,
    #[error("invalid escape")]
    InvalidEscape,
    #[error("unterminated string")]
    UnterminatedString,
    #[error("unterminated comment")]
    UnterminatedComment,
}

/// A lexer diagnostic: kind plus source span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diag {
    pub kind: LexErrorKind,
    pub span: Span,
}

/// A user-visible parse error with a resolved position.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{pos}: {msg}")]
pub struct SyntaxError {
    pub pos: Position,
    pub msg: String,
}

/// Accumulated errors for one parse, in detection order until sorted.
#[derive(Debug, Default)]
pub struct ErrorList {
    errors: Vec<SyntaxError>,
}

impl ErrorList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, pos: Position, msg: impl Into<String>) {
        self.errors.push(SyntaxError {
            pos,
            msg: msg.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn last(&self) -> Option<&SyntaxError> {
        self.errors.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SyntaxError> {
        self.errors.iter()
    }

    pub fn sort(&mut self) {
        self.errors.sort_by_key(|e| e.pos.offset);
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.as_slice() {
            [] => write!(f, "no errors"),
            [first] => write!(f, "{first}"),
            [first, rest @ ..] => write!(f, "{first} (and {} more errors)", rest.len()),
        }
    }
}

impl<'a> IntoIterator for &'a ErrorList {
    type Item = &'a SyntaxError;
    type IntoIter = std::slice::Iter<'a, SyntaxError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}
