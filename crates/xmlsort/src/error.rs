//! Error types for xmlsort

use std::fmt;
use thiserror::Error;

/// Position in source text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pos {
    pub offset: usize,
    pub line: u32,
    pub col: u32,
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl Pos {
    pub const fn new(offset: usize, line: u32, col: u32) -> Self {
        Self { offset, line, col }
    }
}

/// Span representing a range in source text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
}

impl Span {
    pub const fn at(pos: Pos) -> Self {
        Self { start: pos, end: pos }
    }

    pub const fn empty() -> Self {
        Self {
            start: Pos::new(0, 0, 0),
            end: Pos::new(0, 0, 0),
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.start.line == 0 && self.end.line == 0
    }
}

/// Error kind for detailed categorization
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidToken,
    UnexpectedEof,
    MismatchedTag { expected: String, found: String },
    DuplicateAttribute { name: String },
    InvalidEntity { entity: String },
    InvalidUtf8,
    MissingRoot,
    MaxDepthExceeded { max: u16 },
    InvalidPattern { pattern: String },
    MissingInput,
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidToken => write!(f, "invalid token"),
            Self::UnexpectedEof => write!(f, "unexpected end of input"),
            Self::MismatchedTag { expected, found } => {
                write!(f, "mismatched closing tag: expected </{expected}>, found </{found}>")
            }
            Self::DuplicateAttribute { name } => write!(f, "duplicate attribute: {name}"),
            Self::InvalidEntity { entity } => write!(f, "invalid xml entity: &{entity};"),
            Self::InvalidUtf8 => write!(f, "invalid utf-8"),
            Self::MissingRoot => write!(f, "document has no root element"),
            Self::MaxDepthExceeded { max } => write!(f, "max depth exceeded: {max}"),
            Self::InvalidPattern { pattern } => write!(f, "invalid pattern: {pattern:?}"),
            Self::MissingInput => write!(f, "no xml file to sort"),
            Self::Io => write!(f, "i/o error"),
        }
    }
}

/// Main error type for xmlsort
#[derive(Error, Clone, Debug, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    span: Span,
    message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, span: Span) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            span,
            message,
        }
    }

    pub fn with_message(kind: ErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Create error at specific position
    pub fn at(kind: ErrorKind, pos: Pos) -> Self {
        Self::new(kind, Span::at(pos))
    }

    /// Error for a malformed pattern spec
    pub fn pattern(pattern: &str, reason: &str) -> Self {
        Self::with_message(
            ErrorKind::InvalidPattern {
                pattern: pattern.to_string(),
            },
            Span::empty(),
            format!("invalid pattern {pattern:?}: {reason}"),
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::with_message(ErrorKind::Io, Span::empty(), err.to_string())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.span.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "error at {}: {}", self.span.start, self.message)
        }
    }
}

/// Result type alias for xmlsort
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pos_display() {
        let pos = Pos::new(42, 10, 5);
        assert_eq!(pos.to_string(), "10:5");
    }

    #[test]
    fn test_error_creation() {
        let err = Error::at(ErrorKind::InvalidToken, Pos::new(3, 1, 4));
        assert_eq!(err.kind(), &ErrorKind::InvalidToken);
        assert_eq!(err.span(), Span::at(Pos::new(3, 1, 4)));
        assert!(!err.span().is_empty());
    }

    #[test]
    fn test_missing_input_has_no_position() {
        let err = Error::new(ErrorKind::MissingInput, Span::empty());
        assert!(err.span().is_empty());
        assert_eq!(err.to_string(), "no xml file to sort");
    }

    #[test]
    fn test_error_display_with_position() {
        let err = Error::at(ErrorKind::UnexpectedEof, Pos::new(10, 2, 5));
        assert_eq!(err.to_string(), "error at 2:5: unexpected end of input");
    }

    #[test]
    fn test_pattern_error_has_no_position() {
        let err = Error::pattern("a:b:c", "more than one ':'");
        assert!(matches!(err.kind(), ErrorKind::InvalidPattern { .. }));
        assert_eq!(err.to_string(), "invalid pattern \"a:b:c\": more than one ':'");
    }

    #[test]
    fn test_io_error_conversion() {
        let err: Error = std::io::Error::other("disk full").into();
        assert_eq!(err.kind(), &ErrorKind::Io);
        assert_eq!(err.message(), "disk full");
    }
}
