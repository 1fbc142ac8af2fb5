//! Byte cursor over XML input

use crate::error::Pos;

/// Forward-only view of the input that tracks line and column
///
/// Columns count characters, not bytes: the continuation bytes of a
/// multi-byte UTF-8 sequence do not move the column.
#[derive(Clone, Debug)]
pub struct Cursor<'a> {
    input: &'a [u8],
    pos: usize,
    line: u32,
    col: u32,
}

impl<'a> Cursor<'a> {
    pub const fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    /// Byte under the cursor
    pub fn current(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// The next `len` bytes, if that many remain
    pub fn peek_bytes(&self, len: usize) -> Option<&'a [u8]> {
        self.input.get(self.pos..self.pos.saturating_add(len))
    }

    /// Whether the unread input begins with `markup`, e.g. `<!--`
    pub fn starts_with(&self, markup: &[u8]) -> bool {
        self.peek_bytes(markup.len()) == Some(markup)
    }

    pub fn advance(&mut self) {
        let Some(b) = self.current() else {
            return;
        };
        self.pos += 1;
        match b {
            b'\n' => {
                self.line += 1;
                self.col = 1;
            }
            0x80..=0xBF => {}
            _ => self.col += 1,
        }
    }

    /// Step over `n` bytes, stopping early at the end of input
    pub fn advance_by(&mut self, n: usize) {
        let end = self.pos.saturating_add(n).min(self.input.len());
        while self.pos < end {
            self.advance();
        }
    }

    /// Skip the four XML whitespace bytes
    pub fn skip_whitespace(&mut self) {
        while matches!(self.current(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.advance();
        }
    }

    /// Step over `expected` if it is the current byte
    pub fn consume(&mut self, expected: u8) -> bool {
        let matched = self.current() == Some(expected);
        if matched {
            self.advance();
        }
        matched
    }

    pub const fn position(&self) -> Pos {
        Pos::new(self.pos, self.line, self.col)
    }

    pub const fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Byte offset of the cursor
    pub const fn pos(&self) -> usize {
        self.pos
    }

    /// Input consumed since offset `start`
    pub fn slice_from(&self, start: usize) -> &'a [u8] {
        self.input.get(start..self.pos).unwrap_or_default()
    }
}
