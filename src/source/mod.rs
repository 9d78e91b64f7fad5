//! # Source
//!
//! The input buffer for one parse plus the scan cursor over it. Atoms look at
//! the input only through this type:
//!
//! * [`Source::matches`] / [`Source::next_char`] peek without moving,
//! * [`Source::consume`] moves the cursor forward and hands back a [`Slice`],
//! * [`Source::pos`] / [`Source::set_pos`] save and restore the cursor, which is
//!   the only way anything backtracks.
//!
//! Consuming past the end is a caller bug; atoms check
//! [`Source::remaining`] first.

mod line_cache;
mod position;

pub use line_cache::LineCache;
pub use position::{Position, Slice};

use std::sync::Arc;

/// Input text with a byte cursor. Clones share the buffer.
#[derive(Debug, Clone)]
pub struct Source {
    buffer: Arc<str>,
    pos: usize,
    lines: LineCache,
}

impl Source {
    pub fn new(text: &str) -> Self {
        Self {
            buffer: Arc::from(text),
            pos: 0,
            lines: LineCache::new(),
        }
    }

    /// The whole input.
    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// The input from the cursor on.
    pub fn rest(&self) -> &str {
        &self.buffer[self.pos..]
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Moves the cursor to `pos`, which must be a char boundary within the
    /// buffer.
    pub fn set_pos(&mut self, pos: usize) {
        debug_assert!(self.buffer.is_char_boundary(pos), "not a char boundary: {pos}");
        self.pos = pos;
    }

    /// Bytes left after the cursor.
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.pos
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.buffer.len()
    }

    /// Does the input at the cursor start with `pattern`?
    pub fn matches(&self, pattern: &str) -> bool {
        self.rest().starts_with(pattern)
    }

    pub fn next_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Consumes `n` bytes and returns them as a slice.
    ///
    /// Callers ensure `n <= self.remaining()` and that the cursor lands on a
    /// char boundary.
    pub fn consume(&mut self, n: usize) -> Slice {
        debug_assert!(n <= self.remaining(), "consume past end of input");
        let start = self.pos;
        self.pos += n;
        Slice::from_buffer(Arc::clone(&self.buffer), start..self.pos)
    }

    /// Consumes up to `n` characters, stopping early at the end of input.
    pub fn consume_chars(&mut self, n: usize) -> Slice {
        let len = self.chars_len(n);
        self.consume(len)
    }

    /// Up to `n` characters at the cursor, without moving it.
    pub fn peek_chars(&self, n: usize) -> Slice {
        self.slice(self.pos, self.chars_len(n))
    }

    fn chars_len(&self, n: usize) -> usize {
        self.rest().chars().take(n).map(char::len_utf8).sum()
    }

    /// Returns a slice of `len` bytes at `start` without moving the cursor.
    pub fn slice(&self, start: usize, len: usize) -> Slice {
        Slice::from_buffer(Arc::clone(&self.buffer), start..start + len)
    }

    /// 1-based line and column of a byte offset.
    pub fn line_and_column(&mut self, pos: usize) -> (usize, usize) {
        self.lines.line_and_column(&self.buffer, pos)
    }

    pub fn position(&mut self, offset: usize) -> Position {
        let (line, column) = self.line_and_column(offset);
        Position {
            offset,
            line,
            column,
        }
    }
}
