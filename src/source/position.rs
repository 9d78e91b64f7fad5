//! # Positions and Slices
//!
//! A [`Slice`] is a piece of matched text that remembers where in the input it
//! came from. Slices cut from the same buffer share it; adjacent slices merge
//! back into a single view when concatenated.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use serde::{Serialize, Serializer};

/// A resolved location in the input: byte offset plus 1-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} char {}", self.line, self.column)
    }
}

/// Matched text together with the byte offset it starts at in the input.
#[derive(Clone)]
pub struct Slice {
    buffer: Arc<str>,
    range: Range<usize>,
    offset: usize,
}

impl Slice {
    /// Creates a slice viewing `buffer[range]`, which starts at input offset
    /// `range.start`.
    pub(crate) fn from_buffer(buffer: Arc<str>, range: Range<usize>) -> Self {
        let offset = range.start;
        Self {
            buffer,
            range,
            offset,
        }
    }

    /// Creates a slice owning `text`, reported at input offset `offset`.
    pub fn new(text: impl Into<String>, offset: usize) -> Self {
        let text: String = text.into();
        let len = text.len();
        Self {
            buffer: Arc::from(text),
            range: 0..len,
            offset,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.buffer[self.range.clone()]
    }

    /// Byte offset of the first character in the original input.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Concatenates two slices.
    ///
    /// When `other` directly follows `self` in the same buffer the result is
    /// still a view into that buffer; otherwise the text is copied. The result
    /// keeps `self`'s offset.
    pub fn concat(&self, other: &Slice) -> Slice {
        if Arc::ptr_eq(&self.buffer, &other.buffer) && self.range.end == other.range.start {
            return Slice {
                buffer: Arc::clone(&self.buffer),
                range: self.range.start..other.range.end,
                offset: self.offset,
            };
        }
        let mut text = String::with_capacity(self.len() + other.len());
        text.push_str(self.as_str());
        text.push_str(other.as_str());
        Slice::new(text, self.offset)
    }
}

impl fmt::Debug for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{}", self.as_str(), self.offset)
    }
}

impl fmt::Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Slices compare by text; offsets are metadata.
impl PartialEq for Slice {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Slice {}

impl PartialEq<str> for Slice {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Slice {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl AsRef<str> for Slice {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Serialize for Slice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
