//! # Line/Column Index
//!
//! Records the byte offsets at which lines end, growing the record only as far
//! into the buffer as has been asked about. Lookups are a binary search over the
//! recorded line ends, so positions can be queried in any order.

/// Incremental index of line endings for one buffer.
#[derive(Debug, Clone, Default)]
pub struct LineCache {
    /// Offsets just past each `\n` seen so far, ascending.
    line_ends: Vec<usize>,
    /// Everything before this offset has been scanned.
    scanned: usize,
}

impl LineCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans `text[self.scanned..upto]` for line endings not yet recorded.
    pub fn scan(&mut self, text: &str, upto: usize) {
        let upto = upto.min(text.len());
        if upto <= self.scanned {
            return;
        }
        let bytes = &text.as_bytes()[self.scanned..upto];
        for (i, b) in bytes.iter().enumerate() {
            if *b == b'\n' {
                self.line_ends.push(self.scanned + i + 1);
            }
        }
        self.scanned = upto;
    }

    /// Returns the 1-based `(line, column)` of byte offset `pos` in `text`.
    ///
    /// Columns count characters, not bytes.
    pub fn line_and_column(&mut self, text: &str, pos: usize) -> (usize, usize) {
        let pos = pos.min(text.len());
        self.scan(text, pos);

        // Number of line ends at or before pos == index of the line pos is on.
        let line_idx = self.line_ends.partition_point(|end| *end <= pos);
        let line_start = if line_idx == 0 {
            0
        } else {
            self.line_ends[line_idx - 1]
        };
        let column = text
            .get(line_start..pos)
            .map(|s| s.chars().count())
            .unwrap_or(pos - line_start);
        (line_idx + 1, column + 1)
    }

    /// Count of line endings recorded so far.
    pub fn known_lines(&self) -> usize {
        self.line_ends.len()
    }
}
