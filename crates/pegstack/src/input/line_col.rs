//! Line and column lookup for byte offsets
//!
//! Failure positions are reported as byte offsets by the engine; this index
//! turns them into line/column pairs for messages and diagnostics.

/// A line and column position in source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineCol {
    /// Zero-based line number
    pub line: u32,
    /// Zero-based column number (in UTF-8 bytes)
    pub column: u32,
}

impl LineCol {
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Cached line starts for O(log n) offset conversion
///
/// `\n`, `\r\n` and a lone `\r` all terminate a line.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    text_len: usize,
}

impl LineIndex {
    /// Build the index with a single scan over `text`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pegstack::input::line_col::LineIndex;
    ///
    /// let index = LineIndex::new("line 1\nline 2\nline 3");
    /// let pos = index.line_col(10);
    /// assert_eq!(pos.line, 1);
    /// assert_eq!(pos.column, 3);
    /// ```
    #[must_use]
    pub fn new(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut line_starts = vec![0];

        for i in memchr::memchr2_iter(b'\n', b'\r', bytes) {
            // the '\n' of a "\r\n" pair starts the next line
            if bytes[i] == b'\r' && bytes.get(i + 1) == Some(&b'\n') {
                continue;
            }
            line_starts.push(i + 1);
        }

        Self {
            line_starts,
            text_len: text.len(),
        }
    }

    /// Convert a byte offset to a line/column position.
    ///
    /// Offsets past the end of the text are clamped to the end.
    #[must_use]
    pub fn line_col(&self, offset: usize) -> LineCol {
        let offset = offset.min(self.text_len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        };
        let column = offset - self.line_starts[line];

        LineCol {
            line: u32::try_from(line).unwrap_or(u32::MAX),
            column: u32::try_from(column).unwrap_or(u32::MAX),
        }
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte offset of the start of `line`, if it exists
    #[must_use]
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }

    /// Byte range of `line` without its terminator
    #[must_use]
    pub fn line_range(&self, line: usize, text: &str) -> Option<std::ops::Range<usize>> {
        let start = self.line_start(line)?;
        let mut end = self.line_start(line + 1).unwrap_or(self.text_len);
        let bytes = text.as_bytes();
        while end > start && matches!(bytes.get(end - 1), Some(b'\n' | b'\r')) {
            end -= 1;
        }
        Some(start..end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_line_endings() {
        let index = LineIndex::new("line 1\nline 2\nline 3");

        assert_eq!(index.line_col(0), LineCol::new(0, 0));
        assert_eq!(index.line_col(6), LineCol::new(0, 6));
        assert_eq!(index.line_col(7), LineCol::new(1, 0));
        assert_eq!(index.line_col(13), LineCol::new(1, 6));
        assert_eq!(index.line_col(14), LineCol::new(2, 0));
    }

    #[test]
    fn windows_and_mixed_line_endings() {
        let index = LineIndex::new("line 1\r\nline 2\r\nline 3");
        assert_eq!(index.line_col(8), LineCol::new(1, 0));
        assert_eq!(index.line_col(14), LineCol::new(1, 6));

        let index = LineIndex::new("line 1\nline 2\r\nline 3\rline 4");
        assert_eq!(index.line_col(7), LineCol::new(1, 0));
        assert_eq!(index.line_col(15), LineCol::new(2, 0));
        assert_eq!(index.line_col(22), LineCol::new(3, 0));
        assert_eq!(index.line_count(), 4);
    }

    #[test]
    fn empty_text_and_clamping() {
        let index = LineIndex::new("");
        assert_eq!(index.line_col(0), LineCol::new(0, 0));
        assert_eq!(index.line_count(), 1);

        let index = LineIndex::new("abc");
        assert_eq!(index.line_col(99), LineCol::new(0, 3));
    }

    #[test]
    fn line_ranges_exclude_terminators() {
        let text = "first\r\nsecond\nthird";
        let index = LineIndex::new(text);
        assert_eq!(index.line_range(0, text), Some(0..5));
        assert_eq!(index.line_range(1, text), Some(7..13));
        assert_eq!(index.line_range(2, text), Some(14..19));
        assert_eq!(index.line_range(3, text), None);
    }
}
