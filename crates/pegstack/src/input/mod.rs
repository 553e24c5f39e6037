//! Input text, cursors and positions
//!
//! An [`Input`] owns the text the matchers run over together with a line
//! index for turning byte offsets into [`Position`]s. Plain inputs borrow the
//! caller's text; [indentation-aware inputs](Input::with_indentation) hold a
//! rewritten copy with `INDENT`/`DEDENT` markers and map every offset back to
//! the original text.
//!
//! A [`Cursor`] is the read head the engine moves while matching. Saving and
//! restoring it is a copy of a single offset.

use std::borrow::Cow;
use std::fmt;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

pub mod indent;
pub mod line_col;
mod span;

pub use indent::{DEDENT, INDENT, IndentOptions};
pub use line_col::{LineCol, LineIndex};
pub use span::Span;

/// A location in the original input text
///
/// `line` and `column` are zero-based; the [`Display`](fmt::Display) form is
/// one-based, the way editors show it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Position {
    /// Byte offset into the original text
    pub offset: usize,
    /// Zero-based line
    pub line: u32,
    /// Zero-based column in UTF-8 bytes
    pub column: u32,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// A run of marker characters inserted into the parsed text
#[derive(Debug, Clone, Copy)]
pub(crate) struct MarkerRun {
    /// Offset of the run in the rewritten text
    pub(crate) at: usize,
    /// Byte length of the run
    pub(crate) len: usize,
    /// Marker bytes inserted before this run
    pub(crate) before: usize,
}

/// Text to be parsed
#[derive(Debug, Clone)]
pub struct Input<'a> {
    original: &'a str,
    text: Cow<'a, str>,
    markers: Vec<MarkerRun>,
    lines: LineIndex,
}

impl<'a> Input<'a> {
    /// Wrap `text` without any rewriting.
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self {
            original: text,
            text: Cow::Borrowed(text),
            markers: Vec::new(),
            lines: LineIndex::new(text),
        }
    }

    pub(crate) fn rewritten(original: &'a str, text: String, markers: Vec<MarkerRun>) -> Self {
        Self {
            original,
            text: Cow::Owned(text),
            markers,
            lines: LineIndex::new(original),
        }
    }

    /// The text matchers see
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The text as the caller supplied it
    #[must_use]
    pub const fn original(&self) -> &'a str {
        self.original
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    #[must_use]
    pub const fn line_index(&self) -> &LineIndex {
        &self.lines
    }

    /// Map an offset in [`text`](Self::text) to an offset in the original.
    ///
    /// Offsets inside a run of inserted markers map to the original offset
    /// the run was inserted at.
    #[must_use]
    pub fn original_offset(&self, offset: usize) -> usize {
        let idx = self.markers.partition_point(|run| run.at <= offset);
        let Some(run) = idx.checked_sub(1).map(|i| self.markers[i]) else {
            return offset;
        };
        if offset < run.at + run.len {
            run.at - run.before
        } else {
            offset - run.before - run.len
        }
    }

    /// Resolve an offset in [`text`](Self::text) to a [`Position`] in the original.
    #[must_use]
    pub fn position(&self, offset: usize) -> Position {
        let offset = self.original_offset(offset.min(self.text.len()));
        let lc = self.lines.line_col(offset);
        Position {
            offset,
            line: lc.line,
            column: lc.column,
        }
    }

    /// A cursor at the start of the text
    #[must_use]
    pub fn cursor(&self) -> Cursor<'_> {
        Cursor::new(&self.text)
    }
}

/// Saved cursor offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Mark(usize);

impl Mark {
    #[must_use]
    pub const fn offset(self) -> usize {
        self.0
    }
}

/// Read head over an immutable text
#[derive(Debug, Clone)]
pub struct Cursor<'t> {
    text: &'t str,
    pos: usize,
}

impl<'t> Cursor<'t> {
    #[must_use]
    pub const fn new(text: &'t str) -> Self {
        Self { text, pos: 0 }
    }

    #[must_use]
    pub const fn text(&self) -> &'t str {
        self.text
    }

    #[must_use]
    pub const fn pos(&self) -> usize {
        self.pos
    }

    #[must_use]
    pub const fn mark(&self) -> Mark {
        Mark(self.pos)
    }

    pub fn reset(&mut self, mark: Mark) {
        self.pos = mark.0;
    }

    #[must_use]
    pub const fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    /// Unread remainder of the text
    #[must_use]
    pub fn rest(&self) -> &'t str {
        &self.text[self.pos..]
    }

    /// The character under the cursor
    #[must_use]
    pub fn current(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Consume one character if `accept` returns true for it.
    pub fn eat_char(&mut self, accept: impl FnOnce(char) -> bool) -> bool {
        match self.current() {
            Some(c) if accept(c) => {
                self.pos += c.len_utf8();
                true
            }
            _ => false,
        }
    }

    /// Consume `literal` if the text continues with it.
    pub fn eat_str(&mut self, literal: &str) -> bool {
        if self.rest().starts_with(literal) {
            self.pos += literal.len();
            true
        } else {
            false
        }
    }

    /// Consume `literal` compared character by character ignoring case.
    pub fn eat_str_ignore_case(&mut self, literal: &str) -> bool {
        let mut chars = self.rest().chars();
        let mut consumed = 0;
        for expected in literal.chars() {
            match chars.next() {
                Some(c) if chars_eq_ignore_case(c, expected) => consumed += c.len_utf8(),
                _ => return false,
            }
        }
        self.pos += consumed;
        true
    }
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}
