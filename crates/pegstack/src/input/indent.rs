//! Indentation-sensitive input
//!
//! Block structure in languages like Python or YAML is carried by leading
//! whitespace. PEG terminals cannot compare indentation across lines, so the
//! input is rewritten up front: every increase in indentation inserts an
//! [`INDENT`] character in front of the line's first token, every decrease
//! inserts one [`DEDENT`] per closed level, and the end of input closes all
//! open levels. Grammars then match the markers as ordinary characters.
//!
//! Both markers are Unicode noncharacters and never occur in real text.

use super::{Input, MarkerRun};

/// Opens an indentation level
pub const INDENT: char = '\u{FDD0}';
/// Closes an indentation level
pub const DEDENT: char = '\u{FDD1}';

/// How leading whitespace is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndentOptions {
    /// Columns a tab advances to (the next multiple of this width)
    pub tab_width: usize,
    /// Leave lines holding only whitespace out of the indentation logic
    pub skip_blank_lines: bool,
}

impl Default for IndentOptions {
    fn default() -> Self {
        Self {
            tab_width: 4,
            skip_blank_lines: true,
        }
    }
}

impl<'a> Input<'a> {
    /// Rewrite `text` with indentation markers.
    ///
    /// Positions reported for the rewritten input refer to `text`.
    ///
    /// ```rust
    /// use pegstack::input::{DEDENT, INDENT, IndentOptions, Input};
    ///
    /// let input = Input::with_indentation("a\n  b\nc", IndentOptions::default());
    /// assert_eq!(input.text(), format!("a\n  {INDENT}b\n{DEDENT}c"));
    /// assert_eq!(input.position(input.text().find('c').unwrap()).offset, 6);
    /// ```
    #[must_use]
    pub fn with_indentation(text: &'a str, options: IndentOptions) -> Self {
        let mut out = String::with_capacity(text.len() + 16);
        let mut markers = Vec::new();
        let mut levels = vec![0usize];
        let mut inserted = 0;

        let mut emit = |out: &mut String, run: &str| {
            if run.is_empty() {
                return;
            }
            markers.push(MarkerRun {
                at: out.len(),
                len: run.len(),
                before: inserted,
            });
            inserted += run.len();
            out.push_str(run);
        };

        for line in text.split_inclusive('\n') {
            let (width, indent_len) = measure(line, options.tab_width);
            let (indentation, content) = line.split_at(indent_len);
            out.push_str(indentation);

            if !(options.skip_blank_lines && content.trim().is_empty()) {
                let mut run = String::new();
                while levels.len() > 1 && width < levels.last().copied().unwrap_or(0) {
                    levels.pop();
                    run.push(DEDENT);
                }
                if width > levels.last().copied().unwrap_or(0) {
                    levels.push(width);
                    run.push(INDENT);
                }
                emit(&mut out, &run);
            }
            out.push_str(content);
        }

        let closing: String = std::iter::repeat_n(DEDENT, levels.len() - 1).collect();
        emit(&mut out, &closing);

        Input::rewritten(text, out, markers)
    }
}

/// Indentation width in columns and its length in bytes
fn measure(line: &str, tab_width: usize) -> (usize, usize) {
    let tab_width = tab_width.max(1);
    let mut width = 0;
    let mut len = 0;
    for byte in line.bytes() {
        match byte {
            b' ' => width += 1,
            b'\t' => width = (width / tab_width + 1) * tab_width,
            _ => break,
        }
        len += 1;
    }
    (width, len)
}
