//! # Diagnostic Utilities
//!
//! Formatting helpers for failure reports: joining expected labels into
//! prose and rendering the offending source line with a caret under the
//! failure column.

use std::fmt::Write;

use crate::input::{Input, Position};

/// Join labels the way error messages read: `a`, `a or b`, `a, b, or c`.
///
/// ```rust
/// use pegstack::error::format_expected_list;
///
/// assert_eq!(format_expected_list(&["Digits"]), "Digits");
/// assert_eq!(format_expected_list(&["'+'", "'-'", "EOI"]), "'+', '-', or EOI");
/// ```
#[must_use]
pub fn format_expected_list<S: AsRef<str>>(expected: &[S]) -> String {
    match expected {
        [] => "nothing".to_string(),
        [only] => only.as_ref().to_string(),
        [first, second] => format!("{} or {}", first.as_ref(), second.as_ref()),
        [init @ .., last] => {
            let mut result = init
                .iter()
                .map(|label| label.as_ref())
                .collect::<Vec<_>>()
                .join(", ");
            result.push_str(", or ");
            result.push_str(last.as_ref());
            result
        }
    }
}

/// Render `message` under the source line holding `position`.
///
/// ```text
/// error: expected Digits at 1:3
///   |
/// 1 | 2+
///   |   ^
/// ```
#[must_use]
pub fn render_context(input: &Input<'_>, position: Position, message: &str) -> String {
    let text = input.original();
    let index = input.line_index();
    let line = position.line as usize;
    let source_line = index
        .line_range(line, text)
        .map_or("", |range| &text[range]);

    let number = (line + 1).to_string();
    let gutter = " ".repeat(number.len());
    let caret_pad: String = source_line
        .get(..position.column as usize)
        .unwrap_or(source_line)
        .chars()
        .map(|c| if c == '\t' { '\t' } else { ' ' })
        .collect();

    let mut out = String::new();
    let _ = writeln!(out, "error: {message} at {position}");
    let _ = writeln!(out, "{gutter} |");
    let _ = writeln!(out, "{number} | {source_line}");
    let _ = write!(out, "{gutter} | {caret_pad}^");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_lists_read_naturally() {
        let none: [&str; 0] = [];
        assert_eq!(format_expected_list(&none), "nothing");
        assert_eq!(format_expected_list(&["a", "b"]), "a or b");
        assert_eq!(
            format_expected_list(&["a".to_string(), "b".to_string(), "c".to_string()]),
            "a, b, or c"
        );
    }

    #[test]
    fn context_points_at_the_column() {
        let input = Input::new("let x = 1;\nlet = 2;");
        let position = input.position(15);
        let rendered = render_context(&input, position, "expected Identifier");
        assert_eq!(
            rendered,
            "error: expected Identifier at 2:5\n  |\n2 | let = 2;\n  |     ^"
        );
    }
}
