use compact_str::CompactString;
use std::fmt::Write as _;

/// A set of characters matched by a single-character terminal
///
/// Stored as inclusive ranges; a negated set matches every character
/// outside them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharSet {
    ranges: Vec<(char, char)>,
    negated: bool,
}

impl CharSet {
    /// Create a character set from inclusive ranges
    #[must_use]
    pub fn new(ranges: Vec<(char, char)>) -> Self {
        Self {
            ranges,
            negated: false,
        }
    }

    /// The characters of `chars`, each as its own member
    #[must_use]
    pub fn any_of(chars: &str) -> Self {
        let mut ranges: Vec<(char, char)> = chars.chars().map(|c| (c, c)).collect();
        ranges.sort_unstable();
        ranges.dedup();
        Self::new(ranges)
    }

    /// Every character except those of `chars`
    #[must_use]
    pub fn none_of(chars: &str) -> Self {
        Self::any_of(chars).negate()
    }

    #[must_use]
    pub fn digits() -> Self {
        Self::new(vec![('0', '9')])
    }

    #[must_use]
    pub fn hex_digits() -> Self {
        Self::new(vec![('0', '9'), ('a', 'f'), ('A', 'F')])
    }

    #[must_use]
    pub fn whitespace() -> Self {
        Self::any_of(" \t\r\n\u{c}")
    }

    /// Add an inclusive range to the set
    #[must_use]
    pub fn with_range(mut self, low: char, high: char) -> Self {
        self.ranges.push((low, high));
        self
    }

    /// Flip membership
    #[must_use]
    pub fn negate(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    #[must_use]
    pub const fn is_negated(&self) -> bool {
        self.negated
    }

    #[must_use]
    pub fn ranges(&self) -> &[(char, char)] {
        &self.ranges
    }

    /// Check if a character is a member of this set
    #[must_use]
    pub fn matches(&self, c: char) -> bool {
        let inside = self.ranges.iter().any(|&(low, high)| c >= low && c <= high);
        inside != self.negated
    }

    /// Bracket notation used in error labels, e.g. `[a-z_]` or `[^"\\]`
    #[must_use]
    pub fn describe(&self) -> CompactString {
        let mut out = CompactString::const_new("[");
        if self.negated {
            out.push('^');
        }
        for &(low, high) in &self.ranges {
            push_escaped(&mut out, low);
            if high != low {
                out.push('-');
                push_escaped(&mut out, high);
            }
        }
        out.push(']');
        out
    }
}

fn push_escaped(out: &mut CompactString, c: char) {
    match c {
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        '\\' | ']' | '^' | '-' => {
            out.push('\\');
            out.push(c);
        }
        c if c.is_control() => {
            let _ = write!(out, "\\u{{{:x}}}", u32::from(c));
        }
        c => out.push(c),
    }
}
