//! # Error Types
//!
//! Three kinds of things go wrong around a parse, and each has its own type:
//!
//! - [`GrammarError`]: the rule set is broken. Detected by
//!   [`GrammarBuilder::build`](crate::GrammarBuilder::build) before any parse runs.
//! - [`ActionError`]: an action broke its contract with the value stack
//!   (popping an empty stack, popping a value of the wrong type) or failed
//!   on purpose.
//! - [`ParseError`]: a parse was aborted. Carries an [`ActionError`] with its
//!   position, or reports the recursion limit.
//!
//! Input that does not match the grammar is not an error in this sense:
//! it is reported as a [`ParseFailure`](crate::ParseFailure) value.
//!
//! ## Diagnostics Support
//!
//! When the `diagnostics` feature is enabled, errors integrate with
//! `miette` for rich error reporting.

pub mod diagnostics;

use compact_str::CompactString;
use thiserror::Error;

use crate::input::Position;

#[cfg(feature = "diagnostics")]
use miette::Diagnostic;

pub use diagnostics::format_expected_list;

/// A rule set that cannot be frozen into a grammar
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum GrammarError {
    #[error("rule `{name}` is referenced but never defined")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::undefined_rule)))]
    UndefinedRule { name: String },

    #[error("rule `{name}` is defined more than once")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::duplicate_rule)))]
    DuplicateRule { name: String },

    #[error("rule `{rule}` refers to unknown rule id {id}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::unknown_rule)))]
    UnknownRule { rule: String, id: u32 },

    #[error("repetition in rule `{rule}` can match the empty string")]
    #[cfg_attr(
        feature = "diagnostics",
        diagnostic(
            code(grammar::empty_loop),
            help("make the repeated expression consume at least one character")
        )
    )]
    EmptyLoop { rule: String },

    #[error("left recursion: {}", .cycle.join(" -> "))]
    #[cfg_attr(
        feature = "diagnostics",
        diagnostic(
            code(grammar::left_recursion),
            help("rewrite the rule with repetition or right recursion")
        )
    )]
    LeftRecursion { cycle: Vec<String> },

    #[error("character range {low:?}..{high:?} in rule `{rule}` is empty")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::invalid_char_range)))]
    InvalidCharRange { rule: String, low: char, high: char },
}

/// An action contract violation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum ActionError {
    #[error("value stack underflow in `{operation}`: needs {required} value(s), stack holds {available}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(action::stack_underflow)))]
    StackUnderflow {
        operation: &'static str,
        required: usize,
        available: usize,
    },

    #[error("type mismatch: expected {expected}, {detail}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(action::type_mismatch)))]
    TypeMismatch {
        expected: &'static str,
        detail: String,
    },

    #[error("{0}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(action::failed)))]
    Failed(String),
}

impl ActionError {
    /// An action failure with a custom message
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    pub(crate) const fn underflow(operation: &'static str, required: usize, available: usize) -> Self {
        Self::StackUnderflow {
            operation,
            required,
            available,
        }
    }
}

/// A parse that was aborted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum ParseError {
    #[error("action in rule `{rule}` failed at {position}: {source}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(parser::action)))]
    Action {
        rule: CompactString,
        position: Position,
        #[source]
        source: ActionError,
    },

    #[error("recursion limit of {limit} rule invocations exceeded at {position}")]
    #[cfg_attr(
        feature = "diagnostics",
        diagnostic(
            code(parser::recursion_limit),
            help("raise ParserConfig::max_depth or reduce nesting in the input")
        )
    )]
    RecursionLimit { limit: usize, position: Position },

    #[error("rule id {id} is not part of this grammar")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(parser::unknown_root)))]
    UnknownRoot { id: u32 },
}

impl ParseError {
    /// The action error behind this abort, if any
    #[must_use]
    pub const fn action_error(&self) -> Option<&ActionError> {
        match self {
            Self::Action { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Where the parse was aborted
    #[must_use]
    pub const fn position(&self) -> Option<Position> {
        match self {
            Self::Action { position, .. } | Self::RecursionLimit { position, .. } => {
                Some(*position)
            }
            Self::UnknownRoot { .. } => None,
        }
    }
}
