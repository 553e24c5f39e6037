//! # Parsing
//!
//! A [`Parser`] pairs a frozen [`Grammar`] with a [`ParserConfig`]. It holds
//! no per-parse state: every call to [`Parser::parse`] gets a fresh value
//! stack, error frontier and memo table, so one parser can serve any number
//! of parses, on any number of threads.
//!
//! ```rust
//! use pegstack::{GrammarBuilder, Matcher};
//!
//! type M = Matcher<i64>;
//!
//! let mut builder = GrammarBuilder::new();
//! let digits = builder.rule("Digits", M::one_or_more(M::range('0', '9')));
//! let sum = builder.rule(
//!     "Sum",
//!     M::seq([
//!         M::rule(digits),
//!         M::push(|ctx| Ok(ctx.match_or_default("0").parse().unwrap_or(0))),
//!         M::zero_or_more(M::seq([
//!             M::ch('+'),
//!             M::rule(digits),
//!             M::push(|ctx| Ok(ctx.match_or_default("0").parse().unwrap_or(0))),
//!             M::exec(|ctx| {
//!                 let (b, a) = (ctx.pop()?, ctx.pop()?);
//!                 ctx.push(a + b);
//!                 Ok(())
//!             }),
//!         ])),
//!     ]),
//! );
//! let grammar = builder.build().unwrap();
//!
//! let outcome = grammar.parser().parse(sum, "2+3+4").unwrap();
//! assert_eq!(outcome.values(), Some(&[9][..]));
//!
//! let failure = grammar.parser().recovery(true).parse(sum, "2+").unwrap();
//! let failure = failure.failure().unwrap();
//! assert_eq!(failure.position.offset, 2);
//! assert_eq!(failure.expected, ["Digits"]);
//! assert_eq!(failure.recovered.as_ref().unwrap().values, [2]);
//! ```

mod config;
pub mod driver;
mod engine;
mod frontier;
mod parallel;
pub mod recovery;
mod state;

pub use config::ParserConfig;
pub use driver::{DriverState, NullEventHandler, ParseEvent, ParseEventHandler, ParseRun, ParseStats};
pub use parallel::{BatchResult, ParseBatch};
pub use recovery::RecoveredError;

use compact_str::CompactString;
use std::fmt;

use crate::error::{ParseError, diagnostics};
use crate::grammar::{Grammar, RuleId};
use crate::input::{Input, Position};
use crate::syntax::ParseNode;

/// Parses text with a grammar
#[derive(Debug, Clone)]
pub struct Parser<'g, V> {
    grammar: &'g Grammar<V>,
    config: ParserConfig,
}

impl<'g, V> Parser<'g, V> {
    #[must_use]
    pub fn new(grammar: &'g Grammar<V>) -> Self {
        Self::with_config(grammar, ParserConfig::default())
    }

    #[must_use]
    pub const fn with_config(grammar: &'g Grammar<V>, config: ParserConfig) -> Self {
        Self { grammar, config }
    }

    /// Run a recovery pass when a parse fails
    #[must_use]
    pub const fn recovery(mut self, enabled: bool) -> Self {
        self.config.recovery = enabled;
        self
    }

    /// Build a [`ParseNode`] tree
    #[must_use]
    pub const fn parse_tree(mut self, enabled: bool) -> Self {
        self.config.build_parse_tree = enabled;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &ParserConfig {
        &self.config
    }

    #[must_use]
    pub const fn grammar(&self) -> &'g Grammar<V> {
        self.grammar
    }

    /// Parse `text` starting at rule `root`.
    ///
    /// Text that does not match is reported as [`ParseOutcome::Failed`].
    ///
    /// # Errors
    ///
    /// A fatal [`ParseError`]: an action failed, the recursion limit was
    /// exceeded, or `root` is not a rule of this grammar.
    pub fn parse(&self, root: RuleId, text: &str) -> Result<ParseOutcome<V>, ParseError> {
        self.parse_input(root, &Input::new(text))
    }

    /// Parse a prepared [`Input`], such as one with indentation markers.
    ///
    /// # Errors
    ///
    /// Same as [`parse`](Self::parse).
    pub fn parse_input(&self, root: RuleId, input: &Input<'_>) -> Result<ParseOutcome<V>, ParseError> {
        ParseRun::new(self.grammar, input, root, self.config.clone()).into_outcome()
    }

    /// A [`ParseRun`] that has not started yet, for observing its state or
    /// attaching an event handler.
    #[must_use]
    pub fn run<'p>(&self, root: RuleId, input: &'p Input<'p>) -> ParseRun<'p, V>
    where
        'g: 'p,
    {
        ParseRun::new(self.grammar, input, root, self.config.clone())
    }
}

/// Result of a parse that ran to completion
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome<V> {
    Succeeded(ParseSuccess<V>),
    Failed(ParseFailure<V>),
}

impl<V> ParseOutcome<V> {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }

    /// The value stack of a successful parse
    #[must_use]
    pub fn values(&self) -> Option<&[V]> {
        self.success().map(|success| success.values.as_slice())
    }

    #[must_use]
    pub const fn success(&self) -> Option<&ParseSuccess<V>> {
        match self {
            Self::Succeeded(success) => Some(success),
            Self::Failed(_) => None,
        }
    }

    #[must_use]
    pub const fn failure(&self) -> Option<&ParseFailure<V>> {
        match self {
            Self::Succeeded(_) => None,
            Self::Failed(failure) => Some(failure),
        }
    }

    #[must_use]
    pub const fn stats(&self) -> &ParseStats {
        match self {
            Self::Succeeded(success) => &success.stats,
            Self::Failed(failure) => &failure.stats,
        }
    }

    /// # Errors
    ///
    /// The [`ParseFailure`] if the input did not match.
    pub fn into_result(self) -> Result<ParseSuccess<V>, ParseFailure<V>> {
        match self {
            Self::Succeeded(success) => Ok(success),
            Self::Failed(failure) => Err(failure),
        }
    }
}

/// The root rule matched the whole input
#[derive(Debug, Clone, PartialEq)]
pub struct ParseSuccess<V> {
    /// Always the end of the input
    pub end: Position,
    /// The value stack, bottom first
    pub values: Vec<V>,
    /// Present when tree building was enabled
    pub tree: Option<ParseNode>,
    pub stats: ParseStats,
}

/// The input did not match
#[derive(Debug, Clone, PartialEq)]
pub struct ParseFailure<V> {
    /// The furthest position any match attempt failed at
    pub position: Position,
    /// What was tried there, in first-tried order
    pub expected: Vec<CompactString>,
    /// The character at `position`, `None` at end of input
    pub found: Option<char>,
    /// Result of the recovery pass, if one ran and the root rule matched
    pub recovered: Option<RecoveredParse<V>>,
    pub stats: ParseStats,
}

impl<V> ParseFailure<V> {
    /// The failure with the offending source line and a caret.
    #[must_use]
    pub fn render(&self, input: &Input<'_>) -> String {
        diagnostics::render_context(input, self.position, &self.message())
    }

    fn message(&self) -> String {
        let found = self
            .found
            .map_or_else(|| "end of input".to_owned(), |c| format!("{c:?}"));
        format!(
            "expected {}, found {found}",
            diagnostics::format_expected_list(&self.expected)
        )
    }
}

impl<V> fmt::Display for ParseFailure<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message(), self.position)
    }
}

impl<V: fmt::Debug> std::error::Error for ParseFailure<V> {}

/// Best-effort result of the recovery pass
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveredParse<V> {
    /// Where the root rule stopped
    pub end: Position,
    /// Whether the root rule reached the end of the input
    pub complete: bool,
    /// The value stack, bottom first
    pub values: Vec<V>,
    /// Every gap that was stood in for, in input order
    pub errors: Vec<RecoveredError>,
    pub tree: Option<ParseNode>,
}
