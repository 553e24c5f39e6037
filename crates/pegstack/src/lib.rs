//! # Pegstack
//!
//! A backtracking parsing-expression-grammar engine with inline semantic
//! actions on a value stack.
//!
//! ## Overview
//!
//! - **Grammars**: rules built from [`Matcher`] combinators, registered in a
//!   [`GrammarBuilder`] and validated into an immutable [`Grammar`]
//! - **Actions**: user code placed inside sequences, run as soon as the
//!   elements before them match, reading the matched text and working on a
//!   per-parse [`ValueStack`]
//! - **Errors**: a failed parse reports the furthest position reached and
//!   what was expected there
//! - **Recovery**: an optional second pass that stands in for missing
//!   terminals, so actions still produce a best-effort result
//! - **Memoization**: rules can remember where they failed, bounding
//!   backtracking in deeply nested alternatives
//!
//! ## Quick Start
//!
//! ```rust
//! use pegstack::{GrammarBuilder, Matcher, RuleOptions};
//!
//! type M = Matcher<i64>;
//!
//! let mut builder = GrammarBuilder::new();
//! let number = builder.rule_with(
//!     "Number",
//!     RuleOptions::new().memo_mismatches(),
//!     M::seq([
//!         M::one_or_more(M::range('0', '9')),
//!         M::push(|ctx| Ok(ctx.match_or_default("0").parse().unwrap_or(0))),
//!     ]),
//! );
//! let list = builder.rule(
//!     "List",
//!     M::seq([
//!         M::rule(number),
//!         M::zero_or_more(M::seq([M::ch(','), M::rule(number)])),
//!         M::eoi(),
//!     ]),
//! );
//! let grammar = builder.build().unwrap();
//!
//! let outcome = grammar.parser().parse(list, "1,22,333").unwrap();
//! assert_eq!(outcome.values(), Some(&[1, 22, 333][..]));
//!
//! let outcome = grammar.parser().parse(list, "1,,3").unwrap();
//! let failure = outcome.failure().unwrap();
//! assert_eq!(failure.position.offset, 2);
//! assert_eq!(failure.expected, ["Number"]);
//! ```
//!
//! ## Modules
//!
//! - [`grammar`] - Matchers, rule registration and validation
//! - [`action`] - Actions and the value stack
//! - [`parser`] - Parsing, error recovery and batch parsing
//! - [`input`] - Input text, cursors, positions and indentation markers
//! - [`syntax`] - Optional parse trees
//! - [`value`] - A dynamic value type for heterogeneous stacks
//! - [`error`] - Error types and diagnostics

pub mod action;
pub mod error;
pub mod grammar;
pub mod input;
pub mod parser;
pub mod syntax;
pub mod value;

pub use action::{Action, ActionContext, ActionResult, RuleVar, ValueStack};
pub use error::{ActionError, GrammarError, ParseError};
pub use grammar::{
    CharSet, Grammar, GrammarBuilder, GrammarMetrics, Matcher, RuleDef, RuleId, RuleOptions,
};
pub use input::{Input, IndentOptions, Position, Span};
pub use parser::{
    BatchResult, DriverState, NullEventHandler, ParseBatch, ParseEvent, ParseEventHandler,
    ParseFailure, ParseOutcome, ParseRun, ParseStats, ParseSuccess, Parser, ParserConfig,
    RecoveredError, RecoveredParse,
};
pub use syntax::ParseNode;
pub use value::Value;
