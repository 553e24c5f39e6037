//! # Grammar Module
//!
//! Rule registry and matcher construction.
//!
//! ## Overview
//!
//! A grammar is an arena of named rules. Each rule owns one [`Matcher`] tree;
//! rules refer to each other through [`RuleId`]s, so direct and mutual
//! recursion needs no cyclic object graph. Ids are handed out by
//! [`GrammarBuilder::declare`] before a rule body exists, which makes forward
//! references straightforward.
//!
//! [`GrammarBuilder::build`] freezes the registry into an immutable
//! [`Grammar`] after checking it:
//!
//! - every declared rule has a body and every [`Matcher::Rule`] resolves
//! - no repetition body can match the empty string
//! - no rule can reach itself without consuming input (left recursion)
//! - character ranges are not inverted
//!
//! ## Usage
//!
//! ```rust
//! use pegstack::{GrammarBuilder, Matcher};
//!
//! type M = Matcher<i64>;
//!
//! let mut g = GrammarBuilder::new();
//! let expr = g.declare("Expr");
//! let atom = g.rule(
//!     "Atom",
//!     M::first_of([
//!         M::one_or_more(M::range('0', '9')),
//!         M::seq(['('.into(), expr.into(), ')'.into()]),
//!     ]),
//! );
//! g.define(expr, M::seq([
//!     atom.into(),
//!     M::zero_or_more(M::seq(['+'.into(), atom.into()])),
//! ]));
//! let grammar = g.build().expect("valid grammar");
//! assert_eq!(grammar.rule_id("Atom"), Some(atom));
//! ```

pub mod analysis;
pub mod builder;
mod char_set;
pub mod matcher;
mod validate;

pub use analysis::GrammarMetrics;
pub use builder::GrammarBuilder;
pub use char_set::CharSet;
pub use matcher::Matcher;

use hashbrown::HashMap;
use lasso::{RodeoReader, Spur};
use std::fmt;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Stable index of a rule in its grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct RuleId(u32);

impl RuleId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn from_index(index: usize) -> Self {
        Self(u32::try_from(index).unwrap_or(u32::MAX))
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-rule engine behaviour
///
/// ```rust
/// use pegstack::RuleOptions;
///
/// let options = RuleOptions::new().memo_mismatches().suppress_node();
/// assert!(options.memo_mismatches && options.suppress_node);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RuleOptions {
    /// Remember at which positions this rule failed and fail immediately
    /// when it is invoked there again
    pub memo_mismatches: bool,
    /// Build no parse-tree node for this rule or anything below it
    pub suppress_node: bool,
    /// Build a node for this rule without children
    pub suppress_subnodes: bool,
    /// Build no node for this rule but keep its children in the parent
    pub skip_node: bool,
}

impl RuleOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            memo_mismatches: false,
            suppress_node: false,
            suppress_subnodes: false,
            skip_node: false,
        }
    }

    #[must_use]
    pub const fn memo_mismatches(mut self) -> Self {
        self.memo_mismatches = true;
        self
    }

    #[must_use]
    pub const fn suppress_node(mut self) -> Self {
        self.suppress_node = true;
        self
    }

    #[must_use]
    pub const fn suppress_subnodes(mut self) -> Self {
        self.suppress_subnodes = true;
        self
    }

    #[must_use]
    pub const fn skip_node(mut self) -> Self {
        self.skip_node = true;
        self
    }
}

/// A registered rule
#[derive(Debug)]
pub struct RuleDef<V> {
    pub(crate) name: Spur,
    pub(crate) matcher: Matcher<V>,
    pub(crate) options: RuleOptions,
}

impl<V> RuleDef<V> {
    #[must_use]
    pub const fn matcher(&self) -> &Matcher<V> {
        &self.matcher
    }

    #[must_use]
    pub const fn options(&self) -> RuleOptions {
        self.options
    }
}

/// An immutable, validated rule registry
///
/// A grammar is built once and shared by any number of parses, including
/// parses running concurrently on other threads.
pub struct Grammar<V> {
    rules: Vec<RuleDef<V>>,
    names: RodeoReader,
    by_name: HashMap<Spur, RuleId, ahash::RandomState>,
}

impl<V> Grammar<V> {
    pub(crate) fn new(
        rules: Vec<RuleDef<V>>,
        names: RodeoReader,
        by_name: HashMap<Spur, RuleId, ahash::RandomState>,
    ) -> Self {
        Self {
            rules,
            names,
            by_name,
        }
    }

    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Look a rule up by name
    #[must_use]
    pub fn rule_id(&self, name: &str) -> Option<RuleId> {
        let spur = self.names.get(name)?;
        self.by_name.get(&spur).copied()
    }

    /// Name of a rule, or `"?"` for an id from another grammar
    #[must_use]
    pub fn rule_name(&self, id: RuleId) -> &str {
        self.rules
            .get(id.index())
            .map_or("?", |rule| self.names.resolve(&rule.name))
    }

    #[must_use]
    pub fn rule(&self, id: RuleId) -> Option<&RuleDef<V>> {
        self.rules.get(id.index())
    }

    pub fn rules(&self) -> impl Iterator<Item = (RuleId, &str, &RuleDef<V>)> {
        self.rules
            .iter()
            .enumerate()
            .map(|(i, rule)| (RuleId::from_index(i), self.names.resolve(&rule.name), rule))
    }

    /// A parser over this grammar with the default configuration
    #[must_use]
    pub fn parser(&self) -> crate::parser::Parser<'_, V> {
        crate::parser::Parser::new(self)
    }
}

impl<V> fmt::Debug for Grammar<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|rule| self.names.resolve(&rule.name)))
            .finish()
    }
}
