//! The matcher tree
//!
//! A [`Matcher`] is one grammar construct. Terminals consume characters,
//! combinators compose other matchers, [`Matcher::Rule`] refers to a rule of
//! the grammar by id and [`Matcher::Action`] runs user code on the value
//! stack. Matchers are plain data: they are built once, frozen inside a
//! [`Grammar`](super::Grammar) and shared by every parse.

use compact_str::{CompactString, ToCompactString, format_compact};

use super::{CharSet, Grammar, RuleId};
use crate::action::{Action, ActionContext, ActionResult};
use crate::error::ActionError;
use crate::input::{DEDENT, INDENT};

/// A grammar construct
#[derive(Debug, Clone)]
pub enum Matcher<V> {
    // Terminals
    /// A single character
    Char(char),
    /// A character in the inclusive range
    CharRange(char, char),
    /// A character in the set
    CharSet(CharSet),
    /// A literal string, optionally compared ignoring case
    String {
        /// Literal text
        text: CompactString,
        /// Compare case-insensitively
        ignore_case: bool,
    },
    /// Any single character
    Any,
    /// End of input, zero-width
    Eoi,
    /// Always matches, zero-width
    Empty,
    /// Never matches
    Nothing,

    // Combinators
    /// All children in order
    Seq(Vec<Matcher<V>>),
    /// The first child that matches
    Choice(Vec<Matcher<V>>),
    /// The child as often as it matches
    ZeroOrMore(Box<Matcher<V>>),
    /// The child at least once, then as often as it matches
    OneOrMore(Box<Matcher<V>>),
    /// The child if it matches, else nothing
    Optional(Box<Matcher<V>>),
    /// Negative lookahead, zero-width
    Not(Box<Matcher<V>>),
    /// Positive lookahead, zero-width
    Test(Box<Matcher<V>>),
    /// Reference to a grammar rule
    Rule(RuleId),
    /// Name a sub-expression in error reports
    Label {
        /// Reported name
        name: CompactString,
        /// Labeled matcher
        matcher: Box<Matcher<V>>,
    },

    /// User code run against the value stack
    Action(Action<V>),
}

impl<V> Matcher<V> {
    #[must_use]
    pub const fn ch(c: char) -> Self {
        Self::Char(c)
    }

    /// A character in `low..=high`
    #[must_use]
    pub const fn range(low: char, high: char) -> Self {
        Self::CharRange(low, high)
    }

    /// Any of the characters in `chars`
    #[must_use]
    pub fn any_of(chars: &str) -> Self {
        let mut it = chars.chars();
        match (it.next(), it.next()) {
            (Some(c), None) => Self::Char(c),
            _ => Self::CharSet(CharSet::any_of(chars)),
        }
    }

    /// Any character except those in `chars`; never matches at end of input
    #[must_use]
    pub fn none_of(chars: &str) -> Self {
        Self::CharSet(CharSet::none_of(chars))
    }

    #[must_use]
    pub const fn char_set(set: CharSet) -> Self {
        Self::CharSet(set)
    }

    /// A literal string
    #[must_use]
    pub fn string(text: &str) -> Self {
        Self::String {
            text: text.to_compact_string(),
            ignore_case: false,
        }
    }

    /// A literal string compared ignoring case
    #[must_use]
    pub fn ignore_case(text: &str) -> Self {
        Self::String {
            text: text.to_compact_string(),
            ignore_case: true,
        }
    }

    #[must_use]
    pub const fn any() -> Self {
        Self::Any
    }

    #[must_use]
    pub const fn eoi() -> Self {
        Self::Eoi
    }

    #[must_use]
    pub const fn empty() -> Self {
        Self::Empty
    }

    #[must_use]
    pub const fn nothing() -> Self {
        Self::Nothing
    }

    /// The indentation marker inserted by [`Input::with_indentation`](crate::input::Input::with_indentation)
    #[must_use]
    pub const fn indent() -> Self {
        Self::Char(INDENT)
    }

    /// The dedentation marker inserted by [`Input::with_indentation`](crate::input::Input::with_indentation)
    #[must_use]
    pub const fn dedent() -> Self {
        Self::Char(DEDENT)
    }

    /// A sequence; a single element is returned as is
    #[must_use]
    pub fn seq<I>(matchers: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let mut items: Vec<_> = matchers.into_iter().collect();
        match items.len() {
            0 => Self::Empty,
            1 => items.remove(0),
            _ => Self::Seq(items),
        }
    }

    /// An ordered choice; a single alternative is returned as is
    #[must_use]
    pub fn first_of<I>(matchers: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let mut items: Vec<_> = matchers.into_iter().collect();
        match items.len() {
            0 => Self::Nothing,
            1 => items.remove(0),
            _ => Self::Choice(items),
        }
    }

    #[must_use]
    pub fn zero_or_more(matcher: impl Into<Self>) -> Self {
        Self::ZeroOrMore(Box::new(matcher.into()))
    }

    #[must_use]
    pub fn one_or_more(matcher: impl Into<Self>) -> Self {
        Self::OneOrMore(Box::new(matcher.into()))
    }

    #[must_use]
    pub fn optional(matcher: impl Into<Self>) -> Self {
        Self::Optional(Box::new(matcher.into()))
    }

    /// Succeeds iff `matcher` does not match here; consumes nothing
    #[must_use]
    pub fn test_not(matcher: impl Into<Self>) -> Self {
        Self::Not(Box::new(matcher.into()))
    }

    /// Succeeds iff `matcher` matches here; consumes nothing
    #[must_use]
    pub fn test(matcher: impl Into<Self>) -> Self {
        Self::Test(Box::new(matcher.into()))
    }

    #[must_use]
    pub const fn rule(id: RuleId) -> Self {
        Self::Rule(id)
    }

    /// Report this matcher as `name` when it fails
    #[must_use]
    pub fn label(self, name: &str) -> Self {
        Self::Label {
            name: name.to_compact_string(),
            matcher: Box::new(self),
        }
    }

    /// An action; its `Ok(false)` fails the enclosing sequence
    #[must_use]
    pub fn action<F>(f: F) -> Self
    where
        F: Fn(&mut ActionContext<'_, V>) -> ActionResult + Send + Sync + 'static,
    {
        Self::Action(Action::new(f))
    }

    /// An action that always succeeds
    #[must_use]
    pub fn exec<F>(f: F) -> Self
    where
        F: Fn(&mut ActionContext<'_, V>) -> Result<(), ActionError> + Send + Sync + 'static,
    {
        Self::action(move |ctx| f(ctx).map(|()| true))
    }

    /// An action pushing the value computed by `f`
    #[must_use]
    pub fn push<F>(f: F) -> Self
    where
        F: Fn(&mut ActionContext<'_, V>) -> Result<V, ActionError> + Send + Sync + 'static,
    {
        Self::action(move |ctx| {
            let value = f(ctx)?;
            ctx.push(value);
            Ok(true)
        })
    }

    /// An action pushing a copy of `value`
    #[must_use]
    pub fn push_value(value: V) -> Self
    where
        V: Clone + Send + Sync + 'static,
    {
        Self::action(move |ctx| {
            ctx.push(value.clone());
            Ok(true)
        })
    }

    /// Whether this matcher is a terminal
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Char(_)
                | Self::CharRange(..)
                | Self::CharSet(_)
                | Self::String { .. }
                | Self::Any
                | Self::Eoi
                | Self::Empty
                | Self::Nothing
        )
    }

    /// Direct children of a combinator
    pub fn children(&self) -> &[Self] {
        match self {
            Self::Seq(items) | Self::Choice(items) => items,
            Self::ZeroOrMore(m)
            | Self::OneOrMore(m)
            | Self::Optional(m)
            | Self::Not(m)
            | Self::Test(m)
            | Self::Label { matcher: m, .. } => std::slice::from_ref(m),
            _ => &[],
        }
    }

    /// The label this matcher is reported under in error messages
    pub(crate) fn describe(&self, grammar: &Grammar<V>) -> CompactString {
        match self {
            Self::Char(INDENT) => CompactString::const_new("INDENT"),
            Self::Char(DEDENT) => CompactString::const_new("DEDENT"),
            Self::Char(c) => format_compact!("{c:?}"),
            Self::CharRange(low, high) => format_compact!("{low:?}..{high:?}"),
            Self::CharSet(set) => set.describe(),
            Self::String { text, .. } => format_compact!("{:?}", text.as_str()),
            Self::Any => CompactString::const_new("ANY"),
            Self::Eoi => CompactString::const_new("EOI"),
            Self::Empty => CompactString::const_new("EMPTY"),
            Self::Nothing => CompactString::const_new("NOTHING"),
            Self::Seq(_) => CompactString::const_new("sequence"),
            Self::Choice(_) => CompactString::const_new("choice"),
            Self::ZeroOrMore(_) | Self::OneOrMore(_) => CompactString::const_new("repetition"),
            Self::Optional(_) => CompactString::const_new("optional"),
            Self::Not(_) | Self::Test(_) => CompactString::const_new("lookahead"),
            Self::Rule(id) => grammar.rule_name(*id).to_compact_string(),
            Self::Label { name, .. } => name.clone(),
            Self::Action(_) => CompactString::const_new("action"),
        }
    }
}

impl<V> Matcher<V>
where
    V: Clone,
{
    /// Exactly `n` repetitions of `matcher`
    #[must_use]
    pub fn n_times(n: usize, matcher: impl Into<Self>) -> Self {
        let matcher = matcher.into();
        Self::seq(std::iter::repeat_n(matcher, n))
    }
}

impl<V> From<char> for Matcher<V> {
    fn from(c: char) -> Self {
        Self::Char(c)
    }
}

impl<V> From<&str> for Matcher<V> {
    fn from(text: &str) -> Self {
        Self::string(text)
    }
}

impl<V> From<RuleId> for Matcher<V> {
    fn from(id: RuleId) -> Self {
        Self::Rule(id)
    }
}
