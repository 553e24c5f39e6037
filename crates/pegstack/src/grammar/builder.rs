use compact_str::CompactString;
use hashbrown::HashMap;
use lasso::{Rodeo, Spur};

use super::{Grammar, Matcher, RuleDef, RuleId, RuleOptions, validate};
use crate::action::RuleVar;
use crate::error::GrammarError;

struct PendingRule<V> {
    name: Spur,
    matcher: Option<Matcher<V>>,
    options: RuleOptions,
}

/// Registers rules and freezes them into a [`Grammar`].
///
/// Rules are addressed by [`RuleId`]. [`declare`](Self::declare) hands out
/// an id for a name without a body so that rules can refer to each other
/// before all of them are defined; [`define`](Self::define) supplies the
/// body later. [`rule`](Self::rule) does both at once.
///
/// # Whitespace convention
///
/// With a [whitespace rule](Self::whitespace) registered, every string
/// literal ending in a single space, like `"+ "`, matches the literal without
/// the space followed by the whitespace rule.
///
/// # Example
///
/// ```rust
/// use pegstack::{GrammarBuilder, Matcher};
///
/// type M = Matcher<()>;
///
/// let mut g = GrammarBuilder::new();
/// let ws = g.rule("WhiteSpace", M::zero_or_more(M::any_of(" \t")));
/// g.whitespace(ws);
/// let list = g.rule("List", M::seq(["[ ".into(), "] ".into()]));
/// let grammar = g.build().expect("Failed to build grammar");
/// assert!(grammar.parser().parse(list, "[  ]  ").unwrap().is_success());
/// ```
pub struct GrammarBuilder<V> {
    rules: Vec<PendingRule<V>>,
    interner: Rodeo,
    by_name: HashMap<Spur, RuleId, ahash::RandomState>,
    whitespace: Option<RuleId>,
    errors: Vec<GrammarError>,
    vars: u32,
}

impl<V> Default for GrammarBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> GrammarBuilder<V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            interner: Rodeo::new(),
            by_name: HashMap::with_hasher(ahash::RandomState::new()),
            whitespace: None,
            errors: Vec::new(),
            vars: 0,
        }
    }

    /// Get the id of rule `name`, registering it without a body if needed.
    pub fn declare(&mut self, name: &str) -> RuleId {
        let spur = self.interner.get_or_intern(name);
        if let Some(&id) = self.by_name.get(&spur) {
            return id;
        }
        let id = RuleId::from_index(self.rules.len());
        self.rules.push(PendingRule {
            name: spur,
            matcher: None,
            options: RuleOptions::default(),
        });
        self.by_name.insert(spur, id);
        id
    }

    /// Supply the body of a declared rule.
    ///
    /// Defining a rule twice, or an id this builder never handed out, is
    /// reported by [`build`](Self::build).
    pub fn define(&mut self, id: RuleId, matcher: impl Into<Matcher<V>>) -> &mut Self {
        match self.rules.get_mut(id.index()) {
            Some(rule) if rule.matcher.is_some() => {
                let name = self.interner.resolve(&rule.name).to_owned();
                self.errors.push(GrammarError::DuplicateRule { name });
            }
            Some(rule) => rule.matcher = Some(matcher.into()),
            None => self.errors.push(GrammarError::UnknownRule {
                rule: "<builder>".to_owned(),
                id: id.raw(),
            }),
        }
        self
    }

    /// Declare and define a rule in one step.
    pub fn rule(&mut self, name: &str, matcher: impl Into<Matcher<V>>) -> RuleId {
        let id = self.declare(name);
        self.define(id, matcher);
        id
    }

    /// Declare and define a rule with engine options.
    pub fn rule_with(
        &mut self,
        name: &str,
        options: RuleOptions,
        matcher: impl Into<Matcher<V>>,
    ) -> RuleId {
        let id = self.rule(name, matcher);
        self.options(id, options);
        id
    }

    /// Replace the options of a rule.
    pub fn options(&mut self, id: RuleId, options: RuleOptions) -> &mut Self {
        if let Some(rule) = self.rules.get_mut(id.index()) {
            rule.options = options;
        }
        self
    }

    /// Register the rule string literals ending in a space are followed by.
    pub fn whitespace(&mut self, id: RuleId) -> &mut Self {
        self.whitespace = Some(id);
        self
    }

    /// A new variable for actions, holding a separate value in every rule
    /// invocation.
    ///
    /// ```rust
    /// use pegstack::{GrammarBuilder, Matcher};
    ///
    /// type M = Matcher<String>;
    ///
    /// let mut g = GrammarBuilder::new();
    /// let open = g.var::<char>();
    /// let quoted = g.rule(
    ///     "Quoted",
    ///     M::seq([
    ///         M::any_of("'\""),
    ///         M::exec(move |ctx| {
    ///             let quote = ctx.matched_char().unwrap_or('"');
    ///             ctx.set(open, quote);
    ///             Ok(())
    ///         }),
    ///         M::zero_or_more(M::none_of("'\"")),
    ///         M::push(|ctx| Ok(ctx.match_text().to_owned())),
    ///         M::any_of("'\""),
    ///         M::action(move |ctx| Ok(ctx.matched_char() == ctx.get(open).copied())),
    ///     ]),
    /// );
    /// let grammar = g.build().unwrap();
    /// let parser = grammar.parser();
    /// assert_eq!(parser.parse(quoted, "'hi'").unwrap().values(), Some(&["hi".to_owned()][..]));
    /// assert!(!parser.parse(quoted, "'hi\"").unwrap().is_success());
    /// ```
    pub fn var<T: 'static>(&mut self) -> RuleVar<T> {
        let var = RuleVar::new(self.vars);
        self.vars += 1;
        var
    }

    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Validate the rules and freeze them.
    ///
    /// # Errors
    ///
    /// Returns the first problem found: a rule defined twice or never
    /// defined, a reference to an unknown rule, an inverted character range,
    /// a repetition whose body can match the empty string, or left recursion.
    pub fn build(mut self) -> Result<Grammar<V>, GrammarError> {
        if let Some(error) = self.errors.drain(..).next() {
            return Err(error);
        }

        let mut rules = Vec::with_capacity(self.rules.len());
        for pending in self.rules {
            let Some(matcher) = pending.matcher else {
                return Err(GrammarError::UndefinedRule {
                    name: self.interner.resolve(&pending.name).to_owned(),
                });
            };
            let matcher = match self.whitespace {
                Some(ws) => expand_whitespace(matcher, ws),
                None => matcher,
            };
            rules.push(RuleDef {
                name: pending.name,
                matcher,
                options: pending.options,
            });
        }

        validate::validate(&rules, &self.interner)?;

        log::debug!("built grammar with {} rules", rules.len());
        Ok(Grammar::new(rules, self.interner.into_reader(), self.by_name))
    }
}

/// Rewrite `"lit "` literals into `"lit"` followed by the whitespace rule.
fn expand_whitespace<V>(matcher: Matcher<V>, ws: RuleId) -> Matcher<V> {
    let rewrite = |items: Vec<Matcher<V>>| -> Vec<Matcher<V>> {
        items.into_iter().map(|m| expand_whitespace(m, ws)).collect()
    };
    let boxed = |m: Box<Matcher<V>>| Box::new(expand_whitespace(*m, ws));

    match matcher {
        Matcher::String { text, ignore_case }
            if text.len() > 1 && text.ends_with(' ') && !text.ends_with("  ") =>
        {
            let trimmed = CompactString::from(&text[..text.len() - 1]);
            Matcher::Seq(vec![
                Matcher::String {
                    text: trimmed,
                    ignore_case,
                },
                Matcher::Rule(ws),
            ])
        }
        Matcher::Seq(items) => Matcher::Seq(rewrite(items)),
        Matcher::Choice(items) => Matcher::Choice(rewrite(items)),
        Matcher::ZeroOrMore(m) => Matcher::ZeroOrMore(boxed(m)),
        Matcher::OneOrMore(m) => Matcher::OneOrMore(boxed(m)),
        Matcher::Optional(m) => Matcher::Optional(boxed(m)),
        Matcher::Not(m) => Matcher::Not(boxed(m)),
        Matcher::Test(m) => Matcher::Test(boxed(m)),
        Matcher::Label { name, matcher } => Matcher::Label {
            name,
            matcher: boxed(matcher),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type M = Matcher<()>;

    #[test]
    fn declare_is_idempotent() {
        let mut g = GrammarBuilder::<()>::new();
        let a = g.declare("A");
        assert_eq!(g.declare("A"), a);
        assert_ne!(g.declare("B"), a);
        assert_eq!(g.rule_count(), 2);
    }

    #[test]
    fn undefined_rule_is_reported() {
        let mut g = GrammarBuilder::<()>::new();
        let missing = g.declare("Missing");
        g.rule("Root", M::rule(missing));
        assert_eq!(
            g.build().unwrap_err(),
            GrammarError::UndefinedRule {
                name: "Missing".to_owned()
            }
        );
    }

    #[test]
    fn duplicate_definition_is_reported() {
        let mut g = GrammarBuilder::<()>::new();
        let a = g.rule("A", M::ch('a'));
        g.define(a, M::ch('b'));
        assert_eq!(
            g.build().unwrap_err(),
            GrammarError::DuplicateRule {
                name: "A".to_owned()
            }
        );
    }

    #[test]
    fn trailing_space_literals_expand() {
        let ws = RuleId::from_index(0);
        let expanded = expand_whitespace(M::seq(["+ ".into(), "x".into(), " ".into()]), ws);
        let Matcher::Seq(items) = expanded else {
            panic!("expected a sequence");
        };
        assert!(matches!(&items[0], Matcher::Seq(inner)
            if matches!(&inner[0], Matcher::String { text, .. } if text == "+")
            && matches!(inner[1], Matcher::Rule(id) if id == ws)));
        assert!(matches!(&items[1], Matcher::String { text, .. } if text == "x"));
        assert!(matches!(&items[2], Matcher::String { text, .. } if text == " "));
    }
}
