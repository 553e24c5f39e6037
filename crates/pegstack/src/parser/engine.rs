//! # Backtracking Engine
//!
//! Evaluates a [`Matcher`] tree against one input. Every matcher either
//! matches, leaving the cursor after what it consumed, or mismatches, leaving
//! the cursor exactly where it started. Mismatches are plain `false` values;
//! only fatal conditions travel as [`ParseError`].

use smallvec::SmallVec;

use super::ParserConfig;
use super::driver::{ParseEvent, ParseEventHandler, ParseStats};
use super::frontier::{ErrorFrontier, Expected, FrontierMark};
use super::recovery::{RecoveredError, RecoveryState};
use super::state::{MemoContext, MemoTable};
use crate::action::{Action, ActionContext, RuleVars, ValueStack};
use crate::error::ParseError;
use crate::grammar::{Grammar, Matcher, RuleId};
use crate::input::{Cursor, Input, Span};
use crate::syntax::{ParseNode, TreeBuilder};

type Eval = Result<bool, ParseError>;

/// Stack left when a new segment is allocated
const RED_ZONE: usize = 128 * 1024;
/// Size of each additional stack segment
const STACK_SEGMENT: usize = 2 * 1024 * 1024;

/// Everything one pass leaves behind
pub(crate) struct PassResult<'a, V> {
    pub(crate) end: usize,
    pub(crate) values: Vec<V>,
    pub(crate) tree: Option<ParseNode>,
    pub(crate) frontier: ErrorFrontier<'a, V>,
    pub(crate) recovered: Vec<RecoveredError>,
    pub(crate) stats: ParseStats,
}

/// State of one pass over the input
pub(crate) struct Engine<'a, 'h, V> {
    grammar: &'a Grammar<V>,
    input: &'a Input<'a>,
    cursor: Cursor<'a>,
    config: &'a ParserConfig,
    stack: ValueStack<V>,
    vars: RuleVars,
    frontier: ErrorFrontier<'a, V>,
    memo: MemoTable,
    tree: Option<TreeBuilder>,
    recovery: Option<RecoveryState>,
    handler: &'a mut (dyn ParseEventHandler + 'h),
    stats: ParseStats,
    depth: usize,
    probes: usize,
    current_rule: Option<RuleId>,
    /// Rules and labels entered with their start offsets, innermost last;
    /// kept during recovery only
    scopes: SmallVec<[(Expected<'a, V>, usize); 16]>,
}

impl<'a, 'h, V> Engine<'a, 'h, V> {
    pub(crate) fn new(
        grammar: &'a Grammar<V>,
        input: &'a Input<'a>,
        config: &'a ParserConfig,
        handler: &'a mut (dyn ParseEventHandler + 'h),
        recovery: Option<RecoveryState>,
    ) -> Self {
        Self {
            grammar,
            input,
            cursor: input.cursor(),
            config,
            stack: ValueStack::new(),
            vars: RuleVars::new(),
            frontier: ErrorFrontier::new(),
            memo: MemoTable::new(config.max_memo_entries),
            tree: config.build_parse_tree.then(TreeBuilder::new),
            recovery,
            handler,
            stats: ParseStats::new(),
            depth: 0,
            probes: 0,
            current_rule: None,
            scopes: SmallVec::new(),
        }
    }

    /// Match `root` at the start of the input.
    pub(crate) fn run(&mut self, root: RuleId) -> Eval {
        if let Some(error_offset) = self.recovery.as_ref().map(|r| r.error_offset) {
            self.emit(ParseEvent::RecoveryPass { error_offset });
        }
        self.rule(root)
    }

    /// Whether the cursor reached the end; records `EOI` as expected if not.
    pub(crate) fn expect_end(&mut self) -> bool {
        if self.cursor.at_end() {
            return true;
        }
        if self.recording() {
            self.frontier.record(self.cursor.pos(), Expected::EndOfInput);
        }
        false
    }

    pub(crate) fn finish(self, root: RuleId) -> PassResult<'a, V> {
        let end = self.cursor.pos();
        let label = self.grammar.rule_name(root).into();
        PassResult {
            end,
            values: self.stack.into_vec(),
            tree: self.tree.map(|tree| tree.finish(label, Span::new(0, end))),
            frontier: self.frontier,
            recovered: self.recovery.map(|r| r.errors).unwrap_or_default(),
            stats: self.stats,
        }
    }

    fn emit(&mut self, event: ParseEvent) {
        if self.config.trace_events {
            log::trace!("{event:?}");
        }
        self.handler.handle(event);
    }

    /// Mismatches feed the error frontier only in the first pass, outside
    /// lookahead.
    const fn recording(&self) -> bool {
        self.probes == 0 && self.recovery.is_none()
    }

    fn inserted(&self) -> usize {
        self.recovery.as_ref().map_or(0, RecoveryState::inserted)
    }

    fn commit(&mut self, committed: bool) -> Option<bool> {
        self.recovery.as_mut().map(|r| r.commit(committed))
    }

    /// Everything besides rule and position that decides whether a rule
    /// matches in this pass
    fn memo_context(&self) -> MemoContext {
        self.recovery
            .as_ref()
            .map_or(MemoContext::FirstPass, |r| MemoContext::Recovery {
                committed: r.committed,
                insertions_enabled: r.insertions_enabled,
                in_probe: self.probes > 0,
                inserted: r.inserted(),
            })
    }

    fn restore_commitment(&mut self, saved: Option<bool>) {
        if let (Some(recovery), Some(committed)) = (self.recovery.as_mut(), saved) {
            recovery.committed = committed;
        }
    }

    /// Nesting depth is bounded by `max_depth`, not by the thread's stack.
    fn eval(&mut self, matcher: &'a Matcher<V>) -> Eval {
        stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, || self.eval_matcher(matcher))
    }

    fn eval_matcher(&mut self, matcher: &'a Matcher<V>) -> Eval {
        let start = self.cursor.mark();
        let tree_mark = self.tree.as_ref().map(TreeBuilder::mark);

        let matched = match matcher {
            Matcher::Seq(items) => self.sequence(items)?,
            Matcher::Choice(items) => self.choice(items)?,
            Matcher::ZeroOrMore(body) => self.repeat(body, false)?,
            Matcher::OneOrMore(body) => self.repeat(body, true)?,
            Matcher::Optional(body) => self.optional(body)?,
            Matcher::Not(body) => self.probe(body, false)?,
            Matcher::Test(body) => self.probe(body, true)?,
            Matcher::Rule(id) => self.rule(*id)?,
            Matcher::Label { name, matcher } => self.labeled(name, matcher)?,
            Matcher::Action(action) => {
                let here = Span::empty(self.cursor.pos());
                self.run_action(action, here, false)?
            }
            terminal => self.terminal(terminal),
        };

        if !matched {
            self.cursor.reset(start);
            if let (Some(tree), Some(mark)) = (self.tree.as_mut(), tree_mark) {
                tree.truncate(mark);
            }
        }
        Ok(matched)
    }

    fn terminal(&mut self, matcher: &'a Matcher<V>) -> bool {
        let matched = match matcher {
            Matcher::Char(expected) => self.cursor.eat_char(|c| c == *expected),
            Matcher::CharRange(low, high) => self.cursor.eat_char(|c| (*low..=*high).contains(&c)),
            Matcher::CharSet(set) => self.cursor.eat_char(|c| set.matches(c)),
            Matcher::String { text, ignore_case } => {
                if *ignore_case {
                    self.cursor.eat_str_ignore_case(text)
                } else {
                    self.cursor.eat_str(text)
                }
            }
            Matcher::Any => self.cursor.eat_char(|_| true),
            Matcher::Eoi => self.cursor.at_end(),
            Matcher::Empty => true,
            _ => false,
        };
        if matched {
            return true;
        }

        let at = self.cursor.pos();
        if self.stand_in(matcher, at) {
            return true;
        }
        if self.recording() {
            self.frontier.record(at, Expected::Terminal(matcher));
        }
        false
    }

    /// Report a failed terminal as a zero-width match, if recovery allows.
    fn stand_in(&mut self, terminal: &'a Matcher<V>, at: usize) -> bool {
        if self.probes > 0 || matches!(terminal, Matcher::Eoi | Matcher::Nothing) {
            return false;
        }
        let Some(recovery) = self.recovery.as_mut() else {
            return false;
        };
        if !recovery.allows_insertion(at) {
            return false;
        }
        // A rule that is missing entirely is reported by name, a gap
        // inside a rule by the terminal.
        let expected = match self.scopes.last() {
            Some(&(scope, start)) if start == at => scope.describe(self.grammar),
            _ => terminal.describe(self.grammar),
        };
        log::debug!("standing in for {expected} at offset {at}");
        recovery.errors.push(RecoveredError {
            position: self.input.position(at),
            expected,
        });
        self.stats.recovered_errors += 1;
        self.emit(ParseEvent::Inserted { position: at });
        true
    }

    fn sequence(&mut self, items: &'a [Matcher<V>]) -> Eval {
        let start = self.cursor.pos();
        let inherited = self.recovery.as_ref().is_some_and(|r| r.committed);
        let mut previous = Span::empty(start);
        let mut previous_synthetic = false;
        let mut matched = true;

        for item in items {
            if let Matcher::Action(action) = item {
                if !self.run_action(action, previous, previous_synthetic)? {
                    matched = false;
                    break;
                }
                continue;
            }

            self.commit(inherited || self.cursor.pos() > start);
            let before = self.cursor.pos();
            let inserted = self.inserted();
            if !self.eval(item)? {
                matched = false;
                break;
            }
            previous = Span::new(before, self.cursor.pos());
            previous_synthetic = previous.is_empty() && self.inserted() > inserted;
        }

        self.commit(inherited);
        Ok(matched)
    }

    fn choice(&mut self, items: &'a [Matcher<V>]) -> Eval {
        let two_rounds = self.probes == 0
            && self
                .recovery
                .as_ref()
                .is_some_and(|r| r.insertions_enabled);
        if !two_rounds {
            return self.alternatives(items);
        }

        // First round without stand-ins, so a later alternative that matches
        // the real input wins over an earlier one that needs repair.
        let saved_would_insert = self.recovery.as_mut().is_some_and(|r| {
            r.insertions_enabled = false;
            std::mem::replace(&mut r.would_insert, false)
        });
        let stack_mark = self.stack.begin_probe();
        let first_round = self.alternatives(items);
        let would_insert = self.recovery.as_mut().is_some_and(|r| {
            r.insertions_enabled = true;
            std::mem::replace(&mut r.would_insert, saved_would_insert)
        });

        if first_round? {
            self.stack.commit_probe(stack_mark);
            Ok(true)
        } else if would_insert {
            // The second round re-runs the same actions.
            self.stack.end_probe(stack_mark);
            self.alternatives(items)
        } else {
            self.stack.commit_probe(stack_mark);
            Ok(false)
        }
    }

    fn alternatives(&mut self, items: &'a [Matcher<V>]) -> Eval {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.stats.backtracks += 1;
                self.emit(ParseEvent::Backtrack {
                    position: self.cursor.pos(),
                });
            }
            if self.eval(item)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn repeat(&mut self, body: &'a Matcher<V>, at_least_once: bool) -> Eval {
        let saved = self.recovery.as_ref().map(|r| r.committed);
        let mut count = 0_usize;
        loop {
            // Only the mandatory first iteration of `OneOrMore` stays committed.
            if count > 0 || !at_least_once {
                self.commit(false);
            }
            let before = self.cursor.pos();
            if !self.eval(body)? {
                break;
            }
            count += 1;
            // A stood-in body matches without consuming; stop there.
            if self.cursor.pos() == before {
                break;
            }
        }
        self.restore_commitment(saved);
        Ok(count > 0 || !at_least_once)
    }

    fn optional(&mut self, body: &'a Matcher<V>) -> Eval {
        let saved = self.commit(false);
        let result = self.eval(body);
        self.restore_commitment(saved);
        result.map(|_| true)
    }

    /// `Test` when `expect_match`, else `Not`. Never consumes input and
    /// undoes every stack change the body made.
    fn probe(&mut self, body: &'a Matcher<V>, expect_match: bool) -> Eval {
        let start = self.cursor.mark();
        let tree_mark = self.tree.as_ref().map(TreeBuilder::mark);
        let stack_mark = self.stack.begin_probe();
        let saved = self.commit(false);
        self.probes += 1;

        let result = self.eval(body);

        self.probes -= 1;
        self.restore_commitment(saved);
        self.stack.end_probe(stack_mark);
        self.cursor.reset(start);
        if let (Some(tree), Some(mark)) = (self.tree.as_mut(), tree_mark) {
            tree.truncate(mark);
        }
        Ok(result? == expect_match)
    }

    fn rule(&mut self, id: RuleId) -> Eval {
        let grammar = self.grammar;
        let def = grammar
            .rule(id)
            .ok_or(ParseError::UnknownRoot { id: id.raw() })?;
        let start = self.cursor.pos();
        if self.depth >= self.config.max_depth {
            return Err(ParseError::RecursionLimit {
                limit: self.config.max_depth,
                position: self.input.position(start),
            });
        }

        let options = def.options();
        let memo_context = (self.config.memoization && options.memo_mismatches)
            .then(|| self.memo_context());
        if let Some(context) = memo_context {
            if let Some(would_insert) = self.memo.known_mismatch(id, start, context) {
                self.stats.memo_hits += 1;
                self.emit(ParseEvent::MemoHit {
                    rule: id,
                    position: start,
                });
                if let Some(recovery) = self.recovery.as_mut() {
                    recovery.would_insert |= would_insert;
                }
                let mark = self.frontier.mark();
                self.record_named(start, mark, Expected::Rule(id));
                return Ok(false);
            }
            self.stats.memo_misses += 1;
        }

        self.stats.rule_calls += 1;
        self.depth += 1;
        self.stats.max_depth = self.stats.max_depth.max(self.depth);
        self.emit(ParseEvent::EnterRule {
            rule: id,
            position: start,
        });

        let frontier_mark = self.frontier.mark();
        let tree_mark = self.tree.as_ref().map(TreeBuilder::mark);
        let suppress = options.suppress_node || options.suppress_subnodes;
        if suppress {
            if let Some(tree) = self.tree.as_mut() {
                tree.suppress();
            }
        }
        let scoped = self.recovery.is_some();
        if scoped {
            self.scopes.push((Expected::Rule(id), start));
        }
        let outer_rule = self.current_rule.replace(id);
        let inserted = self.inserted();
        // The rule's own refused stand-ins, kept apart for the memo table
        let outer_would_insert = self
            .recovery
            .as_mut()
            .is_some_and(|r| std::mem::replace(&mut r.would_insert, false));
        self.vars.enter();

        let result = self.eval(def.matcher());

        self.vars.exit();
        let would_insert = self.recovery.as_mut().is_some_and(|r| {
            let own = r.would_insert;
            r.would_insert |= outer_would_insert;
            own
        });
        self.current_rule = outer_rule;
        if scoped {
            self.scopes.pop();
        }
        if suppress {
            if let Some(tree) = self.tree.as_mut() {
                tree.resume();
            }
        }
        self.depth -= 1;
        let matched = result?;

        if matched {
            if let (Some(tree), Some(mark)) = (self.tree.as_mut(), tree_mark) {
                if !options.suppress_node && !options.skip_node {
                    let span = Span::new(start, self.cursor.pos());
                    tree.finish_node(mark, grammar.rule_name(id).into(), span, Some(id));
                }
            }
        } else {
            // A mismatch that left stand-ins behind is not replayable.
            if let Some(context) = memo_context {
                if self.inserted() == inserted {
                    self.memo.record_mismatch(id, start, context, would_insert);
                }
            }
            self.record_named(start, frontier_mark, Expected::Rule(id));
        }

        self.emit(ParseEvent::ExitRule {
            rule: id,
            position: self.cursor.pos(),
            matched,
        });
        Ok(matched)
    }

    fn labeled(&mut self, name: &'a str, body: &'a Matcher<V>) -> Eval {
        let start = self.cursor.pos();
        let frontier_mark = self.frontier.mark();
        let tree_mark = self.tree.as_ref().map(TreeBuilder::mark);
        let scoped = self.recovery.is_some();
        if scoped {
            self.scopes.push((Expected::Labeled(name), start));
        }

        let result = self.eval(body);

        if scoped {
            self.scopes.pop();
        }
        let matched = result?;
        if matched {
            if let (Some(tree), Some(mark)) = (self.tree.as_mut(), tree_mark) {
                let span = Span::new(start, self.cursor.pos());
                tree.finish_node(mark, name.into(), span, None);
            }
        } else {
            self.record_named(start, frontier_mark, Expected::Labeled(name));
        }
        Ok(matched)
    }

    fn record_named(&mut self, start: usize, mark: FrontierMark, expected: Expected<'a, V>) {
        if self.recording() {
            self.frontier.record_named(start, mark, expected);
        }
    }

    fn run_action(&mut self, action: &Action<V>, matched: Span, synthetic: bool) -> Eval {
        self.stats.actions_run += 1;
        let recovering = self.recovery.is_some();
        let mut ctx = ActionContext::new(
            &mut self.stack,
            &mut self.vars,
            self.input.text(),
            matched,
            synthetic,
            recovering,
        );
        action.call(&mut ctx).map_err(|source| ParseError::Action {
            rule: self
                .current_rule
                .map_or("?", |id| self.grammar.rule_name(id))
                .into(),
            position: self.input.position(matched.end()),
            source,
        })
    }
}
