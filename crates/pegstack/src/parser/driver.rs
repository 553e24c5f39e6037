//! # Parse Driver
//!
//! A [`ParseRun`] is one invocation of a root rule over one input. It moves
//! through a small state machine:
//!
//! ```text
//! Ready ──run()──▶ Running ──▶ Succeeded
//!                          ├─▶ Failed
//!                          └─▶ Aborted
//! ```
//!
//! `Succeeded` means the root rule matched and consumed the whole input.
//! `Failed` carries the error frontier and, with recovery enabled, the result
//! of the recovery pass. `Aborted` carries a fatal [`ParseError`]. The
//! terminal states are final: running again returns the stored result.

use compact_str::CompactString;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use super::engine::{Engine, PassResult};
use super::recovery::RecoveryState;
use super::{ParseFailure, ParseOutcome, ParseSuccess, ParserConfig, RecoveredParse};
use crate::error::ParseError;
use crate::grammar::{Grammar, RuleId};
use crate::input::Input;

/// Statistics collected during parsing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct ParseStats {
    /// Rule bodies evaluated
    pub rule_calls: usize,
    /// Choice alternatives tried after the first
    pub backtracks: usize,
    /// Rule invocations answered from the memo table
    pub memo_hits: usize,
    /// Memoized rule invocations that had to be evaluated
    pub memo_misses: usize,
    /// Actions executed, including those of failed alternatives
    pub actions_run: usize,
    /// Deepest nesting of rule invocations
    pub max_depth: usize,
    /// Stand-ins made by the recovery pass
    pub recovered_errors: usize,
}

impl ParseStats {
    /// Create new empty stats
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rule_calls: 0,
            backtracks: 0,
            memo_hits: 0,
            memo_misses: 0,
            actions_run: 0,
            max_depth: 0,
            recovered_errors: 0,
        }
    }

    /// Merge stats from another instance
    pub fn merge(&mut self, other: &Self) {
        self.rule_calls += other.rule_calls;
        self.backtracks += other.backtracks;
        self.memo_hits += other.memo_hits;
        self.memo_misses += other.memo_misses;
        self.actions_run += other.actions_run;
        self.max_depth = self.max_depth.max(other.max_depth);
        self.recovered_errors += other.recovered_errors;
    }
}

/// A parsing event for debugging/tracing
///
/// Positions are byte offsets into the parsed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseEvent {
    /// Started evaluating a rule
    EnterRule { rule: RuleId, position: usize },
    /// Finished evaluating a rule; `position` is where the cursor ended up
    ExitRule {
        rule: RuleId,
        position: usize,
        matched: bool,
    },
    /// A memoized rule failed without being evaluated
    MemoHit { rule: RuleId, position: usize },
    /// A choice moved on to its next alternative
    Backtrack { position: usize },
    /// The recovery pass started
    RecoveryPass { error_offset: usize },
    /// The recovery pass stood in for a missing terminal
    Inserted { position: usize },
}

/// Trait for receiving parse events (for debugging/tracing)
pub trait ParseEventHandler: Send {
    /// Handle a parse event
    fn handle(&mut self, event: ParseEvent);
}

/// A no-op event handler
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEventHandler;

impl ParseEventHandler for NullEventHandler {
    fn handle(&mut self, _event: ParseEvent) {}
}

/// Records every event
impl ParseEventHandler for Vec<ParseEvent> {
    fn handle(&mut self, event: ParseEvent) {
        self.push(event);
    }
}

/// Observable state of a [`ParseRun`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Ready,
    Running,
    Succeeded,
    Failed,
    Aborted,
}

enum RunState<V> {
    Ready,
    Running,
    Finished(Result<ParseOutcome<V>, ParseError>),
}

/// One invocation of a root rule over one input
///
/// # Example
///
/// ```rust
/// use pegstack::{DriverState, GrammarBuilder, Input, Matcher, ParseEvent, ParseRun, ParserConfig};
///
/// type M = Matcher<()>;
///
/// let mut builder = GrammarBuilder::new();
/// let word = builder.rule("Word", M::one_or_more(M::range('a', 'z')));
/// let grammar = builder.build().unwrap();
///
/// let input = Input::new("abc");
/// let mut events: Vec<ParseEvent> = Vec::new();
/// let mut run = ParseRun::new(&grammar, &input, word, ParserConfig::default())
///     .with_handler(&mut events);
/// assert_eq!(run.state(), DriverState::Ready);
/// assert!(run.run().unwrap().is_success());
/// assert_eq!(run.state(), DriverState::Succeeded);
/// drop(run);
/// assert!(matches!(events[0], ParseEvent::EnterRule { position: 0, .. }));
/// ```
pub struct ParseRun<'p, V> {
    grammar: &'p Grammar<V>,
    input: &'p Input<'p>,
    root: RuleId,
    config: ParserConfig,
    handler: Option<&'p mut dyn ParseEventHandler>,
    state: RunState<V>,
}

impl<'p, V> ParseRun<'p, V> {
    #[must_use]
    pub fn new(
        grammar: &'p Grammar<V>,
        input: &'p Input<'p>,
        root: RuleId,
        config: ParserConfig,
    ) -> Self {
        Self {
            grammar,
            input,
            root,
            config,
            handler: None,
            state: RunState::Ready,
        }
    }

    /// Send every parse event to `handler`.
    #[must_use]
    pub fn with_handler(mut self, handler: &'p mut dyn ParseEventHandler) -> Self {
        self.handler = Some(handler);
        self
    }

    #[must_use]
    pub fn state(&self) -> DriverState {
        match &self.state {
            RunState::Ready => DriverState::Ready,
            RunState::Running => DriverState::Running,
            RunState::Finished(Ok(ParseOutcome::Succeeded(_))) => DriverState::Succeeded,
            RunState::Finished(Ok(ParseOutcome::Failed(_))) => DriverState::Failed,
            RunState::Finished(Err(_)) => DriverState::Aborted,
        }
    }

    /// Run the parse, or return the result of the earlier run.
    ///
    /// # Errors
    ///
    /// A fatal [`ParseError`]: an action failed or the recursion limit was
    /// exceeded.
    pub fn run(&mut self) -> Result<&ParseOutcome<V>, ParseError> {
        if matches!(self.state, RunState::Ready) {
            self.state = RunState::Running;
            log::debug!(
                "parse of `{}` over {} bytes: Ready -> Running",
                self.grammar.rule_name(self.root),
                self.input.len()
            );
            let mut null = NullEventHandler;
            let handler: &mut (dyn ParseEventHandler + 'p) = match self.handler.as_deref_mut() {
                Some(handler) => handler,
                None => &mut null,
            };
            let result = execute(self.grammar, self.input, self.root, &self.config, handler);
            self.state = RunState::Finished(result);
            log::debug!(
                "parse of `{}`: Running -> {:?}",
                self.grammar.rule_name(self.root),
                self.state()
            );
        }
        match &self.state {
            RunState::Finished(Ok(outcome)) => Ok(outcome),
            RunState::Finished(Err(err)) => Err(err.clone()),
            RunState::Ready | RunState::Running => Err(ParseError::UnknownRoot {
                id: self.root.raw(),
            }),
        }
    }

    /// Run the parse if needed and take its result.
    ///
    /// # Errors
    ///
    /// Same as [`run`](Self::run).
    pub fn into_outcome(mut self) -> Result<ParseOutcome<V>, ParseError> {
        if matches!(self.state, RunState::Ready) {
            self.run()?;
        }
        match self.state {
            RunState::Finished(result) => result,
            RunState::Ready | RunState::Running => Err(ParseError::UnknownRoot {
                id: self.root.raw(),
            }),
        }
    }
}

fn execute<'p, V>(
    grammar: &Grammar<V>,
    input: &Input<'_>,
    root: RuleId,
    config: &ParserConfig,
    handler: &mut (dyn ParseEventHandler + 'p),
) -> Result<ParseOutcome<V>, ParseError> {
    if grammar.rule(root).is_none() {
        return Err(ParseError::UnknownRoot { id: root.raw() });
    }

    let mut engine = Engine::new(grammar, input, config, &mut *handler, None);
    let complete = engine.run(root)? && engine.expect_end();
    let PassResult {
        end,
        values,
        tree,
        frontier,
        stats,
        ..
    } = engine.finish(root);

    if complete {
        return Ok(ParseOutcome::Succeeded(ParseSuccess {
            end: input.position(end),
            values,
            tree,
            stats,
        }));
    }

    let error_offset = frontier.position();
    let expected: Vec<CompactString> = frontier.labels(grammar);
    drop(frontier);
    let found = input.text().get(error_offset..).and_then(|rest| rest.chars().next());
    let mut stats = stats;

    let recovered = if config.recovery {
        log::debug!("parse failed at offset {error_offset}, running recovery pass");
        let recovery = RecoveryState::new(error_offset, config.max_recovered_errors);
        let mut engine = Engine::new(grammar, input, config, &mut *handler, Some(recovery));
        match engine.run(root) {
            Ok(matched) => {
                let complete = matched && engine.expect_end();
                let pass = engine.finish(root);
                stats.merge(&pass.stats);
                matched.then(|| RecoveredParse {
                    end: input.position(pass.end),
                    complete,
                    values: pass.values,
                    errors: pass.recovered,
                    tree: pass.tree,
                })
            }
            Err(err) => {
                log::debug!("recovery pass aborted: {err}");
                None
            }
        }
    } else {
        None
    };

    Ok(ParseOutcome::Failed(ParseFailure {
        position: input.position(error_offset),
        expected,
        found,
        recovered,
        stats,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stats() {
        let mut stats1 = ParseStats::new();
        stats1.rule_calls = 10;
        stats1.max_depth = 5;

        let mut stats2 = ParseStats::new();
        stats2.rule_calls = 20;
        stats2.max_depth = 8;

        stats1.merge(&stats2);

        assert_eq!(stats1.rule_calls, 30);
        assert_eq!(stats1.max_depth, 8);
    }

    #[test]
    fn null_handler_ignores_events() {
        let mut handler = NullEventHandler;
        handler.handle(ParseEvent::Backtrack { position: 0 });
    }
}
