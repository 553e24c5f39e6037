use compact_str::CompactString;
use smallvec::SmallVec;

use crate::grammar::{Grammar, Matcher, RuleId};

/// Something the parse tried at the frontier
pub(crate) enum Expected<'g, V> {
    Rule(RuleId),
    Labeled(&'g str),
    Terminal(&'g Matcher<V>),
    EndOfInput,
}

impl<V> Clone for Expected<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for Expected<'_, V> {}

impl<V> Expected<'_, V> {
    pub(crate) fn describe(self, grammar: &Grammar<V>) -> CompactString {
        match self {
            Self::Rule(id) => grammar.rule_name(id).into(),
            Self::Labeled(name) => name.into(),
            Self::Terminal(matcher) => matcher.describe(grammar),
            Self::EndOfInput => CompactString::const_new("EOI"),
        }
    }
}

/// Taken when a rule or label starts; tells which records it produced
#[derive(Debug, Clone, Copy)]
pub(crate) struct FrontierMark {
    epoch: u32,
    len: usize,
}

/// The furthest position any match attempt failed at, with what was tried
/// there.
///
/// The position never moves backwards. When it advances, the records of the
/// old position are dropped and the epoch is bumped.
pub(crate) struct ErrorFrontier<'g, V> {
    position: usize,
    epoch: u32,
    records: SmallVec<[Expected<'g, V>; 8]>,
}

impl<'g, V> ErrorFrontier<'g, V> {
    pub(crate) fn new() -> Self {
        Self {
            position: 0,
            epoch: 0,
            records: SmallVec::new(),
        }
    }

    pub(crate) const fn position(&self) -> usize {
        self.position
    }

    pub(crate) fn mark(&self) -> FrontierMark {
        FrontierMark {
            epoch: self.epoch,
            len: self.records.len(),
        }
    }

    /// Move the frontier to `position` if it lies beyond it.
    ///
    /// Returns false if `position` is behind the frontier.
    fn reach(&mut self, position: usize) -> bool {
        if position > self.position {
            self.position = position;
            self.records.clear();
            self.epoch = self.epoch.wrapping_add(1);
        }
        position == self.position
    }

    /// Record a mismatched terminal at `position`.
    pub(crate) fn record(&mut self, position: usize, expected: Expected<'g, V>) {
        if self.reach(position) {
            self.records.push(expected);
        }
    }

    /// Record a failed rule or label that started at `start`.
    ///
    /// If nothing inside it got past `start`, whatever it recorded there is
    /// replaced by the rule itself, so the report names `Digits` instead of
    /// the ten characters `Digits` is made of.
    pub(crate) fn record_named(&mut self, start: usize, mark: FrontierMark, expected: Expected<'g, V>) {
        if start < self.position {
            return;
        }
        if start == self.position && mark.epoch == self.epoch {
            self.records.truncate(mark.len);
        } else if start == self.position {
            self.records.clear();
        } else {
            self.position = start;
            self.records.clear();
            self.epoch = self.epoch.wrapping_add(1);
        }
        self.records.push(expected);
    }

    /// Names of everything tried at the frontier, in first-tried order,
    /// without duplicates.
    pub(crate) fn labels(&self, grammar: &Grammar<V>) -> Vec<CompactString> {
        let mut labels: Vec<CompactString> = Vec::with_capacity(self.records.len());
        for &expected in &self.records {
            let label = expected.describe(grammar);
            if !labels.contains(&label) {
                labels.push(label);
            }
        }
        labels
    }
}
