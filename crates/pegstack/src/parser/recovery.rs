//! # Error Recovery
//!
//! When a parse fails and recovery is enabled, the driver runs the grammar a
//! second time. In that pass a terminal that does not match may be *stood
//! in for*: it reports a zero-width success, and actions reading its text
//! through [`ActionContext::match_or_default`](crate::ActionContext::match_or_default)
//! receive their default instead. Structural rules around the gap keep
//! matching, so the value stack and parse tree come out as complete as the
//! input allows.
//!
//! A terminal is only stood in for when all of these hold:
//!
//! - the cursor is at or past the offset where the first pass failed;
//! - the enclosing sequence already consumed input, or was itself entered
//!   under that condition (the context is *committed*);
//! - no lookahead probe is open;
//! - the error budget ([`ParserConfig::max_recovered_errors`](crate::ParserConfig::max_recovered_errors))
//!   is not used up.
//!
//! `ZeroOrMore` and `Optional` bodies and `OneOrMore` iterations after the
//! first are never committed, so recovery does not invent repetitions or
//! optional parts. Ordered choices first try every alternative without
//! stand-ins and only allow them in a second round; stack changes made by
//! the first round are undone before the second.

use compact_str::CompactString;
use std::fmt;

use crate::input::Position;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// A gap the recovery pass papered over
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct RecoveredError {
    /// Where the missing element was expected
    pub position: Position,
    /// What was stood in for: the enclosing rule or label if it is missing
    /// entirely, else the terminal
    pub expected: CompactString,
}

impl fmt::Display for RecoveredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "missing {} at {}", self.expected, self.position)
    }
}

/// Bookkeeping of one recovery pass
#[derive(Debug)]
pub(crate) struct RecoveryState {
    /// Offset where the first pass failed
    pub(crate) error_offset: usize,
    /// The current context already consumed input
    pub(crate) committed: bool,
    /// Cleared during the first round of an ordered choice
    pub(crate) insertions_enabled: bool,
    /// A stand-in was refused only because insertions were disabled
    pub(crate) would_insert: bool,
    pub(crate) errors: Vec<RecoveredError>,
    limit: usize,
}

impl RecoveryState {
    pub(crate) const fn new(error_offset: usize, limit: usize) -> Self {
        Self {
            error_offset,
            committed: false,
            insertions_enabled: true,
            would_insert: false,
            errors: Vec::new(),
            limit,
        }
    }

    pub(crate) fn inserted(&self) -> usize {
        self.errors.len()
    }

    /// Whether a terminal failing at `offset` may be stood in for.
    ///
    /// Sets `would_insert` when the only obstacle is a choice's first round.
    pub(crate) fn allows_insertion(&mut self, offset: usize) -> bool {
        if offset < self.error_offset || !self.committed || self.inserted() >= self.limit {
            return false;
        }
        if !self.insertions_enabled {
            self.would_insert = true;
            return false;
        }
        true
    }

    /// Replace the commitment of the current context, returning the old one.
    pub(crate) fn commit(&mut self, committed: bool) -> bool {
        std::mem::replace(&mut self.committed, committed)
    }
}
