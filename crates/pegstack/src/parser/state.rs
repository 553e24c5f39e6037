use hashbrown::HashMap;

use crate::grammar::RuleId;

/// Recovery bookkeeping that decides whether a rule can match
///
/// The first pass has none; in the recovery pass the same rule at the same
/// position may match or not depending on whether it may stand in for
/// terminals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum MemoContext {
    FirstPass,
    Recovery {
        committed: bool,
        insertions_enabled: bool,
        in_probe: bool,
        inserted: usize,
    },
}

/// Key for memoization entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct MemoKey {
    rule: RuleId,
    position: usize,
    context: MemoContext,
}

/// Positions at which memoized rules are known to fail.
///
/// Only mismatches are remembered. A successful rule may have run actions,
/// and skipping it on a second visit would skip those actions too. Each
/// entry keeps whether the rule refused a stand-in only because a choice
/// disabled them, so a hit can replay that.
#[derive(Debug)]
pub(crate) struct MemoTable {
    mismatches: HashMap<MemoKey, bool, ahash::RandomState>,
    max_entries: usize,
}

impl MemoTable {
    pub(crate) fn new(max_entries: usize) -> Self {
        Self {
            mismatches: HashMap::with_hasher(ahash::RandomState::new()),
            max_entries,
        }
    }

    /// `Some(would_insert)` if `rule` is known to fail here.
    pub(crate) fn known_mismatch(
        &self,
        rule: RuleId,
        position: usize,
        context: MemoContext,
    ) -> Option<bool> {
        self.mismatches
            .get(&MemoKey {
                rule,
                position,
                context,
            })
            .copied()
    }

    /// Record a mismatch, clearing the table once it outgrows its limit.
    pub(crate) fn record_mismatch(
        &mut self,
        rule: RuleId,
        position: usize,
        context: MemoContext,
        would_insert: bool,
    ) {
        if self.mismatches.len() >= self.max_entries {
            log::trace!("memo table full at {} entries, clearing", self.mismatches.len());
            self.mismatches.clear();
        }
        self.mismatches.insert(
            MemoKey {
                rule,
                position,
                context,
            },
            would_insert,
        );
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.mismatches.len()
    }
}
