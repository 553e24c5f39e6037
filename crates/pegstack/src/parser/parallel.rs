//! # Batch Parsing
//!
//! Parse many inputs with one grammar. A [`Grammar`](crate::Grammar) is
//! immutable and every parse owns its own state, so with the `parallel`
//! feature the inputs are spread over rayon's thread pool. Without it they
//! are parsed one after another. Results come back in batch order either
//! way.

use compact_str::CompactString;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::{ParseOutcome, Parser};
use crate::error::ParseError;
use crate::grammar::RuleId;

/// A batch of named inputs to parse
#[derive(Debug, Clone, Default)]
pub struct ParseBatch {
    inputs: Vec<(CompactString, String)>,
}

impl ParseBatch {
    /// Create a new empty batch
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an input to the batch
    pub fn add(&mut self, id: impl Into<CompactString>, text: impl Into<String>) {
        self.inputs.push((id.into(), text.into()));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

/// Result of parsing one input of a batch
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult<V> {
    /// The id the input was added under
    pub id: CompactString,
    pub result: Result<ParseOutcome<V>, ParseError>,
}

impl<V> BatchResult<V> {
    /// Whether the input parsed successfully
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.result.as_ref().is_ok_and(ParseOutcome::is_success)
    }
}

impl<V: Send> Parser<'_, V> {
    /// Parse every input of `batch` starting at rule `root`.
    #[must_use]
    pub fn parse_batch(&self, root: RuleId, batch: &ParseBatch) -> Vec<BatchResult<V>> {
        log::debug!("parsing batch of {} inputs", batch.len());
        let parse_one = |(id, text): &(CompactString, String)| BatchResult {
            id: id.clone(),
            result: self.parse(root, text),
        };

        #[cfg(feature = "parallel")]
        let results = batch.inputs.par_iter().map(parse_one).collect();

        #[cfg(not(feature = "parallel"))]
        let results = batch.inputs.iter().map(parse_one).collect();

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{GrammarBuilder, Matcher};

    #[test]
    fn results_keep_batch_order() {
        let mut builder = GrammarBuilder::<()>::new();
        let word = builder.rule("Word", Matcher::<()>::one_or_more(Matcher::range('a', 'z')));
        let grammar = builder.build().unwrap();

        let mut batch = ParseBatch::new();
        batch.add("first", "abc");
        batch.add("second", "ab1");
        batch.add("third", "xyz");

        let results = grammar.parser().parse_batch(word, &batch);
        let ids: Vec<_> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["first", "second", "third"]);
        let ok: Vec<_> = results.iter().map(BatchResult::is_ok).collect();
        assert_eq!(ok, [true, false, true]);
    }
}
