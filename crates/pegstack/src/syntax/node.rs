use compact_str::CompactString;
use smallvec::SmallVec;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::grammar::RuleId;
use crate::input::Span;

/// A node of the parse tree: a rule or label that matched
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct ParseNode {
    label: CompactString,
    span: Span,
    rule: Option<RuleId>,
    children: Vec<ParseNode>,
}

impl ParseNode {
    #[must_use]
    pub const fn new(
        label: CompactString,
        span: Span,
        rule: Option<RuleId>,
        children: Vec<Self>,
    ) -> Self {
        Self {
            label,
            span,
            rule,
            children,
        }
    }

    /// Rule name, or the label of a labeled sub-expression
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Byte range of the parsed text this node covers
    #[must_use]
    pub const fn span(&self) -> Span {
        self.span
    }

    /// The rule this node was built for; `None` for labels
    #[must_use]
    pub const fn rule(&self) -> Option<RuleId> {
        self.rule
    }

    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// The covered slice of `text`
    #[must_use]
    pub fn text<'t>(&self, text: &'t str) -> &'t str {
        self.span.slice(text)
    }

    /// This node and all nodes below it, depth first, parents before children
    pub fn descendants(&self) -> Descendants<'_> {
        let mut stack = SmallVec::new();
        stack.push(self);
        Descendants { stack }
    }

    /// First node labeled `label`, searching depth first
    #[must_use]
    pub fn find(&self, label: &str) -> Option<&Self> {
        self.descendants().find(|node| node.label() == label)
    }

}

/// Iterator returned by [`ParseNode::descendants`]
pub struct Descendants<'a> {
    stack: SmallVec<[&'a ParseNode; 16]>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a ParseNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
