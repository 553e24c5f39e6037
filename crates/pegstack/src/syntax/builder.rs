use compact_str::CompactString;

use super::ParseNode;
use crate::grammar::RuleId;
use crate::input::Span;

/// Collects finished nodes while the engine backtracks.
///
/// Finished nodes sit in one flat list. A rule takes a [`TreeMark`] when it
/// starts; when it matches, everything after the mark becomes its children,
/// and when it fails, the list is truncated back to the mark.
#[derive(Debug, Default)]
pub(crate) struct TreeBuilder {
    nodes: Vec<ParseNode>,
    suppressed: usize,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct TreeMark(usize);

impl TreeBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn mark(&self) -> TreeMark {
        TreeMark(self.nodes.len())
    }

    pub(crate) fn truncate(&mut self, mark: TreeMark) {
        self.nodes.truncate(mark.0);
    }

    /// Whether nodes are currently being dropped by an enclosing rule
    pub(crate) const fn is_suppressed(&self) -> bool {
        self.suppressed > 0
    }

    /// Stop building nodes until the matching [`resume`](Self::resume).
    pub(crate) fn suppress(&mut self) {
        self.suppressed += 1;
    }

    pub(crate) fn resume(&mut self) {
        self.suppressed = self.suppressed.saturating_sub(1);
    }

    /// Turn everything after `mark` into the children of a new node.
    pub(crate) fn finish_node(
        &mut self,
        mark: TreeMark,
        label: CompactString,
        span: Span,
        rule: Option<RuleId>,
    ) {
        if self.is_suppressed() {
            self.truncate(mark);
            return;
        }
        let children = self.nodes.split_off(mark.0.min(self.nodes.len()));
        self.nodes.push(ParseNode::new(label, span, rule, children));
    }

    /// The root node, wrapping several top-level nodes under `label` if the
    /// root rule did not produce a single node of its own.
    pub(crate) fn finish(mut self, label: CompactString, span: Span) -> ParseNode {
        if self.nodes.len() == 1 && self.nodes[0].span() == span {
            if let Some(root) = self.nodes.pop() {
                return root;
            }
        }
        ParseNode::new(label, span, None, self.nodes)
    }
}
