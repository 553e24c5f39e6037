//! # Grammar Analysis
//!
//! Static facts about a rule set: which rules can succeed without consuming
//! input, which rules a rule may invoke before consuming input, and a few
//! size metrics. The builder uses the first two to reject empty loops and
//! left recursion before any parse runs.

use super::{Grammar, Matcher, RuleDef, RuleId};

/// Metrics about a grammar's size and shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarMetrics {
    /// Total number of rules
    pub rule_count: usize,
    /// Rules that can match the empty string
    pub nullable_count: usize,
    /// Rules with mismatch memoization enabled
    pub memoized_count: usize,
    /// Actions embedded anywhere in the grammar
    pub action_count: usize,
    /// Deepest matcher nesting inside a single rule body
    pub max_nesting: usize,
}

impl GrammarMetrics {
    #[must_use]
    pub fn compute<V>(grammar: &Grammar<V>) -> Self {
        let rules: Vec<&RuleDef<V>> = grammar.rules().map(|(_, _, rule)| rule).collect();
        let matchers: Vec<&Matcher<V>> = rules.iter().map(|rule| &rule.matcher).collect();
        let nullable = nullable_rules(&matchers);

        let mut action_count = 0;
        let mut max_nesting = 0;
        for rule in &rules {
            let (depth, actions) = shape(&rule.matcher);
            max_nesting = max_nesting.max(depth);
            action_count += actions;
        }

        Self {
            rule_count: rules.len(),
            nullable_count: nullable.iter().filter(|&&n| n).count(),
            memoized_count: rules.iter().filter(|r| r.options.memo_mismatches).count(),
            action_count,
            max_nesting,
        }
    }
}

/// Nesting depth and action count of one matcher tree
fn shape<V>(matcher: &Matcher<V>) -> (usize, usize) {
    let own_actions = usize::from(matches!(matcher, Matcher::Action(_)));
    matcher
        .children()
        .iter()
        .map(shape)
        .fold((1, own_actions), |(depth, actions), (d, a)| {
            (depth.max(d + 1), actions + a)
        })
}

/// Fixpoint over all rule bodies: can rule `i` succeed without consuming input?
pub(crate) fn nullable_rules<V>(bodies: &[&Matcher<V>]) -> Vec<bool> {
    let mut nullable = vec![false; bodies.len()];
    let mut changed = true;
    while changed {
        changed = false;
        for (i, body) in bodies.iter().enumerate() {
            if !nullable[i] && is_nullable(body, &nullable) {
                nullable[i] = true;
                changed = true;
            }
        }
    }
    nullable
}

/// Whether `matcher` can succeed without consuming input, given the
/// nullability of every rule
pub(crate) fn is_nullable<V>(matcher: &Matcher<V>, rules: &[bool]) -> bool {
    match matcher {
        Matcher::Char(_) | Matcher::CharRange(..) | Matcher::CharSet(_) | Matcher::Any => false,
        Matcher::Nothing => false,
        Matcher::String { text, .. } => text.is_empty(),
        Matcher::Eoi | Matcher::Empty | Matcher::Action(_) => true,
        Matcher::ZeroOrMore(_) | Matcher::Optional(_) | Matcher::Not(_) | Matcher::Test(_) => true,
        Matcher::OneOrMore(inner) | Matcher::Label { matcher: inner, .. } => {
            is_nullable(inner, rules)
        }
        Matcher::Seq(items) => items.iter().all(|m| is_nullable(m, rules)),
        Matcher::Choice(items) => items.iter().any(|m| is_nullable(m, rules)),
        Matcher::Rule(id) => rules.get(id.index()).copied().unwrap_or(false),
    }
}

/// Rules `matcher` may invoke at its start position, before consuming input
pub(crate) fn leading_rules<V>(matcher: &Matcher<V>, nullable: &[bool], out: &mut Vec<RuleId>) {
    match matcher {
        Matcher::Rule(id) => out.push(*id),
        Matcher::Seq(items) => {
            for item in items {
                leading_rules(item, nullable, out);
                if !is_nullable(item, nullable) {
                    break;
                }
            }
        }
        _ => {
            for child in matcher.children() {
                leading_rules(child, nullable, out);
            }
        }
    }
}

/// A cycle in the leading-rule graph, as a path starting and ending at the
/// same rule
pub(crate) fn find_left_recursion<V>(rules: &[RuleDef<V>], nullable: &[bool]) -> Option<Vec<RuleId>> {
    let graph: Vec<Vec<RuleId>> = rules
        .iter()
        .map(|rule| {
            let mut out = Vec::new();
            leading_rules(&rule.matcher, nullable, &mut out);
            out.sort_unstable();
            out.dedup();
            out
        })
        .collect();

    // 0 = unvisited, 1 = on the current path, 2 = done
    let mut state = vec![0u8; rules.len()];
    let mut path = Vec::new();
    for start in 0..rules.len() {
        if state[start] != 0 {
            continue;
        }
        if let Some(cycle) = visit(RuleId::from_index(start), &graph, &mut state, &mut path) {
            return Some(cycle);
        }
    }
    None
}

fn visit(
    rule: RuleId,
    graph: &[Vec<RuleId>],
    state: &mut [u8],
    path: &mut Vec<RuleId>,
) -> Option<Vec<RuleId>> {
    state[rule.index()] = 1;
    path.push(rule);
    for &next in graph.get(rule.index()).map_or(&[][..], Vec::as_slice) {
        match state.get(next.index()) {
            Some(1) => {
                let from = path.iter().position(|&r| r == next).unwrap_or(0);
                let mut cycle = path[from..].to_vec();
                cycle.push(next);
                return Some(cycle);
            }
            Some(0) => {
                if let Some(cycle) = visit(next, graph, state, path) {
                    return Some(cycle);
                }
            }
            _ => {}
        }
    }
    path.pop();
    state[rule.index()] = 2;
    None
}
