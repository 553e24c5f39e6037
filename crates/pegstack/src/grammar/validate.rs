use lasso::Rodeo;

use super::analysis::{find_left_recursion, is_nullable, nullable_rules};
use super::{Matcher, RuleDef};
use crate::error::GrammarError;

/// Check a complete rule set before it is frozen.
///
/// # Errors
///
/// Reports unknown rule references, inverted character ranges, repetitions
/// over nullable bodies and left recursion, in that order.
pub(crate) fn validate<V>(rules: &[RuleDef<V>], names: &Rodeo) -> Result<(), GrammarError> {
    let name_of = |rule: &RuleDef<V>| names.resolve(&rule.name).to_owned();

    for rule in rules {
        check_matcher(&rule.matcher, rules.len(), &|| name_of(rule))?;
    }

    let bodies: Vec<&Matcher<V>> = rules.iter().map(|rule| &rule.matcher).collect();
    let nullable = nullable_rules(&bodies);
    for rule in rules {
        if has_empty_loop(&rule.matcher, &nullable) {
            return Err(GrammarError::EmptyLoop {
                rule: name_of(rule),
            });
        }
    }

    if let Some(cycle) = find_left_recursion(rules, &nullable) {
        return Err(GrammarError::LeftRecursion {
            cycle: cycle
                .iter()
                .filter_map(|id| rules.get(id.index()))
                .map(name_of)
                .collect(),
        });
    }

    Ok(())
}

fn check_matcher<V>(
    matcher: &Matcher<V>,
    rule_count: usize,
    rule_name: &dyn Fn() -> String,
) -> Result<(), GrammarError> {
    match matcher {
        Matcher::Rule(id) if id.index() >= rule_count => Err(GrammarError::UnknownRule {
            rule: rule_name(),
            id: id.raw(),
        }),
        Matcher::CharRange(low, high) if low > high => Err(GrammarError::InvalidCharRange {
            rule: rule_name(),
            low: *low,
            high: *high,
        }),
        _ => matcher
            .children()
            .iter()
            .try_for_each(|child| check_matcher(child, rule_count, rule_name)),
    }
}

fn has_empty_loop<V>(matcher: &Matcher<V>, nullable: &[bool]) -> bool {
    match matcher {
        Matcher::ZeroOrMore(body) | Matcher::OneOrMore(body) if is_nullable(body, nullable) => true,
        _ => matcher
            .children()
            .iter()
            .any(|child| has_empty_loop(child, nullable)),
    }
}
