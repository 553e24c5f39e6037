//! Tests for an integer calculator built from actions on the value stack

mod common;

use common::{calculator, eval};
use pegstack::{ActionError, ParseError};

#[test]
fn test_single_number() {
    assert_eq!(eval("42"), 42);
    assert_eq!(eval("0"), 0);
}

#[test]
fn test_precedence() {
    assert_eq!(eval("1+2*3"), 7);
    assert_eq!(eval("2*3+1"), 7);
    assert_eq!(eval("(1+2)*3"), 9);
    assert_eq!(eval("2*(3+4)"), 14);
    assert_eq!(eval("((7))"), 7);
}

#[test]
fn test_left_associativity() {
    assert_eq!(eval("10-4-3"), 3);
    assert_eq!(eval("8/2/2"), 2);
    assert_eq!(eval("2*3*4-1-1"), 22);
}

#[test]
fn test_missing_operand_reports_term() {
    let calc = calculator();
    let outcome = calc.grammar.parser().parse(calc.input_line, "1+").unwrap();
    let failure = outcome.failure().expect("input is incomplete");
    assert_eq!(failure.position.offset, 2);
    assert_eq!(failure.expected, ["Term"]);
    assert_eq!(failure.found, None);
    assert!(failure.recovered.is_none());
}

#[test]
fn test_unclosed_parenthesis_lists_every_continuation() {
    let calc = calculator();
    let outcome = calc.grammar.parser().parse(calc.input_line, "(1+2").unwrap();
    let failure = outcome.failure().unwrap();
    assert_eq!(failure.position.offset, 4);
    assert_eq!(failure.expected, ["'0'..'9'", "'*'", "'/'", "'+'", "'-'", "')'"]);
}

#[test]
fn test_trailing_garbage_expects_operator_or_end() {
    let calc = calculator();
    let outcome = calc.grammar.parser().parse(calc.input_line, "12x").unwrap();
    let failure = outcome.failure().unwrap();
    assert_eq!(failure.position.offset, 2);
    assert_eq!(failure.found, Some('x'));
    assert!(failure.expected.iter().any(|e| e == "EOI"));
    assert!(failure.expected.iter().any(|e| e == "'+'"));
}

#[test]
fn test_division_by_zero_aborts_with_rule_and_position() {
    let calc = calculator();
    let err = calc.grammar.parser().parse(calc.input_line, "1/0").unwrap_err();
    match &err {
        ParseError::Action {
            rule,
            position,
            source,
        } => {
            assert_eq!(rule, "Term");
            assert_eq!(position.offset, 3);
            assert_eq!(source, &ActionError::failed("division by zero"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.to_string(), "action in rule `Term` failed at 1:4: division by zero");
}

#[test]
fn test_overflowing_literal_aborts_in_number() {
    let calc = calculator();
    let err = calc
        .grammar
        .parser()
        .parse(calc.input_line, "99999999999999999999")
        .unwrap_err();
    assert!(matches!(&err, ParseError::Action { rule, .. } if rule == "Number"));
    assert!(matches!(err.action_error(), Some(ActionError::Failed(msg)) if msg.starts_with("bad number")));
}

#[test]
fn test_recovery_supplies_missing_operand() {
    let calc = calculator();
    let outcome = calc
        .grammar
        .parser()
        .recovery(true)
        .parse(calc.input_line, "1+")
        .unwrap();
    let failure = outcome.failure().unwrap();
    let recovered = failure.recovered.as_ref().expect("recovery pass matched");
    assert!(recovered.complete);
    assert_eq!(recovered.values, [1]);
    assert_eq!(recovered.errors.len(), 1);
    assert_eq!(recovered.errors[0].expected, "Digits");
    assert_eq!(recovered.errors[0].position.offset, 2);
}

#[test]
fn test_recovery_closes_parenthesis() {
    let calc = calculator();
    let outcome = calc
        .grammar
        .parser()
        .recovery(true)
        .parse(calc.input_line, "(1+2")
        .unwrap();
    let recovered = outcome.failure().unwrap().recovered.as_ref().unwrap();
    assert_eq!(recovered.values, [3]);
    assert_eq!(recovered.errors.len(), 1);
    assert_eq!(recovered.errors[0].expected, "')'");
    assert_eq!(recovered.errors[0].to_string(), "missing ')' at 1:5");
}

#[test]
fn test_parse_tree_follows_rules() {
    let calc = calculator();
    let outcome = calc
        .grammar
        .parser()
        .parse_tree(true)
        .parse(calc.input_line, "1+23")
        .unwrap();
    let success = outcome.success().unwrap();
    let tree = success.tree.as_ref().expect("tree building enabled");

    assert_eq!(tree.label(), "InputLine");
    let expression = &tree.children()[0];
    assert_eq!(expression.label(), "Expression");
    assert_eq!(expression.children().len(), 2);
    assert!(expression.children().iter().all(|n| n.label() == "Term"));

    let digits: Vec<_> = tree
        .descendants()
        .filter(|n| n.label() == "Digits")
        .map(|n| n.text("1+23"))
        .collect();
    assert_eq!(digits, ["1", "23"]);
}

#[test]
fn test_parse_tree_is_off_by_default() {
    let calc = calculator();
    let outcome = calc.grammar.parser().parse(calc.input_line, "1").unwrap();
    assert!(outcome.success().unwrap().tree.is_none());
}
