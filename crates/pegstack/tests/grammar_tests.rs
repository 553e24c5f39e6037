//! Tests for grammar construction and validation

mod common;

use common::{M, calculator};
use pegstack::{Grammar, GrammarBuilder, GrammarError, GrammarMetrics, RuleOptions};

#[test]
fn test_rules_are_addressed_by_name_and_id() {
    let calc = calculator();
    let grammar = &calc.grammar;
    assert_eq!(grammar.rule_count(), 7);
    assert_eq!(grammar.rule_id("Expression"), Some(calc.expression));
    assert_eq!(grammar.rule_name(calc.input_line), "InputLine");
    assert_eq!(grammar.rule_id("Missing"), None);

    let digits = grammar.rule_id("Digits").unwrap();
    let options = grammar.rule(digits).unwrap().options();
    assert!(options.suppress_subnodes);
    assert!(!options.memo_mismatches);
}

#[test]
fn test_forward_references() {
    let mut builder = GrammarBuilder::<i64>::new();
    let later = builder.declare("Later");
    let root = builder.rule("Root", M::seq([M::ch('<'), M::rule(later), M::ch('>')]));
    builder.define(later, M::one_or_more('x'));
    let grammar = builder.build().unwrap();
    assert!(grammar.parser().parse(root, "<xx>").unwrap().is_success());
}

#[test]
fn test_undefined_rule() {
    let mut builder = GrammarBuilder::<i64>::new();
    let value = builder.declare("Value");
    builder.rule("Root", M::rule(value));
    let err = builder.build().unwrap_err();
    assert_eq!(
        err,
        GrammarError::UndefinedRule {
            name: "Value".to_owned()
        }
    );
    assert_eq!(err.to_string(), "rule `Value` is referenced but never defined");
}

#[test]
fn test_duplicate_rule() {
    let mut builder = GrammarBuilder::<i64>::new();
    builder.rule("A", M::ch('a'));
    builder.rule("A", M::ch('b'));
    assert!(matches!(builder.build(), Err(GrammarError::DuplicateRule { name }) if name == "A"));
}

#[test]
fn test_empty_loop() {
    let mut builder = GrammarBuilder::<i64>::new();
    builder.rule("Spin", M::zero_or_more(M::seq([M::optional('a'), M::test('b')])));
    assert!(matches!(builder.build(), Err(GrammarError::EmptyLoop { rule }) if rule == "Spin"));
}

#[test]
fn test_left_recursion() {
    let mut builder = GrammarBuilder::<i64>::new();
    let expr = builder.declare("Expr");
    let num = builder.rule("Num", M::one_or_more(M::range('0', '9')));
    builder.define(
        expr,
        M::first_of([M::seq([M::rule(expr), M::ch('+'), M::rule(num)]), M::rule(num)]),
    );
    let err = builder.build().unwrap_err();
    assert_eq!(
        err,
        GrammarError::LeftRecursion {
            cycle: vec!["Expr".to_owned(), "Expr".to_owned()]
        }
    );
    assert_eq!(err.to_string(), "left recursion: Expr -> Expr");
}

#[test]
fn test_left_recursion_through_nullable_prefix() {
    let mut builder = GrammarBuilder::<i64>::new();
    let a = builder.declare("A");
    let sign = builder.rule("Sign", M::optional('-'));
    builder.define(a, M::first_of([M::seq([M::rule(sign), M::rule(a), M::ch('x')]), M::ch('y')]));
    assert!(matches!(builder.build(), Err(GrammarError::LeftRecursion { .. })));
}

#[test]
fn test_inverted_range() {
    let mut builder = GrammarBuilder::<i64>::new();
    builder.rule("Bad", M::range('z', 'a'));
    assert_eq!(
        builder.build().unwrap_err(),
        GrammarError::InvalidCharRange {
            rule: "Bad".to_owned(),
            low: 'z',
            high: 'a'
        }
    );
}

#[test]
fn test_whitespace_convention() {
    let mut builder = GrammarBuilder::<i64>::new();
    let ws = builder.rule("WhiteSpace", M::zero_or_more(M::any_of(" \t")));
    builder.whitespace(ws);
    let item = builder.rule(
        "Item",
        M::seq([
            M::one_or_more(M::range('0', '9')),
            M::push(|ctx| Ok(ctx.match_text().parse().unwrap_or_default())),
            M::rule(ws),
        ]),
    );
    let list = builder.rule(
        "List",
        M::seq([
            "[ ".into(),
            M::optional(M::seq([
                M::rule(item),
                M::zero_or_more(M::seq([", ".into(), M::rule(item)])),
            ])),
            "] ".into(),
        ]),
    );
    let grammar = builder.build().unwrap();
    let parser = grammar.parser();

    assert_eq!(parser.parse(list, "[ 1 ,\t2 ]  ").unwrap().values(), Some(&[1, 2][..]));
    assert_eq!(parser.parse(list, "[1,2]").unwrap().values(), Some(&[1, 2][..]));
    assert!(!parser.parse(list, " [1]").unwrap().is_success());
}

#[test]
fn test_metrics() {
    let calc = calculator();
    let metrics = GrammarMetrics::compute(&calc.grammar);
    assert_eq!(metrics.rule_count, 7);
    assert_eq!(metrics.nullable_count, 0);
    assert_eq!(metrics.memoized_count, 0);
    assert_eq!(metrics.action_count, 5);
    assert_eq!(metrics.max_nesting, 5);

    let mut builder = GrammarBuilder::<i64>::new();
    builder.rule_with("Memo", RuleOptions::new().memo_mismatches(), M::ch('m'));
    builder.rule("Maybe", M::optional('m'));
    let metrics = GrammarMetrics::compute(&builder.build().unwrap());
    assert_eq!(metrics.memoized_count, 1);
    assert_eq!(metrics.nullable_count, 1);
}

#[test]
fn test_grammar_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Grammar<i64>>();
    assert_send_sync::<Grammar<pegstack::Value>>();
}

#[cfg(feature = "diagnostics")]
#[test]
fn test_grammar_errors_are_diagnostics() {
    use miette::Diagnostic;

    let err = GrammarError::EmptyLoop {
        rule: "Spin".to_owned(),
    };
    assert_eq!(err.code().map(|c| c.to_string()).as_deref(), Some("grammar::empty_loop"));
    assert!(err.help().is_some());
}
