//! Tests for the matcher combinators and the backtracking engine

mod common;

use common::{M, calculator};
use pegstack::{
    CharSet, Grammar, GrammarBuilder, Input, ParseError, ParseEvent, ParseOutcome, Parser,
    ParserConfig, RuleId,
};

fn single_rule(name: &str, matcher: M) -> (Grammar<i64>, RuleId) {
    let mut builder = GrammarBuilder::new();
    let root = builder.rule(name, matcher);
    (builder.build().expect("valid grammar"), root)
}

fn parse(grammar: &Grammar<i64>, root: RuleId, text: &str) -> ParseOutcome<i64> {
    grammar.parser().parse(root, text).expect("no fatal error")
}

fn position() -> M {
    M::push(|ctx| Ok(ctx.position() as i64))
}

#[test]
fn test_one_or_more() {
    let (grammar, root) = single_rule("As", M::one_or_more('a'));

    let outcome = parse(&grammar, root, "");
    let failure = outcome.failure().expect("empty input cannot match");
    assert_eq!(failure.position.offset, 0);
    assert_eq!(failure.expected, ["As"]);

    let outcome = parse(&grammar, root, "aaa");
    assert_eq!(outcome.success().unwrap().end.offset, 3);
}

#[test]
fn test_zero_or_more_accepts_empty_input() {
    let (grammar, root) = single_rule("As", M::zero_or_more('a'));
    assert!(parse(&grammar, root, "").is_success());
    assert!(parse(&grammar, root, "aaaa").is_success());
}

#[test]
fn test_not_consumes_nothing() {
    let (grammar, root) = single_rule("NotX", M::seq([M::test_not('x'), position(), M::any()]));

    let outcome = parse(&grammar, root, "y");
    assert_eq!(outcome.values(), Some(&[0][..]));

    let outcome = parse(&grammar, root, "x");
    assert_eq!(outcome.failure().unwrap().position.offset, 0);
}

#[test]
fn test_positive_lookahead() {
    let (grammar, root) = single_rule("Keyword", M::seq([M::test("if"), position(), M::string("if")]));
    assert_eq!(parse(&grammar, root, "if").values(), Some(&[0][..]));
    assert!(!parse(&grammar, root, "of").is_success());
}

#[test]
fn test_probes_leave_stack_unchanged() {
    let stack_len = || M::push(|ctx| Ok(ctx.stack_len() as i64));
    let (grammar, root) = single_rule(
        "Probes",
        M::seq([
            M::push_value(7),
            M::test(M::seq([M::ch('a'), M::push_value(99)])),
            stack_len(),
            M::test_not(M::seq([M::push_value(99), M::ch('b')])),
            stack_len(),
            M::ch('a'),
        ]),
    );
    assert_eq!(parse(&grammar, root, "a").values(), Some(&[7, 1, 2][..]));
}

#[test]
fn test_first_match_wins() {
    let (grammar, root) = single_rule(
        "Choice",
        M::seq([
            M::first_of([
                M::seq([M::string("ab"), M::push_value(1)]),
                M::seq([M::string("a"), M::push_value(2)]),
            ]),
            M::zero_or_more(M::any()),
        ]),
    );
    assert_eq!(parse(&grammar, root, "ab").values(), Some(&[1][..]));
    assert_eq!(parse(&grammar, root, "abc").values(), Some(&[1][..]));
    assert_eq!(parse(&grammar, root, "ac").values(), Some(&[2][..]));
}

#[test]
fn test_failed_sequence_rewinds_to_its_start() {
    let (grammar, root) = single_rule(
        "Rewind",
        M::seq([
            M::first_of([
                M::seq([M::ch('a'), M::ch('b'), M::ch('c')]),
                M::seq([M::ch('a'), position()]),
            ]),
            M::any(),
            M::any(),
        ]),
    );
    assert_eq!(parse(&grammar, root, "abd").values(), Some(&[1][..]));
}

#[test]
fn test_failed_alternative_keeps_its_stack_effects() {
    let (grammar, root) = single_rule(
        "Leaky",
        M::first_of([
            M::seq([M::push_value(1), M::ch('x')]),
            M::seq([M::push_value(2), M::ch('y')]),
        ]),
    );
    assert_eq!(parse(&grammar, root, "y").values(), Some(&[1, 2][..]));
}

#[test]
fn test_action_can_fail_its_sequence() {
    let (grammar, root) = single_rule(
        "Guarded",
        M::first_of([
            M::seq([M::ch('a'), M::action(|_| Ok(false))]),
            M::seq([M::ch('a'), M::push_value(5)]),
        ]),
    );
    assert_eq!(parse(&grammar, root, "a").values(), Some(&[5][..]));
}

#[test]
fn test_actions_interleave_with_matching() {
    let (grammar, root) = single_rule(
        "Interleaved",
        M::seq([position(), M::ch('a'), position(), M::string("bc"), position()]),
    );
    assert_eq!(parse(&grammar, root, "abc").values(), Some(&[0, 1, 3][..]));
}

#[test]
fn test_actions_read_the_preceding_match() {
    let (grammar, root) = single_rule(
        "Word",
        M::seq([
            M::one_or_more(M::range('a', 'z')),
            M::push(|ctx| Ok(ctx.match_text().len() as i64)),
            M::ch(' '),
            M::one_or_more(M::range('a', 'z')),
            M::push(|ctx| Ok(ctx.match_range().start() as i64)),
        ]),
    );
    assert_eq!(parse(&grammar, root, "hello you").values(), Some(&[5, 6][..]));
}

#[test]
fn test_terminals() {
    let (grammar, root) = single_rule(
        "Terminals",
        M::seq([
            M::ignore_case("select"),
            M::any_of(" \t"),
            M::none_of("0123456789"),
            M::char_set(CharSet::digits()),
            M::n_times(2, M::char_set(CharSet::hex_digits())),
            M::first_of([M::nothing(), M::empty()]),
            M::eoi(),
        ]),
    );
    assert!(parse(&grammar, root, "SeLeCt\tx1fA").is_success());
    assert!(!parse(&grammar, root, "select 11fA").is_success());
    assert!(!parse(&grammar, root, "select x1f").is_success());
}

#[test]
fn test_unconsumed_input_fails_with_eoi() {
    let (grammar, root) = single_rule("A", M::ch('a'));
    let outcome = parse(&grammar, root, "ab");
    let failure = outcome.failure().unwrap();
    assert_eq!(failure.position.offset, 1);
    assert_eq!(failure.expected, ["EOI"]);
    assert_eq!(failure.found, Some('b'));
}

#[test]
fn test_labels_name_expectations() {
    let (grammar, root) = single_rule(
        "Color",
        M::seq([M::ch('#'), M::char_set(CharSet::hex_digits()).label("HexDigit")]),
    );
    let outcome = parse(&grammar, root, "#g");
    let failure = outcome.failure().unwrap();
    assert_eq!(failure.position.offset, 1);
    assert_eq!(failure.expected, ["HexDigit"]);
    assert_eq!(failure.to_string(), "expected HexDigit, found 'g' at 1:2");
}

#[test]
fn test_mutual_recursion() {
    let mut builder = GrammarBuilder::new();
    let list = builder.declare("List");
    let item = builder.rule(
        "Item",
        M::first_of([M::rule(list), M::seq([M::ch('x'), M::push_value(1)])]),
    );
    builder.define(
        list,
        M::seq([
            M::ch('['),
            M::zero_or_more(M::rule(item)),
            M::ch(']'),
            M::exec(|ctx| {
                let depth = ctx.pop().unwrap_or(0);
                ctx.push(depth + 10);
                Ok(())
            }),
        ]),
    );
    let grammar = builder.build().unwrap();
    assert_eq!(parse(&grammar, list, "[[x]]").values(), Some(&[21][..]));
    assert!(!parse(&grammar, list, "[[x]").is_success());
}

#[test]
fn test_recursion_limit_is_fatal() {
    let mut builder = GrammarBuilder::new();
    let nested = builder.declare("Nested");
    builder.define(
        nested,
        M::first_of([M::seq([M::ch('('), M::rule(nested), M::ch(')')]), M::ch('x')]),
    );
    let grammar = builder.build().unwrap();
    let config = ParserConfig {
        max_depth: 8,
        ..ParserConfig::default()
    };
    let parser = Parser::with_config(&grammar, config);

    assert!(parser.parse(nested, "(((x)))").unwrap().is_success());
    let err = parser.parse(nested, "((((((((((x))))))))))").unwrap_err();
    assert!(matches!(err, ParseError::RecursionLimit { limit: 8, .. }));
    assert_eq!(err.position().map(|p| p.offset), Some(8));
}

fn nested_parens(depth: usize) -> String {
    format!("{}1{}", "(".repeat(depth), ")".repeat(depth))
}

#[test]
fn test_default_recursion_limit_is_reported() {
    let calc = calculator();
    assert_eq!(ParserConfig::default().max_depth, 256);

    // Four rules per parenthesis: Expression, Term, Factor, Parens
    let outcome = calc.grammar.parser().parse(calc.input_line, &nested_parens(50)).unwrap();
    assert_eq!(outcome.values(), Some(&[1][..]));

    for parser in [calc.grammar.parser(), calc.grammar.parser().recovery(true)] {
        let err = parser.parse(calc.input_line, &nested_parens(300)).unwrap_err();
        assert!(matches!(err, ParseError::RecursionLimit { limit: 256, .. }), "{err}");
    }
}

#[test]
fn test_deep_nesting_on_a_small_thread() {
    let handle = std::thread::Builder::new()
        .stack_size(512 * 1024)
        .spawn(|| {
            let calc = calculator();
            let parser = calc.grammar.parser();
            let nested = parser.parse(calc.input_line, &nested_parens(60)).map(|o| o.is_success());
            let too_deep = parser.parse(calc.input_line, &nested_parens(1000)).is_err();
            (nested, too_deep)
        })
        .unwrap();
    let (nested, too_deep) = handle.join().unwrap();
    assert_eq!(nested, Ok(true));
    assert!(too_deep);
}

#[test]
fn test_stack_underflow_is_fatal() {
    let (grammar, root) = single_rule(
        "Underflow",
        M::seq([M::ch('a'), M::exec(|ctx| ctx.pop().map(drop))]),
    );
    let err = grammar.parser().parse(root, "a").unwrap_err();
    assert!(matches!(err, ParseError::Action { ref rule, .. } if rule == "Underflow"));
    assert!(err.to_string().contains("value stack underflow"));
}

#[test]
fn test_parsing_is_deterministic() {
    let calc = calculator();
    let parser = calc.grammar.parser().recovery(true);
    for text in ["1+2*(3-4)", "1+", "(1+2", "7*"] {
        let first = parser.parse(calc.input_line, text).unwrap();
        let second = parser.parse(calc.input_line, text).unwrap();
        assert_eq!(first, second, "{text}");
    }
}

#[test]
fn test_events_bracket_rule_invocations() {
    let (grammar, root) = single_rule("As", M::one_or_more('a'));
    let input = Input::new("aaa");
    let mut events: Vec<ParseEvent> = Vec::new();
    let mut run = grammar.parser().run(root, &input).with_handler(&mut events);
    assert!(run.run().unwrap().is_success());
    drop(run);

    assert_eq!(
        events,
        [
            ParseEvent::EnterRule {
                rule: root,
                position: 0
            },
            ParseEvent::ExitRule {
                rule: root,
                position: 3,
                matched: true
            },
        ]
    );
}

#[test]
fn test_stats_count_backtracking() {
    let (grammar, root) = single_rule("Abc", M::first_of([M::ch('a'), M::ch('b'), M::ch('c')]));
    let outcome = parse(&grammar, root, "c");
    let stats = outcome.stats();
    assert_eq!(stats.backtracks, 2);
    assert_eq!(stats.rule_calls, 1);
    assert_eq!(stats.max_depth, 1);
}

#[test]
fn test_run_is_final() {
    let (grammar, root) = single_rule("A", M::ch('a'));
    let input = Input::new("b");
    let mut run = grammar.parser().run(root, &input);
    let first = run.run().unwrap().clone();
    let second = run.run().unwrap().clone();
    assert_eq!(first, second);
    assert_eq!(run.state(), pegstack::DriverState::Failed);
}
