//! Tests for case-insensitive keywords in a SPARQL-like query grammar

use pegstack::{Grammar, GrammarBuilder, Matcher, RuleId, RuleOptions, Value};

type Q = Matcher<Value>;

fn query_grammar() -> (Grammar<Value>, RuleId) {
    let mut g = GrammarBuilder::new();
    let ws = g.rule_with(
        "WS",
        RuleOptions::new().suppress_node(),
        Q::zero_or_more(Q::first_of([
            Q::any_of(" \t\r\n"),
            Q::seq([Q::ch('#'), Q::zero_or_more(Q::none_of("\r\n"))]),
        ])),
    );
    let kw = |text: &str| Q::seq([Q::ignore_case(text), Q::rule(ws)]).label(text);
    let sym = |c: char| Q::seq([Q::ch(c), Q::rule(ws)]);

    let var = g.rule(
        "Var",
        Q::seq([
            Q::any_of("?$"),
            Q::one_or_more(Q::first_of([
                Q::range('a', 'z'),
                Q::range('A', 'Z'),
                Q::range('0', '9'),
                Q::ch('_'),
            ])),
            Q::push(|ctx| Ok(Value::from(ctx.match_text()))),
            Q::rule(ws),
        ]),
    );
    let iri = g.rule(
        "IRIref",
        Q::seq([
            Q::ch('<'),
            Q::zero_or_more(Q::none_of("<>\"{}|^`\\ ")),
            Q::ch('>'),
            Q::rule(ws),
        ]),
    );
    let integer = g.rule(
        "Integer",
        Q::seq([
            Q::one_or_more(Q::range('0', '9')),
            Q::push(|ctx| Ok(ctx.match_text().parse().map_or(Value::Null, Value::Int))),
            Q::rule(ws),
        ]),
    );
    let term = || Q::first_of([Q::rule(var), Q::rule(iri)]);
    let triple = g.rule("Triple", Q::seq([term(), term(), term()]));
    let group = g.rule(
        "GroupGraphPattern",
        Q::seq([
            sym('{'),
            Q::optional(Q::seq([
                Q::rule(triple),
                Q::zero_or_more(Q::seq([sym('.'), Q::rule(triple)])),
                Q::optional(sym('.')),
            ])),
            sym('}'),
        ]),
    );
    let query = g.rule(
        "SelectQuery",
        Q::seq([
            Q::rule(ws),
            kw("SELECT"),
            Q::optional(kw("DISTINCT")),
            Q::first_of([sym('*'), Q::one_or_more(Q::rule(var))]),
            kw("WHERE"),
            Q::rule(group),
            Q::optional(Q::seq([kw("LIMIT"), Q::rule(integer)])),
            Q::eoi(),
        ]),
    );
    (g.build().expect("query grammar is valid"), query)
}

#[test]
fn test_keywords_ignore_case() {
    let (grammar, query) = query_grammar();
    let parser = grammar.parser();
    let outcome = parser
        .parse(query, "select ?s ?o WHERE { ?s <http://x/p> ?o . } Limit 10")
        .unwrap();
    assert_eq!(
        outcome.values(),
        Some(
            &[
                Value::from("s"),
                Value::from("o"),
                Value::from("s"),
                Value::from("o"),
                Value::Int(10),
            ][..]
        )
    );

    assert!(parser.parse(query, "SeLeCt DiStInCt * wHeRe {}").unwrap().is_success());
}

#[test]
fn test_comments_are_whitespace() {
    let (grammar, query) = query_grammar();
    let text = "# leading comment\nSELECT * # all of them\nWHERE {\n  ?a ?b ?c # one triple\n}\n";
    let outcome = grammar.parser().parse(query, text).unwrap();
    assert_eq!(
        outcome.values(),
        Some(&[Value::from("a"), Value::from("b"), Value::from("c")][..])
    );
}

#[test]
fn test_misspelled_keyword() {
    let (grammar, query) = query_grammar();
    let outcome = grammar.parser().parse(query, "SELECT ?x WHER { }").unwrap();
    let failure = outcome.failure().unwrap();
    assert_eq!(failure.position.offset, 10);
    assert_eq!(failure.found, Some('W'));
    assert_eq!(failure.expected.last().map(|e| e.as_str()), Some("WHERE"));
    assert!(failure.expected.iter().any(|e| e == "Var"));
}

#[test]
fn test_recovery_supplies_the_missing_brace() {
    let (grammar, query) = query_grammar();
    let outcome = grammar
        .parser()
        .recovery(true)
        .parse(query, "select ?s where { ?s ?p ?o")
        .unwrap();
    let failure = outcome.failure().unwrap();
    let recovered = failure.recovered.as_ref().unwrap();
    assert!(recovered.complete);
    let missing: Vec<_> = recovered.errors.iter().map(|e| e.expected.as_str()).collect();
    assert_eq!(missing, ["'}'"]);
    assert_eq!(recovered.values.len(), 4);
}
