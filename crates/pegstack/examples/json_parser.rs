//! JSON parser example
//!
//! Builds [`Value`]s on the stack while parsing and prints the document, the
//! frontier of a failed parse and the statistics of a memoized run.

use pegstack::{Grammar, GrammarBuilder, Matcher, ParseOutcome, RuleId, RuleOptions, Value};

type J = Matcher<Value>;

fn append() -> J {
    J::exec(|ctx| {
        let item = ctx.pop()?;
        let mut list: Vec<Value> = ctx.pop_as()?;
        list.push(item);
        ctx.push(Value::List(list));
        Ok(())
    })
}

fn json_grammar() -> Result<(Grammar<Value>, RuleId), pegstack::GrammarError> {
    let mut g = GrammarBuilder::new();
    let value = g.declare("Value");
    let ws = g.rule_with(
        "WS",
        RuleOptions::new().suppress_node(),
        J::zero_or_more(J::any_of(" \t\r\n")),
    );
    g.whitespace(ws);

    let string = g.rule_with(
        "String",
        RuleOptions::new().memo_mismatches(),
        J::seq([
            J::ch('"'),
            J::zero_or_more(J::first_of([
                J::seq([J::ch('\\'), J::any_of("\"\\/bfnrt")]),
                J::none_of("\"\\"),
            ])),
            J::push(|ctx| Ok(Value::from(ctx.match_text()))),
            "\" ".into(),
        ]),
    );
    let number = g.rule(
        "Number",
        J::seq([
            J::seq([
                J::optional('-'),
                J::one_or_more(J::range('0', '9')),
                J::optional(J::seq([J::ch('.'), J::one_or_more(J::range('0', '9'))])),
            ]),
            J::push(|ctx| {
                let text = ctx.match_or_default("0");
                Ok(text
                    .parse::<i64>()
                    .map(Value::Int)
                    .or_else(|_| text.parse::<f64>().map(Value::Float))
                    .unwrap_or(Value::Null))
            }),
            J::rule(ws),
        ]),
    );
    let literal = g.rule(
        "Literal",
        J::first_of([
            J::seq(["true ".into(), J::push_value(Value::Bool(true))]),
            J::seq(["false ".into(), J::push_value(Value::Bool(false))]),
            J::seq(["null ".into(), J::push_value(Value::Null)]),
        ]),
    );
    let array = g.rule(
        "Array",
        J::seq([
            "[ ".into(),
            J::push_value(Value::List(Vec::new())),
            J::optional(J::seq([
                J::rule(value),
                append(),
                J::zero_or_more(J::seq([", ".into(), J::rule(value), append()])),
            ])),
            "] ".into(),
        ]),
    );
    let member = g.rule(
        "Member",
        J::seq([
            J::rule(string),
            ": ".into(),
            J::rule(value),
            J::exec(|ctx| {
                let item = ctx.pop()?;
                let key = ctx.pop()?;
                ctx.push(Value::List(vec![key, item]));
                Ok(())
            }),
        ]),
    );
    let object = g.rule(
        "Object",
        J::seq([
            "{ ".into(),
            J::push_value(Value::List(Vec::new())),
            J::optional(J::seq([
                J::rule(member),
                append(),
                J::zero_or_more(J::seq([", ".into(), J::rule(member), append()])),
            ])),
            "} ".into(),
        ]),
    );
    g.define(
        value,
        J::first_of([
            J::rule(object),
            J::rule(array),
            J::rule(string),
            J::rule(number),
            J::rule(literal),
        ]),
    );
    let document = g.rule("Document", J::seq([J::rule(ws), J::rule(value), J::eoi()]));
    Ok((g.build()?, document))
}

fn main() {
    println!("=== JSON Parser ===\n");

    let (grammar, document) = match json_grammar() {
        Ok(grammar) => grammar,
        Err(e) => {
            eprintln!("Failed to build grammar: {e}");
            return;
        }
    };

    let inputs = [
        r#"{"name": "pegstack", "tags": ["peg", "parser"], "stars": 42, "ratio": 0.5}"#,
        r#"[1, 2, {"nested": [true, false, null]}]"#,
        r#"{"broken": [1, 2,, 3]}"#,
    ];
    let parser = grammar.parser();
    for text in inputs {
        println!("Input: {text}");
        match parser.parse(document, text) {
            Ok(ParseOutcome::Succeeded(success)) => {
                for value in &success.values {
                    println!("  Value: {value}");
                }
                println!(
                    "  Rules evaluated: {}, memo hits: {}",
                    success.stats.rule_calls, success.stats.memo_hits
                );
            }
            Ok(ParseOutcome::Failed(failure)) => println!("  Error: {failure}"),
            Err(e) => println!("  Aborted: {e}"),
        }
        println!();
    }

    println!("=== Example completed ===");
}
