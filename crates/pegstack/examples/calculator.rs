//! Calculator example
//!
//! Evaluates arithmetic while parsing, then shows error reporting and the
//! recovery pass on broken input.

use pegstack::{ActionError, GrammarBuilder, GrammarMetrics, Input, Matcher, ParseOutcome, RuleOptions};

type M = Matcher<f64>;

fn binary(op: fn(f64, f64) -> f64) -> M {
    M::exec(move |ctx| {
        let right = ctx.pop()?;
        let left = ctx.pop()?;
        ctx.push(op(left, right));
        Ok(())
    })
}

fn main() {
    println!("=== Calculator ===\n");

    let mut g = GrammarBuilder::new();
    let expression = g.declare("Expression");
    let ws = g.rule_with(
        "WhiteSpace",
        RuleOptions::new().suppress_node(),
        M::zero_or_more(M::any_of(" \t")),
    );
    g.whitespace(ws);

    let number = g.rule(
        "Number",
        M::seq([
            M::seq([
                M::one_or_more(M::range('0', '9')),
                M::optional(M::seq([M::ch('.'), M::one_or_more(M::range('0', '9'))])),
            ]),
            M::push(|ctx| {
                ctx.match_or_default("0")
                    .parse()
                    .map_err(|err| ActionError::failed(format!("bad number: {err}")))
            }),
            M::rule(ws),
        ]),
    );
    let factor = g.rule(
        "Factor",
        M::first_of([
            M::rule(number),
            M::seq(["( ".into(), M::rule(expression), ") ".into()]),
            M::seq(["- ".into(), M::rule(expression), M::exec(|ctx| {
                let value = ctx.pop()?;
                ctx.push(-value);
                Ok(())
            })]),
        ]),
    );
    let term = g.rule(
        "Term",
        M::seq([
            M::rule(factor),
            M::zero_or_more(M::first_of([
                M::seq(["* ".into(), M::rule(factor), binary(|a, b| a * b)]),
                M::seq(["/ ".into(), M::rule(factor), binary(|a, b| a / b)]),
            ])),
        ]),
    );
    g.define(
        expression,
        M::seq([
            M::rule(term),
            M::zero_or_more(M::first_of([
                M::seq(["+ ".into(), M::rule(term), binary(|a, b| a + b)]),
                M::seq(["- ".into(), M::rule(term), binary(|a, b| a - b)]),
            ])),
        ]),
    );
    let input_line = g.rule("InputLine", M::seq([M::rule(ws), M::rule(expression), M::eoi()]));

    let grammar = match g.build() {
        Ok(grammar) => grammar,
        Err(e) => {
            eprintln!("Failed to build grammar: {e}");
            return;
        }
    };
    let metrics = GrammarMetrics::compute(&grammar);
    println!(
        "Grammar: {} rules, {} actions, nesting depth {}\n",
        metrics.rule_count, metrics.action_count, metrics.max_nesting
    );

    let parser = grammar.parser().recovery(true);
    let inputs = ["1 + 2 * 3", "(1.5 + 2.5) / 2", "-(4 - 6) * 3", "2 * (3 + ", "7 / * 2"];
    for text in inputs {
        println!("Input: \"{text}\"");
        match parser.parse(input_line, text) {
            Ok(ParseOutcome::Succeeded(success)) => {
                println!("  Result: {:?}", success.values);
                println!("  Rules evaluated: {}", success.stats.rule_calls);
            }
            Ok(ParseOutcome::Failed(failure)) => {
                println!("{}", failure.render(&Input::new(text)));
                if let Some(recovered) = &failure.recovered {
                    println!("  Recovered result: {:?}", recovered.values);
                    for error in &recovered.errors {
                        println!("  - {error}");
                    }
                }
            }
            Err(e) => println!("  Aborted: {e}"),
        }
        println!();
    }

    println!("=== Example completed ===");
}
