//! Grammars shared by the integration tests

#![allow(dead_code)]

use pegstack::{ActionError, Grammar, GrammarBuilder, Matcher, RuleId, RuleOptions};

pub type M = Matcher<i64>;

/// Integer calculator: `+ - * /`, parentheses, left associative
pub struct Calculator {
    pub grammar: Grammar<i64>,
    pub input_line: RuleId,
    pub expression: RuleId,
}

fn binary(op: fn(i64, i64) -> Result<i64, ActionError>) -> M {
    M::exec(move |ctx| {
        let right = ctx.pop()?;
        let left = ctx.pop()?;
        ctx.push(op(left, right)?);
        Ok(())
    })
}

fn checked(result: Option<i64>) -> Result<i64, ActionError> {
    result.ok_or_else(|| ActionError::failed("arithmetic overflow"))
}

pub fn calculator() -> Calculator {
    let mut g = GrammarBuilder::new();
    let expression = g.declare("Expression");
    let term = g.declare("Term");
    let factor = g.declare("Factor");
    let parens = g.declare("Parens");
    let number = g.declare("Number");
    let digits = g.declare("Digits");

    let input_line = g.rule("InputLine", M::seq([M::rule(expression), M::eoi()]));
    g.define(
        expression,
        M::seq([
            M::rule(term),
            M::zero_or_more(M::first_of([
                M::seq([M::ch('+'), M::rule(term), binary(|a, b| checked(a.checked_add(b)))]),
                M::seq([M::ch('-'), M::rule(term), binary(|a, b| checked(a.checked_sub(b)))]),
            ])),
        ]),
    );
    g.define(
        term,
        M::seq([
            M::rule(factor),
            M::zero_or_more(M::first_of([
                M::seq([M::ch('*'), M::rule(factor), binary(|a, b| checked(a.checked_mul(b)))]),
                M::seq([
                    M::ch('/'),
                    M::rule(factor),
                    binary(|a, b| {
                        a.checked_div(b)
                            .ok_or_else(|| ActionError::failed("division by zero"))
                    }),
                ]),
            ])),
        ]),
    );
    g.define(factor, M::first_of([M::rule(number), M::rule(parens)]));
    g.define(parens, M::seq([M::ch('('), M::rule(expression), M::ch(')')]));
    g.define(
        number,
        M::seq([
            M::rule(digits),
            M::push(|ctx| {
                ctx.match_or_default("0")
                    .parse()
                    .map_err(|err| ActionError::failed(format!("bad number: {err}")))
            }),
        ]),
    );
    g.define(digits, M::one_or_more(M::range('0', '9')));
    g.options(digits, RuleOptions::new().suppress_subnodes());

    Calculator {
        grammar: g.build().expect("calculator grammar is valid"),
        input_line,
        expression,
    }
}

/// Evaluate `text` with the calculator, expecting success.
pub fn eval(text: &str) -> i64 {
    let calc = calculator();
    let outcome = calc
        .grammar
        .parser()
        .parse(calc.input_line, text)
        .expect("no fatal error");
    match outcome.values() {
        Some([value]) => *value,
        other => panic!("unexpected result for {text:?}: {other:?}"),
    }
}
