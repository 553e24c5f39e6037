#![no_main]
use libfuzzer_sys::fuzz_target;
use pegstack::{ActionError, GrammarBuilder, Matcher, RuleOptions};

type M = Matcher<i64>;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    let mut g = GrammarBuilder::new();
    let list = g.declare("List");
    let number = g.rule_with(
        "Number",
        RuleOptions::new().memo_mismatches(),
        M::seq([
            M::one_or_more(M::range('0', '9')),
            M::push(|ctx| {
                ctx.match_or_default("0")
                    .parse()
                    .map_err(|err| ActionError::failed(format!("{err}")))
            }),
        ]),
    );
    let item = g.rule(
        "Item",
        M::first_of([
            M::rule(number),
            M::seq([M::ch('['), M::rule(list), M::ch(']')]),
            M::seq([M::ignore_case("nil"), M::push_value(0)]),
        ]),
    );
    g.define(
        list,
        M::optional(M::seq([
            M::rule(item),
            M::zero_or_more(M::seq([M::ch(','), M::rule(item)])),
        ])),
    );
    let root = g.rule("Root", M::seq([M::rule(list), M::eoi()]));
    let Ok(grammar) = g.build() else {
        return;
    };

    // Parse with and without recovery - should not panic
    let parser = grammar.parser();
    if let Ok(outcome) = parser.parse(root, input) {
        if let Some(failure) = outcome.failure() {
            assert!(failure.position.offset <= input.len());
        }
    }
    let _result = parser.recovery(true).parse(root, input);
});
