#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Folding and specialization never change what an expression computes.

use proptest::prelude::*;
use rill::{evaluate_expression_with, CompileOptions, Error, Value};

/// Literal-only expressions over every scalar kind, lists and dicts.
fn expr() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        (-50i64..50).prop_map(|n| n.to_string()),
        any::<bool>().prop_map(|b| b.to_string()),
        "[a-c1]{0,2}".prop_map(|s| format!("\"{s}\"")),
        Just("nil".to_string()),
        prop::sample::select(vec!["1.5", "0.25", "1e3", "NaN", "Infinity"])
            .prop_map(str::to_string),
        prop::sample::select(vec!["2.5d", "0.1d", "3d"]).prop_map(str::to_string),
    ];
    leaf.prop_recursive(4, 32, 2, |inner| {
        let op = prop_oneof![
            Just("+"),
            Just("-"),
            Just("*"),
            Just("/"),
            Just("//"),
            Just("%"),
            Just("=="),
            Just("==="),
            Just("<"),
            Just(".."),
            Just("&&"),
            Just("||"),
        ];
        let unary = prop_oneof![Just("-"), Just("!"), Just("typeof")];
        let ty = prop::sample::select(vec!["long", "double", "decimal", "string", "boolean", "list"]);
        prop_oneof![
            (inner.clone(), op, inner.clone()).prop_map(|(a, op, b)| format!("({a} {op} {b})")),
            (unary, inner.clone()).prop_map(|(op, a)| format!("({op} {a})")),
            (inner.clone(), ty.clone()).prop_map(|(a, ty)| format!("({a} as {ty})")),
            (inner.clone(), ty).prop_map(|(a, ty)| format!("({a} is {ty})")),
            (inner.clone(), inner.clone(), inner.clone())
                .prop_map(|(c, a, b)| format!("(if {c} then {a} else {b})")),
            (inner.clone(), inner.clone())
                .prop_map(|(a, b)| format!("({{:a {a}, :b {b}}})[:b]")),
            inner.prop_map(|a| format!("[{a}]")),
        ]
    })
}

/// The value, or the runtime error code.
fn outcome(source: &str, options: CompileOptions) -> Result<Value, &'static str> {
    match evaluate_expression_with(source, false, &options) {
        Ok(value) => Ok(value),
        Err(Error::Runtime(err)) => Err(err.code()),
        Err(err) => panic!("`{source}` does not compile: {err}"),
    }
}

fn plain() -> CompileOptions {
    CompileOptions {
        fold: false,
        specialize: false,
        ..CompileOptions::default()
    }
}

proptest! {
    #[test]
    fn folding_preserves_results(source in expr()) {
        let folded = CompileOptions { fold: true, ..plain() };
        prop_assert_eq!(outcome(&source, folded), outcome(&source, plain()), "{}", source);
    }

    #[test]
    fn specialization_is_transparent(source in expr()) {
        let specialized = CompileOptions { specialize: true, ..plain() };
        prop_assert_eq!(outcome(&source, specialized), outcome(&source, plain()), "{}", source);
    }

    #[test]
    fn specialization_over_typed_bindings_is_transparent(a in -1000i64..1000, b in -1000i64..1000) {
        let source = format!("let {{ long x: {a}; long y: {b}; }} [x + y, x * y, x - y, x < y, -x]");
        prop_assert_eq!(
            outcome(&source, CompileOptions::default()),
            outcome(&source, plain())
        );
    }
}
