#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use rill_ir::ops::{FunctionCode, OpKind};
use rill_ir::ConstValue;

use crate::test_helpers::{expression, folded};

fn folds_to(source: &str) -> Option<ConstValue> {
    let lowered = folded(source);
    lowered.program.as_constant(lowered.entry()).cloned()
}

#[test]
fn folds_operators_over_literals() {
    assert_eq!(folds_to("1 + 2 * 3"), Some(ConstValue::Long(7)));
    assert_eq!(folds_to(r#""a" .. 1"#), Some(ConstValue::string("a1")));
    assert_eq!(folds_to("-(2 ** 3)"), Some(ConstValue::Long(-8)));
    assert_eq!(folds_to("typeof 1.5"), Some(ConstValue::string("double")));
    assert_eq!(folds_to(r#""42" as long"#), Some(ConstValue::Long(42)));
    assert_eq!(folds_to("1 is long"), Some(ConstValue::Boolean(true)));
}

#[test]
fn folds_collections() {
    assert_eq!(
        folds_to("[1, ...[2, 3]]"),
        Some(ConstValue::List(
            vec![ConstValue::Long(1), ConstValue::Long(2), ConstValue::Long(3)].into()
        ))
    );
    let Some(ConstValue::Dict(entries)) = folds_to("{:a 1, ...{:a 2, :b 3}}") else {
        panic!("expected dict");
    };
    assert_eq!(entries.get("a"), Some(&ConstValue::Long(2)));
    assert_eq!(entries.len(), 2);
}

#[test]
fn folds_decided_branches() {
    assert_eq!(folds_to("if 1 > 2 then 1 else 2"), Some(ConstValue::Long(2)));
    assert_eq!(folds_to("if [] then 1"), Some(ConstValue::Nil));
    assert_eq!(folds_to("true || 1 // 0"), Some(ConstValue::Boolean(true)));
    assert_eq!(folds_to("1 && \"x\""), Some(ConstValue::Boolean(true)));
}

#[test]
fn short_circuit_decided_by_the_left_operand() {
    let body = |source: &str| {
        let lowered = folded(source);
        let FunctionCode::Op(body) = lowered.program.functions[0].body else {
            panic!("expected body");
        };
        (lowered.program.as_constant(body).cloned(), lowered.kind(body).name())
    };
    assert_eq!(body("(f) -> false && f()"), (Some(ConstValue::Boolean(false)), "constant"));
    assert_eq!(body("(f) -> true && f()"), (None, "logical"));
    assert_eq!(body("(f) -> true || f()"), (Some(ConstValue::Boolean(true)), "constant"));
}

#[test]
fn failing_subtrees_stay_for_run_time() {
    let lowered = folded("1 // 0");
    assert!(matches!(lowered.kind(lowered.entry()), OpKind::Binary { .. }));

    let lowered = folded(r#""x" as long"#);
    assert!(matches!(lowered.kind(lowered.entry()), OpKind::Cast { .. }));
}

#[test]
fn references_and_calls_are_kept() {
    let lowered = folded("let { a: 1; } a + 1");
    assert_eq!(lowered.ops(|k| matches!(k, OpKind::Binary { .. })).len(), 1);

    let lowered = folded("debug 1 + 1");
    assert!(matches!(lowered.kind(lowered.entry()), OpKind::Debug(_)));
}

#[test]
fn folding_copies_the_program() {
    let lowered = expression("1 + 1");
    let before = lowered.program.clone();
    let after = crate::fold(&lowered.program);
    assert_eq!(lowered.program, before);
    assert_ne!(after, before);
    assert_eq!(after.ops.len(), before.ops.len());
}
