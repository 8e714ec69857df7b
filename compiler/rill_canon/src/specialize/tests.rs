#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use rill_ir::ops::{Dispatch, OpKind};

use crate::test_helpers::expression;

fn dispatches(source: &str) -> Vec<Dispatch> {
    let lowered = expression(source);
    let program = crate::specialize(&lowered.program);
    program
        .ops
        .iter()
        .filter_map(|node| match node.kind {
            OpKind::Binary { dispatch, .. } | OpKind::Unary { dispatch, .. } => Some(dispatch),
            _ => None,
        })
        .collect()
}

#[test]
fn typed_operands_get_fast_paths() {
    assert_eq!(dispatches("(long a, long b) -> a * b"), vec![Dispatch::Long]);
    assert_eq!(dispatches("(double a) -> -a"), vec![Dispatch::Double]);
    assert_eq!(dispatches("(string a, string b) -> a .. b"), vec![Dispatch::String]);
    assert_eq!(dispatches("(boolean a) -> !a"), vec![Dispatch::Boolean]);
    assert_eq!(dispatches("1.5 < 2.5"), vec![Dispatch::Double]);
}

#[test]
fn unknown_or_mixed_operands_stay_generic() {
    assert_eq!(dispatches("(a, long b) -> a + b"), vec![Dispatch::Generic]);
    assert_eq!(dispatches("(long a, double b) -> a + b"), vec![Dispatch::Generic]);
    assert_eq!(dispatches("(string a, string b) -> a + b"), vec![Dispatch::Generic]);
}

#[test]
fn result_types_propagate() {
    // `a + b` is a long, so the comparison specializes too.
    assert_eq!(
        dispatches("(long a, long b) -> a + b > 1"),
        vec![Dispatch::Long, Dispatch::Long]
    );
}
