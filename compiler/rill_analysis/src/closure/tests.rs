#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::test_helpers::{expression, modules};
use pretty_assertions::assert_eq;

fn captured_names(f: &crate::test_helpers::Fixture, info: &ClosureInfo) -> Vec<String> {
    let analysis = f.analyze();
    info.captures
        .iter()
        .map(|c| match c {
            Capture::Value(b) => f.interner.lookup(analysis.scopes.binding(*b).name).to_string(),
            Capture::Group(_) => "<group>".to_string(),
        })
        .collect()
}

#[test]
fn closed_functions_capture_nothing() {
    let f = expression("(x, y) -> x + y * 2");
    let analysis = f.analyze();
    let info = analysis.closures.get(f.function(0)).unwrap();
    assert!(info.captures.is_empty());
    assert!(!info.uses_libraries);
}

#[test]
fn captures_outer_values_in_first_use_order() {
    let f = expression("for a <- [1], b <- [2], (x) -> b + a + b + x");
    let analysis = f.analyze();
    let info = analysis.closures.get(f.function(0)).unwrap();
    assert_eq!(captured_names(&f, info), vec!["b", "a"]);
}

#[test]
fn let_bindings_capture_their_group() {
    let f = expression("let { f: (n) -> if n > 0 then f(n - 1) else 0; } f(3)");
    let analysis = f.analyze();
    let info = analysis.closures.get(f.function(0)).unwrap();

    let let_scope = analysis.scopes.node_scope(f.expr.unwrap()).unwrap();
    assert_eq!(info.captures, vec![Capture::Group(let_scope)]);
}

#[test]
fn nested_functions_pass_captures_through() {
    let f = expression("for a <- [1], (x) -> (y) -> a + x + y");
    let analysis = f.analyze();

    let inner = analysis.closures.get(f.function(0)).unwrap();
    let outer = analysis.closures.get(f.function(1)).unwrap();
    assert_eq!(captured_names(&f, inner), vec!["a", "x"]);
    assert_eq!(captured_names(&f, outer), vec!["a"]);
}

#[test]
fn defaults_are_not_part_of_the_capture_set() {
    let f = expression("for a <- [1], (x = a) -> x");
    let analysis = f.analyze();
    assert!(analysis.closures.get(f.function(0)).unwrap().captures.is_empty());
}

#[test]
fn library_vars_are_addressed_not_captured() {
    let f = modules(&[("main", "library l { k: 10; add: (x) -> x + k; }")]);
    let analysis = f.analyze();
    let info = analysis.closures.get(f.function(0)).unwrap();
    assert!(info.captures.is_empty());
    assert!(info.uses_libraries);
}
