#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::test_helpers::{expression, modules};
use pretty_assertions::assert_eq;
use rill_diagnostic::ErrorCode;

fn cycle_paths(errors: &[AnalysisError]) -> Vec<String> {
    errors
        .iter()
        .map(|e| match &e.kind {
            AnalysisErrorKind::IllegalCycle { path } => path.join(" -> "),
            other => panic!("unexpected {other:?}"),
        })
        .collect()
}

#[test]
fn mutual_eager_references_are_cycles() {
    let f = expression("let { a: b; b: a; } a");
    let errors = f.errors();
    assert_eq!(cycle_paths(&errors), vec!["a -> b -> a"]);
    assert_eq!(errors[0].code(), ErrorCode::E2004);
}

#[test]
fn self_reference_is_a_cycle() {
    let f = modules(&[("main", "library l { x: x + 1; }")]);
    assert_eq!(cycle_paths(&f.errors()), vec!["x -> x"]);
}

#[test]
fn recursive_functions_are_accepted() {
    let f = expression("let { fact: (n) -> if n <= 1 then 1 else n * fact(n - 1); } fact(5)");
    assert!(f.errors().is_empty());

    let f = modules(&[(
        "main",
        "library l { even: (n) -> n == 0 || odd(n - 1); odd: (n) -> n != 0 && even(n - 1); }",
    )]);
    assert!(f.errors().is_empty());
}

#[test]
fn parameter_defaults_are_eager() {
    let f = expression("let { g: (x = g) -> x; } g");
    assert_eq!(cycle_paths(&f.errors()), vec!["g -> g"]);
}

#[test]
fn cycles_across_libraries_name_the_full_path() {
    let f = modules(&[(
        "main",
        "library a { x: b.y + 1; } library b { y: c.z; } library c { z: a.x; w: 1; }",
    )]);
    assert_eq!(cycle_paths(&f.errors()), vec!["x -> y -> z -> x"]);
}

#[test]
fn records_eager_dependencies() {
    let f = expression("let { a: 1; b: a + a; c: (x) -> b; } c");
    let analysis = f.analyze();
    let find = |name: &str| {
        let name = f.name(name);
        analysis
            .scopes
            .bindings()
            .find(|(_, b)| b.name == name)
            .map(|(id, _)| id)
            .unwrap()
    };

    assert_eq!(analysis.dependencies.dependencies(find("b")), &[find("a")]);
    assert!(analysis.dependencies.dependencies(find("c")).is_empty());
    assert_eq!(analysis.dependencies.node_count(), 3);
}
