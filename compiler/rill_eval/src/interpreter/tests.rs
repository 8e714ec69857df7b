#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use pretty_assertions::assert_eq;
use rill_analysis::{AnalysisInput, Root};
use rill_ir::ast::ExprArena;
use rill_ir::SharedInterner;
use rill_value::{EvalErrorKind, EvalResult, Value};

use crate::{
    CancellableDebugHandler, Interpreter, InterpreterBuilder, NativeRegistry,
    RecordingDebugHandler, SharedDebugHandler,
};

fn compile_expression(source: &str, builder: impl FnOnce(InterpreterBuilder) -> InterpreterBuilder) -> Interpreter {
    let interner = SharedInterner::new();
    let natives = NativeRegistry::with_defaults();
    let mut arena = ExprArena::new();
    let expr = rill_parse::parse_expression_source(source, 0, &interner, &mut arena)
        .unwrap_or_else(|errors| panic!("`{source}` does not parse: {errors:?}"));
    let input = AnalysisInput {
        arena: &arena,
        interner: &interner,
        root: Root::Expression {
            expr,
            allow_natives: true,
        },
        natives: &natives,
    };
    let analysis = rill_analysis::analyze(&input).unwrap_or_else(|errors| panic!("{errors:?}"));
    let program = rill_canon::specialize(&rill_canon::fold(&rill_canon::lower(&input, &analysis)));
    builder(InterpreterBuilder::new(Arc::new(program), interner).natives(Arc::new(natives))).build()
}

fn compile_modules(units: &[(&str, &str)]) -> Interpreter {
    let interner = SharedInterner::new();
    let natives = NativeRegistry::with_defaults();
    let mut arena = ExprArena::new();
    let mut modules = Vec::new();
    let mut base = 0u32;
    for (name, source) in units {
        let module =
            rill_parse::parse_module_source(source, (*name).into(), base, &interner, &mut arena)
                .unwrap_or_else(|errors| panic!("{name} does not parse: {errors:?}"));
        modules.push(module);
        base += u32::try_from(source.len()).unwrap() + 1;
    }
    let allow_natives = vec![true; modules.len()];
    let input = AnalysisInput {
        arena: &arena,
        interner: &interner,
        root: Root::Modules {
            modules: &modules,
            allow_natives: &allow_natives,
        },
        natives: &natives,
    };
    let analysis = rill_analysis::analyze(&input).unwrap_or_else(|errors| panic!("{errors:?}"));
    let program = rill_canon::specialize(&rill_canon::fold(&rill_canon::lower(&input, &analysis)));
    InterpreterBuilder::new(Arc::new(program), interner)
        .natives(Arc::new(natives))
        .build()
}

fn run(source: &str) -> EvalResult {
    compile_expression(source, |b| b).eval_entry()
}

fn value(source: &str) -> Value {
    run(source).unwrap_or_else(|error| panic!("`{source}` failed: {error}"))
}

fn error(source: &str) -> EvalErrorKind {
    match run(source) {
        Ok(value) => panic!("`{source}` evaluated to {value}"),
        Err(error) => error.kind,
    }
}

fn longs(items: &[i64]) -> Value {
    Value::list(items.iter().map(|n| Value::Long(*n)).collect())
}

/// Value of `library.var` in `unit`.
fn library_var(interpreter: &Interpreter, unit: &str, library: &str, var: &str) -> EvalResult {
    let program = interpreter.program();
    let interner = interpreter.interner();
    let library = program
        .library_index(unit, interner.intern(library))
        .unwrap();
    let slot = program.libraries[library]
        .var_slot(interner.intern(var))
        .unwrap();
    interpreter.library_var(library, slot)
}

#[test]
fn arithmetic() {
    assert_eq!(value("1 + 2"), Value::Long(3));
    assert_eq!(value("7 / 2"), Value::Double(3.5));
    assert_eq!(value("-7 // 2"), Value::Long(-4));
    assert_eq!(value("2 ** 10"), Value::Long(1024));
    assert_eq!(value("1 + nil"), Value::Nil);
    assert_eq!(value(r#""a" .. 1"#), Value::string("a1"));
}

#[test]
fn let_bindings_are_lazy_and_order_free() {
    assert_eq!(value("let { b: a + 1; a: 1; } b"), Value::Long(2));
    // An unused failing binding is never evaluated.
    assert_eq!(value("let { bad: 1 // 0; ok: 2; } ok"), Value::Long(2));
    assert_eq!(value("let { a: 1; } let { b: a + 1; } a + b"), Value::Long(3));
}

#[test]
fn declared_types_cast_values() {
    assert_eq!(value(r#"let { long n: "12"; } n"#), Value::Long(12));
    assert_eq!(value(r#"let { f: (long x) -> string x; } f("7")"#), Value::string("7"));
}

#[test]
fn closures_capture_lexically() {
    assert_eq!(value("let { add: (x) -> (y) -> x + y; } add(1)(2)"), Value::Long(3));
    assert_eq!(
        value("let { base: 10; f: (x) -> let { y: x + base; } (z) -> y + z; } f(1)(2)"),
        Value::Long(13)
    );
}

#[test]
fn closures_in_comprehensions_keep_their_iteration() {
    assert_eq!(
        value("let { fs: for i <- [1, 2, 3], () -> i; } for f <- fs, f()"),
        longs(&[1, 2, 3])
    );
}

#[test]
fn defaults_and_arity() {
    assert_eq!(value("let { f: (x, y = 10) -> x + y; } f(1)"), Value::Long(11));
    assert_eq!(value("let { f: (x, y) -> y; } f(1)"), Value::Nil);
    assert!(matches!(
        error("let { f: (x) -> x; } f(1, 2)"),
        EvalErrorKind::ArityMismatch {
            expected: 1,
            found: 2
        }
    ));
    assert!(matches!(
        error("let { x: 1; } x()"),
        EvalErrorKind::NotCallable { .. }
    ));
}

#[test]
fn recursion() {
    assert_eq!(
        value("let { fact: (long n) -> if n <= 1 then 1 else n * fact(n - 1); } fact(10)"),
        Value::Long(3_628_800)
    );
}

#[test]
fn call_depth_is_limited_and_uncatchable() {
    let interpreter = compile_expression("let { f: (n) -> f(n + 1); } try f(0) catch 0", |b| {
        b.max_call_depth(50)
    });
    assert!(matches!(
        interpreter.eval_entry().unwrap_err().kind,
        EvalErrorKind::StackOverflow { depth: 50 }
    ));
}

#[test]
fn specialized_operators_fall_back_for_other_kinds() {
    assert_eq!(value("let { f: (long x) -> x + 1; } f(nil)"), Value::Nil);
    assert_eq!(value("let { f: (double x) -> -x; } f(nil)"), Value::Nil);
}

#[test]
fn logical_operators_short_circuit() {
    assert_eq!(value("false && 1 // 0 == 1"), Value::Boolean(false));
    assert_eq!(value("true || 1 // 0 == 1"), Value::Boolean(true));
    assert_eq!(value(r#"nil || "x""#), Value::Boolean(true));
}

#[test]
fn collections() {
    assert_eq!(value("[1, ...[2, 3], ...nil]"), longs(&[1, 2, 3]));
    assert_eq!(value("{:a 1, ...{:b 2}}[:b]"), Value::Long(2));
    assert_eq!(value("{:a 1}[:missing]"), Value::Nil);
    assert!(matches!(
        error("[1, 2][5]"),
        EvalErrorKind::IndexOutOfBounds { index: 5, len: 2 }
    ));
}

#[test]
fn conditionals() {
    assert_eq!(value("if nil then 1"), Value::Nil);
    assert_eq!(value(r#"if "" then 1 else 2"#), Value::Long(2));
}

#[test]
fn comprehensions() {
    assert_eq!(value("for x <- [1, 2, 3, 4], y: x * 2, y > 4, y"), longs(&[6, 8]));
    assert_eq!(value("for x <- [1, 2], y <- [10, 20], x + y"), longs(&[11, 21, 12, 22]));
    assert_eq!(value("for v <- {:a 1, :b 2}, v"), longs(&[1, 2]));
    assert_eq!(value("for x <- nil, x"), longs(&[]));
    assert!(matches!(error("for x <- 1, x"), EvalErrorKind::TypeMismatch { .. }));
}

#[test]
fn pattern_matching() {
    let source = |subject: &str| {
        format!(
            r#"match {subject} [long @n, string] -> n, string @s, s == "" -> "empty", "x" -> "ex", string @s -> s .. "!", default -> nil"#
        )
    };
    assert_eq!(value(&source(r#"[1, "a"]"#)), Value::Long(1));
    assert_eq!(value(&source(r#""""#)), Value::string("empty"));
    assert_eq!(value(&source(r#""x""#)), Value::string("ex"));
    assert_eq!(value(&source(r#""y""#)), Value::string("y!"));
    assert_eq!(value(&source("3.5")), Value::Nil);
    assert_eq!(value("match 1 2 -> 2"), Value::Nil);
}

#[test]
fn try_catches_engine_errors_and_thrown_values() {
    assert_eq!(
        value("try 1 // 0 catch e e[:code]"),
        Value::string("DIVISION_BY_ZERO")
    );
    assert_eq!(value("try throw {:a 1} catch e e[:a]"), Value::Long(1));
    assert_eq!(value(r#"try throw "x" catch "fallback""#), Value::string("fallback"));
    assert_eq!(value("let { x: 5; } try x catch e 0"), Value::Long(5));
    assert!(matches!(error("throw 1"), EvalErrorKind::Thrown { value: Value::Long(1) }));
}

#[test]
fn errors_carry_the_failing_span() {
    let error = run("1 + (2 // 0)").unwrap_err();
    assert!(matches!(error.kind, EvalErrorKind::DivisionByZero));
    assert_eq!((error.span.start, error.span.end), (5, 11));
}

#[test]
fn runtime_cycles_through_functions_are_detected() {
    assert!(matches!(
        error("let { a: f(); f: () -> a; } a"),
        EvalErrorKind::CyclicEvaluation { name } if name == "a"
    ));
}

#[test]
fn natives_are_called_with_filled_parameters() {
    assert_eq!(
        value(r#"let { up: (string s) -> via "strings.upper"; } up("abc")"#),
        Value::string("ABC")
    );
    assert_eq!(
        value(r#"let { size: (x) -> via "core.size"; } size([1, 2, 3])"#),
        Value::Long(3)
    );
    assert!(matches!(
        error(r#"let { size: (x) -> via "core.size"; } size(1)"#),
        EvalErrorKind::NativeFailure { .. }
    ));
}

#[test]
fn debug_values_reach_the_handler() {
    let recording = Arc::new(RecordingDebugHandler::new());
    let handler: SharedDebugHandler = recording.clone();
    let interpreter = compile_expression("[debug 1 + 1, debug :x]", |b| b.debug_handler(handler));
    assert_eq!(
        interpreter.eval_entry().unwrap(),
        Value::list(vec![Value::Long(2), Value::string("x")])
    );
    assert_eq!(recording.values(), vec![Value::Long(2), Value::string("x")]);
}

#[test]
fn failures_are_reported_once() {
    let recording = Arc::new(RecordingDebugHandler::new());
    let handler: SharedDebugHandler = recording.clone();
    let interpreter = compile_expression("let { f: () -> 1 // 0; } f()", |b| b.debug_handler(handler));
    assert!(interpreter.eval_entry().is_err());
    assert_eq!(recording.failures(), vec!["DIVISION_BY_ZERO"]);
}

#[test]
fn cancelled_evaluation_is_interrupted_and_uncatchable() {
    let cancel = Arc::new(CancellableDebugHandler::new());
    let handler: SharedDebugHandler = cancel.clone();
    let interpreter = compile_expression("try 1 catch 2", |b| b.debug_handler(handler));
    cancel.cancel();
    assert!(matches!(
        interpreter.eval_entry().unwrap_err().kind,
        EvalErrorKind::Interrupted
    ));
    cancel.reset();
    assert_eq!(interpreter.eval_entry().unwrap(), Value::Long(1));
}

#[test]
fn library_vars_are_evaluated_once() {
    let recording = Arc::new(RecordingDebugHandler::new());
    let interpreter = compile_modules(&[("main", "library lib { x: debug 1 + 1; y: x * 10; }")]);
    let interpreter = InterpreterBuilder::new(Arc::clone(interpreter.program()), interpreter.interner().clone())
        .debug_handler(recording.clone())
        .build();

    assert_eq!(library_var(&interpreter, "main", "lib", "y").unwrap(), Value::Long(20));
    assert_eq!(library_var(&interpreter, "main", "lib", "x").unwrap(), Value::Long(2));
    assert_eq!(recording.values(), vec![Value::Long(2)]);
}

#[test]
fn library_vars_resolve_across_modules() {
    let interpreter = compile_modules(&[
        ("main", r#"import lib from "util"; library app { z: lib.x + 1; }"#),
        ("util", "export library lib { x: 41; }"),
    ]);
    assert_eq!(library_var(&interpreter, "main", "app", "z").unwrap(), Value::Long(42));
}

#[test]
fn functions_using_libraries_stay_in_their_runtime() {
    let source = [("main", "library lib { x: 1; f: (y) -> x + y; g: (y) -> y * 2; }")];
    let first = compile_modules(&source);
    let second = compile_modules(&source);

    let f = library_var(&first, "main", "lib", "f").unwrap();
    let g = library_var(&first, "main", "lib", "g").unwrap();
    assert_eq!(first.call(&f, &[Value::Long(1)]).unwrap(), Value::Long(2));
    assert!(matches!(
        second.call(&f, &[Value::Long(1)]).unwrap_err().kind,
        EvalErrorKind::ForeignFunction
    ));
    assert_eq!(second.call(&g, &[Value::Long(4)]).unwrap(), Value::Long(8));
}

#[test]
fn concurrent_reads_agree() {
    let interpreter = Arc::new(compile_modules(&[(
        "main",
        "library lib { xs: for i <- [1, 2, 3, 4, 5, 6, 7, 8], i * i; total: let { sum: (l, i = 0, acc = 0) -> if i >= 8 then acc else sum(l, i + 1, acc + l[i]); } sum(xs); }",
    )]));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let interpreter = Arc::clone(&interpreter);
            std::thread::spawn(move || library_var(&interpreter, "main", "lib", "total").unwrap())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), Value::Long(204));
    }
}
