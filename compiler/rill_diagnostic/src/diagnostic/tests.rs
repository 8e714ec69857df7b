#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::AnalysisErrorKind;
use pretty_assertions::assert_eq;

#[test]
fn analysis_errors_are_located() {
    let mut map = SourceMap::new();
    map.add("main.rill", "library a {\n  x: y;\n}");
    let err = AnalysisError::new(
        AnalysisErrorKind::UnresolvedReference { name: "y".into() },
        Span::at(17, 1),
    );
    let diag = Diagnostic::from_analysis(&err, &map);
    assert_eq!(diag.code, ErrorCode::E2002);
    assert_eq!(
        diag.to_string(),
        "main.rill:2:6: error[E2002]: cannot resolve `y`"
    );
}

#[test]
fn cycle_messages_show_the_path() {
    let kind = AnalysisErrorKind::IllegalCycle {
        path: vec!["a".into(), "b".into(), "a".into()],
    };
    assert_eq!(kind.to_string(), "illegal cycle: a -> b -> a");
    assert_eq!(kind.code(), ErrorCode::E2004);
}

#[test]
fn compile_error_summarizes_extra_diagnostics() {
    let err = CompileError::new(vec![
        Diagnostic::new(ErrorCode::E1001, "unexpected `)`", Span::DUMMY),
        Diagnostic::new(ErrorCode::E1002, "expected expression", Span::DUMMY),
    ]);
    assert_eq!(err.to_string(), "error[E1001]: unexpected `)` (and 1 more)");
    assert!(err.has_code(ErrorCode::E1002));
    assert!(!err.has_code(ErrorCode::E2001));
}

#[test]
fn missing_units_have_no_location() {
    let err = LoadError::NotFound {
        unit: "lib/util.rill".into(),
    };
    let diag = Diagnostic::from_load(&err, None);
    assert_eq!(diag.location, None);
    assert_eq!(
        diag.to_string(),
        "error[E3001]: unit `lib/util.rill` not found on the load path"
    );
    assert!(ErrorCode::E0003.is_parse_error());
    assert!(ErrorCode::E2007.is_analysis_error());
}
