#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::test_helpers::{expression, modules};
use pretty_assertions::assert_eq;

#[test]
fn collects_module_library_and_var_annotations() {
    let f = modules(&[(
        "main",
        r#"
        doc "Main unit" meta {:version 2} module;

        doc "Helpers"
        export library util {
          doc "Adds one" meta [:pure, true]
          inc: (x) -> x + 1;
          plain: 1;
        }
        "#,
    )]);
    let table = analyze(&f.input()).unwrap();

    let module = table.get(MetaKey::Module { module: 0 }).unwrap();
    assert_eq!(module.doc.as_deref(), Some("Main unit"));
    assert_eq!(module.meta.as_ref().unwrap().to_string(), "{\"version\" 2}");

    let library = table.get(MetaKey::Library { module: 0, library: 0 }).unwrap();
    assert_eq!(library.doc.as_deref(), Some("Helpers"));
    assert_eq!(library.meta, None);

    let var = table
        .get(MetaKey::Var {
            module: 0,
            library: 0,
            var: 0,
        })
        .unwrap();
    assert_eq!(var.doc.as_deref(), Some("Adds one"));
    assert_eq!(
        var.meta,
        Some(ConstValue::List(
            vec![ConstValue::string("pure"), ConstValue::Boolean(true)].into()
        ))
    );

    assert!(table
        .get(MetaKey::Var {
            module: 0,
            library: 0,
            var: 1,
        })
        .is_none());
    assert_eq!(table.len(), 3);
}

#[test]
fn collects_let_binding_annotations() {
    let f = expression(r#"let { doc "the answer" x: 42; y: 1; } x"#);
    let table = analyze(&f.input()).unwrap();

    let key = MetaKey::LetBinding {
        node: f.expr.unwrap(),
        binding: 0,
    };
    assert_eq!(table.get(key).unwrap().doc.as_deref(), Some("the answer"));
    assert_eq!(table.len(), 1);
}

#[test]
fn rejects_non_literal_metadata() {
    let f = modules(&[("main", "library l { meta [1 + 2] x: 1; }")]);
    let errors = analyze(&f.input()).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code(), rill_diagnostic::ErrorCode::E2007);

    let f = modules(&[("main", "library l { doc 42 x: 1; }")]);
    assert!(matches!(
        &analyze(&f.input()).unwrap_err()[0].kind,
        AnalysisErrorKind::InvalidMetadata { reason } if reason.contains("string")
    ));
}
