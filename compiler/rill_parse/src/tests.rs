#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;
use rill_diagnostic::ErrorCode;
use rill_ir::ast::{DictItem, ForClause, FunctionBody, ImportMember, ListItem, PatternKind};
use rill_ir::{BinaryOp, TypeName, UnaryOp};

struct Parsed {
    arena: ExprArena,
    interner: StringInterner,
    root: ExprId,
}

impl Parsed {
    fn kind(&self, id: ExprId) -> &ExprKind {
        &self.arena.get(id).kind
    }

    fn root(&self) -> &ExprKind {
        self.kind(self.root)
    }

    fn name(&self, id: ExprId) -> String {
        match self.kind(id) {
            ExprKind::Ident(path) => path
                .segments
                .iter()
                .map(|n| self.interner.lookup(*n).to_string())
                .collect::<Vec<_>>()
                .join("."),
            other => panic!("not an identifier: {other:?}"),
        }
    }
}

fn expr(src: &str) -> Parsed {
    let interner = StringInterner::new();
    let mut arena = ExprArena::new();
    let root = parse_expression_source(src, 0, &interner, &mut arena).unwrap();
    Parsed {
        arena,
        interner,
        root,
    }
}

fn expr_err(src: &str) -> ErrorCode {
    let interner = StringInterner::new();
    let mut arena = ExprArena::new();
    parse_expression_source(src, 0, &interner, &mut arena).unwrap_err()[0].code
}

fn module(src: &str) -> (Module, StringInterner, ExprArena) {
    let interner = StringInterner::new();
    let mut arena = ExprArena::new();
    let module = parse_module_source(src, "main".into(), 0, &interner, &mut arena).unwrap();
    (module, interner, arena)
}

#[test]
fn precedence_of_arithmetic() {
    let p = expr("1 + 2 * 3");
    let ExprKind::Binary { op, left, right } = p.root() else {
        panic!("expected binary")
    };
    assert_eq!(*op, BinaryOp::Add);
    assert_eq!(p.kind(*left), &ExprKind::Long(1));
    assert!(matches!(p.kind(*right), ExprKind::Binary { op: BinaryOp::Mul, .. }));
}

#[test]
fn power_is_right_associative() {
    let p = expr("2 ** 3 ** 2");
    let ExprKind::Binary { op, left, right } = p.root() else {
        panic!("expected binary")
    };
    assert_eq!(*op, BinaryOp::Pow);
    assert_eq!(p.kind(*left), &ExprKind::Long(2));
    assert!(matches!(p.kind(*right), ExprKind::Binary { op: BinaryOp::Pow, .. }));
}

#[test]
fn logical_words_and_symbols_are_equivalent() {
    let a = expr("a and b or not c");
    let ExprKind::Binary { op, left, right } = a.root() else {
        panic!("expected binary")
    };
    assert_eq!(*op, BinaryOp::Or);
    assert!(matches!(a.kind(*left), ExprKind::Binary { op: BinaryOp::And, .. }));
    assert!(matches!(a.kind(*right), ExprKind::Unary { op: UnaryOp::Not, .. }));
}

#[test]
fn is_binds_looser_than_concat() {
    let p = expr("a .. b is string");
    let ExprKind::Is { operand, ty } = p.root() else {
        panic!("expected type test")
    };
    assert_eq!(*ty, TypeName::String);
    assert!(matches!(p.kind(*operand), ExprKind::Binary { op: BinaryOp::Concat, .. }));
}

#[test]
fn casts_bind_tighter_than_unary() {
    let p = expr("-x as long");
    let ExprKind::Unary { op, operand } = p.root() else {
        panic!("expected unary")
    };
    assert_eq!(*op, UnaryOp::Neg);
    assert!(matches!(p.kind(*operand), ExprKind::Cast { ty: TypeName::Long, .. }));
}

#[test]
fn negative_literals_stay_literals() {
    assert_eq!(expr("-5").root(), &ExprKind::Long(-5));
}

#[test]
fn qualified_paths_calls_and_indexes() {
    let p = expr("m.lib.f(1, 2)[0]");
    let ExprKind::Index { target, .. } = p.root() else {
        panic!("expected index")
    };
    let ExprKind::Call { callee, args } = p.kind(*target) else {
        panic!("expected call")
    };
    assert_eq!(p.name(*callee), "m.lib.f");
    assert_eq!(args.len(), 2);
}

#[test]
fn function_literals() {
    let p = expr("(long x, y = 2) -> long x + y");
    let ExprKind::Function(func) = p.root() else {
        panic!("expected function")
    };
    assert_eq!(func.params.len(), 2);
    assert_eq!(func.params[0].ty, Some(TypeName::Long));
    assert!(func.params[1].default.is_some());
    assert_eq!(func.return_type, Some(TypeName::Long));
    assert!(matches!(func.body, FunctionBody::Expr(_)));

    let native = expr(r#"(x) -> via "strings.upper""#);
    let ExprKind::Function(func) = native.root() else {
        panic!("expected function")
    };
    assert!(matches!(&func.body, FunctionBody::Native { name, .. } if &**name == "strings.upper"));
}

#[test]
fn parenthesized_expressions_are_not_functions() {
    let p = expr("(1 + 2) * 3");
    assert!(matches!(p.root(), ExprKind::Binary { op: BinaryOp::Mul, .. }));
}

#[test]
fn lists_and_dicts() {
    let p = expr(r#"[1, ...xs, 3]"#);
    let ExprKind::List(items) = p.root() else {
        panic!("expected list")
    };
    assert_eq!(items.len(), 3);
    assert!(matches!(items[1], ListItem::Spread(_)));

    let p = expr(r#"{:a 1, "b" [2, 3] ...d}"#);
    let ExprKind::Dict(items) = p.root() else {
        panic!("expected dict")
    };
    assert_eq!(items.len(), 3);
    let DictItem::Entry { key, value } = &items[1] else {
        panic!("expected entry")
    };
    assert_eq!(p.kind(*key), &ExprKind::String("b".into()));
    assert!(matches!(p.kind(*value), ExprKind::List(_)));
    assert!(matches!(items[2], DictItem::Spread(_)));
}

#[test]
fn let_and_if() {
    let p = expr("let { a: 1; long b: a + 1; } if b > 1 then b else 0");
    let ExprKind::Let { bindings, body } = p.root() else {
        panic!("expected let")
    };
    assert_eq!(bindings.len(), 2);
    assert_eq!(bindings[1].ty, Some(TypeName::Long));
    assert!(matches!(p.kind(*body), ExprKind::If { else_branch: Some(_), .. }));
}

#[test]
fn for_comprehensions() {
    let p = expr("for x <- xs, y: x * 2, y > 2, y");
    let ExprKind::For { clauses, body } = p.root() else {
        panic!("expected for")
    };
    assert_eq!(clauses.len(), 3);
    assert!(matches!(clauses[0], ForClause::Generator { .. }));
    assert!(matches!(clauses[1], ForClause::Local { .. }));
    assert!(matches!(clauses[2], ForClause::Filter(_)));
    assert_eq!(p.name(*body), "y");

    assert_eq!(expr_err("for x > 1, x"), ErrorCode::E1001);
}

#[test]
fn match_arms_guards_and_patterns() {
    let p = expr(r#"match v [@a, long] -> a, string @s, s == "" -> 0, 1 -> "one", default -> nil"#);
    let ExprKind::Match { subject, arms } = p.root() else {
        panic!("expected match")
    };
    assert_eq!(p.name(*subject), "v");
    assert_eq!(arms.len(), 4);
    assert!(matches!(&arms[0].pattern.kind, PatternKind::List(items) if items.len() == 2));
    assert!(matches!(
        arms[1].pattern.kind,
        PatternKind::Type {
            ty: TypeName::String,
            capture: Some(_)
        }
    ));
    assert!(arms[1].guard.is_some());
    assert!(matches!(arms[2].pattern.kind, PatternKind::Value(_)));
    assert!(matches!(arms[3].pattern.kind, PatternKind::Default));
}

#[test]
fn try_with_and_without_binding() {
    let p = expr(r#"try throw "x" catch e e"#);
    assert!(matches!(p.root(), ExprKind::Try { catch: Some(_), .. }));

    let p = expr(r#"try f() catch "fallback""#);
    assert!(matches!(p.root(), ExprKind::Try { catch: None, .. }));
}

#[test]
fn reports_syntax_errors() {
    assert_eq!(expr_err("1 +"), ErrorCode::E1002);
    assert_eq!(expr_err("(1 + 2"), ErrorCode::E1003);
    assert_eq!(expr_err("1 2"), ErrorCode::E1001);
}

#[test]
fn parses_modules() {
    let (module, interner, _) = module(
        r#"
        doc "Utilities" module;
        import strings, core as c from "./std.rill";
        import * as m from "other";

        export library util {
          doc "Adds one"
          inc: (long x) -> x + 1;
          string name: "util";
        }

        library internal {
          x: 1;
        }
        "#,
    );
    assert!(module.doc.is_some());
    assert_eq!(module.imports.len(), 2);
    assert_eq!(&*module.imports[0].source, "./std.rill");
    assert_eq!(module.imports[0].members.len(), 2);
    assert!(matches!(module.imports[1].members[0], ImportMember::Module { .. }));
    assert_eq!(
        &*interner.lookup(module.imports[0].members[1].local_name()),
        "c"
    );
    assert_eq!(module.libraries.len(), 2);
    assert!(module.libraries[0].exported);
    assert!(module.libraries[0].vars[0].doc.is_some());
    assert_eq!(module.libraries[0].vars[1].ty, Some(TypeName::String));
    assert!(!module.libraries[1].exported);
}

#[test]
fn recovers_inside_library_bodies() {
    let interner = StringInterner::new();
    let mut arena = ExprArena::new();
    let errors = parse_module_source(
        "library a { x: ; y: 1; z: ) ; }",
        "main".into(),
        0,
        &interner,
        &mut arena,
    )
    .unwrap_err();
    assert_eq!(errors.len(), 2);
}
