//! Expression nodes.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use smallvec::SmallVec;

use super::{ExprId, VarDef};
use crate::{BinaryOp, Name, Span, TypeName, UnaryOp};

#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

/// A possibly qualified identifier: `x`, `lib.x`, `m.lib.x`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Path {
    pub segments: SmallVec<[Name; 2]>,
}

impl Path {
    pub fn single(name: Name) -> Self {
        let mut segments = SmallVec::new();
        segments.push(name);
        Path { segments }
    }

    pub fn head(&self) -> Name {
        self.segments[0]
    }

    pub fn is_qualified(&self) -> bool {
        self.segments.len() > 1
    }
}

/// A name introduced at a specific place.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Binder {
    pub name: Name,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Nil,
    Bool(bool),
    Long(i64),
    Double(f64),
    Decimal(Decimal),
    String(Arc<str>),
    DateTime(DateTime<FixedOffset>),
    List(Vec<ListItem>),
    Dict(Vec<DictItem>),

    Ident(Path),
    Call {
        callee: ExprId,
        args: Vec<ExprId>,
    },
    Index {
        target: ExprId,
        key: ExprId,
    },
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },
    Cast {
        operand: ExprId,
        ty: TypeName,
    },
    Is {
        operand: ExprId,
        ty: TypeName,
    },

    If {
        cond: ExprId,
        then_branch: ExprId,
        else_branch: Option<ExprId>,
    },
    /// `let { a: 1; b: a + 1; } body`
    Let {
        bindings: Vec<VarDef>,
        body: ExprId,
    },
    Function(Box<FunctionExpr>),
    /// `for x <- xs, y: x * 2, y > 1, y`
    For {
        clauses: Vec<ForClause>,
        body: ExprId,
    },
    Match {
        subject: ExprId,
        arms: Vec<MatchArm>,
    },
    Try {
        body: ExprId,
        catch: Option<Binder>,
        handler: ExprId,
    },
    Throw(ExprId),
    Debug(ExprId),
}

impl ExprKind {
    /// Whether the node is a plain literal with no children.
    pub fn is_scalar_literal(&self) -> bool {
        matches!(
            self,
            ExprKind::Nil
                | ExprKind::Bool(_)
                | ExprKind::Long(_)
                | ExprKind::Double(_)
                | ExprKind::Decimal(_)
                | ExprKind::String(_)
                | ExprKind::DateTime(_)
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ListItem {
    Expr(ExprId),
    /// `...xs`
    Spread(ExprId),
}

#[derive(Clone, Debug, PartialEq)]
pub enum DictItem {
    Entry { key: ExprId, value: ExprId },
    /// `...d`
    Spread(ExprId),
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionExpr {
    pub params: Vec<Param>,
    pub return_type: Option<TypeName>,
    pub body: FunctionBody,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: Name,
    pub span: Span,
    pub ty: Option<TypeName>,
    pub default: Option<ExprId>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FunctionBody {
    Expr(ExprId),
    /// `via "strings.upper"`
    Native { name: Arc<str>, span: Span },
}

#[derive(Clone, Debug, PartialEq)]
pub enum ForClause {
    /// `[TYPE] x <- source`
    Generator {
        binder: Binder,
        ty: Option<TypeName>,
        source: ExprId,
    },
    /// `[TYPE] x: init`
    Local {
        binder: Binder,
        ty: Option<TypeName>,
        init: ExprId,
    },
    Filter(ExprId),
}

#[derive(Clone, Debug, PartialEq)]
pub struct MatchArm {
    pub pattern: Pattern,
    pub guard: Option<ExprId>,
    pub body: ExprId,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Pattern {
    pub kind: PatternKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PatternKind {
    /// `default`
    Default,
    /// `@x`
    Capture(Binder),
    /// `long`, `string @s`
    Type {
        ty: TypeName,
        capture: Option<Binder>,
    },
    /// `[a, @b, long]`, matches lists of exactly this length.
    List(Vec<Pattern>),
    /// Any expression, compared with `==`.
    Value(ExprId),
}

impl Pattern {
    /// Names bound by this pattern, in source order.
    pub fn binders(&self, out: &mut Vec<Binder>) {
        match &self.kind {
            PatternKind::Default | PatternKind::Value(_) => {}
            PatternKind::Capture(binder) => out.push(*binder),
            PatternKind::Type { capture, .. } => out.extend(capture.iter().copied()),
            PatternKind::List(items) => {
                for item in items {
                    item.binders(out);
                }
            }
        }
    }
}
