//! Syntax tree produced by `rill_parse` and consumed by analysis.
//!
//! Expressions of every unit in a compilation share one [`ExprArena`] and
//! are addressed by [`ExprId`]. Analysis tables that annotate expressions
//! are plain vectors indexed by `ExprId::index`.
//!
//! - `expr`: expression nodes, patterns and function literals
//! - `items`: module-level items (imports, libraries, vars)
//! - `visit`: child enumeration shared by the analysis passes

mod expr;
mod items;
mod visit;

pub use expr::{
    Binder, DictItem, Expr, ExprKind, ForClause, FunctionBody, FunctionExpr, ListItem, MatchArm,
    Param, Path, Pattern, PatternKind,
};
pub use items::{Import, ImportMember, Library, Module, VarDef};

use std::fmt;
use std::ops;

use crate::to_u32;

/// Index into an [`ExprArena`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct ExprId(u32);

impl ExprId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        ExprId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Flat storage for expressions.
#[derive(Clone, Debug, Default)]
pub struct ExprArena {
    exprs: Vec<Expr>,
}

impl ExprArena {
    pub fn new() -> Self {
        ExprArena::default()
    }

    pub fn alloc(&mut self, expr: Expr) -> ExprId {
        let id = ExprId::new(to_u32(self.exprs.len(), "expressions"));
        self.exprs.push(expr);
        id
    }

    #[inline]
    pub fn get(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    /// All expressions with their ids, in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (ExprId, &Expr)> {
        self.exprs
            .iter()
            .enumerate()
            .map(|(i, e)| (ExprId::new(to_u32(i, "expressions")), e))
    }
}

impl ops::Index<ExprId> for ExprArena {
    type Output = Expr;

    fn index(&self, id: ExprId) -> &Expr {
        self.get(id)
    }
}
