//! Child enumeration.

use super::{
    DictItem, ExprArena, ExprId, ExprKind, ForClause, FunctionBody, ListItem, Pattern, PatternKind,
};

impl ExprArena {
    /// Call `f` for every direct child expression of `id`, in evaluation
    /// order. Documentation and metadata expressions are not children.
    pub fn for_each_child(&self, id: ExprId, mut f: impl FnMut(ExprId)) {
        match &self.get(id).kind {
            ExprKind::Nil
            | ExprKind::Bool(_)
            | ExprKind::Long(_)
            | ExprKind::Double(_)
            | ExprKind::Decimal(_)
            | ExprKind::String(_)
            | ExprKind::DateTime(_)
            | ExprKind::Ident(_) => {}
            ExprKind::List(items) => {
                for item in items {
                    match item {
                        ListItem::Expr(e) | ListItem::Spread(e) => f(*e),
                    }
                }
            }
            ExprKind::Dict(items) => {
                for item in items {
                    match item {
                        DictItem::Entry { key, value } => {
                            f(*key);
                            f(*value);
                        }
                        DictItem::Spread(e) => f(*e),
                    }
                }
            }
            ExprKind::Call { callee, args } => {
                f(*callee);
                for arg in args {
                    f(*arg);
                }
            }
            ExprKind::Index { target, key } => {
                f(*target);
                f(*key);
            }
            ExprKind::Unary { operand, .. }
            | ExprKind::Cast { operand, .. }
            | ExprKind::Is { operand, .. } => f(*operand),
            ExprKind::Binary { left, right, .. } => {
                f(*left);
                f(*right);
            }
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                f(*cond);
                f(*then_branch);
                if let Some(e) = else_branch {
                    f(*e);
                }
            }
            ExprKind::Let { bindings, body } => {
                for binding in bindings {
                    f(binding.init);
                }
                f(*body);
            }
            ExprKind::Function(func) => {
                for param in &func.params {
                    if let Some(default) = param.default {
                        f(default);
                    }
                }
                if let FunctionBody::Expr(body) = &func.body {
                    f(*body);
                }
            }
            ExprKind::For { clauses, body } => {
                for clause in clauses {
                    match clause {
                        ForClause::Generator { source: e, .. }
                        | ForClause::Local { init: e, .. }
                        | ForClause::Filter(e) => f(*e),
                    }
                }
                f(*body);
            }
            ExprKind::Match { subject, arms } => {
                f(*subject);
                for arm in arms {
                    pattern_children(&arm.pattern, &mut f);
                    if let Some(guard) = arm.guard {
                        f(guard);
                    }
                    f(arm.body);
                }
            }
            ExprKind::Try { body, handler, .. } => {
                f(*body);
                f(*handler);
            }
            ExprKind::Throw(e) | ExprKind::Debug(e) => f(*e),
        }
    }

    /// Children of `id` collected into a vector.
    pub fn children(&self, id: ExprId) -> Vec<ExprId> {
        let mut out = Vec::new();
        self.for_each_child(id, |c| out.push(c));
        out
    }
}

fn pattern_children(pattern: &Pattern, f: &mut impl FnMut(ExprId)) {
    match &pattern.kind {
        PatternKind::Value(e) => f(*e),
        PatternKind::List(items) => {
            for item in items {
                pattern_children(item, f);
            }
        }
        PatternKind::Default | PatternKind::Capture(_) | PatternKind::Type { .. } => {}
    }
}
