//! Expression lowering.

use rill_analysis::ScopeId;
use rill_ir::ast::{DictItem, ExprId, ExprKind, ForClause, ListItem, MatchArm, Pattern, PatternKind};
use rill_ir::ops::{
    DictElem, Dispatch, ForStep, GroupSlot, ListElem, LogicalOp, MatchArmOp, OpId, OpKind,
    PatternOp,
};
use rill_ir::{to_u32, BinaryOp, ConstValue, Name, TypeName};
use smallvec::SmallVec;

use super::types::{binary_type, unary_type};
use super::Lowerer;

impl Lowerer<'_, '_> {
    pub(super) fn lower_expr_inner(&mut self, id: ExprId) -> OpId {
        let arena = self.input.arena;
        let expr = arena.get(id);
        let span = expr.span;

        let (kind, ty) = match &expr.kind {
            ExprKind::Nil => return self.program.push_constant(ConstValue::Nil, span),
            ExprKind::Bool(b) => return self.program.push_constant(ConstValue::Boolean(*b), span),
            ExprKind::Long(n) => return self.program.push_constant(ConstValue::Long(*n), span),
            ExprKind::Double(d) => return self.program.push_constant(ConstValue::Double(*d), span),
            ExprKind::Decimal(d) => {
                return self.program.push_constant(ConstValue::Decimal(*d), span)
            }
            ExprKind::String(s) => {
                return self.program.push_constant(ConstValue::String(s.clone()), span)
            }
            ExprKind::DateTime(dt) => {
                return self.program.push_constant(ConstValue::DateTime(*dt), span)
            }

            ExprKind::List(items) => {
                let elems = items
                    .iter()
                    .map(|item| match item {
                        ListItem::Expr(e) => ListElem::Item(self.lower_expr(*e)),
                        ListItem::Spread(e) => ListElem::Spread(self.lower_expr(*e)),
                    })
                    .collect();
                (OpKind::MakeList(elems), TypeName::List)
            }
            ExprKind::Dict(items) => {
                let elems = items
                    .iter()
                    .map(|item| match item {
                        DictItem::Entry { key, value } => DictElem::Entry {
                            key: self.lower_expr(*key),
                            value: self.lower_expr(*value),
                        },
                        DictItem::Spread(e) => DictElem::Spread(self.lower_expr(*e)),
                    })
                    .collect();
                (OpKind::MakeDict(elems), TypeName::Dict)
            }

            ExprKind::Ident(_) => self.reference(id),
            ExprKind::Call { callee, args } => {
                let callee = self.lower_expr(*callee);
                let args: SmallVec<[OpId; 4]> = args.iter().map(|a| self.lower_expr(*a)).collect();
                (OpKind::Call { callee, args }, TypeName::Any)
            }
            ExprKind::Index { target, key } => {
                let target = self.lower_expr(*target);
                let key = self.lower_expr(*key);
                (OpKind::Index { target, key }, TypeName::Any)
            }
            ExprKind::Unary { op, operand } => {
                let operand = self.lower_expr(*operand);
                let ty = unary_type(*op, self.ty(operand));
                (
                    OpKind::Unary {
                        op: *op,
                        operand,
                        dispatch: Dispatch::Generic,
                    },
                    ty,
                )
            }
            ExprKind::Binary { op, left, right } => {
                let left = self.lower_expr(*left);
                let right = self.lower_expr(*right);
                match op {
                    BinaryOp::And | BinaryOp::Or => {
                        let op = if *op == BinaryOp::And {
                            LogicalOp::And
                        } else {
                            LogicalOp::Or
                        };
                        (OpKind::Logical { op, left, right }, TypeName::Boolean)
                    }
                    _ => (
                        OpKind::Binary {
                            op: *op,
                            left,
                            right,
                            dispatch: Dispatch::Generic,
                        },
                        binary_type(*op, self.ty(left), self.ty(right)),
                    ),
                }
            }
            ExprKind::Cast { operand, ty } => {
                let operand = self.lower_expr(*operand);
                let result = if *ty == TypeName::Any {
                    self.ty(operand)
                } else {
                    *ty
                };
                (OpKind::Cast { operand, ty: *ty }, result)
            }
            ExprKind::Is { operand, ty } => {
                let operand = self.lower_expr(*operand);
                (OpKind::Is { operand, ty: *ty }, TypeName::Boolean)
            }

            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let cond = self.lower_expr(*cond);
                let then_branch = self.lower_expr(*then_branch);
                let else_branch = match else_branch {
                    Some(e) => self.lower_expr(*e),
                    None => self.program.push_constant(ConstValue::Nil, span),
                };
                let ty = self.ty(then_branch).join(self.ty(else_branch));
                (
                    OpKind::If {
                        cond,
                        then_branch,
                        else_branch,
                    },
                    ty,
                )
            }
            ExprKind::Let { bindings, body } => {
                let slots = bindings
                    .iter()
                    .map(|var| GroupSlot {
                        name: var.name,
                        init: self.lower_named(var.init, var.name),
                        ty: var.ty,
                    })
                    .collect();
                let body = self.lower_expr(*body);
                (OpKind::Let { slots, body }, self.ty(body))
            }
            ExprKind::Function(func) => return self.lower_function(id, func, None),
            ExprKind::For { clauses, body } => {
                let steps = clauses
                    .iter()
                    .map(|clause| match clause {
                        ForClause::Generator { ty, source, .. } => ForStep::Generator {
                            source: self.lower_expr(*source),
                            ty: *ty,
                        },
                        ForClause::Local { ty, init, .. } => ForStep::Local {
                            init: self.lower_expr(*init),
                            ty: *ty,
                        },
                        ForClause::Filter(cond) => ForStep::Filter(self.lower_expr(*cond)),
                    })
                    .collect();
                let body = self.lower_expr(*body);
                (OpKind::For { steps, body }, TypeName::List)
            }
            ExprKind::Match { subject, arms } => {
                let subject = self.lower_expr(*subject);
                let scopes = self.scopes;
                let arm_scopes = scopes.arm_scopes(id);
                let arms = arms
                    .iter()
                    .zip(arm_scopes)
                    .map(|(arm, scope)| self.lower_arm(arm, *scope))
                    .collect();
                (OpKind::Match { subject, arms }, TypeName::Any)
            }
            ExprKind::Try {
                body,
                catch,
                handler,
            } => {
                let body = self.lower_expr(*body);
                let handler = self.lower_expr(*handler);
                let ty = self.ty(body).join(self.ty(handler));
                (
                    OpKind::Try {
                        body,
                        handler,
                        binds: catch.is_some(),
                    },
                    ty,
                )
            }
            ExprKind::Throw(value) => (OpKind::Throw(self.lower_expr(*value)), TypeName::Any),
            ExprKind::Debug(value) => {
                let value = self.lower_expr(*value);
                (OpKind::Debug(value), self.ty(value))
            }
        };

        self.program.push_op(kind, span, ty)
    }

    fn ty(&self, op: OpId) -> TypeName {
        self.program.op(op).ty
    }

    fn lower_arm(&mut self, arm: &MatchArm, scope: ScopeId) -> MatchArmOp {
        let pattern = self.lower_pattern(&arm.pattern, scope);
        let guard = arm.guard.map(|g| self.lower_expr(g));
        let body = self.lower_expr(arm.body);
        MatchArmOp {
            pattern,
            guard,
            body,
            slots: to_u32(self.scopes.scope(scope).bindings.len(), "captures"),
        }
    }

    fn lower_pattern(&mut self, pattern: &Pattern, scope: ScopeId) -> PatternOp {
        let slot = |this: &Self, name: Name| {
            this.scopes
                .scope(scope)
                .get(name)
                .map(|b| this.scopes.binding(b).slot)
                .unwrap_or_else(|| panic!("pattern capture missing from {scope:?}"))
        };
        match &pattern.kind {
            PatternKind::Default => PatternOp::Default,
            PatternKind::Capture(binder) => PatternOp::Capture(slot(self, binder.name)),
            PatternKind::Type { ty, capture } => PatternOp::Type {
                ty: *ty,
                capture: capture.map(|binder| slot(self, binder.name)),
            },
            PatternKind::List(items) => PatternOp::List(
                items
                    .iter()
                    .map(|item| self.lower_pattern(item, scope))
                    .collect(),
            ),
            PatternKind::Value(value) => PatternOp::Value(self.lower_expr(*value)),
        }
    }
}
