//! Dispatch specialization.
//!
//! Operators whose operands are statically known to be `long`, `double` or
//! `string` (for `..` and comparisons), and `!` over a `boolean`, are
//! marked with a specialized [`Dispatch`]. The evaluator takes the fast
//! path only when the runtime kinds match and otherwise uses the generic
//! operator, so a program computes the same results either way.

use rill_ir::ops::{Dispatch, OpKind, Program};
use rill_ir::{BinaryOp, TypeName, UnaryOp};
use tracing::{debug, instrument};

/// Specialize `program`, returning the rewritten copy.
#[instrument(level = "debug", skip_all)]
pub fn specialize(program: &Program) -> Program {
    let mut out = program.clone();
    let mut specialized = 0usize;

    for id in program.op_ids() {
        let ty = |op| program.op(op).ty;
        let chosen = match &program.op(id).kind {
            OpKind::Binary {
                op, left, right, ..
            } => binary_dispatch(*op, ty(*left), ty(*right)),
            OpKind::Unary { op, operand, .. } => unary_dispatch(*op, ty(*operand)),
            _ => continue,
        };
        if chosen == Dispatch::Generic {
            continue;
        }
        if let OpKind::Binary { dispatch, .. } | OpKind::Unary { dispatch, .. } =
            &mut out.ops[id.index()].kind
        {
            *dispatch = chosen;
            specialized += 1;
        }
    }

    debug!(specialized, "specialization");
    out
}

fn binary_dispatch(op: BinaryOp, left: TypeName, right: TypeName) -> Dispatch {
    match (left, right) {
        (TypeName::Long, TypeName::Long) => Dispatch::Long,
        (TypeName::Double, TypeName::Double) => Dispatch::Double,
        (TypeName::String, TypeName::String)
            if op == BinaryOp::Concat || op.is_comparison() =>
        {
            Dispatch::String
        }
        _ => Dispatch::Generic,
    }
}

fn unary_dispatch(op: UnaryOp, operand: TypeName) -> Dispatch {
    match (op, operand) {
        (UnaryOp::Neg, TypeName::Long) => Dispatch::Long,
        (UnaryOp::Neg, TypeName::Double) => Dispatch::Double,
        (UnaryOp::Not, TypeName::Boolean) => Dispatch::Boolean,
        _ => Dispatch::Generic,
    }
}

#[cfg(test)]
mod tests;
