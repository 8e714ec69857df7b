//! Constant folding.
//!
//! A forward pass over the op arena: operands are allocated before their
//! users, so by the time an op is visited its operands are already folded.
//! A foldable op whose operands are all constants is evaluated with the
//! same `rill_value` functions the evaluator calls and replaced in place by
//! a constant load, keeping every `OpId` valid.
//!
//! Folded: unary and binary operators, casts, type tests, list and dict
//! literals, `if` with a constant condition, and `&&`/`||` when the left
//! operand decides. Calls, references, closures, `try`, `throw` and
//! `debug` are never folded. An evaluation that fails leaves the op alone
//! so the same failure is raised at run time.

use std::collections::BTreeMap;

use rill_ir::ops::{DictElem, ListElem, LogicalOp, OpId, OpKind, Program};
use rill_value::{cast, operators, Value};
use tracing::{debug, instrument};

enum Folded {
    Constant(Value),
    /// The op behaves exactly like another op.
    Alias(OpId),
}

/// Fold `program`, returning the folded copy.
#[instrument(level = "debug", skip_all)]
pub fn fold(program: &Program) -> Program {
    let mut out = program.clone();
    let mut folded = 0usize;

    for id in program.op_ids() {
        match fold_op(&out, id) {
            Some(Folded::Constant(value)) => {
                // Function values have no constant form.
                let Some(constant) = value.to_const() else {
                    continue;
                };
                let ty = constant.type_name();
                let constant = out.constants.push(constant);
                let node = &mut out.ops[id.index()];
                node.kind = OpKind::Constant(constant);
                node.ty = ty;
                folded += 1;
            }
            Some(Folded::Alias(target)) => {
                out.ops[id.index()] = out.op(target).clone();
                folded += 1;
            }
            None => {}
        }
    }

    debug!(folded, "constant folding");
    out
}

fn fold_op(program: &Program, id: OpId) -> Option<Folded> {
    let constant = |op: OpId| program.as_constant(op).map(Value::from_const);

    let value = match &program.op(id).kind {
        OpKind::Unary { op, operand, .. } => operators::unary(*op, &constant(*operand)?).ok()?,
        OpKind::Binary {
            op, left, right, ..
        } => operators::binary(*op, &constant(*left)?, &constant(*right)?).ok()?,
        OpKind::Logical { op, left, right } => {
            let left = constant(*left)?.truthy();
            match (op, left) {
                (LogicalOp::And, false) => Value::Boolean(false),
                (LogicalOp::Or, true) => Value::Boolean(true),
                _ => Value::Boolean(constant(*right)?.truthy()),
            }
        }
        OpKind::Cast { operand, ty } => cast::cast(&constant(*operand)?, *ty).ok()?,
        OpKind::Is { operand, ty } => Value::Boolean(cast::is_type(&constant(*operand)?, *ty)),
        OpKind::MakeList(elems) => {
            let mut items = Vec::with_capacity(elems.len());
            for elem in elems {
                match elem {
                    ListElem::Item(op) => items.push(constant(*op)?),
                    ListElem::Spread(op) => operators::spread_list(&mut items, &constant(*op)?).ok()?,
                }
            }
            Value::list(items)
        }
        OpKind::MakeDict(elems) => {
            let mut entries = BTreeMap::new();
            for elem in elems {
                match elem {
                    DictElem::Entry { key, value } => {
                        let key = operators::dict_key(&constant(*key)?).ok()?;
                        entries.insert(key, constant(*value)?);
                    }
                    DictElem::Spread(op) => {
                        operators::spread_dict(&mut entries, &constant(*op)?).ok()?;
                    }
                }
            }
            Value::dict(entries)
        }
        OpKind::If {
            cond,
            then_branch,
            else_branch,
        } => {
            let branch = if constant(*cond)?.truthy() {
                then_branch
            } else {
                else_branch
            };
            return Some(Folded::Alias(*branch));
        }
        _ => return None,
    };
    Some(Folded::Constant(value))
}

#[cfg(test)]
mod tests;
