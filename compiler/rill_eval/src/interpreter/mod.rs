//! The interpreter and its op dispatch.
//!
//! Every op is evaluated by [`Interpreter::eval_op`] against an
//! [`Activation`] (the program the code belongs to, the running closure's
//! captures and the call depth) and an environment chain. Frames are pushed
//! exactly where the analysis placed frame scopes:
//!
//! | Op       | Frame                                                 |
//! |----------|-------------------------------------------------------|
//! | call     | parameters                                            |
//! | `let`    | group of lazily initialized slots                     |
//! | `for`    | one value per generator or local clause               |
//! | `match`  | pattern captures of the matching arm                  |
//! | `try`    | the caught value, or nothing when unbound             |

mod builder;

pub use builder::{InterpreterBuilder, DEFAULT_MAX_CALL_DEPTH};

use std::collections::BTreeMap;
use std::sync::Arc;

use rill_ir::ops::{DictElem, Dispatch, ListElem, LogicalOp, OpId, OpKind, Program};
use rill_ir::{BinaryOp, Name, SharedInterner, Span, TypeName, UnaryOp};
use rill_value::{
    cast, operators, Captured, Env, EvalErrorKind, EvalResult, FrameKind, SlotCell, Value,
};
use smallvec::SmallVec;
use tracing::instrument;

use crate::{NativeRegistry, SharedDebugHandler};

/// Executes the ops of one program.
pub struct Interpreter {
    pub(crate) program: Arc<Program>,
    pub(crate) interner: SharedInterner,
    /// One write-once cell per library variable, indexed like
    /// `program.libraries[library].vars[slot]`.
    pub(crate) libraries: Box<[Box<[SlotCell]>]>,
    pub(crate) natives: Arc<NativeRegistry>,
    pub(crate) handler: SharedDebugHandler,
    pub(crate) max_call_depth: usize,
    pub(crate) no_captures: Arc<[Captured]>,
}

/// Where the code being evaluated comes from.
#[derive(Copy, Clone)]
pub(crate) struct Activation<'a> {
    pub(crate) program: &'a Arc<Program>,
    pub(crate) captures: &'a Arc<[Captured]>,
    /// Number of calls on the evaluation stack.
    pub(crate) depth: usize,
}

impl Interpreter {
    pub fn program(&self) -> &Arc<Program> {
        &self.program
    }

    pub fn natives(&self) -> &Arc<NativeRegistry> {
        &self.natives
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    pub fn debug_handler(&self) -> &SharedDebugHandler {
        &self.handler
    }

    /// Evaluate the program's entry expression. A program without one
    /// evaluates to nil.
    #[instrument(level = "debug", skip(self))]
    pub fn eval_entry(&self) -> EvalResult {
        match self.program.entry {
            Some(entry) => self.eval(entry, &Env::empty()),
            None => Ok(Value::Nil),
        }
    }

    /// Evaluate `op` of this interpreter's program in `env`, outside of any
    /// closure.
    pub fn eval(&self, op: OpId, env: &Env) -> EvalResult {
        let result = self.eval_op(self.top_level(0), op, env);
        self.report(result)
    }

    /// Value of a library variable, evaluating it on first access.
    #[instrument(level = "debug", skip(self))]
    pub fn library_var(&self, library: usize, slot: usize) -> EvalResult {
        let span = self.program.libraries[library].vars[slot].span;
        let result = self.read_library_var(0, library, slot, span);
        self.report(result)
    }

    /// Call a function value with `args`.
    #[instrument(level = "debug", skip_all, fields(args = args.len()))]
    pub fn call(&self, function: &Value, args: &[Value]) -> EvalResult {
        let args: SmallVec<[Value; 4]> = args.iter().cloned().collect();
        let span = function
            .as_function()
            .map_or(Span::DUMMY, |f| f.def().span);
        let result = self.call_value(0, function, args, span);
        self.report(result)
    }

    pub(crate) fn top_level(&self, depth: usize) -> Activation<'_> {
        Activation {
            program: &self.program,
            captures: &self.no_captures,
            depth,
        }
    }

    fn report(&self, result: EvalResult) -> EvalResult {
        if let Err(error) = &result {
            self.handler.on_failure(error);
        }
        result
    }

    /// Text of `name` when `program` was compiled with this interpreter's
    /// interner.
    pub(crate) fn name_of(&self, program: &Arc<Program>, name: Name) -> Option<Arc<str>> {
        Arc::ptr_eq(program, &self.program).then(|| self.interner.lookup(name))
    }

    pub(crate) fn eval_op(&self, act: Activation<'_>, id: OpId, env: &Env) -> EvalResult {
        rill_stack::with_stack(|| self.eval_inner(act, id, env))
    }

    fn eval_inner(&self, act: Activation<'_>, id: OpId, env: &Env) -> EvalResult {
        let node = act.program.op(id);
        let span = node.span;
        if self.handler.before_op(node).is_err() {
            return Err(EvalErrorKind::Interrupted.at(span));
        }
        let at = |kind: EvalErrorKind| kind.at(span);

        match &node.kind {
            OpKind::Constant(c) => Ok(Value::from_const(act.program.constants.get(*c))),
            OpKind::Local { depth, slot } => self.read_local(act, env, *depth, *slot, span),
            OpKind::Capture(index) => match act.captures.get(*index as usize) {
                Some(Captured::Value(value)) => Ok(value.clone()),
                _ => panic!("capture {index} of {id:?} is not a value"),
            },
            OpKind::CapturedSlot { capture, slot } => match act.captures.get(*capture as usize) {
                Some(Captured::Group(frame)) => self.read_group_slot(act, frame, *slot, span),
                _ => panic!("capture {capture} of {id:?} is not a let group"),
            },
            OpKind::LibraryVar { library, slot } => {
                self.read_library_var(act.depth, *library as usize, *slot as usize, span)
            }

            OpKind::MakeList(elems) => {
                let mut items = Vec::with_capacity(elems.len());
                for elem in elems {
                    match elem {
                        ListElem::Item(op) => items.push(self.eval_op(act, *op, env)?),
                        ListElem::Spread(op) => {
                            let spread = self.eval_op(act, *op, env)?;
                            operators::spread_list(&mut items, &spread).map_err(at)?;
                        }
                    }
                }
                Ok(Value::list(items))
            }
            OpKind::MakeDict(elems) => {
                let mut entries = BTreeMap::new();
                for elem in elems {
                    match elem {
                        DictElem::Entry { key, value } => {
                            let key = self.eval_op(act, *key, env)?;
                            let key = operators::dict_key(&key).map_err(at)?;
                            entries.insert(key, self.eval_op(act, *value, env)?);
                        }
                        DictElem::Spread(op) => {
                            let spread = self.eval_op(act, *op, env)?;
                            operators::spread_dict(&mut entries, &spread).map_err(at)?;
                        }
                    }
                }
                Ok(Value::dict(entries))
            }
            OpKind::Call { callee, args } => {
                let callee = self.eval_op(act, *callee, env)?;
                let args = args
                    .iter()
                    .map(|arg| self.eval_op(act, *arg, env))
                    .collect::<EvalResult<SmallVec<[Value; 4]>>>()?;
                self.call_value(act.depth, &callee, args, span)
            }
            OpKind::Index { target, key } => {
                let target = self.eval_op(act, *target, env)?;
                let key = self.eval_op(act, *key, env)?;
                operators::index(&target, &key).map_err(at)
            }
            OpKind::Unary {
                op,
                operand,
                dispatch,
            } => {
                let operand = self.eval_op(act, *operand, env)?;
                unary(*op, *dispatch, &operand).map_err(at)
            }
            OpKind::Binary {
                op,
                left,
                right,
                dispatch,
            } => {
                let left = self.eval_op(act, *left, env)?;
                let right = self.eval_op(act, *right, env)?;
                binary(*op, *dispatch, &left, &right).map_err(at)
            }
            OpKind::Logical { op, left, right } => {
                let left = self.eval_op(act, *left, env)?.truthy();
                let value = match (op, left) {
                    (LogicalOp::And, false) => false,
                    (LogicalOp::Or, true) => true,
                    _ => self.eval_op(act, *right, env)?.truthy(),
                };
                Ok(Value::Boolean(value))
            }
            OpKind::Cast { operand, ty } => {
                let operand = self.eval_op(act, *operand, env)?;
                cast::cast(&operand, *ty).map_err(at)
            }
            OpKind::Is { operand, ty } => {
                let operand = self.eval_op(act, *operand, env)?;
                Ok(Value::Boolean(cast::is_type(&operand, *ty)))
            }

            OpKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let branch = if self.eval_op(act, *cond, env)?.truthy() {
                    then_branch
                } else {
                    else_branch
                };
                self.eval_op(act, *branch, env)
            }
            OpKind::Let { slots, body } => {
                let env = env.push_group(id, slots.len(), Arc::clone(act.captures));
                self.eval_op(act, *body, &env)
            }
            OpKind::MakeClosure {
                function,
                captures,
                defaults,
            } => self.make_closure(act, env, *function, captures, defaults, span),
            OpKind::For { steps, body } => {
                let mut out = Vec::new();
                self.eval_for(act, env, steps, *body, &mut out)?;
                Ok(Value::list(out))
            }
            OpKind::Match { subject, arms } => self.eval_match(act, env, *subject, arms),
            OpKind::Try {
                body,
                handler,
                binds,
            } => self.eval_try(act, env, *body, *handler, *binds),
            OpKind::Throw(value) => {
                let value = self.eval_op(act, *value, env)?;
                Err(at(EvalErrorKind::Thrown { value }))
            }
            OpKind::Debug(value) => {
                let value = self.eval_op(act, *value, env)?;
                self.handler.on_debug(&value, span);
                Ok(value)
            }
        }
    }

    pub(crate) fn read_local(
        &self,
        act: Activation<'_>,
        env: &Env,
        depth: u32,
        slot: u32,
        span: Span,
    ) -> EvalResult {
        let frame = env
            .frame(depth)
            .unwrap_or_else(|| panic!("no frame at depth {depth}"));
        match &frame.kind {
            FrameKind::Values(values) => Ok(values
                .get(slot as usize)
                .unwrap_or_else(|| panic!("no slot {slot} at depth {depth}"))
                .clone()),
            FrameKind::Group(_) => self.read_group_slot(act, frame, slot, span),
        }
    }
}

/// Cast `value` to a declared type, if there is one.
pub(crate) fn declared(value: Value, ty: Option<TypeName>, span: Span) -> EvalResult {
    match ty {
        Some(ty) => cast::cast(&value, ty).map_err(|kind| kind.at(span)),
        None => Ok(value),
    }
}

/// Apply a binary operator, taking the specialized path when the operands
/// have the kinds it was specialized for.
fn binary(
    op: BinaryOp,
    dispatch: Dispatch,
    left: &Value,
    right: &Value,
) -> Result<Value, EvalErrorKind> {
    match (dispatch, left, right) {
        (Dispatch::Long, Value::Long(a), Value::Long(b)) => operators::long_binary(op, *a, *b),
        (Dispatch::Double, Value::Double(a), Value::Double(b)) => {
            operators::double_binary(op, *a, *b)
        }
        (Dispatch::String, Value::String(a), Value::String(b)) => {
            operators::string_binary(op, a, b)
        }
        _ => operators::binary(op, left, right),
    }
}

fn unary(op: UnaryOp, dispatch: Dispatch, operand: &Value) -> Result<Value, EvalErrorKind> {
    match (op, dispatch, operand) {
        (UnaryOp::Neg, Dispatch::Long, Value::Long(n)) => Ok(Value::Long(n.wrapping_neg())),
        (UnaryOp::Neg, Dispatch::Double, Value::Double(d)) => Ok(Value::Double(-d)),
        (UnaryOp::Not, Dispatch::Boolean, Value::Boolean(b)) => Ok(Value::Boolean(!b)),
        _ => operators::unary(op, operand),
    }
}

#[cfg(test)]
mod tests;
