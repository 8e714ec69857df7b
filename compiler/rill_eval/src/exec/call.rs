//! Closures and calls.

use std::sync::Arc;

use rill_ir::ops::{CaptureLoad, FunctionCode, FunctionFlags, FunctionId, OpId};
use rill_ir::Span;
use rill_value::{Captured, Env, EvalErrorKind, EvalResult, FunctionValue, NativeError, Value};
use smallvec::SmallVec;
use tracing::trace;

use crate::interpreter::{declared, Activation, Interpreter};

impl Interpreter {
    /// Create a closure: evaluate parameter defaults in the creating
    /// environment, then snapshot the captured values and groups.
    pub(crate) fn make_closure(
        &self,
        act: Activation<'_>,
        env: &Env,
        function: FunctionId,
        loads: &[CaptureLoad],
        defaults: &[Option<OpId>],
        span: Span,
    ) -> EvalResult {
        let defaults = defaults
            .iter()
            .map(|default| default.map(|op| self.eval_op(act, op, env)).transpose())
            .collect::<EvalResult<Box<[Option<Value>]>>>()?;

        let mut captures = Vec::with_capacity(loads.len());
        for load in loads {
            let captured = match *load {
                CaptureLoad::LocalValue { depth, slot } => {
                    Captured::Value(self.read_local(act, env, depth, slot, span)?)
                }
                CaptureLoad::LocalGroup { depth } => Captured::Group(Arc::clone(
                    env.frame(depth)
                        .unwrap_or_else(|| panic!("no let group at depth {depth}")),
                )),
                CaptureLoad::Capture(index) => act
                    .captures
                    .get(index as usize)
                    .unwrap_or_else(|| panic!("no capture {index} to pass through"))
                    .clone(),
            };
            captures.push(captured);
        }

        let name = act
            .program
            .function(function)
            .name
            .and_then(|name| self.name_of(act.program, name));
        Ok(Value::Function(Arc::new(FunctionValue {
            program: Arc::clone(act.program),
            function,
            captures: captures.into(),
            defaults,
            name,
        })))
    }

    pub(crate) fn call_value(
        &self,
        depth: usize,
        callee: &Value,
        args: SmallVec<[Value; 4]>,
        span: Span,
    ) -> EvalResult {
        let Value::Function(function) = callee else {
            return Err(EvalErrorKind::NotCallable {
                found: callee.type_name(),
            }
            .at(span));
        };
        self.call_function(depth, function, args, span)
    }

    fn call_function(
        &self,
        depth: usize,
        function: &FunctionValue,
        args: SmallVec<[Value; 4]>,
        span: Span,
    ) -> EvalResult {
        let def = function.def();
        if def.flags.contains(FunctionFlags::USES_LIBRARIES) && !function.same_program(&self.program)
        {
            return Err(EvalErrorKind::ForeignFunction.at(span));
        }
        if args.len() > def.params.len() {
            return Err(EvalErrorKind::ArityMismatch {
                expected: def.params.len(),
                found: args.len(),
            }
            .at(span));
        }
        if depth >= self.max_call_depth {
            return Err(EvalErrorKind::StackOverflow {
                depth: self.max_call_depth,
            }
            .at(span));
        }

        // Missing arguments take their default, or nil.
        let mut values: SmallVec<[Value; 4]> = SmallVec::with_capacity(def.params.len());
        let mut args = args.into_iter();
        for (i, param) in def.params.iter().enumerate() {
            let value = match args.next() {
                Some(value) => value,
                None => function.defaults.get(i).cloned().flatten().unwrap_or(Value::Nil),
            };
            values.push(declared(value, param.ty, span)?);
        }

        trace!(function = ?function, depth, "call");
        let result = match &def.body {
            FunctionCode::Op(body) => {
                let act = Activation {
                    program: &function.program,
                    captures: &function.captures,
                    depth: depth + 1,
                };
                self.eval_op(act, *body, &Env::empty().push_values(values))?
            }
            FunctionCode::Native(name) => self.call_native(name, &values, span)?,
        };
        declared(result, def.return_type, span)
    }

    fn call_native(&self, name: &Arc<str>, args: &[Value], span: Span) -> EvalResult {
        let failure = |source: NativeError| EvalErrorKind::NativeFailure {
            name: name.to_string(),
            source,
        };
        let Some(native) = self.natives.get(name) else {
            return Err(failure("no native function is registered under this name".into()).at(span));
        };
        native.call(args).map_err(|source| failure(source).at(span))
    }
}
