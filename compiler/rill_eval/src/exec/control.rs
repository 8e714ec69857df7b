//! Comprehensions, pattern matching and error handling.

use rill_ir::ops::{ForStep, MatchArmOp, OpId, PatternOp};
use rill_value::{cast, operators, Env, EvalErrorKind, EvalResult, Value};
use smallvec::{smallvec, SmallVec};

use crate::interpreter::{declared, Activation, Interpreter};

impl Interpreter {
    /// Run the clauses of a `for` left to right, pushing one body result
    /// per surviving combination. Generators and locals each push a
    /// one-value frame; filters push nothing.
    pub(crate) fn eval_for(
        &self,
        act: Activation<'_>,
        env: &Env,
        steps: &[ForStep],
        body: OpId,
        out: &mut Vec<Value>,
    ) -> EvalResult<()> {
        let Some((step, rest)) = steps.split_first() else {
            out.push(self.eval_op(act, body, env)?);
            return Ok(());
        };

        match step {
            ForStep::Generator { source, ty } => {
                let span = act.program.op(*source).span;
                let items: Vec<Value> = match self.eval_op(act, *source, env)? {
                    Value::Nil => Vec::new(),
                    Value::List(items) => items.to_vec(),
                    Value::Dict(entries) => entries.values().cloned().collect(),
                    other => {
                        return Err(EvalErrorKind::type_mismatch(
                            "a list or dict to iterate",
                            other.type_name(),
                        )
                        .at(span))
                    }
                };
                for item in items {
                    let item = declared(item, *ty, span)?;
                    self.eval_for(act, &env.push_values(smallvec![item]), rest, body, out)?;
                }
                Ok(())
            }
            ForStep::Local { init, ty } => {
                let span = act.program.op(*init).span;
                let value = declared(self.eval_op(act, *init, env)?, *ty, span)?;
                self.eval_for(act, &env.push_values(smallvec![value]), rest, body, out)
            }
            ForStep::Filter(cond) => {
                if self.eval_op(act, *cond, env)?.truthy() {
                    self.eval_for(act, env, rest, body, out)
                } else {
                    Ok(())
                }
            }
        }
    }

    /// The body of the first arm whose pattern matches and whose guard
    /// holds, or nil.
    pub(crate) fn eval_match(
        &self,
        act: Activation<'_>,
        env: &Env,
        subject: OpId,
        arms: &[MatchArmOp],
    ) -> EvalResult {
        let subject = self.eval_op(act, subject, env)?;
        for arm in arms {
            let mut captures: SmallVec<[Value; 4]> = smallvec![Value::Nil; arm.slots as usize];
            if !self.pattern_matches(act, env, &arm.pattern, &subject, &mut captures)? {
                continue;
            }
            let env = env.push_values(captures);
            if let Some(guard) = arm.guard {
                if !self.eval_op(act, guard, &env)?.truthy() {
                    continue;
                }
            }
            return self.eval_op(act, arm.body, &env);
        }
        Ok(Value::Nil)
    }

    /// Match `value` against `pattern`, storing captures. Value patterns
    /// are evaluated in the environment of the `match` itself.
    fn pattern_matches(
        &self,
        act: Activation<'_>,
        env: &Env,
        pattern: &PatternOp,
        value: &Value,
        captures: &mut SmallVec<[Value; 4]>,
    ) -> EvalResult<bool> {
        let matched = match pattern {
            PatternOp::Default => true,
            PatternOp::Capture(slot) => {
                captures[*slot as usize] = value.clone();
                true
            }
            PatternOp::Type { ty, capture } => {
                let matched = cast::is_type(value, *ty);
                if let (true, Some(slot)) = (matched, capture) {
                    captures[*slot as usize] = value.clone();
                }
                matched
            }
            PatternOp::List(items) => match value.as_list() {
                Some(values) if values.len() == items.len() => {
                    for (item, value) in items.iter().zip(values) {
                        if !self.pattern_matches(act, env, item, value, captures)? {
                            return Ok(false);
                        }
                    }
                    true
                }
                _ => false,
            },
            PatternOp::Value(op) => {
                let expected = self.eval_op(act, *op, env)?;
                operators::equals(&expected, value)
            }
        };
        Ok(matched)
    }

    /// Evaluate `body`; a catchable failure runs `handler` in a frame that
    /// holds the caught value when the `catch` binds one.
    pub(crate) fn eval_try(
        &self,
        act: Activation<'_>,
        env: &Env,
        body: OpId,
        handler: OpId,
        binds: bool,
    ) -> EvalResult {
        match self.eval_op(act, body, env) {
            Err(error) if error.is_catchable() => {
                tracing::debug!(code = error.code(), "caught");
                let frame = if binds {
                    smallvec![error.into_value()]
                } else {
                    SmallVec::new()
                };
                self.eval_op(act, handler, &env.push_values(frame))
            }
            result => result,
        }
    }
}
