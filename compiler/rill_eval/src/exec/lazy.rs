//! Lazily initialized slots.
//!
//! Library variables and `let` bindings are evaluated on first read and
//! cached in a [`SlotCell`]. Re-entering a slot on the same thread while it
//! is being evaluated is a `CyclicEvaluation`; a slot in progress on another
//! thread is evaluated independently and the first stored value wins.

use std::sync::Arc;

use rill_ir::ops::OpKind;
use rill_ir::Span;
use rill_value::{Claim, Env, EvalErrorKind, EvalResult, Frame, SlotCell};
use tracing::trace;

use crate::interpreter::{declared, Activation, Interpreter};

impl Interpreter {
    pub(crate) fn read_library_var(
        &self,
        depth: usize,
        library: usize,
        slot: usize,
        span: Span,
    ) -> EvalResult {
        let cell = self
            .libraries
            .get(library)
            .and_then(|cells| cells.get(slot))
            .unwrap_or_else(|| panic!("no library var {library}:{slot}"));
        let var = &self.program.libraries[library].vars[slot];

        let evaluate = || {
            trace!(library, slot, "evaluating library var");
            let value = self.eval_op(self.top_level(depth), var.init, &Env::empty())?;
            declared(value, var.ty, var.span)
        };
        let name = || self.interner.lookup(var.name);
        settle(cell, span, name, evaluate)
    }

    pub(crate) fn read_group_slot(
        &self,
        act: Activation<'_>,
        frame: &Arc<Frame>,
        slot: u32,
        span: Span,
    ) -> EvalResult {
        let group = frame
            .group()
            .unwrap_or_else(|| panic!("frame read as a let group is a value frame"));
        let cell = group
            .slot(slot)
            .unwrap_or_else(|| panic!("let group has no slot {slot}"));
        let OpKind::Let { slots, .. } = &act.program.op(group.op()).kind else {
            panic!("group frame of {:?} does not belong to a let", group.op());
        };
        let def = &slots[slot as usize];

        let evaluate = || {
            let inner = Activation {
                program: act.program,
                captures: group.captures(),
                depth: act.depth,
            };
            let value = self.eval_op(inner, def.init, &Env::from_frame(Arc::clone(frame)))?;
            declared(value, def.ty, span)
        };
        let name = || {
            self.name_of(act.program, def.name)
                .unwrap_or_else(|| Arc::from("<let>"))
        };
        settle(cell, span, name, evaluate)
    }
}

fn settle(
    cell: &SlotCell,
    span: Span,
    name: impl FnOnce() -> Arc<str>,
    evaluate: impl FnOnce() -> EvalResult,
) -> EvalResult {
    match cell.claim() {
        Claim::Ready(value) => Ok(value),
        Claim::Cycle => Err(EvalErrorKind::CyclicEvaluation {
            name: name().to_string(),
        }
        .at(span)),
        Claim::Evaluate { .. } => match evaluate() {
            Ok(value) => Ok(cell.fill(value)),
            Err(error) => {
                cell.release();
                Err(error)
            }
        },
    }
}
