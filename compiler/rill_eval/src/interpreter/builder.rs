//! Interpreter construction.

use std::sync::Arc;

use rill_ir::ops::Program;
use rill_ir::SharedInterner;
use rill_value::SlotCell;

use super::Interpreter;
use crate::{noop_handler, NativeRegistry, SharedDebugHandler};

/// Calls allowed on the evaluation stack before `StackOverflow`.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1000;

/// Builder for [`Interpreter`].
///
/// ```text
/// let interpreter = InterpreterBuilder::new(program, interner)
///     .natives(registry)
///     .debug_handler(handler)
///     .build();
/// ```
pub struct InterpreterBuilder {
    program: Arc<Program>,
    interner: SharedInterner,
    natives: Option<Arc<NativeRegistry>>,
    handler: Option<SharedDebugHandler>,
    max_call_depth: usize,
}

impl InterpreterBuilder {
    /// `interner` must be the one the program's names were interned with.
    pub fn new(program: Arc<Program>, interner: SharedInterner) -> Self {
        Self {
            program,
            interner,
            natives: None,
            handler: None,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    #[must_use]
    pub fn natives(mut self, natives: Arc<NativeRegistry>) -> Self {
        self.natives = Some(natives);
        self
    }

    #[must_use]
    pub fn debug_handler(mut self, handler: SharedDebugHandler) -> Self {
        self.handler = Some(handler);
        self
    }

    #[must_use]
    pub fn max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub fn build(self) -> Interpreter {
        let libraries = self
            .program
            .libraries
            .iter()
            .map(|library| library.vars.iter().map(|_| SlotCell::new()).collect())
            .collect();
        Interpreter {
            program: self.program,
            interner: self.interner,
            libraries,
            natives: self.natives.unwrap_or_default(),
            handler: self.handler.unwrap_or_else(noop_handler),
            max_call_depth: self.max_call_depth,
            no_captures: Arc::from(Vec::new()),
        }
    }
}
