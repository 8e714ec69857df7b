//! Function values.

use std::fmt;
use std::sync::Arc;

use rill_ir::ops::{FunctionDef, FunctionId, Program};

use crate::{Frame, Value};

/// State a closure took from its creation site.
#[derive(Clone)]
pub enum Captured {
    /// Snapshot of a value binding.
    Value(Value),
    /// A `let` group frame, read slot by slot at call time.
    Group(Arc<Frame>),
}

/// A closure: a lowered function plus the state captured when the closure
/// was created.
pub struct FunctionValue {
    pub program: Arc<Program>,
    pub function: FunctionId,
    pub captures: Arc<[Captured]>,
    /// Evaluated parameter defaults; `None` where a parameter has none.
    pub defaults: Box<[Option<Value>]>,
    /// Binding name, for diagnostics.
    pub name: Option<Arc<str>>,
}

impl FunctionValue {
    pub fn def(&self) -> &FunctionDef {
        self.program.function(self.function)
    }

    pub fn arity(&self) -> usize {
        self.def().params.len()
    }

    /// Whether the closure was compiled into `program`.
    pub fn same_program(&self, program: &Arc<Program>) -> bool {
        Arc::ptr_eq(&self.program, program)
    }
}

impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "function {name}"),
            None => f.write_str("function"),
        }
    }
}
