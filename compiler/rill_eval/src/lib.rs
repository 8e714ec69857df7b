//! Tree-walking evaluator for Rill.
//!
//! An [`Interpreter`] executes one lowered [`Program`](rill_ir::ops::Program)
//! and owns the write-once cells of its library variables. It is `Send +
//! Sync`; every evaluation call builds its own environment chain, so one
//! interpreter can serve several threads at once.
//!
//! # Architecture
//!
//! `Interpreter::eval_op` dispatches on [`OpKind`](rill_ir::ops::OpKind).
//! The helper modules in `exec` hold the larger operations:
//!
//! - `exec::call` - closure creation, calls, native calls
//! - `exec::control` - `for` comprehensions, `match`, `try`
//! - `exec::lazy` - library variables and `let` slots
//!
//! Code always runs against the program it was compiled into: a closure
//! carries its own `Arc<Program>`, and calling it switches the activation to
//! that program. Library variables exist only in the interpreter's own
//! program, so a closure that reads them cannot run elsewhere
//! (`ForeignFunction`).

mod debug_handler;
mod exec;
mod interpreter;
pub mod natives;

pub use debug_handler::{
    noop_handler, CancellableDebugHandler, DebugHandler, Interrupt, NoopDebugHandler,
    RecordingDebugHandler, SharedDebugHandler, TracingDebugHandler,
};
pub use interpreter::{Interpreter, InterpreterBuilder, DEFAULT_MAX_CALL_DEPTH};
pub use natives::{NativeFunction, NativeRegistry};
