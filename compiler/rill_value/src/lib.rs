//! Runtime value model of the Rill engine.
//!
//! Everything the evaluator and the constant folder must agree on lives in
//! this crate, so a folded constant is computed by exactly the code that
//! would have computed it at runtime:
//!
//! - [`Value`]: the immutable tagged value, heap payloads shared by `Arc`
//! - [`operators`]: unary and binary operators, equality and ordering
//! - [`cast`]: conversions between kinds and `is` type tests
//! - [`Env`] / [`FunctionValue`]: closure environments and function values
//! - [`EvalError`]: runtime failures

pub mod cast;
mod env;
mod errors;
mod function;
pub mod operators;
mod value;

pub use env::{Claim, Env, Frame, FrameKind, GroupFrame, SlotCell, SlotState};
pub use errors::{EvalError, EvalErrorKind, EvalResult, NativeError};
pub use function::{Captured, FunctionValue};
pub use value::{Dict, List, Value};
