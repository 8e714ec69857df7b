//! Evaluation of the larger operations, split out of the op dispatch.

mod call;
mod control;
mod lazy;
