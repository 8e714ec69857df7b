//! From analyzed syntax to an executable [`Program`](rill_ir::ops::Program).
//!
//! ```text
//! ExprArena + Analysis ─► lower ─► fold ─► specialize ─► Program
//! ```
//!
//! - [`lower`]: every expression becomes an op; references become
//!   addressing modes and function literals become closure constructors.
//! - [`fold`]: subtrees over constants are evaluated ahead of time with the
//!   evaluator's own operator functions.
//! - [`specialize`]: arithmetic over statically known kinds gets a fast
//!   dispatch path.
//!
//! Folding and specialization each return a new program and never change
//! what a program computes.

mod const_fold;
mod lower;
mod specialize;

#[cfg(test)]
mod test_helpers;

pub use const_fold::fold;
pub use lower::lower;
pub use specialize::specialize;

