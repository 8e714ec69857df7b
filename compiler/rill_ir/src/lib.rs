//! Shared data structures for the Rill engine.
//!
//! Everything that flows between pipeline phases lives here so the phase
//! crates only depend on this crate and not on each other:
//!
//! ```text
//! rill_lexer ─► rill_parse ─► ast::ExprArena + ast::Module
//!                                   │
//!                      rill_analysis (scopes, resolutions, captures)
//!                                   │
//!                      rill_canon ─► ops::Program ─► rill_eval
//! ```
//!
//! - [`Span`] / [`SourceMap`]: byte ranges in a global offset space shared by
//!   every unit of a compilation, mapped back to `unit:line:column`.
//! - [`Name`] / [`StringInterner`]: interned identifiers.
//! - [`ast`]: the syntax tree handed to analysis.
//! - [`ops`]: the executable operation tree.

pub mod ast;
mod const_value;
mod interner;
mod name;
mod native;
mod operators;
pub mod ops;
mod source_map;
mod span;
mod types;

pub use const_value::ConstValue;
pub use interner::{SharedInterner, StringInterner};
pub use name::Name;
pub use native::{NativeCatalog, NoNatives};
pub use operators::{BinaryOp, UnaryOp};
pub use source_map::{SourceFile, SourceLocation, SourceMap};
pub use span::Span;
pub use types::TypeName;

/// Convert a collection length to a `u32` index.
///
/// # Panics
/// Panics if the length exceeds `u32::MAX`; arenas never grow that large for
/// any source the lexer accepts (spans are `u32` offsets).
#[inline]
pub fn to_u32(len: usize, what: &str) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic!("too many {what}: {len} exceeds u32::MAX"))
}
