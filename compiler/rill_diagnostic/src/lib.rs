//! Compile-time errors and located diagnostics.
//!
//! Phases report span-carrying errors ([`ParseError`], [`AnalysisError`]).
//! At the compilation boundary they become [`Diagnostic`]s, which carry an
//! [`ErrorCode`] and a resolved [`SourceLocation`](rill_ir::SourceLocation),
//! and are bundled into a [`CompileError`].

mod diagnostic;
mod error_code;
mod errors;

pub use diagnostic::{CompileError, Diagnostic};
pub use error_code::ErrorCode;
pub use errors::{AnalysisError, AnalysisErrorKind, LoadError, ParseError};
