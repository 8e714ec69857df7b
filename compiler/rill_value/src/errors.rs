//! Runtime failures.
//!
//! Operator and cast functions return a bare [`EvalErrorKind`]; the
//! evaluator attaches the span of the failing op, producing an
//! [`EvalError`].

use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use rill_ir::{Span, TypeName};
use thiserror::Error;

use crate::Value;

/// Error returned by a host native function.
pub type NativeError = Box<dyn StdError + Send + Sync + 'static>;

pub type EvalResult<T = Value> = Result<T, EvalError>;

#[derive(Debug, Error)]
pub enum EvalErrorKind {
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("function accepts at most {expected} arguments, got {found}")]
    ArityMismatch { expected: usize, found: usize },

    #[error("native function `{name}` failed: {source}")]
    NativeFailure {
        name: String,
        #[source]
        source: NativeError,
    },

    #[error("cannot cast {from} to {to}")]
    CastError { from: TypeName, to: TypeName },

    #[error("division by zero")]
    DivisionByZero,

    #[error("index {index} out of bounds for list of length {len}")]
    IndexOutOfBounds { index: i64, len: usize },

    #[error("{found} is not callable")]
    NotCallable { found: TypeName },

    #[error("thrown: {value}")]
    Thrown { value: Value },

    #[error("cyclic evaluation of `{name}`")]
    CyclicEvaluation { name: String },

    #[error("maximum call depth of {depth} exceeded")]
    StackOverflow { depth: usize },

    #[error("evaluation interrupted")]
    Interrupted,

    #[error("function belongs to a different runtime")]
    ForeignFunction,
}

impl EvalErrorKind {
    pub fn type_mismatch(expected: impl Into<String>, found: impl fmt::Display) -> Self {
        EvalErrorKind::TypeMismatch {
            expected: expected.into(),
            found: found.to_string(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        EvalErrorKind::InvalidArgument {
            message: message.into(),
        }
    }

    /// Stable identifier exposed to `catch` handlers.
    pub const fn code(&self) -> &'static str {
        match self {
            EvalErrorKind::TypeMismatch { .. } => "TYPE_MISMATCH",
            EvalErrorKind::InvalidArgument { .. } => "INVALID_ARGUMENT",
            EvalErrorKind::ArityMismatch { .. } => "ARITY_MISMATCH",
            EvalErrorKind::NativeFailure { .. } => "NATIVE_FAILURE",
            EvalErrorKind::CastError { .. } => "CAST_ERROR",
            EvalErrorKind::DivisionByZero => "DIVISION_BY_ZERO",
            EvalErrorKind::IndexOutOfBounds { .. } => "INDEX_OUT_OF_BOUNDS",
            EvalErrorKind::NotCallable { .. } => "NOT_CALLABLE",
            EvalErrorKind::Thrown { .. } => "CUSTOM_ERROR",
            EvalErrorKind::CyclicEvaluation { .. } => "CYCLIC_EVALUATION",
            EvalErrorKind::StackOverflow { .. } => "STACK_OVERFLOW",
            EvalErrorKind::Interrupted => "INTERRUPTED",
            EvalErrorKind::ForeignFunction => "FOREIGN_FUNCTION",
        }
    }

    /// Whether `try`/`catch` may handle the error.
    pub const fn is_catchable(&self) -> bool {
        !matches!(
            self,
            EvalErrorKind::Interrupted | EvalErrorKind::StackOverflow { .. }
        )
    }

    #[must_use]
    pub fn at(self, span: Span) -> EvalError {
        EvalError { kind: self, span }
    }
}

/// A runtime failure at the span of the op that raised it.
#[derive(Debug)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub span: Span,
}

impl EvalError {
    pub fn new(kind: EvalErrorKind, span: Span) -> Self {
        EvalError { kind, span }
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn is_catchable(&self) -> bool {
        self.kind.is_catchable()
    }

    /// The value a `catch` binding receives: the thrown value itself, or
    /// `{:code, :message}` for engine errors.
    pub fn into_value(self) -> Value {
        match self.kind {
            EvalErrorKind::Thrown { value } => value,
            kind => {
                let mut entries = BTreeMap::new();
                entries.insert(Arc::from("code"), Value::string(kind.code()));
                entries.insert(Arc::from("message"), Value::string(&kind.to_string()));
                Value::dict(entries)
            }
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.kind, f)
    }
}

impl StdError for EvalError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.kind.source()
    }
}
