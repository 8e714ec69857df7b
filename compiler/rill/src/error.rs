//! Errors reported to hosts.

use rill_diagnostic::CompileError;
use rill_ir::{SourceLocation, SourceMap};
use rill_value::{EvalError, EvalErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("`{name}` not found")]
    NotFound { name: String },

    #[error("library `{name}` is not exported")]
    NotExported { name: String },
}

impl Error {
    pub fn as_compile(&self) -> Option<&CompileError> {
        match self {
            Error::Compile(err) => Some(err),
            _ => None,
        }
    }

    pub fn as_runtime(&self) -> Option<&RuntimeError> {
        match self {
            Error::Runtime(err) => Some(err),
            _ => None,
        }
    }
}

/// An evaluation failure with its span resolved to a source location.
#[derive(Debug, Error)]
#[error("{location}: {error}")]
pub struct RuntimeError {
    pub location: SourceLocation,
    #[source]
    pub error: EvalError,
}

impl RuntimeError {
    pub fn new(error: EvalError, map: &SourceMap) -> Self {
        RuntimeError {
            location: map.locate_or_unknown(error.span),
            error,
        }
    }

    /// Stable code of the failure, as seen by `catch` handlers.
    pub fn code(&self) -> &'static str {
        self.error.code()
    }

    pub fn kind(&self) -> &EvalErrorKind {
        &self.error.kind
    }

    pub fn message(&self) -> String {
        self.error.to_string()
    }
}
