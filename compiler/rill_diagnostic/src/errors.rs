//! Phase errors.

use std::sync::Arc;

use rill_ir::Span;
use thiserror::Error;

use crate::ErrorCode;

/// A lexical or syntactic error.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ParseError {
    pub code: ErrorCode,
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(code: ErrorCode, message: impl Into<String>, span: Span) -> Self {
        ParseError {
            code,
            message: message.into(),
            span,
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AnalysisErrorKind {
    #[error("`{name}` is already declared in this scope")]
    DuplicateBinding { name: String, previous: Span },

    #[error("cannot resolve `{name}`")]
    UnresolvedReference { name: String },

    #[error("`{name}` refers to a {what}, not a value")]
    InvalidReference { name: String, what: &'static str },

    #[error("illegal cycle: {}", path.join(" -> "))]
    IllegalCycle { path: Vec<String> },

    #[error("function captures {count} values, at most {max} are supported")]
    ClosureCaptureError { count: usize, max: usize },

    #[error("native function `{name}` is not allowed here")]
    NativeAccessDenied { name: String },

    #[error("invalid metadata: {reason}")]
    InvalidMetadata { reason: String },
}

impl AnalysisErrorKind {
    pub fn code(&self) -> ErrorCode {
        match self {
            AnalysisErrorKind::DuplicateBinding { .. } => ErrorCode::E2001,
            AnalysisErrorKind::UnresolvedReference { .. } => ErrorCode::E2002,
            AnalysisErrorKind::InvalidReference { .. } => ErrorCode::E2003,
            AnalysisErrorKind::IllegalCycle { .. } => ErrorCode::E2004,
            AnalysisErrorKind::ClosureCaptureError { .. } => ErrorCode::E2005,
            AnalysisErrorKind::NativeAccessDenied { .. } => ErrorCode::E2006,
            AnalysisErrorKind::InvalidMetadata { .. } => ErrorCode::E2007,
        }
    }
}

/// A static-analysis error at a use or declaration site.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{kind}")]
pub struct AnalysisError {
    pub kind: AnalysisErrorKind,
    pub span: Span,
}

impl AnalysisError {
    pub fn new(kind: AnalysisErrorKind, span: Span) -> Self {
        AnalysisError { kind, span }
    }

    pub fn code(&self) -> ErrorCode {
        self.kind.code()
    }
}

/// Failure to obtain a unit's source from the load path.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unit `{unit}` not found on the load path")]
    NotFound { unit: Arc<str> },

    #[error("cannot read unit `{unit}`")]
    Io {
        unit: Arc<str>,
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    pub fn code(&self) -> ErrorCode {
        match self {
            LoadError::NotFound { .. } => ErrorCode::E3001,
            LoadError::Io { .. } => ErrorCode::E3002,
        }
    }

    pub fn unit(&self) -> &Arc<str> {
        match self {
            LoadError::NotFound { unit } | LoadError::Io { unit, .. } => unit,
        }
    }
}
