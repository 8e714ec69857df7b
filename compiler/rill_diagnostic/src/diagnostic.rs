//! Located diagnostics and the compilation error that bundles them.

use std::fmt;

use rill_ir::{SourceLocation, SourceMap, Span};
use crate::{AnalysisError, ErrorCode, LoadError, ParseError};

/// One compile-time problem with its resolved location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub message: String,
    pub span: Span,
    /// `None` when the problem has no source position (a missing unit).
    pub location: Option<SourceLocation>,
}

impl Diagnostic {
    pub fn new(code: ErrorCode, message: impl Into<String>, span: Span) -> Self {
        Diagnostic {
            code,
            message: message.into(),
            span,
            location: None,
        }
    }

    /// Resolve the span against `map`.
    #[must_use]
    pub fn located(mut self, map: &SourceMap) -> Self {
        self.location = map.locate(self.span);
        self
    }

    pub fn from_parse(err: &ParseError, map: &SourceMap) -> Self {
        Diagnostic::new(err.code, err.message.clone(), err.span).located(map)
    }

    pub fn from_analysis(err: &AnalysisError, map: &SourceMap) -> Self {
        Diagnostic::new(err.code(), err.to_string(), err.span).located(map)
    }

    /// A load failure, optionally located at the import that requested it.
    pub fn from_load(err: &LoadError, import: Option<(Span, &SourceMap)>) -> Self {
        let mut message = err.to_string();
        if let LoadError::Io { source, .. } = err {
            message = format!("{message}: {source}");
        }
        match import {
            Some((span, map)) => Diagnostic::new(err.code(), message, span).located(map),
            None => Diagnostic::new(err.code(), message, Span::DUMMY),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(location) = &self.location {
            write!(f, "{location}: ")?;
        }
        write!(f, "error[{}]: {}", self.code, self.message)
    }
}

/// A failed compilation. Holds every diagnostic of the failing phase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileError {
    pub diagnostics: Vec<Diagnostic>,
}

impl CompileError {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        CompileError { diagnostics }
    }

    pub fn single(diagnostic: Diagnostic) -> Self {
        CompileError {
            diagnostics: vec![diagnostic],
        }
    }

    /// The first diagnostic, which is what most callers report.
    pub fn primary(&self) -> Option<&Diagnostic> {
        self.diagnostics.first()
    }

    pub fn has_code(&self, code: ErrorCode) -> bool {
        self.diagnostics.iter().any(|d| d.code == code)
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.diagnostics.as_slice() {
            [] => f.write_str("compilation failed"),
            [only] => write!(f, "{only}"),
            [first, rest @ ..] => write!(f, "{first} (and {} more)", rest.len()),
        }
    }
}

impl std::error::Error for CompileError {}

#[cfg(test)]
mod tests;
