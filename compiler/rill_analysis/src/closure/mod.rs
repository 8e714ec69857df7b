//! Closure capture analysis.
//!
//! A function literal captures every binding it (or a function nested in
//! it) references that is declared outside its own scope subtree. Library
//! vars are never captured; they are addressed through the library
//! instance and only set [`ClosureInfo::uses_libraries`].
//!
//! Value bindings are captured by value when the closure is created. A
//! reference to an outer `let` binding captures the whole let-group frame
//! instead, and the slot is read at call time; this is what lets a local
//! function refer to itself.

use rill_diagnostic::{AnalysisError, AnalysisErrorKind};
use rill_ir::ast::{ExprId, ExprKind, FunctionBody};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{instrument, trace};

use crate::resolve::Resolutions;
use crate::scope::{BindingId, BindingKind, ScopeId, ScopeTree};
use crate::AnalysisInput;

/// Largest capture set a single function literal may have.
pub const MAX_CAPTURES: usize = 65_535;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Capture {
    /// Snapshot of a value binding.
    Value(BindingId),
    /// The let-group frame of the given scope.
    Group(ScopeId),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClosureInfo {
    /// Captures in order of first use.
    pub captures: Vec<Capture>,
    pub uses_libraries: bool,
}

impl ClosureInfo {
    pub fn position(&self, capture: Capture) -> Option<usize> {
        self.captures.iter().position(|c| *c == capture)
    }
}

/// Function literal to its capture set.
#[derive(Clone, Debug, Default)]
pub struct ClosureTable {
    functions: FxHashMap<ExprId, ClosureInfo>,
}

impl ClosureTable {
    pub fn get(&self, function: ExprId) -> Option<&ClosureInfo> {
        self.functions.get(&function)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

#[instrument(level = "debug", skip_all)]
pub fn analyze(
    input: &AnalysisInput<'_>,
    scopes: &ScopeTree,
    resolutions: &Resolutions,
) -> Result<ClosureTable, Vec<AnalysisError>> {
    let mut table = ClosureTable::default();
    let mut errors = Vec::new();

    for (id, expr) in input.arena.iter() {
        let ExprKind::Function(func) = &expr.kind else {
            continue;
        };
        let Some(function_scope) = scopes.node_scope(id) else {
            continue;
        };

        let mut info = ClosureInfo::default();
        if let FunctionBody::Expr(body) = &func.body {
            collect(input, scopes, resolutions, *body, function_scope, &mut info);
        }

        if info.captures.len() > MAX_CAPTURES {
            errors.push(AnalysisError::new(
                AnalysisErrorKind::ClosureCaptureError {
                    count: info.captures.len(),
                    max: MAX_CAPTURES,
                },
                func.span,
            ));
        }
        trace!(function = ?id, captures = info.captures.len(), "closure");
        table.functions.insert(id, info);
    }

    if errors.is_empty() {
        Ok(table)
    } else {
        Err(errors)
    }
}

/// Walk the subtree under `root`, nested functions included.
fn collect(
    input: &AnalysisInput<'_>,
    scopes: &ScopeTree,
    resolutions: &Resolutions,
    root: ExprId,
    function_scope: ScopeId,
    info: &mut ClosureInfo,
) {
    let mut seen = FxHashSet::default();
    let mut pending = vec![root];
    while let Some(id) = pending.pop() {
        if let Some(target) = resolutions.get(id) {
            let binding = scopes.binding(target);
            let capture = match binding.kind {
                BindingKind::LibraryVar { .. } => {
                    info.uses_libraries = true;
                    None
                }
                _ if scopes.is_within(binding.scope, function_scope) => None,
                BindingKind::Let => Some(Capture::Group(binding.scope)),
                _ => Some(Capture::Value(target)),
            };
            if let Some(capture) = capture {
                if seen.insert(capture) {
                    info.captures.push(capture);
                }
            }
            continue;
        }
        // Reverse so children pop in evaluation order.
        let start = pending.len();
        input.arena.for_each_child(id, |child| pending.push(child));
        pending[start..].reverse();
    }
}

#[cfg(test)]
mod tests;
