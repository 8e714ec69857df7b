//! Static analysis passes.
//!
//! Each pass is a pure function from the parsed input (plus the outputs of
//! earlier passes) to a new table, returning every error it finds:
//!
//! ```text
//! metadata::analyze ─► scope::build ─► resolve::resolve ─► closure::analyze ─► dependency::verify
//! ```
//!
//! [`analyze`] runs them in order and stops after the first pass that
//! reports errors.

pub mod closure;
pub mod dependency;
pub mod metadata;
pub mod resolve;
pub mod scope;

#[cfg(test)]
mod test_helpers;

pub use closure::{Capture, ClosureInfo, ClosureTable, MAX_CAPTURES};
pub use dependency::DependencyGraph;
pub use metadata::{MetaKey, Metadata, MetadataTable};
pub use resolve::Resolutions;
pub use scope::{Binding, BindingId, BindingKind, Scope, ScopeId, ScopeKind, ScopeTree};

use rill_diagnostic::AnalysisError;
use rill_ir::ast::{ExprArena, ExprId, Module};
use rill_ir::{NativeCatalog, StringInterner};
use tracing::{debug, instrument};

/// What is being analyzed.
#[derive(Copy, Clone)]
pub enum Root<'a> {
    /// The units of a compilation. `allow_natives[i]` says whether
    /// `modules[i]` may declare `via` functions.
    Modules {
        modules: &'a [Module],
        allow_natives: &'a [bool],
    },
    /// A standalone expression.
    Expression { expr: ExprId, allow_natives: bool },
}

/// Everything the passes read.
#[derive(Copy, Clone)]
pub struct AnalysisInput<'a> {
    pub arena: &'a ExprArena,
    pub interner: &'a StringInterner,
    pub root: Root<'a>,
    pub natives: &'a dyn NativeCatalog,
}

impl<'a> AnalysisInput<'a> {
    pub fn modules(&self) -> &'a [Module] {
        match self.root {
            Root::Modules { modules, .. } => modules,
            Root::Expression { .. } => &[],
        }
    }

    /// Whether the unit at `module` (or the standalone expression, for
    /// `None`) may use native functions.
    pub fn natives_allowed(&self, module: Option<usize>) -> bool {
        match (self.root, module) {
            (Root::Modules { allow_natives, .. }, Some(i)) => {
                allow_natives.get(i).copied().unwrap_or(false)
            }
            (Root::Expression { allow_natives, .. }, _) => allow_natives,
            (Root::Modules { .. }, None) => false,
        }
    }

    /// Module index owning a unit name.
    pub fn module_index(&self, unit: &str) -> Option<usize> {
        self.modules().iter().position(|m| &*m.unit == unit)
    }
}

/// Combined output of all passes.
#[derive(Debug)]
pub struct Analysis {
    pub metadata: MetadataTable,
    pub scopes: ScopeTree,
    pub resolutions: Resolutions,
    pub closures: ClosureTable,
    pub dependencies: DependencyGraph,
}

/// Run every pass in order.
#[instrument(level = "debug", skip_all)]
pub fn analyze(input: &AnalysisInput<'_>) -> Result<Analysis, Vec<AnalysisError>> {
    let metadata = metadata::analyze(input)?;
    let scopes = scope::build(input)?;
    debug!(
        scopes = scopes.scope_count(),
        bindings = scopes.binding_count(),
        "scopes built"
    );
    let resolutions = resolve::resolve(input, &scopes)?;
    let closures = closure::analyze(input, &scopes, &resolutions)?;
    let dependencies = dependency::verify(input, &scopes, &resolutions)?;
    Ok(Analysis {
        metadata,
        scopes,
        resolutions,
        closures,
        dependencies,
    })
}
