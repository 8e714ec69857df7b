//! Cycle check over eagerly evaluated bindings.
//!
//! Nodes are group bindings (library vars and `let` bindings). A binding
//! depends on every group binding its initializer references, except
//! references inside nested function bodies: those run only when called.
//! Parameter defaults are evaluated when the closure is created and do
//! count.

use rill_diagnostic::{AnalysisError, AnalysisErrorKind};
use rill_ir::ast::{ExprId, ExprKind};
use rustc_hash::FxHashMap;
use tracing::instrument;

use crate::resolve::Resolutions;
use crate::scope::{BindingId, ScopeTree};
use crate::AnalysisInput;

#[derive(Clone, Debug, Default)]
pub struct DependencyGraph {
    edges: FxHashMap<BindingId, Vec<BindingId>>,
}

impl DependencyGraph {
    /// Group bindings `binding` needs before it can be initialized, in
    /// first-reference order.
    pub fn dependencies(&self, binding: BindingId) -> &[BindingId] {
        self.edges.get(&binding).map_or(&[], Vec::as_slice)
    }

    pub fn node_count(&self) -> usize {
        self.edges.len()
    }
}

#[instrument(level = "debug", skip_all)]
pub fn verify(
    input: &AnalysisInput<'_>,
    scopes: &ScopeTree,
    resolutions: &Resolutions,
) -> Result<DependencyGraph, Vec<AnalysisError>> {
    let mut graph = DependencyGraph::default();
    let mut nodes = Vec::new();
    for (id, binding) in scopes.bindings() {
        if !binding.kind.is_group() {
            continue;
        }
        let Some(init) = binding.init else {
            continue;
        };
        let deps = eager_references(input, scopes, resolutions, init);
        graph.edges.insert(id, deps);
        nodes.push(id);
    }

    let mut search = Search {
        input,
        scopes,
        graph: &graph,
        colors: FxHashMap::default(),
        path: Vec::new(),
        errors: Vec::new(),
    };
    for node in nodes {
        search.visit(node);
    }

    if search.errors.is_empty() {
        Ok(graph)
    } else {
        Err(search.errors)
    }
}

fn eager_references(
    input: &AnalysisInput<'_>,
    scopes: &ScopeTree,
    resolutions: &Resolutions,
    init: ExprId,
) -> Vec<BindingId> {
    let mut deps = Vec::new();
    let mut pending = vec![init];
    while let Some(id) = pending.pop() {
        if let Some(target) = resolutions.get(id) {
            if scopes.binding(target).kind.is_group() && !deps.contains(&target) {
                deps.push(target);
            }
            continue;
        }
        let start = pending.len();
        match &input.arena.get(id).kind {
            ExprKind::Function(func) => {
                // Defaults only; the body is deferred.
                pending.extend(func.params.iter().filter_map(|p| p.default));
            }
            _ => input.arena.for_each_child(id, |child| pending.push(child)),
        }
        pending[start..].reverse();
    }
    deps
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Color {
    Gray,
    Black,
}

struct Search<'a, 'i> {
    input: &'a AnalysisInput<'i>,
    scopes: &'a ScopeTree,
    graph: &'a DependencyGraph,
    colors: FxHashMap<BindingId, Color>,
    path: Vec<BindingId>,
    errors: Vec<AnalysisError>,
}

impl Search<'_, '_> {
    fn visit(&mut self, node: BindingId) {
        match self.colors.get(&node) {
            Some(Color::Black) => return,
            Some(Color::Gray) => {
                self.report(node);
                return;
            }
            None => {}
        }
        self.colors.insert(node, Color::Gray);
        self.path.push(node);
        let graph = self.graph;
        for &dep in graph.dependencies(node) {
            rill_stack::with_stack(|| self.visit(dep));
        }
        self.path.pop();
        self.colors.insert(node, Color::Black);
    }

    fn report(&mut self, node: BindingId) {
        let start = self.path.iter().position(|b| *b == node).unwrap_or(0);
        let mut path: Vec<String> = self.path[start..]
            .iter()
            .map(|b| self.name(*b))
            .collect();
        path.push(self.name(node));
        self.errors.push(AnalysisError::new(
            AnalysisErrorKind::IllegalCycle { path },
            self.scopes.binding(node).span,
        ));
    }

    fn name(&self, binding: BindingId) -> String {
        self.input
            .interner
            .lookup(self.scopes.binding(binding).name)
            .to_string()
    }
}

#[cfg(test)]
mod tests;
