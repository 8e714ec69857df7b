//! Scope builder.
//!
//! Creates one scope per lexical block and registers each declaration in
//! the innermost scope. Scopes and bindings live in arenas addressed by
//! [`ScopeId`] and [`BindingId`]; a scope's parent is a plain handle used
//! for lookup.
//!
//! Placement rules for the nodes that straddle two scopes:
//!
//! | Node                | Outer scope                   | Inner scope        |
//! |---------------------|-------------------------------|--------------------|
//! | function literal    | parameter defaults            | body               |
//! | `for` clause        | source / initializer          | binding, later clauses |
//! | `match` arm         | subject, value patterns       | captures, guard, body |
//! | `try`               | body                          | catch binding, handler |

use std::fmt;

use rill_diagnostic::{AnalysisError, AnalysisErrorKind};
use rill_ir::ast::{Binder, ExprId, ExprKind, ForClause, FunctionBody, ImportMember, Pattern, PatternKind};
use rill_ir::{to_u32, Name, Span, TypeName};
use rustc_hash::FxHashMap;
use tracing::instrument;

use crate::AnalysisInput;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ScopeId(u32);

impl ScopeId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct BindingId(u32);

impl BindingId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}", self.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ScopeKind {
    Global,
    Module { module: u32 },
    Library { library: u32 },
    Let,
    Function,
    ForClause,
    MatchArm,
    Catch,
}

impl ScopeKind {
    /// Whether entering the scope pushes a runtime frame.
    pub const fn is_frame(self) -> bool {
        matches!(
            self,
            ScopeKind::Let
                | ScopeKind::Function
                | ScopeKind::ForClause
                | ScopeKind::MatchArm
                | ScopeKind::Catch
        )
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BindingKind {
    /// `library lib { x: ...; }`, addressed by global library index.
    LibraryVar { library: u32 },
    Let,
    Parameter,
    Generator,
    ForLocal,
    PatternCapture,
    Catch,
    Library { library: u32 },
    /// `import lib from "unit"`; `module` is `None` when the unit is not
    /// part of the compilation.
    Import { module: Option<u32>, library: Name },
    /// `import * as m from "unit"`
    ModuleAlias { module: Option<u32> },
}

impl BindingKind {
    /// Whether references to the binding produce a value.
    pub const fn is_value(self) -> bool {
        !matches!(
            self,
            BindingKind::Library { .. } | BindingKind::Import { .. } | BindingKind::ModuleAlias { .. }
        )
    }

    /// Bindings evaluated lazily in a write-once group: library vars and
    /// `let` bindings.
    pub const fn is_group(self) -> bool {
        matches!(self, BindingKind::LibraryVar { .. } | BindingKind::Let)
    }

    pub const fn describe(self) -> &'static str {
        match self {
            BindingKind::Library { .. } | BindingKind::Import { .. } => "library",
            BindingKind::ModuleAlias { .. } => "module",
            _ => "value",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Binding {
    pub name: Name,
    pub kind: BindingKind,
    pub scope: ScopeId,
    pub span: Span,
    pub ty: Option<TypeName>,
    /// Position in the runtime frame (or library) holding the binding.
    pub slot: u32,
    /// Initializer of group bindings and `for` locals.
    pub init: Option<ExprId>,
}

#[derive(Clone, Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    /// Bindings declared directly in this scope, in declaration order.
    pub bindings: Vec<BindingId>,
    names: FxHashMap<Name, BindingId>,
}

impl Scope {
    pub fn get(&self, name: Name) -> Option<BindingId> {
        self.names.get(&name).copied()
    }
}

/// Output of the scope builder.
#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    bindings: Vec<Binding>,
    expr_scopes: Vec<Option<ScopeId>>,
    /// Inner scope of `let`, function literal and `try` nodes.
    node_scopes: FxHashMap<ExprId, ScopeId>,
    /// Per-clause scopes of `for` nodes; filters open no scope.
    for_scopes: FxHashMap<ExprId, Vec<Option<ScopeId>>>,
    arm_scopes: FxHashMap<ExprId, Vec<ScopeId>>,
    global: ScopeId,
    module_scopes: Vec<ScopeId>,
    /// Scope of each library, by global library index.
    library_scopes: Vec<ScopeId>,
    /// First global library index of each module.
    library_base: Vec<u32>,
}

impl ScopeTree {
    pub fn global(&self) -> ScopeId {
        self.global
    }

    #[inline]
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    #[inline]
    pub fn binding(&self, id: BindingId) -> &Binding {
        &self.bindings[id.index()]
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    pub fn bindings(&self) -> impl Iterator<Item = (BindingId, &Binding)> {
        self.bindings
            .iter()
            .enumerate()
            .map(|(i, b)| (BindingId(to_u32(i, "bindings")), b))
    }

    /// The scope an expression was placed in. Documentation and metadata
    /// expressions have none.
    pub fn scope_of(&self, expr: ExprId) -> Option<ScopeId> {
        self.expr_scopes.get(expr.index()).copied().flatten()
    }

    /// Inner scope of a `let`, function literal or `try` node.
    pub fn node_scope(&self, expr: ExprId) -> Option<ScopeId> {
        self.node_scopes.get(&expr).copied()
    }

    pub fn for_scopes(&self, expr: ExprId) -> &[Option<ScopeId>] {
        self.for_scopes.get(&expr).map_or(&[], Vec::as_slice)
    }

    pub fn arm_scopes(&self, expr: ExprId) -> &[ScopeId] {
        self.arm_scopes.get(&expr).map_or(&[], Vec::as_slice)
    }

    pub fn module_scope(&self, module: usize) -> ScopeId {
        self.module_scopes[module]
    }

    pub fn library_scope(&self, library: u32) -> ScopeId {
        self.library_scopes[library as usize]
    }

    pub fn library_count(&self) -> usize {
        self.library_scopes.len()
    }

    /// Global library index of the `position`-th library of `module`.
    pub fn library_index(&self, module: usize, position: usize) -> u32 {
        self.library_base[module] + to_u32(position, "libraries")
    }

    /// Find a name along the scope chain, innermost first.
    pub fn lookup(&self, mut scope: ScopeId, name: Name) -> Option<BindingId> {
        loop {
            let s = self.scope(scope);
            if let Some(binding) = s.get(name) {
                return Some(binding);
            }
            scope = s.parent?;
        }
    }

    /// Whether `inner` is `outer` or nested inside it.
    pub fn is_within(&self, inner: ScopeId, outer: ScopeId) -> bool {
        let mut current = Some(inner);
        while let Some(scope) = current {
            if scope == outer {
                return true;
            }
            current = self.scope(scope).parent;
        }
        false
    }

    /// Nearest function scope at or above `scope`.
    pub fn enclosing_function(&self, scope: ScopeId) -> Option<ScopeId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let s = self.scope(id);
            if s.kind == ScopeKind::Function {
                return Some(id);
            }
            current = s.parent;
        }
        None
    }

    /// Module index owning `scope`, `None` for standalone expressions.
    pub fn module_of(&self, scope: ScopeId) -> Option<usize> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let s = self.scope(id);
            if let ScopeKind::Module { module } = s.kind {
                return Some(module as usize);
            }
            current = s.parent;
        }
        None
    }

    /// Number of runtime frames between code placed in `from` and the frame
    /// of `to`: frame scopes on the chain from `from` (inclusive) up to `to`
    /// (exclusive).
    ///
    /// # Panics
    /// Panics if `to` is not an ancestor of `from`.
    pub fn frame_depth(&self, from: ScopeId, to: ScopeId) -> u32 {
        let mut depth = 0;
        let mut current = from;
        while current != to {
            let s = self.scope(current);
            if s.kind.is_frame() {
                depth += 1;
            }
            current = s
                .parent
                .unwrap_or_else(|| panic!("{to:?} is not an ancestor of {from:?}"));
        }
        depth
    }
}

/// Build the scope tree.
#[instrument(level = "debug", skip_all)]
pub fn build(input: &AnalysisInput<'_>) -> Result<ScopeTree, Vec<AnalysisError>> {
    let mut builder = Builder {
        input,
        tree: ScopeTree {
            scopes: Vec::new(),
            bindings: Vec::new(),
            expr_scopes: vec![None; input.arena.len()],
            node_scopes: FxHashMap::default(),
            for_scopes: FxHashMap::default(),
            arm_scopes: FxHashMap::default(),
            global: ScopeId(0),
            module_scopes: Vec::new(),
            library_scopes: Vec::new(),
            library_base: Vec::new(),
        },
        errors: Vec::new(),
    };
    let global = builder.new_scope(ScopeKind::Global, None);
    builder.tree.global = global;

    match input.root {
        crate::Root::Modules { modules, .. } => builder.build_modules(modules),
        crate::Root::Expression { expr, .. } => builder.walk(expr, global),
    }

    if builder.errors.is_empty() {
        Ok(builder.tree)
    } else {
        Err(builder.errors)
    }
}

struct Builder<'a, 'i> {
    input: &'a AnalysisInput<'i>,
    tree: ScopeTree,
    errors: Vec<AnalysisError>,
}

impl Builder<'_, '_> {
    fn new_scope(&mut self, kind: ScopeKind, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(to_u32(self.tree.scopes.len(), "scopes"));
        self.tree.scopes.push(Scope {
            kind,
            parent,
            bindings: Vec::new(),
            names: FxHashMap::default(),
        });
        id
    }

    fn declare(
        &mut self,
        scope: ScopeId,
        name: Name,
        kind: BindingKind,
        span: Span,
        ty: Option<TypeName>,
        init: Option<ExprId>,
    ) -> BindingId {
        if let Some(previous) = self.tree.scope(scope).get(name) {
            self.errors.push(AnalysisError::new(
                AnalysisErrorKind::DuplicateBinding {
                    name: self.input.interner.lookup(name).to_string(),
                    previous: self.tree.binding(previous).span,
                },
                span,
            ));
            return previous;
        }

        let id = BindingId(to_u32(self.tree.bindings.len(), "bindings"));
        let s = &mut self.tree.scopes[scope.index()];
        let slot = to_u32(s.bindings.len(), "bindings");
        s.bindings.push(id);
        s.names.insert(name, id);
        self.tree.bindings.push(Binding {
            name,
            kind,
            scope,
            span,
            ty,
            slot,
            init,
        });
        id
    }

    fn build_modules(&mut self, modules: &[rill_ir::ast::Module]) {
        let global = self.tree.global;
        let mut next_library = 0u32;
        for (index, module) in modules.iter().enumerate() {
            let module_id = to_u32(index, "modules");
            let scope = self.new_scope(ScopeKind::Module { module: module_id }, Some(global));
            self.tree.module_scopes.push(scope);
            self.tree.library_base.push(next_library);

            for import in &module.imports {
                let target = self
                    .input
                    .module_index(&import.target)
                    .map(|m| to_u32(m, "modules"));
                for member in &import.members {
                    let kind = match member {
                        ImportMember::Library { name, .. } => BindingKind::Import {
                            module: target,
                            library: *name,
                        },
                        ImportMember::Module { .. } => BindingKind::ModuleAlias { module: target },
                    };
                    self.declare(scope, member.local_name(), kind, member.span(), None, None);
                }
            }

            for library in &module.libraries {
                let kind = BindingKind::Library {
                    library: next_library,
                };
                self.declare(scope, library.name, kind, library.name_span, None, None);
                let lib_scope = self.new_scope(
                    ScopeKind::Library {
                        library: next_library,
                    },
                    Some(scope),
                );
                self.tree.library_scopes.push(lib_scope);
                next_library += 1;
            }
        }

        // Bodies after all names exist, so references may point forward.
        for (index, module) in modules.iter().enumerate() {
            for (position, library) in module.libraries.iter().enumerate() {
                let global_index = self.tree.library_index(index, position);
                let lib_scope = self.tree.library_scope(global_index);
                for var in &library.vars {
                    self.declare(
                        lib_scope,
                        var.name,
                        BindingKind::LibraryVar {
                            library: global_index,
                        },
                        var.name_span,
                        var.ty,
                        Some(var.init),
                    );
                }
                for var in &library.vars {
                    self.walk(var.init, lib_scope);
                }
            }
        }
    }

    fn walk(&mut self, expr: ExprId, scope: ScopeId) {
        rill_stack::with_stack(|| self.walk_inner(expr, scope));
    }

    fn walk_inner(&mut self, expr: ExprId, scope: ScopeId) {
        let arena = self.input.arena;
        self.tree.expr_scopes[expr.index()] = Some(scope);

        match &arena.get(expr).kind {
            ExprKind::Let { bindings, body } => {
                let inner = self.new_scope(ScopeKind::Let, Some(scope));
                self.tree.node_scopes.insert(expr, inner);
                for var in bindings {
                    self.declare(
                        inner,
                        var.name,
                        BindingKind::Let,
                        var.name_span,
                        var.ty,
                        Some(var.init),
                    );
                }
                for var in bindings {
                    self.walk(var.init, inner);
                }
                self.walk(*body, inner);
            }
            ExprKind::Function(func) => {
                for param in &func.params {
                    if let Some(default) = param.default {
                        self.walk(default, scope);
                    }
                }
                let inner = self.new_scope(ScopeKind::Function, Some(scope));
                self.tree.node_scopes.insert(expr, inner);
                for param in &func.params {
                    self.declare(
                        inner,
                        param.name,
                        BindingKind::Parameter,
                        param.span,
                        param.ty,
                        None,
                    );
                }
                if let FunctionBody::Expr(body) = &func.body {
                    self.walk(*body, inner);
                }
            }
            ExprKind::For { clauses, body } => {
                let mut current = scope;
                let mut clause_scopes = Vec::with_capacity(clauses.len());
                for clause in clauses {
                    match clause {
                        ForClause::Generator { binder, ty, source } => {
                            self.walk(*source, current);
                            current = self.bind_clause(current, *binder, BindingKind::Generator, *ty, None);
                            clause_scopes.push(Some(current));
                        }
                        ForClause::Local { binder, ty, init } => {
                            self.walk(*init, current);
                            current =
                                self.bind_clause(current, *binder, BindingKind::ForLocal, *ty, Some(*init));
                            clause_scopes.push(Some(current));
                        }
                        ForClause::Filter(cond) => {
                            self.walk(*cond, current);
                            clause_scopes.push(None);
                        }
                    }
                }
                self.tree.for_scopes.insert(expr, clause_scopes);
                self.walk(*body, current);
            }
            ExprKind::Match { subject, arms } => {
                self.walk(*subject, scope);
                let mut scopes = Vec::with_capacity(arms.len());
                for arm in arms {
                    self.walk_pattern_values(&arm.pattern, scope);
                    let inner = self.new_scope(ScopeKind::MatchArm, Some(scope));
                    let mut binders = Vec::new();
                    arm.pattern.binders(&mut binders);
                    for binder in binders {
                        self.declare(
                            inner,
                            binder.name,
                            BindingKind::PatternCapture,
                            binder.span,
                            None,
                            None,
                        );
                    }
                    if let Some(guard) = arm.guard {
                        self.walk(guard, inner);
                    }
                    self.walk(arm.body, inner);
                    scopes.push(inner);
                }
                self.tree.arm_scopes.insert(expr, scopes);
            }
            ExprKind::Try {
                body,
                catch,
                handler,
            } => {
                self.walk(*body, scope);
                let inner = self.new_scope(ScopeKind::Catch, Some(scope));
                self.tree.node_scopes.insert(expr, inner);
                if let Some(binder) = catch {
                    self.declare(inner, binder.name, BindingKind::Catch, binder.span, None, None);
                }
                self.walk(*handler, inner);
            }
            _ => {
                for child in arena.children(expr) {
                    self.walk(child, scope);
                }
            }
        }
    }

    fn bind_clause(
        &mut self,
        parent: ScopeId,
        binder: Binder,
        kind: BindingKind,
        ty: Option<TypeName>,
        init: Option<ExprId>,
    ) -> ScopeId {
        let scope = self.new_scope(ScopeKind::ForClause, Some(parent));
        self.declare(scope, binder.name, kind, binder.span, ty, init);
        scope
    }

    fn walk_pattern_values(&mut self, pattern: &Pattern, scope: ScopeId) {
        match &pattern.kind {
            PatternKind::Value(value) => self.walk(*value, scope),
            PatternKind::List(items) => {
                for item in items {
                    self.walk_pattern_values(item, scope);
                }
            }
            PatternKind::Default | PatternKind::Capture(_) | PatternKind::Type { .. } => {}
        }
    }
}
