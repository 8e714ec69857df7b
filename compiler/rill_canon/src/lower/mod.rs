//! Syntax tree to operation tree.
//!
//! Every `ExprKind` maps to one `OpKind` (an `if` without `else` gains a
//! `nil` constant). Identifier reads are turned into addressing modes using
//! the analysis tables:
//!
//! | Binding                                   | Op                      |
//! |-------------------------------------------|-------------------------|
//! | library var                               | `LibraryVar`            |
//! | declared inside the current function      | `Local { depth, slot }` |
//! | outer `let` binding                       | `CapturedSlot`          |
//! | any other outer binding                   | `Capture`               |
//!
//! `depth` counts the runtime frames between the use site and the frame
//! holding the binding; it follows [`ScopeTree::frame_depth`], so the
//! evaluator must push exactly one frame per frame scope.

mod expr;
mod types;

use std::sync::Arc;

use rill_analysis::{
    Analysis, AnalysisInput, BindingKind, Capture, ClosureInfo, Root, ScopeId, ScopeTree,
};
use rill_ir::ast::{ExprId, ExprKind, FunctionBody, FunctionExpr, VarDef};
use rill_ir::ops::{
    CaptureLoad, FunctionCode, FunctionDef, FunctionFlags, LibraryCode, LibraryVarCode, OpId,
    OpKind, ParamDef, Program,
};
use rill_ir::{to_u32, Name, TypeName};
use tracing::{debug, instrument};

static NO_CAPTURES: ClosureInfo = ClosureInfo {
    captures: Vec::new(),
    uses_libraries: false,
};

/// Lower an analyzed compilation.
///
/// Module roots produce one [`LibraryCode`] per library, in global library
/// order; an expression root produces the program's `entry`.
#[instrument(level = "debug", skip_all)]
pub fn lower(input: &AnalysisInput<'_>, analysis: &Analysis) -> Program {
    let mut lowerer = Lowerer {
        input,
        scopes: &analysis.scopes,
        analysis,
        program: Program::new(),
        function: None,
    };

    match input.root {
        Root::Modules { modules, .. } => {
            for module in modules {
                for library in &module.libraries {
                    let vars = library
                        .vars
                        .iter()
                        .map(|var| lowerer.lower_var(var))
                        .collect();
                    lowerer.program.libraries.push(LibraryCode {
                        module: Arc::clone(&module.unit),
                        name: library.name,
                        exported: library.exported,
                        vars,
                    });
                }
            }
        }
        Root::Expression { expr, .. } => {
            let entry = lowerer.lower_expr(expr);
            lowerer.program.entry = Some(entry);
        }
    }

    debug!(
        ops = lowerer.program.ops.len(),
        functions = lowerer.program.functions.len(),
        libraries = lowerer.program.libraries.len(),
        "lowered"
    );
    lowerer.program
}

/// The function literal whose body is being lowered.
#[derive(Copy, Clone)]
struct FunctionContext<'a> {
    scope: ScopeId,
    info: &'a ClosureInfo,
}

struct Lowerer<'a, 'i> {
    input: &'a AnalysisInput<'i>,
    analysis: &'a Analysis,
    scopes: &'a ScopeTree,
    program: Program,
    function: Option<FunctionContext<'a>>,
}

impl<'a> Lowerer<'a, '_> {
    fn lower_var(&mut self, var: &VarDef) -> LibraryVarCode {
        LibraryVarCode {
            name: var.name,
            init: self.lower_named(var.init, var.name),
            ty: var.ty,
            span: var.name_span,
        }
    }

    fn lower_expr(&mut self, id: ExprId) -> OpId {
        rill_stack::with_stack(|| self.lower_expr_inner(id))
    }

    /// Lower the initializer of a named binding; function literals take the
    /// binding's name.
    fn lower_named(&mut self, id: ExprId, name: Name) -> OpId {
        let arena = self.input.arena;
        match &arena.get(id).kind {
            ExprKind::Function(func) => self.lower_function(id, func, Some(name)),
            _ => self.lower_expr(id),
        }
    }

    fn scope_of(&self, id: ExprId) -> ScopeId {
        self.scopes
            .scope_of(id)
            .unwrap_or_else(|| panic!("expression {id:?} was not placed in a scope"))
    }

    /// Whether code being lowered can reach `scope` through its own frames.
    fn is_local(&self, scope: ScopeId) -> bool {
        self.function
            .map_or(true, |f| self.scopes.is_within(scope, f.scope))
    }

    /// Index of `capture` in the closure being lowered.
    fn capture_index(&self, capture: Capture) -> u32 {
        self.function
            .and_then(|f| f.info.position(capture))
            .map(|i| to_u32(i, "captures"))
            .unwrap_or_else(|| panic!("{capture:?} is not captured by the enclosing function"))
    }

    /// Addressing mode and static type of an identifier.
    fn reference(&self, id: ExprId) -> (OpKind, TypeName) {
        let target = self
            .analysis
            .resolutions
            .get(id)
            .unwrap_or_else(|| panic!("identifier {id:?} is unresolved"));
        let binding = self.scopes.binding(target);
        let ty = binding.ty.unwrap_or(TypeName::Any);

        let kind = match binding.kind {
            BindingKind::LibraryVar { library } => OpKind::LibraryVar {
                library,
                slot: binding.slot,
            },
            _ if self.is_local(binding.scope) => OpKind::Local {
                depth: self.scopes.frame_depth(self.scope_of(id), binding.scope),
                slot: binding.slot,
            },
            BindingKind::Let => OpKind::CapturedSlot {
                capture: self.capture_index(Capture::Group(binding.scope)),
                slot: binding.slot,
            },
            _ => OpKind::Capture(self.capture_index(Capture::Value(target))),
        };
        (kind, ty)
    }

    fn lower_function(&mut self, id: ExprId, func: &FunctionExpr, name: Option<Name>) -> OpId {
        let site = self.scope_of(id);
        let defaults: Vec<Option<OpId>> = func
            .params
            .iter()
            .map(|p| p.default.map(|d| self.lower_expr(d)))
            .collect();

        let analysis = self.analysis;
        let info = analysis.closures.get(id).unwrap_or(&NO_CAPTURES);
        let captures: Vec<CaptureLoad> = info
            .captures
            .iter()
            .map(|capture| self.capture_load(*capture, site))
            .collect();

        let body = match &func.body {
            FunctionBody::Expr(body) => {
                let scope = self
                    .scopes
                    .node_scope(id)
                    .unwrap_or_else(|| panic!("function {id:?} has no scope"));
                let outer = self.function.replace(FunctionContext { scope, info });
                let op = self.lower_expr(*body);
                self.function = outer;
                FunctionCode::Op(op)
            }
            FunctionBody::Native { name, .. } => FunctionCode::Native(name.clone()),
        };

        let mut flags = FunctionFlags::empty();
        flags.set(FunctionFlags::NATIVE, matches!(body, FunctionCode::Native(_)));
        flags.set(FunctionFlags::USES_LIBRARIES, info.uses_libraries);
        flags.set(FunctionFlags::HAS_DEFAULTS, defaults.iter().any(Option::is_some));
        flags.set(FunctionFlags::CAPTURES, !captures.is_empty());

        let function = self.program.push_function(FunctionDef {
            name,
            params: func
                .params
                .iter()
                .map(|p| ParamDef {
                    name: p.name,
                    ty: p.ty,
                })
                .collect(),
            return_type: func.return_type,
            body,
            capture_count: to_u32(captures.len(), "captures"),
            flags,
            span: func.span,
        });

        self.program.push_op(
            OpKind::MakeClosure {
                function,
                captures,
                defaults,
            },
            self.input.arena.get(id).span,
            TypeName::Function,
        )
    }

    /// How the closure created at `site` loads `capture`.
    fn capture_load(&self, capture: Capture, site: ScopeId) -> CaptureLoad {
        let scope = match capture {
            Capture::Value(binding) => self.scopes.binding(binding).scope,
            Capture::Group(scope) => scope,
        };
        if !self.is_local(scope) {
            return CaptureLoad::Capture(self.capture_index(capture));
        }
        let depth = self.scopes.frame_depth(site, scope);
        match capture {
            Capture::Value(binding) => CaptureLoad::LocalValue {
                depth,
                slot: self.scopes.binding(binding).slot,
            },
            Capture::Group(_) => CaptureLoad::LocalGroup { depth },
        }
    }
}
