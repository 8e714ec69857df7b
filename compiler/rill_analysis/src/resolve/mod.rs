//! Reference resolution.
//!
//! Every identifier expression is bound to the declaration it names. Plain
//! names are looked up along the scope chain; qualified names go through a
//! library, an imported library or a module alias:
//!
//! ```text
//! x            value in scope
//! lib.x        library `lib` declared or imported in this unit
//! m.lib.x      exported library `lib` of the unit imported as `m`
//! ```
//!
//! The pass also checks import members against the exporting unit and
//! `via` bodies against the native catalog.

use rill_diagnostic::{AnalysisError, AnalysisErrorKind};
use rill_ir::ast::{ExprId, ExprKind, FunctionBody, ImportMember, Path};
use rill_ir::{Name, Span};
use tracing::instrument;

use crate::scope::{BindingId, BindingKind, ScopeId, ScopeTree};
use crate::AnalysisInput;

/// Identifier expression to binding.
#[derive(Clone, Debug, Default)]
pub struct Resolutions {
    targets: Vec<Option<BindingId>>,
    count: usize,
}

impl Resolutions {
    pub fn get(&self, expr: ExprId) -> Option<BindingId> {
        self.targets.get(expr.index()).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    fn insert(&mut self, expr: ExprId, binding: BindingId) {
        self.targets[expr.index()] = Some(binding);
        self.count += 1;
    }
}

#[instrument(level = "debug", skip_all)]
pub fn resolve(
    input: &AnalysisInput<'_>,
    scopes: &ScopeTree,
) -> Result<Resolutions, Vec<AnalysisError>> {
    let mut resolver = Resolver {
        input,
        scopes,
        resolutions: Resolutions {
            targets: vec![None; input.arena.len()],
            count: 0,
        },
        errors: Vec::new(),
    };

    resolver.check_imports();

    for (id, expr) in input.arena.iter() {
        let Some(scope) = scopes.scope_of(id) else {
            continue;
        };
        match &expr.kind {
            ExprKind::Ident(path) => match resolver.resolve_path(scope, path) {
                Ok(binding) => resolver.resolutions.insert(id, binding),
                Err(kind) => resolver.errors.push(AnalysisError::new(kind, expr.span)),
            },
            ExprKind::Function(func) => {
                if let FunctionBody::Native { name, span } = &func.body {
                    resolver.check_native(scope, name, *span);
                }
            }
            _ => {}
        }
    }

    if resolver.errors.is_empty() {
        Ok(resolver.resolutions)
    } else {
        Err(resolver.errors)
    }
}

struct Resolver<'a, 'i> {
    input: &'a AnalysisInput<'i>,
    scopes: &'a ScopeTree,
    resolutions: Resolutions,
    errors: Vec<AnalysisError>,
}

impl Resolver<'_, '_> {
    fn text(&self, name: Name) -> String {
        self.input.interner.lookup(name).to_string()
    }

    fn dotted(&self, path: &Path) -> String {
        path.segments
            .iter()
            .map(|n| self.text(*n))
            .collect::<Vec<_>>()
            .join(".")
    }

    fn unresolved(&self, path: &Path) -> AnalysisErrorKind {
        AnalysisErrorKind::UnresolvedReference {
            name: self.dotted(path),
        }
    }

    fn resolve_path(&self, scope: ScopeId, path: &Path) -> Result<BindingId, AnalysisErrorKind> {
        let head = self
            .scopes
            .lookup(scope, path.head())
            .ok_or_else(|| self.unresolved(path))?;
        let kind = self.scopes.binding(head).kind;
        let rest = &path.segments[1..];

        if kind.is_value() {
            return if rest.is_empty() {
                Ok(head)
            } else {
                Err(self.unresolved(path))
            };
        }
        if rest.is_empty() {
            return Err(AnalysisErrorKind::InvalidReference {
                name: self.text(path.head()),
                what: kind.describe(),
            });
        }

        let (library, rest) = match kind {
            BindingKind::Library { library } => (Some(library), rest),
            BindingKind::Import { module, library } => (
                module.and_then(|m| self.exported_library(m as usize, library)),
                rest,
            ),
            BindingKind::ModuleAlias { module } => {
                if rest.len() == 1 {
                    return Err(AnalysisErrorKind::InvalidReference {
                        name: self.dotted(path),
                        what: "library",
                    });
                }
                (
                    module.and_then(|m| self.exported_library(m as usize, rest[0])),
                    &rest[1..],
                )
            }
            _ => (None, rest),
        };

        match (library, rest) {
            (Some(library), [var]) => self
                .scopes
                .scope(self.scopes.library_scope(library))
                .get(*var)
                .ok_or_else(|| self.unresolved(path)),
            _ => Err(self.unresolved(path)),
        }
    }

    /// Global index of the exported library `name` of `module`.
    fn exported_library(&self, module: usize, name: Name) -> Option<u32> {
        self.input.modules()[module]
            .libraries
            .iter()
            .position(|lib| lib.exported && lib.name == name)
            .map(|position| self.scopes.library_index(module, position))
    }

    fn check_imports(&mut self) {
        for module in self.input.modules() {
            for import in &module.imports {
                let target = self.input.module_index(&import.target);
                for member in &import.members {
                    let ImportMember::Library { name, span, .. } = member else {
                        continue;
                    };
                    let found = target.and_then(|m| self.exported_library(m, *name));
                    if found.is_none() {
                        let name = format!("{}.{}", import.source, self.text(*name));
                        self.errors.push(AnalysisError::new(
                            AnalysisErrorKind::UnresolvedReference { name },
                            *span,
                        ));
                    }
                }
            }
        }
    }

    fn check_native(&mut self, scope: ScopeId, name: &str, span: Span) {
        let module = self.scopes.module_of(scope);
        let kind = if !self.input.natives_allowed(module) {
            AnalysisErrorKind::NativeAccessDenied {
                name: name.to_string(),
            }
        } else if !self.input.natives.has_native(name) {
            AnalysisErrorKind::UnresolvedReference {
                name: name.to_string(),
            }
        } else {
            return;
        };
        self.errors.push(AnalysisError::new(kind, span));
    }
}
