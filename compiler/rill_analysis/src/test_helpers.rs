//! Parsing fixtures shared by the pass tests.
#![allow(clippy::unwrap_used)]

use rill_diagnostic::{AnalysisError, ErrorCode};
use rill_ir::ast::{ExprArena, ExprId, ExprKind, Module};
use rill_ir::{Name, NativeCatalog, StringInterner};

use crate::{Analysis, AnalysisInput, Root};

/// Natives the fixtures pretend the host provides.
pub struct TestNatives;

impl NativeCatalog for TestNatives {
    fn has_native(&self, name: &str) -> bool {
        matches!(name, "math.abs" | "core.size")
    }
}

pub struct Fixture {
    pub arena: ExprArena,
    pub interner: StringInterner,
    pub modules: Vec<Module>,
    pub allow_natives: Vec<bool>,
    pub expr: Option<ExprId>,
}

/// Parse units given as `(name, source)`; imports name units directly.
pub fn modules(units: &[(&str, &str)]) -> Fixture {
    let interner = StringInterner::new();
    let mut arena = ExprArena::new();
    let mut modules = Vec::new();
    let mut base = 0u32;
    for (name, source) in units {
        let module =
            rill_parse::parse_module_source(source, (*name).into(), base, &interner, &mut arena)
                .unwrap_or_else(|errors| panic!("{name} does not parse: {errors:?}"));
        modules.push(module);
        base += u32::try_from(source.len()).unwrap() + 1;
    }
    Fixture {
        arena,
        interner,
        allow_natives: vec![true; modules.len()],
        modules,
        expr: None,
    }
}

pub fn expression(source: &str) -> Fixture {
    let interner = StringInterner::new();
    let mut arena = ExprArena::new();
    let expr = rill_parse::parse_expression_source(source, 0, &interner, &mut arena)
        .unwrap_or_else(|errors| panic!("`{source}` does not parse: {errors:?}"));
    Fixture {
        arena,
        interner,
        modules: Vec::new(),
        allow_natives: vec![true],
        expr: Some(expr),
    }
}

impl Fixture {
    pub fn deny_natives(mut self) -> Self {
        self.allow_natives.iter_mut().for_each(|a| *a = false);
        self
    }

    pub fn input(&self) -> AnalysisInput<'_> {
        let root = match self.expr {
            Some(expr) => Root::Expression {
                expr,
                allow_natives: self.allow_natives[0],
            },
            None => Root::Modules {
                modules: &self.modules,
                allow_natives: &self.allow_natives,
            },
        };
        AnalysisInput {
            arena: &self.arena,
            interner: &self.interner,
            root,
            natives: &TestNatives,
        }
    }

    pub fn name(&self, text: &str) -> Name {
        self.interner.intern(text)
    }

    /// Identifier expressions spelled `dotted`, in allocation order.
    pub fn idents(&self, dotted: &str) -> Vec<ExprId> {
        self.arena
            .iter()
            .filter(|(_, expr)| match &expr.kind {
                ExprKind::Ident(path) => {
                    let text: Vec<_> = path
                        .segments
                        .iter()
                        .map(|n| self.interner.lookup(*n).to_string())
                        .collect();
                    text.join(".") == dotted
                }
                _ => false,
            })
            .map(|(id, _)| id)
            .collect()
    }

    pub fn ident(&self, dotted: &str) -> ExprId {
        self.idents(dotted)[0]
    }

    /// The `n`-th function literal in allocation order. Nested literals
    /// are allocated before the ones containing them.
    pub fn function(&self, n: usize) -> ExprId {
        self.arena
            .iter()
            .filter(|(_, e)| matches!(e.kind, ExprKind::Function(_)))
            .map(|(id, _)| id)
            .nth(n)
            .unwrap()
    }

    pub fn analyze(&self) -> Analysis {
        crate::analyze(&self.input()).unwrap_or_else(|errors| panic!("{errors:?}"))
    }

    pub fn errors(&self) -> Vec<AnalysisError> {
        crate::analyze(&self.input()).err().unwrap_or_default()
    }

    #[allow(dead_code)]
    pub fn codes(&self) -> Vec<ErrorCode> {
        self.errors().iter().map(AnalysisError::code).collect()
    }
}
