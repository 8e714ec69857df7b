//! Parse, analyze and lower fixtures.
#![allow(clippy::unwrap_used)]

use rill_analysis::{AnalysisInput, Root};
use rill_ir::ast::ExprArena;
use rill_ir::ops::{FunctionDef, OpId, OpKind, Program};
use rill_ir::{NativeCatalog, StringInterner};

struct TestNatives;

impl NativeCatalog for TestNatives {
    fn has_native(&self, name: &str) -> bool {
        name == "strings.upper"
    }
}

pub struct Lowered {
    pub program: Program,
    pub interner: StringInterner,
}

impl Lowered {
    pub fn entry(&self) -> OpId {
        self.program.entry.unwrap()
    }

    pub fn kind(&self, op: OpId) -> &OpKind {
        &self.program.op(op).kind
    }

    /// Every op matching `pred`, in allocation order.
    pub fn ops(&self, pred: impl Fn(&OpKind) -> bool) -> Vec<&OpKind> {
        self.program
            .ops
            .iter()
            .map(|node| &node.kind)
            .filter(|kind| pred(kind))
            .collect()
    }

    pub fn closures(&self) -> Vec<&OpKind> {
        self.ops(|k| matches!(k, OpKind::MakeClosure { .. }))
    }

    pub fn function_named(&self, name: &str) -> &FunctionDef {
        let name = self.interner.intern(name);
        self.program
            .functions
            .iter()
            .find(|f| f.name == Some(name))
            .unwrap()
    }
}

pub fn expression(source: &str) -> Lowered {
    let interner = StringInterner::new();
    let mut arena = ExprArena::new();
    let expr = rill_parse::parse_expression_source(source, 0, &interner, &mut arena)
        .unwrap_or_else(|errors| panic!("`{source}` does not parse: {errors:?}"));
    let input = AnalysisInput {
        arena: &arena,
        interner: &interner,
        root: Root::Expression {
            expr,
            allow_natives: true,
        },
        natives: &TestNatives,
    };
    let analysis = rill_analysis::analyze(&input).unwrap_or_else(|errors| panic!("{errors:?}"));
    let program = crate::lower(&input, &analysis);
    Lowered { program, interner }
}

pub fn modules(units: &[(&str, &str)]) -> Lowered {
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
    let allow_natives = vec![true; modules.len()];
    let input = AnalysisInput {
        arena: &arena,
        interner: &interner,
        root: Root::Modules {
            modules: &modules,
            allow_natives: &allow_natives,
        },
        natives: &TestNatives,
    };
    let analysis = rill_analysis::analyze(&input).unwrap_or_else(|errors| panic!("{errors:?}"));
    let program = crate::lower(&input, &analysis);
    Lowered { program, interner }
}

/// Lower and fold `source`.
pub fn folded(source: &str) -> Lowered {
    let lowered = expression(source);
    Lowered {
        program: crate::fold(&lowered.program),
        interner: lowered.interner,
    }
}
