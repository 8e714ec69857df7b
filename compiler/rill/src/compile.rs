//! The compilation pipeline.
//!
//! ```text
//! load ─► parse ─► analyze ─► lower ─► fold ─► specialize ─► Runtime
//! ```
//!
//! Units are loaded breadth-first from the requested paths through their
//! imports. Every phase collects all of its diagnostics; the pipeline
//! stops after the first phase that reports any.

use std::collections::VecDeque;
use std::sync::Arc;

use rill_analysis::{Analysis, AnalysisInput, Root};
use rill_diagnostic::{AnalysisError, CompileError, Diagnostic, ParseError};
use rill_eval::{
    noop_handler, InterpreterBuilder, NativeRegistry, SharedDebugHandler, DEFAULT_MAX_CALL_DEPTH,
};
use rill_ir::ast::{ExprArena, Module};
use rill_ir::ops::Program;
use rill_ir::{SharedInterner, SourceMap, Span};
use rill_value::Value;
use rustc_hash::FxHashSet;
use tracing::{debug, instrument};

use crate::load::{resolve_import, LoadPath};
use crate::runtime::{ModuleInfo, Runtime};
use crate::{Error, RuntimeError};

/// Unit name given to standalone expressions.
pub const EXPRESSION_UNIT: &str = "<eval>";

/// Knobs of the pipeline and the resulting interpreter.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CompileOptions {
    /// Evaluate constant subtrees ahead of time.
    pub fold: bool,
    /// Give operators over statically known kinds a fast path.
    pub specialize: bool,
    /// Calls allowed on the evaluation stack.
    pub max_call_depth: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            fold: true,
            specialize: true,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

/// Compiles units and expressions with one native registry, debug handler
/// and set of options.
#[derive(Clone)]
pub struct Compiler {
    natives: Arc<NativeRegistry>,
    handler: SharedDebugHandler,
    options: CompileOptions,
}

impl Default for Compiler {
    fn default() -> Self {
        Compiler {
            natives: Arc::new(NativeRegistry::with_defaults()),
            handler: noop_handler(),
            options: CompileOptions::default(),
        }
    }
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn natives(mut self, natives: impl Into<Arc<NativeRegistry>>) -> Self {
        self.natives = natives.into();
        self
    }

    #[must_use]
    pub fn debug_handler(mut self, handler: SharedDebugHandler) -> Self {
        self.handler = handler;
        self
    }

    #[must_use]
    pub fn options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    /// Load every unit reachable from `paths` and compile them into one
    /// runtime.
    #[instrument(level = "debug", skip(self, load_path))]
    pub fn compile(&self, load_path: &LoadPath, paths: &[&str]) -> Result<Runtime, CompileError> {
        let interner = SharedInterner::new();
        let mut arena = ExprArena::new();
        let mut source_map = SourceMap::new();
        let loaded = load_units(load_path, paths, &interner, &mut arena, &mut source_map)?;

        let input = AnalysisInput {
            arena: &arena,
            interner: &interner,
            root: Root::Modules {
                modules: &loaded.modules,
                allow_natives: &loaded.allow_natives,
            },
            natives: &*self.natives,
        };
        let analysis = analyze(&input, &source_map)?;
        let program = self.lower(&input, &analysis);

        let modules = ModuleInfo::collect(&loaded.modules, &interner);
        let interpreter = self.interpreter(program, interner);
        Ok(Runtime::new(
            interpreter,
            source_map,
            analysis.metadata,
            modules,
        ))
    }

    /// Compile `text` as a standalone expression and evaluate it.
    #[instrument(level = "debug", skip(self, text))]
    pub fn evaluate(&self, text: &str, allow_native_functions: bool) -> Result<Value, Error> {
        let interner = SharedInterner::new();
        let mut arena = ExprArena::new();
        let mut source_map = SourceMap::new();
        let base = source_map.add(EXPRESSION_UNIT, text);

        let expr = rill_parse::parse_expression_source(text, base, &interner, &mut arena)
            .map_err(|errors| parse_failure(&errors, &source_map))?;
        let input = AnalysisInput {
            arena: &arena,
            interner: &interner,
            root: Root::Expression {
                expr,
                allow_natives: allow_native_functions,
            },
            natives: &*self.natives,
        };
        let analysis = analyze(&input, &source_map)?;
        let program = self.lower(&input, &analysis);

        self.interpreter(program, interner)
            .eval_entry()
            .map_err(|error| RuntimeError::new(error, &source_map).into())
    }

    fn lower(&self, input: &AnalysisInput<'_>, analysis: &Analysis) -> Program {
        let mut program = rill_canon::lower(input, analysis);
        if self.options.fold {
            program = rill_canon::fold(&program);
        }
        if self.options.specialize {
            program = rill_canon::specialize(&program);
        }
        program
    }

    fn interpreter(&self, program: Program, interner: SharedInterner) -> rill_eval::Interpreter {
        InterpreterBuilder::new(Arc::new(program), interner)
            .natives(Arc::clone(&self.natives))
            .debug_handler(Arc::clone(&self.handler))
            .max_call_depth(self.options.max_call_depth)
            .build()
    }
}

/// Parsed units in load order, with the native policy of the location
/// each one came from.
struct LoadedUnits {
    modules: Vec<Module>,
    allow_natives: Vec<bool>,
}

#[instrument(level = "debug", skip_all)]
fn load_units(
    load_path: &LoadPath,
    paths: &[&str],
    interner: &SharedInterner,
    arena: &mut ExprArena,
    source_map: &mut SourceMap,
) -> Result<LoadedUnits, CompileError> {
    let mut loaded = LoadedUnits {
        modules: Vec::new(),
        allow_natives: Vec::new(),
    };
    let mut diagnostics = Vec::new();
    let mut seen: FxHashSet<Arc<str>> = FxHashSet::default();
    // Unit name and the span of the import that asked for it.
    let mut queue: VecDeque<(Arc<str>, Option<Span>)> = VecDeque::new();

    for path in paths {
        let name: Arc<str> = Arc::from(*path);
        if seen.insert(Arc::clone(&name)) {
            queue.push_back((name, None));
        }
    }

    while let Some((name, requested_at)) = queue.pop_front() {
        let unit = match load_path.resolve(&name) {
            Ok(unit) => unit,
            Err(err) => {
                let at = requested_at.map(|span| (span, &*source_map));
                diagnostics.push(Diagnostic::from_load(&err, at));
                continue;
            }
        };

        let base = source_map.add(Arc::clone(&unit.name), Arc::clone(&unit.source));
        let mut module = match rill_parse::parse_module_source(
            &unit.source,
            Arc::clone(&unit.name),
            base,
            interner,
            arena,
        ) {
            Ok(module) => module,
            Err(errors) => {
                diagnostics.extend(errors.iter().map(|e| Diagnostic::from_parse(e, &*source_map)));
                continue;
            }
        };

        for import in &mut module.imports {
            import.target = resolve_import(&unit.name, &import.source);
            if seen.insert(Arc::clone(&import.target)) {
                queue.push_back((Arc::clone(&import.target), Some(import.span)));
            }
        }
        debug!(unit = %unit.name, imports = module.imports.len(), "unit parsed");
        loaded.modules.push(module);
        loaded.allow_natives.push(unit.allow_native_functions);
    }

    if diagnostics.is_empty() {
        Ok(loaded)
    } else {
        Err(CompileError::new(diagnostics))
    }
}

fn analyze(input: &AnalysisInput<'_>, source_map: &SourceMap) -> Result<Analysis, CompileError> {
    rill_analysis::analyze(input).map_err(|errors| analysis_failure(&errors, source_map))
}

fn parse_failure(errors: &[ParseError], source_map: &SourceMap) -> CompileError {
    CompileError::new(
        errors
            .iter()
            .map(|e| Diagnostic::from_parse(e, source_map))
            .collect(),
    )
}

fn analysis_failure(errors: &[AnalysisError], source_map: &SourceMap) -> CompileError {
    CompileError::new(
        errors
            .iter()
            .map(|e| Diagnostic::from_analysis(e, source_map))
            .collect(),
    )
}
