//! A compiled set of units, ready to be queried and evaluated.
//!
//! Library variables are evaluated on first access and cached, so reading
//! the same variable twice runs its initializer once. A [`Runtime`] is
//! `Send + Sync`; several threads may read from it at once.

use std::fmt;
use std::sync::Arc;

use rill_analysis::{MetaKey, Metadata, MetadataTable};
use rill_eval::{Interpreter, SharedDebugHandler};
use rill_ir::ast::Module;
use rill_ir::{to_u32, SharedInterner, SourceMap};
use rill_value::{EvalResult, Value};

use crate::{Error, RuntimeError};

/// Names of one compiled unit and where its libraries live in the program.
#[derive(Clone, Debug)]
pub(crate) struct ModuleInfo {
    unit: Arc<str>,
    libraries: Vec<LibraryInfo>,
}

#[derive(Clone, Debug)]
struct LibraryInfo {
    name: Arc<str>,
    /// Index into `program.libraries`.
    index: usize,
    exported: bool,
    vars: Vec<Arc<str>>,
}

impl ModuleInfo {
    /// Libraries are lowered in module order, so program indices are a
    /// running count over `modules`.
    pub(crate) fn collect(modules: &[Module], interner: &SharedInterner) -> Vec<ModuleInfo> {
        let mut index = 0;
        modules
            .iter()
            .map(|module| ModuleInfo {
                unit: Arc::clone(&module.unit),
                libraries: module
                    .libraries
                    .iter()
                    .map(|library| {
                        let info = LibraryInfo {
                            name: interner.lookup(library.name),
                            index,
                            exported: library.exported,
                            vars: library
                                .vars
                                .iter()
                                .map(|var| interner.lookup(var.name))
                                .collect(),
                        };
                        index += 1;
                        info
                    })
                    .collect(),
            })
            .collect()
    }
}

/// Fully qualified name of an exported variable.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    pub module: Arc<str>,
    pub library: Arc<str>,
    pub var: Arc<str>,
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}.{}", self.module, self.library, self.var)
    }
}

pub struct Runtime {
    interpreter: Interpreter,
    source_map: SourceMap,
    metadata: MetadataTable,
    modules: Vec<ModuleInfo>,
}

impl Runtime {
    pub(crate) fn new(
        interpreter: Interpreter,
        source_map: SourceMap,
        metadata: MetadataTable,
        modules: Vec<ModuleInfo>,
    ) -> Self {
        Runtime {
            interpreter,
            source_map,
            metadata,
            modules,
        }
    }

    pub fn source_map(&self) -> &SourceMap {
        &self.source_map
    }

    pub fn debug_handler(&self) -> &SharedDebugHandler {
        self.interpreter.debug_handler()
    }

    pub fn modules(&self) -> impl Iterator<Item = ModuleRef<'_>> {
        (0..self.modules.len()).map(move |index| ModuleRef {
            runtime: self,
            index,
        })
    }

    pub fn module(&self, name: &str) -> Option<ModuleRef<'_>> {
        self.modules().find(|module| module.name() == name)
    }

    /// Value of `var` in the exported `library` of `module`.
    pub fn get(&self, module: &str, library: &str, var: &str) -> Result<Value, Error> {
        self.exported_var(module, library, var)?.value()
    }

    /// Call the function stored in an exported variable.
    pub fn call(
        &self,
        module: &str,
        library: &str,
        var: &str,
        args: &[Value],
    ) -> Result<Value, Error> {
        let function = self.get(module, library, var)?;
        self.call_function(&function, args)
    }

    /// Call a function value obtained from this runtime.
    pub fn call_function(&self, function: &Value, args: &[Value]) -> Result<Value, Error> {
        self.located(self.interpreter.call(function, args))
    }

    /// Every variable of every exported library, sorted.
    pub fn exported_names(&self) -> Vec<QualifiedName> {
        let mut names: Vec<QualifiedName> = self
            .modules()
            .flat_map(|module| module.libraries().filter(LibraryRef::is_exported))
            .flat_map(|library| {
                library.vars().map(move |var| QualifiedName {
                    module: Arc::clone(&library.module_info().unit),
                    library: Arc::clone(&library.info().name),
                    var: Arc::clone(var.name()),
                })
            })
            .collect();
        names.sort();
        names
    }

    fn exported_var(&self, module: &str, library: &str, var: &str) -> Result<VarRef<'_>, Error> {
        let not_found = |name: String| Error::NotFound { name };
        let module_ref = self
            .module(module)
            .ok_or_else(|| not_found(module.to_string()))?;
        let library_ref = module_ref
            .library(library)
            .ok_or_else(|| not_found(format!("{module}::{library}")))?;
        if !library_ref.is_exported() {
            return Err(Error::NotExported {
                name: format!("{module}::{library}"),
            });
        }
        library_ref
            .var(var)
            .ok_or_else(|| not_found(format!("{module}::{library}.{var}")))
    }

    fn located(&self, result: EvalResult) -> Result<Value, Error> {
        result.map_err(|error| RuntimeError::new(error, &self.source_map).into())
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("modules", &self.modules.len())
            .field("ops", &self.interpreter.program().ops.len())
            .finish_non_exhaustive()
    }
}

/// A unit of a [`Runtime`].
#[derive(Copy, Clone)]
pub struct ModuleRef<'a> {
    runtime: &'a Runtime,
    index: usize,
}

impl<'a> ModuleRef<'a> {
    fn info(&self) -> &'a ModuleInfo {
        &self.runtime.modules[self.index]
    }

    pub fn name(&self) -> &'a str {
        &self.info().unit
    }

    pub fn metadata(&self) -> Option<&'a Metadata> {
        self.runtime.metadata.get(MetaKey::Module {
            module: to_u32(self.index, "modules"),
        })
    }

    /// Libraries in declaration order, exported or not.
    pub fn libraries(&self) -> impl Iterator<Item = LibraryRef<'a>> {
        let (runtime, module) = (self.runtime, self.index);
        (0..self.info().libraries.len()).map(move |position| LibraryRef {
            runtime,
            module,
            position,
        })
    }

    pub fn library(&self, name: &str) -> Option<LibraryRef<'a>> {
        self.libraries().find(|library| library.name() == name)
    }
}

/// A library of a [`Runtime`].
#[derive(Copy, Clone)]
pub struct LibraryRef<'a> {
    runtime: &'a Runtime,
    module: usize,
    /// Position within the module.
    position: usize,
}

impl<'a> LibraryRef<'a> {
    fn module_info(&self) -> &'a ModuleInfo {
        &self.runtime.modules[self.module]
    }

    fn info(&self) -> &'a LibraryInfo {
        &self.module_info().libraries[self.position]
    }

    pub fn name(&self) -> &'a str {
        &self.info().name
    }

    pub fn module_name(&self) -> &'a str {
        &self.module_info().unit
    }

    pub fn is_exported(&self) -> bool {
        self.info().exported
    }

    pub fn metadata(&self) -> Option<&'a Metadata> {
        self.runtime.metadata.get(MetaKey::Library {
            module: to_u32(self.module, "modules"),
            library: to_u32(self.position, "libraries"),
        })
    }

    pub fn vars(&self) -> impl Iterator<Item = VarRef<'a>> {
        let library = *self;
        (0..self.info().vars.len()).map(move |slot| VarRef { library, slot })
    }

    pub fn var(&self, name: &str) -> Option<VarRef<'a>> {
        self.vars().find(|var| &**var.name() == name)
    }
}

/// A library variable of a [`Runtime`].
#[derive(Copy, Clone)]
pub struct VarRef<'a> {
    library: LibraryRef<'a>,
    slot: usize,
}

impl<'a> VarRef<'a> {
    pub fn name(&self) -> &'a Arc<str> {
        &self.library.info().vars[self.slot]
    }

    pub fn library(&self) -> LibraryRef<'a> {
        self.library
    }

    pub fn metadata(&self) -> Option<&'a Metadata> {
        self.library.runtime.metadata.get(MetaKey::Var {
            module: to_u32(self.library.module, "modules"),
            library: to_u32(self.library.position, "libraries"),
            var: to_u32(self.slot, "vars"),
        })
    }

    /// Evaluate the variable, or return its cached value.
    pub fn value(&self) -> Result<Value, Error> {
        let runtime = self.library.runtime;
        let index = self.library.info().index;
        runtime.located(runtime.interpreter.library_var(index, self.slot))
    }

    /// Call the function the variable holds.
    pub fn call(&self, args: &[Value]) -> Result<Value, Error> {
        let function = self.value()?;
        self.library.runtime.call_function(&function, args)
    }
}
