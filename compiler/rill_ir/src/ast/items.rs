//! Module-level items.

use std::sync::Arc;

use super::ExprId;
use crate::{Name, Span, TypeName};

/// One parsed unit.
#[derive(Clone, Debug, PartialEq)]
pub struct Module {
    /// Canonical unit name, as resolved through the load path.
    pub unit: Arc<str>,
    pub doc: Option<ExprId>,
    pub meta: Option<ExprId>,
    pub imports: Vec<Import>,
    pub libraries: Vec<Library>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Import {
    /// Path as written.
    pub source: Arc<str>,
    /// Canonical name of the imported unit. The parser copies `source`; the
    /// loader rewrites it once relative paths are resolved.
    pub target: Arc<str>,
    pub members: Vec<ImportMember>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ImportMember {
    /// `import lib [as alias] from ...`
    Library {
        name: Name,
        alias: Option<Name>,
        span: Span,
    },
    /// `import * as alias from ...`
    Module { alias: Name, span: Span },
}

impl ImportMember {
    /// Name the member is bound to in the importing module.
    pub fn local_name(&self) -> Name {
        match self {
            ImportMember::Library { name, alias, .. } => alias.unwrap_or(*name),
            ImportMember::Module { alias, .. } => *alias,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            ImportMember::Library { span, .. } | ImportMember::Module { span, .. } => *span,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Library {
    pub name: Name,
    pub name_span: Span,
    pub exported: bool,
    pub doc: Option<ExprId>,
    pub meta: Option<ExprId>,
    pub vars: Vec<VarDef>,
    pub span: Span,
}

/// `[doc ..] [meta ..] [TYPE] name: init;`, used both for library vars and
/// `let` bindings.
#[derive(Clone, Debug, PartialEq)]
pub struct VarDef {
    pub name: Name,
    pub name_span: Span,
    pub ty: Option<TypeName>,
    pub init: ExprId,
    pub doc: Option<ExprId>,
    pub meta: Option<ExprId>,
    pub span: Span,
}
