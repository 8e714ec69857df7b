//! `doc` and `meta` annotations.
//!
//! Annotations attach to modules, libraries, library vars and `let`
//! bindings. `doc` must be a string literal; `meta` any literal, including
//! lists and dicts built from literals. Both are converted to
//! [`ConstValue`]s here and never evaluated.

use std::collections::BTreeMap;
use std::sync::Arc;

use rill_diagnostic::{AnalysisError, AnalysisErrorKind};
use rill_ir::ast::{DictItem, ExprId, ExprKind, ListItem};
use rill_ir::{to_u32, ConstValue};
use rustc_hash::FxHashMap;
use tracing::instrument;

use crate::AnalysisInput;

/// What an annotation is attached to. Libraries and vars are addressed by
/// their position in the declaring module.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum MetaKey {
    Module { module: u32 },
    Library { module: u32, library: u32 },
    Var { module: u32, library: u32, var: u32 },
    LetBinding { node: ExprId, binding: u32 },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Metadata {
    pub doc: Option<Arc<str>>,
    pub meta: Option<ConstValue>,
}

#[derive(Clone, Debug, Default)]
pub struct MetadataTable {
    entries: FxHashMap<MetaKey, Metadata>,
}

impl MetadataTable {
    pub fn get(&self, key: MetaKey) -> Option<&Metadata> {
        self.entries.get(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[instrument(level = "debug", skip_all)]
pub fn analyze(input: &AnalysisInput<'_>) -> Result<MetadataTable, Vec<AnalysisError>> {
    let mut collector = Collector {
        input,
        table: MetadataTable::default(),
        errors: Vec::new(),
    };

    for (m, module) in input.modules().iter().enumerate() {
        let module_id = to_u32(m, "modules");
        collector.record(MetaKey::Module { module: module_id }, module.doc, module.meta);
        for (l, library) in module.libraries.iter().enumerate() {
            let library_id = to_u32(l, "libraries");
            collector.record(
                MetaKey::Library {
                    module: module_id,
                    library: library_id,
                },
                library.doc,
                library.meta,
            );
            for (v, var) in library.vars.iter().enumerate() {
                collector.record(
                    MetaKey::Var {
                        module: module_id,
                        library: library_id,
                        var: to_u32(v, "vars"),
                    },
                    var.doc,
                    var.meta,
                );
            }
        }
    }

    for (id, expr) in input.arena.iter() {
        if let ExprKind::Let { bindings, .. } = &expr.kind {
            for (i, var) in bindings.iter().enumerate() {
                collector.record(
                    MetaKey::LetBinding {
                        node: id,
                        binding: to_u32(i, "bindings"),
                    },
                    var.doc,
                    var.meta,
                );
            }
        }
    }

    if collector.errors.is_empty() {
        Ok(collector.table)
    } else {
        Err(collector.errors)
    }
}

struct Collector<'a, 'i> {
    input: &'a AnalysisInput<'i>,
    table: MetadataTable,
    errors: Vec<AnalysisError>,
}

impl Collector<'_, '_> {
    fn record(&mut self, key: MetaKey, doc: Option<ExprId>, meta: Option<ExprId>) {
        if doc.is_none() && meta.is_none() {
            return;
        }
        let doc = doc.and_then(|id| match &self.input.arena.get(id).kind {
            ExprKind::String(text) => Some(Arc::clone(text)),
            _ => {
                self.error(id, "doc must be a string literal".to_string());
                None
            }
        });
        let meta = meta.and_then(|id| match self.literal(id) {
            Ok(value) => Some(value),
            Err(reason) => {
                self.error(id, reason);
                None
            }
        });
        self.table.entries.insert(key, Metadata { doc, meta });
    }

    fn error(&mut self, id: ExprId, reason: String) {
        self.errors.push(AnalysisError::new(
            AnalysisErrorKind::InvalidMetadata { reason },
            self.input.arena.get(id).span,
        ));
    }

    fn literal(&self, id: ExprId) -> Result<ConstValue, String> {
        let value = match &self.input.arena.get(id).kind {
            ExprKind::Nil => ConstValue::Nil,
            ExprKind::Bool(b) => ConstValue::Boolean(*b),
            ExprKind::Long(n) => ConstValue::Long(*n),
            ExprKind::Double(d) => ConstValue::Double(*d),
            ExprKind::Decimal(d) => ConstValue::Decimal(*d),
            ExprKind::String(s) => ConstValue::String(Arc::clone(s)),
            ExprKind::DateTime(dt) => ConstValue::DateTime(*dt),
            ExprKind::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        ListItem::Expr(e) => out.push(self.literal(*e)?),
                        ListItem::Spread(_) => return Err("meta cannot contain spreads".into()),
                    }
                }
                ConstValue::List(out.into())
            }
            ExprKind::Dict(items) => {
                let mut out = BTreeMap::new();
                for item in items {
                    match item {
                        DictItem::Entry { key, value } => {
                            let ExprKind::String(key) = &self.input.arena.get(*key).kind else {
                                return Err("meta dict keys must be string literals".into());
                            };
                            out.insert(Arc::clone(key), self.literal(*value)?);
                        }
                        DictItem::Spread(_) => return Err("meta cannot contain spreads".into()),
                    }
                }
                ConstValue::Dict(Arc::new(out))
            }
            _ => return Err("meta must be a literal".into()),
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests;
