//! Mapping from global byte offsets back to `unit:line:column`.
//!
//! Every unit of a compilation is registered once; it receives a base offset
//! and the lexer adds that base to all of its spans. A single `Span` therefore
//! identifies both the unit and the position inside it, which keeps AST and
//! operation nodes small.

use std::fmt;
use std::sync::Arc;

use crate::{to_u32, Span};

/// A source location as reported to hosts.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    /// Unit name the location belongs to.
    pub unit: Arc<str>,
    /// 1-based line.
    pub line: u32,
    /// 1-based column, counted in characters.
    pub column: u32,
}

impl SourceLocation {
    pub fn new(unit: impl Into<Arc<str>>, line: u32, column: u32) -> Self {
        SourceLocation {
            unit: unit.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.unit, self.line, self.column)
    }
}

/// One registered unit.
#[derive(Debug)]
pub struct SourceFile {
    name: Arc<str>,
    text: Arc<str>,
    base: u32,
    /// Offsets (relative to `base`) at which each line starts.
    line_starts: Vec<u32>,
}

impl SourceFile {
    fn new(name: Arc<str>, text: Arc<str>, base: u32) -> Self {
        let mut line_starts = vec![0];
        for (i, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(to_u32(i + 1, "source bytes"));
            }
        }
        SourceFile {
            name,
            text,
            base,
            line_starts,
        }
    }

    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Global offset of the first byte of this unit.
    pub fn base(&self) -> u32 {
        self.base
    }

    /// End of this unit's offset range (exclusive).
    pub fn end(&self) -> u32 {
        self.base + to_u32(self.text.len(), "source bytes")
    }

    fn locate(&self, offset: u32) -> SourceLocation {
        let local = offset.saturating_sub(self.base);
        let line_idx = match self.line_starts.binary_search(&local) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        };
        let line_start = self.line_starts[line_idx] as usize;
        let end = (local as usize).min(self.text.len());
        let column = self
            .text
            .get(line_start..end)
            .map_or(end.saturating_sub(line_start), |s| s.chars().count());
        SourceLocation {
            unit: Arc::clone(&self.name),
            line: to_u32(line_idx + 1, "lines"),
            column: to_u32(column + 1, "columns"),
        }
    }
}

/// All units of one compilation.
#[derive(Debug, Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

impl SourceMap {
    pub fn new() -> Self {
        SourceMap::default()
    }

    /// Register a unit and return its base offset.
    ///
    /// Units are separated by one unused byte so an empty unit still owns a
    /// distinct offset.
    pub fn add(&mut self, name: impl Into<Arc<str>>, text: impl Into<Arc<str>>) -> u32 {
        let base = self.files.last().map_or(0, |f| f.end() + 1);
        self.files
            .push(SourceFile::new(name.into(), text.into(), base));
        base
    }

    /// The unit containing `offset`.
    pub fn file_at(&self, offset: u32) -> Option<&SourceFile> {
        let idx = self.files.partition_point(|f| f.base <= offset);
        idx.checked_sub(1).map(|i| &self.files[i])
    }

    /// Look up a unit by name.
    pub fn file(&self, name: &str) -> Option<&SourceFile> {
        self.files.iter().find(|f| &*f.name == name)
    }

    /// Location of the start of `span`.
    pub fn locate(&self, span: Span) -> Option<SourceLocation> {
        self.file_at(span.start).map(|f| f.locate(span.start))
    }

    /// Like [`locate`](Self::locate), falling back to `unknown:0:0`.
    pub fn locate_or_unknown(&self, span: Span) -> SourceLocation {
        self.locate(span)
            .unwrap_or_else(|| SourceLocation::new("<unknown>", 0, 0))
    }

    /// Source text covered by `span`.
    pub fn snippet(&self, span: Span) -> Option<&str> {
        let file = self.file_at(span.start)?;
        let start = (span.start - file.base) as usize;
        let end = (span.end.saturating_sub(file.base)) as usize;
        file.text.get(start..end)
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }
}

#[cfg(test)]
mod tests;
