//! Grammar productions.
//!
//! - `mod.rs`: units, imports, libraries and variable definitions
//! - `expr.rs`: operator precedence and postfix forms
//! - `primary.rs`: literals, paths and keyword-led expressions
//! - `pattern.rs`: `match` patterns

mod expr;
mod pattern;
mod primary;

use std::sync::Arc;

use rill_diagnostic::ParseError;
use rill_ir::ast::{ExprId, Import, ImportMember, Library, Module, VarDef};
use rill_ir::{Span, TypeName};
use rill_lexer::TokenKind;

use crate::Parser;

/// `doc` and `meta` annotations preceding a declaration.
#[derive(Default)]
struct Annotations {
    doc: Option<ExprId>,
    meta: Option<ExprId>,
}

impl Parser<'_> {
    pub(crate) fn parse_module(&mut self, unit: Arc<str>) -> Result<Module, ParseError> {
        let start = self.cursor.span();

        let mut pending = self.parse_annotations()?;
        let mut module_doc = None;
        let mut module_meta = None;
        if self.cursor.eat(TokenKind::Module) {
            self.cursor.expect(TokenKind::Semicolon)?;
            module_doc = pending.doc.take();
            module_meta = pending.meta.take();
        }

        let mut imports = Vec::new();
        while self.cursor.check(TokenKind::Import) {
            if pending.doc.is_some() || pending.meta.is_some() {
                return Err(self.cursor.unexpected("`module` or `library` after annotations"));
            }
            imports.push(self.parse_import()?);
        }

        let mut libraries = Vec::new();
        loop {
            let annotations = if pending.doc.is_some() || pending.meta.is_some() {
                std::mem::take(&mut pending)
            } else {
                self.parse_annotations()?
            };
            if self.cursor.is_at_end() {
                if annotations.doc.is_some() || annotations.meta.is_some() {
                    return Err(self.cursor.unexpected("`library`"));
                }
                break;
            }
            libraries.push(self.parse_library(annotations)?);
        }

        let end = self.cursor.span();
        Ok(Module {
            unit,
            doc: module_doc,
            meta: module_meta,
            imports,
            libraries,
            span: start.to(end),
        })
    }

    fn parse_annotations(&mut self) -> Result<Annotations, ParseError> {
        let mut annotations = Annotations::default();
        if self.cursor.eat(TokenKind::Doc) {
            annotations.doc = Some(self.parse_primary()?);
        }
        if self.cursor.eat(TokenKind::Meta) {
            annotations.meta = Some(self.parse_primary()?);
        }
        Ok(annotations)
    }

    /// `import a, b as c from "path";` or `import * as m from "path";`
    fn parse_import(&mut self) -> Result<Import, ParseError> {
        let start = self.cursor.expect(TokenKind::Import)?.span;
        let mut members = Vec::new();

        if self.cursor.eat(TokenKind::Star) {
            let star = self.cursor.previous_span();
            self.cursor.expect(TokenKind::As)?;
            let (alias, alias_span) = self.cursor.expect_ident()?;
            members.push(ImportMember::Module {
                alias,
                span: star.to(alias_span),
            });
        } else {
            loop {
                let (name, name_span) = self.cursor.expect_ident()?;
                let mut span = name_span;
                let alias = if self.cursor.eat(TokenKind::As) {
                    let (alias, alias_span) = self.cursor.expect_ident()?;
                    span = span.to(alias_span);
                    Some(alias)
                } else {
                    None
                };
                members.push(ImportMember::Library { name, alias, span });
                if !self.cursor.eat(TokenKind::Comma) {
                    break;
                }
            }
        }

        self.cursor.expect(TokenKind::From)?;
        let source = match self.cursor.kind() {
            TokenKind::String(name) => {
                self.cursor.advance();
                self.string_of(name)
            }
            _ => return Err(self.cursor.unexpected("import path string")),
        };
        let end = self.cursor.expect(TokenKind::Semicolon)?.span;
        Ok(Import {
            target: Arc::clone(&source),
            source,
            members,
            span: start.to(end),
        })
    }

    /// `[export] library name { var_def* }`
    fn parse_library(&mut self, annotations: Annotations) -> Result<Library, ParseError> {
        let start = self.cursor.span();
        let exported = self.cursor.eat(TokenKind::Export);
        self.cursor.expect(TokenKind::Library)?;
        let (name, name_span) = self.cursor.expect_ident()?;
        let open = self.cursor.expect(TokenKind::LBrace)?.span;

        let mut vars = Vec::new();
        while !self.cursor.check(TokenKind::RBrace) && !self.cursor.is_at_end() {
            match self.parse_var_def() {
                Ok(var) => vars.push(var),
                Err(err) => {
                    self.errors.push(err);
                    self.cursor.synchronize();
                }
            }
        }
        let end = self.cursor.expect_closing(TokenKind::RBrace, open)?.span;

        Ok(Library {
            name,
            name_span,
            exported,
            doc: annotations.doc,
            meta: annotations.meta,
            vars,
            span: start.to(end),
        })
    }

    /// `[doc ..] [meta ..] [TYPE] name: init;`
    pub(crate) fn parse_var_def(&mut self) -> Result<VarDef, ParseError> {
        let annotations = self.parse_annotations()?;
        let start = self.cursor.span();
        let ty: Option<TypeName> = self.cursor.eat_type();
        let (name, name_span) = self.cursor.expect_ident()?;
        self.cursor.expect(TokenKind::Colon)?;
        let init = self.parse_expr()?;
        let end = self.cursor.expect(TokenKind::Semicolon)?.span;
        Ok(VarDef {
            name,
            name_span,
            ty,
            init,
            doc: annotations.doc,
            meta: annotations.meta,
            span: Span::to(start, end),
        })
    }
}
