//! Recursive descent parser for Rill.
//!
//! Produces the flat syntax tree of `rill_ir::ast`. All units of one
//! compilation allocate into the same [`ExprArena`], which the caller owns.
//!
//! Syntax errors inside a library body are recovered at the next `;` so one
//! pass reports every broken variable definition; errors elsewhere stop the
//! parse.

mod cursor;
mod grammar;

pub use cursor::Cursor;

use std::sync::Arc;

use rill_diagnostic::ParseError;
use rill_ir::ast::{Expr, ExprArena, ExprId, ExprKind, Module};
use rill_ir::{Span, StringInterner};
use rill_lexer::{TokenKind, TokenList};
use tracing::debug;

/// Parser state.
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    arena: &'a mut ExprArena,
    errors: Vec<ParseError>,
    /// Disables `(...) -> ...` function literals, for match patterns where
    /// `->` introduces the arm body.
    no_function_literal: bool,
    /// Stops postfix `(`/`[` that are separated from their operand by
    /// whitespace, for match subjects followed by a list pattern.
    tight_postfix: bool,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a TokenList, interner: &'a StringInterner, arena: &'a mut ExprArena) -> Self {
        Parser {
            cursor: Cursor::new(tokens, interner),
            arena,
            errors: Vec::new(),
            no_function_literal: false,
            tight_postfix: false,
        }
    }

    fn alloc(&mut self, kind: ExprKind, span: Span) -> ExprId {
        self.arena.alloc(Expr::new(kind, span))
    }

    fn span_of(&self, id: ExprId) -> Span {
        self.arena.get(id).span
    }

    fn string_of(&self, name: rill_ir::Name) -> Arc<str> {
        self.cursor.interner().lookup(name)
    }
}

/// Parse a complete unit.
pub fn parse_module(
    tokens: &TokenList,
    unit: Arc<str>,
    interner: &StringInterner,
    arena: &mut ExprArena,
) -> Result<Module, Vec<ParseError>> {
    debug!(%unit, tokens = tokens.len(), "parse module");
    let mut parser = Parser::new(tokens, interner, arena);
    match parser.parse_module(unit) {
        Ok(module) if parser.errors.is_empty() => Ok(module),
        Ok(_) => Err(parser.errors),
        Err(err) => {
            parser.errors.push(err);
            Err(parser.errors)
        }
    }
}

/// Parse a standalone expression that must span the whole input.
pub fn parse_expression(
    tokens: &TokenList,
    interner: &StringInterner,
    arena: &mut ExprArena,
) -> Result<ExprId, Vec<ParseError>> {
    let mut parser = Parser::new(tokens, interner, arena);
    let result = parser.parse_expr().and_then(|expr| {
        if parser.cursor.check(TokenKind::Eof) {
            Ok(expr)
        } else {
            Err(parser.cursor.unexpected("end of input"))
        }
    });
    result.map_err(|err| vec![err])
}

/// Lex and parse a unit whose text starts at global offset `base`.
pub fn parse_module_source(
    source: &str,
    unit: Arc<str>,
    base: u32,
    interner: &StringInterner,
    arena: &mut ExprArena,
) -> Result<Module, Vec<ParseError>> {
    let tokens = rill_lexer::lex(source, base, interner)?;
    parse_module(&tokens, unit, interner, arena)
}

/// Lex and parse a standalone expression.
pub fn parse_expression_source(
    source: &str,
    base: u32,
    interner: &StringInterner,
    arena: &mut ExprArena,
) -> Result<ExprId, Vec<ParseError>> {
    let tokens = rill_lexer::lex(source, base, interner)?;
    parse_expression(&tokens, interner, arena)
}

#[cfg(test)]
mod tests;
