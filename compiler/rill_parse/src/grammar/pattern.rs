//! `match` patterns.

use rill_diagnostic::{ErrorCode, ParseError};
use rill_ir::ast::{Binder, Pattern, PatternKind};
use rill_lexer::TokenKind;

use crate::Parser;

impl Parser<'_> {
    /// `default`, `@x`, `TYPE [@x]`, `[p, ...]`, or an expression.
    pub(crate) fn parse_pattern(&mut self) -> Result<Pattern, ParseError> {
        let start = self.cursor.span();
        match self.cursor.kind() {
            TokenKind::Default => {
                self.cursor.advance();
                Ok(Pattern {
                    kind: PatternKind::Default,
                    span: start,
                })
            }
            TokenKind::At => {
                let binder = self.parse_capture()?;
                Ok(Pattern {
                    kind: PatternKind::Capture(binder),
                    span: start.to(binder.span),
                })
            }
            TokenKind::Type(ty) => {
                self.cursor.advance();
                let capture = if self.cursor.check(TokenKind::At) {
                    Some(self.parse_capture()?)
                } else {
                    None
                };
                let end = capture.map_or(start, |b| b.span);
                Ok(Pattern {
                    kind: PatternKind::Type { ty, capture },
                    span: start.to(end),
                })
            }
            TokenKind::LBracket => {
                let open = self.cursor.advance().span;
                let items = self.parse_comma_list(TokenKind::RBracket, open, Parser::parse_pattern)?;
                Ok(Pattern {
                    kind: PatternKind::List(items),
                    span: open.to(self.cursor.previous_span()),
                })
            }
            _ => {
                let no_fn = std::mem::replace(&mut self.no_function_literal, true);
                let value = self.parse_expr();
                self.no_function_literal = no_fn;
                let value = value.map_err(|err| {
                    if err.code == ErrorCode::E1002 {
                        ParseError::new(
                            ErrorCode::E1005,
                            format!("expected pattern, found {}", self.cursor.kind()),
                            err.span,
                        )
                    } else {
                        err
                    }
                })?;
                Ok(Pattern {
                    kind: PatternKind::Value(value),
                    span: self.span_of(value),
                })
            }
        }
    }

    /// `@name`
    fn parse_capture(&mut self) -> Result<Binder, ParseError> {
        let at = self.cursor.expect(TokenKind::At)?.span;
        let (name, span) = self.cursor.expect_ident()?;
        Ok(Binder {
            name,
            span: at.to(span),
        })
    }
}
