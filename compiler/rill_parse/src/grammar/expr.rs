//! Operators: binary precedence climbing, prefix, cast and postfix forms.

use rill_diagnostic::ParseError;
use rill_ir::ast::{ExprId, ExprKind};
use rill_ir::{BinaryOp, UnaryOp};
use rill_lexer::TokenKind;

use crate::Parser;

/// Binding power of `is TYPE`, between comparison and concatenation.
const IS_POWER: u8 = 9;

/// `(left, right)` binding powers; right associative operators have the
/// larger power on the left.
fn infix_power(kind: TokenKind) -> Option<(BinaryOp, u8, u8)> {
    let (op, left, right) = match kind {
        TokenKind::PipePipe | TokenKind::Or => (BinaryOp::Or, 1, 2),
        TokenKind::AmpAmp | TokenKind::And => (BinaryOp::And, 3, 4),
        TokenKind::EqEq => (BinaryOp::Eq, 5, 6),
        TokenKind::NotEq => (BinaryOp::NotEq, 5, 6),
        TokenKind::EqEqEq => (BinaryOp::StrictEq, 5, 6),
        TokenKind::NotEqEq => (BinaryOp::StrictNotEq, 5, 6),
        TokenKind::Lt => (BinaryOp::Lt, 7, 8),
        TokenKind::LtEq => (BinaryOp::LtEq, 7, 8),
        TokenKind::Gt => (BinaryOp::Gt, 7, 8),
        TokenKind::GtEq => (BinaryOp::GtEq, 7, 8),
        TokenKind::DotDot => (BinaryOp::Concat, 11, 12),
        TokenKind::Plus => (BinaryOp::Add, 13, 14),
        TokenKind::Minus => (BinaryOp::Sub, 13, 14),
        TokenKind::Star => (BinaryOp::Mul, 15, 16),
        TokenKind::Slash => (BinaryOp::Div, 15, 16),
        TokenKind::SlashSlash => (BinaryOp::IntDiv, 15, 16),
        TokenKind::Percent => (BinaryOp::Mod, 15, 16),
        TokenKind::StarStar => (BinaryOp::Pow, 18, 17),
        _ => return None,
    };
    Some((op, left, right))
}

impl Parser<'_> {
    /// Parse a full expression.
    pub(crate) fn parse_expr(&mut self) -> Result<ExprId, ParseError> {
        rill_stack::with_stack(|| self.parse_binary(0))
    }

    fn parse_binary(&mut self, min_power: u8) -> Result<ExprId, ParseError> {
        let mut left = self.parse_unary()?;

        loop {
            let kind = self.cursor.kind();
            if kind == TokenKind::Is {
                if IS_POWER < min_power {
                    break;
                }
                self.cursor.advance();
                let ty = self.cursor.expect_type()?;
                let span = self.span_of(left).to(self.cursor.previous_span());
                left = self.alloc(ExprKind::Is { operand: left, ty }, span);
                continue;
            }

            let Some((op, left_power, right_power)) = infix_power(kind) else {
                break;
            };
            if left_power < min_power {
                break;
            }
            self.cursor.advance();
            let right = rill_stack::with_stack(|| self.parse_binary(right_power))?;
            let span = self.span_of(left).to(self.span_of(right));
            left = self.alloc(ExprKind::Binary { op, left, right }, span);
        }

        Ok(left)
    }

    /// `- ! not typeof` prefixes.
    fn parse_unary(&mut self) -> Result<ExprId, ParseError> {
        let op = match self.cursor.kind() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Bang | TokenKind::Not => UnaryOp::Not,
            TokenKind::TypeOf => UnaryOp::TypeOf,
            _ => return self.parse_cast(),
        };
        let start = self.cursor.advance().span;
        let operand = rill_stack::with_stack(|| self.parse_unary())?;

        // Negative numeric literals stay single literal nodes.
        if op == UnaryOp::Neg {
            let negated = match &self.arena.get(operand).kind {
                ExprKind::Long(n) => Some(ExprKind::Long(n.wrapping_neg())),
                ExprKind::Double(d) => Some(ExprKind::Double(-d)),
                ExprKind::Decimal(d) => Some(ExprKind::Decimal(-*d)),
                _ => None,
            };
            if let Some(kind) = negated {
                let span = start.to(self.span_of(operand));
                return Ok(self.alloc(kind, span));
            }
        }

        let span = start.to(self.span_of(operand));
        Ok(self.alloc(ExprKind::Unary { op, operand }, span))
    }

    /// `expr as TYPE`
    fn parse_cast(&mut self) -> Result<ExprId, ParseError> {
        let mut expr = self.parse_postfix()?;
        while self.cursor.eat(TokenKind::As) {
            let ty = self.cursor.expect_type()?;
            let span = self.span_of(expr).to(self.cursor.previous_span());
            expr = self.alloc(ExprKind::Cast { operand: expr, ty }, span);
        }
        Ok(expr)
    }

    /// Calls `f(a, b)` and indexing `x[k]`.
    pub(crate) fn parse_postfix(&mut self) -> Result<ExprId, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            let token = self.cursor.current();
            if self.tight_postfix && token.span.start != self.cursor.previous_span().end {
                break;
            }
            match token.kind {
                TokenKind::LParen => {
                    let open = self.cursor.advance().span;
                    let args = self.with_loose_postfix(|p| {
                        p.parse_comma_list(TokenKind::RParen, open, Parser::parse_expr)
                    })?;
                    let span = self.span_of(expr).to(self.cursor.previous_span());
                    expr = self.alloc(ExprKind::Call { callee: expr, args }, span);
                }
                TokenKind::LBracket => {
                    let open = self.cursor.advance().span;
                    let key = self.with_loose_postfix(Parser::parse_expr)?;
                    let close = self.cursor.expect_closing(TokenKind::RBracket, open)?.span;
                    let span = self.span_of(expr).to(close);
                    expr = self.alloc(ExprKind::Index { target: expr, key }, span);
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    /// Items separated by commas up to `close`; a trailing comma is allowed.
    pub(crate) fn parse_comma_list<T>(
        &mut self,
        close: TokenKind,
        open: rill_ir::Span,
        mut item: impl FnMut(&mut Self) -> Result<T, ParseError>,
    ) -> Result<Vec<T>, ParseError> {
        let mut items = Vec::new();
        while !self.cursor.check(close) {
            if self.cursor.is_at_end() {
                break;
            }
            items.push(item(self)?);
            if !self.cursor.eat(TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect_closing(close, open)?;
        Ok(items)
    }

    /// Run `f` with postfix and function-literal restrictions lifted, for
    /// nested delimited contexts.
    pub(crate) fn with_loose_postfix<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let tight = std::mem::replace(&mut self.tight_postfix, false);
        let no_fn = std::mem::replace(&mut self.no_function_literal, false);
        let result = f(self);
        self.tight_postfix = tight;
        self.no_function_literal = no_fn;
        result
    }
}
