//! Primary expressions: literals, paths, delimited forms and keyword-led
//! expressions.

use rill_diagnostic::{ErrorCode, ParseError};
use rill_ir::ast::{
    Binder, DictItem, ExprId, ExprKind, ForClause, FunctionBody, FunctionExpr, ListItem, MatchArm,
    Param, Path,
};
use rill_lexer::TokenKind;
use smallvec::SmallVec;
use tracing::trace;

use crate::Parser;

/// Tokens that can begin an operand, used to tell `catch e handler` from
/// `catch handler`.
fn starts_operand(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Long(_)
            | TokenKind::Double(_)
            | TokenKind::Decimal(_)
            | TokenKind::String(_)
            | TokenKind::Symbol(_)
            | TokenKind::DateTime(_)
            | TokenKind::Ident(_)
            | TokenKind::Nil
            | TokenKind::True
            | TokenKind::False
            | TokenKind::LParen
            | TokenKind::LBracket
            | TokenKind::LBrace
            | TokenKind::Let
            | TokenKind::If
            | TokenKind::For
            | TokenKind::Match
            | TokenKind::Try
            | TokenKind::Throw
            | TokenKind::Debug
            | TokenKind::Bang
            | TokenKind::Not
            | TokenKind::TypeOf
    )
}

impl Parser<'_> {
    pub(crate) fn parse_primary(&mut self) -> Result<ExprId, ParseError> {
        let token = self.cursor.current();
        let literal = match token.kind {
            TokenKind::Long(n) => Some(ExprKind::Long(n)),
            TokenKind::Double(d) => Some(ExprKind::Double(d)),
            TokenKind::Decimal(d) => Some(ExprKind::Decimal(d)),
            TokenKind::DateTime(dt) => Some(ExprKind::DateTime(dt)),
            TokenKind::String(name) | TokenKind::Symbol(name) => {
                Some(ExprKind::String(self.string_of(name)))
            }
            TokenKind::Nil => Some(ExprKind::Nil),
            TokenKind::True => Some(ExprKind::Bool(true)),
            TokenKind::False => Some(ExprKind::Bool(false)),
            _ => None,
        };
        if let Some(kind) = literal {
            self.cursor.advance();
            return Ok(self.alloc(kind, token.span));
        }

        match token.kind {
            TokenKind::Ident(_) => self.parse_path(),
            TokenKind::LParen if !self.no_function_literal && self.at_function_literal() => {
                self.parse_function()
            }
            TokenKind::LParen => {
                let open = self.cursor.advance().span;
                let inner = self.with_loose_postfix(Parser::parse_expr)?;
                self.cursor.expect_closing(TokenKind::RParen, open)?;
                Ok(inner)
            }
            TokenKind::LBracket => self.parse_list(),
            TokenKind::LBrace => self.parse_dict(),
            TokenKind::Let => self.parse_let(),
            TokenKind::If => self.parse_if(),
            TokenKind::For => self.parse_for(),
            TokenKind::Match => self.parse_match(),
            TokenKind::Try => self.parse_try(),
            TokenKind::Throw | TokenKind::Debug => {
                let start = self.cursor.advance().span;
                let operand = self.parse_expr()?;
                let span = start.to(self.span_of(operand));
                let kind = if token.kind == TokenKind::Throw {
                    ExprKind::Throw(operand)
                } else {
                    ExprKind::Debug(operand)
                };
                Ok(self.alloc(kind, span))
            }
            _ => Err(ParseError::new(
                ErrorCode::E1002,
                format!("expected expression, found {}", token.kind),
                token.span,
            )),
        }
    }

    /// `a`, `lib.a`, `m.lib.a`
    fn parse_path(&mut self) -> Result<ExprId, ParseError> {
        let (head, start) = self.cursor.expect_ident()?;
        let mut segments: SmallVec<[rill_ir::Name; 2]> = SmallVec::new();
        segments.push(head);
        let mut end = start;
        while self.cursor.check(TokenKind::Dot)
            && matches!(self.cursor.peek_nth(1).kind, TokenKind::Ident(_))
        {
            self.cursor.advance();
            let (name, span) = self.cursor.expect_ident()?;
            segments.push(name);
            end = span;
        }
        Ok(self.alloc(ExprKind::Ident(Path { segments }), start.to(end)))
    }

    /// Whether the `(` at the cursor opens a parameter list, i.e. its
    /// matching `)` is followed by `->`.
    fn at_function_literal(&self) -> bool {
        let mut depth = 0usize;
        let mut n = 0;
        loop {
            match self.cursor.peek_nth(n).kind {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return self.cursor.peek_nth(n + 1).kind == TokenKind::Arrow;
                    }
                }
                TokenKind::Eof => return false,
                _ => {}
            }
            n += 1;
        }
    }

    /// `([TYPE] p [= default], ...) -> [TYPE] (body | via "native")`
    fn parse_function(&mut self) -> Result<ExprId, ParseError> {
        let open = self.cursor.expect(TokenKind::LParen)?.span;
        trace!("function literal");
        let params = self.with_loose_postfix(|p| {
            p.parse_comma_list(TokenKind::RParen, open, |p| {
                let start = p.cursor.span();
                let ty = p.cursor.eat_type();
                let (name, name_span) = p.cursor.expect_ident()?;
                let default = if p.cursor.eat(TokenKind::Assign) {
                    Some(p.parse_expr()?)
                } else {
                    None
                };
                let end = default.map_or(name_span, |d| p.span_of(d));
                Ok(Param {
                    name,
                    span: start.to(end),
                    ty,
                    default,
                })
            })
        })?;
        self.cursor.expect(TokenKind::Arrow)?;
        let return_type = self.cursor.eat_type();

        let (body, end) = if self.cursor.check(TokenKind::Via) {
            let via = self.cursor.advance().span;
            match self.cursor.kind() {
                TokenKind::String(name) => {
                    let end = self.cursor.advance().span;
                    let name = self.string_of(name);
                    (
                        FunctionBody::Native {
                            name,
                            span: via.to(end),
                        },
                        end,
                    )
                }
                _ => return Err(self.cursor.unexpected("native function name string")),
            }
        } else {
            let body = self.parse_expr()?;
            (FunctionBody::Expr(body), self.span_of(body))
        };

        let span = open.to(end);
        Ok(self.alloc(
            ExprKind::Function(Box::new(FunctionExpr {
                params,
                return_type,
                body,
                span,
            })),
            span,
        ))
    }

    /// `[a, ...xs]`
    fn parse_list(&mut self) -> Result<ExprId, ParseError> {
        let open = self.cursor.expect(TokenKind::LBracket)?.span;
        let items = self.with_loose_postfix(|p| {
            p.parse_comma_list(TokenKind::RBracket, open, |p| {
                if p.cursor.eat(TokenKind::Ellipsis) {
                    Ok(ListItem::Spread(p.parse_expr()?))
                } else {
                    Ok(ListItem::Expr(p.parse_expr()?))
                }
            })
        })?;
        let span = open.to(self.cursor.previous_span());
        Ok(self.alloc(ExprKind::List(items), span))
    }

    /// `{:k v, "k2" v2, ...d}`; commas between entries are optional.
    fn parse_dict(&mut self) -> Result<ExprId, ParseError> {
        let open = self.cursor.expect(TokenKind::LBrace)?.span;
        let items = self.with_loose_postfix(|p| {
            let mut items = Vec::new();
            while !p.cursor.check(TokenKind::RBrace) && !p.cursor.is_at_end() {
                if p.cursor.eat(TokenKind::Ellipsis) {
                    items.push(DictItem::Spread(p.parse_expr()?));
                } else {
                    p.tight_postfix = true;
                    let key = p.parse_postfix();
                    p.tight_postfix = false;
                    let key = key?;
                    let value = p.parse_expr()?;
                    items.push(DictItem::Entry { key, value });
                }
                p.cursor.eat(TokenKind::Comma);
            }
            p.cursor.expect_closing(TokenKind::RBrace, open)?;
            Ok(items)
        })?;
        let span = open.to(self.cursor.previous_span());
        Ok(self.alloc(ExprKind::Dict(items), span))
    }

    /// `let { var_def* } body`
    fn parse_let(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.expect(TokenKind::Let)?.span;
        let open = self.cursor.expect(TokenKind::LBrace)?.span;
        let bindings = self.with_loose_postfix(|p| {
            let mut bindings = Vec::new();
            while !p.cursor.check(TokenKind::RBrace) && !p.cursor.is_at_end() {
                bindings.push(p.parse_var_def()?);
            }
            p.cursor.expect_closing(TokenKind::RBrace, open)?;
            Ok(bindings)
        })?;
        let body = self.parse_expr()?;
        let span = start.to(self.span_of(body));
        Ok(self.alloc(ExprKind::Let { bindings, body }, span))
    }

    /// `if cond then a [else b]`
    fn parse_if(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.expect(TokenKind::If)?.span;
        let cond = self.parse_expr()?;
        self.cursor.expect(TokenKind::Then)?;
        let then_branch = self.parse_expr()?;
        let else_branch = if self.cursor.eat(TokenKind::Else) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        let end = self.span_of(else_branch.unwrap_or(then_branch));
        Ok(self.alloc(
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            },
            start.to(end),
        ))
    }

    /// `for x <- xs, y: x * 2, y > 0, body`
    fn parse_for(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.expect(TokenKind::For)?.span;
        let mut clauses = Vec::new();
        loop {
            let clause = self.parse_for_clause()?;
            let is_last = !self.cursor.eat(TokenKind::Comma);
            if is_last {
                let ForClause::Filter(body) = clause else {
                    return Err(self.cursor.unexpected("`,` and a comprehension body"));
                };
                if !matches!(clauses.first(), Some(ForClause::Generator { .. })) {
                    return Err(ParseError::new(
                        ErrorCode::E1001,
                        "a comprehension must start with a generator `x <- items`",
                        start,
                    ));
                }
                let span = start.to(self.span_of(body));
                return Ok(self.alloc(ExprKind::For { clauses, body }, span));
            }
            clauses.push(clause);
        }
    }

    fn parse_for_clause(&mut self) -> Result<ForClause, ParseError> {
        let typed = matches!(self.cursor.kind(), TokenKind::Type(_));
        let offset = usize::from(typed);
        let binds = matches!(self.cursor.peek_nth(offset).kind, TokenKind::Ident(_))
            && matches!(
                self.cursor.peek_nth(offset + 1).kind,
                TokenKind::LArrow | TokenKind::Colon
            );
        if !binds {
            return Ok(ForClause::Filter(self.parse_expr()?));
        }

        let ty = self.cursor.eat_type();
        let (name, span) = self.cursor.expect_ident()?;
        let binder = Binder { name, span };
        if self.cursor.eat(TokenKind::LArrow) {
            let source = self.parse_expr()?;
            Ok(ForClause::Generator { binder, ty, source })
        } else {
            self.cursor.expect(TokenKind::Colon)?;
            let init = self.parse_expr()?;
            Ok(ForClause::Local { binder, ty, init })
        }
    }

    /// `match subject pattern [, guard] -> body, ...`
    fn parse_match(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.expect(TokenKind::Match)?.span;
        let tight = std::mem::replace(&mut self.tight_postfix, true);
        let subject = self.parse_expr();
        self.tight_postfix = tight;
        let subject = subject?;

        let mut arms = Vec::new();
        loop {
            let pattern = self.parse_pattern()?;
            let guard = if self.cursor.eat(TokenKind::Comma) {
                let no_fn = std::mem::replace(&mut self.no_function_literal, true);
                let guard = self.parse_expr();
                self.no_function_literal = no_fn;
                Some(guard?)
            } else {
                None
            };
            self.cursor.expect(TokenKind::Arrow)?;
            let body = self.parse_expr()?;
            let span = pattern.span.to(self.span_of(body));
            arms.push(MatchArm {
                pattern,
                guard,
                body,
                span,
            });
            if !self.cursor.eat(TokenKind::Comma) {
                break;
            }
        }

        let end = arms.last().map_or(start, |arm| arm.span);
        Ok(self.alloc(ExprKind::Match { subject, arms }, start.to(end)))
    }

    /// `try body catch [e] handler`
    fn parse_try(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.expect(TokenKind::Try)?.span;
        let body = self.parse_expr()?;
        self.cursor.expect(TokenKind::Catch)?;
        let catch = match self.cursor.kind() {
            TokenKind::Ident(name) if starts_operand(self.cursor.peek_nth(1).kind) => {
                let span = self.cursor.advance().span;
                Some(Binder { name, span })
            }
            _ => None,
        };
        let handler = self.parse_expr()?;
        let span = start.to(self.span_of(handler));
        Ok(self.alloc(
            ExprKind::Try {
                body,
                catch,
                handler,
            },
            span,
        ))
    }
}
