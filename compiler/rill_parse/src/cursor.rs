//! Token cursor.

use rill_diagnostic::{ErrorCode, ParseError};
use rill_ir::{Name, Span, StringInterner, TypeName};
use rill_lexer::{Token, TokenKind, TokenList};
use tracing::trace;

/// Position in a token stream with one-token consumption and arbitrary
/// lookahead. The stream always ends with `Eof`, which is never consumed.
pub struct Cursor<'a> {
    tokens: &'a [Token],
    interner: &'a StringInterner,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(tokens: &'a TokenList, interner: &'a StringInterner) -> Self {
        Cursor {
            tokens: &tokens.tokens,
            interner,
            pos: 0,
        }
    }

    pub fn interner(&self) -> &'a StringInterner {
        self.interner
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn current(&self) -> Token {
        self.peek_nth(0)
    }

    #[inline]
    pub fn kind(&self) -> TokenKind {
        self.current().kind
    }

    #[inline]
    pub fn span(&self) -> Span {
        self.current().span
    }

    /// The token `n` positions ahead, clamped to `Eof`.
    pub fn peek_nth(&self, n: usize) -> Token {
        let idx = (self.pos + n).min(self.tokens.len().saturating_sub(1));
        self.tokens
            .get(idx)
            .copied()
            .unwrap_or(Token::new(TokenKind::Eof, Span::DUMMY))
    }

    /// Span of the most recently consumed token.
    pub fn previous_span(&self) -> Span {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map_or(Span::DUMMY, |t| t.span)
    }

    pub fn is_at_end(&self) -> bool {
        self.kind() == TokenKind::Eof
    }

    pub fn advance(&mut self) -> Token {
        let token = self.current();
        if token.kind != TokenKind::Eof {
            trace!(?token.kind, "advance");
            self.pos += 1;
        }
        token
    }

    #[inline]
    pub fn check(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    /// Consume the current token if it is `kind`.
    pub fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(kind.describe()))
        }
    }

    /// Expect a closing delimiter that pairs with the token at `open`.
    pub fn expect_closing(&mut self, kind: TokenKind, open: Span) -> Result<Token, ParseError> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        if self.is_at_end() {
            return Err(ParseError::new(
                ErrorCode::E1003,
                format!("unclosed delimiter, expected {}", kind.describe()),
                open,
            ));
        }
        Err(self.unexpected(kind.describe()))
    }

    pub fn expect_ident(&mut self) -> Result<(Name, Span), ParseError> {
        match self.kind() {
            TokenKind::Ident(name) => {
                let span = self.advance().span;
                Ok((name, span))
            }
            _ => Err(ParseError::new(
                ErrorCode::E1004,
                format!("expected identifier, found {}", self.kind()),
                self.span(),
            )),
        }
    }

    pub fn eat_type(&mut self) -> Option<TypeName> {
        if let TokenKind::Type(ty) = self.kind() {
            self.advance();
            Some(ty)
        } else {
            None
        }
    }

    pub fn expect_type(&mut self) -> Result<TypeName, ParseError> {
        self.eat_type()
            .ok_or_else(|| self.unexpected("type name"))
    }

    /// "expected X, found Y" at the current token.
    pub fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::new(
            ErrorCode::E1001,
            format!("expected {expected}, found {}", self.kind()),
            self.span(),
        )
    }

    /// Skip to just past the next `;`, or to a closing `}` or the end.
    pub fn synchronize(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.kind() {
                TokenKind::Eof => return,
                TokenKind::Semicolon if depth == 0 => {
                    self.advance();
                    return;
                }
                TokenKind::RBrace if depth == 0 => return,
                TokenKind::LBrace | TokenKind::LParen | TokenKind::LBracket => depth += 1,
                TokenKind::RBrace | TokenKind::RParen | TokenKind::RBracket => {
                    depth = depth.saturating_sub(1);
                }
                _ => {}
            }
            self.advance();
        }
    }
}
