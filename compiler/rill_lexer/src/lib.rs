//! Tokenizer for Rill source text.
//!
//! Built on `logos`. Identifiers and string contents are interned, and every
//! span is shifted by the unit's base offset so tokens of different units
//! never overlap (see [`rill_ir::SourceMap`]).

mod literal;
mod token;

pub use token::{Token, TokenKind};

use chrono::{DateTime, FixedOffset};
use logos::{FilterResult, Lexer, Logos};
use rill_diagnostic::{ErrorCode, ParseError};
use rill_ir::{to_u32, Span, StringInterner, TypeName};
use rust_decimal::Decimal;

use literal::{parse_datetime, parse_decimal, parse_double, parse_hex, parse_long, unescape, verbatim};

/// Why a token callback rejected its input.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LexErrorKind {
    #[default]
    Unrecognized,
    Number,
    Escape,
    DateTime,
    UnterminatedComment,
}

/// Skip a `/* ... */` comment. Comments do not nest.
fn block_comment(lex: &mut Lexer<'_, RawToken>) -> FilterResult<(), LexErrorKind> {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            FilterResult::Skip
        }
        None => {
            lex.bump(lex.remainder().len());
            FilterResult::Error(LexErrorKind::UnterminatedComment)
        }
    }
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(error = LexErrorKind)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"#[^\n]*")]
enum RawToken {
    #[token("/*", block_comment)]
    BlockComment,

    // === Literals ===
    #[regex(r"[0-9]+", |lex| parse_long(lex.slice()))]
    #[regex(r"0[xX][0-9a-fA-F]+", |lex| parse_hex(lex.slice()))]
    Long(i64),

    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?", |lex| parse_double(lex.slice()))]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+", |lex| parse_double(lex.slice()))]
    #[token("NaN", |_| f64::NAN)]
    #[token("Infinity", |_| f64::INFINITY)]
    Double(f64),

    #[regex(r"[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?[dD]", |lex| parse_decimal(lex.slice()))]
    Decimal(Decimal),

    #[regex(
        r"[0-9][0-9][0-9][0-9]-[0-9][0-9]-[0-9][0-9]T([0-9][0-9]:[0-9][0-9](:[0-9][0-9](\.[0-9]+)?)?)?(Z|[+-][0-9][0-9]:[0-9][0-9])?",
        |lex| parse_datetime(lex.slice())
    )]
    DateTime(DateTime<FixedOffset>),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| unescape(lex.slice()))]
    #[regex(r"'([^']|'')*'", |lex| verbatim(lex.slice()))]
    String(String),

    #[regex(r#""([^"\\]|\\.)*"#)]
    #[regex(r"'([^']|'')*")]
    UnterminatedString,

    #[regex(r":[a-zA-Z_][a-zA-Z0-9_]*")]
    Symbol,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    // === Type keywords ===
    #[token("any", |_| TypeName::Any)]
    #[token("void", |_| TypeName::Void)]
    #[token("boolean", |_| TypeName::Boolean)]
    #[token("long", |_| TypeName::Long)]
    #[token("double", |_| TypeName::Double)]
    #[token("decimal", |_| TypeName::Decimal)]
    #[token("string", |_| TypeName::String)]
    #[token("datetime", |_| TypeName::DateTime)]
    #[token("list", |_| TypeName::List)]
    #[token("dict", |_| TypeName::Dict)]
    #[token("function", |_| TypeName::Function)]
    Type(TypeName),

    // === Keywords ===
    #[token("module")]
    Module,
    #[token("import")]
    Import,
    #[token("export")]
    Export,
    #[token("as")]
    As,
    #[token("from")]
    From,
    #[token("library")]
    Library,
    #[token("doc")]
    Doc,
    #[token("meta")]
    Meta,
    #[token("let")]
    Let,
    #[token("if")]
    If,
    #[token("then")]
    Then,
    #[token("else")]
    Else,
    #[token("for")]
    For,
    #[token("match")]
    Match,
    #[token("try")]
    Try,
    #[token("catch")]
    Catch,
    #[token("throw")]
    Throw,
    #[token("debug")]
    Debug,
    #[token("via")]
    Via,
    #[token("default")]
    Default,
    #[token("nil")]
    Nil,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("and")]
    And,
    #[token("or")]
    Or,
    #[token("not")]
    Not,
    #[token("typeof")]
    TypeOf,
    #[token("is")]
    Is,

    // === Delimiters ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token("..")]
    DotDot,
    #[token("...")]
    Ellipsis,
    #[token("@")]
    At,
    #[token("->")]
    Arrow,
    #[token("<-")]
    LArrow,
    #[token("=")]
    Assign,

    // === Operators ===
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("**")]
    StarStar,
    #[token("/")]
    Slash,
    #[token("//")]
    SlashSlash,
    #[token("%")]
    Percent,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("===")]
    EqEqEq,
    #[token("!==")]
    NotEqEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("!")]
    Bang,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
}

/// Tokens of one unit, terminated by [`TokenKind::Eof`].
#[derive(Clone, Debug, Default)]
pub struct TokenList {
    pub tokens: Vec<Token>,
}

impl TokenList {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn kinds(&self) -> impl Iterator<Item = TokenKind> + '_ {
        self.tokens.iter().map(|t| t.kind)
    }
}

/// Tokenize `source`, whose first byte sits at global offset `base`.
///
/// Every lexical error is reported; lexing stops early only at an
/// unterminated string or comment, which swallows the rest of the unit.
pub fn lex(
    source: &str,
    base: u32,
    interner: &StringInterner,
) -> Result<TokenList, Vec<ParseError>> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut errors = Vec::new();
    let mut lexer = RawToken::lexer(source);

    while let Some(result) = lexer.next() {
        let range = lexer.span();
        let span = Span::new(to_u32(range.start, "bytes"), to_u32(range.end, "bytes")).offset(base);
        let slice = lexer.slice();

        let raw = match result {
            Ok(raw) => raw,
            Err(LexErrorKind::UnterminatedComment) => {
                errors.push(ParseError::new(
                    ErrorCode::E0006,
                    "unterminated block comment",
                    Span::at(span.start, 2),
                ));
                break;
            }
            Err(kind) => {
                errors.push(lex_error(kind, slice, span));
                continue;
            }
        };

        let kind = match raw {
            RawToken::UnterminatedString => {
                errors.push(ParseError::new(
                    ErrorCode::E0002,
                    "unterminated string literal",
                    span,
                ));
                break;
            }
            RawToken::Symbol => {
                let key = interner.intern(&slice[1..]);
                // `x:y` is a binding followed by an expression, not `x :y`.
                if ends_operand(tokens.last(), span.start) {
                    tokens.push(Token::new(TokenKind::Colon, Span::at(span.start, 1)));
                    tokens.push(Token::new(
                        TokenKind::Ident(key),
                        Span::new(span.start + 1, span.end),
                    ));
                    continue;
                }
                TokenKind::Symbol(key)
            }
            RawToken::String(s) => TokenKind::String(interner.intern(&s)),
            RawToken::Ident => TokenKind::Ident(interner.intern(slice)),
            other => convert(other),
        };
        tokens.push(Token::new(kind, span));
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    let end = base + to_u32(source.len(), "bytes");
    tokens.push(Token::new(TokenKind::Eof, Span::new(end, end)));
    Ok(TokenList { tokens })
}

/// Whether `prev` ends an operand and touches `start`.
fn ends_operand(prev: Option<&Token>, start: u32) -> bool {
    prev.is_some_and(|t| {
        t.span.end == start
            && matches!(
                t.kind,
                TokenKind::Ident(_) | TokenKind::RParen | TokenKind::RBracket
            )
    })
}

fn lex_error(kind: LexErrorKind, slice: &str, span: Span) -> ParseError {
    match kind {
        LexErrorKind::Number => {
            ParseError::new(ErrorCode::E0003, format!("invalid number `{slice}`"), span)
        }
        LexErrorKind::Escape => ParseError::new(
            ErrorCode::E0004,
            "invalid escape sequence in string literal",
            span,
        ),
        LexErrorKind::DateTime => {
            ParseError::new(ErrorCode::E0005, format!("invalid datetime `{slice}`"), span)
        }
        LexErrorKind::Unrecognized | LexErrorKind::UnterminatedComment => {
            ParseError::new(ErrorCode::E0001, format!("unexpected character `{slice}`"), span)
        }
    }
}

fn convert(raw: RawToken) -> TokenKind {
    match raw {
        RawToken::Long(n) => TokenKind::Long(n),
        RawToken::Double(d) => TokenKind::Double(d),
        RawToken::Decimal(d) => TokenKind::Decimal(d),
        RawToken::DateTime(dt) => TokenKind::DateTime(dt),
        RawToken::Type(t) => TokenKind::Type(t),
        RawToken::Module => TokenKind::Module,
        RawToken::Import => TokenKind::Import,
        RawToken::Export => TokenKind::Export,
        RawToken::As => TokenKind::As,
        RawToken::From => TokenKind::From,
        RawToken::Library => TokenKind::Library,
        RawToken::Doc => TokenKind::Doc,
        RawToken::Meta => TokenKind::Meta,
        RawToken::Let => TokenKind::Let,
        RawToken::If => TokenKind::If,
        RawToken::Then => TokenKind::Then,
        RawToken::Else => TokenKind::Else,
        RawToken::For => TokenKind::For,
        RawToken::Match => TokenKind::Match,
        RawToken::Try => TokenKind::Try,
        RawToken::Catch => TokenKind::Catch,
        RawToken::Throw => TokenKind::Throw,
        RawToken::Debug => TokenKind::Debug,
        RawToken::Via => TokenKind::Via,
        RawToken::Default => TokenKind::Default,
        RawToken::Nil => TokenKind::Nil,
        RawToken::True => TokenKind::True,
        RawToken::False => TokenKind::False,
        RawToken::And => TokenKind::And,
        RawToken::Or => TokenKind::Or,
        RawToken::Not => TokenKind::Not,
        RawToken::TypeOf => TokenKind::TypeOf,
        RawToken::Is => TokenKind::Is,
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Semicolon => TokenKind::Semicolon,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Dot => TokenKind::Dot,
        RawToken::DotDot => TokenKind::DotDot,
        RawToken::Ellipsis => TokenKind::Ellipsis,
        RawToken::At => TokenKind::At,
        RawToken::Arrow => TokenKind::Arrow,
        RawToken::LArrow => TokenKind::LArrow,
        RawToken::Assign => TokenKind::Assign,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::StarStar => TokenKind::StarStar,
        RawToken::Slash => TokenKind::Slash,
        RawToken::SlashSlash => TokenKind::SlashSlash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::EqEq => TokenKind::EqEq,
        RawToken::NotEq => TokenKind::NotEq,
        RawToken::EqEqEq => TokenKind::EqEqEq,
        RawToken::NotEqEq => TokenKind::NotEqEq,
        RawToken::Lt => TokenKind::Lt,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::Gt => TokenKind::Gt,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::Bang => TokenKind::Bang,
        RawToken::AmpAmp => TokenKind::AmpAmp,
        RawToken::PipePipe => TokenKind::PipePipe,
        // Handled by the caller, which needs the slice or the interner.
        RawToken::BlockComment
        | RawToken::UnterminatedString
        | RawToken::Symbol
        | RawToken::String(_)
        | RawToken::Ident => TokenKind::Eof,
    }
}

#[cfg(test)]
mod tests;
