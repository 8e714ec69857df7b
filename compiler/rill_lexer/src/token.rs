//! Token kinds produced by the lexer.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use rill_ir::{Name, Span, TypeName};
use rust_decimal::Decimal;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TokenKind {
    // Literals
    Long(i64),
    Double(f64),
    Decimal(Decimal),
    /// Interned string contents, escapes already processed.
    String(Name),
    /// `:key`, a string literal written as a symbol.
    Symbol(Name),
    DateTime(DateTime<FixedOffset>),
    Ident(Name),
    /// A type keyword such as `long` or `dict`.
    Type(TypeName),

    // Keywords
    Module,
    Import,
    Export,
    As,
    From,
    Library,
    Doc,
    Meta,
    Let,
    If,
    Then,
    Else,
    For,
    Match,
    Try,
    Catch,
    Throw,
    Debug,
    Via,
    Default,
    Nil,
    True,
    False,
    And,
    Or,
    Not,
    TypeOf,
    Is,

    // Delimiters
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Colon,
    Dot,
    DotDot,
    Ellipsis,
    At,
    Arrow,
    LArrow,
    Assign,

    // Operators
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    SlashSlash,
    Percent,
    EqEq,
    NotEq,
    EqEqEq,
    NotEqEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Bang,
    AmpAmp,
    PipePipe,

    Eof,
}

impl TokenKind {
    /// Human-readable description for error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Long(_) | TokenKind::Double(_) | TokenKind::Decimal(_) => "number",
            TokenKind::String(_) | TokenKind::Symbol(_) => "string",
            TokenKind::DateTime(_) => "datetime",
            TokenKind::Ident(_) => "identifier",
            TokenKind::Type(_) => "type name",
            TokenKind::Eof => "end of input",
            other => other.symbol(),
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            TokenKind::Module => "`module`",
            TokenKind::Import => "`import`",
            TokenKind::Export => "`export`",
            TokenKind::As => "`as`",
            TokenKind::From => "`from`",
            TokenKind::Library => "`library`",
            TokenKind::Doc => "`doc`",
            TokenKind::Meta => "`meta`",
            TokenKind::Let => "`let`",
            TokenKind::If => "`if`",
            TokenKind::Then => "`then`",
            TokenKind::Else => "`else`",
            TokenKind::For => "`for`",
            TokenKind::Match => "`match`",
            TokenKind::Try => "`try`",
            TokenKind::Catch => "`catch`",
            TokenKind::Throw => "`throw`",
            TokenKind::Debug => "`debug`",
            TokenKind::Via => "`via`",
            TokenKind::Default => "`default`",
            TokenKind::Nil => "`nil`",
            TokenKind::True => "`true`",
            TokenKind::False => "`false`",
            TokenKind::And => "`and`",
            TokenKind::Or => "`or`",
            TokenKind::Not => "`not`",
            TokenKind::TypeOf => "`typeof`",
            TokenKind::Is => "`is`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::Comma => "`,`",
            TokenKind::Semicolon => "`;`",
            TokenKind::Colon => "`:`",
            TokenKind::Dot => "`.`",
            TokenKind::DotDot => "`..`",
            TokenKind::Ellipsis => "`...`",
            TokenKind::At => "`@`",
            TokenKind::Arrow => "`->`",
            TokenKind::LArrow => "`<-`",
            TokenKind::Assign => "`=`",
            TokenKind::Plus => "`+`",
            TokenKind::Minus => "`-`",
            TokenKind::Star => "`*`",
            TokenKind::StarStar => "`**`",
            TokenKind::Slash => "`/`",
            TokenKind::SlashSlash => "`//`",
            TokenKind::Percent => "`%`",
            TokenKind::EqEq => "`==`",
            TokenKind::NotEq => "`!=`",
            TokenKind::EqEqEq => "`===`",
            TokenKind::NotEqEq => "`!==`",
            TokenKind::Lt => "`<`",
            TokenKind::LtEq => "`<=`",
            TokenKind::Gt => "`>`",
            TokenKind::GtEq => "`>=`",
            TokenKind::Bang => "`!`",
            TokenKind::AmpAmp => "`&&`",
            TokenKind::PipePipe => "`||`",
            _ => "token",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}
