#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;

fn kinds(src: &str) -> (Vec<TokenKind>, StringInterner) {
    let interner = StringInterner::new();
    let tokens = lex(src, 0, &interner).unwrap();
    (tokens.kinds().collect(), interner)
}

#[test]
fn lexes_operators_longest_first() {
    let (tokens, _) = kinds("a === b !== c // d ** e ... f .. g");
    let ops: Vec<TokenKind> = tokens
        .into_iter()
        .filter(|k| !matches!(k, TokenKind::Ident(_) | TokenKind::Eof))
        .collect();
    assert_eq!(
        ops,
        vec![
            TokenKind::EqEqEq,
            TokenKind::NotEqEq,
            TokenKind::SlashSlash,
            TokenKind::StarStar,
            TokenKind::Ellipsis,
            TokenKind::DotDot,
        ]
    );
}

#[test]
fn lexes_numbers() {
    let (tokens, _) = kinds("42 0x2a 1.5 1e3 2.5d NaN");
    assert_eq!(tokens[0], TokenKind::Long(42));
    assert_eq!(tokens[1], TokenKind::Long(42));
    assert_eq!(tokens[2], TokenKind::Double(1.5));
    assert_eq!(tokens[3], TokenKind::Double(1000.0));
    assert_eq!(tokens[4], TokenKind::Decimal(Decimal::new(25, 1)));
    assert!(matches!(tokens[5], TokenKind::Double(d) if d.is_nan()));
}

#[test]
fn lexes_strings_and_symbols() {
    let (tokens, interner) = kinds(r#""a\tb" 'it''s' :key"#);
    let text = |k: &TokenKind| match k {
        TokenKind::String(n) | TokenKind::Symbol(n) => interner.lookup(*n).to_string(),
        other => panic!("not a string: {other:?}"),
    };
    assert_eq!(text(&tokens[0]), "a\tb");
    assert_eq!(text(&tokens[1]), "it's");
    assert!(matches!(tokens[2], TokenKind::Symbol(_)));
    assert_eq!(text(&tokens[2]), "key");
}

#[test]
fn splits_symbols_that_follow_an_identifier() {
    let (tokens, interner) = kinds("x:y");
    assert_eq!(tokens.len(), 4);
    assert!(matches!(tokens[0], TokenKind::Ident(_)));
    assert_eq!(tokens[1], TokenKind::Colon);
    assert_eq!(tokens[2], TokenKind::Ident(interner.intern("y")));
}

#[test]
fn lexes_datetimes() {
    let (tokens, _) = kinds("2024-01-31T10:00:00Z 2024-01-31T 2024-01-31T10:30+02:00");
    let TokenKind::DateTime(a) = tokens[0] else {
        panic!("expected datetime")
    };
    assert_eq!(a.to_rfc3339(), "2024-01-31T10:00:00+00:00");
    let TokenKind::DateTime(b) = tokens[1] else {
        panic!("expected datetime")
    };
    assert_eq!(b.to_rfc3339(), "2024-01-31T00:00:00+00:00");
    let TokenKind::DateTime(c) = tokens[2] else {
        panic!("expected datetime")
    };
    assert_eq!(c.to_rfc3339(), "2024-01-31T10:30:00+02:00");
}

#[test]
fn keywords_and_types() {
    let (tokens, _) = kinds("let long x if then else via");
    assert_eq!(
        tokens,
        vec![
            TokenKind::Let,
            TokenKind::Type(TypeName::Long),
            tokens[2],
            TokenKind::If,
            TokenKind::Then,
            TokenKind::Else,
            TokenKind::Via,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn skips_comments() {
    let (tokens, _) = kinds("1 # line\n/* block\n comment */ 2");
    assert_eq!(
        tokens,
        vec![TokenKind::Long(1), TokenKind::Long(2), TokenKind::Eof]
    );
}

#[test]
fn block_comments_may_contain_stars_and_slashes() {
    let (tokens, _) = kinds("1 /* a * b / c **/ + /***/ 2");
    assert_eq!(
        tokens,
        vec![
            TokenKind::Long(1),
            TokenKind::Plus,
            TokenKind::Long(2),
            TokenKind::Eof
        ]
    );
}

#[test]
fn reports_unterminated_block_comment_at_its_start() {
    let interner = StringInterner::new();
    let errors = lex("1 + /* open\n 2", 10, &interner).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ErrorCode::E0006);
    assert_eq!(errors[0].span, Span::new(14, 16));
}

#[test]
fn spans_are_shifted_by_base() {
    let interner = StringInterner::new();
    let tokens = lex("a + b", 100, &interner).unwrap();
    assert_eq!(tokens.tokens[1].span, Span::new(102, 103));
    assert_eq!(tokens.tokens[3].span, Span::new(105, 105));
}

#[test]
fn reports_lexical_errors() {
    let interner = StringInterner::new();
    let errors = lex("1 + \"open", 0, &interner).unwrap_err();
    assert_eq!(errors[0].code, ErrorCode::E0002);

    let errors = lex("a ^ b", 0, &interner).unwrap_err();
    assert_eq!(errors[0].code, ErrorCode::E0001);
    assert_eq!(errors[0].span, Span::new(2, 3));

    let errors = lex("99999999999999999999", 0, &interner).unwrap_err();
    assert_eq!(errors[0].code, ErrorCode::E0003);

    let errors = lex(r#""\q""#, 0, &interner).unwrap_err();
    assert_eq!(errors[0].code, ErrorCode::E0004);
}
