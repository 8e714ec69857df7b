//! Literal decoding helpers used by the token callbacks.

use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;

use crate::LexErrorKind;

pub(crate) fn parse_long(text: &str) -> Result<i64, LexErrorKind> {
    text.parse::<i64>().map_err(|_| LexErrorKind::Number)
}

/// Hex literals cover the full 64-bit pattern, so `0xffffffffffffffff` is -1.
pub(crate) fn parse_hex(text: &str) -> Result<i64, LexErrorKind> {
    u64::from_str_radix(&text[2..], 16)
        .map(|bits| i64::from_ne_bytes(bits.to_ne_bytes()))
        .map_err(|_| LexErrorKind::Number)
}

pub(crate) fn parse_double(text: &str) -> Result<f64, LexErrorKind> {
    text.parse::<f64>().map_err(|_| LexErrorKind::Number)
}

/// `1.5d`, `2e3d`
pub(crate) fn parse_decimal(text: &str) -> Result<Decimal, LexErrorKind> {
    let digits = &text[..text.len() - 1];
    let parsed = if digits.contains(['e', 'E']) {
        Decimal::from_scientific(digits)
    } else {
        Decimal::from_str(digits)
    };
    parsed.map_err(|_| LexErrorKind::Number)
}

/// Datetimes may omit the time (midnight), seconds, and the offset (UTC).
pub(crate) fn parse_datetime(text: &str) -> Result<DateTime<FixedOffset>, LexErrorKind> {
    let (date, rest) = text.split_once('T').ok_or(LexErrorKind::DateTime)?;
    let offset_at = rest.find(['Z', '+', '-']).unwrap_or(rest.len());
    let (time, offset) = rest.split_at(offset_at);

    let time = match time.len() {
        0 => "00:00:00".to_owned(),
        5 => format!("{time}:00"),
        _ => time.to_owned(),
    };
    let offset = if offset.is_empty() || offset == "Z" {
        "+00:00"
    } else {
        offset
    };
    DateTime::parse_from_rfc3339(&format!("{date}T{time}{offset}"))
        .map_err(|_| LexErrorKind::DateTime)
}

/// Strip quotes and process escapes of a double-quoted string.
pub(crate) fn unescape(text: &str) -> Result<String, LexErrorKind> {
    let body = &text[1..text.len() - 1];
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some('u') => out.push(hex_char(&mut chars, 4)?),
            Some('U') => out.push(hex_char(&mut chars, 8)?),
            _ => return Err(LexErrorKind::Escape),
        }
    }
    Ok(out)
}

fn hex_char(chars: &mut std::str::Chars<'_>, len: usize) -> Result<char, LexErrorKind> {
    let digits: String = chars.by_ref().take(len).collect();
    if digits.len() != len {
        return Err(LexErrorKind::Escape);
    }
    u32::from_str_radix(&digits, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or(LexErrorKind::Escape)
}

/// Single-quoted strings are verbatim; `''` stands for one quote.
pub(crate) fn verbatim(text: &str) -> String {
    text[1..text.len() - 1].replace("''", "'")
}
