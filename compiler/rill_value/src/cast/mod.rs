//! Conversions between value kinds and `is` type tests.
//!
//! `nil` casts to `nil` for every target type, so declared types never
//! reject a missing value.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::DateTime;
use rill_ir::TypeName;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use crate::{EvalErrorKind, Value};

/// `value as ty`.
pub fn cast(value: &Value, ty: TypeName) -> Result<Value, EvalErrorKind> {
    if value.is_nil() || ty == TypeName::Any {
        return Ok(value.clone());
    }
    let fail = || EvalErrorKind::CastError {
        from: value.type_name(),
        to: ty,
    };

    let result = match ty {
        TypeName::Any => value.clone(),
        TypeName::Void => Value::Nil,
        TypeName::Boolean => Value::Boolean(value.truthy()),
        TypeName::Long => Value::Long(to_long(value).ok_or_else(fail)?),
        TypeName::Double => Value::Double(to_double(value).ok_or_else(fail)?),
        TypeName::Decimal => Value::Decimal(to_decimal(value).ok_or_else(fail)?),
        TypeName::String => Value::String(to_text(value).ok_or_else(fail)?),
        TypeName::DateTime => match value {
            Value::DateTime(_) => value.clone(),
            Value::String(s) => Value::DateTime(DateTime::parse_from_rfc3339(s.trim()).map_err(|_| fail())?),
            _ => return Err(fail()),
        },
        TypeName::List => match value {
            Value::List(_) => value.clone(),
            Value::Dict(entries) => Value::list(
                entries
                    .iter()
                    .flat_map(|(k, v)| [Value::String(Arc::clone(k)), v.clone()])
                    .collect(),
            ),
            _ => return Err(fail()),
        },
        TypeName::Dict => match value {
            Value::Dict(_) => value.clone(),
            Value::List(items) if items.len() % 2 == 0 => {
                let mut entries = BTreeMap::new();
                for pair in items.chunks(2) {
                    let key = match &pair[0] {
                        Value::Nil => return Err(fail()),
                        key => to_text(key).ok_or_else(fail)?,
                    };
                    entries.insert(key, pair[1].clone());
                }
                Value::dict(entries)
            }
            _ => return Err(fail()),
        },
        TypeName::Function => match value {
            Value::Function(_) => value.clone(),
            _ => return Err(fail()),
        },
    };
    Ok(result)
}

/// `value is ty`.
pub fn is_type(value: &Value, ty: TypeName) -> bool {
    ty == TypeName::Any || value.type_name() == ty
}

/// String form of a scalar, as produced by `as string` and `..`.
pub fn to_text(value: &Value) -> Option<Arc<str>> {
    let text = match value {
        Value::String(s) => return Some(Arc::clone(s)),
        Value::Nil => "nil".to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Long(n) => n.to_string(),
        Value::Double(d) => format_double(*d),
        Value::Decimal(d) => d.to_string(),
        Value::DateTime(dt) => dt.to_rfc3339(),
        Value::List(_) | Value::Dict(_) | Value::Function(_) => return None,
    };
    Some(text.into())
}

/// `1.0`, `0.5`, `NaN`, `Infinity`, `-Infinity`.
pub fn format_double(d: f64) -> String {
    if d.is_nan() {
        "NaN".to_string()
    } else if d.is_infinite() {
        if d > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        format!("{d:?}")
    }
}

// i64::MIN as f64 is exact; i64::MAX as f64 rounds up to 2^63.
const LONG_MIN_F64: f64 = -9_223_372_036_854_775_808.0;
const LONG_MAX_F64: f64 = 9_223_372_036_854_775_808.0;

#[allow(clippy::cast_possible_truncation)]
fn to_long(value: &Value) -> Option<i64> {
    match value {
        Value::Long(n) => Some(*n),
        Value::Boolean(b) => Some(i64::from(*b)),
        Value::Double(d) => {
            let t = d.trunc();
            (t >= LONG_MIN_F64 && t < LONG_MAX_F64).then(|| t as i64)
        }
        Value::Decimal(d) => d.trunc().to_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn to_double(value: &Value) -> Option<f64> {
    match value {
        Value::Double(d) => Some(*d),
        #[allow(clippy::cast_precision_loss)]
        Value::Long(n) => Some(*n as f64),
        Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Decimal(d) => d.to_f64(),
        Value::String(s) => match s.trim() {
            "NaN" => Some(f64::NAN),
            "Infinity" | "+Infinity" => Some(f64::INFINITY),
            "-Infinity" => Some(f64::NEG_INFINITY),
            text => text.parse().ok().filter(|d: &f64| d.is_finite()),
        },
        _ => None,
    }
}

fn to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Decimal(d) => Some(*d),
        Value::Long(n) => Some(Decimal::from(*n)),
        Value::Boolean(b) => Some(Decimal::from(i64::from(*b))),
        Value::Double(d) => Decimal::from_f64(*d),
        Value::String(s) => {
            let text = s.trim();
            text.parse::<Decimal>()
                .or_else(|_| Decimal::from_scientific(text))
                .ok()
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests;
