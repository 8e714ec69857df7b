//! Operator semantics.
//!
//! Arithmetic promotes mixed operands: `long` with `double` computes in
//! `double`, anything with `decimal` computes in `decimal`. A `nil` operand
//! makes arithmetic yield `nil`. Long arithmetic wraps.
//!
//! The `*_binary` fast paths take unboxed operands and must agree with
//! [`binary`] for every input; [`binary`] itself calls them once the
//! operand kinds are known.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use rill_ir::{BinaryOp, TypeName, UnaryOp};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use crate::cast::to_text;
use crate::{EvalErrorKind, Value};

type OpResult = Result<Value, EvalErrorKind>;

/// Apply a binary operator to evaluated operands. `&&` and `||` are
/// applied to both operands without short-circuiting.
pub fn binary(op: BinaryOp, left: &Value, right: &Value) -> OpResult {
    match (left, right) {
        (Value::Long(a), Value::Long(b)) => return long_binary(op, *a, *b),
        (Value::Double(a), Value::Double(b)) => return double_binary(op, *a, *b),
        (Value::String(a), Value::String(b)) => return string_binary(op, a, b),
        _ => {}
    }
    match op {
        BinaryOp::Add
        | BinaryOp::Sub
        | BinaryOp::Mul
        | BinaryOp::Div
        | BinaryOp::IntDiv
        | BinaryOp::Mod
        | BinaryOp::Pow => arithmetic(op, left, right),
        BinaryOp::Concat => concat(left, right),
        BinaryOp::Eq => Ok(Value::Boolean(equals(left, right))),
        BinaryOp::NotEq => Ok(Value::Boolean(!equals(left, right))),
        BinaryOp::StrictEq => Ok(Value::Boolean(strict_equals(left, right))),
        BinaryOp::StrictNotEq => Ok(Value::Boolean(!strict_equals(left, right))),
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
            ordering(op, left, right)
        }
        BinaryOp::And => Ok(Value::Boolean(left.truthy() && right.truthy())),
        BinaryOp::Or => Ok(Value::Boolean(left.truthy() || right.truthy())),
    }
}

pub fn long_binary(op: BinaryOp, a: i64, b: i64) -> OpResult {
    let value = match op {
        BinaryOp::Add => Value::Long(a.wrapping_add(b)),
        BinaryOp::Sub => Value::Long(a.wrapping_sub(b)),
        BinaryOp::Mul => Value::Long(a.wrapping_mul(b)),
        #[allow(clippy::cast_precision_loss)]
        BinaryOp::Div => Value::Double(a as f64 / b as f64),
        BinaryOp::IntDiv => Value::Long(floor_div(a, b)?),
        BinaryOp::Mod => {
            if b == 0 {
                return Err(EvalErrorKind::DivisionByZero);
            }
            Value::Long(a.wrapping_rem(b))
        }
        BinaryOp::Pow => long_pow(a, b),
        BinaryOp::Eq | BinaryOp::StrictEq => Value::Boolean(a == b),
        BinaryOp::NotEq | BinaryOp::StrictNotEq => Value::Boolean(a != b),
        BinaryOp::Lt => Value::Boolean(a < b),
        BinaryOp::LtEq => Value::Boolean(a <= b),
        BinaryOp::Gt => Value::Boolean(a > b),
        BinaryOp::GtEq => Value::Boolean(a >= b),
        BinaryOp::Concat => Value::String(format!("{a}{b}").into()),
        BinaryOp::And => Value::Boolean(a != 0 && b != 0),
        BinaryOp::Or => Value::Boolean(a != 0 || b != 0),
    };
    Ok(value)
}

pub fn double_binary(op: BinaryOp, a: f64, b: f64) -> OpResult {
    let value = match op {
        BinaryOp::Add => Value::Double(a + b),
        BinaryOp::Sub => Value::Double(a - b),
        BinaryOp::Mul => Value::Double(a * b),
        BinaryOp::Div => Value::Double(a / b),
        BinaryOp::IntDiv => Value::Double((a / b).floor()),
        BinaryOp::Mod => Value::Double(a % b),
        BinaryOp::Pow => Value::Double(a.powf(b)),
        BinaryOp::Eq | BinaryOp::StrictEq => Value::Boolean(a == b),
        BinaryOp::NotEq | BinaryOp::StrictNotEq => Value::Boolean(a != b),
        BinaryOp::Lt => Value::Boolean(a < b),
        BinaryOp::LtEq => Value::Boolean(a <= b),
        BinaryOp::Gt => Value::Boolean(a > b),
        BinaryOp::GtEq => Value::Boolean(a >= b),
        BinaryOp::Concat => concat(&Value::Double(a), &Value::Double(b))?,
        BinaryOp::And => Value::Boolean(Value::Double(a).truthy() && Value::Double(b).truthy()),
        BinaryOp::Or => Value::Boolean(Value::Double(a).truthy() || Value::Double(b).truthy()),
    };
    Ok(value)
}

pub fn string_binary(op: BinaryOp, a: &Arc<str>, b: &Arc<str>) -> OpResult {
    let value = match op {
        BinaryOp::Concat => {
            let mut out = String::with_capacity(a.len() + b.len());
            out.push_str(a);
            out.push_str(b);
            Value::String(out.into())
        }
        BinaryOp::Eq | BinaryOp::StrictEq => Value::Boolean(a == b),
        BinaryOp::NotEq | BinaryOp::StrictNotEq => Value::Boolean(a != b),
        BinaryOp::Lt => Value::Boolean(a < b),
        BinaryOp::LtEq => Value::Boolean(a <= b),
        BinaryOp::Gt => Value::Boolean(a > b),
        BinaryOp::GtEq => Value::Boolean(a >= b),
        BinaryOp::And => Value::Boolean(!a.is_empty() && !b.is_empty()),
        BinaryOp::Or => Value::Boolean(!a.is_empty() || !b.is_empty()),
        BinaryOp::Add
        | BinaryOp::Sub
        | BinaryOp::Mul
        | BinaryOp::Div
        | BinaryOp::IntDiv
        | BinaryOp::Mod
        | BinaryOp::Pow => return Err(operand_mismatch(op, TypeName::String, TypeName::String)),
    };
    Ok(value)
}

pub fn unary(op: UnaryOp, operand: &Value) -> OpResult {
    match op {
        UnaryOp::Neg => match operand {
            Value::Nil => Ok(Value::Nil),
            Value::Long(n) => Ok(Value::Long(n.wrapping_neg())),
            Value::Double(d) => Ok(Value::Double(-d)),
            Value::Decimal(d) => Ok(Value::Decimal(-*d)),
            other => Err(EvalErrorKind::type_mismatch(
                "a number for unary `-`",
                other.type_name(),
            )),
        },
        UnaryOp::Not => Ok(Value::Boolean(!operand.truthy())),
        UnaryOp::TypeOf => Ok(Value::string(operand.type_name().keyword())),
    }
}

/// `==`: numbers compare by value across kinds, collections element-wise,
/// functions by identity.
pub fn equals(left: &Value, right: &Value) -> bool {
    equal_with(left, right, false)
}

/// `===`: like `==`, but kinds must match at every level.
pub fn strict_equals(left: &Value, right: &Value) -> bool {
    equal_with(left, right, true)
}

fn equal_with(left: &Value, right: &Value, strict: bool) -> bool {
    if strict && left.type_name() != right.type_name() {
        return false;
    }
    match (left, right) {
        (Value::Nil, Value::Nil) => true,
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::DateTime(a), Value::DateTime(b)) => a == b,
        (Value::List(a), Value::List(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| equal_with(x, y, strict))
        }
        (Value::Dict(a), Value::Dict(b)) => {
            a.len() == b.len()
                && a.iter()
                    .zip(b.iter())
                    .all(|((ka, va), (kb, vb))| ka == kb && equal_with(va, vb, strict))
        }
        (Value::Function(a), Value::Function(b)) => Arc::ptr_eq(a, b),
        _ => compare_numbers(left, right) == Some(Ordering::Equal),
    }
}

/// Order of two numbers of any numeric kinds; `None` for non-numbers and
/// `NaN`.
pub fn compare_numbers(left: &Value, right: &Value) -> Option<Ordering> {
    match (Number::of(left)?, Number::of(right)?) {
        (Number::Long(a), Number::Long(b)) => Some(a.cmp(&b)),
        (Number::Decimal(a), Number::Decimal(b)) => Some(a.cmp(&b)),
        (Number::Decimal(a), Number::Long(b)) => Some(a.cmp(&Decimal::from(b))),
        (Number::Long(a), Number::Decimal(b)) => Some(Decimal::from(a).cmp(&b)),
        (a, b) => a.to_f64().partial_cmp(&b.to_f64()),
    }
}

fn ordering(op: BinaryOp, left: &Value, right: &Value) -> OpResult {
    if left.is_nil() || right.is_nil() {
        return Ok(Value::Boolean(false));
    }
    let order = match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
        _ if Number::of(left).is_some() && Number::of(right).is_some() => {
            compare_numbers(left, right)
        }
        _ => return Err(operand_mismatch(op, left.type_name(), right.type_name())),
    };
    let result = order.is_some_and(|order| match op {
        BinaryOp::Lt => order == Ordering::Less,
        BinaryOp::LtEq => order != Ordering::Greater,
        BinaryOp::Gt => order == Ordering::Greater,
        _ => order != Ordering::Less,
    });
    Ok(Value::Boolean(result))
}

/// `..`: lists append, dicts merge (right wins), anything else is joined
/// as text.
pub fn concat(left: &Value, right: &Value) -> OpResult {
    match (left, right) {
        (Value::List(a), Value::List(b)) => {
            Ok(Value::List(a.iter().chain(b.iter()).cloned().collect()))
        }
        (Value::Dict(a), Value::Dict(b)) => {
            let mut merged: BTreeMap<_, _> = (**a).clone();
            merged.extend(b.iter().map(|(k, v)| (Arc::clone(k), v.clone())));
            Ok(Value::dict(merged))
        }
        _ => {
            let text = |v: &Value| {
                to_text(v).ok_or_else(|| EvalErrorKind::CastError {
                    from: v.type_name(),
                    to: TypeName::String,
                })
            };
            let (a, b) = (text(left)?, text(right)?);
            string_binary(BinaryOp::Concat, &a, &b)
        }
    }
}

/// `target[key]`: list positions and dict keys. A `nil` target or key, or
/// a missing dict key, yields `nil`.
pub fn index(target: &Value, key: &Value) -> OpResult {
    if target.is_nil() || key.is_nil() {
        return Ok(Value::Nil);
    }
    match target {
        Value::List(items) => {
            let Value::Long(i) = crate::cast::cast(key, TypeName::Long)
                .map_err(|_| EvalErrorKind::type_mismatch("a long list index", key.type_name()))?
            else {
                return Ok(Value::Nil);
            };
            usize::try_from(i)
                .ok()
                .and_then(|pos| items.get(pos))
                .cloned()
                .ok_or(EvalErrorKind::IndexOutOfBounds {
                    index: i,
                    len: items.len(),
                })
        }
        Value::Dict(entries) => {
            let key = to_text(key)
                .ok_or_else(|| EvalErrorKind::type_mismatch("a string dict key", key.type_name()))?;
            Ok(entries.get(&key).cloned().unwrap_or(Value::Nil))
        }
        other => Err(EvalErrorKind::type_mismatch(
            "a list or dict to index",
            other.type_name(),
        )),
    }
}

/// Append the items of a spread operand. Spreading `nil` adds nothing.
pub fn spread_list(out: &mut Vec<Value>, spread: &Value) -> Result<(), EvalErrorKind> {
    match spread {
        Value::Nil => Ok(()),
        Value::List(items) => {
            out.extend(items.iter().cloned());
            Ok(())
        }
        other => Err(EvalErrorKind::type_mismatch(
            "a list to spread",
            other.type_name(),
        )),
    }
}

/// Key of a dict literal entry: any scalar but `nil`, as text.
pub fn dict_key(key: &Value) -> Result<Arc<str>, EvalErrorKind> {
    if key.is_nil() {
        return Err(EvalErrorKind::invalid_argument("dict keys cannot be nil"));
    }
    to_text(key).ok_or_else(|| EvalErrorKind::CastError {
        from: key.type_name(),
        to: TypeName::String,
    })
}

/// Merge the entries of a spread operand; later entries win. Spreading
/// `nil` adds nothing.
pub fn spread_dict(
    out: &mut BTreeMap<Arc<str>, Value>,
    spread: &Value,
) -> Result<(), EvalErrorKind> {
    match spread {
        Value::Nil => Ok(()),
        Value::Dict(entries) => {
            out.extend(entries.iter().map(|(k, v)| (Arc::clone(k), v.clone())));
            Ok(())
        }
        other => Err(EvalErrorKind::type_mismatch(
            "a dict to spread",
            other.type_name(),
        )),
    }
}

fn operand_mismatch(op: BinaryOp, left: TypeName, right: TypeName) -> EvalErrorKind {
    EvalErrorKind::type_mismatch(
        format!("compatible operands for `{}`", op.as_symbol()),
        format!("{left} and {right}"),
    )
}

#[derive(Copy, Clone, Debug)]
enum Number {
    Long(i64),
    Double(f64),
    Decimal(Decimal),
}

impl Number {
    fn of(value: &Value) -> Option<Number> {
        match value {
            Value::Long(n) => Some(Number::Long(*n)),
            Value::Double(d) => Some(Number::Double(*d)),
            Value::Decimal(d) => Some(Number::Decimal(*d)),
            _ => None,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn to_f64(self) -> f64 {
        match self {
            Number::Long(n) => n as f64,
            Number::Double(d) => d,
            Number::Decimal(d) => d.to_f64().unwrap_or(f64::NAN),
        }
    }
}

fn arithmetic(op: BinaryOp, left: &Value, right: &Value) -> OpResult {
    if left.is_nil() || right.is_nil() {
        return Ok(Value::Nil);
    }
    let (Some(a), Some(b)) = (Number::of(left), Number::of(right)) else {
        return Err(operand_mismatch(op, left.type_name(), right.type_name()));
    };
    match (a, b) {
        (Number::Long(a), Number::Long(b)) => long_binary(op, a, b),
        (Number::Decimal(_), _) | (_, Number::Decimal(_)) => {
            let to_decimal = |n: Number| match n {
                Number::Long(n) => Some(Decimal::from(n)),
                Number::Double(d) => Decimal::from_f64(d),
                Number::Decimal(d) => Some(d),
            };
            match (to_decimal(a), to_decimal(b)) {
                (Some(a), Some(b)) => decimal_binary(op, a, b),
                _ => Err(EvalErrorKind::CastError {
                    from: TypeName::Double,
                    to: TypeName::Decimal,
                }),
            }
        }
        (a, b) => double_binary(op, a.to_f64(), b.to_f64()),
    }
}

fn decimal_binary(op: BinaryOp, a: Decimal, b: Decimal) -> OpResult {
    let overflow = || EvalErrorKind::invalid_argument(format!("decimal overflow in `{}`", op.as_symbol()));
    let nonzero = || {
        if b.is_zero() {
            Err(EvalErrorKind::DivisionByZero)
        } else {
            Ok(())
        }
    };
    let result = match op {
        BinaryOp::Add => a.checked_add(b),
        BinaryOp::Sub => a.checked_sub(b),
        BinaryOp::Mul => a.checked_mul(b),
        BinaryOp::Div => {
            nonzero()?;
            a.checked_div(b)
        }
        BinaryOp::IntDiv => {
            nonzero()?;
            a.checked_div(b).map(|q| q.floor())
        }
        BinaryOp::Mod => {
            nonzero()?;
            a.checked_rem(b)
        }
        BinaryOp::Pow => return decimal_pow(a, b).ok_or_else(overflow),
        _ => return binary(op, &Value::Decimal(a), &Value::Decimal(b)),
    };
    result.map(Value::Decimal).ok_or_else(overflow)
}

fn decimal_pow(base: Decimal, exponent: Decimal) -> Option<Value> {
    if exponent.fract().is_zero() && !exponent.is_sign_negative() {
        let mut remaining = exponent.to_u64()?;
        let mut result = Decimal::ONE;
        let mut factor = base;
        while remaining > 0 {
            if remaining & 1 == 1 {
                result = result.checked_mul(factor)?;
            }
            remaining >>= 1;
            if remaining > 0 {
                factor = factor.checked_mul(factor)?;
            }
        }
        return Some(Value::Decimal(result));
    }
    let value = base.to_f64()?.powf(exponent.to_f64()?);
    Decimal::from_f64(value).map(Value::Decimal)
}

fn floor_div(a: i64, b: i64) -> Result<i64, EvalErrorKind> {
    if b == 0 {
        return Err(EvalErrorKind::DivisionByZero);
    }
    let q = a.wrapping_div(b);
    if a.wrapping_rem(b) != 0 && ((a < 0) != (b < 0)) {
        Ok(q.wrapping_sub(1))
    } else {
        Ok(q)
    }
}

#[allow(clippy::cast_precision_loss)]
fn long_pow(base: i64, exponent: i64) -> Value {
    let Ok(mut remaining) = u64::try_from(exponent) else {
        return Value::Double((base as f64).powf(exponent as f64));
    };
    let mut result: i64 = 1;
    let mut factor = base;
    while remaining > 0 {
        if remaining & 1 == 1 {
            result = result.wrapping_mul(factor);
        }
        remaining >>= 1;
        factor = factor.wrapping_mul(factor);
    }
    Value::Long(result)
}
