//! The tagged runtime value.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use rill_ir::{ConstValue, TypeName};
use rust_decimal::Decimal;

use crate::cast::format_double;
use crate::FunctionValue;

pub type List = Arc<[Value]>;
pub type Dict = Arc<BTreeMap<Arc<str>, Value>>;

/// A runtime value. Cloning is cheap: heap payloads are shared.
#[derive(Clone)]
pub enum Value {
    Nil,
    Boolean(bool),
    Long(i64),
    Double(f64),
    Decimal(Decimal),
    String(Arc<str>),
    DateTime(DateTime<FixedOffset>),
    List(List),
    /// Entries ordered by key.
    Dict(Dict),
    Function(Arc<FunctionValue>),
}

impl Value {
    #[inline]
    pub fn string(s: &str) -> Self {
        Value::String(Arc::from(s))
    }

    #[inline]
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(items.into())
    }

    #[inline]
    pub fn dict(entries: BTreeMap<Arc<str>, Value>) -> Self {
        Value::Dict(Arc::new(entries))
    }

    pub fn type_name(&self) -> TypeName {
        match self {
            Value::Nil => TypeName::Void,
            Value::Boolean(_) => TypeName::Boolean,
            Value::Long(_) => TypeName::Long,
            Value::Double(_) => TypeName::Double,
            Value::Decimal(_) => TypeName::Decimal,
            Value::String(_) => TypeName::String,
            Value::DateTime(_) => TypeName::DateTime,
            Value::List(_) => TypeName::List,
            Value::Dict(_) => TypeName::Dict,
            Value::Function(_) => TypeName::Function,
        }
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Boolean interpretation used by conditions, `!`, `&&` and `||`.
    ///
    /// `nil`, `false`, zero, `NaN`, and empty strings and collections are
    /// false; everything else is true.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Boolean(b) => *b,
            Value::Long(n) => *n != 0,
            Value::Double(d) => *d != 0.0 && !d.is_nan(),
            Value::Decimal(d) => !d.is_zero(),
            Value::String(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Dict(entries) => !entries.is_empty(),
            Value::DateTime(_) | Value::Function(_) => true,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&BTreeMap<Arc<str>, Value>> {
        match self {
            Value::Dict(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Arc<FunctionValue>> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn from_const(value: &ConstValue) -> Value {
        match value {
            ConstValue::Nil => Value::Nil,
            ConstValue::Boolean(b) => Value::Boolean(*b),
            ConstValue::Long(n) => Value::Long(*n),
            ConstValue::Double(d) => Value::Double(*d),
            ConstValue::Decimal(d) => Value::Decimal(*d),
            ConstValue::String(s) => Value::String(Arc::clone(s)),
            ConstValue::DateTime(dt) => Value::DateTime(*dt),
            ConstValue::List(items) => Value::List(items.iter().map(Value::from_const).collect()),
            ConstValue::Dict(entries) => Value::dict(
                entries
                    .iter()
                    .map(|(k, v)| (Arc::clone(k), Value::from_const(v)))
                    .collect(),
            ),
        }
    }

    /// The compile-time form of a function-free value.
    pub fn to_const(&self) -> Option<ConstValue> {
        Some(match self {
            Value::Nil => ConstValue::Nil,
            Value::Boolean(b) => ConstValue::Boolean(*b),
            Value::Long(n) => ConstValue::Long(*n),
            Value::Double(d) => ConstValue::Double(*d),
            Value::Decimal(d) => ConstValue::Decimal(*d),
            Value::String(s) => ConstValue::String(Arc::clone(s)),
            Value::DateTime(dt) => ConstValue::DateTime(*dt),
            Value::List(items) => ConstValue::List(
                items
                    .iter()
                    .map(Value::to_const)
                    .collect::<Option<Vec<_>>>()?
                    .into(),
            ),
            Value::Dict(entries) => {
                let mut out = BTreeMap::new();
                for (k, v) in entries.iter() {
                    out.insert(Arc::clone(k), v.to_const()?);
                }
                ConstValue::Dict(Arc::new(out))
            }
            Value::Function(_) => return None,
        })
    }
}

/// Identity: same kind and same contents. Doubles compare by value with
/// `NaN` equal to itself; functions compare by reference. Language-level
/// equality lives in [`crate::operators`].
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Dict(a), Value::Dict(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Long(n) => write!(f, "{n}"),
            Value::Double(d) => f.write_str(&format_double(*d)),
            Value::Decimal(d) => write!(f, "{d}d"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::DateTime(dt) => f.write_str(&dt.to_rfc3339()),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Dict(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k:?} {v}")?;
                }
                f.write_str("}")
            }
            Value::Function(func) => write!(f, "{func:?}"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Long(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Long(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s.into())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::list(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Nil, Into::into)
    }
}

#[cfg(test)]
mod tests;
