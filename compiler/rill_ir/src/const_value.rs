//! Compile-time constants stored in a program's constant pool.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;

use crate::TypeName;

/// A function-free value known at compile time.
///
/// Literal operations and folded subtrees are stored as `ConstValue`s; the
/// evaluator turns them into runtime values when the constant is loaded.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstValue {
    Nil,
    Boolean(bool),
    Long(i64),
    Double(f64),
    Decimal(Decimal),
    String(Arc<str>),
    DateTime(DateTime<FixedOffset>),
    List(Arc<[ConstValue]>),
    Dict(Arc<BTreeMap<Arc<str>, ConstValue>>),
}

impl ConstValue {
    pub fn type_name(&self) -> TypeName {
        match self {
            ConstValue::Nil => TypeName::Void,
            ConstValue::Boolean(_) => TypeName::Boolean,
            ConstValue::Long(_) => TypeName::Long,
            ConstValue::Double(_) => TypeName::Double,
            ConstValue::Decimal(_) => TypeName::Decimal,
            ConstValue::String(_) => TypeName::String,
            ConstValue::DateTime(_) => TypeName::DateTime,
            ConstValue::List(_) => TypeName::List,
            ConstValue::Dict(_) => TypeName::Dict,
        }
    }

    pub fn string(s: &str) -> ConstValue {
        ConstValue::String(Arc::from(s))
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Nil => f.write_str("nil"),
            ConstValue::Boolean(b) => write!(f, "{b}"),
            ConstValue::Long(n) => write!(f, "{n}"),
            ConstValue::Double(d) => write!(f, "{d:?}"),
            ConstValue::Decimal(d) => write!(f, "{d}d"),
            ConstValue::String(s) => write!(f, "{s:?}"),
            ConstValue::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            ConstValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            ConstValue::Dict(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k:?} {v}")?;
                }
                f.write_str("}")
            }
        }
    }
}
