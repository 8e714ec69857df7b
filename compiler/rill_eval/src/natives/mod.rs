//! Host native functions.
//!
//! A function literal with a `via "name"` body calls the native registered
//! under `name`. Arguments are filled and cast by the literal's parameter
//! list before the native sees them, so natives receive exactly one value
//! per declared parameter.

use std::fmt;
use std::sync::Arc;

use rill_ir::NativeCatalog;
use rill_value::operators::compare_numbers;
use rill_value::{NativeError, Value};
use rustc_hash::FxHashMap;

pub trait NativeFunction: Send + Sync {
    fn call(&self, args: &[Value]) -> Result<Value, NativeError>;
}

impl<F> NativeFunction for F
where
    F: Fn(&[Value]) -> Result<Value, NativeError> + Send + Sync,
{
    fn call(&self, args: &[Value]) -> Result<Value, NativeError> {
        self(args)
    }
}

/// Native functions by name.
#[derive(Clone, Default)]
pub struct NativeRegistry {
    functions: FxHashMap<Arc<str>, Arc<dyn NativeFunction>>,
}

impl NativeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in host functions.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("core.size", size);
        registry.register("core.keys", keys);
        registry.register("strings.upper", upper);
        registry.register("strings.length", length);
        registry.register("math.abs", abs);
        registry.register("math.max", max);
        registry
    }

    /// Register `function` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: &str, function: impl NativeFunction + 'static) {
        self.functions.insert(Arc::from(name), Arc::new(function));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn NativeFunction>> {
        self.functions.get(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<Arc<str>> {
        let mut names: Vec<_> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl NativeCatalog for NativeRegistry {
    fn has_native(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }
}

impl fmt::Debug for NativeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeRegistry")
            .field("functions", &self.names())
            .finish()
    }
}

static NIL: Value = Value::Nil;

fn arg(args: &[Value], index: usize) -> &Value {
    args.get(index).unwrap_or(&NIL)
}

fn expected(what: &str, found: &Value) -> NativeError {
    format!("expected {what}, found {}", found.type_name()).into()
}

fn size(args: &[Value]) -> Result<Value, NativeError> {
    let len = match arg(args, 0) {
        Value::Nil => return Ok(Value::Nil),
        Value::List(items) => items.len(),
        Value::Dict(entries) => entries.len(),
        Value::String(s) => s.chars().count(),
        other => return Err(expected("a list, dict or string", other)),
    };
    Ok(Value::Long(i64::try_from(len)?))
}

fn keys(args: &[Value]) -> Result<Value, NativeError> {
    match arg(args, 0) {
        Value::Nil => Ok(Value::Nil),
        Value::Dict(entries) => Ok(Value::List(
            entries.keys().map(|k| Value::String(Arc::clone(k))).collect(),
        )),
        other => Err(expected("a dict", other)),
    }
}

fn upper(args: &[Value]) -> Result<Value, NativeError> {
    match arg(args, 0) {
        Value::Nil => Ok(Value::Nil),
        Value::String(s) => Ok(Value::string(&s.to_uppercase())),
        other => Err(expected("a string", other)),
    }
}

fn length(args: &[Value]) -> Result<Value, NativeError> {
    match arg(args, 0) {
        Value::Nil => Ok(Value::Nil),
        Value::String(s) => Ok(Value::Long(i64::try_from(s.chars().count())?)),
        other => Err(expected("a string", other)),
    }
}

fn abs(args: &[Value]) -> Result<Value, NativeError> {
    match arg(args, 0) {
        Value::Nil => Ok(Value::Nil),
        Value::Long(n) => Ok(Value::Long(n.wrapping_abs())),
        Value::Double(d) => Ok(Value::Double(d.abs())),
        Value::Decimal(d) => Ok(Value::Decimal(d.abs())),
        other => Err(expected("a number", other)),
    }
}

fn max(args: &[Value]) -> Result<Value, NativeError> {
    let (a, b) = (arg(args, 0), arg(args, 1));
    if a.is_nil() || b.is_nil() {
        return Ok(Value::Nil);
    }
    match compare_numbers(a, b) {
        Some(std::cmp::Ordering::Less) => Ok(b.clone()),
        Some(_) => Ok(a.clone()),
        // Only NaN is unordered among numbers.
        None if is_number(a) && is_number(b) => Ok(Value::Double(f64::NAN)),
        None => Err(expected("numbers", if is_number(a) { b } else { a })),
    }
}

fn is_number(value: &Value) -> bool {
    matches!(value, Value::Long(_) | Value::Double(_) | Value::Decimal(_))
}

#[cfg(test)]
mod tests;
