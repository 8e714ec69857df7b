#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;

fn call(name: &str, args: &[Value]) -> Result<Value, NativeError> {
    NativeRegistry::with_defaults()
        .get(name)
        .unwrap_or_else(|| panic!("{name} is not registered"))
        .call(args)
}

#[test]
fn defaults_are_registered() {
    let registry = NativeRegistry::with_defaults();
    let names: Vec<String> = registry.names().iter().map(ToString::to_string).collect();
    assert_eq!(
        names,
        vec![
            "core.keys",
            "core.size",
            "math.abs",
            "math.max",
            "strings.length",
            "strings.upper",
        ]
    );
    assert!(registry.has_native("math.abs"));
    assert!(!registry.has_native("math.min"));
}

#[test]
fn size_counts_elements_and_characters() {
    assert_eq!(call("core.size", &[Value::list(vec![1.into(), 2.into()])]).unwrap(), Value::Long(2));
    assert_eq!(call("core.size", &[Value::string("héllo")]).unwrap(), Value::Long(5));
    assert_eq!(call("core.size", &[Value::Nil]).unwrap(), Value::Nil);
    assert!(call("core.size", &[Value::Long(1)]).is_err());
}

#[test]
fn keys_are_sorted() {
    let dict = Value::dict(
        [("b", 2), ("a", 1)]
            .into_iter()
            .map(|(k, v)| (Arc::from(k), Value::from(v)))
            .collect(),
    );
    assert_eq!(
        call("core.keys", &[dict]).unwrap(),
        Value::list(vec![Value::string("a"), Value::string("b")])
    );
}

#[test]
fn string_functions() {
    assert_eq!(call("strings.upper", &[Value::string("abc")]).unwrap(), Value::string("ABC"));
    assert_eq!(call("strings.length", &[Value::string("abc")]).unwrap(), Value::Long(3));
    assert_eq!(call("strings.upper", &[]).unwrap(), Value::Nil);
}

#[test]
fn math_functions() {
    assert_eq!(call("math.abs", &[Value::Long(-3)]).unwrap(), Value::Long(3));
    assert_eq!(call("math.abs", &[Value::Double(-1.5)]).unwrap(), Value::Double(1.5));
    assert_eq!(call("math.max", &[Value::Long(2), Value::Double(2.5)]).unwrap(), Value::Double(2.5));
    assert_eq!(call("math.max", &[Value::Long(3), Value::Long(1)]).unwrap(), Value::Long(3));
    assert_eq!(call("math.max", &[Value::Nil, Value::Long(1)]).unwrap(), Value::Nil);
    assert!(call("math.max", &[Value::string("a"), Value::Long(1)]).is_err());
}

#[test]
fn closures_register_as_natives() {
    let mut registry = NativeRegistry::new();
    registry.register("test.first", |args: &[Value]| -> Result<Value, NativeError> {
        Ok(args.first().cloned().unwrap_or(Value::Nil))
    });
    let native = registry.get("test.first").unwrap();
    assert_eq!(native.call(&[Value::Long(9)]).unwrap(), Value::Long(9));
}
