#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;

#[test]
fn truthiness() {
    let falsy = [
        Value::Nil,
        Value::Boolean(false),
        Value::Long(0),
        Value::Double(0.0),
        Value::Double(f64::NAN),
        Value::Decimal(Decimal::ZERO),
        Value::string(""),
        Value::list(vec![]),
        Value::dict(BTreeMap::new()),
    ];
    assert!(falsy.iter().all(|v| !v.truthy()), "{falsy:?}");

    let truthy = [
        Value::Boolean(true),
        Value::Long(-1),
        Value::Double(0.5),
        Value::string("0"),
        Value::list(vec![Value::Nil]),
    ];
    assert!(truthy.iter().all(Value::truthy), "{truthy:?}");
}

#[test]
fn converts_to_and_from_constants() {
    let value = Value::list(vec![
        Value::Long(1),
        Value::string("a"),
        Value::dict(BTreeMap::from([(Arc::from("k"), Value::Double(1.5))])),
    ]);
    let constant = value.to_const().unwrap();
    assert_eq!(constant.type_name(), TypeName::List);
    assert_eq!(Value::from_const(&constant), value);
}

#[test]
fn displays_literal_forms() {
    let value = Value::list(vec![
        Value::Nil,
        Value::Double(1.0),
        Value::Double(f64::NEG_INFINITY),
        Value::Decimal(Decimal::new(150, 2)),
        Value::string("x"),
        Value::dict(BTreeMap::from([(Arc::from("a"), Value::Long(1))])),
    ]);
    assert_eq!(
        value.to_string(),
        r#"[nil, 1.0, -Infinity, 1.50d, "x", {"a" 1}]"#
    );
}

#[test]
fn identity_treats_nan_as_equal_to_itself() {
    assert_eq!(Value::Double(f64::NAN), Value::Double(f64::NAN));
    assert_ne!(Value::Long(1), Value::Double(1.0));
}

#[test]
fn options_convert_to_nil() {
    assert_eq!(Value::from(None::<i64>), Value::Nil);
    assert_eq!(Value::from(Some("a")), Value::string("a"));
}
