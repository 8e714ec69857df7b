#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;

fn ok(value: Value, ty: TypeName) -> Value {
    cast(&value, ty).unwrap()
}

fn fails(value: Value, ty: TypeName) -> bool {
    matches!(cast(&value, ty), Err(EvalErrorKind::CastError { .. }))
}

#[test]
fn nil_survives_every_cast() {
    for ty in TypeName::ALL {
        assert_eq!(ok(Value::Nil, ty), Value::Nil, "{ty}");
    }
}

#[test]
fn numeric_casts() {
    assert_eq!(ok(Value::Double(-2.7), TypeName::Long), Value::Long(-2));
    assert_eq!(ok(Value::string(" 42 "), TypeName::Long), Value::Long(42));
    assert_eq!(ok(Value::Boolean(true), TypeName::Long), Value::Long(1));
    assert_eq!(ok(Value::Long(3), TypeName::Double), Value::Double(3.0));
    assert_eq!(ok(Value::string("Infinity"), TypeName::Double), Value::Double(f64::INFINITY));
    assert_eq!(
        ok(Value::string("1.25"), TypeName::Decimal),
        Value::Decimal(Decimal::new(125, 2))
    );
    assert_eq!(
        ok(Value::Decimal(Decimal::new(199, 2)), TypeName::Long),
        Value::Long(1)
    );

    assert!(fails(Value::Double(f64::NAN), TypeName::Long));
    assert!(fails(Value::Double(1e19), TypeName::Long));
    assert!(fails(Value::string("abc"), TypeName::Long));
    assert!(fails(Value::Double(f64::NAN), TypeName::Decimal));
}

#[test]
fn string_casts() {
    assert_eq!(ok(Value::Double(2.0), TypeName::String), Value::string("2.0"));
    assert_eq!(ok(Value::Long(-7), TypeName::String), Value::string("-7"));
    assert_eq!(ok(Value::Boolean(false), TypeName::String), Value::string("false"));
    assert!(fails(Value::list(vec![]), TypeName::String));
}

#[test]
fn collection_casts() {
    let dict = Value::dict(BTreeMap::from([
        (Arc::from("a"), Value::Long(1)),
        (Arc::from("b"), Value::Long(2)),
    ]));
    let flat = ok(dict.clone(), TypeName::List);
    assert_eq!(
        flat,
        Value::list(vec![
            Value::string("a"),
            Value::Long(1),
            Value::string("b"),
            Value::Long(2),
        ])
    );
    assert_eq!(ok(flat, TypeName::Dict), dict);
    assert!(fails(Value::list(vec![Value::Long(1)]), TypeName::Dict));
}

#[test]
fn datetime_casts() {
    let value = ok(Value::string("2024-01-31T10:00:00+01:00"), TypeName::DateTime);
    assert_eq!(value.type_name(), TypeName::DateTime);
    assert_eq!(
        ok(value, TypeName::String),
        Value::string("2024-01-31T10:00:00+01:00")
    );
}

#[test]
fn boolean_and_void_casts_never_fail() {
    assert_eq!(ok(Value::string(""), TypeName::Boolean), Value::Boolean(false));
    assert_eq!(ok(Value::Long(5), TypeName::Void), Value::Nil);
}

#[test]
fn type_tests() {
    assert!(is_type(&Value::Long(1), TypeName::Long));
    assert!(!is_type(&Value::Long(1), TypeName::Double));
    assert!(is_type(&Value::Nil, TypeName::Void));
    assert!(is_type(&Value::Nil, TypeName::Any));
    assert!(!is_type(&Value::Nil, TypeName::String));
}
