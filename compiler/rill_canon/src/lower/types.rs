//! Static result types.
//!
//! A static type names the kind an op yields when it yields a non-`nil`
//! value; `Any` when unknown. Types only steer specialization, which falls
//! back to generic dispatch whenever the runtime kinds disagree.

use rill_ir::{BinaryOp, TypeName, UnaryOp};

pub(super) fn unary_type(op: UnaryOp, operand: TypeName) -> TypeName {
    match op {
        UnaryOp::Neg if operand.is_numeric() => operand,
        UnaryOp::Neg => TypeName::Any,
        UnaryOp::Not => TypeName::Boolean,
        UnaryOp::TypeOf => TypeName::String,
    }
}

pub(super) fn binary_type(op: BinaryOp, left: TypeName, right: TypeName) -> TypeName {
    use TypeName::{Any, Boolean, Decimal, Dict, Double, Function, List, Long, String};

    if op.is_comparison() || op.is_short_circuit() {
        return Boolean;
    }
    if op == BinaryOp::Concat {
        return match (left, right) {
            (List, List) => List,
            (Dict, Dict) => Dict,
            (Any | List | Dict | Function, _) | (_, Any | List | Dict | Function) => Any,
            _ => String,
        };
    }
    if !left.is_numeric() || !right.is_numeric() {
        return Any;
    }
    match (op, left, right) {
        (_, Decimal, _) | (_, _, Decimal) => Decimal,
        (BinaryOp::Div, _, _) => Double,
        (BinaryOp::Pow, Long, Long) => Any,
        (_, Long, Long) => Long,
        _ => Double,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn arithmetic_result_types() {
        assert_eq!(binary_type(BinaryOp::Add, TypeName::Long, TypeName::Long), TypeName::Long);
        assert_eq!(binary_type(BinaryOp::Div, TypeName::Long, TypeName::Long), TypeName::Double);
        assert_eq!(binary_type(BinaryOp::Pow, TypeName::Long, TypeName::Long), TypeName::Any);
        assert_eq!(binary_type(BinaryOp::Mul, TypeName::Long, TypeName::Double), TypeName::Double);
        assert_eq!(binary_type(BinaryOp::Sub, TypeName::Double, TypeName::Decimal), TypeName::Decimal);
        assert_eq!(binary_type(BinaryOp::Add, TypeName::String, TypeName::Long), TypeName::Any);
    }

    #[test]
    fn concat_and_comparison_types() {
        assert_eq!(binary_type(BinaryOp::Concat, TypeName::Long, TypeName::String), TypeName::String);
        assert_eq!(binary_type(BinaryOp::Concat, TypeName::List, TypeName::List), TypeName::List);
        assert_eq!(binary_type(BinaryOp::Concat, TypeName::Any, TypeName::String), TypeName::Any);
        assert_eq!(binary_type(BinaryOp::Lt, TypeName::Any, TypeName::Any), TypeName::Boolean);
        assert_eq!(unary_type(UnaryOp::Neg, TypeName::Double), TypeName::Double);
        assert_eq!(unary_type(UnaryOp::Neg, TypeName::String), TypeName::Any);
    }
}
