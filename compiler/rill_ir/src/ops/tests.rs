#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::BinaryOp;
use pretty_assertions::assert_eq;
use smallvec::smallvec;

#[test]
fn constants_carry_their_type() {
    let mut program = Program::new();
    let a = program.push_constant(ConstValue::Long(1), Span::DUMMY);
    let b = program.push_constant(ConstValue::string("x"), Span::DUMMY);
    assert_eq!(program.op(a).ty, TypeName::Long);
    assert_eq!(program.op(b).ty, TypeName::String);
    assert_eq!(program.as_constant(b), Some(&ConstValue::string("x")));
    assert_eq!(program.constants.len(), 2);
}

#[test]
fn operands_precede_their_users() {
    let mut program = Program::new();
    let left = program.push_constant(ConstValue::Long(1), Span::DUMMY);
    let right = program.push_constant(ConstValue::Long(2), Span::DUMMY);
    let sum = program.push_op(
        OpKind::Binary {
            op: BinaryOp::Add,
            left,
            right,
            dispatch: Dispatch::Generic,
        },
        Span::DUMMY,
        TypeName::Long,
    );
    let callee = program.push_op(OpKind::Local { depth: 0, slot: 0 }, Span::DUMMY, TypeName::Any);
    let call = program.push_op(
        OpKind::Call {
            callee,
            args: smallvec![sum],
        },
        Span::DUMMY,
        TypeName::Any,
    );

    for id in program.op_ids() {
        program.op(id).kind.for_each_operand(|operand| assert!(operand < id));
    }
    let mut seen = Vec::new();
    program.op(call).kind.for_each_operand(|op| seen.push(op));
    assert_eq!(seen, vec![callee, sum]);
}

#[test]
fn library_lookup_uses_module_and_name() {
    let mut program = Program::new();
    let init = program.push_constant(ConstValue::Long(1), Span::DUMMY);
    let name = crate::Name::from_raw(3);
    program.libraries.push(LibraryCode {
        module: "main".into(),
        name,
        exported: true,
        vars: vec![LibraryVarCode {
            name: crate::Name::from_raw(4),
            init,
            ty: None,
            span: Span::DUMMY,
        }],
    });
    assert_eq!(program.library_index("main", name), Some(0));
    assert_eq!(program.library_index("other", name), None);
    assert_eq!(program.libraries[0].var_slot(crate::Name::from_raw(4)), Some(0));
}
