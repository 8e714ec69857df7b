//! Operation kinds.

use smallvec::SmallVec;

use super::{ConstantId, FunctionId, OpId};
use crate::{BinaryOp, Name, TypeName, UnaryOp};

/// How an arithmetic or comparison op is dispatched at runtime.
///
/// Specialized variants take a fast path when both operands have the named
/// kind and fall back to the generic operator otherwise.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub enum Dispatch {
    #[default]
    Generic,
    Long,
    Double,
    String,
    Boolean,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ListElem {
    Item(OpId),
    Spread(OpId),
}

#[derive(Clone, Debug, PartialEq)]
pub enum DictElem {
    Entry { key: OpId, value: OpId },
    Spread(OpId),
}

/// One lazily initialized slot of a `let` group.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupSlot {
    pub name: Name,
    pub init: OpId,
    pub ty: Option<TypeName>,
}

/// Where a closure capture is loaded from when the closure is created.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum CaptureLoad {
    /// A value in a frame of the creating activation.
    LocalValue { depth: u32, slot: u32 },
    /// A whole `let` group frame of the creating activation.
    LocalGroup { depth: u32 },
    /// A capture of the creating closure, passed through.
    Capture(u32),
}

/// One clause of a `for` comprehension.
#[derive(Clone, Debug, PartialEq)]
pub enum ForStep {
    /// Iterate `source`, binding each element in a new one-slot frame.
    Generator { source: OpId, ty: Option<TypeName> },
    /// Bind `init` in a new one-slot frame.
    Local { init: OpId, ty: Option<TypeName> },
    /// Skip the iteration unless `cond` is truthy.
    Filter(OpId),
}

#[derive(Clone, Debug, PartialEq)]
pub enum PatternOp {
    Default,
    Capture(u32),
    Type { ty: TypeName, capture: Option<u32> },
    List(Vec<PatternOp>),
    Value(OpId),
}

#[derive(Clone, Debug, PartialEq)]
pub struct MatchArmOp {
    pub pattern: PatternOp,
    pub guard: Option<OpId>,
    pub body: OpId,
    /// Number of captures the pattern binds.
    pub slots: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum OpKind {
    Constant(ConstantId),
    Local {
        depth: u32,
        slot: u32,
    },
    Capture(u32),
    CapturedSlot {
        capture: u32,
        slot: u32,
    },
    LibraryVar {
        library: u32,
        slot: u32,
    },

    MakeList(Vec<ListElem>),
    MakeDict(Vec<DictElem>),
    Call {
        callee: OpId,
        args: SmallVec<[OpId; 4]>,
    },
    Index {
        target: OpId,
        key: OpId,
    },
    Unary {
        op: UnaryOp,
        operand: OpId,
        dispatch: Dispatch,
    },
    Binary {
        op: BinaryOp,
        left: OpId,
        right: OpId,
        dispatch: Dispatch,
    },
    Logical {
        op: LogicalOp,
        left: OpId,
        right: OpId,
    },
    Cast {
        operand: OpId,
        ty: TypeName,
    },
    Is {
        operand: OpId,
        ty: TypeName,
    },

    If {
        cond: OpId,
        then_branch: OpId,
        else_branch: OpId,
    },
    /// Push a lazily initialized group frame and evaluate `body` in it.
    Let {
        slots: Vec<GroupSlot>,
        body: OpId,
    },
    MakeClosure {
        function: FunctionId,
        captures: Vec<CaptureLoad>,
        /// Parameter defaults, evaluated when the closure is created.
        defaults: Vec<Option<OpId>>,
    },
    For {
        steps: Vec<ForStep>,
        body: OpId,
    },
    Match {
        subject: OpId,
        arms: Vec<MatchArmOp>,
    },
    /// Evaluate `body`; on a catchable failure evaluate `handler` in a new
    /// frame holding the error value when `binds` is set.
    Try {
        body: OpId,
        handler: OpId,
        binds: bool,
    },
    Throw(OpId),
    Debug(OpId),
}

impl OpKind {
    /// Short name for tracing and debug hooks.
    pub const fn name(&self) -> &'static str {
        match self {
            OpKind::Constant(_) => "constant",
            OpKind::Local { .. } => "local",
            OpKind::Capture(_) => "capture",
            OpKind::CapturedSlot { .. } => "captured_slot",
            OpKind::LibraryVar { .. } => "library_var",
            OpKind::MakeList(_) => "list",
            OpKind::MakeDict(_) => "dict",
            OpKind::Call { .. } => "call",
            OpKind::Index { .. } => "index",
            OpKind::Unary { .. } => "unary",
            OpKind::Binary { .. } => "binary",
            OpKind::Logical { .. } => "logical",
            OpKind::Cast { .. } => "cast",
            OpKind::Is { .. } => "is",
            OpKind::If { .. } => "if",
            OpKind::Let { .. } => "let",
            OpKind::MakeClosure { .. } => "closure",
            OpKind::For { .. } => "for",
            OpKind::Match { .. } => "match",
            OpKind::Try { .. } => "try",
            OpKind::Throw(_) => "throw",
            OpKind::Debug(_) => "debug",
        }
    }

    /// Call `f` for every operand op, in evaluation order.
    pub fn for_each_operand(&self, mut f: impl FnMut(OpId)) {
        match self {
            OpKind::Constant(_)
            | OpKind::Local { .. }
            | OpKind::Capture(_)
            | OpKind::CapturedSlot { .. }
            | OpKind::LibraryVar { .. } => {}
            OpKind::MakeList(items) => {
                for item in items {
                    match item {
                        ListElem::Item(op) | ListElem::Spread(op) => f(*op),
                    }
                }
            }
            OpKind::MakeDict(items) => {
                for item in items {
                    match item {
                        DictElem::Entry { key, value } => {
                            f(*key);
                            f(*value);
                        }
                        DictElem::Spread(op) => f(*op),
                    }
                }
            }
            OpKind::Call { callee, args } => {
                f(*callee);
                for arg in args {
                    f(*arg);
                }
            }
            OpKind::Index { target: a, key: b }
            | OpKind::Binary {
                left: a, right: b, ..
            }
            | OpKind::Logical {
                left: a, right: b, ..
            } => {
                f(*a);
                f(*b);
            }
            OpKind::Unary { operand, .. }
            | OpKind::Cast { operand, .. }
            | OpKind::Is { operand, .. }
            | OpKind::Throw(operand)
            | OpKind::Debug(operand) => f(*operand),
            OpKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                f(*cond);
                f(*then_branch);
                f(*else_branch);
            }
            OpKind::Let { slots, body } => {
                for slot in slots {
                    f(slot.init);
                }
                f(*body);
            }
            OpKind::MakeClosure { defaults, .. } => {
                for op in defaults.iter().flatten() {
                    f(*op);
                }
            }
            OpKind::For { steps, body } => {
                for step in steps {
                    match step {
                        ForStep::Generator { source: op, .. }
                        | ForStep::Local { init: op, .. }
                        | ForStep::Filter(op) => f(*op),
                    }
                }
                f(*body);
            }
            OpKind::Match { subject, arms } => {
                f(*subject);
                for arm in arms {
                    pattern_operands(&arm.pattern, &mut f);
                    if let Some(guard) = arm.guard {
                        f(guard);
                    }
                    f(arm.body);
                }
            }
            OpKind::Try { body, handler, .. } => {
                f(*body);
                f(*handler);
            }
        }
    }
}

fn pattern_operands(pattern: &PatternOp, f: &mut impl FnMut(OpId)) {
    match pattern {
        PatternOp::Value(op) => f(*op),
        PatternOp::List(items) => {
            for item in items {
                pattern_operands(item, f);
            }
        }
        PatternOp::Default | PatternOp::Capture(_) | PatternOp::Type { .. } => {}
    }
}
