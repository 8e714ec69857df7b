//! Executable operation tree.
//!
//! A [`Program`] owns every operation of one compilation in a flat arena.
//! Children are always allocated before their parents, so a forward pass
//! over the arena visits operands before the operations that use them; the
//! constant folder and specializer rely on that ordering.
//!
//! Variable reads are resolved to addressing modes at build time:
//!
//! | Op                 | Reads                                             |
//! |--------------------|---------------------------------------------------|
//! | `Local`            | frame `depth` levels up in the current activation |
//! | `Capture`          | value captured by the running closure             |
//! | `CapturedSlot`     | slot of a `let` group captured by the closure     |
//! | `LibraryVar`       | lazily initialized library variable               |

mod flags;
mod kind;

pub use flags::FunctionFlags;
pub use kind::{
    CaptureLoad, DictElem, Dispatch, ForStep, GroupSlot, ListElem, LogicalOp, MatchArmOp, OpKind,
    PatternOp,
};

use std::fmt;
use std::sync::Arc;

use crate::{to_u32, ConstValue, Name, Span, TypeName};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub const fn new(index: u32) -> Self {
                $name(index)
            }

            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

define_id!(
    /// Index of an operation in [`Program::ops`].
    OpId,
    "op"
);
define_id!(
    /// Index of a function definition in [`Program::functions`].
    FunctionId,
    "fn"
);
define_id!(
    /// Index into a program's constant pool.
    ConstantId,
    "c"
);

/// One operation.
#[derive(Clone, Debug, PartialEq)]
pub struct OpNode {
    pub kind: OpKind,
    pub span: Span,
    /// Statically known result type, `Any` when unknown.
    pub ty: TypeName,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParamDef {
    pub name: Name,
    pub ty: Option<TypeName>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FunctionCode {
    Op(OpId),
    /// Host function looked up in the native registry at call time.
    Native(Arc<str>),
}

/// A lowered function literal. Closures over it are created by
/// [`OpKind::MakeClosure`].
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDef {
    /// Name of the binding the literal was assigned to, for diagnostics.
    pub name: Option<Name>,
    pub params: Vec<ParamDef>,
    pub return_type: Option<TypeName>,
    pub body: FunctionCode,
    pub capture_count: u32,
    pub flags: FunctionFlags,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LibraryVarCode {
    pub name: Name,
    pub init: OpId,
    pub ty: Option<TypeName>,
    pub span: Span,
}

/// The lowered form of one library.
#[derive(Clone, Debug, PartialEq)]
pub struct LibraryCode {
    /// Canonical name of the owning unit.
    pub module: Arc<str>,
    pub name: Name,
    pub exported: bool,
    pub vars: Vec<LibraryVarCode>,
}

impl LibraryCode {
    pub fn var_slot(&self, name: Name) -> Option<usize> {
        self.vars.iter().position(|v| v.name == name)
    }
}

/// Constants referenced by [`OpKind::Constant`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConstantPool {
    values: Vec<ConstValue>,
}

impl ConstantPool {
    pub fn push(&mut self, value: ConstValue) -> ConstantId {
        let id = ConstantId::new(to_u32(self.values.len(), "constants"));
        self.values.push(value);
        id
    }

    #[inline]
    pub fn get(&self, id: ConstantId) -> &ConstValue {
        &self.values[id.index()]
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A fully lowered compilation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Program {
    pub ops: Vec<OpNode>,
    pub functions: Vec<FunctionDef>,
    pub constants: ConstantPool,
    pub libraries: Vec<LibraryCode>,
    /// Root of a standalone expression. Module compilations have none.
    pub entry: Option<OpId>,
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }

    pub fn push_op(&mut self, kind: OpKind, span: Span, ty: TypeName) -> OpId {
        let id = OpId::new(to_u32(self.ops.len(), "operations"));
        self.ops.push(OpNode { kind, span, ty });
        id
    }

    pub fn push_constant(&mut self, value: ConstValue, span: Span) -> OpId {
        let ty = value.type_name();
        let id = self.constants.push(value);
        self.push_op(OpKind::Constant(id), span, ty)
    }

    pub fn push_function(&mut self, def: FunctionDef) -> FunctionId {
        let id = FunctionId::new(to_u32(self.functions.len(), "functions"));
        self.functions.push(def);
        id
    }

    #[inline]
    pub fn op(&self, id: OpId) -> &OpNode {
        &self.ops[id.index()]
    }

    #[inline]
    pub fn function(&self, id: FunctionId) -> &FunctionDef {
        &self.functions[id.index()]
    }

    /// The constant an op evaluates to, if it is a constant load.
    pub fn as_constant(&self, id: OpId) -> Option<&ConstValue> {
        match self.op(id).kind {
            OpKind::Constant(c) => Some(self.constants.get(c)),
            _ => None,
        }
    }

    /// Find a library by owning unit and name.
    pub fn library_index(&self, module: &str, name: Name) -> Option<usize> {
        self.libraries
            .iter()
            .position(|lib| &*lib.module == module && lib.name == name)
    }

    /// Ids of all ops, in allocation (bottom-up) order.
    pub fn op_ids(&self) -> impl Iterator<Item = OpId> {
        (0..self.ops.len()).map(|i| OpId::new(to_u32(i, "operations")))
    }
}

#[cfg(test)]
mod tests;
