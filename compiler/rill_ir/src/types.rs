//! Type names as written in declarations, casts and type tests.

use std::fmt;

/// A Rill type.
///
/// Every runtime value has exactly one of these kinds, except `Any`, which
/// only appears in declarations and static types.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TypeName {
    Any,
    Void,
    Boolean,
    Long,
    Double,
    Decimal,
    String,
    DateTime,
    List,
    Dict,
    Function,
}

impl TypeName {
    pub const ALL: [TypeName; 11] = [
        TypeName::Any,
        TypeName::Void,
        TypeName::Boolean,
        TypeName::Long,
        TypeName::Double,
        TypeName::Decimal,
        TypeName::String,
        TypeName::DateTime,
        TypeName::List,
        TypeName::Dict,
        TypeName::Function,
    ];

    /// The keyword spelling of this type.
    pub const fn keyword(self) -> &'static str {
        match self {
            TypeName::Any => "any",
            TypeName::Void => "void",
            TypeName::Boolean => "boolean",
            TypeName::Long => "long",
            TypeName::Double => "double",
            TypeName::Decimal => "decimal",
            TypeName::String => "string",
            TypeName::DateTime => "datetime",
            TypeName::List => "list",
            TypeName::Dict => "dict",
            TypeName::Function => "function",
        }
    }

    pub fn from_keyword(s: &str) -> Option<TypeName> {
        TypeName::ALL.into_iter().find(|t| t.keyword() == s)
    }

    /// Whether the type is one of the three numeric kinds.
    pub const fn is_numeric(self) -> bool {
        matches!(self, TypeName::Long | TypeName::Double | TypeName::Decimal)
    }

    /// Static join used when two branches meet.
    #[must_use]
    pub fn join(self, other: TypeName) -> TypeName {
        if self == other {
            self
        } else {
            TypeName::Any
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
