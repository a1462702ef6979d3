//! IR types.

use super::Name;

/// Static type of an IR node.
///
/// Only the distinctions the partial interpreter cares about are modelled:
/// `Unit` (block collapse), the primitive types a literal can carry, and
/// opaque class/array types for complex values.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Unit,
    Nothing,
    Any,
    Boolean,
    Char,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
    Class(Name),
    Array(Box<Type>),
    Nullable(Box<Type>),
}

impl Type {
    #[inline]
    pub fn is_unit(&self) -> bool {
        matches!(self, Type::Unit)
    }

    /// Numbers, booleans and chars.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Type::Boolean
                | Type::Char
                | Type::Byte
                | Type::Short
                | Type::Int
                | Type::Long
                | Type::Float
                | Type::Double
        )
    }

    #[must_use]
    pub fn nullable(self) -> Type {
        match self {
            Type::Nullable(_) => self,
            other => Type::Nullable(Box::new(other)),
        }
    }
}
