//! Literal payloads.
//!
//! Floats are stored as their bit patterns so `Constant` (and every node
//! that embeds one) can be `Eq` and `Hash`.

use std::fmt;
use std::sync::Arc;

use super::{Expr, ExprKind, Span, Type};

/// Payload of a literal node.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Constant {
    Null,
    Boolean(bool),
    Char(char),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    /// `f32` bits.
    Float(u32),
    /// `f64` bits.
    Double(u64),
    String(Arc<str>),
}

impl Constant {
    pub fn float(value: f32) -> Self {
        Constant::Float(value.to_bits())
    }

    pub fn double(value: f64) -> Self {
        Constant::Double(value.to_bits())
    }

    pub fn string(value: &str) -> Self {
        Constant::String(Arc::from(value))
    }

    /// The natural type of the literal.
    pub fn ty(&self) -> Type {
        match self {
            Constant::Null => Type::Nothing.nullable(),
            Constant::Boolean(_) => Type::Boolean,
            Constant::Char(_) => Type::Char,
            Constant::Byte(_) => Type::Byte,
            Constant::Short(_) => Type::Short,
            Constant::Int(_) => Type::Int,
            Constant::Long(_) => Type::Long,
            Constant::Float(_) => Type::Float,
            Constant::Double(_) => Type::Double,
            Constant::String(_) => Type::String,
        }
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Constant::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Build a literal node for this payload.
    ///
    /// `ty` and `span` come from the node being replaced so the literal keeps
    /// its declared type and source position.
    pub fn to_literal(&self, ty: Type, span: Span) -> Expr {
        Expr::new(ExprKind::Const(self.clone()), ty, span)
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Null => write!(f, "null"),
            Constant::Boolean(b) => write!(f, "{b}"),
            Constant::Char(c) => write!(f, "'{}'", c.escape_default()),
            Constant::Byte(v) => write!(f, "{v}"),
            Constant::Short(v) => write!(f, "{v}"),
            Constant::Int(v) => write!(f, "{v}"),
            Constant::Long(v) => write!(f, "{v}L"),
            Constant::Float(bits) => write!(f, "{:?}F", f32::from_bits(*bits)),
            Constant::Double(bits) => write!(f, "{:?}", f64::from_bits(*bits)),
            Constant::String(s) => write!(f, "\"{}\"", s.escape_default()),
        }
    }
}
