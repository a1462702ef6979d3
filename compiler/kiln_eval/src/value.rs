//! Values tracked during simulated execution.

use std::fmt;

use kiln_ir::{Constant, Type};

/// Handle of an object or array in the expression evaluator's heap.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct ObjectId(u32);

impl ObjectId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        ObjectId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obj#{}", self.0)
    }
}

/// A value known at compile time.
///
/// Only `Primitive` values can be written back into the tree as literals;
/// the conversion lives on [`Constant::to_literal`], so a `Complex` value
/// cannot reach it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Value {
    Primitive(Constant),
    /// Object or array; trackable but not representable as a literal.
    Complex { ty: Type, handle: ObjectId },
}

impl Value {
    #[inline]
    pub fn as_primitive(&self) -> Option<&Constant> {
        match self {
            Value::Primitive(c) => Some(c),
            Value::Complex { .. } => None,
        }
    }

    /// The boolean payload, for resolving conditions.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        self.as_primitive().and_then(Constant::as_bool)
    }

    #[inline]
    pub fn is_complex(&self) -> bool {
        matches!(self, Value::Complex { .. })
    }

    #[inline]
    pub fn int(v: i32) -> Self {
        Value::Primitive(Constant::Int(v))
    }

    #[inline]
    pub fn boolean(v: bool) -> Self {
        Value::Primitive(Constant::Boolean(v))
    }
}

impl From<Constant> for Value {
    fn from(c: Constant) -> Self {
        Value::Primitive(c)
    }
}
