//! Callable metadata.
//!
//! Call sites refer to callees by [`FunctionId`]. The table records what
//! each callee is (an intrinsic operator, a constructor, a property getter
//! or an ordinary function) and the flags the evaluability oracle reads.

use bitflags::bitflags;
use rustc_hash::FxHashMap;

use super::{FunctionId, Name};

bitflags! {
    /// Per-callable properties.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct FunctionFlags: u8 {
        /// Built-in operator with a fixed meaning.
        const INTRINSIC = 1 << 0;
        /// Annotated as evaluable at compile time.
        const COMPILE_TIME = 1 << 1;
        /// Has an IR body in the current module.
        const HAS_BODY = 1 << 2;
    }
}

/// Built-in operators.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Intrinsic {
    Plus,
    Minus,
    Times,
    Div,
    Rem,
    UnaryMinus,
    Not,
    And,
    Or,
    Equals,
    NotEquals,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    ToString,
    ArraySize,
    ArrayGet,
}

impl Intrinsic {
    pub const ALL: [Intrinsic; 18] = [
        Intrinsic::Plus,
        Intrinsic::Minus,
        Intrinsic::Times,
        Intrinsic::Div,
        Intrinsic::Rem,
        Intrinsic::UnaryMinus,
        Intrinsic::Not,
        Intrinsic::And,
        Intrinsic::Or,
        Intrinsic::Equals,
        Intrinsic::NotEquals,
        Intrinsic::Less,
        Intrinsic::LessOrEqual,
        Intrinsic::Greater,
        Intrinsic::GreaterOrEqual,
        Intrinsic::ToString,
        Intrinsic::ArraySize,
        Intrinsic::ArrayGet,
    ];

    /// Infix operator symbol for binary operators.
    pub fn infix_symbol(self) -> Option<&'static str> {
        Some(match self {
            Intrinsic::Plus => "+",
            Intrinsic::Minus => "-",
            Intrinsic::Times => "*",
            Intrinsic::Div => "/",
            Intrinsic::Rem => "%",
            Intrinsic::And => "&&",
            Intrinsic::Or => "||",
            Intrinsic::Equals => "==",
            Intrinsic::NotEquals => "!=",
            Intrinsic::Less => "<",
            Intrinsic::LessOrEqual => "<=",
            Intrinsic::Greater => ">",
            Intrinsic::GreaterOrEqual => ">=",
            Intrinsic::UnaryMinus
            | Intrinsic::Not
            | Intrinsic::ToString
            | Intrinsic::ArraySize
            | Intrinsic::ArrayGet => return None,
        })
    }

    /// Source-level name, used when registering the operator.
    pub fn name(self) -> &'static str {
        match self {
            Intrinsic::Plus => "plus",
            Intrinsic::Minus => "minus",
            Intrinsic::Times => "times",
            Intrinsic::Div => "div",
            Intrinsic::Rem => "rem",
            Intrinsic::UnaryMinus => "unaryMinus",
            Intrinsic::Not => "not",
            Intrinsic::And => "and",
            Intrinsic::Or => "or",
            Intrinsic::Equals => "equals",
            Intrinsic::NotEquals => "notEquals",
            Intrinsic::Less => "less",
            Intrinsic::LessOrEqual => "lessOrEqual",
            Intrinsic::Greater => "greater",
            Intrinsic::GreaterOrEqual => "greaterOrEqual",
            Intrinsic::ToString => "toString",
            Intrinsic::ArraySize => "size",
            Intrinsic::ArrayGet => "get",
        }
    }

    /// Whether the operator produces a `Boolean` regardless of operand type.
    pub fn is_predicate(self) -> bool {
        matches!(
            self,
            Intrinsic::Not
                | Intrinsic::And
                | Intrinsic::Or
                | Intrinsic::Equals
                | Intrinsic::NotEquals
                | Intrinsic::Less
                | Intrinsic::LessOrEqual
                | Intrinsic::Greater
                | Intrinsic::GreaterOrEqual
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FunctionKind {
    Intrinsic(Intrinsic),
    /// Primary constructor; arguments initialize `fields` in order.
    Constructor { class: Name, fields: Vec<Name> },
    /// Property getter reading `field` of its dispatch receiver.
    Getter { field: Name },
    Regular,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionInfo {
    pub name: Name,
    pub kind: FunctionKind,
    pub flags: FunctionFlags,
}

impl FunctionInfo {
    #[inline]
    pub fn is_intrinsic(&self) -> bool {
        self.flags.contains(FunctionFlags::INTRINSIC)
    }

    #[inline]
    pub fn is_compile_time(&self) -> bool {
        self.flags.contains(FunctionFlags::COMPILE_TIME)
    }

    #[inline]
    pub fn intrinsic(&self) -> Option<Intrinsic> {
        match self.kind {
            FunctionKind::Intrinsic(op) => Some(op),
            _ => None,
        }
    }
}

/// Registry of every callable a module refers to.
#[derive(Clone, Debug, Default)]
pub struct FunctionTable {
    functions: FxHashMap<FunctionId, FunctionInfo>,
    next_id: u32,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callable and return its fresh id.
    pub fn register(&mut self, info: FunctionInfo) -> FunctionId {
        let id = FunctionId::from_raw(self.next_id);
        self.next_id += 1;
        self.functions.insert(id, info);
        id
    }

    #[inline]
    pub fn get(&self, id: FunctionId) -> Option<&FunctionInfo> {
        self.functions.get(&id)
    }

    /// Mutable access, e.g. to set `HAS_BODY` once a body is attached.
    #[inline]
    pub fn get_mut(&mut self, id: FunctionId) -> Option<&mut FunctionInfo> {
        self.functions.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
