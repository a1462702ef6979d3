//! Results of folding a node.

use kiln_ir::{Expr, Name};

use crate::Value;

/// A node the walker finished with.
#[derive(Clone, Debug, PartialEq)]
pub enum Folded {
    /// The node was rewritten. `value` is its value when known.
    Evaluated { expr: Expr, value: Option<Value> },
    /// The node stays as it was.
    Unchanged { value: Option<Value> },
}

impl Folded {
    #[inline]
    pub fn unchanged(value: Option<Value>) -> Self {
        Folded::Unchanged { value }
    }

    #[inline]
    pub fn evaluated(expr: Expr, value: Option<Value>) -> Self {
        Folded::Evaluated { expr, value }
    }

    #[inline]
    pub fn value(&self) -> Option<&Value> {
        match self {
            Folded::Evaluated { value, .. } | Folded::Unchanged { value } => value.as_ref(),
        }
    }

    #[inline]
    pub fn into_value(self) -> Option<Value> {
        match self {
            Folded::Evaluated { value, .. } | Folded::Unchanged { value } => value,
        }
    }

    /// The replacement node, or a clone of `original` when unchanged.
    pub fn into_expr(self, original: &Expr) -> Expr {
        match self {
            Folded::Evaluated { expr, .. } => expr,
            Folded::Unchanged { .. } => original.clone(),
        }
    }

    #[inline]
    pub fn is_evaluated(&self) -> bool {
        matches!(self, Folded::Evaluated { .. })
    }
}

/// Where a control transfer is headed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Jump {
    Return,
    Break(Option<Name>),
    Continue(Option<Name>),
}

/// Folding stopped short of a value.
#[derive(Clone, Debug, PartialEq)]
pub enum Halt {
    /// The node cannot be simulated. Any state it may have touched has
    /// already been made opaque.
    NotInterpretable,
    /// Simulated execution left the node through `jump`. `expr` is the
    /// rewritten node when something inside it changed.
    ControlTransfer { jump: Jump, expr: Option<Expr> },
}

impl Halt {
    #[inline]
    pub fn transfer(jump: Jump, expr: Option<Expr>) -> Self {
        Halt::ControlTransfer { jump, expr }
    }
}

pub type FoldResult = Result<Folded, Halt>;
