//! Functions, bodies and files.

use super::{Expr, FunctionId, Local, Name, Span, Type};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Param {
    pub local: Local,
    pub ty: Type,
}

/// Compiler-generated body with no IR statements.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SyntheticKind {
    EnumValues,
    EnumValueOf,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Body {
    /// `{ ... }` body.
    Block { statements: Vec<Expr>, span: Span },
    /// `= expr` body.
    Expression(Expr),
    Synthetic(SyntheticKind),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Function {
    pub id: FunctionId,
    pub name: Name,
    pub params: Vec<Param>,
    pub return_ty: Type,
    /// `None` for declarations without a body (external, abstract).
    pub body: Option<Body>,
    pub span: Span,
}

/// A source file: the unit the lowering pass runs over.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IrFile {
    /// Interned file path.
    pub path: Name,
    pub functions: Vec<Function>,
}
