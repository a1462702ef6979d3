//! Expression nodes of the typed IR.
//!
//! Unlike an arena-based AST, each node owns its children directly. The
//! partial interpreter rebuilds nodes bottom-up, so owned subtrees let a
//! rewrite replace any child without touching the rest of the tree.

use super::{Constant, FunctionId, Local, Name, Span, Type};

/// An IR expression: a node kind plus its static type and source position.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: Type,
    pub span: Span,
}

impl Expr {
    #[inline]
    pub fn new(kind: ExprKind, ty: Type, span: Span) -> Self {
        Expr { kind, ty, span }
    }

    /// A literal with the payload's natural type.
    pub fn constant(value: Constant, span: Span) -> Self {
        let ty = value.ty();
        Expr::new(ExprKind::Const(value), ty, span)
    }

    /// An empty `Unit` block, the residue of a statement that folded away.
    pub fn empty_block(span: Span) -> Self {
        Expr::new(ExprKind::Block(Vec::new()), Type::Unit, span)
    }

    pub fn is_empty_unit_block(&self) -> bool {
        matches!(&self.kind, ExprKind::Block(stmts) if stmts.is_empty()) && self.ty.is_unit()
    }

    #[inline]
    pub fn as_constant(&self) -> Option<&Constant> {
        match &self.kind {
            ExprKind::Const(c) => Some(c),
            _ => None,
        }
    }

    /// The variable declared by this node, if it is a declaration.
    #[inline]
    pub fn as_declaration(&self) -> Option<&VarDecl> {
        match &self.kind {
            ExprKind::Variable(decl) => Some(decl),
            _ => None,
        }
    }

    /// Short node-kind name for logs and failure messages.
    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }
}

/// Node kinds.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExprKind {
    /// Literal.
    Const(Constant),
    /// Variable read.
    GetValue(Local),
    /// Variable write: `x = value`.
    SetVariable { local: Local, value: Box<Expr> },
    /// Local declaration: `val x = init` / `var x`.
    Variable(VarDecl),
    /// Call of a function, getter or intrinsic operator.
    Call(Call),
    ConstructorCall(ConstructorCall),
    EnumConstructorCall(ConstructorCall),
    /// `super(...)`/`this(...)` call inside a constructor.
    DelegatingConstructorCall(ConstructorCall),
    InstanceInitializerCall { class: Name },
    /// Statement sequence; evaluates to its last statement.
    Block(Vec<Expr>),
    Return { target: FunctionId, value: Box<Expr> },
    GetField { receiver: Option<Box<Expr>>, field: Name },
    SetField { receiver: Option<Box<Expr>>, field: Name, value: Box<Expr> },
    /// Cast or instance check.
    TypeOperator { op: TypeOp, operand: Box<Expr>, type_operand: Type },
    /// Multi-branch conditional; `if` is a two-branch `when`.
    When(Vec<Branch>),
    Loop(Loop),
    Break { label: Option<Name> },
    Continue { label: Option<Name> },
    Vararg(Vec<Expr>),
    Throw(Box<Expr>),
    StringConcat(Vec<Expr>),
    FunctionReference(FunctionId),
}

impl ExprKind {
    pub fn name(&self) -> &'static str {
        match self {
            ExprKind::Const(_) => "Const",
            ExprKind::GetValue(_) => "GetValue",
            ExprKind::SetVariable { .. } => "SetVariable",
            ExprKind::Variable(_) => "Variable",
            ExprKind::Call(_) => "Call",
            ExprKind::ConstructorCall(_) => "ConstructorCall",
            ExprKind::EnumConstructorCall(_) => "EnumConstructorCall",
            ExprKind::DelegatingConstructorCall(_) => "DelegatingConstructorCall",
            ExprKind::InstanceInitializerCall { .. } => "InstanceInitializerCall",
            ExprKind::Block(_) => "Block",
            ExprKind::Return { .. } => "Return",
            ExprKind::GetField { .. } => "GetField",
            ExprKind::SetField { .. } => "SetField",
            ExprKind::TypeOperator { .. } => "TypeOperator",
            ExprKind::When(_) => "When",
            ExprKind::Loop(_) => "Loop",
            ExprKind::Break { .. } => "Break",
            ExprKind::Continue { .. } => "Continue",
            ExprKind::Vararg(_) => "Vararg",
            ExprKind::Throw(_) => "Throw",
            ExprKind::StringConcat(_) => "StringConcat",
            ExprKind::FunctionReference(_) => "FunctionReference",
        }
    }
}

/// A call site.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Call {
    pub callee: FunctionId,
    pub dispatch_receiver: Option<Box<Expr>>,
    pub extension_receiver: Option<Box<Expr>>,
    pub args: Vec<Expr>,
}

/// A constructor invocation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConstructorCall {
    pub constructor: FunctionId,
    pub class: Name,
    pub args: Vec<Expr>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VarDecl {
    pub local: Local,
    pub mutable: bool,
    pub initializer: Option<Box<Expr>>,
}

/// One `condition -> result` arm of a `when`.
///
/// An `else` arm has the literal `true` as its condition.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Branch {
    pub condition: Expr,
    pub result: Expr,
    pub span: Span,
}

impl Branch {
    pub fn is_else(&self) -> bool {
        matches!(self.condition.as_constant(), Some(Constant::Boolean(true)))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LoopKind {
    While,
    DoWhile,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Loop {
    pub kind: LoopKind,
    pub label: Option<Name>,
    pub condition: Box<Expr>,
    pub body: Option<Box<Expr>>,
}

impl Loop {
    /// Whether a `break`/`continue` with `label` refers to this loop.
    ///
    /// Unlabelled jumps target the innermost loop; callers only ask this
    /// question of the innermost loop for unlabelled jumps.
    #[inline]
    pub fn is_targeted_by(&self, label: Option<Name>) -> bool {
        match label {
            None => true,
            Some(label) => self.label == Some(label),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeOp {
    Cast,
    SafeCast,
    InstanceOf,
    NotInstanceOf,
    ImplicitCoercion,
}

impl TypeOp {
    pub fn symbol(self) -> &'static str {
        match self {
            TypeOp::Cast | TypeOp::ImplicitCoercion => "as",
            TypeOp::SafeCast => "as?",
            TypeOp::InstanceOf => "is",
            TypeOp::NotInstanceOf => "!is",
        }
    }
}
