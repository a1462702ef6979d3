//! Kiln IR - typed intermediate representation
//!
//! The tree the partial evaluator consumes and rewrites:
//! - Spans for source locations
//! - Names for interned identifiers
//! - Types and literal constants
//! - Expression nodes, bodies, functions and files
//! - The callable table (`FunctionTable`) with per-callable flags
//! - Visitors, a builder, and a textual dump
//!
//! # Design
//!
//! - **Owned trees**: each node owns its children (`Box`/`Vec`), so a
//!   rewrite can replace any subtree in isolation.
//! - **Intern names**: identifiers, classes, fields and file paths are
//!   `Name(u32)`.
//! - **Callees by id**: call sites carry a `FunctionId`; what the callee is
//!   lives in the `FunctionTable`.
//!
//! Types that contain floats store them as bits so every node is `Eq + Hash`.

mod builder;
mod constant;
pub mod dump;
mod expr;
mod function;
mod function_table;
mod ids;
mod interner;
mod name;
mod span;
mod ty;
pub mod visitor;

pub use builder::IrBuilder;
pub use constant::Constant;
pub use dump::Printer;
pub use expr::{
    Branch, Call, ConstructorCall, Expr, ExprKind, Loop, LoopKind, TypeOp, VarDecl,
};
pub use function::{Body, Function, IrFile, Param, SyntheticKind};
pub use function_table::{FunctionFlags, FunctionInfo, FunctionKind, FunctionTable, Intrinsic};
pub use ids::{FunctionId, Local, VarId};
pub use interner::{SharedInterner, StringInterner};
pub use name::Name;
pub use span::Span;
pub use ty::Type;
pub use visitor::{MutVisitor, Visitor};
