//! Error types of the partial evaluator.

use kiln_ir::{FunctionId, Name, VarId};
use thiserror::Error;

/// Misuse of the [`FrameStack`](crate::FrameStack).
///
/// These indicate a bug in the walker, never in the program being compiled.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("variable {0:?} is already declared in the current frame")]
    AlreadyDeclared(VarId),
    #[error("variable {0:?} is not tracked by any visible frame")]
    Untracked(VarId),
    #[error("attempted to pop the root frame")]
    PopRoot,
}

/// Failure of the expression evaluator.
///
/// Always recoverable: the walker keeps the node it tried to evaluate.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ExecutionFailure {
    #[error("{0} nodes cannot be executed at compile time")]
    Unsupported(&'static str),
    #[error("unknown callee {0:?}")]
    UnknownCallee(FunctionId),
    #[error("callee {0:?} has no compile-time implementation")]
    NoImplementation(FunctionId),
    #[error("value of {0:?} is not known")]
    UnknownValue(VarId),
    #[error("exception thrown: {0}")]
    Thrown(String),
    #[error("type mismatch: {0}")]
    TypeMismatch(&'static str),
    #[error("object has no field {0:?}")]
    MissingField(Name),
}

impl ExecutionFailure {
    pub(crate) fn division_by_zero() -> Self {
        ExecutionFailure::Thrown("java.lang.ArithmeticException: / by zero".to_owned())
    }
}
