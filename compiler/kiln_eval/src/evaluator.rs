//! Contract of the expression evaluator.

use kiln_ir::Expr;

use crate::{ExecutionFailure, FrameStack, Value};

/// Executes a fully folded expression.
///
/// The walker calls this only after every operand of `expr` has been folded
/// to a literal or to a node whose value is tracked in `frames`. A failure is
/// never fatal: the walker keeps the original node.
pub trait ExpressionEvaluator {
    fn interpret(&mut self, expr: &Expr, frames: &FrameStack) -> Result<Value, ExecutionFailure>;
}
