//! Evaluability oracle: may a call to this callee be evaluated now?

use kiln_ir::{FunctionId, FunctionTable};

use crate::EvalMode;

/// Decides whether a callee may be executed at compile time.
///
/// Must be pure: the walker asks again for the same callee and expects the
/// same answer.
pub trait EvaluabilityOracle {
    fn can_evaluate(&self, callee: FunctionId, mode: EvalMode) -> bool;
}

impl<F> EvaluabilityOracle for F
where
    F: Fn(FunctionId, EvalMode) -> bool,
{
    #[inline]
    fn can_evaluate(&self, callee: FunctionId, mode: EvalMode) -> bool {
        self(callee, mode)
    }
}

/// Oracle answering from the flags recorded in a [`FunctionTable`].
///
/// Unknown callees are never evaluable.
#[derive(Copy, Clone)]
pub struct TableOracle<'a> {
    functions: &'a FunctionTable,
}

impl<'a> TableOracle<'a> {
    pub fn new(functions: &'a FunctionTable) -> Self {
        TableOracle { functions }
    }
}

impl EvaluabilityOracle for TableOracle<'_> {
    fn can_evaluate(&self, callee: FunctionId, mode: EvalMode) -> bool {
        self.functions
            .get(callee)
            .is_some_and(|info| mode.permits(info))
    }
}
