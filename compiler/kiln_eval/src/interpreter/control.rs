//! `when`, loops, `return`, `break` and `continue`.

use std::mem;

use kiln_diagnostic::{Diagnostic, ErrorCode};
use kiln_ir::{Branch, Expr, ExprKind, FunctionId, Loop, LoopKind};
use tracing::{trace, warn};

use super::PartialInterpreter;
use crate::{FoldResult, Folded, FrameKind, Halt, Jump};

enum LoopOutcome {
    /// The condition became false or a `break` targeted the loop.
    Completed,
    /// Control left through a `return` or a jump to an outer loop.
    Transfer(Jump),
    /// Some iteration could not be simulated.
    Abandoned,
    /// The iteration budget ran out.
    Exhausted,
}

/// What one simulated iteration asks of the loop.
enum Step {
    Next,
    Stop(LoopOutcome),
}

impl PartialInterpreter<'_> {
    pub(super) fn fold_return(&mut self, expr: &Expr, target: FunctionId, value: &Expr) -> FoldResult {
        let rebuild = |value: Expr| {
            let kind = ExprKind::Return {
                target,
                value: Box::new(value),
            };
            Expr::new(kind, expr.ty.clone(), expr.span)
        };
        match self.fold(value) {
            Ok(Folded::Evaluated { expr: value, .. }) => {
                Err(Halt::transfer(Jump::Return, Some(rebuild(value))))
            }
            Ok(Folded::Unchanged { .. }) | Err(Halt::NotInterpretable) => {
                Err(Halt::transfer(Jump::Return, None))
            }
            Err(Halt::ControlTransfer { jump, expr: value }) => {
                Err(Halt::transfer(jump, value.map(rebuild)))
            }
        }
    }

    /// Branches are tried in source order. The first one whose condition is
    /// known true replaces the whole `when`; an unknown condition keeps it.
    pub(super) fn fold_when(&mut self, expr: &Expr, branches: &[Branch]) -> FoldResult {
        for (index, branch) in branches.iter().enumerate() {
            let condition = match self.fold(&branch.condition) {
                Ok(folded) => folded.value().and_then(|v| v.as_bool()),
                Err(Halt::NotInterpretable) => None,
                Err(Halt::ControlTransfer { jump, .. }) => return Err(Halt::transfer(jump, None)),
            };
            match condition {
                Some(false) => {}
                Some(true) => return self.take_branch(expr, branches, index),
                None => {
                    trace!(span = ?branch.span, "branch condition unknown");
                    self.revert(expr);
                    return Ok(Folded::unchanged(None));
                }
            }
        }

        // No branch runs.
        if expr.ty.is_unit() && self.conditions_pure(branches) {
            Ok(Folded::evaluated(Expr::empty_block(expr.span), None))
        } else {
            self.revert(expr);
            Ok(Folded::unchanged(None))
        }
    }

    fn take_branch(&mut self, expr: &Expr, branches: &[Branch], index: usize) -> FoldResult {
        if !self.conditions_pure(&branches[..=index]) {
            self.revert(expr);
            return Ok(Folded::unchanged(None));
        }

        let result = &branches[index].result;
        match self.fold(result) {
            Ok(Folded::Evaluated { expr, value }) => Ok(Folded::evaluated(expr, value)),
            Ok(Folded::Unchanged { value }) => Ok(Folded::evaluated(result.clone(), value)),
            Err(Halt::NotInterpretable) => Ok(Folded::evaluated(result.clone(), None)),
            Err(Halt::ControlTransfer { jump, expr }) => Err(Halt::transfer(
                jump,
                Some(expr.unwrap_or_else(|| result.clone())),
            )),
        }
    }

    /// Conditions that are dropped from the tree must not have effects.
    fn conditions_pure(&self, branches: &[Branch]) -> bool {
        branches.iter().all(|branch| self.is_pure(&branch.condition))
    }

    /// Simulate the loop. The loop node itself always stays.
    pub(super) fn fold_loop(&mut self, expr: &Expr, lp: &Loop) -> FoldResult {
        let saved = mem::replace(&mut self.uncertain_jump, false);
        let outcome = self.simulate_loop(lp);
        self.uncertain_jump = saved;

        match outcome {
            LoopOutcome::Completed => Ok(Folded::unchanged(None)),
            LoopOutcome::Transfer(jump) => Err(Halt::transfer(jump, None)),
            LoopOutcome::Abandoned => {
                trace!(span = ?expr.span, "loop abandoned");
                self.revert(expr);
                Err(Halt::NotInterpretable)
            }
            LoopOutcome::Exhausted => {
                let limit = self.max_loop_iterations;
                warn!(limit, span = ?expr.span, "loop iteration budget exhausted");
                self.diagnostics.push(
                    Diagnostic::warning(ErrorCode::P0001)
                        .with_label(expr.span, format!("gave up after {limit} iterations")),
                );
                self.revert(expr);
                Err(Halt::NotInterpretable)
            }
        }
    }

    fn simulate_loop(&mut self, lp: &Loop) -> LoopOutcome {
        let mut iterations: u32 = 0;
        loop {
            if lp.kind == LoopKind::While {
                match self.loop_condition(lp) {
                    Some(true) => {}
                    Some(false) => return LoopOutcome::Completed,
                    None => return LoopOutcome::Abandoned,
                }
            }
            if iterations >= self.max_loop_iterations {
                return LoopOutcome::Exhausted;
            }
            iterations += 1;

            match self.with_frame(FrameKind::Sub, |walker| walker.iteration(lp)) {
                Step::Next => {}
                Step::Stop(outcome) => return outcome,
            }
        }
    }

    /// One pass through the body. A `do-while` condition is tested inside
    /// the iteration's frame so it sees the body's declarations.
    fn iteration(&mut self, lp: &Loop) -> Step {
        self.uncertain_jump = false;
        let jump = match lp.body.as_deref() {
            None => None,
            // Rewrites inside the body are discarded, so a block body is
            // folded directly in the iteration frame.
            Some(Expr {
                kind: ExprKind::Block(statements),
                ..
            }) => self.fold_statements(statements).jump,
            Some(body) => match self.fold(body) {
                Ok(_) => None,
                Err(Halt::NotInterpretable) => return Step::Stop(LoopOutcome::Abandoned),
                Err(Halt::ControlTransfer { jump, .. }) => Some(jump),
            },
        };
        if self.uncertain_jump {
            return Step::Stop(LoopOutcome::Abandoned);
        }

        match jump {
            None => {}
            Some(Jump::Break(label)) if lp.is_targeted_by(label) => {
                return Step::Stop(LoopOutcome::Completed);
            }
            Some(Jump::Continue(label)) if lp.is_targeted_by(label) => {}
            Some(jump) => return Step::Stop(LoopOutcome::Transfer(jump)),
        }

        if lp.kind == LoopKind::DoWhile {
            return match self.loop_condition(lp) {
                Some(true) => Step::Next,
                Some(false) => Step::Stop(LoopOutcome::Completed),
                None => Step::Stop(LoopOutcome::Abandoned),
            };
        }
        Step::Next
    }

    fn loop_condition(&mut self, lp: &Loop) -> Option<bool> {
        match self.fold(&lp.condition) {
            Ok(folded) => folded.value().and_then(|v| v.as_bool()),
            Err(_) => None,
        }
    }
}
