//! Calls, constructor calls and varargs.
//!
//! All three fold their operands left to right and then, when every operand
//! has a known value, hand a substituted copy of the node to the expression
//! evaluator. The substituted copy only feeds the evaluator; what goes back
//! into the tree is either a literal (for a pure node with a primitive
//! value), the node with its folded operands, or the original node.

use kiln_ir::{Call, ConstructorCall, Expr, ExprKind};
use smallvec::SmallVec;
use tracing::{debug, trace};

use super::PartialInterpreter;
use crate::{FoldResult, Folded, Halt, Value};

type Operands<'e> = SmallVec<[&'e Expr; 4]>;
type FoldedOperands = SmallVec<[Folded; 4]>;

impl PartialInterpreter<'_> {
    pub(super) fn fold_call(&mut self, expr: &Expr, call: &Call) -> FoldResult {
        if !self.oracle.can_evaluate(call.callee, self.mode) {
            trace!(callee = ?call.callee, "callee not evaluable");
            self.revert(expr);
            return Ok(Folded::unchanged(None));
        }

        let operands: Operands<'_> = [&call.dispatch_receiver, &call.extension_receiver]
            .into_iter()
            .flatten()
            .map(|receiver| &**receiver)
            .chain(&call.args)
            .collect();
        self.fold_invocation(expr, &operands, |exprs| {
            ExprKind::Call(rebuild_call(call, exprs))
        })
    }

    pub(super) fn fold_constructor_call(&mut self, expr: &Expr, call: &ConstructorCall) -> FoldResult {
        if !self.oracle.can_evaluate(call.constructor, self.mode) {
            trace!(constructor = ?call.constructor, "constructor not evaluable");
            self.revert(expr);
            return Ok(Folded::unchanged(None));
        }

        let operands: Operands<'_> = call.args.iter().collect();
        self.fold_invocation(expr, &operands, |args| {
            ExprKind::ConstructorCall(ConstructorCall {
                constructor: call.constructor,
                class: call.class,
                args,
            })
        })
    }

    /// Elements that all fold give the array value; an element with an
    /// unknown value keeps every original element.
    pub(super) fn fold_vararg(&mut self, expr: &Expr, elements: &[Expr]) -> FoldResult {
        let operands: Operands<'_> = elements.iter().collect();
        let folded = match self.fold_operands(expr, &operands) {
            Ok(folded) => folded,
            Err(early) => return early,
        };

        if folded.iter().any(|f| f.value().is_none()) {
            self.revert(expr);
            return Ok(Folded::unchanged(None));
        }

        let input = Expr::new(
            ExprKind::Vararg(evaluator_inputs(&operands, &folded)),
            expr.ty.clone(),
            expr.span,
        );
        let value = self.evaluator.interpret(&input, &self.frames).ok();

        if folded.iter().any(Folded::is_evaluated) {
            let elements = rebuilt_operands(&operands, folded);
            let rebuilt = Expr::new(ExprKind::Vararg(elements), expr.ty.clone(), expr.span);
            Ok(Folded::evaluated(rebuilt, value))
        } else {
            Ok(Folded::unchanged(value))
        }
    }

    /// Fold `operands` in order. On failure the whole node is reverted and
    /// the value to return is handed back as `Err`.
    fn fold_operands(&mut self, expr: &Expr, operands: &[&Expr]) -> Result<FoldedOperands, FoldResult> {
        let mut folded = FoldedOperands::with_capacity(operands.len());
        for operand in operands {
            match self.fold(operand) {
                Ok(f) => folded.push(f),
                Err(Halt::NotInterpretable) => {
                    self.revert(expr);
                    return Err(Ok(Folded::unchanged(None)));
                }
                Err(Halt::ControlTransfer { jump, .. }) => {
                    self.revert(expr);
                    return Err(Err(Halt::transfer(jump, None)));
                }
            }
        }
        Ok(folded)
    }

    fn fold_invocation(
        &mut self,
        expr: &Expr,
        operands: &[&Expr],
        rebuild: impl Fn(Vec<Expr>) -> ExprKind,
    ) -> FoldResult {
        let folded = match self.fold_operands(expr, operands) {
            Ok(folded) => folded,
            Err(early) => return early,
        };
        if folded.iter().any(|f| f.value().is_none()) {
            self.revert(expr);
            return Ok(Folded::unchanged(None));
        }

        let input = Expr::new(
            rebuild(evaluator_inputs(operands, &folded)),
            expr.ty.clone(),
            expr.span,
        );
        let value = match self.evaluator.interpret(&input, &self.frames) {
            Ok(value) => value,
            Err(failure) => {
                debug!(%failure, kind = expr.kind_name(), span = ?expr.span, "evaluation failed");
                self.revert(expr);
                return Ok(Folded::unchanged(None));
            }
        };

        if let Value::Primitive(c) = &value {
            if self.is_pure(expr) {
                let literal = c.to_literal(expr.ty.clone(), expr.span);
                return Ok(Folded::evaluated(literal, Some(value)));
            }
        }
        if folded.iter().any(Folded::is_evaluated) {
            let rebuilt = Expr::new(
                rebuild(rebuilt_operands(operands, folded)),
                expr.ty.clone(),
                expr.span,
            );
            return Ok(Folded::evaluated(rebuilt, Some(value)));
        }
        Ok(Folded::unchanged(Some(value)))
    }
}

/// Operands as the evaluator sees them: known primitives as literals.
fn evaluator_inputs(operands: &[&Expr], folded: &[Folded]) -> Vec<Expr> {
    operands
        .iter()
        .zip(folded)
        .map(|(original, f)| match (f.value(), f) {
            (Some(Value::Primitive(c)), _) => c.to_literal(original.ty.clone(), original.span),
            (_, Folded::Evaluated { expr, .. }) => expr.clone(),
            (_, Folded::Unchanged { .. }) => (*original).clone(),
        })
        .collect()
}

/// Operands as they go back into the tree.
fn rebuilt_operands(operands: &[&Expr], folded: FoldedOperands) -> Vec<Expr> {
    operands
        .iter()
        .zip(folded)
        .map(|(original, f)| f.into_expr(original))
        .collect()
}

/// Reassemble a call from its operands in fold order.
fn rebuild_call(call: &Call, operands: Vec<Expr>) -> Call {
    let mut operands = operands.into_iter();
    let dispatch_receiver = call
        .dispatch_receiver
        .as_ref()
        .and_then(|_| operands.next())
        .map(Box::new);
    let extension_receiver = call
        .extension_receiver
        .as_ref()
        .and_then(|_| operands.next())
        .map(Box::new);
    Call {
        callee: call.callee,
        dispatch_receiver,
        extension_receiver,
        args: operands.collect(),
    }
}
