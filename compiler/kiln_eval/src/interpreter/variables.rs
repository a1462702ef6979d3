//! Variable reads, declarations and assignments.

use kiln_ir::{Expr, ExprKind, Local, VarDecl};

use super::PartialInterpreter;
use crate::{FoldResult, Folded, Halt, Value};

impl PartialInterpreter<'_> {
    /// A known primitive becomes a literal. Complex and opaque values keep
    /// the read.
    pub(super) fn fold_get_value(&mut self, expr: &Expr, local: Local) -> FoldResult {
        let Ok(slot) = self.frames.get(local.id) else {
            return Err(Halt::NotInterpretable);
        };
        match &slot.value {
            Some(Value::Primitive(c)) => {
                let literal = c.to_literal(expr.ty.clone(), expr.span);
                Ok(Folded::evaluated(literal, Some(Value::Primitive(c.clone()))))
            }
            other => Ok(Folded::unchanged(other.clone())),
        }
    }

    pub(super) fn fold_variable(&mut self, expr: &Expr, decl: &VarDecl) -> FoldResult {
        let var = decl.local.id;
        let Some(initializer) = decl.initializer.as_deref() else {
            self.declare(var, None);
            return Ok(Folded::unchanged(None));
        };

        match self.fold(initializer) {
            Ok(Folded::Evaluated { expr: init, value }) => {
                self.declare(var, value);
                Ok(Folded::evaluated(rebuild_declaration(expr, decl, init), None))
            }
            Ok(Folded::Unchanged { value }) => {
                self.declare(var, value);
                Ok(Folded::unchanged(None))
            }
            Err(Halt::NotInterpretable) => {
                self.declare(var, None);
                Ok(Folded::unchanged(None))
            }
            Err(Halt::ControlTransfer { jump, expr: init }) => {
                self.declare(var, None);
                let rebuilt = init.map(|init| rebuild_declaration(expr, decl, init));
                Err(Halt::transfer(jump, rebuilt))
            }
        }
    }

    pub(super) fn fold_set_variable(&mut self, expr: &Expr, local: Local, value: &Expr) -> FoldResult {
        if !self.frames.contains(local.id) {
            self.revert(expr);
            return Err(Halt::NotInterpretable);
        }

        match self.fold(value) {
            Ok(Folded::Evaluated { expr: new_value, value }) => {
                self.assign(local, value);
                Ok(Folded::evaluated(rebuild_assignment(expr, local, new_value), None))
            }
            Ok(Folded::Unchanged { value }) => {
                self.assign(local, value);
                Ok(Folded::unchanged(None))
            }
            Err(Halt::NotInterpretable) => {
                self.frames.forget(local.id);
                Ok(Folded::unchanged(None))
            }
            Err(Halt::ControlTransfer { jump, expr: new_value }) => {
                let rebuilt = new_value.map(|v| rebuild_assignment(expr, local, v));
                Err(Halt::transfer(jump, rebuilt))
            }
        }
    }

    fn assign(&mut self, local: Local, value: Option<Value>) {
        self.frames
            .set_value(local.id, value)
            .unwrap_or_else(|e| panic!("frame stack invariant violated: {e}"));
    }
}

fn rebuild_declaration(expr: &Expr, decl: &VarDecl, initializer: Expr) -> Expr {
    let decl = VarDecl {
        local: decl.local,
        mutable: decl.mutable,
        initializer: Some(Box::new(initializer)),
    };
    Expr::new(ExprKind::Variable(decl), expr.ty.clone(), expr.span)
}

fn rebuild_assignment(expr: &Expr, local: Local, value: Expr) -> Expr {
    let kind = ExprKind::SetVariable {
        local,
        value: Box::new(value),
    };
    Expr::new(kind, expr.ty.clone(), expr.span)
}
