//! Statement lists, blocks and function bodies.

use kiln_ir::{Body, Expr, ExprKind};
use tracing::debug;

use super::PartialInterpreter;
use crate::{cleanup, FoldResult, Folded, FrameKind, Halt, Jump, Value};

/// A folded statement list.
pub(super) struct Statements {
    pub(super) exprs: Vec<Expr>,
    /// Where control left the list, if it did not fall through.
    pub(super) jump: Option<Jump>,
    /// Value of the last statement.
    pub(super) last: Option<Value>,
}

impl PartialInterpreter<'_> {
    /// Fold statements in order until one transfers control. Statements after
    /// a transfer are kept as they are.
    pub(super) fn fold_statements(&mut self, statements: &[Expr]) -> Statements {
        let mut exprs = Vec::with_capacity(statements.len());
        let mut last = None;
        for (index, stmt) in statements.iter().enumerate() {
            match self.fold(stmt) {
                Ok(Folded::Evaluated { expr, value }) => {
                    exprs.push(expr);
                    last = value;
                }
                Ok(Folded::Unchanged { value }) => {
                    exprs.push(stmt.clone());
                    last = value;
                }
                Err(Halt::NotInterpretable) => {
                    exprs.push(stmt.clone());
                    last = None;
                }
                Err(Halt::ControlTransfer { jump, expr }) => {
                    exprs.push(expr.unwrap_or_else(|| stmt.clone()));
                    exprs.extend(statements[index + 1..].iter().cloned());
                    return Statements {
                        exprs,
                        jump: Some(jump),
                        last: None,
                    };
                }
            }
        }
        Statements {
            exprs,
            jump: None,
            last,
        }
    }

    pub(super) fn fold_block(&mut self, expr: &Expr, statements: &[Expr]) -> FoldResult {
        let folded = self.with_frame(FrameKind::Sub, |walker| walker.fold_statements(statements));

        let block = Expr::new(ExprKind::Block(folded.exprs), expr.ty.clone(), expr.span);
        let block = cleanup::simplify_block(block, &self.purity());
        let rebuilt = (block != *expr).then_some(block);

        match (folded.jump, rebuilt) {
            (Some(jump), rebuilt) => Err(Halt::transfer(jump, rebuilt)),
            (None, Some(block)) => Ok(Folded::evaluated(block, folded.last)),
            (None, None) => Ok(Folded::unchanged(folded.last)),
        }
    }

    /// Fold a function body. `Ok(None)` means there was nothing to fold.
    pub(super) fn fold_body(&mut self, body: &Body) -> Result<Option<Body>, Halt> {
        match body {
            Body::Block { statements, span } => {
                let folded = self.fold_statements(statements);
                if let Some(jump @ (Jump::Break(_) | Jump::Continue(_))) = folded.jump {
                    debug!(?jump, "loop jump outside of any loop");
                    return Err(Halt::NotInterpretable);
                }
                let statements = cleanup::remove_unused_statements(folded.exprs, &self.purity());
                Ok(Some(Body::Block {
                    statements,
                    span: *span,
                }))
            }
            Body::Expression(expr) => match self.fold(expr) {
                Ok(Folded::Evaluated { expr, .. })
                | Err(Halt::ControlTransfer {
                    expr: Some(expr), ..
                }) => Ok(Some(Body::Expression(expr))),
                Ok(Folded::Unchanged { .. }) | Err(Halt::ControlTransfer { expr: None, .. }) => {
                    Ok(None)
                }
                Err(Halt::NotInterpretable) => Err(Halt::NotInterpretable),
            },
            Body::Synthetic(_) => Ok(None),
        }
    }
}
