//! The partial interpreter: a tree walker that folds what it can.
//!
//! [`PartialInterpreter::fold`] visits a node children-first, simulating
//! execution against its [`FrameStack`]. Values it learns are written back
//! as literals where that cannot change behaviour; everything else keeps
//! its original node.
//!
//! # Failure containment
//!
//! Whenever the walker gives up on a subtree it *reverts* it: every variable
//! the subtree may write becomes opaque, complex values are forgotten if the
//! subtree may run code the walker does not simulate, and a subtree that
//! may jump out of the loop being simulated marks the simulation uncertain.
//! A node that reports [`Halt::NotInterpretable`] has already reverted
//! itself.
//!
//! # Module structure
//!
//! - `calls`: calls, constructor calls, varargs
//! - `variables`: reads, declarations, assignments
//! - `blocks`: statement lists, blocks, function bodies
//! - `control`: `when`, loops, `return`, `break`, `continue`
//! - `scope_guard`: RAII frame management

mod blocks;
mod calls;
mod control;
mod scope_guard;
mod variables;

use std::mem;

use kiln_diagnostic::Diagnostic;
use kiln_ir::{Expr, ExprKind, Function, VarId};
use kiln_stack::ensure_sufficient_stack;
use smallvec::SmallVec;
use tracing::trace;

use crate::effects::{self, Effects};
use crate::{
    EvalMode, EvaluabilityOracle, ExpressionEvaluator, FoldResult, Folded, FrameKind, FrameStack,
    Halt, Jump, PartialEvalConfig, ScopeToken, Value,
};

pub use scope_guard::ScopedWalker;

/// Outcome of [`PartialInterpreter::interpret_function`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Rewrite {
    /// The body was replaced.
    Rewritten,
    /// Folding finished but nothing changed.
    Unchanged,
    /// The body could not be walked; it was left alone.
    NotInterpretable,
}

pub struct PartialInterpreter<'a> {
    frames: FrameStack,
    oracle: &'a dyn EvaluabilityOracle,
    evaluator: &'a mut dyn ExpressionEvaluator,
    mode: EvalMode,
    max_loop_iterations: u32,
    /// A reverted subtree may have left the loop being simulated.
    uncertain_jump: bool,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> PartialInterpreter<'a> {
    pub fn new(
        oracle: &'a dyn EvaluabilityOracle,
        evaluator: &'a mut dyn ExpressionEvaluator,
        config: &PartialEvalConfig,
    ) -> Self {
        PartialInterpreter {
            frames: FrameStack::new(),
            oracle,
            evaluator,
            mode: config.mode,
            max_loop_iterations: config.max_loop_iterations,
            uncertain_jump: false,
            diagnostics: Vec::new(),
        }
    }

    #[inline]
    pub fn frames(&self) -> &FrameStack {
        &self.frames
    }

    #[inline]
    pub fn mode(&self) -> EvalMode {
        self.mode
    }

    /// Diagnostics collected so far (exhausted loop budgets).
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        mem::take(&mut self.diagnostics)
    }

    /// Fold `function`'s body in a fresh frame stack tied to `scope`.
    ///
    /// The body is replaced only when folding produced a different body.
    #[tracing::instrument(level = "debug", skip_all, fields(function = ?function.id))]
    pub fn interpret_function(&mut self, function: &mut Function, scope: ScopeToken) -> Rewrite {
        self.frames.reset(scope);
        self.uncertain_jump = false;

        let Some(body) = &function.body else {
            return Rewrite::Unchanged;
        };
        let params: SmallVec<[VarId; 4]> = function.params.iter().map(|p| p.local.id).collect();
        let folded = self.with_frame(FrameKind::Isolated, |walker| {
            for var in params {
                walker.declare(var, None);
            }
            walker.fold_body(body)
        });

        match folded {
            Ok(Some(new_body)) if new_body != *body => {
                function.body = Some(new_body);
                Rewrite::Rewritten
            }
            Ok(_) => Rewrite::Unchanged,
            Err(halt) => {
                trace!(?halt, "function body not interpretable");
                Rewrite::NotInterpretable
            }
        }
    }

    /// Fold one node.
    pub fn fold(&mut self, expr: &Expr) -> FoldResult {
        ensure_sufficient_stack(|| self.fold_inner(expr))
    }

    fn fold_inner(&mut self, expr: &Expr) -> FoldResult {
        let result = match &expr.kind {
            ExprKind::Const(c) => Ok(Folded::unchanged(Some(Value::Primitive(c.clone())))),
            ExprKind::GetValue(local) => self.fold_get_value(expr, *local),
            ExprKind::Variable(decl) => self.fold_variable(expr, decl),
            ExprKind::SetVariable { local, value } => self.fold_set_variable(expr, *local, value),
            ExprKind::Call(call) => self.fold_call(expr, call),
            ExprKind::ConstructorCall(call) => self.fold_constructor_call(expr, call),
            ExprKind::Vararg(elements) => self.fold_vararg(expr, elements),
            ExprKind::Block(statements) => self.fold_block(expr, statements),
            ExprKind::Return { target, value } => self.fold_return(expr, *target, value),
            ExprKind::When(branches) => self.fold_when(expr, branches),
            ExprKind::Loop(lp) => self.fold_loop(expr, lp),
            ExprKind::Break { label } => Err(Halt::transfer(Jump::Break(*label), None)),
            ExprKind::Continue { label } => {
                Err(Halt::transfer(Jump::Continue(*label), None))
            }
            ExprKind::EnumConstructorCall(_)
            | ExprKind::DelegatingConstructorCall(_)
            | ExprKind::InstanceInitializerCall { .. }
            | ExprKind::GetField { .. }
            | ExprKind::SetField { .. }
            | ExprKind::TypeOperator { .. } => {
                self.revert(expr);
                Ok(Folded::unchanged(None))
            }
            ExprKind::Throw(_) | ExprKind::StringConcat(_) | ExprKind::FunctionReference(_) => {
                self.revert(expr);
                Err(Halt::NotInterpretable)
            }
        };
        if let Err(Halt::NotInterpretable) = &result {
            trace!(kind = expr.kind_name(), span = ?expr.span, "not interpretable");
        }
        result
    }

    /// Make everything `expr` could have changed opaque.
    fn revert(&mut self, expr: &Expr) {
        let effects = Effects::of(expr, self.oracle, self.mode);
        for var in &effects.writes {
            self.frames.forget(*var);
        }
        if effects.impure_calls {
            self.frames.forget_complex();
        }
        if effects.escaping_jump {
            self.uncertain_jump = true;
        }
    }

    fn is_pure(&self, expr: &Expr) -> bool {
        effects::is_pure(expr, self.oracle, self.mode)
    }

    /// Purity predicate for the cleanup pass, detached from `self`.
    fn purity(&self) -> impl Fn(&Expr) -> bool + 'a {
        let oracle = self.oracle;
        let mode = self.mode;
        move |expr: &Expr| effects::is_pure(expr, oracle, mode)
    }

    fn declare(&mut self, var: VarId, value: Option<Value>) {
        self.frames
            .declare(var, value)
            .unwrap_or_else(|e| panic!("frame stack invariant violated: {e}"));
    }
}
