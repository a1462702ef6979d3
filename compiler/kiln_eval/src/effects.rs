//! Side-effect summary of an expression subtree.
//!
//! Used in two places: when the walker gives up on a subtree it must make
//! everything the subtree could have changed opaque, and the cleanup pass
//! may only drop or reorder statements that have no observable effect.

use kiln_ir::visitor::{walk_expr, walk_loop, Visitor};
use kiln_ir::{Expr, ExprKind, Loop, Name, VarId};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::{EvalMode, EvaluabilityOracle};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Effects {
    /// Variables read anywhere in the subtree.
    pub reads: FxHashSet<VarId>,
    /// Variables assigned anywhere in the subtree.
    pub writes: FxHashSet<VarId>,
    /// Calls the oracle rejects, field writes, throws and other constructs
    /// that may touch state the walker does not track.
    pub impure_calls: bool,
    /// A `return` or `throw`, or a `break`/`continue` whose loop is outside
    /// the subtree.
    pub escaping_jump: bool,
    /// The subtree contains a loop and may not terminate.
    pub has_loop: bool,
}

impl Effects {
    pub fn of(expr: &Expr, oracle: &dyn EvaluabilityOracle, mode: EvalMode) -> Self {
        let mut collector = Collector {
            effects: Effects::default(),
            oracle,
            mode,
            loops: SmallVec::new(),
        };
        collector.visit_expr(expr);
        collector.effects
    }

    /// Whether dropping the subtree (when its value is unused) is invisible.
    pub fn is_pure(&self) -> bool {
        self.writes.is_empty() && !self.impure_calls && !self.escaping_jump && !self.has_loop
    }
}

/// Shorthand for `Effects::of(expr, ..).is_pure()`.
pub fn is_pure(expr: &Expr, oracle: &dyn EvaluabilityOracle, mode: EvalMode) -> bool {
    Effects::of(expr, oracle, mode).is_pure()
}

struct Collector<'o> {
    effects: Effects,
    oracle: &'o dyn EvaluabilityOracle,
    mode: EvalMode,
    /// Labels of the loops enclosing the current node inside the subtree.
    loops: SmallVec<[Option<Name>; 4]>,
}

impl Collector<'_> {
    fn jump_stays_inside(&self, label: Option<Name>) -> bool {
        match label {
            None => !self.loops.is_empty(),
            Some(label) => self.loops.contains(&Some(label)),
        }
    }
}

impl<'ir> Visitor<'ir> for Collector<'_> {
    fn visit_expr(&mut self, expr: &'ir Expr) {
        match &expr.kind {
            ExprKind::GetValue(local) => {
                self.effects.reads.insert(local.id);
            }
            ExprKind::SetVariable { local, .. } => {
                self.effects.writes.insert(local.id);
            }
            ExprKind::Call(call) => {
                if !self.oracle.can_evaluate(call.callee, self.mode) {
                    self.effects.impure_calls = true;
                }
            }
            ExprKind::ConstructorCall(call) => {
                if !self.oracle.can_evaluate(call.constructor, self.mode) {
                    self.effects.impure_calls = true;
                }
            }
            ExprKind::EnumConstructorCall(_)
            | ExprKind::DelegatingConstructorCall(_)
            | ExprKind::InstanceInitializerCall { .. }
            | ExprKind::SetField { .. } => self.effects.impure_calls = true,
            ExprKind::Throw(_) => {
                self.effects.impure_calls = true;
                self.effects.escaping_jump = true;
            }
            ExprKind::Return { .. } => self.effects.escaping_jump = true,
            ExprKind::Break { label } | ExprKind::Continue { label } => {
                if !self.jump_stays_inside(*label) {
                    self.effects.escaping_jump = true;
                }
            }
            _ => {}
        }
        walk_expr(self, expr);
    }

    fn visit_loop(&mut self, lp: &'ir Loop) {
        self.effects.has_loop = true;
        self.loops.push(lp.label);
        walk_loop(self, lp);
        self.loops.pop();
    }
}
