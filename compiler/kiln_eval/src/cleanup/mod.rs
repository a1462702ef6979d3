//! Statement cleanup after folding.
//!
//! Runs over a statement list once the walker has rebuilt it:
//!
//! 1. Statements that folded to empty `Unit` blocks are dropped.
//! 2. Declarations are examined from the last to the first. For each one the
//!    reads, guarded reads (inside a `when` or a loop) and writes in the
//!    statements that follow decide its fate:
//!    - literal initializer, never written: every read becomes the literal
//!      and the declaration goes away;
//!    - never read nor written: the declaration goes away, keeping an impure
//!      initializer as an expression statement;
//!    - read once outside any guard, never written: the initializer replaces
//!      the read, provided nothing it reads is written later and, when the
//!      initializer is impure or reads object state, no impure code runs
//!      between the declaration and the read;
//!    - written but never read: the declaration and every assignment go away,
//!      keeping impure assigned values as expression statements.
//! 3. Steps 1 and 2 repeat until nothing changes, so a second cleanup of the
//!    result is a no-op.
//!
//! Purity is decided by the caller, who knows which calls are evaluable.

use std::mem;

use kiln_ir::visitor::{walk_expr, walk_expr_mut, MutVisitor, Visitor};
use kiln_ir::{Constant, Expr, ExprKind, Span, Type, VarId};
use rustc_hash::FxHashSet;
use tracing::trace;

/// Remove and inline what the folded statements no longer need.
pub fn remove_unused_statements(
    mut statements: Vec<Expr>,
    is_pure: &dyn Fn(&Expr) -> bool,
) -> Vec<Expr> {
    while sweep(&mut statements, is_pure) {}
    statements
}

/// Clean a block's statements; a non-`Unit` block left with a single
/// statement collapses to that statement.
pub fn simplify_block(block: Expr, is_pure: &dyn Fn(&Expr) -> bool) -> Expr {
    let Expr { kind, ty, span } = block;
    let ExprKind::Block(statements) = kind else {
        return Expr { kind, ty, span };
    };
    let mut statements = remove_unused_statements(statements, is_pure);
    if !ty.is_unit() && statements.len() == 1 {
        if let Some(single) = statements.pop() {
            return single;
        }
    }
    Expr::new(ExprKind::Block(statements), ty, span)
}

enum Action {
    Keep,
    Substitute(Constant),
    Remove,
    Inline { at: usize },
    DropWrites,
}

/// One pass over `statements`. Returns whether anything changed.
fn sweep(statements: &mut Vec<Expr>, is_pure: &dyn Fn(&Expr) -> bool) -> bool {
    let before = statements.len();
    statements.retain(|stmt| !stmt.is_empty_unit_block());
    let mut changed = statements.len() != before;

    let mut index = statements.len();
    while index > 0 {
        index -= 1;
        let Some(decl) = statements[index].as_declaration() else {
            continue;
        };
        let var = decl.local.id;
        let action = decide(statements, index, is_pure);
        if matches!(action, Action::Keep) {
            continue;
        }
        changed = true;

        let removed = statements.remove(index);
        let ExprKind::Variable(decl) = removed.kind else {
            continue;
        };
        let initializer = decl.initializer.map(|init| *init);

        match action {
            Action::Keep => {}
            Action::Substitute(constant) => {
                trace!(?var, %constant, "propagating literal");
                let mut substitute = SubstituteConstant { var, constant };
                for stmt in &mut statements[index..] {
                    substitute.visit_expr_mut(stmt);
                }
            }
            Action::Remove => {
                trace!(?var, "removing unused declaration");
                if let Some(init) = initializer.filter(|init| !is_pure(init)) {
                    statements.insert(index, init);
                }
            }
            Action::Inline { at } => {
                trace!(?var, "inlining single-use declaration");
                let mut inline = InlineRead {
                    var,
                    replacement: initializer,
                };
                // `at` counted from the statement after the declaration,
                // which now sits at `index`.
                inline.visit_expr_mut(&mut statements[index + at]);
            }
            Action::DropWrites => {
                trace!(?var, "removing write-only variable");
                let mut drop = DropWrites { var, is_pure };
                for stmt in &mut statements[index..] {
                    drop.at_statement(stmt);
                }
                if let Some(init) = initializer.filter(|init| !is_pure(init)) {
                    statements.insert(index, init);
                }
            }
        }
    }
    changed
}

fn decide(statements: &[Expr], index: usize, is_pure: &dyn Fn(&Expr) -> bool) -> Action {
    let Some(decl) = statements[index].as_declaration() else {
        return Action::Keep;
    };
    let var = decl.local.id;
    let rest = &statements[index + 1..];
    let usage = Usage::count(var, rest);
    let initializer = decl.initializer.as_deref();

    if usage.writes > 0 {
        return if usage.reads == 0 {
            Action::DropWrites
        } else {
            Action::Keep
        };
    }
    if let Some(constant) = initializer.and_then(Expr::as_constant) {
        return Action::Substitute(constant.clone());
    }
    if usage.reads == 0 {
        return Action::Remove;
    }
    if usage.reads == 1 && usage.guarded_reads == 0 {
        if let Some(at) = initializer.and_then(|init| inline_site(var, init, rest, is_pure)) {
            return Action::Inline { at };
        }
    }
    Action::Keep
}

/// Position in `rest` of the statement the initializer can be moved into.
fn inline_site(
    var: VarId,
    initializer: &Expr,
    rest: &[Expr],
    is_pure: &dyn Fn(&Expr) -> bool,
) -> Option<usize> {
    let at = rest
        .iter()
        .position(|stmt| Usage::count(var, std::slice::from_ref(stmt)).reads > 0)?;

    let inputs = Accesses::of(initializer).reads;
    let inputs_change = rest
        .iter()
        .any(|stmt| !Accesses::of(stmt).writes.is_disjoint(&inputs));
    if inputs_change {
        return None;
    }

    if !is_pure(initializer) || HeapReads::any(initializer) {
        let between_pure = rest[..at].iter().all(|stmt| is_pure(stmt));
        if !between_pure || ReadOrder::impure_before(var, &rest[at], is_pure) {
            return None;
        }
    }
    Some(at)
}

#[derive(Default, Debug, PartialEq, Eq)]
struct Usage {
    reads: usize,
    guarded_reads: usize,
    writes: usize,
}

impl Usage {
    fn count(var: VarId, statements: &[Expr]) -> Usage {
        let mut counter = UsageCounter {
            var,
            guard: 0,
            usage: Usage::default(),
        };
        for stmt in statements {
            counter.visit_expr(stmt);
        }
        counter.usage
    }
}

struct UsageCounter {
    var: VarId,
    guard: u32,
    usage: Usage,
}

impl<'ir> Visitor<'ir> for UsageCounter {
    fn visit_expr(&mut self, expr: &'ir Expr) {
        match &expr.kind {
            ExprKind::GetValue(local) if local.id == self.var => {
                self.usage.reads += 1;
                if self.guard > 0 {
                    self.usage.guarded_reads += 1;
                }
            }
            ExprKind::SetVariable { local, .. } if local.id == self.var => {
                self.usage.writes += 1;
            }
            _ => {}
        }
        let guarded = matches!(expr.kind, ExprKind::When(_) | ExprKind::Loop(_));
        if guarded {
            self.guard += 1;
        }
        walk_expr(self, expr);
        if guarded {
            self.guard -= 1;
        }
    }
}

#[derive(Default)]
struct Accesses {
    reads: FxHashSet<VarId>,
    writes: FxHashSet<VarId>,
}

impl Accesses {
    fn of(expr: &Expr) -> Accesses {
        let mut accesses = Accesses::default();
        accesses.visit_expr(expr);
        accesses
    }
}

impl<'ir> Visitor<'ir> for Accesses {
    fn visit_expr(&mut self, expr: &'ir Expr) {
        match &expr.kind {
            ExprKind::GetValue(local) => {
                self.reads.insert(local.id);
            }
            ExprKind::SetVariable { local, .. } => {
                self.writes.insert(local.id);
            }
            _ => {}
        }
        walk_expr(self, expr);
    }
}

/// Finds calls or field reads that look into an object or array.
///
/// Such an initializer is pure but not stable: an opaque call may mutate
/// what it reads.
#[derive(Default)]
struct HeapReads {
    found: bool,
}

impl HeapReads {
    fn any(expr: &Expr) -> bool {
        let mut reads = HeapReads::default();
        reads.visit_expr(expr);
        reads.found
    }
}

/// Values that cannot change behind the walker's back.
fn is_immutable(ty: &Type) -> bool {
    match ty {
        Type::String => true,
        Type::Nullable(inner) => is_immutable(inner),
        other => other.is_primitive(),
    }
}

impl<'ir> Visitor<'ir> for HeapReads {
    fn visit_expr(&mut self, expr: &'ir Expr) {
        if self.found {
            return;
        }
        match &expr.kind {
            ExprKind::GetField { .. } => self.found = true,
            ExprKind::Call(call) => {
                let mut operands = [&call.dispatch_receiver, &call.extension_receiver]
                    .into_iter()
                    .flatten()
                    .map(|receiver| &**receiver)
                    .chain(&call.args);
                self.found = operands.any(|operand| !is_immutable(&operand.ty));
            }
            _ => {}
        }
        walk_expr(self, expr);
    }
}

/// Finds whether impure code completes before the read of `var` in
/// evaluation order.
struct ReadOrder<'p> {
    var: VarId,
    found: bool,
    impure: bool,
    is_pure: &'p dyn Fn(&Expr) -> bool,
}

impl ReadOrder<'_> {
    fn impure_before(var: VarId, stmt: &Expr, is_pure: &dyn Fn(&Expr) -> bool) -> bool {
        let mut order = ReadOrder {
            var,
            found: false,
            impure: false,
            is_pure,
        };
        order.visit_expr(stmt);
        order.impure
    }
}

impl<'ir> Visitor<'ir> for ReadOrder<'_> {
    fn visit_expr(&mut self, expr: &'ir Expr) {
        if self.found {
            return;
        }
        if matches!(&expr.kind, ExprKind::GetValue(local) if local.id == self.var) {
            self.found = true;
            return;
        }
        walk_expr(self, expr);
        if !self.found && !(self.is_pure)(expr) {
            self.impure = true;
        }
    }
}

struct SubstituteConstant {
    var: VarId,
    constant: Constant,
}

impl MutVisitor for SubstituteConstant {
    fn visit_expr_mut(&mut self, expr: &mut Expr) {
        if matches!(&expr.kind, ExprKind::GetValue(local) if local.id == self.var) {
            *expr = self.constant.to_literal(expr.ty.clone(), expr.span);
            return;
        }
        walk_expr_mut(self, expr);
    }
}

struct InlineRead {
    var: VarId,
    replacement: Option<Expr>,
}

impl MutVisitor for InlineRead {
    fn visit_expr_mut(&mut self, expr: &mut Expr) {
        if self.replacement.is_none() {
            return;
        }
        if matches!(&expr.kind, ExprKind::GetValue(local) if local.id == self.var) {
            if let Some(replacement) = self.replacement.take() {
                *expr = replacement;
            }
            return;
        }
        walk_expr_mut(self, expr);
    }
}

/// Removes every assignment to `var`.
struct DropWrites<'p> {
    var: VarId,
    is_pure: &'p dyn Fn(&Expr) -> bool,
}

impl DropWrites<'_> {
    /// What remains of `value` once the assignment is gone.
    fn residue(&self, value: Expr, ty: Type, span: Span) -> Expr {
        if (self.is_pure)(&value) {
            Expr::empty_block(span)
        } else {
            Expr::new(ExprKind::Block(vec![value]), ty, span)
        }
    }

    fn take_assignment(&self, expr: &mut Expr) -> Option<Expr> {
        match &mut expr.kind {
            ExprKind::SetVariable { local, value } if local.id == self.var => {
                let placeholder = Expr::empty_block(value.span);
                Some(mem::replace(&mut **value, placeholder))
            }
            _ => None,
        }
    }

    /// A top-level statement: an impure assigned value stays unwrapped.
    fn at_statement(&mut self, stmt: &mut Expr) {
        match self.take_assignment(stmt) {
            Some(value) if !(self.is_pure)(&value) => *stmt = value,
            Some(_) => *stmt = Expr::empty_block(stmt.span),
            None => self.visit_expr_mut(stmt),
        }
    }
}

impl MutVisitor for DropWrites<'_> {
    fn visit_expr_mut(&mut self, expr: &mut Expr) {
        if let Some(value) = self.take_assignment(expr) {
            let residue = self.residue(value, expr.ty.clone(), expr.span);
            *expr = residue;
            return;
        }
        walk_expr_mut(self, expr);
        if let ExprKind::Block(statements) = &mut expr.kind {
            statements.retain(|stmt| !stmt.is_empty_unit_block());
        }
    }
}
