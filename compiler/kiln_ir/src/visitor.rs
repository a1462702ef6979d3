//! IR visitors.
//!
//! `Visitor` walks a tree by shared reference, `MutVisitor` by mutable
//! reference. Default `visit_*` methods call the matching `walk_*` function,
//! which visits children in evaluation order (receivers, then arguments;
//! a loop's condition before its body). Override a `visit_*` method to act
//! on a node and call the `walk_*` function to keep descending.

use super::{Body, Branch, Expr, ExprKind, Function, Loop};

pub trait Visitor<'ir> {
    fn visit_function(&mut self, function: &'ir Function) {
        walk_function(self, function);
    }

    fn visit_body(&mut self, body: &'ir Body) {
        walk_body(self, body);
    }

    fn visit_expr(&mut self, expr: &'ir Expr) {
        walk_expr(self, expr);
    }

    fn visit_branch(&mut self, branch: &'ir Branch) {
        walk_branch(self, branch);
    }

    fn visit_loop(&mut self, lp: &'ir Loop) {
        walk_loop(self, lp);
    }
}

pub fn walk_function<'ir, V: Visitor<'ir> + ?Sized>(visitor: &mut V, function: &'ir Function) {
    if let Some(body) = &function.body {
        visitor.visit_body(body);
    }
}

pub fn walk_body<'ir, V: Visitor<'ir> + ?Sized>(visitor: &mut V, body: &'ir Body) {
    match body {
        Body::Block { statements, .. } => {
            for stmt in statements {
                visitor.visit_expr(stmt);
            }
        }
        Body::Expression(expr) => visitor.visit_expr(expr),
        Body::Synthetic(_) => {}
    }
}

pub fn walk_branch<'ir, V: Visitor<'ir> + ?Sized>(visitor: &mut V, branch: &'ir Branch) {
    visitor.visit_expr(&branch.condition);
    visitor.visit_expr(&branch.result);
}

pub fn walk_loop<'ir, V: Visitor<'ir> + ?Sized>(visitor: &mut V, lp: &'ir Loop) {
    visitor.visit_expr(&lp.condition);
    if let Some(body) = &lp.body {
        visitor.visit_expr(body);
    }
}

pub fn walk_expr<'ir, V: Visitor<'ir> + ?Sized>(visitor: &mut V, expr: &'ir Expr) {
    match &expr.kind {
        ExprKind::Const(_)
        | ExprKind::GetValue(_)
        | ExprKind::InstanceInitializerCall { .. }
        | ExprKind::Break { .. }
        | ExprKind::Continue { .. }
        | ExprKind::FunctionReference(_) => {}
        ExprKind::SetVariable { value, .. } | ExprKind::Return { value, .. } => {
            visitor.visit_expr(value);
        }
        ExprKind::Variable(decl) => {
            if let Some(init) = &decl.initializer {
                visitor.visit_expr(init);
            }
        }
        ExprKind::Call(call) => {
            if let Some(receiver) = &call.dispatch_receiver {
                visitor.visit_expr(receiver);
            }
            if let Some(receiver) = &call.extension_receiver {
                visitor.visit_expr(receiver);
            }
            for arg in &call.args {
                visitor.visit_expr(arg);
            }
        }
        ExprKind::ConstructorCall(call)
        | ExprKind::EnumConstructorCall(call)
        | ExprKind::DelegatingConstructorCall(call) => {
            for arg in &call.args {
                visitor.visit_expr(arg);
            }
        }
        ExprKind::Block(stmts) | ExprKind::Vararg(stmts) | ExprKind::StringConcat(stmts) => {
            for stmt in stmts {
                visitor.visit_expr(stmt);
            }
        }
        ExprKind::GetField { receiver, .. } => {
            if let Some(receiver) = receiver {
                visitor.visit_expr(receiver);
            }
        }
        ExprKind::SetField {
            receiver, value, ..
        } => {
            if let Some(receiver) = receiver {
                visitor.visit_expr(receiver);
            }
            visitor.visit_expr(value);
        }
        ExprKind::TypeOperator { operand, .. } => visitor.visit_expr(operand),
        ExprKind::When(branches) => {
            for branch in branches {
                visitor.visit_branch(branch);
            }
        }
        ExprKind::Loop(lp) => visitor.visit_loop(lp),
        ExprKind::Throw(value) => visitor.visit_expr(value),
    }
}

/// Mutable counterpart of [`Visitor`], used for in-place substitution.
pub trait MutVisitor {
    fn visit_expr_mut(&mut self, expr: &mut Expr) {
        walk_expr_mut(self, expr);
    }
}

pub fn walk_expr_mut<V: MutVisitor + ?Sized>(visitor: &mut V, expr: &mut Expr) {
    match &mut expr.kind {
        ExprKind::Const(_)
        | ExprKind::GetValue(_)
        | ExprKind::InstanceInitializerCall { .. }
        | ExprKind::Break { .. }
        | ExprKind::Continue { .. }
        | ExprKind::FunctionReference(_) => {}
        ExprKind::SetVariable { value, .. }
        | ExprKind::Return { value, .. }
        | ExprKind::Throw(value) => visitor.visit_expr_mut(value),
        ExprKind::TypeOperator { operand, .. } => visitor.visit_expr_mut(operand),
        ExprKind::Variable(decl) => {
            if let Some(init) = &mut decl.initializer {
                visitor.visit_expr_mut(init);
            }
        }
        ExprKind::Call(call) => {
            if let Some(receiver) = &mut call.dispatch_receiver {
                visitor.visit_expr_mut(receiver);
            }
            if let Some(receiver) = &mut call.extension_receiver {
                visitor.visit_expr_mut(receiver);
            }
            for arg in &mut call.args {
                visitor.visit_expr_mut(arg);
            }
        }
        ExprKind::ConstructorCall(call)
        | ExprKind::EnumConstructorCall(call)
        | ExprKind::DelegatingConstructorCall(call) => {
            for arg in &mut call.args {
                visitor.visit_expr_mut(arg);
            }
        }
        ExprKind::Block(stmts) | ExprKind::Vararg(stmts) | ExprKind::StringConcat(stmts) => {
            for stmt in stmts {
                visitor.visit_expr_mut(stmt);
            }
        }
        ExprKind::GetField { receiver, .. } => {
            if let Some(receiver) = receiver {
                visitor.visit_expr_mut(receiver);
            }
        }
        ExprKind::SetField {
            receiver, value, ..
        } => {
            if let Some(receiver) = receiver {
                visitor.visit_expr_mut(receiver);
            }
            visitor.visit_expr_mut(value);
        }
        ExprKind::When(branches) => {
            for branch in branches {
                visitor.visit_expr_mut(&mut branch.condition);
                visitor.visit_expr_mut(&mut branch.result);
            }
        }
        ExprKind::Loop(lp) => {
            visitor.visit_expr_mut(&mut lp.condition);
            if let Some(body) = &mut lp.body {
                visitor.visit_expr_mut(body);
            }
        }
    }
}
