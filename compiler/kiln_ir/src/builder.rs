//! Convenience construction of IR trees.
//!
//! Front ends and tests build functions through an [`IrBuilder`]. It owns the
//! callable table and interner for the module under construction, hands out
//! fresh [`VarId`]s, and gives every node it creates a distinct span so
//! rewritten literals can be traced back to the node they replaced.
//!
//! Expression constructors take `&self`, so nested calls such as
//! `b.plus(b.get(x, Type::Int), b.int(1))` compose without temporaries.

use std::cell::Cell;

use super::{
    Body, Branch, Call, Constant, ConstructorCall, Expr, ExprKind, Function, FunctionFlags,
    FunctionId, FunctionInfo, FunctionKind, FunctionTable, Intrinsic, IrFile, Local, Loop,
    LoopKind, Name, Param, SharedInterner, Span, Type, TypeOp, VarDecl, VarId,
};

pub struct IrBuilder {
    interner: SharedInterner,
    functions: FunctionTable,
    intrinsics: [FunctionId; Intrinsic::ALL.len()],
    next_var: Cell<u32>,
    next_pos: Cell<u32>,
}

impl IrBuilder {
    pub fn new() -> Self {
        Self::with_interner(SharedInterner::new())
    }

    /// Builder sharing an existing interner; every intrinsic is registered up front.
    pub fn with_interner(interner: SharedInterner) -> Self {
        let mut functions = FunctionTable::new();
        let intrinsics = Intrinsic::ALL.map(|op| {
            functions.register(FunctionInfo {
                name: interner.intern(op.name()),
                kind: FunctionKind::Intrinsic(op),
                flags: FunctionFlags::INTRINSIC,
            })
        });
        IrBuilder {
            interner,
            functions,
            intrinsics,
            next_var: Cell::new(0),
            next_pos: Cell::new(0),
        }
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    /// Hand over the interner and callable table once the module is built.
    pub fn finish(self) -> (SharedInterner, FunctionTable) {
        (self.interner, self.functions)
    }

    pub fn name(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    /// A fresh one-byte span, unique within this builder.
    pub fn span(&self) -> Span {
        let start = self.next_pos.get();
        self.next_pos.set(start + 1);
        Span::new(start, start + 1)
    }

    // Callables

    /// Register an ordinary function.
    pub fn function(&mut self, name: &str, flags: FunctionFlags) -> FunctionId {
        let name = self.name(name);
        self.functions.register(FunctionInfo {
            name,
            kind: FunctionKind::Regular,
            flags,
        })
    }

    /// Register the primary constructor of `class` with the given fields.
    pub fn constructor(&mut self, class: &str, fields: &[&str], flags: FunctionFlags) -> FunctionId {
        let class = self.name(class);
        let fields = fields.iter().map(|f| self.name(f)).collect();
        self.functions.register(FunctionInfo {
            name: class,
            kind: FunctionKind::Constructor { class, fields },
            flags,
        })
    }

    /// Register the getter of property `field`.
    pub fn getter(&mut self, field: &str, flags: FunctionFlags) -> FunctionId {
        let field = self.name(field);
        self.functions.register(FunctionInfo {
            name: field,
            kind: FunctionKind::Getter { field },
            flags,
        })
    }

    /// Id of a pre-registered intrinsic.
    pub fn intrinsic(&self, op: Intrinsic) -> FunctionId {
        self.intrinsics[op as usize]
    }

    // Locals

    pub fn local(&self, name: &str) -> Local {
        let id = self.next_var.get();
        self.next_var.set(id + 1);
        Local {
            id: VarId::from_raw(id),
            name: self.name(name),
        }
    }

    pub fn param(&self, name: &str, ty: Type) -> Param {
        Param {
            local: self.local(name),
            ty,
        }
    }

    // Literals

    pub fn constant(&self, value: Constant) -> Expr {
        Expr::constant(value, self.span())
    }

    pub fn int(&self, value: i32) -> Expr {
        self.constant(Constant::Int(value))
    }

    pub fn long(&self, value: i64) -> Expr {
        self.constant(Constant::Long(value))
    }

    pub fn boolean(&self, value: bool) -> Expr {
        self.constant(Constant::Boolean(value))
    }

    pub fn string(&self, value: &str) -> Expr {
        self.constant(Constant::string(value))
    }

    pub fn null(&self) -> Expr {
        self.constant(Constant::Null)
    }

    // Variables

    pub fn get(&self, local: Local, ty: Type) -> Expr {
        Expr::new(ExprKind::GetValue(local), ty, self.span())
    }

    pub fn set(&self, local: Local, value: Expr) -> Expr {
        let kind = ExprKind::SetVariable {
            local,
            value: Box::new(value),
        };
        Expr::new(kind, Type::Unit, self.span())
    }

    /// `val local = init`.
    pub fn val(&self, local: Local, init: Expr) -> Expr {
        self.declare(local, false, Some(init))
    }

    /// `var local = init`.
    pub fn var(&self, local: Local, init: Expr) -> Expr {
        self.declare(local, true, Some(init))
    }

    pub fn declare(&self, local: Local, mutable: bool, initializer: Option<Expr>) -> Expr {
        let decl = VarDecl {
            local,
            mutable,
            initializer: initializer.map(Box::new),
        };
        Expr::new(ExprKind::Variable(decl), Type::Unit, self.span())
    }

    // Calls

    pub fn call(&self, callee: FunctionId, args: Vec<Expr>, ty: Type) -> Expr {
        self.call_with(callee, None, None, args, ty)
    }

    /// `receiver.callee(args)`.
    pub fn method_call(&self, callee: FunctionId, receiver: Expr, args: Vec<Expr>, ty: Type) -> Expr {
        self.call_with(callee, Some(receiver), None, args, ty)
    }

    pub fn call_with(
        &self,
        callee: FunctionId,
        dispatch_receiver: Option<Expr>,
        extension_receiver: Option<Expr>,
        args: Vec<Expr>,
        ty: Type,
    ) -> Expr {
        let call = Call {
            callee,
            dispatch_receiver: dispatch_receiver.map(Box::new),
            extension_receiver: extension_receiver.map(Box::new),
            args,
        };
        Expr::new(ExprKind::Call(call), ty, self.span())
    }

    /// Operator call; the receiver is the first operand.
    pub fn unary(&self, op: Intrinsic, operand: Expr) -> Expr {
        let ty = match op {
            Intrinsic::ToString => Type::String,
            Intrinsic::ArraySize => Type::Int,
            _ if op.is_predicate() => Type::Boolean,
            _ => operand.ty.clone(),
        };
        self.method_call(self.intrinsic(op), operand, Vec::new(), ty)
    }

    pub fn binary(&self, op: Intrinsic, lhs: Expr, rhs: Expr) -> Expr {
        let ty = match (&op, &lhs.ty) {
            (Intrinsic::ArrayGet, Type::Array(elem)) => (**elem).clone(),
            (Intrinsic::ArrayGet, _) => Type::Any,
            _ if op.is_predicate() => Type::Boolean,
            _ => lhs.ty.clone(),
        };
        self.method_call(self.intrinsic(op), lhs, vec![rhs], ty)
    }

    pub fn plus(&self, lhs: Expr, rhs: Expr) -> Expr {
        self.binary(Intrinsic::Plus, lhs, rhs)
    }

    pub fn minus(&self, lhs: Expr, rhs: Expr) -> Expr {
        self.binary(Intrinsic::Minus, lhs, rhs)
    }

    pub fn times(&self, lhs: Expr, rhs: Expr) -> Expr {
        self.binary(Intrinsic::Times, lhs, rhs)
    }

    pub fn div(&self, lhs: Expr, rhs: Expr) -> Expr {
        self.binary(Intrinsic::Div, lhs, rhs)
    }

    pub fn eq(&self, lhs: Expr, rhs: Expr) -> Expr {
        self.binary(Intrinsic::Equals, lhs, rhs)
    }

    pub fn less(&self, lhs: Expr, rhs: Expr) -> Expr {
        self.binary(Intrinsic::Less, lhs, rhs)
    }

    pub fn not(&self, operand: Expr) -> Expr {
        self.unary(Intrinsic::Not, operand)
    }

    /// `Class(args)`; the class comes from the constructor's table entry.
    pub fn construct(&self, constructor: FunctionId, args: Vec<Expr>) -> Expr {
        let class = match self.functions.get(constructor).map(|info| &info.kind) {
            Some(FunctionKind::Constructor { class, .. }) => *class,
            _ => Name::EMPTY,
        };
        let call = ConstructorCall {
            constructor,
            class,
            args,
        };
        Expr::new(ExprKind::ConstructorCall(call), Type::Class(class), self.span())
    }

    /// `receiver.property` through the property's getter.
    pub fn property(&self, getter: FunctionId, receiver: Expr, ty: Type) -> Expr {
        self.method_call(getter, receiver, Vec::new(), ty)
    }

    pub fn vararg(&self, elements: Vec<Expr>, element_ty: Type) -> Expr {
        let ty = Type::Array(Box::new(element_ty));
        Expr::new(ExprKind::Vararg(elements), ty, self.span())
    }

    // Fields, types, misc

    pub fn get_field(&self, receiver: Option<Expr>, field: &str, ty: Type) -> Expr {
        let kind = ExprKind::GetField {
            receiver: receiver.map(Box::new),
            field: self.name(field),
        };
        Expr::new(kind, ty, self.span())
    }

    pub fn set_field(&self, receiver: Option<Expr>, field: &str, value: Expr) -> Expr {
        let kind = ExprKind::SetField {
            receiver: receiver.map(Box::new),
            field: self.name(field),
            value: Box::new(value),
        };
        Expr::new(kind, Type::Unit, self.span())
    }

    pub fn type_op(&self, op: TypeOp, operand: Expr, type_operand: Type) -> Expr {
        let ty = match op {
            TypeOp::InstanceOf | TypeOp::NotInstanceOf => Type::Boolean,
            TypeOp::SafeCast => type_operand.clone().nullable(),
            TypeOp::Cast | TypeOp::ImplicitCoercion => type_operand.clone(),
        };
        let kind = ExprKind::TypeOperator {
            op,
            operand: Box::new(operand),
            type_operand,
        };
        Expr::new(kind, ty, self.span())
    }

    pub fn throw(&self, value: Expr) -> Expr {
        Expr::new(ExprKind::Throw(Box::new(value)), Type::Nothing, self.span())
    }

    pub fn concat(&self, parts: Vec<Expr>) -> Expr {
        Expr::new(ExprKind::StringConcat(parts), Type::String, self.span())
    }

    pub fn reference(&self, function: FunctionId) -> Expr {
        Expr::new(ExprKind::FunctionReference(function), Type::Any, self.span())
    }

    // Blocks and control flow

    pub fn block(&self, statements: Vec<Expr>, ty: Type) -> Expr {
        Expr::new(ExprKind::Block(statements), ty, self.span())
    }

    /// Empty `Unit` block.
    pub fn unit(&self) -> Expr {
        Expr::empty_block(self.span())
    }

    pub fn ret(&self, target: FunctionId, value: Expr) -> Expr {
        let kind = ExprKind::Return {
            target,
            value: Box::new(value),
        };
        Expr::new(kind, Type::Nothing, self.span())
    }

    pub fn branch(&self, condition: Expr, result: Expr) -> Branch {
        Branch {
            condition,
            result,
            span: self.span(),
        }
    }

    pub fn else_branch(&self, result: Expr) -> Branch {
        self.branch(self.boolean(true), result)
    }

    pub fn when(&self, branches: Vec<Branch>, ty: Type) -> Expr {
        Expr::new(ExprKind::When(branches), ty, self.span())
    }

    /// `if (condition) then else otherwise`.
    pub fn if_else(&self, condition: Expr, then: Expr, otherwise: Expr, ty: Type) -> Expr {
        let branches = vec![self.branch(condition, then), self.else_branch(otherwise)];
        self.when(branches, ty)
    }

    /// `if (condition) then` as a statement.
    pub fn if_then(&self, condition: Expr, then: Expr) -> Expr {
        let branches = vec![self.branch(condition, then)];
        self.when(branches, Type::Unit)
    }

    pub fn while_loop(&self, condition: Expr, body: Expr) -> Expr {
        self.make_loop(LoopKind::While, None, condition, body)
    }

    pub fn do_while(&self, body: Expr, condition: Expr) -> Expr {
        self.make_loop(LoopKind::DoWhile, None, condition, body)
    }

    /// `label@ while (condition) body`.
    pub fn labeled_while(&self, label: &str, condition: Expr, body: Expr) -> Expr {
        self.make_loop(LoopKind::While, Some(self.name(label)), condition, body)
    }

    fn make_loop(&self, kind: LoopKind, label: Option<Name>, condition: Expr, body: Expr) -> Expr {
        let lp = Loop {
            kind,
            label,
            condition: Box::new(condition),
            body: Some(Box::new(body)),
        };
        Expr::new(ExprKind::Loop(lp), Type::Unit, self.span())
    }

    pub fn break_loop(&self, label: Option<&str>) -> Expr {
        let label = label.map(|l| self.name(l));
        Expr::new(ExprKind::Break { label }, Type::Nothing, self.span())
    }

    pub fn continue_loop(&self, label: Option<&str>) -> Expr {
        let label = label.map(|l| self.name(l));
        Expr::new(ExprKind::Continue { label }, Type::Nothing, self.span())
    }

    // Functions and files

    pub fn block_body(&self, statements: Vec<Expr>) -> Body {
        Body::Block {
            statements,
            span: self.span(),
        }
    }

    /// Attach a body to a registered function, marking it `HAS_BODY`.
    pub fn build_function(
        &mut self,
        id: FunctionId,
        params: Vec<Param>,
        return_ty: Type,
        body: Body,
    ) -> Function {
        let name = match self.functions.get_mut(id) {
            Some(info) => {
                info.flags |= FunctionFlags::HAS_BODY;
                info.name
            }
            None => Name::EMPTY,
        };
        Function {
            id,
            name,
            params,
            return_ty,
            body: Some(body),
            span: self.span(),
        }
    }

    pub fn file(&self, path: &str, functions: Vec<Function>) -> IrFile {
        IrFile {
            path: self.name(path),
            functions,
        }
    }
}

impl Default for IrBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
