//! Kotlin-like textual rendering of IR.
//!
//! The lowering pass compares dumps before and after interpretation to
//! decide whether a function changed, and tests assert on them. Binary
//! intrinsics print infix, getters as property reads, backing-field
//! accesses with a `#` prefix, and every `when` in its multi-branch form.

use std::fmt::Write;

use super::{
    Body, Call, Expr, ExprKind, Function, FunctionKind, FunctionTable, Intrinsic, LoopKind,
    Name, StringInterner, SyntheticKind, Type,
};

const INDENT: &str = "    ";

pub struct Printer<'a> {
    interner: &'a StringInterner,
    functions: &'a FunctionTable,
}

impl<'a> Printer<'a> {
    pub fn new(interner: &'a StringInterner, functions: &'a FunctionTable) -> Self {
        Printer {
            interner,
            functions,
        }
    }

    pub fn function(&self, function: &Function) -> String {
        let mut w = Writer::new(self);
        w.function(function);
        w.out
    }

    pub fn expr(&self, expr: &Expr) -> String {
        let mut w = Writer::new(self);
        w.expr(expr);
        w.out
    }

    fn name(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    pub fn ty(&self, ty: &Type) -> String {
        let mut out = String::new();
        self.write_ty(&mut out, ty);
        out
    }

    fn write_ty(&self, out: &mut String, ty: &Type) {
        let simple = match ty {
            Type::Unit => "Unit",
            Type::Nothing => "Nothing",
            Type::Any => "Any",
            Type::Boolean => "Boolean",
            Type::Char => "Char",
            Type::Byte => "Byte",
            Type::Short => "Short",
            Type::Int => "Int",
            Type::Long => "Long",
            Type::Float => "Float",
            Type::Double => "Double",
            Type::String => "String",
            Type::Class(name) => self.interner.lookup(*name),
            Type::Array(elem) => {
                out.push_str("Array<");
                self.write_ty(out, elem);
                out.push('>');
                return;
            }
            Type::Nullable(inner) => {
                self.write_ty(out, inner);
                out.push('?');
                return;
            }
        };
        out.push_str(simple);
    }
}

struct Writer<'p, 'a> {
    printer: &'p Printer<'a>,
    out: String,
    indent: usize,
}

impl<'p, 'a> Writer<'p, 'a> {
    fn new(printer: &'p Printer<'a>) -> Self {
        Writer {
            printer,
            out: String::new(),
            indent: 0,
        }
    }

    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.indent {
            self.out.push_str(INDENT);
        }
    }

    fn ty(&mut self, ty: &Type) {
        self.printer.write_ty(&mut self.out, ty);
    }

    fn function(&mut self, function: &Function) {
        let _ = write!(self.out, "fun {}(", self.printer.name(function.name));
        for (i, param) in function.params.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            let _ = write!(self.out, "{}: ", self.printer.name(param.local.name));
            self.ty(&param.ty);
        }
        self.out.push_str("): ");
        self.ty(&function.return_ty);
        match &function.body {
            None => {}
            Some(Body::Block { statements, .. }) => {
                self.out.push(' ');
                self.block(statements);
            }
            Some(Body::Expression(expr)) => {
                self.out.push_str(" = ");
                self.expr(expr);
            }
            Some(Body::Synthetic(kind)) => {
                let kind = match kind {
                    SyntheticKind::EnumValues => "values",
                    SyntheticKind::EnumValueOf => "valueOf",
                };
                let _ = write!(self.out, " = <synthetic {kind}>");
            }
        }
    }

    fn block(&mut self, statements: &[Expr]) {
        if statements.is_empty() {
            self.out.push_str("{}");
            return;
        }
        self.out.push('{');
        self.indent += 1;
        for stmt in statements {
            self.newline();
            self.expr(stmt);
        }
        self.indent -= 1;
        self.newline();
        self.out.push('}');
    }

    fn list(&mut self, exprs: &[Expr]) {
        for (i, expr) in exprs.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.expr(expr);
        }
    }

    /// Operand of an infix operator; nested infix operators get parentheses.
    fn operand(&mut self, expr: &Expr) {
        if self.infix_op(expr).is_some() {
            self.out.push('(');
            self.expr(expr);
            self.out.push(')');
        } else {
            self.expr(expr);
        }
    }

    fn infix_op(&self, expr: &Expr) -> Option<&'static str> {
        let ExprKind::Call(call) = &expr.kind else {
            return None;
        };
        if call.dispatch_receiver.is_none() || call.args.len() != 1 {
            return None;
        }
        match self.printer.functions.get(call.callee)?.kind {
            FunctionKind::Intrinsic(op) => op.infix_symbol(),
            _ => None,
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Const(c) => {
                let _ = write!(self.out, "{c}");
            }
            ExprKind::GetValue(local) => self.out.push_str(self.printer.name(local.name)),
            ExprKind::SetVariable { local, value } => {
                let _ = write!(self.out, "{} = ", self.printer.name(local.name));
                self.expr(value);
            }
            ExprKind::Variable(decl) => {
                let keyword = if decl.mutable { "var" } else { "val" };
                let _ = write!(self.out, "{keyword} {}", self.printer.name(decl.local.name));
                if let Some(init) = &decl.initializer {
                    self.out.push_str(" = ");
                    self.expr(init);
                }
            }
            ExprKind::Call(call) => self.call(call),
            ExprKind::ConstructorCall(call) | ExprKind::EnumConstructorCall(call) => {
                let _ = write!(self.out, "{}(", self.printer.name(call.class));
                self.list(&call.args);
                self.out.push(')');
            }
            ExprKind::DelegatingConstructorCall(call) => {
                let _ = write!(self.out, "super<{}>(", self.printer.name(call.class));
                self.list(&call.args);
                self.out.push(')');
            }
            ExprKind::InstanceInitializerCall { class } => {
                let _ = write!(self.out, "init<{}>()", self.printer.name(*class));
            }
            ExprKind::Block(stmts) => self.block(stmts),
            ExprKind::Return { value, .. } => {
                self.out.push_str("return ");
                self.expr(value);
            }
            ExprKind::GetField { receiver, field } => {
                if let Some(receiver) = receiver {
                    self.operand(receiver);
                    self.out.push('.');
                }
                let _ = write!(self.out, "#{}", self.printer.name(*field));
            }
            ExprKind::SetField {
                receiver,
                field,
                value,
            } => {
                if let Some(receiver) = receiver {
                    self.operand(receiver);
                    self.out.push('.');
                }
                let _ = write!(self.out, "#{} = ", self.printer.name(*field));
                self.expr(value);
            }
            ExprKind::TypeOperator {
                op,
                operand,
                type_operand,
            } => {
                self.operand(operand);
                let _ = write!(self.out, " {} ", op.symbol());
                self.ty(type_operand);
            }
            ExprKind::When(branches) => {
                self.out.push_str("when {");
                self.indent += 1;
                let last = branches.len().saturating_sub(1);
                for (i, branch) in branches.iter().enumerate() {
                    self.newline();
                    if i == last && branch.is_else() {
                        self.out.push_str("else");
                    } else {
                        self.expr(&branch.condition);
                    }
                    self.out.push_str(" -> ");
                    self.expr(&branch.result);
                }
                self.indent -= 1;
                self.newline();
                self.out.push('}');
            }
            ExprKind::Loop(lp) => {
                if let Some(label) = lp.label {
                    let _ = write!(self.out, "{}@ ", self.printer.name(label));
                }
                match lp.kind {
                    LoopKind::While => {
                        self.out.push_str("while (");
                        self.expr(&lp.condition);
                        self.out.push_str(") ");
                        self.loop_body(lp.body.as_deref());
                    }
                    LoopKind::DoWhile => {
                        self.out.push_str("do ");
                        self.loop_body(lp.body.as_deref());
                        self.out.push_str(" while (");
                        self.expr(&lp.condition);
                        self.out.push(')');
                    }
                }
            }
            ExprKind::Break { label } => {
                self.out.push_str("break");
                if let Some(label) = label {
                    let _ = write!(self.out, "@{}", self.printer.name(*label));
                }
            }
            ExprKind::Continue { label } => {
                self.out.push_str("continue");
                if let Some(label) = label {
                    let _ = write!(self.out, "@{}", self.printer.name(*label));
                }
            }
            ExprKind::Vararg(elements) => {
                self.out.push_str("vararg(");
                self.list(elements);
                self.out.push(')');
            }
            ExprKind::Throw(value) => {
                self.out.push_str("throw ");
                self.expr(value);
            }
            ExprKind::StringConcat(parts) => {
                self.out.push_str("concat(");
                self.list(parts);
                self.out.push(')');
            }
            ExprKind::FunctionReference(function) => {
                let name = self
                    .printer
                    .functions
                    .get(*function)
                    .map_or("<?>", |info| self.printer.name(info.name));
                let _ = write!(self.out, "::{name}");
            }
        }
    }

    fn loop_body(&mut self, body: Option<&Expr>) {
        match body {
            Some(Expr {
                kind: ExprKind::Block(stmts),
                ..
            }) => self.block(stmts),
            Some(other) => self.expr(other),
            None => self.out.push_str("{}"),
        }
    }

    fn call(&mut self, call: &Call) {
        let Some(info) = self.printer.functions.get(call.callee) else {
            self.out.push_str("<?>(");
            self.list(&call.args);
            self.out.push(')');
            return;
        };
        let receiver = call
            .dispatch_receiver
            .as_deref()
            .or(call.extension_receiver.as_deref());

        match (&info.kind, receiver) {
            (FunctionKind::Intrinsic(op), Some(receiver)) => {
                if let (Some(symbol), [rhs]) = (op.infix_symbol(), call.args.as_slice()) {
                    self.operand(receiver);
                    let _ = write!(self.out, " {symbol} ");
                    self.operand(rhs);
                    return;
                }
                match op {
                    Intrinsic::UnaryMinus => {
                        self.out.push('-');
                        self.operand(receiver);
                    }
                    Intrinsic::Not => {
                        self.out.push('!');
                        self.operand(receiver);
                    }
                    Intrinsic::ArraySize => {
                        self.operand(receiver);
                        self.out.push_str(".size");
                    }
                    Intrinsic::ArrayGet => {
                        self.operand(receiver);
                        self.out.push('[');
                        self.list(&call.args);
                        self.out.push(']');
                    }
                    _ => {
                        self.operand(receiver);
                        let _ = write!(self.out, ".{}(", op.name());
                        self.list(&call.args);
                        self.out.push(')');
                    }
                }
            }
            (FunctionKind::Getter { field }, Some(receiver)) => {
                self.operand(receiver);
                let _ = write!(self.out, ".{}", self.printer.name(*field));
            }
            (_, receiver) => {
                if let Some(receiver) = receiver {
                    self.operand(receiver);
                    self.out.push('.');
                }
                let _ = write!(self.out, "{}(", self.printer.name(info.name));
                self.list(&call.args);
                self.out.push(')');
            }
        }
    }
}
