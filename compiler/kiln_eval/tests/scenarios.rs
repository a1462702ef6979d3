//! End-to-end partial evaluation of small programs through the file pass.
//!
//! Every case registers a handful of callables, builds one function, runs
//! [`PartialEvaluationPass::lower_file`] over it and compares the printed body.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use pretty_assertions::assert_eq;

use kiln_diagnostic::{Diagnostic, ErrorCode, Severity};
use kiln_eval::{ConstEvaluator, PartialEvalConfig, PartialEvaluationPass, TableOracle};
use kiln_ir::{
    Body, Expr, FunctionFlags, FunctionId, Intrinsic, IrBuilder, Local, Param, Printer, Type,
};

/// A module with one annotated class `A(a)`, one plain class `B(b)` and a few
/// callables the oracle refuses to run.
struct Program {
    b: IrBuilder,
    /// `nonConstCall()`
    non_const: FunctionId,
    /// `nonConstCall(x: Int)`
    non_const_arg: FunctionId,
    another: FunctionId,
    call_if_true: FunctionId,
    call_if_false: FunctionId,
    get_bool: FunctionId,
    get_int: FunctionId,
    new_a: FunctionId,
    a_getter: FunctionId,
    /// `A.inc()`, mutates the receiver.
    inc: FunctionId,
    new_b: FunctionId,
    b_getter: FunctionId,
}

struct Lowered {
    body: String,
    diagnostics: Vec<Diagnostic>,
}

impl Program {
    fn new() -> Self {
        kiln_eval::init_tracing();
        let mut b = IrBuilder::new();
        let plain = FunctionFlags::empty();
        let non_const = b.function("nonConstCall", plain);
        let non_const_arg = b.function("nonConstCall", plain);
        let another = b.function("anotherNonConstCall", plain);
        let call_if_true = b.function("callIfTrue", plain);
        let call_if_false = b.function("callIfFalse", plain);
        let get_bool = b.function("getBool", plain);
        let get_int = b.function("getInt", plain);
        let new_a = b.constructor("A", &["a"], FunctionFlags::COMPILE_TIME);
        let a_getter = b.getter("a", FunctionFlags::COMPILE_TIME);
        let inc = b.function("inc", plain);
        let new_b = b.constructor("B", &["b"], plain);
        let b_getter = b.getter("b", plain);
        Program {
            b,
            non_const,
            non_const_arg,
            another,
            call_if_true,
            call_if_false,
            get_bool,
            get_int,
            new_a,
            a_getter,
            inc,
            new_b,
            b_getter,
        }
    }

    fn int(&self, v: i32) -> Expr {
        self.b.int(v)
    }

    fn read(&self, local: Local) -> Expr {
        self.b.get(local, Type::Int)
    }

    fn opaque(&self, callee: FunctionId, args: Vec<Expr>, ty: Type) -> Expr {
        self.b.call(callee, args, ty)
    }

    fn a_of(&self, arg: Expr) -> Expr {
        self.b.construct(self.new_a, vec![arg])
    }

    fn field_a(&self, receiver: Expr) -> Expr {
        self.b.property(self.a_getter, receiver, Type::Int)
    }

    /// `target = target + amount`
    fn add_assign(&self, target: Local, amount: Expr) -> Expr {
        self.b.set(target, self.b.plus(self.read(target), amount))
    }

    fn lower(
        &mut self,
        name: &str,
        params: Vec<Param>,
        build: impl FnOnce(&Self, FunctionId) -> Vec<Expr>,
    ) -> Lowered {
        self.lower_with(&PartialEvalConfig::enabled(), name, params, build)
    }

    fn lower_with(
        &mut self,
        config: &PartialEvalConfig,
        name: &str,
        params: Vec<Param>,
        build: impl FnOnce(&Self, FunctionId) -> Vec<Expr>,
    ) -> Lowered {
        let f = self.b.function(name, FunctionFlags::empty());
        let statements = build(self, f);
        self.run(config, f, params, statements)
    }

    fn run(
        &mut self,
        config: &PartialEvalConfig,
        f: FunctionId,
        params: Vec<Param>,
        statements: Vec<Expr>,
    ) -> Lowered {
        let body = self.b.block_body(statements);
        let function = self.b.build_function(f, params, Type::Int, body);
        let mut file = self.b.file("src/box.kt", vec![function]);

        let oracle = TableOracle::new(self.b.functions());
        let pass = PartialEvaluationPass::new(config, &oracle, self.b.interner(), self.b.functions());
        let mut evaluator = ConstEvaluator::new(self.b.functions());
        let diagnostics = pass.lower_file(&mut file, &mut evaluator);

        let Some(Body::Block { statements, .. }) = &file.functions[0].body else {
            panic!("expected a block body");
        };
        let printer = Printer::new(self.b.interner(), self.b.functions());
        let body = statements
            .iter()
            .map(|stmt| printer.expr(stmt))
            .collect::<Vec<_>>()
            .join("\n");
        Lowered { body, diagnostics }
    }

    /// Printed body of a function that was never lowered.
    fn unchanged(&self, statements: &[Expr]) -> String {
        let printer = Printer::new(self.b.interner(), self.b.functions());
        statements
            .iter()
            .map(|stmt| printer.expr(stmt))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[test]
fn accumulated_variable_folds_to_constant() {
    let mut p = Program::new();
    let out = p.lower("box", Vec::new(), |p, f| {
        let s = p.b.local("s");
        vec![
            p.b.var(s, p.int(0)),
            p.add_assign(s, p.int(1)),
            p.add_assign(s, p.int(2)),
            p.add_assign(s, p.int(3)),
            p.b.ret(f, p.read(s)),
        ]
    });
    assert_eq!(out.body, "return 6");
    assert_eq!(out.diagnostics.len(), 1);
    assert_eq!(out.diagnostics[0].code, ErrorCode::P1001);
}

#[test]
fn postfix_increments_fold() {
    let mut p = Program::new();
    let out = p.lower("exmpl2", Vec::new(), |p, f| {
        let i = p.b.local("i");
        vec![
            p.b.var(i, p.int(0)),
            p.add_assign(i, p.int(1)),
            p.add_assign(i, p.int(1)),
            p.b.ret(f, p.read(i)),
        ]
    });
    assert_eq!(out.body, "return 2");
}

#[test]
fn annotated_class_property_folds() {
    let mut p = Program::new();
    let out = p.lower("box1", Vec::new(), |p, f| {
        let obj = p.b.local("obj");
        vec![
            p.b.val(obj, p.a_of(p.int(10))),
            p.b.ret(f, p.field_a(p.b.get(obj, Type::Class(p.b.name("A"))))),
        ]
    });
    assert_eq!(out.body, "return 10");
}

#[test]
fn object_with_opaque_argument_is_inlined_not_evaluated() {
    let mut p = Program::new();
    let out = p.lower("box2", Vec::new(), |p, f| {
        let obj = p.b.local("obj");
        vec![
            p.b.val(obj, p.a_of(p.opaque(p.non_const, Vec::new(), Type::Int))),
            p.b.ret(f, p.field_a(p.b.get(obj, Type::Class(p.b.name("A"))))),
        ]
    });
    assert_eq!(out.body, "return A(nonConstCall()).a");
}

#[test]
fn mutating_call_keeps_object_opaque() {
    let mut p = Program::new();
    let obj = p.b.local("obj");
    let class_a = Type::Class(p.b.name("A"));
    let f = p.b.function("box3", FunctionFlags::empty());
    let statements = vec![
        p.b.val(obj, p.a_of(p.int(10))),
        p.b.method_call(p.inc, p.b.get(obj, class_a.clone()), Vec::new(), Type::Unit),
        p.b.ret(f, p.field_a(p.b.get(obj, class_a))),
    ];
    let before = p.unchanged(&statements);

    let out = p.run(&PartialEvalConfig::enabled(), f, Vec::new(), statements);
    assert_eq!(out.body, before);
    assert!(out.diagnostics.is_empty());
}

#[test]
fn opaque_initializer_is_inlined_into_return() {
    let mut p = Program::new();
    let a = p.b.param("a", Type::Int);
    let a_local = a.local;
    let out = p.lower("box4", vec![a], |p, f| {
        let b = p.b.local("b");
        vec![
            p.b.val(b, p.opaque(p.non_const_arg, vec![p.read(a_local)], Type::Int)),
            p.b.ret(f, p.read(b)),
        ]
    });
    assert_eq!(out.body, "return nonConstCall(a)");
}

#[test]
fn opaque_calls_keep_their_order() {
    let mut p = Program::new();
    let a = p.b.param("a", Type::Int);
    let a_local = a.local;
    let out = p.lower("box5", vec![a], |p, f| {
        let b = p.b.local("b");
        let c = p.b.local("c");
        let choice = p.b.if_else(
            p.b.boolean(true),
            p.opaque(p.non_const, Vec::new(), Type::Int),
            p.opaque(p.another, Vec::new(), Type::Int),
            Type::Int,
        );
        vec![
            p.b.val(b, p.opaque(p.non_const_arg, vec![p.read(a_local)], Type::Int)),
            p.b.val(c, choice),
            p.b.ret(f, p.b.plus(p.read(b), p.read(c))),
        ]
    });
    assert_eq!(out.body, "return nonConstCall(a) + nonConstCall()");
}

#[test]
fn plain_class_leaves_tail_alone() {
    let mut p = Program::new();
    let out = p.lower("box7", Vec::new(), |p, f| {
        let sum = p.b.local("sum");
        let b_of_ten = p.b.construct(p.new_b, vec![p.int(10)]);
        vec![
            p.b.var(sum, p.int(0)),
            p.add_assign(sum, p.int(1)),
            p.add_assign(sum, p.int(2)),
            p.add_assign(sum, p.b.property(p.b_getter, b_of_ten, Type::Int)),
            p.b.ret(f, p.read(sum)),
        ]
    });
    assert_eq!(
        out.body,
        "var sum = 0\nsum = 1\nsum = 3\nsum = sum + B(10).b\nreturn sum"
    );
}

#[test]
fn constant_condition_folds_through_if() {
    let mut p = Program::new();
    let out = p.lower("box8", Vec::new(), |p, f| {
        let sum = p.b.local("sum");
        let two = p.b.eq(p.read(sum), p.int(3));
        vec![
            p.b.var(sum, p.int(0)),
            p.add_assign(sum, p.int(1)),
            p.add_assign(sum, p.int(2)),
            p.b.if_then(two, p.add_assign(sum, p.int(3))),
            p.b.ret(f, p.read(sum)),
        ]
    });
    assert_eq!(out.body, "return 6");
}

#[test]
fn unknown_condition_forgets_branch_writes() {
    let mut p = Program::new();
    let out = p.lower("box8b", Vec::new(), |p, f| {
        let sum = p.b.local("sum");
        let unknown = p.b.eq(p.opaque(p.non_const, Vec::new(), Type::Int), p.int(0));
        vec![
            p.b.var(sum, p.int(0)),
            p.add_assign(sum, p.int(1)),
            p.add_assign(sum, p.int(2)),
            p.b.if_then(unknown, p.add_assign(sum, p.int(3))),
            p.b.ret(f, p.read(sum)),
        ]
    });
    assert_eq!(
        out.body,
        "var sum = 0\nsum = 1\nsum = 3\nwhen {\n    nonConstCall() == 0 -> sum = sum + 3\n}\nreturn sum"
    );
}

#[test]
fn if_true_returns_string_literal() {
    let mut p = Program::new();
    let out = p.lower("ifTrue", Vec::new(), |p, f| {
        let choice = p.b.if_else(p.b.boolean(true), p.b.string("OK"), p.b.string("NOK"), Type::String);
        vec![p.b.ret(f, choice)]
    });
    assert_eq!(out.body, "return \"OK\"");
}

#[test]
fn if_true_picks_then_call() {
    let mut p = Program::new();
    let out = p.lower("ifTrueCall", Vec::new(), |p, f| {
        let choice = p.b.if_else(
            p.b.boolean(true),
            p.opaque(p.call_if_true, Vec::new(), Type::Int),
            p.opaque(p.call_if_false, Vec::new(), Type::Int),
            Type::Int,
        );
        vec![p.b.ret(f, choice)]
    });
    assert_eq!(out.body, "return callIfTrue()");
}

#[test]
fn if_false_picks_else_call() {
    let mut p = Program::new();
    let out = p.lower("ifFalse", Vec::new(), |p, f| {
        let choice = p.b.if_else(
            p.b.not(p.b.boolean(true)),
            p.opaque(p.call_if_true, Vec::new(), Type::Int),
            p.opaque(p.call_if_false, Vec::new(), Type::Int),
            Type::Int,
        );
        vec![p.b.ret(f, choice)]
    });
    assert_eq!(out.body, "return callIfFalse()");
}

#[test]
fn if_with_unknown_condition_is_unchanged() {
    let mut p = Program::new();
    let f = p.b.function("ifWithNonConstCondition", FunctionFlags::empty());
    let choice = p.b.if_else(
        p.opaque(p.get_bool, Vec::new(), Type::Boolean),
        p.opaque(p.call_if_true, Vec::new(), Type::Int),
        p.opaque(p.call_if_false, Vec::new(), Type::Int),
        Type::Int,
    );
    let statements = vec![p.b.ret(f, choice)];
    let before = p.unchanged(&statements);

    let out = p.run(&PartialEvalConfig::enabled(), f, Vec::new(), statements);
    assert_eq!(out.body, before);
    assert!(out.diagnostics.is_empty());
}

#[test]
fn branch_locals_do_not_leak() {
    let mut p = Program::new();
    let out = p.lower("ifWithVariables", Vec::new(), |p, f| {
        let class_a = Type::Class(p.b.name("A"));
        let then_a = p.b.local("a");
        let else_a = p.b.local("a");
        let b = p.b.local("b");
        let a = p.b.local("a");
        let then = p.b.block(
            vec![p.b.val(then_a, p.a_of(p.int(10))), p.b.get(then_a, class_a.clone())],
            class_a.clone(),
        );
        let otherwise = p.b.block(
            vec![p.b.val(else_a, p.a_of(p.int(20))), p.b.get(else_a, class_a.clone())],
            class_a.clone(),
        );
        vec![
            p.b.val(b, p.b.if_else(p.b.boolean(true), then, otherwise, class_a.clone())),
            p.b.val(a, p.opaque(p.get_int, Vec::new(), Type::Int)),
            p.b.ret(f, p.b.plus(p.read(a), p.field_a(p.b.get(b, class_a)))),
        ]
    });
    assert_eq!(out.body, "return getInt() + A(10).a");
}

#[test]
fn array_sum_loop_is_simulated() {
    let mut p = Program::new();
    let out = p.lower("loop1", Vec::new(), |p, f| {
        let array_ty = Type::Array(Box::new(Type::Int));
        let a = p.b.local("a");
        let sum = p.b.local("sum");
        let i = p.b.local("i");
        let size = p.b.unary(Intrinsic::ArraySize, p.b.get(a, array_ty.clone()));
        let element = p.b.binary(Intrinsic::ArrayGet, p.b.get(a, array_ty), p.read(i));
        let body = p.b.block(
            vec![p.add_assign(sum, element), p.add_assign(i, p.int(1))],
            Type::Unit,
        );
        vec![
            p.b.val(a, p.b.vararg(vec![p.int(1), p.int(2), p.int(3)], Type::Int)),
            p.b.var(sum, p.int(0)),
            p.b.var(i, p.int(0)),
            p.b.while_loop(p.b.less(p.read(i), size), body),
            p.b.ret(f, p.read(sum)),
        ]
    });
    assert!(out.body.starts_with("val a = vararg(1, 2, 3)"), "{}", out.body);
    assert!(out.body.contains("while (i < a.size)"), "{}", out.body);
    assert!(out.body.ends_with("return 6"), "{}", out.body);
}

#[test]
fn loop_with_objects_in_body() {
    let mut p = Program::new();
    let out = p.lower("loop2", Vec::new(), |p, f| {
        let sum = p.b.local("sum");
        let i = p.b.local("i");
        let obj = p.b.local("obj");
        let body = p.b.block(
            vec![
                p.b.val(obj, p.a_of(p.read(i))),
                p.add_assign(sum, p.field_a(p.b.get(obj, Type::Class(p.b.name("A"))))),
                p.add_assign(i, p.int(1)),
            ],
            Type::Unit,
        );
        vec![
            p.b.var(sum, p.int(0)),
            p.b.var(i, p.int(0)),
            p.b.while_loop(p.b.less(p.read(i), p.int(4)), body),
            p.b.ret(f, p.read(sum)),
        ]
    });
    assert!(out.body.ends_with("return 6"), "{}", out.body);
}

#[test]
fn break_stops_simulation() {
    let mut p = Program::new();
    let out = p.lower("loop3", Vec::new(), |p, f| {
        let sum = p.b.local("sum");
        let i = p.b.local("i");
        let stop = p.b.binary(Intrinsic::GreaterOrEqual, p.read(i), p.int(5));
        let bound = p.b.binary(Intrinsic::LessOrEqual, p.read(i), p.int(10));
        let body = p.b.block(
            vec![
                p.b.if_then(stop, p.b.break_loop(None)),
                p.add_assign(sum, p.read(i)),
                p.add_assign(i, p.int(1)),
            ],
            Type::Unit,
        );
        vec![
            p.b.var(sum, p.int(0)),
            p.b.var(i, p.int(0)),
            p.b.while_loop(bound, body),
            p.b.ret(f, p.read(sum)),
        ]
    });
    assert!(out.body.ends_with("return 10"), "{}", out.body);
}

#[test]
fn endless_loop_hits_budget() {
    let mut p = Program::new();
    let config = PartialEvalConfig::enabled().with_max_loop_iterations(100);
    let f = p.b.function("spin", FunctionFlags::empty());
    let statements = vec![
        p.b.while_loop(p.b.boolean(true), p.b.block(Vec::new(), Type::Unit)),
        p.b.ret(f, p.int(0)),
    ];
    let before = p.unchanged(&statements);

    let out = p.run(&config, f, Vec::new(), statements);
    assert_eq!(out.body, before);
    assert_eq!(out.diagnostics.len(), 1);
    let warning = &out.diagnostics[0];
    assert_eq!(warning.severity, Severity::Warning);
    assert_eq!(warning.code, ErrorCode::P0001);
}

#[test]
fn property_read_stays_before_mutation() {
    let mut p = Program::new();
    let class_a = Type::Class(p.b.name("A"));
    let obj = p.b.param("obj", class_a.clone());
    let obj_local = obj.local;
    let f = p.b.function("readThenInc", FunctionFlags::empty());
    let a = p.b.local("a");
    let statements = vec![
        p.b.val(a, p.field_a(p.b.get(obj_local, class_a.clone()))),
        p.b.method_call(p.inc, p.b.get(obj_local, class_a), Vec::new(), Type::Unit),
        p.b.ret(f, p.read(a)),
    ];
    let before = p.unchanged(&statements);

    let out = p.run(&PartialEvalConfig::enabled(), f, vec![obj], statements);
    assert_eq!(out.body, before);
    assert!(out.diagnostics.is_empty());
}
