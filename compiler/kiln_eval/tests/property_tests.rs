//! Property-based tests for the partial evaluator.
//!
//! Random straight-line programs and counting loops are lowered and checked for:
//! 1. Cleanup idempotence: a second cleanup over cleaned statements is a no-op.
//! 2. Opaque calls are neither dropped nor duplicated.
//! 3. A deny-all oracle never produces a value that was not already written.
//! 4. Loops finish within the budget or leave the function untouched.
//! 5. Folded arithmetic agrees with direct wrapping evaluation.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]
#![allow(
    clippy::uninlined_format_args,
    clippy::cast_sign_loss,
    reason = "Proptest macros generate code with these patterns"
)]

use kiln_diagnostic::{Diagnostic, ErrorCode};
use kiln_eval::cleanup::remove_unused_statements;
use kiln_eval::effects::is_pure;
use kiln_eval::{
    ConstEvaluator, EvalMode, EvaluabilityOracle, PartialEvalConfig, PartialEvaluationPass,
    TableOracle,
};
use kiln_ir::{Body, Expr, FunctionFlags, FunctionId, Intrinsic, IrBuilder, Local, Printer, Type};
use proptest::prelude::*;
use rustc_hash::FxHashSet;

// -- Program Generation --

#[derive(Clone, Debug)]
enum Init {
    Const(i32),
    Opaque,
    /// `local[index % declared] + constant`
    Sum(usize, i32),
}

#[derive(Clone, Debug)]
enum Op {
    Declare(Init),
    Assign(usize, Init),
    Call,
}

#[derive(Clone, Debug)]
struct StraightLine {
    ops: Vec<Op>,
    returned: Vec<usize>,
}

fn init_strategy() -> impl Strategy<Value = Init> {
    prop_oneof![
        (100i32..1000).prop_map(Init::Const),
        Just(Init::Opaque),
        (any::<usize>(), 100i32..1000).prop_map(|(i, c)| Init::Sum(i, c)),
    ]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => init_strategy().prop_map(Op::Declare),
        2 => (any::<usize>(), init_strategy()).prop_map(|(i, init)| Op::Assign(i, init)),
        1 => Just(Op::Call),
    ]
}

fn straight_line_strategy() -> impl Strategy<Value = StraightLine> {
    (
        prop::collection::vec(op_strategy(), 1..8),
        prop::collection::vec(any::<usize>(), 0..3),
    )
        .prop_map(|(ops, returned)| StraightLine { ops, returned })
}

#[derive(Clone, Debug)]
enum Arith {
    Lit(i32),
    /// `x` when true, `y` otherwise.
    Var(bool),
    Bin(Intrinsic, Box<Arith>, Box<Arith>),
}

fn arith_strategy() -> impl Strategy<Value = Arith> {
    let leaf = prop_oneof![
        (-50i32..50).prop_map(Arith::Lit),
        any::<bool>().prop_map(Arith::Var),
    ];
    leaf.prop_recursive(4, 24, 2, |inner| {
        (
            prop_oneof![
                Just(Intrinsic::Plus),
                Just(Intrinsic::Minus),
                Just(Intrinsic::Times),
            ],
            inner.clone(),
            inner,
        )
            .prop_map(|(op, lhs, rhs)| Arith::Bin(op, Box::new(lhs), Box::new(rhs)))
    })
}

fn reference(expr: &Arith, x: i32, y: i32) -> i32 {
    match expr {
        Arith::Lit(v) => *v,
        Arith::Var(true) => x,
        Arith::Var(false) => y,
        Arith::Bin(op, lhs, rhs) => {
            let (l, r) = (reference(lhs, x, y), reference(rhs, x, y));
            match op {
                Intrinsic::Plus => l.wrapping_add(r),
                Intrinsic::Minus => l.wrapping_sub(r),
                Intrinsic::Times => l.wrapping_mul(r),
                _ => unreachable!("only + - * are generated"),
            }
        }
    }
}

// -- Harness --

struct Harness {
    b: IrBuilder,
    f: FunctionId,
    non_const: FunctionId,
}

impl Harness {
    fn new() -> Self {
        let mut b = IrBuilder::new();
        let f = b.function("f", FunctionFlags::empty());
        let non_const = b.function("nonConstCall", FunctionFlags::empty());
        Harness { b, f, non_const }
    }

    fn init(&self, init: &Init, locals: &[Local]) -> Expr {
        match init {
            Init::Const(c) => self.b.int(*c),
            Init::Opaque => self.b.call(self.non_const, Vec::new(), Type::Int),
            Init::Sum(_, c) if locals.is_empty() => self.b.int(*c),
            Init::Sum(i, c) => {
                let read = self.b.get(locals[i % locals.len()], Type::Int);
                self.b.plus(read, self.b.int(*c))
            }
        }
    }

    fn straight_line(&self, program: &StraightLine) -> Vec<Expr> {
        let mut locals: Vec<Local> = Vec::new();
        let mut statements = Vec::new();
        for op in &program.ops {
            match op {
                Op::Declare(init) => {
                    let init = self.init(init, &locals);
                    let local = self.b.local("v");
                    statements.push(self.b.var(local, init));
                    locals.push(local);
                }
                Op::Assign(i, init) if !locals.is_empty() => {
                    let target = locals[i % locals.len()];
                    statements.push(self.b.set(target, self.init(init, &locals)));
                }
                Op::Assign(..) | Op::Call => {
                    statements.push(self.b.call(self.non_const, Vec::new(), Type::Unit));
                }
            }
        }
        let value = if locals.is_empty() {
            self.b.int(0)
        } else {
            program
                .returned
                .iter()
                .map(|i| self.b.get(locals[i % locals.len()], Type::Int))
                .reduce(|acc, read| self.b.plus(acc, read))
                .unwrap_or_else(|| self.b.int(0))
        };
        statements.push(self.b.ret(self.f, value));
        statements
    }

    fn arith(&self, expr: &Arith, x: Local, y: Local) -> Expr {
        match expr {
            Arith::Lit(v) => self.b.int(*v),
            Arith::Var(true) => self.b.get(x, Type::Int),
            Arith::Var(false) => self.b.get(y, Type::Int),
            Arith::Bin(op, lhs, rhs) => {
                self.b
                    .binary(*op, self.arith(lhs, x, y), self.arith(rhs, x, y))
            }
        }
    }

    fn print(&self, statements: &[Expr]) -> String {
        let printer = Printer::new(self.b.interner(), self.b.functions());
        statements
            .iter()
            .map(|stmt| printer.expr(stmt))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn lower(
        &mut self,
        statements: Vec<Expr>,
        config: &PartialEvalConfig,
        oracle: Option<&(dyn EvaluabilityOracle + Sync)>,
    ) -> (String, Vec<Diagnostic>) {
        let body = self.b.block_body(statements);
        let function = self.b.build_function(self.f, Vec::new(), Type::Int, body);
        let mut file = self.b.file("src/generated.kt", vec![function]);

        let table = TableOracle::new(self.b.functions());
        let oracle = oracle.unwrap_or(&table);
        let pass = PartialEvaluationPass::new(config, oracle, self.b.interner(), self.b.functions());
        let mut evaluator = ConstEvaluator::new(self.b.functions());
        let diagnostics = pass.lower_file(&mut file, &mut evaluator);

        let Some(Body::Block { statements, .. }) = &file.functions[0].body else {
            panic!("expected a block body");
        };
        (self.print(statements), diagnostics)
    }
}

/// Every run of ASCII digits in `text`.
fn numbers(text: &str) -> FxHashSet<i64> {
    text.split(|c: char| !c.is_ascii_digit())
        .filter(|run| !run.is_empty())
        .filter_map(|run| run.parse().ok())
        .collect()
}

fn deny_all(_: FunctionId, _: EvalMode) -> bool {
    false
}

// -- Properties --

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 1000,
        ..ProptestConfig::default()
    })]

    #[test]
    fn prop_cleanup_is_idempotent(program in straight_line_strategy()) {
        let h = Harness::new();
        let statements = h.straight_line(&program);
        let oracle = TableOracle::new(h.b.functions());
        let purity = |expr: &Expr| is_pure(expr, &oracle, EvalMode::default());

        let once = remove_unused_statements(statements, &purity);
        let twice = remove_unused_statements(once.clone(), &purity);
        prop_assert_eq!(h.print(&once), h.print(&twice));
    }

    #[test]
    fn prop_opaque_calls_are_preserved(program in straight_line_strategy()) {
        let mut h = Harness::new();
        let statements = h.straight_line(&program);
        let before = h.print(&statements).matches("nonConstCall(").count();

        let (after, _) = h.lower(statements, &PartialEvalConfig::enabled(), None);
        prop_assert_eq!(after.matches("nonConstCall(").count(), before, "{}", after);
    }

    #[test]
    fn prop_deny_all_evaluates_nothing(program in straight_line_strategy()) {
        let mut h = Harness::new();
        let statements = h.straight_line(&program);
        let written = numbers(&h.print(&statements));

        let oracle = deny_all;
        let (after, _) = h.lower(statements, &PartialEvalConfig::enabled(), Some(&oracle));
        for n in numbers(&after) {
            prop_assert!(written.contains(&n), "{} was computed in:\n{}", n, after);
        }
    }

    #[test]
    fn prop_loops_finish_or_give_up(start in 0i32..10, target in 0i32..40, step in 1i32..4) {
        const BUDGET: u32 = 8;
        let mut h = Harness::new();
        let i = h.b.local("i");
        let body = h.b.block(
            vec![h.b.set(i, h.b.plus(h.b.get(i, Type::Int), h.b.int(step)))],
            Type::Unit,
        );
        let statements = vec![
            h.b.var(i, h.b.int(start)),
            h.b.while_loop(h.b.less(h.b.get(i, Type::Int), h.b.int(target)), body),
            h.b.ret(h.f, h.b.get(i, Type::Int)),
        ];
        let before = h.print(&statements);

        let config = PartialEvalConfig::enabled().with_max_loop_iterations(BUDGET);
        let (after, diagnostics) = h.lower(statements, &config, None);

        let needed = if target > start { (target - start + step - 1) / step } else { 0 };
        if needed as u32 <= BUDGET {
            let end = start + needed * step;
            prop_assert!(after.ends_with(&format!("return {}", end)), "{}", after);
        } else {
            prop_assert_eq!(&after, &before);
            prop_assert!(diagnostics.iter().any(|d| d.code == ErrorCode::P0001));
        }
    }

    #[test]
    fn prop_folded_arithmetic_is_sound(
        expr in arith_strategy(),
        x_value in -100i32..100,
        y_value in -100i32..100,
    ) {
        let mut h = Harness::new();
        let x = h.b.local("x");
        let y = h.b.local("y");
        let statements = vec![
            h.b.val(x, h.b.int(x_value)),
            h.b.val(y, h.b.int(y_value)),
            h.b.ret(h.f, h.arith(&expr, x, y)),
        ];

        let (after, _) = h.lower(statements, &PartialEvalConfig::enabled(), None);
        prop_assert_eq!(after, format!("return {}", reference(&expr, x_value, y_value)));
    }
}
