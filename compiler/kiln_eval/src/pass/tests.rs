use pretty_assertions::assert_eq;

use kiln_diagnostic::Severity;
use kiln_ir::{Body, Function, FunctionFlags, IrBuilder, Type};

use super::*;
use crate::{ConstEvaluator, TableOracle};

/// `fun six(): Int { var s = 0; s = s + 6; return s }` in `path`.
fn file(b: &mut IrBuilder, path: &str) -> IrFile {
    let f = b.function("six", FunctionFlags::empty());
    let s = b.local("s");
    let body = b.block_body(vec![
        b.var(s, b.int(0)),
        b.set(s, b.plus(b.get(s, Type::Int), b.int(6))),
        b.ret(f, b.get(s, Type::Int)),
    ]);
    let function = b.build_function(f, Vec::new(), Type::Int, body);
    b.file(path, vec![function])
}

fn statements(function: &Function) -> usize {
    match &function.body {
        Some(Body::Block { statements, .. }) => statements.len(),
        _ => 0,
    }
}

#[test]
fn disabled_pass_does_nothing() {
    let mut b = IrBuilder::new();
    let mut src = file(&mut b, "src/main.kt");
    let original = src.clone();

    let config = PartialEvalConfig::default();
    let oracle = TableOracle::new(b.functions());
    let pass = PartialEvaluationPass::new(&config, &oracle, b.interner(), b.functions());
    let mut evaluator = ConstEvaluator::new(b.functions());

    assert!(pass.lower_file(&mut src, &mut evaluator).is_empty());
    assert_eq!(src, original);
}

#[test]
fn excluded_paths_are_skipped() {
    let mut b = IrBuilder::new();
    let mut library = file(&mut b, "/home/kotlin/libraries/stdlib/src/Six.kt");
    let original = library.clone();

    let config = PartialEvalConfig::enabled();
    let oracle = TableOracle::new(b.functions());
    let pass = PartialEvaluationPass::new(&config, &oracle, b.interner(), b.functions());
    let mut evaluator = ConstEvaluator::new(b.functions());

    assert!(pass.lower_file(&mut library, &mut evaluator).is_empty());
    assert_eq!(library, original);
}

#[test]
fn rewrites_are_reported_as_notes() {
    let mut b = IrBuilder::new();
    let mut src = file(&mut b, "src/main.kt");

    let config = PartialEvalConfig::enabled();
    let oracle = TableOracle::new(b.functions());
    let pass = PartialEvaluationPass::new(&config, &oracle, b.interner(), b.functions());
    let mut evaluator = ConstEvaluator::new(b.functions());
    let diagnostics = pass.lower_file(&mut src, &mut evaluator);

    assert_eq!(statements(&src.functions[0]), 1);
    assert_eq!(diagnostics.len(), 1);
    let note = &diagnostics[0];
    assert_eq!(note.severity, Severity::Note);
    assert_eq!(note.code, ErrorCode::P1001);
    assert_eq!(note.message, "`six` was partially evaluated");
    assert_eq!(note.primary_span(), Some(src.functions[0].span));
    assert_eq!(note.notes, vec!["fun six(): Int {\n    return 6\n}".to_owned()]);
}

#[test]
fn reporting_can_be_switched_off() {
    let mut b = IrBuilder::new();
    let mut src = file(&mut b, "src/main.kt");

    let config = PartialEvalConfig::enabled().with_report_rewrites(false);
    let oracle = TableOracle::new(b.functions());
    let pass = PartialEvaluationPass::new(&config, &oracle, b.interner(), b.functions());
    let mut evaluator = ConstEvaluator::new(b.functions());

    assert!(pass.lower_file(&mut src, &mut evaluator).is_empty());
    assert_eq!(statements(&src.functions[0]), 1);
}

#[test]
fn files_are_lowered_in_parallel() {
    let mut b = IrBuilder::new();
    let mut files: Vec<IrFile> = (0..8)
        .map(|n| file(&mut b, &format!("src/file{n}.kt")))
        .collect();

    let config = PartialEvalConfig::enabled();
    let oracle = TableOracle::new(b.functions());
    let pass = PartialEvaluationPass::new(&config, &oracle, b.interner(), b.functions());
    let functions = b.functions();
    let diagnostics = pass.lower_files(&mut files, move || ConstEvaluator::new(functions));

    assert_eq!(diagnostics.len(), 8);
    assert!(files.iter().all(|f| statements(&f.functions[0]) == 1));
}
