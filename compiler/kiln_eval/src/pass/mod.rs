//! File lowering pass.
//!
//! Runs the partial interpreter over every function of a file and reports
//! what changed. One interpreter serves a whole file, so objects created
//! while folding one function are never visible to the next (the frame
//! stack is reset per function) but the evaluator's heap is shared.

use kiln_diagnostic::{Diagnostic, ErrorCode};
use kiln_ir::{FunctionTable, IrFile, Printer, StringInterner};
use rayon::prelude::*;
use tracing::debug;

use crate::{
    EvaluabilityOracle, ExpressionEvaluator, PartialEvalConfig, PartialInterpreter, Rewrite,
    ScopeToken,
};

pub struct PartialEvaluationPass<'a> {
    config: &'a PartialEvalConfig,
    oracle: &'a (dyn EvaluabilityOracle + Sync),
    interner: &'a StringInterner,
    functions: &'a FunctionTable,
}

impl<'a> PartialEvaluationPass<'a> {
    pub fn new(
        config: &'a PartialEvalConfig,
        oracle: &'a (dyn EvaluabilityOracle + Sync),
        interner: &'a StringInterner,
        functions: &'a FunctionTable,
    ) -> Self {
        PartialEvaluationPass {
            config,
            oracle,
            interner,
            functions,
        }
    }

    /// Rewrite every function of `file` in place.
    ///
    /// Returns a note per rewritten function (when `report_rewrites` is on)
    /// followed by the interpreter's warnings.
    #[tracing::instrument(level = "debug", skip_all, fields(path = self.interner.lookup(file.path)))]
    pub fn lower_file(
        &self,
        file: &mut IrFile,
        evaluator: &mut dyn ExpressionEvaluator,
    ) -> Vec<Diagnostic> {
        if !self.config.enabled {
            return Vec::new();
        }
        let path = self.interner.lookup(file.path);
        if self.config.is_excluded(path) {
            debug!(path, "skipping excluded file");
            return Vec::new();
        }

        let printer = Printer::new(self.interner, self.functions);
        let scope = ScopeToken::new(file.path);
        let mut interpreter = PartialInterpreter::new(self.oracle, evaluator, self.config);
        let mut diagnostics = Vec::new();

        for function in &mut file.functions {
            let before = self.config.report_rewrites.then(|| printer.function(function));
            let rewrite = interpreter.interpret_function(function, scope);
            debug!(function = self.interner.lookup(function.name), ?rewrite);

            let Some(before) = before else {
                continue;
            };
            if rewrite != Rewrite::Rewritten {
                continue;
            }
            let after = printer.function(function);
            if after != before {
                diagnostics.push(
                    Diagnostic::note(ErrorCode::P1001)
                        .with_message(format!(
                            "`{}` was partially evaluated",
                            self.interner.lookup(function.name)
                        ))
                        .with_label(function.span, "rewritten at compile time")
                        .with_note(after),
                );
            }
        }

        diagnostics.extend(interpreter.take_diagnostics());
        diagnostics
    }

    /// Lower `files` in parallel, with a fresh evaluator per file.
    ///
    /// Diagnostics come back in file order.
    pub fn lower_files<E, F>(&self, files: &mut [IrFile], make_evaluator: F) -> Vec<Diagnostic>
    where
        E: ExpressionEvaluator,
        F: Fn() -> E + Sync + Send,
    {
        files
            .par_iter_mut()
            .flat_map_iter(|file| {
                let mut evaluator = make_evaluator();
                self.lower_file(file, &mut evaluator)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests;
