//! Kiln Eval - partial (compile-time) evaluation of the Kiln IR.
//!
//! Walks function bodies, simulates the parts whose inputs are known at
//! compile time, and rewrites them into literals, dropping branches that
//! can never run and variables that are no longer needed.
//!
//! # Architecture
//!
//! - `FrameStack`: variable tracking for simulated execution
//! - `EvaluabilityOracle`: decides which callees may run at compile time
//! - `ExpressionEvaluator`: executes fully folded expressions
//!   (`ConstEvaluator` is the built-in implementation)
//! - `PartialInterpreter`: the tree walker; folds nodes into `FoldResult`s
//! - `cleanup`: removes and inlines declarations after folding
//! - `PartialEvaluationPass`: runs the walker over every function of a file
//!
//! # Debug Environment Variables
//!
//! - `RUST_LOG=kiln_eval=debug`: skipped files, evaluator failures.
//! - `RUST_LOG=kiln_eval=trace`: every node the walker gives up on.

pub mod cleanup;
mod config;
mod const_eval;
pub mod effects;
mod errors;
mod eval_mode;
mod evaluator;
mod fold;
mod frame_stack;
pub mod interpreter;
mod oracle;
mod pass;
mod value;

use std::sync::Once;

pub use config::{PartialEvalConfig, DEFAULT_MAX_LOOP_ITERATIONS, LIBRARY_PATH_FRAGMENT};
pub use const_eval::ConstEvaluator;
pub use errors::{ExecutionFailure, FrameError};
pub use eval_mode::EvalMode;
pub use evaluator::ExpressionEvaluator;
pub use fold::{FoldResult, Folded, Halt, Jump};
pub use frame_stack::{Frame, FrameKind, FrameStack, ScopeToken, Slot};
pub use interpreter::{PartialInterpreter, Rewrite, ScopedWalker};
pub use oracle::{EvaluabilityOracle, TableOracle};
pub use pass::PartialEvaluationPass;
pub use value::{ObjectId, Value};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Does nothing unless `RUST_LOG` is set.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}
