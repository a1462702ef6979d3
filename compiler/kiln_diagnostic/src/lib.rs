//! Diagnostics for the partial evaluation pass.
//!
//! Partial evaluation is a best-effort optimization: it never fails the
//! compilation. Everything it reports is a warning or a note, e.g. a loop
//! whose simulation exceeded its iteration budget, or the rewritten dump of
//! a function the pass changed.

mod diagnostic;
mod error_code;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
