use std::fmt;

/// Codes for partial-evaluation diagnostics.
///
/// Format: P####.
/// - P0xxx: simulation limits
/// - P1xxx: rewrite reports
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    /// Loop simulation stopped after the iteration budget
    P0001,
    /// Function body rewritten by partial evaluation
    P1001,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::P0001 => "P0001",
            ErrorCode::P1001 => "P1001",
        }
    }

    /// One-line explanation.
    pub fn description(self) -> &'static str {
        match self {
            ErrorCode::P0001 => "could not fully evaluate loop at compile time",
            ErrorCode::P1001 => "function body partially evaluated",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
