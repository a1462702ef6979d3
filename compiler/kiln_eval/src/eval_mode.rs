//! Evaluation modes for partial evaluation.
//!
//! The mode decides which callees may be executed at compile time. It is a
//! plain enum with policy methods; the oracle consults it for every call.

use kiln_ir::FunctionInfo;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum EvalMode {
    /// Only built-in operators.
    OnlyBuiltins,
    /// Built-ins plus callables annotated as compile-time evaluable.
    #[default]
    WithAnnotations,
    /// Every known callable.
    Full,
}

impl EvalMode {
    /// Whether this mode may execute anything besides built-in operators.
    #[inline]
    pub fn allows_user_functions(self) -> bool {
        !matches!(self, Self::OnlyBuiltins)
    }

    /// Whether a user callable must carry the compile-time annotation.
    #[inline]
    pub fn requires_annotation(self) -> bool {
        matches!(self, Self::WithAnnotations)
    }

    /// Whether a call to `info` may be evaluated under this mode.
    pub fn permits(self, info: &FunctionInfo) -> bool {
        if info.is_intrinsic() {
            return true;
        }
        if !self.allows_user_functions() {
            return false;
        }
        !self.requires_annotation() || info.is_compile_time()
    }
}
