//! Stack growth for deep IR trees.
//!
//! The partial interpreter folds children before parents, so its recursion
//! depth follows the depth of the IR tree being folded. Generated code can
//! nest far deeper than a default thread stack allows; every recursive fold
//! and evaluation step goes through [`ensure_sufficient_stack`].
//!
//! - **Native targets**: `stacker` allocates a new segment when the remaining
//!   stack drops below the red zone.
//! - **WASM targets**: passthrough.

/// Remaining stack below which a new segment is allocated (128KB).
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment (2MB).
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, growing the stack first if less than the red zone remains.
///
/// ```text
/// fn fold(&mut self, expr: &Expr) -> FoldResult {
///     ensure_sufficient_stack(|| self.fold_inner(expr))
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests;
