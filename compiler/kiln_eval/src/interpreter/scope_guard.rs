//! RAII frame management for the walker.
//!
//! [`ScopedWalker`] pushes a frame on creation and pops it when dropped, so
//! every exit path of a block or loop iteration (including unwinding)
//! leaves the frame stack balanced. It derefs to the walker, so code inside
//! the scope calls walker methods directly.

use std::ops::{Deref, DerefMut};

use super::PartialInterpreter;
use crate::FrameKind;

pub struct ScopedWalker<'guard, 'a> {
    walker: &'guard mut PartialInterpreter<'a>,
}

impl Drop for ScopedWalker<'_, '_> {
    fn drop(&mut self) {
        let popped = self.walker.frames.pop_frame();
        // Release builds keep going: the only failure is popping the root,
        // which leaves the stack as it was.
        debug_assert!(popped.is_ok(), "scoped frame already popped");
    }
}

impl<'a> Deref for ScopedWalker<'_, 'a> {
    type Target = PartialInterpreter<'a>;

    fn deref(&self) -> &Self::Target {
        self.walker
    }
}

impl DerefMut for ScopedWalker<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.walker
    }
}

impl<'a> PartialInterpreter<'a> {
    /// Push a frame of `kind`; it is popped when the guard drops.
    pub fn scoped(&mut self, kind: FrameKind) -> ScopedWalker<'_, 'a> {
        self.frames.push_frame(kind);
        ScopedWalker { walker: self }
    }

    /// Run `f` inside a frame of `kind`.
    pub fn with_frame<T, F>(&mut self, kind: FrameKind, f: F) -> T
    where
        F: FnOnce(&mut ScopedWalker<'_, 'a>) -> T,
    {
        let mut scoped = self.scoped(kind);
        f(&mut scoped)
    }
}
