//! Interpretation stack for simulated execution.
//!
//! A stack of frames, each mapping variable identities to slots. Frames are
//! pushed for blocks and loop iterations and popped on exit; the whole stack
//! is reset to a single root frame before each function is interpreted, so
//! no binding leaks from one function into the next.
//!
//! # Lookup
//!
//! Lookups walk from the top frame down through `Sub` frames and stop at the
//! first `Isolated` frame (inclusive). The root frame is always searched
//! last. Declarations and removals only ever touch a single frame.

use rustc_hash::FxHashMap;

use kiln_ir::{Name, VarId};

use crate::errors::FrameError;
use crate::Value;

/// Identifies the lexical scope (the enclosing file) a root frame belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ScopeToken(Name);

impl ScopeToken {
    #[inline]
    pub const fn new(scope: Name) -> Self {
        ScopeToken(scope)
    }

    #[inline]
    pub const fn name(self) -> Name {
        self.0
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FrameKind {
    /// Lookups fall through to the parent frame (block scoping).
    Sub,
    /// Lookups stop here, except for the root frame.
    Isolated,
}

/// A tracked variable. `value: None` means tracked but opaque.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Slot {
    pub var: VarId,
    pub value: Option<Value>,
}

#[derive(Clone, Debug)]
pub struct Frame {
    kind: FrameKind,
    slots: FxHashMap<VarId, Slot>,
}

impl Frame {
    fn new(kind: FrameKind) -> Self {
        Frame {
            kind,
            slots: FxHashMap::default(),
        }
    }

    #[inline]
    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

pub struct FrameStack {
    frames: Vec<Frame>,
    scope: Option<ScopeToken>,
}

impl FrameStack {
    /// A stack holding only an unscoped root frame.
    pub fn new() -> Self {
        FrameStack {
            frames: vec![Frame::new(FrameKind::Isolated)],
            scope: None,
        }
    }

    /// Drop every frame and start over with a root frame tied to `scope`.
    pub fn reset(&mut self, scope: ScopeToken) {
        self.frames.clear();
        self.frames.push(Frame::new(FrameKind::Isolated));
        self.scope = Some(scope);
    }

    #[inline]
    pub fn scope(&self) -> Option<ScopeToken> {
        self.scope
    }

    /// Number of live frames, including the root.
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn push_frame(&mut self, kind: FrameKind) {
        self.frames.push(Frame::new(kind));
    }

    pub fn pop_frame(&mut self) -> Result<Frame, FrameError> {
        if self.frames.len() <= 1 {
            return Err(FrameError::PopRoot);
        }
        self.frames.pop().ok_or(FrameError::PopRoot)
    }

    /// Declare `var` in the top frame.
    ///
    /// Shadowing a declaration of an enclosing frame is allowed; declaring
    /// twice in the same frame is not.
    pub fn declare(&mut self, var: VarId, value: Option<Value>) -> Result<(), FrameError> {
        let top = self
            .frames
            .last_mut()
            .ok_or(FrameError::Untracked(var))?;
        if top.slots.contains_key(&var) {
            return Err(FrameError::AlreadyDeclared(var));
        }
        top.slots.insert(var, Slot { var, value });
        Ok(())
    }

    /// Indices of the frames visible from the top, innermost first.
    fn visible(&self) -> impl Iterator<Item = usize> {
        let top = self.frames.len();
        let boundary = self
            .frames
            .iter()
            .rposition(|frame| frame.kind == FrameKind::Isolated)
            .unwrap_or(0);
        (boundary..top).rev().chain((boundary > 0).then_some(0))
    }

    fn owner(&self, var: VarId) -> Option<usize> {
        self.visible()
            .find(|&index| self.frames[index].slots.contains_key(&var))
    }

    #[inline]
    pub fn contains(&self, var: VarId) -> bool {
        self.owner(var).is_some()
    }

    pub fn get(&self, var: VarId) -> Result<&Slot, FrameError> {
        self.owner(var)
            .and_then(|index| self.frames[index].slots.get(&var))
            .ok_or(FrameError::Untracked(var))
    }

    /// The known value of `var`; `None` when untracked or opaque.
    pub fn value_of(&self, var: VarId) -> Option<&Value> {
        self.get(var).ok().and_then(|slot| slot.value.as_ref())
    }

    /// Rebind a tracked variable; `None` makes it opaque.
    pub fn set_value(&mut self, var: VarId, value: Option<Value>) -> Result<(), FrameError> {
        let index = self.owner(var).ok_or(FrameError::Untracked(var))?;
        let slot = self.frames[index]
            .slots
            .get_mut(&var)
            .ok_or(FrameError::Untracked(var))?;
        slot.value = value;
        Ok(())
    }

    /// Make `var` opaque if it is tracked. Untracked variables are ignored.
    pub fn forget(&mut self, var: VarId) {
        if let Some(index) = self.owner(var) {
            if let Some(slot) = self.frames[index].slots.get_mut(&var) {
                slot.value = None;
            }
        }
    }

    /// Make every variable bound to a complex value opaque, in every frame.
    ///
    /// Called when code the walker does not simulate may have mutated objects.
    pub fn forget_complex(&mut self) {
        for frame in &mut self.frames {
            for slot in frame.slots.values_mut() {
                if slot.value.as_ref().is_some_and(Value::is_complex) {
                    slot.value = None;
                }
            }
        }
    }

    /// Remove `var` from the frame that owns it.
    pub fn remove(&mut self, var: VarId) -> Result<Slot, FrameError> {
        let index = self.owner(var).ok_or(FrameError::Untracked(var))?;
        self.frames[index]
            .slots
            .remove(&var)
            .ok_or(FrameError::Untracked(var))
    }
}

impl Default for FrameStack {
    fn default() -> Self {
        Self::new()
    }
}
