//! Identities of locals and callables.

use std::fmt;

use super::Name;

/// Unique identity of a declared local (variable or parameter).
///
/// Two declarations never share a `VarId`, even when they share a name.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VarId(u32);

impl VarId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        VarId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Handle of a callable registered in a [`FunctionTable`](crate::FunctionTable).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct FunctionId(u32);

impl FunctionId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        FunctionId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn{}", self.0)
    }
}

/// A reference to a local: its identity plus its source name for printing.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Local {
    pub id: VarId,
    pub name: Name,
}
