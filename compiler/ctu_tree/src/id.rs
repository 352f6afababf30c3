//! Node handles.

use std::fmt;

/// Handle to a node in a [`Tree`](crate::Tree).
///
/// Handles are only meaningful for the tree that created them. Identity of a
/// handle is identity of the node: two structurally equal types built twice
/// are different `TreeId`s.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct TreeId(u32);

impl TreeId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        TreeId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TreeId({})", self.0)
    }
}

#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::TreeId;
    ctu_ir::static_assert_size!(TreeId, 4);
    ctu_ir::static_assert_size!(Option<TreeId>, 8);
}
