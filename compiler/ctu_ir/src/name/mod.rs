//! Handles for interned identifiers.

use std::fmt;

/// Declaration name or namespace segment, interned once per compilation.
///
/// Only meaningful together with the [`StringInterner`](crate::StringInterner)
/// that produced it. Anonymous declarations store no `Name` at all rather
/// than [`Name::EMPTY`].
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// The empty string, present in every interner at slot zero.
    pub const EMPTY: Name = Name(0);

    pub(crate) const fn from_slot(slot: u32) -> Self {
        Name(slot)
    }

    pub(crate) const fn slot(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(target_pointer_width = "64")]
mod size_asserts {
    crate::static_assert_size!(super::Name, 4);
    crate::static_assert_size!(Option<super::Name>, 8);
}
