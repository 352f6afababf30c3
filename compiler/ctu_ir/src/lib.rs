//! Shared primitives for the tree IR.
//!
//! - [`Span`] source locations attached to every node and diagnostic
//! - [`Name`] interned identifiers, owned by a [`StringInterner`]
//!
//! Everything here is `Copy` and compares in O(1). Declaration names,
//! namespace segments and symbol-table keys are all `Name`s, so lookups never
//! hash string contents twice.

/// Compile-time assertion that a type has a specific size.
///
/// Used to keep frequently-allocated handle types from growing.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod interner;
mod name;
mod span;

pub use interner::{InternError, SharedInterner, StringInterner, StringLookup};
pub use name::Name;
pub use span::Span;
