//! Tree IR shared by every front end and back end.
//!
//! - [`Tree`]: arena of [`Node`]s with checked constructors and read-only
//!   queries
//! - [`Tag`] and the module symbol tables built on `DeclModule` nodes
//! - [`TreeContext`]: the tree plus the [`Cookie`] that drives lazy,
//!   cycle-safe declaration resolution
//! - [`Prelude`]: builtin types of one compilation
//!
//! # Lifecycle
//!
//! Front ends forward-declare with `open_*` and a [`ResolveInfo`], resolve
//! on demand through [`TreeContext::resolve`], and finish each declaration
//! with the matching `close_*`. Once the whole program is resolved no node
//! is open and back ends only use the queries.

mod decl;
mod display;
mod equality;
mod id;
pub mod module;
mod node;
pub mod ops;
mod prelude;
mod query;
pub mod resolve;
pub mod search;
mod tree;

pub use id::TreeId;
pub use module::{ModuleData, SymbolMap, Tag};
pub use node::{Node, NodeKind, TreeVec};
pub use ops::{
    Arity, Attribs, BinaryOp, CastOp, CompareOp, Digit, JumpKind, Link, Quals, Sign, Storage,
    UnaryOp, Visibility,
};
pub use prelude::Prelude;
pub use query::ANONYMOUS;
pub use resolve::{Cookie, ResolveFn, ResolveInfo, TreeContext};
pub use search::DeclSearch;
pub use tree::Tree;

