//! Debug rendering of nodes for diagnostic messages and contract panics.

use std::fmt::Write;

use crate::node::NodeKind;
use crate::ops::{Arity, Sign};
use crate::{Tree, TreeId};

/// Anonymous types nested deeper than this render as `...`.
const MAX_DEPTH: usize = 8;

impl Tree {
    /// Human readable rendering of a node.
    ///
    /// Named declarations render as their name, errors as `<error: message>`,
    /// anonymous types structurally (`*T`, `[T; 4]`, `&T`, `fn(A, B) -> R`).
    /// Everything else renders as its kind.
    pub fn display(&self, id: TreeId) -> String {
        let mut out = String::new();
        self.display_into(id, &mut out, 0);
        out
    }

    fn display_into(&self, id: TreeId, out: &mut String, depth: usize) {
        if depth > MAX_DEPTH {
            out.push_str("...");
            return;
        }
        let kind = self.get_kind(id);
        if let NodeKind::Error { message, .. } = kind {
            let _ = write!(out, "<error: {message}>");
            return;
        }
        if let Some(name) = self.name_of(id) {
            out.push_str(self.interner().lookup(name));
            return;
        }
        match kind {
            NodeKind::TypeDigit { digit, sign } => {
                if *sign == Sign::Unsigned {
                    out.push_str("unsigned ");
                }
                out.push_str(digit.name());
            }
            NodeKind::TypePointer { pointee, length } => {
                out.push('*');
                self.display_into(*pointee, out, depth + 1);
                if let Some(length) = length.filter(|&len| len != 1) {
                    let _ = write!(out, " x{length}");
                }
            }
            NodeKind::TypeArray { element, length } => {
                out.push('[');
                self.display_into(*element, out, depth + 1);
                match length {
                    Some(length) => {
                        let _ = write!(out, "; {length}]");
                    }
                    None => out.push(']'),
                }
            }
            NodeKind::TypeReference { pointee } => {
                out.push('&');
                self.display_into(*pointee, out, depth + 1);
            }
            NodeKind::TypeClosure {
                result,
                params,
                arity,
            } => {
                out.push_str("fn(");
                for (i, &param) in params.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    match self.try_get_type(param) {
                        Some(ty) => self.display_into(ty, out, depth + 1),
                        None => out.push('?'),
                    }
                }
                if *arity == Arity::Variadic {
                    out.push_str(if params.is_empty() { "..." } else { ", ..." });
                }
                out.push_str(") -> ");
                self.display_into(*result, out, depth + 1);
            }
            NodeKind::TypeAlias { target } => {
                out.push_str("alias ");
                self.display_into(*target, out, depth + 1);
            }
            _ => out.push_str(kind.name()),
        }
    }
}
