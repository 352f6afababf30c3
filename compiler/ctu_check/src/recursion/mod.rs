//! Cycle detection over global initializers and type graphs.
//!
//! All three walks share one shape: a depth-first search with an explicit
//! stack of the declarations being walked and a set of declarations already
//! proven finite. Meeting a declaration that is still on the stack is a
//! cycle; the report lists every stack entry from its first occurrence.

use ctu_diagnostic::{Diagnostic, ErrorCode};
use ctu_stack::ensure_sufficient_stack;
use ctu_tree::{NodeKind, Tree, TreeId};
use tracing::trace;

use crate::Checker;

/// What a cycle in one of the walks means.
#[derive(Copy, Clone, Debug)]
enum CycleKind {
    /// A global's initializer depends on itself.
    Eval,
    /// An aggregate contains itself by value.
    Size,
    /// A type is built out of itself.
    Impossible,
}

impl CycleKind {
    fn code(self) -> ErrorCode {
        match self {
            CycleKind::Eval => ErrorCode::RECURSIVE_EVAL,
            CycleKind::Size => ErrorCode::INFINITE_SIZED_TYPE,
            CycleKind::Impossible => ErrorCode::INVALID_TYPE,
        }
    }

    fn message(self, name: &str) -> String {
        match self {
            CycleKind::Eval => format!("evaluation of `{name}` may be infinite"),
            CycleKind::Size => format!("size of type `{name}` may be infinite"),
            CycleKind::Impossible => format!("type `{name}` contains an impossible type"),
        }
    }
}

/// Name used in cycle reports. Globals use their declared name, types are
/// rendered so anonymous pointers and arrays still read sensibly.
fn cycle_name(tree: &Tree, decl: TreeId) -> String {
    if matches!(tree.get_kind(decl), NodeKind::DeclGlobal { .. }) {
        tree.get_name(decl).to_owned()
    } else {
        tree.display(decl)
    }
}

/// Build the cycle report for `decl`, which is already on `stack`.
fn cycle_report(tree: &Tree, kind: CycleKind, decl: TreeId, stack: &[TreeId]) -> Diagnostic {
    let start = stack.iter().position(|&entry| entry == decl).unwrap_or(0);
    Diagnostic::error(kind.code())
        .with_message(kind.message(&cycle_name(tree, decl)))
        .with_label(tree.get_span(decl), "")
        .with_chain(stack[start..].iter().map(|&entry| {
            (
                tree.get_span(entry),
                format!("call to `{}`", cycle_name(tree, entry)),
            )
        }))
}

impl Checker<'_> {
    // --- globals ---

    /// Report globals whose initializer can only be evaluated by evaluating
    /// the global itself.
    pub(crate) fn check_global_recursion(&mut self, global: TreeId) {
        if self.checked_exprs.contains(&global) {
            return;
        }
        let tree = self.tree;

        if self.expr_stack.contains(&global) {
            trace!(global = %tree.get_name(global), "recursive global");
            let diag = cycle_report(tree, CycleKind::Eval, global, &self.expr_stack);
            self.reports.push(diag);
        } else if let Some(init) = tree.global_get_init(global) {
            self.expr_stack.push(global);
            self.check_expr_recursion(init);
            self.expr_stack.pop();
        }

        self.checked_exprs.insert(global);
    }

    /// Follow every operand that is evaluated together with `expr`.
    ///
    /// Taking the address of a global does not evaluate it, so address-of
    /// ends the walk.
    fn check_expr_recursion(&mut self, expr: TreeId) {
        let tree = self.tree;
        match tree.get_kind(expr) {
            NodeKind::ExprLoad { expr: inner }
            | NodeKind::ExprUnary { operand: inner, .. }
            | NodeKind::ExprCast { expr: inner, .. } => {
                ensure_sufficient_stack(|| self.check_expr_recursion(*inner));
            }
            NodeKind::ExprBinary { lhs, rhs, .. }
            | NodeKind::ExprCompare { lhs, rhs, .. }
            | NodeKind::ExprField {
                object: lhs,
                field: rhs,
            }
            | NodeKind::ExprOffset {
                object: lhs,
                offset: rhs,
            } => {
                ensure_sufficient_stack(|| self.check_expr_recursion(*lhs));
                ensure_sufficient_stack(|| self.check_expr_recursion(*rhs));
            }
            NodeKind::ExprCall { callee, args } => {
                ensure_sufficient_stack(|| self.check_expr_recursion(*callee));
                for &arg in args {
                    ensure_sufficient_stack(|| self.check_expr_recursion(arg));
                }
            }
            NodeKind::DeclGlobal { .. } => {
                ensure_sufficient_stack(|| self.check_global_recursion(expr));
            }
            _ => {}
        }
    }

    // --- types ---

    /// Aggregates are checked for infinite size, every other type for
    /// containing itself.
    pub(crate) fn check_any_type_recursion(&mut self, ty: TreeId) {
        match self.tree.get_kind(ty) {
            NodeKind::TypeStruct { .. } | NodeKind::TypeUnion { .. } => {
                self.check_aggregate_recursion(ty);
            }
            _ => self.check_type_recursion(ty),
        }
    }

    fn check_aggregate_recursion(&mut self, aggregate: TreeId) {
        if self.checked_sizes.contains(&aggregate) {
            return;
        }
        let tree = self.tree;

        if self.type_stack.contains(&aggregate) {
            let diag = cycle_report(tree, CycleKind::Size, aggregate, &self.type_stack);
            self.reports.push(diag);
        } else {
            self.type_stack.push(aggregate);
            if let NodeKind::TypeStruct { fields } | NodeKind::TypeUnion { fields } =
                tree.get_kind(aggregate)
            {
                for &field in fields {
                    if let Some(ty) = tree.try_get_type(field) {
                        ensure_sufficient_stack(|| self.check_field_size(ty));
                    }
                }
            }
            self.type_stack.pop();
        }

        self.checked_sizes.insert(aggregate);
    }

    /// Walk the part of a field's type that is stored inline.
    fn check_field_size(&mut self, ty: TreeId) {
        let tree = self.tree;
        let inner = match tree.get_kind(ty) {
            NodeKind::TypeStruct { .. } | NodeKind::TypeUnion { .. } => {
                self.check_aggregate_recursion(ty);
                return;
            }
            // Only bounded arrays hold their elements inline.
            NodeKind::TypeArray {
                element,
                length: Some(_),
            } => *element,
            NodeKind::TypeAlias { target } => *target,
            _ => return,
        };

        // An alias or array that leads back to itself never reaches an
        // aggregate. Report it once, as the type walk would.
        if self.type_stack.contains(&ty) {
            if self.checked_types.insert(ty) {
                let diag = cycle_report(tree, CycleKind::Impossible, ty, &self.type_stack);
                self.reports.push(diag);
            }
            return;
        }
        self.type_stack.push(ty);
        ensure_sufficient_stack(|| self.check_field_size(inner));
        self.type_stack.pop();
    }

    fn check_type_recursion(&mut self, ty: TreeId) {
        if self.checked_types.contains(&ty) {
            return;
        }
        let tree = self.tree;

        if self.type_stack.contains(&ty) {
            let diag = cycle_report(tree, CycleKind::Impossible, ty, &self.type_stack);
            self.reports.push(diag);
        } else {
            self.type_stack.push(ty);
            self.check_inner_type_recursion(ty);
            self.type_stack.pop();
        }

        self.checked_types.insert(ty);
    }

    /// Structs, unions and enums are named boundaries; a pointer to a struct
    /// that points back to the pointer is fine.
    fn check_inner_type_recursion(&mut self, ty: TreeId) {
        let tree = self.tree;
        match tree.get_kind(ty) {
            NodeKind::TypePointer { pointee: inner, .. }
            | NodeKind::TypeReference { pointee: inner }
            | NodeKind::TypeArray { element: inner, .. }
            | NodeKind::TypeAlias { target: inner } => {
                ensure_sufficient_stack(|| self.check_type_recursion(*inner));
            }
            NodeKind::TypeClosure { result, params, .. } => {
                ensure_sufficient_stack(|| self.check_type_recursion(*result));
                for &param in params {
                    if let Some(param_ty) = tree.try_get_type(param) {
                        ensure_sufficient_stack(|| self.check_type_recursion(param_ty));
                    }
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests;
