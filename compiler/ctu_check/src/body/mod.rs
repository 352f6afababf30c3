//! Function bodies and initializer expressions.
//!
//! Front ends turn implicit conversions into explicit casts before closing a
//! declaration, so plain type equality is enough for returns and arguments.

use ctu_diagnostic::{Diagnostic, ErrorCode};
use ctu_stack::ensure_sufficient_stack;
use ctu_tree::{Arity, BinaryOp, CastOp, NodeKind, TreeId};

use crate::Checker;

impl Checker<'_> {
    /// Check the body of a function against its signature, then check that
    /// every path returns.
    pub(crate) fn check_func_details(&mut self, function: TreeId) {
        let tree = self.tree;
        let Some(body) = tree.fn_get_body(function) else {
            return;
        };
        let return_type = tree.fn_get_return(function);
        if tree.is_error(return_type) {
            return;
        }

        self.check_stmt(return_type, body);

        if !will_always_return(tree, body) {
            let unit = matches!(
                tree.get_kind(tree.ty_strip_alias(return_type)),
                NodeKind::TypeUnit
            );
            if !unit {
                self.reports.push(
                    Diagnostic::error(ErrorCode::MAY_NOT_RETURN)
                        .with_message(format!(
                            "function `{}` may not return a value",
                            tree.get_name(function)
                        ))
                        .with_label(tree.get_span(function), ""),
                );
            }
        }
    }

    /// Operand checks inside a global's initializer.
    pub(crate) fn check_global_init(&mut self, global: TreeId) {
        if let Some(init) = self.tree.global_get_init(global) {
            self.check_expr(init);
        }
    }

    fn check_stmt(&mut self, return_type: TreeId, stmt: TreeId) {
        let tree = self.tree;
        match tree.get_kind(stmt) {
            NodeKind::StmtBlock { stmts } => {
                for &inner in stmts {
                    ensure_sufficient_stack(|| self.check_stmt(return_type, inner));
                }
            }
            NodeKind::StmtReturn { value } => {
                self.check_expr(*value);
                self.check_return(return_type, stmt, *value);
            }
            NodeKind::StmtAssign { dst, src, .. } => {
                self.check_expr(*dst);
                self.check_expr(*src);
            }
            NodeKind::StmtLoop { cond, body, other } => {
                self.check_expr(*cond);
                ensure_sufficient_stack(|| self.check_stmt(return_type, *body));
                if let Some(other) = other {
                    ensure_sufficient_stack(|| self.check_stmt(return_type, *other));
                }
            }
            NodeKind::StmtBranch { cond, then, other } => {
                self.check_expr(*cond);
                ensure_sufficient_stack(|| self.check_stmt(return_type, *then));
                if let Some(other) = other {
                    ensure_sufficient_stack(|| self.check_stmt(return_type, *other));
                }
            }
            NodeKind::StmtJump { .. } => {}
            // Expression statements
            _ => self.check_expr(stmt),
        }
    }

    fn check_return(&mut self, return_type: TreeId, stmt: TreeId, value: TreeId) {
        let tree = self.tree;
        let Some(real_type) = tree.try_get_type(value) else {
            return;
        };
        if tree.is_error(real_type) || tree.types_equal(return_type, real_type) {
            return;
        }
        self.reports.push(
            Diagnostic::error(ErrorCode::RETURN_TYPE_MISMATCH)
                .with_message(format!(
                    "return type `{}` does not match function return type `{}`",
                    tree.display(real_type),
                    tree.display(return_type)
                ))
                .with_label(tree.get_span(stmt), ""),
        );
    }

    /// Walk an expression and check every call, cast and binary operation
    /// in it. Declarations are leaves.
    fn check_expr(&mut self, expr: TreeId) {
        let tree = self.tree;
        match tree.get_kind(expr) {
            NodeKind::ExprCall { callee, args } => {
                self.check_expr(*callee);
                for &arg in args {
                    ensure_sufficient_stack(|| self.check_expr(arg));
                }
                self.check_deprecated_call(expr, *callee);
                self.check_call_arguments(expr, *callee, args);
            }
            NodeKind::ExprCast { expr: inner, cast } => {
                ensure_sufficient_stack(|| self.check_expr(*inner));
                self.check_cast(expr, *inner, *cast);
            }
            NodeKind::ExprBinary { op, lhs, rhs } => {
                ensure_sufficient_stack(|| self.check_expr(*lhs));
                ensure_sufficient_stack(|| self.check_expr(*rhs));
                self.check_binary(expr, *op, *lhs, *rhs);
            }
            NodeKind::ExprCompare { lhs, rhs, .. }
            | NodeKind::ExprField {
                object: lhs,
                field: rhs,
            }
            | NodeKind::ExprOffset {
                object: lhs,
                offset: rhs,
            } => {
                ensure_sufficient_stack(|| self.check_expr(*lhs));
                ensure_sufficient_stack(|| self.check_expr(*rhs));
            }
            NodeKind::ExprLoad { expr: inner }
            | NodeKind::ExprAddressOf { expr: inner }
            | NodeKind::ExprUnary { operand: inner, .. } => {
                ensure_sufficient_stack(|| self.check_expr(*inner));
            }
            _ => {}
        }
    }

    fn check_deprecated_call(&mut self, call: TreeId, callee: TreeId) {
        let tree = self.tree;
        // Indirect calls have no attributes to check.
        if !matches!(tree.get_kind(callee), NodeKind::DeclFunction { .. }) {
            return;
        }
        let Some(message) = &tree.get_attrib(callee).deprecated else {
            return;
        };
        self.reports.push(
            Diagnostic::from_code(ErrorCode::DEPRECATED)
                .with_message(format!(
                    "call to deprecated function `{}`",
                    tree.get_name(callee)
                ))
                .with_label(tree.get_span(call), "")
                .with_note(format!("deprecated: {message}")),
        );
    }

    /// Name used for the callee in call diagnostics: the function's name,
    /// or the type of an indirect callee.
    fn callee_name(&self, callee: TreeId) -> String {
        let tree = self.tree;
        if matches!(tree.get_kind(callee), NodeKind::DeclFunction { .. }) {
            tree.get_name(callee).to_owned()
        } else {
            tree.display(tree.get_type(callee))
        }
    }

    fn check_call_arguments(&mut self, call: TreeId, callee: TreeId, args: &[TreeId]) {
        let tree = self.tree;
        let signature = match tree.get_kind(callee) {
            NodeKind::DeclFunction { .. } => callee,
            _ => match tree.try_get_type(callee) {
                Some(ty) => ty,
                None => return,
            },
        };
        if tree.is_error(signature)
            || !matches!(
                tree.get_kind(signature),
                NodeKind::DeclFunction { .. }
                    | NodeKind::TypeClosure { .. }
                    | NodeKind::TypeReference { .. }
            )
        {
            return;
        }
        let params = tree.fn_get_params(signature);
        let arity = tree.fn_get_arity(signature);
        let name = self.callee_name(callee);
        let span = tree.get_span(call);

        match arity {
            Arity::Fixed if args.len() != params.len() => {
                self.reports.push(
                    Diagnostic::error(ErrorCode::INCORRECT_PARAM_COUNT)
                        .with_message(format!(
                            "incorrect number of parameters to function `{name}`"
                        ))
                        .with_label(span, "")
                        .with_note(format!("expected {}, got {}", params.len(), args.len())),
                );
            }
            Arity::Variadic if args.len() < params.len() => {
                self.reports.push(
                    Diagnostic::error(ErrorCode::INCORRECT_PARAM_COUNT)
                        .with_message(format!(
                            "incorrect number of parameters to variadic function `{name}`"
                        ))
                        .with_label(span, "")
                        .with_note(format!(
                            "expected at least {} parameters, only got {}",
                            params.len(),
                            args.len()
                        )),
                );
            }
            _ => {}
        }

        for (i, (&arg, &param)) in args.iter().zip(params).enumerate() {
            let (Some(arg_type), Some(param_type)) = (tree.try_get_type(arg), tree.try_get_type(param))
            else {
                continue;
            };
            if tree.is_error(arg_type) || tree.types_equal(arg_type, param_type) {
                continue;
            }
            self.reports.push(
                Diagnostic::error(ErrorCode::INCORRECT_PARAM_TYPE)
                    .with_message(format!(
                        "incorrect type for parameter {} of function `{name}`",
                        i + 1
                    ))
                    .with_label(tree.get_span(arg), "")
                    .with_note(format!(
                        "expected `{}`, got `{}`",
                        tree.display(param_type),
                        tree.display(arg_type)
                    )),
            );
        }
    }

    fn check_cast(&mut self, cast_expr: TreeId, inner: TreeId, cast: CastOp) {
        let tree = self.tree;
        let Some(src) = tree.try_get_type(inner) else {
            return;
        };
        let dst = tree.get_type(cast_expr);
        if tree.is_error(src) || tree.is_error(dst) {
            return;
        }
        let src_kind = tree.get_kind(tree.ty_strip_alias(src));
        let dst_kind = tree.get_kind(tree.ty_strip_alias(dst));

        let reason = if is_sizeless(src_kind) || is_sizeless(dst_kind) {
            Some("unit and empty types cannot be cast".to_owned())
        } else {
            match cast {
                CastOp::Bit if !(is_bitcastable(src_kind) && is_bitcastable(dst_kind)) => Some(
                    "bitcasts require digit, pointer, opaque, array or reference types".to_owned(),
                ),
                CastOp::SignExtend | CastOp::ZeroExtend
                    if !(matches!(src_kind, NodeKind::TypeDigit { .. })
                        && matches!(dst_kind, NodeKind::TypeDigit { .. })) =>
                {
                    Some(format!("{cast} requires digit types"))
                }
                _ => None,
            }
        };

        if let Some(reason) = reason {
            self.reports.push(
                Diagnostic::error(ErrorCode::INVALID_CAST)
                    .with_message(format!(
                        "invalid {cast} from `{}` to `{}`",
                        tree.display(src),
                        tree.display(dst)
                    ))
                    .with_label(tree.get_span(cast_expr), "")
                    .with_note(reason),
            );
        }
    }

    fn check_binary(&mut self, expr: TreeId, op: BinaryOp, lhs: TreeId, rhs: TreeId) {
        let tree = self.tree;
        let (Some(lhs_ty), Some(rhs_ty)) = (tree.try_get_type(lhs), tree.try_get_type(rhs)) else {
            return;
        };
        if tree.is_error(lhs_ty) || tree.is_error(rhs_ty) {
            return;
        }
        let lhs_kind = tree.get_kind(tree.ty_strip_alias(lhs_ty));
        let rhs_kind = tree.get_kind(tree.ty_strip_alias(rhs_ty));
        let is_digit = |kind: &NodeKind| matches!(kind, NodeKind::TypeDigit { .. });
        let is_pointer = |kind: &NodeKind| matches!(kind, NodeKind::TypePointer { .. });

        // Pointer arithmetic
        if matches!(op, BinaryOp::Add | BinaryOp::Sub)
            && ((is_pointer(lhs_kind) && is_digit(rhs_kind))
                || (is_digit(lhs_kind) && is_pointer(rhs_kind)))
        {
            return;
        }

        let message = if !is_digit(lhs_kind) && !is_digit(rhs_kind) {
            format!(
                "binary operation `{}` requires a digit operand, got `{}` and `{}`",
                op.symbol(),
                tree.display(lhs_ty),
                tree.display(rhs_ty)
            )
        } else if !tree.types_equal(lhs_ty, rhs_ty) {
            format!(
                "mismatched operand types `{}` and `{}` in binary operation `{}`",
                tree.display(lhs_ty),
                tree.display(rhs_ty),
                op.symbol()
            )
        } else {
            return;
        };
        self.reports.push(
            Diagnostic::error(ErrorCode::INVALID_BINARY_OPERATION)
                .with_message(message)
                .with_label(tree.get_span(expr), ""),
        );
    }
}

fn is_sizeless(kind: &NodeKind) -> bool {
    matches!(kind, NodeKind::TypeUnit | NodeKind::TypeEmpty)
}

fn is_bitcastable(kind: &NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::TypeDigit { .. }
            | NodeKind::TypePointer { .. }
            | NodeKind::TypeOpaque
            | NodeKind::TypeArray { .. }
            | NodeKind::TypeReference { .. }
    )
}

/// Structural approximation of "every path returns".
///
/// A statement always returns if it is a return, a branch whose arms both
/// exist and always return, a loop whose body always returns, or a block
/// containing any statement that always returns.
pub(crate) fn will_always_return(tree: &ctu_tree::Tree, stmt: TreeId) -> bool {
    match tree.get_kind(stmt) {
        NodeKind::StmtReturn { .. } => true,
        NodeKind::StmtBranch { then, other, .. } => {
            let other_returns = other.is_some_and(|other| {
                ensure_sufficient_stack(|| will_always_return(tree, other))
            });
            other_returns && ensure_sufficient_stack(|| will_always_return(tree, *then))
        }
        NodeKind::StmtLoop { body, .. } => {
            ensure_sufficient_stack(|| will_always_return(tree, *body))
        }
        NodeKind::StmtBlock { stmts } => stmts
            .iter()
            .any(|&inner| ensure_sufficient_stack(|| will_always_return(tree, inner))),
        _ => false,
    }
}
