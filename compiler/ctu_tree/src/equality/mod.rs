//! Type equality and implicit conversions.

use ctu_diagnostic::ErrorCode;

use crate::node::NodeKind;
use crate::ops::CastOp;
use crate::{Tree, TreeId};

impl Tree {
    /// Structural type equality.
    ///
    /// Identical handles are equal. Otherwise aliases are looked through and
    /// the kinds compared: empty, unit and bool by kind, digits by width and
    /// sign, pointers and references by pointee. Any other pair of distinct
    /// handles is unequal.
    pub fn types_equal(&self, lhs: TreeId, rhs: TreeId) -> bool {
        let mut assumed = Vec::new();
        self.types_equal_inner(lhs, rhs, &mut assumed)
    }

    fn types_equal_inner(&self, lhs: TreeId, rhs: TreeId, assumed: &mut Vec<(TreeId, TreeId)>) -> bool {
        if lhs == rhs {
            return true;
        }
        let lhs = self.ty_strip_alias(lhs);
        let rhs = self.ty_strip_alias(rhs);
        if lhs == rhs {
            return true;
        }
        // Self-referential pointer types compare equal once the same pair
        // comes around again.
        if assumed.contains(&(lhs, rhs)) {
            return true;
        }

        match (self.get_kind(lhs), self.get_kind(rhs)) {
            (NodeKind::TypeEmpty, NodeKind::TypeEmpty)
            | (NodeKind::TypeUnit, NodeKind::TypeUnit)
            | (NodeKind::TypeBool, NodeKind::TypeBool) => true,
            (
                NodeKind::TypeDigit { digit: ld, sign: ls },
                NodeKind::TypeDigit { digit: rd, sign: rs },
            ) => ld == rd && ls == rs,
            (
                NodeKind::TypePointer { pointee: lp, .. },
                NodeKind::TypePointer { pointee: rp, .. },
            )
            | (NodeKind::TypeReference { pointee: lp }, NodeKind::TypeReference { pointee: rp }) => {
                let (lp, rp) = (*lp, *rp);
                assumed.push((lhs, rhs));
                let equal =
                    ctu_stack::ensure_sufficient_stack(|| self.types_equal_inner(lp, rp, assumed));
                assumed.pop();
                equal
            }
            _ => false,
        }
    }

    /// Types that can be compared with `==` and friends: equal types, or two
    /// bools, or two digits of any width.
    pub fn types_comparable(&self, lhs: TreeId, rhs: TreeId) -> bool {
        if self.types_equal(lhs, rhs) {
            return true;
        }
        matches!(
            (
                self.get_kind(self.ty_strip_alias(lhs)),
                self.get_kind(self.ty_strip_alias(rhs))
            ),
            (NodeKind::TypeBool, NodeKind::TypeBool)
                | (NodeKind::TypeDigit { .. }, NodeKind::TypeDigit { .. })
        )
    }

    /// Implicitly convert `expr` to `dst`.
    ///
    /// Returns `expr` itself when no conversion is needed, a cast node when
    /// one is, and an `E4004` error node (unreported) when the conversion is
    /// not allowed.
    pub fn type_cast(&mut self, dst: TreeId, expr: TreeId) -> TreeId {
        let src = self.get_type(expr);
        if self.is_error(src) || self.is_error(dst) {
            return if self.is_error(src) { src } else { dst };
        }
        if self.types_equal(dst, src) {
            return expr;
        }

        let span = self.get_span(expr);
        match (self.get_kind(dst).clone(), self.get_kind(src).clone()) {
            (NodeKind::TypeOpaque, NodeKind::TypePointer { .. } | NodeKind::TypeDigit { .. }) => {
                self.expr_cast(span, dst, expr, CastOp::Bit)
            }
            // Pointers with equal pointees were accepted by `types_equal`.
            (NodeKind::TypePointer { .. }, NodeKind::TypePointer { .. }) => {
                self.cast_error(
                    expr,
                    format!(
                        "cannot cast unrelated pointer types `{}` to `{}`",
                        self.display(src),
                        self.display(dst)
                    ),
                )
            }
            (NodeKind::TypeReference { pointee }, _) => self.type_cast(pointee, expr),
            (NodeKind::TypeDigit { digit: dst_digit, .. }, NodeKind::TypeDigit { digit: src_digit, .. }) => {
                if dst_digit < src_digit {
                    return self.cast_error(
                        expr,
                        format!(
                            "cannot cast `{}` to `{}`, may truncate",
                            self.display(src),
                            self.display(dst)
                        ),
                    );
                }
                expr
            }
            _ => self.cast_error(
                expr,
                format!(
                    "cannot cast `{}` to `{}`",
                    self.display(src),
                    self.display(dst)
                ),
            ),
        }
    }

    fn cast_error(&mut self, expr: TreeId, message: String) -> TreeId {
        let span = self.get_span(expr);
        self.error(span, ErrorCode::INVALID_CAST, message)
    }
}
