//! The tree arena and the constructors for types, expressions and statements.
//!
//! Constructors check the kinds of their arguments and panic on a mismatch:
//! handing `load` a non-addressable operand is a front end bug, not a user
//! error. User errors become [`NodeKind::Error`] sentinels built with
//! [`Tree::error`] or [`TreeContext::raise`](crate::TreeContext::raise).
//! Error nodes are accepted wherever a type or operand is expected.

use ctu_diagnostic::ErrorCode;
use ctu_ir::{Name, SharedInterner, Span};

use crate::node::{DeclInfo, DeclState, Node, NodeKind, TreeVec};
use crate::ops::{Arity, BinaryOp, CastOp, CompareOp, Digit, JumpKind, Sign, UnaryOp};
use crate::TreeId;

/// Arena holding every node of one compilation.
///
/// Nodes live as long as the tree. Handles are plain indices, so module
/// parents, cyclic type graphs and cross-module references need no
/// reference counting.
#[derive(Debug)]
pub struct Tree {
    nodes: Vec<Node>,
    interner: SharedInterner,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    pub fn new() -> Self {
        Self::with_interner(SharedInterner::new())
    }

    pub fn with_interner(interner: SharedInterner) -> Self {
        Tree {
            nodes: Vec::with_capacity(1024),
            interner,
        }
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    #[inline]
    pub fn intern(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    /// Number of nodes allocated so far.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: TreeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: TreeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub(crate) fn alloc(&mut self, node: Node) -> TreeId {
        let raw = u32::try_from(self.nodes.len())
            .unwrap_or_else(|_| panic!("tree exceeded {} nodes", u32::MAX));
        self.nodes.push(node);
        TreeId::from_raw(raw)
    }

    /// Intern a declaration name. The empty string marks an anonymous
    /// declaration.
    pub(crate) fn decl_name(&self, name: &str) -> Option<Name> {
        (!name.is_empty()).then(|| self.intern(name))
    }

    pub(crate) fn alloc_decl(
        &mut self,
        kind: NodeKind,
        span: Span,
        ty: Option<TreeId>,
        name: Option<Name>,
        state: DeclState,
    ) -> TreeId {
        self.alloc(Node::decl(kind, span, ty, DeclInfo::new(name, state)))
    }

    fn alloc_type(&mut self, kind: NodeKind, span: Span, name: &str) -> TreeId {
        let name = self.decl_name(name);
        self.alloc_decl(kind, span, None, name, DeclState::Closed)
    }

    /// Build an error sentinel without reporting it.
    ///
    /// The node is its own type, so queries chained off it keep returning
    /// the error instead of panicking.
    pub fn error(&mut self, span: Span, code: ErrorCode, message: impl Into<String>) -> TreeId {
        let id = self.alloc(Node::new(
            NodeKind::Error {
                code,
                message: message.into(),
            },
            span,
            None,
        ));
        self.node_mut(id).ty = Some(id);
        id
    }

    pub(crate) fn expect_type(&self, id: TreeId, what: &str) {
        assert!(
            self.get_kind(id).is_type(),
            "{what} must be a type, found {}",
            self.display(id)
        );
    }

    // --- types ---

    pub fn type_empty(&mut self, span: Span, name: &str) -> TreeId {
        self.alloc_type(NodeKind::TypeEmpty, span, name)
    }

    pub fn type_unit(&mut self, span: Span, name: &str) -> TreeId {
        self.alloc_type(NodeKind::TypeUnit, span, name)
    }

    pub fn type_bool(&mut self, span: Span, name: &str) -> TreeId {
        self.alloc_type(NodeKind::TypeBool, span, name)
    }

    pub fn type_opaque(&mut self, span: Span, name: &str) -> TreeId {
        self.alloc_type(NodeKind::TypeOpaque, span, name)
    }

    pub fn type_digit(&mut self, span: Span, name: &str, digit: Digit, sign: Sign) -> TreeId {
        self.alloc_type(NodeKind::TypeDigit { digit, sign }, span, name)
    }

    /// Function signature. Every entry of `params` must be a parameter
    /// declaration.
    pub fn type_closure(
        &mut self,
        span: Span,
        name: &str,
        result: TreeId,
        params: &[TreeId],
        arity: Arity,
    ) -> TreeId {
        self.expect_type(result, "closure result");
        for &param in params {
            assert!(
                matches!(self.get_kind(param), NodeKind::DeclParam),
                "closure parameter must be a param, found {}",
                self.display(param)
            );
        }
        let kind = NodeKind::TypeClosure {
            result,
            params: TreeVec::from_slice(params),
            arity,
        };
        self.alloc_type(kind, span, name)
    }

    /// Pointer to `length` elements of `pointee`; `None` is unbounded.
    pub fn type_pointer(
        &mut self,
        span: Span,
        name: &str,
        pointee: TreeId,
        length: Option<usize>,
    ) -> TreeId {
        self.expect_type(pointee, "pointee");
        self.alloc_type(NodeKind::TypePointer { pointee, length }, span, name)
    }

    pub fn type_array(
        &mut self,
        span: Span,
        name: &str,
        element: TreeId,
        length: Option<usize>,
    ) -> TreeId {
        self.expect_type(element, "array element");
        self.alloc_type(NodeKind::TypeArray { element, length }, span, name)
    }

    pub fn type_reference(&mut self, span: Span, name: &str, pointee: TreeId) -> TreeId {
        self.expect_type(pointee, "reference target");
        self.alloc_type(NodeKind::TypeReference { pointee }, span, name)
    }

    /// Named alias of another type.
    pub fn type_alias(&mut self, span: Span, name: &str, target: TreeId) -> TreeId {
        self.expect_type(target, "alias target");
        self.alloc_type(NodeKind::TypeAlias { target }, span, name)
    }

    // --- literal expressions ---

    pub fn expr_empty(&mut self, span: Span, ty: TreeId) -> TreeId {
        self.alloc(Node::new(NodeKind::ExprEmpty, span, Some(ty)))
    }

    pub fn expr_unit(&mut self, span: Span, ty: TreeId) -> TreeId {
        self.alloc(Node::new(NodeKind::ExprUnit, span, Some(ty)))
    }

    pub fn expr_bool(&mut self, span: Span, ty: TreeId, value: bool) -> TreeId {
        assert!(
            matches!(self.get_kind(ty), NodeKind::TypeBool | NodeKind::Error { .. }),
            "bool literal must have a bool type, found {}",
            self.display(ty)
        );
        self.alloc(Node::new(NodeKind::ExprBool(value), span, Some(ty)))
    }

    pub fn expr_digit(&mut self, span: Span, ty: TreeId, value: i128) -> TreeId {
        assert!(
            matches!(
                self.get_kind(ty),
                NodeKind::TypeDigit { .. } | NodeKind::Error { .. }
            ),
            "digit literal must have a digit type, found {}",
            self.display(ty)
        );
        self.alloc(Node::new(NodeKind::ExprDigit(value), span, Some(ty)))
    }

    pub fn expr_string(&mut self, span: Span, ty: TreeId, value: impl Into<String>) -> TreeId {
        self.alloc(Node::new(
            NodeKind::ExprString(value.into()),
            span,
            Some(ty),
        ))
    }

    // --- expressions ---

    pub fn expr_cast(&mut self, span: Span, ty: TreeId, expr: TreeId, cast: CastOp) -> TreeId {
        self.expect_type(ty, "cast target");
        self.alloc(Node::new(NodeKind::ExprCast { expr, cast }, span, Some(ty)))
    }

    /// Load through a pointer, array or reference.
    pub fn expr_load(&mut self, span: Span, expr: TreeId) -> TreeId {
        let ty = self.get_type(expr);
        assert!(
            matches!(
                self.get_kind(ty),
                NodeKind::TypePointer { .. }
                    | NodeKind::TypeArray { .. }
                    | NodeKind::TypeReference { .. }
                    | NodeKind::Error { .. }
            ),
            "load requires a pointer, array or reference, found {}",
            self.display(ty)
        );
        let loaded = self.ty_load_type(ty);
        self.alloc(Node::new(NodeKind::ExprLoad { expr }, span, Some(loaded)))
    }

    /// Take the address of an expression. The result type is a pointer to
    /// one element of the operand's (dereferenced) type.
    pub fn expr_address(&mut self, span: Span, expr: TreeId) -> TreeId {
        let ty = self.get_type(expr);
        let inner = match self.get_kind(ty) {
            NodeKind::TypeReference { pointee } | NodeKind::TypePointer { pointee, .. } => {
                *pointee
            }
            _ => ty,
        };
        let name = self.name_of(ty);
        let pointer = self.alloc_decl(
            NodeKind::TypePointer {
                pointee: inner,
                length: Some(1),
            },
            span,
            None,
            name,
            DeclState::Closed,
        );
        self.alloc(Node::new(
            NodeKind::ExprAddressOf { expr },
            span,
            Some(pointer),
        ))
    }

    pub fn expr_unary(&mut self, span: Span, op: UnaryOp, operand: TreeId) -> TreeId {
        let ty = self.get_type(operand);
        self.alloc(Node::new(
            NodeKind::ExprUnary { op, operand },
            span,
            Some(ty),
        ))
    }

    pub fn expr_binary(
        &mut self,
        span: Span,
        ty: TreeId,
        op: BinaryOp,
        lhs: TreeId,
        rhs: TreeId,
    ) -> TreeId {
        self.alloc(Node::new(
            NodeKind::ExprBinary { op, lhs, rhs },
            span,
            Some(ty),
        ))
    }

    pub fn expr_compare(
        &mut self,
        span: Span,
        ty: TreeId,
        op: CompareOp,
        lhs: TreeId,
        rhs: TreeId,
    ) -> TreeId {
        self.alloc(Node::new(
            NodeKind::ExprCompare { op, lhs, rhs },
            span,
            Some(ty),
        ))
    }

    /// Access `field` of the aggregate `object` points at.
    pub fn expr_field(&mut self, span: Span, ty: TreeId, object: TreeId, field: TreeId) -> TreeId {
        let outer = self.get_type(object);
        if !self.is_error(outer) {
            assert!(
                self.ty_is_address(outer),
                "object must be an address, found {}",
                self.display(outer)
            );
            let inner = self.ty_load_type(outer);
            assert!(
                matches!(
                    self.get_kind(inner),
                    NodeKind::TypeStruct { .. }
                        | NodeKind::TypeUnion { .. }
                        | NodeKind::Error { .. }
                ),
                "object must be an aggregate, found {}",
                self.display(inner)
            );
        }
        self.alloc(Node::new(
            NodeKind::ExprField { object, field },
            span,
            Some(ty),
        ))
    }

    pub fn expr_offset(&mut self, span: Span, ty: TreeId, object: TreeId, offset: TreeId) -> TreeId {
        self.alloc(Node::new(
            NodeKind::ExprOffset { object, offset },
            span,
            Some(ty),
        ))
    }

    /// Call `callee`. The result type is the return type of the callee's
    /// signature; its signature must already be resolved.
    pub fn expr_call(&mut self, span: Span, callee: TreeId, args: &[TreeId]) -> TreeId {
        let callee_ty = self.get_type(callee);
        let result = self.fn_get_return(callee_ty);
        self.alloc(Node::new(
            NodeKind::ExprCall {
                callee,
                args: TreeVec::from_slice(args),
            },
            span,
            Some(result),
        ))
    }

    // --- statements ---

    pub fn stmt_block(&mut self, span: Span, stmts: &[TreeId]) -> TreeId {
        self.alloc(Node::new(
            NodeKind::StmtBlock {
                stmts: TreeVec::from_slice(stmts),
            },
            span,
            None,
        ))
    }

    pub fn stmt_return(&mut self, span: Span, value: TreeId) -> TreeId {
        self.alloc(Node::new(NodeKind::StmtReturn { value }, span, None))
    }

    fn stmt_assign_inner(&mut self, span: Span, dst: TreeId, src: TreeId, init: bool) -> TreeId {
        let dst_ty = self.get_type(dst);
        assert!(
            matches!(
                self.get_kind(dst_ty),
                NodeKind::TypePointer { .. }
                    | NodeKind::TypeReference { .. }
                    | NodeKind::TypeOpaque
                    | NodeKind::Error { .. }
            ),
            "expected reference or pointer, found {}",
            self.display(dst_ty)
        );
        self.alloc(Node::new(
            NodeKind::StmtAssign { dst, src, init },
            span,
            None,
        ))
    }

    /// Store `src` through the address `dst`.
    pub fn stmt_assign(&mut self, span: Span, dst: TreeId, src: TreeId) -> TreeId {
        self.stmt_assign_inner(span, dst, src, false)
    }

    /// Initialise the storage behind `dst` with `src`.
    pub fn stmt_init(&mut self, span: Span, dst: TreeId, src: TreeId) -> TreeId {
        self.stmt_assign_inner(span, dst, src, true)
    }

    pub fn stmt_loop(
        &mut self,
        span: Span,
        cond: TreeId,
        body: TreeId,
        other: Option<TreeId>,
    ) -> TreeId {
        self.alloc(Node::new(
            NodeKind::StmtLoop { cond, body, other },
            span,
            None,
        ))
    }

    pub fn stmt_branch(
        &mut self,
        span: Span,
        cond: TreeId,
        then: TreeId,
        other: Option<TreeId>,
    ) -> TreeId {
        self.alloc(Node::new(
            NodeKind::StmtBranch { cond, then, other },
            span,
            None,
        ))
    }

    /// Break out of or continue `label`, which must be a loop.
    pub fn stmt_jump(&mut self, span: Span, label: TreeId, kind: JumpKind) -> TreeId {
        assert!(
            matches!(self.get_kind(label), NodeKind::StmtLoop { .. }),
            "label must be a loop, found {}",
            self.display(label)
        );
        self.alloc(Node::new(NodeKind::StmtJump { label, kind }, span, None))
    }
}

#[cfg(test)]
mod tests;
