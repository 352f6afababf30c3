//! Node model.
//!
//! Every type, expression, statement and declaration is a [`Node`] in the
//! [`Tree`](crate::Tree) arena. Children are referenced by [`TreeId`], never
//! owned, so a struct can name itself through a pointer field and two modules
//! can reference each other's declarations.

use ctu_diagnostic::ErrorCode;
use ctu_ir::{Name, Span};
use smallvec::SmallVec;

use crate::module::ModuleData;
use crate::ops::{
    Arity, Attribs, BinaryOp, CastOp, CompareOp, Digit, JumpKind, Quals, Sign, Storage, UnaryOp,
};
use crate::resolve::ResolveInfo;
use crate::TreeId;

/// Inline list of children. Most parameter, field and statement lists are
/// short.
pub type TreeVec = SmallVec<[TreeId; 4]>;

/// Kind-specific payload of a node.
#[derive(Clone, Debug)]
pub enum NodeKind {
    /// Terminal sentinel. Its type is itself.
    Error { code: ErrorCode, message: String },

    // Types
    TypeEmpty,
    TypeUnit,
    TypeBool,
    TypeOpaque,
    TypeDigit {
        digit: Digit,
        sign: Sign,
    },
    /// Function signature.
    TypeClosure {
        result: TreeId,
        params: TreeVec,
        arity: Arity,
    },
    TypePointer {
        pointee: TreeId,
        /// Number of elements behind the pointer, `None` when unbounded.
        length: Option<usize>,
    },
    TypeArray {
        element: TreeId,
        length: Option<usize>,
    },
    TypeReference {
        pointee: TreeId,
    },
    TypeAlias {
        target: TreeId,
    },
    TypeStruct {
        fields: TreeVec,
    },
    TypeUnion {
        fields: TreeVec,
    },
    TypeEnum {
        underlying: Option<TreeId>,
        cases: TreeVec,
        default_case: Option<TreeId>,
    },
    /// Forward-declared type whose kind is not known yet.
    Partial,

    // Expressions
    ExprEmpty,
    ExprUnit,
    ExprBool(bool),
    ExprDigit(i128),
    ExprString(String),
    ExprCast {
        expr: TreeId,
        cast: CastOp,
    },
    ExprLoad {
        expr: TreeId,
    },
    ExprAddressOf {
        expr: TreeId,
    },
    ExprUnary {
        op: UnaryOp,
        operand: TreeId,
    },
    ExprBinary {
        op: BinaryOp,
        lhs: TreeId,
        rhs: TreeId,
    },
    ExprCompare {
        op: CompareOp,
        lhs: TreeId,
        rhs: TreeId,
    },
    ExprField {
        object: TreeId,
        field: TreeId,
    },
    ExprOffset {
        object: TreeId,
        offset: TreeId,
    },
    ExprCall {
        callee: TreeId,
        args: TreeVec,
    },

    // Statements
    StmtBlock {
        stmts: TreeVec,
    },
    StmtReturn {
        value: TreeId,
    },
    StmtAssign {
        dst: TreeId,
        src: TreeId,
        /// Initialisation rather than reassignment.
        init: bool,
    },
    StmtLoop {
        cond: TreeId,
        body: TreeId,
        other: Option<TreeId>,
    },
    StmtBranch {
        cond: TreeId,
        then: TreeId,
        other: Option<TreeId>,
    },
    StmtJump {
        label: TreeId,
        kind: JumpKind,
    },

    // Declarations
    DeclGlobal {
        storage: Option<Storage>,
        init: Option<TreeId>,
    },
    DeclFunction {
        params: TreeVec,
        locals: TreeVec,
        body: Option<TreeId>,
    },
    DeclParam,
    DeclField,
    DeclLocal {
        storage: Storage,
    },
    DeclCase {
        value: TreeId,
    },
    DeclModule(ModuleData),
    /// Attribute definition registered by a language front end.
    DeclAttrib,
}

impl NodeKind {
    /// Short name of the kind, used in contract violations and tree dumps.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Error { .. } => "error",
            NodeKind::TypeEmpty => "empty",
            NodeKind::TypeUnit => "unit",
            NodeKind::TypeBool => "bool",
            NodeKind::TypeOpaque => "opaque",
            NodeKind::TypeDigit { .. } => "digit",
            NodeKind::TypeClosure { .. } => "closure",
            NodeKind::TypePointer { .. } => "pointer",
            NodeKind::TypeArray { .. } => "array",
            NodeKind::TypeReference { .. } => "reference",
            NodeKind::TypeAlias { .. } => "alias",
            NodeKind::TypeStruct { .. } => "struct",
            NodeKind::TypeUnion { .. } => "union",
            NodeKind::TypeEnum { .. } => "enum",
            NodeKind::Partial => "partial",
            NodeKind::ExprEmpty => "empty-expr",
            NodeKind::ExprUnit => "unit-expr",
            NodeKind::ExprBool(_) => "bool-literal",
            NodeKind::ExprDigit(_) => "digit-literal",
            NodeKind::ExprString(_) => "string-literal",
            NodeKind::ExprCast { .. } => "cast",
            NodeKind::ExprLoad { .. } => "load",
            NodeKind::ExprAddressOf { .. } => "address-of",
            NodeKind::ExprUnary { .. } => "unary",
            NodeKind::ExprBinary { .. } => "binary",
            NodeKind::ExprCompare { .. } => "compare",
            NodeKind::ExprField { .. } => "field-access",
            NodeKind::ExprOffset { .. } => "offset",
            NodeKind::ExprCall { .. } => "call",
            NodeKind::StmtBlock { .. } => "block",
            NodeKind::StmtReturn { .. } => "return",
            NodeKind::StmtAssign { .. } => "assign",
            NodeKind::StmtLoop { .. } => "loop",
            NodeKind::StmtBranch { .. } => "branch",
            NodeKind::StmtJump { .. } => "jump",
            NodeKind::DeclGlobal { .. } => "global",
            NodeKind::DeclFunction { .. } => "function",
            NodeKind::DeclParam => "param",
            NodeKind::DeclField => "field",
            NodeKind::DeclLocal { .. } => "local",
            NodeKind::DeclCase { .. } => "case",
            NodeKind::DeclModule(_) => "module",
            NodeKind::DeclAttrib => "attrib",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, NodeKind::Error { .. })
    }

    /// Type kinds. Error nodes count as types so they can stand in anywhere.
    pub fn is_type(&self) -> bool {
        matches!(
            self,
            NodeKind::Error { .. }
                | NodeKind::TypeEmpty
                | NodeKind::TypeUnit
                | NodeKind::TypeBool
                | NodeKind::TypeOpaque
                | NodeKind::TypeDigit { .. }
                | NodeKind::TypeClosure { .. }
                | NodeKind::TypePointer { .. }
                | NodeKind::TypeArray { .. }
                | NodeKind::TypeReference { .. }
                | NodeKind::TypeAlias { .. }
                | NodeKind::TypeStruct { .. }
                | NodeKind::TypeUnion { .. }
                | NodeKind::TypeEnum { .. }
                | NodeKind::Partial
        )
    }

    pub fn is_stmt(&self) -> bool {
        matches!(
            self,
            NodeKind::StmtBlock { .. }
                | NodeKind::StmtReturn { .. }
                | NodeKind::StmtAssign { .. }
                | NodeKind::StmtLoop { .. }
                | NodeKind::StmtBranch { .. }
                | NodeKind::StmtJump { .. }
        )
    }
}

/// Lifecycle of a declaration.
///
/// `Resolving` is not stored here: a declaration is resolving exactly while
/// it is on one of the cookie stacks.
#[derive(Clone, Debug)]
pub enum DeclState {
    /// Skeleton with pending frontend work.
    Open(ResolveInfo),
    /// Payload filled in.
    Closed,
}

/// Data carried only by declaration nodes (including named types).
#[derive(Clone, Debug)]
pub struct DeclInfo {
    /// `None` for anonymous declarations.
    pub(crate) name: Option<Name>,
    pub(crate) attribs: Attribs,
    pub(crate) quals: Quals,
    pub(crate) state: DeclState,
}

impl DeclInfo {
    pub(crate) fn new(name: Option<Name>, state: DeclState) -> Self {
        DeclInfo {
            name,
            attribs: Attribs::DEFAULT,
            quals: Quals::empty(),
            state,
        }
    }
}

/// A node in the tree arena.
#[derive(Clone, Debug)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) span: Span,
    /// The node's own type. Unset for statements, modules and bare types.
    pub(crate) ty: Option<TreeId>,
    pub(crate) decl: Option<Box<DeclInfo>>,
}

impl Node {
    pub(crate) fn new(kind: NodeKind, span: Span, ty: Option<TreeId>) -> Self {
        Node {
            kind,
            span,
            ty,
            decl: None,
        }
    }

    pub(crate) fn decl(kind: NodeKind, span: Span, ty: Option<TreeId>, info: DeclInfo) -> Self {
        Node {
            kind,
            span,
            ty,
            decl: Some(Box::new(info)),
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }
}
