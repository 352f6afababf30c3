//! Read-only accessors.
//!
//! Every accessor degrades gracefully on error nodes: the type of an error
//! is the error, its name is its message, its parameter list is empty.
//! Callers can chain queries off the result of a failed lookup without
//! checking for errors first.

use ctu_ir::{Name, Span};

use crate::node::{DeclState, NodeKind};
use crate::ops::{Arity, Attribs, Quals, Storage, Visibility};
use crate::resolve::ResolveInfo;
use crate::{Tree, TreeId};

/// Name reported for anonymous declarations.
pub const ANONYMOUS: &str = "<anonymous>";

impl Tree {
    #[inline]
    pub fn get_kind(&self, id: TreeId) -> &NodeKind {
        &self.node(id).kind
    }

    #[inline]
    pub fn is_error(&self, id: TreeId) -> bool {
        self.get_kind(id).is_error()
    }

    pub fn get_span(&self, id: TreeId) -> Span {
        self.node(id).span
    }

    /// True while the declaration still has pending resolution work.
    pub fn is_open(&self, id: TreeId) -> bool {
        self.resolve_info(id).is_some()
    }

    pub fn resolve_info(&self, id: TreeId) -> Option<&ResolveInfo> {
        match self.node(id).decl.as_deref().map(|info| &info.state) {
            Some(DeclState::Open(info)) => Some(info),
            _ => None,
        }
    }

    /// Type of a node, if it has one. Statements and bare types have none.
    pub fn try_get_type(&self, id: TreeId) -> Option<TreeId> {
        self.node(id).ty
    }

    /// Type of a node. The type of an error is the error itself.
    ///
    /// # Panics
    /// Panics if the node has no type, e.g. a statement.
    pub fn get_type(&self, id: TreeId) -> TreeId {
        self.try_get_type(id).unwrap_or_else(|| {
            panic!("{} does not have a type", self.display(id))
        })
    }

    /// Interned name of a declaration, `None` for anonymous declarations,
    /// errors and nodes that are not declarations.
    pub fn name_of(&self, id: TreeId) -> Option<Name> {
        self.node(id).decl.as_deref().and_then(|info| info.name)
    }

    /// Name of a declaration. An error's name is its message; anonymous
    /// declarations are reported as `<anonymous>`.
    ///
    /// # Panics
    /// Panics on expressions and statements, which have no name.
    pub fn get_name(&self, id: TreeId) -> &str {
        let node = self.node(id);
        if let NodeKind::Error { message, .. } = &node.kind {
            return message;
        }
        match node.decl.as_deref() {
            Some(info) => info.name.map_or(ANONYMOUS, |name| self.interner().lookup(name)),
            None => panic!("{} is not a declaration", node.kind.name()),
        }
    }

    /// Attributes of a declaration. Non-declarations report the defaults.
    pub fn get_attrib(&self, id: TreeId) -> &Attribs {
        match self.node(id).decl.as_deref() {
            Some(info) => &info.attribs,
            None => &Attribs::DEFAULT,
        }
    }

    pub fn has_vis(&self, id: TreeId, visibility: Visibility) -> bool {
        self.get_attrib(id).visibility == visibility
    }

    pub fn get_quals(&self, id: TreeId) -> Quals {
        let quals = self
            .node(id)
            .decl
            .as_deref()
            .map_or(Quals::empty(), |info| info.quals);
        assert!(
            quals.is_consistent(),
            "{} is both const and mutable",
            self.display(id)
        );
        quals
    }

    // --- storage ---

    /// Storage of a global or local, `None` while a global is still open
    /// and for error nodes.
    pub fn get_storage(&self, decl: TreeId) -> Option<&Storage> {
        match self.get_kind(decl) {
            NodeKind::DeclGlobal { storage, .. } => storage.as_ref(),
            NodeKind::DeclLocal { storage } => Some(storage),
            NodeKind::Error { .. } => None,
            _ => panic!("{} does not have storage", self.display(decl)),
        }
    }

    pub fn get_storage_type(&self, decl: TreeId) -> Option<TreeId> {
        self.get_storage(decl).map(|storage| storage.ty)
    }

    pub fn get_storage_length(&self, decl: TreeId) -> Option<usize> {
        self.get_storage(decl).and_then(|storage| storage.length)
    }

    pub fn get_storage_quals(&self, decl: TreeId) -> Quals {
        let quals = self.get_storage(decl).map_or(Quals::empty(), |s| s.quals);
        assert!(
            quals.is_consistent(),
            "storage of {} is both const and mutable",
            self.display(decl)
        );
        quals
    }

    /// Initializer of a global.
    pub fn global_get_init(&self, global: TreeId) -> Option<TreeId> {
        match self.get_kind(global) {
            NodeKind::DeclGlobal { init, .. } => *init,
            NodeKind::Error { .. } => None,
            _ => panic!("{} is not a global", self.display(global)),
        }
    }

    // --- functions ---

    /// Signature behind a function, function declaration or reference to
    /// either. Errors pass through.
    fn signature_of(&self, id: TreeId) -> TreeId {
        let mut current = id;
        for _ in 0..=self.len() {
            match self.get_kind(current) {
                NodeKind::TypeReference { pointee } => current = *pointee,
                NodeKind::DeclFunction { .. } => current = self.get_type(current),
                NodeKind::TypeClosure { .. } | NodeKind::Error { .. } => return current,
                _ => break,
            }
        }
        panic!("{} is not a function", self.display(id))
    }

    /// Parameters of a function or signature.
    pub fn fn_get_params(&self, id: TreeId) -> &[TreeId] {
        if let NodeKind::DeclFunction { params, .. } = self.get_kind(id) {
            return params;
        }
        match self.get_kind(self.signature_of(id)) {
            NodeKind::TypeClosure { params, .. } => params,
            _ => &[],
        }
    }

    /// Return type of a function or signature. The error itself for errors.
    pub fn fn_get_return(&self, id: TreeId) -> TreeId {
        let sig = self.signature_of(id);
        match self.get_kind(sig) {
            NodeKind::TypeClosure { result, .. } => *result,
            _ => sig,
        }
    }

    pub fn fn_get_arity(&self, id: TreeId) -> Arity {
        match self.get_kind(self.signature_of(id)) {
            NodeKind::TypeClosure { arity, .. } => *arity,
            _ => Arity::Fixed,
        }
    }

    pub fn fn_get_locals(&self, function: TreeId) -> &[TreeId] {
        match self.get_kind(function) {
            NodeKind::DeclFunction { locals, .. } => locals,
            NodeKind::Error { .. } => &[],
            _ => panic!("{} is not a function", self.display(function)),
        }
    }

    pub fn fn_get_body(&self, function: TreeId) -> Option<TreeId> {
        match self.get_kind(function) {
            NodeKind::DeclFunction { body, .. } => *body,
            NodeKind::Error { .. } => None,
            _ => panic!("{} is not a function", self.display(function)),
        }
    }

    // --- types ---

    /// True for pointers and references.
    pub fn ty_is_address(&self, ty: TreeId) -> bool {
        matches!(
            self.get_kind(ty),
            NodeKind::TypePointer { .. } | NodeKind::TypeReference { .. }
        )
    }

    /// Type produced by loading through `ty`: the element of a pointer,
    /// array or reference, otherwise `ty` itself.
    pub fn ty_load_type(&self, ty: TreeId) -> TreeId {
        match self.get_kind(ty) {
            NodeKind::TypePointer { pointee, .. } | NodeKind::TypeReference { pointee } => {
                *pointee
            }
            NodeKind::TypeArray { element, .. } => *element,
            _ => ty,
        }
    }

    /// Field of a struct or union by name.
    pub fn ty_get_field(&self, aggregate: TreeId, name: &str) -> Option<TreeId> {
        let fields = match self.get_kind(aggregate) {
            NodeKind::TypeStruct { fields } | NodeKind::TypeUnion { fields } => fields,
            NodeKind::Error { .. } => return None,
            _ => panic!("{} is not an aggregate", self.display(aggregate)),
        };
        fields
            .iter()
            .copied()
            .find(|&field| self.get_name(field) == name)
    }

    /// Case of an enum by name, the default case included.
    pub fn ty_get_case(&self, enum_ty: TreeId, name: &str) -> Option<TreeId> {
        let (cases, default_case) = match self.get_kind(enum_ty) {
            NodeKind::TypeEnum {
                cases,
                default_case,
                ..
            } => (cases, default_case),
            NodeKind::Error { .. } => return None,
            _ => panic!("{} is not an enum", self.display(enum_ty)),
        };
        cases
            .iter()
            .chain(default_case.iter())
            .copied()
            .find(|&case| self.get_name(case) == name)
    }

    pub fn enum_get_cases(&self, enum_ty: TreeId) -> &[TreeId] {
        match self.get_kind(enum_ty) {
            NodeKind::TypeEnum { cases, .. } => cases,
            NodeKind::Error { .. } => &[],
            _ => panic!("{} is not an enum", self.display(enum_ty)),
        }
    }

    pub fn enum_get_underlying(&self, enum_ty: TreeId) -> Option<TreeId> {
        match self.get_kind(enum_ty) {
            NodeKind::TypeEnum { underlying, .. } => *underlying,
            _ => None,
        }
    }

    /// Follow aliases to the aliased type.
    pub fn ty_strip_alias(&self, ty: TreeId) -> TreeId {
        let mut current = ty;
        // Alias cycles are reported by the validator; stop after one lap.
        for _ in 0..=self.len() {
            match self.get_kind(current) {
                NodeKind::TypeAlias { target } => current = *target,
                _ => return current,
            }
        }
        current
    }
}
