//! Declarations and the open/close protocol.
//!
//! A front end forward-declares everything with an `open_*` constructor,
//! attaching a [`ResolveInfo`]. When the declaration is first needed the
//! resolution engine runs the callback, which must finish the node with the
//! matching `close_*`. The `decl_*` constructors open and close in one step
//! for declarations whose contents are known up front.
//!
//! Closing asserts that the node still has the kind it was opened with;
//! closing a function additionally asserts that its parameter list agrees
//! with its signature.

use ctu_ir::{Name, Span};

use crate::node::{DeclState, NodeKind, TreeVec};
use crate::ops::{Arity, Attribs, Quals, Storage};
use crate::resolve::ResolveInfo;
use crate::{Tree, TreeId};

impl Tree {
    fn decl_open(
        &mut self,
        span: Span,
        name: &str,
        ty: Option<TreeId>,
        kind: NodeKind,
        resolve: Option<ResolveInfo>,
    ) -> TreeId {
        let state = match resolve {
            Some(info) => DeclState::Open(info),
            None => DeclState::Closed,
        };
        let name = self.decl_name(name);
        self.alloc_decl(kind, span, ty, name, state)
    }

    /// Mark `decl` closed after checking it still has the expected kind.
    fn decl_close(&mut self, decl: TreeId, expected: &str, is_kind: fn(&NodeKind) -> bool) {
        assert!(
            is_kind(self.get_kind(decl)),
            "decl {} is the wrong kind, expected {expected}",
            self.display(decl)
        );
        self.decl_info_mut(decl).state = DeclState::Closed;
    }

    // --- globals ---

    /// Forward-declare a global. Storage is filled in by [`Tree::set_storage`]
    /// during resolution.
    pub fn open_global(
        &mut self,
        span: Span,
        name: &str,
        ty: Option<TreeId>,
        resolve: ResolveInfo,
    ) -> TreeId {
        let kind = NodeKind::DeclGlobal {
            storage: None,
            init: None,
        };
        self.decl_open(span, name, ty, kind, Some(resolve))
    }

    pub fn close_global(&mut self, global: TreeId, init: Option<TreeId>) {
        self.decl_close(global, "global", |k| {
            matches!(k, NodeKind::DeclGlobal { .. })
        });
        if let NodeKind::DeclGlobal { init: slot, .. } = &mut self.node_mut(global).kind {
            *slot = init;
        }
    }

    pub fn decl_global(
        &mut self,
        span: Span,
        name: &str,
        storage: Storage,
        ty: TreeId,
        init: Option<TreeId>,
    ) -> TreeId {
        let kind = NodeKind::DeclGlobal {
            storage: None,
            init: None,
        };
        let global = self.decl_open(span, name, Some(ty), kind, None);
        self.set_storage(global, storage);
        self.close_global(global, init);
        global
    }

    /// Set the backing storage of a global or local.
    pub fn set_storage(&mut self, decl: TreeId, storage: Storage) {
        match &mut self.node_mut(decl).kind {
            NodeKind::DeclGlobal { storage: slot, .. } => *slot = Some(storage),
            NodeKind::DeclLocal { storage: slot } => *slot = storage,
            _ => panic!(
                "only globals and locals can have storage, got {}",
                self.display(decl)
            ),
        }
    }

    // --- functions ---

    /// Forward-declare a function. With a signature, its parameters become
    /// the function's parameters; without one, a resolve-type callback is
    /// expected to provide it through [`Tree::set_fn_signature`].
    pub fn open_function(
        &mut self,
        span: Span,
        name: &str,
        signature: Option<TreeId>,
        resolve: ResolveInfo,
    ) -> TreeId {
        let params = match signature {
            Some(sig) => self.signature_params(sig),
            None => TreeVec::new(),
        };
        let kind = NodeKind::DeclFunction {
            params,
            locals: TreeVec::new(),
            body: None,
        };
        self.decl_open(span, name, signature, kind, Some(resolve))
    }

    fn signature_params(&self, signature: TreeId) -> TreeVec {
        match self.get_kind(signature) {
            NodeKind::TypeClosure { params, .. } => params.clone(),
            _ => panic!("signature {} is not a closure", self.display(signature)),
        }
    }

    /// Provide the signature of a function whose type was left open.
    ///
    /// A function without parameters yet adopts the signature's parameters.
    pub fn set_fn_signature(&mut self, function: TreeId, signature: TreeId) {
        assert!(
            matches!(self.get_kind(function), NodeKind::DeclFunction { .. }),
            "cannot set the signature of {}",
            self.display(function)
        );
        let sig_params = self.signature_params(signature);
        let node = self.node_mut(function);
        if let NodeKind::DeclFunction { params, .. } = &mut node.kind {
            if params.is_empty() {
                *params = sig_params;
            }
        }
        node.ty = Some(signature);
    }

    /// Finish a function with its body (`None` for imported functions).
    ///
    /// # Panics
    /// Panics if the signature is missing or its parameter count does not
    /// match the parameters added to the function.
    pub fn close_function(&mut self, function: TreeId, body: Option<TreeId>) {
        self.decl_close(function, "function", |k| {
            matches!(k, NodeKind::DeclFunction { .. })
        });
        let signature = self.try_get_type(function).unwrap_or_else(|| {
            panic!("function {} closed without a signature", self.display(function))
        });
        let (expected, arity) = match self.get_kind(signature) {
            NodeKind::TypeClosure { params, arity, .. } => (params.len(), *arity),
            _ => panic!("signature {} is not a closure", self.display(signature)),
        };
        let NodeKind::DeclFunction {
            params,
            body: slot,
            ..
        } = &mut self.node_mut(function).kind
        else {
            unreachable!("kind checked by decl_close");
        };
        *slot = body;
        let actual = params.len();
        assert!(
            actual == expected,
            "decl {} has {actual} params, expected {expected}{} parameter(s)",
            self.get_name(function),
            if arity == Arity::Fixed { "" } else { " or more" }
        );
    }

    pub fn decl_function(
        &mut self,
        span: Span,
        name: &str,
        signature: TreeId,
        locals: &[TreeId],
        body: Option<TreeId>,
    ) -> TreeId {
        let params = self.signature_params(signature);
        let kind = NodeKind::DeclFunction {
            params,
            locals: TreeVec::new(),
            body: None,
        };
        let function = self.decl_open(span, name, Some(signature), kind, None);
        for &local in locals {
            self.add_local(function, local);
        }
        self.close_function(function, body);
        function
    }

    pub fn add_param(&mut self, function: TreeId, param: TreeId) {
        assert!(
            matches!(self.get_kind(param), NodeKind::DeclParam),
            "cannot add a non-param {} to a function as a param",
            self.display(param)
        );
        match &mut self.node_mut(function).kind {
            NodeKind::DeclFunction { params, .. } => params.push(param),
            _ => panic!("cannot add params to {}", self.display(function)),
        }
    }

    pub fn add_local(&mut self, function: TreeId, local: TreeId) {
        assert!(
            matches!(self.get_kind(local), NodeKind::DeclLocal { .. }),
            "cannot add a non-local {} to a function as a local",
            self.display(local)
        );
        match &mut self.node_mut(function).kind {
            NodeKind::DeclFunction { locals, .. } => locals.push(local),
            _ => panic!("cannot add locals to {}", self.display(function)),
        }
    }

    // --- simple declarations ---

    pub fn decl_param(&mut self, span: Span, name: &str, ty: TreeId) -> TreeId {
        self.expect_type(ty, "param type");
        self.decl_open(span, name, Some(ty), NodeKind::DeclParam, None)
    }

    pub fn decl_field(&mut self, span: Span, name: &str, ty: TreeId) -> TreeId {
        self.expect_type(ty, "field type");
        self.decl_open(span, name, Some(ty), NodeKind::DeclField, None)
    }

    pub fn decl_local(&mut self, span: Span, name: &str, storage: Storage, ty: TreeId) -> TreeId {
        self.decl_open(span, name, Some(ty), NodeKind::DeclLocal { storage }, None)
    }

    /// Enum case whose value is `value`; the case takes the value's type.
    pub fn decl_case(&mut self, span: Span, name: &str, value: TreeId) -> TreeId {
        let ty = self.get_type(value);
        self.decl_open(span, name, Some(ty), NodeKind::DeclCase { value }, None)
    }

    pub fn decl_attrib(&mut self, span: Span, name: &str) -> TreeId {
        self.decl_open(span, name, None, NodeKind::DeclAttrib, None)
    }

    // --- partial declarations ---

    /// Forward-declare a type whose kind is decided by its resolver.
    pub fn open_decl(&mut self, span: Span, name: &str, resolve: ResolveInfo) -> TreeId {
        self.decl_open(span, name, None, NodeKind::Partial, Some(resolve))
    }

    /// Turn a partial declaration into `other`.
    ///
    /// The declaration keeps its identity, name, span and attributes; it
    /// takes the kind, payload and type of `other`. Every reference made to
    /// the partial while it was open now sees the finished type.
    pub fn close_decl(&mut self, decl: TreeId, other: TreeId) {
        self.decl_close(decl, "partial", |k| matches!(k, NodeKind::Partial));
        let source = self.node(other);
        let kind = source.kind.clone();
        let quals = source.decl.as_ref().map(|info| info.quals);
        let ty = if kind.is_error() { Some(decl) } else { source.ty };

        let node = self.node_mut(decl);
        node.kind = kind;
        node.ty = ty;
        if let (Some(info), Some(quals)) = (node.decl.as_mut(), quals) {
            info.quals = quals;
        }
    }

    // --- aggregates ---

    fn check_aggregate_fields(&self, fields: &[TreeId]) {
        for &field in fields {
            assert!(
                matches!(self.get_kind(field), NodeKind::DeclField),
                "expected field, got {}",
                self.display(field)
            );
        }
    }

    pub fn open_struct(&mut self, span: Span, name: &str, resolve: ResolveInfo) -> TreeId {
        let kind = NodeKind::TypeStruct {
            fields: TreeVec::new(),
        };
        self.decl_open(span, name, None, kind, Some(resolve))
    }

    pub fn close_struct(&mut self, decl: TreeId, fields: &[TreeId]) {
        self.decl_close(decl, "struct", |k| matches!(k, NodeKind::TypeStruct { .. }));
        self.check_aggregate_fields(fields);
        if let NodeKind::TypeStruct { fields: slot } = &mut self.node_mut(decl).kind {
            *slot = TreeVec::from_slice(fields);
        }
    }

    pub fn decl_struct(&mut self, span: Span, name: &str, fields: &[TreeId]) -> TreeId {
        self.check_aggregate_fields(fields);
        let kind = NodeKind::TypeStruct {
            fields: TreeVec::from_slice(fields),
        };
        self.decl_open(span, name, None, kind, None)
    }

    pub fn open_union(&mut self, span: Span, name: &str, resolve: ResolveInfo) -> TreeId {
        let kind = NodeKind::TypeUnion {
            fields: TreeVec::new(),
        };
        self.decl_open(span, name, None, kind, Some(resolve))
    }

    pub fn close_union(&mut self, decl: TreeId, fields: &[TreeId]) {
        self.decl_close(decl, "union", |k| matches!(k, NodeKind::TypeUnion { .. }));
        self.check_aggregate_fields(fields);
        if let NodeKind::TypeUnion { fields: slot } = &mut self.node_mut(decl).kind {
            *slot = TreeVec::from_slice(fields);
        }
    }

    pub fn decl_union(&mut self, span: Span, name: &str, fields: &[TreeId]) -> TreeId {
        self.check_aggregate_fields(fields);
        let kind = NodeKind::TypeUnion {
            fields: TreeVec::from_slice(fields),
        };
        self.decl_open(span, name, None, kind, None)
    }

    // --- enums ---

    pub fn open_enum(&mut self, span: Span, name: &str, resolve: ResolveInfo) -> TreeId {
        let kind = NodeKind::TypeEnum {
            underlying: None,
            cases: TreeVec::new(),
            default_case: None,
        };
        self.decl_open(span, name, None, kind, Some(resolve))
    }

    /// Finish an enum. `underlying` must be a digit type and every case a
    /// case declaration.
    pub fn close_enum(
        &mut self,
        decl: TreeId,
        underlying: TreeId,
        cases: &[TreeId],
        default_case: Option<TreeId>,
    ) {
        self.decl_close(decl, "enum", |k| matches!(k, NodeKind::TypeEnum { .. }));
        assert!(
            matches!(self.get_kind(underlying), NodeKind::TypeDigit { .. }),
            "enums must have an underlying digit type, got {}",
            self.display(underlying)
        );
        for &case in cases.iter().chain(default_case.iter()) {
            assert!(
                matches!(self.get_kind(case), NodeKind::DeclCase { .. }),
                "expected case, got {}",
                self.display(case)
            );
        }
        if let NodeKind::TypeEnum {
            underlying: u,
            cases: c,
            default_case: d,
        } = &mut self.node_mut(decl).kind
        {
            *u = Some(underlying);
            *c = TreeVec::from_slice(cases);
            *d = default_case;
        }
    }

    pub fn decl_enum(
        &mut self,
        span: Span,
        name: &str,
        underlying: TreeId,
        cases: &[TreeId],
        default_case: Option<TreeId>,
    ) -> TreeId {
        let kind = NodeKind::TypeEnum {
            underlying: None,
            cases: TreeVec::new(),
            default_case: None,
        };
        let decl = self.decl_open(span, name, None, kind, None);
        self.close_enum(decl, underlying, cases, default_case);
        decl
    }

    // --- setters ---

    pub fn set_attrib(&mut self, decl: TreeId, attribs: Attribs) {
        self.decl_info_mut(decl).attribs = attribs;
    }

    pub fn set_type(&mut self, decl: TreeId, ty: TreeId) {
        self.node_mut(decl).ty = Some(ty);
    }

    pub fn set_qualifiers(&mut self, decl: TreeId, quals: Quals) {
        self.decl_info_mut(decl).quals = quals;
    }

    /// Copy of `decl` under another name. The copy is a separate node.
    pub fn alias(&mut self, decl: TreeId, name: &str) -> TreeId {
        let name: Option<Name> = self.decl_name(name);
        let mut node = self.node(decl).clone();
        match node.decl.as_mut() {
            Some(info) => info.name = name,
            None => panic!("cannot alias {}, it is not a declaration", self.display(decl)),
        }
        let id = self.alloc(node);
        if self.is_error(id) {
            self.node_mut(id).ty = Some(id);
        }
        id
    }

    pub(crate) fn decl_info_mut(&mut self, decl: TreeId) -> &mut crate::node::DeclInfo {
        if self.node(decl).decl.is_none() {
            panic!("{} is not a declaration", self.display(decl));
        }
        match self.node_mut(decl).decl.as_deref_mut() {
            Some(info) => info,
            None => unreachable!("checked above"),
        }
    }
}

#[cfg(test)]
mod tests;
