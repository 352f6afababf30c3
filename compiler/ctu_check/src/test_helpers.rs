//! Test helpers for validator unit tests.
//!
//! `Fixture` owns a tree with a prelude and one root module, and hands out
//! distinct spans so diagnostics can be matched back to the node they point
//! at.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use ctu_diagnostic::{Diagnostic, DiagnosticConfig, DiagnosticQueue, ErrorCode};
use ctu_ir::Span;
use ctu_tree::{
    Arity, Attribs, Link, Prelude, Quals, Storage, Tag, Tree, TreeId, Visibility,
};

use crate::check_tree;

pub(crate) struct Fixture {
    pub tree: Tree,
    pub prelude: Prelude,
    pub module: TreeId,
    next_span: u32,
}

impl Fixture {
    pub fn new() -> Self {
        let mut tree = Tree::new();
        let prelude = Prelude::new(&mut tree);
        let module = tree.module(Span::DUMMY, "test", None, Tag::CORE_COUNT);
        Fixture {
            tree,
            prelude,
            module,
            next_span: 1,
        }
    }

    /// A span no other node in this fixture uses.
    pub fn span(&mut self) -> Span {
        let start = self.next_span;
        self.next_span += 2;
        Span::new(start, start + 1)
    }

    pub fn int(&self) -> TreeId {
        self.prelude.int()
    }

    /// Reference to an `int`, the type of an `int` global.
    pub fn int_ref(&mut self) -> TreeId {
        let span = self.span();
        let int = self.int();
        self.tree.type_reference(span, "", int)
    }

    pub fn digit(&mut self, value: i128) -> TreeId {
        let span = self.span();
        let int = self.int();
        self.tree.expr_digit(span, int, value)
    }

    /// Closed `int` global registered under the values tag.
    pub fn global(&mut self, name: &str, init: Option<TreeId>) -> TreeId {
        let span = self.span();
        let int = self.int();
        let ty = self.int_ref();
        let global = self
            .tree
            .decl_global(span, name, Storage::new(int, 1, Quals::empty()), ty, init);
        self.tree.module_set(self.module, Tag::VALUES, name, global);
        global
    }

    /// `fn() -> result` signature.
    pub fn signature(&mut self, result: TreeId, params: &[TreeId], arity: Arity) -> TreeId {
        let span = self.span();
        self.tree.type_closure(span, "", result, params, arity)
    }

    /// Function registered under the procs tag.
    pub fn function(&mut self, name: &str, signature: TreeId, body: Option<TreeId>) -> TreeId {
        let span = self.span();
        let function = self.tree.decl_function(span, name, signature, &[], body);
        self.tree.module_set(self.module, Tag::PROCS, name, function);
        function
    }

    /// Register a type under the types tag.
    pub fn add_type(&mut self, name: &str, ty: TreeId) {
        self.tree.module_set(self.module, Tag::TYPES, name, ty);
    }

    pub fn set_link(&mut self, decl: TreeId, link: Link) {
        let attribs = Attribs::new(link, Visibility::Public);
        self.tree.set_attrib(decl, attribs);
    }

    /// Run the validator over the root module and return every report.
    pub fn check(&self) -> Vec<Diagnostic> {
        let mut reports = DiagnosticQueue::with_config(DiagnosticConfig::unlimited());
        check_tree(&self.tree, &mut reports, &[self.module]);
        reports.flush()
    }
}

/// Codes of `diags`, in report order.
pub(crate) fn codes(diags: &[Diagnostic]) -> Vec<ErrorCode> {
    diags.iter().map(|diag| diag.code).collect()
}
