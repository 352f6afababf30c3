//! Structural validation of a resolved program.
//!
//! [`check_tree`] runs once, after every module has been forwarded and
//! resolved, and before any back end sees the tree. It never changes the
//! tree; everything it finds goes into the diagnostic queue:
//!
//! - declaration well-formedness and attribute consistency
//! - entry point uniqueness
//! - return and call checks over function bodies, return coverage
//! - cast and binary operand checks
//! - cycles: recursive global evaluation, infinitely sized aggregates and
//!   types that contain themselves
//!
//! A bad declaration never stops the walk. Sibling declarations are still
//! checked so one run reports as much as it can.

mod body;
mod decl;
mod recursion;

#[cfg(test)]
mod test_helpers;

use ctu_diagnostic::DiagnosticQueue;
use ctu_tree::{NodeKind, Tag, Tree, TreeId};
use rustc_hash::FxHashSet;
use tracing::{debug, instrument};

/// Validate `modules` and everything nested under them.
///
/// Modules reachable along several paths are checked once.
#[instrument(level = "debug", skip_all, fields(modules = modules.len()))]
pub fn check_tree(tree: &Tree, reports: &mut DiagnosticQueue, modules: &[TreeId]) {
    let mut check = Checker::new(tree, reports);
    for &module in modules {
        check.check_module(module);
    }
    debug!(
        errors = check.reports.error_count(),
        warnings = check.reports.warning_count(),
        "check finished"
    );
}

/// Transient state of one validation run.
pub(crate) struct Checker<'a> {
    tree: &'a Tree,
    reports: &'a mut DiagnosticQueue,

    cli_entry: Option<TreeId>,
    gui_entry: Option<TreeId>,

    /// Globals whose initializers are being walked.
    expr_stack: Vec<TreeId>,
    /// Types whose layout or contents are being walked.
    type_stack: Vec<TreeId>,

    checked_exprs: FxHashSet<TreeId>,
    /// Aggregates proven to have a finite size.
    checked_sizes: FxHashSet<TreeId>,
    /// Types proven not to contain themselves.
    checked_types: FxHashSet<TreeId>,
    checked_modules: FxHashSet<TreeId>,
}

impl<'a> Checker<'a> {
    pub(crate) fn new(tree: &'a Tree, reports: &'a mut DiagnosticQueue) -> Self {
        Checker {
            tree,
            reports,
            cli_entry: None,
            gui_entry: None,
            expr_stack: Vec::with_capacity(64),
            type_stack: Vec::with_capacity(64),
            checked_exprs: FxHashSet::default(),
            checked_sizes: FxHashSet::default(),
            checked_types: FxHashSet::default(),
            checked_modules: FxHashSet::default(),
        }
    }

    /// Nested modules first, then globals, functions and types, each in the
    /// order they were declared.
    fn check_module(&mut self, module: TreeId) {
        if !self.checked_modules.insert(module) {
            return;
        }
        let tree = self.tree;
        assert!(
            tree.is_module(module),
            "invalid module `{}`",
            tree.display(module)
        );

        for (_, child) in tree.module_tag(module, Tag::MODULES).iter() {
            if tree.is_module(child) {
                ctu_stack::ensure_sufficient_stack(|| self.check_module(child));
            }
        }

        for (_, global) in tree.module_tag(module, Tag::VALUES).iter() {
            if !matches!(tree.get_kind(global), NodeKind::DeclGlobal { .. }) {
                continue;
            }
            if !self.check_simple(global) {
                continue;
            }
            self.check_global_attribs(global);
            self.check_global_storage(global);
            self.check_global_recursion(global);
            self.check_global_init(global);
        }

        for (_, function) in tree.module_tag(module, Tag::PROCS).iter() {
            if !matches!(tree.get_kind(function), NodeKind::DeclFunction { .. }) {
                continue;
            }
            if !self.check_simple(function) {
                continue;
            }
            self.check_func_attribs(function);
            self.check_func_details(function);
        }

        for (_, ty) in tree.module_tag(module, Tag::TYPES).iter() {
            let kind = tree.get_kind(ty);
            if kind.is_error() || !kind.is_type() {
                continue;
            }
            if !self.check_open(ty) {
                continue;
            }
            self.check_any_type_recursion(ty);
        }
    }
}
