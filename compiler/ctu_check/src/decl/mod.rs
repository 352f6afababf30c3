//! Per-declaration checks: well-formedness, attributes and entry points.

use ctu_diagnostic::{Diagnostic, ErrorCode};
use ctu_tree::{Link, NodeKind, TreeId};

use crate::Checker;

/// Which entry point slot a function claims.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum EntryKind {
    Cli,
    Gui,
}

impl EntryKind {
    fn label(self) -> &'static str {
        match self {
            EntryKind::Cli => "CLI",
            EntryKind::Gui => "GUI",
        }
    }
}

impl Checker<'_> {
    /// Report a declaration that was never closed. Returns `false` if so.
    pub(crate) fn check_open(&mut self, decl: TreeId) -> bool {
        if !self.tree.is_open(decl) {
            return true;
        }
        let diag = Diagnostic::error(ErrorCode::E9001)
            .with_message(format!(
                "declaration `{}` was never resolved",
                self.tree.get_name(decl)
            ))
            .with_label(self.tree.get_span(decl), "declared here");
        self.reports.push(diag);
        false
    }

    /// Basic well-formedness. Returns `false` when the declaration is too
    /// broken for the remaining checks.
    pub(crate) fn check_simple(&mut self, decl: TreeId) -> bool {
        let tree = self.tree;
        if tree.is_error(decl) || !self.check_open(decl) {
            return false;
        }

        let attribs = tree.get_attrib(decl);
        if tree.name_of(decl).is_none() && attribs.link != Link::Module {
            let kind = tree.get_kind(decl).name();
            let diag = Diagnostic::error(ErrorCode::INVALID_NAME)
                .with_message(format!("{kind} with {:?} linkage has no name", attribs.link))
                .with_label(tree.get_span(decl), "")
                .with_note("only declarations with internal linkage may be anonymous");
            self.reports.push(diag);
        }

        if tree.try_get_type(decl).is_none() {
            let diag = Diagnostic::error(ErrorCode::E9001)
                .with_message(format!("decl `{}` has no type", tree.get_name(decl)))
                .with_label(tree.get_span(decl), "");
            self.reports.push(diag);
            return false;
        }
        true
    }

    /// Imported globals with initializers, mangled internal globals and
    /// globals marked as entry points.
    pub(crate) fn check_global_attribs(&mut self, global: TreeId) {
        let tree = self.tree;
        let attribs = tree.get_attrib(global);
        let name = tree.get_name(global);
        let span = tree.get_span(global);

        match attribs.link {
            Link::Import if tree.global_get_init(global).is_some() => {
                self.reports.push(
                    Diagnostic::from_code(ErrorCode::IMPORTED_WITH_IMPL)
                        .with_message(format!(
                            "global `{name}` is marked as imported but has an implementation"
                        ))
                        .with_label(span, "")
                        .with_note("implementation will be ignored"),
                );
            }
            Link::Module if attribs.mangle.is_some() => {
                self.reports.push(
                    Diagnostic::from_code(ErrorCode::IGNORED_MANGLING)
                        .with_message(format!(
                            "global `{name}` has internal linkage and user defined mangling"
                        ))
                        .with_label(span, "")
                        .with_note("attribute will be ignored"),
                );
            }
            Link::EntryCli | Link::EntryGui => {
                self.reports.push(
                    Diagnostic::error(ErrorCode::ENTRY_NOT_FUNCTION)
                        .with_message(format!(
                            "global `{name}` is marked as an entry point but is not a function"
                        ))
                        .with_label(span, ""),
                );
            }
            _ => {}
        }
    }

    /// Globals need storage of a type that has a size.
    pub(crate) fn check_global_storage(&mut self, global: TreeId) {
        let tree = self.tree;
        let Some(ty) = tree.get_storage_type(global) else {
            return;
        };
        let ty = tree.ty_strip_alias(ty);
        if matches!(tree.get_kind(ty), NodeKind::TypeUnit | NodeKind::TypeEmpty) {
            self.reports.push(
                Diagnostic::error(ErrorCode::INVALID_STORAGE)
                    .with_message(format!(
                        "global `{}` cannot have storage of type `{}`",
                        tree.get_name(global),
                        tree.display(ty)
                    ))
                    .with_label(tree.get_span(global), ""),
            );
        }
    }

    /// Imported functions with bodies, mangled internal functions and entry
    /// point uniqueness.
    pub(crate) fn check_func_attribs(&mut self, function: TreeId) {
        let tree = self.tree;
        let attribs = tree.get_attrib(function);
        let name = tree.get_name(function);
        let span = tree.get_span(function);

        match attribs.link {
            Link::Import if tree.fn_get_body(function).is_some() => {
                self.reports.push(
                    Diagnostic::from_code(ErrorCode::IMPORTED_WITH_IMPL)
                        .with_message(format!(
                            "function `{name}` is marked as imported but has an implementation"
                        ))
                        .with_label(span, "")
                        .with_note("implementation will be ignored"),
                );
            }
            Link::Module if attribs.mangle.is_some() => {
                self.reports.push(
                    Diagnostic::from_code(ErrorCode::IGNORED_MANGLING)
                        .with_message(format!(
                            "function `{name}` has internal linkage and user defined mangling"
                        ))
                        .with_label(span, "")
                        .with_note("attribute will be ignored"),
                );
            }
            Link::EntryCli => self.check_entry(function, EntryKind::Cli),
            Link::EntryGui => self.check_entry(function, EntryKind::Gui),
            _ => {}
        }
    }

    fn check_entry(&mut self, function: TreeId, kind: EntryKind) {
        let tree = self.tree;
        if tree.fn_get_body(function).is_none() {
            self.reports.push(
                Diagnostic::error(ErrorCode::ENTRY_MISSING_BODY)
                    .with_message(format!(
                        "function `{}` is an entry point, but has no body",
                        tree.get_name(function)
                    ))
                    .with_label(tree.get_span(function), ""),
            );
        }

        let slot = match kind {
            EntryKind::Cli => &mut self.cli_entry,
            EntryKind::Gui => &mut self.gui_entry,
        };
        match *slot {
            None => *slot = Some(function),
            Some(previous) => {
                let diag = Diagnostic::error(ErrorCode::MULTIPLE_ENTRY_POINTS)
                    .with_message(format!("multiple {} entry points defined", kind.label()))
                    .with_label(tree.get_span(function), "")
                    .with_secondary_label(
                        tree.get_span(previous),
                        "previous entry point defined here",
                    );
                self.reports.push(diag);
            }
        }
    }
}
