//! Qualified name lookup across nested and imported modules.

use ctu_diagnostic::ErrorCode;
use ctu_ir::Span;

use crate::module::Tag;
use crate::ops::Visibility;
use crate::{TreeContext, TreeId};

/// Which tags a front end searches for each kind of path segment.
#[derive(Copy, Clone, Debug)]
pub struct DeclSearch<'a> {
    /// Tags holding nested modules.
    pub module_tags: &'a [Tag],
    /// Tags holding imported modules. Declarations reached through these
    /// must be public.
    pub import_tags: &'a [Tag],
    /// Tags probed, in order, for the last segment.
    pub decl_tags: &'a [Tag],
}

impl DeclSearch<'static> {
    /// Nested modules and imports both live under [`Tag::MODULES`];
    /// declarations are probed as values, then procedures, then types.
    pub const CORE: Self = DeclSearch {
        module_tags: &[Tag::MODULES],
        import_tags: &[],
        decl_tags: &[Tag::VALUES, Tag::PROCS, Tag::TYPES],
    };
}

impl TreeContext {
    /// Find the namespace `segment` names inside `scope`. Sets `imported`
    /// when the hit came through an import tag.
    fn select_module(
        &self,
        scope: TreeId,
        search: &DeclSearch<'_>,
        segment: &str,
        imported: &mut bool,
    ) -> Option<TreeId> {
        if let Some(found) = self.tree.select_decl(scope, search.module_tags, segment) {
            return Some(found);
        }
        let found = self.tree.select_decl(scope, search.import_tags, segment)?;
        *imported = true;
        Some(found)
    }

    /// Walk every segment but the last as a namespace.
    fn walk_namespaces(
        &mut self,
        scope: TreeId,
        search: &DeclSearch<'_>,
        span: Span,
        segments: &[&str],
        imported: &mut bool,
    ) -> TreeId {
        let mut ns = scope;
        for &segment in segments {
            let Some(next) = self.select_module(ns, search, segment, imported) else {
                return self.raise(
                    span,
                    ErrorCode::SYMBOL_NOT_FOUND,
                    format!("namespace `{segment}` not found"),
                );
            };
            if !self.tree.is_module(next) {
                let found = self.tree.display(next);
                return self.raise(
                    span,
                    ErrorCode::MALFORMED_TYPE_NAME,
                    format!("expected a namespace but got `{found}` instead"),
                );
            }
            ns = next;
        }
        ns
    }

    /// Resolve the namespace a path lives in: every segment but the last.
    ///
    /// Returns the module (or an error node) and whether an import was
    /// crossed on the way.
    ///
    /// # Panics
    /// Panics on an empty path.
    pub fn search_namespace(
        &mut self,
        scope: TreeId,
        search: &DeclSearch<'_>,
        span: Span,
        path: &[&str],
    ) -> (TreeId, bool) {
        let Some((_, namespaces)) = path.split_last() else {
            panic!("cannot search an empty path");
        };
        let mut imported = false;
        let ns = self.walk_namespaces(scope, search, span, namespaces, &mut imported);
        (ns, imported)
    }

    /// Resolve a dotted path to a declaration.
    ///
    /// Reports `E1001` for a missing namespace or declaration, `E1002` for a
    /// private declaration reached through an import and `E1003` when a
    /// segment names something that is not a namespace.
    pub fn search_path(
        &mut self,
        scope: TreeId,
        search: &DeclSearch<'_>,
        span: Span,
        path: &[&str],
    ) -> TreeId {
        let Some((&name, _)) = path.split_last() else {
            panic!("cannot search an empty path");
        };
        let (ns, imported) = self.search_namespace(scope, search, span, path);
        if self.tree.is_error(ns) {
            return ns;
        }
        self.select_visible(ns, search, span, name, imported)
    }

    /// Resolve `module::name`.
    pub fn search_qualified(
        &mut self,
        scope: TreeId,
        search: &DeclSearch<'_>,
        span: Span,
        module: &str,
        name: &str,
    ) -> TreeId {
        let mut imported = false;
        let ns = self.walk_namespaces(scope, search, span, &[module], &mut imported);
        if self.tree.is_error(ns) {
            return ns;
        }
        self.select_visible(ns, search, span, name, imported)
    }

    fn select_visible(
        &mut self,
        ns: TreeId,
        search: &DeclSearch<'_>,
        span: Span,
        name: &str,
        imported: bool,
    ) -> TreeId {
        let Some(decl) = self.tree.select_decl(ns, search.decl_tags, name) else {
            return self.raise(
                span,
                ErrorCode::SYMBOL_NOT_FOUND,
                format!("decl `{name}` not found"),
            );
        };
        if imported && !self.tree.has_vis(decl, Visibility::Public) {
            return self.raise(
                span,
                ErrorCode::SYMBOL_NOT_VISIBLE,
                format!("decl `{name}` is not public"),
            );
        }
        decl
    }
}

#[cfg(test)]
mod tests;
