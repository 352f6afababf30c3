use super::*;
use crate::ops::{Attribs, Link, Quals, Storage};
use crate::Prelude;
use ctu_diagnostic::{DiagnosticConfig, DiagnosticQueue};
use pretty_assertions::assert_eq;

const IMPORTS: Tag = Tag::new(4);

const SEARCH: DeclSearch<'static> = DeclSearch {
    module_tags: &[Tag::MODULES],
    import_tags: &[IMPORTS],
    decl_tags: &[Tag::VALUES, Tag::TYPES],
};

struct Fixture {
    cx: TreeContext,
    root: TreeId,
    public: TreeId,
    private: TreeId,
}

/// `root` with nested module `util` holding `public` and `private`, and the
/// same module imported as `lib`.
fn fixture() -> Fixture {
    let mut cx = TreeContext::new(
        crate::Tree::new(),
        DiagnosticQueue::with_config(DiagnosticConfig::unlimited()),
    );
    let prelude = Prelude::new(&mut cx.tree);
    let root = cx.tree.module(Span::DUMMY, "root", None, 5);
    let util = cx.tree.module(Span::DUMMY, "util", Some(root), 5);
    cx.tree.module_set(root, Tag::MODULES, "util", util);
    cx.tree.module_set(root, IMPORTS, "lib", util);

    let storage = Storage::new(prelude.int(), 1, Quals::CONST);
    let public = cx
        .tree
        .decl_global(Span::DUMMY, "public", storage, prelude.int(), None);
    cx.tree
        .set_attrib(public, Attribs::new(Link::Export, Visibility::Public));
    let private = cx
        .tree
        .decl_global(Span::DUMMY, "private", storage, prelude.int(), None);
    cx.tree.module_set(util, Tag::VALUES, "public", public);
    cx.tree.module_set(util, Tag::VALUES, "private", private);

    Fixture {
        cx,
        root,
        public,
        private,
    }
}

fn last_message(cx: &TreeContext) -> Option<String> {
    cx.cookie.reports().peek().last().map(|d| d.message.clone())
}

#[test]
fn test_nested_path_finds_private_decl() {
    let mut f = fixture();
    let found = f
        .cx
        .search_path(f.root, &SEARCH, Span::DUMMY, &["util", "private"]);
    assert_eq!(found, f.private);
    assert!(f.cx.cookie.reports().is_empty());
}

#[test]
fn test_imported_public_decl() {
    let mut f = fixture();
    let found = f
        .cx
        .search_path(f.root, &SEARCH, Span::DUMMY, &["lib", "public"]);
    assert_eq!(found, f.public);
}

#[test]
fn test_imported_private_decl_rejected() {
    let mut f = fixture();
    let found = f
        .cx
        .search_path(f.root, &SEARCH, Span::DUMMY, &["lib", "private"]);
    assert!(f.cx.tree.is_error(found));
    assert_eq!(
        f.cx.cookie.reports().count_code(ErrorCode::SYMBOL_NOT_VISIBLE),
        1
    );
    assert_eq!(
        last_message(&f.cx).as_deref(),
        Some("decl `private` is not public")
    );
}

#[test]
fn test_missing_namespace() {
    let mut f = fixture();
    let found = f
        .cx
        .search_path(f.root, &SEARCH, Span::DUMMY, &["nope", "public"]);
    assert!(f.cx.tree.is_error(found));
    assert_eq!(
        last_message(&f.cx).as_deref(),
        Some("namespace `nope` not found")
    );
}

#[test]
fn test_missing_decl() {
    let mut f = fixture();
    let found = f
        .cx
        .search_path(f.root, &SEARCH, Span::DUMMY, &["util", "nope"]);
    assert!(f.cx.tree.is_error(found));
    assert_eq!(last_message(&f.cx).as_deref(), Some("decl `nope` not found"));
    assert_eq!(
        f.cx.cookie.reports().count_code(ErrorCode::SYMBOL_NOT_FOUND),
        1
    );
}

#[test]
fn test_decl_used_as_namespace() {
    let mut f = fixture();
    f.cx
        .tree
        .module_set(f.root, Tag::MODULES, "fake", f.public);
    let found = f
        .cx
        .search_path(f.root, &SEARCH, Span::DUMMY, &["fake", "x"]);
    assert!(f.cx.tree.is_error(found));
    assert_eq!(
        f.cx.cookie.reports().count_code(ErrorCode::MALFORMED_TYPE_NAME),
        1
    );
    assert_eq!(
        last_message(&f.cx).as_deref(),
        Some("expected a namespace but got `public` instead")
    );
}

#[test]
fn test_single_segment_searches_scope() {
    let mut f = fixture();
    let util = f.cx.tree.module_get(f.root, Tag::MODULES, "util");
    let found = util.map(|util| f.cx.search_path(util, &SEARCH, Span::DUMMY, &["public"]));
    assert_eq!(found, Some(f.public));
}

#[test]
fn test_search_namespace_reports_import() {
    let mut f = fixture();
    let (ns, imported) = f
        .cx
        .search_namespace(f.root, &SEARCH, Span::DUMMY, &["lib", "anything"]);
    assert!(imported);
    assert!(f.cx.tree.is_module(ns));

    let (_, imported) = f
        .cx
        .search_namespace(f.root, &SEARCH, Span::DUMMY, &["util", "anything"]);
    assert!(!imported);
}

#[test]
fn test_search_qualified() {
    let mut f = fixture();
    assert_eq!(
        f.cx
            .search_qualified(f.root, &SEARCH, Span::DUMMY, "util", "private"),
        f.private
    );
    let hidden = f
        .cx
        .search_qualified(f.root, &SEARCH, Span::DUMMY, "lib", "private");
    assert!(f.cx.tree.is_error(hidden));
    let missing = f
        .cx
        .search_qualified(f.root, &SEARCH, Span::DUMMY, "other", "x");
    assert_eq!(
        f.cx.tree.get_name(missing),
        "namespace `other` not found"
    );
}

#[test]
fn test_core_search_probes_values_first() {
    assert_eq!(
        DeclSearch::CORE.decl_tags,
        &[Tag::VALUES, Tag::PROCS, Tag::TYPES]
    );
}
