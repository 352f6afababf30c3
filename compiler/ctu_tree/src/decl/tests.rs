use super::*;
use crate::{Prelude, TreeContext};
use ctu_diagnostic::ErrorCode;
use pretty_assertions::assert_eq;

fn sp(start: u32) -> Span {
    Span::new(start, start + 1)
}

fn setup() -> (Tree, Prelude, TreeId) {
    let mut tree = Tree::new();
    let prelude = Prelude::new(&mut tree);
    let module = tree.module(sp(0), "test", None, crate::Tag::CORE_COUNT);
    (tree, prelude, module)
}

fn noop(scope: TreeId) -> ResolveInfo {
    ResolveInfo::new(scope, |_, _, _| {})
}

#[test]
fn test_open_global_then_close() {
    let (mut tree, prelude, module) = setup();
    let global = tree.open_global(sp(1), "g", Some(prelude.int()), noop(module));
    assert!(tree.is_open(global));
    assert!(tree.get_storage(global).is_none());

    tree.set_storage(global, Storage::new(prelude.int(), 1, Quals::CONST));
    let init = tree.expr_digit(sp(2), prelude.int(), 4);
    tree.close_global(global, Some(init));

    assert!(!tree.is_open(global));
    assert_eq!(tree.global_get_init(global), Some(init));
    assert_eq!(tree.get_storage_type(global), Some(prelude.int()));
    assert_eq!(tree.get_storage_quals(global), Quals::CONST);
}

#[test]
#[should_panic(expected = "wrong kind, expected global")]
fn test_close_global_on_function_panics() {
    let (mut tree, prelude, module) = setup();
    let sig = tree.type_closure(sp(1), "", prelude.unit, &[], Arity::Fixed);
    let function = tree.open_function(sp(2), "f", Some(sig), noop(module));
    tree.close_global(function, None);
}

#[test]
fn test_open_function_copies_signature_params() {
    let (mut tree, prelude, module) = setup();
    let a = tree.decl_param(sp(1), "a", prelude.int());
    let b = tree.decl_param(sp(2), "b", prelude.bool);
    let sig = tree.type_closure(sp(3), "", prelude.unit, &[a, b], Arity::Fixed);
    let function = tree.open_function(sp(4), "f", Some(sig), noop(module));
    assert_eq!(tree.fn_get_params(function), &[a, b]);

    tree.close_function(function, None);
    assert!(tree.fn_get_body(function).is_none());
    assert_eq!(tree.fn_get_return(function), prelude.unit);
}

#[test]
fn test_set_fn_signature_adopts_params() {
    let (mut tree, prelude, module) = setup();
    let function = tree.open_function(sp(1), "f", None, noop(module));
    assert!(tree.try_get_type(function).is_none());

    let a = tree.decl_param(sp(2), "a", prelude.int());
    let sig = tree.type_closure(sp(3), "", prelude.int(), &[a], Arity::Fixed);
    tree.set_fn_signature(function, sig);
    assert_eq!(tree.get_type(function), sig);
    assert_eq!(tree.fn_get_params(function), &[a]);
}

#[test]
#[should_panic(expected = "has 0 params, expected 1")]
fn test_close_function_param_count_mismatch() {
    let (mut tree, prelude, module) = setup();
    let function = tree.open_function(sp(1), "f", None, noop(module));
    let a = tree.decl_param(sp(2), "a", prelude.int());
    let sig = tree.type_closure(sp(3), "", prelude.int(), &[a], Arity::Fixed);
    // The signature arrives after params were set up by hand.
    tree.set_type(function, sig);
    tree.close_function(function, None);
}

#[test]
fn test_add_param_and_local() {
    let (mut tree, prelude, module) = setup();
    let function = tree.open_function(sp(1), "f", None, noop(module));
    let a = tree.decl_param(sp(2), "a", prelude.int());
    tree.add_param(function, a);
    let sig = tree.type_closure(sp(3), "", prelude.unit, &[a], Arity::Fixed);
    tree.set_fn_signature(function, sig);

    let local = tree.decl_local(
        sp(4),
        "tmp",
        Storage::new(prelude.int(), 1, Quals::MUTABLE),
        prelude.int(),
    );
    tree.add_local(function, local);
    tree.close_function(function, None);

    assert_eq!(tree.fn_get_params(function), &[a]);
    assert_eq!(tree.fn_get_locals(function), &[local]);
}

#[test]
fn test_partial_becomes_struct() {
    let (mut tree, prelude, module) = setup();
    let partial = tree.open_decl(sp(1), "point", noop(module));
    let ptr = tree.type_pointer(sp(2), "", partial, None);
    assert!(matches!(tree.get_kind(partial), NodeKind::Partial));

    let x = tree.decl_field(sp(3), "x", prelude.int());
    let next = tree.decl_field(sp(4), "next", ptr);
    let body = tree.decl_struct(sp(5), "", &[x, next]);
    tree.close_decl(partial, body);

    assert!(matches!(tree.get_kind(partial), NodeKind::TypeStruct { .. }));
    assert_eq!(tree.get_name(partial), "point");
    assert_eq!(tree.ty_get_field(partial, "next"), Some(next));
    // References made while open now see the struct.
    assert_eq!(tree.ty_load_type(ptr), partial);
    assert!(!tree.is_open(partial));
}

#[test]
fn test_partial_closed_with_error_is_self_typed() {
    let (mut tree, _, module) = setup();
    let partial = tree.open_decl(sp(1), "bad", noop(module));
    let error = tree.error(sp(2), ErrorCode::E1001, "type `missing` not found");
    tree.close_decl(partial, error);
    assert!(tree.is_error(partial));
    assert_eq!(tree.get_type(partial), partial);
    assert_eq!(tree.get_name(partial), "type `missing` not found");
}

#[test]
fn test_struct_open_close() {
    let (mut tree, prelude, module) = setup();
    let point = tree.open_struct(sp(1), "point", noop(module));
    let x = tree.decl_field(sp(2), "x", prelude.int());
    tree.close_struct(point, &[x]);
    assert_eq!(tree.ty_get_field(point, "x"), Some(x));
    assert_eq!(tree.ty_get_field(point, "y"), None);
}

#[test]
fn test_union_decl() {
    let (mut tree, prelude, _) = setup();
    let a = tree.decl_field(sp(1), "a", prelude.int());
    let b = tree.decl_field(sp(2), "b", prelude.bool);
    let either = tree.decl_union(sp(3), "either", &[a, b]);
    assert_eq!(tree.ty_get_field(either, "b"), Some(b));
}

#[test]
#[should_panic(expected = "expected field")]
fn test_struct_rejects_param_members() {
    let (mut tree, prelude, _) = setup();
    let a = tree.decl_param(sp(1), "a", prelude.int());
    tree.decl_struct(sp(2), "bad", &[a]);
}

#[test]
fn test_enum_cases() {
    let (mut tree, prelude, _) = setup();
    let zero = tree.expr_digit(sp(1), prelude.int(), 0);
    let one = tree.expr_digit(sp(2), prelude.int(), 1);
    let red = tree.decl_case(sp(3), "red", zero);
    let green = tree.decl_case(sp(4), "green", one);
    let colour = tree.decl_enum(sp(5), "colour", prelude.int(), &[red, green], None);

    assert_eq!(tree.enum_get_cases(colour), &[red, green]);
    assert_eq!(tree.ty_get_case(colour, "green"), Some(green));
    assert_eq!(tree.enum_get_underlying(colour), Some(prelude.int()));
    assert_eq!(tree.get_type(red), prelude.int());
}

#[test]
#[should_panic(expected = "underlying digit type")]
fn test_enum_rejects_bool_underlying() {
    let (mut tree, prelude, _) = setup();
    tree.decl_enum(sp(1), "flag", prelude.bool, &[], None);
}

#[test]
fn test_attribs_and_quals() {
    let (mut tree, prelude, _) = setup();
    let storage = Storage::new(prelude.int(), 1, Quals::CONST);
    let global = tree.decl_global(sp(1), "g", storage, prelude.int(), None);
    assert_eq!(tree.get_attrib(global), &Attribs::DEFAULT);

    let attribs = Attribs::new(crate::Link::Export, crate::Visibility::Public)
        .with_mangle("g_export");
    tree.set_attrib(global, attribs.clone());
    tree.set_qualifiers(global, Quals::VOLATILE);
    assert_eq!(tree.get_attrib(global), &attribs);
    assert!(tree.has_vis(global, crate::Visibility::Public));
    assert_eq!(tree.get_quals(global), Quals::VOLATILE);
}

#[test]
#[should_panic(expected = "both const and mutable")]
fn test_inconsistent_storage_quals() {
    let (mut tree, prelude, _) = setup();
    let storage = Storage::new(prelude.int(), 1, Quals::CONST | Quals::MUTABLE);
    let global = tree.decl_global(sp(1), "g", storage, prelude.int(), None);
    tree.get_storage_quals(global);
}

#[test]
fn test_alias_is_renamed_copy() {
    let (mut tree, prelude, _) = setup();
    let alias = tree.alias(prelude.int(), "i32");
    assert_ne!(alias, prelude.int());
    assert_eq!(tree.get_name(alias), "i32");
    assert_eq!(tree.get_name(prelude.int()), "int");
    assert!(tree.types_equal(alias, prelude.int()));
}

#[test]
fn test_decl_attrib() {
    let (mut tree, _, _) = setup();
    let attrib = tree.decl_attrib(sp(1), "deprecated");
    assert!(matches!(tree.get_kind(attrib), NodeKind::DeclAttrib));
    assert_eq!(tree.get_name(attrib), "deprecated");
}

#[test]
fn test_resolve_runs_close() {
    let mut cx = TreeContext::default();
    let prelude = Prelude::new(&mut cx.tree);
    let module = cx.tree.module(sp(0), "m", None, crate::Tag::CORE_COUNT);
    let int = prelude.int();
    let info = ResolveInfo::new(module, move |cx, _, decl| {
        cx.tree
            .set_storage(decl, Storage::new(int, 1, Quals::CONST));
        let init = cx.tree.expr_digit(Span::DUMMY, int, 7);
        cx.tree.close_global(decl, Some(init));
    });
    let global = cx.tree.open_global(sp(1), "g", Some(int), info);
    assert_eq!(cx.resolve(global), global);
    assert!(!cx.tree.is_open(global));
    assert!(cx.tree.global_get_init(global).is_some());
}
