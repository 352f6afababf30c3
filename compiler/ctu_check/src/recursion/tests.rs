#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use ctu_diagnostic::{Diagnostic, ErrorCode};
use ctu_tree::{BinaryOp, Quals, ResolveInfo, Storage, Tag, TreeId};
use pretty_assertions::assert_eq;

use crate::test_helpers::{codes, Fixture};

fn noop(fx: &Fixture) -> ResolveInfo {
    ResolveInfo::new(fx.module, |_, _, _| {})
}

/// Messages of the secondary labels, in order.
fn chain(diag: &Diagnostic) -> Vec<String> {
    diag.secondary_labels()
        .map(|label| label.message.clone())
        .collect()
}

// --- globals ---

fn open_global(fx: &mut Fixture, name: &str) -> TreeId {
    let span = fx.span();
    let ty = fx.int_ref();
    let info = noop(fx);
    let global = fx.tree.open_global(span, name, Some(ty), info);
    let int = fx.int();
    fx.tree
        .set_storage(global, Storage::new(int, 1, Quals::empty()));
    fx.tree.module_set(fx.module, Tag::VALUES, name, global);
    global
}

/// `load(global) + 1`
fn load_plus_one(fx: &mut Fixture, global: TreeId) -> TreeId {
    let span = fx.span();
    let load = fx.tree.expr_load(span, global);
    let one = fx.digit(1);
    let span = fx.span();
    let int = fx.int();
    fx.tree.expr_binary(span, int, BinaryOp::Add, load, one)
}

#[test]
fn test_mutually_recursive_globals() {
    let mut fx = Fixture::new();
    let a = open_global(&mut fx, "a");
    let b = open_global(&mut fx, "b");
    let a_init = load_plus_one(&mut fx, b);
    let b_init = load_plus_one(&mut fx, a);
    fx.tree.close_global(a, Some(a_init));
    fx.tree.close_global(b, Some(b_init));

    let diags = fx.check();
    assert_eq!(codes(&diags), vec![ErrorCode::RECURSIVE_EVAL]);
    assert_eq!(diags[0].message, "evaluation of `a` may be infinite");
    assert_eq!(diags[0].primary_span(), Some(fx.tree.get_span(a)));
    assert_eq!(chain(&diags[0]), vec!["call to `a`", "call to `b`"]);
}

#[test]
fn test_global_chain_without_cycle() {
    let mut fx = Fixture::new();
    let one = fx.digit(1);
    let a = fx.global("a", Some(one));
    let b_init = load_plus_one(&mut fx, a);
    fx.global("b", Some(b_init));

    assert_eq!(fx.check(), vec![]);
}

#[test]
fn test_self_referencing_global() {
    let mut fx = Fixture::new();
    let a = open_global(&mut fx, "a");
    let init = load_plus_one(&mut fx, a);
    fx.tree.close_global(a, Some(init));

    let diags = fx.check();
    assert_eq!(codes(&diags), vec![ErrorCode::RECURSIVE_EVAL]);
    assert_eq!(chain(&diags[0]), vec!["call to `a`"]);
}

#[test]
fn test_address_of_self_is_not_evaluation() {
    let mut fx = Fixture::new();
    let a = open_global(&mut fx, "a");
    let span = fx.span();
    let init = fx.tree.expr_address(span, a);
    fx.tree.close_global(a, Some(init));

    assert_eq!(fx.check(), vec![]);
}

#[test]
fn test_cycle_reached_from_outside_reports_only_the_cycle() {
    let mut fx = Fixture::new();
    let entry = open_global(&mut fx, "entry");
    let a = open_global(&mut fx, "a");
    let b = open_global(&mut fx, "b");
    let entry_init = load_plus_one(&mut fx, a);
    let a_init = load_plus_one(&mut fx, b);
    let b_init = load_plus_one(&mut fx, a);
    fx.tree.close_global(entry, Some(entry_init));
    fx.tree.close_global(a, Some(a_init));
    fx.tree.close_global(b, Some(b_init));

    let diags = fx.check();
    assert_eq!(codes(&diags), vec![ErrorCode::RECURSIVE_EVAL]);
    assert_eq!(chain(&diags[0]), vec!["call to `a`", "call to `b`"]);
}

// --- aggregates ---

fn field(fx: &mut Fixture, name: &str, ty: TreeId) -> TreeId {
    let span = fx.span();
    fx.tree.decl_field(span, name, ty)
}

fn open_struct(fx: &mut Fixture, name: &str) -> TreeId {
    let span = fx.span();
    let info = noop(fx);
    let ty = fx.tree.open_struct(span, name, info);
    fx.add_type(name, ty);
    ty
}

#[test]
fn test_struct_containing_itself() {
    let mut fx = Fixture::new();
    let a = open_struct(&mut fx, "A");
    let f = field(&mut fx, "f", a);
    fx.tree.close_struct(a, &[f]);

    let diags = fx.check();
    assert_eq!(codes(&diags), vec![ErrorCode::INFINITE_SIZED_TYPE]);
    assert_eq!(diags[0].message, "size of type `A` may be infinite");
}

#[test]
fn test_struct_pointing_at_itself() {
    let mut fx = Fixture::new();
    let a = open_struct(&mut fx, "A");
    let span = fx.span();
    let pointer = fx.tree.type_pointer(span, "", a, Some(1));
    let next = field(&mut fx, "next", pointer);
    fx.tree.close_struct(a, &[next]);

    assert_eq!(fx.check(), vec![]);
}

#[test]
fn test_mutually_containing_structs() {
    let mut fx = Fixture::new();
    let a = open_struct(&mut fx, "A");
    let b = open_struct(&mut fx, "B");
    let a_field = field(&mut fx, "b", b);
    let b_field = field(&mut fx, "a", a);
    fx.tree.close_struct(a, &[a_field]);
    fx.tree.close_struct(b, &[b_field]);

    let diags = fx.check();
    assert_eq!(codes(&diags), vec![ErrorCode::INFINITE_SIZED_TYPE]);
    assert_eq!(chain(&diags[0]), vec!["call to `A`", "call to `B`"]);
}

#[test]
fn test_struct_containing_array_of_itself() {
    let mut fx = Fixture::new();
    let a = open_struct(&mut fx, "A");
    let span = fx.span();
    let array = fx.tree.type_array(span, "", a, Some(4));
    let items = field(&mut fx, "items", array);
    fx.tree.close_struct(a, &[items]);

    assert_eq!(codes(&fx.check()), vec![ErrorCode::INFINITE_SIZED_TYPE]);
}

#[test]
fn test_union_containing_itself_through_alias() {
    let mut fx = Fixture::new();
    let span = fx.span();
    let info = noop(&fx);
    let u = fx.tree.open_union(span, "U", info);
    fx.add_type("U", u);
    let span = fx.span();
    let alias = fx.tree.type_alias(span, "Same", u);
    let inner = field(&mut fx, "inner", alias);
    fx.tree.close_union(u, &[inner]);

    assert_eq!(codes(&fx.check()), vec![ErrorCode::INFINITE_SIZED_TYPE]);
}

// --- types ---

fn open_partial(fx: &mut Fixture, name: &str) -> TreeId {
    let span = fx.span();
    let info = noop(fx);
    let ty = fx.tree.open_decl(span, name, info);
    fx.add_type(name, ty);
    ty
}

#[test]
fn test_pointer_to_itself_is_impossible() {
    let mut fx = Fixture::new();
    let p = open_partial(&mut fx, "P");
    let span = fx.span();
    let pointer = fx.tree.type_pointer(span, "", p, Some(1));
    fx.tree.close_decl(p, pointer);

    let diags = fx.check();
    assert_eq!(codes(&diags), vec![ErrorCode::INVALID_TYPE]);
    assert_eq!(diags[0].message, "type `P` contains an impossible type");
    assert_eq!(chain(&diags[0]), vec!["call to `P`"]);
}

#[test]
fn test_alias_cycle_is_impossible() {
    let mut fx = Fixture::new();
    let a = open_partial(&mut fx, "A");
    let b = open_partial(&mut fx, "B");
    let span = fx.span();
    let to_b = fx.tree.type_alias(span, "", b);
    let span = fx.span();
    let to_a = fx.tree.type_alias(span, "", a);
    fx.tree.close_decl(a, to_b);
    fx.tree.close_decl(b, to_a);

    let diags = fx.check();
    assert_eq!(codes(&diags), vec![ErrorCode::INVALID_TYPE]);
    assert_eq!(chain(&diags[0]), vec!["call to `A`", "call to `B`"]);
}

#[test]
fn test_field_through_alias_cycle_terminates() {
    let mut fx = Fixture::new();
    let s = open_struct(&mut fx, "S");
    let a = open_partial(&mut fx, "A");
    let b = open_partial(&mut fx, "B");
    let span = fx.span();
    let to_a = fx.tree.type_alias(span, "", a);
    fx.tree.close_decl(b, to_a);
    let span = fx.span();
    let to_b = fx.tree.type_alias(span, "", b);
    fx.tree.close_decl(a, to_b);
    let f = field(&mut fx, "f", a);
    fx.tree.close_struct(s, &[f]);

    let diags = fx.check();
    assert_eq!(codes(&diags), vec![ErrorCode::INVALID_TYPE]);
    assert_eq!(diags[0].message, "type `A` contains an impossible type");
    assert_eq!(chain(&diags[0]), vec!["call to `A`", "call to `B`"]);
}

#[test]
fn test_array_of_itself_outside_aggregate_terminates() {
    let mut fx = Fixture::new();
    let s = open_struct(&mut fx, "S");
    let items = open_partial(&mut fx, "Items");
    let span = fx.span();
    let array = fx.tree.type_array(span, "", items, Some(2));
    fx.tree.close_decl(items, array);
    let f = field(&mut fx, "items", items);
    fx.tree.close_struct(s, &[f]);

    assert_eq!(codes(&fx.check()), vec![ErrorCode::INVALID_TYPE]);
}

#[test]
fn test_closure_returning_itself_is_impossible() {
    let mut fx = Fixture::new();
    let f = open_partial(&mut fx, "F");
    let sig = fx.signature(f, &[], ctu_tree::Arity::Fixed);
    fx.tree.close_decl(f, sig);

    assert_eq!(codes(&fx.check()), vec![ErrorCode::INVALID_TYPE]);
}

#[test]
fn test_pointer_through_struct_is_fine() {
    let mut fx = Fixture::new();
    let node = open_struct(&mut fx, "Node");
    let span = fx.span();
    let link = fx.tree.type_pointer(span, "Link", node, None);
    fx.add_type("Link", link);
    let next = field(&mut fx, "next", link);
    fx.tree.close_struct(node, &[next]);

    assert_eq!(fx.check(), vec![]);
}

#[test]
fn test_unresolved_type_is_reported() {
    let mut fx = Fixture::new();
    open_partial(&mut fx, "Pending");

    let diags = fx.check();
    assert_eq!(codes(&diags), vec![ErrorCode::E9001]);
    assert_eq!(diags[0].message, "declaration `Pending` was never resolved");
}

#[test]
fn test_pointer_walk_does_not_hide_infinite_struct() {
    let mut fx = Fixture::new();
    let span = fx.span();
    let info = noop(&fx);
    let a = fx.tree.open_struct(span, "A", info);
    let span = fx.span();
    let pointer = fx.tree.type_pointer(span, "APtr", a, Some(1));
    fx.add_type("APtr", pointer);
    fx.add_type("A", a);
    let f = field(&mut fx, "f", a);
    fx.tree.close_struct(a, &[f]);

    assert_eq!(codes(&fx.check()), vec![ErrorCode::INFINITE_SIZED_TYPE]);
}
