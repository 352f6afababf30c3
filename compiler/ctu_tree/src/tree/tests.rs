use super::*;
use crate::ops::Quals;
use crate::{Prelude, Storage};
use pretty_assertions::assert_eq;

fn sp(start: u32) -> Span {
    Span::new(start, start + 1)
}

fn setup() -> (Tree, Prelude) {
    let mut tree = Tree::new();
    let prelude = Prelude::new(&mut tree);
    (tree, prelude)
}

#[test]
fn test_error_is_self_typed() {
    let mut tree = Tree::new();
    let error = tree.error(sp(1), ErrorCode::E1001, "decl `x` not found");
    assert_eq!(tree.get_type(error), error);
    assert!(tree.is_error(error));
}

#[test]
fn test_named_and_anonymous_types() {
    let mut tree = Tree::new();
    let named = tree.type_bool(sp(0), "bool");
    let anon = tree.type_bool(sp(0), "");
    assert_eq!(tree.get_name(named), "bool");
    assert_eq!(tree.get_name(anon), crate::ANONYMOUS);
    assert!(tree.name_of(anon).is_none());
}

#[test]
fn test_literal_types() {
    let (mut tree, prelude) = setup();
    let one = tree.expr_digit(sp(0), prelude.int(), 1);
    let yes = tree.expr_bool(sp(1), prelude.bool, true);
    assert_eq!(tree.get_type(one), prelude.int());
    assert_eq!(tree.get_type(yes), prelude.bool);
    assert!(matches!(tree.get_kind(one), NodeKind::ExprDigit(1)));
}

#[test]
#[should_panic(expected = "bool literal must have a bool type")]
fn test_bool_literal_rejects_digit_type() {
    let (mut tree, prelude) = setup();
    tree.expr_bool(sp(0), prelude.int(), true);
}

#[test]
fn test_load_through_pointer() {
    let (mut tree, prelude) = setup();
    let ptr = tree.type_pointer(sp(0), "", prelude.int(), Some(1));
    let storage = Storage::new(prelude.int(), 1, Quals::MUTABLE);
    let global = tree.decl_global(sp(1), "g", storage, ptr, None);
    let load = tree.expr_load(sp(2), global);
    assert_eq!(tree.get_type(load), prelude.int());
}

#[test]
fn test_load_through_error_is_error() {
    let (mut tree, _) = setup();
    let error = tree.error(sp(0), ErrorCode::E1001, "missing");
    let load = tree.expr_load(sp(1), error);
    assert_eq!(tree.get_type(load), error);
}

#[test]
#[should_panic(expected = "load requires a pointer, array or reference")]
fn test_load_rejects_digit() {
    let (mut tree, prelude) = setup();
    let one = tree.expr_digit(sp(0), prelude.int(), 1);
    tree.expr_load(sp(1), one);
}

#[test]
fn test_address_of_value_points_at_value_type() {
    let (mut tree, prelude) = setup();
    let one = tree.expr_digit(sp(0), prelude.int(), 1);
    let addr = tree.expr_address(sp(1), one);
    let ty = tree.get_type(addr);
    assert!(matches!(
        tree.get_kind(ty),
        NodeKind::TypePointer { pointee, length: Some(1) } if *pointee == prelude.int()
    ));
}

#[test]
fn test_address_of_reference_strips_reference() {
    let (mut tree, prelude) = setup();
    let reference = tree.type_reference(sp(0), "", prelude.int());
    let storage = Storage::new(prelude.int(), 1, Quals::CONST);
    let global = tree.decl_global(sp(1), "r", storage, reference, None);
    let addr = tree.expr_address(sp(2), global);
    assert_eq!(tree.ty_load_type(tree.get_type(addr)), prelude.int());
}

#[test]
fn test_unary_takes_operand_type() {
    let (mut tree, prelude) = setup();
    let one = tree.expr_digit(sp(0), prelude.int(), 1);
    let neg = tree.expr_unary(sp(1), UnaryOp::Neg, one);
    assert_eq!(tree.get_type(neg), prelude.int());
}

#[test]
fn test_call_type_is_callee_return() {
    let (mut tree, prelude) = setup();
    let sig = tree.type_closure(sp(0), "", prelude.bool, &[], Arity::Fixed);
    let body = tree.stmt_block(sp(1), &[]);
    let function = tree.decl_function(sp(2), "f", sig, &[], Some(body));
    let call = tree.expr_call(sp(3), function, &[]);
    assert_eq!(tree.get_type(call), prelude.bool);
}

#[test]
fn test_call_through_error_callee() {
    let (mut tree, _) = setup();
    let error = tree.error(sp(0), ErrorCode::E1001, "decl `f` not found");
    let call = tree.expr_call(sp(1), error, &[]);
    assert_eq!(tree.get_type(call), error);
}

#[test]
fn test_statements_have_no_type() {
    let (mut tree, prelude) = setup();
    let one = tree.expr_digit(sp(0), prelude.int(), 1);
    let ret = tree.stmt_return(sp(1), one);
    let block = tree.stmt_block(sp(2), &[ret]);
    assert!(tree.try_get_type(ret).is_none());
    assert!(tree.try_get_type(block).is_none());
    assert!(tree.get_kind(block).is_stmt());
}

#[test]
fn test_assign_to_pointer_global() {
    let (mut tree, prelude) = setup();
    let ptr = tree.type_pointer(sp(0), "", prelude.int(), Some(1));
    let storage = Storage::new(prelude.int(), 1, Quals::MUTABLE);
    let global = tree.decl_global(sp(1), "g", storage, ptr, None);
    let one = tree.expr_digit(sp(2), prelude.int(), 1);
    let assign = tree.stmt_assign(sp(3), global, one);
    assert!(matches!(
        tree.get_kind(assign),
        NodeKind::StmtAssign { init: false, .. }
    ));
}

#[test]
#[should_panic(expected = "expected reference or pointer")]
fn test_assign_rejects_value_destination() {
    let (mut tree, prelude) = setup();
    let one = tree.expr_digit(sp(0), prelude.int(), 1);
    let two = tree.expr_digit(sp(1), prelude.int(), 2);
    tree.stmt_assign(sp(2), one, two);
}

#[test]
fn test_jump_targets_loop() {
    let (mut tree, prelude) = setup();
    let cond = tree.expr_bool(sp(0), prelude.bool, true);
    let body = tree.stmt_block(sp(1), &[]);
    let lp = tree.stmt_loop(sp(2), cond, body, None);
    let jump = tree.stmt_jump(sp(3), lp, JumpKind::Break);
    assert!(matches!(
        tree.get_kind(jump),
        NodeKind::StmtJump { kind: JumpKind::Break, .. }
    ));
}

#[test]
#[should_panic(expected = "label must be a loop")]
fn test_jump_rejects_block_label() {
    let (mut tree, _) = setup();
    let block = tree.stmt_block(sp(0), &[]);
    tree.stmt_jump(sp(1), block, JumpKind::Continue);
}

#[test]
#[should_panic(expected = "closure parameter must be a param")]
fn test_closure_rejects_field_params() {
    let (mut tree, prelude) = setup();
    let field = tree.decl_field(sp(0), "x", prelude.int());
    tree.type_closure(sp(1), "", prelude.unit, &[field], Arity::Fixed);
}

#[test]
#[should_panic(expected = "pointee must be a type")]
fn test_pointer_rejects_expression_pointee() {
    let (mut tree, prelude) = setup();
    let one = tree.expr_digit(sp(0), prelude.int(), 1);
    tree.type_pointer(sp(1), "", one, None);
}

#[test]
fn test_field_access_on_struct_pointer() {
    let (mut tree, prelude) = setup();
    let field = tree.decl_field(sp(0), "x", prelude.int());
    let point = tree.decl_struct(sp(1), "point", &[field]);
    let ptr = tree.type_pointer(sp(2), "", point, Some(1));
    let storage = Storage::new(point, 1, Quals::MUTABLE);
    let global = tree.decl_global(sp(3), "p", storage, ptr, None);
    let int_ref = tree.type_reference(sp(4), "", prelude.int());
    let access = tree.expr_field(sp(5), int_ref, global, field);
    assert_eq!(tree.get_type(access), int_ref);
}

#[test]
fn test_interner_shared_with_tree() {
    let tree = Tree::new();
    let name = tree.intern("main");
    assert_eq!(tree.interner().lookup(name), "main");
}
