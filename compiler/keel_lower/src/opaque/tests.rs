use pretty_assertions::assert_eq;

use super::*;

#[test]
fn indices_count_live_bindings() {
    let mut table = OpaqueNameTable::new();
    let outer = ExprId::new(10);
    let inner = ExprId::new(20);
    assert_eq!(table.fresh(outer, Span::DUMMY), Ok(0));
    assert_eq!(table.fresh(inner, Span::DUMMY), Ok(1));
    assert_eq!(table.find(outer), Some(0));
    assert_eq!(table.find(inner), Some(1));
    table.release(inner);
    table.release(outer);
    assert_eq!(table.live(), 0);
    assert_eq!(table.find(outer), None);
}

#[test]
fn rebinding_a_live_node_is_fatal() {
    let mut table = OpaqueNameTable::new();
    let node = ExprId::new(3);
    table.fresh(node, Span::DUMMY).ok();
    let err = table.fresh(node, Span::new(4, 9));
    assert_eq!(
        err,
        Err(LowerError::OpaqueRebound {
            expr: node,
            span: Span::new(4, 9)
        })
    );
}

#[test]
fn released_nodes_can_be_bound_again() {
    let mut table = OpaqueNameTable::new();
    let node = ExprId::new(3);
    assert_eq!(table.fresh(node, Span::DUMMY), Ok(0));
    table.release(node);
    assert_eq!(table.fresh(node, Span::DUMMY), Ok(0));
}

#[test]
fn nesting_counter_is_scoped() {
    let mut table = OpaqueNameTable::new();
    assert_eq!(table.depth(), 0);
    table.enter_nesting();
    table.enter_nesting();
    assert_eq!(table.depth(), 2);
    table.exit_nesting();
    assert_eq!(table.depth(), 1);
    table.exit_nesting();
    table.exit_nesting();
    assert_eq!(table.depth(), 0);
}
