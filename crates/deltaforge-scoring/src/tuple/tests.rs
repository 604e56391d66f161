use std::rc::Rc;

use smallvec::smallvec;

use super::*;
use crate::error::ProtocolViolation;
use crate::fact::FactRef;
use crate::node::NodeId;

fn facts(values: &[i32]) -> TupleFacts {
    values.iter().map(|v| Rc::new(*v) as FactRef).collect()
}

#[test]
fn test_create_starts_in_creating() {
    let mut arena = TupleArena::new();
    let id = arena.create(NodeId(0), facts(&[1, 2]));

    let tuple = arena.get(id).unwrap();
    assert_eq!(tuple.state(), TupleState::Creating);
    assert_eq!(tuple.arity(), 2);
    assert_eq!(tuple.fact_as::<i32>(1), Some(&2));
    assert_eq!(tuple.owner(), NodeId(0));
    assert_eq!(arena.len(), 1);
}

#[test]
fn test_released_handle_is_stale() {
    let mut arena = TupleArena::new();
    let first = arena.create(NodeId(0), facts(&[1]));
    arena.release(first).unwrap();

    // The slot is recycled under a new generation.
    let second = arena.create(NodeId(0), facts(&[2]));
    assert_ne!(first, second);
    assert!(matches!(arena.get(first), Err(ProtocolViolation::StaleTuple(id)) if id == first));
    assert!(arena.release(first).is_err());
    assert_eq!(arena.get(second).unwrap().fact_as::<i32>(0), Some(&2));
    assert_eq!(arena.len(), 1);
}

#[test]
fn test_iter_visits_live_tuples_only() {
    let mut arena = TupleArena::new();
    let a = arena.create(NodeId(1), smallvec![Rc::new("a") as FactRef]);
    let b = arena.create(NodeId(1), smallvec![Rc::new("b") as FactRef]);
    arena.release(a).unwrap();

    let ids: Vec<_> = arena.iter().map(|(id, _)| id).collect();
    assert_eq!(ids, vec![b]);
}

#[test]
fn test_state_helpers() {
    assert!(TupleState::Creating.is_active());
    assert!(TupleState::Updating.is_active());
    assert!(!TupleState::Dying.is_active());
    assert!(!TupleState::Aborting.is_active());

    assert!(!TupleState::Ok.is_dirty());
    assert!(!TupleState::Dead.is_dirty());
    assert!(TupleState::Aborting.is_dirty());
}
