use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use smallvec::smallvec;

use super::*;
use crate::collector::count;
use crate::collector::erased::CollectorAdapter;
use crate::error::ProtocolViolation;
use crate::index::EqualKey;
use crate::tuple::{TupleArena, TupleId, TupleState};

#[derive(Debug)]
struct Slot {
    value: Cell<i32>,
}

fn slot(value: i32) -> Rc<Slot> {
    Rc::new(Slot { value: Cell::new(value) })
}

const PARENT: NodeId = NodeId(0);
const NODE: NodeId = NodeId(1);

/// Creates an upstream tuple holding one fact.
fn source(arena: &mut TupleArena, fact: &Rc<Slot>) -> TupleId {
    let fact: FactRef = fact.clone();
    let id = arena.create(PARENT, smallvec![fact]);
    arena.set_state(id, TupleState::Ok).unwrap();
    id
}

#[derive(Debug, Default)]
struct Drained {
    retracted: Vec<TupleId>,
    updated: Vec<TupleId>,
    inserted: Vec<TupleId>,
}

/// Runs the three phases of one queue the way the network does, without
/// forwarding anything.
fn drain(queue: &mut PropagationQueue, arena: &mut TupleArena) -> Drained {
    let mut drained = Drained::default();
    for id in queue.take(Phase::Retract) {
        arena.set_state(id, TupleState::Dead).unwrap();
        arena.release(id).unwrap();
        drained.retracted.push(id);
    }
    for id in queue.take(Phase::Update) {
        if arena.state(id).ok() == Some(TupleState::Updating) {
            arena.set_state(id, TupleState::Ok).unwrap();
            drained.updated.push(id);
        }
    }
    for id in queue.take(Phase::Insert) {
        match arena.state(id).unwrap() {
            TupleState::Creating => {
                arena.set_state(id, TupleState::Ok).unwrap();
                drained.inserted.push(id);
            }
            TupleState::Aborting => {
                arena.set_state(id, TupleState::Dead).unwrap();
                arena.release(id).unwrap();
            }
            _ => {}
        }
    }
    drained
}

fn value_key() -> TupleKeyFn {
    Arc::new(|tuple: &Tuple| tuple.fact_as::<Slot>(0).map(|slot| EqualKey::new(slot.value.get())))
}

fn equal_def() -> JoinDef {
    JoinDef {
        left: KeyExtractor {
            equal: vec![value_key()],
            comparison: None,
        },
        right: KeyExtractor {
            equal: vec![value_key()],
            comparison: None,
        },
        comparison: None,
        filter: None,
    }
}

// ============================================================================
// PropagationQueue
// ============================================================================

#[test]
fn test_queue_insert_then_retract_aborts() {
    let mut arena = TupleArena::new();
    let mut queue = PropagationQueue::default();

    let id = queue.insert(&mut arena, NODE, smallvec![]);
    queue.retract(&mut arena, id).unwrap();
    assert_eq!(arena.state(id).unwrap(), TupleState::Aborting);
    assert_eq!(queue.pending(), Some(id));

    let drained = drain(&mut queue, &mut arena);
    assert!(drained.inserted.is_empty());
    assert!(drained.retracted.is_empty());
    assert!(arena.is_empty());
    assert_eq!(queue.pending(), None);
}

#[test]
fn test_queue_update_enqueues_once() {
    let mut arena = TupleArena::new();
    let mut queue = PropagationQueue::default();
    let id = queue.insert(&mut arena, NODE, smallvec![]);

    // Updates while still creating are absorbed by the pending insert.
    queue.update(&mut arena, id).unwrap();
    assert_eq!(drain(&mut queue, &mut arena).inserted, vec![id]);

    queue.update(&mut arena, id).unwrap();
    queue.update(&mut arena, id).unwrap();
    assert_eq!(arena.state(id).unwrap(), TupleState::Updating);
    assert_eq!(drain(&mut queue, &mut arena).updated, vec![id]);
}

#[test]
fn test_queue_rejects_retract_of_dying_tuple() {
    let mut arena = TupleArena::new();
    let mut queue = PropagationQueue::default();
    let id = queue.insert(&mut arena, NODE, smallvec![]);
    drain(&mut queue, &mut arena);

    queue.retract(&mut arena, id).unwrap();
    let err = queue.retract(&mut arena, id).unwrap_err();
    assert!(matches!(
        err,
        NetworkError::Protocol(ProtocolViolation::IllegalTransition {
            from: TupleState::Dying,
            operation: "retract",
            ..
        })
    ));
}

// ============================================================================
// Join
// ============================================================================

#[test]
fn test_join_pairs_follow_key_changes() {
    let def = equal_def();
    let mut arena = TupleArena::new();
    let mut join = JoinState::new(&def);

    let a = slot(1);
    let b = slot(1);
    let c = slot(2);
    let ta = source(&mut arena, &a);
    let tb = source(&mut arena, &b);
    let tc = source(&mut arena, &c);

    join.insert(NODE, &def, &mut arena, Side::Left, ta).unwrap();
    join.insert(NODE, &def, &mut arena, Side::Right, tb).unwrap();
    join.insert(NODE, &def, &mut arena, Side::Right, tc).unwrap();
    let first = drain(&mut join.queue, &mut arena);
    assert_eq!(first.inserted.len(), 1);
    let ab = arena.get(first.inserted[0]).unwrap();
    assert_eq!(ab.arity(), 2);
    assert!(std::ptr::eq(ab.fact_as::<Slot>(1).unwrap(), &*b));

    c.value.set(1);
    join.update(NODE, &def, &mut arena, Side::Right, tc).unwrap();
    assert_eq!(drain(&mut join.queue, &mut arena).inserted.len(), 1);

    a.value.set(7);
    join.update(NODE, &def, &mut arena, Side::Left, ta).unwrap();
    let moved = drain(&mut join.queue, &mut arena);
    assert_eq!(moved.retracted.len(), 2);
    assert!(moved.inserted.is_empty());
}

#[test]
fn test_join_rejects_double_insert() {
    let def = equal_def();
    let mut arena = TupleArena::new();
    let mut join = JoinState::new(&def);
    let ta = source(&mut arena, &slot(1));

    join.insert(NODE, &def, &mut arena, Side::Left, ta).unwrap();
    let err = join.insert(NODE, &def, &mut arena, Side::Left, ta).unwrap_err();
    assert!(matches!(err, NetworkError::Protocol(ProtocolViolation::DoubleInsert { .. })));
}

// ============================================================================
// Exists
// ============================================================================

#[test]
fn test_if_not_exists_propagates_only_transitions() {
    let def = equal_def();
    let mut arena = TupleArena::new();
    let mut exists = ExistsState::new(&def, false);

    let ta = source(&mut arena, &slot(1));
    let tb = source(&mut arena, &slot(1));
    let tc = source(&mut arena, &slot(1));

    exists.insert(NODE, &def, &mut arena, Side::Left, ta).unwrap();
    assert_eq!(drain(&mut exists.queue, &mut arena).inserted.len(), 1);

    exists.insert(NODE, &def, &mut arena, Side::Right, tb).unwrap();
    assert_eq!(drain(&mut exists.queue, &mut arena).retracted.len(), 1);

    // Second and third partners coming and going are silent.
    exists.insert(NODE, &def, &mut arena, Side::Right, tc).unwrap();
    exists.retract(NODE, &mut arena, Side::Right, tb).unwrap();
    assert_eq!(exists.queue.pending(), None);

    exists.retract(NODE, &mut arena, Side::Right, tc).unwrap();
    assert_eq!(drain(&mut exists.queue, &mut arena).inserted.len(), 1);
}

// ============================================================================
// Group
// ============================================================================

#[test]
fn test_group_counts_and_disappears_when_emptied() {
    let def = GroupDef {
        key: Some(value_key()),
        collector: Some(Arc::new(CollectorAdapter::uni::<Slot, _>(count::<Slot>()))),
    };
    let mut arena = TupleArena::new();
    let mut group = GroupState::default();

    let ta = source(&mut arena, &slot(3));
    let tb = source(&mut arena, &slot(3));
    group.insert(NODE, &def, &mut arena, ta).unwrap();
    group.insert(NODE, &def, &mut arena, tb).unwrap();

    let inserted = drain(&mut group.queue, &mut arena).inserted;
    assert_eq!(inserted.len(), 1);
    let out = inserted[0];
    group.refresh(&def, &mut arena, out).unwrap();
    let tuple = arena.get(out).unwrap();
    assert_eq!(tuple.fact_as::<i32>(0), Some(&3));
    assert_eq!(tuple.fact_as::<usize>(1), Some(&2));

    group.retract(NODE, &mut arena, ta).unwrap();
    assert_eq!(drain(&mut group.queue, &mut arena).updated, vec![out]);
    group.refresh(&def, &mut arena, out).unwrap();
    assert_eq!(arena.get(out).unwrap().fact_as::<usize>(1), Some(&1));

    group.retract(NODE, &mut arena, tb).unwrap();
    assert_eq!(drain(&mut group.queue, &mut arena).retracted, vec![out]);
}

#[test]
fn test_group_moves_tuple_between_keys() {
    let def = GroupDef {
        key: Some(value_key()),
        collector: None,
    };
    let mut arena = TupleArena::new();
    let mut group = GroupState::default();

    let a = slot(1);
    let ta = source(&mut arena, &a);
    group.insert(NODE, &def, &mut arena, ta).unwrap();
    let old = drain(&mut group.queue, &mut arena).inserted;

    a.value.set(2);
    group.update(NODE, &def, &mut arena, ta).unwrap();
    let moved = drain(&mut group.queue, &mut arena);
    assert_eq!(moved.retracted, old);
    assert_eq!(moved.inserted.len(), 1);
}

// ============================================================================
// Distinct, concat, flatten
// ============================================================================

#[test]
fn test_distinct_keeps_group_until_last_duplicate() {
    let mut arena = TupleArena::new();
    let mut distinct = DistinctState::default();
    let shared = slot(1);
    let first = source(&mut arena, &shared);
    let second = source(&mut arena, &shared);

    distinct.insert(NODE, &mut arena, first).unwrap();
    distinct.insert(NODE, &mut arena, second).unwrap();
    assert_eq!(drain(&mut distinct.queue, &mut arena).inserted.len(), 1);

    // Only the representative forwards updates.
    distinct.update(NODE, &mut arena, second).unwrap();
    assert_eq!(distinct.queue.pending(), None);

    distinct.retract(NODE, &mut arena, first).unwrap();
    assert_eq!(distinct.queue.pending(), None);
    distinct.retract(NODE, &mut arena, second).unwrap();
    assert_eq!(drain(&mut distinct.queue, &mut arena).retracted.len(), 1);
}

#[test]
fn test_concat_keeps_sides_apart() {
    let mut arena = TupleArena::new();
    let mut concat = ConcatState::default();
    let shared = source(&mut arena, &slot(1));

    concat.insert(NODE, &mut arena, Side::Left, shared).unwrap();
    concat.insert(NODE, &mut arena, Side::Right, shared).unwrap();
    assert_eq!(drain(&mut concat.queue, &mut arena).inserted.len(), 2);

    concat.retract(NODE, &mut arena, Side::Right, shared).unwrap();
    assert_eq!(drain(&mut concat.queue, &mut arena).retracted.len(), 1);
    let err = concat.retract(NODE, &mut arena, Side::Right, shared).unwrap_err();
    assert!(matches!(
        err,
        NetworkError::Protocol(ProtocolViolation::RetractWithoutInsert { .. })
    ));
}

#[derive(Debug)]
struct Bag {
    items: RefCell<Vec<FactRef>>,
}

#[test]
fn test_flatten_updates_in_place_or_replaces() {
    let def = FlattenDef {
        expander: Arc::new(|tuple: &Tuple| tuple.fact_as::<Bag>(0).map(|bag| bag.items.borrow().clone())),
    };
    let one: FactRef = Rc::new(1);
    let two: FactRef = Rc::new(2);
    let bag = Rc::new(Bag {
        items: RefCell::new(vec![one.clone(), two]),
    });
    let mut arena = TupleArena::new();
    let parent: FactRef = bag.clone();
    let tuple = arena.create(PARENT, smallvec![parent]);
    let mut flatten = FlattenState::default();

    flatten.insert(NODE, &def, &mut arena, tuple).unwrap();
    let children = drain(&mut flatten.queue, &mut arena).inserted;
    assert_eq!(children.len(), 2);

    flatten.update(NODE, &def, &mut arena, tuple).unwrap();
    assert_eq!(drain(&mut flatten.queue, &mut arena).updated, children);

    *bag.items.borrow_mut() = vec![one];
    flatten.update(NODE, &def, &mut arena, tuple).unwrap();
    let replaced = drain(&mut flatten.queue, &mut arena);
    assert_eq!(replaced.retracted, children);
    assert_eq!(replaced.inserted.len(), 1);
}
