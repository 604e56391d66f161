use std::fmt;

use super::{Tuple, TupleFacts, TupleState, ValuePool};
use crate::error::ProtocolViolation;
use crate::node::NodeId;

/// Generational handle into a [`TupleArena`].
///
/// Handles order by slot then generation, which keeps every map keyed by
/// them iterating in a reproducible order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TupleId {
    slot: u32,
    generation: u32,
}

impl fmt::Display for TupleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}v{}", self.slot, self.generation)
    }
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    tuple: Option<Tuple>,
}

/// Storage for every tuple of one session.
///
/// Released slots are recycled with a bumped generation, so a handle that
/// outlives its tuple is reported as stale instead of aliasing a newer one.
#[derive(Debug, Default)]
pub struct TupleArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
    pub(crate) values: ValuePool,
}

impl TupleArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn create(&mut self, owner: NodeId, facts: TupleFacts) -> TupleId {
        let tuple = Tuple::new(owner, facts);
        self.live += 1;
        match self.free.pop() {
            Some(slot) => {
                let entry = &mut self.slots[slot as usize];
                entry.tuple = Some(tuple);
                TupleId {
                    slot,
                    generation: entry.generation,
                }
            }
            None => {
                let slot = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    tuple: Some(tuple),
                });
                TupleId {
                    slot,
                    generation: 0,
                }
            }
        }
    }

    pub fn get(&self, id: TupleId) -> Result<&Tuple, ProtocolViolation> {
        self.slots
            .get(id.slot as usize)
            .filter(|entry| entry.generation == id.generation)
            .and_then(|entry| entry.tuple.as_ref())
            .ok_or(ProtocolViolation::StaleTuple(id))
    }

    pub(crate) fn get_mut(&mut self, id: TupleId) -> Result<&mut Tuple, ProtocolViolation> {
        self.slots
            .get_mut(id.slot as usize)
            .filter(|entry| entry.generation == id.generation)
            .and_then(|entry| entry.tuple.as_mut())
            .ok_or(ProtocolViolation::StaleTuple(id))
    }

    pub(crate) fn state(&self, id: TupleId) -> Result<TupleState, ProtocolViolation> {
        self.get(id).map(Tuple::state)
    }

    pub(crate) fn set_state(&mut self, id: TupleId, state: TupleState) -> Result<(), ProtocolViolation> {
        self.get_mut(id).map(|tuple| tuple.set_state(state))
    }

    /// Frees the slot of a dead tuple.
    pub(crate) fn release(&mut self, id: TupleId) -> Result<Tuple, ProtocolViolation> {
        let entry = self
            .slots
            .get_mut(id.slot as usize)
            .filter(|entry| entry.generation == id.generation)
            .ok_or(ProtocolViolation::StaleTuple(id))?;
        let tuple = entry.tuple.take().ok_or(ProtocolViolation::StaleTuple(id))?;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(id.slot);
        self.live -= 1;
        Ok(tuple)
    }

    /// Number of tuples currently allocated.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (TupleId, &Tuple)> {
        self.slots.iter().enumerate().filter_map(|(slot, entry)| {
            entry.tuple.as_ref().map(|tuple| {
                (
                    TupleId {
                        slot: slot as u32,
                        generation: entry.generation,
                    },
                    tuple,
                )
            })
        })
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.live = 0;
        self.values.clear();
    }
}
