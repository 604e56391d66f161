use std::collections::HashMap;

use super::{NodeId, PropagationQueue, Side};
use crate::error::{NetworkError, ProtocolViolation};
use crate::tuple::{TupleArena, TupleId};

/// Union of two streams of the same shape, duplicates kept.
#[derive(Default)]
pub(crate) struct ConcatState {
    outs: HashMap<(Side, TupleId), TupleId>,
    pub queue: PropagationQueue,
}

impl ConcatState {
    pub fn insert(&mut self, id: NodeId, arena: &mut TupleArena, side: Side, tuple: TupleId) -> Result<(), NetworkError> {
        if self.outs.contains_key(&(side, tuple)) {
            return Err(ProtocolViolation::DoubleInsert { node: id, tuple }.into());
        }
        let facts = arena.get(tuple)?.facts().iter().cloned().collect();
        let out = self.queue.insert(arena, id, facts);
        self.outs.insert((side, tuple), out);
        Ok(())
    }

    pub fn update(&mut self, id: NodeId, arena: &mut TupleArena, side: Side, tuple: TupleId) -> Result<(), NetworkError> {
        let out = *self
            .outs
            .get(&(side, tuple))
            .ok_or(ProtocolViolation::UpdateWithoutInsert { node: id, tuple })?;
        let facts = arena.get(tuple)?.facts().iter().cloned().collect();
        arena.get_mut(out)?.set_facts(facts);
        self.queue.update(arena, out)
    }

    pub fn retract(&mut self, id: NodeId, arena: &mut TupleArena, side: Side, tuple: TupleId) -> Result<(), NetworkError> {
        let out = self
            .outs
            .remove(&(side, tuple))
            .ok_or(ProtocolViolation::RetractWithoutInsert { node: id, tuple })?;
        self.queue.retract(arena, out)
    }
}
