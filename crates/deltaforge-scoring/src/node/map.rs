use std::collections::HashMap;

use smallvec::smallvec;

use super::{NodeId, PropagationQueue, TupleExpander, TupleKeyFn};
use crate::error::{NetworkError, ProtocolViolation};
use crate::fact::FactId;
use crate::index::EqualKey;
use crate::tuple::{TupleArena, TupleId};

pub(crate) struct MapDef {
    pub mapper: TupleKeyFn,
}

/// One output tuple per input tuple, holding the mapped value.
///
/// Mapped values come from the session's value pool, so every output
/// holding an equal value holds the same fact.
#[derive(Default)]
pub(crate) struct MapState {
    outs: HashMap<TupleId, (TupleId, EqualKey)>,
    pub queue: PropagationQueue,
}

impl MapState {
    pub fn insert(&mut self, id: NodeId, def: &MapDef, arena: &mut TupleArena, tuple: TupleId) -> Result<(), NetworkError> {
        if self.outs.contains_key(&tuple) {
            return Err(ProtocolViolation::DoubleInsert { node: id, tuple }.into());
        }
        let value = map_value(id, def, arena, tuple)?;
        let value = arena.values.acquire(value);
        let out = self.queue.insert(arena, id, smallvec![value.to_fact()]);
        self.outs.insert(tuple, (out, value));
        Ok(())
    }

    pub fn update(&mut self, id: NodeId, def: &MapDef, arena: &mut TupleArena, tuple: TupleId) -> Result<(), NetworkError> {
        let value = map_value(id, def, arena, tuple)?;
        let (out, held) = self
            .outs
            .get_mut(&tuple)
            .ok_or(ProtocolViolation::UpdateWithoutInsert { node: id, tuple })?;
        if value != *held {
            let value = arena.values.acquire(value);
            arena.values.release(held);
            arena.get_mut(*out)?.set_facts(smallvec![value.to_fact()]);
            *held = value;
        }
        self.queue.update(arena, *out)
    }

    pub fn retract(&mut self, id: NodeId, arena: &mut TupleArena, tuple: TupleId) -> Result<(), NetworkError> {
        let (out, held) = self
            .outs
            .remove(&tuple)
            .ok_or(ProtocolViolation::RetractWithoutInsert { node: id, tuple })?;
        arena.values.release(&held);
        self.queue.retract(arena, out)
    }
}

fn map_value(id: NodeId, def: &MapDef, arena: &TupleArena, tuple: TupleId) -> Result<EqualKey, NetworkError> {
    (def.mapper)(arena.get(tuple)?).ok_or_else(|| NetworkError::shape(id, "tuples matching the mapping"))
}

pub(crate) struct FlattenDef {
    pub expander: TupleExpander,
}

/// Replaces each input tuple by one tuple per expanded item.
#[derive(Default)]
pub(crate) struct FlattenState {
    outs: HashMap<TupleId, Vec<TupleId>>,
    pub queue: PropagationQueue,
}

impl FlattenState {
    pub fn insert(&mut self, id: NodeId, def: &FlattenDef, arena: &mut TupleArena, tuple: TupleId) -> Result<(), NetworkError> {
        if self.outs.contains_key(&tuple) {
            return Err(ProtocolViolation::DoubleInsert { node: id, tuple }.into());
        }
        let items = (def.expander)(arena.get(tuple)?).ok_or_else(|| NetworkError::shape(id, "tuples matching the expansion"))?;
        let outs = items
            .into_iter()
            .map(|item| self.queue.insert(arena, id, smallvec![item]))
            .collect();
        self.outs.insert(tuple, outs);
        Ok(())
    }

    /// Items with unchanged identities are updated in place; any other
    /// change replaces the whole expansion.
    pub fn update(&mut self, id: NodeId, def: &FlattenDef, arena: &mut TupleArena, tuple: TupleId) -> Result<(), NetworkError> {
        let items = (def.expander)(arena.get(tuple)?).ok_or_else(|| NetworkError::shape(id, "tuples matching the expansion"))?;
        let outs = self
            .outs
            .get_mut(&tuple)
            .ok_or(ProtocolViolation::UpdateWithoutInsert { node: id, tuple })?;

        let mut unchanged = outs.len() == items.len();
        for (out, item) in outs.iter().zip(&items) {
            if !unchanged {
                break;
            }
            unchanged = arena.get(*out)?.fact(0).map(FactId::of) == Some(FactId::of(item));
        }
        if unchanged {
            for out in outs.iter() {
                self.queue.update(arena, *out)?;
            }
            return Ok(());
        }

        for out in outs.drain(..) {
            self.queue.retract(arena, out)?;
        }
        for item in items {
            outs.push(self.queue.insert(arena, id, smallvec![item]));
        }
        Ok(())
    }

    pub fn retract(&mut self, id: NodeId, arena: &mut TupleArena, tuple: TupleId) -> Result<(), NetworkError> {
        let outs = self
            .outs
            .remove(&tuple)
            .ok_or(ProtocolViolation::RetractWithoutInsert { node: id, tuple })?;
        for out in outs {
            self.queue.retract(arena, out)?;
        }
        Ok(())
    }
}
