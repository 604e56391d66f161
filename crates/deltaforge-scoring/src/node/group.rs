use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use smallvec::SmallVec;

use super::{NodeId, PropagationQueue, TupleKeyFn};
use crate::collector::erased::{ErasedAccumulator, ErasedCollector};
use crate::error::{NetworkError, ProtocolViolation};
use crate::index::EqualKey;
use crate::tuple::{Tuple, TupleArena, TupleId};

pub(crate) struct GroupDef {
    pub key: Option<TupleKeyFn>,
    pub collector: Option<Arc<dyn ErasedCollector>>,
}

struct Group {
    out: TupleId,
    size: usize,
    accumulator: Option<Box<dyn ErasedAccumulator>>,
}

/// Group-by node: one output tuple per non-empty group.
///
/// Output facts are the group key (when grouped by key) followed by the
/// collector result (when collecting). The result is read from the
/// accumulator only when the group tuple is propagated, so a burst of
/// changes to one group costs one finish.
#[derive(Default)]
pub(crate) struct GroupState {
    groups: HashMap<EqualKey, Group>,
    inputs: HashMap<TupleId, EqualKey>,
    outs: HashMap<TupleId, EqualKey>,
    pub queue: PropagationQueue,
}

impl GroupState {
    pub fn insert(&mut self, id: NodeId, def: &GroupDef, arena: &mut TupleArena, tuple: TupleId) -> Result<(), NetworkError> {
        if self.inputs.contains_key(&tuple) {
            return Err(ProtocolViolation::DoubleInsert { node: id, tuple }.into());
        }
        let key = key_of(id, def, arena.get(tuple)?)?;
        self.add(id, def, arena, tuple, key)
    }

    pub fn update(&mut self, id: NodeId, def: &GroupDef, arena: &mut TupleArena, tuple: TupleId) -> Result<(), NetworkError> {
        let previous = self
            .inputs
            .get(&tuple)
            .cloned()
            .ok_or(ProtocolViolation::UpdateWithoutInsert { node: id, tuple })?;
        let key = key_of(id, def, arena.get(tuple)?)?;
        if key != previous {
            self.remove(id, arena, tuple)?;
            return self.add(id, def, arena, tuple, key);
        }
        let group = self
            .groups
            .get_mut(&key)
            .ok_or(ProtocolViolation::UpdateWithoutInsert { node: id, tuple })?;
        if let Some(accumulator) = group.accumulator.as_mut() {
            accumulator.retract(id, tuple)?;
            accumulator.insert(id, tuple, arena.get(tuple)?)?;
            self.queue.update(arena, group.out)?;
        }
        Ok(())
    }

    pub fn retract(&mut self, id: NodeId, arena: &mut TupleArena, tuple: TupleId) -> Result<(), NetworkError> {
        self.remove(id, arena, tuple)
    }

    /// Writes the current key and result into a group tuple about to be
    /// propagated.
    pub fn refresh(&self, def: &GroupDef, arena: &mut TupleArena, out: TupleId) -> Result<(), NetworkError> {
        let Some(group) = self.outs.get(&out).and_then(|key| self.groups.get(key).map(|g| (key, g))) else {
            return Ok(());
        };
        let (key, group) = group;
        let mut facts = SmallVec::new();
        if def.key.is_some() {
            facts.push(key.to_fact());
        }
        if let Some(accumulator) = &group.accumulator {
            facts.push(accumulator.result());
        }
        arena.get_mut(out)?.set_facts(facts);
        Ok(())
    }

    fn add(&mut self, id: NodeId, def: &GroupDef, arena: &mut TupleArena, tuple: TupleId, key: EqualKey) -> Result<(), NetworkError> {
        let group = match self.groups.entry(key.clone()) {
            Entry::Occupied(entry) => {
                let group = entry.into_mut();
                self.queue.update(arena, group.out)?;
                group
            }
            Entry::Vacant(entry) => {
                let out = self.queue.insert(arena, id, SmallVec::new());
                self.outs.insert(out, key.clone());
                entry.insert(Group {
                    out,
                    size: 0,
                    accumulator: def.collector.as_ref().map(|collector| collector.create()),
                })
            }
        };
        if let Some(accumulator) = group.accumulator.as_mut() {
            accumulator.insert(id, tuple, arena.get(tuple)?)?;
        }
        group.size += 1;
        self.inputs.insert(tuple, key);
        Ok(())
    }

    fn remove(&mut self, id: NodeId, arena: &mut TupleArena, tuple: TupleId) -> Result<(), NetworkError> {
        let key = self
            .inputs
            .remove(&tuple)
            .ok_or(ProtocolViolation::RetractWithoutInsert { node: id, tuple })?;
        let group = self
            .groups
            .get_mut(&key)
            .ok_or(ProtocolViolation::RetractWithoutInsert { node: id, tuple })?;
        if let Some(accumulator) = group.accumulator.as_mut() {
            accumulator.retract(id, tuple)?;
        }
        group.size -= 1;
        if group.size > 0 {
            return self.queue.update(arena, group.out);
        }
        let out = group.out;
        self.groups.remove(&key);
        self.outs.remove(&out);
        self.queue.retract(arena, out)
    }
}

fn key_of(id: NodeId, def: &GroupDef, tuple: &Tuple) -> Result<EqualKey, NetworkError> {
    match &def.key {
        Some(key) => key(tuple).ok_or_else(|| NetworkError::shape(id, "tuples matching the group key type")),
        None => Ok(EqualKey::unit()),
    }
}
