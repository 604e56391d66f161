use std::collections::hash_map::Entry;
use std::collections::HashMap;

use smallvec::SmallVec;

use super::{NodeId, PropagationQueue};
use crate::error::{NetworkError, ProtocolViolation};
use crate::fact::FactId;
use crate::tuple::{TupleArena, TupleId};

type Identity = SmallVec<[FactId; 4]>;

struct Duplicates {
    /// Input tuples with this identity, oldest first.
    members: Vec<TupleId>,
    out: TupleId,
}

/// Forwards one tuple per distinct combination of fact identities.
#[derive(Default)]
pub(crate) struct DistinctState {
    groups: HashMap<Identity, Duplicates>,
    inputs: HashMap<TupleId, Identity>,
    pub queue: PropagationQueue,
}

impl DistinctState {
    pub fn insert(&mut self, id: NodeId, arena: &mut TupleArena, tuple: TupleId) -> Result<(), NetworkError> {
        if self.inputs.contains_key(&tuple) {
            return Err(ProtocolViolation::DoubleInsert { node: id, tuple }.into());
        }
        let input = arena.get(tuple)?;
        let identity = input.fact_ids();
        match self.groups.entry(identity.clone()) {
            Entry::Occupied(entry) => entry.into_mut().members.push(tuple),
            Entry::Vacant(entry) => {
                let facts = input.facts().iter().cloned().collect();
                let out = self.queue.insert(arena, id, facts);
                entry.insert(Duplicates {
                    members: vec![tuple],
                    out,
                });
            }
        }
        self.inputs.insert(tuple, identity);
        Ok(())
    }

    pub fn update(&mut self, id: NodeId, arena: &mut TupleArena, tuple: TupleId) -> Result<(), NetworkError> {
        let previous = self
            .inputs
            .get(&tuple)
            .ok_or(ProtocolViolation::UpdateWithoutInsert { node: id, tuple })?;
        if *previous != arena.get(tuple)?.fact_ids() {
            self.retract(id, arena, tuple)?;
            return self.insert(id, arena, tuple);
        }
        match self.groups.get(previous) {
            Some(group) if group.members.first() == Some(&tuple) => self.queue.update(arena, group.out),
            _ => Ok(()),
        }
    }

    pub fn retract(&mut self, id: NodeId, arena: &mut TupleArena, tuple: TupleId) -> Result<(), NetworkError> {
        let identity = self
            .inputs
            .remove(&tuple)
            .ok_or(ProtocolViolation::RetractWithoutInsert { node: id, tuple })?;
        let group = self
            .groups
            .get_mut(&identity)
            .ok_or(ProtocolViolation::RetractWithoutInsert { node: id, tuple })?;
        group.members.retain(|member| *member != tuple);
        if group.members.is_empty() {
            let out = group.out;
            self.groups.remove(&identity);
            self.queue.retract(arena, out)?;
        }
        Ok(())
    }
}
