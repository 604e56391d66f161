use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use smallvec::smallvec;
use tracing::trace;

use super::{NodeId, PropagationQueue};
use crate::error::{NetworkError, ProtocolViolation};
use crate::fact::{FactId, FactRef};
use crate::tuple::{TupleArena, TupleId};

/// Admission test of a filtered source; the second argument is the
/// demanded supply, if the source has one.
pub(crate) type FactPredicate = Arc<dyn Fn(&FactRef, Option<&dyn Any>) -> Option<bool> + Send + Sync>;

pub(crate) struct ForEachDef {
    pub type_id: TypeId,
    pub type_name: &'static str,
    pub filter: Option<FactPredicate>,
    pub supply_key: Option<String>,
}

struct SourceEntry {
    fact: FactRef,
    tuple: Option<TupleId>,
    sequence: u64,
}

/// Source node: turns facts of one type into single-fact tuples.
#[derive(Default)]
pub(crate) struct ForEachState {
    facts: HashMap<FactId, SourceEntry>,
    supply: Option<Rc<dyn Any>>,
    pub queue: PropagationQueue,
}

impl ForEachState {
    pub fn insert(
        &mut self,
        id: NodeId,
        def: &ForEachDef,
        arena: &mut TupleArena,
        fact: FactRef,
        sequence: u64,
    ) -> Result<(), NetworkError> {
        let fact_id = FactId::of(&fact);
        if self.facts.contains_key(&fact_id) {
            return Err(ProtocolViolation::DuplicateFact {
                fact: format!("{fact:?}"),
            }
            .into());
        }
        let tuple = if self.admits(id, def, &fact)? {
            Some(self.queue.insert(arena, id, smallvec![fact.clone()]))
        } else {
            trace!(node = %id, fact = ?fact, "fact filtered out at source");
            None
        };
        self.facts.insert(fact_id, SourceEntry { fact, tuple, sequence });
        Ok(())
    }

    pub fn update(&mut self, id: NodeId, def: &ForEachDef, arena: &mut TupleArena, fact: &FactRef) -> Result<(), NetworkError> {
        let admitted = match &def.filter {
            Some(_) => self.admits(id, def, fact)?,
            None => true,
        };
        let entry = self
            .facts
            .get_mut(&FactId::of(fact))
            .ok_or_else(|| unknown(fact, "update"))?;
        match (entry.tuple, admitted) {
            (Some(tuple), true) => self.queue.update(arena, tuple)?,
            (Some(tuple), false) => {
                self.queue.retract(arena, tuple)?;
                entry.tuple = None;
            }
            (None, true) => entry.tuple = Some(self.queue.insert(arena, id, smallvec![entry.fact.clone()])),
            (None, false) => {}
        }
        Ok(())
    }

    pub fn retract(&mut self, arena: &mut TupleArena, fact: &FactRef) -> Result<(), NetworkError> {
        let entry = self
            .facts
            .remove(&FactId::of(fact))
            .ok_or_else(|| unknown(fact, "retract"))?;
        if let Some(tuple) = entry.tuple {
            self.queue.retract(arena, tuple)?;
        }
        Ok(())
    }

    pub fn contains(&self, fact: &FactRef) -> bool {
        self.facts.contains_key(&FactId::of(fact))
    }

    /// Every inserted fact with its insertion sequence number.
    pub fn facts(&self) -> impl Iterator<Item = (u64, &FactRef)> {
        self.facts.values().map(|entry| (entry.sequence, &entry.fact))
    }

    pub fn supply(&self) -> Option<&Rc<dyn Any>> {
        self.supply.as_ref()
    }

    pub fn set_supply(&mut self, supply: Option<Rc<dyn Any>>) {
        self.supply = supply;
    }

    fn admits(&self, id: NodeId, def: &ForEachDef, fact: &FactRef) -> Result<bool, NetworkError> {
        match &def.filter {
            Some(filter) => filter(fact, self.supply.as_deref())
                .ok_or_else(|| NetworkError::shape(id, def.type_name)),
            None => Ok(true),
        }
    }
}

fn unknown(fact: &FactRef, operation: &'static str) -> NetworkError {
    ProtocolViolation::UnknownFact {
        fact: format!("{fact:?}"),
        operation,
    }
    .into()
}
