//! Tuples and their lifecycle.
//!
//! A tuple is an ordered group of fact handles produced by exactly one node.
//! The producing node owns it: only that node changes its state, and only
//! that node releases it from the [`TupleArena`] once it is dead.

mod arena;
mod values;

#[cfg(test)]
mod tests;

use std::any::Any;

use smallvec::SmallVec;

use crate::fact::{downcast_fact, FactId, FactRef};
use crate::node::NodeId;

pub use arena::{TupleArena, TupleId};
pub(crate) use values::ValuePool;

/// Fact handles of one tuple, left to right.
pub type TupleFacts = SmallVec<[FactRef; 4]>;

/// Lifecycle state of a tuple.
///
/// Legal transitions:
///
/// ```text
/// Creating ──propagate──▶ Ok ──update──▶ Updating ──propagate──▶ Ok
///    │                     │                 │
///  retract              retract           retract
///    ▼                     ▼                 ▼
/// Aborting             Dying ◀───────────────┘
///    │                     │
/// propagate            propagate
///    ▼                     ▼
///  Dead                  Dead
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TupleState {
    Creating,
    Ok,
    Updating,
    Dying,
    Dead,
    Aborting,
}

impl TupleState {
    /// True while the tuple is (or is about to be) visible downstream.
    pub fn is_active(self) -> bool {
        matches!(self, TupleState::Creating | TupleState::Ok | TupleState::Updating)
    }

    /// True while a propagation for the tuple is pending.
    pub fn is_dirty(self) -> bool {
        !matches!(self, TupleState::Ok | TupleState::Dead)
    }
}

/// An ordered group of fact handles flowing between nodes.
#[derive(Debug, Clone)]
pub struct Tuple {
    facts: TupleFacts,
    state: TupleState,
    owner: NodeId,
}

impl Tuple {
    pub(crate) fn new(owner: NodeId, facts: TupleFacts) -> Self {
        Self {
            facts,
            state: TupleState::Creating,
            owner,
        }
    }

    pub fn facts(&self) -> &[FactRef] {
        &self.facts
    }

    pub fn fact(&self, index: usize) -> Option<&FactRef> {
        self.facts.get(index)
    }

    /// Typed view of the fact at `index`.
    pub fn fact_as<T: Any>(&self, index: usize) -> Option<&T> {
        self.facts.get(index).and_then(downcast_fact::<T>)
    }

    pub fn arity(&self) -> usize {
        self.facts.len()
    }

    pub fn state(&self) -> TupleState {
        self.state
    }

    pub fn owner(&self) -> NodeId {
        self.owner
    }

    /// Identity of the facts, used where tuples compare by content.
    pub fn fact_ids(&self) -> SmallVec<[FactId; 4]> {
        self.facts.iter().map(FactId::of).collect()
    }

    /// Facts of `self` followed by the facts of `right`.
    pub(crate) fn joined_with(&self, right: &Tuple) -> TupleFacts {
        self.facts.iter().chain(right.facts.iter()).cloned().collect()
    }

    pub(crate) fn set_state(&mut self, state: TupleState) {
        self.state = state;
    }

    pub(crate) fn set_facts(&mut self, facts: TupleFacts) {
        self.facts = facts;
    }
}
