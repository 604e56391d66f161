use crate::error::{NetworkError, ProtocolViolation};
use crate::node::NodeId;
use crate::tuple::{TupleArena, TupleFacts, TupleId, TupleState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Retract,
    Update,
    Insert,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Retract, Phase::Update, Phase::Insert];
}

/// Pending lifecycle changes of the tuples one node owns.
///
/// Requests only flip tuple states and enqueue; nothing reaches downstream
/// nodes until the network drains the queue. A tuple that is created and
/// retracted before draining is aborted without ever being seen.
#[derive(Debug, Default)]
pub(crate) struct PropagationQueue {
    retracts: Vec<TupleId>,
    updates: Vec<TupleId>,
    inserts: Vec<TupleId>,
}

impl PropagationQueue {
    pub fn insert(&mut self, arena: &mut TupleArena, owner: NodeId, facts: TupleFacts) -> TupleId {
        let id = arena.create(owner, facts);
        self.inserts.push(id);
        id
    }

    pub fn update(&mut self, arena: &mut TupleArena, id: TupleId) -> Result<(), NetworkError> {
        match arena.state(id)? {
            TupleState::Creating | TupleState::Updating => Ok(()),
            TupleState::Ok => {
                arena.set_state(id, TupleState::Updating)?;
                self.updates.push(id);
                Ok(())
            }
            from => Err(ProtocolViolation::IllegalTransition {
                tuple: id,
                from,
                operation: "update",
            }
            .into()),
        }
    }

    pub fn retract(&mut self, arena: &mut TupleArena, id: TupleId) -> Result<(), NetworkError> {
        match arena.state(id)? {
            TupleState::Creating => {
                arena.set_state(id, TupleState::Aborting)?;
                Ok(())
            }
            TupleState::Ok | TupleState::Updating => {
                arena.set_state(id, TupleState::Dying)?;
                self.retracts.push(id);
                Ok(())
            }
            from => Err(ProtocolViolation::IllegalTransition {
                tuple: id,
                from,
                operation: "retract",
            }
            .into()),
        }
    }

    pub fn take(&mut self, phase: Phase) -> Vec<TupleId> {
        std::mem::take(match phase {
            Phase::Retract => &mut self.retracts,
            Phase::Update => &mut self.updates,
            Phase::Insert => &mut self.inserts,
        })
    }

    /// Some tuple still waiting to be propagated.
    pub fn pending(&self) -> Option<TupleId> {
        self.retracts
            .first()
            .or_else(|| self.updates.first())
            .or_else(|| self.inserts.first())
            .copied()
    }
}
