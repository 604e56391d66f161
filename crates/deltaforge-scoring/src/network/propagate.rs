use deltaforge_core::Score;

use super::ConstraintNetwork;
use crate::error::NetworkError;
use crate::inliner::ScoreInliner;
use crate::node::{Edge, NodeDef, NodeId, NodeKind, NodeState, Op, Phase};
use crate::tuple::{TupleArena, TupleId, TupleState};

/// Drains node queues into successors for one session.
pub(super) struct Propagator<'a, Sc: Score> {
    pub network: &'a ConstraintNetwork<Sc>,
    pub states: &'a mut [NodeState<Sc::Level>],
    pub arena: &'a mut TupleArena,
    pub inliner: &'a mut ScoreInliner<Sc>,
}

impl<Sc: Score> Propagator<'_, Sc> {
    /// Processes layers in order. Within a layer every node finishes a
    /// phase before any node starts the next one. Returns the number of
    /// tuples propagated.
    pub fn settle(&mut self) -> Result<usize, NetworkError> {
        let network = self.network;
        let mut propagated = 0;
        for layer in network.layers() {
            for phase in Phase::ALL {
                for &id in layer {
                    propagated += self.propagate(id, phase)?;
                }
            }
        }
        Ok(propagated)
    }

    fn propagate(&mut self, id: NodeId, phase: Phase) -> Result<usize, NetworkError> {
        let network = self.network;
        let node = network.node(id);
        let Some(queue) = self.states[id.0].queue_mut() else {
            return Ok(0);
        };
        let pending = queue.take(phase);
        let mut propagated = 0;
        for tuple in pending {
            match phase {
                Phase::Retract => {
                    if self.arena.state(tuple)? != TupleState::Dying {
                        continue;
                    }
                    self.forward(node, Op::Retract, tuple)?;
                    self.arena.set_state(tuple, TupleState::Dead)?;
                    self.arena.release(tuple)?;
                }
                Phase::Update => {
                    // Tuples retracted after their update were released
                    // during the retract phase.
                    if self.arena.state(tuple).ok() != Some(TupleState::Updating) {
                        continue;
                    }
                    self.refresh(id, node, tuple)?;
                    self.arena.set_state(tuple, TupleState::Ok)?;
                    self.forward(node, Op::Update, tuple)?;
                }
                Phase::Insert => match self.arena.state(tuple)? {
                    TupleState::Creating => {
                        self.refresh(id, node, tuple)?;
                        self.arena.set_state(tuple, TupleState::Ok)?;
                        self.forward(node, Op::Insert, tuple)?;
                    }
                    TupleState::Aborting => {
                        self.arena.set_state(tuple, TupleState::Dead)?;
                        self.arena.release(tuple)?;
                        continue;
                    }
                    _ => continue,
                },
            }
            propagated += 1;
        }
        Ok(propagated)
    }

    /// Group tuples carry their result only once they are propagated.
    fn refresh(&mut self, id: NodeId, node: &NodeDef, tuple: TupleId) -> Result<(), NetworkError> {
        if let (NodeKind::Group(def), NodeState::Group(state)) = (&node.kind, &self.states[id.0]) {
            state.refresh(def, self.arena, tuple)?;
        }
        Ok(())
    }

    fn forward(&mut self, node: &NodeDef, op: Op, tuple: TupleId) -> Result<(), NetworkError> {
        for edge in &node.successors {
            self.deliver(*edge, op, tuple)?;
        }
        Ok(())
    }

    fn deliver(&mut self, edge: Edge, op: Op, tuple: TupleId) -> Result<(), NetworkError> {
        let network = self.network;
        let id = edge.target;
        let node = network.node(id);
        match (&node.kind, &mut self.states[id.0]) {
            (NodeKind::Filter(def), NodeState::Filter(state)) => {
                if let Some(forwarded) = state.receive(id, def, self.arena, op, tuple)? {
                    self.forward(node, forwarded, tuple)?;
                }
                Ok(())
            }
            (NodeKind::Scorer(def), NodeState::Scorer(state)) => state.receive(id, def, self.arena, self.inliner, op, tuple),
            (NodeKind::Join(def), NodeState::Join(state)) => match op {
                Op::Insert => state.insert(id, def, self.arena, edge.side, tuple),
                Op::Update => state.update(id, def, self.arena, edge.side, tuple),
                Op::Retract => state.retract(id, self.arena, edge.side, tuple),
            },
            (NodeKind::Exists { def, .. }, NodeState::Exists(state)) => match op {
                Op::Insert => state.insert(id, def, self.arena, edge.side, tuple),
                Op::Update => state.update(id, def, self.arena, edge.side, tuple),
                Op::Retract => state.retract(id, self.arena, edge.side, tuple),
            },
            (NodeKind::Group(def), NodeState::Group(state)) => match op {
                Op::Insert => state.insert(id, def, self.arena, tuple),
                Op::Update => state.update(id, def, self.arena, tuple),
                Op::Retract => state.retract(id, self.arena, tuple),
            },
            (NodeKind::Map(def), NodeState::Map(state)) => match op {
                Op::Insert => state.insert(id, def, self.arena, tuple),
                Op::Update => state.update(id, def, self.arena, tuple),
                Op::Retract => state.retract(id, self.arena, tuple),
            },
            (NodeKind::Flatten(def), NodeState::Flatten(state)) => match op {
                Op::Insert => state.insert(id, def, self.arena, tuple),
                Op::Update => state.update(id, def, self.arena, tuple),
                Op::Retract => state.retract(id, self.arena, tuple),
            },
            (NodeKind::Distinct, NodeState::Distinct(state)) => match op {
                Op::Insert => state.insert(id, self.arena, tuple),
                Op::Update => state.update(id, self.arena, tuple),
                Op::Retract => state.retract(id, self.arena, tuple),
            },
            (NodeKind::Concat, NodeState::Concat(state)) => match op {
                Op::Insert => state.insert(id, self.arena, edge.side, tuple),
                Op::Update => state.update(id, self.arena, edge.side, tuple),
                Op::Retract => state.retract(id, self.arena, edge.side, tuple),
            },
            _ => Err(NetworkError::shape(id, "a node that accepts tuples")),
        }
    }
}
