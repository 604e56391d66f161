use std::collections::{BTreeMap, HashMap};

use super::{JoinDef, NodeId, PropagationQueue, Side};
use crate::error::{NetworkError, ProtocolViolation};
use crate::index::{EntryHandle, IndexKeys, Indexer};
use crate::tuple::{TupleArena, TupleId};

struct JoinEntry {
    keys: IndexKeys,
    handle: EntryHandle,
    /// Partner on the other side to the joined tuple.
    outs: BTreeMap<TupleId, TupleId>,
}

struct JoinSide {
    entries: HashMap<TupleId, JoinEntry>,
    index: Indexer<TupleId>,
}

impl JoinSide {
    fn new(index: Indexer<TupleId>) -> Self {
        Self {
            entries: HashMap::new(),
            index,
        }
    }
}

/// Inner join of two streams.
///
/// Each side indexes its live tuples; a tuple arriving on one side probes
/// the other side's index and creates one joined tuple per accepted
/// partner. Joined tuples carry the left facts followed by the right facts.
pub(crate) struct JoinState {
    sides: [JoinSide; 2],
    pairs: HashMap<TupleId, (TupleId, TupleId)>,
    pub queue: PropagationQueue,
}

fn slot(side: Side) -> usize {
    match side {
        Side::Left => 0,
        Side::Right => 1,
    }
}

/// Orders `(own, partner)` as `(left, right)`.
fn oriented(side: Side, own: TupleId, partner: TupleId) -> (TupleId, TupleId) {
    match side {
        Side::Left => (own, partner),
        Side::Right => (partner, own),
    }
}

fn split(sides: &mut [JoinSide; 2], side: Side) -> (&mut JoinSide, &mut JoinSide) {
    let [left, right] = sides;
    match side {
        Side::Left => (left, right),
        Side::Right => (right, left),
    }
}

impl JoinState {
    pub fn new(def: &JoinDef) -> Self {
        Self {
            sides: [JoinSide::new(def.left_index()), JoinSide::new(def.right_index())],
            pairs: HashMap::new(),
            queue: PropagationQueue::default(),
        }
    }

    pub fn insert(
        &mut self,
        id: NodeId,
        def: &JoinDef,
        arena: &mut TupleArena,
        side: Side,
        tuple: TupleId,
    ) -> Result<(), NetworkError> {
        let keys = def.keys(id, side, arena.get(tuple)?)?;
        let partners = {
            let (own, other) = split(&mut self.sides, side);
            if own.entries.contains_key(&tuple) {
                return Err(ProtocolViolation::DoubleInsert { node: id, tuple }.into());
            }
            let handle = own.index.put(&keys, tuple)?;
            let partners = other.index.matches(&keys)?;
            own.entries.insert(
                tuple,
                JoinEntry {
                    keys,
                    handle,
                    outs: BTreeMap::new(),
                },
            );
            partners
        };
        for partner in partners {
            let (left, right) = oriented(side, tuple, partner);
            if def.accepts(id, arena.get(left)?, arena.get(right)?)? {
                self.pair(id, arena, left, right)?;
            }
        }
        Ok(())
    }

    pub fn update(
        &mut self,
        id: NodeId,
        def: &JoinDef,
        arena: &mut TupleArena,
        side: Side,
        tuple: TupleId,
    ) -> Result<(), NetworkError> {
        let keys = def.keys(id, side, arena.get(tuple)?)?;
        let (own, other) = split(&mut self.sides, side);
        let entry = own
            .entries
            .get_mut(&tuple)
            .ok_or(ProtocolViolation::UpdateWithoutInsert { node: id, tuple })?;

        if entry.keys != keys {
            // Moved to another bucket: every pairing is rebuilt.
            own.index.remove(&entry.keys, entry.handle)?;
            entry.handle = own.index.put(&keys, tuple)?;
            entry.keys = keys;
            let stale: Vec<TupleId> = entry.outs.values().copied().collect();
            let partners = other.index.matches(&entry.keys)?;
            for out in stale {
                self.unpair(id, arena, out)?;
            }
            for partner in partners {
                let (left, right) = oriented(side, tuple, partner);
                if def.accepts(id, arena.get(left)?, arena.get(right)?)? {
                    self.pair(id, arena, left, right)?;
                }
            }
            return Ok(());
        }

        if def.filter.is_none() {
            let outs: Vec<TupleId> = entry.outs.values().copied().collect();
            for out in outs {
                self.refresh(arena, out)?;
                self.queue.update(arena, out)?;
            }
            return Ok(());
        }

        // Same bucket, but the filter may have flipped for any candidate.
        let existing = entry.outs.clone();
        let candidates = other.index.matches(&entry.keys)?;
        for partner in candidates {
            let (left, right) = oriented(side, tuple, partner);
            let accepted = def.accepts(id, arena.get(left)?, arena.get(right)?)?;
            match (existing.get(&partner), accepted) {
                (Some(&out), true) => {
                    self.refresh(arena, out)?;
                    self.queue.update(arena, out)?;
                }
                (Some(&out), false) => self.unpair(id, arena, out)?,
                (None, true) => self.pair(id, arena, left, right)?,
                (None, false) => {}
            }
        }
        Ok(())
    }

    pub fn retract(&mut self, id: NodeId, arena: &mut TupleArena, side: Side, tuple: TupleId) -> Result<(), NetworkError> {
        let (own, other) = split(&mut self.sides, side);
        let entry = own
            .entries
            .remove(&tuple)
            .ok_or(ProtocolViolation::RetractWithoutInsert { node: id, tuple })?;
        own.index.remove(&entry.keys, entry.handle)?;
        for (partner, out) in entry.outs {
            if let Some(partner_entry) = other.entries.get_mut(&partner) {
                partner_entry.outs.remove(&tuple);
            }
            self.pairs.remove(&out);
            self.queue.retract(arena, out)?;
        }
        Ok(())
    }

    fn pair(&mut self, id: NodeId, arena: &mut TupleArena, left: TupleId, right: TupleId) -> Result<(), NetworkError> {
        let facts = arena.get(left)?.joined_with(arena.get(right)?);
        let out = self.queue.insert(arena, id, facts);
        for (side, own, partner) in [(Side::Left, left, right), (Side::Right, right, left)] {
            self.sides[slot(side)]
                .entries
                .get_mut(&own)
                .ok_or(ProtocolViolation::UpdateWithoutInsert { node: id, tuple: own })?
                .outs
                .insert(partner, out);
        }
        self.pairs.insert(out, (left, right));
        Ok(())
    }

    fn unpair(&mut self, id: NodeId, arena: &mut TupleArena, out: TupleId) -> Result<(), NetworkError> {
        let (left, right) = self
            .pairs
            .remove(&out)
            .ok_or(ProtocolViolation::RetractWithoutInsert { node: id, tuple: out })?;
        for (side, own, partner) in [(Side::Left, left, right), (Side::Right, right, left)] {
            if let Some(entry) = self.sides[slot(side)].entries.get_mut(&own) {
                entry.outs.remove(&partner);
            }
        }
        self.queue.retract(arena, out)
    }

    fn refresh(&self, arena: &mut TupleArena, out: TupleId) -> Result<(), NetworkError> {
        let Some(&(left, right)) = self.pairs.get(&out) else {
            return Ok(());
        };
        let facts = arena.get(left)?.joined_with(arena.get(right)?);
        arena.get_mut(out)?.set_facts(facts);
        Ok(())
    }
}
