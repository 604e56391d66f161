use std::collections::{BTreeSet, HashMap};

use super::{JoinDef, NodeId, PropagationQueue, Side};
use crate::error::{NetworkError, ProtocolViolation};
use crate::index::{EntryHandle, IndexKeys, Indexer};
use crate::tuple::{TupleArena, TupleId};

struct ExistsEntry {
    keys: IndexKeys,
    handle: EntryHandle,
    partners: BTreeSet<TupleId>,
    /// Propagated copy of a left tuple; always `None` on the right side.
    out: Option<TupleId>,
}

#[derive(Default)]
struct ExistsSide {
    entries: HashMap<TupleId, ExistsEntry>,
}

/// Conditional propagation: left tuples pass while they have (or lack)
/// at least one matching right tuple.
///
/// Only transitions of a left tuple's partner set between empty and
/// non-empty are propagated; further partners coming or going are silent.
pub(crate) struct ExistsState {
    left: ExistsSide,
    right: ExistsSide,
    left_index: Indexer<TupleId>,
    right_index: Indexer<TupleId>,
    should_exist: bool,
    pub queue: PropagationQueue,
}

impl ExistsState {
    pub fn new(def: &JoinDef, should_exist: bool) -> Self {
        Self {
            left: ExistsSide::default(),
            right: ExistsSide::default(),
            left_index: def.left_index(),
            right_index: def.right_index(),
            should_exist,
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
        let (own, own_index) = match side {
            Side::Left => (&mut self.left, &mut self.left_index),
            Side::Right => (&mut self.right, &mut self.right_index),
        };
        if own.entries.contains_key(&tuple) {
            return Err(ProtocolViolation::DoubleInsert { node: id, tuple }.into());
        }
        let handle = own_index.put(&keys, tuple)?;
        own.entries.insert(
            tuple,
            ExistsEntry {
                keys,
                handle,
                partners: BTreeSet::new(),
                out: None,
            },
        );
        match side {
            Side::Left => {
                self.attach_left(id, def, arena, tuple)?;
                self.sync(id, arena, tuple, false)
            }
            Side::Right => self.attach_right(id, def, arena, tuple),
        }
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
        let (own, own_index) = match side {
            Side::Left => (&mut self.left, &mut self.left_index),
            Side::Right => (&mut self.right, &mut self.right_index),
        };
        let entry = own
            .entries
            .get_mut(&tuple)
            .ok_or(ProtocolViolation::UpdateWithoutInsert { node: id, tuple })?;
        let moved = entry.keys != keys;
        if moved {
            own_index.remove(&entry.keys, entry.handle)?;
            entry.handle = own_index.put(&keys, tuple)?;
            entry.keys = keys;
        }
        let recheck = moved || def.filter.is_some();

        match side {
            Side::Left => {
                if recheck {
                    self.detach_left(tuple);
                    self.attach_left(id, def, arena, tuple)?;
                }
                self.sync(id, arena, tuple, true)
            }
            Side::Right => {
                if recheck {
                    let previous = self.detach_right(tuple);
                    self.attach_right(id, def, arena, tuple)?;
                    for left in previous {
                        self.sync(id, arena, left, false)?;
                    }
                }
                Ok(())
            }
        }
    }

    pub fn retract(&mut self, id: NodeId, arena: &mut TupleArena, side: Side, tuple: TupleId) -> Result<(), NetworkError> {
        match side {
            Side::Left => {
                self.detach_left(tuple);
                let entry = self
                    .left
                    .entries
                    .remove(&tuple)
                    .ok_or(ProtocolViolation::RetractWithoutInsert { node: id, tuple })?;
                self.left_index.remove(&entry.keys, entry.handle)?;
                if let Some(out) = entry.out {
                    self.queue.retract(arena, out)?;
                }
            }
            Side::Right => {
                let previous = self.detach_right(tuple);
                let entry = self
                    .right
                    .entries
                    .remove(&tuple)
                    .ok_or(ProtocolViolation::RetractWithoutInsert { node: id, tuple })?;
                self.right_index.remove(&entry.keys, entry.handle)?;
                for left in previous {
                    self.sync(id, arena, left, false)?;
                }
            }
        }
        Ok(())
    }

    /// Finds the right partners of a left tuple.
    fn attach_left(&mut self, id: NodeId, def: &JoinDef, arena: &TupleArena, left: TupleId) -> Result<(), NetworkError> {
        let Some(entry) = self.left.entries.get(&left) else {
            return Ok(());
        };
        let candidates = self.right_index.matches(&entry.keys)?;
        for right in candidates {
            if def.accepts(id, arena.get(left)?, arena.get(right)?)? {
                self.link(left, right);
            }
        }
        Ok(())
    }

    /// Finds the left partners of a right tuple and syncs those that gained
    /// their first partner.
    fn attach_right(&mut self, id: NodeId, def: &JoinDef, arena: &mut TupleArena, right: TupleId) -> Result<(), NetworkError> {
        let Some(entry) = self.right.entries.get(&right) else {
            return Ok(());
        };
        let candidates = self.left_index.matches(&entry.keys)?;
        for left in candidates {
            if def.accepts(id, arena.get(left)?, arena.get(right)?)? {
                self.link(left, right);
                self.sync(id, arena, left, false)?;
            }
        }
        Ok(())
    }

    fn detach_left(&mut self, left: TupleId) {
        let partners = match self.left.entries.get_mut(&left) {
            Some(entry) => std::mem::take(&mut entry.partners),
            None => return,
        };
        for right in partners {
            if let Some(entry) = self.right.entries.get_mut(&right) {
                entry.partners.remove(&left);
            }
        }
    }

    /// Unlinks a right tuple; returns the left tuples it was linked to.
    fn detach_right(&mut self, right: TupleId) -> BTreeSet<TupleId> {
        let partners = match self.right.entries.get_mut(&right) {
            Some(entry) => std::mem::take(&mut entry.partners),
            None => return BTreeSet::new(),
        };
        for left in &partners {
            if let Some(entry) = self.left.entries.get_mut(left) {
                entry.partners.remove(&right);
            }
        }
        partners
    }

    fn link(&mut self, left: TupleId, right: TupleId) {
        if let Some(entry) = self.left.entries.get_mut(&left) {
            entry.partners.insert(right);
        }
        if let Some(entry) = self.right.entries.get_mut(&right) {
            entry.partners.insert(left);
        }
    }

    /// Brings the propagated copy of `left` in line with its partner set.
    ///
    /// `refresh` re-sends a surviving copy; set when the left tuple itself
    /// changed.
    fn sync(&mut self, id: NodeId, arena: &mut TupleArena, left: TupleId, refresh: bool) -> Result<(), NetworkError> {
        let Some(entry) = self.left.entries.get_mut(&left) else {
            return Ok(());
        };
        let passes = self.should_exist == !entry.partners.is_empty();
        match (entry.out, passes) {
            (Some(out), true) => {
                if refresh {
                    let facts = arena.get(left)?.facts().iter().cloned().collect();
                    arena.get_mut(out)?.set_facts(facts);
                    self.queue.update(arena, out)?;
                }
            }
            (Some(out), false) => {
                entry.out = None;
                self.queue.retract(arena, out)?;
            }
            (None, true) => {
                let facts = arena.get(left)?.facts().iter().cloned().collect();
                entry.out = Some(self.queue.insert(arena, id, facts));
            }
            (None, false) => {}
        }
        Ok(())
    }
}
