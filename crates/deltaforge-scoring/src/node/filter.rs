use std::collections::HashMap;

use super::{NodeId, Op, TuplePredicate};
use crate::error::{NetworkError, ProtocolViolation};
use crate::tuple::{TupleArena, TupleId};

pub(crate) struct FilterDef {
    pub predicate: TuplePredicate,
}

/// Pass-through node remembering which tuples it let through.
///
/// An update can flip the predicate, so it may reach downstream as an
/// insert or a retract instead.
#[derive(Default)]
pub(crate) struct FilterState {
    passed: HashMap<TupleId, bool>,
}

impl FilterState {
    /// Returns the signal to forward downstream, if any.
    pub fn receive(
        &mut self,
        id: NodeId,
        def: &FilterDef,
        arena: &TupleArena,
        op: Op,
        tuple: TupleId,
    ) -> Result<Option<Op>, NetworkError> {
        match op {
            Op::Insert => {
                if self.passed.contains_key(&tuple) {
                    return Err(ProtocolViolation::DoubleInsert { node: id, tuple }.into());
                }
                let passes = self.test(id, def, arena, tuple)?;
                self.passed.insert(tuple, passes);
                Ok(passes.then_some(Op::Insert))
            }
            Op::Update => {
                let passes = self.test(id, def, arena, tuple)?;
                let passed = self
                    .passed
                    .get_mut(&tuple)
                    .ok_or(ProtocolViolation::UpdateWithoutInsert { node: id, tuple })?;
                let forwarded = match (*passed, passes) {
                    (true, true) => Some(Op::Update),
                    (true, false) => Some(Op::Retract),
                    (false, true) => Some(Op::Insert),
                    (false, false) => None,
                };
                *passed = passes;
                Ok(forwarded)
            }
            Op::Retract => {
                let passed = self
                    .passed
                    .remove(&tuple)
                    .ok_or(ProtocolViolation::RetractWithoutInsert { node: id, tuple })?;
                Ok(passed.then_some(Op::Retract))
            }
        }
    }

    fn test(&self, id: NodeId, def: &FilterDef, arena: &TupleArena, tuple: TupleId) -> Result<bool, NetworkError> {
        (def.predicate)(arena.get(tuple)?).ok_or_else(|| NetworkError::shape(id, "tuples matching the filter types"))
    }
}
