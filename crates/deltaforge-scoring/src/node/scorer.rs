use std::collections::HashMap;
use std::sync::Arc;

use deltaforge_core::{Score, ScoreLevelNumber};
use rust_decimal::Decimal;

use super::{NodeId, Op};
use crate::error::{NetworkError, ProtocolViolation};
use crate::inliner::{Impact, ScoreImpact, ScoreInliner};
use crate::reversible::Reversible;
use crate::tuple::{Tuple, TupleArena, TupleId};

/// Computes the match weight of a tuple.
#[derive(Clone)]
pub(crate) enum MatchWeigher {
    Unit,
    Long(Arc<dyn Fn(&Tuple) -> Option<i64> + Send + Sync>),
    Decimal(Arc<dyn Fn(&Tuple) -> Option<Decimal> + Send + Sync>),
}

impl MatchWeigher {
    fn weigh<L: ScoreLevelNumber>(&self, tuple: &Tuple) -> Option<L> {
        match self {
            MatchWeigher::Unit => Some(L::one()),
            MatchWeigher::Long(weigh) => L::from_i64(weigh(tuple)?),
            MatchWeigher::Decimal(weigh) => L::from_decimal(weigh(tuple)?),
        }
    }

    pub fn is_decimal(&self) -> bool {
        matches!(self, MatchWeigher::Decimal(_))
    }
}

pub(crate) struct ScorerDef {
    pub constraint: usize,
    pub weigher: MatchWeigher,
}

/// Terminal node: keeps the score impact of every live match.
pub(crate) struct ScorerState<L> {
    impacts: HashMap<TupleId, ScoreImpact<L>>,
}

impl<L> Default for ScorerState<L> {
    fn default() -> Self {
        Self {
            impacts: HashMap::new(),
        }
    }
}

impl<L: ScoreLevelNumber> ScorerState<L> {
    pub fn receive<Sc: Score<Level = L>>(
        &mut self,
        id: NodeId,
        def: &ScorerDef,
        arena: &TupleArena,
        inliner: &mut ScoreInliner<Sc>,
        op: Op,
        tuple: TupleId,
    ) -> Result<(), NetworkError> {
        match op {
            Op::Insert => {
                if self.impacts.contains_key(&tuple) {
                    return Err(ProtocolViolation::DoubleInsert { node: id, tuple }.into());
                }
                let impact = Self::impact(id, def, arena, inliner, tuple)?;
                self.impacts.insert(tuple, impact);
            }
            Op::Update => {
                let previous = self
                    .impacts
                    .remove(&tuple)
                    .ok_or(ProtocolViolation::UpdateWithoutInsert { node: id, tuple })?;
                inliner.revert(previous)?;
                let impact = Self::impact(id, def, arena, inliner, tuple)?;
                self.impacts.insert(tuple, impact);
            }
            Op::Retract => {
                let previous = self
                    .impacts
                    .remove(&tuple)
                    .ok_or(ProtocolViolation::RetractWithoutInsert { node: id, tuple })?;
                inliner.revert(previous)?;
            }
        }
        Ok(())
    }

    fn impact<Sc: Score<Level = L>>(
        id: NodeId,
        def: &ScorerDef,
        arena: &TupleArena,
        inliner: &mut ScoreInliner<Sc>,
        tuple: TupleId,
    ) -> Result<ScoreImpact<L>, NetworkError> {
        let tuple = arena.get(tuple)?;
        let match_weight = def
            .weigher
            .weigh::<L>(tuple)
            .ok_or_else(|| NetworkError::shape(id, "a match weight representable by the score"))?;
        Ok(inliner.apply(Impact {
            constraint: def.constraint,
            match_weight,
            facts: tuple.facts(),
        }))
    }
}
