//! Score inlining: running per-level totals, updated in place by every match.
//!
//! The inliner keeps one running total per score level and one per
//! constraint. Each constraint gets a [`WeightedScoreImpacter`] chosen from
//! its effective weight: the single-level form touches one slot, the
//! multi-level form touches every level. Applying an impact returns a
//! [`ScoreImpact`] that undoes it exactly. With match tracking on, every
//! indicted fact also gets a running total.

mod fact_totals;
#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::rc::Rc;
use std::sync::Arc;

use deltaforge_core::{ConstraintRef, InnerScore, Score};
use num_traits::Zero;
use smallvec::SmallVec;

use self::fact_totals::FactTotals;
use crate::api::{ConstraintMatch, ConstraintMatchTotal, DefaultJustification, IndictmentMap, Justification};
use crate::fact::FactRef;
use crate::index::{ElementList, EntryHandle};
use crate::reversible::{Reversible, UndoError};

/// Maps a match's facts and score to its justification; `None` falls back
/// to [`DefaultJustification`].
pub(crate) type JustifyFn<Sc> =
    Arc<dyn Fn(&[FactRef], &Sc) -> Option<Rc<dyn Justification>> + Send + Sync>;

/// How one constraint turns a match weight into a score delta.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeightedScoreImpacter<L> {
    /// Exactly one level of the weight is non-zero.
    SingleLevel { level: usize, weight: L },
    MultiLevel { weights: Vec<L> },
}

impl<L: Copy + Zero> WeightedScoreImpacter<L> {
    pub fn for_weight(levels: &[L]) -> Self {
        let mut non_zero = levels.iter().enumerate().filter(|(_, l)| !l.is_zero());
        match (non_zero.next(), non_zero.next()) {
            (Some((level, weight)), None) => WeightedScoreImpacter::SingleLevel { level, weight: *weight },
            _ => WeightedScoreImpacter::MultiLevel {
                weights: levels.to_vec(),
            },
        }
    }
}

/// Score change caused by one match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImpactDelta<L> {
    Single { level: usize, amount: L },
    Multi(SmallVec<[L; 4]>),
}

impl<L: Copy + Zero> ImpactDelta<L> {
    fn to_levels(&self, levels_count: usize) -> Vec<L> {
        match self {
            ImpactDelta::Single { level, amount } => {
                let mut levels = vec![L::zero(); levels_count];
                levels[*level] = *amount;
                levels
            }
            ImpactDelta::Multi(amounts) => amounts.to_vec(),
        }
    }
}

/// One match to add to the score.
#[derive(Debug, Clone, Copy)]
pub struct Impact<'a, L> {
    pub constraint: usize,
    pub match_weight: L,
    pub facts: &'a [FactRef],
}

/// Undo token for one applied [`Impact`].
#[derive(Debug)]
pub struct ScoreImpact<L> {
    constraint: usize,
    delta: ImpactDelta<L>,
    entry: Option<EntryHandle>,
}

impl<L> ScoreImpact<L> {
    pub fn delta(&self) -> &ImpactDelta<L> {
        &self.delta
    }
}

#[derive(Debug)]
struct MatchRecord<L> {
    delta: ImpactDelta<L>,
    facts: SmallVec<[FactRef; 4]>,
}

struct InlinedConstraint<Sc: Score> {
    constraint_ref: ConstraintRef,
    weight: Sc,
    impacter: WeightedScoreImpacter<Sc::Level>,
    totals: Vec<Sc::Level>,
    match_count: usize,
    matches: ElementList<MatchRecord<Sc::Level>>,
    justify: Option<JustifyFn<Sc>>,
}

/// Running score of one session.
pub struct ScoreInliner<Sc: Score> {
    zero: Sc,
    totals: Vec<Sc::Level>,
    constraints: Vec<InlinedConstraint<Sc>>,
    constraint_match_enabled: bool,
    indicted: FactTotals<Sc::Level>,
}

impl<Sc: Score> ScoreInliner<Sc> {
    /// `zero` fixes the shape of every score, which matters for bendable
    /// scores.
    pub fn new(zero: Sc, constraint_match_enabled: bool) -> Self {
        let totals = zero.to_level_numbers();
        Self {
            zero,
            totals,
            constraints: Vec::new(),
            constraint_match_enabled,
            indicted: FactTotals::new(),
        }
    }

    /// Registers a constraint with its effective (already signed) weight.
    pub fn add_constraint(&mut self, constraint_ref: ConstraintRef, weight: Sc) -> usize {
        let levels = weight.to_level_numbers();
        self.constraints.push(InlinedConstraint {
            constraint_ref,
            impacter: WeightedScoreImpacter::for_weight(&levels),
            totals: vec![Sc::Level::zero(); levels.len()],
            weight,
            match_count: 0,
            matches: ElementList::new(),
            justify: None,
        });
        self.constraints.len() - 1
    }

    pub(crate) fn set_justification(&mut self, constraint: usize, justify: JustifyFn<Sc>) {
        if let Some(entry) = self.constraints.get_mut(constraint) {
            entry.justify = Some(justify);
        }
    }

    pub fn is_constraint_match_enabled(&self) -> bool {
        self.constraint_match_enabled
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    pub fn impacter(&self, constraint: usize) -> Option<&WeightedScoreImpacter<Sc::Level>> {
        self.constraints.get(constraint).map(|c| &c.impacter)
    }

    pub fn score(&self) -> Sc {
        self.zero.with_level_numbers(&self.totals)
    }

    pub fn extract_score(&self, unassigned_count: usize) -> InnerScore<Sc> {
        InnerScore::new(self.score(), unassigned_count)
    }

    pub fn constraint_score(&self, constraint: usize) -> Option<Sc> {
        self.constraints
            .get(constraint)
            .map(|c| self.zero.with_level_numbers(&c.totals))
    }

    pub fn match_count(&self, constraint: usize) -> usize {
        self.constraints.get(constraint).map_or(0, |c| c.match_count)
    }

    /// Every constraint, including those without matches, by constraint id.
    ///
    /// Match lists are only filled when match tracking is enabled; they keep
    /// the order in which the matches appeared.
    pub fn constraint_match_totals(&self) -> BTreeMap<String, ConstraintMatchTotal<Sc>> {
        self.constraints
            .iter()
            .map(|c| {
                let total = ConstraintMatchTotal {
                    constraint_ref: c.constraint_ref.clone(),
                    weight: c.weight.clone(),
                    score: self.zero.with_level_numbers(&c.totals),
                    matches: c.matches.iter().map(|record| self.to_match(c, record)).collect(),
                };
                (c.constraint_ref.full_name(), total)
            })
            .collect()
    }

    /// Indictments with their running totals; only the match lists are
    /// gathered on the spot.
    pub fn indictment_map(&self) -> IndictmentMap<Sc> {
        let scores = self
            .indicted
            .ordered()
            .into_iter()
            .map(|t| (t.fact.clone(), self.zero.with_level_numbers(&t.totals)));
        let matches = self
            .constraints
            .iter()
            .flat_map(|c| c.matches.iter().map(move |record| self.to_match(c, record)));
        IndictmentMap::from_totals(scores, matches)
    }

    /// Running impact of `fact`, or `None` when no tracked match names it.
    pub fn indictment_score(&self, fact: &FactRef) -> Option<Sc> {
        self.indicted
            .get(fact)
            .map(|t| self.zero.with_level_numbers(&t.totals))
    }

    pub fn indicted_match_count(&self, fact: &FactRef) -> usize {
        self.indicted.get(fact).map_or(0, |t| t.match_count)
    }

    pub fn indicted_fact_count(&self) -> usize {
        self.indicted.len()
    }

    /// Debug renderings of the facts of each recorded match.
    pub(crate) fn match_fingerprints(&self, constraint: usize) -> Vec<String> {
        self.constraints
            .get(constraint)
            .map(|c| c.matches.iter().map(|record| format!("{:?}", record.facts)).collect())
            .unwrap_or_default()
    }

    pub(crate) fn constraint_ref(&self, constraint: usize) -> Option<&ConstraintRef> {
        self.constraints.get(constraint).map(|c| &c.constraint_ref)
    }

    fn to_match(&self, constraint: &InlinedConstraint<Sc>, record: &MatchRecord<Sc::Level>) -> ConstraintMatch<Sc> {
        let score = self
            .zero
            .with_level_numbers(&record.delta.to_levels(self.totals.len()));
        let justification = constraint
            .justify
            .as_ref()
            .and_then(|justify| justify(record.facts.as_slice(), &score))
            .unwrap_or_else(|| {
                Rc::new(DefaultJustification {
                    facts: record.facts.to_vec(),
                })
            });
        ConstraintMatch {
            constraint_ref: constraint.constraint_ref.clone(),
            score,
            justification,
            indicted_facts: record.facts.to_vec(),
        }
    }
}

impl<'a, Sc: Score> Reversible<Impact<'a, Sc::Level>> for ScoreInliner<Sc> {
    type Undo = ScoreImpact<Sc::Level>;

    fn apply(&mut self, impact: Impact<'a, Sc::Level>) -> ScoreImpact<Sc::Level> {
        let constraint = &mut self.constraints[impact.constraint];
        let delta = match &constraint.impacter {
            WeightedScoreImpacter::SingleLevel { level, weight } => {
                let amount = *weight * impact.match_weight;
                self.totals[*level] += amount;
                constraint.totals[*level] += amount;
                ImpactDelta::Single { level: *level, amount }
            }
            WeightedScoreImpacter::MultiLevel { weights } => {
                let amounts: SmallVec<[Sc::Level; 4]> =
                    weights.iter().map(|w| *w * impact.match_weight).collect();
                for (level, amount) in amounts.iter().enumerate() {
                    self.totals[level] += *amount;
                    constraint.totals[level] += *amount;
                }
                ImpactDelta::Multi(amounts)
            }
        };
        constraint.match_count += 1;
        let entry = self.constraint_match_enabled.then(|| {
            self.indicted.charge(impact.facts, &delta, self.totals.len());
            constraint.matches.push(MatchRecord {
                delta: delta.clone(),
                facts: impact.facts.iter().cloned().collect(),
            })
        });
        ScoreImpact {
            constraint: impact.constraint,
            delta,
            entry,
        }
    }

    fn revert(&mut self, undo: ScoreImpact<Sc::Level>) -> Result<(), UndoError> {
        let constraint = self
            .constraints
            .get_mut(undo.constraint)
            .ok_or_else(|| UndoError(format!("no constraint #{}", undo.constraint)))?;
        if let Some(entry) = undo.entry {
            let record = constraint
                .matches
                .remove(entry)
                .map_err(|e| UndoError(format!("match of {}: {e}", constraint.constraint_ref)))?;
            self.indicted.refund(&record.facts, &record.delta)?;
        }
        constraint.match_count = constraint.match_count.checked_sub(1).ok_or_else(|| {
            UndoError(format!("constraint {} has no matches", constraint.constraint_ref))
        })?;
        match undo.delta {
            ImpactDelta::Single { level, amount } => {
                self.totals[level] -= amount;
                constraint.totals[level] -= amount;
            }
            ImpactDelta::Multi(amounts) => {
                for (level, amount) in amounts.into_iter().enumerate() {
                    self.totals[level] -= amount;
                    constraint.totals[level] -= amount;
                }
            }
        }
        Ok(())
    }
}

impl<Sc: Score> Debug for ScoreInliner<Sc> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreInliner")
            .field("score", &self.score())
            .field("constraints", &self.constraints.len())
            .field("constraint_match_enabled", &self.constraint_match_enabled)
            .finish()
    }
}
