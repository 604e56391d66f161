use std::collections::HashMap;

use deltaforge_core::ScoreLevelNumber;
use smallvec::SmallVec;

use super::ImpactDelta;
use crate::fact::{FactId, FactRef};
use crate::reversible::UndoError;

/// Running impact of one fact, summed over the matches that name it.
#[derive(Debug)]
pub(super) struct FactTotal<L> {
    pub(super) fact: FactRef,
    pub(super) totals: Vec<L>,
    pub(super) match_count: usize,
    first_seen: u64,
}

/// Per-fact totals, charged and refunded together with the score.
///
/// A fact leaves the table with its last match, which also drops the
/// handle it was kept alive by.
#[derive(Debug)]
pub(super) struct FactTotals<L> {
    by_fact: HashMap<FactId, FactTotal<L>>,
    next_seen: u64,
}

impl<L: ScoreLevelNumber> FactTotals<L> {
    pub(super) fn new() -> Self {
        Self {
            by_fact: HashMap::new(),
            next_seen: 0,
        }
    }

    pub(super) fn charge(&mut self, facts: &[FactRef], delta: &ImpactDelta<L>, levels_count: usize) {
        for (id, fact) in distinct(facts) {
            let next_seen = &mut self.next_seen;
            let total = self.by_fact.entry(id).or_insert_with(|| {
                *next_seen += 1;
                FactTotal {
                    fact: fact.clone(),
                    totals: vec![L::zero(); levels_count],
                    match_count: 0,
                    first_seen: *next_seen,
                }
            });
            match delta {
                ImpactDelta::Single { level, amount } => total.totals[*level] += *amount,
                ImpactDelta::Multi(amounts) => {
                    for (level, amount) in amounts.iter().enumerate() {
                        total.totals[level] += *amount;
                    }
                }
            }
            total.match_count += 1;
        }
    }

    pub(super) fn refund(&mut self, facts: &[FactRef], delta: &ImpactDelta<L>) -> Result<(), UndoError> {
        for (id, fact) in distinct(facts) {
            let total = self
                .by_fact
                .get_mut(&id)
                .ok_or_else(|| UndoError(format!("fact {fact:?} was never charged")))?;
            match delta {
                ImpactDelta::Single { level, amount } => total.totals[*level] -= *amount,
                ImpactDelta::Multi(amounts) => {
                    for (level, amount) in amounts.iter().enumerate() {
                        total.totals[level] -= *amount;
                    }
                }
            }
            total.match_count -= 1;
            if total.match_count == 0 {
                self.by_fact.remove(&id);
            }
        }
        Ok(())
    }

    pub(super) fn get(&self, fact: &FactRef) -> Option<&FactTotal<L>> {
        self.by_fact.get(&FactId::of(fact))
    }

    pub(super) fn len(&self) -> usize {
        self.by_fact.len()
    }

    /// Totals in order of first appearance.
    pub(super) fn ordered(&self) -> Vec<&FactTotal<L>> {
        let mut totals: Vec<_> = self.by_fact.values().collect();
        totals.sort_by_key(|t| t.first_seen);
        totals
    }
}

// A fact named twice by one match is charged once.
fn distinct(facts: &[FactRef]) -> impl Iterator<Item = (FactId, &FactRef)> {
    let mut seen: SmallVec<[FactId; 4]> = SmallVec::new();
    facts.iter().filter_map(move |fact| {
        let id = FactId::of(fact);
        if seen.contains(&id) {
            return None;
        }
        seen.push(id);
        Some((id, fact))
    })
}
