//! Score analysis types for constraint match tracking.
//!
//! Matches are only recorded when the session runs with constraint match
//! tracking enabled. Everything here is a snapshot taken from the score
//! inliner; it does not change when the session moves on.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt::{self, Debug};
use std::rc::Rc;

use deltaforge_core::{ConstraintRef, Score};

use crate::fact::{FactId, FactRef};

/// Why a constraint matched.
///
/// Any `'static + Debug` value qualifies. Constraints pick theirs with
/// `justify_with`; the default is [`DefaultJustification`].
pub trait Justification: Debug + 'static {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Debug + 'static> Justification for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The facts of the matching tuple, in tuple order.
#[derive(Clone)]
pub struct DefaultJustification {
    pub facts: Vec<FactRef>,
}

impl Debug for DefaultJustification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.facts.iter()).finish()
    }
}

/// One match of one constraint.
#[derive(Clone)]
pub struct ConstraintMatch<Sc: Score> {
    pub constraint_ref: ConstraintRef,
    /// Score impact of this match alone.
    pub score: Sc,
    pub justification: Rc<dyn Justification>,
    /// Facts blamed for the match, used to build indictments.
    pub indicted_facts: Vec<FactRef>,
}

impl<Sc: Score> ConstraintMatch<Sc> {
    pub fn justification_as<J: 'static>(&self) -> Option<&J> {
        let justification: &dyn Justification = self.justification.as_ref();
        justification.as_any().downcast_ref::<J>()
    }
}

impl<Sc: Score> Debug for ConstraintMatch<Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintMatch")
            .field("constraint", &self.constraint_ref.full_name())
            .field("score", &self.score)
            .field("justification", &self.justification)
            .finish()
    }
}

/// All matches of one constraint and their summed impact.
#[derive(Debug, Clone)]
pub struct ConstraintMatchTotal<Sc: Score> {
    pub constraint_ref: ConstraintRef,
    /// Effective weight: declared or overridden, signed by impact type.
    pub weight: Sc,
    pub score: Sc,
    pub matches: Vec<ConstraintMatch<Sc>>,
}

impl<Sc: Score> ConstraintMatchTotal<Sc> {
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    pub fn name(&self) -> &str {
        &self.constraint_ref.name
    }
}

/// Per-constraint breakdown of a score.
#[derive(Debug, Clone)]
pub struct ScoreExplanation<Sc: Score> {
    pub score: Sc,
    pub constraint_totals: BTreeMap<String, ConstraintMatchTotal<Sc>>,
}

impl<Sc: Score> ScoreExplanation<Sc> {
    pub fn total_match_count(&self) -> usize {
        self.constraint_totals.values().map(|t| t.match_count()).sum()
    }

    /// Constraints that currently contribute to the score.
    pub fn non_zero_constraints(&self) -> Vec<&ConstraintMatchTotal<Sc>> {
        self.constraint_totals
            .values()
            .filter(|t| !t.score.is_zero())
            .collect()
    }
}

/// How one fact impacts the score.
#[derive(Clone)]
pub struct Indictment<Sc: Score> {
    pub fact: FactRef,
    pub score: Sc,
    pub matches: Vec<ConstraintMatch<Sc>>,
}

impl<Sc: Score> Indictment<Sc> {
    fn new(fact: FactRef, zero: Sc) -> Self {
        Self {
            fact,
            score: zero,
            matches: Vec::new(),
        }
    }

    fn add_match(&mut self, constraint_match: ConstraintMatch<Sc>) {
        self.score = self.score.clone() + constraint_match.score.clone();
        self.matches.push(constraint_match);
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// Number of distinct constraints this fact takes part in.
    pub fn constraint_count(&self) -> usize {
        let mut refs: Vec<&ConstraintRef> = self.matches.iter().map(|m| &m.constraint_ref).collect();
        refs.sort();
        refs.dedup();
        refs.len()
    }
}

impl<Sc: Score> Debug for Indictment<Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Indictment")
            .field("fact", &self.fact)
            .field("score", &self.score)
            .field("matches", &self.matches.len())
            .finish()
    }
}

/// Indictments keyed by fact identity, in order of first appearance.
#[derive(Clone)]
pub struct IndictmentMap<Sc: Score> {
    indictments: Vec<Indictment<Sc>>,
    positions: HashMap<FactId, usize>,
}

impl<Sc: Score> IndictmentMap<Sc> {
    /// Builds the map from matches; a fact blamed twice by one match counts once.
    pub fn from_matches<'a>(zero: &Sc, matches: impl IntoIterator<Item = &'a ConstraintMatch<Sc>>) -> Self
    where
        Sc: 'a,
    {
        let mut map = Self {
            indictments: Vec::new(),
            positions: HashMap::new(),
        };
        for constraint_match in matches {
            let mut seen: Vec<FactId> = Vec::with_capacity(constraint_match.indicted_facts.len());
            for fact in &constraint_match.indicted_facts {
                let id = FactId::of(fact);
                if seen.contains(&id) {
                    continue;
                }
                seen.push(id);
                let position = *map.positions.entry(id).or_insert_with(|| {
                    map.indictments.push(Indictment::new(fact.clone(), zero.clone()));
                    map.indictments.len() - 1
                });
                map.indictments[position].add_match(constraint_match.clone());
            }
        }
        map
    }

    /// Builds the map from totals already kept per fact, in the given order,
    /// filing each match under the facts it indicts.
    pub(crate) fn from_totals(
        scores: impl IntoIterator<Item = (FactRef, Sc)>,
        matches: impl IntoIterator<Item = ConstraintMatch<Sc>>,
    ) -> Self {
        let mut map = Self {
            indictments: Vec::new(),
            positions: HashMap::new(),
        };
        for (fact, score) in scores {
            map.positions.insert(FactId::of(&fact), map.indictments.len());
            map.indictments.push(Indictment {
                fact,
                score,
                matches: Vec::new(),
            });
        }
        for constraint_match in matches {
            let mut seen: Vec<usize> = Vec::with_capacity(constraint_match.indicted_facts.len());
            for fact in &constraint_match.indicted_facts {
                if let Some(&position) = map.positions.get(&FactId::of(fact)) {
                    if !seen.contains(&position) {
                        seen.push(position);
                        map.indictments[position].matches.push(constraint_match.clone());
                    }
                }
            }
        }
        map
    }

    pub fn get(&self, fact: &FactRef) -> Option<&Indictment<Sc>> {
        self.positions
            .get(&FactId::of(fact))
            .map(|&position| &self.indictments[position])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Indictment<Sc>> {
        self.indictments.iter()
    }

    /// Indictments sorted by score impact, worst first.
    pub fn worst(&self) -> Vec<&Indictment<Sc>> {
        let mut sorted: Vec<_> = self.indictments.iter().collect();
        sorted.sort_by(|a, b| a.score.cmp(&b.score));
        sorted
    }

    pub fn len(&self) -> usize {
        self.indictments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indictments.is_empty()
    }
}

impl<Sc: Score> Debug for IndictmentMap<Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.indictments.iter()).finish()
    }
}
