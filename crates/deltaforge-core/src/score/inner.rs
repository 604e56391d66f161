//! InnerScore - a score paired with the count of unassigned variables

use std::cmp::Ordering;
use std::fmt;

use super::traits::Score;

/// A raw constraint score plus the number of planning variables that are
/// still unassigned in the working solution.
///
/// The unassigned count is supplied by the caller of
/// `calculate_score`; the network itself never sees unassigned variables.
/// A solution with fewer unassigned variables always compares better,
/// regardless of its raw score.
///
/// # Examples
///
/// ```
/// use deltaforge_core::{HardSoftScore, InnerScore};
///
/// let partial = InnerScore::new(HardSoftScore::of(0, 0), 2);
/// let complete = InnerScore::fully_assigned(HardSoftScore::of(-5, 0));
///
/// assert!(complete > partial);
/// assert_eq!(partial.to_string(), "-2init/0hard/0soft");
/// assert_eq!(complete.to_string(), "-5hard/0soft");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InnerScore<Sc> {
    score: Sc,
    unassigned_count: usize,
}

impl<Sc: Score> InnerScore<Sc> {
    pub fn new(score: Sc, unassigned_count: usize) -> Self {
        Self {
            score,
            unassigned_count,
        }
    }

    pub fn fully_assigned(score: Sc) -> Self {
        Self::new(score, 0)
    }

    /// The raw constraint score.
    pub fn score(&self) -> &Sc {
        &self.score
    }

    pub fn into_score(self) -> Sc {
        self.score
    }

    pub fn unassigned_count(&self) -> usize {
        self.unassigned_count
    }

    pub fn is_fully_assigned(&self) -> bool {
        self.unassigned_count == 0
    }

    /// Feasible only once every variable is assigned and hard levels hold.
    pub fn is_feasible(&self) -> bool {
        self.is_fully_assigned() && self.score.is_feasible()
    }
}

impl<Sc: Score> Ord for InnerScore<Sc> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .unassigned_count
            .cmp(&self.unassigned_count)
            .then_with(|| self.score.cmp(&other.score))
    }
}

impl<Sc: Score> PartialOrd for InnerScore<Sc> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<Sc: Score> fmt::Display for InnerScore<Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unassigned_count == 0 {
            write!(f, "{}", self.score)
        } else {
            write!(f, "-{}init/{}", self.unassigned_count, self.score)
        }
    }
}
