//! The [`Score`] trait.

use std::cmp::Ordering;
use std::fmt::{Debug, Display};
use std::ops::{Add, Neg, Sub};

use num_traits::Zero;
use thiserror::Error;

use super::{ScoreLevel, ScoreLevelNumber};

/// A lexicographically ordered vector of level numbers.
///
/// The network never looks inside a score beyond this trait. Impacts are
/// summed with `+`, undone with `-`, and per-constraint weights are scaled
/// level by level through [`to_level_numbers`](Score::to_level_numbers) and
/// [`with_level_numbers`](Score::with_level_numbers). Higher is better, and
/// the first level dominates.
pub trait Score:
    Clone
    + Debug
    + Display
    + Default
    + Send
    + Sync
    + PartialEq
    + Eq
    + PartialOrd
    + Ord
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + 'static
{
    type Level: ScoreLevelNumber;

    /// No hard level is negative.
    fn is_feasible(&self) -> bool;

    /// The additive identity of the default shape.
    ///
    /// Shapes only differ for [`BendableScore`](super::BendableScore); use
    /// [`Score::zeroed`] to keep an existing score's shape.
    fn zero() -> Self;

    fn levels_count(&self) -> usize;

    /// Level numbers, highest priority first.
    fn to_level_numbers(&self) -> Vec<Self::Level>;

    /// A score shaped like `self` holding `levels`.
    ///
    /// # Panics
    ///
    /// When `levels.len() != self.levels_count()`.
    fn with_level_numbers(&self, levels: &[Self::Level]) -> Self;

    fn abs(&self) -> Self;

    /// What level `index` of [`to_level_numbers`](Score::to_level_numbers)
    /// stands for.
    ///
    /// # Panics
    ///
    /// When `index` is out of range.
    fn level_label(&self, index: usize) -> ScoreLevel;

    fn is_zero(&self) -> bool {
        self.to_level_numbers().iter().all(Zero::is_zero)
    }

    /// Zero in the shape of `self`.
    fn zeroed(&self) -> Self {
        self.with_level_numbers(&vec![Self::Level::zero(); self.levels_count()])
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn is_better_than(&self, other: &Self) -> bool {
        self > other
    }

    fn is_worse_than(&self, other: &Self) -> bool {
        self < other
    }

    fn is_equal_to(&self, other: &Self) -> bool {
        self == other
    }
}

/// A score with a textual form, used for configured constraint weights.
///
/// Fixed-level scores read `0hard/-100soft`, with one `value+suffix` part per
/// level. Single-level scores take a bare number, optionally followed by
/// `init`. Bendable scores read `[0/-1]hard/[-3]soft`.
pub trait ParseableScore: Score {
    fn parse(text: &str) -> Result<Self, ScoreParseError>;

    /// Inverse of [`parse`](ParseableScore::parse).
    fn to_string_repr(&self) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Score parse error: {message}")]
pub struct ScoreParseError {
    pub message: String,
}
