//! Scores whose level count is chosen at runtime.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Neg, Sub};

use super::traits::{ParseableScore, Score, ScoreParseError};
use super::ScoreLevel;

/// A score with any number of hard levels followed by any number of soft
/// levels.
///
/// Two bendable scores can only be combined or compared when they share a
/// shape; mixing shapes panics. A network built over a bendable zero checks
/// every constraint weight against that shape up front.
///
/// ```
/// use deltaforge_core::score::{BendableScore, Score};
///
/// let score = BendableScore::of(vec![-1, -2], vec![-10, -20, -30]);
/// assert_eq!(score.hard_levels_count(), 2);
/// assert_eq!(score.soft_levels_count(), 3);
/// assert_eq!(score.levels_count(), 5);
/// assert!(!score.is_feasible());
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BendableScore {
    /// Hard levels then soft levels, highest priority first.
    levels: Vec<i64>,
    hard_levels: usize,
}

impl BendableScore {
    pub fn of(hard_scores: Vec<i64>, soft_scores: Vec<i64>) -> Self {
        let hard_levels = hard_scores.len();
        let mut levels = hard_scores;
        levels.extend(soft_scores);
        BendableScore { levels, hard_levels }
    }

    pub fn zero_with_levels(hard_levels: usize, soft_levels: usize) -> Self {
        BendableScore {
            levels: vec![0; hard_levels + soft_levels],
            hard_levels,
        }
    }

    /// One on hard level `level`, zero elsewhere.
    pub fn one_hard(hard_levels: usize, soft_levels: usize, level: usize) -> Self {
        Self::unit(hard_levels, soft_levels, level)
    }

    /// One on soft level `level`, zero elsewhere.
    pub fn one_soft(hard_levels: usize, soft_levels: usize, level: usize) -> Self {
        Self::unit(hard_levels, soft_levels, hard_levels + level)
    }

    fn unit(hard_levels: usize, soft_levels: usize, index: usize) -> Self {
        let mut score = Self::zero_with_levels(hard_levels, soft_levels);
        score.levels[index] = 1;
        score
    }

    pub fn hard_levels_count(&self) -> usize {
        self.hard_levels
    }

    pub fn soft_levels_count(&self) -> usize {
        self.levels.len() - self.hard_levels
    }

    /// # Panics
    ///
    /// When `level` is not a hard level of this score.
    pub fn hard_score(&self, level: usize) -> i64 {
        self.hard_scores()[level]
    }

    /// # Panics
    ///
    /// When `level` is not a soft level of this score.
    pub fn soft_score(&self, level: usize) -> i64 {
        self.soft_scores()[level]
    }

    pub fn hard_scores(&self) -> &[i64] {
        &self.levels[..self.hard_levels]
    }

    pub fn soft_scores(&self) -> &[i64] {
        &self.levels[self.hard_levels..]
    }

    /// Whether `other` has the same number of hard and soft levels.
    pub fn is_compatible(&self, other: &Self) -> bool {
        self.hard_levels == other.hard_levels && self.levels.len() == other.levels.len()
    }

    fn combine(mut self, other: &Self, op: impl Fn(i64, i64) -> i64) -> Self {
        self.assert_compatible(other);
        for (level, &rhs) in self.levels.iter_mut().zip(&other.levels) {
            *level = op(*level, rhs);
        }
        self
    }

    fn assert_compatible(&self, other: &Self) {
        assert!(
            self.is_compatible(other),
            "Incompatible bendable shapes: {}+{} levels vs {}+{} levels",
            self.hard_levels,
            self.soft_levels_count(),
            other.hard_levels,
            other.soft_levels_count()
        );
    }
}

impl Default for BendableScore {
    /// One hard and one soft level, the shape of a hard/soft score.
    fn default() -> Self {
        BendableScore::zero_with_levels(1, 1)
    }
}

impl Score for BendableScore {
    type Level = i64;

    fn is_feasible(&self) -> bool {
        self.hard_scores().iter().all(|&level| level >= 0)
    }

    fn zero() -> Self {
        BendableScore::default()
    }

    fn levels_count(&self) -> usize {
        self.levels.len()
    }

    fn to_level_numbers(&self) -> Vec<i64> {
        self.levels.clone()
    }

    fn with_level_numbers(&self, levels: &[i64]) -> Self {
        assert_eq!(
            levels.len(),
            self.levels.len(),
            "BendableScore with {} hard and {} soft levels requires {} level numbers",
            self.hard_levels,
            self.soft_levels_count(),
            self.levels.len()
        );
        BendableScore {
            levels: levels.to_vec(),
            hard_levels: self.hard_levels,
        }
    }

    fn abs(&self) -> Self {
        BendableScore {
            levels: self.levels.iter().map(|level| level.abs()).collect(),
            hard_levels: self.hard_levels,
        }
    }

    fn level_label(&self, index: usize) -> ScoreLevel {
        match index {
            i if i < self.hard_levels => ScoreLevel::Hard,
            i if i < self.levels.len() => ScoreLevel::Soft,
            _ => panic!("BendableScore has {} levels, got index {}", self.levels.len(), index),
        }
    }
}

impl Ord for BendableScore {
    fn cmp(&self, other: &Self) -> Ordering {
        self.assert_compatible(other);
        self.levels.cmp(&other.levels)
    }
}

impl PartialOrd for BendableScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Add for BendableScore {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.combine(&other, |a, b| a + b)
    }
}

impl Sub for BendableScore {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self.combine(&other, |a, b| a - b)
    }
}

impl Neg for BendableScore {
    type Output = Self;

    fn neg(mut self) -> Self {
        self.levels.iter_mut().for_each(|level| *level = -*level);
        self
    }
}

impl fmt::Debug for BendableScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BendableScore")
            .field("hard", &self.hard_scores())
            .field("soft", &self.soft_scores())
            .finish()
    }
}

fn write_group(f: &mut fmt::Formatter<'_>, levels: &[i64], suffix: &str) -> fmt::Result {
    f.write_str("[")?;
    for (i, level) in levels.iter().enumerate() {
        if i > 0 {
            f.write_str("/")?;
        }
        write!(f, "{level}")?;
    }
    write!(f, "]{suffix}")
}

/// `[0/-1]hard/[-3/0]soft`
impl fmt::Display for BendableScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_group(f, self.hard_scores(), "hard")?;
        f.write_str("/")?;
        write_group(f, self.soft_scores(), "soft")
    }
}

fn parse_group(group: &str, suffix: &str, text: &str) -> Result<Vec<i64>, ScoreParseError> {
    let inner = group
        .trim()
        .strip_suffix(suffix)
        .and_then(|g| g.strip_prefix('['))
        .and_then(|g| g.strip_suffix(']'))
        .ok_or_else(|| ScoreParseError {
            message: format!("BendableScore '{text}': expected '[...]{suffix}', found '{group}'"),
        })?;
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }
    inner
        .split('/')
        .map(|level| {
            level.trim().parse::<i64>().map_err(|e| ScoreParseError {
                message: format!("BendableScore '{text}': bad {suffix} level '{level}': {e}"),
            })
        })
        .collect()
}

impl ParseableScore for BendableScore {
    fn parse(text: &str) -> Result<Self, ScoreParseError> {
        let text = text.trim();
        let (hard, soft) = text.split_once("hard/").ok_or_else(|| ScoreParseError {
            message: format!("BendableScore '{text}': expected '[...]hard/[...]soft'"),
        })?;
        Ok(BendableScore::of(
            parse_group(&format!("{hard}hard"), "hard", text)?,
            parse_group(soft, "soft", text)?,
        ))
    }

    fn to_string_repr(&self) -> String {
        self.to_string()
    }
}
