//! Score types for representing solution quality
//!
//! Scores are used to compare solutions and are what the incremental
//! network maintains. All score types are immutable and implement
//! arithmetic operations.

#[macro_use]
mod macros;

mod bendable;
mod hard_medium_soft;
mod hard_soft;
mod inner;
mod level;
mod simple;
mod traits;

#[cfg(test)]
mod tests;

pub use bendable::BendableScore;
pub use hard_medium_soft::{HardMediumSoftDecimalScore, HardMediumSoftScore};
pub use hard_soft::{HardSoftDecimalScore, HardSoftScore};
pub use inner::InnerScore;
pub use level::{ScoreLevel, ScoreLevelNumber};
pub use simple::{SimpleDecimalScore, SimpleScore};
pub use traits::{ParseableScore, Score, ScoreParseError};
