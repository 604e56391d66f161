//! deltaforge core - score types and constraint identities
//!
//! This crate provides the value types shared by every deltaforge crate:
//! - Score types with integer, decimal and bendable level representations
//! - [`InnerScore`] pairing a score with the unassigned variable count
//! - Constraint identification ([`ConstraintRef`]) and impact direction

pub mod constraint;
pub mod score;

pub use constraint::{ConstraintRef, ImpactType};
pub use score::{
    BendableScore, HardMediumSoftDecimalScore, HardMediumSoftScore, HardSoftDecimalScore,
    HardSoftScore, InnerScore, ParseableScore, Score, ScoreLevel, ScoreLevelNumber,
    ScoreParseError, SimpleDecimalScore, SimpleScore,
};
