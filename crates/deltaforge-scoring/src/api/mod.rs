//! Score analysis and runtime weight configuration.
//!
//! This module provides:
//! - Constraint match totals, justifications and indictments
//! - Runtime weight overrides applied when the network is built

pub mod analysis;
pub mod weight_overrides;

#[cfg(test)]
mod analysis_tests;

pub use analysis::{
    ConstraintMatch, ConstraintMatchTotal, DefaultJustification, Indictment, IndictmentMap,
    Justification, ScoreExplanation,
};
pub use weight_overrides::ConstraintWeightOverrides;
