//! Tests for score types.

mod bendable_score;
mod hard_medium_soft_score;
mod hard_soft_score;
mod inner_score;
mod simple_score;
