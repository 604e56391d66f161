//! Incremental constraint evaluation for deltaforge.
//!
//! This crate maintains a score under a stream of fact changes without
//! recomputing it from scratch:
//! - Fluent constraint streams (`for_each`, `join`, `group_by`, ...) compile
//!   into an immutable [`ConstraintNetwork`]
//! - Each [`ConstraintSession`] runs the network over its own facts,
//!   propagating tuples layer by layer on [`ConstraintSession::settle`]
//! - Matches feed a [`ScoreInliner`] whose every impact can be reverted
//!   exactly
//!
//! # Architecture
//!
//! Tuples live in a per-session generational arena and are addressed by
//! handle. Node definitions are closed over with `Arc<dyn Fn + Send + Sync>`
//! so one network can be shared by sessions on different threads; the
//! sessions themselves hold `Rc` facts and stay on one thread.

// Type-erased closures make for long signatures
#![allow(clippy::type_complexity)]

// Core modules
pub mod api;
pub mod collector;
pub mod error;
pub mod fact;
pub mod index;
pub mod inliner;
pub mod network;
pub mod node;
pub mod reversible;
pub mod stream;
pub mod tuple;

// ============================================================================
// Network and Sessions
// ============================================================================

pub use error::{ConstraintDrift, NetworkError, ProtocolViolation, ScoreCorruption};
pub use network::{ConstraintNetwork, ConstraintSession, SupplyContext, SupplyRegistry};

// ============================================================================
// Facts and Tuples
// ============================================================================

pub use fact::{downcast_fact, fact_type_id, Fact, FactId, FactRef};
pub use tuple::{Tuple, TupleArena, TupleId, TupleState};

// ============================================================================
// Score Inlining
// ============================================================================

pub use inliner::{Impact, ImpactDelta, ScoreImpact, ScoreInliner, WeightedScoreImpacter};
pub use reversible::{Reversible, UndoError};

// ============================================================================
// Analysis (for score explanation)
// ============================================================================

pub use api::analysis::{
    ConstraintMatch, ConstraintMatchTotal, DefaultJustification, Indictment, IndictmentMap,
    Justification, ScoreExplanation,
};
pub use api::weight_overrides::ConstraintWeightOverrides;

// ============================================================================
// Fluent Constraint Stream API
// ============================================================================

pub use stream::{BiStream, ConstraintBuilder, ConstraintFactory, Joiner, TriStream, UniStream};
