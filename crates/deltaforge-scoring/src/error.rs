//! Error types of the constraint network.

use std::fmt;

use thiserror::Error;

use crate::index::IndexError;
use crate::node::NodeId;
use crate::reversible::UndoError;
use crate::tuple::{TupleId, TupleState};

/// A node was driven against its lifecycle contract.
///
/// Every variant is a bug in the caller or in the network wiring. The
/// session reporting it is poisoned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    #[error("node {node} received a second insert for tuple {tuple}")]
    DoubleInsert { node: NodeId, tuple: TupleId },

    #[error("node {node} received a retract for tuple {tuple} it never saw inserted")]
    RetractWithoutInsert { node: NodeId, tuple: TupleId },

    #[error("node {node} received an update for tuple {tuple} it never saw inserted")]
    UpdateWithoutInsert { node: NodeId, tuple: TupleId },

    #[error("illegal {operation} of tuple {tuple} in state {from:?}")]
    IllegalTransition {
        tuple: TupleId,
        from: TupleState,
        operation: &'static str,
    },

    #[error("tuple {0} is no longer allocated")]
    StaleTuple(TupleId),

    #[error("tuple {tuple} is still {state:?} after settle")]
    Unsettled { tuple: TupleId, state: TupleState },

    #[error("fact {fact} was inserted twice")]
    DuplicateFact { fact: String },

    #[error("{operation} of fact {fact} that was never inserted")]
    UnknownFact { fact: String, operation: &'static str },
}

/// Incremental and from-scratch evaluation disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreCorruption {
    pub incremental: String,
    pub from_scratch: String,
    pub constraints: Vec<ConstraintDrift>,
}

/// One constraint whose incremental total differs from a full recompute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintDrift {
    pub constraint_id: String,
    pub incremental: String,
    pub from_scratch: String,
    /// Matches the full recompute produced but the session lacks.
    pub missing_matches: Vec<String>,
    /// Matches the session holds but the full recompute did not produce.
    pub excess_matches: Vec<String>,
}

impl fmt::Display for ScoreCorruption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "score corruption: incremental {} != from scratch {}",
            self.incremental, self.from_scratch
        )?;
        for drift in &self.constraints {
            write!(
                f,
                "\n  {}: incremental {} != from scratch {}",
                drift.constraint_id, drift.incremental, drift.from_scratch
            )?;
            for missing in &drift.missing_matches {
                write!(f, "\n    missing {missing}")?;
            }
            for excess in &drift.excess_matches {
                write!(f, "\n    excess {excess}")?;
            }
        }
        Ok(())
    }
}

/// Errors reported by the network, its builder and its sessions.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolViolation),

    #[error("index error: {0}")]
    Index(#[from] IndexError),

    #[error(transparent)]
    Undo(#[from] UndoError),

    #[error("constraint '{constraint}': {message}")]
    Configuration { constraint: String, message: String },

    #[error("{0}")]
    Consistency(Box<ScoreCorruption>),

    #[error("session is poisoned by an earlier failure: {0}")]
    Poisoned(String),

    #[error("session is closed")]
    Closed,

    #[error("session must be initialized before facts of this type are inserted")]
    NotInitialized,

    #[error("session is already initialized")]
    AlreadyInitialized,

    #[error("supply '{0}' is not available")]
    MissingSupply(String),

    #[error("node {node} expected tuples of {expected}")]
    TupleShape { node: NodeId, expected: &'static str },
}

impl NetworkError {
    /// Errors raised after the network state may have diverged.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            NetworkError::Protocol(_)
                | NetworkError::Index(_)
                | NetworkError::Undo(_)
                | NetworkError::TupleShape { .. }
        )
    }

    pub(crate) fn configuration(constraint: impl Into<String>, message: impl Into<String>) -> Self {
        NetworkError::Configuration {
            constraint: constraint.into(),
            message: message.into(),
        }
    }

    pub(crate) fn shape(node: NodeId, expected: &'static str) -> Self {
        NetworkError::TupleShape { node, expected }
    }
}
