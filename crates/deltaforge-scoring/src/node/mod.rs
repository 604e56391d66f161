//! Network nodes.
//!
//! A node definition ([`NodeKind`]) is immutable and shared by every session
//! built from the same network; the matching [`NodeState`] is private to one
//! session. Nodes that create tuples own a [`PropagationQueue`]. Filters and
//! scorers do not: they react synchronously inside their parent's
//! propagation and forward the parent's tuples unchanged.

mod concat;
mod distinct;
mod exists;
mod filter;
mod for_each;
mod group;
mod join;
mod map;
mod queue;
mod scorer;

#[cfg(test)]
mod tests;

use std::fmt;
use std::sync::Arc;

use crate::error::NetworkError;
use crate::fact::FactRef;
use crate::index::{Comparison, EqualKey, IndexKeys, Indexer, OrderedKey};
use crate::tuple::Tuple;

pub(crate) use concat::ConcatState;
pub(crate) use distinct::DistinctState;
pub(crate) use exists::ExistsState;
pub(crate) use filter::{FilterDef, FilterState};
pub(crate) use for_each::{FactPredicate, ForEachDef, ForEachState};
pub(crate) use group::{GroupDef, GroupState};
pub(crate) use join::JoinState;
pub(crate) use map::{FlattenDef, FlattenState, MapDef, MapState};
pub(crate) use queue::{Phase, PropagationQueue};
pub(crate) use scorer::{MatchWeigher, ScorerDef, ScorerState};

/// Position of a node in its network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Input of a two-input node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

/// Lifecycle signal delivered to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    Insert,
    Update,
    Retract,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Edge {
    pub target: NodeId,
    pub side: Side,
}

pub(crate) type TupleKeyFn = Arc<dyn Fn(&Tuple) -> Option<EqualKey> + Send + Sync>;
pub(crate) type TupleOrderFn = Arc<dyn Fn(&Tuple) -> Option<OrderedKey> + Send + Sync>;
pub(crate) type TuplePredicate = Arc<dyn Fn(&Tuple) -> Option<bool> + Send + Sync>;
pub(crate) type PairPredicate = Arc<dyn Fn(&Tuple, &Tuple) -> Option<bool> + Send + Sync>;
pub(crate) type TupleExpander = Arc<dyn Fn(&Tuple) -> Option<Vec<FactRef>> + Send + Sync>;

/// Index keys one side of a join derives from its tuples.
#[derive(Clone, Default)]
pub(crate) struct KeyExtractor {
    pub equal: Vec<TupleKeyFn>,
    pub comparison: Option<TupleOrderFn>,
}

impl KeyExtractor {
    pub fn extract(&self, tuple: &Tuple) -> Option<IndexKeys> {
        let mut equal = Vec::with_capacity(self.equal.len());
        for key in &self.equal {
            equal.push(key(tuple)?);
        }
        let comparison = match &self.comparison {
            Some(key) => Some(key(tuple)?),
            None => None,
        };
        Some(IndexKeys {
            equal: crate::index::EqualKeys::new(equal),
            comparison,
        })
    }
}

/// Matching rules of a join or existence check.
///
/// The comparison, when present, reads `left <relation> right`. Every
/// further condition is folded into `filter`.
#[derive(Clone, Default)]
pub(crate) struct JoinDef {
    pub left: KeyExtractor,
    pub right: KeyExtractor,
    pub comparison: Option<Comparison>,
    pub filter: Option<PairPredicate>,
}

impl JoinDef {
    pub fn left_index<T>(&self) -> Indexer<T> {
        Indexer::for_keys(self.left.equal.len(), self.comparison)
    }

    /// The right index is probed with left keys, so it stores the mirror
    /// relation.
    pub fn right_index<T>(&self) -> Indexer<T> {
        Indexer::for_keys(self.right.equal.len(), self.comparison.map(Comparison::flip))
    }

    pub fn keys(&self, node: NodeId, side: Side, tuple: &Tuple) -> Result<IndexKeys, NetworkError> {
        let extractor = match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        };
        extractor
            .extract(tuple)
            .ok_or_else(|| NetworkError::shape(node, "tuples matching the joiner key types"))
    }

    pub fn accepts(&self, node: NodeId, left: &Tuple, right: &Tuple) -> Result<bool, NetworkError> {
        match &self.filter {
            Some(filter) => filter(left, right)
                .ok_or_else(|| NetworkError::shape(node, "tuples matching the joiner filter types")),
            None => Ok(true),
        }
    }
}

/// Immutable definition of one node.
pub(crate) enum NodeKind {
    ForEach(ForEachDef),
    Filter(FilterDef),
    Join(JoinDef),
    Exists { def: JoinDef, should_exist: bool },
    Group(GroupDef),
    Map(MapDef),
    Flatten(FlattenDef),
    Distinct,
    Concat,
    Scorer(ScorerDef),
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::ForEach(_) => "for_each",
            NodeKind::Filter(_) => "filter",
            NodeKind::Join(_) => "join",
            NodeKind::Exists { should_exist: true, .. } => "if_exists",
            NodeKind::Exists { should_exist: false, .. } => "if_not_exists",
            NodeKind::Group(_) => "group_by",
            NodeKind::Map(_) => "map",
            NodeKind::Flatten(_) => "flatten_last",
            NodeKind::Distinct => "distinct",
            NodeKind::Concat => "concat",
            NodeKind::Scorer(_) => "scorer",
        }
    }

    /// Filters and scorers run inside their parent's propagation.
    pub fn owns_queue(&self) -> bool {
        !matches!(self, NodeKind::Filter(_) | NodeKind::Scorer(_))
    }
}

pub(crate) struct NodeDef {
    pub kind: NodeKind,
    pub layer: usize,
    pub successors: Vec<Edge>,
}

/// Per-session state of one node.
pub(crate) enum NodeState<L> {
    ForEach(ForEachState),
    Filter(FilterState),
    Join(JoinState),
    Exists(ExistsState),
    Group(GroupState),
    Map(MapState),
    Flatten(FlattenState),
    Distinct(DistinctState),
    Concat(ConcatState),
    Scorer(ScorerState<L>),
}

impl<L> NodeState<L> {
    pub fn new(kind: &NodeKind) -> Self {
        match kind {
            NodeKind::ForEach(_) => NodeState::ForEach(ForEachState::default()),
            NodeKind::Filter(_) => NodeState::Filter(FilterState::default()),
            NodeKind::Join(def) => NodeState::Join(JoinState::new(def)),
            NodeKind::Exists { def, should_exist } => NodeState::Exists(ExistsState::new(def, *should_exist)),
            NodeKind::Group(_) => NodeState::Group(GroupState::default()),
            NodeKind::Map(_) => NodeState::Map(MapState::default()),
            NodeKind::Flatten(_) => NodeState::Flatten(FlattenState::default()),
            NodeKind::Distinct => NodeState::Distinct(DistinctState::default()),
            NodeKind::Concat => NodeState::Concat(ConcatState::default()),
            NodeKind::Scorer(_) => NodeState::Scorer(ScorerState::default()),
        }
    }

    pub fn queue_mut(&mut self) -> Option<&mut PropagationQueue> {
        match self {
            NodeState::ForEach(state) => Some(&mut state.queue),
            NodeState::Join(state) => Some(&mut state.queue),
            NodeState::Exists(state) => Some(&mut state.queue),
            NodeState::Group(state) => Some(&mut state.queue),
            NodeState::Map(state) => Some(&mut state.queue),
            NodeState::Flatten(state) => Some(&mut state.queue),
            NodeState::Distinct(state) => Some(&mut state.queue),
            NodeState::Concat(state) => Some(&mut state.queue),
            NodeState::Filter(_) | NodeState::Scorer(_) => None,
        }
    }

    pub fn queue(&self) -> Option<&PropagationQueue> {
        match self {
            NodeState::ForEach(state) => Some(&state.queue),
            NodeState::Join(state) => Some(&state.queue),
            NodeState::Exists(state) => Some(&state.queue),
            NodeState::Group(state) => Some(&state.queue),
            NodeState::Map(state) => Some(&state.queue),
            NodeState::Flatten(state) => Some(&state.queue),
            NodeState::Distinct(state) => Some(&state.queue),
            NodeState::Concat(state) => Some(&state.queue),
            NodeState::Filter(_) | NodeState::Scorer(_) => None,
        }
    }
}
