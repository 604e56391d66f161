//! The node graph and the sessions that run it.
//!
//! A [`ConstraintNetwork`] is the immutable result of building a set of
//! constraints: node definitions, their layers and successor edges, the
//! routing from fact types to source nodes, and the effective weight of
//! every constraint. It is `Send + Sync` and shared through an `Arc`.
//! Each [`ConstraintSession`] owns the mutable side: tuples, indexes,
//! accumulators and the running score.

mod propagate;
mod session;
mod supply;


use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use deltaforge_config::SessionConfig;
use deltaforge_core::{ConstraintRef, Score};
use tracing::debug;

use crate::error::NetworkError;
use crate::inliner::JustifyFn;
use crate::node::{NodeDef, NodeId, NodeKind};

pub use session::ConstraintSession;
pub use supply::{SupplyContext, SupplyRegistry};

pub(crate) struct NetworkConstraint<Sc: Score> {
    pub constraint_ref: ConstraintRef,
    /// Declared weight with overrides and the impact sign applied.
    pub weight: Sc,
    pub justify: Option<JustifyFn<Sc>>,
}

/// Immutable, shareable topology of a constraint set.
pub struct ConstraintNetwork<Sc: Score> {
    nodes: Vec<NodeDef>,
    /// Queue-owning nodes per layer, lowest layer first.
    layers: Vec<Vec<NodeId>>,
    sources: HashMap<TypeId, Vec<NodeId>>,
    constraints: Vec<NetworkConstraint<Sc>>,
    zero: Sc,
}

impl<Sc: Score> ConstraintNetwork<Sc> {
    /// Assigns layers and source routing. Every edge must point to a node
    /// created after its source.
    pub(crate) fn new(mut nodes: Vec<NodeDef>, constraints: Vec<NetworkConstraint<Sc>>, zero: Sc) -> Result<Self, NetworkError> {
        let mut parents: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
        for (index, node) in nodes.iter().enumerate() {
            for edge in &node.successors {
                if edge.target.0 <= index || edge.target.0 >= nodes.len() {
                    return Err(NetworkError::configuration(
                        "<network>",
                        format!("edge {} -> {} breaks creation order", NodeId(index), edge.target),
                    ));
                }
                parents[edge.target.0].push(index);
            }
        }

        let mut layer_count = 0;
        for index in 0..nodes.len() {
            let highest_parent = parents[index].iter().map(|p| nodes[*p].layer).max();
            let layer = match (&nodes[index].kind, highest_parent) {
                (NodeKind::ForEach(_), _) | (_, None) => 0,
                (kind, Some(parent)) if !kind.owns_queue() => parent,
                (_, Some(parent)) => parent + 1,
            };
            nodes[index].layer = layer;
            layer_count = layer_count.max(layer + 1);
        }

        let mut layers = vec![Vec::new(); layer_count];
        let mut sources: HashMap<TypeId, Vec<NodeId>> = HashMap::new();
        for (index, node) in nodes.iter().enumerate() {
            if node.kind.owns_queue() {
                layers[node.layer].push(NodeId(index));
            }
            if let NodeKind::ForEach(def) = &node.kind {
                sources.entry(def.type_id).or_default().push(NodeId(index));
            }
        }

        debug!(
            nodes = nodes.len(),
            layers = layers.len(),
            constraints = constraints.len(),
            "constraint network built"
        );
        Ok(Self {
            nodes,
            layers,
            sources,
            constraints,
            zero,
        })
    }

    /// Opens a session with its own tuples and running score.
    pub fn create_session(self: &Arc<Self>, config: &SessionConfig) -> ConstraintSession<Sc> {
        ConstraintSession::new(Arc::clone(self), config)
    }

    pub fn constraint_refs(&self) -> impl Iterator<Item = &ConstraintRef> {
        self.constraints.iter().map(|c| &c.constraint_ref)
    }

    /// Effective weight of a constraint by id, if it survived the build.
    pub fn constraint_weight(&self, constraint_id: &str) -> Option<&Sc> {
        self.constraints
            .iter()
            .find(|c| c.constraint_ref.full_name() == constraint_id)
            .map(|c| &c.weight)
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Names of the nodes in creation order.
    pub fn node_names(&self) -> Vec<&'static str> {
        self.nodes.iter().map(|n| n.kind.name()).collect()
    }

    pub fn zero(&self) -> &Sc {
        &self.zero
    }

    pub(crate) fn node(&self, id: NodeId) -> &NodeDef {
        &self.nodes[id.0]
    }

    pub(crate) fn nodes(&self) -> &[NodeDef] {
        &self.nodes
    }

    pub(crate) fn layers(&self) -> &[Vec<NodeId>] {
        &self.layers
    }

    pub(crate) fn sources(&self, type_id: TypeId) -> &[NodeId] {
        self.sources.get(&type_id).map(Vec::as_slice).unwrap_or_default()
    }

    pub(crate) fn constraints(&self) -> &[NetworkConstraint<Sc>] {
        &self.constraints
    }
}

impl<Sc: Score> std::fmt::Debug for ConstraintNetwork<Sc> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstraintNetwork")
            .field("nodes", &self.node_names())
            .field("layers", &self.layers.len())
            .field("constraints", &self.constraints.iter().map(|c| c.constraint_ref.full_name()).collect::<Vec<_>>())
            .finish()
    }
}
