// Constraint factory: entry point of the stream API and builder of the
// network.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::Arc;

use deltaforge_core::{ImpactType, Score, ScoreLevelNumber};
use tracing::{debug, warn};

use super::joiner::JoinerPart;
use super::{BiStream, Graph, GraphBuilder, Joiner, PendingNode, UniStream};
use crate::api::ConstraintWeightOverrides;
use crate::error::NetworkError;
use crate::fact::{downcast_fact, Fact, FactId, FactRef};
use crate::index::{Comparison, OrderedKey};
use crate::network::{ConstraintNetwork, NetworkConstraint};
use crate::node::{Edge, FactPredicate, ForEachDef, NodeDef, NodeId, NodeKind, ScorerDef, Side};
use crate::tuple::Tuple;

// Entry point for declaring constraints.
//
// Streams created by one factory share its graph. `build` turns the
// declared constraints into an immutable `ConstraintNetwork`.
//
// # Example
//
// ```
// use deltaforge_core::SimpleScore;
// use deltaforge_scoring::stream::ConstraintFactory;
//
// #[derive(Debug)]
// struct Visit { late: bool }
//
// let factory = ConstraintFactory::<SimpleScore>::new().with_package("routing");
// let late = factory
//     .for_each::<Visit>()
//     .filter(|v: &Visit| v.late)
//     .penalize(SimpleScore::of(1))
//     .as_constraint("Late visit");
// assert_eq!(late.full_name(), "routing/Late visit");
//
// let network = factory.build().unwrap();
// assert_eq!(network.constraint_count(), 1);
// ```
pub struct ConstraintFactory<Sc: Score> {
    graph: Graph<Sc>,
}

impl<Sc: Score> ConstraintFactory<Sc> {
    pub fn new() -> Self {
        Self::with_zero(Sc::zero())
    }

    // Scores of this network take the shape of `zero`; bendable scores
    // need it to fix their level counts.
    pub fn with_zero(zero: Sc) -> Self {
        Self {
            graph: Rc::new(RefCell::new(GraphBuilder::new(zero))),
        }
    }

    // Package of the constraints declared from now on.
    pub fn with_package(self, package: impl Into<String>) -> Self {
        self.graph.borrow_mut().package = package.into();
        self
    }

    // Weights replacing the declared ones, by constraint id.
    pub fn with_weight_overrides(self, overrides: ConstraintWeightOverrides<Sc>) -> Self {
        self.graph.borrow_mut().overrides = overrides;
        self
    }

    // Every fact of type `A`. Repeated calls share one source node.
    pub fn for_each<A: Fact>(&self) -> UniStream<A, Sc> {
        let mut graph = self.graph.borrow_mut();
        let type_id = TypeId::of::<A>();
        let existing = graph.shared_sources.get(&type_id).copied();
        let node = match existing {
            Some(node) => node,
            None => {
                let node = graph.add(NodeKind::ForEach(source_def::<A>(None, None)), &[]);
                graph.shared_sources.insert(type_id, node);
                node
            }
        };
        drop(graph);
        UniStream::new(Rc::clone(&self.graph), node)
    }

    // Facts of type `A` admitted by `predicate`, filtered at the source.
    pub fn for_each_filtered<A, P>(&self, predicate: P) -> UniStream<A, Sc>
    where
        A: Fact,
        P: Fn(&A) -> bool + Send + Sync + 'static,
    {
        let filter: FactPredicate =
            Arc::new(move |fact: &FactRef, _: Option<&dyn Any>| downcast_fact::<A>(fact).map(&predicate));
        let node = self
            .graph
            .borrow_mut()
            .add(NodeKind::ForEach(source_def::<A>(Some(filter), None)), &[]);
        UniStream::new(Rc::clone(&self.graph), node)
    }

    // Facts of type `A` admitted by `predicate` given the supply `key`
    // of type `S`. Sessions must be initialized with a `SupplyContext`
    // providing it before such facts are inserted.
    pub fn for_each_with_supply<A, S, P>(&self, key: &str, predicate: P) -> UniStream<A, Sc>
    where
        A: Fact,
        S: Any,
        P: Fn(&A, &S) -> bool + Send + Sync + 'static,
    {
        let filter: FactPredicate = Arc::new(move |fact: &FactRef, supply: Option<&dyn Any>| {
            let fact = downcast_fact::<A>(fact)?;
            let supply = supply?.downcast_ref::<S>()?;
            Some(predicate(fact, supply))
        });
        let node = self
            .graph
            .borrow_mut()
            .add(NodeKind::ForEach(source_def::<A>(Some(filter), Some(key.to_string()))), &[]);
        UniStream::new(Rc::clone(&self.graph), node)
    }

    // Each unordered pair of distinct `A` facts accepted by `joiner`,
    // reported once.
    pub fn for_each_unique_pair<A: Fact>(&self, joiner: Joiner<(A,), A>) -> BiStream<A, A, Sc> {
        let mut joiner = joiner;
        joiner.push(JoinerPart::Compare {
            left: Arc::new(|t: &Tuple| t.fact(0).map(|f| OrderedKey::new(FactId::of(f)))),
            relation: Comparison::LessThan,
            right: Arc::new(|t: &Tuple| t.fact(0).map(|f| OrderedKey::new(FactId::of(f)))),
        });
        self.for_each::<A>().join(self.for_each::<A>(), joiner)
    }

    // Validates the declared constraints and builds the network.
    //
    // Constraints whose effective weight is zero are dropped, together
    // with every node that feeds no remaining constraint.
    pub fn build(self) -> Result<Arc<ConstraintNetwork<Sc>>, NetworkError> {
        let mut graph = self.graph.borrow_mut();
        if let Some((constraint, message)) = graph.errors.first() {
            return Err(NetworkError::configuration(constraint.clone(), message.clone()));
        }

        let ids: Vec<String> = graph.constraints.iter().map(|c| c.constraint_ref.full_name()).collect();
        let mut seen = HashSet::new();
        if let Some(duplicate) = ids.iter().find(|id| !seen.insert(id.as_str())) {
            return Err(NetworkError::configuration(duplicate.clone(), "declared more than once"));
        }
        for unknown in graph.overrides.unknown_ids(&ids) {
            warn!(constraint = unknown, "weight override names no declared constraint");
        }

        let zero = graph.zero.clone();
        let pending = std::mem::take(&mut graph.constraints);
        let mut nodes = std::mem::take(&mut graph.nodes);
        let mut constraints = Vec::new();
        for constraint in pending {
            let id = constraint.constraint_ref.full_name();
            let weight = graph.overrides.get_or_default(&id, constraint.weight);
            if weight.is_zero() {
                debug!(constraint = %id, "zero weight, constraint culled");
                continue;
            }
            if weight.zeroed() != zero.zeroed() {
                return Err(NetworkError::configuration(
                    id,
                    format!("weight {weight} does not have the shape of score {zero}"),
                ));
            }
            if constraint.weigher.is_decimal() && !<Sc::Level as ScoreLevelNumber>::IS_DECIMAL {
                return Err(NetworkError::configuration(id, "decimal match weight on an integer score"));
            }
            let weight = match constraint.impact {
                ImpactType::Penalty => -weight,
                ImpactType::Reward | ImpactType::Mixed => weight,
            };

            let scorer = nodes.len();
            nodes.push(PendingNode {
                kind: NodeKind::Scorer(ScorerDef {
                    constraint: constraints.len(),
                    weigher: constraint.weigher,
                }),
                successors: Vec::new(),
            });
            nodes[constraint.parent].successors.push(Edge {
                target: NodeId(scorer),
                side: Side::Left,
            });
            constraints.push(NetworkConstraint {
                constraint_ref: constraint.constraint_ref,
                weight,
                justify: constraint.justify,
            });
        }
        drop(graph);

        ConstraintNetwork::new(prune(nodes), constraints, zero).map(Arc::new)
    }
}

impl<Sc: Score> Default for ConstraintFactory<Sc> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Sc: Score> std::fmt::Debug for ConstraintFactory<Sc> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let graph = self.graph.borrow();
        f.debug_struct("ConstraintFactory")
            .field("package", &graph.package)
            .field("nodes", &graph.nodes.len())
            .field("constraints", &graph.constraints.len())
            .finish()
    }
}

fn source_def<A: Fact>(filter: Option<FactPredicate>, supply_key: Option<String>) -> ForEachDef {
    ForEachDef {
        type_id: TypeId::of::<A>(),
        type_name: std::any::type_name::<A>(),
        filter,
        supply_key,
    }
}

// Drops nodes from which no scorer is reachable and renumbers the rest,
// preserving creation order.
fn prune(nodes: Vec<PendingNode>) -> Vec<NodeDef> {
    let mut live = vec![false; nodes.len()];
    for index in (0..nodes.len()).rev() {
        live[index] = matches!(nodes[index].kind, NodeKind::Scorer(_))
            || nodes[index].successors.iter().any(|edge| live[edge.target.0]);
    }
    let mut renumbered = vec![None; nodes.len()];
    let mut next = 0;
    for (index, alive) in live.iter().enumerate() {
        if *alive {
            renumbered[index] = Some(NodeId(next));
            next += 1;
        }
    }
    nodes
        .into_iter()
        .zip(live)
        .filter(|(_, alive)| *alive)
        .map(|(node, _)| NodeDef {
            kind: node.kind,
            layer: 0,
            successors: node
                .successors
                .into_iter()
                .filter_map(|edge| {
                    renumbered[edge.target.0].map(|target| Edge {
                        target,
                        side: edge.side,
                    })
                })
                .collect(),
        })
        .collect()
}
