//! Fluent constraint streams that compile into a [`ConstraintNetwork`].
//!
//! Streams are handles onto a shared graph under construction. Each
//! operation appends a node; a terminal `penalize`/`reward`/`impact`
//! followed by `as_constraint` registers a constraint. Building the
//! factory validates weights, drops nodes that feed no constraint and
//! assigns layers.
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use deltaforge_config::SessionConfig;
//! use deltaforge_core::HardSoftScore;
//! use deltaforge_scoring::stream::{joiner::equal, ConstraintFactory};
//!
//! #[derive(Debug)]
//! struct Lesson {
//!     room: Cell<u32>,
//! }
//!
//! let factory = ConstraintFactory::<HardSoftScore>::new();
//! factory
//!     .for_each_unique_pair(equal(|l: &Lesson| l.room.get()))
//!     .penalize(HardSoftScore::ONE_HARD)
//!     .as_constraint("Room conflict");
//! let network = factory.build().unwrap();
//!
//! let mut session = network.create_session(&SessionConfig::default());
//! let a = Rc::new(Lesson { room: Cell::new(1) });
//! let b = Rc::new(Lesson { room: Cell::new(2) });
//! session.insert(&a).unwrap();
//! session.insert(&b).unwrap();
//! assert_eq!(session.calculate_score(0).unwrap().score(), &HardSoftScore::ZERO);
//!
//! b.room.set(1);
//! session.update(&b).unwrap();
//! assert_eq!(session.calculate_score(0).unwrap().score(), &HardSoftScore::of_hard(-1));
//! ```
//!
//! [`ConstraintNetwork`]: crate::network::ConstraintNetwork

#[macro_use]
mod macros;

mod bi_stream;
mod constraint_builder;
mod factory;
pub mod joiner;
mod tri_stream;
mod uni_stream;


use std::any::TypeId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use deltaforge_core::{ConstraintRef, ImpactType, Score};

use crate::api::ConstraintWeightOverrides;
use crate::inliner::JustifyFn;
use crate::node::{Edge, MatchWeigher, NodeId, NodeKind, Side};

pub use bi_stream::BiStream;
pub use constraint_builder::ConstraintBuilder;
pub use factory::ConstraintFactory;
pub use joiner::Joiner;
pub use tri_stream::TriStream;
pub use uni_stream::UniStream;

pub(crate) type Graph<Sc> = Rc<RefCell<GraphBuilder<Sc>>>;

pub(crate) struct PendingNode {
    pub kind: NodeKind,
    pub successors: Vec<Edge>,
}

pub(crate) struct PendingConstraint<Sc: Score> {
    pub constraint_ref: ConstraintRef,
    pub weight: Sc,
    pub impact: ImpactType,
    pub weigher: MatchWeigher,
    pub parent: usize,
    pub justify: Option<JustifyFn<Sc>>,
}

/// Graph under construction, shared by a factory and its streams.
pub(crate) struct GraphBuilder<Sc: Score> {
    pub nodes: Vec<PendingNode>,
    /// Unfiltered sources, one per fact type.
    pub shared_sources: HashMap<TypeId, usize>,
    pub constraints: Vec<PendingConstraint<Sc>>,
    /// Misuse detected while streams were declared, reported at build.
    pub errors: Vec<(String, String)>,
    pub package: String,
    pub zero: Sc,
    pub overrides: ConstraintWeightOverrides<Sc>,
}

impl<Sc: Score> GraphBuilder<Sc> {
    pub fn new(zero: Sc) -> Self {
        Self {
            nodes: Vec::new(),
            shared_sources: HashMap::new(),
            constraints: Vec::new(),
            errors: Vec::new(),
            package: String::new(),
            zero,
            overrides: ConstraintWeightOverrides::new(),
        }
    }

    /// Appends a node fed by `parents` and returns its index.
    pub fn add(&mut self, kind: NodeKind, parents: &[(usize, Side)]) -> usize {
        let index = self.nodes.len();
        self.nodes.push(PendingNode {
            kind,
            successors: Vec::new(),
        });
        for &(parent, side) in parents {
            self.nodes[parent].successors.push(Edge {
                target: NodeId(index),
                side,
            });
        }
        index
    }
}

/// Adds a node fed by one stream and, optionally, a second stream of the
/// same graph on the right side.
pub(crate) fn append<Sc: Score>(graph: &Graph<Sc>, kind: NodeKind, left: usize, right: Option<(&Graph<Sc>, usize)>) -> usize {
    let mut builder = graph.borrow_mut();
    match right {
        Some((other, _)) if !Rc::ptr_eq(graph, other) => {
            let name = kind.name();
            builder
                .errors
                .push((name.to_string(), "both streams must come from the same factory".to_string()));
            builder.add(kind, &[(left, Side::Left)])
        }
        Some((_, right)) => builder.add(kind, &[(left, Side::Left), (right, Side::Right)]),
        None => builder.add(kind, &[(left, Side::Left)]),
    }
}
