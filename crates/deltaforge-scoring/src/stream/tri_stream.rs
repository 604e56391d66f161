use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::Arc;

use deltaforge_core::Score;

use super::{append, Graph, UniStream};
use crate::fact::Fact;
use crate::index::EqualKey;
use crate::node::{FilterDef, MapDef, NodeKind};
use crate::tuple::Tuple;

/// A stream of tuples holding an `A`, a `B` and a `C`.
pub struct TriStream<A, B, C, Sc: Score> {
    pub(crate) graph: Graph<Sc>,
    pub(crate) node: usize,
    _phantom: PhantomData<fn() -> (A, B, C)>,
}

impl<A, B, C, Sc: Score> Clone for TriStream<A, B, C, Sc> {
    fn clone(&self) -> Self {
        Self::new(Rc::clone(&self.graph), self.node)
    }
}

impl<A, B, C, Sc: Score> TriStream<A, B, C, Sc> {
    pub(crate) fn new(graph: Graph<Sc>, node: usize) -> Self {
        Self {
            graph,
            node,
            _phantom: PhantomData,
        }
    }
}

impl<A: Fact, B: Fact, C: Fact, Sc: Score> TriStream<A, B, C, Sc> {
    pub fn filter<P>(self, predicate: P) -> Self
    where
        P: Fn(&A, &B, &C) -> bool + Send + Sync + 'static,
    {
        let kind = NodeKind::Filter(FilterDef {
            predicate: Arc::new(tuple_fn!(predicate; A: 0, B: 1, C: 2)),
        });
        let node = append(&self.graph, kind, self.node, None);
        Self::new(self.graph, node)
    }

    /// Maps each triple to a value. Equal values share one fact.
    pub fn map<D, F>(self, mapper: F) -> UniStream<D, Sc>
    where
        D: Hash + Eq + Debug + 'static,
        F: Fn(&A, &B, &C) -> D + Send + Sync + 'static,
    {
        let def = MapDef {
            mapper: Arc::new(move |t: &Tuple| {
                Some(EqualKey::new(mapper(t.fact_as::<A>(0)?, t.fact_as::<B>(1)?, t.fact_as::<C>(2)?)))
            }),
        };
        let node = append(&self.graph, NodeKind::Map(def), self.node, None);
        UniStream::new(self.graph, node)
    }

    impl_scoring_methods!(A: 0, B: 1, C: 2);
}
