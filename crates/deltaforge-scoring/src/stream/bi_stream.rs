//! Streams of fact pairs.

use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::Arc;

use deltaforge_core::Score;

use super::{append, Graph, Joiner, TriStream, UniStream};
use crate::collector::erased::CollectorAdapter;
use crate::collector::BiCollector;
use crate::fact::Fact;
use crate::index::EqualKey;
use crate::node::{FilterDef, GroupDef, MapDef, NodeKind, TupleKeyFn};
use crate::reversible::Reversible;
use crate::tuple::Tuple;

/// A stream of tuples holding an `A` and a `B`.
pub struct BiStream<A, B, Sc: Score> {
    pub(crate) graph: Graph<Sc>,
    pub(crate) node: usize,
    _phantom: PhantomData<fn() -> (A, B)>,
}

impl<A, B, Sc: Score> Clone for BiStream<A, B, Sc> {
    fn clone(&self) -> Self {
        Self::new(Rc::clone(&self.graph), self.node)
    }
}

impl<A, B, Sc: Score> BiStream<A, B, Sc> {
    pub(crate) fn new(graph: Graph<Sc>, node: usize) -> Self {
        Self {
            graph,
            node,
            _phantom: PhantomData,
        }
    }
}

impl<A: Fact, B: Fact, Sc: Score> BiStream<A, B, Sc> {
    pub fn filter<P>(self, predicate: P) -> Self
    where
        P: Fn(&A, &B) -> bool + Send + Sync + 'static,
    {
        let kind = NodeKind::Filter(FilterDef {
            predicate: Arc::new(tuple_fn!(predicate; A: 0, B: 1)),
        });
        let node = append(&self.graph, kind, self.node, None);
        Self::new(self.graph, node)
    }

    pub fn join<C: Fact>(self, other: UniStream<C, Sc>, joiner: Joiner<(A, B), C>) -> TriStream<A, B, C, Sc> {
        let node = append(&self.graph, NodeKind::Join(joiner.into_def()), self.node, Some((&other.graph, other.node)));
        TriStream::new(self.graph, node)
    }

    pub fn if_exists<C: Fact>(self, other: UniStream<C, Sc>, joiner: Joiner<(A, B), C>) -> Self {
        self.exists(other, joiner, true)
    }

    pub fn if_not_exists<C: Fact>(self, other: UniStream<C, Sc>, joiner: Joiner<(A, B), C>) -> Self {
        self.exists(other, joiner, false)
    }

    fn exists<C: Fact>(self, other: UniStream<C, Sc>, joiner: Joiner<(A, B), C>, should_exist: bool) -> Self {
        let kind = NodeKind::Exists {
            def: joiner.into_def(),
            should_exist,
        };
        let node = append(&self.graph, kind, self.node, Some((&other.graph, other.node)));
        Self::new(self.graph, node)
    }

    /// Groups pairs by `key` and folds each group with `collector`.
    ///
    /// ```
    /// use deltaforge_core::SimpleScore;
    /// use deltaforge_scoring::collector::{count, on_pair};
    /// use deltaforge_scoring::stream::{joiner::equal, ConstraintFactory};
    ///
    /// let factory = ConstraintFactory::<SimpleScore>::new();
    /// factory
    ///     .for_each_unique_pair(equal(|n: &u32| *n))
    ///     .group_by(|a: &u32, _: &u32| *a, on_pair(|_: &u32, _: &u32| (), count::<()>()))
    ///     .penalize_with(SimpleScore::of(1), |_: &u32, pairs: &usize| *pairs as i64)
    ///     .as_constraint("Crowded value");
    /// assert!(factory.build().is_ok());
    /// ```
    pub fn group_by<K, F, C>(self, key: F, collector: C) -> BiStream<K, C::Result, Sc>
    where
        K: Hash + Eq + Debug + 'static,
        F: Fn(&A, &B) -> K + Send + Sync + 'static,
        C: BiCollector<A, B> + 'static,
        C::Value: 'static,
        C::Accumulator: 'static,
        <C::Accumulator as Reversible<C::Value>>::Undo: 'static,
    {
        let def = GroupDef {
            key: Some(pair_key(key)),
            collector: Some(Arc::new(CollectorAdapter::bi::<A, B, C>(collector))),
        };
        let node = append(&self.graph, NodeKind::Group(def), self.node, None);
        BiStream::new(self.graph, node)
    }

    /// Distinct keys of the pairs.
    pub fn group_by_key<K, F>(self, key: F) -> UniStream<K, Sc>
    where
        K: Hash + Eq + Debug + 'static,
        F: Fn(&A, &B) -> K + Send + Sync + 'static,
    {
        let def = GroupDef {
            key: Some(pair_key(key)),
            collector: None,
        };
        let node = append(&self.graph, NodeKind::Group(def), self.node, None);
        UniStream::new(self.graph, node)
    }

    /// Folds every pair into one result, emitted while the stream is not
    /// empty.
    pub fn group_by_collector<C>(self, collector: C) -> UniStream<C::Result, Sc>
    where
        C: BiCollector<A, B> + 'static,
        C::Value: 'static,
        C::Accumulator: 'static,
        <C::Accumulator as Reversible<C::Value>>::Undo: 'static,
    {
        let def = GroupDef {
            key: None,
            collector: Some(Arc::new(CollectorAdapter::bi::<A, B, C>(collector))),
        };
        let node = append(&self.graph, NodeKind::Group(def), self.node, None);
        UniStream::new(self.graph, node)
    }

    /// Maps each pair to a value. Equal values share one fact, so a
    /// following `distinct` merges them.
    pub fn map<C, F>(self, mapper: F) -> UniStream<C, Sc>
    where
        C: Hash + Eq + Debug + 'static,
        F: Fn(&A, &B) -> C + Send + Sync + 'static,
    {
        let def = MapDef {
            mapper: Arc::new(move |t: &Tuple| Some(EqualKey::new(mapper(t.fact_as::<A>(0)?, t.fact_as::<B>(1)?)))),
        };
        let node = append(&self.graph, NodeKind::Map(def), self.node, None);
        UniStream::new(self.graph, node)
    }

    /// Forwards each combination of facts once.
    pub fn distinct(self) -> Self {
        let node = append(&self.graph, NodeKind::Distinct, self.node, None);
        Self::new(self.graph, node)
    }

    pub fn concat(self, other: BiStream<A, B, Sc>) -> Self {
        let node = append(&self.graph, NodeKind::Concat, self.node, Some((&other.graph, other.node)));
        Self::new(self.graph, node)
    }

    impl_scoring_methods!(A: 0, B: 1);
}

fn pair_key<A: Fact, B: Fact, K, F>(key: F) -> TupleKeyFn
where
    K: Hash + Eq + Debug + 'static,
    F: Fn(&A, &B) -> K + Send + Sync + 'static,
{
    Arc::new(move |t: &Tuple| Some(EqualKey::new(key(t.fact_as::<A>(0)?, t.fact_as::<B>(1)?))))
}
