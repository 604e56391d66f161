//! Streams of single facts.

use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::Arc;

use deltaforge_core::Score;

use super::{append, BiStream, Graph, Joiner};
use crate::collector::erased::CollectorAdapter;
use crate::collector::UniCollector;
use crate::fact::{Fact, FactRef};
use crate::index::EqualKey;
use crate::node::{FilterDef, FlattenDef, GroupDef, MapDef, NodeKind};
use crate::reversible::Reversible;
use crate::tuple::Tuple;

/// A stream of tuples holding one fact of type `A`.
pub struct UniStream<A, Sc: Score> {
    pub(crate) graph: Graph<Sc>,
    pub(crate) node: usize,
    _phantom: PhantomData<fn() -> A>,
}

impl<A, Sc: Score> Clone for UniStream<A, Sc> {
    fn clone(&self) -> Self {
        Self::new(Rc::clone(&self.graph), self.node)
    }
}

impl<A, Sc: Score> UniStream<A, Sc> {
    pub(crate) fn new(graph: Graph<Sc>, node: usize) -> Self {
        Self {
            graph,
            node,
            _phantom: PhantomData,
        }
    }
}

impl<A: Fact, Sc: Score> UniStream<A, Sc> {
    /// Keeps the facts for which `predicate` holds. The predicate is
    /// re-evaluated whenever the fact is updated.
    pub fn filter<P>(self, predicate: P) -> Self
    where
        P: Fn(&A) -> bool + Send + Sync + 'static,
    {
        let kind = NodeKind::Filter(FilterDef {
            predicate: Arc::new(tuple_fn!(predicate; A: 0)),
        });
        let node = append(&self.graph, kind, self.node, None);
        Self::new(self.graph, node)
    }

    /// Pairs every fact with each fact of `other` accepted by `joiner`.
    pub fn join<B: Fact>(self, other: UniStream<B, Sc>, joiner: Joiner<(A,), B>) -> BiStream<A, B, Sc> {
        let node = append(&self.graph, NodeKind::Join(joiner.into_def()), self.node, Some((&other.graph, other.node)));
        BiStream::new(self.graph, node)
    }

    /// Keeps the facts for which at least one fact of `other` matches.
    pub fn if_exists<B: Fact>(self, other: UniStream<B, Sc>, joiner: Joiner<(A,), B>) -> Self {
        self.exists(other, joiner, true)
    }

    /// Keeps the facts for which no fact of `other` matches.
    pub fn if_not_exists<B: Fact>(self, other: UniStream<B, Sc>, joiner: Joiner<(A,), B>) -> Self {
        self.exists(other, joiner, false)
    }

    fn exists<B: Fact>(self, other: UniStream<B, Sc>, joiner: Joiner<(A,), B>, should_exist: bool) -> Self {
        let kind = NodeKind::Exists {
            def: joiner.into_def(),
            should_exist,
        };
        let node = append(&self.graph, kind, self.node, Some((&other.graph, other.node)));
        Self::new(self.graph, node)
    }

    /// Groups facts by `key` and folds each group with `collector`,
    /// yielding one `(key, result)` pair per non-empty group.
    pub fn group_by<K, F, C>(self, key: F, collector: C) -> BiStream<K, C::Result, Sc>
    where
        K: Hash + Eq + Debug + 'static,
        F: Fn(&A) -> K + Send + Sync + 'static,
        C: UniCollector<A> + 'static,
        C::Value: 'static,
        C::Accumulator: 'static,
        <C::Accumulator as Reversible<C::Value>>::Undo: 'static,
    {
        let def = GroupDef {
            key: Some(Arc::new(move |t: &Tuple| Some(EqualKey::new(key(t.fact_as::<A>(0)?))))),
            collector: Some(Arc::new(CollectorAdapter::uni::<A, C>(collector))),
        };
        let node = append(&self.graph, NodeKind::Group(def), self.node, None);
        BiStream::new(self.graph, node)
    }

    /// Distinct keys of the stream.
    pub fn group_by_key<K, F>(self, key: F) -> UniStream<K, Sc>
    where
        K: Hash + Eq + Debug + 'static,
        F: Fn(&A) -> K + Send + Sync + 'static,
    {
        let def = GroupDef {
            key: Some(Arc::new(move |t: &Tuple| Some(EqualKey::new(key(t.fact_as::<A>(0)?))))),
            collector: None,
        };
        let node = append(&self.graph, NodeKind::Group(def), self.node, None);
        UniStream::new(self.graph, node)
    }

    /// Folds the whole stream into one result. Nothing is emitted while the
    /// stream is empty.
    pub fn group_by_collector<C>(self, collector: C) -> UniStream<C::Result, Sc>
    where
        C: UniCollector<A> + 'static,
        C::Value: 'static,
        C::Accumulator: 'static,
        <C::Accumulator as Reversible<C::Value>>::Undo: 'static,
    {
        let def = GroupDef {
            key: None,
            collector: Some(Arc::new(CollectorAdapter::uni::<A, C>(collector))),
        };
        let node = append(&self.graph, NodeKind::Group(def), self.node, None);
        UniStream::new(self.graph, node)
    }

    /// Maps each fact to a value. Equal values share one fact, so a
    /// following `distinct` merges them.
    pub fn map<B, F>(self, mapper: F) -> UniStream<B, Sc>
    where
        B: Hash + Eq + Debug + 'static,
        F: Fn(&A) -> B + Send + Sync + 'static,
    {
        let def = MapDef {
            mapper: Arc::new(move |t: &Tuple| Some(EqualKey::new(mapper(t.fact_as::<A>(0)?)))),
        };
        let node = append(&self.graph, NodeKind::Map(def), self.node, None);
        UniStream::new(self.graph, node)
    }

    /// Replaces each fact by the facts `expand` returns for it.
    ///
    /// Returning the same `Rc`s across updates keeps the downstream tuples
    /// alive instead of replacing them.
    pub fn flatten_last<B, F>(self, expand: F) -> UniStream<B, Sc>
    where
        B: Fact,
        F: Fn(&A) -> Vec<Rc<B>> + Send + Sync + 'static,
    {
        let def = FlattenDef {
            expander: Arc::new(move |t: &Tuple| {
                let items: Vec<FactRef> = expand(t.fact_as::<A>(0)?)
                    .into_iter()
                    .map(|item| item as FactRef)
                    .collect();
                Some(items)
            }),
        };
        let node = append(&self.graph, NodeKind::Flatten(def), self.node, None);
        UniStream::new(self.graph, node)
    }

    /// Forwards each fact once, however many tuples carry it.
    pub fn distinct(self) -> Self {
        let node = append(&self.graph, NodeKind::Distinct, self.node, None);
        Self::new(self.graph, node)
    }

    /// Tuples of both streams.
    pub fn concat(self, other: UniStream<A, Sc>) -> Self {
        let node = append(&self.graph, NodeKind::Concat, self.node, Some((&other.graph, other.node)));
        Self::new(self.graph, node)
    }

    impl_scoring_methods!(A: 0);
}
