//! Type-erased collectors as stored in group nodes.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::Arc;

use super::{Accumulator, BiCollector, UniCollector};
use crate::error::{NetworkError, ProtocolViolation};
use crate::fact::{Fact, FactRef};
use crate::node::NodeId;
use crate::reversible::Reversible;
use crate::tuple::{Tuple, TupleId};

pub(crate) trait ErasedCollector: Send + Sync {
    fn create(&self) -> Box<dyn ErasedAccumulator>;
}

/// One group's accumulator, holding the undo token of every input.
pub(crate) trait ErasedAccumulator {
    fn insert(&mut self, node: NodeId, id: TupleId, tuple: &Tuple) -> Result<(), NetworkError>;

    fn retract(&mut self, node: NodeId, id: TupleId) -> Result<(), NetworkError>;

    fn result(&self) -> FactRef;
}

type Extractor<V> = Arc<dyn Fn(&Tuple) -> Option<V> + Send + Sync>;
type Factory<Acc> = Arc<dyn Fn() -> Acc + Send + Sync>;

/// A collector of any arity, reduced to reading its value out of a tuple
/// and creating accumulators.
pub(crate) struct CollectorAdapter<V, R, Acc> {
    extract: Extractor<V>,
    create: Factory<Acc>,
    input: &'static str,
    _result: PhantomData<fn() -> R>,
}

impl<V: 'static, R, Acc: 'static> CollectorAdapter<V, R, Acc> {
    pub(crate) fn uni<A, C>(collector: C) -> Self
    where
        A: Fact,
        C: UniCollector<A, Value = V, Result = R, Accumulator = Acc> + 'static,
    {
        let collector = Arc::new(collector);
        let creator = Arc::clone(&collector);
        Self {
            extract: Arc::new(move |t: &Tuple| Some(collector.extract(t.fact_as::<A>(0)?))),
            create: Arc::new(move || creator.create_accumulator()),
            input: std::any::type_name::<A>(),
            _result: PhantomData,
        }
    }

    pub(crate) fn bi<A, B, C>(collector: C) -> Self
    where
        A: Fact,
        B: Fact,
        C: BiCollector<A, B, Value = V, Result = R, Accumulator = Acc> + 'static,
    {
        let collector = Arc::new(collector);
        let creator = Arc::clone(&collector);
        Self {
            extract: Arc::new(move |t: &Tuple| Some(collector.extract(t.fact_as::<A>(0)?, t.fact_as::<B>(1)?))),
            create: Arc::new(move || creator.create_accumulator()),
            input: std::any::type_name::<(A, B)>(),
            _result: PhantomData,
        }
    }
}

impl<V, R, Acc> ErasedCollector for CollectorAdapter<V, R, Acc>
where
    V: 'static,
    R: Fact + Clone,
    Acc: Accumulator<V, R> + 'static,
    <Acc as Reversible<V>>::Undo: 'static,
{
    fn create(&self) -> Box<dyn ErasedAccumulator> {
        Box::new(AccumulatorAdapter {
            accumulator: (self.create)(),
            extract: Arc::clone(&self.extract),
            input: self.input,
            undo: HashMap::new(),
            _result: PhantomData,
        })
    }
}

struct AccumulatorAdapter<V, Acc: Reversible<V>, R> {
    accumulator: Acc,
    extract: Extractor<V>,
    input: &'static str,
    undo: HashMap<TupleId, <Acc as Reversible<V>>::Undo>,
    _result: PhantomData<fn() -> R>,
}

impl<V, Acc, R> ErasedAccumulator for AccumulatorAdapter<V, Acc, R>
where
    R: Fact + Clone,
    Acc: Accumulator<V, R>,
{
    fn insert(&mut self, node: NodeId, id: TupleId, tuple: &Tuple) -> Result<(), NetworkError> {
        if self.undo.contains_key(&id) {
            return Err(ProtocolViolation::DoubleInsert { node, tuple: id }.into());
        }
        let value = (self.extract)(tuple).ok_or_else(|| NetworkError::shape(node, self.input))?;
        let token = self.accumulator.apply(value);
        self.undo.insert(id, token);
        Ok(())
    }

    fn retract(&mut self, node: NodeId, id: TupleId) -> Result<(), NetworkError> {
        let token = self
            .undo
            .remove(&id)
            .ok_or(ProtocolViolation::RetractWithoutInsert { node, tuple: id })?;
        self.accumulator.revert(token)?;
        Ok(())
    }

    fn result(&self) -> FactRef {
        Rc::new(self.accumulator.finish())
    }
}
