use std::marker::PhantomData;

use super::{Accumulator, UniCollector};
use crate::fact::Fact;

/// A collector over tuples of two facts.
pub trait BiCollector<A, B>: Send + Sync {
    type Value;
    type Result: Fact + Clone;
    type Accumulator: Accumulator<Self::Value, Self::Result>;

    fn extract(&self, a: &A, b: &B) -> Self::Value;

    fn create_accumulator(&self) -> Self::Accumulator;
}

/// Feeds each pair through `mapping` into a single-value collector.
///
/// ```
/// use deltaforge_scoring::collector::{count, on_pair, sum, Accumulator, BiCollector};
/// use deltaforge_scoring::Reversible;
///
/// let spread = on_pair(|low: &i64, high: &i64| high - low, sum(|gap: &i64| *gap));
/// let mut acc = spread.create_accumulator();
/// acc.apply(spread.extract(&1, &4));
/// acc.apply(spread.extract(&2, &3));
/// assert_eq!(acc.finish(), 4);
///
/// let pairs = on_pair(|_: &i64, _: &i64| (), count::<()>());
/// assert_eq!(pairs.create_accumulator().finish(), 0);
/// ```
pub fn on_pair<A, B, V, F, C>(mapping: F, collector: C) -> PairCollector<A, B, V, F, C>
where
    F: Fn(&A, &B) -> V + Send + Sync,
    C: UniCollector<V>,
{
    PairCollector {
        mapping,
        collector,
        _phantom: PhantomData,
    }
}

/// Created by [`on_pair()`].
pub struct PairCollector<A, B, V, F, C> {
    mapping: F,
    collector: C,
    _phantom: PhantomData<fn(&A, &B) -> V>,
}

impl<A, B, V, F, C> BiCollector<A, B> for PairCollector<A, B, V, F, C>
where
    F: Fn(&A, &B) -> V + Send + Sync,
    C: UniCollector<V>,
{
    type Value = C::Value;
    type Result = C::Result;
    type Accumulator = C::Accumulator;

    fn extract(&self, a: &A, b: &B) -> C::Value {
        self.collector.extract(&(self.mapping)(a, b))
    }

    fn create_accumulator(&self) -> C::Accumulator {
        self.collector.create_accumulator()
    }
}
