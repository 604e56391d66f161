use crate::fact::Fact;
use crate::reversible::Reversible;

/// A collector over tuples of a single fact type.
///
/// `extract` maps one input to the value the accumulator folds in; the
/// finished result becomes a fact of the group tuple.
pub trait UniCollector<A>: Send + Sync {
    type Value;
    type Result: Fact + Clone;
    type Accumulator: Accumulator<Self::Value, Self::Result>;

    fn extract(&self, entity: &A) -> Self::Value;

    fn create_accumulator(&self) -> Self::Accumulator;
}

/// A reversible fold producing a result snapshot on demand.
pub trait Accumulator<V, R>: Reversible<V> {
    fn finish(&self) -> R;
}
