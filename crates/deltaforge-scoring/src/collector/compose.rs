// Composite collectors: several collectors over the same group, combined
// into one result.

use std::marker::PhantomData;
use std::sync::Arc;

use super::{Accumulator, UniCollector};
use crate::fact::Fact;
use crate::reversible::{Reversible, UndoError};

// Runs two collectors side by side and merges their results.
//
// # Example
//
// ```
// use deltaforge_scoring::collector::{compose2, count, sum, Accumulator, UniCollector};
// use deltaforge_scoring::Reversible;
//
// let average = compose2(count::<i64>(), sum(|x: &i64| *x), |n: &usize, total: &i64| {
//     if *n == 0 { 0 } else { *total / *n as i64 }
// });
// let mut acc = average.create_accumulator();
// acc.apply(average.extract(&4));
// acc.apply(average.extract(&8));
// assert_eq!(acc.finish(), 6);
// ```
pub fn compose2<A, C1, C2, R, F>(first: C1, second: C2, combiner: F) -> Compose2Collector<A, C1, C2, R, F>
where
    C1: UniCollector<A>,
    C2: UniCollector<A>,
    R: Fact + Clone,
    F: Fn(&C1::Result, &C2::Result) -> R + Send + Sync,
{
    Compose2Collector {
        first,
        second,
        combiner: Arc::new(combiner),
        _phantom: PhantomData,
    }
}

pub struct Compose2Collector<A, C1, C2, R, F> {
    first: C1,
    second: C2,
    combiner: Arc<F>,
    _phantom: PhantomData<fn(&A) -> R>,
}

impl<A, C1, C2, R, F> UniCollector<A> for Compose2Collector<A, C1, C2, R, F>
where
    C1: UniCollector<A>,
    C2: UniCollector<A>,
    R: Fact + Clone,
    F: Fn(&C1::Result, &C2::Result) -> R + Send + Sync,
{
    type Value = (C1::Value, C2::Value);
    type Result = R;
    type Accumulator = Compose2Accumulator<C1::Accumulator, C2::Accumulator, C1::Result, C2::Result, F>;

    fn extract(&self, entity: &A) -> Self::Value {
        (self.first.extract(entity), self.second.extract(entity))
    }

    fn create_accumulator(&self) -> Self::Accumulator {
        Compose2Accumulator {
            first: self.first.create_accumulator(),
            second: self.second.create_accumulator(),
            combiner: Arc::clone(&self.combiner),
            _phantom: PhantomData,
        }
    }
}

pub struct Compose2Accumulator<A1, A2, R1, R2, F> {
    first: A1,
    second: A2,
    combiner: Arc<F>,
    _phantom: PhantomData<fn() -> (R1, R2)>,
}

impl<V1, V2, A1, A2, R1, R2, F> Reversible<(V1, V2)> for Compose2Accumulator<A1, A2, R1, R2, F>
where
    A1: Reversible<V1>,
    A2: Reversible<V2>,
{
    type Undo = (A1::Undo, A2::Undo);

    fn apply(&mut self, (first, second): (V1, V2)) -> Self::Undo {
        (self.first.apply(first), self.second.apply(second))
    }

    fn revert(&mut self, (first, second): Self::Undo) -> Result<(), UndoError> {
        self.first.revert(first)?;
        self.second.revert(second)
    }
}

impl<V1, V2, A1, A2, R1, R2, R, F> Accumulator<(V1, V2), R> for Compose2Accumulator<A1, A2, R1, R2, F>
where
    A1: Accumulator<V1, R1>,
    A2: Accumulator<V2, R2>,
    F: Fn(&R1, &R2) -> R,
{
    fn finish(&self) -> R {
        (self.combiner)(&self.first.finish(), &self.second.finish())
    }
}

// Runs three collectors side by side and merges their results.
pub fn compose3<A, C1, C2, C3, R, F>(
    first: C1,
    second: C2,
    third: C3,
    combiner: F,
) -> Compose3Collector<A, C1, C2, C3, R, F>
where
    C1: UniCollector<A>,
    C2: UniCollector<A>,
    C3: UniCollector<A>,
    R: Fact + Clone,
    F: Fn(&C1::Result, &C2::Result, &C3::Result) -> R + Send + Sync,
{
    Compose3Collector {
        first,
        second,
        third,
        combiner: Arc::new(combiner),
        _phantom: PhantomData,
    }
}

pub struct Compose3Collector<A, C1, C2, C3, R, F> {
    first: C1,
    second: C2,
    third: C3,
    combiner: Arc<F>,
    _phantom: PhantomData<fn(&A) -> R>,
}

impl<A, C1, C2, C3, R, F> UniCollector<A> for Compose3Collector<A, C1, C2, C3, R, F>
where
    C1: UniCollector<A>,
    C2: UniCollector<A>,
    C3: UniCollector<A>,
    R: Fact + Clone,
    F: Fn(&C1::Result, &C2::Result, &C3::Result) -> R + Send + Sync,
{
    type Value = (C1::Value, C2::Value, C3::Value);
    type Result = R;
    type Accumulator = Compose3Accumulator<
        (C1::Accumulator, C2::Accumulator, C3::Accumulator),
        (C1::Result, C2::Result, C3::Result),
        F,
    >;

    fn extract(&self, entity: &A) -> Self::Value {
        (
            self.first.extract(entity),
            self.second.extract(entity),
            self.third.extract(entity),
        )
    }

    fn create_accumulator(&self) -> Self::Accumulator {
        Compose3Accumulator {
            parts: (
                self.first.create_accumulator(),
                self.second.create_accumulator(),
                self.third.create_accumulator(),
            ),
            combiner: Arc::clone(&self.combiner),
            _phantom: PhantomData,
        }
    }
}

pub struct Compose3Accumulator<P, R, F> {
    parts: P,
    combiner: Arc<F>,
    _phantom: PhantomData<fn() -> R>,
}

impl<V1, V2, V3, A1, A2, A3, R, F> Reversible<(V1, V2, V3)> for Compose3Accumulator<(A1, A2, A3), R, F>
where
    A1: Reversible<V1>,
    A2: Reversible<V2>,
    A3: Reversible<V3>,
{
    type Undo = (A1::Undo, A2::Undo, A3::Undo);

    fn apply(&mut self, (first, second, third): (V1, V2, V3)) -> Self::Undo {
        (
            self.parts.0.apply(first),
            self.parts.1.apply(second),
            self.parts.2.apply(third),
        )
    }

    fn revert(&mut self, (first, second, third): Self::Undo) -> Result<(), UndoError> {
        self.parts.0.revert(first)?;
        self.parts.1.revert(second)?;
        self.parts.2.revert(third)
    }
}

impl<V1, V2, V3, A1, A2, A3, R1, R2, R3, R, F> Accumulator<(V1, V2, V3), R>
    for Compose3Accumulator<(A1, A2, A3), (R1, R2, R3), F>
where
    A1: Accumulator<V1, R1>,
    A2: Accumulator<V2, R2>,
    A3: Accumulator<V3, R3>,
    F: Fn(&R1, &R2, &R3) -> R,
{
    fn finish(&self) -> R {
        (self.combiner)(
            &self.parts.0.finish(),
            &self.parts.1.finish(),
            &self.parts.2.finish(),
        )
    }
}
