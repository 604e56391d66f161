// Sum collector.

use std::fmt::Debug;
use std::marker::PhantomData;
use std::ops::{AddAssign, SubAssign};

use super::{Accumulator, UniCollector};
use crate::reversible::{Reversible, UndoError};

// Creates a collector that sums values extracted from inputs.
//
// # Example
//
// ```
// use deltaforge_scoring::collector::{sum, Accumulator, UniCollector};
// use deltaforge_scoring::Reversible;
//
// struct Item { value: i64 }
//
// let collector = sum(|item: &Item| item.value);
// let mut acc = collector.create_accumulator();
//
// acc.apply(collector.extract(&Item { value: 5 }));
// let three = acc.apply(collector.extract(&Item { value: 3 }));
// acc.apply(collector.extract(&Item { value: 7 }));
// assert_eq!(acc.finish(), 15);
//
// acc.revert(three).unwrap();
// assert_eq!(acc.finish(), 12);
// ```
pub fn sum<A, T, F>(mapper: F) -> SumCollector<A, T, F>
where
    T: Default + Copy + AddAssign + SubAssign + Debug + 'static,
    F: Fn(&A) -> T + Send + Sync,
{
    SumCollector {
        mapper,
        _phantom: PhantomData,
    }
}

// Created by [`sum()`].
pub struct SumCollector<A, T, F> {
    mapper: F,
    _phantom: PhantomData<fn(&A) -> T>,
}

impl<A, T, F> UniCollector<A> for SumCollector<A, T, F>
where
    T: Default + Copy + AddAssign + SubAssign + Debug + 'static,
    F: Fn(&A) -> T + Send + Sync,
{
    type Value = T;
    type Result = T;
    type Accumulator = SumAccumulator<T>;

    #[inline]
    fn extract(&self, entity: &A) -> T {
        (self.mapper)(entity)
    }

    fn create_accumulator(&self) -> Self::Accumulator {
        SumAccumulator {
            total: T::default(),
            terms: 0,
        }
    }
}

// Running total plus the number of terms, so an unmatched revert is caught.
#[derive(Debug)]
pub struct SumAccumulator<T> {
    total: T,
    terms: usize,
}

impl<T: Copy + AddAssign + SubAssign> Reversible<T> for SumAccumulator<T> {
    type Undo = T;

    #[inline]
    fn apply(&mut self, value: T) -> T {
        self.total += value;
        self.terms += 1;
        value
    }

    fn revert(&mut self, value: T) -> Result<(), UndoError> {
        self.terms = self
            .terms
            .checked_sub(1)
            .ok_or_else(|| UndoError("sum has no terms left".to_string()))?;
        self.total -= value;
        Ok(())
    }
}

impl<T: Copy + AddAssign + SubAssign> Accumulator<T, T> for SumAccumulator<T> {
    #[inline]
    fn finish(&self) -> T {
        self.total
    }
}
