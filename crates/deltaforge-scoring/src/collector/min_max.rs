//! Minimum and maximum collectors.
//!
//! Both keep a multiset of every value seen, so retracting the current
//! extreme reveals the next one without rescanning the group.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::marker::PhantomData;

use super::{Accumulator, UniCollector};
use crate::reversible::{Reversible, UndoError};

/// Smallest mapped value of the group, `None` when it is empty.
pub fn min<A, T, F>(mapper: F) -> MinCollector<A, T, F>
where
    T: Ord + Clone + Debug + 'static,
    F: Fn(&A) -> T + Send + Sync,
{
    MinCollector {
        mapper,
        _phantom: PhantomData,
    }
}

/// Largest mapped value of the group, `None` when it is empty.
pub fn max<A, T, F>(mapper: F) -> MaxCollector<A, T, F>
where
    T: Ord + Clone + Debug + 'static,
    F: Fn(&A) -> T + Send + Sync,
{
    MaxCollector {
        mapper,
        _phantom: PhantomData,
    }
}

pub struct MinCollector<A, T, F> {
    mapper: F,
    _phantom: PhantomData<fn(&A) -> T>,
}

pub struct MaxCollector<A, T, F> {
    mapper: F,
    _phantom: PhantomData<fn(&A) -> T>,
}

impl<A, T, F> UniCollector<A> for MinCollector<A, T, F>
where
    T: Ord + Clone + Debug + 'static,
    F: Fn(&A) -> T + Send + Sync,
{
    type Value = T;
    type Result = Option<T>;
    type Accumulator = OrderedAccumulator<T>;

    fn extract(&self, entity: &A) -> T {
        (self.mapper)(entity)
    }

    fn create_accumulator(&self) -> Self::Accumulator {
        OrderedAccumulator::new(false)
    }
}

impl<A, T, F> UniCollector<A> for MaxCollector<A, T, F>
where
    T: Ord + Clone + Debug + 'static,
    F: Fn(&A) -> T + Send + Sync,
{
    type Value = T;
    type Result = Option<T>;
    type Accumulator = OrderedAccumulator<T>;

    fn extract(&self, entity: &A) -> T {
        (self.mapper)(entity)
    }

    fn create_accumulator(&self) -> Self::Accumulator {
        OrderedAccumulator::new(true)
    }
}

#[derive(Debug)]
pub struct OrderedAccumulator<T> {
    values: BTreeMap<T, usize>,
    largest: bool,
}

impl<T> OrderedAccumulator<T> {
    fn new(largest: bool) -> Self {
        Self {
            values: BTreeMap::new(),
            largest,
        }
    }
}

impl<T: Ord + Clone + Debug> Reversible<T> for OrderedAccumulator<T> {
    type Undo = T;

    fn apply(&mut self, value: T) -> T {
        *self.values.entry(value.clone()).or_insert(0) += 1;
        value
    }

    fn revert(&mut self, value: T) -> Result<(), UndoError> {
        let count = self
            .values
            .get_mut(&value)
            .ok_or_else(|| UndoError(format!("value {value:?} was never collected")))?;
        *count -= 1;
        if *count == 0 {
            self.values.remove(&value);
        }
        Ok(())
    }
}

impl<T: Ord + Clone + Debug> Accumulator<T, Option<T>> for OrderedAccumulator<T> {
    fn finish(&self) -> Option<T> {
        let extreme = if self.largest {
            self.values.last_key_value()
        } else {
            self.values.first_key_value()
        };
        extreme.map(|(value, _)| value.clone())
    }
}
