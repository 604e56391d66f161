//! Counting collectors.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::marker::PhantomData;

use super::{Accumulator, UniCollector};
use crate::reversible::{Reversible, UndoError};

/// Creates a collector that counts inputs.
///
/// # Example
///
/// ```
/// use deltaforge_scoring::collector::{count, Accumulator, UniCollector};
/// use deltaforge_scoring::Reversible;
///
/// let collector = count::<i32>();
/// let mut acc = collector.create_accumulator();
///
/// acc.apply(collector.extract(&1));
/// let two = acc.apply(collector.extract(&2));
/// acc.apply(collector.extract(&3));
/// assert_eq!(acc.finish(), 3);
///
/// acc.revert(two).unwrap();
/// assert_eq!(acc.finish(), 2);
/// ```
pub fn count<A>() -> CountCollector<A> {
    CountCollector {
        _phantom: PhantomData,
    }
}

/// Created by [`count()`].
pub struct CountCollector<A> {
    _phantom: PhantomData<fn(&A)>,
}

impl<A> UniCollector<A> for CountCollector<A> {
    type Value = ();
    type Result = usize;
    type Accumulator = CountAccumulator;

    #[inline]
    fn extract(&self, _entity: &A) {}

    fn create_accumulator(&self) -> Self::Accumulator {
        CountAccumulator { count: 0 }
    }
}

#[derive(Debug, Default)]
pub struct CountAccumulator {
    count: usize,
}

impl Reversible<()> for CountAccumulator {
    type Undo = ();

    #[inline]
    fn apply(&mut self, _: ()) {
        self.count += 1;
    }

    fn revert(&mut self, _: ()) -> Result<(), UndoError> {
        self.count = self
            .count
            .checked_sub(1)
            .ok_or_else(|| UndoError("count is already zero".to_string()))?;
        Ok(())
    }
}

impl Accumulator<(), usize> for CountAccumulator {
    #[inline]
    fn finish(&self) -> usize {
        self.count
    }
}

/// Creates a collector that counts distinct keys among the inputs.
pub fn count_distinct<A, K, F>(key: F) -> CountDistinctCollector<A, K, F>
where
    K: Hash + Eq + Clone + Debug,
    F: Fn(&A) -> K + Send + Sync,
{
    CountDistinctCollector {
        key,
        _phantom: PhantomData,
    }
}

/// Created by [`count_distinct()`].
pub struct CountDistinctCollector<A, K, F> {
    key: F,
    _phantom: PhantomData<fn(&A) -> K>,
}

impl<A, K, F> UniCollector<A> for CountDistinctCollector<A, K, F>
where
    K: Hash + Eq + Clone + Debug,
    F: Fn(&A) -> K + Send + Sync,
{
    type Value = K;
    type Result = usize;
    type Accumulator = CountDistinctAccumulator<K>;

    fn extract(&self, entity: &A) -> K {
        (self.key)(entity)
    }

    fn create_accumulator(&self) -> Self::Accumulator {
        CountDistinctAccumulator {
            counts: HashMap::new(),
        }
    }
}

#[derive(Debug)]
pub struct CountDistinctAccumulator<K> {
    counts: HashMap<K, usize>,
}

impl<K: Hash + Eq + Clone + Debug> Reversible<K> for CountDistinctAccumulator<K> {
    type Undo = K;

    fn apply(&mut self, key: K) -> K {
        *self.counts.entry(key.clone()).or_insert(0) += 1;
        key
    }

    fn revert(&mut self, key: K) -> Result<(), UndoError> {
        let count = self
            .counts
            .get_mut(&key)
            .ok_or_else(|| UndoError(format!("key {key:?} was never counted")))?;
        *count -= 1;
        if *count == 0 {
            self.counts.remove(&key);
        }
        Ok(())
    }
}

impl<K: Hash + Eq + Clone + Debug> Accumulator<K, usize> for CountDistinctAccumulator<K> {
    fn finish(&self) -> usize {
        self.counts.len()
    }
}
