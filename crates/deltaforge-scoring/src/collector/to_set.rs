//! Set and map collectors.
//!
//! Results are ordered collections so group tuples compare and print the
//! same way on every run.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;
use std::marker::PhantomData;

use super::{Accumulator, UniCollector};
use crate::reversible::{Reversible, UndoError};

pub fn to_set<A, T, F>(mapper: F) -> ToSetCollector<A, T, F>
where
    T: Ord + Clone + Debug + 'static,
    F: Fn(&A) -> T + Send + Sync,
{
    ToSetCollector {
        mapper,
        _phantom: PhantomData,
    }
}

pub struct ToSetCollector<A, T, F> {
    mapper: F,
    _phantom: PhantomData<fn(&A) -> T>,
}

impl<A, T, F> UniCollector<A> for ToSetCollector<A, T, F>
where
    T: Ord + Clone + Debug + 'static,
    F: Fn(&A) -> T + Send + Sync,
{
    type Value = T;
    type Result = BTreeSet<T>;
    type Accumulator = ToSetAccumulator<T>;

    fn extract(&self, entity: &A) -> T {
        (self.mapper)(entity)
    }

    fn create_accumulator(&self) -> Self::Accumulator {
        ToSetAccumulator {
            counts: BTreeMap::new(),
        }
    }
}

/// Multiset of collected values; the result holds each value once.
#[derive(Debug)]
pub struct ToSetAccumulator<T> {
    counts: BTreeMap<T, usize>,
}

impl<T: Ord + Clone + Debug> Reversible<T> for ToSetAccumulator<T> {
    type Undo = T;

    fn apply(&mut self, value: T) -> T {
        *self.counts.entry(value.clone()).or_insert(0) += 1;
        value
    }

    fn revert(&mut self, value: T) -> Result<(), UndoError> {
        let count = self
            .counts
            .get_mut(&value)
            .ok_or_else(|| UndoError(format!("value {value:?} is not in the set")))?;
        *count -= 1;
        if *count == 0 {
            self.counts.remove(&value);
        }
        Ok(())
    }
}

impl<T: Ord + Clone + Debug> Accumulator<T, BTreeSet<T>> for ToSetAccumulator<T> {
    fn finish(&self) -> BTreeSet<T> {
        self.counts.keys().cloned().collect()
    }
}

/// Collects `key -> {values}`; a key disappears with its last value.
pub fn to_map<A, K, V, Fk, Fv>(key: Fk, value: Fv) -> ToMapCollector<A, K, V, Fk, Fv>
where
    K: Ord + Clone + Debug + 'static,
    V: Ord + Clone + Debug + 'static,
    Fk: Fn(&A) -> K + Send + Sync,
    Fv: Fn(&A) -> V + Send + Sync,
{
    ToMapCollector {
        key,
        value,
        _phantom: PhantomData,
    }
}

pub struct ToMapCollector<A, K, V, Fk, Fv> {
    key: Fk,
    value: Fv,
    _phantom: PhantomData<fn(&A) -> (K, V)>,
}

impl<A, K, V, Fk, Fv> UniCollector<A> for ToMapCollector<A, K, V, Fk, Fv>
where
    K: Ord + Clone + Debug + 'static,
    V: Ord + Clone + Debug + 'static,
    Fk: Fn(&A) -> K + Send + Sync,
    Fv: Fn(&A) -> V + Send + Sync,
{
    type Value = (K, V);
    type Result = BTreeMap<K, BTreeSet<V>>;
    type Accumulator = ToMapAccumulator<K, V>;

    fn extract(&self, entity: &A) -> (K, V) {
        ((self.key)(entity), (self.value)(entity))
    }

    fn create_accumulator(&self) -> Self::Accumulator {
        ToMapAccumulator {
            entries: BTreeMap::new(),
        }
    }
}

#[derive(Debug)]
pub struct ToMapAccumulator<K, V> {
    entries: BTreeMap<K, BTreeMap<V, usize>>,
}

impl<K: Ord + Clone + Debug, V: Ord + Clone + Debug> Reversible<(K, V)> for ToMapAccumulator<K, V> {
    type Undo = (K, V);

    fn apply(&mut self, (key, value): (K, V)) -> (K, V) {
        *self
            .entries
            .entry(key.clone())
            .or_default()
            .entry(value.clone())
            .or_insert(0) += 1;
        (key, value)
    }

    fn revert(&mut self, (key, value): (K, V)) -> Result<(), UndoError> {
        let values = self
            .entries
            .get_mut(&key)
            .ok_or_else(|| UndoError(format!("key {key:?} is not in the map")))?;
        let count = values
            .get_mut(&value)
            .ok_or_else(|| UndoError(format!("value {value:?} is not under key {key:?}")))?;
        *count -= 1;
        if *count == 0 {
            values.remove(&value);
            if values.is_empty() {
                self.entries.remove(&key);
            }
        }
        Ok(())
    }
}

impl<K: Ord + Clone + Debug, V: Ord + Clone + Debug> Accumulator<(K, V), BTreeMap<K, BTreeSet<V>>>
    for ToMapAccumulator<K, V>
{
    fn finish(&self) -> BTreeMap<K, BTreeSet<V>> {
        self.entries
            .iter()
            .map(|(key, values)| (key.clone(), values.keys().cloned().collect()))
            .collect()
    }
}
