use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;

use super::{Comparison, ElementList, EntryHandle, EqualKeys, IndexError, IndexKeys, OrderedKey};

#[derive(Debug)]
enum Shape<T> {
    None(ElementList<T>),
    Equal(HashMap<EqualKeys, ElementList<T>>),
    Comparison {
        relation: Comparison,
        buckets: HashMap<EqualKeys, BTreeMap<OrderedKey, ElementList<T>>>,
    },
}

/// Multi-level index over one side of a join.
///
/// Equality keys select a bucket by hash. An optional comparison key then
/// orders the bucket, so a probe visits only the stored keys that satisfy
/// `stored <relation> probe`. Empty buckets are dropped as soon as their
/// last entry leaves.
#[derive(Debug)]
pub struct Indexer<T> {
    shape: Shape<T>,
    next_stamp: u64,
    size: usize,
}

impl<T> Indexer<T> {
    /// An index with no key at all: every probe sees every entry.
    pub fn unindexed() -> Self {
        Self::with_shape(Shape::None(ElementList::new()))
    }

    pub fn equal() -> Self {
        Self::with_shape(Shape::Equal(HashMap::new()))
    }

    /// Equality buckets further ordered by a comparison key.
    pub fn comparison(relation: Comparison) -> Self {
        Self::with_shape(Shape::Comparison {
            relation,
            buckets: HashMap::new(),
        })
    }

    /// Picks the shape matching what a joiner contributes.
    pub fn for_keys(equal_count: usize, comparison: Option<Comparison>) -> Self {
        match (equal_count, comparison) {
            (_, Some(relation)) => Self::comparison(relation),
            (0, None) => Self::unindexed(),
            (_, None) => Self::equal(),
        }
    }

    fn with_shape(shape: Shape<T>) -> Self {
        Self {
            shape,
            next_stamp: 0,
            size: 0,
        }
    }

    pub fn put(&mut self, keys: &IndexKeys, value: T) -> Result<EntryHandle, IndexError> {
        let stamp = self.next_stamp;
        let handle = match &mut self.shape {
            Shape::None(list) => list.push_stamped(value, stamp),
            Shape::Equal(buckets) => buckets
                .entry(keys.equal.clone())
                .or_default()
                .push_stamped(value, stamp),
            Shape::Comparison { buckets, .. } => {
                let key = keys.comparison.clone().ok_or(IndexError::MissingComparisonKey)?;
                buckets
                    .entry(keys.equal.clone())
                    .or_default()
                    .entry(key)
                    .or_default()
                    .push_stamped(value, stamp)
            }
        };
        self.next_stamp += 1;
        self.size += 1;
        Ok(handle)
    }

    /// Removes the entry `handle` points at, stored under `keys`.
    pub fn remove(&mut self, keys: &IndexKeys, handle: EntryHandle) -> Result<T, IndexError> {
        let value = match &mut self.shape {
            Shape::None(list) => list.remove(handle)?,
            Shape::Equal(buckets) => {
                let list = buckets.get_mut(&keys.equal).ok_or(IndexError::StaleHandle)?;
                let value = list.remove(handle)?;
                if list.is_empty() {
                    buckets.remove(&keys.equal);
                }
                value
            }
            Shape::Comparison { buckets, .. } => {
                let key = keys.comparison.as_ref().ok_or(IndexError::MissingComparisonKey)?;
                let ordered = buckets.get_mut(&keys.equal).ok_or(IndexError::StaleHandle)?;
                let list = ordered.get_mut(key).ok_or(IndexError::StaleHandle)?;
                let value = list.remove(handle)?;
                if list.is_empty() {
                    ordered.remove(key);
                    if ordered.is_empty() {
                        buckets.remove(&keys.equal);
                    }
                }
                value
            }
        };
        self.size -= 1;
        Ok(value)
    }

    /// Visits every stored entry compatible with the probing `keys`.
    pub fn for_each(&self, keys: &IndexKeys, mut visit: impl FnMut(&T)) -> Result<(), IndexError> {
        match &self.shape {
            Shape::None(list) => list.iter().for_each(visit),
            Shape::Equal(buckets) => {
                if let Some(list) = buckets.get(&keys.equal) {
                    list.iter().for_each(visit);
                }
            }
            Shape::Comparison { relation, buckets } => {
                let probe = keys.comparison.as_ref().ok_or(IndexError::MissingComparisonKey)?;
                let Some(ordered) = buckets.get(&keys.equal) else {
                    return Ok(());
                };
                let range: (Bound<&OrderedKey>, Bound<&OrderedKey>) = match relation {
                    Comparison::LessThan => (Bound::Unbounded, Bound::Excluded(probe)),
                    Comparison::LessThanOrEqual => (Bound::Unbounded, Bound::Included(probe)),
                    Comparison::GreaterThan => (Bound::Excluded(probe), Bound::Unbounded),
                    Comparison::GreaterThanOrEqual => (Bound::Included(probe), Bound::Unbounded),
                };
                for (_, list) in ordered.range::<OrderedKey, _>(range) {
                    list.iter().for_each(&mut visit);
                }
            }
        }
        Ok(())
    }

    pub fn matches(&self, keys: &IndexKeys) -> Result<Vec<T>, IndexError>
    where
        T: Clone,
    {
        let mut found = Vec::new();
        self.for_each(keys, |value| found.push(value.clone()))?;
        Ok(found)
    }

    /// Entries across all keys.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Entries stored under exactly `keys`. An unindexed index has a single
    /// bucket, so this is its whole size.
    pub fn size_of(&self, keys: &IndexKeys) -> Result<usize, IndexError> {
        Ok(match &self.shape {
            Shape::None(list) => list.len(),
            Shape::Equal(buckets) => buckets.get(&keys.equal).map_or(0, ElementList::len),
            Shape::Comparison { buckets, .. } => {
                let key = keys.comparison.as_ref().ok_or(IndexError::MissingComparisonKey)?;
                buckets
                    .get(&keys.equal)
                    .and_then(|ordered| ordered.get(key))
                    .map_or(0, ElementList::len)
            }
        })
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}
