use std::any::{Any, TypeId};
use std::cmp::Ordering;
use std::fmt::{self, Debug};
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use smallvec::SmallVec;

use crate::fact::{Fact, FactRef};

/// Type-erased equality key.
pub trait KeyValue: Fact {
    fn dyn_eq(&self, other: &dyn KeyValue) -> bool;

    fn dyn_hash(&self, state: &mut dyn Hasher);

    fn into_fact(self: Rc<Self>) -> FactRef;
}

impl<T: Any + Debug + Hash + Eq> KeyValue for T {
    fn dyn_eq(&self, other: &dyn KeyValue) -> bool {
        other.as_any().downcast_ref::<T>() == Some(self)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        TypeId::of::<T>().hash(&mut state);
        self.hash(&mut state);
    }

    fn into_fact(self: Rc<Self>) -> FactRef {
        self
    }
}

/// Type-erased ordering key.
///
/// Keys of different types order by type id; a single comparison joiner
/// only ever produces one type.
pub trait OrderedValue: Fact {
    fn dyn_cmp(&self, other: &dyn OrderedValue) -> Ordering;
}

impl<T: Any + Debug + Ord> OrderedValue for T {
    fn dyn_cmp(&self, other: &dyn OrderedValue) -> Ordering {
        match other.as_any().downcast_ref::<T>() {
            Some(other) => self.cmp(other),
            None => TypeId::of::<T>().cmp(&other.as_any().type_id()),
        }
    }
}

/// A value compared by equality and hashing, whatever its type.
#[derive(Clone)]
pub struct EqualKey(Rc<dyn KeyValue>);

impl EqualKey {
    pub fn new<T: Any + Debug + Hash + Eq>(value: T) -> Self {
        EqualKey(Rc::new(value))
    }

    /// The single key shared by everything, for ungrouped collection.
    pub fn unit() -> Self {
        Self::new(())
    }

    /// Same allocation, viewed as a fact.
    pub fn to_fact(&self) -> FactRef {
        self.0.clone().into_fact()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        let value: &dyn KeyValue = self.0.as_ref();
        value.as_any().downcast_ref::<T>()
    }
}

impl PartialEq for EqualKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.dyn_eq(other.0.as_ref())
    }
}

impl Eq for EqualKey {}

impl Hash for EqualKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.dyn_hash(state);
    }
}

impl Debug for EqualKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(self.0.as_ref(), f)
    }
}

/// A value compared by total order, whatever its type.
#[derive(Clone)]
pub struct OrderedKey(Rc<dyn OrderedValue>);

impl OrderedKey {
    pub fn new<T: Any + Debug + Ord>(value: T) -> Self {
        OrderedKey(Rc::new(value))
    }
}

impl PartialEq for OrderedKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OrderedKey {}

impl PartialOrd for OrderedKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.dyn_cmp(other.0.as_ref())
    }
}

impl Debug for OrderedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(self.0.as_ref(), f)
    }
}

/// Equality part of an index key: one value per equal joiner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct EqualKeys(SmallVec<[EqualKey; 2]>);

impl EqualKeys {
    pub fn new(keys: impl IntoIterator<Item = EqualKey>) -> Self {
        EqualKeys(keys.into_iter().collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Full key one side of a join contributes to its index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexKeys {
    pub equal: EqualKeys,
    pub comparison: Option<OrderedKey>,
}

impl IndexKeys {
    pub fn equal_only(equal: EqualKeys) -> Self {
        Self {
            equal,
            comparison: None,
        }
    }
}

/// How a stored key must relate to the probing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl Comparison {
    /// The relation seen from the other side: `a < b` iff `b > a`.
    pub fn flip(self) -> Self {
        match self {
            Comparison::LessThan => Comparison::GreaterThan,
            Comparison::LessThanOrEqual => Comparison::GreaterThanOrEqual,
            Comparison::GreaterThan => Comparison::LessThan,
            Comparison::GreaterThanOrEqual => Comparison::LessThanOrEqual,
        }
    }

    pub fn test<T: Ord + ?Sized>(self, left: &T, right: &T) -> bool {
        match self {
            Comparison::LessThan => left < right,
            Comparison::LessThanOrEqual => left <= right,
            Comparison::GreaterThan => left > right,
            Comparison::GreaterThanOrEqual => left >= right,
        }
    }
}
