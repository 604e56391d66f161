//! Indexes that let join-like nodes find partners without scanning.

mod element_list;
mod indexer;
mod key;

#[cfg(test)]
mod tests;

use thiserror::Error;

pub use element_list::{ElementList, EntryHandle};
pub use indexer::Indexer;
pub use key::{Comparison, EqualKey, EqualKeys, IndexKeys, KeyValue, OrderedKey, OrderedValue};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("entry handle is stale or was already removed")]
    StaleHandle,

    #[error("comparison index used without a comparison key")]
    MissingComparisonKey,
}
