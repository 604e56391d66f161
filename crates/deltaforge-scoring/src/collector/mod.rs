// Collectors for grouping and aggregating tuples.
//
// Every accumulator is `Reversible`: adding a value hands back an undo
// token, and retracting consumes that token. Group nodes keep one token per
// input tuple.

mod bi;
mod compose;
mod count;
pub(crate) mod erased;
mod min_max;
mod sum;
mod to_set;
mod uni;

#[cfg(test)]
mod tests;

pub use bi::{on_pair, BiCollector, PairCollector};
pub use compose::{compose2, compose3, Compose2Accumulator, Compose2Collector, Compose3Accumulator, Compose3Collector};
pub use count::{count, count_distinct, CountAccumulator, CountCollector, CountDistinctAccumulator, CountDistinctCollector};
pub use min_max::{max, min, MaxCollector, MinCollector, OrderedAccumulator};
pub use sum::{sum, SumAccumulator, SumCollector};
pub use to_set::{to_map, to_set, ToMapAccumulator, ToMapCollector, ToSetAccumulator, ToSetCollector};
pub use uni::{Accumulator, UniCollector};
