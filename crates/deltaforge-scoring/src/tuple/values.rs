use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::index::EqualKey;

/// Values produced by `map` nodes, shared session-wide.
///
/// Equal values resolve to one allocation while any tuple holds them, so
/// nodes that compare facts by identity see equal values as one fact.
#[derive(Debug, Default)]
pub(crate) struct ValuePool {
    holders: HashMap<EqualKey, usize>,
}

impl ValuePool {
    /// The shared key equal to `value`, counting one more holder.
    pub fn acquire(&mut self, value: EqualKey) -> EqualKey {
        match self.holders.entry(value) {
            Entry::Occupied(mut entry) => {
                *entry.get_mut() += 1;
                entry.key().clone()
            }
            Entry::Vacant(entry) => {
                let shared = entry.key().clone();
                entry.insert(1);
                shared
            }
        }
    }

    /// Drops one holder of `value`. Returns false if it held none.
    pub fn release(&mut self, value: &EqualKey) -> bool {
        let Some(holders) = self.holders.get_mut(value) else {
            return false;
        };
        *holders -= 1;
        if *holders == 0 {
            self.holders.remove(value);
        }
        true
    }

    pub fn len(&self) -> usize {
        self.holders.len()
    }

    pub fn clear(&mut self) {
        self.holders.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fact::FactId;

    #[test]
    fn test_equal_values_share_one_fact() {
        let mut pool = ValuePool::default();
        let first = pool.acquire(EqualKey::new(7_i64));
        let second = pool.acquire(EqualKey::new(7_i64));
        let other = pool.acquire(EqualKey::new(8_i64));
        assert_eq!(FactId::of(&first.to_fact()), FactId::of(&second.to_fact()));
        assert_ne!(FactId::of(&first.to_fact()), FactId::of(&other.to_fact()));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_value_dropped_with_last_holder() {
        let mut pool = ValuePool::default();
        let key = pool.acquire(EqualKey::new("a"));
        pool.acquire(EqualKey::new("a"));
        assert!(pool.release(&key));
        assert_eq!(pool.len(), 1);
        assert!(pool.release(&key));
        assert_eq!(pool.len(), 0);
        assert!(!pool.release(&key));
    }
}
