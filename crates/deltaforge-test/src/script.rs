//! Seeded operation scripts.
//!
//! An [`OperationScript`] is a valid sequence of inserts, updates and
//! retracts over a pool of entities: no entity is updated or retracted
//! while it is not inserted, and none is inserted twice. Scripts are
//! deterministic per seed.
//!
//! # Example
//!
//! ```
//! use deltaforge_test::script::{Operation, OperationScript};
//!
//! let script = OperationScript::generate(7, 5, 40, 3);
//! assert_eq!(script.len(), 40);
//!
//! // Another interleaving of the same per-entity histories.
//! let shuffled = script.interleaved(11);
//! assert_eq!(shuffled.len(), script.len());
//! assert_eq!(shuffled.final_state(), script.final_state());
//! ```

use deltaforge_core::SimpleScore;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// One step of a script, addressing entities by pool index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Set the value, then insert.
    Insert { entity: usize, value: i64 },
    /// Set the value, then report the update.
    Update { entity: usize, value: i64 },
    Retract { entity: usize },
}

impl Operation {
    pub fn entity(&self) -> usize {
        match *self {
            Operation::Insert { entity, .. } | Operation::Update { entity, .. } | Operation::Retract { entity } => entity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationScript {
    entity_count: usize,
    operations: Vec<Operation>,
}

impl OperationScript {
    /// Generates `length` operations over `entity_count` entities with
    /// values in `0..value_range`.
    pub fn generate(seed: u64, entity_count: usize, length: usize, value_range: i64) -> Self {
        assert!(entity_count > 0, "a script needs at least one entity");
        assert!(value_range > 0, "a script needs at least one value");
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut live = vec![false; entity_count];
        let mut operations = Vec::with_capacity(length);
        for _ in 0..length {
            let entity = rng.random_range(0..entity_count);
            let value = rng.random_range(0..value_range);
            let operation = if !live[entity] {
                live[entity] = true;
                Operation::Insert { entity, value }
            } else if rng.random_bool(0.7) {
                Operation::Update { entity, value }
            } else {
                live[entity] = false;
                Operation::Retract { entity }
            };
            operations.push(operation);
        }
        Self {
            entity_count,
            operations,
        }
    }

    /// The same per-entity histories, merged in a different order.
    ///
    /// Each entity's own operations keep their relative order, so the
    /// result is valid and ends in the same state.
    pub fn interleaved(&self, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut owners: Vec<usize> = self.operations.iter().map(Operation::entity).collect();
        owners.shuffle(&mut rng);

        let mut histories: Vec<std::collections::VecDeque<Operation>> =
            vec![std::collections::VecDeque::new(); self.entity_count];
        for operation in &self.operations {
            histories[operation.entity()].push_back(*operation);
        }
        let operations = owners
            .into_iter()
            .filter_map(|entity| histories[entity].pop_front())
            .collect();
        Self {
            entity_count: self.entity_count,
            operations,
        }
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn entity_count(&self) -> usize {
        self.entity_count
    }

    /// Value of every entity still inserted at the end, `None` otherwise.
    pub fn final_state(&self) -> Vec<Option<i64>> {
        let mut state = vec![None; self.entity_count];
        for operation in &self.operations {
            match *operation {
                Operation::Insert { entity, value } | Operation::Update { entity, value } => state[entity] = Some(value),
                Operation::Retract { entity } => state[entity] = None,
            }
        }
        state
    }
}

/// Penalty of one per unordered pair of live entities sharing a value.
///
/// ```
/// use deltaforge_core::SimpleScore;
/// use deltaforge_test::script::equal_value_pairs;
///
/// assert_eq!(equal_value_pairs(&[Some(1), Some(1), None, Some(1)]), SimpleScore::of(-3));
/// ```
pub fn equal_value_pairs(state: &[Option<i64>]) -> SimpleScore {
    let live: Vec<i64> = state.iter().flatten().copied().collect();
    let mut pairs = 0;
    for (i, a) in live.iter().enumerate() {
        pairs += live[i + 1..].iter().filter(|b| *b == a).count() as i64;
    }
    SimpleScore::of(-pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_script_is_valid() {
        let script = OperationScript::generate(42, 4, 200, 5);
        let mut live = [false; 4];
        for operation in script.operations() {
            let entity = operation.entity();
            match operation {
                Operation::Insert { .. } => {
                    assert!(!live[entity]);
                    live[entity] = true;
                }
                Operation::Update { .. } => assert!(live[entity]),
                Operation::Retract { .. } => {
                    assert!(live[entity]);
                    live[entity] = false;
                }
            }
        }
    }

    #[test]
    fn test_same_seed_same_script() {
        assert_eq!(
            OperationScript::generate(3, 6, 50, 4),
            OperationScript::generate(3, 6, 50, 4)
        );
    }

    #[test]
    fn test_interleaving_keeps_entity_histories() {
        let script = OperationScript::generate(9, 3, 60, 4);
        let shuffled = script.interleaved(1);
        for entity in 0..3 {
            let own = |s: &OperationScript| -> Vec<Operation> {
                s.operations().iter().copied().filter(|o| o.entity() == entity).collect()
            };
            assert_eq!(own(&script), own(&shuffled));
        }
    }
}
