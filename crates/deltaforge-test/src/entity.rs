//! Entity fixtures.
//!
//! Planning fields live in `Cell`s: the network holds `Rc` handles to the
//! same allocations the test mutates, and an `update` reports that the
//! fields behind a handle changed.
//!
//! # Example
//!
//! ```
//! use deltaforge_test::entity::Entity;
//!
//! let entities = Entity::pool(3);
//! entities[1].set_value(4);
//! assert_eq!(entities[1].value(), 4);
//! assert_eq!(entities[2].id, 2);
//! ```

use std::cell::Cell;
use std::rc::Rc;

/// An entity with one integer planning value and a start time.
#[derive(Debug)]
pub struct Entity {
    pub id: usize,
    value: Cell<i64>,
    start: Cell<i64>,
}

impl Entity {
    pub fn new(id: usize, value: i64) -> Rc<Self> {
        Self::with_start(id, value, 0)
    }

    pub fn with_start(id: usize, value: i64, start: i64) -> Rc<Self> {
        Rc::new(Self {
            id,
            value: Cell::new(value),
            start: Cell::new(start),
        })
    }

    /// `count` entities with ids `0..count`, all with value 0.
    pub fn pool(count: usize) -> Vec<Rc<Self>> {
        (0..count).map(|id| Self::new(id, 0)).collect()
    }

    pub fn value(&self) -> i64 {
        self.value.get()
    }

    pub fn set_value(&self, value: i64) {
        self.value.set(value);
    }

    pub fn start(&self) -> i64 {
        self.start.get()
    }

    pub fn set_start(&self, start: i64) {
        self.start.set(start);
    }
}

/// A visit assigned to a vehicle, with a demand, for grouping scenarios.
#[derive(Debug)]
pub struct Visit {
    pub id: usize,
    pub demand: i64,
    vehicle: Cell<Option<usize>>,
}

impl Visit {
    pub fn new(id: usize, demand: i64, vehicle: Option<usize>) -> Rc<Self> {
        Rc::new(Self {
            id,
            demand,
            vehicle: Cell::new(vehicle),
        })
    }

    pub fn vehicle(&self) -> Option<usize> {
        self.vehicle.get()
    }

    pub fn set_vehicle(&self, vehicle: Option<usize>) {
        self.vehicle.set(vehicle);
    }
}
