//! Facts: externally owned objects referenced by the network.
//!
//! The network never copies a fact. It holds `Rc` handles into the working
//! solution and compares facts by allocation identity, never by value.
//! Planning variables are expected to use interior mutability, so that an
//! `update` means "the fields behind this handle changed".

use std::any::{Any, TypeId};
use std::fmt::Debug;
use std::rc::Rc;

/// Anything that can flow through the network.
///
/// Blanket-implemented for every `'static + Debug` type; `Debug` is what
/// makes constraint matches and consistency reports readable.
pub trait Fact: Any + Debug {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + Debug> Fact for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Shared handle to a fact.
pub type FactRef = Rc<dyn Fact>;

/// Identity of a fact allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FactId(usize);

impl FactId {
    pub fn of(fact: &FactRef) -> Self {
        FactId(Rc::as_ptr(fact) as *const () as usize)
    }
}

/// Runtime type of the value behind the handle.
pub fn fact_type_id(fact: &FactRef) -> TypeId {
    let value: &dyn Fact = fact.as_ref();
    value.as_any().type_id()
}

pub fn downcast_fact<T: Any>(fact: &FactRef) -> Option<&T> {
    let value: &dyn Fact = fact.as_ref();
    value.as_any().downcast_ref::<T>()
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[derive(Debug)]
    struct Lesson {
        room: Cell<u32>,
    }

    #[test]
    fn test_identity_not_value() {
        let a: FactRef = Rc::new(Lesson { room: Cell::new(1) });
        let b: FactRef = Rc::new(Lesson { room: Cell::new(1) });
        assert_ne!(FactId::of(&a), FactId::of(&b));
        assert_eq!(FactId::of(&a), FactId::of(&a.clone()));
    }

    #[test]
    fn test_type_id_and_downcast_see_concrete_type() {
        let lesson = Rc::new(Lesson { room: Cell::new(7) });
        let fact: FactRef = lesson.clone();
        assert_eq!(fact_type_id(&fact), TypeId::of::<Lesson>());
        lesson.room.set(9);
        assert_eq!(downcast_fact::<Lesson>(&fact).map(|l| l.room.get()), Some(9));
        assert!(downcast_fact::<u32>(&fact).is_none());
    }
}
