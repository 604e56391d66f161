use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Whole-solution context that source nodes can demand at initialization.
///
/// A session demands each supply once per source node that declares it and
/// cancels every demand when it is closed or dropped.
pub trait SupplyContext {
    fn demand(&self, key: &str) -> Option<Rc<dyn Any>>;

    fn cancel(&self, key: &str);
}

/// Keyed supplies with demand counting.
#[derive(Default)]
pub struct SupplyRegistry {
    supplies: HashMap<String, Rc<dyn Any>>,
    demands: RefCell<HashMap<String, usize>>,
}

impl SupplyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_supply<S: Any>(mut self, key: impl Into<String>, supply: S) -> Self {
        self.supplies.insert(key.into(), Rc::new(supply));
        self
    }

    /// Number of demands on `key` not yet cancelled.
    pub fn active_demands(&self, key: &str) -> usize {
        self.demands.borrow().get(key).copied().unwrap_or(0)
    }
}

impl SupplyContext for SupplyRegistry {
    fn demand(&self, key: &str) -> Option<Rc<dyn Any>> {
        let supply = self.supplies.get(key)?;
        *self.demands.borrow_mut().entry(key.to_string()).or_insert(0) += 1;
        Some(Rc::clone(supply))
    }

    fn cancel(&self, key: &str) {
        let mut demands = self.demands.borrow_mut();
        if let Some(count) = demands.get_mut(key) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                demands.remove(key);
            }
        }
    }
}

impl fmt::Debug for SupplyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupplyRegistry")
            .field("supplies", &self.supplies.keys().collect::<Vec<_>>())
            .field("demands", &self.demands.borrow())
            .finish()
    }
}
