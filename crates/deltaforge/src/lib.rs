//! deltaforge - Incremental Constraint Scoring in Rust
//!
//! Declare constraints once, then keep their score current while facts are
//! inserted, changed and retracted.
//!
//! # Example
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use deltaforge::prelude::*;
//!
//! #[derive(Debug)]
//! struct Queen {
//!     row: Cell<u32>,
//! }
//!
//! let factory = ConstraintFactory::<SimpleScore>::new();
//! factory
//!     .for_each_unique_pair(joiner::equal(|q: &Queen| q.row.get()))
//!     .penalize(SimpleScore::of(1))
//!     .as_constraint("Row conflict");
//! let network = factory.build().unwrap();
//!
//! let mut session = network.create_session(&SessionConfig::default());
//! let a = Rc::new(Queen { row: Cell::new(0) });
//! let b = Rc::new(Queen { row: Cell::new(0) });
//! session.insert(&a).unwrap();
//! session.insert(&b).unwrap();
//! assert_eq!(session.calculate_score(0).unwrap().score(), &SimpleScore::of(-1));
//!
//! b.row.set(1);
//! session.update(&b).unwrap();
//! assert_eq!(session.calculate_score(0).unwrap().score(), &SimpleScore::of(0));
//! ```

pub mod logging;

// Score types
pub use deltaforge_core::{
    BendableScore, ConstraintRef, HardMediumSoftDecimalScore, HardMediumSoftScore,
    HardSoftDecimalScore, HardSoftScore, ImpactType, InnerScore, ParseableScore, Score,
    SimpleDecimalScore, SimpleScore,
};

// Configuration
pub use deltaforge_config::{ConfigError, EnvironmentMode, SessionConfig};

// Constraint stream API
pub use deltaforge_scoring::{collector, stream};

// Networks, sessions and analysis
pub use deltaforge_scoring::{
    ConstraintMatch, ConstraintMatchTotal, ConstraintNetwork, ConstraintSession,
    ConstraintWeightOverrides, Fact, FactRef, Indictment, IndictmentMap, Justification,
    NetworkError, ScoreExplanation, SupplyContext, SupplyRegistry,
};

pub mod prelude {
    pub use super::{
        BendableScore, HardMediumSoftScore, HardSoftDecimalScore, HardSoftScore, Score, SimpleScore,
    };
    pub use super::stream::{joiner, ConstraintFactory};
    pub use super::{ConstraintNetwork, ConstraintSession, SessionConfig};
}
