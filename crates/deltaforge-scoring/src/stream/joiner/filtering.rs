//! Arbitrary predicates, evaluated on index candidates.

use std::sync::Arc;

use super::{Joiner, JoinerPart};
use crate::fact::Fact;
use crate::tuple::Tuple;

/// Matches when `predicate(a, b)` holds. Cannot be indexed, so combine it
/// with an equality or comparison joiner where possible.
///
/// # Example
///
/// ```
/// use std::rc::Rc;
/// use deltaforge_scoring::stream::joiner::filtering;
///
/// let different = filtering(|a: &u32, b: &u32| a != b);
/// assert!(different.matches(&Rc::new(1), &Rc::new(2)));
/// assert!(!different.matches(&Rc::new(1), &Rc::new(1)));
/// ```
pub fn filtering<A, B, F>(predicate: F) -> Joiner<(A,), B>
where
    A: Fact,
    B: Fact,
    F: Fn(&A, &B) -> bool + Send + Sync + 'static,
{
    Joiner::part(JoinerPart::Filter(Arc::new(move |l: &Tuple, r: &Tuple| {
        Some(predicate(l.fact_as::<A>(0)?, r.fact_as::<B>(0)?))
    })))
}

pub fn filtering_tri<A, B, C, F>(predicate: F) -> Joiner<(A, B), C>
where
    A: Fact,
    B: Fact,
    C: Fact,
    F: Fn(&A, &B, &C) -> bool + Send + Sync + 'static,
{
    Joiner::part(JoinerPart::Filter(Arc::new(move |l: &Tuple, r: &Tuple| {
        Some(predicate(l.fact_as::<A>(0)?, l.fact_as::<B>(1)?, r.fact_as::<C>(0)?))
    })))
}
