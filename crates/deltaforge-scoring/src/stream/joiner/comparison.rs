//! Comparison joiners, indexed by ordered ranges.

use std::fmt::Debug;
use std::sync::Arc;

use super::{Joiner, JoinerPart};
use crate::fact::Fact;
use crate::index::{Comparison, OrderedKey};
use crate::tuple::Tuple;

fn compare<A, B, T, Fa, Fb>(left: Fa, relation: Comparison, right: Fb) -> Joiner<(A,), B>
where
    A: Fact,
    B: Fact,
    T: Ord + Debug + 'static,
    Fa: Fn(&A) -> T + Send + Sync + 'static,
    Fb: Fn(&B) -> T + Send + Sync + 'static,
{
    Joiner::part(JoinerPart::Compare {
        left: Arc::new(move |t: &Tuple| Some(OrderedKey::new(left(t.fact_as::<A>(0)?)))),
        relation,
        right: Arc::new(move |t: &Tuple| Some(OrderedKey::new(right(t.fact_as::<B>(0)?)))),
    })
}

/// Matches when `left(a) < right(b)`.
///
/// # Example
///
/// ```
/// use std::rc::Rc;
/// use deltaforge_scoring::stream::joiner::less_than;
///
/// #[derive(Debug)]
/// struct Task { start: i64, end: i64 }
///
/// let sequential = less_than(|t: &Task| t.end, |t: &Task| t.start);
/// assert!(sequential.matches(&Rc::new(Task { start: 0, end: 10 }), &Rc::new(Task { start: 15, end: 20 })));
/// assert!(!sequential.matches(&Rc::new(Task { start: 0, end: 10 }), &Rc::new(Task { start: 5, end: 20 })));
/// ```
pub fn less_than<A, B, T, Fa, Fb>(left: Fa, right: Fb) -> Joiner<(A,), B>
where
    A: Fact,
    B: Fact,
    T: Ord + Debug + 'static,
    Fa: Fn(&A) -> T + Send + Sync + 'static,
    Fb: Fn(&B) -> T + Send + Sync + 'static,
{
    compare(left, Comparison::LessThan, right)
}

/// Matches when `left(a) <= right(b)`.
pub fn less_than_or_equal<A, B, T, Fa, Fb>(left: Fa, right: Fb) -> Joiner<(A,), B>
where
    A: Fact,
    B: Fact,
    T: Ord + Debug + 'static,
    Fa: Fn(&A) -> T + Send + Sync + 'static,
    Fb: Fn(&B) -> T + Send + Sync + 'static,
{
    compare(left, Comparison::LessThanOrEqual, right)
}

/// Matches when `left(a) > right(b)`.
pub fn greater_than<A, B, T, Fa, Fb>(left: Fa, right: Fb) -> Joiner<(A,), B>
where
    A: Fact,
    B: Fact,
    T: Ord + Debug + 'static,
    Fa: Fn(&A) -> T + Send + Sync + 'static,
    Fb: Fn(&B) -> T + Send + Sync + 'static,
{
    compare(left, Comparison::GreaterThan, right)
}

/// Matches when `left(a) >= right(b)`.
///
/// # Example
///
/// ```
/// use std::rc::Rc;
/// use deltaforge_scoring::stream::joiner::greater_than_or_equal;
///
/// let joiner = greater_than_or_equal(|x: &i32| *x, |y: &i32| *y);
/// assert!(joiner.matches(&Rc::new(10), &Rc::new(5)));
/// assert!(joiner.matches(&Rc::new(5), &Rc::new(5)));
/// assert!(!joiner.matches(&Rc::new(5), &Rc::new(10)));
/// ```
pub fn greater_than_or_equal<A, B, T, Fa, Fb>(left: Fa, right: Fb) -> Joiner<(A,), B>
where
    A: Fact,
    B: Fact,
    T: Ord + Debug + 'static,
    Fa: Fn(&A) -> T + Send + Sync + 'static,
    Fb: Fn(&B) -> T + Send + Sync + 'static,
{
    compare(left, Comparison::GreaterThanOrEqual, right)
}
