use std::fmt::Debug;
use std::sync::Arc;

use super::{Joiner, JoinerPart};
use crate::fact::Fact;
use crate::index::{Comparison, OrderedKey};
use crate::tuple::Tuple;

/// Matches when the half-open ranges `[start_a, end_a)` and
/// `[start_b, end_b)` intersect.
///
/// `start_a < end_b` is indexed as a range; `end_a > start_b` is checked on
/// the candidates.
///
/// # Example
///
/// ```
/// use std::rc::Rc;
/// use deltaforge_scoring::stream::joiner::overlapping;
///
/// #[derive(Debug)]
/// struct Meeting { start: i64, end: i64 }
///
/// let clash = overlapping(
///     |m: &Meeting| m.start,
///     |m: &Meeting| m.end,
///     |m: &Meeting| m.start,
///     |m: &Meeting| m.end,
/// );
/// let nine = Rc::new(Meeting { start: 9, end: 11 });
/// let ten = Rc::new(Meeting { start: 10, end: 12 });
/// let noon = Rc::new(Meeting { start: 12, end: 13 });
/// assert!(clash.matches(&nine, &ten));
/// assert!(!clash.matches(&ten, &noon));
/// ```
pub fn overlapping<A, B, T, Sa, Ea, Sb, Eb>(start_a: Sa, end_a: Ea, start_b: Sb, end_b: Eb) -> Joiner<(A,), B>
where
    A: Fact,
    B: Fact,
    T: Ord + Debug + 'static,
    Sa: Fn(&A) -> T + Send + Sync + 'static,
    Ea: Fn(&A) -> T + Send + Sync + 'static,
    Sb: Fn(&B) -> T + Send + Sync + 'static,
    Eb: Fn(&B) -> T + Send + Sync + 'static,
{
    let mut joiner = Joiner::part(JoinerPart::Compare {
        left: Arc::new(move |t: &Tuple| Some(OrderedKey::new(start_a(t.fact_as::<A>(0)?)))),
        relation: Comparison::LessThan,
        right: Arc::new(move |t: &Tuple| Some(OrderedKey::new(end_b(t.fact_as::<B>(0)?)))),
    });
    joiner.push(JoinerPart::Filter(Arc::new(move |l: &Tuple, r: &Tuple| {
        Some(end_a(l.fact_as::<A>(0)?) > start_b(r.fact_as::<B>(0)?))
    })));
    joiner
}
