//! Equality joiners, indexed by hash.

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use super::{Joiner, JoinerPart};
use crate::fact::Fact;
use crate::index::EqualKey;
use crate::tuple::Tuple;

/// Matches when both sides map to the same key; both sides share a type.
///
/// # Example
///
/// ```
/// use std::rc::Rc;
/// use deltaforge_scoring::stream::joiner::equal;
///
/// #[derive(Debug)]
/// struct Shift { employee: u32 }
///
/// let same_employee = equal(|s: &Shift| s.employee);
/// assert!(same_employee.matches(&Rc::new(Shift { employee: 1 }), &Rc::new(Shift { employee: 1 })));
/// assert!(!same_employee.matches(&Rc::new(Shift { employee: 1 }), &Rc::new(Shift { employee: 2 })));
/// ```
pub fn equal<A, K, F>(key: F) -> Joiner<(A,), A>
where
    A: Fact,
    K: Hash + Eq + Debug + 'static,
    F: Fn(&A) -> K + Send + Sync + 'static,
{
    let key = Arc::new(key);
    let right = Arc::clone(&key);
    Joiner::part(JoinerPart::Equal {
        left: Arc::new(move |t: &Tuple| Some(EqualKey::new((*key)(t.fact_as::<A>(0)?)))),
        right: Arc::new(move |t: &Tuple| Some(EqualKey::new((*right)(t.fact_as::<A>(0)?)))),
    })
}

/// Matches when `left(a) == right(b)`.
///
/// # Example
///
/// ```
/// use std::rc::Rc;
/// use deltaforge_scoring::stream::joiner::equal_bi;
///
/// #[derive(Debug)]
/// struct Employee { id: u32 }
/// #[derive(Debug)]
/// struct Shift { employee: Option<u32> }
///
/// let assigned_to = equal_bi(|s: &Shift| s.employee, |e: &Employee| Some(e.id));
/// assert!(assigned_to.matches(&Rc::new(Shift { employee: Some(7) }), &Rc::new(Employee { id: 7 })));
/// ```
pub fn equal_bi<A, B, K, Fa, Fb>(left: Fa, right: Fb) -> Joiner<(A,), B>
where
    A: Fact,
    B: Fact,
    K: Hash + Eq + Debug + 'static,
    Fa: Fn(&A) -> K + Send + Sync + 'static,
    Fb: Fn(&B) -> K + Send + Sync + 'static,
{
    Joiner::part(JoinerPart::Equal {
        left: Arc::new(move |t: &Tuple| Some(EqualKey::new(left(t.fact_as::<A>(0)?)))),
        right: Arc::new(move |t: &Tuple| Some(EqualKey::new(right(t.fact_as::<B>(0)?)))),
    })
}

/// Matches a pair `(a, b)` with a fact `c` when `left(a, b) == right(c)`.
pub fn equal_tri<A, B, C, K, Fl, Fr>(left: Fl, right: Fr) -> Joiner<(A, B), C>
where
    A: Fact,
    B: Fact,
    C: Fact,
    K: Hash + Eq + Debug + 'static,
    Fl: Fn(&A, &B) -> K + Send + Sync + 'static,
    Fr: Fn(&C) -> K + Send + Sync + 'static,
{
    Joiner::part(JoinerPart::Equal {
        left: Arc::new(move |t: &Tuple| Some(EqualKey::new(left(t.fact_as::<A>(0)?, t.fact_as::<B>(1)?)))),
        right: Arc::new(move |t: &Tuple| Some(EqualKey::new(right(t.fact_as::<C>(0)?)))),
    })
}
