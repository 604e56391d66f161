// Joiners: matching conditions between a stream's tuples and the facts of
// another stream.
//
// `Joiner<L, R>` pairs left tuples holding the fact types in `L` (a tuple
// type such as `(Shift,)`) with right facts of type `R`. Combining joiners
// with `and` requires all conditions. Equality parts are merged into one
// composite index key, the first comparison part indexes an ordered range
// and every further part is evaluated as a filter on candidate pairs.
//
// # Example
//
// ```
// use std::rc::Rc;
// use deltaforge_scoring::stream::joiner::{equal, less_than};
//
// #[derive(Debug)]
// struct Shift { employee: u32, start: i64 }
//
// let earlier_same_employee = equal(|s: &Shift| s.employee)
//     .and(less_than(|s: &Shift| s.start, |s: &Shift| s.start));
//
// let a = Rc::new(Shift { employee: 1, start: 8 });
// let b = Rc::new(Shift { employee: 1, start: 16 });
// let c = Rc::new(Shift { employee: 2, start: 16 });
// assert!(earlier_same_employee.matches(&a, &b));
// assert!(!earlier_same_employee.matches(&b, &a));
// assert!(!earlier_same_employee.matches(&a, &c));
// ```

mod comparison;
mod equal;
mod filtering;
mod overlapping;

use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::Arc;

use smallvec::smallvec;

use crate::fact::{Fact, FactRef};
use crate::index::Comparison;
use crate::node::{JoinDef, NodeId, PairPredicate, TupleKeyFn, TupleOrderFn};
use crate::tuple::Tuple;

pub use comparison::{greater_than, greater_than_or_equal, less_than, less_than_or_equal};
pub use equal::{equal, equal_bi, equal_tri};
pub use filtering::{filtering, filtering_tri};
pub use overlapping::overlapping;

pub(crate) enum JoinerPart {
    Equal {
        left: TupleKeyFn,
        right: TupleKeyFn,
    },
    Compare {
        left: TupleOrderFn,
        relation: Comparison,
        right: TupleOrderFn,
    },
    Filter(PairPredicate),
}

// A matching condition between left tuples of `L` and right facts of `R`.
pub struct Joiner<L, R> {
    parts: Vec<JoinerPart>,
    _phantom: PhantomData<fn(&L, &R)>,
}

// Matches every pair.
pub fn cross<L, R>() -> Joiner<L, R> {
    Joiner::from_parts(Vec::new())
}

impl<L, R> Joiner<L, R> {
    pub(crate) fn from_parts(parts: Vec<JoinerPart>) -> Self {
        Self {
            parts,
            _phantom: PhantomData,
        }
    }

    pub(crate) fn part(part: JoinerPart) -> Self {
        Self::from_parts(vec![part])
    }

    // Requires both joiners to match.
    pub fn and(mut self, other: Joiner<L, R>) -> Self {
        self.parts.extend(other.parts);
        self
    }

    pub(crate) fn push(&mut self, part: JoinerPart) {
        self.parts.push(part);
    }

    pub(crate) fn into_def(self) -> JoinDef {
        let mut def = JoinDef::default();
        let mut filters: Vec<PairPredicate> = Vec::new();
        for part in self.parts {
            match part {
                JoinerPart::Equal { left, right } => {
                    def.left.equal.push(left);
                    def.right.equal.push(right);
                }
                JoinerPart::Compare { left, relation, right } if def.comparison.is_none() => {
                    def.left.comparison = Some(left);
                    def.right.comparison = Some(right);
                    def.comparison = Some(relation);
                }
                JoinerPart::Compare { left, relation, right } => {
                    filters.push(Arc::new(move |l: &Tuple, r: &Tuple| Some(relation.test(&left(l)?, &right(r)?))));
                }
                JoinerPart::Filter(filter) => filters.push(filter),
            }
        }
        def.filter = match filters.len() {
            0 => None,
            1 => filters.pop(),
            _ => Some(Arc::new(move |l: &Tuple, r: &Tuple| {
                for filter in &filters {
                    if !filter(l, r)? {
                        return Some(false);
                    }
                }
                Some(true)
            })),
        };
        def
    }

    fn test(&self, left: &Tuple, right: &Tuple) -> bool {
        self.parts.iter().all(|part| match part {
            JoinerPart::Equal { left: l, right: r } => matches!((l(left), r(right)), (Some(a), Some(b)) if a == b),
            JoinerPart::Compare { left: l, relation, right: r } => {
                matches!((l(left), r(right)), (Some(a), Some(b)) if relation.test(&a, &b))
            }
            JoinerPart::Filter(filter) => filter(left, right) == Some(true),
        })
    }
}

impl<A: Fact, B: Fact> Joiner<(A,), B> {
    // Evaluates the joiner on one pair outside of any network.
    pub fn matches(&self, a: &Rc<A>, b: &Rc<B>) -> bool {
        let a: FactRef = a.clone();
        let b: FactRef = b.clone();
        self.test(&Tuple::new(NodeId(0), smallvec![a]), &Tuple::new(NodeId(0), smallvec![b]))
    }
}

impl<A: Fact, B: Fact, C: Fact> Joiner<(A, B), C> {
    pub fn matches(&self, a: &Rc<A>, b: &Rc<B>, c: &Rc<C>) -> bool {
        let (a, b, c): (FactRef, FactRef, FactRef) = (a.clone(), b.clone(), c.clone());
        self.test(&Tuple::new(NodeId(0), smallvec![a, b]), &Tuple::new(NodeId(0), smallvec![c]))
    }
}

impl<L, R> std::fmt::Debug for Joiner<L, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kinds: Vec<&str> = self
            .parts
            .iter()
            .map(|part| match part {
                JoinerPart::Equal { .. } => "equal",
                JoinerPart::Compare { .. } => "compare",
                JoinerPart::Filter(_) => "filter",
            })
            .collect();
        f.debug_struct("Joiner").field("parts", &kinds).finish()
    }
}
