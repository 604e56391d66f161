// Terminal step of a stream: names the constraint and registers it.

use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::Arc;

use deltaforge_core::{ConstraintRef, ImpactType, Score};

use super::{Graph, PendingConstraint};
use crate::api::Justification;
use crate::fact::{downcast_fact, Fact, FactRef};
use crate::inliner::JustifyFn;
use crate::node::MatchWeigher;

// A constraint waiting for its name.
//
// `T` is the tuple of fact types a match carries, e.g. `(Shift, Shift)`.
pub struct ConstraintBuilder<T, Sc: Score> {
    graph: Graph<Sc>,
    parent: usize,
    weight: Sc,
    impact: ImpactType,
    weigher: MatchWeigher,
    justify: Option<JustifyFn<Sc>>,
    _phantom: PhantomData<fn() -> T>,
}

impl<T, Sc: Score> ConstraintBuilder<T, Sc> {
    pub(crate) fn new(graph: Graph<Sc>, parent: usize, weight: Sc, impact: ImpactType, weigher: MatchWeigher) -> Self {
        Self {
            graph,
            parent,
            weight,
            impact,
            weigher,
            justify: None,
            _phantom: PhantomData,
        }
    }

    // Registers the constraint under the factory's package.
    //
    // The returned reference's `full_name()` is the constraint id used by
    // match totals and weight overrides.
    pub fn as_constraint(self, name: &str) -> ConstraintRef {
        let mut graph = self.graph.borrow_mut();
        let constraint_ref = ConstraintRef::new(graph.package.clone(), name);
        graph.constraints.push(PendingConstraint {
            constraint_ref: constraint_ref.clone(),
            weight: self.weight,
            impact: self.impact,
            weigher: self.weigher,
            parent: self.parent,
            justify: self.justify,
        });
        constraint_ref
    }

    fn with_justification<F>(mut self, justify: F) -> Self
    where
        F: Fn(&[FactRef], &Sc) -> Option<Rc<dyn Justification>> + Send + Sync + 'static,
    {
        self.justify = Some(Arc::new(justify));
        self
    }
}

macro_rules! impl_justify_with {
    ($($fact:ident : $index:tt),+) => {
        impl<$($fact: Fact,)+ Sc: Score> ConstraintBuilder<($($fact,)+), Sc> {
            // Replaces the default justification (the match's facts) with a
            // custom one built from the match and its score impact.
            pub fn justify_with<J, F>(self, justify: F) -> Self
            where
                J: Justification,
                F: Fn($(&$fact,)+ &Sc) -> J + Send + Sync + 'static,
            {
                self.with_justification(move |facts: &[FactRef], score: &Sc| {
                    let justification: Rc<dyn Justification> =
                        Rc::new(justify($(downcast_fact::<$fact>(facts.get($index)?)?,)+ score));
                    Some(justification)
                })
            }
        }
    };
}

impl_justify_with!(A: 0);
impl_justify_with!(A: 0, B: 1);
impl_justify_with!(A: 0, B: 1, C: 2);
