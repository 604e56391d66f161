use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use deltaforge_config::{EnvironmentMode, SessionConfig};
use deltaforge_core::{InnerScore, Score};
use tracing::{debug, error, trace, warn};

use super::propagate::Propagator;
use super::{ConstraintNetwork, SupplyContext};
use crate::api::{ConstraintMatchTotal, IndictmentMap, ScoreExplanation};
use crate::error::{ConstraintDrift, NetworkError, ProtocolViolation, ScoreCorruption};
use crate::fact::{fact_type_id, Fact, FactRef};
use crate::inliner::ScoreInliner;
use crate::node::{NodeKind, NodeState, Op};
use crate::tuple::TupleArena;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Open,
    Initialized,
    Closed,
}

/// One running evaluation of a [`ConstraintNetwork`].
///
/// Facts are reported with [`insert`](Self::insert),
/// [`update`](Self::update) and [`retract`](Self::retract); nothing is
/// propagated until [`settle`](Self::settle) or
/// [`calculate_score`](Self::calculate_score). A fatal error poisons the
/// session: every later call fails with [`NetworkError::Poisoned`].
///
/// # Examples
///
/// ```
/// use std::rc::Rc;
/// use deltaforge_config::SessionConfig;
/// use deltaforge_core::SimpleScore;
/// use deltaforge_scoring::ConstraintFactory;
///
/// #[derive(Debug)]
/// struct Shift {
///     hours: i64,
/// }
///
/// let factory = ConstraintFactory::<SimpleScore>::new();
/// factory
///     .for_each::<Shift>()
///     .filter(|s: &Shift| s.hours > 8)
///     .penalize(SimpleScore::of(1))
///     .as_constraint("Long shift");
/// let network = factory.build().unwrap();
///
/// let mut session = network.create_session(&SessionConfig::default());
/// session.insert(&Rc::new(Shift { hours: 10 })).unwrap();
/// session.insert(&Rc::new(Shift { hours: 6 })).unwrap();
/// assert_eq!(session.calculate_score(0).unwrap().score(), &SimpleScore::of(-1));
/// ```
pub struct ConstraintSession<Sc: Score> {
    network: Arc<ConstraintNetwork<Sc>>,
    states: Vec<NodeState<Sc::Level>>,
    arena: TupleArena,
    inliner: ScoreInliner<Sc>,
    mode: EnvironmentMode,
    lifecycle: Lifecycle,
    poisoned: Option<String>,
    next_sequence: u64,
    supplies: Option<Rc<dyn SupplyContext>>,
    demanded: Vec<String>,
}

impl<Sc: Score> ConstraintSession<Sc> {
    pub(crate) fn new(network: Arc<ConstraintNetwork<Sc>>, config: &SessionConfig) -> Self {
        let states = network.nodes().iter().map(|node| NodeState::new(&node.kind)).collect();
        let mut inliner = ScoreInliner::new(network.zero().clone(), config.constraint_match_enabled);
        for constraint in network.constraints() {
            let index = inliner.add_constraint(constraint.constraint_ref.clone(), constraint.weight.clone());
            if let Some(justify) = &constraint.justify {
                inliner.set_justification(index, Arc::clone(justify));
            }
        }
        debug!(
            nodes = network.node_count(),
            constraints = network.constraint_count(),
            mode = ?config.environment_mode,
            "session opened"
        );
        Self {
            network,
            states,
            arena: TupleArena::new(),
            inliner,
            mode: config.environment_mode,
            lifecycle: Lifecycle::Open,
            poisoned: None,
            next_sequence: 0,
            supplies: None,
            demanded: Vec::new(),
        }
    }

    pub fn network(&self) -> &Arc<ConstraintNetwork<Sc>> {
        &self.network
    }

    /// Hands supply-aware sources their supplies. Must precede the first
    /// insert of a fact such a source consumes.
    pub fn initialize(&mut self, supplies: Rc<dyn SupplyContext>) -> Result<(), NetworkError> {
        self.guard()?;
        if self.lifecycle == Lifecycle::Initialized {
            return Err(NetworkError::AlreadyInitialized);
        }
        let network = Arc::clone(&self.network);
        let mut demanded = Vec::new();
        let mut provided = Vec::new();
        for (index, node) in network.nodes().iter().enumerate() {
            let NodeKind::ForEach(def) = &node.kind else {
                continue;
            };
            let Some(key) = &def.supply_key else {
                continue;
            };
            match supplies.demand(key) {
                Some(supply) => {
                    demanded.push(key.clone());
                    provided.push((index, supply));
                }
                None => {
                    for key in &demanded {
                        supplies.cancel(key);
                    }
                    return Err(NetworkError::MissingSupply(key.clone()));
                }
            }
        }
        for (index, supply) in provided {
            if let NodeState::ForEach(state) = &mut self.states[index] {
                state.set_supply(Some(supply));
            }
        }
        debug!(supplies = demanded.len(), "session initialized");
        self.demanded = demanded;
        self.supplies = Some(supplies);
        self.lifecycle = Lifecycle::Initialized;
        Ok(())
    }

    pub fn insert<T: Fact>(&mut self, fact: &Rc<T>) -> Result<(), NetworkError> {
        let fact: FactRef = fact.clone();
        self.insert_dyn(fact)
    }

    /// Reports that the fields of an inserted fact changed.
    pub fn update<T: Fact>(&mut self, fact: &Rc<T>) -> Result<(), NetworkError> {
        let fact: FactRef = fact.clone();
        self.update_dyn(&fact)
    }

    pub fn retract<T: Fact>(&mut self, fact: &Rc<T>) -> Result<(), NetworkError> {
        let fact: FactRef = fact.clone();
        self.retract_dyn(&fact)
    }

    pub fn insert_dyn(&mut self, fact: FactRef) -> Result<(), NetworkError> {
        self.guard()?;
        let result = self.route(&fact, Op::Insert);
        self.poison_on_fatal(result)
    }

    pub fn update_dyn(&mut self, fact: &FactRef) -> Result<(), NetworkError> {
        self.guard()?;
        let result = self.route(fact, Op::Update);
        self.poison_on_fatal(result)
    }

    pub fn retract_dyn(&mut self, fact: &FactRef) -> Result<(), NetworkError> {
        self.guard()?;
        let result = self.route(fact, Op::Retract);
        self.poison_on_fatal(result)
    }

    /// Propagates every pending change through the network.
    pub fn settle(&mut self) -> Result<(), NetworkError> {
        self.guard()?;
        let result = self.settle_unguarded();
        self.poison_on_fatal(result)
    }

    /// Settles, then returns the running score combined with the
    /// externally counted unassigned variables.
    pub fn calculate_score(&mut self, unassigned_count: usize) -> Result<InnerScore<Sc>, NetworkError> {
        self.settle()?;
        if self.mode.is_fully_asserted() {
            self.verify_from_scratch()?;
        }
        Ok(self.inliner.extract_score(unassigned_count))
    }

    /// Running score as of the last settle.
    pub fn score(&self) -> Sc {
        self.inliner.score()
    }

    /// Every constraint of the network with its score. Matches are listed
    /// only when match tracking is enabled.
    pub fn constraint_match_totals(&self) -> BTreeMap<String, ConstraintMatchTotal<Sc>> {
        self.inliner.constraint_match_totals()
    }

    /// Empty unless match tracking is enabled.
    pub fn indictment_map(&self) -> IndictmentMap<Sc> {
        self.inliner.indictment_map()
    }

    /// Running impact of one fact; `None` when match tracking is off or no
    /// match names it.
    pub fn indictment_score(&self, fact: &FactRef) -> Option<Sc> {
        self.inliner.indictment_score(fact)
    }

    pub fn explain(&mut self) -> Result<ScoreExplanation<Sc>, NetworkError> {
        self.settle()?;
        Ok(ScoreExplanation {
            score: self.inliner.score(),
            constraint_totals: self.inliner.constraint_match_totals(),
        })
    }

    pub fn is_constraint_match_enabled(&self) -> bool {
        self.inliner.is_constraint_match_enabled()
    }

    /// Recomputes the score from the live facts in a fresh session and
    /// compares it with the running one, constraint by constraint.
    pub fn verify_from_scratch(&mut self) -> Result<(), NetworkError> {
        self.settle()?;

        let mut facts: Vec<(u64, FactRef)> = self
            .states
            .iter()
            .filter_map(|state| match state {
                NodeState::ForEach(source) => Some(source.facts()),
                _ => None,
            })
            .flatten()
            .map(|(sequence, fact)| (sequence, Rc::clone(fact)))
            .collect();
        facts.sort_by_key(|(sequence, _)| *sequence);
        facts.dedup_by_key(|(sequence, _)| *sequence);

        let config = SessionConfig::new().with_constraint_match_enabled(self.inliner.is_constraint_match_enabled());
        let mut fresh = ConstraintSession::new(Arc::clone(&self.network), &config);
        for (fresh_state, state) in fresh.states.iter_mut().zip(&self.states) {
            if let (NodeState::ForEach(fresh_source), NodeState::ForEach(source)) = (fresh_state, state) {
                fresh_source.set_supply(source.supply().cloned());
            }
        }
        fresh.lifecycle = self.lifecycle;
        for (_, fact) in &facts {
            fresh.route(fact, Op::Insert)?;
        }
        fresh.settle_unguarded()?;

        let incremental = self.inliner.score();
        let from_scratch = fresh.inliner.score();
        let mut constraints = Vec::new();
        for index in 0..self.inliner.constraint_count() {
            let live = self.inliner.constraint_score(index);
            let expected = fresh.inliner.constraint_score(index);
            if live == expected && self.inliner.match_count(index) == fresh.inliner.match_count(index) {
                continue;
            }
            let held = self.inliner.match_fingerprints(index);
            let produced = fresh.inliner.match_fingerprints(index);
            constraints.push(ConstraintDrift {
                constraint_id: self
                    .inliner
                    .constraint_ref(index)
                    .map(|r| r.full_name())
                    .unwrap_or_default(),
                incremental: live.map(|s| s.to_string()).unwrap_or_default(),
                from_scratch: expected.map(|s| s.to_string()).unwrap_or_default(),
                missing_matches: difference(&produced, &held),
                excess_matches: difference(&held, &produced),
            });
        }
        if constraints.is_empty() && incremental == from_scratch {
            return Ok(());
        }
        warn!(
            constraints = ?constraints.iter().map(|c| c.constraint_id.as_str()).collect::<Vec<_>>(),
            "incremental score differs from a from-scratch recomputation"
        );
        Err(NetworkError::Consistency(Box::new(ScoreCorruption {
            incremental: incremental.to_string(),
            from_scratch: from_scratch.to_string(),
            constraints,
        })))
    }

    /// Releases supply demands and all session state.
    pub fn close(&mut self) -> Result<(), NetworkError> {
        if self.lifecycle == Lifecycle::Closed {
            return Err(NetworkError::Closed);
        }
        self.cancel_demands();
        self.states = self.network.nodes().iter().map(|node| NodeState::new(&node.kind)).collect();
        self.arena.clear();
        self.lifecycle = Lifecycle::Closed;
        debug!("session closed");
        Ok(())
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned.is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.lifecycle == Lifecycle::Closed
    }

    /// Live tuples across all nodes.
    pub fn tuple_count(&self) -> usize {
        self.arena.len()
    }

    fn guard(&self) -> Result<(), NetworkError> {
        if let Some(message) = &self.poisoned {
            return Err(NetworkError::Poisoned(message.clone()));
        }
        if self.lifecycle == Lifecycle::Closed {
            return Err(NetworkError::Closed);
        }
        Ok(())
    }

    fn poison_on_fatal<T>(&mut self, result: Result<T, NetworkError>) -> Result<T, NetworkError> {
        if let Err(e) = &result {
            if e.is_fatal() {
                error!(error = %e, "session poisoned");
                self.poisoned = Some(e.to_string());
            }
        }
        result
    }

    fn route(&mut self, fact: &FactRef, op: Op) -> Result<(), NetworkError> {
        let network = Arc::clone(&self.network);
        let sources = network.sources(fact_type_id(fact));
        if sources.is_empty() {
            trace!(fact = ?fact, "no source consumes this fact type");
            return Ok(());
        }
        if op == Op::Insert {
            for &id in sources {
                if let (NodeKind::ForEach(def), NodeState::ForEach(state)) = (&network.node(id).kind, &self.states[id.0]) {
                    if def.supply_key.is_some() && state.supply().is_none() {
                        return Err(NetworkError::NotInitialized);
                    }
                }
            }
        }
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        for &id in sources {
            let (NodeKind::ForEach(def), NodeState::ForEach(state)) = (&network.node(id).kind, &mut self.states[id.0]) else {
                return Err(NetworkError::shape(id, "facts routed to a source node"));
            };
            match op {
                Op::Insert => state.insert(id, def, &mut self.arena, Rc::clone(fact), sequence)?,
                Op::Update => state.update(id, def, &mut self.arena, fact)?,
                Op::Retract => state.retract(&mut self.arena, fact)?,
            }
        }
        Ok(())
    }

    fn settle_unguarded(&mut self) -> Result<(), NetworkError> {
        let propagated = Propagator {
            network: self.network.as_ref(),
            states: &mut self.states,
            arena: &mut self.arena,
            inliner: &mut self.inliner,
        }
        .settle()?;
        trace!(propagated, live_tuples = self.arena.len(), "settled");
        if self.mode.is_asserted() {
            self.assert_settled()?;
        }
        Ok(())
    }

    fn assert_settled(&self) -> Result<(), NetworkError> {
        for state in &self.states {
            if let Some(tuple) = state.queue().and_then(|queue| queue.pending()) {
                let state = self.arena.state(tuple)?;
                return Err(ProtocolViolation::Unsettled { tuple, state }.into());
            }
        }
        match self.arena.iter().find(|(_, tuple)| tuple.state().is_dirty()) {
            Some((tuple, dirty)) => Err(ProtocolViolation::Unsettled {
                tuple,
                state: dirty.state(),
            }
            .into()),
            None => Ok(()),
        }
    }

    fn cancel_demands(&mut self) {
        if let Some(supplies) = self.supplies.take() {
            for key in self.demanded.drain(..) {
                supplies.cancel(&key);
            }
        }
    }
}

impl<Sc: Score> Drop for ConstraintSession<Sc> {
    fn drop(&mut self) {
        self.cancel_demands();
    }
}

impl<Sc: Score> fmt::Debug for ConstraintSession<Sc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintSession")
            .field("lifecycle", &self.lifecycle)
            .field("score", &self.inliner.score())
            .field("tuples", &self.arena.len())
            .field("poisoned", &self.poisoned)
            .finish()
    }
}

/// Entries of `left` not matched one-for-one in `right`.
fn difference(left: &[String], right: &[String]) -> Vec<String> {
    let mut available: HashMap<&str, usize> = HashMap::new();
    for entry in right {
        *available.entry(entry.as_str()).or_insert(0) += 1;
    }
    left.iter()
        .filter(|entry| match available.get_mut(entry.as_str()) {
            Some(count) if *count > 0 => {
                *count -= 1;
                false
            }
            _ => true,
        })
        .cloned()
        .collect()
}
