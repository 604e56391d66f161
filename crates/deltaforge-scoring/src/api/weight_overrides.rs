// Constraint weights supplied at run time.
//
// An override replaces the weight a constraint declares in code. Overrides
// are read once, while the network is built. A zero weight drops the
// constraint from the network.

use std::collections::BTreeMap;
use std::fmt::Debug;

use deltaforge_config::{ConfigError, SessionConfig};
use deltaforge_core::{ParseableScore, Score};

// Weights keyed by constraint id, which is `package/name` or plain `name`
// for a factory without a package.
#[derive(Clone)]
pub struct ConstraintWeightOverrides<Sc: Score> {
    by_id: BTreeMap<String, Sc>,
}

impl<Sc: Score> Debug for ConstraintWeightOverrides<Sc> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.by_id.iter().map(|(id, weight)| (id, weight.to_string())))
            .finish()
    }
}

impl<Sc: Score> Default for ConstraintWeightOverrides<Sc> {
    fn default() -> Self {
        Self { by_id: BTreeMap::new() }
    }
}

impl<Sc: Score> FromIterator<(String, Sc)> for ConstraintWeightOverrides<Sc> {
    fn from_iter<I: IntoIterator<Item = (String, Sc)>>(iter: I) -> Self {
        Self { by_id: iter.into_iter().collect() }
    }
}

impl<Sc: Score> ConstraintWeightOverrides<Sc> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<N: Into<String>>(pairs: impl IntoIterator<Item = (N, Sc)>) -> Self {
        pairs.into_iter().map(|(id, weight)| (id.into(), weight)).collect()
    }

    // Reads the `constraint_weights` table, failing on the first weight that
    // does not parse as `Sc`.
    pub fn from_config(config: &SessionConfig) -> Result<Self, ConfigError>
    where
        Sc: ParseableScore,
    {
        Ok(config.parsed_weights::<Sc>()?.into_iter().collect())
    }

    pub fn put<N: Into<String>>(&mut self, id: N, weight: Sc) {
        self.by_id.insert(id.into(), weight);
    }

    pub fn remove(&mut self, id: &str) -> Option<Sc> {
        self.by_id.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&Sc> {
        self.by_id.get(id)
    }

    pub fn get_or_default(&self, id: &str, declared: Sc) -> Sc {
        match self.by_id.get(id) {
            Some(weight) => weight.clone(),
            None => declared,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    // Overridden ids with no constraint behind them, in id order.
    pub(crate) fn unknown_ids<'a>(&'a self, known: &'a [String]) -> impl Iterator<Item = &'a str> + 'a {
        self.by_id
            .keys()
            .map(String::as_str)
            .filter(move |id| !known.iter().any(|k| k == id))
    }
}
