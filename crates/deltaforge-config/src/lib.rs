//! Session configuration for deltaforge.
//!
//! A [`SessionConfig`] picks the self-check level of a session, turns
//! constraint match tracking on or off, and overrides constraint weights by
//! id. It reads from TOML or YAML:
//!
//! ```
//! use deltaforge_config::{EnvironmentMode, SessionConfig};
//!
//! let config = SessionConfig::from_toml_str(r#"
//!     environment_mode = "full_assert"
//!     constraint_match_enabled = true
//!
//!     [constraint_weights]
//!     "Room conflict" = "1hard/0soft"
//! "#).unwrap();
//!
//! assert_eq!(config.environment_mode, EnvironmentMode::FullAssert);
//! assert!(config.constraint_match_enabled);
//! assert_eq!(config.constraint_weights.len(), 1);
//! ```
//!
//! A missing file is an error, so callers that can run on defaults say so:
//!
//! ```
//! use deltaforge_config::SessionConfig;
//!
//! let config = SessionConfig::load("session.toml").unwrap_or_default();
//! assert!(!config.constraint_match_enabled);
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use deltaforge_core::ParseableScore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("malformed YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Settings of one constraint session. Every field may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SessionConfig {
    #[serde(default)]
    pub environment_mode: EnvironmentMode,

    /// Record individual constraint matches for explanations and
    /// indictments. Totals are kept either way.
    #[serde(default)]
    pub constraint_match_enabled: bool,

    /// Constraint id to weight text, e.g. `"Room conflict" = "1hard/0soft"`.
    #[serde(default)]
    pub constraint_weights: BTreeMap<String, String>,
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a configuration file, as YAML when the extension is `yaml` or
    /// `yml` and as TOML otherwise.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_str(&text),
            _ => Self::from_toml_str(&text),
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn with_environment_mode(mut self, mode: EnvironmentMode) -> Self {
        self.environment_mode = mode;
        self
    }

    pub fn with_constraint_match_enabled(mut self, enabled: bool) -> Self {
        self.constraint_match_enabled = enabled;
        self
    }

    pub fn with_constraint_weight(mut self, constraint_id: impl Into<String>, weight: impl Into<String>) -> Self {
        self.constraint_weights.insert(constraint_id.into(), weight.into());
        self
    }

    /// The weight overrides as scores of type `Sc`.
    ///
    /// Fails with [`ConfigError::Invalid`] on the first weight that does not
    /// parse, naming its constraint.
    ///
    /// ```
    /// use deltaforge_config::SessionConfig;
    /// use deltaforge_core::HardSoftScore;
    ///
    /// let config = SessionConfig::new().with_constraint_weight("Overlap", "2hard/0soft");
    /// let weights = config.parsed_weights::<HardSoftScore>().unwrap();
    /// assert_eq!(weights["Overlap"], HardSoftScore::of(2, 0));
    /// ```
    pub fn parsed_weights<Sc: ParseableScore>(&self) -> Result<BTreeMap<String, Sc>, ConfigError> {
        let mut weights = BTreeMap::new();
        for (id, text) in &self.constraint_weights {
            let weight = Sc::parse(text)
                .map_err(|e| ConfigError::Invalid(format!("weight of constraint '{id}': {e}")))?;
            weights.insert(id.clone(), weight);
        }
        Ok(weights)
    }
}

/// How much a session checks itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentMode {
    #[default]
    NonReproducible,

    Reproducible,

    /// After every settle, no tuple may be left mid-transition.
    FastAssert,

    /// Fast assert plus a from-scratch recount behind every calculated score.
    FullAssert,
}

impl EnvironmentMode {
    pub fn is_asserted(self) -> bool {
        matches!(self, EnvironmentMode::FastAssert | EnvironmentMode::FullAssert)
    }

    pub fn is_fully_asserted(self) -> bool {
        self == EnvironmentMode::FullAssert
    }
}

#[cfg(test)]
mod tests;
