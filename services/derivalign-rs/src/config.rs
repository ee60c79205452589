//! Engine configuration, loadable from JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::canonical::MergeRule;
use crate::cost::CostSpec;
use crate::enumerate::{PathEnumerator, DEFAULT_MAX_PATHS};
use crate::error::ConfigError;
use crate::matrix::DEFAULT_TIE_EPSILON;
use crate::phonetic::Inventory;

/// Merge-pass settings for the canonicalizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    /// Passes, applied once each in this order
    pub rules: Vec<MergeRule>,
    /// Vowels and glides
    pub vocalic: Vec<String>,
    /// Palatalized consonants that absorb a following inserted glide
    pub palatal_outputs: Vec<String>,
    pub palatal_glides: Vec<String>,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            rules: MergeRule::ALL.to_vec(),
            vocalic: Inventory::romanian().vocalic().collect(),
            palatal_outputs: vec!["č".to_string()],
            palatal_glides: vec!["i".to_string(), "i̯".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Cap on enumerated minimal paths
    pub max_paths: usize,
    /// Use the per-cell sub-path cache instead of strict enumeration
    pub memoize: bool,
    pub tie_epsilon: f64,
    pub grouping: GroupingConfig,
    pub cost: CostSpec,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_paths: DEFAULT_MAX_PATHS,
            memoize: false,
            tie_epsilon: DEFAULT_TIE_EPSILON,
            grouping: GroupingConfig::default(),
            cost: CostSpec::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn enumerator(&self) -> PathEnumerator {
        PathEnumerator::new()
            .max_paths(self.max_paths)
            .memoize(self.memoize)
    }
}
