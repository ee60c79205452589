//! Change-sequence canonicalization.
//!
//! Raw edit paths are noisy: a single phonological event often shows up as
//! several atomic steps. Each merge pass scans a sequence left to right and
//! folds a step into the group before it when the pass predicate holds,
//! producing a new sequence. Passes run once each, in configured order.

use ahash::AHashSet;
use log::trace;
use serde::{Deserialize, Serialize};

use crate::config::GroupingConfig;
use crate::error::{AlignError, Result};
use crate::types::{ChangeSequence, Transition};

/// Grouping rules, one per merge pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeRule {
    /// Consecutive pure insertions
    AdjacentInsertions,
    /// Adjacent changes whose symbols on both sides are all vocalic
    VocalicRun,
    /// A glide inserted right after a palatalized consonant
    PalatalGlide,
}

impl MergeRule {
    pub const ALL: [MergeRule; 3] = [
        MergeRule::AdjacentInsertions,
        MergeRule::VocalicRun,
        MergeRule::PalatalGlide,
    ];
}

/// Applies the merge passes and picks the most compact path
#[derive(Debug, Clone)]
pub struct Canonicalizer {
    rules: Vec<MergeRule>,
    vocalic: AHashSet<String>,
    palatal_outputs: AHashSet<String>,
    palatal_glides: AHashSet<String>,
}

impl Default for Canonicalizer {
    fn default() -> Self {
        Self::from_config(&GroupingConfig::default())
    }
}

impl Canonicalizer {
    pub fn from_config(config: &GroupingConfig) -> Self {
        Self {
            rules: config.rules.clone(),
            vocalic: config.vocalic.iter().cloned().collect(),
            palatal_outputs: config.palatal_outputs.iter().cloned().collect(),
            palatal_glides: config.palatal_glides.iter().cloned().collect(),
        }
    }

    pub fn rules(&self) -> &[MergeRule] {
        &self.rules
    }

    fn is_vocalic_or_empty(&self, s: &str) -> bool {
        s.is_empty() || self.vocalic.contains(s)
    }

    /// Whether `next` should be folded into `prev` under `rule`
    pub fn should_merge(&self, rule: MergeRule, prev: &Transition, next: &Transition) -> bool {
        match rule {
            MergeRule::AdjacentInsertions => prev.is_insertion() && next.is_insertion(),
            MergeRule::VocalicRun => {
                prev.is_change()
                    && next.is_change()
                    && [&prev.d_in, &prev.d_out, &next.d_in, &next.d_out]
                        .iter()
                        .all(|s| self.is_vocalic_or_empty(s))
            }
            MergeRule::PalatalGlide => {
                self.palatal_outputs.contains(&prev.d_out)
                    && next.is_insertion()
                    && self.palatal_glides.contains(&next.d_out)
            }
        }
    }

    /// One left-to-right pass of `rule`
    pub fn apply_pass(&self, rule: MergeRule, sequence: &ChangeSequence) -> ChangeSequence {
        let mut merged: Vec<Transition> = Vec::with_capacity(sequence.len());
        for step in sequence {
            match merged.last_mut() {
                Some(prev) if self.should_merge(rule, prev, step) => prev.absorb(step),
                _ => merged.push(step.clone()),
            }
        }
        ChangeSequence::new(merged, sequence.source_len())
    }

    /// Run every pass in order. Unchanged steps are kept.
    pub fn canonicalize(&self, raw: &ChangeSequence) -> ChangeSequence {
        let mut sequence = raw.clone();
        for &rule in &self.rules {
            sequence = self.apply_pass(rule, &sequence);
            trace!("{rule:?}: {sequence}");
        }
        sequence
    }

    /// Canonicalize every path and keep the one with the fewest edit groups.
    ///
    /// Ties go to the shorter canonical sequence counting unchanged steps,
    /// so a substitution beats an equally expensive delete/insert pair, and
    /// then to the first path found. Unchanged steps are dropped from the
    /// result.
    pub fn select(&self, paths: &[ChangeSequence]) -> Result<ChangeSequence> {
        paths
            .iter()
            .map(|raw| self.canonicalize(raw))
            .min_by_key(|canon| (canon.edit_count(), canon.len()))
            .map(|canon| canon.without_noops())
            .ok_or(AlignError::NoPaths)
    }
}
