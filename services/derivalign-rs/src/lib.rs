//! DerivAlign Core: weighted edit alignment for base/derived word pairs.
//!
//! Pipeline, leaves first:
//! - Cost models pricing substitutions, insertions and deletions
//! - Alignment matrix keeping every tied minimal move
//! - Enumeration of all minimum-cost edit paths
//! - Canonicalization of paths into grouped changes
//! - Classification of changes around the root/suffix boundary
//!
//! Python bindings are available behind the `python` feature.

pub mod canonical;
pub mod classify;
pub mod config;
pub mod cost;
pub mod enumerate;
pub mod error;
pub mod graph;
pub mod matrix;
pub mod phonetic;
pub mod transform;
pub mod types;

#[cfg(feature = "python")]
mod python;

pub use canonical::{Canonicalizer, MergeRule};
pub use classify::{canonicalize_and_classify, canonicalize_and_classify_with, classify};
pub use config::{EngineConfig, GroupingConfig};
pub use cost::{
    BuiltinCost, CostContext, CostModel, CostSpec, HiatusCost, MorphophonemicCost, PairTableCost,
    UniformCost,
};
pub use enumerate::{enumerate_minimal_paths, PathEnumerator, DEFAULT_MAX_PATHS};
pub use error::{AlignError, ConfigError, Result};
pub use graph::TieGraph;
pub use matrix::{compute_alignment, compute_alignment_with, Cell, Matrix, Move, Position};
pub use phonetic::{segment, split_symbols, weighted_distance, Inventory};
pub use transform::{
    strip_final_vowel, truncate_affix, AlignmentRequest, BaseCandidate, DerivationPair,
    DerivationRecord, Engine, WordTransformation,
};
pub use types::{
    BoundaryPosition, ChangeSequence, ClassifiedEdits, Operation, Symbol, Transition, BOS, EMPTY,
    EOS,
};
