//! Error types for alignment and configuration loading.

use thiserror::Error;

/// Errors surfaced by the alignment pipeline.
///
/// None of these are retried internally: the computation is deterministic.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AlignError {
    /// One of the input sequences was empty or otherwise malformed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The boundary index lies outside `[-1, len)` of the source sequence.
    #[error("Boundary index {index} outside [-1, {len})")]
    InvalidBoundary { index: isize, len: usize },

    /// The number of equally minimal alignments exceeds the configured cap.
    #[error("Too many alignments: {found} minimal paths exceed the cap of {cap}")]
    PathExplosion { found: u64, cap: usize },

    /// No path was handed to the canonicalizer.
    ///
    /// A well-formed matrix always yields at least one path, so this is a
    /// defect upstream rather than a recoverable condition.
    #[error("No change sequences to canonicalize")]
    NoPaths,

    /// A cost model produced a negative, infinite or NaN cost.
    #[error("Cost model returned {cost} for {d_in:?} -> {d_out:?}")]
    InvalidCost {
        d_in: String,
        d_out: String,
        cost: f64,
    },

    /// A strict cost table has no entry for the requested pair.
    #[error("No cost defined for {d_in:?} -> {d_out:?}")]
    MissingCost { d_in: String, d_out: String },
}

/// Errors raised while loading configuration or cost tables.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cost table line {line}: {reason}")]
    Table { line: usize, reason: String },
}

/// A specialized `Result` type for alignment operations.
pub type Result<T> = std::result::Result<T, AlignError>;
