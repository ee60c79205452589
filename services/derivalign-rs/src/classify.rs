//! Boundary classification of canonical edits.

use crate::canonical::Canonicalizer;
use crate::error::{AlignError, Result};
use crate::types::{BoundaryPosition, ChangeSequence, ClassifiedEdits};

/// Check that `boundary` lies in `[-1, source_len)`
pub fn validate_boundary(boundary: isize, source_len: usize) -> Result<()> {
    if boundary < -1 || boundary >= source_len as isize {
        return Err(AlignError::InvalidBoundary {
            index: boundary,
            len: source_len,
        });
    }
    Ok(())
}

/// Split the edits of `sequence` around `boundary`, the index of the last
/// root symbol in the source.
///
/// A step is placed by the first source symbol it consumes. Pure insertions
/// sit right after the symbol consumed before them: inside the root when
/// that symbol precedes the boundary, in the suffix region otherwise.
pub fn classify(sequence: &ChangeSequence, boundary: isize) -> Result<ClassifiedEdits> {
    validate_boundary(boundary, sequence.source_len())?;
    let mut edits = ClassifiedEdits::default();
    for step in sequence.edits() {
        let bucket = match step.position_relative_to(boundary) {
            BoundaryPosition::Before => &mut edits.before,
            BoundaryPosition::At => &mut edits.at,
            BoundaryPosition::After => &mut edits.after,
        };
        bucket.push(step.clone());
    }
    Ok(edits)
}

/// Canonicalize `paths` with the default grouping rules, keep the most
/// compact one and classify it
pub fn canonicalize_and_classify(
    paths: &[ChangeSequence],
    boundary: isize,
) -> Result<ClassifiedEdits> {
    canonicalize_and_classify_with(&Canonicalizer::default(), paths, boundary)
}

pub fn canonicalize_and_classify_with(
    canonicalizer: &Canonicalizer,
    paths: &[ChangeSequence],
    boundary: isize,
) -> Result<ClassifiedEdits> {
    let first = paths.first().ok_or(AlignError::NoPaths)?;
    validate_boundary(boundary, first.source_len())?;
    let chosen = canonicalizer.select(paths)?;
    classify(&chosen, boundary)
}
