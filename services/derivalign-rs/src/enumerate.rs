//! Reconstruction of every minimum-cost edit path from the matrix.

use std::rc::Rc;

use log::{debug, warn};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{AlignError, Result};
use crate::graph::TieGraph;
use crate::matrix::{Matrix, Position};
use crate::types::{ChangeSequence, Transition};

/// Default cap on the number of enumerated paths
pub const DEFAULT_MAX_PATHS: usize = 4096;

type RawPath = Vec<Transition>;

/// Changes in order, with each run of unchanged steps reduced to `None`
type ChangeKey = Vec<Option<(String, String)>>;

fn change_key(path: &[Transition]) -> ChangeKey {
    let mut key: ChangeKey = Vec::new();
    for step in path {
        if step.is_change() {
            key.push(Some((step.d_in.clone(), step.d_out.clone())));
        } else if key.last() != Some(&None) {
            key.push(None);
        }
    }
    key
}

/// Backtracking over tied moves.
///
/// In strict mode every distinct path through the tie graph is produced, in
/// a deterministic order (delete, insert, diagonal at each cell). The path
/// count is known up front from [`TieGraph::path_count`], so an oversized
/// result fails before anything is allocated.
///
/// Memoized mode caches the sub-paths reaching each cell and keeps one
/// representative per change pattern: sub-paths making the same changes,
/// separated by unchanged stretches in the same places, collapse into the
/// first one found even though they align different symbol positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathEnumerator {
    max_paths: usize,
    memoize: bool,
}

impl Default for PathEnumerator {
    fn default() -> Self {
        Self {
            max_paths: DEFAULT_MAX_PATHS,
            memoize: false,
        }
    }
}

impl PathEnumerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_paths(mut self, max_paths: usize) -> Self {
        self.max_paths = max_paths;
        self
    }

    pub fn memoize(mut self, memoize: bool) -> Self {
        self.memoize = memoize;
        self
    }

    pub fn cap(&self) -> usize {
        self.max_paths
    }

    pub fn is_memoized(&self) -> bool {
        self.memoize
    }

    pub fn enumerate(&self, matrix: &Matrix) -> Result<Vec<ChangeSequence>> {
        let raw = if self.memoize {
            let mut cache = FxHashMap::default();
            let paths = self.backtrack_memoized(matrix, matrix.final_position(), &mut cache)?;
            paths.as_ref().clone()
        } else {
            let found = TieGraph::from_matrix(matrix).path_count();
            if found > self.max_paths as u64 {
                warn!(
                    "{found} minimal alignments exceed the cap of {}",
                    self.max_paths
                );
                return Err(AlignError::PathExplosion {
                    found,
                    cap: self.max_paths,
                });
            }
            backtrack(matrix, matrix.final_position())
        };

        debug!("enumerated {} minimal paths", raw.len());
        let source_len = matrix.source_len();
        Ok(raw
            .into_iter()
            .map(|path| ChangeSequence::new(path, source_len))
            .collect())
    }

    fn backtrack_memoized(
        &self,
        matrix: &Matrix,
        pos: Position,
        cache: &mut FxHashMap<Position, Rc<Vec<RawPath>>>,
    ) -> Result<Rc<Vec<RawPath>>> {
        if let Some(paths) = cache.get(&pos) {
            return Ok(Rc::clone(paths));
        }
        if pos == (0, 0) {
            let origin = Rc::new(vec![vec![Transition::start()]]);
            cache.insert(pos, Rc::clone(&origin));
            return Ok(origin);
        }

        let mut seen: FxHashSet<ChangeKey> = FxHashSet::default();
        let mut paths = Vec::new();
        for mv in matrix.cell(pos).moves() {
            let sub_paths = self.backtrack_memoized(matrix, mv.from, cache)?;
            let step = Transition::from_operation(&mv.op, pos.0);
            for sub in sub_paths.iter() {
                let mut path = sub.clone();
                path.push(step.clone());
                if !seen.insert(change_key(&path)) {
                    continue;
                }
                paths.push(path);
                if paths.len() > self.max_paths {
                    warn!(
                        "more than {} distinct sub-paths reach cell {:?}",
                        self.max_paths, pos
                    );
                    return Err(AlignError::PathExplosion {
                        found: paths.len() as u64,
                        cap: self.max_paths,
                    });
                }
            }
        }

        let paths = Rc::new(paths);
        cache.insert(pos, Rc::clone(&paths));
        Ok(paths)
    }
}

/// Every path from the origin to `pos`, expanding each tied move
fn backtrack(matrix: &Matrix, pos: Position) -> Vec<RawPath> {
    if pos == (0, 0) {
        return vec![vec![Transition::start()]];
    }
    let mut paths = Vec::new();
    for mv in matrix.cell(pos).moves() {
        let step = Transition::from_operation(&mv.op, pos.0);
        for mut path in backtrack(matrix, mv.from) {
            path.push(step.clone());
            paths.push(path);
        }
    }
    paths
}

/// Enumerate with the default cap in strict mode
pub fn enumerate_minimal_paths(matrix: &Matrix) -> Result<Vec<ChangeSequence>> {
    PathEnumerator::default().enumerate(matrix)
}
