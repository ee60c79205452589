//! Alignment matrix: minimum weighted edit cost between every prefix pair
//! of two sentinel-padded sequences, keeping every move that ties for the
//! minimum at each cell.

use std::ops::Index;

use log::debug;
use ndarray::Array2;
use ordered_float::OrderedFloat;

use crate::cost::{step_cost, CostContext, CostModel};
use crate::error::{AlignError, Result};
use crate::types::{is_sentinel, Operation, Symbol, BOS, EOS};

/// Scores within this distance of the cell minimum count as ties
pub const DEFAULT_TIE_EPSILON: f64 = 1e-9;

/// `(row, col)` in the padded matrix
pub type Position = (usize, usize);

/// An operation together with the cell it was applied from
#[derive(Debug, Clone, PartialEq)]
pub struct Move {
    pub op: Operation,
    pub from: Position,
}

/// Minimum cumulative cost of a cell and every move achieving it
#[derive(Debug, Clone, Default)]
pub struct Cell {
    score: OrderedFloat<f64>,
    moves: Vec<Move>,
}

impl Cell {
    pub fn score(&self) -> f64 {
        self.score.0
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    /// Number of tied moves recorded here
    pub fn ties(&self) -> usize {
        self.moves.len()
    }

    fn single(op: Operation, from: Position, score: f64) -> Self {
        Self {
            score: OrderedFloat(score),
            moves: vec![Move { op, from }],
        }
    }
}

/// Grid of cells sized `(len(seq1) + 2) x (len(seq2) + 2)`
#[derive(Debug, Clone)]
pub struct Matrix {
    cells: Array2<Cell>,
    source: Vec<Symbol>,
    target: Vec<Symbol>,
}

impl Matrix {
    pub fn rows(&self) -> usize {
        self.cells.nrows()
    }

    pub fn cols(&self) -> usize {
        self.cells.ncols()
    }

    /// Padded source sequence (`BOS ... EOS`)
    pub fn source(&self) -> &[Symbol] {
        &self.source
    }

    /// Padded target sequence (`BOS ... EOS`)
    pub fn target(&self) -> &[Symbol] {
        &self.target
    }

    /// Unpadded source length
    pub fn source_len(&self) -> usize {
        self.source.len() - 2
    }

    pub fn target_len(&self) -> usize {
        self.target.len() - 2
    }

    pub fn final_position(&self) -> Position {
        (self.rows() - 1, self.cols() - 1)
    }

    pub fn cell(&self, pos: Position) -> &Cell {
        &self.cells[[pos.0, pos.1]]
    }

    pub fn minimum_score(&self) -> f64 {
        self.cell(self.final_position()).score()
    }

    pub fn cells(&self) -> &Array2<Cell> {
        &self.cells
    }

    /// Cumulative scores as a dense array
    pub fn scores(&self) -> Array2<f64> {
        self.cells.map(Cell::score)
    }
}

impl Index<Position> for Matrix {
    type Output = Cell;

    fn index(&self, pos: Position) -> &Cell {
        self.cell(pos)
    }
}

/// Surround a sequence with the `BOS`/`EOS` sentinels
pub fn pad<S: AsRef<str>>(seq: &[S]) -> Vec<Symbol> {
    let mut padded = Vec::with_capacity(seq.len() + 2);
    padded.push(BOS.to_string());
    padded.extend(seq.iter().map(|s| s.as_ref().to_string()));
    padded.push(EOS.to_string());
    padded
}

/// Reject empty sequences, empty symbols and stray sentinels
pub fn validate_sequence<S: AsRef<str>>(seq: &[S], name: &str) -> Result<()> {
    if seq.is_empty() {
        return Err(AlignError::InvalidInput(format!("{name} sequence is empty")));
    }
    for (idx, symbol) in seq.iter().enumerate() {
        let symbol = symbol.as_ref();
        if symbol.is_empty() {
            return Err(AlignError::InvalidInput(format!(
                "{name} symbol {idx} is empty"
            )));
        }
        if is_sentinel(symbol) {
            return Err(AlignError::InvalidInput(format!(
                "{name} symbol {idx} is the reserved sentinel {symbol:?}"
            )));
        }
    }
    Ok(())
}

/// Build the alignment matrix with the default tie tolerance
pub fn compute_alignment<S1, S2, C>(seq1: &[S1], seq2: &[S2], cost: &C) -> Result<Matrix>
where
    S1: AsRef<str>,
    S2: AsRef<str>,
    C: CostModel + ?Sized,
{
    compute_alignment_with(seq1, seq2, cost, DEFAULT_TIE_EPSILON)
}

/// Build the alignment matrix.
///
/// Cells are filled row-major. Every candidate move (delete from above,
/// insert from the left, diagonal from the upper-left) whose total lies
/// within `tie_epsilon` of the minimum is kept, in that order.
pub fn compute_alignment_with<S1, S2, C>(
    seq1: &[S1],
    seq2: &[S2],
    cost: &C,
    tie_epsilon: f64,
) -> Result<Matrix>
where
    S1: AsRef<str>,
    S2: AsRef<str>,
    C: CostModel + ?Sized,
{
    validate_sequence(seq1, "source")?;
    validate_sequence(seq2, "target")?;
    let source = pad(seq1);
    let target = pad(seq2);
    let rows = source.len();
    let cols = target.len();

    let mut cells: Array2<Cell> = Array2::default((rows, cols));

    for i in 1..rows {
        let ctx = CostContext::new(&source, &target, i, 0);
        let op = Operation::Delete(source[i].clone());
        let score = cells[[i - 1, 0]].score() + step_cost(cost, &op, &ctx)?;
        cells[[i, 0]] = Cell::single(op, (i - 1, 0), score);
    }
    for j in 1..cols {
        let ctx = CostContext::new(&source, &target, 0, j);
        let op = Operation::Insert(target[j].clone());
        let score = cells[[0, j - 1]].score() + step_cost(cost, &op, &ctx)?;
        cells[[0, j]] = Cell::single(op, (0, j - 1), score);
    }

    for i in 1..rows {
        for j in 1..cols {
            let ctx = CostContext::new(&source, &target, i, j);
            let candidates = [
                (Operation::Delete(source[i].clone()), (i - 1, j)),
                (Operation::Insert(target[j].clone()), (i, j - 1)),
                (Operation::diagonal(&source[i], &target[j]), (i - 1, j - 1)),
            ];

            let mut scored = Vec::with_capacity(candidates.len());
            for (op, from) in candidates {
                let score = cells[[from.0, from.1]].score() + step_cost(cost, &op, &ctx)?;
                scored.push((score, Move { op, from }));
            }

            let best = scored
                .iter()
                .map(|(score, _)| OrderedFloat(*score))
                .min()
                .map(|s| s.0)
                .unwrap_or(f64::INFINITY);
            let moves: Vec<Move> = scored
                .into_iter()
                .filter(|(score, _)| *score == best || (*score - best).abs() <= tie_epsilon)
                .map(|(_, mv)| mv)
                .collect();

            cells[[i, j]] = Cell {
                score: OrderedFloat(best),
                moves,
            };
        }
    }

    let matrix = Matrix {
        cells,
        source,
        target,
    };
    debug!(
        "aligned {} x {} symbols, minimum score {:.3}",
        matrix.source_len(),
        matrix.target_len(),
        matrix.minimum_score()
    );
    Ok(matrix)
}
