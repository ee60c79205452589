//! Symbol inventory, segmentation and score-only weighted distance.

use ahash::AHashSet;
use rayon::prelude::*;
use unicode_segmentation::UnicodeSegmentation;

use crate::cost::{step_cost, CostContext, CostModel};
use crate::error::Result;
use crate::matrix::{pad, validate_sequence};
use crate::types::{Operation, Symbol};

/// Vowels and their glide (semivowel) forms
#[derive(Debug, Clone, PartialEq)]
pub struct Inventory {
    vowels: Vec<Symbol>,
    glides: Vec<(Symbol, Symbol)>,
}

impl Inventory {
    pub fn new(vowels: Vec<Symbol>, glides: Vec<(Symbol, Symbol)>) -> Self {
        Self { vowels, glides }
    }

    /// Romanian vowels with non-syllabic e̯ i̯ o̯ u̯
    pub fn romanian() -> Self {
        let vowels = ["a", "e", "i", "o", "u", "ă", "î"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let glides = [("e", "e̯"), ("i", "i̯"), ("o", "o̯"), ("u", "u̯")]
            .iter()
            .map(|(v, g)| (v.to_string(), g.to_string()))
            .collect();
        Self::new(vowels, glides)
    }

    pub fn vowels(&self) -> &[Symbol] {
        &self.vowels
    }

    /// `(vowel, glide)` pairs
    pub fn glides(&self) -> impl Iterator<Item = (&Symbol, &Symbol)> {
        self.glides.iter().map(|(v, g)| (v, g))
    }

    /// Vowels followed by glide forms
    pub fn vocalic(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.vowels
            .iter()
            .cloned()
            .chain(self.glides.iter().map(|(_, g)| g.clone()))
    }

    pub fn vocalic_set(&self) -> AHashSet<Symbol> {
        self.vocalic().collect()
    }

    pub fn is_vocalic(&self, symbol: &str) -> bool {
        self.vowels.iter().any(|v| v == symbol) || self.glides.iter().any(|(_, g)| g == symbol)
    }
}

impl Default for Inventory {
    fn default() -> Self {
        Self::romanian()
    }
}

/// Split a phonemic string into symbols by extended grapheme cluster,
/// so combining marks (`i̯`) stay attached. Whitespace is dropped.
pub fn segment(text: &str) -> Vec<Symbol> {
    text.graphemes(true)
        .filter(|g| !g.trim().is_empty())
        .map(|g| g.to_string())
        .collect()
}

/// Split pre-tokenized text on `sep`, dropping empty tokens
pub fn split_symbols(text: &str, sep: char) -> Vec<Symbol> {
    text.split(sep)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Minimum alignment cost using two rows and no tie bookkeeping.
///
/// Runs over the same padded sequences and priced moves as
/// [`compute_alignment`](crate::matrix::compute_alignment), so the result
/// equals that matrix's minimum score.
pub fn weighted_distance<S1, S2, C>(seq1: &[S1], seq2: &[S2], cost: &C) -> Result<f64>
where
    S1: AsRef<str>,
    S2: AsRef<str>,
    C: CostModel + ?Sized,
{
    validate_sequence(seq1, "source")?;
    validate_sequence(seq2, "target")?;
    let source = pad(seq1);
    let target = pad(seq2);
    let cols = target.len();

    let mut prev_row = vec![0.0; cols];
    for j in 1..cols {
        let ctx = CostContext::new(&source, &target, 0, j);
        let op = Operation::Insert(target[j].clone());
        prev_row[j] = prev_row[j - 1] + step_cost(cost, &op, &ctx)?;
    }
    let mut curr_row = vec![0.0; cols];

    for i in 1..source.len() {
        let ctx = CostContext::new(&source, &target, i, 0);
        curr_row[0] = prev_row[0] + step_cost(cost, &Operation::Delete(source[i].clone()), &ctx)?;

        for j in 1..cols {
            let ctx = CostContext::new(&source, &target, i, j);
            let deletion =
                prev_row[j] + step_cost(cost, &Operation::Delete(source[i].clone()), &ctx)?;
            let insertion =
                curr_row[j - 1] + step_cost(cost, &Operation::Insert(target[j].clone()), &ctx)?;
            let substitution = prev_row[j - 1]
                + step_cost(cost, &Operation::diagonal(&source[i], &target[j]), &ctx)?;
            curr_row[j] = deletion.min(insertion).min(substitution);
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    Ok(prev_row[cols - 1])
}

/// Batch weighted distances for many pairs (parallelized)
pub fn batch_weighted_distance<C: CostModel>(
    pairs: &[(Vec<Symbol>, Vec<Symbol>)],
    cost: &C,
) -> Vec<Result<f64>> {
    pairs
        .par_iter()
        .map(|(a, b)| weighted_distance(a, b, cost))
        .collect()
}
