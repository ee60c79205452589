//! Cost models for weighted edit alignment.
//!
//! A cost model prices a single edit: a substitution (`d_in` and `d_out`
//! both present and different), a deletion (`d_out` empty) or an insertion
//! (`d_in` empty). Identity moves and moves touching the sentinels never
//! reach the model; see [`step_cost`].

use std::fs;
use std::path::{Path, PathBuf};

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{AlignError, ConfigError, Result};
use crate::phonetic::Inventory;
use crate::types::{is_sentinel, Operation, Symbol, EMPTY};

/// Neighbourhood of the matrix cell being priced.
///
/// `source` and `target` are the sentinel-padded sequences; `row`/`col` is
/// the cell the move lands in, so `source[row]` is the symbol consumed by a
/// deletion or substitution and `target[col]` the one produced by an
/// insertion or substitution.
#[derive(Debug, Clone, Copy)]
pub struct CostContext<'a> {
    source: &'a [Symbol],
    target: &'a [Symbol],
    row: usize,
    col: usize,
}

impl<'a> CostContext<'a> {
    pub fn new(source: &'a [Symbol], target: &'a [Symbol], row: usize, col: usize) -> Self {
        Self {
            source,
            target,
            row,
            col,
        }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    /// Source symbol preceding the one at `row`, if it is a real symbol
    pub fn prev_in(&self) -> Option<&'a str> {
        self.real_symbol(self.source, self.row.checked_sub(1)?)
    }

    /// Target symbol preceding the one at `col`, if it is a real symbol
    pub fn prev_out(&self) -> Option<&'a str> {
        self.real_symbol(self.target, self.col.checked_sub(1)?)
    }

    pub fn next_in(&self) -> Option<&'a str> {
        self.real_symbol(self.source, self.row + 1)
    }

    pub fn next_out(&self) -> Option<&'a str> {
        self.real_symbol(self.target, self.col + 1)
    }

    fn real_symbol(&self, seq: &'a [Symbol], idx: usize) -> Option<&'a str> {
        seq.get(idx)
            .map(String::as_str)
            .filter(|s| !is_sentinel(s))
    }
}

/// Prices a single edit. Must be a pure function of its arguments.
pub trait CostModel: Sync {
    fn cost(&self, d_in: &str, d_out: &str, ctx: &CostContext<'_>) -> Result<f64>;
}

impl<F> CostModel for F
where
    F: Fn(&str, &str) -> f64 + Sync,
{
    fn cost(&self, d_in: &str, d_out: &str, _ctx: &CostContext<'_>) -> Result<f64> {
        Ok(self(d_in, d_out))
    }
}

/// Cost of applying `op` at the cell described by `ctx`.
///
/// Sentinels only align with themselves (any other move involving them is
/// infinitely expensive) and identity is free. Everything else is delegated
/// to `model`; negative, infinite or NaN results are rejected.
pub fn step_cost<C: CostModel + ?Sized>(
    model: &C,
    op: &Operation,
    ctx: &CostContext<'_>,
) -> Result<f64> {
    let (d_in, d_out) = (op.d_in(), op.d_out());
    if is_sentinel(d_in) || is_sentinel(d_out) {
        return Ok(if d_in == d_out { 0.0 } else { f64::INFINITY });
    }
    if op.is_nop() {
        return Ok(0.0);
    }
    let cost = model.cost(d_in, d_out, ctx)?;
    if !cost.is_finite() || cost < 0.0 {
        return Err(AlignError::InvalidCost {
            d_in: d_in.to_string(),
            d_out: d_out.to_string(),
            cost,
        });
    }
    Ok(cost)
}

// ============================================================================
// UNIFORM
// ============================================================================

/// Every change costs the same
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformCost {
    pub change: f64,
}

impl Default for UniformCost {
    fn default() -> Self {
        Self { change: 1.0 }
    }
}

impl CostModel for UniformCost {
    fn cost(&self, d_in: &str, d_out: &str, _ctx: &CostContext<'_>) -> Result<f64> {
        Ok(if d_in == d_out { 0.0 } else { self.change })
    }
}

// ============================================================================
// PAIR TABLE
// ============================================================================

/// Explicit `(d_in, d_out) -> cost` table.
///
/// Lookups fall back to the reversed pair when `symmetric` is set, then to
/// `default`. With no default the table is strict and a missing pair is an
/// error.
#[derive(Debug, Clone, Default)]
pub struct PairTableCost {
    /// `d_in -> d_out -> cost`, nested so lookups borrow both symbols
    table: AHashMap<Symbol, AHashMap<Symbol, f64>>,
    symmetric: bool,
    default: Option<f64>,
}

impl PairTableCost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn symmetric(mut self, symmetric: bool) -> Self {
        self.symmetric = symmetric;
        self
    }

    pub fn with_default(mut self, default: f64) -> Self {
        self.default = Some(default);
        self
    }

    pub fn insert(&mut self, d_in: &str, d_out: &str, cost: f64) {
        self.table
            .entry(d_in.to_string())
            .or_default()
            .insert(d_out.to_string(), cost);
    }

    /// Number of `(d_in, d_out)` entries
    pub fn len(&self) -> usize {
        self.table.values().map(|row| row.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Parse `in<TAB>out<TAB>cost` lines. Blank lines and `#` comments are
    /// skipped; an empty field or `∅` stands for an absent symbol.
    pub fn from_delimited(text: &str) -> std::result::Result<Self, ConfigError> {
        let mut table = Self::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim_end_matches('\r');
            if line.trim().is_empty() || line.trim_start().starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() != 3 {
                return Err(ConfigError::Table {
                    line: idx + 1,
                    reason: format!("expected 3 tab-separated fields, found {}", fields.len()),
                });
            }
            let cost: f64 = fields[2].trim().parse().map_err(|_| ConfigError::Table {
                line: idx + 1,
                reason: format!("invalid cost {:?}", fields[2]),
            })?;
            if !cost.is_finite() || cost < 0.0 {
                return Err(ConfigError::Table {
                    line: idx + 1,
                    reason: format!("cost must be finite and non-negative, got {cost}"),
                });
            }
            table.insert(Self::field(fields[0]), Self::field(fields[1]), cost);
        }
        Ok(table)
    }

    pub fn from_path(path: impl AsRef<Path>) -> std::result::Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_delimited(&text)
    }

    fn field(raw: &str) -> &str {
        let field = raw.trim();
        if field == EMPTY {
            ""
        } else {
            field
        }
    }

    fn get(&self, d_in: &str, d_out: &str) -> Option<f64> {
        self.table.get(d_in)?.get(d_out).copied()
    }

    fn lookup(&self, d_in: &str, d_out: &str) -> Option<f64> {
        self.get(d_in, d_out).or_else(|| {
            if self.symmetric {
                self.get(d_out, d_in)
            } else {
                None
            }
        })
    }
}

impl CostModel for PairTableCost {
    fn cost(&self, d_in: &str, d_out: &str, _ctx: &CostContext<'_>) -> Result<f64> {
        self.lookup(d_in, d_out)
            .or(self.default)
            .ok_or_else(|| AlignError::MissingCost {
                d_in: d_in.to_string(),
                d_out: d_out.to_string(),
            })
    }
}

// ============================================================================
// MORPHOPHONEMIC
// ============================================================================

/// Domain model for derivational alternations.
///
/// Listed mutation pairs are cheap in either direction, turning a vowel
/// into a consonant (or back) is expensive, and boundary markers may not be
/// rewritten into ordinary content.
#[derive(Debug, Clone)]
pub struct MorphophonemicCost {
    vocalic: AHashSet<String>,
    /// Natural alternations, `a -> {b, ...}` as listed
    pairs: AHashMap<Symbol, AHashSet<Symbol>>,
    morpheme_marker: String,
    syllable_marker: String,
    pub forbidden: f64,
    pub class_change: f64,
    pub natural: f64,
    pub consonant_change: f64,
    pub other: f64,
}

impl MorphophonemicCost {
    /// Consonant mutations and vowel reductions that derivation triggers
    pub const MUTATIONS: [(&'static str, &'static str); 7] = [
        ("t", "ț"),
        ("s", "ș"),
        ("d", "z"),
        ("g", "j"),
        ("c", "č"),
        ("g", "ǧ"),
        ("a", "ă"),
    ];

    pub fn new(inventory: &Inventory) -> Self {
        let mut model = Self {
            vocalic: inventory.vocalic().collect(),
            pairs: AHashMap::new(),
            morpheme_marker: "+".to_string(),
            syllable_marker: "-".to_string(),
            forbidden: 10.0,
            class_change: 1.5,
            natural: 0.9,
            consonant_change: 1.1,
            other: 1.0,
        };
        for (a, b) in Self::MUTATIONS {
            model.add_pair(a, b);
        }
        for (vowel, glide) in inventory.glides() {
            model.add_pair(vowel, glide);
        }
        model
    }

    pub fn add_pair(&mut self, a: &str, b: &str) {
        self.pairs
            .entry(a.to_string())
            .or_default()
            .insert(b.to_string());
    }

    fn has_pair(&self, a: &str, b: &str) -> bool {
        self.pairs.get(a).map_or(false, |outputs| outputs.contains(b))
    }

    fn is_vocalic(&self, symbol: &str) -> bool {
        self.vocalic.contains(symbol)
    }

    fn is_natural(&self, d_in: &str, d_out: &str) -> bool {
        self.has_pair(d_in, d_out) || self.has_pair(d_out, d_in)
    }

    fn price(&self, d_in: &str, d_out: &str) -> f64 {
        if d_in == self.morpheme_marker && !d_out.is_empty() {
            return self.forbidden;
        }
        let sep = self.syllable_marker.as_str();
        if (d_in == sep && !d_out.is_empty() && d_out != sep)
            || (d_out == sep && !d_in.is_empty() && d_in != sep)
        {
            return self.forbidden;
        }
        if !d_in.is_empty() && !d_out.is_empty() && self.is_vocalic(d_in) != self.is_vocalic(d_out)
        {
            return self.class_change;
        }
        if self.is_natural(d_in, d_out) {
            return self.natural;
        }
        if !self.is_vocalic(d_in) && !self.is_vocalic(d_out) {
            return self.consonant_change;
        }
        self.other
    }
}

impl Default for MorphophonemicCost {
    fn default() -> Self {
        Self::new(&Inventory::romanian())
    }
}

impl CostModel for MorphophonemicCost {
    fn cost(&self, d_in: &str, d_out: &str, _ctx: &CostContext<'_>) -> Result<f64> {
        Ok(self.price(d_in, d_out))
    }
}

// ============================================================================
// CONTEXTUAL
// ============================================================================

/// Context-sensitive wrapper making hiatus reductions cheap.
///
/// `oa -> o` and `ea -> e` (dropping or adding `a` right after `o`/`e`) and
/// `ia -> ie` cost `reduction`; every other move is priced by `inner`.
#[derive(Debug, Clone)]
pub struct HiatusCost<C> {
    inner: C,
    pub reduction: f64,
}

impl<C: CostModel> HiatusCost<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            reduction: 0.1,
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C: CostModel> CostModel for HiatusCost<C> {
    fn cost(&self, d_in: &str, d_out: &str, ctx: &CostContext<'_>) -> Result<f64> {
        let after_mid_vowel = |prev: Option<&str>| matches!(prev, Some("o") | Some("e"));
        let reduced = match (d_in, d_out) {
            ("a", "") => after_mid_vowel(ctx.prev_in()),
            ("", "a") => after_mid_vowel(ctx.prev_out()),
            ("a", "e") => ctx.prev_in() == Some("i"),
            _ => false,
        };
        if reduced {
            Ok(self.reduction)
        } else {
            self.inner.cost(d_in, d_out, ctx)
        }
    }
}

// ============================================================================
// CONFIGURABLE
// ============================================================================

/// Serializable choice of a built-in cost model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum CostSpec {
    Uniform {
        #[serde(default = "default_change_cost")]
        change: f64,
    },
    Morphophonemic,
    Hiatus,
    Table {
        path: PathBuf,
        #[serde(default)]
        symmetric: bool,
        #[serde(default)]
        default: Option<f64>,
    },
}

fn default_change_cost() -> f64 {
    1.0
}

impl Default for CostSpec {
    fn default() -> Self {
        CostSpec::Uniform {
            change: default_change_cost(),
        }
    }
}

impl CostSpec {
    pub fn build(&self) -> std::result::Result<BuiltinCost, ConfigError> {
        Ok(match self {
            CostSpec::Uniform { change } => BuiltinCost::Uniform(UniformCost { change: *change }),
            CostSpec::Morphophonemic => BuiltinCost::Morphophonemic(MorphophonemicCost::default()),
            CostSpec::Hiatus => BuiltinCost::Hiatus(HiatusCost::new(MorphophonemicCost::default())),
            CostSpec::Table {
                path,
                symmetric,
                default,
            } => {
                let mut table = PairTableCost::from_path(path)?.symmetric(*symmetric);
                table.default = *default;
                BuiltinCost::Table(table)
            }
        })
    }
}

/// Any of the built-in cost models
#[derive(Debug, Clone)]
pub enum BuiltinCost {
    Uniform(UniformCost),
    Morphophonemic(MorphophonemicCost),
    Hiatus(HiatusCost<MorphophonemicCost>),
    Table(PairTableCost),
}

impl Default for BuiltinCost {
    fn default() -> Self {
        BuiltinCost::Uniform(UniformCost::default())
    }
}

impl CostModel for BuiltinCost {
    fn cost(&self, d_in: &str, d_out: &str, ctx: &CostContext<'_>) -> Result<f64> {
        match self {
            BuiltinCost::Uniform(m) => m.cost(d_in, d_out, ctx),
            BuiltinCost::Morphophonemic(m) => m.cost(d_in, d_out, ctx),
            BuiltinCost::Hiatus(m) => m.cost(d_in, d_out, ctx),
            BuiltinCost::Table(m) => m.cost(d_in, d_out, ctx),
        }
    }
}
