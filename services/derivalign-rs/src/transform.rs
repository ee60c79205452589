//! End-to-end pipeline: matrix, enumeration, canonicalization and boundary
//! classification for one word pair or a batch of them.

use log::{debug, warn};
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::canonical::Canonicalizer;
use crate::classify::{classify, validate_boundary};
use crate::config::EngineConfig;
use crate::cost::{BuiltinCost, CostModel};
use crate::enumerate::PathEnumerator;
use crate::error::{AlignError, ConfigError, Result};
use crate::matrix::compute_alignment_with;
use crate::phonetic::{weighted_distance, Inventory};
use crate::types::{ChangeSequence, ClassifiedEdits, Symbol};

/// Representative transformation of one word into another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTransformation {
    pub initial: Vec<Symbol>,
    pub target: Vec<Symbol>,
    /// Minimum alignment cost
    pub score: f64,
    /// Number of minimal paths considered
    pub path_count: usize,
    /// Most compact canonical sequence, unchanged steps dropped
    pub canonical: ChangeSequence,
}

impl WordTransformation {
    pub fn classify(&self, boundary: isize) -> Result<ClassifiedEdits> {
        classify(&self.canonical, boundary)
    }
}

/// One item of a batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentRequest {
    pub source: Vec<Symbol>,
    pub target: Vec<Symbol>,
    pub boundary: isize,
}

/// Pipeline bound to a cost model and configuration.
///
/// Holds no per-call state, so one engine can serve many threads.
pub struct Engine<C> {
    cost: C,
    config: EngineConfig,
    canonicalizer: Canonicalizer,
    enumerator: PathEnumerator,
}

impl Engine<BuiltinCost> {
    /// Engine using the cost model named in `config`
    pub fn from_config(config: EngineConfig) -> std::result::Result<Self, ConfigError> {
        let cost = config.cost.build()?;
        Ok(Self::with_config(cost, config))
    }
}

impl<C: CostModel> Engine<C> {
    pub fn new(cost: C) -> Self {
        Self::with_config(cost, EngineConfig::default())
    }

    pub fn with_config(cost: C, config: EngineConfig) -> Self {
        let canonicalizer = Canonicalizer::from_config(&config.grouping);
        let enumerator = config.enumerator();
        Self {
            cost,
            config,
            canonicalizer,
            enumerator,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cost_model(&self) -> &C {
        &self.cost
    }

    pub fn canonicalizer(&self) -> &Canonicalizer {
        &self.canonicalizer
    }

    /// Align `initial` to `target` and pick the most compact explanation
    pub fn transform<S1, S2>(&self, initial: &[S1], target: &[S2]) -> Result<WordTransformation>
    where
        S1: AsRef<str>,
        S2: AsRef<str>,
    {
        let matrix = compute_alignment_with(initial, target, &self.cost, self.config.tie_epsilon)?;
        let paths = self.enumerator.enumerate(&matrix)?;
        let canonical = self.canonicalizer.select(&paths)?;
        debug!(
            "{} minimal paths, chosen sequence {}",
            paths.len(),
            canonical
        );
        Ok(WordTransformation {
            initial: initial.iter().map(|s| s.as_ref().to_string()).collect(),
            target: target.iter().map(|s| s.as_ref().to_string()).collect(),
            score: matrix.minimum_score(),
            path_count: paths.len(),
            canonical,
        })
    }

    /// Transform and split the edits around `boundary`
    pub fn classify<S1, S2>(
        &self,
        initial: &[S1],
        target: &[S2],
        boundary: isize,
    ) -> Result<ClassifiedEdits>
    where
        S1: AsRef<str>,
        S2: AsRef<str>,
    {
        validate_boundary(boundary, initial.len())?;
        self.transform(initial, target)?.classify(boundary)
    }

    /// Classify many independent pairs in parallel. A failing pair is
    /// reported in its slot and does not stop the others.
    pub fn align_batch(&self, requests: &[AlignmentRequest]) -> Vec<Result<ClassifiedEdits>> {
        requests
            .par_iter()
            .map(|req| {
                let result = self.classify(&req.source, &req.target, req.boundary);
                if let Err(err) = &result {
                    warn!(
                        "{} -> {}: {err}",
                        req.source.join(""),
                        req.target.join("")
                    );
                }
                result
            })
            .collect()
    }

    /// Run the base/derived comparison described by `pair`
    pub fn analyze_derivation(&self, pair: &DerivationPair) -> Result<DerivationRecord> {
        if !pair.derived.ends_with(&pair.suffix) {
            warn!(
                "{} does not end with suffix {}",
                pair.derived.join(""),
                pair.suffix.join("")
            );
        }
        if pair.suffix.len() >= pair.derived.len() {
            return Err(AlignError::InvalidInput(format!(
                "suffix of {} symbols leaves no derived stem",
                pair.suffix.len()
            )));
        }
        let derived_stem = &pair.derived[..pair.derived.len() - pair.suffix.len()];
        let (base_stem, dropped) = truncate_affix(&pair.base, &pair.affixes);
        if base_stem.is_empty() {
            return Err(AlignError::InvalidInput(
                "affix removal leaves no base stem".to_string(),
            ));
        }

        let boundary = base_stem.len() as isize - 1;
        let transformation = self.transform(base_stem, derived_stem)?;
        let edits = transformation.classify(boundary)?;
        Ok(DerivationRecord {
            base: pair.base.clone(),
            derived: pair.derived.clone(),
            base_stem: base_stem.to_vec(),
            derived_stem: derived_stem.to_vec(),
            dropped,
            score: transformation.score,
            edits,
        })
    }

    /// Rank `candidates` as possible bases of `derived`.
    ///
    /// The stem left after removing `suffix` is compared with each
    /// candidate minus one final vowel, cheapest first. With `keep_ties`
    /// only the candidates sharing the lowest distance are returned.
    /// Candidates reduced to nothing are skipped.
    pub fn guess_base(
        &self,
        derived: &[Symbol],
        suffix: &[Symbol],
        candidates: &[Vec<Symbol>],
        inventory: &Inventory,
        keep_ties: bool,
    ) -> Result<Vec<BaseCandidate>> {
        if !derived.ends_with(suffix) {
            return Err(AlignError::InvalidInput(format!(
                "{} does not end with suffix {}",
                derived.join(""),
                suffix.join("")
            )));
        }
        let root = &derived[..derived.len() - suffix.len()];

        let mut ranked = candidates
            .par_iter()
            .filter_map(|base| {
                let stem = strip_final_vowel(base, inventory);
                if stem.is_empty() {
                    debug!("skipping candidate {} with empty stem", base.join(""));
                    return None;
                }
                Some(
                    weighted_distance(root, stem, &self.cost).map(|distance| BaseCandidate {
                        base: base.clone(),
                        stem: stem.to_vec(),
                        distance,
                    }),
                )
            })
            .collect::<Result<Vec<_>>>()?;
        ranked.sort_by_key(|c| OrderedFloat(c.distance));

        if keep_ties {
            if let Some(best) = ranked.first().map(|c| c.distance) {
                let epsilon = self.config.tie_epsilon;
                ranked.retain(|c| c.distance - best <= epsilon);
            }
        }
        Ok(ranked)
    }
}

/// A possible base word for a derivative, scored against its stem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseCandidate {
    pub base: Vec<Symbol>,
    /// `base` with at most one final vowel removed
    pub stem: Vec<Symbol>,
    pub distance: f64,
}

/// Drop one final vowel of `word`, if it ends in one
pub fn strip_final_vowel<'a>(word: &'a [Symbol], inventory: &Inventory) -> &'a [Symbol] {
    match word.split_last() {
        Some((last, rest)) if inventory.vowels().contains(last) => rest,
        _ => word,
    }
}

/// Strip the longest affix in `affixes` that ends `word`.
///
/// Returns the remaining stem and the removed symbols (empty if none
/// matched).
pub fn truncate_affix<'a>(word: &'a [Symbol], affixes: &[Vec<Symbol>]) -> (&'a [Symbol], Vec<Symbol>) {
    let mut ordered: Vec<&Vec<Symbol>> = affixes.iter().filter(|a| !a.is_empty()).collect();
    ordered.sort_by_key(|a| std::cmp::Reverse(a.len()));
    for affix in ordered {
        if word.ends_with(affix) {
            let stem = &word[..word.len() - affix.len()];
            return (stem, affix.clone());
        }
    }
    (word, Vec::new())
}

/// Romanian final inflection endings stripped from base nouns
pub fn romanian_final_affixes() -> Vec<Vec<Symbol>> {
    [
        vec!["e"],
        vec!["ă"],
        vec!["u"],
        vec!["u̯"],
        vec!["i", "u̯"],
        vec!["i̯", "e"],
    ]
    .into_iter()
    .map(|affix| affix.into_iter().map(str::to_string).collect())
    .collect()
}

/// A base word and a word derived from it by suffixation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivationPair {
    pub base: Vec<Symbol>,
    pub derived: Vec<Symbol>,
    /// Derivational suffix closing `derived`
    pub suffix: Vec<Symbol>,
    /// Inflectional endings that may close `base`
    #[serde(default = "romanian_final_affixes")]
    pub affixes: Vec<Vec<Symbol>>,
}

/// Outcome of [`Engine::analyze_derivation`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivationRecord {
    pub base: Vec<Symbol>,
    pub derived: Vec<Symbol>,
    pub base_stem: Vec<Symbol>,
    pub derived_stem: Vec<Symbol>,
    pub dropped: Vec<Symbol>,
    pub score: f64,
    pub edits: ClassifiedEdits,
}

impl DerivationRecord {
    /// base, derived, stems, dropped ending, then before/at/after edits
    pub fn to_tsv_row(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            self.base.join(""),
            self.derived.join(""),
            self.base_stem.join(""),
            self.derived_stem.join(""),
            self.dropped.join(""),
            self.edits
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::{MorphophonemicCost, UniformCost};
    use crate::phonetic::segment;

    fn symbols(text: &str) -> Vec<Symbol> {
        segment(text)
    }

    #[test]
    fn test_truncate_affix_longest_first() {
        let word = symbols("fiu̯");
        let (stem, dropped) = truncate_affix(&word, &romanian_final_affixes());
        assert_eq!(stem, &symbols("f")[..]);
        assert_eq!(dropped, symbols("iu̯"));

        let word = symbols("pom");
        let (stem, dropped) = truncate_affix(&word, &romanian_final_affixes());
        assert_eq!(stem.len(), 3);
        assert!(dropped.is_empty());
    }

    #[test]
    fn test_transform_reports_score_and_paths() {
        let engine = Engine::new(UniformCost::default());
        let t = engine.transform(&symbols("kasa"), &symbols("kasa")).unwrap();
        assert_eq!(t.score, 0.0);
        assert_eq!(t.path_count, 1);
        assert!(t.canonical.is_empty());
    }

    #[test]
    fn test_classify_validates_boundary_first() {
        let engine = Engine::new(UniformCost::default());
        let err = engine.classify(&["a"], &["b"], 1).unwrap_err();
        assert_eq!(err, AlignError::InvalidBoundary { index: 1, len: 1 });
    }

    #[test]
    fn test_batch_keeps_failures_in_place() {
        let engine = Engine::new(UniformCost::default());
        let requests = vec![
            AlignmentRequest {
                source: symbols("pom"),
                target: symbols("pomuț"),
                boundary: 2,
            },
            AlignmentRequest {
                source: Vec::new(),
                target: symbols("a"),
                boundary: -1,
            },
        ];
        let results = engine.align_batch(&requests);
        assert_eq!(results.len(), 2);
        let first = results[0].as_ref().unwrap();
        assert_eq!(first.after.len(), 1);
        assert_eq!(first.after[0].d_out, "uț");
        assert!(results[1].is_err());
    }

    #[test]
    fn test_analyze_derivation() {
        let engine = Engine::new(MorphophonemicCost::default());
        let pair = DerivationPair {
            base: symbols("kasă"),
            derived: symbols("kăsuță"),
            suffix: symbols("ă"),
            affixes: romanian_final_affixes(),
        };
        let record = engine.analyze_derivation(&pair).unwrap();
        assert_eq!(record.base_stem, symbols("kas"));
        assert_eq!(record.derived_stem, symbols("kăsuț"));
        assert_eq!(record.dropped, symbols("ă"));
        assert_eq!(record.edits.before.len(), 1);
        assert_eq!(record.edits.before[0].to_string(), "a->ă");
        assert_eq!(record.edits.after[0].to_string(), "∅->uț");
        assert!(record.to_tsv_row().starts_with("kasă\tkăsuță\tkas\tkăsuț\tă\t"));
    }

    #[test]
    fn test_strip_final_vowel() {
        let inv = Inventory::romanian();
        assert_eq!(strip_final_vowel(&symbols("kasă"), &inv), &symbols("kas")[..]);
        assert_eq!(strip_final_vowel(&symbols("pom"), &inv), &symbols("pom")[..]);
        assert_eq!(strip_final_vowel(&symbols("fiu̯"), &inv), &symbols("fiu̯")[..]);
    }

    #[test]
    fn test_guess_base_ranks_candidates() {
        let engine = Engine::new(MorphophonemicCost::default());
        let inv = Inventory::romanian();
        let candidates = vec![symbols("masă"), symbols("kasă"), symbols("kos"), symbols("a")];
        let ranked = engine
            .guess_base(&symbols("kăsuță"), &symbols("uță"), &candidates, &inv, false)
            .unwrap();

        let bases: Vec<String> = ranked.iter().map(|c| c.base.join("")).collect();
        assert_eq!(bases, vec!["kasă", "kos", "masă"]);
        assert_eq!(ranked[0].stem, symbols("kas"));
        assert!((ranked[0].distance - 0.9).abs() < 1e-9);

        let best = engine
            .guess_base(&symbols("kăsuță"), &symbols("uță"), &candidates, &inv, true)
            .unwrap();
        assert_eq!(best.len(), 1);
        assert_eq!(best[0].base, symbols("kasă"));
    }

    #[test]
    fn test_guess_base_keeps_tied_candidates() {
        let engine = Engine::new(UniformCost::default());
        let inv = Inventory::romanian();
        let candidates = vec![symbols("pat"), symbols("pom"), symbols("pot")];
        let best = engine
            .guess_base(&symbols("potic"), &symbols("ic"), &candidates, &inv, true)
            .unwrap();
        assert_eq!(best.len(), 1);
        assert_eq!(best[0].base, symbols("pot"));

        let ranked = engine
            .guess_base(&symbols("pusic"), &symbols("ic"), &candidates, &inv, true)
            .unwrap();
        let bases: Vec<String> = ranked.iter().map(|c| c.base.join("")).collect();
        assert_eq!(bases, vec!["pat", "pom", "pot"]);
    }

    #[test]
    fn test_guess_base_requires_suffix() {
        let engine = Engine::new(UniformCost::default());
        let inv = Inventory::romanian();
        let err = engine
            .guess_base(&symbols("pomuț"), &symbols("ic"), &[symbols("pom")], &inv, true)
            .unwrap_err();
        assert!(matches!(err, AlignError::InvalidInput(_)));
    }

    #[test]
    fn test_analyze_derivation_rejects_empty_stem() {
        let engine = Engine::new(UniformCost::default());
        let pair = DerivationPair {
            base: symbols("e"),
            derived: symbols("ică"),
            suffix: symbols("ică"),
            affixes: romanian_final_affixes(),
        };
        assert!(matches!(
            engine.analyze_derivation(&pair),
            Err(AlignError::InvalidInput(_))
        ));
    }
}
