//! Property-based tests for the alignment pipeline.
//!
//! 1. **Identity**: a word aligns to itself at cost 0 along a single path
//! 2. **Symmetry**: with a symmetric cost model d(x, y) = d(y, x)
//! 3. **Insertion bound**: dropping one target symbol lowers the cost by at
//!    most the price of inserting it
//! 4. **Agreement**: the two-row distance equals the matrix minimum
//! 5. **Idempotence**: canonicalizing a canonical sequence changes nothing
//! 6. **Partition**: the three boundary buckets hold exactly the edits

use derivalign_core::*;
use proptest::prelude::*;

const ALPHABET: [&str; 8] = ["a", "e", "i", "o", "t", "s", "ă", "č"];

fn arb_word() -> impl Strategy<Value = Vec<Symbol>> {
    prop::collection::vec(prop::sample::select(ALPHABET.to_vec()), 1..6)
        .prop_map(|word| word.into_iter().map(str::to_string).collect())
}

fn minimal_paths(
    a: &[Symbol],
    b: &[Symbol],
    cost: &impl CostModel,
) -> Option<(Matrix, Vec<ChangeSequence>)> {
    let matrix = compute_alignment(a, b, cost).ok()?;
    match enumerate_minimal_paths(&matrix) {
        Ok(paths) => Some((matrix, paths)),
        Err(AlignError::PathExplosion { .. }) => None,
        Err(err) => panic!("unexpected enumeration error: {err}"),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn identity_has_single_free_path(a in arb_word()) {
        let (matrix, paths) = minimal_paths(&a, &a, &UniformCost::default()).unwrap();
        prop_assert_eq!(matrix.minimum_score(), 0.0);
        prop_assert_eq!(paths.len(), 1);
        prop_assert_eq!(paths[0].edit_count(), 0);
    }

    #[test]
    fn uniform_score_symmetric(a in arb_word(), b in arb_word()) {
        let cost = UniformCost::default();
        let d_ab = compute_alignment(&a, &b, &cost).unwrap().minimum_score();
        let d_ba = compute_alignment(&b, &a, &cost).unwrap().minimum_score();
        prop_assert_eq!(d_ab, d_ba);
    }

    #[test]
    fn morphophonemic_score_symmetric(a in arb_word(), b in arb_word()) {
        let cost = MorphophonemicCost::default();
        let d_ab = compute_alignment(&a, &b, &cost).unwrap().minimum_score();
        let d_ba = compute_alignment(&b, &a, &cost).unwrap().minimum_score();
        prop_assert!((d_ab - d_ba).abs() < 1e-9, "d(a,b) = {} but d(b,a) = {}", d_ab, d_ba);
    }

    #[test]
    fn dropping_target_symbol_bounded_by_insertion(
        a in arb_word(),
        b in arb_word(),
        idx in 0usize..6,
    ) {
        prop_assume!(b.len() >= 2);
        let cost = UniformCost::default();
        let mut shorter = b.clone();
        shorter.remove(idx % b.len());

        let full = compute_alignment(&a, &b, &cost).unwrap().minimum_score();
        let reduced = compute_alignment(&a, &shorter, &cost).unwrap().minimum_score();
        prop_assert!(full <= reduced + cost.change + 1e-9);
    }

    #[test]
    fn distance_agrees_with_matrix(a in arb_word(), b in arb_word()) {
        let cost = MorphophonemicCost::default();
        let matrix = compute_alignment(&a, &b, &cost).unwrap();
        let distance = weighted_distance(&a, &b, &cost).unwrap();
        prop_assert!((distance - matrix.minimum_score()).abs() < 1e-12);
    }

    #[test]
    fn path_count_matches_tie_graph(a in arb_word(), b in arb_word()) {
        let cost = UniformCost::default();
        if let Some((matrix, paths)) = minimal_paths(&a, &b, &cost) {
            prop_assert_eq!(TieGraph::from_matrix(&matrix).path_count(), paths.len() as u64);
        }
    }

    #[test]
    fn canonicalize_idempotent(a in arb_word(), b in arb_word()) {
        let canonicalizer = Canonicalizer::default();
        if let Some((_, paths)) = minimal_paths(&a, &b, &UniformCost::default()) {
            for path in &paths {
                let once = canonicalizer.canonicalize(path);
                let twice = canonicalizer.canonicalize(&once);
                prop_assert_eq!(once, twice);
            }
        }
    }

    #[test]
    fn classification_partitions_edits(
        a in arb_word(),
        b in arb_word(),
        pick in 0usize..7,
    ) {
        let boundary = (pick % (a.len() + 1)) as isize - 1;
        if let Some((_, paths)) = minimal_paths(&a, &b, &MorphophonemicCost::default()) {
            let canonical = Canonicalizer::default().select(&paths).unwrap();
            let edits = classify(&canonical, boundary).unwrap();

            let bucketed: Vec<Transition> = edits.iter().cloned().collect();
            let expected: Vec<Transition> = canonical.edits().cloned().collect();
            prop_assert_eq!(bucketed, expected);
        }
    }
}
