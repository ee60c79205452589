//! Benchmarks for matrix construction, path enumeration and batch runs.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use derivalign_core::{
    compute_alignment, segment, weighted_distance, AlignmentRequest, Engine, MorphophonemicCost,
    PathEnumerator, Symbol,
};

const PAIRS: [(&str, &str, isize); 6] = [
    ("kasa", "kăsuț", 3),
    ("pom", "pomuț", 2),
    ("fată", "fetiț", 2),
    ("ǧeantă", "ǧentuț", 4),
    ("floare", "floricel", 4),
    ("kopak", "kopăčel", 4),
];

fn requests() -> Vec<AlignmentRequest> {
    PAIRS
        .iter()
        .map(|(source, target, boundary)| AlignmentRequest {
            source: segment(source),
            target: segment(target),
            boundary: *boundary,
        })
        .collect()
}

// Word of `len` symbols cycling through a small inventory
fn synthetic_word(len: usize, offset: usize) -> Vec<Symbol> {
    const SYMBOLS: [&str; 6] = ["a", "t", "e", "s", "ă", "r"];
    (0..len)
        .map(|i| SYMBOLS[(i + offset) % SYMBOLS.len()].to_string())
        .collect()
}

fn bench_matrix(c: &mut Criterion) {
    let mut group = c.benchmark_group("matrix");
    let cost = MorphophonemicCost::default();

    for len in [4, 8, 16, 32] {
        let a = synthetic_word(len, 0);
        let b = synthetic_word(len + 2, 1);
        group.throughput(Throughput::Elements((len * (len + 2)) as u64));

        group.bench_with_input(BenchmarkId::new("compute_alignment", len), &len, |bench, _| {
            bench.iter(|| compute_alignment(black_box(&a), black_box(&b), &cost))
        });
        group.bench_with_input(BenchmarkId::new("weighted_distance", len), &len, |bench, _| {
            bench.iter(|| weighted_distance(black_box(&a), black_box(&b), &cost))
        });
    }

    group.finish();
}

fn bench_enumeration(c: &mut Criterion) {
    let mut group = c.benchmark_group("enumeration");
    let cost = MorphophonemicCost::default();

    for (source, target, _) in PAIRS {
        let matrix = match compute_alignment(&segment(source), &segment(target), &cost) {
            Ok(matrix) => matrix,
            Err(_) => continue,
        };
        for (label, enumerator) in [
            ("strict", PathEnumerator::new()),
            ("memoized", PathEnumerator::new().memoize(true)),
        ] {
            group.bench_with_input(BenchmarkId::new(label, source), &matrix, |bench, m| {
                bench.iter(|| enumerator.enumerate(black_box(m)))
            });
        }
    }

    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch");
    let engine = Engine::new(MorphophonemicCost::default());
    let batch: Vec<AlignmentRequest> = requests().into_iter().cycle().take(600).collect();
    group.throughput(Throughput::Elements(batch.len() as u64));

    group.bench_function("sequential", |bench| {
        bench.iter(|| {
            batch
                .iter()
                .map(|req| engine.classify(&req.source, &req.target, req.boundary))
                .collect::<Vec<_>>()
        })
    });
    group.bench_function("align_batch", |bench| {
        bench.iter(|| engine.align_batch(black_box(&batch)))
    });

    group.finish();
}

criterion_group!(benches, bench_matrix, bench_enumeration, bench_batch);
criterion_main!(benches);
