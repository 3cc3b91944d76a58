//! Benchmarks for the two similarity strategies.
//!
//! Run with: cargo bench --package models
//!
//! Compares the one-off cost of building the pruned structure against
//! the per-query cost of the on-demand scan, on a synthetic rating
//! matrix shaped like a small production working set.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dataset::SparseVector;
use models::{FullSimilarity, ItemSimilarityProvider, LiteSimilarity};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const N_ITEMS: usize = 800;
const N_USERS: usize = 2_000;
const RATINGS_PER_ITEM: usize = 40;
const TOP_K: usize = 50;

fn synthetic_columns() -> Vec<SparseVector> {
    let mut rng = StdRng::seed_from_u64(7);
    (0..N_ITEMS)
        .map(|_| {
            let entries = (0..RATINGS_PER_ITEM)
                .map(|_| {
                    let user = rng.random_range(0..N_USERS as u32);
                    let rating = rng.random_range(1..=10) as f32 * 0.5;
                    (user, rating)
                })
                .collect();
            SparseVector::from_entries(entries)
        })
        .collect()
}

fn bench_full_build(c: &mut Criterion) {
    let columns = synthetic_columns();

    c.bench_function("full_similarity_build", |b| {
        b.iter(|| {
            let full = FullSimilarity::build(black_box(&columns), black_box(TOP_K));
            black_box(full)
        })
    });
}

fn bench_full_query(c: &mut Criterion) {
    let columns = synthetic_columns();
    let full = FullSimilarity::build(&columns, TOP_K);

    c.bench_function("full_similarity_query", |b| {
        b.iter(|| {
            let neighbors = full.similar_items(black_box(3), black_box(10)).unwrap();
            black_box(neighbors)
        })
    });
}

fn bench_lite_query(c: &mut Criterion) {
    let columns = synthetic_columns();
    let lite = LiteSimilarity::new(&columns);

    c.bench_function("lite_similarity_query", |b| {
        b.iter(|| {
            let neighbors = lite.similar_items(black_box(3), black_box(10)).unwrap();
            black_box(neighbors)
        })
    });
}

criterion_group!(benches, bench_full_build, bench_full_query, bench_lite_query);
criterion_main!(benches);
