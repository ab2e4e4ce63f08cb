//! Criterion benchmarks for sylva-tree: tree induction, forest training and voting.

use criterion::{Criterion, criterion_group, criterion_main};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use sylva_tree::{DecisionTreeConfig, Instance, RandomForestConfig, SplitCriterion};

/// Random categorical rows; the label depends on the first two attributes.
fn make_categorical(n_samples: usize, n_attributes: usize, seed: u64) -> Vec<Instance> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n_samples)
        .map(|_| {
            let attributes: Vec<i64> = (0..n_attributes).map(|_| rng.gen_range(1..=4)).collect();
            let label = (attributes[0] + attributes[1]) % 3;
            Instance::new(label, attributes)
        })
        .collect()
}

fn bench_tree_fit(c: &mut Criterion) {
    let data = make_categorical(2000, 8, 42);
    let id3 = DecisionTreeConfig::new();
    let c45 = DecisionTreeConfig::new().with_criterion(SplitCriterion::GainRatio);

    c.bench_function("id3_fit_2000x8", |b| b.iter(|| id3.fit(&data).unwrap()));
    c.bench_function("c45_fit_2000x8", |b| b.iter(|| c45.fit(&data).unwrap()));
}

fn bench_forest_fit(c: &mut Criterion) {
    let data = make_categorical(2000, 8, 42);
    let cfg = RandomForestConfig::new(50).unwrap().with_sample_ratio(0.6).with_seed(42);

    c.bench_function("forest_fit_2000x8_50trees", |b| {
        b.iter(|| cfg.fit(&data).unwrap());
    });
}

fn bench_forest_decide_batch(c: &mut Criterion) {
    let data = make_categorical(2000, 8, 42);
    let forest = RandomForestConfig::new(50).unwrap().with_seed(42).fit(&data).unwrap();
    let queries = make_categorical(2000, 8, 7);

    c.bench_function("forest_decide_batch_2000x8_50trees", |b| {
        b.iter(|| forest.decide_batch(&queries, 42).unwrap());
    });
}

criterion_group!(benches, bench_tree_fit, bench_forest_fit, bench_forest_decide_batch);
criterion_main!(benches);
