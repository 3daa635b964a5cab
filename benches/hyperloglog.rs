use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hll_sketch::{
    ClassicEstimator, Estimator, HyperLogLog, LogLogBetaEstimator, Murmur3Hash, Xxh32Hash,
};
use rand::prelude::*;

fn random_items(rng: &mut StdRng, count: usize) -> Vec<String> {
    (0..count)
        .map(|_| format!("{:016x}", rng.gen::<u64>()))
        .collect()
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("HyperLogLog Insert");
    let mut rng = StdRng::seed_from_u64(42);
    let items = random_items(&mut rng, 10_000);

    // Test different precision values
    for b in [4, 8, 10, 12, 14, 16] {
        group.bench_with_input(BenchmarkId::from_parameter(b), &b, |bench, &b| {
            let mut hll = HyperLogLog::with_hash(b, Murmur3Hash::new(42)).unwrap();
            bench.iter(|| {
                hll.reset();
                for item in items.iter() {
                    hll.add(black_box(item));
                }
            });
        });
    }
    group.finish();
}

fn bench_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("Hash Function");
    let mut rng = StdRng::seed_from_u64(42);
    let items = random_items(&mut rng, 10_000);

    group.bench_function("murmur3", |bench| {
        let mut hll = HyperLogLog::with_hash(12, Murmur3Hash::new(42)).unwrap();
        bench.iter(|| {
            for item in items.iter() {
                hll.add(black_box(item));
            }
        });
    });
    group.bench_function("xxh32", |bench| {
        let mut hll = HyperLogLog::with_hash(12, Xxh32Hash::new(42)).unwrap();
        bench.iter(|| {
            for item in items.iter() {
                hll.add(black_box(item));
            }
        });
    });
    group.finish();
}

fn bench_estimator_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("Estimator Comparison");
    let mut rng = StdRng::seed_from_u64(42);
    let classic = ClassicEstimator;
    let beta = LogLogBetaEstimator;

    for b in [8, 12, 16] {
        let mut hll = HyperLogLog::new(b).unwrap();
        for item in random_items(&mut rng, 10_000) {
            hll.add(item);
        }
        let registers = hll.registers();

        group.bench_with_input(BenchmarkId::new("classic", b), &b, |bench, _| {
            bench.iter(|| black_box(classic.estimate(registers)));
        });
        group.bench_with_input(BenchmarkId::new("beta", b), &b, |bench, _| {
            bench.iter(|| black_box(beta.estimate(registers)));
        });
    }
    group.finish();
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("HyperLogLog Merge");
    let mut rng = StdRng::seed_from_u64(42);

    for b in [8, 12, 16] {
        let mut left = HyperLogLog::new(b).unwrap();
        let mut right = HyperLogLog::new(b).unwrap();
        for item in random_items(&mut rng, 5_000) {
            left.add(item);
        }
        for item in random_items(&mut rng, 5_000) {
            right.add(item);
        }

        group.bench_with_input(BenchmarkId::from_parameter(b), &b, |bench, _| {
            bench.iter(|| black_box(HyperLogLog::merge(&left, &right).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_insert,
    bench_hash,
    bench_estimator_comparison,
    bench_merge
);
criterion_main!(benches);
