//! Criterion benchmarks for hull construction and edge-collapse simplification.
//! Focus sizes: n in {100, 1000, 5000} uniform points in the unit cube.
//! Results live under target/criterion.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use hullmix::api::{
    collapse_candidates, compute_hull, simplify, uniform_cloud, DenseSimplex, ReplayToken,
    SimplifyCfg,
};

fn bench_hull(c: &mut Criterion) {
    let mut group = c.benchmark_group("hull");
    for &n in &[100usize, 1000, 5000] {
        let cloud = uniform_cloud(n, 3, ReplayToken::new(42, n as u64)).unwrap();
        group.bench_with_input(BenchmarkId::new("compute_hull_3d", n), &cloud, |b, cloud| {
            b.iter(|| compute_hull(cloud.points()).unwrap())
        });
    }
    let cloud5 = uniform_cloud(500, 5, ReplayToken::new(42, 5)).unwrap();
    group.bench_function(BenchmarkId::new("compute_hull_5d", 500), |b| {
        b.iter(|| compute_hull(cloud5.points()).unwrap())
    });
    group.finish();
}

fn bench_simplify(c: &mut Criterion) {
    let mut group = c.benchmark_group("simplify");
    group.sample_size(10);
    for &n in &[200usize, 1000] {
        let cloud = uniform_cloud(n, 3, ReplayToken::new(7, n as u64)).unwrap();
        let hull = compute_hull(cloud.points()).unwrap();
        group.bench_with_input(BenchmarkId::new("candidates", n), &hull, |b, hull| {
            b.iter(|| collapse_candidates(hull, &DenseSimplex::default()))
        });
        let cfg = SimplifyCfg {
            target_vertex_count: 8,
            ..SimplifyCfg::default()
        };
        group.bench_with_input(BenchmarkId::new("to_8_vertices", n), &cloud, |b, cloud| {
            b.iter_batched(
                || cloud.clone(),
                |cloud| simplify(&cloud, &cfg).unwrap(),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_hull, bench_simplify);
criterion_main!(benches);
