//! Benchmarks for graph construction, maintenance, and queries.
//!
//! All data is synthetic and seeded, so runs are comparable across commits.

use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use knng::benchmark::{clustered_vectors, uniform_vectors};
use knng::{Euclidean, KnnGraph, KnnGraphParams};
use rand::rngs::StdRng;
use rand::SeedableRng;

const DIM: usize = 16;
const K: usize = 10;

fn params() -> KnnGraphParams {
    KnnGraphParams::new(K).with_seed(42)
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    group.sample_size(10);

    for n in [500, 2_000, 5_000] {
        let data = uniform_vectors(n, DIM, 42);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("uniform", n), &data, |b, data| {
            b.iter(|| KnnGraph::build(params(), Euclidean, data.clone()).unwrap());
        });

        let data = clustered_vectors(n, DIM, 20, 42);
        group.bench_with_input(BenchmarkId::new("clustered", n), &data, |b, data| {
            b.iter(|| KnnGraph::build(params(), Euclidean, data.clone()).unwrap());
        });
    }

    group.finish();
}

fn bench_put(c: &mut Criterion) {
    let mut group = c.benchmark_group("put");

    for n in [1_000, 5_000] {
        let graph = KnnGraph::build(params(), Euclidean, uniform_vectors(n, DIM, 7)).unwrap();
        let extra = uniform_vectors(1, DIM, 8).remove(0).1;
        group.bench_function(BenchmarkId::from_parameter(n), |b| {
            b.iter_batched(
                || graph.clone(),
                |mut g| {
                    g.put("extra", extra.clone()).unwrap();
                    g
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn bench_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("remove");

    for n in [1_000, 5_000] {
        let graph = KnnGraph::build(params(), Euclidean, uniform_vectors(n, DIM, 9)).unwrap();
        let victim = format!("v{}", n / 2);
        group.bench_function(BenchmarkId::from_parameter(n), |b| {
            b.iter_batched(
                || graph.clone(),
                |mut g| {
                    g.remove(&victim).unwrap();
                    g
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn bench_find_neighbors(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_neighbors");

    for n in [1_000, 5_000, 20_000] {
        let graph = KnnGraph::build(params(), Euclidean, uniform_vectors(n, DIM, 3)).unwrap();
        let queries: Vec<Vec<f32>> = uniform_vectors(100, DIM, 4)
            .into_iter()
            .map(|(_, v)| v)
            .collect();
        let mut rng = StdRng::seed_from_u64(5);

        group.throughput(Throughput::Elements(queries.len() as u64));
        group.bench_function(BenchmarkId::from_parameter(n), |b| {
            b.iter(|| {
                for q in &queries {
                    black_box(graph.find_neighbors_with(q, &mut rng).unwrap());
                }
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_build,
    bench_put,
    bench_remove,
    bench_find_neighbors
);
criterion_main!(benches);
