use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use curvepack::{Curve, HilbertCurve, Metric, MooreCurve, PukaHilbert40, RegionPacker};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;

// Benchmark curve mapping in both directions, stored tables vs closed form
fn bench_hilbert_mapping(c: &mut Criterion) {
    let mut group = c.benchmark_group("hilbert_mapping");

    let stored = HilbertCurve::new(2, 1 << 8).unwrap();
    let closed = HilbertCurve::with_store_limit(2, 1 << 8, &[0, 0], 0).unwrap();

    let mut rng = StdRng::seed_from_u64(42);
    let distances: Vec<u32> = (0..64)
        .map(|_| rng.random_range(0..stored.max_distance()))
        .collect();

    for (name, curve) in [("stored", &stored), ("closed_form", &closed)] {
        group.bench_with_input(BenchmarkId::new("point", name), curve, |b, curve| {
            let mut buf = [0i32; 2];
            b.iter(|| {
                for &d in &distances {
                    curve.alter(black_box(&mut buf), black_box(d));
                }
            });
        });
        group.bench_with_input(BenchmarkId::new("distance", name), curve, |b, curve| {
            let points: Vec<Vec<i32>> = distances.iter().map(|&d| curve.point(d)).collect();
            b.iter(|| {
                for p in &points {
                    black_box(curve.distance(black_box(p)));
                }
            });
        });
    }
    group.finish();
}

fn bench_other_curves(c: &mut Criterion) {
    let mut group = c.benchmark_group("curve_variants");

    let moore = MooreCurve::with_store_limit(3, 8, 0, 2, &[0, 0, 0], 0).unwrap();
    group.bench_function("moore_roundtrip", |b| {
        let mut buf = [0i32; 3];
        b.iter(|| {
            for d in (0..moore.max_distance()).step_by(61) {
                moore.alter(&mut buf, d);
                black_box(moore.distance(&buf));
            }
        });
    });

    group.bench_function("puka_construction", |b| {
        b.iter(|| black_box(PukaHilbert40::new()));
    });

    group.finish();
}

// Benchmark the packer's hot region operations on a 64x64 grid
fn bench_region_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("region_ops");

    let packer = RegionPacker::new(Box::new(HilbertCurve::new(2, 64).unwrap()));
    let bounds = [64, 64];
    let vertical = packer.rectangle_at(&[25, 2], &[39, 62]).unwrap();
    let horizontal = packer.rectangle_at(&[2, 25], &[62, 39]).unwrap();
    let cross = packer.union(&vertical, &horizontal);

    let mut rng = StdRng::seed_from_u64(7);
    let noise: Vec<bool> = (0..64 * 64).map(|_| rng.random::<f64>() < 0.25).collect();

    group.bench_function("pack_64x64", |b| {
        b.iter(|| packer.pack(black_box(&noise), &bounds).unwrap());
    });
    group.bench_function("expand_chebyshev_r2", |b| {
        b.iter(|| packer.expand(&cross, 2, &bounds, Metric::Chebyshev).unwrap());
    });
    group.bench_function("fringe_euclidean_r3", |b| {
        b.iter(|| packer.fringe(&cross, 3, &bounds, Metric::Euclidean).unwrap());
    });
    group.bench_function("flood_full", |b| {
        let seed = packer.pack_one(&[26, 2]);
        b.iter(|| packer.flood(&seed, &cross, packer.curve().max_distance()));
    });
    group.bench_function("split", |b| {
        let scattered = packer.xor(&cross, &vertical);
        b.iter(|| packer.split(black_box(&scattered)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_hilbert_mapping,
    bench_other_curves,
    bench_region_ops
);
criterion_main!(benches);
