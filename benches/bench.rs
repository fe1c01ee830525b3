use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use fortune_rs::{Builder, Float, Point};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("random");
    for count in [100, 1_000, 10_000] {
        let points = random_points(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &points, |b, points| {
            b.iter(|| {
                let voronoi = Builder::new(points.clone()).build().unwrap();
                let _result = voronoi.compute();
            })
        });
    }
    group.finish();

    c.bench_function("bench_grid_50", |b| {
        // every vertex is shared by four sites
        let points = (0..50)
            .flat_map(|i| (0..50).map(move |j| Point::new(i as Float * 10., j as Float * 10.)))
            .collect::<Vec<_>>();
        b.iter(|| {
            let voronoi = Builder::new(points.clone()).build().unwrap();
            let _result = voronoi.compute();
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

fn random_points(count: usize) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(count as u64);
    (0..count)
        .map(|_| Point::new(rng.gen_range(0.0..800.), rng.gen_range(0.0..800.)))
        .collect()
}
