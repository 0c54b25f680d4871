use criterion::{criterion_group, criterion_main, Criterion};
use las2poly::point::Point;
use las2poly::thinning;
use rand::{Rng, SeedableRng};

fn random_points(n: usize) -> Vec<Point> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    (0..n)
        .map(|_| Point::new(rng.gen_range(0.0..1000.0), rng.gen_range(0.0..1000.0), rng.gen_range(0.0..50.0), 2))
        .collect()
}

fn criterion_benchmark(c: &mut Criterion) {
    let points = random_points(200_000);
    c.bench_function("thin_tile_200k", |bencher| {
        bencher.iter(|| {
            criterion::black_box(thinning::thin_tile(criterion::black_box(points.clone()), 2.0, &[]).unwrap());
        });
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
