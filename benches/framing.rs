use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;
use model_showcase::framing::Framing;
use model_showcase::loaders::smooth_normals;
use model_showcase::math::AABB;

/// Points on a lumpy sphere, enough to look like a scanned model
fn sample_points(count: usize) -> Vec<Vec3> {
    (0..count)
        .map(|i| {
            let t = i as f32 * 0.618_034;
            let theta = t * std::f32::consts::TAU;
            let phi = (i as f32 / count as f32) * std::f32::consts::PI;
            let r = 1.0 + 0.1 * (t * 7.0).sin();
            Vec3::new(
                r * phi.sin() * theta.cos(),
                r * phi.cos(),
                r * phi.sin() * theta.sin(),
            )
        })
        .collect()
}

fn bench_bounds(c: &mut Criterion) {
    let mut group = c.benchmark_group("bounds");
    for count in [1_000, 100_000, 1_000_000] {
        let points = sample_points(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &points, |b, points| {
            b.iter(|| {
                let bounds = AABB::from_points(points.iter().copied());
                black_box(bounds.map(|b| Framing::for_bounds(&b)))
            })
        });
    }
    group.finish();
}

fn bench_smooth_normals(c: &mut Criterion) {
    let positions = sample_points(30_000);
    let indices: Vec<u32> = (0..positions.len() as u32 - 2)
        .flat_map(|i| [i, i + 1, i + 2])
        .collect();

    c.bench_function("smooth_normals_30k", |b| {
        b.iter(|| black_box(smooth_normals(black_box(&positions), black_box(&indices))))
    });
}

criterion_group!(benches, bench_bounds, bench_smooth_normals);
criterion_main!(benches);
