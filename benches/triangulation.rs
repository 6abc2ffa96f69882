use criterion::{black_box, criterion_group, criterion_main, Criterion};
use geoprox::{medial_axis, voronoi, GeomConfig, Triangulation};

const NUM_SITES: usize = 500;

// Deterministic quasi-uniform scatter over a 100x100 square
fn sites(count: usize) -> Vec<f64> {
    let mut coords: Vec<f64> = Vec::with_capacity(count * 2);
    for i in 0..count {
        coords.push((i * 73 % 997) as f64 * 0.1);
        coords.push((i * 179 % 991) as f64 * 0.1);
    }
    coords
}

fn benchmark_delaunay(c: &mut Criterion) {
    let coords = sites(NUM_SITES);
    let cfg = GeomConfig::default();

    c.bench_function(&format!("delaunay_{}_sites", NUM_SITES), |b| {
        b.iter(|| Triangulation::from_plane(black_box(&coords), &cfg).unwrap())
    });
}

fn benchmark_voronoi(c: &mut Criterion) {
    let coords = sites(NUM_SITES);
    let cfg = GeomConfig::default();
    let tri = Triangulation::from_plane(&coords, &cfg).unwrap();

    c.bench_function(&format!("voronoi_{}_sites", NUM_SITES), |b| {
        b.iter(|| voronoi(black_box(&tri), &cfg).unwrap())
    });
}

fn benchmark_medial_axis(c: &mut Criterion) {
    // a long rectangle sampled at the default density
    let outline = [
        0.0, 0.0, 0.0, //
        40.0, 0.0, 0.0, //
        40.0, 8.0, 0.0, //
        0.0, 8.0, 0.0,
    ];
    let cfg = GeomConfig::default();

    c.bench_function("medial_axis_rectangle", |b| {
        b.iter(|| medial_axis(black_box(&outline), &cfg).unwrap())
    });
}

criterion_group!(
    benches,
    benchmark_delaunay,
    benchmark_voronoi,
    benchmark_medial_axis
);
criterion_main!(benches);
