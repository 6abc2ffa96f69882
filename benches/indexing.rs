use criterion::{black_box, criterion_group, criterion_main, Criterion};
use geoprox::{k_nearest, range_query, ElementSource, SearchRegion, SpatialTree};

const NUM_POINTS: usize = 10_000;

// Deterministic quasi-uniform scatter over a 100x100x100 box
fn scatter(count: usize) -> Vec<f64> {
    let mut points: Vec<f64> = Vec::with_capacity(count * 3);
    for i in 0..count {
        points.push((i * 73 % 997) as f64 * 0.1);
        points.push((i * 179 % 991) as f64 * 0.1);
        points.push((i * 283 % 983) as f64 * 0.1);
    }
    points
}

fn benchmark_tree_build(c: &mut Criterion) {
    let points = scatter(NUM_POINTS);

    c.bench_function(&format!("build_tree_{}_points", NUM_POINTS), |b| {
        b.iter(|| SpatialTree::build(ElementSource::Points(black_box(&points))).unwrap())
    });
}

fn benchmark_range_query(c: &mut Criterion) {
    let points = scatter(NUM_POINTS);
    let tree = SpatialTree::build(ElementSource::Points(&points)).unwrap();
    let region = SearchRegion::Sphere {
        center: [50.0, 50.0, 50.0],
        radius: 10.0,
    };

    c.bench_function(&format!("range_query_{}_points", NUM_POINTS), |b| {
        b.iter(|| range_query(&tree, black_box(&region), 0.0).unwrap())
    });
}

fn benchmark_k_nearest(c: &mut Criterion) {
    let points = scatter(NUM_POINTS);
    let tree = SpatialTree::build(ElementSource::Points(&points)).unwrap();
    // 100 needles spread along the main diagonal
    let mut needles: Vec<f64> = Vec::with_capacity(300);
    for i in 0..100 {
        let v = i as f64;
        needles.push(v);
        needles.push(v);
        needles.push(v);
    }

    c.bench_function(&format!("k_nearest_10_of_{}_points", NUM_POINTS), |b| {
        b.iter(|| k_nearest(&tree, black_box(&needles), 10).unwrap())
    });
}

criterion_group!(
    benches,
    benchmark_tree_build,
    benchmark_range_query,
    benchmark_k_nearest
);
criterion_main!(benches);
