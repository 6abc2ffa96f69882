use criterion::{black_box, criterion_group, criterion_main, Criterion};
use geoprox::{dbscan, kmeans, GeomConfig};

const NUM_POINTS: usize = 5_000;

// Eight deterministic blobs on a 2x2x2 grid of centers
fn blobs(count: usize) -> Vec<f64> {
    let mut points: Vec<f64> = Vec::with_capacity(count * 3);
    for i in 0..count {
        let blob = i % 8;
        let cx = (blob & 1) as f64 * 40.0;
        let cy = ((blob >> 1) & 1) as f64 * 40.0;
        let cz = ((blob >> 2) & 1) as f64 * 40.0;
        points.push(cx + (i * 73 % 101) as f64 * 0.05);
        points.push(cy + (i * 179 % 103) as f64 * 0.05);
        points.push(cz + (i * 283 % 107) as f64 * 0.05);
    }
    points
}

fn benchmark_kmeans(c: &mut Criterion) {
    let points = blobs(NUM_POINTS);
    let cfg = GeomConfig::default();

    c.bench_function(&format!("kmeans_8_of_{}_points", NUM_POINTS), |b| {
        b.iter(|| kmeans(black_box(&points), 8, 42, &cfg).unwrap())
    });
}

fn benchmark_dbscan(c: &mut Criterion) {
    let points = blobs(NUM_POINTS);
    let cfg = GeomConfig::default();

    c.bench_function(&format!("dbscan_{}_points", NUM_POINTS), |b| {
        b.iter(|| dbscan(black_box(&points), 1.5, 8, &cfg).unwrap())
    });
}

criterion_group!(benches, benchmark_kmeans, benchmark_dbscan);
criterion_main!(benches);
