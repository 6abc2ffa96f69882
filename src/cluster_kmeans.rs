use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::debug;

use crate::cluster::{self, Clustering};
use crate::config::GeomConfig;
use crate::error::GeomResult;
use crate::geometry;

/// K-means clustering with k-means++ seeding and Lloyd refinement.
///
/// The first centroid is drawn uniformly from the input; each further one is
/// drawn with probability proportional to the squared distance from the
/// nearest centroid chosen so far. Lloyd iteration then alternates
/// assignment and centroid recomputation until the largest centroid shift
/// falls to the configured tolerance or `max_iterations` is reached.
///
/// The same `seed` over the same input always produces the same clustering.
/// A cluster that loses all members keeps its previous centroid, so exactly
/// `k` clusters come back, possibly empty.
pub fn kmeans(points: &[f64], k: usize, seed: u64, cfg: &GeomConfig) -> GeomResult<Clustering> {
    let count = geometry::checked_count("kmeans", points)?;
    cluster::validate_k("kmeans", k, count)?;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut centroids = seed_centroids(points, count, k, &mut rng);
    debug!(count, k, seed, "kmeans seeded");

    let mut labels = vec![0usize; count];
    for iteration in 0..cfg.max_iterations {
        assign(points, &centroids, &mut labels);
        let shift = recompute(points, &labels, &mut centroids);
        if shift <= cfg.tolerance {
            debug!(iteration, shift, "kmeans converged");
            break;
        }
    }
    // Align labels with the final centroid positions
    assign(points, &centroids, &mut labels);

    let mut members: Vec<Vec<usize>> = vec![Vec::new(); k];
    for (i, &label) in labels.iter().enumerate() {
        members[label].push(i);
    }
    Ok(cluster::assemble(points, members, Some(centroids), Vec::new()))
}

fn seed_centroids(points: &[f64], count: usize, k: usize, rng: &mut StdRng) -> Vec<[f64; 3]> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(geometry::point3(points, rng.gen_range(0..count)));

    // Squared distance from each point to its nearest chosen centroid
    let mut nearest = vec![f64::INFINITY; count];
    while centroids.len() < k {
        let latest = centroids[centroids.len() - 1];
        let mut total = 0.0;
        for i in 0..count {
            let d2 = geometry::dist_sq(geometry::point3(points, i), latest);
            if d2 < nearest[i] {
                nearest[i] = d2;
            }
            total += nearest[i];
        }
        if total <= 0.0 {
            // every point coincides with a centroid already
            centroids.push(geometry::point3(points, rng.gen_range(0..count)));
            continue;
        }
        let threshold = rng.gen_range(0.0..total);
        let mut cumulative = 0.0;
        let mut chosen = None;
        for (i, &weight) in nearest.iter().enumerate() {
            // zero-weight points are existing centroids; never re-pick one
            if weight <= 0.0 {
                continue;
            }
            chosen = Some(i);
            cumulative += weight;
            if cumulative >= threshold {
                break;
            }
        }
        centroids.push(geometry::point3(points, chosen.unwrap_or(0)));
    }
    centroids
}

fn assign(points: &[f64], centroids: &[[f64; 3]], labels: &mut [usize]) {
    labels.par_iter_mut().enumerate().for_each(|(i, label)| {
        let p = geometry::point3(points, i);
        let mut best = f64::INFINITY;
        let mut choice = 0;
        for (c, centroid) in centroids.iter().enumerate() {
            let d2 = geometry::dist_sq(p, *centroid);
            if d2 < best {
                best = d2;
                choice = c;
            }
        }
        *label = choice;
    });
}

/// Move each centroid to its member mean and report the largest shift.
fn recompute(points: &[f64], labels: &[usize], centroids: &mut [[f64; 3]]) -> f64 {
    let k = centroids.len();
    let mut sums = vec![[0.0f64; 3]; k];
    let mut counts = vec![0usize; k];
    for (i, &label) in labels.iter().enumerate() {
        sums[label] = geometry::add(sums[label], geometry::point3(points, i));
        counts[label] += 1;
    }

    let mut shift = 0.0f64;
    for c in 0..k {
        if counts[c] == 0 {
            continue;
        }
        let next = geometry::scale(sums[c], 1.0 / counts[c] as f64);
        shift = shift.max(geometry::dist(centroids[c], next));
        centroids[c] = next;
    }
    shift
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_cluster_per_point_has_radius_zero() {
        let points = [
            0.0, 0.0, 0.0, //
            4.0, 0.0, 0.0, //
            0.0, 4.0, 0.0, //
            0.0, 0.0, 4.0, //
            4.0, 4.0, 4.0,
        ];
        let clustering = kmeans(&points, 5, 11, &GeomConfig::default()).unwrap();
        assert_eq!(clustering.clusters.len(), 5);
        assert!(clustering.noise.is_empty());
        for cluster in &clustering.clusters {
            assert_eq!(cluster.len(), 1, "expected singleton, got {:?}", cluster.members);
            assert!(cluster.radius() <= 1e-12);
        }
    }

    #[test]
    fn same_seed_same_clustering() {
        let mut points = Vec::new();
        let mut rng = <StdRng as SeedableRng>::seed_from_u64(3);
        for _ in 0..240 {
            points.push(rng.gen_range(-20.0..20.0));
        }
        let a = kmeans(&points, 4, 99, &GeomConfig::default()).unwrap();
        let b = kmeans(&points, 4, 99, &GeomConfig::default()).unwrap();
        for (ca, cb) in a.clusters.iter().zip(&b.clusters) {
            assert_eq!(ca.members, cb.members);
            assert_eq!(ca.centroid, cb.centroid);
        }
    }

    #[test]
    fn rejects_bad_arguments() {
        let points = [0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        assert!(kmeans(&[], 1, 0, &GeomConfig::default()).is_err());
        assert!(kmeans(&points, 0, 0, &GeomConfig::default()).is_err());
        assert!(kmeans(&points, 3, 0, &GeomConfig::default()).is_err());
    }

    #[test]
    fn separated_pairs_split_cleanly() {
        let points = [
            0.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, //
            10.0, 0.0, 0.0, //
            10.0, 0.0, 1.0,
        ];
        // k-means++ seeding makes the bad same-pair seed choice extremely
        // unlikely for any single seed; picking the lowest-inertia run over a
        // handful of seeds pins the test to the global optimum.
        let best = (0..10)
            .map(|seed| kmeans(&points, 2, seed, &GeomConfig::default()).unwrap())
            .min_by(|a, b| {
                a.inertia()
                    .partial_cmp(&b.inertia())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap();

        let mut centroids: Vec<[f64; 3]> = best.clusters.iter().map(|c| c.centroid).collect();
        centroids.sort_by(|a, b| a[0].partial_cmp(&b[0]).unwrap_or(std::cmp::Ordering::Equal));
        assert!(geometry::dist(centroids[0], [0.0, 0.0, 0.5]) < 1e-9);
        assert!(geometry::dist(centroids[1], [10.0, 0.0, 0.5]) < 1e-9);
        for cluster in &best.clusters {
            assert_eq!(cluster.len(), 2);
        }
    }
}
