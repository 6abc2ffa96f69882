use tracing::debug;

use crate::cluster::{self, Clustering};
use crate::error::GeomResult;
use crate::geometry;

/// Single-linkage agglomerative clustering.
///
/// Starts from one singleton cluster per point and repeatedly merges the two
/// clusters whose closest members are nearest, until `k` clusters remain.
/// Every merge rescans the candidate pairs, so the total cost grows as
/// O(n^3); the exhaustive merge order is the point of the method, and it is
/// intended for modest point counts.
pub fn single_linkage(points: &[f64], k: usize) -> GeomResult<Clustering> {
    let count = geometry::checked_count("single_linkage", points)?;
    cluster::validate_k("single_linkage", k, count)?;

    let mut groups: Vec<Vec<usize>> = (0..count).map(|i| vec![i]).collect();
    while groups.len() > k {
        let mut best = f64::INFINITY;
        let mut pair = (0, 1);
        for a in 0..groups.len() {
            for b in (a + 1)..groups.len() {
                let d = linkage_dist_sq(points, &groups[a], &groups[b]);
                if d < best {
                    best = d;
                    pair = (a, b);
                }
            }
        }
        // pair.0 < pair.1, so removing pair.1 leaves pair.0 in place
        let merged = groups.swap_remove(pair.1);
        groups[pair.0].extend(merged);
    }

    for group in &mut groups {
        group.sort_unstable();
    }
    groups.sort_by_key(|group| group[0]);
    debug!(count, k, "single linkage complete");
    Ok(cluster::assemble(points, groups, None, Vec::new()))
}

/// Squared distance between the closest member pair of two groups.
fn linkage_dist_sq(points: &[f64], a: &[usize], b: &[usize]) -> f64 {
    let mut best = f64::INFINITY;
    for &i in a {
        let p = geometry::point3(points, i);
        for &j in b {
            let d = geometry::dist_sq(p, geometry::point3(points, j));
            if d < best {
                best = d;
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_closest_pairs_first() {
        let points = [
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            10.0, 0.0, 0.0, //
            11.0, 0.0, 0.0,
        ];
        let clustering = single_linkage(&points, 2).unwrap();
        assert_eq!(clustering.clusters.len(), 2);
        assert_eq!(clustering.clusters[0].members, vec![0, 1]);
        assert_eq!(clustering.clusters[1].members, vec![2, 3]);
        assert!(clustering.noise.is_empty());
    }

    #[test]
    fn chains_link_through_neighbors() {
        // a chain with a gap: single linkage walks the chain before it
        // bridges the gap
        let points = [
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            2.0, 0.0, 0.0, //
            3.0, 0.0, 0.0, //
            9.0, 0.0, 0.0,
        ];
        let clustering = single_linkage(&points, 2).unwrap();
        assert_eq!(clustering.clusters[0].members, vec![0, 1, 2, 3]);
        assert_eq!(clustering.clusters[1].members, vec![4]);
    }

    #[test]
    fn k_equals_count_keeps_singletons() {
        let points = [0.0, 0.0, 0.0, 5.0, 5.0, 5.0, 9.0, 1.0, 2.0];
        let clustering = single_linkage(&points, 3).unwrap();
        assert_eq!(clustering.clusters.len(), 3);
        for (i, cluster) in clustering.clusters.iter().enumerate() {
            assert_eq!(cluster.members, vec![i]);
        }
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(single_linkage(&[], 1).is_err());
        assert!(single_linkage(&[0.0, 0.0, 0.0], 0).is_err());
        assert!(single_linkage(&[0.0, 0.0, 0.0], 2).is_err());
    }
}
