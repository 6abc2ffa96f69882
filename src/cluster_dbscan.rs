use std::collections::VecDeque;

use rayon::prelude::*;
use tracing::debug;

use crate::cluster::{self, Clustering};
use crate::config::GeomConfig;
use crate::error::{GeomError, GeomResult};
use crate::geometry;
use crate::kdtree::{ElementSource, SpatialTree};

/// Point count above which neighborhoods come from a spatial tree instead of
/// a full pairwise scan. Both paths sort each neighborhood ascending, so the
/// clustering is identical on either side of the threshold.
const BRUTE_FORCE_LIMIT: usize = 256;

/// Density-based clustering.
///
/// A point is a core point when at least `min_pts` other points lie within
/// `epsilon` of it (the point itself is not counted). Clusters grow
/// breadth-first from core points; points no cluster reaches come back as
/// noise. Border points join the first cluster that reaches them, so the
/// result is deterministic for a fixed input order.
pub fn dbscan(
    points: &[f64],
    epsilon: f64,
    min_pts: usize,
    cfg: &GeomConfig,
) -> GeomResult<Clustering> {
    let count = geometry::checked_count("dbscan", points)?;
    cluster::validate_positive("dbscan", "epsilon", epsilon)?;
    if min_pts == 0 {
        return Err(GeomError::InvalidParameter {
            op: "dbscan",
            name: "min_pts",
            value: 0.0,
            reason: "must be positive",
        });
    }

    let neighborhoods = collect_neighborhoods(points, count, epsilon, cfg)?;
    let is_core: Vec<bool> = neighborhoods.iter().map(|n| n.len() >= min_pts).collect();

    let mut labels: Vec<Option<usize>> = vec![None; count];
    let mut cluster_count = 0;
    let mut queue = VecDeque::new();
    for start in 0..count {
        if labels[start].is_some() || !is_core[start] {
            continue;
        }
        let id = cluster_count;
        cluster_count += 1;
        labels[start] = Some(id);
        queue.push_back(start);
        while let Some(p) = queue.pop_front() {
            for &n in &neighborhoods[p] {
                if labels[n].is_none() {
                    labels[n] = Some(id);
                    // only core points keep expanding the cluster
                    if is_core[n] {
                        queue.push_back(n);
                    }
                }
            }
        }
    }

    let mut members: Vec<Vec<usize>> = vec![Vec::new(); cluster_count];
    let mut noise = Vec::new();
    for (i, label) in labels.iter().enumerate() {
        match label {
            Some(id) => members[*id].push(i),
            None => noise.push(i),
        }
    }
    debug!(
        count,
        clusters = cluster_count,
        noise = noise.len(),
        "dbscan complete"
    );
    Ok(cluster::assemble(points, members, None, noise))
}

fn collect_neighborhoods(
    points: &[f64],
    count: usize,
    epsilon: f64,
    cfg: &GeomConfig,
) -> GeomResult<Vec<Vec<usize>>> {
    let radius = epsilon + cfg.tolerance;
    if count <= BRUTE_FORCE_LIMIT {
        debug!(count, "dbscan neighborhoods by full scan");
        let radius_sq = radius * radius;
        let result = (0..count)
            .map(|i| {
                let p = geometry::point3(points, i);
                (0..count)
                    .filter(|&j| {
                        j != i && geometry::dist_sq(p, geometry::point3(points, j)) <= radius_sq
                    })
                    .collect()
            })
            .collect();
        return Ok(result);
    }

    debug!(count, "dbscan neighborhoods by spatial tree");
    let tree = SpatialTree::build(ElementSource::Points(points))?;
    let result = (0..count)
        .into_par_iter()
        .map(|i| {
            let p = geometry::point3(points, i);
            let mut neighbors = Vec::new();
            tree.visit_sphere(p, radius, &mut |j| {
                if j != i {
                    neighbors.push(j);
                }
            });
            neighbors.sort_unstable();
            neighbors
        })
        .collect();
    Ok(result)
}
