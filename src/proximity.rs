use std::cmp::Ordering;

use tracing::debug;

use crate::bounds::BoundingBox;
use crate::config::GeomConfig;
use crate::error::{GeomError, GeomResult};
use crate::geometry::{self, dot, norm, scale, sub};
use crate::index;
use crate::kdtree::{ElementSource, SpatialTree};

/// Point count above which candidates are pre-filtered through a spatial
/// tree. The weighted distance never undercuts the raw distance, so a
/// radius query at `max_distance` is a safe pre-filter.
const BRUTE_FORCE_LIMIT: usize = 256;

/// One ranked element from [`rank_directional`].
#[derive(Clone, Copy, Debug)]
pub struct ProximityHit {
    pub index: usize,
    /// Euclidean distance from the query origin to the element.
    pub distance: f64,
    /// Angle in radians between the query direction and the direction to
    /// the element, in [0, pi].
    pub angle: f64,
    /// `distance * (1 + angle_weight * angle)`: the ranking key.
    pub weighted: f64,
}

/// Rank elements by distance penalized with angular deviation from
/// `direction`.
///
/// The query origin is the bounding-box center of the element set. Every
/// element whose weighted distance stays within `max_distance` comes back
/// sorted ascending by weighted distance, ties broken by element index.
/// An element sitting on the origin has no direction of its own and gets
/// angle zero.
///
/// `angle_weight` scales the penalty: zero ranks purely by distance, larger
/// values increasingly favor elements along `direction`. Negative weights
/// would reward deviation and are rejected.
pub fn rank_directional(
    points: &[f64],
    direction: [f64; 3],
    angle_weight: f64,
    max_distance: f64,
    cfg: &GeomConfig,
) -> GeomResult<Vec<ProximityHit>> {
    let count = geometry::checked_count("rank_directional", points)?;
    let dir_len = norm(direction);
    if dir_len <= cfg.tolerance {
        return Err(GeomError::InvalidParameter {
            op: "rank_directional",
            name: "direction",
            value: dir_len,
            reason: "length must exceed the tolerance",
        });
    }
    if max_distance <= 0.0 {
        return Err(GeomError::InvalidParameter {
            op: "rank_directional",
            name: "max_distance",
            value: max_distance,
            reason: "must be positive",
        });
    }
    if angle_weight < 0.0 {
        return Err(GeomError::InvalidParameter {
            op: "rank_directional",
            name: "angle_weight",
            value: angle_weight,
            reason: "must not be negative",
        });
    }

    let dir = scale(direction, 1.0 / dir_len);
    let origin = BoundingBox::from_points(points).center();

    let candidates: Vec<usize> = if count <= BRUTE_FORCE_LIMIT {
        (0..count).collect()
    } else {
        let tree = SpatialTree::build(ElementSource::Points(points))?;
        index::within_distance_one(&tree, origin, max_distance, cfg.tolerance)?
    };
    debug!(count, candidates = candidates.len(), "directional candidates");

    let mut hits: Vec<ProximityHit> = candidates
        .into_iter()
        .filter_map(|i| {
            let to = sub(geometry::point3(points, i), origin);
            let distance = norm(to);
            let angle = if distance <= cfg.tolerance {
                0.0
            } else {
                dot(dir, scale(to, 1.0 / distance)).clamp(-1.0, 1.0).acos()
            };
            let weighted = distance * (1.0 + angle_weight * angle);
            (weighted <= max_distance + cfg.tolerance).then_some(ProximityHit {
                index: i,
                distance,
                angle,
                weighted,
            })
        })
        .collect();

    hits.sort_by(|p, q| {
        p.weighted
            .partial_cmp(&q.weighted)
            .unwrap_or(Ordering::Equal)
            .then(p.index.cmp(&q.index))
    });
    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angle_penalty_reorders_equidistant_points() {
        // four points on a circle of radius 2 around the origin of the set
        let points = [
            2.0, 0.0, 0.0, //
            0.0, 2.0, 0.0, //
            -2.0, 0.0, 0.0, //
            0.0, -2.0, 0.0,
        ];
        // the bounding box center is (0, 0, 0)
        let hits =
            rank_directional(&points, [1.0, 0.0, 0.0], 1.0, 50.0, &GeomConfig::default()).unwrap();
        assert_eq!(hits.len(), 4);
        assert_eq!(hits[0].index, 0, "aligned point must rank first");
        assert!((hits[0].angle - 0.0).abs() < 1e-12);
        assert!((hits[0].weighted - 2.0).abs() < 1e-12);
        // the two side points tie and resolve by index
        assert_eq!(hits[1].index, 1);
        assert_eq!(hits[2].index, 3);
        // the opposite point pays the full pi penalty
        assert_eq!(hits[3].index, 2);
        assert!((hits[3].angle - std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn zero_weight_ranks_by_distance_only() {
        let points = [
            1.0, 0.0, 0.0, //
            -3.0, 0.0, 0.0, //
            0.0, 0.5, 0.0,
        ];
        let hits =
            rank_directional(&points, [1.0, 0.0, 0.0], 0.0, 50.0, &GeomConfig::default()).unwrap();
        // origin is (-1, 0.25, 0); distances decide alone
        assert_eq!(hits.len(), 3);
        for pair in hits.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
    }

    #[test]
    fn cutoff_applies_to_weighted_distance() {
        let points = [
            4.0, 0.0, 0.0, //
            0.0, 4.0, 0.0, //
            -4.0, 0.0, 0.0, //
            0.0, -4.0, 0.0,
        ];
        // radius 4 ring; with weight 1 the orthogonal points cost
        // 4 * (1 + pi/2) > 9, the aligned point costs 4
        let hits =
            rank_directional(&points, [1.0, 0.0, 0.0], 1.0, 9.0, &GeomConfig::default()).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].index, 0);
    }

    #[test]
    fn rejects_bad_arguments() {
        let points = [1.0, 0.0, 0.0];
        let cfg = GeomConfig::default();
        assert!(rank_directional(&points, [0.0, 0.0, 0.0], 1.0, 5.0, &cfg).is_err());
        assert!(rank_directional(&points, [1.0, 0.0, 0.0], 1.0, 0.0, &cfg).is_err());
        assert!(rank_directional(&points, [1.0, 0.0, 0.0], -0.5, 5.0, &cfg).is_err());
        assert!(rank_directional(&[], [1.0, 0.0, 0.0], 1.0, 5.0, &cfg).is_err());
    }

    #[test]
    fn large_sets_use_the_tree_prefilter() {
        // a dense line of points along +x beyond the brute-force limit
        let count = BRUTE_FORCE_LIMIT * 2;
        let mut points = Vec::with_capacity(count * 3);
        for i in 0..count {
            points.extend_from_slice(&[i as f64, 0.0, 0.0]);
        }
        let hits =
            rank_directional(&points, [1.0, 0.0, 0.0], 0.0, 10.0, &GeomConfig::default()).unwrap();
        // the origin sits at the line midpoint; 10 units either side qualify
        let origin_x = (count - 1) as f64 / 2.0;
        for hit in &hits {
            assert!((points[hit.index * 3] - origin_x).abs() <= 10.0 + 1e-9);
        }
        // integer x positions within 10.0 of x = 255.5
        assert_eq!(hits.len(), 20);
    }
}
