use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::debug;

use crate::config::GeomConfig;
use crate::error::{GeomError, GeomResult};
use crate::geometry;
use crate::hull_chain::{self, Axis};

/// A Delaunay triangulation of a planar point set.
///
/// Built by Bowyer-Watson insertion: every site is added to a triangulation
/// seeded with one enclosing super-triangle, carving out the cavity of
/// triangles whose circumcircle contains the site and fanning the cavity
/// boundary to it. The super-triangle never leaks into the result, and all
/// triangles wind counter-clockwise in the working plane.
#[derive(Debug)]
pub struct Triangulation {
    /// Triangle vertex indices into the input site set.
    pub triangles: Vec<[usize; 3]>,
    coords: Vec<f64>,
    axis: Option<(Axis, f64)>,
}

impl Triangulation {
    /// Triangulate a 3D point set that is coplanar along `axis`.
    pub fn new(points: &[f64], axis: Axis, cfg: &GeomConfig) -> GeomResult<Triangulation> {
        let count = geometry::checked_count("triangulate", points)?;
        let planar = hull_chain::project_to_plane("triangulate", points, count, axis, cfg.tolerance)?;
        let coords: Vec<f64> = planar.iter().flat_map(|p| [p[0], p[1]]).collect();
        let mut tri = Triangulation::from_plane(&coords, cfg)?;
        tri.axis = Some((axis, points[axis.fixed()]));
        Ok(tri)
    }

    /// Triangulate native 2D coordinates, two per site.
    pub fn from_plane(coords: &[f64], cfg: &GeomConfig) -> GeomResult<Triangulation> {
        if coords.len() % 2 != 0 {
            return Err(GeomError::InvalidParameter {
                op: "triangulate",
                name: "coords",
                value: coords.len() as f64,
                reason: "length must be a multiple of 2",
            });
        }
        let n = coords.len() / 2;
        if n < 3 {
            return Err(GeomError::InvalidCount {
                op: "triangulate",
                required: 3,
                actual: n,
            });
        }
        let tol = cfg.tolerance;
        reject_coincident_sites(coords, n, tol)?;

        // Working site list: the input plus three super-triangle vertices
        // spanning a wide margin around the bounding box.
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for site in coords.chunks_exact(2) {
            min_x = min_x.min(site[0]);
            max_x = max_x.max(site[0]);
            min_y = min_y.min(site[1]);
            max_y = max_y.max(site[1]);
        }
        let span = (max_x - min_x).max(max_y - min_y);
        let delta = if span > tol { span * 10.0 } else { 1.0 };

        let mut work = coords.to_vec();
        work.extend_from_slice(&[
            min_x - delta,
            min_y - delta,
            min_x + (max_x - min_x) * 0.5,
            max_y + delta,
            max_x + delta,
            min_y - delta,
        ]);
        // counter-clockwise super-triangle: left-bottom, right-bottom, apex
        let mut triangles: Vec<[usize; 3]> = vec![[n, n + 2, n + 1]];

        for i in 0..n {
            let site = [work[i * 2], work[i * 2 + 1]];

            let bad: Vec<usize> = (0..triangles.len())
                .filter(|&t| in_circumcircle(&work, triangles[t], site, tol))
                .collect();
            if bad.is_empty() {
                return Err(GeomError::AlgorithmFailure {
                    op: "triangulate",
                    context: format!("site {} falls in no circumcircle", i),
                });
            }

            // Cavity boundary: directed edges used by exactly one bad
            // triangle. Keeping the direction keeps the fan counter-clockwise.
            let mut edge_count: HashMap<(usize, usize), usize> = HashMap::new();
            for &t in &bad {
                let tri = triangles[t];
                for e in 0..3 {
                    let a = tri[e];
                    let b = tri[(e + 1) % 3];
                    let key = if a < b { (a, b) } else { (b, a) };
                    *edge_count.entry(key).or_insert(0) += 1;
                }
            }
            let mut boundary = Vec::new();
            for &t in &bad {
                let tri = triangles[t];
                for e in 0..3 {
                    let a = tri[e];
                    let b = tri[(e + 1) % 3];
                    let key = if a < b { (a, b) } else { (b, a) };
                    if edge_count[&key] == 1 {
                        boundary.push((a, b));
                    }
                }
            }

            let mut doomed = bad;
            doomed.sort_unstable_by(|x, y| y.cmp(x));
            for t in doomed {
                triangles.swap_remove(t);
            }
            for (a, b) in boundary {
                triangles.push([a, b, i]);
            }
        }

        // Drop everything still attached to the super-triangle, then any
        // zero-area triangle minted by a site collinear with a cavity edge
        triangles.retain(|t| t[0] < n && t[1] < n && t[2] < n);
        triangles.retain(|t| {
            let a = [work[t[0] * 2], work[t[0] * 2 + 1]];
            let b = [work[t[1] * 2], work[t[1] * 2 + 1]];
            let c = [work[t[2] * 2], work[t[2] * 2 + 1]];
            geometry::orient2d(a, b, c) > tol
        });
        if triangles.is_empty() {
            return Err(GeomError::DegenerateGeometry {
                op: "triangulate",
                context: "no triangle survives; sites may be collinear".to_string(),
            });
        }
        debug!(sites = n, triangles = triangles.len(), "triangulation complete");

        Ok(Triangulation {
            triangles,
            coords: coords.to_vec(),
            axis: None,
        })
    }

    /// Number of input sites.
    pub fn site_count(&self) -> usize {
        self.coords.len() / 2
    }

    /// Working-plane coordinates of site `i`.
    pub fn site(&self, i: usize) -> [f64; 2] {
        [self.coords[i * 2], self.coords[i * 2 + 1]]
    }

    /// Map a working-plane point back into 3D.
    ///
    /// Triangulations built from native 2D coordinates lift onto the z = 0
    /// plane.
    pub fn lift(&self, p: [f64; 2]) -> [f64; 3] {
        match self.axis {
            Some((Axis::X, level)) => [level, p[0], p[1]],
            Some((Axis::Y, level)) => [p[0], level, p[1]],
            Some((Axis::Z, level)) => [p[0], p[1], level],
            None => [p[0], p[1], 0.0],
        }
    }
}

fn reject_coincident_sites(coords: &[f64], n: usize, tol: f64) -> GeomResult<()> {
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        coords[a * 2]
            .partial_cmp(&coords[b * 2])
            .unwrap_or(Ordering::Equal)
            .then(
                coords[a * 2 + 1]
                    .partial_cmp(&coords[b * 2 + 1])
                    .unwrap_or(Ordering::Equal),
            )
    });
    for pair in order.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if (coords[a * 2] - coords[b * 2]).abs() <= tol
            && (coords[a * 2 + 1] - coords[b * 2 + 1]).abs() <= tol
        {
            return Err(GeomError::DegenerateGeometry {
                op: "triangulate",
                context: format!("sites {} and {} coincide", a.min(b), a.max(b)),
            });
        }
    }
    Ok(())
}

/// Whether `site` lies strictly inside the circumcircle of `tri`.
///
/// The orientation is checked first: the determinant test is meaningless for
/// a collinear triangle, and its sign flips with the winding.
fn in_circumcircle(work: &[f64], tri: [usize; 3], site: [f64; 2], tol: f64) -> bool {
    let a = [work[tri[0] * 2], work[tri[0] * 2 + 1]];
    let b = [work[tri[1] * 2], work[tri[1] * 2 + 1]];
    let c = [work[tri[2] * 2], work[tri[2] * 2 + 1]];

    let orientation = geometry::orient2d(a, b, c);
    if orientation.abs() <= tol {
        return false;
    }

    let ax = a[0] - site[0];
    let ay = a[1] - site[1];
    let bx = b[0] - site[0];
    let by = b[1] - site[1];
    let cx = c[0] - site[0];
    let cy = c[1] - site[1];
    let a_sq = ax * ax + ay * ay;
    let b_sq = bx * bx + by * by;
    let c_sq = cx * cx + cy * cy;

    let det = ax * (by * c_sq - cy * b_sq) + bx * (cy * a_sq - ay * c_sq)
        + cx * (ay * b_sq - by * a_sq);

    if orientation > 0.0 {
        det > tol
    } else {
        det < -tol
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn triangle_of_three_sites() {
        let coords = [0.0, 0.0, 4.0, 0.0, 0.0, 3.0];
        let tri = Triangulation::from_plane(&coords, &GeomConfig::default()).unwrap();
        assert_eq!(tri.triangles.len(), 1);
        let mut vertices = tri.triangles[0].to_vec();
        vertices.sort_unstable();
        assert_eq!(vertices, vec![0, 1, 2]);
    }

    #[test]
    fn unit_square_with_center_gives_four_triangles() {
        let coords = [
            0.0, 0.0, //
            1.0, 0.0, //
            1.0, 1.0, //
            0.0, 1.0, //
            0.5, 0.5,
        ];
        let tri = Triangulation::from_plane(&coords, &GeomConfig::default()).unwrap();
        assert_eq!(tri.triangles.len(), 4);
        // every triangle uses the center site
        for t in &tri.triangles {
            assert!(t.contains(&4), "triangle {:?} skips the center", t);
        }
    }

    #[test]
    fn triangles_wind_counter_clockwise() {
        let mut rng = rand::thread_rng();
        let coords: Vec<f64> = (0..60).map(|_| rng.gen_range(0.0..10.0)).collect();
        let tri = Triangulation::from_plane(&coords, &GeomConfig::default()).unwrap();
        for t in &tri.triangles {
            let orientation = geometry::orient2d(tri.site(t[0]), tri.site(t[1]), tri.site(t[2]));
            assert!(orientation > 0.0, "triangle {:?} winds clockwise", t);
        }
    }

    #[test]
    fn circumcircles_are_empty() {
        let mut rng = rand::thread_rng();
        let coords: Vec<f64> = (0..100).map(|_| rng.gen_range(-20.0..20.0)).collect();
        let cfg = GeomConfig::default();
        let tri = Triangulation::from_plane(&coords, &cfg).unwrap();

        let work = coords.clone();
        for t in &tri.triangles {
            for s in 0..coords.len() / 2 {
                if t.contains(&s) {
                    continue;
                }
                assert!(
                    !in_circumcircle(&work, *t, [coords[s * 2], coords[s * 2 + 1]], cfg.tolerance),
                    "site {} violates the empty circumcircle of {:?}",
                    s,
                    t
                );
            }
        }
    }

    #[test]
    fn planar_3d_input_round_trips_through_lift() {
        let points = [
            2.0, 0.0, 0.0, //
            2.0, 3.0, 0.0, //
            2.0, 0.0, 3.0, //
            2.0, 3.0, 3.0,
        ];
        let tri = Triangulation::new(&points, Axis::X, &GeomConfig::default()).unwrap();
        assert_eq!(tri.triangles.len(), 2);
        let lifted = tri.lift(tri.site(0));
        assert_eq!(lifted, [2.0, 0.0, 0.0]);
    }

    #[test]
    fn rejects_degenerate_sites() {
        let collinear = [0.0, 0.0, 1.0, 1.0, 2.0, 2.0, 3.0, 3.0];
        let err = Triangulation::from_plane(&collinear, &GeomConfig::default()).unwrap_err();
        assert_eq!(err.code(), "degenerate_geometry");

        let coincident = [0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 1.0];
        let err = Triangulation::from_plane(&coincident, &GeomConfig::default()).unwrap_err();
        assert_eq!(err.code(), "degenerate_geometry");

        let off_plane = [0.0, 0.0, 0.0, 1.0, 0.0, 0.5, 0.0, 1.0, 0.0];
        let err = Triangulation::new(&off_plane, Axis::Z, &GeomConfig::default()).unwrap_err();
        assert_eq!(err.code(), "degenerate_geometry");
    }
}
