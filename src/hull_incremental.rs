use std::collections::HashMap;

use tracing::debug;

use crate::config::GeomConfig;
use crate::error::{GeomError, GeomResult};
use crate::geometry::{self, cross, dist_sq, dot, norm, norm_sq, point3, scale, sub};

/// 3D convex hull by incremental insertion.
///
/// Seeds a tetrahedron from extreme points, then inserts each remaining
/// point once: every face whose plane the point lies strictly above is
/// removed, and the horizon edges left behind are fanned to the point.
/// Faces come back as vertex-index triples wound counter-clockwise seen
/// from outside.
///
/// Inputs that never span a volume (coincident, collinear, or coplanar
/// sets) fail with `DegenerateGeometry` from the seeding step.
pub fn convex_hull_3d(points: &[f64], cfg: &GeomConfig) -> GeomResult<Vec<[usize; 3]>> {
    let count = geometry::checked_count("convex_hull_3d", points)?;
    let tol = cfg.tolerance;

    let [a, b, c, d] = seed_tetrahedron(points, count, tol)?;

    // Wind the seed faces outward from the tetrahedron centroid. Every
    // later face inherits its winding from a horizon edge, so this is the
    // only orientation fix the algorithm needs.
    let centroid = scale(
        [
            points[a * 3] + points[b * 3] + points[c * 3] + points[d * 3],
            points[a * 3 + 1] + points[b * 3 + 1] + points[c * 3 + 1] + points[d * 3 + 1],
            points[a * 3 + 2] + points[b * 3 + 2] + points[c * 3 + 2] + points[d * 3 + 2],
        ],
        0.25,
    );
    let mut faces: Vec<[usize; 3]> = vec![[a, b, c], [a, b, d], [a, c, d], [b, c, d]];
    for face in &mut faces {
        let base = point3(points, face[0]);
        let normal = cross(
            sub(point3(points, face[1]), base),
            sub(point3(points, face[2]), base),
        );
        if dot(normal, sub(centroid, base)) > 0.0 {
            face.swap(1, 2);
        }
    }

    for p in 0..count {
        if p == a || p == b || p == c || p == d {
            continue;
        }
        let pos = point3(points, p);

        let visible: Vec<usize> = (0..faces.len())
            .filter(|&f| plane_distance(points, faces[f], pos) > tol)
            .collect();
        if visible.is_empty() {
            continue;
        }

        let horizon = horizon_edges(&faces, &visible);
        if horizon.is_empty() {
            return Err(GeomError::AlgorithmFailure {
                op: "convex_hull_3d",
                context: format!("point {} sees faces but no horizon", p),
            });
        }

        // remove visible faces highest index first so the indices stay valid
        let mut doomed = visible;
        doomed.sort_unstable_by(|x, y| y.cmp(x));
        for f in doomed {
            faces.swap_remove(f);
        }

        // Each horizon edge keeps the direction it had in its removed face,
        // which pairs it with the surviving neighbor and keeps the mesh
        // consistently wound.
        for (ea, eb) in horizon {
            faces.push([ea, eb, p]);
        }
    }

    debug!(count, faces = faces.len(), "convex hull complete");
    Ok(faces)
}

/// Signed distance from `p` to the plane of `face`, positive on the side the
/// face normal points to.
fn plane_distance(points: &[f64], face: [usize; 3], p: [f64; 3]) -> f64 {
    let base = point3(points, face[0]);
    let normal = cross(
        sub(point3(points, face[1]), base),
        sub(point3(points, face[2]), base),
    );
    let len = norm(normal);
    if len <= f64::EPSILON {
        return 0.0;
    }
    dot(scale(normal, 1.0 / len), sub(p, base))
}

/// Directed edges of `visible` faces whose undirected twin belongs to a face
/// outside the visible set.
fn horizon_edges(faces: &[[usize; 3]], visible: &[usize]) -> Vec<(usize, usize)> {
    let mut edge_count: HashMap<(usize, usize), usize> = HashMap::new();
    for &f in visible {
        let face = faces[f];
        for e in 0..3 {
            let a = face[e];
            let b = face[(e + 1) % 3];
            let key = if a < b { (a, b) } else { (b, a) };
            *edge_count.entry(key).or_insert(0) += 1;
        }
    }

    let mut horizon = Vec::new();
    for &f in visible {
        let face = faces[f];
        for e in 0..3 {
            let a = face[e];
            let b = face[(e + 1) % 3];
            let key = if a < b { (a, b) } else { (b, a) };
            if edge_count[&key] == 1 {
                horizon.push((a, b));
            }
        }
    }
    horizon
}

/// Pick four points spanning a volume: the farthest point from the first,
/// then the one maximizing triangle area, then the one maximizing
/// tetrahedron volume. Each step failing to clear the tolerance names the
/// degeneracy it found.
fn seed_tetrahedron(points: &[f64], count: usize, tol: f64) -> GeomResult<[usize; 4]> {
    let a = 0;
    let pa = point3(points, a);

    let mut b = a;
    let mut best = 0.0;
    for i in 0..count {
        let d = dist_sq(point3(points, i), pa);
        if d > best {
            best = d;
            b = i;
        }
    }
    if best.sqrt() <= tol {
        return Err(GeomError::DegenerateGeometry {
            op: "convex_hull_3d",
            context: "all points coincide".to_string(),
        });
    }

    let ab = sub(point3(points, b), pa);
    let mut c = a;
    let mut best = 0.0;
    for i in 0..count {
        let area = norm_sq(cross(ab, sub(point3(points, i), pa)));
        if area > best {
            best = area;
            c = i;
        }
    }
    if best.sqrt() <= tol {
        return Err(GeomError::DegenerateGeometry {
            op: "convex_hull_3d",
            context: "points are collinear".to_string(),
        });
    }

    let normal = cross(ab, sub(point3(points, c), pa));
    let mut d = a;
    let mut best = 0.0f64;
    for i in 0..count {
        let volume = dot(normal, sub(point3(points, i), pa)).abs();
        if volume > best {
            best = volume;
            d = i;
        }
    }
    if best <= tol {
        return Err(GeomError::DegenerateGeometry {
            op: "convex_hull_3d",
            context: "points are coplanar".to_string(),
        });
    }

    Ok([a, b, c, d])
}
