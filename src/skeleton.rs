use tracing::debug;

use crate::config::GeomConfig;
use crate::delaunay::Triangulation;
use crate::error::{GeomError, GeomResult};
use crate::geometry::{self, add, cross, dot, norm, scale, sub};
use crate::voronoi;

/// One approximate medial-axis segment, lifted back into 3D.
#[derive(Clone, Copy, Debug)]
pub struct SkeletonSegment {
    pub a: [f64; 3],
    pub b: [f64; 3],
    /// Distance from the segment midpoint to the nearest boundary point.
    /// Larger values mark segments deep inside the shape; tiny values mark
    /// noise from the sampled approximation.
    pub stability: f64,
}

/// Approximate medial axis of a closed planar boundary loop.
///
/// `boundary` is an ordered loop of 3D vertices; the closing edge back to
/// the first vertex is implicit and a duplicated closing vertex is dropped.
/// The loop may sit in any plane, but must be planar within the configured
/// tolerance.
///
/// The approximation samples the boundary at uniform arc-length steps,
/// builds the Voronoi diagram of the samples, and keeps the Voronoi edges
/// whose midpoint lies inside the loop: those edges converge on the true
/// medial axis as the sampling densifies. The sample count is
/// `perimeter / tolerance` clamped to the configured range.
pub fn medial_axis(boundary: &[f64], cfg: &GeomConfig) -> GeomResult<Vec<SkeletonSegment>> {
    let mut count = geometry::checked_count("medial_axis", boundary)?;
    if count > 1
        && geometry::dist(
            geometry::point3(boundary, 0),
            geometry::point3(boundary, count - 1),
        ) <= cfg.tolerance
    {
        count -= 1;
    }
    if count < 3 {
        return Err(GeomError::InvalidCount {
            op: "medial_axis",
            required: 3,
            actual: count,
        });
    }

    let frame = fit_plane(boundary, count, cfg)?;
    let loop2: Vec<[f64; 2]> = (0..count)
        .map(|i| {
            let d = sub(geometry::point3(boundary, i), frame.origin);
            [dot(d, frame.u), dot(d, frame.v)]
        })
        .collect();

    let edge_lengths: Vec<f64> = (0..count)
        .map(|i| geometry::dist_2d(loop2[i], loop2[(i + 1) % count]))
        .collect();
    let perimeter: f64 = edge_lengths.iter().sum();
    if perimeter <= cfg.tolerance {
        return Err(GeomError::DegenerateGeometry {
            op: "medial_axis",
            context: "boundary has no length".to_string(),
        });
    }

    let samples =
        ((perimeter / cfg.tolerance) as usize).clamp(cfg.min_samples, cfg.max_samples);
    let sampled = sample_loop(&loop2, &edge_lengths, perimeter, samples);
    debug!(vertices = count, samples, perimeter, "boundary sampled");

    let flat: Vec<f64> = sampled.iter().flat_map(|p| [p[0], p[1]]).collect();
    let tri = Triangulation::from_plane(&flat, cfg)?;
    let cells = voronoi::voronoi(&tri, cfg)?;

    // Keep Voronoi edges that run inside the loop, dropping duplicates
    // (every interior edge is shared by two cells).
    let mut kept: Vec<([f64; 2], [f64; 2], f64)> = Vec::new();
    for cell in &cells {
        for (a, b) in cell.edges() {
            if geometry::dist_sq_2d(a, b) <= cfg.tolerance * cfg.tolerance {
                continue;
            }
            let mid = [(a[0] + b[0]) * 0.5, (a[1] + b[1]) * 0.5];
            let clearance = boundary_distance(&loop2, mid);
            if clearance <= cfg.tolerance || !inside_loop(&loop2, mid) {
                continue;
            }
            if kept
                .iter()
                .any(|&(ka, kb, _)| same_segment(ka, kb, a, b, cfg.tolerance))
            {
                continue;
            }
            kept.push((a, b, clearance));
        }
    }
    debug!(segments = kept.len(), "medial axis extracted");

    Ok(kept
        .into_iter()
        .map(|(a, b, stability)| SkeletonSegment {
            a: frame.lift(a),
            b: frame.lift(b),
            stability,
        })
        .collect())
}

struct PlaneFrame {
    origin: [f64; 3],
    u: [f64; 3],
    v: [f64; 3],
}

impl PlaneFrame {
    fn lift(&self, p: [f64; 2]) -> [f64; 3] {
        add(self.origin, add(scale(self.u, p[0]), scale(self.v, p[1])))
    }
}

/// Fit a plane through the loop with the Newell normal and build an
/// orthonormal in-plane frame.
fn fit_plane(boundary: &[f64], count: usize, cfg: &GeomConfig) -> GeomResult<PlaneFrame> {
    let mut normal = [0.0f64; 3];
    let mut origin = [0.0f64; 3];
    for i in 0..count {
        let p = geometry::point3(boundary, i);
        let q = geometry::point3(boundary, (i + 1) % count);
        normal[0] += (p[1] - q[1]) * (p[2] + q[2]);
        normal[1] += (p[2] - q[2]) * (p[0] + q[0]);
        normal[2] += (p[0] - q[0]) * (p[1] + q[1]);
        origin = add(origin, p);
    }
    origin = scale(origin, 1.0 / count as f64);

    let len = norm(normal);
    if len <= cfg.tolerance {
        return Err(GeomError::DegenerateGeometry {
            op: "medial_axis",
            context: "boundary encloses no area".to_string(),
        });
    }
    let normal = scale(normal, 1.0 / len);

    for i in 0..count {
        let off = dot(sub(geometry::point3(boundary, i), origin), normal);
        if off.abs() > cfg.tolerance {
            return Err(GeomError::NonPlanar {
                context: format!("vertex {} lies {:.3e} off the fitted plane", i, off),
            });
        }
    }

    // in-plane frame from the world axis least aligned with the normal
    let seed = if normal[0].abs() <= normal[1].abs() && normal[0].abs() <= normal[2].abs() {
        [1.0, 0.0, 0.0]
    } else if normal[1].abs() <= normal[2].abs() {
        [0.0, 1.0, 0.0]
    } else {
        [0.0, 0.0, 1.0]
    };
    let u_raw = cross(normal, seed);
    let u = scale(u_raw, 1.0 / norm(u_raw));
    let v = cross(normal, u);
    Ok(PlaneFrame { origin, u, v })
}

/// Resample the loop at `samples` uniform arc-length positions.
fn sample_loop(
    loop2: &[[f64; 2]],
    edge_lengths: &[f64],
    perimeter: f64,
    samples: usize,
) -> Vec<[f64; 2]> {
    let count = loop2.len();
    let step = perimeter / samples as f64;
    let mut result = Vec::with_capacity(samples);

    let mut edge = 0;
    let mut start = 0.0; // arc length where the current edge begins
    for k in 0..samples {
        let target = k as f64 * step;
        while edge + 1 < count && start + edge_lengths[edge] <= target {
            start += edge_lengths[edge];
            edge += 1;
        }
        let t = if edge_lengths[edge] > 0.0 {
            ((target - start) / edge_lengths[edge]).min(1.0)
        } else {
            0.0
        };
        let a = loop2[edge];
        let b = loop2[(edge + 1) % count];
        result.push([a[0] + (b[0] - a[0]) * t, a[1] + (b[1] - a[1]) * t]);
    }
    result
}

/// Even-odd ray cast along +x.
fn inside_loop(loop2: &[[f64; 2]], p: [f64; 2]) -> bool {
    let count = loop2.len();
    let mut inside = false;
    let mut j = count - 1;
    for i in 0..count {
        let a = loop2[i];
        let b = loop2[j];
        if (a[1] > p[1]) != (b[1] > p[1]) {
            let x = a[0] + (p[1] - a[1]) / (b[1] - a[1]) * (b[0] - a[0]);
            if p[0] < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Distance from `p` to the nearest point of the loop polyline.
fn boundary_distance(loop2: &[[f64; 2]], p: [f64; 2]) -> f64 {
    let count = loop2.len();
    let mut best = f64::INFINITY;
    for i in 0..count {
        let a = loop2[i];
        let b = loop2[(i + 1) % count];
        let ab = [b[0] - a[0], b[1] - a[1]];
        let ap = [p[0] - a[0], p[1] - a[1]];
        let len_sq = ab[0] * ab[0] + ab[1] * ab[1];
        let t = if len_sq > 0.0 {
            ((ap[0] * ab[0] + ap[1] * ab[1]) / len_sq).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let closest = [a[0] + ab[0] * t, a[1] + ab[1] * t];
        best = best.min(geometry::dist_sq_2d(p, closest));
    }
    best.sqrt()
}

fn same_segment(a0: [f64; 2], b0: [f64; 2], a1: [f64; 2], b1: [f64; 2], tol: f64) -> bool {
    let close = |p: [f64; 2], q: [f64; 2]| {
        (p[0] - q[0]).abs() <= tol && (p[1] - q[1]).abs() <= tol
    };
    (close(a0, a1) && close(b0, b1)) || (close(a0, b1) && close(b0, a1))
}
