use std::cmp::Ordering;

use crate::config::GeomConfig;
use crate::error::{GeomError, GeomResult};
use crate::geometry;

/// The world axis a planar point set is constant along.
///
/// Planar operations take 3D input that lies in an axis-aligned plane; the
/// axis names the fixed coordinate and the remaining two become the working
/// plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Offset of the fixed coordinate within a point.
    pub(crate) fn fixed(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Offsets of the two in-plane coordinates, in (u, v) order.
    pub(crate) fn plane(self) -> (usize, usize) {
        match self {
            Axis::X => (1, 2),
            Axis::Y => (0, 2),
            Axis::Z => (0, 1),
        }
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

/// Project a coplanar 3D point set onto the plane fixed along `axis`.
///
/// Errors when any point strays further than `tolerance` from the plane of
/// the first point.
pub(crate) fn project_to_plane(
    op: &'static str,
    points: &[f64],
    count: usize,
    axis: Axis,
    tolerance: f64,
) -> GeomResult<Vec<[f64; 2]>> {
    let fixed = axis.fixed();
    let level = points[fixed];
    for i in 1..count {
        let off = points[i * 3 + fixed] - level;
        if off.abs() > tolerance {
            return Err(GeomError::DegenerateGeometry {
                op,
                context: format!("point {} is {:.3e} off the {} plane", i, off, axis.name()),
            });
        }
    }
    let (u, v) = axis.plane();
    Ok((0..count)
        .map(|i| [points[i * 3 + u], points[i * 3 + v]])
        .collect())
}

/// 2D convex hull of a point set coplanar along `axis`.
///
/// Uses the monotone chain construction: points sorted lexicographically,
/// then a lower and an upper chain swept with non-left turns popped. Returns
/// hull point indices in counter-clockwise order around the plane.
/// Collinear input cannot bound an area and is rejected as degenerate.
pub fn convex_hull_2d(points: &[f64], axis: Axis, cfg: &GeomConfig) -> GeomResult<Vec<usize>> {
    let count = geometry::checked_count("convex_hull_2d", points)?;
    if count < 3 {
        return Err(GeomError::InvalidCount {
            op: "convex_hull_2d",
            required: 3,
            actual: count,
        });
    }
    let planar = project_to_plane("convex_hull_2d", points, count, axis, cfg.tolerance)?;
    hull_of_plane(&planar, cfg.tolerance)
}

/// Monotone chain over already-projected 2D points.
pub(crate) fn hull_of_plane(planar: &[[f64; 2]], tolerance: f64) -> GeomResult<Vec<usize>> {
    let mut order: Vec<usize> = (0..planar.len()).collect();
    order.sort_by(|&a, &b| {
        planar[a][0]
            .partial_cmp(&planar[b][0])
            .unwrap_or(Ordering::Equal)
            .then(
                planar[a][1]
                    .partial_cmp(&planar[b][1])
                    .unwrap_or(Ordering::Equal),
            )
    });

    let mut lower: Vec<usize> = Vec::new();
    for &i in &order {
        while lower.len() >= 2 {
            let turn = geometry::orient2d(
                planar[lower[lower.len() - 2]],
                planar[lower[lower.len() - 1]],
                planar[i],
            );
            if turn <= tolerance {
                lower.pop();
            } else {
                break;
            }
        }
        lower.push(i);
    }

    let mut upper: Vec<usize> = Vec::new();
    for &i in order.iter().rev() {
        while upper.len() >= 2 {
            let turn = geometry::orient2d(
                planar[upper[upper.len() - 2]],
                planar[upper[upper.len() - 1]],
                planar[i],
            );
            if turn <= tolerance {
                upper.pop();
            } else {
                break;
            }
        }
        upper.push(i);
    }

    // each chain ends on the first point of the other
    lower.pop();
    upper.pop();
    lower.extend(upper);

    if lower.len() < 3 {
        return Err(GeomError::DegenerateGeometry {
            op: "convex_hull_2d",
            context: "points are collinear".to_string(),
        });
    }
    Ok(lower)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn unit_square_hull_is_the_four_corners() {
        let points = [
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            1.0, 1.0, 0.0, //
            0.0, 1.0, 0.0, //
            0.5, 0.5, 0.0, // interior
        ];
        let hull = convex_hull_2d(&points, Axis::Z, &GeomConfig::default()).unwrap();
        assert_eq!(hull.len(), 4);
        assert!(!hull.contains(&4), "interior point on hull: {:?}", hull);

        // counter-clockwise: positive signed area
        let mut area = 0.0;
        for e in 0..hull.len() {
            let a = &points[hull[e] * 3..];
            let b = &points[hull[(e + 1) % hull.len()] * 3..];
            area += a[0] * b[1] - b[0] * a[1];
        }
        assert!(area > 0.0, "hull is not counter-clockwise");
    }

    #[test]
    fn hull_contains_every_input_point() {
        let mut rng = rand::thread_rng();
        let mut points = Vec::new();
        for _ in 0..120 {
            points.push(rng.gen_range(-10.0..10.0));
            points.push(rng.gen_range(-10.0..10.0));
            points.push(0.0);
        }
        let cfg = GeomConfig::default();
        let hull = convex_hull_2d(&points, Axis::Z, &cfg).unwrap();

        // every point is on the left of (or on) every CCW hull edge
        for i in 0..points.len() / 3 {
            let p = [points[i * 3], points[i * 3 + 1]];
            for e in 0..hull.len() {
                let a = hull[e] * 3;
                let b = hull[(e + 1) % hull.len()] * 3;
                let turn = geometry::orient2d(
                    [points[a], points[a + 1]],
                    [points[b], points[b + 1]],
                    p,
                );
                assert!(turn >= -1e-9, "point {} outside hull edge {}", i, e);
            }
        }
    }

    #[test]
    fn works_in_any_axis_plane() {
        let points = [
            3.0, 0.0, 0.0, //
            3.0, 2.0, 0.0, //
            3.0, 0.0, 2.0, //
            3.0, 2.0, 2.0, //
            3.0, 1.0, 1.0,
        ];
        let hull = convex_hull_2d(&points, Axis::X, &GeomConfig::default()).unwrap();
        assert_eq!(hull.len(), 4);
    }

    #[test]
    fn rejects_degenerate_input() {
        let collinear = [0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 2.0, 2.0, 0.0];
        let err = convex_hull_2d(&collinear, Axis::Z, &GeomConfig::default()).unwrap_err();
        assert_eq!(err.code(), "degenerate_geometry");

        let off_plane = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.5];
        let err = convex_hull_2d(&off_plane, Axis::Z, &GeomConfig::default()).unwrap_err();
        assert_eq!(err.code(), "degenerate_geometry");

        let too_few = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0];
        let err = convex_hull_2d(&too_few, Axis::Z, &GeomConfig::default()).unwrap_err();
        assert_eq!(err.code(), "invalid_count");
    }
}
