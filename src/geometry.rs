//! Vector arithmetic over flat coordinate slices.
//!
//! Point sets everywhere in the crate are flat `&[f64]` slices holding three
//! coordinates per point. These helpers keep the component arithmetic in one
//! place so the engines read as geometry instead of index juggling.

use crate::error::{GeomError, GeomResult};

/// Validate a flat xyz slice and return its point count.
///
/// Rejects slices whose length is not a multiple of three (partial points are
/// never silently truncated) and empty slices.
pub fn checked_count(op: &'static str, points: &[f64]) -> GeomResult<usize> {
    if points.len() % 3 != 0 {
        return Err(GeomError::InvalidParameter {
            op,
            name: "points",
            value: points.len() as f64,
            reason: "length must be a multiple of 3",
        });
    }
    let count = points.len() / 3;
    if count == 0 {
        return Err(GeomError::InvalidCount {
            op,
            required: 1,
            actual: 0,
        });
    }
    Ok(count)
}

/// Point `i` of a flat xyz slice.
#[inline]
pub fn point3(points: &[f64], i: usize) -> [f64; 3] {
    [points[i * 3], points[i * 3 + 1], points[i * 3 + 2]]
}

#[inline]
pub fn add(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline]
pub fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub fn scale(a: [f64; 3], s: f64) -> [f64; 3] {
    [a[0] * s, a[1] * s, a[2] * s]
}

#[inline]
pub fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
pub fn norm_sq(a: [f64; 3]) -> f64 {
    dot(a, a)
}

#[inline]
pub fn norm(a: [f64; 3]) -> f64 {
    norm_sq(a).sqrt()
}

#[inline]
pub fn dist_sq(a: [f64; 3], b: [f64; 3]) -> f64 {
    norm_sq(sub(a, b))
}

#[inline]
pub fn dist(a: [f64; 3], b: [f64; 3]) -> f64 {
    dist_sq(a, b).sqrt()
}

/// Twice the signed area of the 2D triangle (a, b, c).
///
/// Positive when the triangle winds counter-clockwise, near zero when the
/// points are collinear.
#[inline]
pub fn orient2d(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

#[inline]
pub fn dist_sq_2d(a: [f64; 2], b: [f64; 2]) -> f64 {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    dx * dx + dy * dy
}

#[inline]
pub fn dist_2d(a: [f64; 2], b: [f64; 2]) -> f64 {
    dist_sq_2d(a, b).sqrt()
}
