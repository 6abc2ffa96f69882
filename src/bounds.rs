use crate::geometry;

/// An axis-aligned bounding box in 3D space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl BoundingBox {
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        BoundingBox { min, max }
    }

    /// The smallest box enclosing every point of a flat xyz slice.
    ///
    /// An empty slice yields an inverted box (min at +inf, max at -inf).
    pub fn from_points(points: &[f64]) -> Self {
        let mut min = [f64::INFINITY; 3];
        let mut max = [f64::NEG_INFINITY; 3];
        for p in points.chunks_exact(3) {
            for axis in 0..3 {
                if p[axis] < min[axis] {
                    min[axis] = p[axis];
                }
                if p[axis] > max[axis] {
                    max[axis] = p[axis];
                }
            }
        }
        BoundingBox { min, max }
    }

    pub fn center(&self) -> [f64; 3] {
        [
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
            (self.min[2] + self.max[2]) * 0.5,
        ]
    }

    /// Half the diagonal length: the radius of the sphere around the center
    /// that encloses the whole box.
    pub fn bounding_radius(&self) -> f64 {
        geometry::dist(self.min, self.max) * 0.5
    }

    /// Whether `point` lies inside the box expanded by `tolerance` on every
    /// side.
    pub fn contains(&self, point: [f64; 3], tolerance: f64) -> bool {
        for axis in 0..3 {
            if point[axis] < self.min[axis] - tolerance || point[axis] > self.max[axis] + tolerance {
                return false;
            }
        }
        true
    }

    /// Whether two boxes overlap once expanded by `tolerance`.
    pub fn overlaps(&self, other: &BoundingBox, tolerance: f64) -> bool {
        for axis in 0..3 {
            if self.min[axis] > other.max[axis] + tolerance
                || other.min[axis] > self.max[axis] + tolerance
            {
                return false;
            }
        }
        true
    }

    /// Squared distance from `point` to the box surface, zero inside.
    pub fn dist_sq_to(&self, point: [f64; 3]) -> f64 {
        let mut sum = 0.0;
        for axis in 0..3 {
            let d = (self.min[axis] - point[axis])
                .max(0.0)
                .max(point[axis] - self.max[axis]);
            sum += d * d;
        }
        sum
    }
}
