use crate::error::{GeomError, GeomResult};
use crate::geometry;

/// One cluster: a centroid plus member indices with their distances to it.
///
/// `members` and `distances` run in parallel and members are sorted
/// ascending by index.
#[derive(Clone, Debug)]
pub struct Cluster {
    pub centroid: [f64; 3],
    pub members: Vec<usize>,
    pub distances: Vec<f64>,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Largest member distance to the centroid; zero for an empty cluster.
    pub fn radius(&self) -> f64 {
        self.distances.iter().fold(0.0f64, |acc, &d| acc.max(d))
    }
}

/// Result of a clustering run.
///
/// Partition methods (k-means, single linkage) assign every point and leave
/// `noise` empty; density clustering may leave low-density points there.
#[derive(Clone, Debug, Default)]
pub struct Clustering {
    pub clusters: Vec<Cluster>,
    pub noise: Vec<usize>,
}

impl Clustering {
    /// Per-point cluster id for a collection of `count` points; `None` marks
    /// noise.
    pub fn assignment(&self, count: usize) -> Vec<Option<usize>> {
        let mut labels = vec![None; count];
        for (id, cluster) in self.clusters.iter().enumerate() {
            for &member in &cluster.members {
                labels[member] = Some(id);
            }
        }
        labels
    }

    /// Sum of squared member distances to their centroids.
    pub fn inertia(&self) -> f64 {
        self.clusters
            .iter()
            .flat_map(|c| c.distances.iter())
            .map(|d| d * d)
            .sum()
    }
}

/// Assemble a [`Clustering`] from per-cluster member lists.
///
/// `centroids` supplies precomputed centroids (k-means reports its converged
/// ones); when absent each centroid is the member mean. Empty clusters are
/// kept so the caller always gets back exactly as many clusters as it asked
/// for.
pub(crate) fn assemble(
    points: &[f64],
    members: Vec<Vec<usize>>,
    centroids: Option<Vec<[f64; 3]>>,
    noise: Vec<usize>,
) -> Clustering {
    let clusters = members
        .into_iter()
        .enumerate()
        .map(|(id, members)| {
            let centroid = match &centroids {
                Some(preset) => preset[id],
                None => mean_of(points, &members),
            };
            let distances = members
                .iter()
                .map(|&m| geometry::dist(geometry::point3(points, m), centroid))
                .collect();
            Cluster {
                centroid,
                members,
                distances,
            }
        })
        .collect();
    Clustering { clusters, noise }
}

fn mean_of(points: &[f64], members: &[usize]) -> [f64; 3] {
    if members.is_empty() {
        return [0.0; 3];
    }
    let mut sum = [0.0; 3];
    for &m in members {
        sum = geometry::add(sum, geometry::point3(points, m));
    }
    geometry::scale(sum, 1.0 / members.len() as f64)
}

pub(crate) fn validate_k(op: &'static str, k: usize, count: usize) -> GeomResult<()> {
    if k == 0 {
        return Err(GeomError::InvalidParameter {
            op,
            name: "k",
            value: 0.0,
            reason: "must be positive",
        });
    }
    if k > count {
        return Err(GeomError::InvalidParameter {
            op,
            name: "k",
            value: k as f64,
            reason: "exceeds the point count",
        });
    }
    Ok(())
}

pub(crate) fn validate_positive(op: &'static str, name: &'static str, value: f64) -> GeomResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(GeomError::InvalidParameter {
            op,
            name,
            value,
            reason: "must be positive and finite",
        });
    }
    Ok(())
}
