use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, Weak};

use rayon::prelude::*;
use tracing::{debug, trace};

use crate::bounds::BoundingBox;
use crate::error::{GeomError, GeomResult};
use crate::geometry;
use crate::kdtree::{SourceKind, SpatialTree};

/// A query region, closed over the supported shapes.
#[derive(Clone, Copy, Debug)]
pub enum SearchRegion {
    /// Everything whose center lies within `radius` of `center`.
    Sphere { center: [f64; 3], radius: f64 },
    /// Everything whose center lies inside an axis-aligned box.
    Box(BoundingBox),
}

/// All elements of `tree` inside `region`, expanded by `tolerance`.
///
/// Results are exact for the expanded region and come back sorted ascending
/// by element index.
pub fn range_query(
    tree: &SpatialTree,
    region: &SearchRegion,
    tolerance: f64,
) -> GeomResult<Vec<usize>> {
    let mut hits = Vec::new();
    match *region {
        SearchRegion::Sphere { center, radius } => {
            if radius <= 0.0 {
                return Err(GeomError::InvalidParameter {
                    op: "range_query",
                    name: "radius",
                    value: radius,
                    reason: "must be positive",
                });
            }
            tree.visit_sphere(center, radius + tolerance, &mut |i| hits.push(i));
        }
        SearchRegion::Box(region) => {
            tree.visit_box(&region, tolerance, &mut |i| hits.push(i));
        }
    }
    hits.sort_unstable();
    Ok(hits)
}

/// For each needle, the indices of the `k` elements of `tree` nearest to it,
/// ordered closest first.
///
/// `needles` is a flat xyz slice. Asking for more neighbors than the tree
/// holds returns every element rather than failing.
pub fn k_nearest(tree: &SpatialTree, needles: &[f64], k: usize) -> GeomResult<Vec<Vec<usize>>> {
    if k == 0 {
        return Err(GeomError::InvalidParameter {
            op: "k_nearest",
            name: "k",
            value: 0.0,
            reason: "must be positive",
        });
    }
    if needles.len() % 3 != 0 {
        return Err(GeomError::InvalidParameter {
            op: "k_nearest",
            name: "needles",
            value: needles.len() as f64,
            reason: "length must be a multiple of 3",
        });
    }
    let needle_count = needles.len() / 3;
    let k = k.min(tree.count());

    let results = (0..needle_count)
        .into_par_iter()
        .map(|n| {
            let needle = geometry::point3(needles, n);
            tree.nearest_iter(needle).take(k).map(|(i, _)| i).collect()
        })
        .collect();
    Ok(results)
}

/// The `k` nearest elements of `tree` to a single needle.
pub fn k_nearest_one(tree: &SpatialTree, needle: [f64; 3], k: usize) -> GeomResult<Vec<usize>> {
    let mut all = k_nearest(tree, &needle, k)?;
    Ok(all.pop().unwrap_or_default())
}

/// For each needle, all elements of `tree` within `distance` of it, sorted
/// ascending by element index.
pub fn within_distance(
    tree: &SpatialTree,
    needles: &[f64],
    distance: f64,
    tolerance: f64,
) -> GeomResult<Vec<Vec<usize>>> {
    if distance <= 0.0 {
        return Err(GeomError::InvalidParameter {
            op: "within_distance",
            name: "distance",
            value: distance,
            reason: "must be positive",
        });
    }
    if needles.len() % 3 != 0 {
        return Err(GeomError::InvalidParameter {
            op: "within_distance",
            name: "needles",
            value: needles.len() as f64,
            reason: "length must be a multiple of 3",
        });
    }
    let needle_count = needles.len() / 3;
    let radius = distance + tolerance;

    let results = (0..needle_count)
        .into_par_iter()
        .map(|n| {
            let needle = geometry::point3(needles, n);
            let mut hits = Vec::new();
            tree.visit_sphere(needle, radius, &mut |i| hits.push(i));
            hits.sort_unstable();
            hits
        })
        .collect();
    Ok(results)
}

/// All elements of `tree` within `distance` of a single needle.
pub fn within_distance_one(
    tree: &SpatialTree,
    needle: [f64; 3],
    distance: f64,
    tolerance: f64,
) -> GeomResult<Vec<usize>> {
    let mut all = within_distance(tree, &needle, distance, tolerance)?;
    Ok(all.pop().unwrap_or_default())
}

/// Index pairs `(i, j)` of elements of `a` and `b` that overlap within
/// `tolerance`, sorted ascending.
///
/// Point sources pair when centers coincide within `tolerance`; box sources
/// pair when their bounding spheres intersect after expansion. Mixing the
/// two kinds has no defined overlap semantics and is rejected.
pub fn overlap_query(
    a: &SpatialTree,
    b: &SpatialTree,
    tolerance: f64,
) -> GeomResult<Vec<(usize, usize)>> {
    if tolerance < 0.0 {
        return Err(GeomError::InvalidParameter {
            op: "overlap_query",
            name: "tolerance",
            value: tolerance,
            reason: "must not be negative",
        });
    }

    let mut pairs: Vec<(usize, usize)> = match (a.kind(), b.kind()) {
        (SourceKind::Points, SourceKind::Points) => (0..a.count())
            .into_par_iter()
            .map(|i| {
                let center = a.center(i);
                let mut local = Vec::new();
                b.visit_sphere(center, tolerance, &mut |j| local.push((i, j)));
                local
            })
            .flatten()
            .collect(),
        (SourceKind::Boxes, SourceKind::Boxes) => {
            // Candidate centers must lie within the sum of both bounding
            // radii; search with b's largest radius, then test exactly.
            let reach = b.max_radius() + tolerance;
            (0..a.count())
                .into_par_iter()
                .map(|i| {
                    let center = a.center(i);
                    let search = a.radius_of(i) + reach;
                    let mut local = Vec::new();
                    b.visit_sphere(center, search, &mut |j| {
                        let limit = a.radius_of(i) + b.radius_of(j) + tolerance;
                        if geometry::dist_sq(center, b.center(j)) <= limit * limit {
                            local.push((i, j));
                        }
                    });
                    local
                })
                .flatten()
                .collect()
        }
        (sa, sb) => {
            return Err(GeomError::UnsupportedCombination {
                source: sa.name(),
                query: sb.name(),
            });
        }
    };

    pairs.sort_unstable();
    debug!(
        left = a.count(),
        right = b.count(),
        pairs = pairs.len(),
        "overlap query complete"
    );
    Ok(pairs)
}

/// Thread-safe get-or-build cache of spatial trees, keyed by caller-stable
/// element-collection handles.
///
/// Entries hold weak references only: a tree lives exactly as long as some
/// caller keeps its `Arc`, so dropping every user of a collection releases
/// its index without any explicit invalidation call. [`TreeCache::purge`]
/// reclaims the dead slots.
pub struct TreeCache {
    trees: RwLock<HashMap<u64, Weak<SpatialTree>>>,
}

impl TreeCache {
    pub fn new() -> Self {
        TreeCache {
            trees: RwLock::new(HashMap::new()),
        }
    }

    /// Fetch the tree for `handle`, building it with `build` on a miss.
    ///
    /// Lookups take the read lock only; a miss upgrades to the write lock,
    /// re-checks, and builds while holding it, so each handle is built once.
    pub fn get_or_build<F>(&self, handle: u64, build: F) -> GeomResult<Arc<SpatialTree>>
    where
        F: FnOnce() -> GeomResult<SpatialTree>,
    {
        {
            let trees = self.trees.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(tree) = trees.get(&handle).and_then(Weak::upgrade) {
                trace!(handle, "spatial tree cache hit");
                return Ok(tree);
            }
        }

        let mut trees = self.trees.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(tree) = trees.get(&handle).and_then(Weak::upgrade) {
            return Ok(tree);
        }
        let built = Arc::new(build()?);
        trees.insert(handle, Arc::downgrade(&built));
        debug!(handle, count = built.count(), "spatial tree built and cached");
        Ok(built)
    }

    /// Drop entries whose trees no longer have any strong reference.
    pub fn purge(&self) {
        let mut trees = self.trees.write().unwrap_or_else(PoisonError::into_inner);
        trees.retain(|_, weak| weak.strong_count() > 0);
    }

    /// Number of entries, live or dead.
    pub fn len(&self) -> usize {
        self.trees
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TreeCache {
    fn default() -> Self {
        TreeCache::new()
    }
}
