use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::bounds::BoundingBox;
use crate::error::{GeomError, GeomResult};
use crate::geometry;

/// Number of elements at which a subtree becomes a leaf.
const LEAF_SIZE: usize = 16;

/// The kind of element collection a tree was built over.
///
/// Queries that pair two trees check the kinds on both sides and refuse
/// pairings no strategy exists for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    /// Bare points; queries compare centers directly.
    Points,
    /// Axis-aligned boxes, indexed by center with a per-element bounding
    /// radius for overlap tests.
    Boxes,
}

impl SourceKind {
    pub(crate) fn name(self) -> &'static str {
        match self {
            SourceKind::Points => "points",
            SourceKind::Boxes => "boxes",
        }
    }
}

/// A collection a [`SpatialTree`] can be built over.
pub enum ElementSource<'a> {
    /// Flat xyz coordinates, three per element.
    Points(&'a [f64]),
    /// Axis-aligned element bounds; each element is indexed by its center.
    Boxes(&'a [BoundingBox]),
}

#[derive(Clone, Copy, Debug)]
struct KdNode {
    min: [f64; 3],
    max: [f64; 3],
    left: u32, // u32::MAX if leaf
    right: u32,
    // Leaf data: indices[start..end]
    start: u32,
    end: u32,
    // Internal node data
    split_val: f64,
    axis: u8,
}

/// Immutable spatial index over a fixed element set.
///
/// Built once per collection in O(n log n) and reusable for any number of
/// queries. The tree owns the derived center coordinates, so a cached tree
/// stays valid after the source collection is gone.
///
/// Nodes are stored in a flat vector; children are pushed before their
/// parent, so the root is the last node.
pub struct SpatialTree {
    nodes: Vec<KdNode>,
    indices: Vec<usize>,
    points: Vec<f64>,
    radii: Vec<f64>,
    max_radius: f64,
    kind: SourceKind,
}

impl SpatialTree {
    /// Build a tree over `source`.
    ///
    /// Point slices whose length is not a multiple of three and empty
    /// collections are rejected rather than truncated.
    pub fn build(source: ElementSource<'_>) -> GeomResult<SpatialTree> {
        let (points, radii, kind) = match source {
            ElementSource::Points(raw) => {
                geometry::checked_count("spatial_tree", raw)?;
                (raw.to_vec(), Vec::new(), SourceKind::Points)
            }
            ElementSource::Boxes(boxes) => {
                if boxes.is_empty() {
                    return Err(GeomError::InvalidCount {
                        op: "spatial_tree",
                        required: 1,
                        actual: 0,
                    });
                }
                let mut centers = Vec::with_capacity(boxes.len() * 3);
                let mut radii = Vec::with_capacity(boxes.len());
                for b in boxes {
                    centers.extend_from_slice(&b.center());
                    radii.push(b.bounding_radius());
                }
                (centers, radii, SourceKind::Boxes)
            }
        };

        let count = points.len() / 3;
        let max_radius = radii.iter().fold(0.0f64, |acc, &r| acc.max(r));
        let mut nodes = Vec::with_capacity(count / (LEAF_SIZE / 2) + 1);
        let mut indices: Vec<usize> = (0..count).collect();
        build_recursive(&mut nodes, &mut indices, 0, count, &points);

        Ok(SpatialTree {
            nodes,
            indices,
            points,
            radii,
            max_radius,
            kind,
        })
    }

    /// Number of indexed elements.
    pub fn count(&self) -> usize {
        self.points.len() / 3
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Center coordinates of element `i`.
    pub fn center(&self, i: usize) -> [f64; 3] {
        geometry::point3(&self.points, i)
    }

    /// Bounding radius of element `i`; zero for a point source.
    pub fn radius_of(&self, i: usize) -> f64 {
        if self.radii.is_empty() {
            0.0
        } else {
            self.radii[i]
        }
    }

    /// Largest bounding radius in the collection; zero for a point source.
    pub(crate) fn max_radius(&self) -> f64 {
        self.max_radius
    }

    /// Invoke `visit` with the index of every element whose center lies
    /// within `radius` of `center`.
    pub fn visit_sphere<F>(&self, center: [f64; 3], radius: f64, visit: &mut F)
    where
        F: FnMut(usize),
    {
        if radius < 0.0 {
            return;
        }
        let root = (self.nodes.len() - 1) as u32;
        self.visit_sphere_recursive(root, center, radius * radius, visit);
    }

    fn visit_sphere_recursive<F>(&self, node_idx: u32, center: [f64; 3], radius_sq: f64, visit: &mut F)
    where
        F: FnMut(usize),
    {
        let node = &self.nodes[node_idx as usize];

        let bounds = BoundingBox::new(node.min, node.max);
        if bounds.dist_sq_to(center) > radius_sq {
            return;
        }

        if node.left == u32::MAX {
            for i in node.start..node.end {
                let idx = self.indices[i as usize];
                if geometry::dist_sq(self.center(idx), center) <= radius_sq {
                    visit(idx);
                }
            }
            return;
        }

        let axis = node.axis as usize;
        let diff = center[axis] - node.split_val;

        // Visit nearest child first
        let (first, second) = if diff <= 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        self.visit_sphere_recursive(first, center, radius_sq, visit);
        if diff * diff <= radius_sq {
            self.visit_sphere_recursive(second, center, radius_sq, visit);
        }
    }

    /// Invoke `visit` with the index of every element whose center lies
    /// inside `region` expanded by `tolerance`.
    pub fn visit_box<F>(&self, region: &BoundingBox, tolerance: f64, visit: &mut F)
    where
        F: FnMut(usize),
    {
        let root = (self.nodes.len() - 1) as u32;
        self.visit_box_recursive(root, region, tolerance, visit);
    }

    fn visit_box_recursive<F>(&self, node_idx: u32, region: &BoundingBox, tolerance: f64, visit: &mut F)
    where
        F: FnMut(usize),
    {
        let node = &self.nodes[node_idx as usize];

        let bounds = BoundingBox::new(node.min, node.max);
        if !bounds.overlaps(region, tolerance) {
            return;
        }

        if node.left == u32::MAX {
            for i in node.start..node.end {
                let idx = self.indices[i as usize];
                if region.contains(self.center(idx), tolerance) {
                    visit(idx);
                }
            }
            return;
        }

        self.visit_box_recursive(node.left, region, tolerance, visit);
        self.visit_box_recursive(node.right, region, tolerance, visit);
    }

    /// Iterate elements in ascending center distance from `needle`.
    ///
    /// Best-first traversal over a lazy frontier: taking the first k items
    /// costs roughly O((k + visited nodes) log frontier) and never scans the
    /// whole collection for small k.
    pub fn nearest_iter(&self, needle: [f64; 3]) -> NearestIterator<'_> {
        let mut queue = BinaryHeap::new();
        let root = (self.nodes.len() - 1) as u32;
        queue.push(SearchItem {
            dist_sq: 0.0,
            entry: SearchEntry::Node(root),
        });
        NearestIterator {
            tree: self,
            needle,
            queue,
        }
    }
}

fn build_recursive(
    nodes: &mut Vec<KdNode>,
    indices: &mut [usize],
    start: usize,
    end: usize,
    points: &[f64],
) -> u32 {
    let count = end - start;

    // Bounding box for this range
    let mut min = [f64::INFINITY; 3];
    let mut max = [f64::NEG_INFINITY; 3];
    for &idx in &indices[start..end] {
        for axis in 0..3 {
            let v = points[idx * 3 + axis];
            if v < min[axis] {
                min[axis] = v;
            }
            if v > max[axis] {
                max[axis] = v;
            }
        }
    }

    if count <= LEAF_SIZE {
        let node_idx = nodes.len() as u32;
        nodes.push(KdNode {
            min,
            max,
            left: u32::MAX,
            right: u32::MAX,
            start: start as u32,
            end: end as u32,
            split_val: 0.0,
            axis: 0,
        });
        return node_idx;
    }

    // Split on the widest axis
    let axis = if (max[0] - min[0]) >= (max[1] - min[1]) && (max[0] - min[0]) >= (max[2] - min[2]) {
        0
    } else if (max[1] - min[1]) >= (max[2] - min[2]) {
        1
    } else {
        2
    };

    // Median split
    let mid = start + count / 2;
    indices[start..end].select_nth_unstable_by(count / 2, |&a, &b| {
        let va = points[a * 3 + axis];
        let vb = points[b * 3 + axis];
        va.partial_cmp(&vb).unwrap_or(Ordering::Equal)
    });
    let split_val = points[indices[mid] * 3 + axis];

    let left = build_recursive(nodes, indices, start, mid, points);
    let right = build_recursive(nodes, indices, mid, end, points);

    let node_idx = nodes.len() as u32;
    nodes.push(KdNode {
        min,
        max,
        left,
        right,
        start: 0,
        end: 0,
        split_val,
        axis: axis as u8,
    });
    node_idx
}

enum SearchEntry {
    Node(u32),
    Element(usize),
}

struct SearchItem {
    dist_sq: f64,
    entry: SearchEntry,
}

impl PartialEq for SearchItem {
    fn eq(&self, other: &Self) -> bool {
        self.dist_sq == other.dist_sq
    }
}

impl Eq for SearchItem {}

impl PartialOrd for SearchItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        // Reversed so the BinaryHeap pops the smallest distance first
        other.dist_sq.partial_cmp(&self.dist_sq)
    }
}

impl Ord for SearchItem {
    fn cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap_or(Ordering::Equal)
    }
}

/// Best-first traversal yielding `(element index, squared distance)` pairs in
/// ascending distance order. Created by [`SpatialTree::nearest_iter`].
pub struct NearestIterator<'a> {
    tree: &'a SpatialTree,
    needle: [f64; 3],
    queue: BinaryHeap<SearchItem>,
}

impl Iterator for NearestIterator<'_> {
    type Item = (usize, f64);

    fn next(&mut self) -> Option<(usize, f64)> {
        while let Some(item) = self.queue.pop() {
            match item.entry {
                SearchEntry::Element(idx) => return Some((idx, item.dist_sq)),
                SearchEntry::Node(node_idx) => {
                    let node = &self.tree.nodes[node_idx as usize];
                    if node.left == u32::MAX {
                        for i in node.start..node.end {
                            let idx = self.tree.indices[i as usize];
                            self.queue.push(SearchItem {
                                dist_sq: geometry::dist_sq(self.tree.center(idx), self.needle),
                                entry: SearchEntry::Element(idx),
                            });
                        }
                    } else {
                        for child in [node.left, node.right] {
                            let bounds = {
                                let c = &self.tree.nodes[child as usize];
                                BoundingBox::new(c.min, c.max)
                            };
                            self.queue.push(SearchItem {
                                dist_sq: bounds.dist_sq_to(self.needle),
                                entry: SearchEntry::Node(child),
                            });
                        }
                    }
                }
            }
        }
        None
    }
}
