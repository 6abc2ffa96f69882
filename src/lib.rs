//! # geoprox
//!
//! `geoprox` is a Rust library for computational geometry over 3D point and
//! box collections: spatial indexing, clustering, convex hulls, Delaunay and
//! Voronoi construction, skeleton extraction, and directional proximity
//! ranking.
//!
//! ## Features
//!
//! - **Spatial Indexing**: A k-d tree over points or box centers with range,
//!   nearest-neighbor, and tree-to-tree overlap queries, plus a weak-handle
//!   cache that rebuilds an index only when its collection is gone.
//! - **Clustering**: K-means++, density clustering, and single-linkage
//!   agglomeration behind one result shape.
//! - **Hulls and Triangulation**: Monotone-chain 2D hulls, incremental 3D
//!   hulls, Bowyer-Watson Delaunay triangulation, and its Voronoi dual.
//! - **Skeletons and Ranking**: Voronoi-based medial-axis approximation of
//!   planar loops and angle-weighted directional proximity ranking.
//!
//! ## Conventions
//!
//! Point sets travel as flat `&[f64]` slices, three coordinates per point.
//! Every operation returns a [`GeomResult`]; numeric comparisons run through
//! the tolerance in [`GeomConfig`].
//!
//! ## Main Interface
//!
//! Build a [`SpatialTree`] for queries, or call the free functions
//! ([`kmeans`], [`convex_hull_2d`], [`medial_axis`], ...) directly with a
//! [`GeomConfig`].

mod config;
mod error;
mod geometry;
mod bounds;
mod kdtree;
mod index;
mod cluster;
mod cluster_kmeans;
mod cluster_dbscan;
mod cluster_hierarchy;
mod hull_chain;
mod hull_incremental;
mod delaunay;
mod voronoi;
mod skeleton;
mod proximity;

pub use bounds::BoundingBox;
pub use cluster::Cluster;
pub use cluster::Clustering;
pub use cluster_dbscan::dbscan;
pub use cluster_hierarchy::single_linkage;
pub use cluster_kmeans::kmeans;
pub use config::GeomConfig;
pub use delaunay::Triangulation;
pub use error::GeomError;
pub use error::GeomResult;
pub use hull_chain::convex_hull_2d;
pub use hull_chain::Axis;
pub use hull_incremental::convex_hull_3d;
pub use index::k_nearest;
pub use index::k_nearest_one;
pub use index::overlap_query;
pub use index::range_query;
pub use index::within_distance;
pub use index::within_distance_one;
pub use index::SearchRegion;
pub use index::TreeCache;
pub use kdtree::ElementSource;
pub use kdtree::NearestIterator;
pub use kdtree::SourceKind;
pub use kdtree::SpatialTree;
pub use proximity::rank_directional;
pub use proximity::ProximityHit;
pub use skeleton::medial_axis;
pub use skeleton::SkeletonSegment;
pub use voronoi::voronoi;
pub use voronoi::VoronoiCell;
