use std::cmp::Ordering;

use tracing::debug;

use crate::config::GeomConfig;
use crate::delaunay::Triangulation;
use crate::error::{GeomError, GeomResult};

/// One Voronoi cell: a site index plus its polygon of circumcenter vertices,
/// ordered counter-clockwise about the polygon centroid.
#[derive(Clone, Debug)]
pub struct VoronoiCell {
    pub site: usize,
    pub vertices: Vec<[f64; 2]>,
}

impl VoronoiCell {
    /// Consecutive vertex pairs around the cell, closing back to the first.
    pub fn edges(&self) -> impl Iterator<Item = ([f64; 2], [f64; 2])> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }
}

/// The Voronoi diagram dual to a triangulation.
///
/// Every triangle with a well-defined circumcenter contributes it to the
/// cells of its three sites; near-degenerate triangles contribute nothing.
/// Cells on the outer boundary are open in the true diagram and come back
/// here as the polygon of their finite vertices. Sites left with no
/// circumcenter produce no cell.
pub fn voronoi(tri: &Triangulation, cfg: &GeomConfig) -> GeomResult<Vec<VoronoiCell>> {
    let n = tri.site_count();
    let tol = cfg.tolerance;

    let mut raw: Vec<Vec<[f64; 2]>> = vec![Vec::new(); n];
    let mut skipped = 0usize;
    for t in &tri.triangles {
        match circumcenter(tri.site(t[0]), tri.site(t[1]), tri.site(t[2]), tol) {
            Some(center) => {
                for &site in t {
                    raw[site].push(center);
                }
            }
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        debug!(skipped, "degenerate triangles skipped in voronoi dual");
    }

    let mut cells = Vec::new();
    for (site, mut vertices) in raw.into_iter().enumerate() {
        if vertices.is_empty() {
            continue;
        }
        dedup_vertices(&mut vertices, tol);
        sort_ccw(&mut vertices);
        cells.push(VoronoiCell { site, vertices });
    }
    if cells.is_empty() {
        return Err(GeomError::DegenerateGeometry {
            op: "voronoi",
            context: "every triangle is too thin for a circumcenter".to_string(),
        });
    }
    Ok(cells)
}

/// Circumcenter of the triangle (a, b, c), or `None` when the triangle is
/// too thin for the center to be meaningful.
fn circumcenter(a: [f64; 2], b: [f64; 2], c: [f64; 2], tol: f64) -> Option<[f64; 2]> {
    let d = 2.0 * (a[0] * (b[1] - c[1]) + b[0] * (c[1] - a[1]) + c[0] * (a[1] - b[1]));
    if d.abs() <= tol {
        return None;
    }
    let a_sq = a[0] * a[0] + a[1] * a[1];
    let b_sq = b[0] * b[0] + b[1] * b[1];
    let c_sq = c[0] * c[0] + c[1] * c[1];
    let ux = (a_sq * (b[1] - c[1]) + b_sq * (c[1] - a[1]) + c_sq * (a[1] - b[1])) / d;
    let uy = (a_sq * (c[0] - b[0]) + b_sq * (a[0] - c[0]) + c_sq * (b[0] - a[0])) / d;
    Some([ux, uy])
}

/// Remove vertices that coincide within `tol`; neighbor triangles sharing a
/// circumcircle feed the same center in several times.
fn dedup_vertices(vertices: &mut Vec<[f64; 2]>, tol: f64) {
    let mut i = 0;
    while i < vertices.len() {
        let mut j = i + 1;
        while j < vertices.len() {
            if (vertices[i][0] - vertices[j][0]).abs() <= tol
                && (vertices[i][1] - vertices[j][1]).abs() <= tol
            {
                vertices.swap_remove(j);
            } else {
                j += 1;
            }
        }
        i += 1;
    }
}

fn sort_ccw(vertices: &mut [[f64; 2]]) {
    let len = vertices.len() as f64;
    let cx = vertices.iter().map(|v| v[0]).sum::<f64>() / len;
    let cy = vertices.iter().map(|v| v[1]).sum::<f64>() / len;
    vertices.sort_by(|p, q| {
        let ap = (p[1] - cy).atan2(p[0] - cx);
        let aq = (q[1] - cy).atan2(q[0] - cx);
        ap.partial_cmp(&aq).unwrap_or(Ordering::Equal)
    });
}
