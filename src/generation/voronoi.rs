//! Voronoi cell construction from Delaunay triangulation
//!
//! Each cell is bounded by the centroids (vertex averages) of the triangles
//! incident to its site, visited by walking the half-edges around the site.
//!
//! # Boundary closure
//!
//! Walking around a hull site yields an open fan. It is closed by adding the
//! midpoints of the two hull edges that meet at the site, plus the site
//! itself: `[mid(prev, site), fan.., mid(site, next), site]`. Every point of
//! that loop lies in the wedge of the hull angle at the site, so the polygon
//! stays simple and its vertex average lies inside the hull.

use glam::DVec2;

use super::delaunay::{next_halfedge, Triangulation};
use crate::error::{MapError, Result};

/// A Voronoi cell without noise or color (geometry only)
///
/// This is an intermediate representation used during generation.
/// Sampling is added later to create the final [`crate::VoronoiCell`].
#[derive(Debug, Clone, PartialEq)]
pub struct RawCell {
    /// Index of the generating site
    pub index: usize,
    /// Generating site position
    pub site: DVec2,
    /// Boundary polygon, counter-clockwise, implicitly closed
    pub vertices: Vec<DVec2>,
    /// Indices of sites sharing a Delaunay edge with this one (sorted)
    pub neighbors: Vec<usize>,
    /// Whether the site lies on the convex hull
    pub is_boundary: bool,
}

impl RawCell {
    /// Unweighted average of the boundary vertices
    ///
    /// This is the point relaxation moves the site to.
    pub fn vertex_centroid(&self) -> DVec2 {
        if self.vertices.is_empty() {
            return self.site;
        }
        let sum: DVec2 = self.vertices.iter().copied().sum();
        sum / self.vertices.len() as f64
    }

    /// Unsigned polygon area (shoelace formula)
    pub fn area(&self) -> f64 {
        polygon_area(&self.vertices)
    }
}

/// Unsigned area of a simple polygon
pub fn polygon_area(vertices: &[DVec2]) -> f64 {
    if vertices.len() < 3 {
        return 0.0;
    }
    let twice: f64 = vertices
        .iter()
        .zip(vertices.iter().cycle().skip(1))
        .map(|(a, b)| a.perp_dot(*b))
        .sum();
    twice.abs() * 0.5
}

/// Centroid of every triangle, indexed by triangle
fn triangle_centroids(sites: &[DVec2], triangulation: &Triangulation) -> Vec<DVec2> {
    (0..triangulation.triangle_count())
        .map(|t| {
            let [a, b, c] = triangulation.triangle_vertices(t);
            (sites[a] + sites[b] + sites[c]) / 3.0
        })
        .collect()
}

/// Generate one Voronoi cell per site from a triangulation of those sites
///
/// Cell `i` is always built from site `i`, so the returned vector is
/// index-aligned with `sites`.
///
/// # Errors
///
/// Returns `DegenerateGeometry` if the triangulation references sites that
/// do not exist, or leaves a site outside every triangle.
pub fn generate_cells(sites: &[DVec2], triangulation: &Triangulation) -> Result<Vec<RawCell>> {
    if let Some(&bad) = triangulation.triangles.iter().find(|&&s| s >= sites.len()) {
        return Err(MapError::DegenerateGeometry(format!(
            "triangulation references site {} but only {} sites exist",
            bad,
            sites.len()
        )));
    }

    let centroids = triangle_centroids(sites, triangulation);
    let incoming = triangulation.incoming_halfedges(sites.len());

    sites
        .iter()
        .enumerate()
        .map(|(index, &site)| {
            let start = incoming[index].ok_or_else(|| {
                MapError::DegenerateGeometry(format!("site {} is not part of any triangle", index))
            })?;
            Ok(build_cell(index, site, start, sites, triangulation, &centroids))
        })
        .collect()
}

/// Walk the half-edges around one site and assemble its polygon
fn build_cell(
    index: usize,
    site: DVec2,
    start: usize,
    sites: &[DVec2],
    triangulation: &Triangulation,
    centroids: &[DVec2],
) -> RawCell {
    let tri = &triangulation.triangles;
    let is_boundary = triangulation.halfedges[start].is_none();

    let mut fan = Vec::new();
    let mut neighbors = Vec::new();
    let mut incoming = start;
    let mut last_outgoing = next_halfedge(start);

    // Bounded by the triangle count in case of inconsistent adjacency
    for _ in 0..triangulation.triangle_count() {
        fan.push(centroids[incoming / 3]);
        neighbors.push(tri[incoming]);

        last_outgoing = next_halfedge(incoming);
        match triangulation.halfedges[last_outgoing] {
            Some(opposite) if opposite != start => incoming = opposite,
            _ => break,
        }
    }

    // The walk turns clockwise around the site; emit counter-clockwise
    let mut vertices = if is_boundary {
        let prev = tri[start];
        let next = tri[next_halfedge(last_outgoing)];
        neighbors.push(next);

        let mut loop_points = Vec::with_capacity(fan.len() + 3);
        loop_points.push((sites[prev] + site) * 0.5);
        loop_points.extend(fan);
        loop_points.push((site + sites[next]) * 0.5);
        loop_points.push(site);
        loop_points
    } else {
        fan
    };
    vertices.reverse();

    neighbors.sort_unstable();
    neighbors.dedup();

    RawCell {
        index,
        site,
        vertices,
        neighbors,
        is_boundary,
    }
}
