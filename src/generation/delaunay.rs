//! Delaunay triangulation of the site set
//!
//! The triangulation is consumed through the [`TriangulationService`] trait so
//! relaxation can run against any implementation, including hand-built stubs
//! in tests. [`SpadeTriangulator`] is a thin wrapper around spade's
//! incremental Delaunay triangulation that flattens its result into the
//! half-edge arrays the Voronoi builder walks.
//!
//! # Half-edge layout
//!
//! Triangle `t` owns half-edges `3t`, `3t + 1`, `3t + 2`. Half-edge `e` starts
//! at site `triangles[e]` and ends at `triangles[next_halfedge(e)]`.
//! `halfedges[e]` is the opposite half-edge in the neighboring triangle, or
//! `None` when `e` lies on the convex hull.

use std::collections::HashMap;

use glam::DVec2;
use spade::{DelaunayTriangulation, HasPosition, Point2, Triangulation as _};

use crate::error::{MapError, Result};

/// Flat triangulation over an indexed site sequence
#[derive(Debug, Clone, PartialEq)]
pub struct Triangulation {
    /// Site indices, three per triangle, counter-clockwise
    pub triangles: Vec<usize>,
    /// Opposite half-edge for each half-edge, `None` on the hull
    pub halfedges: Vec<Option<usize>>,
    /// Hull boundary as ordered `(from, to)` site index pairs
    pub hull: Vec<(usize, usize)>,
}

/// Next half-edge within the same triangle
#[inline]
pub fn next_halfedge(e: usize) -> usize {
    if e % 3 == 2 {
        e - 2
    } else {
        e + 1
    }
}

/// Previous half-edge within the same triangle
#[inline]
pub fn prev_halfedge(e: usize) -> usize {
    if e % 3 == 0 {
        e + 2
    } else {
        e - 1
    }
}

impl Triangulation {
    /// Build a triangulation from triangle triples, deriving adjacency and hull
    ///
    /// Triangles must share one orientation. Used by [`SpadeTriangulator`] and
    /// handy for hand-built test fixtures.
    ///
    /// # Errors
    ///
    /// Returns `DegenerateGeometry` if there are no triangles or the triangle
    /// array length is not a multiple of 3.
    pub fn from_triangles(triangles: Vec<usize>) -> Result<Self> {
        if triangles.is_empty() || triangles.len() % 3 != 0 {
            return Err(MapError::DegenerateGeometry(format!(
                "triangle index array must be a non-empty multiple of 3 (got {})",
                triangles.len()
            )));
        }

        let mut edge_lookup: HashMap<(usize, usize), usize> =
            HashMap::with_capacity(triangles.len());
        for e in 0..triangles.len() {
            edge_lookup.insert((triangles[e], triangles[next_halfedge(e)]), e);
        }

        let halfedges: Vec<Option<usize>> = (0..triangles.len())
            .map(|e| {
                let from = triangles[e];
                let to = triangles[next_halfedge(e)];
                edge_lookup.get(&(to, from)).copied()
            })
            .collect();

        let hull = trace_hull(&triangles, &halfedges);

        Ok(Self {
            triangles,
            halfedges,
            hull,
        })
    }

    /// Number of triangles
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    /// Number of half-edges (three per triangle)
    #[inline]
    pub fn halfedge_count(&self) -> usize {
        self.triangles.len()
    }

    /// Site indices of triangle `t`
    #[inline]
    pub fn triangle_vertices(&self, t: usize) -> [usize; 3] {
        [
            self.triangles[3 * t],
            self.triangles[3 * t + 1],
            self.triangles[3 * t + 2],
        ]
    }

    /// Each undirected edge once, as `(from, to)` site index pairs
    ///
    /// Interior edges are reported from the half-edge with the larger index
    /// of the pair, hull edges from their only half-edge.
    pub fn edges(&self) -> Vec<(usize, usize)> {
        (0..self.triangles.len())
            .filter(|&e| self.halfedges[e].map_or(true, |opposite| e > opposite))
            .map(|e| (self.triangles[e], self.triangles[next_halfedge(e)]))
            .collect()
    }

    /// Incoming half-edge to use as the start of a walk around each site
    ///
    /// Hull half-edges are preferred so walks around boundary sites cover the
    /// whole open fan. Sites that appear in no triangle map to `None`.
    pub fn incoming_halfedges(&self, site_count: usize) -> Vec<Option<usize>> {
        let mut incoming = vec![None; site_count];
        for e in 0..self.triangles.len() {
            let endpoint = self.triangles[next_halfedge(e)];
            if endpoint >= site_count {
                continue;
            }
            if self.halfedges[e].is_none() || incoming[endpoint].is_none() {
                incoming[endpoint] = Some(e);
            }
        }
        incoming
    }
}

/// Follow hull half-edges into one closed boundary loop
fn trace_hull(triangles: &[usize], halfedges: &[Option<usize>]) -> Vec<(usize, usize)> {
    let mut next_on_hull: HashMap<usize, usize> = HashMap::new();
    let mut start = None;
    for e in 0..triangles.len() {
        if halfedges[e].is_none() {
            let from = triangles[e];
            next_on_hull.insert(from, triangles[next_halfedge(e)]);
            start = Some(start.map_or(from, |s: usize| s.min(from)));
        }
    }

    let Some(start) = start else {
        return Vec::new();
    };

    let mut hull = Vec::with_capacity(next_on_hull.len());
    let mut current = start;
    while let Some(&next) = next_on_hull.get(&current) {
        hull.push((current, next));
        current = next;
        if current == start || hull.len() > next_on_hull.len() {
            break;
        }
    }
    hull
}

/// Capability that turns an indexed point sequence into a triangulation
///
/// Injected into relaxation so the pipeline can be exercised with stubs.
pub trait TriangulationService {
    /// Triangulate `points`; triangle indices refer to positions in `points`
    ///
    /// # Errors
    ///
    /// Returns `DegenerateGeometry` when the points are collinear, contain
    /// duplicates or non-finite coordinates, or number fewer than 3.
    fn triangulate(&self, points: &[DVec2]) -> Result<Triangulation>;
}

impl<T: TriangulationService + ?Sized> TriangulationService for &T {
    fn triangulate(&self, points: &[DVec2]) -> Result<Triangulation> {
        (**self).triangulate(points)
    }
}

/// Site carrying its input index through spade
#[derive(Debug, Clone, Copy)]
struct IndexedSite {
    position: Point2<f64>,
    index: usize,
}

impl HasPosition for IndexedSite {
    type Scalar = f64;

    fn position(&self) -> Point2<f64> {
        self.position
    }
}

/// Default triangulator backed by `spade`
#[derive(Debug, Clone, Copy, Default)]
pub struct SpadeTriangulator;

impl TriangulationService for SpadeTriangulator {
    fn triangulate(&self, points: &[DVec2]) -> Result<Triangulation> {
        if points.len() < 3 {
            return Err(MapError::DegenerateGeometry(format!(
                "at least 3 points are required (got {})",
                points.len()
            )));
        }
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(MapError::DegenerateGeometry(format!(
                "point {} has a non-finite coordinate",
                index
            )));
        }

        let sites: Vec<IndexedSite> = points
            .iter()
            .enumerate()
            .map(|(index, p)| IndexedSite {
                position: Point2::new(p.x, p.y),
                index,
            })
            .collect();

        let delaunay = DelaunayTriangulation::<IndexedSite>::bulk_load(sites).map_err(|err| {
            MapError::DegenerateGeometry(format!("triangulation rejected the input: {:?}", err))
        })?;

        if delaunay.num_vertices() != points.len() {
            return Err(MapError::DegenerateGeometry(format!(
                "{} duplicate point(s) in a set of {}",
                points.len() - delaunay.num_vertices(),
                points.len()
            )));
        }
        if delaunay.num_inner_faces() == 0 {
            return Err(MapError::DegenerateGeometry(format!(
                "all {} points are collinear",
                points.len()
            )));
        }

        let triangles: Vec<usize> = delaunay
            .inner_faces()
            .flat_map(|face| face.vertices().map(|vertex| vertex.data().index))
            .collect();

        Triangulation::from_triangles(triangles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<DVec2> {
        vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(0.0, 1.0),
        ]
    }

    #[test]
    fn test_halfedge_navigation() {
        assert_eq!(next_halfedge(0), 1);
        assert_eq!(next_halfedge(2), 0);
        assert_eq!(next_halfedge(5), 3);
        assert_eq!(prev_halfedge(0), 2);
        assert_eq!(prev_halfedge(4), 3);
    }

    #[test]
    fn test_from_triangles_adjacency() {
        // Two CCW triangles sharing the diagonal 0-2 of the unit square
        let tri = Triangulation::from_triangles(vec![0, 1, 2, 0, 2, 3]).unwrap();

        assert_eq!(tri.triangle_count(), 2);
        assert_eq!(tri.halfedge_count(), 6);
        // 1->2 and 2->0 in the first triangle; 0->2 is half-edge 3
        assert_eq!(tri.halfedges[2], Some(3));
        assert_eq!(tri.halfedges[3], Some(2));
        assert_eq!(tri.halfedges.iter().filter(|h| h.is_none()).count(), 4);
        assert_eq!(tri.hull, vec![(0, 1), (1, 2), (2, 3), (3, 0)]);
        assert_eq!(tri.edges().len(), 5);
    }

    #[test]
    fn test_from_triangles_rejects_malformed() {
        assert!(Triangulation::from_triangles(vec![]).is_err());
        assert!(Triangulation::from_triangles(vec![0, 1]).is_err());
    }

    #[test]
    fn test_incoming_prefers_hull() {
        let tri = Triangulation::from_triangles(vec![0, 1, 2, 0, 2, 3]).unwrap();
        let incoming = tri.incoming_halfedges(4);
        for (site, e) in incoming.iter().enumerate() {
            let e = e.unwrap();
            assert_eq!(tri.triangles[next_halfedge(e)], site);
            // Every site of a square is on the hull
            assert!(tri.halfedges[e].is_none());
        }
    }

    #[test]
    fn test_spade_square() {
        let tri = SpadeTriangulator.triangulate(&square()).unwrap();

        assert_eq!(tri.triangle_count(), 2);
        assert_eq!(tri.hull.len(), 4);
        assert_eq!(tri.edges().len(), 5);
        for &site in &tri.triangles {
            assert!(site < 4);
        }
    }

    #[test]
    fn test_spade_counter_clockwise() {
        let points = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(4.0, 0.0),
            DVec2::new(2.0, 3.0),
            DVec2::new(2.0, 1.0),
            DVec2::new(5.0, 4.0),
        ];
        let tri = SpadeTriangulator.triangulate(&points).unwrap();

        for t in 0..tri.triangle_count() {
            let [a, b, c] = tri.triangle_vertices(t);
            let (a, b, c) = (points[a], points[b], points[c]);
            let cross = (b - a).perp_dot(c - a);
            assert!(cross > 0.0, "triangle {} is not counter-clockwise", t);
        }
    }

    #[test]
    fn test_spade_preserves_input_indices() {
        let points = square();
        let tri = SpadeTriangulator.triangulate(&points).unwrap();
        let mut seen: Vec<usize> = tri.triangles.clone();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_spade_too_few_points() {
        let result = SpadeTriangulator.triangulate(&[DVec2::ZERO, DVec2::X]);
        assert!(matches!(result, Err(MapError::DegenerateGeometry(_))));
    }

    #[test]
    fn test_spade_collinear() {
        let points: Vec<DVec2> = (0..5).map(|i| DVec2::new(i as f64, 2.0 * i as f64)).collect();
        let result = SpadeTriangulator.triangulate(&points);
        assert!(matches!(result, Err(MapError::DegenerateGeometry(_))));
    }

    #[test]
    fn test_spade_duplicates() {
        let mut points = square();
        points.push(DVec2::new(1.0, 1.0));
        let result = SpadeTriangulator.triangulate(&points);
        assert!(matches!(result, Err(MapError::DegenerateGeometry(_))));
    }

    #[test]
    fn test_spade_non_finite() {
        let mut points = square();
        points[2] = DVec2::new(f64::NAN, 0.0);
        let result = SpadeTriangulator.triangulate(&points);
        assert!(matches!(result, Err(MapError::DegenerateGeometry(_))));
    }
}
