//! Voronoi Cell Structure
//!
//! Represents an individual cell of the map with its geometry, neighbors,
//! sampled noise values and final color.

use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::generation::{polygon_area, RawCell};
use crate::terrain::{Rgb, TerrainBand};

/// A single Voronoi cell of the map
///
/// Each cell carries everything derived for one site:
/// - Its index, shared with every per-cell collection of the map
/// - The (relaxed) center the noise was sampled at
/// - The boundary polygon for rendering
/// - Neighbor connectivity from the triangulation
/// - Elevation and moisture noise and the resulting color
///
/// Keeping the values in one record makes misaligned per-cell arrays
/// unrepresentable; [`crate::Map`] still exposes them as parallel arrays.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct VoronoiCell {
    /// Cell index (0 to cell_count-1), stable for a given configuration
    pub index: usize,

    /// Site the cell was built from, the final relaxed position
    pub center: DVec2,

    /// Boundary polygon, counter-clockwise
    ///
    /// Interior cells use the centroids of the surrounding triangles.
    /// Hull cells are closed with the midpoints of their hull edges and the
    /// site itself.
    pub vertices: Vec<DVec2>,

    /// Indices of adjacent cells, sorted ascending
    pub neighbors: Vec<usize>,

    /// Whether the site lies on the convex hull
    pub is_boundary: bool,

    /// Elevation noise in [0, 1]
    pub elevation: f64,

    /// Moisture noise in [0, 1]
    pub moisture: f64,

    /// Final fill color
    pub color: Rgb,
}

impl VoronoiCell {
    /// Attach sampled values to raw geometry
    pub fn from_raw(raw: RawCell, elevation: f64, moisture: f64, color: Rgb) -> Self {
        Self {
            index: raw.index,
            center: raw.site,
            vertices: raw.vertices,
            neighbors: raw.neighbors,
            is_boundary: raw.is_boundary,
            elevation,
            moisture,
            color,
        }
    }

    /// Get the number of neighboring cells
    #[inline]
    pub fn neighbor_count(&self) -> usize {
        self.neighbors.len()
    }

    /// Check if this cell is a neighbor of another cell
    #[inline]
    pub fn is_neighbor_of(&self, other_index: usize) -> bool {
        self.neighbors.binary_search(&other_index).is_ok()
    }

    /// Get the vertex count (polygon complexity)
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Area of the boundary polygon
    pub fn area(&self) -> f64 {
        polygon_area(&self.vertices)
    }

    /// Elevation band of the cell
    #[inline]
    pub fn band(&self) -> TerrainBand {
        TerrainBand::from_elevation(self.elevation)
    }

    /// Boundary edges as point pairs, closing the polygon
    pub fn border_segments(&self) -> impl Iterator<Item = (DVec2, DVec2)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Euclidean distance between two cell centers
    pub fn distance_to(&self, other: &VoronoiCell) -> f64 {
        self.center.distance(other.center)
    }
}
