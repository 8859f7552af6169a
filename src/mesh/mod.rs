//! Mesh generation for Map
//!
//! Generates engine-agnostic render data from a [`Map`]: filled cell
//! polygons as a triangle mesh plus line and point overlays for debugging.

mod overlay;

pub use overlay::{
    border_overlay, center_points, hull_overlay, initial_site_points, triangulation_overlay,
    LineList,
};

use glam::DVec2;

use crate::map::Map;
use crate::terrain::Rgb;

/// Engine-agnostic mesh data output
///
/// Contains raw vertex data suitable for any rendering backend:
/// - wgpu: Use directly as vertex buffers
/// - A 2D canvas: draw each index triple as a filled triangle
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    /// Vertex positions (2D domain coordinates)
    pub positions: Vec<[f32; 2]>,
    /// Vertex colors (RGBA)
    pub colors: Vec<[f32; 4]>,
    /// Triangle indices
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Get the number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check if mesh is empty
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Generate a mesh of all cells, filled with their map colors
///
/// Each cell is triangulated as a triangle fan from center to boundary
/// vertices. All vertices in a cell get the cell color.
pub fn generate_mesh(map: &Map) -> MeshData {
    let mut mesh = MeshData::default();

    for cell in map.cells() {
        // Skip degenerate cells
        if cell.vertices.len() < 3 {
            continue;
        }
        triangulate_cell(cell.center, &cell.vertices, cell.color, &mut mesh);
    }

    mesh
}

/// Triangulate a single cell as a triangle fan
///
/// Hull cells carry their own site in the boundary polygon. That vertex is
/// dropped and the remaining chain is fanned without closing it, so no
/// zero-area triangles are emitted.
fn triangulate_cell(center: DVec2, vertices: &[DVec2], color: Rgb, mesh: &mut MeshData) {
    let ring: Vec<DVec2> = vertices.iter().copied().filter(|&v| v != center).collect();
    let closed = ring.len() == vertices.len();
    if ring.len() < 2 {
        return;
    }

    let base_idx = mesh.positions.len() as u32;
    let rgba = color.to_rgba_f32();

    mesh.positions.push(to_f32(center));
    mesh.colors.push(rgba);

    for &vertex in &ring {
        mesh.positions.push(to_f32(vertex));
        mesh.colors.push(rgba);
    }

    let num_vertices = ring.len();
    let num_triangles = if closed { num_vertices } else { num_vertices - 1 };
    for i in 0..num_triangles {
        let next_i = (i + 1) % num_vertices;
        mesh.indices.push(base_idx); // Center
        mesh.indices.push(base_idx + 1 + i as u32);
        mesh.indices.push(base_idx + 1 + next_i as u32);
    }
}

#[inline]
pub(crate) fn to_f32(point: DVec2) -> [f32; 2] {
    [point.x as f32, point.y as f32]
}
