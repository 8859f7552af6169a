//! Debug overlays: triangulation, hull and cell borders as line segments

use glam::DVec2;

use super::to_f32;
use crate::map::Map;

/// Independent line segments, two points per segment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineList {
    pub segments: Vec<[DVec2; 2]>,
}

impl LineList {
    /// Get the number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Flattened endpoints for a line-list vertex buffer
    pub fn to_vertices(&self) -> Vec<[f32; 2]> {
        self.segments
            .iter()
            .flat_map(|[a, b]| [to_f32(*a), to_f32(*b)])
            .collect()
    }

    fn from_index_pairs(points: &[DVec2], pairs: impl IntoIterator<Item = (usize, usize)>) -> Self {
        Self {
            segments: pairs
                .into_iter()
                .map(|(a, b)| [points[a], points[b]])
                .collect(),
        }
    }
}

/// Every triangulation edge, drawn once
pub fn triangulation_overlay(map: &Map) -> LineList {
    LineList::from_index_pairs(&map.centers(), map.triangulation_edges())
}

/// Convex hull edges
pub fn hull_overlay(map: &Map) -> LineList {
    LineList::from_index_pairs(&map.centers(), map.hull_edges().iter().copied())
}

/// Boundary segments of every cell
///
/// Borders shared by two cells appear once per cell.
pub fn border_overlay(map: &Map) -> LineList {
    LineList {
        segments: map
            .cells()
            .iter()
            .flat_map(|cell| cell.border_segments().map(|(a, b)| [a, b]))
            .collect(),
    }
}

/// Cell centers as points
pub fn center_points(map: &Map) -> Vec<[f32; 2]> {
    map.cells().iter().map(|c| to_f32(c.center)).collect()
}

/// Sites before relaxation as points
pub fn initial_site_points(map: &Map) -> Vec<[f32; 2]> {
    map.initial_sites().iter().map(|&p| to_f32(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MapConfigBuilder;

    fn small_map() -> Map {
        let config = MapConfigBuilder::new()
            .elevation_seed(1)
            .moisture_seed(2)
            .site_count(49)
            .unwrap()
            .domain_side(210)
            .unwrap()
            .build()
            .unwrap();
        Map::generate(config).unwrap()
    }

    #[test]
    fn test_triangulation_overlay_counts() {
        let map = small_map();
        let lines = triangulation_overlay(&map);

        assert_eq!(lines.len(), map.num_edges());
        assert_eq!(lines.to_vertices().len(), 2 * lines.len());
    }

    #[test]
    fn test_hull_overlay_is_closed_loop() {
        let map = small_map();
        let hull = hull_overlay(&map);

        assert_eq!(hull.len(), map.hull_edges().len());
        for (i, segment) in hull.segments.iter().enumerate() {
            let next = &hull.segments[(i + 1) % hull.len()];
            assert_eq!(segment[1], next[0]);
        }
    }

    #[test]
    fn test_border_overlay_counts() {
        let map = small_map();
        let borders = border_overlay(&map);

        let expected: usize = map.cells().iter().map(|c| c.vertex_count()).sum();
        assert_eq!(borders.len(), expected);
    }

    #[test]
    fn test_point_lists() {
        let map = small_map();

        assert_eq!(center_points(&map).len(), map.cell_count());
        assert_eq!(initial_site_points(&map).len(), map.cell_count());
    }

    #[test]
    fn test_line_list_vertices() {
        let lines = LineList {
            segments: vec![[DVec2::new(0.0, 1.0), DVec2::new(2.0, 3.0)]],
        };
        assert_eq!(lines.to_vertices(), vec![[0.0, 1.0], [2.0, 3.0]]);
        assert!(LineList::default().is_empty());
    }
}
