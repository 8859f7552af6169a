//! Map main structure

use std::time::Instant;

use glam::DVec2;
use rayon::prelude::*;

use crate::cancel::CancellationToken;
use crate::cell::VoronoiCell;
use crate::config::{ColorMode, MapConfig};
use crate::error::{MapError, Result};
use crate::generation::{generate_geometry, RawCell, SpadeTriangulator, Triangulation, TriangulationService};
use crate::terrain::{BandColorMapper, BiomeClassifier, ColorMapper, NoiseSampler, Rgb, TerrainSampler};

#[cfg(feature = "spatial-index")]
use crate::spatial::SpatialIndex;

/// A generated terrain map
///
/// Immutable once built: a new seed or configuration means a new `Map`.
/// Every per-cell collection (cells, centers, elevations, moistures, colors)
/// has the same length and is indexed by cell index.
///
/// # Examples
///
/// ```
/// use voronoi_terrain_map::*;
///
/// let config = MapConfigBuilder::new()
///     .site_count(100).unwrap()
///     .domain_side(300).unwrap()
///     .build()
///     .unwrap();
///
/// let map = Map::generate(config).unwrap();
/// println!("Generated {} cells", map.cell_count());
///
/// if let Some(cell) = map.get_cell(0) {
///     println!("Cell 0 color: {:?}", cell.color);
/// }
/// ```
#[derive(Clone)]
pub struct Map {
    /// Configuration (including both seeds) used to generate this map
    config: MapConfig,

    /// Jittered grid sites before relaxation
    initial_sites: Vec<DVec2>,

    /// Triangulation of the final (relaxed) sites
    triangulation: Triangulation,

    /// All cells (indexed by cell index)
    cells: Vec<VoronoiCell>,

    /// Relaxation rounds actually run
    rounds_run: usize,

    /// Spatial index for fast position-to-cell lookups (optional, requires spatial-index feature)
    #[cfg(feature = "spatial-index")]
    spatial_index: SpatialIndex,
}

impl Map {
    /// Generate a map with the default triangulator, noise and color mode
    ///
    /// Fully deterministic in the configuration, whose two seeds drive the
    /// elevation and moisture fields.
    ///
    /// # Errors
    ///
    /// - `InvalidConfiguration` before any geometry work
    /// - `DegenerateGeometry` if a triangulation fails
    /// - `NumericDomain` if a cell color cannot be computed
    pub fn generate(config: MapConfig) -> Result<Self> {
        Self::generate_with_cancel(config, &CancellationToken::new())
    }

    /// Generate a map, honoring `cancel` between relaxation rounds
    pub fn generate_with_cancel(config: MapConfig, cancel: &CancellationToken) -> Result<Self> {
        config.validate()?;

        let side = config.domain_side as f64;
        let elevation = NoiseSampler::with_options(config.elevation_seed, side, config.zoom_scale, config.noise);
        let moisture = NoiseSampler::with_options(config.moisture_seed, side, config.zoom_scale, config.noise);

        match config.color_mode {
            ColorMode::Biome => {
                let classifier = BiomeClassifier::new(config.biome);
                Self::generate_with(config, &SpadeTriangulator, &elevation, &moisture, &classifier, cancel)
            }
            ColorMode::Bands => {
                Self::generate_with(config, &SpadeTriangulator, &elevation, &moisture, &BandColorMapper, cancel)
            }
        }
    }

    /// Generate a map with custom triangulation, sampling and coloring
    ///
    /// Geometry is built sequentially; sampling and coloring then run in
    /// parallel over cells. Any per-cell failure aborts the whole run.
    ///
    /// # Example
    ///
    /// ```
    /// use voronoi_terrain_map::*;
    /// use voronoi_terrain_map::generation::SpadeTriangulator;
    /// use voronoi_terrain_map::terrain::{BandColorMapper, NoiseSampler};
    ///
    /// let config = MapConfigBuilder::new()
    ///     .site_count(64).unwrap()
    ///     .domain_side(256).unwrap()
    ///     .build()
    ///     .unwrap();
    /// let elevation = NoiseSampler::new(1, 256.0, 2.0);
    /// let moisture = NoiseSampler::new(2, 256.0, 2.0);
    ///
    /// let map = Map::generate_with(
    ///     config,
    ///     &SpadeTriangulator,
    ///     &elevation,
    ///     &moisture,
    ///     &BandColorMapper,
    ///     &CancellationToken::new(),
    /// )
    /// .unwrap();
    /// assert!(map.cell_count() > 0);
    /// ```
    pub fn generate_with<T, E, M, C>(
        config: MapConfig,
        triangulator: &T,
        elevation: &E,
        moisture: &M,
        mapper: &C,
        cancel: &CancellationToken,
    ) -> Result<Self>
    where
        T: TriangulationService + ?Sized,
        E: TerrainSampler + ?Sized,
        M: TerrainSampler + ?Sized,
        C: ColorMapper + Sync + ?Sized,
    {
        let start = Instant::now();

        let geometry = generate_geometry(&config, triangulator, cancel)?;
        let relaxation = geometry.relaxation;

        if cancel.is_cancelled() {
            return Err(MapError::Cancelled {
                completed_rounds: relaxation.rounds_run,
            });
        }

        let cells: Vec<VoronoiCell> = relaxation
            .cells
            .into_par_iter()
            .map(|raw| populate_cell(raw, elevation, moisture, mapper))
            .collect::<Result<_>>()?;

        #[cfg(feature = "spatial-index")]
        let spatial_index = {
            let centers: Vec<DVec2> = cells.iter().map(|c| c.center).collect();
            SpatialIndex::new(&centers)
        };

        tracing::info!(
            cells = cells.len(),
            triangles = relaxation.triangulation.triangle_count(),
            rounds = relaxation.rounds_run,
            elevation_seed = config.elevation_seed,
            moisture_seed = config.moisture_seed,
            elapsed = ?start.elapsed(),
            "map generated"
        );

        Ok(Self {
            config,
            initial_sites: geometry.initial_sites,
            triangulation: relaxation.triangulation,
            cells,
            rounds_run: relaxation.rounds_run,
            #[cfg(feature = "spatial-index")]
            spatial_index,
        })
    }

    /// Get the configuration used to generate this map
    #[inline]
    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Seed of the elevation field (also drives site jitter)
    #[inline]
    pub fn elevation_seed(&self) -> u64 {
        self.config.elevation_seed
    }

    /// Seed of the moisture field
    #[inline]
    pub fn moisture_seed(&self) -> u64 {
        self.config.moisture_seed
    }

    /// Get the number of cells
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Relaxation rounds actually run
    #[inline]
    pub fn rounds_run(&self) -> usize {
        self.rounds_run
    }

    /// Get a cell by index
    ///
    /// Returns `None` if the index is out of bounds.
    #[inline]
    pub fn get_cell(&self, index: usize) -> Option<&VoronoiCell> {
        self.cells.get(index)
    }

    /// Get a cell by index, failing with `CellNotFound`
    pub fn cell(&self, index: usize) -> Result<&VoronoiCell> {
        self.cells.get(index).ok_or(MapError::CellNotFound(index))
    }

    /// Get all cells as a slice
    #[inline]
    pub fn cells(&self) -> &[VoronoiCell] {
        &self.cells
    }

    /// Sites before relaxation
    #[inline]
    pub fn initial_sites(&self) -> &[DVec2] {
        &self.initial_sites
    }

    /// Cell centers (the relaxed sites)
    pub fn centers(&self) -> Vec<DVec2> {
        self.cells.iter().map(|c| c.center).collect()
    }

    /// Elevation noise per cell
    pub fn elevations(&self) -> Vec<f64> {
        self.cells.iter().map(|c| c.elevation).collect()
    }

    /// Moisture noise per cell
    pub fn moistures(&self) -> Vec<f64> {
        self.cells.iter().map(|c| c.moisture).collect()
    }

    /// Final color per cell
    pub fn colors(&self) -> Vec<Rgb> {
        self.cells.iter().map(|c| c.color).collect()
    }

    /// Triangulation of the cell centers
    #[inline]
    pub fn triangulation(&self) -> &Triangulation {
        &self.triangulation
    }

    /// Number of regions (one per site)
    #[inline]
    pub fn num_regions(&self) -> usize {
        self.cells.len()
    }

    /// Number of triangles in the triangulation
    #[inline]
    pub fn num_triangles(&self) -> usize {
        self.triangulation.triangle_count()
    }

    /// Number of undirected triangulation edges
    pub fn num_edges(&self) -> usize {
        // Each interior edge has two half-edges, each hull edge one
        (self.triangulation.halfedge_count() + self.triangulation.hull.len()) / 2
    }

    /// Triangulation edges as site index pairs, each edge once
    pub fn triangulation_edges(&self) -> Vec<(usize, usize)> {
        self.triangulation.edges()
    }

    /// Convex hull edges as site index pairs
    #[inline]
    pub fn hull_edges(&self) -> &[(usize, usize)] {
        &self.triangulation.hull
    }

    /// Get neighbor indices for a cell
    ///
    /// Returns an empty slice if the index is invalid.
    pub fn neighbors(&self, index: usize) -> &[usize] {
        self.cells
            .get(index)
            .map(|c| c.neighbors.as_slice())
            .unwrap_or(&[])
    }

    /// Find the cell under a position (requires spatial-index feature)
    ///
    /// Positions outside the domain resolve to the nearest cell.
    #[cfg(feature = "spatial-index")]
    pub fn find_cell_at(&self, position: DVec2) -> Option<usize> {
        self.spatial_index.find_nearest(position)
    }
}

impl std::fmt::Debug for Map {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Map")
            .field("config", &self.config)
            .field("cells", &self.cells.len())
            .field("triangles", &self.triangulation.triangle_count())
            .field("rounds_run", &self.rounds_run)
            .finish()
    }
}

/// Sample both fields at the cell center and color the cell
fn populate_cell<E, M, C>(raw: RawCell, elevation: &E, moisture: &M, mapper: &C) -> Result<VoronoiCell>
where
    E: TerrainSampler + ?Sized,
    M: TerrainSampler + ?Sized,
    C: ColorMapper + ?Sized,
{
    let e = elevation.sample(raw.site);
    let m = moisture.sample(raw.site);
    if !e.is_finite() || !m.is_finite() {
        return Err(MapError::NumericDomain(format!(
            "noise at cell {} is not finite (elevation {}, moisture {})",
            raw.index, e, m
        )));
    }
    let color = mapper.map_color(e, m)?;
    Ok(VoronoiCell::from_raw(raw, e, m, color))
}

/// Generate a map from a configuration and an explicit seed pair
///
/// `seed` drives the elevation field and site jitter, `biome_seed` the
/// moisture field. Both override the seeds stored in `config`.
///
/// # Errors
///
/// `InvalidConfiguration` if the seeds are equal or the configuration is
/// invalid, otherwise as [`Map::generate`].
pub fn generate(config: MapConfig, seed: u64, biome_seed: u64) -> Result<Map> {
    Map::generate(MapConfig {
        elevation_seed: seed,
        moisture_seed: biome_seed,
        ..config
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::TerrainBand;
    use crate::MapConfigBuilder;

    fn small_config() -> MapConfig {
        MapConfigBuilder::new()
            .elevation_seed(42)
            .moisture_seed(4242)
            .site_count(100)
            .unwrap()
            .domain_side(300)
            .unwrap()
            .relaxation_rounds(2)
            .build()
            .unwrap()
    }

    struct Constant(f64);

    impl TerrainSampler for Constant {
        fn sample(&self, _position: DVec2) -> f64 {
            self.0
        }
    }

    struct FailingMapper;

    impl ColorMapper for FailingMapper {
        fn map_color(&self, _elevation: f64, _moisture: f64) -> Result<Rgb> {
            Err(MapError::NumericDomain("always".into()))
        }
    }

    #[test]
    fn test_map_generation() {
        let config = small_config();
        let map = Map::generate(config).unwrap();

        assert!(map.cell_count() > 0);
        assert_eq!(map.rounds_run(), 2);
        assert_eq!(map.initial_sites().len(), map.cell_count());
        assert_eq!(map.config(), &config);
    }

    #[test]
    fn test_per_cell_arrays_aligned() {
        let map = Map::generate(small_config()).unwrap();
        let n = map.cell_count();

        assert_eq!(map.centers().len(), n);
        assert_eq!(map.elevations().len(), n);
        assert_eq!(map.moistures().len(), n);
        assert_eq!(map.colors().len(), n);
        assert_eq!(map.num_regions(), n);
        for (index, cell) in map.cells().iter().enumerate() {
            assert_eq!(cell.index, index);
        }
    }

    #[test]
    fn test_determinism_bit_identical() {
        let a = Map::generate(small_config()).unwrap();
        let b = Map::generate(small_config()).unwrap();

        assert_eq!(a.cells(), b.cells());
        assert_eq!(a.colors(), b.colors());
        for (x, y) in a.elevations().iter().zip(b.elevations()) {
            assert_eq!(x.to_bits(), y.to_bits());
        }
        for (x, y) in a.moistures().iter().zip(b.moistures()) {
            assert_eq!(x.to_bits(), y.to_bits());
        }
        for (p, q) in a.centers().iter().zip(b.centers()) {
            assert_eq!(p.x.to_bits(), q.x.to_bits());
            assert_eq!(p.y.to_bits(), q.y.to_bits());
        }
    }

    #[test]
    fn test_noise_in_unit_range() {
        let map = Map::generate(small_config()).unwrap();
        for cell in map.cells() {
            assert!((0.0..=1.0).contains(&cell.elevation));
            assert!((0.0..=1.0).contains(&cell.moisture));
        }
    }

    #[test]
    fn test_colors_follow_classifier() {
        let config = small_config();
        let map = Map::generate(config).unwrap();
        let classifier = BiomeClassifier::new(config.biome);

        for cell in map.cells() {
            let expected = classifier.classify(cell.elevation, cell.moisture).unwrap();
            assert_eq!(cell.color, expected);
        }
    }

    #[test]
    fn test_band_color_mode() {
        let config = MapConfig {
            color_mode: ColorMode::Bands,
            ..small_config()
        };
        let map = Map::generate(config).unwrap();

        for cell in map.cells() {
            assert_eq!(cell.color, TerrainBand::from_elevation(cell.elevation).color());
        }
    }

    #[test]
    fn test_seed_pair_overrides_config() {
        let config = small_config();
        let map = generate(config, 7, 8).unwrap();

        assert_eq!(map.elevation_seed(), 7);
        assert_eq!(map.moisture_seed(), 8);

        let direct = Map::generate(MapConfig {
            elevation_seed: 7,
            moisture_seed: 8,
            ..config
        })
        .unwrap();
        assert_eq!(map.cells(), direct.cells());
    }

    #[test]
    fn test_moisture_seed_keeps_geometry() {
        let a = generate(small_config(), 10, 20).unwrap();
        let b = generate(small_config(), 10, 30).unwrap();

        assert_eq!(a.centers(), b.centers());
        assert_eq!(a.elevations(), b.elevations());
        assert_ne!(a.moistures(), b.moistures());
    }

    #[test]
    fn test_equal_seeds_rejected() {
        let result = generate(small_config(), 5, 5);
        assert!(matches!(result, Err(MapError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_degenerate_config_rejected() {
        let zero_sites = MapConfig {
            site_count: 0,
            ..small_config()
        };
        assert!(matches!(
            Map::generate(zero_sites),
            Err(MapError::InvalidConfiguration(_))
        ));

        let zero_side = MapConfig {
            domain_side: 0,
            ..small_config()
        };
        assert!(matches!(
            Map::generate(zero_side),
            Err(MapError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_oversized_domain_rejected() {
        let config = MapConfig {
            site_count: 1,
            domain_side: usize::MAX,
            elevation_seed: 1,
            moisture_seed: 2,
            ..MapConfig::default()
        };
        assert!(matches!(
            Map::generate(config),
            Err(MapError::InvalidConfiguration(_))
        ));

        let huge_margin = MapConfig {
            site_margin: usize::MAX,
            ..small_config()
        };
        assert!(matches!(
            Map::generate(huge_margin),
            Err(MapError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_cancelled_generation() {
        let token = CancellationToken::new();
        token.cancel();

        let result = Map::generate_with_cancel(small_config(), &token);
        assert_eq!(result.unwrap_err(), MapError::Cancelled { completed_rounds: 0 });
    }

    #[test]
    fn test_custom_samplers_and_mapper() {
        let map = Map::generate_with(
            small_config(),
            &SpadeTriangulator,
            &Constant(0.6),
            &Constant(0.4),
            &BiomeClassifier::default(),
            &CancellationToken::new(),
        )
        .unwrap();

        assert!(map.colors().iter().all(|&c| c == Rgb::new(168, 171, 116)));
    }

    #[test]
    fn test_mapper_failure_aborts_run() {
        let result = Map::generate_with(
            small_config(),
            &SpadeTriangulator,
            &Constant(0.5),
            &Constant(0.5),
            &FailingMapper,
            &CancellationToken::new(),
        );
        assert!(matches!(result, Err(MapError::NumericDomain(_))));
    }

    #[test]
    fn test_non_finite_noise_rejected() {
        let result = Map::generate_with(
            small_config(),
            &SpadeTriangulator,
            &Constant(f64::NAN),
            &Constant(0.5),
            &BandColorMapper,
            &CancellationToken::new(),
        );
        assert!(matches!(result, Err(MapError::NumericDomain(_))));
    }

    #[test]
    fn test_triangulation_counts() {
        let map = Map::generate(small_config()).unwrap();

        assert_eq!(map.num_triangles(), map.triangulation().triangle_count());
        assert_eq!(map.num_edges(), map.triangulation_edges().len());
        // Euler's formula for a triangulated point set
        assert_eq!(map.num_edges(), map.num_regions() + map.num_triangles() - 1);
        assert!(!map.hull_edges().is_empty());
    }

    #[test]
    fn test_neighbors() {
        let map = Map::generate(small_config()).unwrap();

        for cell in map.cells() {
            let neighbors = map.neighbors(cell.index);
            assert!(neighbors.len() >= 2);
            for &other in neighbors {
                assert!(map.neighbors(other).contains(&cell.index));
            }
        }
        assert!(map.neighbors(usize::MAX).is_empty());
    }

    #[test]
    fn test_get_cell() {
        let map = Map::generate(small_config()).unwrap();

        assert!(map.get_cell(0).is_some());
        assert!(map.get_cell(map.cell_count()).is_none());
        assert_eq!(
            map.cell(map.cell_count()).unwrap_err(),
            MapError::CellNotFound(map.cell_count())
        );
    }

    #[cfg(feature = "spatial-index")]
    #[test]
    fn test_find_cell_at() {
        let map = Map::generate(small_config()).unwrap();

        for cell in map.cells().iter().step_by(7) {
            assert_eq!(map.find_cell_at(cell.center), Some(cell.index));
        }
    }
}
