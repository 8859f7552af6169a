//! Procedural 2D terrain maps over a relaxed Voronoi tessellation
//!
//! Scatters jittered grid sites, triangulates them, relaxes the sites with
//! Lloyd's algorithm, then samples seeded elevation and moisture noise at
//! every cell center and derives a biome color per cell.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use voronoi_terrain_map::*;
//!
//! // Generate a map
//! let config = MapConfigBuilder::new()
//!     .site_count(1000).unwrap()
//!     .domain_side(900).unwrap()
//!     .relaxation_rounds(2)
//!     .build().unwrap();
//!
//! let map = Map::generate(config).unwrap();
//!
//! // Reproduce it later from the two seeds
//! let again = generate(config, map.elevation_seed(), map.moisture_seed()).unwrap();
//! assert_eq!(map.colors(), again.colors());
//!
//! // Generate mesh for rendering
//! let mesh = generate_mesh(&map);
//! println!("Generated {} triangles", mesh.triangle_count());
//! ```
//!
//! # Features
//!
//! - `spatial-index` (default): Enables O(log n) position-to-cell lookups using KD-tree
//! - `serde`: Enables serialization support for configuration and cells

// Modules
pub mod cancel;
pub mod cell;
pub mod config;
pub mod error;
pub mod generation;
pub mod map;
pub mod mesh;
pub mod terrain;

#[cfg(feature = "spatial-index")]
pub mod spatial;

// Re-export core types for convenience
pub use cancel::CancellationToken;
pub use cell::VoronoiCell;
pub use config::{ColorMode, MapConfig, MapConfigBuilder};
pub use error::{MapError, Result};
pub use generation::{LloydOptions, RawCell, SpadeTriangulator, Triangulation, TriangulationService};
pub use map::{generate, Map};
pub use mesh::{generate_mesh, LineList, MeshData};
pub use terrain::{
    BandColorMapper, BiomeClassifier, BiomeParams, ColorMapper, NoiseOptions, NoiseSampler, Rgb,
    TerrainBand, TerrainSampler,
};

#[cfg(feature = "spatial-index")]
pub use spatial::SpatialIndex;

// Re-export glam::DVec2 for convenience
pub use glam::DVec2;
