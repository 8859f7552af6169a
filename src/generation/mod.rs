//! Core Voronoi generation pipeline
//!
//! Scatters jittered grid sites, triangulates them, and runs Lloyd's
//! relaxation over the centroid-based Voronoi dual.

mod delaunay;
mod lloyd;
mod sites;
mod voronoi;

pub use delaunay::{
    next_halfedge, prev_halfedge, SpadeTriangulator, Triangulation, TriangulationService,
};
pub use lloyd::{lloyd_relaxation, lloyd_relaxation_with_options, LloydOptions, Relaxation};
pub use sites::{generate_sites, grid_step, points_per_side, MAX_SITES};
pub use voronoi::{generate_cells, polygon_area, RawCell};

use glam::DVec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::cancel::CancellationToken;
use crate::config::MapConfig;
use crate::error::Result;

/// ChaCha stream reserved for site jitter, apart from noise permutations
const SITE_STREAM: u64 = 1;

/// Geometry of one generation run, before any noise sampling
#[derive(Debug, Clone)]
pub struct Geometry {
    /// Jittered grid sites, before relaxation
    pub initial_sites: Vec<DVec2>,
    /// Relaxed sites with their final triangulation and cells
    pub relaxation: Relaxation,
}

/// Generate the relaxed cell geometry for a configuration
///
/// Site jitter is driven by a ChaCha8 generator seeded from the elevation
/// seed, so geometry is reproducible from the configuration alone.
///
/// # Errors
///
/// Returns `InvalidConfiguration` before any work if the configuration is
/// invalid, `DegenerateGeometry` if any triangulation fails, and `Cancelled`
/// if `cancel` fires between rounds.
pub fn generate_geometry<T>(
    config: &MapConfig,
    triangulator: &T,
    cancel: &CancellationToken,
) -> Result<Geometry>
where
    T: TriangulationService + ?Sized,
{
    config.validate()?;

    // Step 1: Scatter jittered grid sites
    let mut rng = ChaCha8Rng::seed_from_u64(config.elevation_seed);
    rng.set_stream(SITE_STREAM);
    let initial_sites = sites::generate_sites(
        config.site_count,
        config.domain_side,
        config.site_margin,
        &mut rng,
    )?;

    // Step 2-3: Triangulate, build cells, relax
    let options = LloydOptions {
        max_iterations: config.relaxation_rounds,
        convergence_threshold: config.lloyd_convergence,
    };
    let relaxation =
        lloyd::lloyd_relaxation_with_options(initial_sites.clone(), triangulator, options, cancel)?;

    Ok(Geometry {
        initial_sites,
        relaxation,
    })
}
