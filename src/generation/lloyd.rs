//! Lloyd's Relaxation for uniform site distribution
//!
//! Lloyd's Relaxation iteratively improves the uniformity of the site
//! distribution by moving each site to the centroid of its Voronoi cell and
//! re-triangulating the moved set.

use std::time::Instant;

use glam::DVec2;

use super::delaunay::{Triangulation, TriangulationService};
use super::voronoi::{generate_cells, RawCell};
use crate::cancel::CancellationToken;
use crate::error::{MapError, Result};

/// Options for Lloyd's relaxation algorithm
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LloydOptions {
    /// Maximum number of rounds to run
    pub max_iterations: usize,
    /// Convergence threshold - stop when max displacement < this value
    /// Set to 0.0 to disable early termination
    pub convergence_threshold: f64,
}

impl Default for LloydOptions {
    fn default() -> Self {
        Self {
            max_iterations: 1,
            convergence_threshold: 0.0,
        }
    }
}

/// Final state of a relaxation run
///
/// `sites`, `triangulation` and `cells` all describe the same, final site
/// set: cell `i` was built from `sites[i]`.
#[derive(Debug, Clone)]
pub struct Relaxation {
    /// Relaxed site positions (the cell centers)
    pub sites: Vec<DVec2>,
    /// Triangulation of `sites`
    pub triangulation: Triangulation,
    /// Cells built from `triangulation`
    pub cells: Vec<RawCell>,
    /// Rounds actually run (fewer than requested after convergence)
    pub rounds_run: usize,
    /// Largest site displacement in the last round (0.0 if none ran)
    pub max_displacement: f64,
}

/// Apply Lloyd's Relaxation with a fixed round count
///
/// # Arguments
///
/// * `sites` - Initial site distribution
/// * `triangulator` - Service used for every (re-)triangulation
/// * `iterations` - Number of relaxation rounds (0 keeps the sites untouched)
///
/// # Errors
///
/// Returns `DegenerateGeometry` if any triangulation fails, including one
/// requested mid-relaxation.
pub fn lloyd_relaxation<T>(sites: Vec<DVec2>, triangulator: &T, iterations: usize) -> Result<Relaxation>
where
    T: TriangulationService + ?Sized,
{
    let options = LloydOptions {
        max_iterations: iterations,
        ..Default::default()
    };
    lloyd_relaxation_with_options(sites, triangulator, options, &CancellationToken::new())
}

/// Apply Lloyd's Relaxation with custom options and cancellation
///
/// Each round recomputes everything from scratch: centroids of the current
/// cells become the new sites (index-aligned with the old cells), the new
/// site set is triangulated, and cells are rebuilt.
///
/// # Errors
///
/// - `DegenerateGeometry` if a triangulation fails; the run is aborted rather
///   than continuing with a stale triangulation
/// - `Cancelled` if `cancel` is set before a round starts
pub fn lloyd_relaxation_with_options<T>(
    mut sites: Vec<DVec2>,
    triangulator: &T,
    options: LloydOptions,
    cancel: &CancellationToken,
) -> Result<Relaxation>
where
    T: TriangulationService + ?Sized,
{
    let total_start = Instant::now();

    if cancel.is_cancelled() {
        return Err(MapError::Cancelled { completed_rounds: 0 });
    }
    let mut triangulation = triangulator.triangulate(&sites)?;
    let mut cells = generate_cells(&sites, &triangulation)?;

    tracing::debug!(
        sites = sites.len(),
        max_iterations = options.max_iterations,
        threshold = options.convergence_threshold,
        "lloyd relaxation starting"
    );

    let mut rounds_run = 0;
    let mut max_displacement = 0.0;

    for round in 0..options.max_iterations {
        if cancel.is_cancelled() {
            return Err(MapError::Cancelled {
                completed_rounds: round,
            });
        }
        let round_start = Instant::now();

        let (new_sites, displacement) = compute_new_sites(&sites, &cells);

        let hull_start = Instant::now();
        triangulation = triangulator.triangulate(&new_sites)?;
        let triangulation_time = hull_start.elapsed();

        cells = generate_cells(&new_sites, &triangulation)?;
        sites = new_sites;
        max_displacement = displacement;
        rounds_run = round + 1;

        tracing::debug!(
            round = rounds_run,
            triangulation = ?triangulation_time,
            total = ?round_start.elapsed(),
            max_displacement,
            "lloyd round finished"
        );

        if options.convergence_threshold > 0.0 && max_displacement < options.convergence_threshold {
            tracing::warn!(
                round = rounds_run,
                max_iterations = options.max_iterations,
                max_displacement,
                threshold = options.convergence_threshold,
                "lloyd relaxation converged early"
            );
            break;
        }
    }

    tracing::debug!(
        rounds_run,
        max_iterations = options.max_iterations,
        total = ?total_start.elapsed(),
        "lloyd relaxation finished"
    );

    Ok(Relaxation {
        sites,
        triangulation,
        cells,
        rounds_run,
        max_displacement,
    })
}

/// Compute new site positions and track maximum displacement
fn compute_new_sites(sites: &[DVec2], cells: &[RawCell]) -> (Vec<DVec2>, f64) {
    let mut max_displacement: f64 = 0.0;

    let new_sites = cells
        .iter()
        .map(|cell| {
            let centroid = cell.vertex_centroid();
            max_displacement = max_displacement.max(centroid.distance(sites[cell.index]));
            centroid
        })
        .collect();

    (new_sites, max_displacement)
}
