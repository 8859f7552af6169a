//! Jittered Grid Site Distribution
//!
//! Scatters sites on a square grid covering the domain and displaces each one
//! by a small random offset, giving roughly uniform density without the
//! visible regularity of a pure lattice.
//!
//! # Algorithm
//!
//! With `k = floor(sqrt(count))` and `step = floor(side / k)`, grid
//! coordinates run from `-margin` up to `step * k` inclusive. Each axis of
//! the jitter is the difference of two uniform draws in `[0, step / 2)`,
//! a triangular distribution centered on 0 and bounded by `±step / 2`.

use glam::DVec2;
use rand::Rng;

use crate::error::{MapError, Result};

/// Upper bound on the number of emitted sites (a 2048 x 2048 grid)
pub const MAX_SITES: usize = 1 << 22;

/// Largest `k` with `k * k <= n`
fn integer_sqrt(n: usize) -> usize {
    let mut k = (n as f64).sqrt() as usize;
    while k > 0 && k * k > n {
        k -= 1;
    }
    while (k + 1) * (k + 1) <= n {
        k += 1;
    }
    k
}

/// Grid spacing for a site count and domain side
///
/// # Errors
///
/// Returns `InvalidConfiguration` when `count` or `side` is zero, or when the
/// domain is too small for the requested density and the step rounds to 0.
pub fn grid_step(count: usize, side: usize) -> Result<usize> {
    let per_side = integer_sqrt(count);
    if per_side == 0 || side == 0 {
        return Err(MapError::InvalidConfiguration(format!(
            "site count ({}) and domain side ({}) must both be > 0",
            count, side
        )));
    }
    let step = side / per_side;
    if step == 0 {
        return Err(MapError::InvalidConfiguration(format!(
            "grid step is zero: {} sites per side do not fit a domain side of {}",
            per_side, side
        )));
    }
    Ok(step)
}

/// Number of grid points along one axis, so the total is its square
///
/// # Errors
///
/// Returns `InvalidConfiguration` when the grid extent `step * k + margin`
/// does not fit in `i64`, or the grid would hold more than [`MAX_SITES`].
pub fn points_per_side(count: usize, side: usize, margin: usize) -> Result<usize> {
    let step = grid_step(count, side)?;
    let extent = step
        .checked_mul(integer_sqrt(count))
        .and_then(|span| span.checked_add(margin))
        .filter(|&extent| i64::try_from(extent).is_ok())
        .ok_or_else(|| {
            MapError::InvalidConfiguration(format!(
                "grid extent overflows for domain side {} and margin {}",
                side, margin
            ))
        })?;

    let per_side = extent / step + 1;
    match per_side.checked_mul(per_side) {
        Some(total) if total <= MAX_SITES => Ok(per_side),
        _ => Err(MapError::InvalidConfiguration(format!(
            "{} points per side exceed the limit of {} sites",
            per_side, MAX_SITES
        ))),
    }
}

/// Generate jittered grid sites
///
/// Sites are emitted column by column (outer loop over x, inner over y), so
/// the same RNG state always yields the same indexed sequence.
///
/// The result holds `points_per_side²` sites, not `floor(sqrt(count))²`:
/// the grid spans `-margin..=step * k`, so a non-zero margin adds rows and
/// columns (1000 sites on a 900 side with margin 50 gives 33² = 1089).
///
/// # Arguments
///
/// * `count` - Target site count
/// * `side` - Side length of the square domain
/// * `margin` - Offset of the grid origin below zero
/// * `rng` - Random source for the jitter
///
/// # Example
///
/// ```rust
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
/// use voronoi_terrain_map::generation::{generate_sites, points_per_side};
///
/// let mut rng = ChaCha8Rng::seed_from_u64(42);
/// let sites = generate_sites(100, 200, 0, &mut rng).unwrap();
/// let per_side = points_per_side(100, 200, 0).unwrap();
/// assert_eq!(sites.len(), per_side * per_side);
/// ```
pub fn generate_sites<R: Rng + ?Sized>(
    count: usize,
    side: usize,
    margin: usize,
    rng: &mut R,
) -> Result<Vec<DVec2>> {
    let step = grid_step(count, side)?;
    let per_side = points_per_side(count, side, margin)?;
    let half_step = step as f64 / 2.0;
    // Both fit in i64: points_per_side bounds the extent
    let start = -(margin as i64);
    let step = step as i64;

    let mut sites = Vec::with_capacity(per_side * per_side);
    for i in 0..per_side as i64 {
        let x = start + i * step;
        for j in 0..per_side as i64 {
            let y = start + j * step;
            let jitter_x = rng.gen::<f64>() * half_step - rng.gen::<f64>() * half_step;
            let jitter_y = rng.gen::<f64>() * half_step - rng.gen::<f64>() * half_step;
            sites.push(DVec2::new(x as f64 + jitter_x, y as f64 + jitter_y));
        }
    }

    Ok(sites)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_integer_sqrt() {
        assert_eq!(integer_sqrt(0), 0);
        assert_eq!(integer_sqrt(1), 1);
        assert_eq!(integer_sqrt(99), 9);
        assert_eq!(integer_sqrt(100), 10);
        assert_eq!(integer_sqrt(1000), 31);
    }

    #[test]
    fn test_grid_step() {
        assert_eq!(grid_step(1000, 900).unwrap(), 29);
        assert_eq!(grid_step(100, 200).unwrap(), 20);
        assert!(grid_step(0, 900).is_err());
        assert!(grid_step(100, 0).is_err());
        assert!(grid_step(10_000, 50).is_err());
    }

    #[test]
    fn test_site_count_without_margin() {
        // step = 20, grid runs 0..=200: 11 points per side
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let sites = generate_sites(100, 200, 0, &mut rng).unwrap();
        assert_eq!(points_per_side(100, 200, 0).unwrap(), 11);
        assert_eq!(sites.len(), 121);
    }

    #[test]
    fn test_site_count_reference_settings() {
        // step = 29, grid runs -50..=899: 33 points per side
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let sites = generate_sites(1000, 900, 50, &mut rng).unwrap();
        assert_eq!(points_per_side(1000, 900, 50).unwrap(), 33);
        assert_eq!(sites.len(), 33 * 33);
    }

    #[test]
    fn test_non_square_count_uses_floor() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let a = generate_sites(99, 90, 0, &mut rng).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let b = generate_sites(81, 90, 0, &mut rng).unwrap();
        assert_eq!(a.len(), b.len());
    }

    #[test]
    fn test_jitter_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let step = grid_step(400, 400).unwrap() as f64;
        let per_side = points_per_side(400, 400, 50).unwrap();
        let sites = generate_sites(400, 400, 50, &mut rng).unwrap();

        for (idx, site) in sites.iter().enumerate() {
            let gx = -50.0 + (idx / per_side) as f64 * step;
            let gy = -50.0 + (idx % per_side) as f64 * step;
            assert!((site.x - gx).abs() < step / 2.0);
            assert!((site.y - gy).abs() < step / 2.0);
        }
    }

    #[test]
    fn test_sites_determinism() {
        let mut rng1 = ChaCha8Rng::seed_from_u64(12345);
        let mut rng2 = ChaCha8Rng::seed_from_u64(12345);
        let sites1 = generate_sites(256, 512, 50, &mut rng1).unwrap();
        let sites2 = generate_sites(256, 512, 50, &mut rng2).unwrap();
        assert_eq!(sites1, sites2);
    }

    #[test]
    fn test_extent_overflow_is_rejected() {
        assert!(matches!(
            points_per_side(1, usize::MAX, 50),
            Err(MapError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            points_per_side(1, 10, usize::MAX),
            Err(MapError::InvalidConfiguration(_))
        ));
        // Fits usize but not i64
        assert!(points_per_side(1, usize::MAX, 0).is_err());

        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(generate_sites(1, usize::MAX, 0, &mut rng).is_err());
    }

    #[test]
    fn test_site_limit() {
        // 2048 per side is exactly the limit, 2049 is one row over
        assert_eq!(points_per_side(2047 * 2047, 2047, 0).unwrap(), 2048);
        assert!(points_per_side(2048 * 2048, 2048, 0).is_err());
        // Large margin on a coarse grid
        assert!(points_per_side(4, 20, 1_000_000).is_err());
    }

    #[test]
    fn test_huge_step_within_i64() {
        let side = 1usize << 40;
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let sites = generate_sites(1, side, 0, &mut rng).unwrap();
        assert_eq!(sites.len(), 4);
        assert!(sites.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn test_single_site() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let sites = generate_sites(1, 10, 0, &mut rng).unwrap();
        // step = 10, grid 0..=10 -> 2 per side
        assert_eq!(sites.len(), 4);
    }
}
