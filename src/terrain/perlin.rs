//! Seeded 2D Perlin noise
//!
//! Improved gradient noise over the plane. Instead of Ken Perlin's fixed
//! permutation table, every seed gets its own table, shuffled by a ChaCha8
//! generator so the same 64-bit seed yields the same table on every platform.
//! Everything after table construction is plain IEEE arithmetic (floor, mul,
//! add), so results are bit-reproducible.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::{MapError, Result};

/// Octave layering for noise sampling
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoiseOptions {
    /// Number of octaves for fractal detail layers (1 = single layer)
    pub octaves: usize,
    /// Amplitude decay per octave (controls roughness)
    pub persistence: f64,
    /// Frequency multiplier per octave
    pub lacunarity: f64,
}

impl Default for NoiseOptions {
    fn default() -> Self {
        Self {
            octaves: 1,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

impl NoiseOptions {
    /// Check octave count and multipliers
    pub fn validate(&self) -> Result<()> {
        if self.octaves == 0 || self.octaves > 16 {
            return Err(MapError::InvalidConfiguration(format!(
                "noise octaves must be in 1..=16 (got {})",
                self.octaves
            )));
        }
        if !self.persistence.is_finite() || self.persistence <= 0.0 {
            return Err(MapError::InvalidConfiguration(format!(
                "noise persistence must be positive (got {})",
                self.persistence
            )));
        }
        if !self.lacunarity.is_finite() || self.lacunarity <= 0.0 {
            return Err(MapError::InvalidConfiguration(format!(
                "noise lacunarity must be positive (got {})",
                self.lacunarity
            )));
        }
        Ok(())
    }
}

/// 2D Perlin noise with a seed-derived permutation table
#[derive(Debug, Clone)]
pub struct PerlinNoise {
    seed: u64,
    perm: [u8; 512],
}

impl PerlinNoise {
    /// Build the permutation table for `seed`
    pub fn new(seed: u64) -> Self {
        let mut table: Vec<u8> = (0..=255).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        table.shuffle(&mut rng);

        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = table[i & 255];
        }
        Self { seed, perm }
    }

    /// Seed this table was built from
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[inline]
    fn hash(&self, x: i64, y: i64) -> u8 {
        let xi = (x & 255) as usize;
        let yi = (y & 255) as usize;
        self.perm[self.perm[xi] as usize + yi]
    }

    /// Sample a single octave at `(x, y)`
    ///
    /// # Returns
    /// Value in range [-1, 1]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        // Find unit square containing the point
        let x_floor = x.floor();
        let y_floor = y.floor();
        let x0 = x_floor as i64;
        let y0 = y_floor as i64;

        // Relative position within the square (0.0 to 1.0)
        let xf = x - x_floor;
        let yf = y - y_floor;

        let u = fade(xf);
        let v = fade(yf);

        let g00 = gradient(self.hash(x0, y0), xf, yf);
        let g10 = gradient(self.hash(x0 + 1, y0), xf - 1.0, yf);
        let g01 = gradient(self.hash(x0, y0 + 1), xf, yf - 1.0);
        let g11 = gradient(self.hash(x0 + 1, y0 + 1), xf - 1.0, yf - 1.0);

        let bottom = lerp(g00, g10, u);
        let top = lerp(g01, g11, u);

        lerp(bottom, top, v).clamp(-1.0, 1.0)
    }

    /// Sample with Fractal Brownian Motion
    ///
    /// Returns the amplitude-normalized sum, still in [-1, 1].
    pub fn sample_fbm(&self, x: f64, y: f64, options: &NoiseOptions) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_value = 0.0;

        for _ in 0..options.octaves.max(1) {
            total += self.sample(x * frequency, y * frequency) * amplitude;
            max_value += amplitude;
            amplitude *= options.persistence;
            frequency *= options.lacunarity;
        }

        (total / max_value).clamp(-1.0, 1.0)
    }
}

/// Dot product with one of eight gradient directions
///
/// Axis and diagonal directions with unit components keep the single-octave
/// output inside [-1, 1].
#[inline]
fn gradient(hash_value: u8, x: f64, y: f64) -> f64 {
    match hash_value & 7 {
        0 => x + y,
        1 => -x + y,
        2 => x - y,
        3 => -x - y,
        4 => x,
        5 => -x,
        6 => y,
        _ => -y,
    }
}

/// Quintic smoothstep interpolation (Ken Perlin's improved fade function)
///
/// Formula: 6t⁵ - 15t⁴ + 10t³
#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}
