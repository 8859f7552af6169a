//! Terrain sampling and classification
//!
//! Provides the noise fields sampled at cell centers and the classifiers
//! that turn the sampled values into colors.

mod biome;
mod perlin;

pub use biome::{BandColorMapper, BiomeClassifier, BiomeParams, ColorMapper, Rgb};
pub use perlin::{NoiseOptions, PerlinNoise};

use glam::DVec2;

/// Fixed elevation bands of the banded color mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TerrainBand {
    /// Elevation noise below 0.15
    DeepWater,
    /// Elevation noise below 0.35
    ShallowWater,
    /// Elevation noise below 0.5
    Grass,
    /// Elevation noise below 0.8
    Sand,
    /// Everything higher
    Snow,
}

impl TerrainBand {
    /// Band for an elevation noise value in [0, 1]
    pub fn from_elevation(elevation: f64) -> Self {
        if elevation < 0.15 {
            TerrainBand::DeepWater
        } else if elevation < 0.35 {
            TerrainBand::ShallowWater
        } else if elevation < 0.5 {
            TerrainBand::Grass
        } else if elevation < 0.8 {
            TerrainBand::Sand
        } else {
            TerrainBand::Snow
        }
    }

    /// Fill color of the band
    pub fn color(self) -> Rgb {
        match self {
            TerrainBand::DeepWater => Rgb::new(24, 32, 63),
            TerrainBand::ShallowWater => Rgb::new(48, 64, 127),
            TerrainBand::Grass => Rgb::new(180, 210, 120),
            TerrainBand::Sand => Rgb::new(200, 185, 130),
            TerrainBand::Snow => Rgb::new(255, 255, 255),
        }
    }

    /// Check if this band is water
    pub fn is_water(&self) -> bool {
        matches!(self, TerrainBand::DeepWater | TerrainBand::ShallowWater)
    }

    /// Check if this band is land
    pub fn is_land(&self) -> bool {
        !self.is_water()
    }
}

/// Trait for sampling a scalar field at cell centers
///
/// `Sync` so cells can be sampled from worker threads.
pub trait TerrainSampler: Sync {
    /// Sample the field at a position in domain coordinates, result in [0, 1]
    fn sample(&self, position: DVec2) -> f64;
}

/// Default sampler: seeded Perlin noise at normalized, zoomed coordinates
///
/// A position is divided by the domain side and multiplied by the zoom
/// scale before sampling, so the zoom changes the visual scale of the noise
/// independently of the geometry. The raw value is remapped with
/// `(1 + raw) / 2`.
#[derive(Debug, Clone)]
pub struct NoiseSampler {
    noise: PerlinNoise,
    domain_side: f64,
    zoom_scale: f64,
    options: NoiseOptions,
}

impl NoiseSampler {
    /// Create a single-octave sampler
    pub fn new(seed: u64, domain_side: f64, zoom_scale: f64) -> Self {
        Self::with_options(seed, domain_side, zoom_scale, NoiseOptions::default())
    }

    /// Create a sampler with custom octave layering
    pub fn with_options(seed: u64, domain_side: f64, zoom_scale: f64, options: NoiseOptions) -> Self {
        Self {
            noise: PerlinNoise::new(seed),
            domain_side,
            zoom_scale,
            options,
        }
    }

    /// Seed of the underlying noise field
    pub fn seed(&self) -> u64 {
        self.noise.seed()
    }

    /// Noise coordinates for a domain position
    #[inline]
    pub fn normalize(&self, position: DVec2) -> DVec2 {
        position / self.domain_side * self.zoom_scale
    }
}

impl TerrainSampler for NoiseSampler {
    fn sample(&self, position: DVec2) -> f64 {
        let p = self.normalize(position);
        let raw = self.noise.sample_fbm(p.x, p.y, &self.options);
        (1.0 + raw) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_thresholds() {
        assert_eq!(TerrainBand::from_elevation(0.0), TerrainBand::DeepWater);
        assert_eq!(TerrainBand::from_elevation(0.15), TerrainBand::ShallowWater);
        assert_eq!(TerrainBand::from_elevation(0.35), TerrainBand::Grass);
        assert_eq!(TerrainBand::from_elevation(0.5), TerrainBand::Sand);
        assert_eq!(TerrainBand::from_elevation(0.8), TerrainBand::Snow);
        assert_eq!(TerrainBand::from_elevation(1.0), TerrainBand::Snow);
    }

    #[test]
    fn test_band_helpers() {
        assert!(TerrainBand::DeepWater.is_water());
        assert!(TerrainBand::ShallowWater.is_water());
        assert!(TerrainBand::Grass.is_land());
        assert!(TerrainBand::Sand.is_land());
        assert!(!TerrainBand::Snow.is_water());
    }

    #[test]
    fn test_sampler_range() {
        let sampler = NoiseSampler::new(0xDEAD_BEEF, 900.0, 4.0);
        for i in -30..60 {
            for j in -30..60 {
                let value = sampler.sample(DVec2::new(i as f64 * 17.3, j as f64 * 11.9));
                assert!((0.0..=1.0).contains(&value), "{} out of range", value);
            }
        }
    }

    #[test]
    fn test_sampler_range_extreme_seeds() {
        for seed in [0, 1, u64::MAX, i64::MIN as u64] {
            let sampler = NoiseSampler::new(seed, 900.0, 4.0);
            for i in 0..50 {
                let value = sampler.sample(DVec2::new(i as f64 * 31.7, i as f64 * -13.1));
                assert!((0.0..=1.0).contains(&value));
            }
        }
    }

    #[test]
    fn test_sampler_determinism() {
        let a = NoiseSampler::new(42, 900.0, 4.0);
        let b = NoiseSampler::new(42, 900.0, 4.0);
        let position = DVec2::new(123.4, 567.8);
        assert_eq!(a.sample(position).to_bits(), b.sample(position).to_bits());
    }

    #[test]
    fn test_normalization() {
        let sampler = NoiseSampler::new(1, 900.0, 4.0);
        let p = sampler.normalize(DVec2::new(450.0, 225.0));
        assert!((p - DVec2::new(2.0, 1.0)).length() < 1e-12);

        // Zoom and side cancel out: same field point, same value
        let zoomed = NoiseSampler::new(1, 450.0, 2.0);
        let position = DVec2::new(333.3, 101.1);
        assert!((sampler.sample(position) - zoomed.sample(position)).abs() < 1e-12);
    }

    #[test]
    fn test_independent_seeds_decorrelate() {
        let elevation = NoiseSampler::new(10, 900.0, 4.0);
        let moisture = NoiseSampler::new(11, 900.0, 4.0);
        let differs = (0..64).any(|i| {
            let p = DVec2::new(i as f64 * 13.7 + 5.0, i as f64 * 7.3 + 3.0);
            elevation.sample(p) != moisture.sample(p)
        });
        assert!(differs);
    }
}
