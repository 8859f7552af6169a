//! Terrain Map Configuration and Builder
//!
//! This module provides configuration types for deterministic map generation.
//! A configuration plus its two seeds is all a caller needs to reproduce a map.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MapError, Result};
use crate::generation::points_per_side;
use crate::terrain::{BiomeParams, NoiseOptions};

/// How cell colors are derived from the sampled noise fields
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Continuous elevation/moisture blend (water darkening, vegetation, snow)
    #[default]
    Biome,
    /// Five fixed elevation bands, moisture ignored
    Bands,
}

/// Configuration for deterministic map generation
///
/// The same configuration will always produce the identical map: sites,
/// relaxed centers, cell polygons, noise values and colors are all
/// bit-reproducible.
///
/// # Example
///
/// ```rust
/// use voronoi_terrain_map::*;
///
/// let config = MapConfigBuilder::new()
///     .elevation_seed(42)
///     .moisture_seed(43)
///     .site_count(400).unwrap()
///     .build()
///     .unwrap();
///
/// # #[cfg(feature = "serde")]
/// # {
/// let json = serde_json::to_string(&config).unwrap();
/// let restored: MapConfig = serde_json::from_str(&json).unwrap();
/// assert_eq!(config, restored);
/// # }
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapConfig {
    /// Target number of sites; the grid is `floor(sqrt(site_count))` steps per side
    pub site_count: usize,

    /// Side length of the square domain, also the noise normalization factor
    pub domain_side: usize,

    /// Offset of the site grid origin (the grid starts at `-site_margin`)
    pub site_margin: usize,

    /// Noise "zoom": cell centers are divided by `domain_side` and multiplied by this
    pub zoom_scale: f64,

    /// Number of Lloyd relaxation rounds
    ///
    /// - 0: Jittered grid sites are kept as-is
    /// - 1: One relaxation pass (default)
    pub relaxation_rounds: usize,

    /// Early-stop distance for relaxation (absolute domain units)
    ///
    /// Relaxation stops once no site moves further than this in a round.
    /// 0.0 disables early termination so exactly `relaxation_rounds` run.
    pub lloyd_convergence: f64,

    /// Water level and blend exponents for biome coloring
    pub biome: BiomeParams,

    /// Octave layering for both noise fields
    pub noise: NoiseOptions,

    /// Biome blend or fixed bands
    pub color_mode: ColorMode,

    /// Seed of the elevation noise field and of the site jitter
    pub elevation_seed: u64,

    /// Seed of the moisture noise field; must differ from `elevation_seed`
    pub moisture_seed: u64,
}

impl MapConfig {
    /// Validate the whole configuration
    ///
    /// Called by generation before any geometry work, so hand-built configs
    /// are held to the same rules as builder-made ones.
    pub fn validate(&self) -> Result<()> {
        if self.site_count == 0 {
            return Err(MapError::InvalidConfiguration(
                "site count must be > 0".into(),
            ));
        }
        if self.domain_side == 0 {
            return Err(MapError::InvalidConfiguration(
                "domain side must be > 0".into(),
            ));
        }
        points_per_side(self.site_count, self.domain_side, self.site_margin)?;

        if !self.zoom_scale.is_finite() || self.zoom_scale <= 0.0 {
            return Err(MapError::InvalidConfiguration(format!(
                "zoom scale must be a positive finite number (got {})",
                self.zoom_scale
            )));
        }
        if !self.lloyd_convergence.is_finite() || self.lloyd_convergence < 0.0 {
            return Err(MapError::InvalidConfiguration(format!(
                "Lloyd convergence threshold must be >= 0 (got {})",
                self.lloyd_convergence
            )));
        }
        if self.elevation_seed == self.moisture_seed {
            return Err(MapError::InvalidConfiguration(format!(
                "elevation and moisture seeds must differ (both {})",
                self.elevation_seed
            )));
        }
        self.biome.validate()?;
        self.noise.validate()
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            site_count: 1000,
            domain_side: 900,
            site_margin: 50,
            zoom_scale: 4.0,
            relaxation_rounds: 1,
            lloyd_convergence: 0.0,
            biome: BiomeParams::default(),
            noise: NoiseOptions::default(),
            color_mode: ColorMode::default(),
            elevation_seed: 0,
            moisture_seed: 1,
        }
    }
}

/// Builder for creating MapConfig with validation
///
/// # Example
///
/// ```rust
/// use voronoi_terrain_map::*;
///
/// // Use defaults (random seeds)
/// let config = MapConfigBuilder::new().build().unwrap();
/// assert_ne!(config.elevation_seed, config.moisture_seed);
///
/// // Customize
/// let config = MapConfigBuilder::new()
///     .elevation_seed(12345)
///     .moisture_seed(67890)
///     .relaxation_rounds(3)
///     .water_level(-0.075).unwrap()
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct MapConfigBuilder {
    site_count: usize,
    domain_side: usize,
    site_margin: usize,
    zoom_scale: f64,
    relaxation_rounds: usize,
    lloyd_convergence: f64,
    biome: BiomeParams,
    noise: NoiseOptions,
    color_mode: ColorMode,
    elevation_seed: Option<u64>,
    moisture_seed: Option<u64>,
}

impl MapConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - site_count: 1000, domain_side: 900, site_margin: 50
    /// - zoom_scale: 4.0
    /// - relaxation_rounds: 1, lloyd_convergence: 0.0 (disabled)
    /// - biome: water -0.2, mountain 4, grass 1, sand 1
    /// - seeds: random (drawn at build time)
    pub fn new() -> Self {
        let defaults = MapConfig::default();
        Self {
            site_count: defaults.site_count,
            domain_side: defaults.domain_side,
            site_margin: defaults.site_margin,
            zoom_scale: defaults.zoom_scale,
            relaxation_rounds: defaults.relaxation_rounds,
            lloyd_convergence: defaults.lloyd_convergence,
            biome: defaults.biome,
            noise: defaults.noise,
            color_mode: defaults.color_mode,
            elevation_seed: None,
            moisture_seed: None,
        }
    }

    /// Set the target site count
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if count is 0
    pub fn site_count(mut self, count: usize) -> Result<Self> {
        if count == 0 {
            return Err(MapError::InvalidConfiguration(
                "site count must be > 0".into(),
            ));
        }
        self.site_count = count;
        Ok(self)
    }

    /// Set the side length of the square domain
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if side is 0
    pub fn domain_side(mut self, side: usize) -> Result<Self> {
        if side == 0 {
            return Err(MapError::InvalidConfiguration(
                "domain side must be > 0".into(),
            ));
        }
        self.domain_side = side;
        Ok(self)
    }

    /// Set the offset of the site grid origin
    pub fn site_margin(mut self, margin: usize) -> Self {
        self.site_margin = margin;
        self
    }

    /// Set the noise zoom factor
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if scale is not positive and finite
    pub fn zoom_scale(mut self, scale: f64) -> Result<Self> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(MapError::InvalidConfiguration(format!(
                "zoom scale must be a positive finite number (got {})",
                scale
            )));
        }
        self.zoom_scale = scale;
        Ok(self)
    }

    /// Set the number of Lloyd relaxation rounds (0 keeps the jittered grid)
    pub fn relaxation_rounds(mut self, rounds: usize) -> Self {
        self.relaxation_rounds = rounds;
        self
    }

    /// Set the early-stop displacement for relaxation
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if threshold is negative or not finite
    pub fn lloyd_convergence(mut self, threshold: f64) -> Result<Self> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(MapError::InvalidConfiguration(format!(
                "Lloyd convergence threshold must be >= 0 (got {})",
                threshold
            )));
        }
        self.lloyd_convergence = threshold;
        Ok(self)
    }

    /// Set the water level threshold in signed elevation units
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` unless `-1 < level < 1`
    pub fn water_level(mut self, level: f64) -> Result<Self> {
        self.biome.water_level = level;
        self.biome.validate()?;
        Ok(self)
    }

    /// Set the mountain, grass and sand exponents
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if any exponent is not positive and finite
    pub fn exponents(mut self, mountain: f64, grass: f64, sand: f64) -> Result<Self> {
        self.biome.mountain_exponent = mountain;
        self.biome.grass_exponent = grass;
        self.biome.sand_exponent = sand;
        self.biome.validate()?;
        Ok(self)
    }

    /// Replace all biome parameters at once
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the parameters are out of range
    pub fn biome(mut self, biome: BiomeParams) -> Result<Self> {
        biome.validate()?;
        self.biome = biome;
        Ok(self)
    }

    /// Set the octave layering of both noise fields
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the options are out of range
    pub fn noise(mut self, noise: NoiseOptions) -> Result<Self> {
        noise.validate()?;
        self.noise = noise;
        Ok(self)
    }

    /// Choose between biome blending and fixed bands
    pub fn color_mode(mut self, mode: ColorMode) -> Self {
        self.color_mode = mode;
        self
    }

    /// Set the elevation (and site jitter) seed
    pub fn elevation_seed(mut self, seed: u64) -> Self {
        self.elevation_seed = Some(seed);
        self
    }

    /// Set the moisture seed
    pub fn moisture_seed(mut self, seed: u64) -> Self {
        self.moisture_seed = Some(seed);
        self
    }

    /// Build the configuration
    ///
    /// Seeds that were not provided are drawn with `rand::random`. A drawn
    /// moisture seed never equals the elevation seed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the combination is invalid, e.g. the
    /// grid step resolves to zero or both seeds were set to the same value.
    pub fn build(self) -> Result<MapConfig> {
        let elevation_seed = self.elevation_seed.unwrap_or_else(rand::random::<u64>);
        let moisture_seed = match self.moisture_seed {
            Some(seed) => seed,
            None => loop {
                let seed: u64 = rand::random();
                if seed != elevation_seed {
                    break seed;
                }
            },
        };

        let config = MapConfig {
            site_count: self.site_count,
            domain_side: self.domain_side,
            site_margin: self.site_margin,
            zoom_scale: self.zoom_scale,
            relaxation_rounds: self.relaxation_rounds,
            lloyd_convergence: self.lloyd_convergence,
            biome: self.biome,
            noise: self.noise,
            color_mode: self.color_mode,
            elevation_seed,
            moisture_seed,
        };
        config.validate()?;
        Ok(config)
    }
}

impl Default for MapConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
