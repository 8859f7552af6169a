//! Biome color classification
//!
//! Maps an (elevation, moisture) noise pair to an 8-bit color. Two mappers
//! are provided: the continuous [`BiomeClassifier`] blend and the
//! [`BandColorMapper`] with five fixed elevation bands.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::TerrainBand;
use crate::error::{MapError, Result};

/// 8-bit RGB color
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Normalized RGBA with full opacity
    pub fn to_rgba_f32(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            1.0,
        ]
    }
}

/// Trait for mapping sampled noise values to colors
pub trait ColorMapper {
    /// Map elevation and moisture noise, both in [0, 1], to a color
    fn map_color(&self, elevation: f64, moisture: f64) -> Result<Rgb>;
}

/// Water level and blend exponents of the biome formula
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiomeParams {
    /// Signed elevation below which a cell is water, in (-1, 1)
    pub water_level: f64,
    /// Steepens elevation before blending toward snow
    pub mountain_exponent: f64,
    /// Larger values keep vegetation further up the slopes
    pub grass_exponent: f64,
    /// Strength of moisture attenuation with height
    pub sand_exponent: f64,
}

impl Default for BiomeParams {
    fn default() -> Self {
        Self {
            water_level: -0.2,
            mountain_exponent: 4.0,
            grass_exponent: 1.0,
            sand_exponent: 1.0,
        }
    }
}

impl BiomeParams {
    /// Check the water level range and that every exponent is positive
    pub fn validate(&self) -> Result<()> {
        if !(self.water_level > -1.0 && self.water_level < 1.0) {
            return Err(MapError::InvalidConfiguration(format!(
                "water level must be in (-1, 1) (got {})",
                self.water_level
            )));
        }
        for (name, value) in [
            ("mountain", self.mountain_exponent),
            ("grass", self.grass_exponent),
            ("sand", self.sand_exponent),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(MapError::InvalidConfiguration(format!(
                    "{} exponent must be a positive finite number (got {})",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Signed elevation `e = (n - 0.5) * 2` for elevation noise `n`
    #[inline]
    pub fn signed_elevation(elevation: f64) -> f64 {
        (elevation - 0.5) * 2.0
    }

    /// Check if elevation noise falls below the water level
    #[inline]
    pub fn is_water(&self, elevation: f64) -> bool {
        Self::signed_elevation(elevation) < self.water_level
    }
}

/// Continuous biome blend
///
/// 1. `e = (n - 0.5) * 2`
/// 2. `e < water_level`: water, darkening linearly with depth
/// 3. otherwise moisture is attenuated by height, elevation is steepened by
///    the mountain exponent, and a vegetation color is blended toward white
///
/// The steepening power is applied to `e` clamped to `[0, 1]`, so land just
/// above a negative water level blends with no snow instead of raising a
/// negative base to a fractional power.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BiomeClassifier {
    pub params: BiomeParams,
}

impl BiomeClassifier {
    pub fn new(params: BiomeParams) -> Self {
        Self { params }
    }

    /// Unrounded channel values for an elevation/moisture pair
    ///
    /// # Errors
    ///
    /// Returns `NumericDomain` if the moisture attenuation power is undefined
    /// (`1 - e / grass_exponent` negative with a fractional sand exponent) or
    /// any channel comes out non-finite.
    pub fn blend(&self, elevation: f64, moisture: f64) -> Result<[f64; 3]> {
        let p = &self.params;
        let e = BiomeParams::signed_elevation(elevation);

        let channels = if p.is_water(elevation) {
            [48.0 + 48.0 * e, 64.0 + 64.0 * e, 127.0 + 127.0 * e]
        } else {
            let attenuation_base = 1.0 - e / p.grass_exponent;
            let attenuation = attenuation_base.powf(p.sand_exponent);
            if !attenuation.is_finite() {
                return Err(MapError::NumericDomain(format!(
                    "moisture attenuation {}^{} is undefined",
                    attenuation_base, p.sand_exponent
                )));
            }
            let m = moisture * attenuation;
            let snow = e.clamp(0.0, 1.0).powf(p.mountain_exponent);

            let r = 200.0 - 100.0 * m;
            let g = 185.0 - 45.0 * m;
            let b = 130.0 - 45.0 * m;
            [
                255.0 * snow + r * (1.0 - snow),
                255.0 * snow + g * (1.0 - snow),
                255.0 * snow + b * (1.0 - snow),
            ]
        };

        if let Some(bad) = channels.iter().find(|c| !c.is_finite()) {
            return Err(MapError::NumericDomain(format!(
                "color channel {} for elevation {} and moisture {}",
                bad, elevation, moisture
            )));
        }
        Ok(channels)
    }

    /// Classify an elevation/moisture pair into a color
    pub fn classify(&self, elevation: f64, moisture: f64) -> Result<Rgb> {
        let [r, g, b] = self.blend(elevation, moisture)?;
        Ok(Rgb::new(to_byte(r), to_byte(g), to_byte(b)))
    }
}

impl ColorMapper for BiomeClassifier {
    fn map_color(&self, elevation: f64, moisture: f64) -> Result<Rgb> {
        self.classify(elevation, moisture)
    }
}

/// Round to nearest and clamp into a byte
#[inline]
fn to_byte(channel: f64) -> u8 {
    channel.round().clamp(0.0, 255.0) as u8
}

/// Five fixed elevation bands, moisture ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BandColorMapper;

impl ColorMapper for BandColorMapper {
    fn map_color(&self, elevation: f64, _moisture: f64) -> Result<Rgb> {
        if !elevation.is_finite() {
            return Err(MapError::NumericDomain(format!(
                "elevation noise {} is not finite",
                elevation
            )));
        }
        Ok(TerrainBand::from_elevation(elevation).color())
    }
}
