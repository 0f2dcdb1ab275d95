//! Terrain generation.
//!
//! Produces a deterministic fBm Perlin field over the pixel raster, stretched
//! to `[0, 1]`, and classifies each cell into one of five ordered bands.
//!
//! Castles may stand on any cell whose value reaches
//! `TerrainParams::placement_threshold` (0.6 by default). That threshold sits
//! inside the grass band rather than on a band boundary, so eligibility is
//! checked on the value, not on the band.

use noise::{NoiseFn, Perlin, Seedable};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TerrainParams;
use crate::error::{MapError, Result};
use crate::tilemap::Tilemap;

/// Terrain bands in ascending elevation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum TerrainBand {
    #[default]
    Water,
    Sand,
    Grass,
    Stone,
    Snow,
}

impl TerrainBand {
    pub const ALL: [TerrainBand; 5] = [
        TerrainBand::Water,
        TerrainBand::Sand,
        TerrainBand::Grass,
        TerrainBand::Stone,
        TerrainBand::Snow,
    ];

    /// Band for a normalized value, given the upper bounds of the first four bands.
    pub fn classify(value: f64, thresholds: &[f64; 4]) -> Self {
        thresholds
            .iter()
            .position(|&upper| value <= upper)
            .map(|i| Self::ALL[i])
            .unwrap_or(TerrainBand::Snow)
    }

    /// Get the color for this band (RGB)
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            TerrainBand::Water => (0, 0, 255),
            TerrainBand::Sand => (210, 170, 109),
            TerrainBand::Grass => (50, 89, 40),
            TerrainBand::Stone => (128, 128, 128),
            TerrainBand::Snow => (255, 255, 255),
        }
    }
}

/// Noise values and their classification for the whole pixel raster.
#[derive(Clone, Debug)]
pub struct TerrainRaster {
    /// Normalized noise per pixel, in `[0, 1]`
    pub values: Tilemap<f64>,
    pub bands: Tilemap<TerrainBand>,
    /// Pixels per map unit
    pub scale: usize,
    placement_threshold: f64,
}

impl TerrainRaster {
    pub fn width(&self) -> usize {
        self.values.width
    }

    pub fn height(&self) -> usize {
        self.values.height
    }

    pub fn value(&self, x: usize, y: usize) -> f64 {
        *self.values.get(x, y)
    }

    pub fn band(&self, x: usize, y: usize) -> TerrainBand {
        *self.bands.get(x, y)
    }

    /// Whether a castle may stand on this pixel. Out-of-bounds pixels never qualify.
    pub fn is_buildable(&self, x: usize, y: usize) -> bool {
        self.values
            .try_get(x, y)
            .map(|&v| v >= self.placement_threshold)
            .unwrap_or(false)
    }

    /// Fraction of pixels that can host a castle.
    pub fn buildable_fraction(&self) -> f64 {
        let total = self.width() * self.height();
        if total == 0 {
            return 0.0;
        }
        let buildable = self
            .values
            .iter()
            .filter(|&(_, _, &v)| v >= self.placement_threshold)
            .count();
        buildable as f64 / total as f64
    }

    /// Build a raster from precomputed values, classifying with `params`.
    pub fn from_values(values: Tilemap<f64>, scale: usize, params: &TerrainParams) -> Self {
        let bands = values.map(|&v| TerrainBand::classify(v, &params.band_thresholds));
        Self {
            values,
            bands,
            scale,
            placement_threshold: params.placement_threshold,
        }
    }
}

/// Fractional Brownian Motion - layers multiple octaves of noise.
fn fbm(noise: &Perlin, x: f64, y: f64, params: &TerrainParams) -> f64 {
    let mut total = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    let mut max_value = 0.0;

    for _ in 0..params.octaves.max(1) {
        total += amplitude * noise.get([x * frequency, y * frequency]);
        max_value += amplitude;
        amplitude *= params.persistence;
        frequency *= params.lacunarity;
    }

    total / max_value
}

/// Generate the terrain for a `width` x `height` map at `scale` pixels per unit.
///
/// The same arguments and seed always produce the same raster.
pub fn generate_terrain(
    width: usize,
    height: usize,
    scale: usize,
    params: &TerrainParams,
    seed: u64,
) -> Result<TerrainRaster> {
    if width == 0 || height == 0 || scale == 0 {
        return Err(MapError::invalid(format!(
            "terrain needs positive dimensions and scale, got {}x{} at {}",
            width, height, scale
        )));
    }

    let noise = Perlin::new(1).set_seed(seed as u32 ^ (seed >> 32) as u32);
    let (px_width, px_height) = (width * scale, height * scale);
    let unit = 1.0 / scale as f64;

    let raw = Tilemap::from_fn(px_width, px_height, |x, y| {
        let nx = (x as f64 + 0.5) * unit * params.frequency;
        let ny = (y as f64 + 0.5) * unit * params.frequency;
        fbm(&noise, nx, ny, params)
    });

    // Stretch to [0, 1] so the band thresholds see the full range
    let (lo, hi) = raw.min_max();
    let range = hi - lo;
    let values = if range > f64::EPSILON {
        raw.map(|&v| ((v - lo) / range).clamp(0.0, 1.0))
    } else {
        raw.map(|_| 0.5)
    };

    let raster = TerrainRaster::from_values(values, scale, params);
    debug!(
        width = px_width,
        height = px_height,
        buildable = raster.buildable_fraction(),
        "terrain generated"
    );
    Ok(raster)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terrain_is_deterministic() {
        let params = TerrainParams::default();
        let a = generate_terrain(15, 10, 8, &params, 42).unwrap();
        let b = generate_terrain(15, 10, 8, &params, 42).unwrap();
        assert_eq!(a.width(), 120);
        assert_eq!(a.height(), 80);
        for (x, y, &v) in a.values.iter() {
            assert_eq!(v, b.value(x, y));
        }
    }

    #[test]
    fn test_values_are_normalized() {
        let raster = generate_terrain(15, 10, 8, &TerrainParams::default(), 7).unwrap();
        let (lo, hi) = raster.values.min_max();
        assert!(lo >= 0.0 && hi <= 1.0);
        assert!(lo < 0.01, "stretched minimum should be ~0, got {}", lo);
        assert!(hi > 0.99, "stretched maximum should be ~1, got {}", hi);
    }

    #[test]
    fn test_different_seeds_differ() {
        let params = TerrainParams::default();
        let a = generate_terrain(15, 10, 8, &params, 1).unwrap();
        let b = generate_terrain(15, 10, 8, &params, 2).unwrap();
        let differing = a.values.iter().filter(|&(x, y, &v)| v != b.value(x, y)).count();
        assert!(differing > 0);
    }

    #[test]
    fn test_classify_bands() {
        let t = TerrainParams::default().band_thresholds;
        assert_eq!(TerrainBand::classify(0.0, &t), TerrainBand::Water);
        assert_eq!(TerrainBand::classify(0.40, &t), TerrainBand::Water);
        assert_eq!(TerrainBand::classify(0.45, &t), TerrainBand::Sand);
        assert_eq!(TerrainBand::classify(0.65, &t), TerrainBand::Grass);
        assert_eq!(TerrainBand::classify(0.75, &t), TerrainBand::Stone);
        assert_eq!(TerrainBand::classify(0.95, &t), TerrainBand::Snow);
    }

    #[test]
    fn test_buildable_follows_threshold() {
        let params = TerrainParams::default();
        let values = Tilemap::from_fn(4, 1, |x, _| x as f64 * 0.35);
        let raster = TerrainRaster::from_values(values, 1, &params);
        assert!(!raster.is_buildable(0, 0));
        assert!(!raster.is_buildable(1, 0));
        assert!(raster.is_buildable(2, 0));
        assert!(raster.is_buildable(3, 0));
        assert!(!raster.is_buildable(4, 0));
    }

    #[test]
    fn test_grass_is_split_by_placement_threshold() {
        let params = TerrainParams::default();
        let values = Tilemap::from_fn(2, 1, |x, _| if x == 0 { 0.55 } else { 0.65 });
        let raster = TerrainRaster::from_values(values, 1, &params);
        assert_eq!(raster.band(0, 0), TerrainBand::Grass);
        assert_eq!(raster.band(1, 0), TerrainBand::Grass);
        assert!(!raster.is_buildable(0, 0));
        assert!(raster.is_buildable(1, 0));
    }

    #[test]
    fn test_rejects_zero_scale() {
        assert!(matches!(
            generate_terrain(15, 10, 0, &TerrainParams::default(), 1),
            Err(MapError::InvalidArgument(_))
        ));
    }
}
