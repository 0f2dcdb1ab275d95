//! Configuration for map generation.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MapError, Result};

/// Parameters for the terrain noise field and its classification.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    /// Noise frequency per map unit (lower = larger landmasses)
    pub frequency: f64,
    /// Number of noise octaves
    pub octaves: u32,
    /// Amplitude decay per octave (0.0-1.0)
    pub persistence: f64,
    /// Frequency multiplier per octave
    pub lacunarity: f64,
    /// Upper bounds of the water, sand, grass and stone bands; above is snow
    pub band_thresholds: [f64; 4],
    /// Minimum normalized value a cell needs to host a castle, independent of
    /// the band thresholds
    pub placement_threshold: f64,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            frequency: 0.18,
            octaves: 5,
            persistence: 0.5,
            lacunarity: 2.0,
            band_thresholds: [0.40, 0.50, 0.70, 0.80],
            placement_threshold: 0.6,
        }
    }
}

/// Parameters for connecting castles.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeParams {
    /// Two edges leaving the same castle must differ by more than this
    pub min_angle_degrees: f64,
    /// Neighbour ranks that are always proposed before connectivity is checked
    pub min_levels: usize,
}

impl Default for EdgeParams {
    fn default() -> Self {
        Self {
            min_angle_degrees: 15.0,
            min_levels: 3,
        }
    }
}

/// Map size setting chosen for a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MapSize {
    #[default]
    Small,
    Medium,
    Large,
}

impl MapSize {
    /// Parse from string (for CLI)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "small" | "s" => Some(Self::Small),
            "medium" | "m" => Some(Self::Medium),
            "large" | "l" => Some(Self::Large),
            _ => None,
        }
    }

    /// 1 for small maps, 2 for medium, 3 for large.
    pub fn multiplier(&self) -> usize {
        match self {
            Self::Small => 1,
            Self::Medium => 2,
            Self::Large => 3,
        }
    }
}

/// Castles generated per player on a small map.
pub const CASTLES_PER_PLAYER: usize = 7;
/// Upper bound on kingdoms, one per display theme.
pub const MAX_REGIONS: usize = 6;
/// Smallest map, in map units, that generation accepts.
pub const MIN_WIDTH: usize = 15;
pub const MIN_HEIGHT: usize = 10;

/// Everything `generate_map` needs besides the seed and the name pool.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Width in map units; the raster is `width * scale` pixels wide
    pub width: usize,
    /// Height in map units
    pub height: usize,
    /// Pixels per map unit
    pub scale: usize,
    /// Castles to place (an upper bound; fewer may fit)
    pub node_count: usize,
    /// Kingdoms to partition the castles into
    pub region_count: usize,
    /// Full regenerations tried before giving up
    pub max_attempts: u32,
    pub terrain: TerrainParams,
    pub edges: EdgeParams,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self::for_players(2, MapSize::Small)
    }
}

impl MapConfig {
    /// Derive map parameters from the player count and a size setting.
    ///
    /// Tiles are provisioned at `1 + 0.3 * multiplier` times the castle count
    /// and laid out 3:2.
    pub fn for_players(players: usize, size: MapSize) -> Self {
        let multiplier = size.multiplier();
        let node_count = players * CASTLES_PER_PLAYER * multiplier;
        let tile_factor = 1.0 + multiplier as f64 * 0.3;
        let tiles = (node_count as f64 * tile_factor).ceil();

        let width = ((0.6 * tiles).ceil() as usize).max(MIN_WIDTH);
        let height = ((0.4 * tiles).ceil() as usize).max(MIN_HEIGHT);
        let region_count = MAX_REGIONS.min(players + multiplier - 1);

        Self {
            width,
            height,
            scale: 40,
            node_count,
            region_count,
            max_attempts: 10,
            terrain: TerrainParams::default(),
            edges: EdgeParams::default(),
        }
    }

    /// Load a config from a JSON file. Missing fields take default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: MapConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Raster dimensions in pixels.
    pub fn pixel_size(&self) -> (usize, usize) {
        (self.width * self.scale, self.height * self.scale)
    }

    /// Check every argument that does not depend on the generated terrain.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(MapError::invalid(format!(
                "map dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.scale == 0 {
            return Err(MapError::invalid("scale must be positive"));
        }
        if self.node_count == 0 {
            return Err(MapError::invalid("node count must be positive"));
        }
        if self.region_count < 2 || self.region_count >= self.node_count {
            return Err(MapError::invalid(format!(
                "region count {} outside [2, {})",
                self.region_count, self.node_count
            )));
        }
        if self.max_attempts == 0 {
            return Err(MapError::invalid("max_attempts must be at least 1"));
        }
        if !(self.edges.min_angle_degrees >= 0.0 && self.edges.min_angle_degrees < 180.0) {
            return Err(MapError::invalid("min_angle_degrees must lie in [0, 180)"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_two_player_small_map() {
        let config = MapConfig::for_players(2, MapSize::Small);
        assert_eq!(config.node_count, 14);
        assert_eq!(config.width, 15);
        assert_eq!(config.height, 10);
        assert_eq!(config.region_count, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_region_count_is_capped() {
        let config = MapConfig::for_players(4, MapSize::Large);
        assert_eq!(config.node_count, 84);
        assert_eq!(config.region_count, MAX_REGIONS);
    }

    #[test]
    fn test_validate_rejects_bad_arguments() {
        let mut config = MapConfig::default();
        config.region_count = 1;
        assert!(matches!(config.validate(), Err(MapError::InvalidArgument(_))));

        let mut config = MapConfig::default();
        config.region_count = config.node_count;
        assert!(matches!(config.validate(), Err(MapError::InvalidArgument(_))));

        let mut config = MapConfig::default();
        config.scale = 0;
        assert!(matches!(config.validate(), Err(MapError::InvalidArgument(_))));

        let mut config = MapConfig::default();
        config.width = 0;
        assert!(matches!(config.validate(), Err(MapError::InvalidArgument(_))));
    }

    #[test]
    fn test_load_partial_json_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "node_count": 30, "region_count": 4, "edges": {{ "min_angle_degrees": 20.0 }} }}"#).unwrap();

        let config = MapConfig::load(file.path()).unwrap();
        assert_eq!(config.node_count, 30);
        assert_eq!(config.region_count, 4);
        assert_eq!(config.edges.min_angle_degrees, 20.0);
        assert_eq!(config.edges.min_levels, 3);
        assert_eq!(config.scale, 40);
    }
}
