//! Seed management for map generation
//!
//! Every randomized stage gets its own seed derived from one master seed, so a
//! map can be reproduced from a single number and stages can be varied
//! independently in tests.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Seeds for all map generation stages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MapSeeds {
    /// Master seed (used for display/reference)
    pub master: u64,
    /// Terrain noise field
    pub terrain: u64,
    /// Tile visiting order during castle placement
    pub placement: u64,
    /// Castle name draws
    pub names: u64,
    /// Initial kingdom centers
    pub clustering: u64,
}

impl MapSeeds {
    /// Derive all stage seeds from a master seed.
    pub fn from_master(master: u64) -> Self {
        Self {
            master,
            terrain: derive_seed(master, "terrain"),
            placement: derive_seed(master, "placement"),
            names: derive_seed(master, "names"),
            clustering: derive_seed(master, "clustering"),
        }
    }

    /// Seeds for retry `attempt` (0-based) of a generation starting at `base`.
    pub fn for_attempt(base: u64, attempt: u32) -> Self {
        Self::from_master(base.wrapping_add(attempt as u64))
    }

    pub fn placement_rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.placement)
    }

    pub fn names_rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.names)
    }

    pub fn clustering_rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.clustering)
    }
}

/// Derive a sub-seed from a master seed and a stage name.
///
/// FNV-1a over the stage name, mixed with the master through a SplitMix64
/// finalizer; stable across platforms and compiler versions.
fn derive_seed(master: u64, stage: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in stage.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    splitmix64(master ^ hash)
}

fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

impl std::fmt::Display for MapSeeds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MapSeeds {{ master: {}, terrain: {}, placement: {}, names: {}, clustering: {} }}",
            self.master, self.terrain, self.placement, self.names, self.clustering,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_derivation() {
        assert_eq!(MapSeeds::from_master(12345), MapSeeds::from_master(12345));
    }

    #[test]
    fn test_different_stages_get_different_seeds() {
        let seeds = MapSeeds::from_master(12345);
        assert_ne!(seeds.terrain, seeds.placement);
        assert_ne!(seeds.placement, seeds.names);
        assert_ne!(seeds.names, seeds.clustering);
    }

    #[test]
    fn test_display_lists_every_stage() {
        let seeds = MapSeeds::from_master(77);
        let text = seeds.to_string();
        assert!(text.starts_with("MapSeeds { master: 77,"));
        for value in [seeds.terrain, seeds.placement, seeds.names, seeds.clustering] {
            assert!(text.contains(&value.to_string()));
        }
    }

    #[test]
    fn test_attempts_differ() {
        let first = MapSeeds::for_attempt(7, 0);
        let second = MapSeeds::for_attempt(7, 1);
        assert_eq!(first.master, 7);
        assert_eq!(second.master, 8);
        assert_ne!(first.terrain, second.terrain);
    }
}
