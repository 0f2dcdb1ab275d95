//! Castle name pool.
//!
//! Defaults are embedded in the binary via `include_str!`; a JSON file with the
//! same shape can replace them at startup.

use std::path::Path;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::Result;

const DEFAULT_NAMES_JSON: &str = include_str!("../data/defaults/castle_names.json");

/// Raw name data as stored on disk.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NameData {
    /// Titles put in front of a base name ("Castle", "Fort", ...)
    #[serde(default)]
    pub prefixes: Vec<String>,
    pub names: Vec<String>,
}

impl NameData {
    /// Load from embedded defaults compiled into the binary.
    pub fn defaults() -> Self {
        serde_json::from_str(DEFAULT_NAMES_JSON).expect("Failed to parse embedded castle_names.json")
    }

    /// Load from a JSON file, replacing the defaults entirely.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

/// Names still available for one map, drawn without replacement.
#[derive(Clone, Debug)]
pub struct NamePool {
    available: Vec<String>,
    drawn: usize,
}

impl NamePool {
    /// Give every base name a random prefix and queue it for drawing.
    pub fn new(data: &NameData, rng: &mut ChaCha8Rng) -> Self {
        let available = data
            .names
            .iter()
            .map(|name| {
                if data.prefixes.is_empty() {
                    name.clone()
                } else {
                    let prefix = &data.prefixes[rng.gen_range(0..data.prefixes.len())];
                    format!("{} {}", prefix, name)
                }
            })
            .collect();
        Self { available, drawn: 0 }
    }

    /// A pool that only produces fallback names.
    pub fn empty() -> Self {
        Self {
            available: Vec::new(),
            drawn: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.available.len()
    }

    /// Take a random unused name, or `"Castle N"` once the pool is exhausted.
    pub fn draw(&mut self, rng: &mut ChaCha8Rng) -> String {
        self.drawn += 1;
        if self.available.is_empty() {
            return format!("Castle {}", self.drawn);
        }
        let idx = rng.gen_range(0..self.available.len());
        self.available.swap_remove(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_embedded_defaults_parse() {
        let data = NameData::defaults();
        assert!(!data.names.is_empty());
        assert!(!data.prefixes.is_empty());
    }

    #[test]
    fn test_draw_without_replacement_then_fallback() {
        let data = NameData {
            prefixes: vec!["Fort".into()],
            names: vec!["Alpha".into(), "Beta".into()],
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut pool = NamePool::new(&data, &mut rng);

        let first = pool.draw(&mut rng);
        let second = pool.draw(&mut rng);
        let drawn: HashSet<String> = [first, second].into_iter().collect();
        let expected: HashSet<String> = ["Fort Alpha".to_string(), "Fort Beta".to_string()].into_iter().collect();
        assert_eq!(drawn, expected);

        assert_eq!(pool.remaining(), 0);
        assert_eq!(pool.draw(&mut rng), "Castle 3");
    }

    #[test]
    fn test_empty_pool_falls_back() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut pool = NamePool::empty();
        assert_eq!(pool.draw(&mut rng), "Castle 1");
        assert_eq!(pool.draw(&mut rng), "Castle 2");
    }
}
