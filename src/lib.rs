//! Conquest map library
//!
//! Spatial graph, rule-driven path search and the procedural pipeline that
//! turns a seed into a connected map of castles and kingdoms.

pub mod castle;
pub mod clustering;
pub mod config;
pub mod edges;
pub mod error;
pub mod export;
pub mod geometry;
pub mod graph;
pub mod map;
pub mod names;
pub mod pathfinding;
pub mod placement;
pub mod rules;
pub mod seeds;
pub mod terrain;
pub mod tilemap;

pub use error::{MapError, Result};
pub use map::{generate_map, GameMap};
