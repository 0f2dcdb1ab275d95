//! Error types for map generation and export.

use thiserror::Error;

/// Errors produced while generating, validating or exporting a map.
///
/// A traversal that finds no route is not an error; see
/// [`crate::pathfinding::Traversal::path_to`].
#[derive(Debug, Error)]
pub enum MapError {
    /// A size, scale, node count or region count is out of range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The placement grid cannot host the requested number of castles.
    #[error("Insufficient space: {tiles_x}x{tiles_y} tiles cannot host {requested} castles")]
    InsufficientSpace {
        tiles_x: usize,
        tiles_y: usize,
        requested: usize,
    },

    /// Every attempt produced a map that was not fully connected.
    #[error("Map generation failed after {attempts} attempt(s), last seed {last_seed}")]
    GenerationFailed { attempts: u32, last_seed: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MapError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, MapError>;
