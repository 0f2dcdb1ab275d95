//! Castle placement.
//!
//! The raster is cut into a grid of tiles with at most one castle each. Tiles
//! are visited in random order; inside a tile the cells are scanned in an
//! inward spiral and the first buildable cell far enough from every castle
//! already placed wins. Tiles without such a cell are skipped, so a map may
//! end up with fewer castles than requested.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::castle::Castle;
use crate::error::{MapError, Result};
use crate::geometry::Point;
use crate::graph::Graph;
use crate::names::NamePool;
use crate::terrain::TerrainRaster;

/// Extra tiles added per axis beyond the square-root estimate.
const TILE_SLACK: usize = 5;

/// Tile layout for one map, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileGrid {
    pub tiles_x: usize,
    pub tiles_y: usize,
    pub tile_width: usize,
    pub tile_height: usize,
}

impl TileGrid {
    /// Lay out tiles for `node_count` castles on a `width` x `height` map
    /// (map units) rendered at `scale` pixels per unit.
    ///
    /// Tiles are shared between the axes in proportion to the map's sides.
    pub fn for_map(width: usize, height: usize, scale: usize, node_count: usize) -> Result<Self> {
        if width == 0 || height == 0 || scale == 0 || node_count == 0 {
            return Err(MapError::invalid("tile grid needs positive dimensions, scale and node count"));
        }

        let square = (node_count as f64).sqrt().ceil();
        let length = (width + height) as f64;
        let tiles_x = (((width as f64 / length + 0.5) * square) as usize).max(1) + TILE_SLACK;
        let tiles_y = (((height as f64 / length + 0.5) * square) as usize).max(1) + TILE_SLACK;
        let tile_width = width * scale / tiles_x;
        let tile_height = height * scale / tiles_y;

        if tiles_x * tiles_y < node_count || tile_width == 0 || tile_height == 0 {
            return Err(MapError::InsufficientSpace {
                tiles_x,
                tiles_y,
                requested: node_count,
            });
        }

        Ok(Self {
            tiles_x,
            tiles_y,
            tile_width,
            tile_height,
        })
    }

    /// Castles must be at least this far apart.
    pub fn min_spacing(&self) -> f64 {
        self.tile_width.max(self.tile_height) as f64
    }

    pub fn tile_count(&self) -> usize {
        self.tiles_x * self.tiles_y
    }
}

/// Cells of a `width` x `height` rectangle, clockwise from the top-left
/// corner and spiralling towards the middle.
pub fn spiral_inward(width: usize, height: usize) -> Vec<(usize, usize)> {
    let mut cells = Vec::with_capacity(width * height);
    if width == 0 || height == 0 {
        return cells;
    }

    let (mut left, mut top) = (0usize, 0usize);
    let (mut right, mut bottom) = (width - 1, height - 1);

    loop {
        for x in left..=right {
            cells.push((x, top));
        }
        for y in top + 1..=bottom {
            cells.push((right, y));
        }
        if top < bottom {
            for x in (left..right).rev() {
                cells.push((x, bottom));
            }
        }
        if left < right {
            for y in (top + 1..bottom).rev() {
                cells.push((left, y));
            }
        }

        if right - left < 2 || bottom - top < 2 {
            break;
        }
        left += 1;
        top += 1;
        right -= 1;
        bottom -= 1;
    }

    cells
}

/// Place up to `node_count` castles on buildable terrain.
///
/// Returns a graph with one node per castle and no edges. A short result is
/// not an error; only an impossible tile layout is.
pub fn place_castles(
    terrain: &TerrainRaster,
    width: usize,
    height: usize,
    node_count: usize,
    names: &mut NamePool,
    rng: &mut ChaCha8Rng,
) -> Result<Graph<Castle>> {
    let grid = TileGrid::for_map(width, height, terrain.scale, node_count)?;
    let min_spacing = grid.min_spacing();
    let spiral = spiral_inward(grid.tile_width, grid.tile_height);

    let mut tiles: Vec<(usize, usize)> = (0..grid.tiles_x)
        .flat_map(|tx| (0..grid.tiles_y).map(move |ty| (tx, ty)))
        .collect();
    tiles.shuffle(rng);

    let mut graph = Graph::new();
    let mut placed: Vec<Point> = Vec::with_capacity(node_count);

    for (tx, ty) in tiles {
        if placed.len() >= node_count {
            break;
        }
        let x0 = tx * grid.tile_width;
        let y0 = ty * grid.tile_height;

        let found = spiral.iter().map(|&(dx, dy)| (x0 + dx, y0 + dy)).find(|&(x, y)| {
            if !terrain.is_buildable(x, y) {
                return false;
            }
            let candidate = Point::new(x as f64, y as f64);
            placed.iter().all(|p| p.distance(&candidate) >= min_spacing)
        });

        if let Some((x, y)) = found {
            let position = Point::new(x as f64, y as f64);
            placed.push(position);
            graph.add_node(Castle::new(names.draw(rng), position));
        }
    }

    debug!(
        requested = node_count,
        placed = placed.len(),
        tiles = grid.tile_count(),
        spacing = min_spacing,
        "castles placed"
    );
    Ok(graph)
}
