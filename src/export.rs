//! PNG and JSON export of a generated map.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::{ImageBuffer, Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::Point;
use crate::map::GameMap;

/// One colour per kingdom theme.
const REGION_COLORS: [[u8; 3]; 6] = [
    [200, 40, 40],   // Crimson
    [40, 80, 200],   // Royal blue
    [230, 190, 30],  // Gold
    [120, 40, 160],  // Purple
    [30, 150, 90],   // Emerald
    [230, 120, 30],  // Amber
];

const ROAD_COLOR: [u8; 3] = [60, 45, 30];
const OUTLINE_COLOR: [u8; 3] = [0, 0, 0];

fn region_color(index: usize) -> [u8; 3] {
    REGION_COLORS[index % REGION_COLORS.len()]
}

/// Render terrain bands, roads and castles into an image the size of the raster.
pub fn render_map(map: &GameMap) -> RgbImage {
    let terrain = &map.terrain;
    let mut img: RgbImage = ImageBuffer::new(terrain.width() as u32, terrain.height() as u32);

    for y in 0..terrain.height() {
        for x in 0..terrain.width() {
            let (r, g, b) = terrain.band(x, y).color();
            img.put_pixel(x as u32, y as u32, Rgb([r, g, b]));
        }
    }

    for edge in map.graph.edges() {
        let a = map.castle(edge.a).position;
        let b = map.castle(edge.b).position;
        for (x, y) in bresenham_line(a, b) {
            put_clipped(&mut img, x, y, ROAD_COLOR);
        }
    }

    let half = (map.config.scale as i64 / 8).max(2);
    for (_, castle) in map.castles() {
        let (cx, cy) = (castle.position.x as i64, castle.position.y as i64);
        let fill = region_color(castle.region_type());
        for dy in -half..=half {
            for dx in -half..=half {
                let edge = dx.abs() == half || dy.abs() == half;
                put_clipped(&mut img, cx + dx, cy + dy, if edge { OUTLINE_COLOR } else { fill });
            }
        }
    }

    img
}

/// Render the map and save it as a PNG.
pub fn render_png(map: &GameMap, path: &Path) -> Result<()> {
    render_map(map).save(path)?;
    Ok(())
}

fn put_clipped(img: &mut RgbImage, x: i64, y: i64, color: [u8; 3]) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, Rgb(color));
    }
}

/// Pixels on the segment between two points, endpoints included.
fn bresenham_line(from: Point, to: Point) -> Vec<(i64, i64)> {
    let (mut x0, mut y0) = (from.x.round() as i64, from.y.round() as i64);
    let (x1, y1) = (to.x.round() as i64, to.y.round() as i64);

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let mut line = Vec::with_capacity((dx - dy + 1) as usize);

    loop {
        line.push((x0, y0));
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }

    line
}

// ============================================================================
// JSON
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MapExport {
    pub metadata: MapMetadata,
    pub castles: Vec<CastleExport>,
    pub roads: Vec<RoadExport>,
    pub regions: Vec<RegionExport>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MapMetadata {
    pub seed: u64,
    pub attempts: u32,
    pub width: usize,
    pub height: usize,
    pub scale: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CastleExport {
    pub id: u32,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub region: Option<usize>,
    pub owner: Option<u32>,
    pub team: Option<u32>,
    pub troops: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoadExport {
    pub from: u32,
    pub to: u32,
    pub length: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegionExport {
    pub index: usize,
    pub center: Point,
    pub castles: Vec<u32>,
}

/// Flatten a map into its serializable form.
pub fn create_export(map: &GameMap) -> MapExport {
    let metadata = MapMetadata {
        seed: map.seeds.master,
        attempts: map.attempts,
        width: map.config.width,
        height: map.config.height,
        scale: map.config.scale,
    };

    let castles = map
        .castles()
        .map(|(id, c)| CastleExport {
            id: id.0,
            name: c.name.clone(),
            x: c.position.x,
            y: c.position.y,
            region: c.region,
            owner: c.owner.map(|o| o.player.0),
            team: c.owner.map(|o| o.team.0),
            troops: c.troops,
        })
        .collect();

    let roads = map
        .graph
        .edges()
        .map(|e| RoadExport {
            from: e.a.0,
            to: e.b.0,
            length: map.castle(e.a).distance(map.castle(e.b)),
        })
        .collect();

    let regions = map
        .regions
        .iter()
        .map(|r| RegionExport {
            index: r.index,
            center: r.center,
            castles: r.members.iter().map(|n| n.0).collect(),
        })
        .collect();

    MapExport {
        metadata,
        castles,
        roads,
        regions,
    }
}

/// Write castles, roads and regions as pretty-printed JSON.
pub fn write_json(map: &GameMap, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &create_export(map))?;
    Ok(())
}
