//! Partitioning castles into kingdoms with iterative centroid clustering.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::castle::{Castle, PlayerId};
use crate::error::{MapError, Result};
use crate::geometry::{Point, Positioned};
use crate::graph::{Graph, NodeId};

/// Safety net for tie-induced oscillation; a fixed point is normally reached
/// within a few dozen rounds.
const MAX_ROUNDS: usize = 10_000;

/// Axis-aligned area in which initial centers are drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// `[0, width) x [0, height)`.
    pub fn from_size(width: f64, height: f64) -> Self {
        Self::new(Point::new(0.0, 0.0), Point::new(width, height))
    }

    /// A uniformly random point; a zero-extent axis yields its minimum.
    fn sample(&self, rng: &mut ChaCha8Rng) -> Point {
        let axis = |rng: &mut ChaCha8Rng, lo: f64, hi: f64| if hi > lo { rng.gen_range(lo..hi) } else { lo };
        let x = axis(rng, self.min.x, self.max.x);
        let y = axis(rng, self.min.y, self.max.y);
        Point::new(x, y)
    }
}

/// A kingdom: a group of castles around a free center point.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Region {
    /// Stable display index in `0..region_count`
    pub index: usize,
    pub center: Point,
    pub members: Vec<NodeId>,
}

impl Region {
    fn new(index: usize, center: Point) -> Self {
        Self {
            index,
            center,
            members: Vec::new(),
        }
    }

    /// Index consumed by renderers to pick a theme.
    pub fn region_type(&self) -> usize {
        self.index
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.members.contains(&node)
    }

    /// The player holding every castle of the kingdom, if there is one.
    pub fn owner(&self, graph: &Graph<Castle>) -> Option<PlayerId> {
        let mut owners = self.members.iter().map(|&n| graph.value(n).owner.map(|o| o.player));
        let first = owners.next()??;
        owners.all(|o| o == Some(first)).then_some(first)
    }
}

/// Index of the center nearest to `p`; the first one wins ties.
fn nearest_center(p: &Point, regions: &[Region]) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, region) in regions.iter().enumerate() {
        let d = p.distance_squared(&region.center);
        if d < best_dist {
            best = i;
            best_dist = d;
        }
    }
    best
}

/// Put every node into the region with the nearest center, rebuilding all
/// member lists from scratch.
fn assign(regions: &mut [Region], positions: &[Point]) -> Vec<usize> {
    let assignment: Vec<usize> = positions.iter().map(|p| nearest_center(p, regions)).collect();
    for region in regions.iter_mut() {
        region.members.clear();
    }
    for (i, &r) in assignment.iter().enumerate() {
        regions[r].members.push(NodeId(i as u32));
    }
    assignment
}

/// Move each center to the mean of its members. Empty regions keep theirs.
fn recenter(regions: &mut [Region], positions: &[Point]) {
    for region in regions.iter_mut() {
        if let Some(mean) = Point::mean(region.members.iter().map(|n| &positions[n.index()])) {
            region.center = mean;
        }
    }
}

/// Alternate assignment and recentering until an assignment repeats.
/// Returns the number of assignment rounds.
fn converge(regions: &mut [Region], positions: &[Point]) -> usize {
    let mut previous: Option<Vec<usize>> = None;
    let mut rounds = 0;

    loop {
        rounds += 1;
        let assignment = assign(regions, positions);
        if previous.as_ref() == Some(&assignment) {
            break;
        }
        if rounds >= MAX_ROUNDS {
            warn!(rounds, "clustering stopped before reaching a fixed point");
            break;
        }
        recenter(regions, positions);
        previous = Some(assignment);
    }

    rounds
}

/// Split the nodes of `graph` into `region_count` regions.
///
/// Centers start at random points within `bounds`. Each round assigns every
/// node to its nearest center and moves each center to the mean of its
/// members; a center without members stays where it is. Stops once a round
/// leaves every assignment unchanged.
pub fn cluster_regions<T: Positioned>(
    graph: &Graph<T>,
    region_count: usize,
    bounds: Bounds,
    rng: &mut ChaCha8Rng,
) -> Result<Vec<Region>> {
    let n = graph.node_count();
    if region_count < 2 || region_count >= n {
        return Err(MapError::invalid(format!(
            "region count {} outside [2, {})",
            region_count, n
        )));
    }

    let positions: Vec<Point> = graph.values().map(|v| v.position()).collect();
    let mut regions: Vec<Region> = (0..region_count)
        .map(|i| Region::new(i, bounds.sample(rng)))
        .collect();

    let rounds = converge(&mut regions, &positions);

    debug!(
        rounds,
        sizes = ?regions.iter().map(|r| r.members.len()).collect::<Vec<_>>(),
        "regions clustered"
    );
    Ok(regions)
}
