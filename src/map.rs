//! Map generation pipeline and the finished game map.
//!
//! Stages run in a fixed order: terrain, castle placement, roads, kingdoms.
//! An attempt that ends with too few castles or a disconnected road graph is
//! thrown away and regenerated from the next seed.

use tracing::{info, warn};

use crate::castle::Castle;
use crate::clustering::{cluster_regions, Bounds, Region};
use crate::config::MapConfig;
use crate::edges::connect_nodes;
use crate::error::{MapError, Result};
use crate::graph::{EdgeId, Graph, NodeId};
use crate::names::{NameData, NamePool};
use crate::pathfinding::{Traversal, TraversalEngine};
use crate::placement::place_castles;
use crate::rules::ActionPolicy;
use crate::seeds::MapSeeds;
use crate::terrain::{generate_terrain, TerrainRaster};

/// A generated, fully connected map ready for play.
#[derive(Clone, Debug)]
pub struct GameMap {
    pub terrain: TerrainRaster,
    pub graph: Graph<Castle>,
    pub regions: Vec<Region>,
    /// Seeds of the attempt that succeeded
    pub seeds: MapSeeds,
    /// Attempts used, including the successful one
    pub attempts: u32,
    pub config: MapConfig,
}

impl GameMap {
    pub fn castle(&self, node: NodeId) -> &Castle {
        self.graph.value(node)
    }

    pub fn castle_mut(&mut self, node: NodeId) -> &mut Castle {
        self.graph.value_mut(node)
    }

    pub fn castles(&self) -> impl Iterator<Item = (NodeId, &Castle)> {
        self.graph.nodes().map(|n| (n.id, &n.value))
    }

    /// Case-insensitive lookup by castle name.
    pub fn find_castle(&self, name: &str) -> Option<NodeId> {
        self.castles()
            .find(|(_, c)| c.name.eq_ignore_ascii_case(name))
            .map(|(id, _)| id)
    }

    /// Like [`GameMap::find_castle`], but an unknown name is an error.
    pub fn castle_named(&self, name: &str) -> Result<NodeId> {
        self.find_castle(name)
            .ok_or_else(|| MapError::invalid(format!("unknown castle '{}'", name)))
    }

    /// Whether a road connects `node` to a castle of another team.
    ///
    /// Unowned castles count as a team of their own.
    pub fn is_border_castle(&self, node: NodeId) -> bool {
        let team = self.graph.value(node).team();
        self.graph
            .neighbors(node)
            .any(|other| self.graph.value(other).team() != team)
    }

    /// All castles reachable from `from` under `policy`, with distances.
    pub fn traverse(&self, from: NodeId, policy: &ActionPolicy) -> Traversal<'_, Castle> {
        TraversalEngine::new(&self.graph, from).run(policy)
    }

    /// Roads from `from` to `to` under `policy`, or `None` if no route exists.
    pub fn find_path(&self, from: NodeId, to: NodeId, policy: &ActionPolicy) -> Option<Vec<EdgeId>> {
        self.traverse(from, policy).path_to(to)
    }

    pub fn region_of(&self, node: NodeId) -> Option<&Region> {
        self.graph
            .value(node)
            .region
            .and_then(|index| self.regions.get(index))
    }
}

/// Why a single attempt was discarded.
enum Rejection {
    TooFewCastles { placed: usize },
    Disconnected { levels: usize },
}

/// Generate a map, retrying with fresh seeds until one is fully connected.
///
/// Attempt `i` uses master seed `base_seed + i`. Invalid arguments and an
/// impossible tile layout fail immediately since no seed can fix them.
pub fn generate_map(config: &MapConfig, names: &NameData, base_seed: u64) -> Result<GameMap> {
    config.validate()?;

    for attempt in 0..config.max_attempts {
        let seeds = MapSeeds::for_attempt(base_seed, attempt);
        match generate_attempt(config, names, seeds)? {
            Ok((terrain, graph, regions)) => {
                info!(
                    seed = seeds.master,
                    attempt = attempt + 1,
                    castles = graph.node_count(),
                    roads = graph.edge_count(),
                    regions = regions.len(),
                    "map generated"
                );
                return Ok(GameMap {
                    terrain,
                    graph,
                    regions,
                    seeds,
                    attempts: attempt + 1,
                    config: config.clone(),
                });
            }
            Err(Rejection::TooFewCastles { placed }) => {
                warn!(
                    seed = seeds.master,
                    placed,
                    regions = config.region_count,
                    "too few castles for the requested kingdoms, retrying"
                );
            }
            Err(Rejection::Disconnected { levels }) => {
                warn!(seed = seeds.master, levels, "road graph not connected, retrying");
            }
        }
    }

    Err(MapError::GenerationFailed {
        attempts: config.max_attempts,
        last_seed: base_seed.wrapping_add(config.max_attempts.saturating_sub(1) as u64),
    })
}

type Attempt = std::result::Result<(TerrainRaster, Graph<Castle>, Vec<Region>), Rejection>;

fn generate_attempt(config: &MapConfig, names: &NameData, seeds: MapSeeds) -> Result<Attempt> {
    let terrain = generate_terrain(config.width, config.height, config.scale, &config.terrain, seeds.terrain)?;

    let mut names_rng = seeds.names_rng();
    let mut pool = NamePool::new(names, &mut names_rng);
    let mut graph = place_castles(
        &terrain,
        config.width,
        config.height,
        config.node_count,
        &mut pool,
        &mut seeds.placement_rng(),
    )?;

    if graph.node_count() <= config.region_count {
        return Ok(Err(Rejection::TooFewCastles {
            placed: graph.node_count(),
        }));
    }

    let report = connect_nodes(&mut graph, &config.edges);
    if !report.connected {
        return Ok(Err(Rejection::Disconnected { levels: report.levels }));
    }

    let (px_width, px_height) = config.pixel_size();
    let regions = cluster_regions(
        &graph,
        config.region_count,
        Bounds::from_size(px_width as f64, px_height as f64),
        &mut seeds.clustering_rng(),
    )?;
    for region in &regions {
        for &node in &region.members {
            graph.value_mut(node).region = Some(region.index);
        }
    }

    Ok(Ok((terrain, graph, regions)))
}

/// Generate a map from bare dimensions with default terrain, road and name
/// settings.
pub fn generate_sized_map(
    width: usize,
    height: usize,
    scale: usize,
    node_count: usize,
    region_count: usize,
    seed: u64,
) -> Result<GameMap> {
    let config = MapConfig {
        width,
        height,
        scale,
        node_count,
        region_count,
        ..MapConfig::default()
    };
    generate_map(&config, &NameData::defaults(), seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::castle::{Owner, TeamId};
    use crate::geometry::segments_intersect;

    fn small_config() -> MapConfig {
        MapConfig {
            scale: 10,
            max_attempts: 20,
            ..MapConfig::default()
        }
    }

    #[test]
    fn test_generated_map_is_connected_and_partitioned() {
        let config = small_config();
        let map = generate_map(&config, &NameData::defaults(), 42).unwrap();

        assert!(map.graph.node_count() > config.region_count);
        assert!(map.graph.node_count() <= config.node_count);
        assert!(map.graph.all_nodes_connected());
        assert_eq!(map.regions.len(), config.region_count);
        assert!(map.attempts >= 1 && map.attempts <= config.max_attempts);
        assert_eq!(map.seeds.master, 42 + map.attempts as u64 - 1);

        for (id, castle) in map.castles() {
            let region = map.region_of(id).unwrap();
            assert!(region.contains(id));
            assert!(map.terrain.is_buildable(castle.position.x as usize, castle.position.y as usize));
        }
    }

    #[test]
    fn test_generated_roads_do_not_cross() {
        let map = generate_map(&small_config(), &NameData::defaults(), 7).unwrap();
        let edges: Vec<_> = map.graph.edges().copied().collect();
        for (i, e) in edges.iter().enumerate() {
            for f in &edges[i + 1..] {
                if e.contains(f.a) || e.contains(f.b) {
                    continue;
                }
                let p = |n: NodeId| map.castle(n).position;
                assert!(!segments_intersect(&p(e.a), &p(e.b), &p(f.a), &p(f.b)));
            }
        }
    }

    #[test]
    fn test_same_seed_same_map() {
        let config = small_config();
        let a = generate_map(&config, &NameData::defaults(), 1234).unwrap();
        let b = generate_map(&config, &NameData::defaults(), 1234).unwrap();

        let castles = |m: &GameMap| m.graph.values().cloned().collect::<Vec<_>>();
        assert_eq!(castles(&a), castles(&b));
        assert_eq!(a.graph.edge_count(), b.graph.edge_count());
        assert_eq!(a.seeds, b.seeds);
    }

    #[test]
    fn test_invalid_region_count_fails_fast() {
        let config = MapConfig {
            region_count: 1,
            ..small_config()
        };
        let result = generate_map(&config, &NameData::defaults(), 0);
        assert!(matches!(result, Err(MapError::InvalidArgument(_))));
    }

    #[test]
    fn test_impossible_layout_is_insufficient_space() {
        let result = generate_sized_map(15, 10, 1, 400, 4, 0);
        assert!(matches!(result, Err(MapError::InsufficientSpace { .. })));
    }

    #[test]
    fn test_unbuildable_terrain_exhausts_attempts() {
        let mut config = small_config();
        config.max_attempts = 3;
        config.terrain.placement_threshold = 2.0;

        let result = generate_map(&config, &NameData::defaults(), 100);
        match result {
            Err(MapError::GenerationFailed { attempts, last_seed }) => {
                assert_eq!(attempts, 3);
                assert_eq!(last_seed, 102);
            }
            other => panic!("expected GenerationFailed, got {:?}", other.map(|m| m.seeds)),
        }
    }

    #[test]
    fn test_border_castles_and_paths() {
        let mut map = generate_map(&small_config(), &NameData::defaults(), 99).unwrap();
        let ids: Vec<NodeId> = map.graph.node_ids().collect();

        // Nobody owns anything: no borders, no attack routes
        assert!(ids.iter().all(|&id| !map.is_border_castle(id)));

        let (first, rest) = ids.split_first().unwrap();
        map.castle_mut(*first).owner = Some(Owner::new(0, 0));
        for &id in rest {
            map.castle_mut(id).owner = Some(Owner::new(1, 1));
        }

        assert!(map.is_border_castle(*first));
        let neighbours: Vec<NodeId> = map.graph.neighbors(*first).collect();
        for neighbour in neighbours {
            assert!(map.is_border_castle(neighbour));
            let path = map.find_path(*first, neighbour, &ActionPolicy::attacking(TeamId(0)));
            assert_eq!(path.map(|p| p.len()), Some(1));
        }

        let far = *ids.last().unwrap();
        let tunnel = map.find_path(*first, far, &ActionPolicy::tunneling(TeamId(0)));
        assert!(tunnel.is_some());
    }

    #[test]
    fn test_find_castle_by_name() {
        let map = generate_map(&small_config(), &NameData::defaults(), 5).unwrap();
        let (id, castle) = map.castles().next().unwrap();
        assert_eq!(map.find_castle(&castle.name.to_uppercase()), Some(id));
        assert_eq!(map.find_castle("No Such Place"), None);

        assert_eq!(map.castle_named(&castle.name).unwrap(), id);
        assert!(matches!(map.castle_named("No Such Place"), Err(MapError::InvalidArgument(_))));
    }
}
