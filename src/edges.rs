//! Connecting castles into a planar, connected road graph.
//!
//! Every castle proposes a road to its nearest neighbour, then its second
//! nearest, and so on. A proposal is accepted only if the new segment crosses
//! no accepted road (touching at a shared castle is fine) and leaves its
//! origin at a clear angle from every road already there. After
//! `min_levels` rounds the graph is checked for connectivity after each round;
//! when the rounds run out first, all roads are removed again.

use tracing::debug;

use crate::config::EdgeParams;
use crate::geometry::{angle_between, segments_intersect, Point, Positioned};
use crate::graph::{Graph, NodeId};

/// Outcome of one edge-building pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgeReport {
    /// Neighbour ranks proposed
    pub levels: usize,
    /// Roads accepted (0 after a failed pass)
    pub edges: usize,
    /// Whether the graph ended up as one component
    pub connected: bool,
}

struct EdgeBuilder<'a, T> {
    graph: &'a mut Graph<T>,
    positions: Vec<Point>,
    min_angle: f64,
}

impl<T> EdgeBuilder<'_, T> {
    /// Other nodes of every node, nearest first; ties keep insertion order.
    fn rank_neighbours(&self) -> Vec<Vec<NodeId>> {
        let n = self.positions.len();
        (0..n)
            .map(|i| {
                let origin = self.positions[i];
                let mut others: Vec<usize> = (0..n).filter(|&j| j != i).collect();
                others.sort_by(|&a, &b| {
                    origin
                        .distance_squared(&self.positions[a])
                        .total_cmp(&origin.distance_squared(&self.positions[b]))
                        .then(a.cmp(&b))
                });
                others.into_iter().map(|j| NodeId(j as u32)).collect()
            })
            .collect()
    }

    fn crosses_existing(&self, origin: NodeId, target: NodeId) -> bool {
        let p1 = &self.positions[origin.index()];
        let p2 = &self.positions[target.index()];
        self.graph.edges().any(|edge| {
            if edge.contains(origin) || edge.contains(target) {
                return false;
            }
            segments_intersect(p1, p2, &self.positions[edge.a.index()], &self.positions[edge.b.index()])
        })
    }

    fn too_close_in_angle(&self, origin: NodeId, target: NodeId) -> bool {
        let o = &self.positions[origin.index()];
        let t = &self.positions[target.index()];
        self.graph.edges_of(origin).any(|edge| {
            if edge.is_self_loop() {
                return false;
            }
            let other = edge.other(origin);
            match angle_between(o, &self.positions[other.index()], t) {
                Some(angle) => angle <= self.min_angle,
                None => true,
            }
        })
    }

    fn propose(&mut self, origin: NodeId, target: NodeId) -> bool {
        if self.graph.edge_between(origin, target).is_some() {
            return false;
        }
        if self.crosses_existing(origin, target) || self.too_close_in_angle(origin, target) {
            return false;
        }
        self.graph.add_edge(origin, target);
        true
    }
}

/// Add roads between the nodes of `graph` until it is connected.
///
/// On failure the graph is left without edges so callers never see a
/// partially connected map.
pub fn connect_nodes<T: Positioned>(graph: &mut Graph<T>, params: &EdgeParams) -> EdgeReport {
    let n = graph.node_count();
    if n <= 1 {
        return EdgeReport {
            levels: 0,
            edges: graph.edge_count(),
            connected: true,
        };
    }

    let positions: Vec<Point> = graph.values().map(|v| v.position()).collect();
    let mut builder = EdgeBuilder {
        graph,
        positions,
        min_angle: params.min_angle_degrees,
    };
    let ranking = builder.rank_neighbours();

    let max_level = n - 1;
    let min_levels = params.min_levels.clamp(1, max_level);

    for level in 1..=max_level {
        let mut accepted = 0usize;
        for (i, neighbours) in ranking.iter().enumerate() {
            if builder.propose(NodeId(i as u32), neighbours[level - 1]) {
                accepted += 1;
            }
        }
        debug!(level, accepted, total = builder.graph.edge_count(), "edge level done");

        if level >= min_levels && builder.graph.all_nodes_connected() {
            return EdgeReport {
                levels: level,
                edges: builder.graph.edge_count(),
                connected: true,
            };
        }
    }

    builder.graph.clear_edges();
    EdgeReport {
        levels: max_level,
        edges: 0,
        connected: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn graph_of(points: &[(f64, f64)]) -> Graph<Point> {
        let mut graph = Graph::new();
        for &(x, y) in points {
            graph.add_node(Point::new(x, y));
        }
        graph
    }

    fn assert_no_crossings(graph: &Graph<Point>) {
        let edges: Vec<_> = graph.edges().copied().collect();
        for (i, e) in edges.iter().enumerate() {
            for f in &edges[i + 1..] {
                if e.contains(f.a) || e.contains(f.b) {
                    continue;
                }
                assert!(
                    !segments_intersect(graph.value(e.a), graph.value(e.b), graph.value(f.a), graph.value(f.b)),
                    "{:?} crosses {:?}",
                    e,
                    f
                );
            }
        }
    }

    #[test]
    fn test_two_nodes_get_one_edge() {
        let mut graph = graph_of(&[(0.0, 0.0), (5.0, 5.0)]);
        let report = connect_nodes(&mut graph, &EdgeParams::default());
        assert!(report.connected);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_single_node_is_trivially_connected() {
        let mut graph = graph_of(&[(3.0, 4.0)]);
        let report = connect_nodes(&mut graph, &EdgeParams::default());
        assert!(report.connected);
        assert_eq!(report.edges, 0);
    }

    #[test]
    fn test_random_layouts_have_no_crossings() {
        for seed in 0..8 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let points: Vec<(f64, f64)> = (0..30)
                .map(|_| (rng.gen_range(0.0..1000.0), rng.gen_range(0.0..700.0)))
                .collect();
            let mut graph = graph_of(&points);

            let report = connect_nodes(&mut graph, &EdgeParams::default());
            assert_no_crossings(&graph);
            if report.connected {
                assert!(graph.all_nodes_connected(), "seed {}", seed);
                assert!(report.levels >= 3);
            } else {
                assert_eq!(graph.edge_count(), 0, "failed pass must leave no edges");
            }
        }
    }

    #[test]
    fn test_existing_self_loop_does_not_block_roads() {
        let mut graph = graph_of(&[(0.0, 0.0), (5.0, 0.0), (10.0, 3.0)]);
        let (o, p, q) = (NodeId(0), NodeId(1), NodeId(2));
        graph.add_edge(o, o);

        let report = connect_nodes(&mut graph, &EdgeParams::default());
        assert!(report.connected);
        assert!(graph.edge_between(o, p).is_some());
        assert!(graph.edge_between(p, q).is_some());
    }

    #[test]
    fn test_near_parallel_edge_is_rejected() {
        // q lies almost straight behind p as seen from o
        let mut graph = graph_of(&[(0.0, 0.0), (10.0, 0.0), (20.0, 1.0)]);
        let (o, p, q) = (NodeId(0), NodeId(1), NodeId(2));

        let report = connect_nodes(&mut graph, &EdgeParams::default());
        assert!(report.connected);
        assert!(graph.edge_between(o, p).is_some());
        assert!(graph.edge_between(p, q).is_some());
        assert!(graph.edge_between(o, q).is_none());
    }

    #[test]
    fn test_unreachable_clusters_fail_and_leave_no_edges() {
        // Two tight pairs far apart; a huge angle threshold blocks every bridge.
        let mut graph = graph_of(&[(0.0, 0.0), (1.0, 0.3), (100.0, 0.0), (101.0, 0.4)]);
        let params = EdgeParams {
            min_angle_degrees: 170.0,
            min_levels: 3,
        };

        let report = connect_nodes(&mut graph, &params);
        assert!(!report.connected);
        assert_eq!(report.levels, 3);
        assert_eq!(graph.edge_count(), 0);
    }
}
