//! Generalized single-source shortest paths over a [`Graph`].
//!
//! One relaxation loop serves every movement rule in the game. The rule is a
//! [`TraversalPolicy`] value supplying the edge cost and the node/edge
//! passability predicates.
//!
//! Edge costs are assumed to be non-negative. The loop finalizes a node the
//! moment it is selected, which is only correct under that assumption; costs
//! are not checked at runtime.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::geometry::Positioned;
use crate::graph::{Edge, EdgeId, Graph, NodeId};

/// Cost and passability rules for one traversal.
pub trait TraversalPolicy<T> {
    /// Cost of crossing `edge`. Must not be negative.
    fn edge_cost(&self, graph: &Graph<T>, edge: &Edge) -> f64;

    fn edge_passable(&self, _graph: &Graph<T>, _edge: &Edge) -> bool {
        true
    }

    /// A selected node failing this check is finalized without expanding its edges.
    fn node_passable(&self, _graph: &Graph<T>, _node: NodeId) -> bool {
        true
    }
}

/// Straight-line distance between the endpoints of `edge`.
pub fn euclidean_cost<T: Positioned>(graph: &Graph<T>, edge: &Edge) -> f64 {
    let a = graph.value(edge.a).position();
    let b = graph.value(edge.b).position();
    a.distance(&b)
}

type CostFn<'a, T> = Box<dyn Fn(&Graph<T>, &Edge) -> f64 + 'a>;
type EdgeFilter<'a, T> = Box<dyn Fn(&Graph<T>, &Edge) -> bool + 'a>;
type NodeFilter<'a, T> = Box<dyn Fn(&Graph<T>, NodeId) -> bool + 'a>;

/// A policy assembled from closures, for ad-hoc queries.
pub struct Rules<'a, T> {
    cost: CostFn<'a, T>,
    edge_filter: Option<EdgeFilter<'a, T>>,
    node_filter: Option<NodeFilter<'a, T>>,
}

impl<'a, T> Rules<'a, T> {
    pub fn with_cost(cost: impl Fn(&Graph<T>, &Edge) -> f64 + 'a) -> Self {
        Self {
            cost: Box::new(cost),
            edge_filter: None,
            node_filter: None,
        }
    }

    /// Every edge costs 1; distances count hops.
    pub fn uniform() -> Self {
        Self::with_cost(|_, _| 1.0)
    }

    pub fn edge_filter(mut self, filter: impl Fn(&Graph<T>, &Edge) -> bool + 'a) -> Self {
        self.edge_filter = Some(Box::new(filter));
        self
    }

    pub fn node_filter(mut self, filter: impl Fn(&Graph<T>, NodeId) -> bool + 'a) -> Self {
        self.node_filter = Some(Box::new(filter));
        self
    }
}

impl<'a, T: Positioned + 'a> Rules<'a, T> {
    pub fn euclidean() -> Self {
        Self::with_cost(euclidean_cost)
    }
}

impl<T> TraversalPolicy<T> for Rules<'_, T> {
    fn edge_cost(&self, graph: &Graph<T>, edge: &Edge) -> f64 {
        (self.cost)(graph, edge)
    }

    fn edge_passable(&self, graph: &Graph<T>, edge: &Edge) -> bool {
        self.edge_filter.as_ref().map_or(true, |f| f(graph, edge))
    }

    fn node_passable(&self, graph: &Graph<T>, node: NodeId) -> bool {
        self.node_filter.as_ref().map_or(true, |f| f(graph, node))
    }
}

/// Entry in the frontier queue.
///
/// Smallest distance first; ties go to the node added to the graph first.
#[derive(Clone, Copy)]
struct Frontier {
    distance: f64,
    node: NodeId,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A traversal that has not run yet.
///
/// [`TraversalEngine::run`] consumes the engine, so each query gets fresh
/// state; reuse a graph, not an engine.
pub struct TraversalEngine<'g, T> {
    graph: &'g Graph<T>,
    source: NodeId,
}

impl<'g, T> TraversalEngine<'g, T> {
    /// Panics if `source` is not a node of `graph`.
    pub fn new(graph: &'g Graph<T>, source: NodeId) -> Self {
        assert!(
            graph.contains_node(source),
            "traversal source {:?} is not in the graph",
            source
        );
        Self { graph, source }
    }

    /// Compute distances and predecessors from the source under `policy`.
    pub fn run<P: TraversalPolicy<T> + ?Sized>(self, policy: &P) -> Traversal<'g, T> {
        let graph = self.graph;
        let n = graph.node_count();
        let mut distance: Vec<Option<f64>> = vec![None; n];
        let mut via: Vec<Option<EdgeId>> = vec![None; n];
        let mut finalized = vec![false; n];
        let mut frontier = BinaryHeap::new();

        distance[self.source.index()] = Some(0.0);
        frontier.push(Frontier { distance: 0.0, node: self.source });

        while let Some(Frontier { distance: dist, node: current }) = frontier.pop() {
            if finalized[current.index()] || distance[current.index()] != Some(dist) {
                continue; // stale entry
            }
            finalized[current.index()] = true;

            if !policy.node_passable(graph, current) {
                continue;
            }

            for edge in graph.edges_of(current) {
                if !policy.edge_passable(graph, edge) {
                    continue;
                }
                let neighbor = edge.other(current);
                if finalized[neighbor.index()] {
                    continue;
                }

                let candidate = dist + policy.edge_cost(graph, edge);
                let improves = match distance[neighbor.index()] {
                    None => true,
                    Some(known) => candidate < known,
                };
                if improves {
                    distance[neighbor.index()] = Some(candidate);
                    via[neighbor.index()] = Some(edge.id);
                    frontier.push(Frontier { distance: candidate, node: neighbor });
                }
            }
        }

        Traversal {
            graph,
            source: self.source,
            distance,
            via,
        }
    }
}

/// Result of one completed traversal.
pub struct Traversal<'g, T> {
    graph: &'g Graph<T>,
    source: NodeId,
    distance: Vec<Option<f64>>,
    /// Edge through which each node was last improved
    via: Vec<Option<EdgeId>>,
}

impl<'g, T> Traversal<'g, T> {
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// Shortest distance found to `node`; `None` if never reached.
    pub fn distance(&self, node: NodeId) -> Option<f64> {
        self.check(node);
        self.distance[node.index()]
    }

    pub fn is_reachable(&self, node: NodeId) -> bool {
        node != self.source && self.distance(node).is_some()
    }

    /// Every node other than the source that was reached.
    pub fn reachable(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.node_ids().filter(move |&n| self.is_reachable(n))
    }

    /// Edges from the source to `destination`, in walking order.
    ///
    /// `None` when `destination` was never reached or is the source itself.
    /// Panics if `destination` is not in the graph.
    pub fn path_to(&self, destination: NodeId) -> Option<Vec<EdgeId>> {
        self.check(destination);

        let mut path = Vec::new();
        let mut current = destination;
        while let Some(edge_id) = self.via[current.index()] {
            path.push(edge_id);
            current = self.graph.edge(edge_id).other(current);
            if current == self.source || path.len() > self.graph.node_count() {
                break;
            }
        }

        if path.is_empty() || current != self.source {
            return None;
        }
        path.reverse();
        Some(path)
    }

    /// Nodes along the path to `destination`, starting with the source.
    pub fn nodes_to(&self, destination: NodeId) -> Option<Vec<NodeId>> {
        let edges = self.path_to(destination)?;
        let mut nodes = Vec::with_capacity(edges.len() + 1);
        let mut current = self.source;
        nodes.push(current);
        for edge in edges {
            current = self.graph.edge(edge).other(current);
            nodes.push(current);
        }
        Some(nodes)
    }

    fn check(&self, node: NodeId) {
        assert!(
            self.graph.contains_node(node),
            "traversal queried {:?}, which is not in the graph",
            node
        );
    }
}
