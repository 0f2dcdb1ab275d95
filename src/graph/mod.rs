//! Generic spatial graph.
//!
//! Nodes and edges live in arenas owned by the [`Graph`] and are referenced by
//! [`NodeId`] / [`EdgeId`] handles. Identity is the handle, never the payload:
//! two castles with identical data are still two nodes.

pub mod types;

use std::collections::HashMap;

pub use types::{Edge, EdgeId, Node, NodeId};

/// Owning container of nodes and the undirected edges between them.
#[derive(Clone, Debug)]
pub struct Graph<T> {
    nodes: Vec<Node<T>>,
    edges: Vec<Edge>,
    /// Incident edges per node, indexed by `NodeId`.
    incidence: Vec<Vec<EdgeId>>,
    /// Unordered endpoint pair -> edge, for idempotent insertion.
    lookup: HashMap<(NodeId, NodeId), EdgeId>,
}

impl<T> Default for Graph<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Graph<T> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            incidence: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    /// Add a node holding `value`. Always creates a new node.
    pub fn add_node(&mut self, value: T) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node { id, value });
        self.incidence.push(Vec::new());
        id
    }

    /// Connect `a` and `b`, returning the existing edge if they are already
    /// connected in either order.
    ///
    /// Panics if either node does not belong to this graph.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) -> EdgeId {
        assert!(self.contains_node(a), "add_edge: {:?} is not in the graph", a);
        assert!(self.contains_node(b), "add_edge: {:?} is not in the graph", b);

        let key = Edge::key(a, b);
        if let Some(&existing) = self.lookup.get(&key) {
            return existing;
        }

        let id = EdgeId(self.edges.len() as u32);
        self.edges.push(Edge { id, a, b });
        self.lookup.insert(key, id);
        self.incidence[a.index()].push(id);
        if a != b {
            self.incidence[b.index()].push(id);
        }
        id
    }

    pub fn contains_node(&self, node: NodeId) -> bool {
        node.index() < self.nodes.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node<T> {
        &self.nodes[id.index()]
    }

    pub fn value(&self, id: NodeId) -> &T {
        &self.nodes[id.index()].value
    }

    /// Mutable access to a payload. Topology cannot be changed through it.
    pub fn value_mut(&mut self, id: NodeId) -> &mut T {
        &mut self.nodes[id.index()].value
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.index()]
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node<T>> {
        self.nodes.iter()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().map(|n| n.id)
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.nodes.iter().map(|n| &n.value)
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    /// All edges incident to `node`, in insertion order.
    pub fn edges_of(&self, node: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.incidence[node.index()].iter().map(|&e| &self.edges[e.index()])
    }

    /// The edge connecting `a` and `b` in either order, if any.
    pub fn edge_between(&self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        self.lookup.get(&Edge::key(a, b)).copied()
    }

    /// Nodes adjacent to `node`, one entry per incident edge.
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.edges_of(node).map(move |e| e.other(node))
    }

    /// Drop every edge, keeping the nodes.
    pub(crate) fn clear_edges(&mut self) {
        self.edges.clear();
        self.lookup.clear();
        for incident in &mut self.incidence {
            incident.clear();
        }
    }

    /// Whether every node can be reached from the first one.
    ///
    /// Iterative depth-first search with a visited set, so cycles and
    /// self-loops are harmless. An empty graph counts as connected.
    pub fn all_nodes_connected(&self) -> bool {
        if self.nodes.is_empty() {
            return true;
        }

        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![NodeId(0)];
        let mut seen = 0usize;
        visited[0] = true;

        while let Some(current) = stack.pop() {
            seen += 1;
            for next in self.neighbors(current) {
                if !visited[next.index()] {
                    visited[next.index()] = true;
                    stack.push(next);
                }
            }
        }

        seen == self.nodes.len()
    }
}

impl<T: PartialEq> Graph<T> {
    /// First node whose payload equals `value`.
    pub fn node_by_value(&self, value: &T) -> Option<NodeId> {
        self.nodes.iter().find(|n| n.value == *value).map(|n| n.id)
    }
}
