use serde::{Deserialize, Serialize};

/// Handle to a node inside one [`super::Graph`].
///
/// Two nodes are the same node only if their ids are equal; payload
/// equality never merges nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle to an edge inside one [`super::Graph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub u32);

impl EdgeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A vertex wrapping an arbitrary payload.
#[derive(Clone, Debug)]
pub struct Node<T> {
    pub id: NodeId,
    pub value: T,
}

/// Unordered connection between two nodes.
///
/// Carries no weight or direction; traversal policies decide both.
/// `a == b` is a self-loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub a: NodeId,
    pub b: NodeId,
}

impl Edge {
    pub fn contains(&self, node: NodeId) -> bool {
        self.a == node || self.b == node
    }

    /// The endpoint opposite to `node`. For a self-loop this is `node` itself.
    ///
    /// Panics if `node` is not an endpoint.
    pub fn other(&self, node: NodeId) -> NodeId {
        if self.a == node {
            self.b
        } else if self.b == node {
            self.a
        } else {
            panic!("{:?} is not an endpoint of {:?}", node, self.id)
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.a == self.b
    }

    /// Order-independent key used for duplicate detection.
    pub(crate) fn key(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
        if a <= b { (a, b) } else { (b, a) }
    }
}
