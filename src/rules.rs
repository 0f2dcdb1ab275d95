//! Movement rules for the game actions that query paths.

use crate::castle::{Castle, TeamId};
use crate::graph::{Edge, Graph, NodeId};
use crate::pathfinding::{euclidean_cost, TraversalPolicy};

/// Which game action a path query serves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Reach an enemy castle through the team's own territory.
    Attacking,
    /// Move troops between castles of the team.
    Moving,
    /// Ignore ownership entirely.
    Tunneling,
}

/// Path rules for one team performing one action.
///
/// Costs are always straight-line distances between castles.
#[derive(Clone, Copy, Debug)]
pub struct ActionPolicy {
    pub action: Action,
    pub team: TeamId,
}

impl ActionPolicy {
    pub fn attacking(team: TeamId) -> Self {
        Self { action: Action::Attacking, team }
    }

    pub fn moving(team: TeamId) -> Self {
        Self { action: Action::Moving, team }
    }

    pub fn tunneling(team: TeamId) -> Self {
        Self { action: Action::Tunneling, team }
    }
}

impl TraversalPolicy<Castle> for ActionPolicy {
    fn edge_cost(&self, graph: &Graph<Castle>, edge: &Edge) -> f64 {
        euclidean_cost(graph, edge)
    }

    fn edge_passable(&self, graph: &Graph<Castle>, edge: &Edge) -> bool {
        if self.action == Action::Tunneling {
            return true;
        }

        let a = graph.value(edge.a);
        let b = graph.value(edge.b);

        // One side must already belong to the team
        if !a.is_owned_by_team(self.team) && !b.is_owned_by_team(self.team) {
            return false;
        }

        match self.action {
            // Both sides held; the far side may be an enemy
            Action::Attacking => a.owner.is_some() && b.owner.is_some(),
            // Each side is either free or friendly
            Action::Moving => {
                let friendly_or_free = |c: &Castle| c.owner.is_none() || c.is_owned_by_team(self.team);
                friendly_or_free(a) && friendly_or_free(b)
            }
            Action::Tunneling => true,
        }
    }

    fn node_passable(&self, graph: &Graph<Castle>, node: NodeId) -> bool {
        match self.action {
            Action::Tunneling => true,
            Action::Attacking | Action::Moving => graph.value(node).is_owned_by_team(self.team),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::castle::Owner;
    use crate::geometry::Point;
    use crate::pathfinding::TraversalEngine;

    /// red - red - blue - blue, plus a free castle hanging off the first red one.
    fn frontier_map() -> (Graph<Castle>, [NodeId; 5]) {
        let red = Owner::new(0, 0);
        let blue = Owner::new(1, 1);
        let mut graph = Graph::new();
        let mut castle = |name: &str, x: f64, owner: Option<Owner>| {
            let mut c = Castle::new(name, Point::new(x, 0.0));
            c.owner = owner;
            graph.add_node(c)
        };
        let r1 = castle("Red Keep", 0.0, Some(red));
        let r2 = castle("Red Fort", 10.0, Some(red));
        let b1 = castle("Blue Fort", 20.0, Some(blue));
        let b2 = castle("Blue Keep", 30.0, Some(blue));
        let free = castle("Ruins", -10.0, None);
        graph.add_edge(r1, r2);
        graph.add_edge(r2, b1);
        graph.add_edge(b1, b2);
        graph.add_edge(free, r1);
        (graph, [r1, r2, b1, b2, free])
    }

    #[test]
    fn test_attack_reaches_adjacent_enemy_only() {
        let (graph, [r1, r2, b1, b2, free]) = frontier_map();
        let result = TraversalEngine::new(&graph, r1).run(&ActionPolicy::attacking(TeamId(0)));

        assert!(result.path_to(r2).is_some());
        assert_eq!(result.path_to(b1).map(|p| p.len()), Some(2));
        assert_eq!(result.path_to(b2), None, "cannot attack through an enemy castle");
        assert_eq!(result.path_to(free), None, "unowned castles are not attack targets");
    }

    #[test]
    fn test_move_stays_in_friendly_or_free_territory() {
        let (graph, [r1, r2, b1, b2, free]) = frontier_map();
        let result = TraversalEngine::new(&graph, r1).run(&ActionPolicy::moving(TeamId(0)));

        assert!(result.path_to(r2).is_some());
        assert!(result.path_to(free).is_some());
        assert_eq!(result.path_to(b1), None);
        assert_eq!(result.path_to(b2), None);
    }

    #[test]
    fn test_tunnel_ignores_ownership() {
        let (graph, [r1, _, _, b2, free]) = frontier_map();
        let result = TraversalEngine::new(&graph, r1).run(&ActionPolicy::tunneling(TeamId(0)));

        assert_eq!(result.path_to(b2).map(|p| p.len()), Some(3));
        assert!(result.path_to(free).is_some());
        assert_eq!(result.distance(b2), Some(30.0));
    }

    #[test]
    fn test_attack_from_enemy_castle_finds_nothing() {
        let (graph, [r1, _, b1, ..]) = frontier_map();
        let result = TraversalEngine::new(&graph, b1).run(&ActionPolicy::attacking(TeamId(0)));
        assert_eq!(result.path_to(r1), None);
    }
}
