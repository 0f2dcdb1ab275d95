//! Castles - the payload carried by every node of the game map.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Positioned};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamId(pub u32);

/// The player holding a castle and the team that player plays for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Owner {
    pub player: PlayerId,
    pub team: TeamId,
}

impl Owner {
    pub fn new(player: u32, team: u32) -> Self {
        Self {
            player: PlayerId(player),
            team: TeamId(team),
        }
    }
}

/// A castle on the map.
///
/// Position and name are fixed at generation; owner and troops are gameplay
/// state mutated through [`crate::graph::Graph::value_mut`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Castle {
    pub name: String,
    pub position: Point,
    pub owner: Option<Owner>,
    pub troops: u32,
    /// Index of the kingdom this castle belongs to
    pub region: Option<usize>,
}

impl Castle {
    pub fn new(name: impl Into<String>, position: Point) -> Self {
        Self {
            name: name.into(),
            position,
            owner: None,
            troops: 0,
            region: None,
        }
    }

    pub fn distance(&self, other: &Castle) -> f64 {
        self.position.distance(&other.position)
    }

    pub fn team(&self) -> Option<TeamId> {
        self.owner.map(|o| o.team)
    }

    pub fn is_owned_by_team(&self, team: TeamId) -> bool {
        self.team() == Some(team)
    }

    /// Display theme index: the kingdom index, or 0 outside any kingdom.
    pub fn region_type(&self) -> usize {
        self.region.unwrap_or(0)
    }
}

impl Positioned for Castle {
    fn position(&self) -> Point {
        self.position
    }
}
