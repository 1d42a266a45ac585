// Core types shared across the engine.
//
// Defines spatial coordinates (`Position`) and the key node categories
// (`NodeCategory`) the router treats specially. Entity ids are re-exported
// from `wayfinder_records` so engine code and boundary records agree on a
// single set of keys.

use serde::{Deserialize, Serialize};
use std::fmt;

pub use wayfinder_records::{ConnectionId, NodeId, TypeId};

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// A point in map space. Units match connection distances (the bulk loader
/// never rescales), so the straight-line distance between two positions is
/// directly comparable to an edge cost.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Straight-line 3D distance. This is the A* heuristic: admissible as
    /// long as every connection's distance is at least this long.
    pub fn distance_to(self, other: Self) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// What a node type means to the router. Derived from the type's name via
/// `CategoryNames` (see `config.rs`); every other type is `Other`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeCategory {
    /// Encloses one indoor search domain.
    Building,
    /// Outdoor path segment; the outdoor search domain.
    Street,
    /// Threshold between inside and outside.
    Door,
    /// Vertical transport. Routing through elevators is not supported.
    Elevator,
    /// Rooms, corridors, floors, and anything else.
    Other,
}

impl NodeCategory {
    /// Whether this category is one the exit index depends on. Renaming a
    /// type into or out of such a category invalidates exit membership.
    pub fn affects_exits(self) -> bool {
        matches!(self, NodeCategory::Building | NodeCategory::Street)
    }
}
